//! latelier: French diary workshop.

use std::path::PathBuf;

use clap::Parser;
use latelier::config::Config;
use latelier::history::{self, HistoryStore};
use latelier::speech::{AudioOutput, RodioOutput, UnavailableOutput};
use latelier::ui::{self, JournalApp};
use latelier::Controller;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "latelier", about = "Translate and study your diary in French")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// History file (overrides history.path from the config)
    #[arg(long)]
    history: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Keep GUI and HTTP internals quiet
    let filter = if args.verbose {
        EnvFilter::new("debug,eframe=warn,egui=warn,reqwest=warn,hyper=warn,wgpu=warn")
    } else {
        EnvFilter::new("info,eframe=warn,egui=warn,reqwest=warn,hyper=warn,wgpu=warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("latelier starting");

    let config = Config::load(args.config.as_deref());

    let history_path = args
        .history
        .or_else(|| config.history.path.clone())
        .unwrap_or_else(history::default_path);
    let history = HistoryStore::load(history_path);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let output: Box<dyn AudioOutput> = match RodioOutput::open() {
        Ok(output) => Box::new(output),
        Err(e) => {
            warn!("{e}; speech buttons will report the missing device");
            Box::new(UnavailableOutput::new(e.to_string()))
        }
    };

    let controller = Controller::new(&config, history, output, runtime.handle().clone())?;
    let cjk_font = config.ui.cjk_font.clone();

    eframe::run_native(
        "L'Atelier du Journal",
        eframe::NativeOptions::default(),
        Box::new(move |cc| {
            ui::install_fonts(&cc.egui_ctx, cjk_font.as_deref());
            Ok(Box::new(JournalApp::new(controller)))
        }),
    )?;

    info!("latelier exiting");
    Ok(())
}
