//! egui front end.
//!
//! Views read from the controller's state and push [`Action`]s; the actions
//! are applied once the frame is laid out.

mod analysis;
mod history;
mod input;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use egui::{Color32, RichText};
use tracing::{info, warn};

use crate::app::{Action, Controller, ResultPane};
use crate::model::SegmentRole;
use crate::speech::SpeechPlayer;

const CJK_FONT_CANDIDATES: [&str; 5] = [
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
];

const ACCENT: Color32 = Color32::from_rgb(79, 70, 229);

pub struct JournalApp {
    controller: Controller,
    actions: Vec<Action>,
}

impl JournalApp {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            actions: Vec::new(),
        }
    }

    fn modals(&mut self, ctx: &egui::Context) {
        let state = self.controller.state();

        if state.clear_pending() {
            egui::Window::new("Confirmation")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label("Voulez-vous vraiment effacer tout votre historique ?");
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("Effacer").clicked() {
                            self.actions.push(Action::ResolveClearHistory(true));
                        }
                        if ui.button("Annuler").clicked() {
                            self.actions.push(Action::ResolveClearHistory(false));
                        }
                    });
                });
        }

        if let Some(message) = state.speech_alert() {
            egui::Window::new("Synthèse vocale")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.actions.push(Action::DismissSpeechAlert);
                    }
                });
        }
    }
}

impl eframe::App for JournalApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll();

        egui::SidePanel::left("diary_input")
            .resizable(false)
            .exact_width(380.0)
            .show(ctx, |ui| {
                header(ui);
                input::show(ui, self.controller.state(), &mut self.actions);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                let state = self.controller.state();
                match state.result_pane() {
                    ResultPane::Loading => loading(ui),
                    ResultPane::Analysis(result) => analysis::show(ui, state, result, &mut self.actions),
                    ResultPane::Placeholder => placeholder(ui),
                }
                ui.add_space(32.0);
                ui.separator();
                history::show(ui, state, &mut self.actions);
            });
        });

        self.modals(ctx);

        for action in self.actions.drain(..) {
            self.controller.dispatch(action);
        }

        if self.controller.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

/// Add a CJK-capable font so Chinese entries and labels render.
pub fn install_fonts(ctx: &egui::Context, configured: Option<&Path>) {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(CJK_FONT_CANDIDATES.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        let mut fonts = egui::FontDefinitions::default();
        fonts
            .font_data
            .insert("cjk".to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
        for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
            fonts.families.entry(family).or_default().push("cjk".to_owned());
        }
        ctx.set_fonts(fonts);
        info!("Using CJK font {}", path.display());
        return;
    }
    warn!("No CJK font found; Chinese text may not render (set ui.cjk_font)");
}

fn header(ui: &mut egui::Ui) {
    ui.add_space(12.0);
    ui.vertical_centered(|ui| {
        ui.heading(RichText::new("L'Atelier du Journal").strong().size(26.0));
        ui.label(
            RichText::new("« Transformez vos pensées quotidiennes en élégance française. »")
                .italics()
                .color(Color32::GRAY),
        );
    });
    ui.add_space(12.0);
}

fn loading(ui: &mut egui::Ui) {
    ui.add_space(80.0);
    ui.vertical_centered(|ui| {
        ui.add(egui::Spinner::new().size(32.0));
        ui.label(RichText::new("Analyse en cours…").italics().color(Color32::GRAY));
    });
}

fn placeholder(ui: &mut egui::Ui) {
    ui.add_space(80.0);
    ui.vertical_centered(|ui| {
        ui.label(RichText::new("✍").size(40.0));
        ui.label(RichText::new("Prêt à commencer ?").strong().color(Color32::GRAY));
        ui.label(
            RichText::new(
                "Écrivez votre journal en chinois ou en anglais à gauche pour voir la magie opérer.",
            )
            .small()
            .color(Color32::GRAY),
        );
    });
}

pub(crate) fn role_color(role: SegmentRole) -> Color32 {
    match role {
        SegmentRole::Subject | SegmentRole::Object => Color32::from_rgb(29, 78, 216),
        SegmentRole::Predicate => Color32::from_rgb(4, 120, 87),
        SegmentRole::Preposition => Color32::from_rgb(194, 65, 12),
        SegmentRole::Modifier => Color32::from_rgb(147, 51, 234),
        SegmentRole::Connective => Color32::from_rgb(79, 70, 229),
        SegmentRole::Other => Color32::GRAY,
    }
}

/// Play/stop toggle for one French fragment.
pub(crate) fn speech_button(
    ui: &mut egui::Ui,
    player: &SpeechPlayer,
    text: &str,
    actions: &mut Vec<Action>,
) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    let loading = player.is_loading(text);
    let playing = player.is_playing(text);

    let (icon, hint) = if loading {
        ("…", "Chargement")
    } else if playing {
        ("■", "Arrêter")
    } else {
        ("▶", "Écouter")
    };
    let color = if playing { Color32::from_rgb(239, 68, 68) } else { ACCENT };

    let button = egui::Button::new(RichText::new(icon).color(color)).small();
    if ui.add_enabled(!loading, button).on_hover_text(hint).clicked() {
        actions.push(Action::Speak(text.to_string()));
    }
}
