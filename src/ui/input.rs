use eframe::egui;
use egui::{Color32, RichText};

use crate::app::{Action, AppState, RequestStatus};

pub(super) fn show(ui: &mut egui::Ui, state: &AppState, actions: &mut Vec<Action>) {
    let loading = state.is_loading();

    ui.label(RichText::new("VOTRE ENTRÉE (CHINOIS OU ANGLAIS)").small().strong());
    ui.add_space(4.0);

    let mut text = state.diary_text().to_owned();
    let edit = egui::TextEdit::multiline(&mut text)
        .desired_rows(14)
        .desired_width(f32::INFINITY)
        .hint_text("Today I visited a cafe and read a book under the sun...");
    if ui.add_enabled(!loading, edit).changed() {
        actions.push(Action::EditText(text.clone()));
    }

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new(format!("{} caractères", text.chars().count()))
                .small()
                .color(Color32::GRAY),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let label = if loading { "Analyse…" } else { "Traduire & Analyser" };
            if ui
                .add_enabled(state.can_submit(), egui::Button::new(label))
                .clicked()
            {
                actions.push(Action::Submit);
            }
            if loading {
                ui.spinner();
            }
        });
    });

    if let Some(message) = state.error_message() {
        ui.add_space(12.0);
        egui::Frame::group(ui.style())
            .fill(Color32::from_rgb(254, 242, 242))
            .stroke(egui::Stroke::new(1.0, Color32::from_rgb(254, 202, 202)))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new("Oups !").strong().color(Color32::from_rgb(185, 28, 28)));
                ui.label(RichText::new(message).color(Color32::from_rgb(185, 28, 28)));
            });
    }

    if state.status() == &RequestStatus::Idle && state.history().is_empty() {
        ui.add_space(24.0);
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new("« Chaque mot est un pas vers la maîtrise. »")
                    .italics()
                    .small()
                    .color(Color32::GRAY),
            );
        });
    }
}
