use eframe::egui;
use egui::{Color32, RichText};

use super::ACCENT;
use crate::app::{Action, AppState};

const CARD_WIDTH: f32 = 260.0;

pub(super) fn show(ui: &mut egui::Ui, state: &AppState, actions: &mut Vec<Action>) {
    let history = state.history();
    if history.is_empty() {
        return;
    }

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        ui.heading(RichText::new("Journal de Bord").strong());
        ui.label(
            RichText::new(format!("{} entrées", history.len()))
                .small()
                .color(Color32::GRAY),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let clear = egui::Button::new(RichText::new("Tout effacer").color(Color32::from_rgb(225, 29, 72)));
            if ui.add(clear).clicked() {
                actions.push(Action::RequestClearHistory);
            }
        });
    });
    ui.add_space(8.0);

    let active = state.active_history_id();
    ui.horizontal_wrapped(|ui| {
        for item in history.items() {
            let stroke = if active == Some(item.id.as_str()) {
                egui::Stroke::new(2.0, ACCENT)
            } else {
                egui::Stroke::new(1.0, Color32::from_gray(220))
            };

            egui::Frame::group(ui.style()).stroke(stroke).show(ui, |ui| {
                ui.set_width(CARD_WIDTH);
                ui.horizontal(|ui| {
                    ui.label(RichText::new(item.date_label()).small().color(Color32::GRAY));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✕").on_hover_text("Supprimer").clicked() {
                            actions.push(Action::DeleteHistory(item.id.clone()));
                        }
                    });
                });
                ui.label(item.preview(120));
                ui.add_space(4.0);
                if ui
                    .link(RichText::new("Ouvrir →").small().strong().color(ACCENT))
                    .clicked()
                {
                    actions.push(Action::SelectHistory(item.id.clone()));
                }
            });
        }
    });
}
