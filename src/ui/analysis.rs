//! Rendering of one diary analysis.

use eframe::egui;
use egui::{Color32, RichText};

use super::{role_color, speech_button, ACCENT};
use crate::app::{Action, AppState};
use crate::model::{DiaryAnalysis, SegmentRole};
use crate::speech::PlaybackSpeed;

pub(super) fn show(
    ui: &mut egui::Ui,
    state: &AppState,
    analysis: &DiaryAnalysis,
    actions: &mut Vec<Action>,
) {
    let player = state.speech();

    section(ui, |ui| {
        ui.horizontal(|ui| {
            ui.heading(RichText::new("Version Française").strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                speech_button(ui, player, &analysis.translated_text, actions);
                for speed in PlaybackSpeed::ALL.into_iter().rev() {
                    if ui
                        .selectable_label(player.speed() == speed, speed.label())
                        .clicked()
                    {
                        actions.push(Action::SetSpeed(speed));
                    }
                }
            });
        });
        ui.separator();

        segments(ui, state, analysis, actions);
        legend(ui);

        if let Some(note) = analysis.cultural_note() {
            ui.add_space(8.0);
            egui::Frame::group(ui.style())
                .fill(Color32::from_rgb(255, 251, 235))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(RichText::new(format!("💡 {note}")).italics().color(Color32::from_rgb(146, 64, 14)));
                });
        }
    });

    ui.columns(2, |columns| {
        section(&mut columns[0], |ui| {
            title(ui, "GRAMMAIRE");
            for gp in &analysis.grammar_points {
                ui.label(RichText::new(&gp.point).strong().color(ACCENT));
                ui.label(RichText::new(&gp.explanation).small());
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&gp.example).monospace());
                    speech_button(ui, player, &gp.example, actions);
                });
                ui.add_space(6.0);
            }
        });
        section(&mut columns[1], |ui| {
            title(ui, "CONJUGAISON");
            for vc in &analysis.verb_conjugations {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&vc.infinitive).strong().color(Color32::from_rgb(22, 101, 52)));
                    speech_button(ui, player, &vc.infinitive, actions);
                    ui.label(RichText::new(&vc.group).small().background_color(Color32::from_rgb(187, 247, 208)));
                });
                ui.label(RichText::new(vc.tense.to_uppercase()).small().color(Color32::from_rgb(21, 128, 61)));
                ui.label(RichText::new(&vc.explanation).small().italics());
                ui.add_space(6.0);
            }
        });
    });

    section(ui, |ui| {
        title(ui, "LEXIQUE COMPLET");
        for (pos, items) in analysis.vocabulary_by_pos() {
            ui.label(RichText::new(pos.to_uppercase()).small().strong().color(Color32::from_rgb(251, 113, 133)));
            for vocab in items {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&vocab.word).strong());
                    speech_button(ui, player, &vocab.word, actions);
                    if let Some(badge) = vocab.gender_kind().badge() {
                        ui.label(RichText::new(badge).small().background_color(Color32::from_rgb(241, 245, 249)));
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(RichText::new(&vocab.meaning).italics().color(Color32::GRAY));
                    });
                });
            }
            ui.add_space(6.0);
        }
    });

    section(ui, |ui| {
        title(ui, "EXPRESSIONS IDIOMATIQUES");
        for expr in &analysis.fixed_expressions {
            ui.horizontal(|ui| {
                ui.label(RichText::new(&expr.expression).strong().color(Color32::from_rgb(120, 53, 15)));
                speech_button(ui, player, &expr.expression, actions);
            });
            ui.label(&expr.meaning);
            ui.label(RichText::new(format!("Contexte : {}", expr.context)).small().italics().color(Color32::GRAY));
            ui.add_space(6.0);
        }
    });
}

fn segments(ui: &mut egui::Ui, state: &AppState, analysis: &DiaryAnalysis, actions: &mut Vec<Action>) {
    let selected = state.selected_segment_index();
    let mut segment_clicked = false;

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for (index, segment) in analysis.segmented_text.iter().enumerate() {
            let mut text = RichText::new(&segment.text)
                .size(20.0)
                .italics()
                .color(role_color(segment.role));
            if selected == Some(index) {
                text = text.background_color(Color32::from_rgb(224, 231, 255));
            }
            let response = ui.add(egui::Label::new(text).sense(egui::Sense::click()));
            if response.on_hover_text(segment.role.label()).clicked() {
                segment_clicked = true;
                actions.push(Action::ToggleSegment(index));
            }
        }
    });

    let Some(segment) = state.selected_segment() else {
        return;
    };

    ui.add_space(8.0);
    let panel = egui::Frame::group(ui.style())
        .stroke(egui::Stroke::new(1.0, ACCENT))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(segment.text.trim()).strong().size(18.0));
                speech_button(ui, state.speech(), &segment.text, actions);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✕").clicked() {
                        actions.push(Action::CloseSegmentPanel);
                    }
                });
            });
            ui.label(RichText::new(segment.role.label()).small().strong().color(role_color(segment.role)));
            ui.add_space(4.0);
            ui.label(RichText::new("TRADUCTION").small().color(Color32::GRAY));
            ui.label(format!("🇨🇳 {}", segment.meaning_cn));
            ui.label(format!("🇬🇧 {}", segment.meaning_en));
            ui.add_space(4.0);
            ui.label(RichText::new("NOTE GRAMMATICALE").small().color(ACCENT));
            ui.label(RichText::new(&segment.grammar_info).italics());
        });

    let panel_rect = panel.response.rect;
    let clicked_outside = ui.input(|i| {
        i.pointer.any_click()
            && i.pointer
                .interact_pos()
                .is_some_and(|pos| !panel_rect.contains(pos))
    });
    if clicked_outside && !segment_clicked {
        actions.push(Action::CloseSegmentPanel);
    }
}

fn legend(ui: &mut egui::Ui) {
    ui.add_space(8.0);
    ui.horizontal_wrapped(|ui| {
        for (role, label) in [
            (SegmentRole::Subject, "Sujet / Objet"),
            (SegmentRole::Predicate, "Prédicat"),
            (SegmentRole::Preposition, "Préposition"),
        ] {
            ui.label(RichText::new("●").color(role_color(role)));
            ui.label(RichText::new(label).small().color(Color32::GRAY));
            ui.add_space(8.0);
        }
        ui.label(
            RichText::new("Cliquez sur un segment pour plus de détails")
                .small()
                .italics()
                .color(Color32::GRAY),
        );
    });
}

fn section(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        add_contents(ui);
    });
    ui.add_space(12.0);
}

fn title(ui: &mut egui::Ui, text: &str) {
    ui.label(RichText::new(text).strong());
    ui.add_space(6.0);
}

