use eframe::egui::{self, Align, Color32, Context, Layout};

use land_network::interaction::NetworkView;
use land_network::pipeline::Language;

use super::super::FrameActions;

pub(in crate::app) fn draw_top_bar(
    ctx: &Context,
    view: Option<&NetworkView>,
    language: Language,
    can_generate: bool,
    notice: Option<&str>,
    actions: &mut FrameActions,
) {
    egui::TopBottomPanel::top("top_bar")
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Land Network");
                ui.separator();

                let mut selected = language;
                ui.selectable_value(&mut selected, Language::Spanish, "ES")
                    .on_hover_text("Ask for the analysis in Spanish.");
                ui.selectable_value(&mut selected, Language::English, "EN")
                    .on_hover_text("Ask for the analysis in English.");
                if selected != language {
                    actions.language = Some(selected);
                }

                let generate = ui
                    .add_enabled(can_generate, egui::Button::new("Generate network"))
                    .on_disabled_hover_text(
                        "Needs a configured endpoint, a project snapshot and no request in flight.",
                    );
                if generate.clicked() {
                    actions.generate = true;
                }

                if let Some(view) = view {
                    let graph = view.graph();
                    ui.separator();
                    ui.label(format!("nodes: {}", graph.nodes.len()));
                    ui.label(format!("edges: {}", graph.edges.len()));
                    ui.label(format!("clusters: {}", graph.clusters.len()));
                }

                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if let Some(notice) = notice {
                        ui.colored_label(Color32::from_rgb(0xe7, 0x4c, 0x3c), notice);
                    }
                    if let Some(view) = view {
                        ui.label(format!(
                            "layout: {:?} (alpha {:.3})",
                            view.simulation().state(),
                            view.simulation().alpha()
                        ));
                    }
                });
            });
        });
}
