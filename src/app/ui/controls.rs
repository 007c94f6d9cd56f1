use eframe::egui::{self, Color32, RichText, Stroke, Ui};

use land_network::interaction::{EmphasisMode, NetworkView};
use land_network::network::{EdgeKind, LandClass};

use super::super::ViewModel;
use super::super::palette::{class_color, cluster_color, edge_color};

const EDGE_KINDS: [EdgeKind; 6] = [
    EdgeKind::Thematic,
    EdgeKind::Geographic,
    EdgeKind::Methodological,
    EdgeKind::Temporal,
    EdgeKind::Institutional,
    EdgeKind::Other,
];

fn class_filter_label(filter: Option<LandClass>) -> &'static str {
    filter.map_or("All", LandClass::label)
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui, view: &mut NetworkView) {
        ui.heading("Network Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search project")
            .on_hover_text("Fuzzy match against project names and ids.");
        let search_response = ui.text_edit_singleline(&mut self.search);
        let best_match = view.search(&self.search);
        if let Some(index) = best_match
            && let Some(node) = view.graph().nodes.get(index)
        {
            let id = node.id.clone();
            let label = node.display_name().to_owned();
            let submitted = search_response.lost_focus()
                && ui.input(|input| input.key_pressed(egui::Key::Enter));
            if ui.link(format!("Go to {label}")).clicked() || submitted {
                view.select_node(&id);
                self.focus = Some(index);
            }
        } else if !self.search.trim().is_empty() {
            ui.small("No project matches.");
        }

        ui.separator();

        let mut filter = match view.mode() {
            EmphasisMode::Filter(class) => Some(class),
            _ => None,
        };
        let previous = filter;
        egui::ComboBox::from_label("Land intensity")
            .selected_text(class_filter_label(filter))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut filter, None, "All");
                for class in LandClass::ALL {
                    ui.selectable_value(&mut filter, Some(class), class.label());
                }
            });
        if filter != previous {
            view.filter_by_class(filter);
        }

        ui.add_space(6.0);
        ui.label(RichText::new("Clusters").strong());
        let clusters = view
            .graph()
            .clusters
            .iter()
            .map(|cluster| (cluster.name.clone(), cluster.projects.len()))
            .collect::<Vec<_>>();
        if clusters.is_empty() {
            ui.small("The analysis proposed no clusters.");
        }
        let mut clicked_cluster = None;
        ui.horizontal_wrapped(|ui| {
            for (index, (name, members)) in clusters.iter().enumerate() {
                let color = cluster_color(index);
                let active = view.mode() == EmphasisMode::Cluster(index);
                let badge = egui::Button::new(
                    RichText::new(format!("{name} ({members})")).color(color),
                )
                .fill(color.gamma_multiply(if active { 0.35 } else { 0.13 }))
                .stroke(Stroke::new(1.0, color.gamma_multiply(0.27)));
                if ui.add(badge).clicked() {
                    clicked_cluster = Some(index);
                }
            }
        });
        if let Some(index) = clicked_cluster {
            view.select_cluster(index);
        }

        ui.add_space(6.0);
        let reset = ui.add_enabled(view.mode() != EmphasisMode::None, egui::Button::new("Show all"));
        if reset.clicked() {
            view.reset_emphasis();
        }

        ui.separator();
        ui.label(RichText::new("Legend").strong());
        for class in LandClass::ALL {
            ui.horizontal(|ui| {
                swatch(ui, class_color(class));
                ui.label(format!("{} land intensity", class.label()));
            });
        }
        ui.add_space(4.0);
        for kind in EDGE_KINDS {
            ui.horizontal(|ui| {
                swatch(ui, edge_color(kind));
                ui.label(kind.label());
            });
        }
        ui.small("Solid: strength 7+, dashed: 4-6, dotted: 3 or less.");
    }
}

fn swatch(ui: &mut Ui, color: Color32) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
    ui.painter().circle_filled(rect.center(), 5.0, color);
}
