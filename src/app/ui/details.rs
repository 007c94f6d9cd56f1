use eframe::egui::{self, Color32, RichText, Ui};

use land_network::interaction::{
    ClusterDetail, ClusterSummary, DetailView, NetworkView, NodeDetail, Overview,
};
use land_network::network::ValidationReport;

use super::super::ViewModel;
use super::super::palette::{class_color, cluster_color, edge_color, route_color};

/// Deferred click in the details panel, applied after the detail snapshot is drawn.
enum DetailClick {
    Node(String),
    Cluster(usize),
    ShowAll,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui, view: &mut NetworkView) {
        let detail = view.detail();
        let report = view.graph().report;
        let mut click = None;

        egui::ScrollArea::vertical()
            .id_salt("details_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| match &detail {
                DetailView::Overview(overview) => draw_overview(ui, overview, &report, &mut click),
                DetailView::Node(node) => draw_node(ui, node, &mut click),
                DetailView::Cluster(cluster) => draw_cluster(ui, cluster, &mut click),
            });

        match click {
            Some(DetailClick::Node(id)) => {
                view.select_node(&id);
                self.focus = view.graph().node_index(&id);
            }
            Some(DetailClick::Cluster(index)) => {
                view.select_cluster(index);
            }
            Some(DetailClick::ShowAll) => view.reset_emphasis(),
            None => {}
        }
    }
}

fn draw_overview(
    ui: &mut Ui,
    overview: &Overview,
    report: &ValidationReport,
    click: &mut Option<DetailClick>,
) {
    ui.heading("Network Overview");
    ui.small(format!(
        "{} projects, {} connections",
        overview.node_count, overview.edge_count
    ));
    ui.add_space(6.0);

    ui.label(RichText::new("Cross-cutting findings").strong());
    if overview.findings.is_empty() {
        ui.label("No cross-cutting findings were reported.");
    }
    for finding in &overview.findings {
        ui.label(format!("- {finding}"));
    }

    ui.separator();
    ui.label(RichText::new("Clusters").strong());
    if overview.clusters.is_empty() {
        ui.label("No clusters were proposed.");
    }
    for cluster in &overview.clusters {
        cluster_link(ui, cluster, click);
    }

    if !report.is_clean() {
        ui.separator();
        ui.label(RichText::new("Data repairs").strong())
            .on_hover_text("Parts of the analysis that were dropped or corrected on load.");
        if report.dropped_nodes > 0 {
            ui.label(format!("Nodes dropped: {}", report.dropped_nodes));
        }
        if report.dropped_edges > 0 {
            ui.label(format!("Edges dropped: {}", report.dropped_edges));
        }
        if report.unresolved_cluster_members > 0 {
            ui.label(format!(
                "Cluster members without a node: {}",
                report.unresolved_cluster_members
            ));
        }
        if report.reclassified_nodes > 0 {
            ui.label(format!(
                "Classifications normalized: {}",
                report.reclassified_nodes
            ));
        }
    }
}

fn draw_node(ui: &mut Ui, detail: &NodeDetail, click: &mut Option<DetailClick>) {
    let node = &detail.node;
    ui.heading(node.display_name());
    ui.small(node.id.as_str());
    ui.add_space(6.0);

    field(ui, "Country", &node.country);
    field(ui, "Status", &node.status);
    field(ui, "Sector", &node.sector);

    let score = node
        .land_intensity_score
        .map_or_else(|| "not reported".to_owned(), |score| format!("{score}/10"));
    ui.horizontal(|ui| {
        ui.label("Land intensity:");
        ui.colored_label(
            class_color(node.land_classification),
            format!("{score} ({})", node.land_classification.label()),
        );
    });
    if !node.justification.is_empty() {
        ui.add_space(4.0);
        ui.label(RichText::new(node.justification.as_str()).italics());
    }

    ui.separator();
    ui.label(RichText::new(format!("Connections ({})", detail.connections.len())).strong());
    if detail.connections.is_empty() {
        ui.label("This project has no connections.");
    }
    for connection in &detail.connections {
        ui.horizontal_wrapped(|ui| {
            ui.label(if connection.outgoing { "->" } else { "<-" });
            if ui.link(connection.other_label.as_str()).clicked() {
                *click = Some(DetailClick::Node(connection.other_id.clone()));
            }
            ui.colored_label(
                edge_color(connection.kind),
                format!("{} ({}/10)", connection.kind.label(), connection.strength),
            );
        });
        if !connection.description.is_empty() {
            ui.small(connection.description.as_str());
        }
        ui.add_space(2.0);
    }

    if !detail.clusters.is_empty() {
        ui.separator();
        ui.label(RichText::new("Clusters").strong());
        for cluster in &detail.clusters {
            cluster_link(ui, cluster, click);
        }
    }
}

fn draw_cluster(ui: &mut Ui, detail: &ClusterDetail, click: &mut Option<DetailClick>) {
    let summary = &detail.summary;
    ui.heading(RichText::new(summary.name.as_str()).color(cluster_color(summary.index)));
    ui.add_space(4.0);
    if !summary.description.is_empty() {
        ui.label(summary.description.as_str());
    }

    if let Some(potential) = summary.learning_route_potential {
        ui.horizontal(|ui| {
            ui.label("Learning route potential:");
            ui.colored_label(route_color(potential), potential.label());
        });
    }
    if let Some(text) = &summary.learning_route_description {
        ui.small(text.as_str());
    }
    if let Some(route) = &summary.proposed_route {
        ui.label(RichText::new("Proposed route").strong());
        ui.label(route.as_str());
    }

    ui.separator();
    ui.label(RichText::new(format!("Members ({})", detail.members.len())).strong());
    for member in &detail.members {
        match &member.label {
            Some(label) => {
                ui.horizontal(|ui| {
                    if ui.link(label.as_str()).clicked() {
                        *click = Some(DetailClick::Node(member.id.clone()));
                    }
                    if let Some(country) = &member.country {
                        ui.small(country.as_str());
                    }
                });
            }
            None => {
                ui.colored_label(Color32::GRAY, format!("{} (not in graph)", member.id));
            }
        }
    }

    ui.add_space(8.0);
    if ui.button("Show all").clicked() {
        *click = Some(DetailClick::ShowAll);
    }
}

fn cluster_link(ui: &mut Ui, cluster: &ClusterSummary, click: &mut Option<DetailClick>) {
    ui.horizontal(|ui| {
        let text = RichText::new(format!("{} ({})", cluster.name, cluster.member_count))
            .color(cluster_color(cluster.index));
        if ui.link(text).clicked() {
            *click = Some(DetailClick::Cluster(cluster.index));
        }
    });
}

fn field(ui: &mut Ui, name: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    ui.horizontal(|ui| {
        ui.label(format!("{name}:"));
        ui.label(value);
    });
}
