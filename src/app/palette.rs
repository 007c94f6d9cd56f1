use eframe::egui::Color32;

use land_network::network::{EdgeKind, LandClass, RoutePotential};

pub(super) const OUTLINE_COLOR: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x1a);
pub(super) const OUTLINE_WIDTH: f32 = 3.0;
pub(super) const NODE_STROKE_COLOR: Color32 = Color32::WHITE;
pub(super) const NODE_STROKE_WIDTH: f32 = 2.0;

const BLUE: Color32 = Color32::from_rgb(0x20, 0x78, 0xb4);
const GREEN: Color32 = Color32::from_rgb(0x27, 0xae, 0x60);
const ORANGE: Color32 = Color32::from_rgb(0xf3, 0x9c, 0x12);
const PURPLE: Color32 = Color32::from_rgb(0x8e, 0x44, 0xad);
const RED: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);

const CLUSTER_COLORS: [Color32; 8] = [
    BLUE,
    GREEN,
    ORANGE,
    PURPLE,
    RED,
    Color32::from_rgb(0x34, 0x98, 0xdb),
    Color32::from_rgb(0xe6, 0x7e, 0x22),
    Color32::from_rgb(0x1a, 0xbc, 0x9c),
];

pub(super) fn class_color(class: LandClass) -> Color32 {
    match class {
        LandClass::High => RED,
        LandClass::Medium => ORANGE,
        LandClass::Low => BLUE,
    }
}

pub(super) fn edge_color(kind: EdgeKind) -> Color32 {
    match kind {
        EdgeKind::Thematic => BLUE,
        EdgeKind::Geographic => GREEN,
        EdgeKind::Methodological => ORANGE,
        EdgeKind::Temporal => PURPLE,
        EdgeKind::Institutional => RED,
        EdgeKind::Other => Color32::from_gray(0x99),
    }
}

/// Badge colour; cycles once there are more clusters than colours.
pub(super) fn cluster_color(index: usize) -> Color32 {
    CLUSTER_COLORS[index % CLUSTER_COLORS.len()]
}

pub(super) fn route_color(potential: RoutePotential) -> Color32 {
    match potential {
        RoutePotential::High => GREEN,
        RoutePotential::Medium => ORANGE,
        RoutePotential::Low => RED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_palette_wraps() {
        assert_eq!(cluster_color(0), cluster_color(8));
        assert_ne!(cluster_color(0), cluster_color(1));
    }

    #[test]
    fn untyped_edges_are_grey() {
        assert_eq!(edge_color(EdgeKind::Other), Color32::from_rgb(0x99, 0x99, 0x99));
        assert_eq!(class_color(LandClass::High), edge_color(EdgeKind::Institutional));
    }
}
