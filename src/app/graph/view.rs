use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, vec2};

use land_network::interaction::{NetworkView, NodeEmphasis};
use land_network::layout::SimulationState;
use land_network::network::LineStyle;

use super::super::ViewModel;
use super::super::palette::{
    NODE_STROKE_COLOR, NODE_STROKE_WIDTH, OUTLINE_COLOR, OUTLINE_WIDTH, class_color, edge_color,
};
use super::super::render_utils::{
    LABEL_COLOR, SELECTED_COLOR, circle_visible, draw_background, edge_visible, faded,
    world_to_screen,
};

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui, view: &mut NetworkView) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if let Some(index) = self.focus.take() {
            self.center_on(view, index);
        }

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_drag(ui, rect, &response, view);

        if view.tick() == SimulationState::Running {
            ui.ctx().request_repaint();
        }

        let graph = view.graph();
        let emphasis = view.emphasis();
        let simulation = view.simulation();
        let screen_positions = simulation
            .positions()
            .iter()
            .map(|&world| world_to_screen(rect, self.pan, self.zoom, world))
            .collect::<Vec<Pos2>>();

        for (index, edge) in graph.edges.iter().enumerate() {
            let (Some(from), Some(to)) = (
                graph.node_index(&edge.source),
                graph.node_index(&edge.target),
            ) else {
                continue;
            };
            let (start, end) = (screen_positions[from], screen_positions[to]);
            if !edge_visible(rect, start, end, 4.0) {
                continue;
            }

            let opacity = emphasis.edges.get(index).copied().unwrap_or(1.0);
            let stroke = Stroke::new(
                (edge.line_width() * self.zoom.sqrt()).max(0.5),
                faded(edge_color(edge.kind), opacity),
            );
            let dash_scale = self.zoom.sqrt();
            match edge.line_style() {
                LineStyle::Solid => {
                    painter.line_segment([start, end], stroke);
                }
                LineStyle::Dashed => painter.extend(Shape::dashed_line(
                    &[start, end],
                    stroke,
                    6.0 * dash_scale,
                    4.0 * dash_scale,
                )),
                LineStyle::Dotted => painter.extend(Shape::dashed_line(
                    &[start, end],
                    stroke,
                    3.0 * dash_scale,
                    3.0 * dash_scale,
                )),
            }
        }

        let hovered = self.hovered_index(ui, rect, view);
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let selected = view.selected_node();
        for (index, node) in graph.nodes.iter().enumerate() {
            let position = screen_positions[index];
            let radius = node.radius() * self.zoom;
            if !circle_visible(rect, position, radius + 20.0) {
                continue;
            }

            let style = emphasis.nodes.get(index).copied().unwrap_or(NodeEmphasis::REST);
            painter.circle_filled(
                position,
                radius,
                faded(class_color(node.land_classification), style.opacity),
            );

            let stroke = if style.outlined {
                Stroke::new(OUTLINE_WIDTH, OUTLINE_COLOR)
            } else {
                Stroke::new(NODE_STROKE_WIDTH, faded(NODE_STROKE_COLOR, style.opacity))
            };
            painter.circle_stroke(position, radius, stroke);

            if selected == Some(node.id.as_str()) {
                painter.circle_stroke(position, radius + 4.0, Stroke::new(2.0, SELECTED_COLOR));
            }

            if self.zoom > 0.5 || hovered == Some(index) {
                painter.text(
                    position + vec2(0.0, radius + 4.0),
                    Align2::CENTER_TOP,
                    node.display_name(),
                    FontId::proportional(11.0),
                    faded(LABEL_COLOR, style.label_opacity),
                );
            }
        }

        if let Some(index) = hovered
            && let Some(card) = graph.nodes.get(index).and_then(|node| view.hover(&node.id))
        {
            let score = card
                .score
                .map_or_else(|| "-".to_owned(), |score| score.to_string());
            let text = format!(
                "{}\n{}\nLand intensity: {score}/10 ({})",
                card.title,
                card.country,
                card.class.label()
            );
            let anchor = screen_positions[index] + vec2(15.0, -10.0);
            let galley = painter.layout_no_wrap(text, FontId::proportional(12.0), LABEL_COLOR);
            let frame = egui::Rect::from_min_size(anchor, galley.size()).expand(6.0);
            painter.rect_filled(frame, 4.0, Color32::from_rgba_unmultiplied(255, 255, 255, 235));
            painter.rect_stroke(
                frame,
                4.0,
                Stroke::new(1.0, Color32::from_gray(200)),
                egui::StrokeKind::Outside,
            );
            painter.galley(anchor, galley, LABEL_COLOR);
        }

        let clicked_id = response
            .clicked_by(egui::PointerButton::Primary)
            .then_some(hovered)
            .flatten()
            .and_then(|index| graph.nodes.get(index))
            .map(|node| node.id.clone());
        if let Some(id) = clicked_id {
            view.select_node(&id);
        }
    }
}
