use eframe::egui::{self, Pos2, Rect, Ui};

use land_network::interaction::NetworkView;

use super::super::render_utils::screen_to_world;
use super::super::{MAX_ZOOM, MIN_ZOOM, ViewModel};

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    /// Primary drag on a node pins it; on empty canvas it pans.
    pub(in crate::app) fn handle_graph_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        view: &mut NetworkView,
    ) {
        let pointer = ui.input(|input| input.pointer.interact_pos());

        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(pointer) = pointer
        {
            let world = screen_to_world(rect, self.pan, self.zoom, pointer);
            if let Some(index) = view.node_at(world) {
                view.begin_drag(index, world);
            }
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            match (view.dragging(), pointer) {
                (Some(_), Some(pointer)) => {
                    view.drag_to(screen_to_world(rect, self.pan, self.zoom, pointer));
                }
                (None, _) => self.pan += response.drag_delta(),
                _ => {}
            }
        }

        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }

        if response.drag_stopped() {
            view.end_drag();
        }
    }

    pub(in crate::app) fn hovered_index(
        &self,
        ui: &Ui,
        rect: Rect,
        view: &NetworkView,
    ) -> Option<usize> {
        let pointer: Pos2 = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }
        view.node_at(screen_to_world(rect, self.pan, self.zoom, pointer))
    }

    /// Pans so the given node sits in the middle of the canvas.
    pub(in crate::app) fn center_on(&mut self, view: &NetworkView, index: usize) {
        if let Some(world) = view.simulation().position(index) {
            self.pan = -world * self.zoom;
        }
    }
}
