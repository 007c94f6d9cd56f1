use eframe::egui::{self, Context, Vec2};
use serde_json::Value;

use land_network::interaction::NetworkView;
use land_network::pipeline::{AnalysisRequest, AnalysisSession, Language, SessionState};

mod graph;
mod palette;
mod render_utils;
mod ui;

const MIN_ZOOM: f32 = 0.3;
const MAX_ZOOM: f32 = 4.0;

pub struct NetworkApp {
    session: AnalysisSession,
    projects: Option<Vec<Value>>,
    language: Language,
    notice: Option<String>,
    model: ViewModel,
}

/// Per-window view state that is not part of the analysis itself.
struct ViewModel {
    pan: Vec2,
    zoom: f32,
    search: String,
    /// Node to centre on during the next graph draw.
    focus: Option<usize>,
    generation: u64,
}

impl ViewModel {
    fn new() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            search: String::new(),
            focus: None,
            generation: 0,
        }
    }

    /// Drops view state that belonged to a previous graph.
    fn sync_generation(&mut self, generation: u64) {
        if self.generation != generation {
            *self = Self {
                generation,
                ..Self::new()
            };
        }
    }
}

/// Actions collected while drawing and applied once the frame's borrows end.
#[derive(Default)]
struct FrameActions {
    generate: bool,
    cancel: bool,
    language: Option<Language>,
}

impl NetworkApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        session: AnalysisSession,
        projects: Option<Vec<Value>>,
        language: Language,
    ) -> Self {
        Self {
            session,
            projects,
            language,
            notice: None,
            model: ViewModel::new(),
        }
    }

    fn start_analysis(&mut self) {
        let Some(projects) = self.projects.clone() else {
            self.notice = Some("Load a project snapshot with --projects first.".to_owned());
            return;
        };

        match AnalysisRequest::new(projects, self.language) {
            Ok(request) => {
                self.notice = None;
                self.session.begin(request);
            }
            Err(error) => self.notice = Some(error.user_message()),
        }
    }

    fn apply(&mut self, actions: FrameActions) {
        if let Some(language) = actions.language {
            self.language = language;
        }
        if actions.cancel {
            self.session.cancel();
        }
        if actions.generate {
            self.start_analysis();
        }
    }
}

impl eframe::App for NetworkApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.session.poll();
        self.model.sync_generation(self.session.generation());

        let mut actions = FrameActions::default();
        let can_generate =
            self.session.can_request() && self.projects.is_some() && !self.session.is_loading();
        ui::panels::draw_top_bar(
            ctx,
            self.session.view(),
            self.language,
            can_generate,
            self.notice.as_deref(),
            &mut actions,
        );

        match self.session.state() {
            SessionState::Empty => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("No network loaded");
                        ui.add_space(8.0);
                        ui.label("Generate an analysis from the loaded projects, or start with --payload.");
                    });
                });
            }
            SessionState::Loading => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Generating network analysis...");
                        ui.add_space(8.0);
                        ui.spinner();
                        ui.add_space(8.0);
                        if ui.button("Cancel").clicked() {
                            actions.cancel = true;
                        }
                    });
                });
                ctx.request_repaint();
            }
            SessionState::Failed(error) => {
                let message = error.user_message();
                let raw = error.raw_response().map(str::to_owned);
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Network analysis failed");
                    ui.add_space(6.0);
                    ui.label(message);
                    if let Some(raw) = raw {
                        ui.collapsing("Raw response", |ui| {
                            egui::ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                                ui.monospace(raw);
                            });
                        });
                    }
                    ui.add_space(10.0);
                    if ui
                        .add_enabled(can_generate, egui::Button::new("Retry"))
                        .clicked()
                    {
                        actions.generate = true;
                    }
                });
            }
            SessionState::Ready(_) => {
                if let Some(view) = self.session.view_mut() {
                    self.model.show(ctx, view);
                }
            }
        }

        self.apply(actions);
    }
}

impl ViewModel {
    fn show(&mut self, ctx: &Context, view: &mut NetworkView) {
        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui, view));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| self.draw_details(ui, view));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui, view));
    }
}
