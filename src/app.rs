use std::time::Duration;

use eframe::egui;

use crate::settings::Settings;
use crate::state::AppState;
use crate::ui::{dashboard, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HrDashboardApp {
    pub state: AppState,
}

impl HrDashboardApp {
    /// Create the app and start loading the configured source.
    pub fn new(settings: &Settings) -> Self {
        let mut state = AppState::new(settings);
        state.start_load(settings.source());
        Self { state }
    }
}

impl eframe::App for HrDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_load();
        if self.state.loading {
            // Keep polling the loader thread.
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters and search ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard::central_page(ui, &self.state);
        });
    }
}
