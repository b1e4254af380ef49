use eframe::egui;

use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FluxStainApp {
    pub state: AppState,
}

impl Default for FluxStainApp {
    fn default() -> Self {
        Self {
            state: AppState::default(),
        }
    }
}

impl eframe::App for FluxStainApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_training();

        // ---- Top panel: title + status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Central panel: the training form ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::form_panel(ui, &mut self.state);
        });

        // Keep polling worker events while a run is in flight.
        if self.state.is_training() {
            ctx.request_repaint();
        }
    }
}
