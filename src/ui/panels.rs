use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar with the run status.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Flux Stain Detector");

        ui.separator();

        if state.is_training() {
            ui.spinner();
            ui.label("Training…");
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::DARK_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Central form panel
// ---------------------------------------------------------------------------

/// Render the training form: three folder pickers, the epoch entry, the
/// Start action, and the progress log.
pub fn form_panel(ui: &mut Ui, state: &mut AppState) {
    let busy = state.is_training();

    folder_row(ui, "With Flux Folder:", &mut state.with_flux_dir, busy);
    folder_row(ui, "Without Flux Folder:", &mut state.without_flux_dir, busy);
    folder_row(ui, "Output Folder:", &mut state.output_dir, busy);

    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Number of Epochs:");
        ui.add_enabled(
            !busy,
            egui::TextEdit::singleline(&mut state.epochs_text).desired_width(80.0),
        );
    });

    ui.add_space(8.0);

    if ui
        .add_enabled(!busy, egui::Button::new("Start Training"))
        .clicked()
    {
        state.start_training();
    }

    ui.separator();

    // ---- Progress log ----
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for report in &state.epoch_reports {
                ui.label(format!(
                    "Epoch {}/{}  loss {:.4}  acc {:.1}%  val loss {:.4}  val acc {:.1}%",
                    report.epoch,
                    report.total_epochs,
                    report.train_loss,
                    100.0 * report.train_accuracy,
                    report.val_loss,
                    100.0 * report.val_accuracy,
                ));
            }

            if let Some(path) = &state.last_model_path {
                ui.add_space(4.0);
                ui.strong(format!("Saved: {}", path.display()));
            }
        });
}

/// One labeled folder picker: label, chosen path (or "Not selected"), and a
/// Browse button opening the native directory dialog.
fn folder_row(ui: &mut Ui, label: &str, target: &mut Option<PathBuf>, busy: bool) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);

        let shown = target
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "Not selected".to_string());
        ui.monospace(shown);

        if ui
            .add_enabled(!busy, egui::Button::new("Browse…"))
            .clicked()
        {
            let picked = rfd::FileDialog::new()
                .set_title(format!("Select {}", label.trim_end_matches(':')))
                .pick_folder();
            if let Some(path) = picked {
                *target = Some(path);
            }
        }
    });
}
