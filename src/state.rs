use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;

use crate::backend::{default_device, TrainingBackend};
use crate::training::{run_training, EpochReport, TrainConfig, TrainReport};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Messages sent from the training worker back to the UI thread.
pub enum TrainEvent {
    Epoch(EpochReport),
    Finished(Result<TrainReport, String>),
}

/// A training run in flight on a worker thread.
pub struct TrainingHandle {
    receiver: Receiver<TrainEvent>,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Folder of images labeled "with flux" (None until selected).
    pub with_flux_dir: Option<PathBuf>,

    /// Folder of images labeled "without flux".
    pub without_flux_dir: Option<PathBuf>,

    /// Folder the trained model is written to.
    pub output_dir: Option<PathBuf>,

    /// Raw epoch-count entry, validated when Start is pressed.
    pub epochs_text: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Per-epoch progress of the current or last run.
    pub epoch_reports: Vec<EpochReport>,

    /// Where the last completed run saved its model.
    pub last_model_path: Option<PathBuf>,

    /// Whether a training run is in progress.
    training: Option<TrainingHandle>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            with_flux_dir: None,
            without_flux_dir: None,
            output_dir: None,
            epochs_text: String::new(),
            status_message: None,
            epoch_reports: Vec::new(),
            last_model_path: None,
            training: None,
        }
    }
}

impl AppState {
    /// Whether a run is currently executing.
    pub fn is_training(&self) -> bool {
        self.training.is_some()
    }

    /// Validate the form into a run configuration.
    ///
    /// Built once per Start press and passed by value into the pipeline;
    /// the pipeline never reads form state directly.
    pub fn build_config(&self) -> Result<TrainConfig, String> {
        let with_flux_dir = self
            .with_flux_dir
            .clone()
            .ok_or("Select a With Flux folder first")?;
        let without_flux_dir = self
            .without_flux_dir
            .clone()
            .ok_or("Select a Without Flux folder first")?;
        let output_dir = self
            .output_dir
            .clone()
            .ok_or("Select an output folder first")?;
        let epochs: usize = self
            .epochs_text
            .trim()
            .parse()
            .map_err(|_| format!("Invalid epoch count: {:?}", self.epochs_text))?;

        Ok(TrainConfig {
            with_flux_dir,
            without_flux_dir,
            output_dir,
            epochs,
        })
    }

    /// Validate the form and launch the pipeline on a worker thread.
    pub fn start_training(&mut self) {
        if self.is_training() {
            return;
        }

        let config = match self.build_config() {
            Ok(config) => config,
            Err(msg) => {
                self.status_message = Some(msg);
                return;
            }
        };

        self.status_message = None;
        self.epoch_reports.clear();
        self.last_model_path = None;

        let (sender, receiver) = std::sync::mpsc::channel();
        thread::spawn(move || run_worker(config, sender));
        self.training = Some(TrainingHandle { receiver });
    }

    /// Drain pending worker events. Called once per frame.
    pub fn poll_training(&mut self) {
        let Some(handle) = self.training.take() else {
            return;
        };

        let mut finished = false;
        loop {
            match handle.receiver.try_recv() {
                Ok(TrainEvent::Epoch(report)) => self.epoch_reports.push(report),
                Ok(TrainEvent::Finished(result)) => {
                    match result {
                        Ok(report) => {
                            self.status_message = Some(format!(
                                "Model saved ({} epochs run)",
                                report.epochs_run
                            ));
                            self.last_model_path = Some(report.model_path);
                        }
                        Err(msg) => self.status_message = Some(format!("Error: {msg}")),
                    }
                    finished = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.status_message = Some("Error: training worker stopped".to_string());
                    finished = true;
                    break;
                }
            }
        }

        if !finished {
            self.training = Some(handle);
        }
    }
}

fn run_worker(config: TrainConfig, sender: Sender<TrainEvent>) {
    let device = default_device();
    let progress = sender.clone();

    let result = run_training::<TrainingBackend>(&config, &device, |report| {
        let _ = progress.send(TrainEvent::Epoch(report.clone()));
    });

    let _ = sender.send(TrainEvent::Finished(result.map_err(|e| format!("{e:#}"))));
}
