// ---------------------------------------------------------------------------
// Early stopping on validation loss
// ---------------------------------------------------------------------------

/// Stops training once the monitored validation loss has not improved for
/// `patience` consecutive epochs.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best_loss: f64,
    epochs_since_improvement: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_loss: f64::INFINITY,
            epochs_since_improvement: 0,
        }
    }

    /// Record an epoch's validation loss. Returns `true` when training
    /// should stop.
    pub fn should_stop(&mut self, val_loss: f64) -> bool {
        if val_loss < self.best_loss {
            self.best_loss = val_loss;
            self.epochs_since_improvement = 0;
        } else {
            self.epochs_since_improvement += 1;
        }
        self.epochs_since_improvement >= self.patience
    }

    /// Best validation loss seen so far.
    pub fn best_loss(&self) -> f64 {
        self.best_loss
    }
}
