use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};

// ---------------------------------------------------------------------------
// Burn backend selection
// ---------------------------------------------------------------------------

/// CPU backend used for inference/validation passes.
pub type DefaultBackend = NdArray<f32>;

/// Autodiff wrapper used for training.
pub type TrainingBackend = Autodiff<DefaultBackend>;

/// The default device for the selected backend.
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}
