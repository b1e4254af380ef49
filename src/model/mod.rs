/// Model layer: the fixed-architecture flux-stain classifier.
pub mod cnn;

pub use cnn::{FluxClassifier, FluxClassifierConfig};
