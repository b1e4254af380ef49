/// Training layer: augmentation, batching, the fit loop, and persistence.
pub mod augment;
pub mod batcher;
pub mod early_stop;
pub mod trainer;

pub use trainer::{run_training, EpochReport, TrainConfig, TrainReport};
