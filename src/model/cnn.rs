//! CNN architecture for binary flux-stain classification.
//!
//! The topology is fixed: two convolution+pooling stages, a dense hidden
//! layer with dropout, and a 2-way output. Nothing is user-configurable.

use burn::{
    config::Config,
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig, Linear, LinearConfig, Relu,
    },
    tensor::{backend::Backend, Tensor},
};

use crate::data::preprocess::{CHANNELS, IMAGE_SIZE};
use crate::data::split::NUM_CLASSES;

/// Configuration for the flux-stain classifier.
#[derive(Config, Debug)]
pub struct FluxClassifierConfig {
    /// Number of output classes.
    #[config(default = "2")]
    pub num_classes: usize,

    /// Input image size (square).
    #[config(default = "100")]
    pub input_size: usize,

    /// Number of input channels.
    #[config(default = "3")]
    pub in_channels: usize,

    /// Dropout rate before the output layer.
    #[config(default = "0.5")]
    pub dropout_rate: f64,
}

impl Default for FluxClassifierConfig {
    fn default() -> Self {
        Self::new()
            .with_num_classes(NUM_CLASSES)
            .with_input_size(IMAGE_SIZE)
            .with_in_channels(CHANNELS)
    }
}

/// Binary flux-stain classifier.
///
/// Architecture:
/// Conv(32, 3×3) → ReLU → MaxPool(2×2) → Conv(64, 3×3) → ReLU → MaxPool(2×2)
/// → flatten → Linear(128) → ReLU → Dropout(0.5) → Linear(2)
///
/// Convolutions use valid padding, so each stage shrinks the spatial size by
/// 2 before halving it.
#[derive(Module, Debug)]
pub struct FluxClassifier<B: Backend> {
    conv1: Conv2d<B>,
    pool1: MaxPool2d,
    conv2: Conv2d<B>,
    pool2: MaxPool2d,
    fc1: Linear<B>,
    dropout: Dropout,
    fc2: Linear<B>,
}

impl<B: Backend> FluxClassifier<B> {
    /// Create a classifier from configuration.
    pub fn new(config: &FluxClassifierConfig, device: &B::Device) -> Self {
        let conv1 = Conv2dConfig::new([config.in_channels, 32], [3, 3]).init(device);
        let pool1 = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();
        let conv2 = Conv2dConfig::new([32, 64], [3, 3]).init(device);
        let pool2 = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();

        // Spatial size after each conv (valid padding) + pool stage.
        let s1 = (config.input_size - 2) / 2;
        let s2 = (s1 - 2) / 2;
        let flat = 64 * s2 * s2;

        let fc1 = LinearConfig::new(flat, 128).init(device);
        let dropout = DropoutConfig::new(config.dropout_rate).init();
        let fc2 = LinearConfig::new(128, config.num_classes).init(device);

        Self {
            conv1,
            pool1,
            conv2,
            pool2,
            fc1,
            dropout,
            fc2,
        }
    }

    /// Forward pass.
    ///
    /// Input shape `[batch, channels, height, width]`, output logits of shape
    /// `[batch, num_classes]`. The loss applies the softmax.
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.conv1.forward(x);
        let x = Relu::new().forward(x);
        let x = self.pool1.forward(x);

        let x = self.conv2.forward(x);
        let x = Relu::new().forward(x);
        let x = self.pool2.forward(x);

        let [batch, channels, h, w] = x.dims();
        let x = x.reshape([batch, channels * h * w]);

        let x = self.fc1.forward(x);
        let x = Relu::new().forward(x);
        let x = self.dropout.forward(x);
        self.fc2.forward(x)
    }

    /// Forward pass with softmax applied, for probability readouts.
    pub fn forward_softmax(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        burn::tensor::activation::softmax(self.forward(x), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DefaultBackend;

    #[test]
    fn output_shape_is_batch_by_classes() {
        let device = Default::default();
        let config = FluxClassifierConfig::default();
        let model = FluxClassifier::<DefaultBackend>::new(&config, &device);

        let input = Tensor::<DefaultBackend, 4>::zeros([2, 3, 100, 100], &device);
        let output = model.forward(input);

        assert_eq!(output.dims(), [2, 2]);
    }

    #[test]
    fn softmax_rows_sum_to_one() {
        let device = Default::default();
        let config = FluxClassifierConfig::default();
        let model = FluxClassifier::<DefaultBackend>::new(&config, &device);

        let input = Tensor::<DefaultBackend, 4>::ones([1, 3, 100, 100], &device);
        let probs = model.forward_softmax(input);
        let sum: f32 = probs.sum().into_scalar();

        assert!((sum - 1.0).abs() < 1e-4);
    }
}
