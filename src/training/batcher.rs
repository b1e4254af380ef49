use burn::data::dataloader::batcher::Batcher;
use burn::prelude::*;

use crate::data::preprocess::{CHANNELS, IMAGE_SIZE};

// ---------------------------------------------------------------------------
// Batching
// ---------------------------------------------------------------------------

/// A single training example: preprocessed (and possibly augmented) samples
/// in CHW layout plus the class index.
#[derive(Clone, Debug)]
pub struct FluxItem {
    /// Flattened image, length `CHANNELS * IMAGE_SIZE * IMAGE_SIZE`.
    pub image: Vec<f32>,
    /// Class index (0 = without flux, 1 = with flux).
    pub label: usize,
}

/// A batch ready for the model.
#[derive(Clone, Debug)]
pub struct FluxBatch<B: Backend> {
    /// Images with shape `[batch, 3, 100, 100]`.
    pub images: Tensor<B, 4>,
    /// Class indices with shape `[batch]`.
    pub targets: Tensor<B, 1, Int>,
}

/// Stacks [`FluxItem`]s into tensors. The pipeline already normalizes
/// intensities to [0, 1], so no further scaling happens here.
#[derive(Clone, Debug, Default)]
pub struct FluxBatcher;

impl<B: Backend> Batcher<B, FluxItem, FluxBatch<B>> for FluxBatcher {
    fn batch(&self, items: Vec<FluxItem>, device: &B::Device) -> FluxBatch<B> {
        let batch_size = items.len();

        let images_data: Vec<f32> = items.iter().flat_map(|item| item.image.clone()).collect();
        let images = Tensor::<B, 4>::from_floats(
            TensorData::new(images_data, [batch_size, CHANNELS, IMAGE_SIZE, IMAGE_SIZE]),
            device,
        );

        let targets_data: Vec<i64> = items.iter().map(|item| item.label as i64).collect();
        let targets =
            Tensor::<B, 1, Int>::from_data(TensorData::new(targets_data, [batch_size]), device);

        FluxBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DefaultBackend;

    #[test]
    fn batch_shapes_match_item_count() {
        let device = Default::default();
        let items: Vec<FluxItem> = (0..3)
            .map(|i| FluxItem {
                image: vec![0.5; CHANNELS * IMAGE_SIZE * IMAGE_SIZE],
                label: i % 2,
            })
            .collect();

        let batch: FluxBatch<DefaultBackend> = FluxBatcher.batch(items, &device);

        assert_eq!(batch.images.dims(), [3, CHANNELS, IMAGE_SIZE, IMAGE_SIZE]);
        assert_eq!(batch.targets.dims(), [3]);
    }

    #[test]
    fn targets_preserve_labels() {
        let device = Default::default();
        let items = vec![
            FluxItem {
                image: vec![0.0; CHANNELS * IMAGE_SIZE * IMAGE_SIZE],
                label: 1,
            },
            FluxItem {
                image: vec![0.0; CHANNELS * IMAGE_SIZE * IMAGE_SIZE],
                label: 0,
            },
        ];

        let batch: FluxBatch<DefaultBackend> = FluxBatcher.batch(items, &device);
        let targets: Vec<i64> = batch.targets.into_data().to_vec().unwrap();

        assert_eq!(targets, vec![1, 0]);
    }
}
