use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::preprocess::FluxImage;

// ---------------------------------------------------------------------------
// Train/test splitting and label encoding
// ---------------------------------------------------------------------------

/// Fixed seed so the split is reproducible across runs.
pub const SPLIT_SEED: u64 = 42;

/// Fraction of the combined set held out for validation.
pub const TEST_FRACTION: f64 = 0.2;

/// Number of classes (without flux, with flux).
pub const NUM_CLASSES: usize = 2;

/// The four arrays a training run consumes.
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub train_images: Vec<FluxImage>,
    pub test_images: Vec<FluxImage>,
    /// One-hot label rows parallel to `train_images`.
    pub train_labels: Vec<[f32; NUM_CLASSES]>,
    /// One-hot label rows parallel to `test_images`.
    pub test_labels: Vec<[f32; NUM_CLASSES]>,
}

/// Encode a class label as a 2-length indicator vector
/// (index 0 = without flux, index 1 = with flux).
pub fn one_hot(label: usize) -> [f32; NUM_CLASSES] {
    let mut row = [0.0; NUM_CLASSES];
    row[label] = 1.0;
    row
}

/// Recover the class index from a one-hot row.
pub fn class_index(row: &[f32; NUM_CLASSES]) -> usize {
    if row[1] >= row[0] {
        1
    } else {
        0
    }
}

/// Shuffle the combined set with a seeded RNG and cut off `test_fraction`
/// (rounded up) as the held-out partition. The partitions are disjoint and
/// their union is the full input; labels stay paired with their images.
pub fn train_test_split(
    images: Vec<FluxImage>,
    labels: Vec<usize>,
    test_fraction: f64,
    seed: u64,
) -> DatasetSplit {
    assert_eq!(images.len(), labels.len());

    let n = images.len();
    let test_count = ((n as f64) * test_fraction).ceil() as usize;

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut split = DatasetSplit {
        train_images: Vec::with_capacity(n - test_count),
        test_images: Vec::with_capacity(test_count),
        train_labels: Vec::with_capacity(n - test_count),
        test_labels: Vec::with_capacity(test_count),
    };

    // Move images out of the input without cloning pixel buffers.
    let mut slots: Vec<Option<FluxImage>> = images.into_iter().map(Some).collect();

    for (rank, &idx) in indices.iter().enumerate() {
        let image = slots[idx].take().expect("index visited twice");
        let label = one_hot(labels[idx]);
        if rank < test_count {
            split.test_images.push(image);
            split.test_labels.push(label);
        } else {
            split.train_images.push(image);
            split.train_labels.push(label);
        }
    }

    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::preprocess::{CHANNELS, IMAGE_SIZE};

    /// An image whose first sample encodes `marker`, so partition membership
    /// can be traced back to the input.
    fn marked_image(marker: usize) -> FluxImage {
        let mut data = vec![0.0f32; CHANNELS * IMAGE_SIZE * IMAGE_SIZE];
        data[0] = marker as f32;
        FluxImage::from_data(data)
    }

    fn markers(images: &[FluxImage]) -> Vec<usize> {
        images.iter().map(|img| img.data[0] as usize).collect()
    }

    #[test]
    fn one_hot_rows_sum_to_one() {
        for label in 0..NUM_CLASSES {
            let row = one_hot(label);
            assert_eq!(row.len(), NUM_CLASSES);
            assert_eq!(row.iter().sum::<f32>(), 1.0);
            assert_eq!(row[label], 1.0);
            assert_eq!(class_index(&row), label);
        }
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let n = 20;
        let images: Vec<_> = (0..n).map(marked_image).collect();
        let labels: Vec<_> = (0..n).map(|i| i % 2).collect();

        let split = train_test_split(images, labels, TEST_FRACTION, SPLIT_SEED);

        assert_eq!(split.train_images.len(), 16);
        assert_eq!(split.test_images.len(), 4);
        assert_eq!(split.train_labels.len(), 16);
        assert_eq!(split.test_labels.len(), 4);

        let mut seen: Vec<usize> = markers(&split.train_images);
        seen.extend(markers(&split.test_images));
        seen.sort_unstable();
        assert_eq!(seen, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn labels_stay_paired_with_their_images() {
        let n = 10;
        let images: Vec<_> = (0..n).map(marked_image).collect();
        // Even markers → label 0, odd markers → label 1.
        let labels: Vec<_> = (0..n).map(|i| i % 2).collect();

        let split = train_test_split(images, labels, TEST_FRACTION, SPLIT_SEED);

        for (img, row) in split
            .train_images
            .iter()
            .zip(&split.train_labels)
            .chain(split.test_images.iter().zip(&split.test_labels))
        {
            let marker = img.data[0] as usize;
            assert_eq!(class_index(row), marker % 2);
        }
    }

    #[test]
    fn fixed_seed_gives_deterministic_split() {
        let make = || {
            let images: Vec<_> = (0..13).map(marked_image).collect();
            let labels = vec![1; 13];
            train_test_split(images, labels, TEST_FRACTION, SPLIT_SEED)
        };

        let a = make();
        let b = make();
        assert_eq!(markers(&a.test_images), markers(&b.test_images));
        assert_eq!(markers(&a.train_images), markers(&b.train_images));
    }
}
