use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::data::preprocess::{FluxImage, CHANNELS, IMAGE_SIZE};

// ---------------------------------------------------------------------------
// Training-time augmentation
// ---------------------------------------------------------------------------

/// Configuration for the augmenting data feed.
#[derive(Clone, Debug)]
pub struct AugmentConfig {
    /// Maximum rotation in degrees (applied as ±rotation_degrees).
    pub rotation_degrees: f32,
    /// Maximum width/height shift as a fraction of the image size.
    pub shift_fraction: f32,
    /// Whether to randomly mirror horizontally (probability 0.5).
    pub horizontal_flip: bool,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            rotation_degrees: 20.0,
            shift_fraction: 0.2,
            horizontal_flip: true,
        }
    }
}

/// Applies a random rotation, width/height shift, and horizontal flip to a
/// preprocessed image. Validation data is never augmented.
#[derive(Clone, Debug)]
pub struct Augmenter {
    config: AugmentConfig,
}

impl Augmenter {
    pub fn new(config: AugmentConfig) -> Self {
        Self { config }
    }

    /// Produce a randomly transformed copy of `img`.
    ///
    /// A single inverse affine map (rotation about the center plus
    /// translation) is sampled per image and evaluated with bilinear
    /// interpolation; samples falling outside the source are filled with 0.
    pub fn augment(&self, img: &FluxImage, rng: &mut ChaCha8Rng) -> FluxImage {
        let max_rot = self.config.rotation_degrees;
        let angle = if max_rot > 0.0 {
            rng.gen_range(-max_rot..=max_rot).to_radians()
        } else {
            0.0
        };

        let max_shift = self.config.shift_fraction * IMAGE_SIZE as f32;
        let (dx, dy) = if max_shift > 0.0 {
            (
                rng.gen_range(-max_shift..=max_shift),
                rng.gen_range(-max_shift..=max_shift),
            )
        } else {
            (0.0, 0.0)
        };

        let flip = self.config.horizontal_flip && rng.gen::<f32>() < 0.5;

        let center = IMAGE_SIZE as f32 / 2.0;
        let (sin_a, cos_a) = angle.sin_cos();

        let mut data = vec![0.0f32; CHANNELS * IMAGE_SIZE * IMAGE_SIZE];
        for y in 0..IMAGE_SIZE {
            for x in 0..IMAGE_SIZE {
                // Undo the shift, then the rotation, to find the source sample.
                let ox = x as f32 - dx - center;
                let oy = y as f32 - dy - center;
                let mut src_x = center + ox * cos_a + oy * sin_a;
                let src_y = center - ox * sin_a + oy * cos_a;

                if flip {
                    src_x = IMAGE_SIZE as f32 - 1.0 - src_x;
                }

                for c in 0..CHANNELS {
                    data[c * IMAGE_SIZE * IMAGE_SIZE + y * IMAGE_SIZE + x] =
                        bilinear_sample(img, c, src_x, src_y);
                }
            }
        }

        FluxImage { data }
    }
}

/// Bilinear sample of one channel; 0.0 outside the source bounds.
fn bilinear_sample(img: &FluxImage, c: usize, x: f32, y: f32) -> f32 {
    if x < 0.0 || y < 0.0 || x > IMAGE_SIZE as f32 - 1.0 || y > IMAGE_SIZE as f32 - 1.0 {
        return 0.0;
    }

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(IMAGE_SIZE - 1);
    let y1 = (y0 + 1).min(IMAGE_SIZE - 1);

    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let v00 = img.get(c, y0, x0);
    let v10 = img.get(c, y0, x1);
    let v01 = img.get(c, y1, x0);
    let v11 = img.get(c, y1, x1);

    v00 * (1.0 - fx) * (1.0 - fy)
        + v10 * fx * (1.0 - fy)
        + v01 * (1.0 - fx) * fy
        + v11 * fx * fy
}
