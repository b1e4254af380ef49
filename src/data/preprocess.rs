use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};

// ---------------------------------------------------------------------------
// FluxImage – a preprocessed image ready for the pipeline
// ---------------------------------------------------------------------------

/// Square resolution every image is resized to before training.
pub const IMAGE_SIZE: usize = 100;

/// Number of colour channels the pipeline works with.
pub const CHANNELS: usize = 3;

/// A preprocessed image: `IMAGE_SIZE`×`IMAGE_SIZE` RGB with intensities
/// normalized to [0, 1], stored as `f32` in CHW layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FluxImage {
    /// Flattened samples, length `CHANNELS * IMAGE_SIZE * IMAGE_SIZE`.
    pub data: Vec<f32>,
}

impl FluxImage {
    /// Build from a CHW sample buffer. Panics if the length is wrong,
    /// which only ever indicates a programming error.
    pub fn from_data(data: Vec<f32>) -> Self {
        assert_eq!(data.len(), CHANNELS * IMAGE_SIZE * IMAGE_SIZE);
        Self { data }
    }

    /// Sample at (channel, row, column).
    pub fn get(&self, c: usize, y: usize, x: usize) -> f32 {
        self.data[c * IMAGE_SIZE * IMAGE_SIZE + y * IMAGE_SIZE + x]
    }

    /// Rescale the normalized samples back to the 0–255 range as an 8-bit
    /// RGB image. The filter bank operates on integer-valued intensities.
    pub fn to_rgb8(&self) -> RgbImage {
        let mut out = RgbImage::new(IMAGE_SIZE as u32, IMAGE_SIZE as u32);
        for y in 0..IMAGE_SIZE {
            for x in 0..IMAGE_SIZE {
                let px = Rgb([
                    (self.get(0, y, x) * 255.0).round().clamp(0.0, 255.0) as u8,
                    (self.get(1, y, x) * 255.0).round().clamp(0.0, 255.0) as u8,
                    (self.get(2, y, x) * 255.0).round().clamp(0.0, 255.0) as u8,
                ]);
                out.put_pixel(x as u32, y as u32, px);
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Resize a decoded image to `IMAGE_SIZE`×`IMAGE_SIZE` and map every sample
/// into [0, 1]. Deterministic for identical input.
pub fn preprocess(img: &DynamicImage) -> FluxImage {
    let resized = img
        .resize_exact(IMAGE_SIZE as u32, IMAGE_SIZE as u32, FilterType::Triangle)
        .to_rgb8();

    let mut data = vec![0.0f32; CHANNELS * IMAGE_SIZE * IMAGE_SIZE];
    for y in 0..IMAGE_SIZE {
        for x in 0..IMAGE_SIZE {
            let pixel = resized.get_pixel(x as u32, y as u32);
            for c in 0..CHANNELS {
                data[c * IMAGE_SIZE * IMAGE_SIZE + y * IMAGE_SIZE + x] =
                    pixel[c] as f32 / 255.0;
            }
        }
    }

    FluxImage { data }
}
