use std::str::FromStr;

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::definitions::Clamp;
use imageproc::edges::canny;
use imageproc::filter::Kernel;
use thiserror::Error;

use super::preprocess::FluxImage;

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// The three fixed transformations the filter bank offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// 5×5 averaging convolution.
    Blur,
    /// Fixed 3×3 sharpening kernel.
    Sharpen,
    /// Canny edge detection (low = 100, high = 200).
    EdgeDetection,
}

/// All filters, in the order the trainer applies them.
pub const ALL_FILTERS: [FilterKind; 3] = [
    FilterKind::Blur,
    FilterKind::Sharpen,
    FilterKind::EdgeDetection,
];

/// Error for an unrecognized filter name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid filter type: {0:?}")]
pub struct InvalidFilter(pub String);

/// The textual selectors are the boundary for filter choices arriving as
/// strings (the trainer itself iterates [`ALL_FILTERS`] directly); anything
/// outside the three known names is rejected with a typed error.
impl FromStr for FilterKind {
    type Err = InvalidFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blur" => Ok(FilterKind::Blur),
            "sharpen" => Ok(FilterKind::Sharpen),
            "edge_detection" => Ok(FilterKind::EdgeDetection),
            other => Err(InvalidFilter(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter bank
// ---------------------------------------------------------------------------

/// Canny thresholds.
const CANNY_LOW: f32 = 100.0;
const CANNY_HIGH: f32 = 200.0;

/// Apply one of the fixed filters to a preprocessed image.
///
/// The normalized floating-point samples are first rescaled to the 0–255
/// integer range; the kernels and the edge detector assume 8-bit intensities.
/// The result is always a 3-channel image with the input's spatial
/// dimensions: the edge detector's single-channel output is re-expanded so
/// every filtered variant has a consistent shape.
pub fn apply_filter(image: &FluxImage, kind: FilterKind) -> RgbImage {
    let rgb = image.to_rgb8();

    match kind {
        FilterKind::Blur => {
            let weights = [1.0f32 / 25.0; 25];
            Kernel::new(&weights, 5, 5)
                .filter::<Rgb<u8>, _, Rgb<u8>>(&rgb, |c, acc| *c = Clamp::clamp(acc))
        }
        FilterKind::Sharpen => {
            let weights: [i32; 9] = [0, -1, 0, -1, 5, -1, 0, -1, 0];
            Kernel::new(&weights, 3, 3)
                .filter::<Rgb<u8>, _, Rgb<u8>>(&rgb, |c, acc| *c = Clamp::clamp(acc))
        }
        FilterKind::EdgeDetection => {
            let gray = DynamicImage::ImageRgb8(rgb).to_luma8();
            let edges = canny(&gray, CANNY_LOW, CANNY_HIGH);
            let (w, h) = edges.dimensions();
            RgbImage::from_fn(w, h, |x, y| {
                let v = edges.get_pixel(x, y)[0];
                Rgb([v, v, v])
            })
        }
    }
}
