use image::{DynamicImage, GrayImage};
use imageproc::contrast::equalize_histogram;

// ---------------------------------------------------------------------------
// Contrast enhancement
// ---------------------------------------------------------------------------

/// Convert an image to single-channel 8-bit intensity (a no-op for input that
/// is already grayscale) and equalize its histogram.
pub fn enhance_contrast(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    equalize_histogram(&gray)
}
