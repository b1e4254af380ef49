use std::path::Path;

use anyhow::{Context, Result};
use image::ImageReader;

use super::preprocess::{preprocess, FluxImage};

// ---------------------------------------------------------------------------
// Folder loader
// ---------------------------------------------------------------------------

/// File extension the loader accepts (matched ASCII-case-insensitively).
pub const IMAGE_EXTENSION: &str = "jpg";

/// Load and preprocess every `.jpg` image directly inside `folder`, tagging
/// each with `label`.
///
/// Subfolders are not entered. Files that fail to open or decode are skipped
/// silently (logged at debug level). Ordering follows the directory listing.
///
/// Returns parallel vectors of images and labels.
pub fn load_folder(folder: &Path, label: usize) -> Result<(Vec<FluxImage>, Vec<usize>)> {
    let entries = std::fs::read_dir(folder)
        .with_context(|| format!("reading image folder {folder:?}"))?;

    let mut images = Vec::new();
    let mut labels = Vec::new();

    for entry in entries {
        let entry = entry.with_context(|| format!("listing image folder {folder:?}"))?;
        let path = entry.path();

        if !path.is_file() || !has_image_extension(&path) {
            continue;
        }

        let decoded = ImageReader::open(&path).ok().and_then(|r| r.decode().ok());
        match decoded {
            Some(img) => {
                images.push(preprocess(&img));
                labels.push(label);
            }
            None => {
                log::debug!("skipping unreadable image {path:?}");
            }
        }
    }

    log::info!("loaded {} images (label {}) from {folder:?}", images.len(), label);
    Ok((images, labels))
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(IMAGE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    /// Create a scratch folder with `valid` decodable jpgs, one corrupt jpg,
    /// and one file with a non-image extension.
    fn scratch_folder(tag: &str, valid: usize) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "flux_loader_{tag}_{}_{}",
            std::process::id(),
            valid
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        for i in 0..valid {
            let img = RgbImage::from_pixel(32, 32, Rgb([i as u8 * 20, 100, 50]));
            img.save(dir.join(format!("img_{i}.jpg"))).unwrap();
        }
        std::fs::write(dir.join("broken.jpg"), b"not a jpeg at all").unwrap();
        std::fs::write(dir.join("notes.txt"), b"ignore me").unwrap();

        dir
    }

    #[test]
    fn assigns_the_given_label_to_every_image() {
        let dir = scratch_folder("labels", 4);
        let (images, labels) = load_folder(&dir, 1).unwrap();

        assert_eq!(images.len(), 4);
        assert!(labels.iter().all(|&l| l == 1));

        let (_, labels) = load_folder(&dir, 0).unwrap();
        assert!(labels.iter().all(|&l| l == 0));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn silently_skips_undecodable_files() {
        let dir = scratch_folder("corrupt", 3);
        let (images, labels) = load_folder(&dir, 1).unwrap();

        // 3 valid jpgs; the corrupt jpg and the txt file are dropped.
        assert_eq!(images.len(), 3);
        assert_eq!(labels.len(), 3);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_folder_is_an_error() {
        let dir = std::env::temp_dir().join("flux_loader_does_not_exist");
        assert!(load_folder(&dir, 1).is_err());
    }
}
