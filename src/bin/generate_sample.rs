//! Generate a small synthetic dataset for trying the trainer without a real
//! microscopy corpus: `sample_data/with_flux/*.jpg` carry bright stain blobs,
//! `sample_data/without_flux/*.jpg` are plain noisy board textures.

use std::path::Path;

use image::{Rgb, RgbImage};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SIZE: u32 = 160;
const IMAGES_PER_CLASS: usize = 20;

fn board_texture(rng: &mut ChaCha8Rng) -> RgbImage {
    let base = Rgb([
        rng.gen_range(40..80u8),
        rng.gen_range(70..110u8),
        rng.gen_range(40..80u8),
    ]);

    RgbImage::from_fn(SIZE, SIZE, |_, _| {
        let jitter = rng.gen_range(-12i16..=12);
        Rgb([
            (base[0] as i16 + jitter).clamp(0, 255) as u8,
            (base[1] as i16 + jitter).clamp(0, 255) as u8,
            (base[2] as i16 + jitter).clamp(0, 255) as u8,
        ])
    })
}

/// Paint a handful of pale, roughly circular residue blobs over the texture.
fn add_flux_stains(img: &mut RgbImage, rng: &mut ChaCha8Rng) {
    let blobs = rng.gen_range(2..=5);
    for _ in 0..blobs {
        let cx = rng.gen_range(0.2..0.8) * SIZE as f32;
        let cy = rng.gen_range(0.2..0.8) * SIZE as f32;
        let radius = rng.gen_range(10.0..28.0f32);

        for y in 0..SIZE {
            for x in 0..SIZE {
                let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
                if d < radius {
                    let fade = 1.0 - d / radius;
                    let px = img.get_pixel_mut(x, y);
                    for c in 0..3 {
                        let lift = (fade * 110.0) as i16;
                        px[c] = (px[c] as i16 + lift).clamp(0, 255) as u8;
                    }
                }
            }
        }
    }
}

fn write_class(dir: &Path, stained: bool, rng: &mut ChaCha8Rng) {
    std::fs::create_dir_all(dir).expect("creating sample folder");
    for i in 0..IMAGES_PER_CLASS {
        let mut img = board_texture(rng);
        if stained {
            add_flux_stains(&mut img, rng);
        }
        img.save(dir.join(format!("sample_{i:02}.jpg")))
            .expect("writing sample image");
    }
}

fn main() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let root = Path::new("sample_data");

    write_class(&root.join("with_flux"), true, &mut rng);
    write_class(&root.join("without_flux"), false, &mut rng);

    println!(
        "Wrote {} images per class under {}",
        IMAGES_PER_CLASS,
        root.display()
    );
}
