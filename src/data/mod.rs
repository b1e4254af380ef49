/// Data layer: loading, preprocessing, filtering, and splitting.
///
/// Pipeline:
/// ```text
///  <folder>/*.jpg
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  scan folder, decode, tag with label
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ preprocess  │  resize 100×100, /255 → FluxImage (f32, CHW)
///   └────────────┘
///        │
///        ├──▶ filters / enhance   (derived variants, inspection only)
///        ▼
///   ┌──────────┐
///   │  split    │  seeded 80/20 train/test, one-hot labels
///   └──────────┘
/// ```
pub mod enhance;
pub mod filters;
pub mod loader;
pub mod preprocess;
pub mod split;

/// Label assigned to every image in the with-flux folder.
pub const WITH_FLUX: usize = 1;

/// Label assigned to every image in the without-flux folder.
pub const WITHOUT_FLUX: usize = 0;
