#![allow(dead_code)]

use identity_store::{IdentityStorage, StorageConfig};
use image::{DynamicImage, Rgb, RgbImage};
use tempfile::TempDir;

pub fn open_storage() -> (TempDir, IdentityStorage) {
    let dir = TempDir::new().expect("temp dir");
    let storage = IdentityStorage::open(&StorageConfig::new(dir.path())).expect("open storage");
    (dir, storage)
}

/// Two-tone test face: left half `left`, right half `right`.
pub fn face(width: u32, height: u32, left: [u8; 3], right: [u8; 3]) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb(left)
        } else {
            Rgb(right)
        }
    });
    DynamicImage::ImageRgb8(img)
}

/// Mean absolute per-channel difference between two same-sized images.
pub fn mean_abs_diff(a: &DynamicImage, b: &DynamicImage) -> f64 {
    let a = a.to_rgb8();
    let b = b.to_rgb8();
    assert_eq!(a.dimensions(), b.dimensions(), "image dimensions differ");
    let total: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(x, y)| u64::from(x.abs_diff(*y)))
        .sum();
    total as f64 / a.as_raw().len() as f64
}

pub fn assert_same_face(a: &DynamicImage, b: &DynamicImage) {
    let diff = mean_abs_diff(a, b);
    assert!(diff < 6.0, "faces differ too much (mean abs diff {diff})");
}
