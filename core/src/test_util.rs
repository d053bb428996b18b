use std::{io::Cursor, sync::Arc};

use camino::Utf8PathBuf as PathBuf;
use image::{DynamicImage, ImageOutputFormat, RgbImage};

use crate::{
    catalog::ensure_layout,
    storage::{LocalFileStorage, Storage},
};

/// Storage rooted in a fresh temp dir with the asset store layout created.
/// Keep the `TempDir` alive for as long as the storage is used.
pub async fn temp_storage() -> (tempfile::TempDir, Storage) {
    let dir = tempfile::tempdir().unwrap();
    let root = PathBuf::try_from(dir.path().to_path_buf()).unwrap();
    let storage: Storage = Arc::new(LocalFileStorage::new(root));
    ensure_layout(&storage).await.unwrap();
    (dir, storage)
}

pub fn encode_image(width: u32, height: u32, format: ImageOutputFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode_image(width, height, ImageOutputFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode_image(width, height, ImageOutputFormat::Jpeg(90))
}

pub async fn stored_dimensions(storage: &Storage, key: &str) -> (u32, u32) {
    use image::GenericImageView;
    let data = storage.read(key).await.unwrap();
    image::load_from_memory(&data).unwrap().dimensions()
}

/// Whether `data` contains a progressive DCT frame header (SOF2).
/// Entropy coded data escapes `0xFF`, so the pair only shows up as a marker.
pub fn is_progressive_jpeg(data: &[u8]) -> bool {
    data.windows(2).any(|w| w == [0xFF, 0xC2])
}
