use chrono::{DateTime, Utc};

use crate::catalog::storage_key;

use super::parse_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Video,
}

impl AssetKind {
    pub fn allowed_mime_types(&self) -> &'static [&'static str] {
        match self {
            AssetKind::Image => &[
                "image/jpeg",
                "image/png",
                "image/gif",
                "image/webp",
                "image/bmp",
                "image/tiff",
            ],
            AssetKind::Video => &["video/mp4", "video/webm", "video/quicktime"],
        }
    }

    pub fn accepts(&self, mime_type: &str) -> bool {
        self.allowed_mime_types().contains(&mime_type)
    }
}

/// An original image together with the keys its derived variants live at.
/// The derived keys are computed from the file name, nothing checks that
/// the files actually exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub filename: String,
    pub timestamp: Option<i64>,
    pub original: String,
    pub optimized: String,
    pub thumbnail: String,
}

impl ImageAsset {
    pub fn from_filename(filename: &str) -> ImageAsset {
        ImageAsset {
            filename: filename.to_owned(),
            timestamp: parse_timestamp(filename),
            original: storage_key::original(filename),
            optimized: storage_key::optimized(filename),
            thumbnail: storage_key::thumbnail(filename),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoAsset {
    pub filename: String,
    pub timestamp: Option<i64>,
    pub key: String,
}

impl VideoAsset {
    pub fn from_filename(filename: &str) -> VideoAsset {
        VideoAsset {
            filename: filename.to_owned(),
            timestamp: parse_timestamp(filename),
            key: storage_key::video(filename),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedImage {
    pub asset: ImageAsset,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedVideo {
    pub asset: VideoAsset,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDetails {
    pub asset: ImageAsset,
    pub size: u64,
    pub uploaded_at: Option<DateTime<Utc>>,
}
