use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use folio_core::{catalog::storage_key::url, model};

/// Response to an image upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub filename: String,
    pub original_url: String,
    pub optimized_url: String,
    pub thumbnail_url: String,
    pub size: u64,
}

/// Catalog entry. The derived URLs are computed from the file name and
/// may point at files that were never written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub filename: String,
    pub original_url: String,
    pub optimized_url: String,
    pub thumbnail_url: String,
    /// Upload time in ms since the epoch, taken from the file name
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageDetails {
    pub filename: String,
    pub size: u64,
    pub original_url: String,
    pub optimized_url: String,
    pub thumbnail_url: String,
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedImage {
    pub message: String,
    /// How many of the original, optimized and thumbnail files were removed
    pub deleted: usize,
}

impl From<model::IngestedImage> for UploadedImage {
    fn from(value: model::IngestedImage) -> Self {
        UploadedImage {
            original_url: url(&value.asset.original),
            optimized_url: url(&value.asset.optimized),
            thumbnail_url: url(&value.asset.thumbnail),
            filename: value.asset.filename,
            size: value.size,
        }
    }
}

impl From<&model::ImageAsset> for Image {
    fn from(value: &model::ImageAsset) -> Self {
        Image {
            filename: value.filename.clone(),
            original_url: url(&value.original),
            optimized_url: url(&value.optimized),
            thumbnail_url: url(&value.thumbnail),
            timestamp: value.timestamp,
        }
    }
}

impl From<model::ImageAsset> for Image {
    fn from(value: model::ImageAsset) -> Self {
        (&value).into()
    }
}

impl From<model::ImageDetails> for ImageDetails {
    fn from(value: model::ImageDetails) -> Self {
        ImageDetails {
            size: value.size,
            original_url: url(&value.asset.original),
            optimized_url: url(&value.asset.optimized),
            thumbnail_url: url(&value.asset.thumbnail),
            filename: value.asset.filename,
            uploaded_at: value.uploaded_at,
        }
    }
}
