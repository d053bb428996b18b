use eyre::Result;

use crate::{
    catalog::storage_key,
    model::{util::datetime_from_millis, ImageAsset, ImageDetails},
    storage::Storage,
};

/// Details of one original image, `None` if there is no such original.
/// The upload time comes from the file name timestamp, falling back to the
/// file's modification time.
#[tracing::instrument(skip(storage))]
pub async fn image_details(storage: &Storage, filename: &str) -> Result<Option<ImageDetails>> {
    let Some(info) = storage.stat(&storage_key::original(filename)).await? else {
        return Ok(None);
    };
    let asset = ImageAsset::from_filename(filename);
    let uploaded_at = asset
        .timestamp
        .and_then(|millis| datetime_from_millis(millis).ok())
        .or(info.modified);
    Ok(Some(ImageDetails {
        asset,
        size: info.size,
        uploaded_at,
    }))
}
