use eyre::{Context, Result};
use itertools::Itertools;

use crate::{
    catalog::storage_key::{self, VIDEO_DIR},
    model::{ImageAsset, VideoAsset},
    storage::Storage,
};

/// All originals in the asset store root, newest first.
///
/// Derived keys are reconstructed from each file name. Files whose names carry
/// a derived-variant marker are skipped. Names without a numeric timestamp
/// prefix come after all timestamped ones; ties are ordered by file name,
/// descending.
#[tracing::instrument(skip(storage))]
pub async fn list_images(storage: &Storage) -> Result<Vec<ImageAsset>> {
    let objects = storage
        .list("")
        .await
        .wrap_err("error listing originals")?;
    let images = objects
        .iter()
        .filter(|object| !storage_key::is_derived_name(&object.name))
        .map(|object| ImageAsset::from_filename(&object.name))
        .sorted_by(|a, b| (b.timestamp, &b.filename).cmp(&(a.timestamp, &a.filename)))
        .collect();
    Ok(images)
}

/// All videos, newest first by file name timestamp.
/// Videos without a timestamp keep reversed directory order, after all others.
#[tracing::instrument(skip(storage))]
pub async fn list_videos(storage: &Storage) -> Result<Vec<VideoAsset>> {
    let objects = storage
        .list(VIDEO_DIR)
        .await
        .wrap_err("error listing videos")?;
    let videos = objects
        .iter()
        .rev()
        .map(|object| VideoAsset::from_filename(&object.name))
        // stable sort
        .sorted_by(|a, b| b.timestamp.cmp(&a.timestamp))
        .collect();
    Ok(videos)
}
