use eyre::{Context, Result};
use tracing::{debug, info, warn};

use crate::{model::ImageAsset, storage::Storage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Number of files actually removed, original included
    pub deleted: usize,
}

/// Remove an original image and its derived variants.
///
/// Returns `None` if the original does not exist. Failing to remove a derived
/// file is logged and otherwise ignored, the original has to go though.
#[tracing::instrument(skip(storage))]
pub async fn delete_image(storage: &Storage, filename: &str) -> Result<Option<DeleteOutcome>> {
    let asset = ImageAsset::from_filename(filename);
    if !storage.remove(&asset.original).await.wrap_err("error removing original")? {
        return Ok(None);
    }
    let mut deleted = 1;
    for key in [&asset.optimized, &asset.thumbnail] {
        match storage.remove(key).await {
            Ok(true) => deleted += 1,
            Ok(false) => debug!(%key, "derived file was already missing"),
            Err(err) => warn!(%key, "could not remove derived file: {:#}", err),
        }
    }
    info!(%filename, deleted, "deleted image");
    Ok(Some(DeleteOutcome { deleted }))
}
