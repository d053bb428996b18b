use eyre::Result;
use tracing::info;

use crate::storage::Storage;

pub mod operation;
pub mod storage_key;

/// Create the directories of the asset store if they don't exist yet.
pub async fn ensure_layout(storage: &Storage) -> Result<()> {
    for dir in storage_key::LAYOUT_DIRS {
        storage.ensure_dir(dir).await?;
    }
    info!("asset store layout ready");
    Ok(())
}
