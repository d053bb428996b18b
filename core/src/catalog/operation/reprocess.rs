use camino::Utf8Path as Path;
use eyre::{Context, Result};
use tracing::{error, info};

use crate::{
    catalog::storage_key,
    processing::image::{try_derive_variants, DerivationSettings},
    storage::Storage,
};

pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReprocessSummary {
    pub found: usize,
    pub succeeded: usize,
}

fn is_image_original(filename: &str) -> bool {
    let has_image_ext = Path::new(filename)
        .extension()
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    has_image_ext && !storage_key::is_derived_name(filename)
}

/// Derive the variants of every original image again, one after the other.
/// Existing variants are overwritten.
#[tracing::instrument(skip(storage, settings))]
pub async fn reprocess_all(
    storage: &Storage,
    settings: &DerivationSettings,
) -> Result<ReprocessSummary> {
    let originals: Vec<String> = storage
        .list("")
        .await
        .wrap_err("error listing originals")?
        .into_iter()
        .map(|object| object.name)
        .filter(|name| is_image_original(name))
        .collect();
    info!(found = originals.len(), "reprocessing images");
    let mut succeeded = 0;
    for filename in originals.iter() {
        let key = storage_key::original(filename);
        match try_derive_variants(storage, &key, filename, settings).await {
            Ok(_) => {
                info!(%filename, "reprocessed");
                succeeded += 1;
            }
            Err(err) => error!(%filename, "failed to reprocess: {:#}", err),
        }
    }
    Ok(ReprocessSummary {
        found: originals.len(),
        succeeded,
    })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::test_util::{jpeg, png, stored_dimensions, temp_storage};

    use super::*;

    #[test]
    fn only_image_originals_qualify() {
        assert!(is_image_original("1-a.JPEG"));
        assert!(is_image_original("1-a.tiff"));
        assert!(!is_image_original("1-a.mp4"));
        assert!(!is_image_original("1-a"));
        assert!(!is_image_original("1-a-thumb.jpg"));
    }

    #[tokio::test]
    async fn reprocesses_every_original() {
        let (_dir, storage) = temp_storage().await;
        storage.put("1-a.jpg", &jpeg(2000, 1000)).await.unwrap();
        storage.put("2-b.png", &png(100, 50)).await.unwrap();
        storage.put("3-broken.gif", b"nope").await.unwrap();
        storage.put("4-notes.txt", b"skip me").await.unwrap();

        let summary = reprocess_all(&storage, &DerivationSettings::default())
            .await
            .unwrap();

        assert_eq!(
            summary,
            ReprocessSummary {
                found: 3,
                succeeded: 2
            }
        );
        assert_eq!(
            stored_dimensions(&storage, "optimized/1-a-optimized.jpg").await,
            (1920, 960)
        );
        assert_eq!(
            stored_dimensions(&storage, "thumbnails/2-b-thumb.png").await,
            (100, 50)
        );
    }
}
