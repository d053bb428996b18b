use std::sync::Arc;

use eyre::{eyre, Context, Result};
use image::{DynamicImage, GenericImageView};
use tracing::{debug, error, Instrument};

use crate::{catalog::storage_key, storage::Storage};

use super::resize::{render_variant, VariantParams};

/// Keys of the derived variants of one original
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedNames {
    pub optimized: String,
    pub thumbnail: String,
}

impl DerivedNames {
    pub fn for_filename(filename: &str) -> DerivedNames {
        DerivedNames {
            optimized: storage_key::optimized(filename),
            thumbnail: storage_key::thumbnail(filename),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationSettings {
    pub optimized: VariantParams,
    pub thumbnail: VariantParams,
}

impl Default for DerivationSettings {
    fn default() -> Self {
        DerivationSettings {
            optimized: VariantParams {
                max_width: 1920,
                quality: 80,
            },
            thumbnail: VariantParams {
                max_width: 400,
                quality: 70,
            },
        }
    }
}

/// Produce the optimized variant and the thumbnail of the original stored at
/// `source_key`.
///
/// Failures are logged and swallowed: the returned names are the keys the
/// variants would have been written to, whether or not that worked.
pub async fn derive_variants(
    storage: &Storage,
    source_key: &str,
    filename: &str,
    settings: &DerivationSettings,
) -> DerivedNames {
    match try_derive_variants(storage, source_key, filename, settings).await {
        Ok(names) => names,
        Err(err) => {
            error!(%filename, "failed to derive image variants: {:#}", err);
            DerivedNames::for_filename(filename)
        }
    }
}

/// Like [`derive_variants`] but reports failure.
/// Both variants are attempted even if one of them fails.
#[tracing::instrument(skip(storage, settings))]
pub async fn try_derive_variants(
    storage: &Storage,
    source_key: &str,
    filename: &str,
    settings: &DerivationSettings,
) -> Result<DerivedNames> {
    let names = DerivedNames::for_filename(filename);
    let data = storage
        .read(source_key)
        .await
        .wrap_err("error reading original")?;
    let img = tokio::task::spawn_blocking(move || image::load_from_memory(&data))
        .await
        .wrap_err("image decoding task failed")?
        .wrap_err("error decoding original")?;
    let (width, height) = img.dimensions();
    debug!(width, height, "decoded original");
    let img = Arc::new(img);

    let (optimized, thumbnail) = tokio::join!(
        store_variant(storage, img.clone(), settings.optimized, &names.optimized),
        store_variant(storage, img, settings.thumbnail, &names.thumbnail),
    );
    let failed: Vec<String> = [(&names.optimized, optimized), (&names.thumbnail, thumbnail)]
        .into_iter()
        .filter_map(|(key, res)| res.err().map(|err| format!("{}: {:#}", key, err)))
        .collect();
    if failed.is_empty() {
        Ok(names)
    } else {
        Err(eyre!("could not produce {}", failed.join("; ")))
    }
}

async fn store_variant(
    storage: &Storage,
    img: Arc<DynamicImage>,
    params: VariantParams,
    key: &str,
) -> Result<()> {
    let (data, size) = tokio::task::spawn_blocking(move || render_variant(&img, &params))
        .await
        .wrap_err("image resize task failed")??;
    storage
        .put(key, &data)
        .instrument(tracing::debug_span!("store variant", key))
        .await?;
    debug!(
        key,
        width = size.width,
        height = size.height,
        bytes = data.len(),
        "stored variant"
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::test_util::{is_progressive_jpeg, png, stored_dimensions, temp_storage};

    use super::*;

    #[tokio::test]
    async fn derives_both_variants() {
        let (_dir, storage) = temp_storage().await;
        storage.put("1-wide.png", &png(2400, 1200)).await.unwrap();

        let names = try_derive_variants(
            &storage,
            "1-wide.png",
            "1-wide.png",
            &DerivationSettings::default(),
        )
        .await
        .unwrap();

        assert_eq!(names.optimized, "optimized/1-wide-optimized.png");
        assert_eq!(names.thumbnail, "thumbnails/1-wide-thumb.png");
        assert_eq!(stored_dimensions(&storage, &names.optimized).await, (1920, 960));
        assert_eq!(stored_dimensions(&storage, &names.thumbnail).await, (400, 200));
        for key in [&names.optimized, &names.thumbnail] {
            assert!(is_progressive_jpeg(&storage.read(key).await.unwrap()));
        }
    }

    #[tokio::test]
    async fn small_originals_are_not_upscaled() {
        let (_dir, storage) = temp_storage().await;
        storage.put("1-small.png", &png(300, 200)).await.unwrap();

        let names = derive_variants(
            &storage,
            "1-small.png",
            "1-small.png",
            &DerivationSettings::default(),
        )
        .await;

        assert_eq!(stored_dimensions(&storage, &names.optimized).await, (300, 200));
        assert_eq!(stored_dimensions(&storage, &names.thumbnail).await, (300, 200));
    }

    #[tokio::test]
    async fn undecodable_original_still_reports_names() {
        let (_dir, storage) = temp_storage().await;
        storage.put("1-broken.jpg", b"not an image").await.unwrap();

        let settings = DerivationSettings::default();
        assert!(
            try_derive_variants(&storage, "1-broken.jpg", "1-broken.jpg", &settings)
                .await
                .is_err()
        );
        let names = derive_variants(&storage, "1-broken.jpg", "1-broken.jpg", &settings).await;
        assert_eq!(names, DerivedNames::for_filename("1-broken.jpg"));
        assert!(!storage.exists(&names.optimized).await.unwrap());
        assert!(!storage.exists(&names.thumbnail).await.unwrap());
    }
}
