use std::borrow::Cow;

use bytes::Bytes;
use camino::Utf8Path as Path;
use chrono::Utc;
use futures::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::{
    catalog::storage_key,
    mime_type::{essence, guess_mime_type_path},
    model::{AssetKind, ImageAsset, IngestedImage, IngestedVideo, StoredFileName, VideoAsset},
    processing::image::{derive_variants, DerivationSettings},
    storage::{BoxedWriter, Storage},
};

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub image_max_bytes: u64,
    pub video_max_bytes: u64,
}

impl UploadLimits {
    pub fn max_bytes(&self, kind: AssetKind) -> u64 {
        match kind {
            AssetKind::Image => self.image_max_bytes,
            AssetKind::Video => self.video_max_bytes,
        }
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        UploadLimits {
            image_max_bytes: 50 * MIB,
            video_max_bytes: 200 * MIB,
        }
    }
}

/// What the client told us about an upload before sending its content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub original_name: String,
    pub declared_mime: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("File too large, the limit is {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("Upload interrupted")]
    Stream(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Failed to store upload")]
    Storage(eyre::Report),
}

impl IngestError {
    /// Whether the client is at fault
    pub fn is_rejection(&self) -> bool {
        !matches!(self, IngestError::Storage(_))
    }
}

/// Validate an upload against the allow-list of `kind`. The type is only
/// guessed from the file name if the client declared none.
/// Returns the effective MIME type.
pub fn check_upload(kind: AssetKind, upload: &Upload) -> Result<String, IngestError> {
    let declared = upload
        .declared_mime
        .as_deref()
        .map(essence)
        .filter(|m| !m.is_empty());
    let mime = match declared {
        Some(m) => m,
        None => guess_mime_type_path(Path::new(&upload.original_name))
            .map(Cow::into_owned)
            .unwrap_or_default(),
    };
    if !kind.accepts(&mime) {
        let shown = if mime.is_empty() {
            String::from("unknown")
        } else {
            mime
        };
        return Err(IngestError::UnsupportedType(shown));
    }
    Ok(mime)
}

/// Store an uploaded image and derive its variants before returning.
#[tracing::instrument(skip(storage, limits, settings, stream))]
pub async fn ingest_image<S, E>(
    storage: &Storage,
    upload: Upload,
    limits: &UploadLimits,
    settings: &DerivationSettings,
    stream: S,
) -> Result<IngestedImage, IngestError>
where
    S: Stream<Item = Result<Bytes, E>> + Send,
    E: std::error::Error + Send + Sync + 'static,
{
    let (name, key, size) = store_upload(storage, AssetKind::Image, &upload, limits, stream).await?;
    let derived = derive_variants(storage, &key, name.as_str(), settings).await;
    let asset = ImageAsset {
        optimized: derived.optimized,
        thumbnail: derived.thumbnail,
        ..ImageAsset::from_filename(name.as_str())
    };
    Ok(IngestedImage { asset, size })
}

#[tracing::instrument(skip(storage, limits, stream))]
pub async fn ingest_video<S, E>(
    storage: &Storage,
    upload: Upload,
    limits: &UploadLimits,
    stream: S,
) -> Result<IngestedVideo, IngestError>
where
    S: Stream<Item = Result<Bytes, E>> + Send,
    E: std::error::Error + Send + Sync + 'static,
{
    let (name, _key, size) =
        store_upload(storage, AssetKind::Video, &upload, limits, stream).await?;
    Ok(IngestedVideo {
        asset: VideoAsset::from_filename(name.as_str()),
        size,
    })
}

async fn store_upload<S, E>(
    storage: &Storage,
    kind: AssetKind,
    upload: &Upload,
    limits: &UploadLimits,
    stream: S,
) -> Result<(StoredFileName, String, u64), IngestError>
where
    S: Stream<Item = Result<Bytes, E>> + Send,
    E: std::error::Error + Send + Sync + 'static,
{
    let mime = check_upload(kind, upload)?;
    let name = StoredFileName::new(&Utc::now(), &upload.original_name);
    let key = match kind {
        AssetKind::Image => storage_key::original(name.as_str()),
        AssetKind::Video => storage_key::video(name.as_str()),
    };
    let mut writer = storage
        .open_write_stream(&key)
        .await
        .map_err(IngestError::Storage)?;
    let written = match copy_limited(&mut writer, stream, limits.max_bytes(kind)).await {
        Ok(written) => written,
        Err(err) => {
            drop(writer);
            if let Err(remove_err) = storage.remove(&key).await {
                warn!(%key, "could not remove partial upload: {:#}", remove_err);
            }
            return Err(err);
        }
    };
    info!(%name, %mime, bytes = written, "stored upload");
    Ok((name, key, written))
}

async fn copy_limited<S, E>(
    writer: &mut BoxedWriter,
    stream: S,
    max_bytes: u64,
) -> Result<u64, IngestError>
where
    S: Stream<Item = Result<Bytes, E>> + Send,
    E: std::error::Error + Send + Sync + 'static,
{
    futures::pin_mut!(stream);
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| IngestError::Stream(Box::new(err)))?;
        written += chunk.len() as u64;
        if written > max_bytes {
            return Err(IngestError::TooLarge { limit: max_bytes });
        }
        writer
            .write_all(&chunk)
            .await
            .map_err(|err| IngestError::Storage(eyre::Report::new(err)))?;
    }
    writer
        .shutdown()
        .await
        .map_err(|err| IngestError::Storage(eyre::Report::new(err)))?;
    Ok(written)
}
