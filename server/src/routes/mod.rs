use axum::{extract::multipart::Field, Router};

use folio_core::catalog::operation::ingest::{Upload, UploadLimits};

use crate::app_state::SharedState;

pub mod contact;
pub mod image;
pub mod video;

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn api_router(limits: &UploadLimits) -> Router<SharedState> {
    Router::new()
        .merge(image::router(limits))
        .merge(video::router(limits))
        .merge(contact::router())
}

fn body_limit(max_file_bytes: u64) -> usize {
    usize::try_from(max_file_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD)
}

fn upload_from_field(field: &Field<'_>) -> Upload {
    Upload {
        original_name: field.file_name().unwrap_or("upload").to_owned(),
        declared_mime: field.content_type().map(str::to_owned),
    }
}
