use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use eyre::Context;
use tracing::{info, instrument};

use folio_core::catalog::operation::{
    ingest::{self, IngestError, UploadLimits},
    list,
};

use crate::{
    app_state::SharedState,
    http_error::ApiResult,
    schema::{UploadedVideo, Video},
};

use super::{body_limit, upload_from_field};

pub fn router(limits: &UploadLimits) -> Router<SharedState> {
    Router::new()
        .route(
            "/upload-video",
            post(post_upload_video)
                .layer(DefaultBodyLimit::max(body_limit(limits.video_max_bytes))),
        )
        .route("/videos", get(get_videos))
}

#[utoipa::path(post, path = "/api/upload-video",
    request_body(content = String, content_type = "multipart/form-data",
        description = "Video file in the multipart field `video`"),
    responses(
        (status = 200, body = UploadedVideo),
        (status = 400, body = ErrorBody, description = "No file or rejected file"),
        (status = 500, body = ErrorBody)
    )
)]
#[instrument(name = "Upload video", skip_all)]
pub async fn post_upload_video(
    State(app_state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadedVideo>> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("video") {
            continue;
        }
        let upload = upload_from_field(&field);
        let ingested =
            ingest::ingest_video(&app_state.storage, upload, &app_state.limits, field).await?;
        info!(filename = %ingested.asset.filename, size = ingested.size, "video uploaded");
        return Ok(Json(ingested.into()));
    }
    Err(IngestError::MissingFile.into())
}

#[utoipa::path(get, path = "/api/videos",
    responses(
        (status = 200, body = [Video], description = "Newest first"),
        (status = 500, body = ErrorBody)
    )
)]
#[instrument(skip(app_state), level = "debug")]
pub async fn get_videos(State(app_state): State<SharedState>) -> ApiResult<Json<Vec<Video>>> {
    let videos: Vec<Video> = list::list_videos(&app_state.storage)
        .await
        .wrap_err("Failed to list videos")?
        .into_iter()
        .map(Video::from)
        .collect();
    Ok(Json(videos))
}
