use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use eyre::Context;
use tracing::{info, instrument};

use folio_core::{
    catalog::operation::{
        delete, details,
        ingest::{self, IngestError, UploadLimits},
        list,
    },
    model::validate_file_name,
};

use crate::{
    app_state::SharedState,
    http_error::{ApiResult, HttpError},
    schema::{DeletedImage, Image, ImageDetails, UploadedImage},
};

use super::{body_limit, upload_from_field};

pub fn router(limits: &UploadLimits) -> Router<SharedState> {
    Router::new()
        .route(
            "/upload",
            post(post_upload).layer(DefaultBodyLimit::max(body_limit(limits.image_max_bytes))),
        )
        .route("/images", get(get_images))
        .route("/image/:filename", get(get_image).delete(delete_image))
}

#[utoipa::path(post, path = "/api/upload",
    request_body(content = String, content_type = "multipart/form-data",
        description = "Image file in the multipart field `image`"),
    responses(
        (status = 200, body = UploadedImage),
        (status = 400, body = ErrorBody, description = "No file or rejected file"),
        (status = 500, body = ErrorBody)
    )
)]
#[instrument(name = "Upload image", skip_all)]
pub async fn post_upload(
    State(app_state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadedImage>> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        let upload = upload_from_field(&field);
        let ingested = ingest::ingest_image(
            &app_state.storage,
            upload,
            &app_state.limits,
            &app_state.derivation,
            field,
        )
        .await?;
        info!(filename = %ingested.asset.filename, size = ingested.size, "image uploaded");
        return Ok(Json(ingested.into()));
    }
    Err(IngestError::MissingFile.into())
}

#[utoipa::path(get, path = "/api/images",
    responses(
        (status = 200, body = [Image], description = "Newest first"),
        (status = 500, body = ErrorBody)
    )
)]
#[instrument(skip(app_state), level = "debug")]
pub async fn get_images(State(app_state): State<SharedState>) -> ApiResult<Json<Vec<Image>>> {
    let images: Vec<Image> = list::list_images(&app_state.storage)
        .await
        .wrap_err("Failed to list images")?
        .into_iter()
        .map(Image::from)
        .collect();
    Ok(Json(images))
}

#[utoipa::path(get, path = "/api/image/{filename}",
    responses(
        (status = 200, body = ImageDetails),
        (status = 400, body = ErrorBody, description = "Invalid filename"),
        (status = NOT_FOUND, body = ErrorBody, description = "Image not found")
    ),
    params(
        ("filename" = String, Path, description = "Stored file name of the original")
    )
)]
#[instrument(skip(app_state), level = "debug")]
pub async fn get_image(
    Path(filename): Path<String>,
    State(app_state): State<SharedState>,
) -> ApiResult<Json<ImageDetails>> {
    let filename = validate_file_name(&filename)?;
    let details = details::image_details(&app_state.storage, filename)
        .await
        .wrap_err("Failed to get image info")?
        .ok_or_else(|| HttpError::not_found("Image not found"))?;
    Ok(Json(details.into()))
}

#[utoipa::path(delete, path = "/api/image/{filename}",
    responses(
        (status = 200, body = DeletedImage),
        (status = 400, body = ErrorBody, description = "Invalid filename"),
        (status = NOT_FOUND, body = ErrorBody, description = "Image not found")
    ),
    params(
        ("filename" = String, Path, description = "Stored file name of the original")
    )
)]
#[instrument(skip(app_state))]
pub async fn delete_image(
    Path(filename): Path<String>,
    State(app_state): State<SharedState>,
) -> ApiResult<Json<DeletedImage>> {
    let filename = validate_file_name(&filename)?;
    let outcome = delete::delete_image(&app_state.storage, filename)
        .await
        .wrap_err("Failed to delete image")?
        .ok_or_else(|| HttpError::not_found("Image not found"))?;
    Ok(Json(DeletedImage {
        message: String::from("Image deleted successfully"),
        deleted: outcome.deleted,
    }))
}
