use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use tracing::{info, instrument};

use folio_core::contact::{self, ContactMessage};

use crate::{
    app_state::SharedState,
    http_error::ApiResult,
    schema::{ContactRequest, ContactResponse},
};

pub fn router() -> Router<SharedState> {
    Router::new().route("/contact", post(post_contact))
}

#[utoipa::path(post, path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, body = ContactResponse),
        (status = 400, body = ErrorBody, description = "Missing or invalid fields"),
        (status = 500, body = ErrorBody, description = "Mail could not be sent")
    )
)]
#[instrument(skip_all)]
pub async fn post_contact(
    State(app_state): State<SharedState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> ApiResult<Json<ContactResponse>> {
    let Json(request) = payload?;
    let message: ContactMessage = request.into();
    contact::submit(app_state.mailer.as_ref(), &message).await?;
    info!("contact message sent");
    Ok(Json(ContactResponse { success: true }))
}
