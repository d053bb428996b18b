use axum::{http::Method, Router};
use camino::Utf8Path as Path;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};

use folio_core::catalog::storage_key;

use crate::app_state::SharedState;

pub mod app_state;
pub mod http_error;
pub mod openapi;
pub mod routes;
pub mod schema;

/// The whole HTTP surface: the JSON API under `/api`, the asset store under
/// `/uploads` and, if given, the frontend for everything else.
pub fn app(shared_state: SharedState, storage_dir: &Path, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);
    let mut router = Router::new()
        .nest("/api", routes::api_router(&shared_state.limits))
        .nest_service(storage_key::URL_PREFIX, ServeDir::new(storage_dir));
    if let Some(static_dir) = static_dir {
        let index = ServeFile::new(static_dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(static_dir).fallback(index));
    }
    router
        .layer(
            ServiceBuilder::new()
                .set_x_request_id(MakeRequestUuid)
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().include_headers(true))
                        .on_response(DefaultOnResponse::new().include_headers(true)),
                ),
        )
        .layer(cors)
        .with_state(shared_state)
}
