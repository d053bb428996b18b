use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use folio_core::{
    catalog::operation::ingest::IngestError, contact::ContactError, model::InvalidFileName,
};

use crate::schema::ErrorBody;

/// Error returned from handlers, rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Logs the full error chain, the client only gets the outermost message.
    pub fn internal(err: eyre::Report) -> Self {
        tracing::error!("{:?}", err);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Server error: {}", err),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

macro_rules! impl_from_internal {
    ($from:ty) => {
        impl From<$from> for HttpError {
            fn from(err: $from) -> Self {
                Self::internal(err.into())
            }
        }
    };
}

impl_from_internal!(std::io::Error);
impl_from_internal!(eyre::Report);

impl From<IngestError> for HttpError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Storage(report) => {
                tracing::error!("{:?}", report.wrap_err("Failed to store upload"));
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store upload")
            }
            rejected => Self::bad_request(rejected.to_string()),
        }
    }
}

impl From<ContactError> for HttpError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::Delivery(report) => {
                tracing::error!("{:?}", report.wrap_err("Failed to send message"));
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send message")
            }
            invalid => Self::bad_request(invalid.to_string()),
        }
    }
}

impl From<InvalidFileName> for HttpError {
    fn from(err: InvalidFileName) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<MultipartError> for HttpError {
    fn from(err: MultipartError) -> Self {
        Self::bad_request(format!("Invalid multipart data: {}", err.body_text()))
    }
}

impl From<MultipartRejection> for HttpError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, HttpError>;

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}
