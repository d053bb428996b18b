use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod image;
pub mod video;
pub use image::*;
pub use video::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl From<ContactRequest> for folio_core::contact::ContactMessage {
    fn from(value: ContactRequest) -> Self {
        folio_core::contact::ContactMessage {
            name: value.name,
            email: value.email,
            message: value.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub success: bool,
}
