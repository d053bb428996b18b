use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use folio_core::{catalog::storage_key::url, model};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedVideo {
    pub filename: String,
    pub url: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub filename: String,
    pub url: String,
}

impl From<model::IngestedVideo> for UploadedVideo {
    fn from(value: model::IngestedVideo) -> Self {
        UploadedVideo {
            url: url(&value.asset.key),
            filename: value.asset.filename,
            size: value.size,
        }
    }
}

impl From<model::VideoAsset> for Video {
    fn from(value: model::VideoAsset) -> Self {
        Video {
            url: url(&value.key),
            filename: value.filename,
        }
    }
}
