use std::sync::Arc;

use folio_core::{
    catalog::operation::ingest::UploadLimits, contact::Mailer,
    processing::image::DerivationSettings, storage::Storage,
};

pub struct AppState {
    pub storage: Storage,
    pub limits: UploadLimits,
    pub derivation: DerivationSettings,
    pub mailer: Arc<dyn Mailer>,
}

pub type SharedState = Arc<AppState>;
