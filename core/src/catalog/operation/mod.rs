pub mod delete;
pub mod details;
pub mod ingest;
pub mod list;
pub mod reprocess;
