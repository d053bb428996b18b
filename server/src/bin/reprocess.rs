//! Derive the optimized variant and thumbnail of every image already in the
//! asset store, e.g. after changing widths or qualities in the config.

use std::sync::Arc;

use camino::Utf8PathBuf as PathBuf;
use clap::Parser;
use eyre::{Context, Result};
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{prelude::*, EnvFilter};

use folio_core::{
    catalog::{self, operation::reprocess},
    config::{self, Config},
    storage::{LocalFileStorage, Storage},
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    color_eyre::install()?;
    if std::env::var("FOLIO_LOG").is_err() {
        std::env::set_var("FOLIO_LOG", "info")
    }
    tracing_subscriber::registry()
        .with(EnvFilter::from_env("FOLIO_LOG"))
        .with(ErrorLayer::default())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match args.config.as_ref() {
        Some(path) => config::read_config(&PathBuf::from(path)).await?,
        None => Config::default(),
    };
    info!(dir = %config.storage_dir, "reprocessing asset store");
    let storage: Storage = Arc::new(LocalFileStorage::new(config.storage_dir.clone()));
    catalog::ensure_layout(&storage)
        .await
        .wrap_err("error creating upload directories")?;
    let summary = reprocess::reprocess_all(&storage, &config.derivation).await?;
    println!(
        "{}/{} images processed successfully",
        summary.succeeded, summary.found
    );
    Ok(())
}
