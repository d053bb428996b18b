use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use camino::Utf8PathBuf as PathBuf;
use clap::Parser;
use eyre::{Context, Result};
use folio::app_state::{AppState, SharedState};
use tokio::signal;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{prelude::*, EnvFilter};

use folio_core::{
    catalog,
    config::{self, Config},
    contact::{LogMailer, Mailer, WebhookMailer},
    storage::{LocalFileStorage, Storage},
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML config file, built-in defaults are used without one
    #[arg(short, long)]
    config: Option<String>,
    #[cfg(feature = "opentelemetry")]
    #[arg(long)]
    otel_endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "1")
    }
    if std::env::var("RUST_SPANTRACE").is_err() {
        std::env::set_var("RUST_SPANTRACE", "1");
    }
    color_eyre::install()?;
    if std::env::var("FOLIO_LOG").is_err() {
        std::env::set_var("FOLIO_LOG", "info,tower_http=debug")
    }
    let tracing = tracing_subscriber::registry()
        .with(EnvFilter::from_env("FOLIO_LOG"))
        .with(ErrorLayer::default())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    #[cfg(feature = "opentelemetry")]
    {
        use opentelemetry_otlp::WithExportConfig;
        let telemetry = match args.otel_endpoint.as_ref() {
            Some(otel_endpoint) => {
                let tracer = opentelemetry_otlp::new_pipeline()
                    .tracing()
                    .with_exporter(
                        opentelemetry_otlp::new_exporter()
                            .tonic()
                            .with_endpoint(otel_endpoint.clone()),
                    )
                    .with_trace_config(opentelemetry_sdk::trace::config().with_resource(
                        opentelemetry_sdk::Resource::new(vec![opentelemetry::KeyValue::new(
                            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                            "folio",
                        )]),
                    ))
                    .install_batch(opentelemetry_sdk::runtime::Tokio)
                    .wrap_err("error setting up OTLP exporter")?;
                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            }
            None => None,
        };
        tracing.with(telemetry).init();
    }
    #[cfg(not(feature = "opentelemetry"))]
    {
        tracing.init();
    }

    let config = match args.config.as_ref() {
        Some(path) => config::read_config(&PathBuf::from(path)).await?,
        None => {
            info!("No config file given, using defaults");
            Config::default()
        }
    };

    let addr: IpAddr = config
        .address
        .as_ref()
        .map(|a| a.parse().wrap_err("error parsing listening address"))
        .transpose()?
        .unwrap_or("127.0.0.1".parse().expect("is a valid address"));
    let port = config.port.unwrap_or(5000);

    info!("Starting up...");
    let storage: Storage = Arc::new(LocalFileStorage::new(config.storage_dir.clone()));
    catalog::ensure_layout(&storage)
        .await
        .wrap_err("error creating upload directories")?;
    let mailer: Arc<dyn Mailer> = match config.mail.webhook_url.clone() {
        Some(url) => {
            info!(%url, "sending contact messages to mail service");
            Arc::new(WebhookMailer::new(url))
        }
        None => Arc::new(LogMailer),
    };
    let shared_state: SharedState = Arc::new(AppState {
        storage,
        limits: config.limits,
        derivation: config.derivation,
        mailer,
    });
    let app = folio::app(
        shared_state,
        &config.storage_dir,
        config.static_dir.as_deref(),
    );
    let listener = tokio::net::TcpListener::bind(SocketAddr::new(addr, port))
        .await
        .wrap_err("Error binding socket")?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;
    info!("Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {}
        Err(err) => {
            eprintln!("Unable to listen for shutdown signal: {}", err);
            std::process::exit(1);
            // we also shut down in case of error
        }
    }
}
