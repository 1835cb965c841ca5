pub mod analytics;
pub mod api;
pub mod config;
pub mod credential;
pub mod dataset;
pub mod pipeline;
pub mod presenter;
pub mod session;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::analytics::{AnalyticsConfig, AnalyticsContext, AnalyticsEmitter};
use crate::api::{ApiContext, ServerError};
use crate::config::{ConfigError, Settings};
use crate::credential::CredentialStore;
use crate::dataset::{DatasetLocation, TsvSource};
use crate::pipeline::classifier::InferenceClient;
use crate::session::SessionOrchestrator;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("Failed to wait for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
}

/// Wire the orchestrator from settings and an already-loaded credential.
pub fn build_session(settings: &Settings, credential: Option<String>) -> SessionOrchestrator {
    let source = TsvSource::new(DatasetLocation::parse(&settings.dataset));
    let classifier = InferenceClient::from_settings(settings);
    let analytics = AnalyticsEmitter::from_config(
        AnalyticsConfig {
            endpoint: settings.analytics_url.clone(),
            credential,
        },
        AnalyticsContext {
            variant: settings.variant.clone(),
            page_url: settings.public_url.clone(),
        },
    );
    SessionOrchestrator::new(Arc::new(source), Arc::new(classifier), analytics)
}

/// Start the server, initialize the session in the background, and serve
/// until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let settings = Settings::from_env()?;
    let credentials = CredentialStore::new(settings.credentials_path.clone());
    let credential = credentials.load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring unreadable credential file");
        None
    });

    if settings.analytics_url.is_none() {
        tracing::info!("No analytics endpoint configured, analytics disabled");
    }

    let session = Arc::new(build_session(&settings, credential));
    let mut server = api::start_server(
        ApiContext::new(Arc::clone(&session), credentials),
        settings.bind_addr,
    )
    .await?;

    let init = Arc::clone(&session);
    tokio::spawn(async move {
        // Failures are recorded in the session and shown on the page
        let _ = init.initialize().await;
    });

    tokio::signal::ctrl_c().await?;
    server.shutdown();
    server.wait().await;
    Ok(())
}
