//! Serves the Thinkwell submit/poll API.
//!
//! Usage:
//!
//! ```text
//! think_server
//! ```
//!
//! Configuration is read from the environment. `MCP_CONFIG_PATH` names the
//! tool-server registry document (default `config/config.json`),
//! `THINK_BIND_ADDRESS` the listen address (default `0.0.0.0:8000`), and
//! the `AZURE_OPENAI_*` variables select the generation engine. Without
//! Azure settings a canned model answers every query. `RUST_LOG` controls
//! log filtering.

use mockable::DefaultClock;
use reqwest::Client;
use std::sync::Arc;
use thinkwell::api;
use thinkwell::invocation::adapters::ConfiguredChatModel;
use thinkwell::invocation::services::ToolInvocationLoop;
use thinkwell::job::adapters::InMemoryJobStore;
use thinkwell::job::services::ThinkService;
use thinkwell::settings::{AgentSettings, AzureOpenAiSettings, ProcessEnv, SettingsError};
use thinkwell::tool_session::adapters::{JsonFileToolServerRegistry, StreamableHttpConnector};
use thinkwell::tool_session::services::ToolSessionManager;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_LOG_FILTER: &str = "thinkwell=info,think_server=info";

/// Errors that stop the server.
#[derive(Debug, Error)]
enum ServerError {
    #[error("configuration error: {0}")]
    Settings(#[from] SettingsError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}

async fn run() -> Result<(), ServerError> {
    let env = ProcessEnv;
    let settings = AgentSettings::from_env(&env)?;
    let azure = AzureOpenAiSettings::from_env(&env)?;

    let client = Client::builder().build().map_err(ServerError::Client)?;
    let clock = Arc::new(DefaultClock);

    let manager = Arc::new(ToolSessionManager::new(
        Arc::new(JsonFileToolServerRegistry::new(
            settings.registry_path().to_path_buf(),
        )),
        Arc::new(StreamableHttpConnector::new(
            client.clone(),
            Arc::clone(&clock),
            settings.probe_timeout(),
            settings.request_timeout(),
        )),
        Arc::clone(&clock),
        settings.backoff(),
    ));
    let connected = manager.initialize().await;
    info!(servers = connected.len(), "tool sessions ready");

    let model = ConfiguredChatModel::from_settings(client, azure, settings.request_timeout());
    info!(engine = model.label(), "generation engine selected");
    let invocation = ToolInvocationLoop::new(
        Arc::new(model),
        Arc::clone(&manager),
        settings.max_tool_calls(),
    );
    let service = Arc::new(ThinkService::new(
        Arc::new(InMemoryJobStore::new()),
        Arc::new(invocation),
        clock,
    ));

    let address = settings.bind_address();
    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(source) => {
            let report = manager.close().await;
            warn!(
                released = report.released(),
                failures = report.failures().len(),
                "tool sessions closed after bind failure"
            );
            return Err(ServerError::Bind { address, source });
        }
    };
    info!(%address, "listening");

    let served = axum::serve(listener, api::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve);

    let report = manager.close().await;
    info!(
        released = report.released(),
        failures = report.failures().len(),
        "tool sessions closed"
    );
    served
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_tracing();
    run().await.map_err(Into::into)
}
