//! Server binary: load config, wire up storage/checkpointer/engine, run one
//! agent-sync pass and start the cron ticker, then serve HTTP until
//! Ctrl-C/SIGTERM.

use std::collections::HashMap;
use std::sync::Arc;

use langgraph_server::agent_sync::{self, AgentSource, NoopAgentSource};
use langgraph_server::config::{AuthMode, ServerConfig};
use langgraph_server::context::auth::{AuthVerifier, HmacVerifier, PermissiveVerifier};
use langgraph_server::cron as cron_runner;
use langgraph_server::engine::{GraphFactoryRegistry, RunEngine};
use langgraph_server::metrics::Metrics;
use langgraph_server::prompts::PromptRegistry;
use langgraph_server::storage::{memory::MemoryStorage, postgres::PostgresStorage, Storage};
use langgraph_server::{api, AppState};

use langgraph_checkpoint::{Checkpointer, MemoryCheckpointer};
use langgraph_prebuilt::EchoGraphFactory;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();

    let config = ServerConfig::from_env();
    tracing::info!(bind_addr = %config.bind_addr, auth_mode = ?config.effective_auth_mode(), "starting langgraph-server");

    let storage: Arc<dyn Storage> = match &config.database_url {
        Some(url) => match PostgresStorage::connect(url).await {
            Ok(pg) => {
                if let Err(e) = pg.run_migrations().await {
                    tracing::error!(error = %e, "postgres migrations failed, falling back to in-memory storage");
                    Arc::new(MemoryStorage::new())
                } else if !pg.health_check().await {
                    tracing::error!("postgres health check failed, falling back to in-memory storage");
                    Arc::new(MemoryStorage::new())
                } else {
                    tracing::info!("connected to postgres");
                    Arc::new(pg)
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not connect to DATABASE_URL, falling back to in-memory storage");
                Arc::new(MemoryStorage::new())
            }
        },
        None => {
            tracing::info!("DATABASE_URL unset, using in-memory storage");
            Arc::new(MemoryStorage::new())
        }
    };

    let checkpointer: Arc<dyn Checkpointer> = Arc::new(MemoryCheckpointer::new());

    let registry = Arc::new(GraphFactoryRegistry::new());
    registry.register("agent", Arc::new(EchoGraphFactory));

    let engine = Arc::new(RunEngine::new(storage.clone(), checkpointer.clone(), registry));

    let mut default_prompts = HashMap::new();
    default_prompts.insert(
        "greeting".to_string(),
        "Hello! I'm a LangGraph-compatible agent. How can I help you today?".to_string(),
    );

    let state = AppState {
        storage,
        checkpointer,
        engine,
        metrics: Arc::new(Metrics::new()),
        prompts: Arc::new(PromptRegistry::new(default_prompts)),
    };

    if config.agent_sync_on_startup {
        let source: Arc<dyn AgentSource> = Arc::new(NoopAgentSource);
        agent_sync::sync_all(&state, &source).await;
    }

    tokio::spawn(cron_runner::scheduler::run(
        state.clone(),
        std::time::Duration::from_secs(config.cron_tick_secs),
    ));

    let verifier: Arc<dyn AuthVerifier> = match config.effective_auth_mode() {
        AuthMode::Hmac => Arc::new(HmacVerifier::new(
            config.hmac_secret.clone().expect("effective_auth_mode only returns Hmac with a secret set").into_bytes(),
        )),
        AuthMode::Permissive => Arc::new(PermissiveVerifier),
    };

    let app = api::build_router(state, verifier);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("langgraph-server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL-C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received CTRL-C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
