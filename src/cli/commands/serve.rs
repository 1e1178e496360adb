//! Serve command implementation
//!
//! Runs the HTTP API until a shutdown signal arrives. In-flight requests are
//! allowed to finish; new connections are refused once shutdown begins.

use super::{connect_or_exit, load_or_exit};
use crate::api::{self, AppState};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Apply the database schema before serving
    #[arg(long)]
    pub migrate: bool,

    /// Override server.bind_address
    #[arg(long)]
    pub bind: Option<String>,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = match load_or_exit(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
        }
        let addr = match config.server.socket_addr() {
            Ok(addr) => addr,
            Err(e) => {
                println!("❌ {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let store = match connect_or_exit(&config).await {
            Ok(store) => store,
            Err(code) => return Ok(code),
        };

        if self.migrate {
            if let Err(e) = store.ensure_schema().await {
                tracing::error!(error = %e, "Schema migration failed");
                println!("❌ Failed to apply schema: {e}");
                return Ok(5); // Fatal error exit code
            }
        }

        let state = AppState::new(store.clone(), &config);
        let app = match api::router(state, &config.server) {
            Ok(app) => app,
            Err(e) => {
                println!("❌ {e}");
                return Ok(2);
            }
        };

        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!(error = %e, %addr, "Failed to bind");
                println!("❌ Failed to bind {addr}: {e}");
                return Ok(5);
            }
        };

        tracing::info!(
            %addr,
            store = store.backend_name(),
            environment = ?config.environment,
            auth = config.auth.enabled,
            "Wardline API listening"
        );
        println!("🏥 Wardline API listening on http://{addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown_signal))
            .await?;

        tracing::info!("Server stopped");
        println!("👋 Server stopped");
        Ok(0)
    }
}

/// Resolves once the shutdown flag is set or its sender is gone
async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            break;
        }
    }
    tracing::info!("Shutting down HTTP server, draining in-flight requests");
}
