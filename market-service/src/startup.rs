use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;

use crate::config::MarketConfig;
use crate::error::AppError;
use crate::services::{AssetStore, Database, TokenService};
use crate::{build_router, AppState};

/// A built application, bound to its listener but not yet serving. Binding
/// before serving lets tests ask for port 0 and read back the real port.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: axum::Router,
}

impl Application {
    /// Connect the store, run migrations, assemble state, bind the listener.
    pub async fn build(config: MarketConfig) -> Result<Self, AppError> {
        let db = Database::new(&config.database).await?;
        db.run_migrations().await?;

        let tokens = TokenService::new(&config.auth);
        let assets = AssetStore::new(&config.assets);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        let state = AppState {
            config,
            db,
            tokens,
            assets,
        };
        let router = build_router(state);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> Result<(), AppError> {
        tracing::info!(port = self.port, "Listening");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Service shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
