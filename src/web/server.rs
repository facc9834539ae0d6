use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

use super::{routes, ws};
use crate::config::{LocationConfig, WebConfig};
use crate::fleet::Fleet;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub fleet: Arc<Fleet>,
    pub location: LocationConfig,
    pub http: reqwest::Client,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes())
        .merge(ws::routes())
        .layer(routes::cors())
        .with_state(state)
}

pub struct WebServer {
    state: AppState,
    config: WebConfig,
}

impl WebServer {
    pub fn new(fleet: Arc<Fleet>, config: WebConfig, location: LocationConfig) -> Self {
        Self {
            state: AppState {
                fleet,
                location,
                http: reqwest::Client::new(),
            },
            config,
        }
    }

    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        TcpListener::bind(addr.as_str())
            .await
            .context(format!("Failed to bind to {}", addr))
    }

    /// Binds the configured address and serves until `shutdown` fires.
    pub async fn start(&self, shutdown: broadcast::Receiver<()>) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<()> {
        let app = router(self.state.clone());

        let addr: SocketAddr = listener.local_addr()?;
        info!("Tello mock server running on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                info!("Shutting down web server...");
            })
            .await
            .context("Failed to serve")?;

        info!("Web server stopped");
        Ok(())
    }
}
