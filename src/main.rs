use std::sync::Arc;

use anyhow::Result;
use tello_sim::config::Config;
use tello_sim::fleet::Fleet;
use tello_sim::notify::Publisher;
use tello_sim::util::setup_logging;
use tello_sim::web::WebServer;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    setup_logging(&config.log_level);
    info!("Application starting...");

    let publisher = Publisher::new(config.notify.capacity);
    let fleet = Arc::new(Fleet::seeded(
        &config.fleet,
        publisher,
        config.flight.clone(),
    ));

    // Create a shutdown signal channel
    let (shutdown_tx, _) = broadcast::channel(1);

    let web_server = WebServer::new(fleet, config.web.clone(), config.location.clone());
    let web_handle = spawn_web_server(web_server, shutdown_tx.subscribe()).await;

    let shutdown_signal = async {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, stopping services...");
                if shutdown_tx.send(()).is_err() {
                    error!("Web server already stopped");
                }
            }
            Err(err) => {
                error!("Failed to listen for shutdown signal: {}", err);
            }
        }
    };

    let (web_result, _) = tokio::join!(web_handle, shutdown_signal);
    if let Err(e) = web_result {
        error!("Web server join error: {}", e);
    }

    info!("All services stopped, shutting down");

    Ok(())
}

async fn spawn_web_server(
    server: WebServer,
    shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = server.start(shutdown).await {
            error!("Web server error: {}", e);
        }
    })
}
