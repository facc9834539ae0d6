use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::vehicle::VehicleSnapshot;

pub const GREETING: &str = "Connected to Tello Mock Server";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Notification {
    Info { message: String },
    Status { drone: VehicleSnapshot },
}

impl Notification {
    pub fn greeting() -> Self {
        Notification::Info {
            message: GREETING.to_string(),
        }
    }
}

/// Fan-out of vehicle snapshots to every current observer.
///
/// Delivery is fire-and-forget: publishing never waits on a subscriber, and a
/// subscriber that falls behind loses the notifications it missed.
#[derive(Debug, Clone)]
pub struct Publisher {
    tx: broadcast::Sender<Notification>,
}

impl Publisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Broadcasts a snapshot, returning how many observers it reached.
    pub fn publish(&self, drone: VehicleSnapshot) -> usize {
        let id = drone.id.clone();
        match self.tx.send(Notification::Status { drone }) {
            Ok(receivers) => {
                debug!("[{}] Status sent to {} observers", id, receivers);
                receivers
            }
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

pub struct Subscription {
    rx: broadcast::Receiver<Notification>,
}

impl Subscription {
    /// Next notification, or `None` once the publisher is gone.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            match self.rx.recv().await {
                Ok(notification) => return Some(notification),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Observer lagging, skipped {} notifications", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
