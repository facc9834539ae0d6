use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::command::{Command, Step};
use crate::config::FlightConfig;
use crate::notify::Publisher;
use crate::vehicle::{Vehicle, VehicleStatus};

/// State carried across the steps of a single run.
#[derive(Debug, Default, Clone)]
pub struct FlightContext {
    /// Zone most recently entered through `action`.
    pub zone: Option<String>,
}

/// Drains one vehicle's command queue, one command per step.
///
/// The vehicle lock is held only while a step is applied; pacing and `wait`
/// suspensions happen with the lock released so the store stays responsive.
pub struct FlightExecutor {
    vehicle: Arc<Mutex<Vehicle>>,
    publisher: Publisher,
    config: FlightConfig,
}

impl FlightExecutor {
    pub fn new(vehicle: Arc<Mutex<Vehicle>>, publisher: Publisher, config: FlightConfig) -> Self {
        Self {
            vehicle,
            publisher,
            config,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    pub async fn run(self) {
        let mut guard = RunGuard::new(self.vehicle.clone(), self.publisher.clone());
        let mut context = FlightContext::default();
        loop {
            let pause = {
                let mut vehicle = self.vehicle.lock().await;
                let Some(raw) = vehicle.command_queue.pop_front() else {
                    finish(&mut vehicle);
                    guard.disarm();
                    info!("[{}] Flight path complete", vehicle.id);
                    self.publisher.publish(vehicle.snapshot());
                    return;
                };

                vehicle.status = VehicleStatus::Executing(raw.clone());
                let command = Command::parse(&raw);
                debug!("[{}] Executing {:?}", vehicle.id, command);

                let step = command.apply(&mut vehicle, &mut context, &self.config);
                self.publisher.publish(vehicle.snapshot());

                match step {
                    Step::Continue => self.config.step_interval(),
                    Step::Suspend(duration) => {
                        debug!("[{}] Waiting {:?}", vehicle.id, duration);
                        duration
                    }
                }
            };
            tokio::time::sleep(pause).await;
        }
    }
}

fn finish(vehicle: &mut Vehicle) {
    vehicle.in_flight = false;
    vehicle.status = VehicleStatus::Complete;
    vehicle.run_active = false;
}

/// Releases the vehicle if a run ends without draining its queue (a step
/// panicked or the task was aborted), so the next submission can start a
/// fresh executor.
struct RunGuard {
    vehicle: Arc<Mutex<Vehicle>>,
    publisher: Publisher,
    armed: bool,
}

impl RunGuard {
    fn new(vehicle: Arc<Mutex<Vehicle>>, publisher: Publisher) -> Self {
        Self {
            vehicle,
            publisher,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        if let Ok(mut vehicle) = self.vehicle.try_lock() {
            release(&mut *vehicle, &self.publisher);
            return;
        }

        // Someone else holds the lock; release once they let go.
        let vehicle = self.vehicle.clone();
        let publisher = self.publisher.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let mut vehicle = vehicle.lock().await;
                release(&mut *vehicle, &publisher);
            });
        }
    }
}

fn release(vehicle: &mut Vehicle, publisher: &Publisher) {
    warn!("[{}] Flight run ended early, releasing vehicle", vehicle.id);
    vehicle.command_queue.clear();
    finish(vehicle);
    publisher.publish(vehicle.snapshot());
}
