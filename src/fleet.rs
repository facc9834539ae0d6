use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::config::{FleetConfig, FlightConfig};
use crate::error::{FleetError, Result};
use crate::flight::executor::FlightExecutor;
use crate::flight::zone::ZoneScripts;
use crate::notify::Publisher;
use crate::vehicle::{DroneSummary, Position, Vehicle, VehicleStatus};

/// A submitted flight: the command path plus the zone scripts it may invoke.
#[derive(Debug, Clone, Default)]
pub struct FlightPath {
    pub path: Vec<String>,
    pub zones: ZoneScripts,
}

/// Vehicle State Store. The roster is fixed at construction; each vehicle is
/// guarded by its own lock so vehicles never contend with each other.
pub struct Fleet {
    vehicles: BTreeMap<String, Arc<Mutex<Vehicle>>>,
    publisher: Publisher,
    flight: FlightConfig,
}

impl Fleet {
    pub fn new(vehicles: Vec<Vehicle>, publisher: Publisher, flight: FlightConfig) -> Self {
        Self {
            vehicles: vehicles
                .into_iter()
                .map(|v| (v.id.clone(), Arc::new(Mutex::new(v))))
                .collect(),
            publisher,
            flight,
        }
    }

    /// Seeds `tello-1..=tello-N` as configured.
    pub fn seeded(config: &FleetConfig, publisher: Publisher, flight: FlightConfig) -> Self {
        let vehicles = (1..=config.count)
            .map(|i| {
                Vehicle::new(
                    format!("tello-{}", i),
                    format!("{}{}", config.ip_base, 100 + i),
                    config.range,
                    config.battery,
                )
            })
            .collect();
        info!("Seeded fleet with {} vehicles", config.count);
        Self::new(vehicles, publisher, flight)
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    fn vehicle(&self, id: &str) -> Result<&Arc<Mutex<Vehicle>>> {
        self.vehicles
            .get(id)
            .ok_or_else(|| FleetError::NotFound(id.to_string()))
    }

    pub async fn discovery(&self) -> Vec<DroneSummary> {
        let mut drones = Vec::with_capacity(self.vehicles.len());
        for vehicle in self.vehicles.values() {
            drones.push(vehicle.lock().await.summary());
        }
        drones
    }

    pub async fn connect(&self, id: &str) -> Result<()> {
        let mut vehicle = self.vehicle(id)?.lock().await;
        if vehicle.connected {
            return Err(FleetError::InvalidState("Already connected".to_string()));
        }
        vehicle.connected = true;
        vehicle.status = VehicleStatus::Connected;
        info!("[{}] Connected", id);
        Ok(())
    }

    pub async fn disconnect(&self, id: &str) -> Result<()> {
        let mut vehicle = self.vehicle(id)?.lock().await;
        if !vehicle.connected {
            return Err(FleetError::InvalidState("Not connected".to_string()));
        }
        vehicle.command_queue.clear();
        vehicle.connected = false;
        vehicle.status = VehicleStatus::Idle;
        info!("[{}] Disconnected", id);
        Ok(())
    }

    /// Full record of a connected vehicle.
    pub async fn info(&self, id: &str) -> Result<Vehicle> {
        let vehicle = self.vehicle(id)?.lock().await;
        if !vehicle.connected {
            return Err(FleetError::InvalidState("Drone not connected".to_string()));
        }
        Ok(vehicle.clone())
    }

    /// Replaces the vehicle's zone scripts and queue, resets it to the origin
    /// and starts an executor unless one is still draining the queue.
    pub async fn submit_flight_path(&self, id: &str, flight: FlightPath) -> Result<()> {
        let handle = self.vehicle(id)?;
        let mut vehicle = handle.lock().await;
        if !vehicle.connected {
            return Err(FleetError::InvalidState("Drone not connected".to_string()));
        }

        info!(
            "[{}] Flight path with {} commands and {} zones",
            id,
            flight.path.len(),
            flight.zones.len()
        );
        vehicle.zones = flight.zones;
        vehicle.command_queue = flight.path.into();
        vehicle.position = Position::ORIGIN;
        vehicle.yaw = 0;
        vehicle.status = VehicleStatus::InFlight;
        vehicle.in_flight = true;

        if vehicle.run_active {
            info!("[{}] Run already active, queue superseded", id);
        } else {
            vehicle.run_active = true;
            FlightExecutor::new(handle.clone(), self.publisher.clone(), self.flight.clone())
                .spawn();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet() -> Fleet {
        Fleet::seeded(
            &FleetConfig::default(),
            Publisher::new(64),
            FlightConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_seeded_roster() {
        let drones = fleet().discovery().await;
        let ids: Vec<_> = drones.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["tello-1", "tello-2", "tello-3", "tello-4"]);
        assert_eq!(drones[0].ip, "127.0.0.101");
        assert_eq!(drones[3].ip, "127.0.0.104");
        assert!(drones.iter().all(|d| !d.connected && d.status == VehicleStatus::Idle));
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let fleet = fleet();
        fleet.connect("tello-1").await.unwrap();
        assert_eq!(
            fleet.connect("tello-1").await,
            Err(FleetError::InvalidState("Already connected".to_string()))
        );
        assert_eq!(fleet.info("tello-1").await.unwrap().status, VehicleStatus::Connected);

        fleet.disconnect("tello-1").await.unwrap();
        assert_eq!(
            fleet.disconnect("tello-1").await,
            Err(FleetError::InvalidState("Not connected".to_string()))
        );
        assert_eq!(
            fleet.connect("tello-9").await,
            Err(FleetError::NotFound("tello-9".to_string()))
        );
    }

    #[tokio::test]
    async fn test_info_requires_connection() {
        let fleet = fleet();
        assert!(matches!(
            fleet.info("tello-2").await,
            Err(FleetError::InvalidState(_))
        ));
        assert!(matches!(
            fleet.info("nope").await,
            Err(FleetError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_disconnected_vehicle_rejects_flight_path() {
        let fleet = fleet();
        let flight = FlightPath {
            path: vec!["takeoff".to_string()],
            zones: ZoneScripts::new(),
        };

        let result = fleet.submit_flight_path("tello-1", flight).await;
        assert_eq!(
            result,
            Err(FleetError::InvalidState("Drone not connected".to_string()))
        );

        let vehicle = fleet.vehicle("tello-1").unwrap().lock().await;
        assert!(vehicle.command_queue.is_empty());
        assert!(!vehicle.in_flight);
        assert!(!vehicle.run_active);
    }
}
