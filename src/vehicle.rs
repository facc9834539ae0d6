use std::collections::VecDeque;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::flight::zone::ZoneScripts;

/// World-frame position. `x` grows east, `y` north, `z` is altitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

/// Flight phase label. Serialized as its display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleStatus {
    Idle,
    Connected,
    InFlight,
    Executing(String),
    Takeoff,
    Landed,
    Complete,
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleStatus::Idle => f.write_str("idle"),
            VehicleStatus::Connected => f.write_str("connected"),
            VehicleStatus::InFlight => f.write_str("in-flight"),
            VehicleStatus::Executing(cmd) => write!(f, "executing: {}", cmd),
            VehicleStatus::Takeoff => f.write_str("takeoff"),
            VehicleStatus::Landed => f.write_str("landed"),
            VehicleStatus::Complete => f.write_str("complete"),
        }
    }
}

impl Serialize for VehicleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub ip: String,
    pub connected: bool,
    #[serde(rename = "streamon")]
    pub stream_enabled: bool,
    pub in_flight: bool,
    pub range: u32,
    pub battery: u8,
    /// Heading in degrees, always within `[0, 360)`.
    pub yaw: i64,
    pub position: Position,
    pub status: VehicleStatus,
    pub command_queue: VecDeque<String>,

    #[serde(skip)]
    pub zones: ZoneScripts,
    // Set while an executor task owns this vehicle's queue.
    #[serde(skip)]
    pub(crate) run_active: bool,
}

/// Broadcast payload describing one vehicle after a state-affecting step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSnapshot {
    pub id: String,
    pub connected: bool,
    pub status: VehicleStatus,
    pub battery: u8,
    pub position: Position,
    pub yaw: i64,
    pub in_flight: bool,
}

/// Discovery listing entry.
#[derive(Debug, Clone, Serialize)]
pub struct DroneSummary {
    pub id: String,
    pub ip: String,
    pub range: u32,
    pub streamon: bool,
    pub connected: bool,
    pub status: VehicleStatus,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, ip: impl Into<String>, range: u32, battery: u8) -> Self {
        Self {
            id: id.into(),
            ip: ip.into(),
            connected: false,
            stream_enabled: false,
            in_flight: false,
            range,
            battery,
            yaw: 0,
            position: Position::ORIGIN,
            status: VehicleStatus::Idle,
            command_queue: VecDeque::new(),
            zones: ZoneScripts::default(),
            run_active: false,
        }
    }

    /// Adds `degrees` to the heading, wrapping into `[0, 360)`.
    pub fn rotate(&mut self, degrees: i64) {
        self.yaw = (self.yaw + degrees.rem_euclid(360)).rem_euclid(360);
    }

    pub fn snapshot(&self) -> VehicleSnapshot {
        VehicleSnapshot {
            id: self.id.clone(),
            connected: self.connected,
            status: self.status.clone(),
            battery: self.battery,
            position: self.position,
            yaw: self.yaw,
            in_flight: self.in_flight,
        }
    }

    pub fn summary(&self) -> DroneSummary {
        DroneSummary {
            id: self.id.clone(),
            ip: self.ip.clone(),
            range: self.range,
            streamon: self.stream_enabled,
            connected: self.connected,
            status: self.status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_wraps_into_range() {
        let mut vehicle = Vehicle::new("tello-1", "127.0.0.101", 4500, 100);
        vehicle.rotate(370);
        assert_eq!(vehicle.yaw, 10);
        vehicle.rotate(-30);
        assert_eq!(vehicle.yaw, 340);
        vehicle.rotate(-725);
        assert_eq!(vehicle.yaw, 335);
    }

    #[test]
    fn test_rotate_extreme_operands() {
        let mut vehicle = Vehicle::new("tello-1", "127.0.0.101", 4500, 100);
        vehicle.rotate(90);
        vehicle.rotate(i64::MAX);
        assert_eq!(vehicle.yaw, (90 + i64::MAX.rem_euclid(360)) % 360);
        vehicle.rotate(i64::MIN);
        assert!((0..360).contains(&vehicle.yaw));
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let mut vehicle = Vehicle::new("tello-1", "127.0.0.101", 4500, 100);
        vehicle.status = VehicleStatus::Executing("cw 90".to_string());
        vehicle.yaw = 90;

        let value = serde_json::to_value(vehicle.snapshot()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "tello-1",
                "connected": false,
                "status": "executing: cw 90",
                "battery": 100,
                "position": {"x": 0.0, "y": 0.0, "z": 0.0},
                "yaw": 90,
                "inFlight": false,
            })
        );
    }

    #[test]
    fn test_full_record_hides_internal_fields() {
        let vehicle = Vehicle::new("tello-2", "127.0.0.102", 4500, 100);
        let value = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(value["streamon"], false);
        assert_eq!(value["commandQueue"], serde_json::json!([]));
        assert!(value.get("zones").is_none());
        assert!(value.get("runActive").is_none());
    }
}
