use std::time::Duration;

use tracing::{debug, warn};

use super::executor::FlightContext;
use super::transform::{self, Direction};
use super::zone;
use crate::config::FlightConfig;
use crate::util::{parse_leading_int, parse_number};
use crate::vehicle::{Vehicle, VehicleStatus};

/// One decoded flight command.
///
/// Parsing never fails: unknown operators become [`Command::Unknown`] and
/// unreadable numeric operands are carried as NaN (or `None` where the value
/// must stay integral) so the interpreter can tolerate them.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Takeoff,
    Land,
    Rotate { clockwise: bool, degrees: Option<i64> },
    Move { direction: Direction, distance: f64 },
    Go { x: f64, y: f64, z: f64, speed: f64 },
    Curve { control: [f64; 3], end: [f64; 3], speed: f64 },
    StreamOn,
    StreamOff,
    Record { seconds: Option<i64> },
    Clear,
    ResetDirection,
    Action { zone: Option<String> },
    Wait { millis: Option<i64> },
    /// A known operator with too few operands to have any effect.
    Incomplete(String),
    Unknown(String),
}

/// What the executor should do after a command has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Suspend(Duration),
}

impl Command {
    pub fn parse(raw: &str) -> Self {
        let parts: Vec<&str> = raw.split_whitespace().collect();
        let Some(&operator) = parts.first() else {
            return Command::Unknown(String::new());
        };
        let int_operand = |index: usize| parts.get(index).and_then(|t| parse_leading_int(t));
        let number = |index: usize| parse_number(parts[index]);

        if let Some(direction) = Direction::from_operator(operator) {
            let distance = int_operand(1).map_or(f64::NAN, |d| d as f64);
            return Command::Move {
                direction,
                distance,
            };
        }

        match operator {
            "takeoff" => Command::Takeoff,
            "land" => Command::Land,
            "cw" | "ccw" => Command::Rotate {
                clockwise: operator == "cw",
                degrees: int_operand(1),
            },
            "go" if parts.len() >= 5 => Command::Go {
                x: number(1),
                y: number(2),
                z: number(3),
                speed: number(4),
            },
            "curve" if parts.len() >= 8 => Command::Curve {
                control: [number(1), number(2), number(3)],
                end: [number(4), number(5), number(6)],
                speed: number(7),
            },
            "go" | "curve" => Command::Incomplete(operator.to_string()),
            "streamon" => Command::StreamOn,
            "streamoff" => Command::StreamOff,
            "record" => Command::Record {
                seconds: int_operand(1),
            },
            "clear" => Command::Clear,
            "reset-dir" => Command::ResetDirection,
            "action" => Command::Action {
                zone: parts.get(1).map(|z| z.to_string()),
            },
            "wait" => Command::Wait {
                millis: int_operand(1),
            },
            other => Command::Unknown(other.to_string()),
        }
    }

    /// Applies this command to `vehicle`. The caller is responsible for the
    /// `executing: <cmd>` status that precedes every command.
    pub fn apply(
        &self,
        vehicle: &mut Vehicle,
        context: &mut FlightContext,
        config: &FlightConfig,
    ) -> Step {
        match self {
            Command::Takeoff => {
                vehicle.position.z = config.takeoff_altitude;
                vehicle.status = VehicleStatus::Takeoff;
            }
            Command::Land => {
                vehicle.position.z = 0.0;
                vehicle.status = VehicleStatus::Landed;
            }
            Command::Rotate { clockwise, degrees } => match degrees {
                Some(degrees) if *clockwise => vehicle.rotate(*degrees),
                Some(degrees) => vehicle.rotate(-degrees.rem_euclid(360)),
                None => warn!("[{}] Rotation without a readable angle, heading kept", vehicle.id),
            },
            Command::Move {
                direction,
                distance,
            } => {
                transform::move_relative(&mut vehicle.position, vehicle.yaw, *direction, *distance);
            }
            Command::Go { x, y, z, .. } => vehicle.position.translate(*x, *y, *z),
            Command::Curve { end, .. } => vehicle.position.translate(end[0], end[1], end[2]),
            Command::StreamOn => vehicle.stream_enabled = true,
            Command::StreamOff => vehicle.stream_enabled = false,
            Command::Record { seconds } => {
                if vehicle.stream_enabled {
                    debug!(
                        "[{}] Recording requested for zone {:?}, {:?}s",
                        vehicle.id, context.zone, seconds
                    );
                }
            }
            Command::Clear => vehicle.command_queue.clear(),
            Command::ResetDirection => {
                if vehicle.yaw > 0 {
                    vehicle.command_queue.push_front(format!("ccw {}", vehicle.yaw));
                }
            }
            Command::Action { zone: Some(zone) } => {
                zone::expand(vehicle, zone, context, config.return_speed);
            }
            Command::Action { zone: None } => {}
            Command::Wait { millis } => {
                let duration = match millis {
                    None | Some(0) => config.default_wait(),
                    Some(ms) => Duration::from_millis((*ms).max(0) as u64),
                };
                return Step::Suspend(duration);
            }
            Command::Incomplete(operator) => {
                warn!("[{}] Too few operands for {}, skipped", vehicle.id, operator)
            }
            Command::Unknown(operator) => {
                debug!("[{}] Ignoring unknown operator {:?}", vehicle.id, operator)
            }
        }
        Step::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::Position;

    fn run(vehicle: &mut Vehicle, raw: &str) -> Step {
        let mut context = FlightContext::default();
        Command::parse(raw).apply(vehicle, &mut context, &FlightConfig::default())
    }

    fn vehicle() -> Vehicle {
        let mut vehicle = Vehicle::new("tello-1", "127.0.0.101", 4500, 100);
        vehicle.connected = true;
        vehicle
    }

    #[test]
    fn test_parse_operators() {
        assert_eq!(Command::parse("takeoff"), Command::Takeoff);
        assert_eq!(
            Command::parse("  cw   90 "),
            Command::Rotate {
                clockwise: true,
                degrees: Some(90)
            }
        );
        assert_eq!(
            Command::parse("action zone-a"),
            Command::Action {
                zone: Some("zone-a".to_string())
            }
        );
        assert_eq!(Command::parse("go 1 2"), Command::Incomplete("go".to_string()));
        assert_eq!(Command::parse("flip l"), Command::Unknown("flip".to_string()));
        assert_eq!(Command::parse(""), Command::Unknown(String::new()));
    }

    #[test]
    fn test_takeoff_and_land() {
        let mut vehicle = vehicle();
        assert_eq!(run(&mut vehicle, "takeoff"), Step::Continue);
        assert_eq!(vehicle.position.z, 80.0);
        assert_eq!(vehicle.status, VehicleStatus::Takeoff);

        run(&mut vehicle, "land");
        assert_eq!(vehicle.position.z, 0.0);
        assert_eq!(vehicle.status, VehicleStatus::Landed);
    }

    #[test]
    fn test_cw_then_ccw_returns_to_zero() {
        for degrees in [i64::MIN, -725, -360, -90, -1, 0, 1, 45, 90, 359, 360, 1000, i64::MAX] {
            let mut vehicle = vehicle();
            run(&mut vehicle, &format!("cw {}", degrees));
            assert!((0..360).contains(&vehicle.yaw));
            run(&mut vehicle, &format!("ccw {}", degrees));
            assert_eq!(vehicle.yaw, 0, "cw/ccw {} did not cancel", degrees);
        }
    }

    #[test]
    fn test_rotation_with_bad_angle_keeps_heading() {
        let mut vehicle = vehicle();
        vehicle.yaw = 45;
        run(&mut vehicle, "cw left");
        assert_eq!(vehicle.yaw, 45);
    }

    #[test]
    fn test_go_and_curve_translate() {
        let mut vehicle = vehicle();
        run(&mut vehicle, "go 10 -20 30 60");
        assert_eq!(vehicle.position, Position { x: 10.0, y: -20.0, z: 30.0 });

        run(&mut vehicle, "curve 100 100 100 1 2 3 40");
        assert_eq!(vehicle.position, Position { x: 11.0, y: -18.0, z: 33.0 });

        run(&mut vehicle, "go 5 5");
        assert_eq!(vehicle.position, Position { x: 11.0, y: -18.0, z: 33.0 });
    }

    #[test]
    fn test_malformed_operand_propagates_nan() {
        let mut vehicle = vehicle();
        run(&mut vehicle, "go 1x 0 0 50");
        assert!(vehicle.position.x.is_nan());
        assert_eq!(vehicle.position.y, 0.0);

        let mut vehicle = self::vehicle();
        run(&mut vehicle, "forward");
        assert!(vehicle.position.y.is_nan());
    }

    #[test]
    fn test_streaming_toggles() {
        let mut vehicle = vehicle();
        run(&mut vehicle, "streamon");
        assert!(vehicle.stream_enabled);
        assert_eq!(run(&mut vehicle, "record 5"), Step::Continue);
        run(&mut vehicle, "streamoff");
        assert!(!vehicle.stream_enabled);
    }

    #[test]
    fn test_clear_empties_queue() {
        let mut vehicle = vehicle();
        vehicle.command_queue.extend(["takeoff".to_string(), "land".to_string()]);
        run(&mut vehicle, "clear");
        assert!(vehicle.command_queue.is_empty());
    }

    #[test]
    fn test_reset_dir_prepends_correction() {
        let mut vehicle = vehicle();
        vehicle.yaw = 270;
        vehicle.command_queue.push_back("land".to_string());
        run(&mut vehicle, "reset-dir");
        assert_eq!(vehicle.command_queue, ["ccw 270", "land"]);

        let mut level = self::vehicle();
        run(&mut level, "reset-dir");
        assert!(level.command_queue.is_empty());
    }

    #[test]
    fn test_wait_durations() {
        let mut vehicle = vehicle();
        assert_eq!(
            run(&mut vehicle, "wait 250"),
            Step::Suspend(Duration::from_millis(250))
        );
        assert_eq!(
            run(&mut vehicle, "wait"),
            Step::Suspend(Duration::from_millis(1000))
        );
        assert_eq!(
            run(&mut vehicle, "wait soon"),
            Step::Suspend(Duration::from_millis(1000))
        );
        assert_eq!(
            run(&mut vehicle, "wait 0"),
            Step::Suspend(Duration::from_millis(1000))
        );
        assert_eq!(run(&mut vehicle, "wait -5"), Step::Suspend(Duration::ZERO));
    }

    #[test]
    fn test_unknown_operator_is_ignored() {
        let mut vehicle = vehicle();
        let before = vehicle.snapshot();
        assert_eq!(run(&mut vehicle, "flip f"), Step::Continue);
        assert_eq!(vehicle.snapshot(), before);
    }
}
