use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::executor::FlightContext;
use crate::vehicle::Vehicle;

/// Zone name to its ordered command script, scoped to one vehicle.
pub type ZoneScripts = HashMap<String, Vec<String>>;

/// Normalizes a zone definition into a command list.
///
/// Accepts a newline-delimited string, an array of command strings, or either
/// of those wrapped as `{ "script": ... }`. Any other shape yields an empty
/// script; non-string array entries are dropped.
pub fn normalize_script(definition: &Value) -> Vec<String> {
    match definition {
        Value::String(script) => script.split('\n').map(str::to_string).collect(),
        Value::Array(commands) => commands
            .iter()
            .filter_map(|c| c.as_str().map(str::to_string))
            .collect(),
        Value::Object(wrapper) => wrapper
            .get("script")
            .map(normalize_script)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Normalizes every zone in a submission's `zones` mapping.
pub fn normalize_zones(zones: Option<&Value>) -> ZoneScripts {
    match zones {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, definition)| (name.clone(), normalize_script(definition)))
            .collect(),
        _ => ZoneScripts::new(),
    }
}

/// Builds the maneuver appended after a zone script.
///
/// Both positions are read at splice time, before the script has moved the
/// vehicle, so the translation is always zero and only the heading term has
/// any effect.
fn return_maneuver(vehicle: &Vehicle, return_speed: u32) -> [String; 2] {
    let saved = vehicle.position;
    let current = vehicle.position;

    let dx = -(current.x - saved.x).round() as i64;
    let dy = -(current.y - saved.y).round() as i64;
    let dz = -(current.z - saved.z).round() as i64;
    let yaw_diff = (360 - vehicle.yaw) % 360;

    [
        format!("go {} {} {} {}", dx, dy, dz, return_speed),
        format!("ccw {}", yaw_diff),
    ]
}

/// Splices the script registered for `zone` to the front of the vehicle's
/// queue, followed by the return maneuver. Unknown zones are ignored.
pub fn expand(vehicle: &mut Vehicle, zone: &str, context: &mut FlightContext, return_speed: u32) {
    let Some(script) = vehicle.zones.get(zone) else {
        debug!("[{}] No script registered for zone {}", vehicle.id, zone);
        return;
    };
    context.zone = Some(zone.to_string());
    if script.is_empty() {
        return;
    }

    let mut injected = script.clone();
    injected.extend(return_maneuver(vehicle, return_speed));
    debug!(
        "[{}] Entering zone {} with {} injected commands",
        vehicle.id,
        zone,
        injected.len()
    );

    for command in injected.into_iter().rev() {
        vehicle.command_queue.push_front(command);
    }
}
