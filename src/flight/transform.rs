use crate::vehicle::Position;

/// Body-relative direction of a linear move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn from_operator(operator: &str) -> Option<Self> {
        match operator {
            "forward" => Some(Direction::Forward),
            "back" => Some(Direction::Back),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }
}

/// Applies a move of `distance` in `direction` to `position`, with the body
/// frame rotated by `yaw` degrees (0 faces north, positive turns clockwise).
pub fn move_relative(position: &mut Position, yaw: i64, direction: Direction, distance: f64) {
    let radians = (yaw as f64).to_radians();
    let dx = radians.sin() * distance;
    let dy = radians.cos() * distance;

    match direction {
        Direction::Forward => position.translate(dx, dy, 0.0),
        Direction::Back => position.translate(-dx, -dy, 0.0),
        Direction::Left => position.translate(-dy, dx, 0.0),
        Direction::Right => position.translate(dy, -dx, 0.0),
        Direction::Up => position.z += distance,
        Direction::Down => position.z -= distance,
    }
}
