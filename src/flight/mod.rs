pub mod command;
pub mod executor;
pub mod transform;
pub mod zone;


pub use command::{Command, Step};
pub use executor::{FlightContext, FlightExecutor};
pub use transform::Direction;
