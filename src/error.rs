use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FleetError {
    #[error("Drone not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidState(String),
}

pub type Result<T> = std::result::Result<T, FleetError>;
