pub mod config;
pub mod error;
pub mod fleet;
pub mod flight;
pub mod notify;
pub mod util;
pub mod vehicle;
pub mod web;
