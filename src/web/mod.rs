pub mod routes;
pub mod server;
pub mod ws;


pub use server::{router, AppState, WebServer};
