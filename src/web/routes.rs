use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use super::server::AppState;
use crate::error::FleetError;
use crate::fleet::FlightPath;
use crate::flight::zone;

#[derive(Debug, Deserialize)]
struct DroneRequest {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FlightPathRequest {
    id: String,
    #[serde(default)]
    commands: FlightCommands,
}

#[derive(Debug, Default, Deserialize)]
struct FlightCommands {
    #[serde(default)]
    path: Vec<String>,
    #[serde(default)]
    zones: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct LocationQuery {
    ip: Option<String>,
}

impl IntoResponse for FleetError {
    fn into_response(self) -> Response {
        let status = match self {
            FleetError::NotFound(_) => StatusCode::NOT_FOUND,
            FleetError::InvalidState(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/discovery", get(discovery))
        .route("/elevation", get(elevation))
        .route("/location", get(location))
        .route("/connect", post(connect))
        .route("/disconnect", post(disconnect))
        .route("/info/:id", get(vehicle_info))
        .route("/flightpath", post(flight_path))
}

pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
}

async fn discovery(State(state): State<AppState>) -> Json<Value> {
    let drones = state.fleet.discovery().await;
    Json(json!({ "drones": drones }))
}

async fn elevation(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "elevation": state.location.elevation }))
}

async fn location(State(state): State<AppState>, Query(query): Query<LocationQuery>) -> Response {
    let base = state.location.lookup_url.trim_end_matches('/');
    let url = match query.ip.filter(|ip| !ip.is_empty()) {
        Some(ip) => format!("{}/{}", base, ip),
        None => base.to_string(),
    };

    match fetch_location(&state.http, &url).await {
        Ok(location) => Json(json!({ "location": location })).into_response(),
        Err(e) => {
            error!("Location lookup via {} failed: {}", url, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": format!("Location lookup failed: {}", e) })),
            )
                .into_response()
        }
    }
}

async fn fetch_location(client: &reqwest::Client, url: &str) -> anyhow::Result<Value> {
    let location = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(location)
}

async fn connect(
    State(state): State<AppState>,
    Json(request): Json<DroneRequest>,
) -> Result<Json<Value>, FleetError> {
    state.fleet.connect(&request.id).await?;
    Ok(Json(json!({ "message": format!("Connected to {}", request.id) })))
}

async fn disconnect(
    State(state): State<AppState>,
    Json(request): Json<DroneRequest>,
) -> Result<Json<Value>, FleetError> {
    state.fleet.disconnect(&request.id).await?;
    Ok(Json(json!({ "message": format!("Disconnected from {}", request.id) })))
}

async fn vehicle_info(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, FleetError> {
    let vehicle = state.fleet.info(&id).await?;
    Ok(Json(json!({ "info": vehicle })))
}

async fn flight_path(
    State(state): State<AppState>,
    Json(request): Json<FlightPathRequest>,
) -> Result<Json<Value>, FleetError> {
    let flight = FlightPath {
        path: request.commands.path,
        zones: zone::normalize_zones(request.commands.zones.as_ref()),
    };
    state.fleet.submit_flight_path(&request.id, flight).await?;
    info!("Flight path sent to {}", request.id);
    Ok(Json(json!({ "message": format!("Flight path sent to {}", request.id) })))
}
