use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::solar_controller::{calculate_solar_angles, health_check};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router. Trailing slashes are optional.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/solar/calculate/", post(calculate_solar_angles))
        .route("/solar/calculate",  post(calculate_solar_angles))
        .route("/health/",          get(health_check))
        .route("/health",           get(health_check))
        .with_state(state)
}
