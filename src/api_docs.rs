use utoipa::OpenApi;
use crate::controllers::solar_controller;
use crate::models::solar;
use crate::services::annual_yield;

#[derive(OpenApi)]
#[openapi(
    paths(
        solar_controller::calculate_solar_angles,
        solar_controller::health_check
    ),
    components(
        schemas(
            solar::CalculationRequest,
            solar::SolarCalculation,
            solar::HealthStatus,
            solar::ErrorBody,
            annual_yield::RadiationSource
        )
    ),
    tags(
        (name = "solar-orientation-calculator", description = "Optimal solar panel tilt, azimuth and annual yield")
    )
)]
pub struct ApiDoc;
