use std::time::Instant;

use crate::services::solar_service::SolarCalculator;

/// Read-only state shared by every handler. Calculations are stateless,
/// so there is nothing to lock.
#[derive(Clone, Debug)]
pub struct AppState {
    pub calculator: SolarCalculator,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(calculator: SolarCalculator) -> Self {
        Self {
            calculator,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
