//! HTTP API module: health check and prediction endpoints.

pub mod handlers;
pub mod routes;
pub mod schemas;

pub use handlers::{ApiError, AppState};
pub use routes::create_router;
pub use schemas::{HealthInput, HealthPrediction};
