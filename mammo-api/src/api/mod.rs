//! HTTP API handlers for mammo-api

pub mod health;
pub mod inference;
pub mod studies;
pub mod upload;

pub use health::health_routes;
pub use inference::inference_routes;
pub use studies::study_routes;
pub use upload::upload_routes;
