//! HTTP adapter for the chat relay.
//!
//! # Endpoints
//!
//! - `GET /` - `OK`
//! - `GET /health` - health check
//! - `GET /env` - configuration presence report
//! - `POST /chat` - relay a message and return the assistant's reply

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ChatRequest, ChatResponse, EnvResponse, ErrorResponse, HealthResponse};
pub use handlers::RelayAppState;
pub use routes::{app_router, cors_layer, relay_router};
