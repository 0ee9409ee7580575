//! Request and Response models for the cache HTTP surface
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::SetRequest;
pub use responses::{
    ErrorResponse, GetResponse, HealthResponse, InvalidateResponse, SetResponse, StatsResponse,
};
