//! API Module
//!
//! Local HTTP surface over the cache facade.
//!
//! # Endpoints
//! - `GET /entries/:type_tag/:id` - Read an entry by string identifier
//! - `GET /entries/:type_tag?k=v` - Read an entry by parameter identifier
//! - `PUT /entries/:type_tag/:id` - Store an entry by string identifier
//! - `PUT /entries/:type_tag?k=v` - Store an entry by parameter identifier
//! - `DELETE /entries` - Invalidate every entry
//! - `DELETE /entries/:type_tag` - Invalidate entries of one type
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
