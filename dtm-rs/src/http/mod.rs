//! HTTP layer: Axum router, handlers, and payload types.
//!
//! Exposes the `/users` authentication surface (`/users/login/`,
//! `/users/signup`) and a health probe, mounted under the configured API
//! prefix.

mod error;
mod handlers;
mod payloads;
mod state;


pub use handlers::router;
pub use state::AppState;
