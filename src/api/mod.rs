//! HTTP API layer
//!
//! Routers, handlers, extractors, and the shared application state.

pub mod auth;
pub mod billing;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod teams;
pub mod types;
pub mod users;

pub use router::{create_router, create_router_with_state};
pub use state::AppState;
