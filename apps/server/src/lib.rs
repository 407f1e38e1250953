//! Caja POS REST API.
//!
//! Library surface so integration tests can build the router against an
//! in-memory database; the binary in `main.rs` is a thin wrapper.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::router;
pub use state::AppState;
