//! Shared application state.

use caja_db::Database;

/// State handed to every route handler. `Database` is a pool wrapper, so
/// cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}
