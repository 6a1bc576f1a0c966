//! Shared application state.

use mongodb::Client;

/// Cloned per request for the readiness probe; the client shares its
/// connection pool across clones.
#[derive(Clone)]
pub struct AppState {
    pub mongo_client: Client,
}
