// Client core for the CôteCar vehicle marketplace.
//
// The crate holds the catalog view-model (filter -> sort -> derive), a typed
// client for the marketplace REST API, the session controller that sequences
// loads after mutations, and the axum gateway served by the binary.

use axum::extract::FromRef;
use reqwest::Client;
use std::sync::Arc;

pub mod api_client;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod phone;
pub mod routes;
pub mod session;
pub mod storage;

#[cfg(test)]
mod test_support;

use crate::{api_client::MarketplaceClient, config::Settings, storage::MemoryStore};

// Shared state handed to every gateway handler
#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub http_client: Client,
}

impl AppState {
    pub fn new(settings: Settings, http_client: Client) -> Self {
        Self {
            settings: Arc::new(settings),
            http_client,
        }
    }

    // Builds a marketplace client that speaks on behalf of the caller.
    // The gateway keeps no tokens of its own; the caller's bearer token lives
    // in a throwaway store for the duration of the request.
    pub fn marketplace(&self, token: Option<&str>) -> MarketplaceClient {
        let store = match token {
            Some(token) => MemoryStore::with_token(token),
            None => MemoryStore::default(),
        };
        MarketplaceClient::new(
            self.http_client.clone(),
            &self.settings.api_base_url,
            Arc::new(store),
        )
    }
}
