use std::sync::Arc;

use grocery::domain::GroceryItem;
use grocery::repository::{Repository, RestRepository};
use grocery::{Authenticator, RestAuthClient, StoreConfig};

/// Shared handles to the hosted store
#[derive(Clone)]
pub struct AppState {
    pub items: Arc<dyn Repository<GroceryItem>>,
    pub auth: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(items: Arc<dyn Repository<GroceryItem>>, auth: Arc<dyn Authenticator>) -> Self {
        Self { items, auth }
    }

    /// State backed by the hosted REST store
    pub fn remote(config: StoreConfig) -> Self {
        let client = reqwest::Client::new();
        Self {
            items: Arc::new(RestRepository::new(client.clone(), config.clone())),
            auth: Arc::new(RestAuthClient::new(client, config)),
        }
    }
}
