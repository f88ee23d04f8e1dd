use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::cache::Cache;
use crate::database::CatalogStore;

/// Dependencies shared by every handler. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub cache: Cache,
    pub tokens: TokenIssuer,
    pub passwords: Arc<PasswordHasher>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        cache: Cache,
        tokens: TokenIssuer,
        passwords: PasswordHasher,
    ) -> Self {
        Self {
            store,
            cache,
            tokens,
            passwords: Arc::new(passwords),
        }
    }
}
