//! Resource store factory
//!
//! Creates the configured store backend behind the [`ResourceStore`] trait.
//! Adding a backend means adding a variant to
//! [`StoreBackend`](crate::config::StoreBackend) and an arm here.

use crate::adapters::store::http::HttpResourceStore;
use crate::adapters::store::memory::MemoryStore;
use crate::adapters::store::traits::ResourceStore;
use crate::config::{StoreBackend, StoreConfig};
use crate::domain::Result;
use std::sync::Arc;

/// Create a resource store from configuration
///
/// # Errors
///
/// Returns an error when the configured backend cannot be constructed,
/// for example an http backend without a usable base URL.
pub fn create_resource_store(config: &StoreConfig) -> Result<Arc<dyn ResourceStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory resource store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Http => {
            tracing::info!(
                base_url = config.base_url.as_deref().unwrap_or(""),
                "Using HTTP resource store"
            );
            Ok(Arc::new(HttpResourceStore::new(config)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;

    fn base_config(backend: StoreBackend) -> StoreConfig {
        StoreConfig {
            backend,
            base_url: None,
            username: None,
            password: None,
            tls_verify: true,
            timeout_seconds: 5,
            retry: RetryConfig::default(),
        }
    }

    #[test]
    fn test_creates_memory_store() {
        let store = create_resource_store(&base_config(StoreBackend::Memory)).unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn test_creates_http_store() {
        let mut config = base_config(StoreBackend::Http);
        config.base_url = Some("http://localhost:8080".to_string());
        let store = create_resource_store(&config).unwrap();
        assert_eq!(store.backend_name(), "http");
    }

    #[test]
    fn test_http_store_without_url_fails() {
        let result = create_resource_store(&base_config(StoreBackend::Http));
        assert!(result.is_err());
    }
}
