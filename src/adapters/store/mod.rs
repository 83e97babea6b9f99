//! Storage backends
//!
//! Documents are stored as JSON values addressed by kind and id. Two
//! backends exist: an in-memory store for tests and dry runs, and an HTTP
//! store for a remote resource server. Both are used through the
//! [`ResourceStore`] trait; [`create_resource_store`] picks one from
//! configuration.

pub mod factory;
pub mod http;
pub mod memory;
pub mod traits;

pub use factory::create_resource_store;
pub use http::HttpResourceStore;
pub use memory::MemoryStore;
pub use traits::{QueryFilter, ResourceKind, ResourceStore, StoreOp};
