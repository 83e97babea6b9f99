//! External system integrations for Beacon.
//!
//! This module provides adapters for everything outside the pipeline core:
//!
//! - [`store`] - Document storage backends (in-memory and HTTP)
//! - [`resolve`] - Typed resource access over the raw store
//! - [`worklist`] - Patient worklist sources (census lists, fixed lists)
//! - [`sender`] - Report submission destinations (file drop, HTTP endpoint)
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies
//! and enable testing with in-memory implementations. Each concern is a
//! trait with a factory that picks the implementation from configuration.
//!
//! # Resource Store
//!
//! The store holds every document the pipeline reads or writes, addressed
//! by kind and id:
//!
//! ```rust
//! use beacon::adapters::resolve::ReportStore;
//! use beacon::adapters::store::MemoryStore;
//! use beacon::domain::ids::FacilityId;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ReportStore::new(Arc::new(MemoryStore::new()));
//!
//! // Absence of a required resource is a typed error
//! let missing = store.facility(&FacilityId::new("loc-1")?).await;
//! assert!(missing.is_err());
//! # Ok(())
//! # }
//! ```

pub mod resolve;
pub mod sender;
pub mod store;
pub mod worklist;
