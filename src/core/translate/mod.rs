//! Code translation
//!
//! Report output uses measure-defined tally codes, not the facility's
//! internal bed categories. The translator resolves (category, role) pairs
//! through a stored concept map, and category display text through a stored
//! code system. Both tables are cached after the first load and can be
//! invalidated when the stored documents change.

mod cache;

pub use cache::CachedTable;

use crate::adapters::resolve::ReportStore;
use crate::config::ReportingConfig;
use crate::domain::{CodeSystem, Coding, ConceptMap, Result, TallyRole};
use std::sync::Arc;

/// Outcome of a (category, role) translation
///
/// An unmapped pair is data the concept map does not cover, which the
/// pipeline reports rather than silently dropping; it is not an error at
/// this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// The concept map defines a target coding for the pair
    Mapped(Coding),
    /// No group or element covers the pair
    Unmapped,
}

impl Translation {
    /// The target coding, when mapped
    pub fn mapped(self) -> Option<Coding> {
        match self {
            Translation::Mapped(coding) => Some(coding),
            Translation::Unmapped => None,
        }
    }
}

/// Translates category codes into tally codings via stored tables
pub struct CodeTranslator {
    store: ReportStore,
    concept_map_id: String,
    code_system_id: String,
    concept_map: CachedTable<ConceptMap>,
    code_system: CachedTable<CodeSystem>,
}

impl CodeTranslator {
    /// Creates a translator bound to the configured table documents
    pub fn new(store: ReportStore, config: &ReportingConfig) -> Self {
        Self {
            store,
            concept_map_id: config.concept_map_id.clone(),
            code_system_id: config.category_code_system_id.clone(),
            concept_map: CachedTable::new(),
            code_system: CachedTable::new(),
        }
    }

    async fn concept_map(&self) -> Result<Arc<ConceptMap>> {
        self.concept_map
            .get_or_load(|| async { self.store.concept_map(&self.concept_map_id).await })
            .await
    }

    async fn code_system(&self) -> Result<Arc<CodeSystem>> {
        self.code_system
            .get_or_load(|| async { self.store.code_system(&self.code_system_id).await })
            .await
    }

    /// Translates a category source code into the tally coding for a role
    ///
    /// # Errors
    ///
    /// Returns an error when the concept map cannot be loaded. A loadable
    /// map without a matching group or element yields
    /// [`Translation::Unmapped`].
    pub async fn translate(&self, category_code: &str, role: TallyRole) -> Result<Translation> {
        let map = self.concept_map().await?;

        let group = match map.group_for_role(role) {
            Some(group) => group,
            None => {
                tracing::warn!(
                    role = %role,
                    concept_map = %self.concept_map_id,
                    "Concept map has no group for role"
                );
                return Ok(Translation::Unmapped);
            }
        };

        Ok(match group.translate(category_code) {
            Some(coding) => Translation::Mapped(coding),
            None => Translation::Unmapped,
        })
    }

    /// Category coding for a source code
    ///
    /// Falls back to a bare coding in the category system when the code
    /// system does not list the code; category membership in the output is
    /// decided by the totals baseline, not here.
    ///
    /// # Errors
    ///
    /// Returns an error when the code system cannot be loaded.
    pub async fn category(&self, code: &str) -> Result<Coding> {
        let system = self.code_system().await?;
        Ok(system
            .coding(code)
            .unwrap_or_else(|| Coding::new(system.system.clone(), code)))
    }

    /// Drops both cached tables; the next access reloads from the store
    pub async fn invalidate(&self) {
        self.concept_map.invalidate().await;
        self.code_system.invalidate().await;
    }
}
