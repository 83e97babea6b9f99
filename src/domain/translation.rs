//! Translation table document shapes
//!
//! Stored concept maps carry the facility's bed-category vocabulary across to
//! the tally codes reports are written in. Groups are tagged with the tally
//! role their targets represent, so one map answers both "which code counts
//! occupied beds for category CC" and "which code counts available beds".

use crate::domain::codes::{Coding, TallyRole};
use serde::{Deserialize, Serialize};

/// A stored code translation map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptMap {
    /// Stable identifier of this map
    pub id: String,

    /// Translation groups, one per tally role
    #[serde(default)]
    pub groups: Vec<ConceptMapGroup>,
}

impl ConceptMap {
    /// Returns the group translating into codes of the given role
    pub fn group_for_role(&self, role: TallyRole) -> Option<&ConceptMapGroup> {
        self.groups.iter().find(|g| g.role == role)
    }
}

/// One translation group: source-system codes to target-system codes of a
/// single tally role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptMapGroup {
    /// Role of the target codes (occupied, available, total)
    pub role: TallyRole,

    /// Code system the source codes belong to
    pub source_system: String,

    /// Code system the target codes belong to
    pub target_system: String,

    /// Source-to-target code pairs
    #[serde(default)]
    pub elements: Vec<ConceptMapElement>,
}

impl ConceptMapGroup {
    /// Looks up the target coding for a source code
    pub fn translate(&self, source_code: &str) -> Option<Coding> {
        self.elements
            .iter()
            .find(|e| e.source == source_code)
            .map(|e| {
                let coding = Coding::new(self.target_system.clone(), e.target.clone());
                match &e.display {
                    Some(display) => coding.with_display(display.clone()),
                    None => coding,
                }
            })
    }
}

/// A single source-to-target code pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptMapElement {
    /// Code in the source system
    pub source: String,

    /// Code in the target system
    pub target: String,

    /// Display text of the target code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A stored code system defining the category vocabulary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSystem {
    /// Stable identifier of this code system
    pub id: String,

    /// Canonical system URI the concepts belong to
    pub system: String,

    /// Defined concepts
    #[serde(default)]
    pub concepts: Vec<CodeSystemConcept>,
}

impl CodeSystem {
    /// Looks up a defined concept by code
    pub fn concept(&self, code: &str) -> Option<&CodeSystemConcept> {
        self.concepts.iter().find(|c| c.code == code)
    }

    /// Builds the full coding for a defined concept, if present
    pub fn coding(&self, code: &str) -> Option<Coding> {
        self.concept(code).map(|c| {
            let coding = Coding::new(self.system.clone(), c.code.clone());
            match &c.display {
                Some(display) => coding.with_display(display.clone()),
                None => coding,
            }
        })
    }
}

/// A concept defined by a code system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSystemConcept {
    /// The concept code
    pub code: String,

    /// Display text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}
