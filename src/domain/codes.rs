//! Coded value types used by the tally pipeline
//!
//! Tally data is keyed by codes rather than free text: a category code
//! identifies the class of tallied item (a bed type) and a role code
//! identifies the semantic role of a count within that category
//! (occupied/available/total).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A coded value from a code system
///
/// Display text is carried for rendering only. Comparisons that decide
/// whether two codings identify the same concept must use
/// [`Coding::matches`], which ignores display.
///
/// # Examples
///
/// ```
/// use beacon::domain::codes::Coding;
///
/// let a = Coding::new("urn:example:bed-types", "CC").with_display("Critical Care");
/// let b = Coding::new("urn:example:bed-types", "CC");
/// assert!(a.matches(&b));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coding {
    /// Code system URI
    pub system: String,

    /// Code value within the system
    pub code: String,

    /// Optional human-readable display text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Coding {
    /// Creates a new coding without display text
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            code: code.into(),
            display: None,
        }
    }

    /// Attaches display text to the coding
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Returns true when both system and code match, ignoring display
    pub fn matches(&self, other: &Coding) -> bool {
        self.system == other.system && self.code == other.code
    }
}

impl fmt::Display for Coding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.system, self.code)
    }
}

/// Semantic role of a count within a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TallyRole {
    /// Beds currently in use
    Occupied,

    /// Beds free for new admissions
    Available,

    /// Total bed inventory
    Total,
}

impl TallyRole {
    /// Returns the role as its wire tag
    pub fn as_str(&self) -> &'static str {
        match self {
            TallyRole::Occupied => "occupied",
            TallyRole::Available => "available",
            TallyRole::Total => "total",
        }
    }
}

impl fmt::Display for TallyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TallyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "occupied" => Ok(TallyRole::Occupied),
            "available" => Ok(TallyRole::Available),
            "total" => Ok(TallyRole::Total),
            other => Err(format!("Unknown tally role: {other}")),
        }
    }
}

/// Composite key for merged tally counts
///
/// A (category, role) pair usable directly as a map key. Equality and hash
/// cover the (system, code) pairs of both codings; display text never
/// participates, so the same concept tallied with and without display
/// lands in one bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedTallyKey {
    category: Coding,
    role: Coding,
}

impl BedTallyKey {
    /// Creates a key from a category coding and a role coding
    pub fn new(category: Coding, role: Coding) -> Self {
        Self { category, role }
    }

    /// The category coding of the key
    pub fn category(&self) -> &Coding {
        &self.category
    }

    /// The role coding of the key
    pub fn role(&self) -> &Coding {
        &self.role
    }
}

impl PartialEq for BedTallyKey {
    fn eq(&self, other: &Self) -> bool {
        self.category.matches(&other.category) && self.role.matches(&other.role)
    }
}

impl Eq for BedTallyKey {}

impl Hash for BedTallyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.category.system.hash(state);
        self.category.code.hash(state);
        self.role.system.hash(state);
        self.role.code.hash(state);
    }
}

impl fmt::Display for BedTallyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.category, self.role)
    }
}
