//! Tally aggregation
//!
//! Merges per-patient partial results into the facility-level report body.
//! The totals baseline is authoritative for which categories appear: every
//! baseline category gets a group (zero-filled when no patient contributed),
//! and tallies for categories the baseline does not know are dropped with a
//! warning. Available counts are derived, never tallied.

pub mod order;

use crate::config::ReportingConfig;
use crate::core::translate::{CodeTranslator, Translation};
use crate::domain::{
    BedTallyKey, PartialResult, ReportGroup, Result, TallyRole, TotalsBaseline, TotalsEntry,
};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// A (category, role) pair the concept map does not cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmappedCode {
    /// Category source code
    pub category: String,

    /// Role that could not be translated
    pub role: TallyRole,
}

impl fmt::Display for UnmappedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.role)
    }
}

/// A derived available count that went negative and was clamped to zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClampedCount {
    /// Category whose available count was clamped
    pub category: String,

    /// Baseline total for the category
    pub total: i64,

    /// Occupied count that exceeded the total
    pub occupied: i64,
}

impl fmt::Display for ClampedCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} occupied of {} total)",
            self.category, self.occupied, self.total
        )
    }
}

/// Aggregation result: ordered groups plus data-quality findings
#[derive(Debug, Clone, Default)]
pub struct AggregateOutcome {
    /// Report groups in configured category order
    pub groups: Vec<ReportGroup>,

    /// (category, role) pairs with no tally code mapping
    pub unmapped: Vec<UnmappedCode>,

    /// Categories whose derived available count was clamped to zero
    pub clamped: Vec<ClampedCount>,
}

/// Merges partial results against a totals baseline
pub struct TallyAggregator {
    translator: Arc<CodeTranslator>,
    overall_category: String,
    category_order: Vec<String>,
}

impl TallyAggregator {
    /// Creates an aggregator using the configured category conventions
    pub fn new(translator: Arc<CodeTranslator>, config: &ReportingConfig) -> Self {
        Self {
            translator,
            overall_category: config.overall_category.clone(),
            category_order: config.category_order.clone(),
        }
    }

    /// Builds the report body from partial results and the totals baseline
    ///
    /// Failed partials contribute nothing. Every baseline category appears
    /// in the output; the reserved overall category carries the sum of the
    /// per-category occupied counts.
    ///
    /// # Errors
    ///
    /// Returns an error when a translation table cannot be loaded.
    pub async fn aggregate(
        &self,
        partials: &[PartialResult],
        baseline: &TotalsBaseline,
    ) -> Result<AggregateOutcome> {
        let merged = merge_tallies(partials);

        let mut outcome = AggregateOutcome::default();
        let mut overall_occupied: i64 = 0;

        for entry in baseline.categories(&self.overall_category) {
            let (group, occupied) = self.category_group(entry, &merged, &mut outcome).await?;
            overall_occupied += occupied;
            outcome.groups.push(group);
        }

        match baseline.overall(&self.overall_category) {
            Some(entry) => {
                let group = self
                    .overall_group(entry, overall_occupied, &mut outcome)
                    .await?;
                outcome.groups.push(group);
            }
            None => {
                tracing::warn!(
                    overall = %self.overall_category,
                    baseline = %baseline.id,
                    "Totals baseline has no overall entry; overall group omitted"
                );
            }
        }

        warn_dropped_categories(&merged, baseline, &self.overall_category);

        order::sort_groups(&mut outcome.groups, &self.category_order);
        Ok(outcome)
    }

    /// One per-category group: total from the baseline, occupied merged
    /// from partials (zero when absent), available derived and clamped
    async fn category_group(
        &self,
        entry: &TotalsEntry,
        merged: &HashMap<BedTallyKey, i64>,
        outcome: &mut AggregateOutcome,
    ) -> Result<(ReportGroup, i64)> {
        let mut group = ReportGroup::new(entry.category.clone());
        group.add_population(entry.total.code.clone(), entry.total.count);

        let occupied = match self
            .translator
            .translate(&entry.category.code, TallyRole::Occupied)
            .await?
        {
            Translation::Mapped(coding) => {
                let key = BedTallyKey::new(entry.category.clone(), coding.clone());
                let count = merged.get(&key).copied().unwrap_or(0);
                group.add_population(coding, count);
                count
            }
            Translation::Unmapped => {
                self.record_unmapped(&entry.category.code, TallyRole::Occupied, outcome);
                0
            }
        };

        match self
            .translator
            .translate(&entry.category.code, TallyRole::Available)
            .await?
        {
            Translation::Mapped(coding) => {
                let count = self.derive_available(&entry.category.code, entry.total.count, occupied, outcome);
                group.add_population(coding, count);
            }
            Translation::Unmapped => {
                self.record_unmapped(&entry.category.code, TallyRole::Available, outcome);
            }
        }

        Ok((group, occupied))
    }

    /// The facility-wide group built from the reserved baseline entry
    async fn overall_group(
        &self,
        entry: &TotalsEntry,
        occupied: i64,
        outcome: &mut AggregateOutcome,
    ) -> Result<ReportGroup> {
        let mut group = ReportGroup::new(entry.category.clone());
        group.add_population(entry.total.code.clone(), entry.total.count);

        match self
            .translator
            .translate(&self.overall_category, TallyRole::Occupied)
            .await?
        {
            Translation::Mapped(coding) => group.add_population(coding, occupied),
            Translation::Unmapped => {
                self.record_unmapped(&self.overall_category, TallyRole::Occupied, outcome);
            }
        }

        match self
            .translator
            .translate(&self.overall_category, TallyRole::Available)
            .await?
        {
            Translation::Mapped(coding) => {
                let count =
                    self.derive_available(&self.overall_category, entry.total.count, occupied, outcome);
                group.add_population(coding, count);
            }
            Translation::Unmapped => {
                self.record_unmapped(&self.overall_category, TallyRole::Available, outcome);
            }
        }

        Ok(group)
    }

    fn derive_available(
        &self,
        category: &str,
        total: i64,
        occupied: i64,
        outcome: &mut AggregateOutcome,
    ) -> i64 {
        let available = total - occupied;
        if available < 0 {
            tracing::warn!(
                category = %category,
                total = total,
                occupied = occupied,
                "Occupied exceeds baseline total; available clamped to 0"
            );
            outcome.clamped.push(ClampedCount {
                category: category.to_string(),
                total,
                occupied,
            });
            return 0;
        }
        available
    }

    fn record_unmapped(&self, category: &str, role: TallyRole, outcome: &mut AggregateOutcome) {
        tracing::warn!(
            category = %category,
            role = %role,
            "No tally code mapped; population omitted"
        );
        outcome.unmapped.push(UnmappedCode {
            category: category.to_string(),
            role,
        });
    }
}

/// Merges populations of successful partials keyed by (category, role)
fn merge_tallies(partials: &[PartialResult]) -> HashMap<BedTallyKey, i64> {
    let mut merged: HashMap<BedTallyKey, i64> = HashMap::new();
    for partial in partials.iter().filter(|p| !p.is_failed()) {
        for group in &partial.groups {
            for population in &group.populations {
                let key = BedTallyKey::new(group.category.clone(), population.code.clone());
                *merged.entry(key).or_insert(0) += population.count;
            }
        }
    }
    merged
}

fn warn_dropped_categories(
    merged: &HashMap<BedTallyKey, i64>,
    baseline: &TotalsBaseline,
    overall_category: &str,
) {
    let known: HashSet<&str> = baseline
        .entries
        .iter()
        .map(|e| e.category.code.as_str())
        .collect();
    let dropped: HashSet<&str> = merged
        .keys()
        .map(|k| k.category().code.as_str())
        .filter(|code| !known.contains(code) && *code != overall_category)
        .collect();
    for code in dropped {
        tracing::warn!(
            category = %code,
            "Tallies for category absent from the totals baseline were dropped"
        );
    }
}
