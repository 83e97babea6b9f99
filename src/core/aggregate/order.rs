//! Report group ordering
//!
//! Downstream consumers read report groups in a fixed category order. The
//! order is configuration, not data: codes appear in their configured
//! position and codes the configuration does not mention sort after all
//! configured ones, keeping their insertion order.

use crate::domain::ReportGroup;

/// Sorts groups by the configured category order, unknown codes last
///
/// The sort is stable, so groups with unlisted category codes keep their
/// relative order.
pub fn sort_groups(groups: &mut [ReportGroup], order: &[String]) {
    groups.sort_by_key(|group| position(order, &group.category.code));
}

fn position(order: &[String], code: &str) -> usize {
    order.iter().position(|c| c == code).unwrap_or(order.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coding;

    fn group(code: &str) -> ReportGroup {
        ReportGroup::new(Coding::new("urn:example:bed-types", code))
    }

    fn codes(groups: &[ReportGroup]) -> Vec<&str> {
        groups.iter().map(|g| g.category.code.as_str()).collect()
    }

    fn order(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_sorts_by_configured_order() {
        let mut groups = vec![group("Beds"), group("MC"), group("CC")];
        sort_groups(&mut groups, &order(&["CC", "MC", "Beds"]));
        assert_eq!(codes(&groups), vec!["CC", "MC", "Beds"]);
    }

    #[test]
    fn test_unknown_codes_sort_last_in_insertion_order() {
        let mut groups = vec![group("ZZ"), group("CC"), group("AA"), group("MC")];
        sort_groups(&mut groups, &order(&["CC", "MC"]));
        assert_eq!(codes(&groups), vec!["CC", "MC", "ZZ", "AA"]);
    }

    #[test]
    fn test_empty_order_preserves_insertion() {
        let mut groups = vec![group("MC"), group("CC")];
        sort_groups(&mut groups, &[]);
        assert_eq!(codes(&groups), vec!["MC", "CC"]);
    }
}
