//! Occurrence constraint calculator
//!
//! Sizes and fills parent containers from a declared maximum occurrence:
//!
//! ```text
//! items   max        parents   placement
//! 0       any        0         -
//! n       none/<=0   1         all in parent 0
//! n<=max  max        1         all in parent 0
//! n>max   max        ceil(n/max)  item i in parent i/max
//! ```

use crate::descriptor::OccurrenceRange;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// How many items one parent may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    Unlimited,
    AtMost(u64),
}

impl Capacity {
    /// Capacity from a declared range; a non-positive maximum is reported
    /// and treated as unlimited
    pub fn from_range(range: Option<&OccurrenceRange>, diagnostics: &mut Diagnostics) -> Self {
        match range.and_then(|r| r.max) {
            None => Capacity::Unlimited,
            Some(max) => Self::from_declared_max(max, diagnostics),
        }
    }

    /// Files per data-object container.
    ///
    /// One file per container unless a maximum is declared; an explicitly
    /// unknown maximum means unlimited.
    pub fn files_per_container(
        range: Option<&OccurrenceRange>,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        match range {
            Some(OccurrenceRange { max: Some(max), .. }) => {
                Self::from_declared_max(*max, diagnostics)
            }
            Some(OccurrenceRange {
                max_unknown: true, ..
            }) => Capacity::Unlimited,
            _ => Capacity::AtMost(1),
        }
    }

    fn from_declared_max(max: i64, diagnostics: &mut Diagnostics) -> Self {
        match u64::try_from(max) {
            Ok(max) if max > 0 => Capacity::AtMost(max),
            _ => {
                diagnostics.error(
                    DiagnosticKind::InvalidMaximum,
                    format!("Invalid maximum occurrence of {max} (considering unlimited)"),
                );
                Capacity::Unlimited
            }
        }
    }

    /// Number of parents needed to hold `count` items
    pub fn required_parents(self, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        match self {
            Capacity::Unlimited => 1,
            Capacity::AtMost(max) => {
                let count = count as u64;
                usize::try_from(count.div_ceil(max)).unwrap_or(usize::MAX)
            }
        }
    }

    /// Parent index of the item at zero-based `position`
    pub fn parent_index(self, position: usize) -> usize {
        match self {
            Capacity::Unlimited => 0,
            Capacity::AtMost(max) => {
                usize::try_from(position as u64 / max).unwrap_or(usize::MAX)
            }
        }
    }

    /// Whether a parent already holding `held` items must roll over
    pub fn is_full(self, held: usize) -> bool {
        match self {
            Capacity::Unlimited => false,
            Capacity::AtMost(max) => held as u64 >= max,
        }
    }
}

/// Parents required for `count` items under a declared range
pub fn required_parents(
    range: Option<&OccurrenceRange>,
    count: usize,
    diagnostics: &mut Diagnostics,
) -> usize {
    Capacity::from_range(range, diagnostics).required_parents(count)
}

/// Place every item into `parents[position / max]`, in item order.
///
/// # Panics
///
/// When fewer parents were created than [`Capacity::required_parents`]
/// returns for these items.
#[allow(clippy::panic)]
pub fn dispatch<P, T>(
    parents: &mut [P],
    capacity: Capacity,
    items: impl IntoIterator<Item = T>,
    mut place: impl FnMut(&mut P, T),
) {
    let available = parents.len();
    for (position, item) in items.into_iter().enumerate() {
        let index = capacity.parent_index(position);
        let Some(parent) = parents.get_mut(index) else {
            panic!(
                "dispatch precondition violated: item {position} needs parent {index} \
                 but only {available} parent(s) were created"
            );
        };
        place(parent, item);
    }
}

/// Report when fewer instances than the declared minimum were collected
pub fn check_minimum(
    range: Option<&OccurrenceRange>,
    count: usize,
    what: &str,
    diagnostics: &mut Diagnostics,
) -> bool {
    match range.and_then(|r| r.min) {
        Some(min) if range.is_some_and(|r| r.is_below_min(count)) => {
            diagnostics.warn(
                DiagnosticKind::BelowMinimum,
                format!(
                    "Too few instances collected from {what}: {count} found, a minimum of {min} \
                     required (proceeding anyway)"
                ),
            );
            false
        }
        _ => true,
    }
}

/// Report when more instances than the declared maximum were collected
pub fn check_maximum(
    range: Option<&OccurrenceRange>,
    count: usize,
    what: &str,
    diagnostics: &mut Diagnostics,
) -> bool {
    match range.and_then(|r| r.max) {
        Some(max) if range.is_some_and(|r| r.is_above_max(count)) => {
            diagnostics.warn(
                DiagnosticKind::AboveMaximum,
                format!("{count} instance(s) collected from {what} exceed the maximum of {max}"),
            );
            false
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_required_parents {
        ($name:ident, $range:expr, $count:expr, $expected:expr) => {
            #[test]
            fn $name() {
                let range: Option<OccurrenceRange> = $range;
                let mut diagnostics = Diagnostics::new();
                assert_eq!(
                    required_parents(range.as_ref(), $count, &mut diagnostics),
                    $expected
                );
            }
        };
    }

    test_required_parents!(test_no_items_any_range, Some(OccurrenceRange::at_most(3)), 0, 0);
    test_required_parents!(test_no_items_no_range, None, 0, 0);
    test_required_parents!(test_absent_range, None, 50, 1);
    test_required_parents!(test_absent_max, Some(OccurrenceRange::at_least(5)), 50, 1);
    test_required_parents!(test_zero_max, Some(OccurrenceRange::at_most(0)), 7, 1);
    test_required_parents!(test_negative_max, Some(OccurrenceRange::at_most(-2)), 7, 1);
    test_required_parents!(test_count_equals_max, Some(OccurrenceRange::at_most(4)), 4, 1);
    test_required_parents!(test_count_below_max, Some(OccurrenceRange::at_most(4)), 3, 1);
    test_required_parents!(test_one_over_max, Some(OccurrenceRange::at_most(4)), 5, 2);
    test_required_parents!(test_exact_multiple, Some(OccurrenceRange::at_most(4)), 12, 3);
    test_required_parents!(test_ceil, Some(OccurrenceRange::at_most(3)), 10, 4);
    test_required_parents!(test_max_one, Some(OccurrenceRange::at_most(1)), 9, 9);

    #[test]
    fn test_invalid_max_is_reported() {
        let mut diagnostics = Diagnostics::new();
        let capacity = Capacity::from_range(Some(&OccurrenceRange::at_most(0)), &mut diagnostics);
        assert_eq!(capacity, Capacity::Unlimited);
        assert_eq!(diagnostics.count(DiagnosticKind::InvalidMaximum), 1);
    }

    #[test]
    fn test_valid_or_absent_max_is_silent() {
        let mut diagnostics = Diagnostics::new();
        Capacity::from_range(Some(&OccurrenceRange::at_most(2)), &mut diagnostics);
        Capacity::from_range(Some(&OccurrenceRange::at_least(2)), &mut diagnostics);
        Capacity::from_range(None, &mut diagnostics);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_dispatch_places_by_index() {
        let capacity = Capacity::AtMost(3);
        let items: Vec<usize> = (0..8).collect();
        let mut parents = vec![Vec::new(); capacity.required_parents(items.len())];

        dispatch(&mut parents, capacity, items.iter().copied(), |parent, item| {
            parent.push(item);
        });

        assert_eq!(parents, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7]]);
        for (index, parent) in parents.iter().enumerate() {
            for item in parent {
                assert_eq!(item / 3, index);
            }
        }
    }

    #[test]
    fn test_dispatch_unlimited_goes_to_first_parent() {
        let mut parents = vec![Vec::new(), Vec::new()];
        dispatch(&mut parents, Capacity::Unlimited, ["a", "b", "c"], |parent, item| {
            parent.push(item);
        });
        assert_eq!(parents, vec![vec!["a", "b", "c"], Vec::new()]);
    }

    #[test]
    fn test_dispatch_into_shared_parents_starts_at_zero() {
        let mut parents = vec![vec!["x1", "x2"]];
        parents.push(Vec::new());
        dispatch(&mut parents, Capacity::AtMost(1), ["y1", "y2"], |parent, item| {
            parent.push(item);
        });
        assert_eq!(parents, vec![vec!["x1", "x2", "y1"], vec!["y2"]]);
    }

    #[test]
    #[should_panic(expected = "dispatch precondition violated")]
    fn test_dispatch_without_enough_parents_panics() {
        let mut parents = vec![Vec::new()];
        dispatch(&mut parents, Capacity::AtMost(2), [1, 2, 3], |parent: &mut Vec<i32>, item| {
            parent.push(item);
        });
    }

    #[test]
    fn test_files_per_container_defaults() {
        let mut diagnostics = Diagnostics::new();
        assert_eq!(
            Capacity::files_per_container(None, &mut diagnostics),
            Capacity::AtMost(1)
        );
        assert_eq!(
            Capacity::files_per_container(Some(&OccurrenceRange::at_least(1)), &mut diagnostics),
            Capacity::AtMost(1)
        );
        assert_eq!(
            Capacity::files_per_container(Some(&OccurrenceRange::unknown_max()), &mut diagnostics),
            Capacity::Unlimited
        );
        assert_eq!(
            Capacity::files_per_container(Some(&OccurrenceRange::at_most(5)), &mut diagnostics),
            Capacity::AtMost(5)
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_is_full_rolls_over_at_max() {
        assert!(!Capacity::AtMost(2).is_full(1));
        assert!(Capacity::AtMost(2).is_full(2));
        assert!(!Capacity::Unlimited.is_full(10_000));
    }

    #[test]
    fn test_minimum_and_maximum_checks() {
        let mut diagnostics = Diagnostics::new();
        let range = OccurrenceRange::between(2, 3);

        assert!(!check_minimum(Some(&range), 1, "group type \"G\"", &mut diagnostics));
        assert!(check_minimum(Some(&range), 2, "group type \"G\"", &mut diagnostics));
        assert!(!check_maximum(Some(&range), 4, "group type \"G\"", &mut diagnostics));
        assert!(check_maximum(None, 4, "group type \"G\"", &mut diagnostics));

        assert_eq!(diagnostics.count(DiagnosticKind::BelowMinimum), 1);
        assert_eq!(diagnostics.count(DiagnosticKind::AboveMaximum), 1);
    }
}
