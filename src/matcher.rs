//! Row matching module
//!
//! Selects the rows of a table whose cell in one column matches the target set.

use ahash::RandomState;
use clap::ValueEnum;
use hashbrown::HashSet;
use memchr::memmem::Finder;
use std::fmt;
use std::str::FromStr;

use crate::error::{FilterError, Result};
use crate::table::Table;
use crate::targets::TargetSet;

/// How a cell is compared against the target strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MatchPolicy {
    /// Cell contains any target as a substring
    #[value(alias = "substring")]
    Contains,
    /// Cell equals one of the targets
    #[value(alias = "membership")]
    Exact,
}

impl MatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Exact => "exact",
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchPolicy {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contains" | "substring" => Ok(Self::Contains),
            "exact" | "membership" => Ok(Self::Exact),
            other => Err(FilterError::config(format!(
                "Unknown match mode '{}': expected 'contains' or 'exact'",
                other
            ))),
        }
    }
}

enum Compiled {
    Contains(Vec<Finder<'static>>),
    Exact(HashSet<String, RandomState>),
}

/// Target set compiled for one policy
pub struct RowMatcher {
    policy: MatchPolicy,
    compiled: Compiled,
}

impl RowMatcher {
    pub fn new(targets: &TargetSet, policy: MatchPolicy) -> Self {
        let compiled = match policy {
            MatchPolicy::Contains => Compiled::Contains(
                targets
                    .iter()
                    .map(|t| Finder::new(t.as_bytes()).into_owned())
                    .collect(),
            ),
            MatchPolicy::Exact => {
                let mut set = HashSet::with_capacity_and_hasher(targets.len(), RandomState::new());
                set.extend(targets.iter().map(str::to_string));
                Compiled::Exact(set)
            }
        };

        Self { policy, compiled }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Check a single cell
    #[inline]
    pub fn matches(&self, cell: &str) -> bool {
        match &self.compiled {
            Compiled::Contains(finders) => finders
                .iter()
                .any(|finder| finder.find(cell.as_bytes()).is_some()),
            Compiled::Exact(set) => set.contains(cell),
        }
    }

    /// Select matching rows, calling `on_row` once per scanned row
    ///
    /// The returned table keeps the header and the original row order.
    pub fn select<F>(&self, table: &Table, column: usize, mut on_row: F) -> Result<Table>
    where
        F: FnMut(),
    {
        let width = table.width();
        if column >= width {
            return Err(FilterError::ColumnOutOfRange {
                index: column,
                width,
            });
        }

        let mut selected = Vec::new();
        for row in table.rows() {
            // Rows share the header width, so the cell is always present
            if row.get(column).is_some_and(|cell| self.matches(cell)) {
                selected.push(row.clone());
            }
            on_row();
        }

        Ok(table.with_rows(selected))
    }
}

/// Rows of `table` whose cell at `column_index` matches `targets` under `policy`
pub fn filter_rows(
    table: &Table,
    column_index: usize,
    targets: &TargetSet,
    policy: MatchPolicy,
) -> Result<Table> {
    RowMatcher::new(targets, policy).select(table, column_index, || {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::parse_table;
    use std::path::Path;

    fn fruit_table() -> Table {
        let text = "id,name,description\n\
                    1,apple,A red fruit\n\
                    2,banana,A yellow fruit\n\
                    3,orange,An orange fruit\n";
        parse_table(text, b',', true, Path::new("fruit.csv")).unwrap()
    }

    fn ids(table: &Table) -> Vec<&str> {
        table.rows().iter().map(|r| &r[0]).collect()
    }

    fn targets(items: &[&str]) -> TargetSet {
        items.iter().copied().collect()
    }

    #[test]
    fn test_contains_on_description() {
        let table = fruit_table();
        let result =
            filter_rows(&table, 2, &targets(&["red", "orange"]), MatchPolicy::Contains).unwrap();

        assert_eq!(ids(&result), vec!["1", "3"]);
        assert_eq!(result.header(), table.header());
    }

    #[test]
    fn test_exact_and_contains_can_coincide() {
        let table = fruit_table();
        let t = targets(&["orange"]);

        let exact = filter_rows(&table, 1, &t, MatchPolicy::Exact).unwrap();
        let contains = filter_rows(&table, 1, &t, MatchPolicy::Contains).unwrap();

        assert_eq!(ids(&exact), vec!["3"]);
        assert_eq!(ids(&contains), vec!["3"]);
    }

    #[test]
    fn test_exact_requires_whole_cell() {
        let table = fruit_table();
        let result = filter_rows(&table, 2, &targets(&["red"]), MatchPolicy::Exact).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_case_sensitive() {
        let table = fruit_table();
        let t = targets(&["Orange", "APPLE"]);

        assert!(filter_rows(&table, 1, &t, MatchPolicy::Exact).unwrap().is_empty());
        assert!(filter_rows(&table, 1, &t, MatchPolicy::Contains).unwrap().is_empty());
    }

    #[test]
    fn test_numeric_cells_compare_as_text() {
        let table = fruit_table();
        let result = filter_rows(&table, 0, &targets(&["2"]), MatchPolicy::Exact).unwrap();
        assert_eq!(ids(&result), vec!["2"]);
    }

    #[test]
    fn test_empty_targets_yield_empty_result() {
        let table = fruit_table();
        for policy in [MatchPolicy::Contains, MatchPolicy::Exact] {
            let result = filter_rows(&table, 2, &TargetSet::default(), policy).unwrap();
            assert!(result.is_empty());
            assert!(result.header().is_some());
        }
    }

    #[test]
    fn test_column_out_of_range() {
        let table = fruit_table();
        let err = filter_rows(&table, 5, &targets(&["red"]), MatchPolicy::Contains).unwrap_err();

        match err {
            FilterError::ColumnOutOfRange { index, width } => {
                assert_eq!(index, 5);
                assert_eq!(width, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Exactly at the width is also out of range
        assert!(filter_rows(&table, 3, &targets(&["red"]), MatchPolicy::Exact).is_err());
    }

    #[test]
    fn test_column_checked_before_empty_targets() {
        let table = fruit_table();
        let err = filter_rows(&table, 9, &TargetSet::default(), MatchPolicy::Exact).unwrap_err();
        assert!(matches!(err, FilterError::ColumnOutOfRange { .. }));
    }

    #[test]
    fn test_contains_superset_of_exact_and_order_preserved() {
        let text = "k,v\n\
                    1,ab\n\
                    2,b\n\
                    3,abc\n\
                    4,c\n\
                    5,b\n\
                    6,xbx\n";
        let table = parse_table(text, b',', true, Path::new("t.csv")).unwrap();

        for t in [vec!["b"], vec!["ab", "c"], vec!["z"], vec!["b", "b"]] {
            let t = targets(&t);
            let exact = filter_rows(&table, 1, &t, MatchPolicy::Exact).unwrap();
            let contains = filter_rows(&table, 1, &t, MatchPolicy::Contains).unwrap();

            let exact_ids = ids(&exact);
            let contains_ids = ids(&contains);
            assert!(exact_ids.iter().all(|id| contains_ids.contains(id)));

            let mut sorted = contains_ids.clone();
            sorted.sort_by_key(|id| id.parse::<u32>().unwrap());
            assert_eq!(contains_ids, sorted);
        }
    }

    #[test]
    fn test_select_ticks_every_row() {
        let table = fruit_table();
        let matcher = RowMatcher::new(&targets(&["fruit"]), MatchPolicy::Contains);

        let mut ticks = 0;
        let result = matcher.select(&table, 2, || ticks += 1).unwrap();

        assert_eq!(ticks, 3);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("contains".parse::<MatchPolicy>().unwrap(), MatchPolicy::Contains);
        assert_eq!(" Exact ".parse::<MatchPolicy>().unwrap(), MatchPolicy::Exact);
        assert_eq!("membership".parse::<MatchPolicy>().unwrap(), MatchPolicy::Exact);
        assert!("fuzzy".parse::<MatchPolicy>().is_err());
    }
}
