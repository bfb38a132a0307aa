//! Column cardinality profiling and the candidate lists built from it
//!
//! Which columns may be picked as target, partition or ID is a policy over
//! distinct-value counts. The thresholds are configuration, not constants.

use polars::prelude::*;
use rayon::prelude::*;

/// Read-only view of a tabular dataset
pub trait ColumnStats {
    /// Column names in dataset order
    fn column_names(&self) -> Vec<String>;

    /// Number of distinct non-null values in a column
    fn distinct_count(&self, column: &str) -> PolarsResult<usize>;
}

impl ColumnStats for DataFrame {
    fn column_names(&self) -> Vec<String> {
        self.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn distinct_count(&self, column: &str) -> PolarsResult<usize> {
        self.column(column)?
            .as_materialized_series()
            .drop_nulls()
            .n_unique()
    }
}

/// Distinct-value count for one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnProfile {
    pub name: String,
    pub cardinality: usize,
}

/// Profile every column in parallel, preserving column order
pub fn profile_columns<S>(stats: &S) -> PolarsResult<Vec<ColumnProfile>>
where
    S: ColumnStats + Sync + ?Sized,
{
    stats
        .column_names()
        .into_par_iter()
        .map(|name| {
            let cardinality = stats.distinct_count(&name)?;
            Ok(ColumnProfile { name, cardinality })
        })
        .collect()
}

/// Upper bounds (exclusive) on distinct values for each selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateThresholds {
    pub target: usize,
    pub partition: usize,
}

impl Default for CandidateThresholds {
    fn default() -> Self {
        Self {
            target: 20,
            partition: 11,
        }
    }
}

/// Options offered by the column selectors; `None` is the empty entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnCandidates {
    pub target: Vec<Option<String>>,
    pub partition: Vec<Option<String>>,
    pub id: Vec<Option<String>>,
}

impl ColumnCandidates {
    pub fn from_profiles(profiles: &[ColumnProfile], thresholds: CandidateThresholds) -> Self {
        let pick = |keep: &dyn Fn(usize) -> bool| -> Vec<Option<String>> {
            std::iter::once(None)
                .chain(
                    profiles
                        .iter()
                        .filter(|p| keep(p.cardinality))
                        .map(|p| Some(p.name.clone())),
                )
                .collect()
        };

        Self {
            target: pick(&|n| n < thresholds.target),
            partition: pick(&|n| n < thresholds.partition),
            // Constant columns carry no signal and are only usable as identifiers
            id: pick(&|n| n == 1),
        }
    }

    /// Profile a dataset and derive its candidates in one step
    pub fn from_stats<S>(stats: &S, thresholds: CandidateThresholds) -> PolarsResult<Self>
    where
        S: ColumnStats + Sync + ?Sized,
    {
        let profiles = profile_columns(stats)?;
        Ok(Self::from_profiles(&profiles, thresholds))
    }

    pub fn is_target(&self, column: &str) -> bool {
        contains(&self.target, column)
    }

    pub fn is_partition(&self, column: &str) -> bool {
        contains(&self.partition, column)
    }

    pub fn is_id(&self, column: &str) -> bool {
        contains(&self.id, column)
    }
}

fn contains(options: &[Option<String>], column: &str) -> bool {
    options.iter().flatten().any(|c| c == column)
}
