//! Partition engine: pivots a flat issue list into a column × row grid.

use super::{Bucket, Column, Grid, Row};
use crate::data::{Issue, PartitionKey};
use std::collections::{BTreeSet, HashSet};

/// Raw values an issue contributes along an axis.
///
/// Single-valued keys yield at most one value. Empty strings are passed
/// through; callers decide whether they count as "no value".
pub fn bucket_values(issue: &Issue, key: PartitionKey) -> Vec<&str> {
    match key {
        PartitionKey::State => vec![issue.state.as_str()],
        PartitionKey::Label => issue.labels.iter().map(|l| l.name.as_str()).collect(),
        PartitionKey::Assignee => issue.assignees.iter().map(|a| a.login.as_str()).collect(),
        PartitionKey::Milestone => issue.milestone_title().into_iter().collect(),
    }
}

/// Whether an issue belongs to a bucket along an axis.
///
/// An issue is in the empty bucket when it has no value for the key, or when
/// one of its labels/logins is itself the empty string. A named bucket never
/// matches the empty string.
pub fn matches_bucket(issue: &Issue, key: PartitionKey, bucket: &Bucket) -> bool {
    let values = bucket_values(issue, key);
    match bucket {
        Bucket::Named(name) => !name.is_empty() && values.iter().any(|v| v == name),
        Bucket::Empty => values.is_empty() || values.iter().any(|v| v.is_empty()),
    }
}

/// Distinct non-empty buckets in first-seen order, empty bucket last
fn column_buckets(issues: &[Issue], key: PartitionKey) -> Vec<Bucket> {
    let mut seen = HashSet::new();
    let mut buckets: Vec<Bucket> = issues
        .iter()
        .flat_map(|issue| bucket_values(issue, key))
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .map(|v| Bucket::Named(v.to_string()))
        .collect();
    buckets.push(Bucket::Empty);
    buckets
}

/// Distinct non-empty buckets in ascending order, empty bucket last
fn row_buckets(issues: &[Issue], key: PartitionKey) -> Vec<Bucket> {
    let sorted: BTreeSet<&str> = issues
        .iter()
        .flat_map(|issue| bucket_values(issue, key))
        .filter(|v| !v.is_empty())
        .collect();
    let mut buckets: Vec<Bucket> = sorted
        .into_iter()
        .map(|v| Bucket::Named(v.to_string()))
        .collect();
    buckets.push(Bucket::Empty);
    buckets
}

/// Pivot `issues` into a grid.
///
/// Columns keep first-seen order while rows are sorted; both axes end with
/// the empty bucket. Every column carries the same row set so each cell
/// exists as a drop target even when it holds no issue.
pub fn compute_grid(issues: &[Issue], columns_key: PartitionKey, rows_key: PartitionKey) -> Grid {
    let rows = row_buckets(issues, rows_key);

    let columns = column_buckets(issues, columns_key)
        .into_iter()
        .enumerate()
        .map(|(col_idx, col_bucket)| {
            let in_column: Vec<&Issue> = issues
                .iter()
                .filter(|issue| matches_bucket(issue, columns_key, &col_bucket))
                .collect();

            let rows = rows
                .iter()
                .enumerate()
                .map(|(row_idx, row_bucket)| Row {
                    id: row_idx.to_string(),
                    title: row_bucket.value().to_string(),
                    bucket: row_bucket.clone(),
                    issues: in_column
                        .iter()
                        .filter(|issue| matches_bucket(issue, rows_key, row_bucket))
                        .map(|issue| (*issue).clone())
                        .collect(),
                })
                .collect();

            Column {
                id: (col_idx + 1).to_string(),
                title: col_bucket.value().to_string(),
                bucket: col_bucket,
                rows,
            }
        })
        .collect();

    Grid { columns }
}
