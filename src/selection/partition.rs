use std::ops::Range;

use glam::Vec3;

use super::executor::SelectionQuery;
use super::kernel::classify;
use crate::points::{PointStore, COMPONENTS};

/// Split `[0, point_count)` into `partitions` contiguous ranges.
///
/// Every range but the last holds `point_count / partitions` points; the
/// last absorbs the remainder. The ranges are disjoint, ascending, and
/// cover every index exactly once. `partitions == 0` is treated as one.
#[must_use]
pub fn partition_ranges(
    point_count: usize,
    partitions: usize,
) -> Vec<Range<usize>> {
    let partitions = partitions.max(1);
    let per_partition = point_count / partitions;
    (0..partitions)
        .map(|i| {
            let start = i * per_partition;
            let end = if i == partitions - 1 {
                point_count
            } else {
                (i + 1) * per_partition
            };
            start..end
        })
        .collect()
}

/// Indices in `range` whose points pass the containment test, ascending.
///
/// Reads the shared buffer in place. The returned vector is handed back to
/// the caller by move.
///
/// # Panics
///
/// Panics if `range.end` exceeds the number of points in `store`.
#[must_use]
pub fn scan_partition(
    store: &PointStore,
    query: &SelectionQuery,
    range: Range<usize>,
) -> Vec<u32> {
    let first = range.start;
    let mut hits = Vec::new();
    for (offset, xyz) in store.range(range).chunks_exact(COMPONENTS).enumerate()
    {
        let point = Vec3::new(xyz[0], xyz[1], xyz[2]);
        if classify(point, &query.projection_view, &query.bounds) {
            // Store construction guarantees every index fits in u32.
            hits.push((first + offset) as u32);
        }
    }
    hits
}

/// Concatenate per-partition results in partition order.
///
/// Each input is ascending and the partitions are ascending and disjoint,
/// so the output is strictly ascending without sorting. The first buffer
/// is reused as the destination.
#[must_use]
pub fn merge_partitions(results: Vec<Vec<u32>>) -> Vec<u32> {
    let total: usize = results.iter().map(Vec::len).sum();
    let mut parts = results.into_iter();
    let Some(mut merged) = parts.next() else {
        return Vec::new();
    };
    merged.reserve_exact(total - merged.len());
    for part in parts {
        merged.extend_from_slice(&part);
    }
    merged
}
