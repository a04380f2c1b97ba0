//! Screen-space rectangle selection over a point cloud.
//!
//! [`kernel::classify`] is the per-point containment test,
//! [`partition`] splits the index space and scans one slice of it, and
//! [`executor::SelectionExecutor`] fans a query out over a fixed worker
//! pool and merges the partition results in index order.

/// Fixed worker pool, query dispatch, and result merging.
pub mod executor;
/// Projection and containment test for a single point.
pub mod kernel;
/// Index-range partitioning and the per-partition scan.
pub mod partition;
/// Pointer coordinates, surface bounds, and selection rectangles.
pub mod rect;

pub use executor::{
    PendingSelection, SelectionExecutor, SelectionOutcome, SelectionQuery,
};
pub use kernel::classify;
pub use rect::{Coords, NormalizedBounds, PixelBox, SelectionRect, SurfaceRect};
