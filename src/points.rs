//! Flat, read-only point position storage shared with selection workers.
//!
//! Positions are stored as one contiguous `f32` buffer (`x, y, z` per
//! point) behind an [`Arc`], so handing the store to a worker thread
//! clones a pointer, never the buffer itself.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use glam::Vec3;
use rand::Rng;

/// Number of `f32` components per point.
pub const COMPONENTS: usize = 3;

/// Errors raised while building a [`PointStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointStoreError {
    /// Buffer length is not a multiple of three.
    Misaligned {
        /// Length of the rejected buffer.
        len: usize,
    },
    /// More points than a `u32` selection index can address.
    TooManyPoints {
        /// Number of points in the rejected buffer.
        count: usize,
    },
}

impl fmt::Display for PointStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Misaligned { len } => write!(
                f,
                "position buffer length {len} is not a multiple of \
                 {COMPONENTS}"
            ),
            Self::TooManyPoints { count } => {
                write!(f, "{count} points exceed the u32 index range")
            }
        }
    }
}

impl std::error::Error for PointStoreError {}

/// Immutable point positions, cheap to clone and share across threads.
///
/// Point `i` occupies `positions()[3 * i..3 * i + 3]`. The buffer is fixed
/// at construction and never written again.
#[derive(Clone)]
pub struct PointStore {
    positions: Arc<[f32]>,
}

impl PointStore {
    /// Take ownership of a flat `x, y, z` position buffer.
    ///
    /// # Errors
    ///
    /// Returns [`PointStoreError::Misaligned`] if the buffer length is not a
    /// multiple of three and [`PointStoreError::TooManyPoints`] if the point
    /// count does not fit in a `u32` index.
    pub fn from_positions(positions: Vec<f32>) -> Result<Self, PointStoreError> {
        if positions.len() % COMPONENTS != 0 {
            return Err(PointStoreError::Misaligned {
                len: positions.len(),
            });
        }
        let count = positions.len() / COMPONENTS;
        if u32::try_from(count).is_err() {
            return Err(PointStoreError::TooManyPoints { count });
        }
        Ok(Self {
            positions: positions.into(),
        })
    }

    /// Build a store from a slice of vectors.
    ///
    /// # Errors
    ///
    /// Returns [`PointStoreError::TooManyPoints`] if the point count does
    /// not fit in a `u32` index.
    pub fn from_points(points: &[Vec3]) -> Result<Self, PointStoreError> {
        let positions = points.iter().flat_map(|p| p.to_array()).collect();
        Self::from_positions(positions)
    }

    /// Fill a cube of side `extent` centered at the origin with `count`
    /// uniformly distributed points.
    ///
    /// # Errors
    ///
    /// Returns [`PointStoreError::TooManyPoints`] if `count` does not fit in
    /// a `u32` index or its component count overflows `usize`.
    pub fn random<R: Rng + ?Sized>(
        count: usize,
        extent: f32,
        rng: &mut R,
    ) -> Result<Self, PointStoreError> {
        let components = count
            .checked_mul(COMPONENTS)
            .filter(|_| u32::try_from(count).is_ok())
            .ok_or(PointStoreError::TooManyPoints { count })?;
        let positions = (0..components)
            .map(|_| (rng.random::<f32>() - 0.5) * extent)
            .collect();
        Self::from_positions(positions)
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len() / COMPONENTS
    }

    /// Whether the store holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of point `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn point(&self, index: usize) -> Vec3 {
        let base = index * COMPONENTS;
        Vec3::from_slice(&self.positions[base..base + COMPONENTS])
    }

    /// The whole flat position buffer.
    #[must_use]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat positions of the points in `range` (point indices, not
    /// component indices).
    ///
    /// # Panics
    ///
    /// Panics if `range.end > self.len()`.
    #[must_use]
    pub fn range(&self, range: Range<usize>) -> &[f32] {
        &self.positions[range.start * COMPONENTS..range.end * COMPONENTS]
    }

    /// Raw bytes of the position buffer, for vertex buffer upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Whether two handles share the same underlying buffer.
    #[must_use]
    pub fn shares_buffer(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.positions, &other.positions)
    }
}

impl fmt::Debug for PointStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointStore")
            .field("len", &self.len())
            .finish()
    }
}
