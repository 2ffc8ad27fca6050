//! Sequence shape metadata.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Shape metadata for time-major sequence tensors.
///
/// Follows the convention `(T, B, F)`:
/// - `T`: Time steps
/// - `B`: Batch size (windows per minibatch)
/// - `F`: Features per time step
///
/// # Example
///
/// ```rust
/// use recur_core::SeqShape;
///
/// let shape = SeqShape::new(100, 64, 3);
/// assert_eq!(shape.time(), 100);
/// assert_eq!(shape.batch(), 64);
/// assert_eq!(shape.features(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeqShape {
    time: usize,
    batch: usize,
    features: usize,
}

impl SeqShape {
    /// Create a new shape.
    #[must_use]
    pub const fn new(time: usize, batch: usize, features: usize) -> Self {
        Self {
            time,
            batch,
            features,
        }
    }

    /// Create a shape from a slice of exactly three dimensions `[T, B, F]`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DimensionError`] if the slice does not hold 3 elements.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recur_core::SeqShape;
    ///
    /// let shape = SeqShape::from_dims(&[3, 2, 1]).unwrap();
    /// assert_eq!(shape.as_array(), [3, 2, 1]);
    /// assert!(SeqShape::from_dims(&[3, 2]).is_err());
    /// ```
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        match dims {
            [time, batch, features] => Ok(Self::new(*time, *batch, *features)),
            _ => Err(CoreError::DimensionError {
                expected: 3,
                got: dims.len(),
            }),
        }
    }

    /// Number of time steps.
    #[must_use]
    pub const fn time(&self) -> usize {
        self.time
    }

    /// Number of sequences in the batch.
    #[must_use]
    pub const fn batch(&self) -> usize {
        self.batch
    }

    /// Number of features per step.
    #[must_use]
    pub const fn features(&self) -> usize {
        self.features
    }

    /// True if any dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.time == 0 || self.batch == 0 || self.features == 0
    }

    /// Total number of elements.
    #[must_use]
    pub const fn numel(&self) -> usize {
        self.time * self.batch * self.features
    }

    /// Number of `(time, batch)` positions, i.e. the flattened row count
    /// used by per-step losses.
    #[must_use]
    pub const fn positions(&self) -> usize {
        self.time * self.batch
    }

    /// Convert to a tuple.
    #[must_use]
    pub const fn as_tuple(&self) -> (usize, usize, usize) {
        (self.time, self.batch, self.features)
    }

    /// Convert to an array, suitable for tensor constructors.
    #[must_use]
    pub const fn as_array(&self) -> [usize; 3] {
        [self.time, self.batch, self.features]
    }

    /// Same shape with a different number of time steps.
    #[must_use]
    pub const fn with_time(&self, time: usize) -> Self {
        Self::new(time, self.batch, self.features)
    }

    /// Same shape with a different batch size.
    #[must_use]
    pub const fn with_batch(&self, batch: usize) -> Self {
        Self::new(self.time, batch, self.features)
    }

    /// Same shape with a different feature count.
    #[must_use]
    pub const fn with_features(&self, features: usize) -> Self {
        Self::new(self.time, self.batch, features)
    }

    /// True if both shapes cover the same `(time, batch)` grid. Feature
    /// widths may differ, as between inputs and targets.
    #[must_use]
    pub const fn is_aligned(&self, other: &Self) -> bool {
        self.time == other.time && self.batch == other.batch
    }
}

impl std::fmt::Display for SeqShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(T={}, B={}, F={})", self.time, self.batch, self.features)
    }
}

impl From<(usize, usize, usize)> for SeqShape {
    fn from((time, batch, features): (usize, usize, usize)) -> Self {
        Self::new(time, batch, features)
    }
}

impl From<[usize; 3]> for SeqShape {
    fn from([time, batch, features]: [usize; 3]) -> Self {
        Self::new(time, batch, features)
    }
}
