//! Common types for geolocation requests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GeolocationError, Result};

/// Which coordinate a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldTag {
    Latitude,
    Longitude,
}

impl FieldTag {
    /// Recognize a geolocation field name (`Latitude`, `lat`, ...).
    pub fn from_field_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "latitude" | "lat" => Some(Self::Latitude),
            "longitude" | "lon" => Some(Self::Longitude),
            _ => None,
        }
    }

    pub fn is_latitude(&self) -> bool {
        matches!(self, Self::Latitude)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
        }
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selection along one axis: `count` elements starting at `offset`, every
/// `stride`-th element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSlice {
    pub offset: usize,
    pub count: usize,
    pub stride: usize,
}

impl AxisSlice {
    pub fn new(offset: usize, count: usize, stride: usize) -> Self {
        Self {
            offset,
            count,
            stride,
        }
    }

    /// The whole axis at stride 1.
    pub fn full(extent: usize) -> Self {
        Self::new(0, extent, 1)
    }

    /// Index of the `k`-th selected element.
    #[inline]
    pub fn index(&self, k: usize) -> usize {
        self.offset + k * self.stride
    }

    fn check(&self, axis: usize, extent: usize) -> Result<()> {
        if self.count == 0 {
            return Err(GeolocationError::subset(format!(
                "axis {}: count must be >= 1",
                axis
            )));
        }
        if self.stride == 0 {
            return Err(GeolocationError::subset(format!(
                "axis {}: stride must be >= 1",
                axis
            )));
        }
        let last = (self.count - 1)
            .checked_mul(self.stride)
            .and_then(|span| span.checked_add(self.offset));
        match last {
            Some(last) if last < extent => Ok(()),
            _ => Err(GeolocationError::subset(format!(
                "axis {}: offset {} + ({} - 1) * {} exceeds extent {}",
                axis, self.offset, self.count, self.stride, extent
            ))),
        }
    }
}

/// A strided rectangular selection, one [`AxisSlice`] per dimension in
/// storage order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperslab {
    pub axes: Vec<AxisSlice>,
}

impl Hyperslab {
    pub fn new(axes: Vec<AxisSlice>) -> Self {
        Self { axes }
    }

    /// Select every element of an array with the given dimensions.
    pub fn full(dims: &[usize]) -> Self {
        Self::new(dims.iter().map(|&d| AxisSlice::full(d)).collect())
    }

    /// Build from parallel offset/count/stride lists.
    pub fn from_parts(offset: &[usize], count: &[usize], stride: &[usize]) -> Result<Self> {
        if offset.len() != count.len() || count.len() != stride.len() {
            return Err(GeolocationError::subset(format!(
                "offset/count/stride lengths differ ({}/{}/{})",
                offset.len(),
                count.len(),
                stride.len()
            )));
        }
        Ok(Self::new(
            offset
                .iter()
                .zip(count)
                .zip(stride)
                .map(|((&o, &c), &s)| AxisSlice::new(o, c, s))
                .collect(),
        ))
    }

    pub fn rank(&self) -> usize {
        self.axes.len()
    }

    /// Number of values the selection yields.
    pub fn output_len(&self) -> usize {
        self.axes.iter().map(|a| a.count).product()
    }

    /// Check the selection against the variable's dimensions.
    pub fn validate(&self, dims: &[usize]) -> Result<()> {
        if self.rank() != dims.len() {
            return Err(GeolocationError::subset(format!(
                "request has rank {} but the variable has rank {}",
                self.rank(),
                dims.len()
            )));
        }
        for (axis, (slice, &extent)) in self.axes.iter().zip(dims).enumerate() {
            slice.check(axis, extent)?;
        }
        Ok(())
    }

    /// Whether the selection is every element at stride 1.
    pub fn covers(&self, dims: &[usize]) -> bool {
        self.rank() == dims.len()
            && self
                .axes
                .iter()
                .zip(dims)
                .all(|(a, &d)| a.offset == 0 && a.stride == 1 && a.count == d)
    }
}

/// A client request for a latitude or longitude subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsetRequest {
    pub field: FieldTag,
    pub hyperslab: Hyperslab,
}

impl SubsetRequest {
    pub fn new(field: FieldTag, hyperslab: Hyperslab) -> Self {
        Self { field, hyperslab }
    }

    /// Rank of the variable the client sees (3 only for SOM grids).
    pub fn final_rank(&self) -> usize {
        self.hyperslab.rank()
    }
}

/// Statistics about the file cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub purges: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
