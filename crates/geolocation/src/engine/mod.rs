//! Full-resolution latitude/longitude computation.
//!
//! [`compute`] dispatches on the grid's projection:
//!
//! ```text
//! Unprojected ─────────────────► global extent fast path   (Vector)
//! Geographic, plain degrees ───► corner interpolation      (Vector)
//! Geographic (DMS) / CEA ──────► ij_to_lonlat, row + column (Vector)
//! Sinusoidal ──────────────────► ij_to_lonlat + line repair (Full)
//! Lambert azimuthal ───────────► ij_to_lonlat + nearest fill (Full)
//! Polar stereographic ─────────► ij_to_lonlat               (Full)
//! SOM ─────────────────────────► 180 blocks                 (Full, rank 3)
//! ```
//!
//! Longitudes are normalized into [-180, 180] last, so cached buffers
//! already hold the served values.

mod fast_path;
mod fill;
mod generic;
mod som;

use projection::{GctpProjection, UNDEFINED};
use tracing::debug;

use crate::descriptor::{GridDescriptor, Projection};
use crate::error::{GeolocationError, Result};
use crate::normalize::{needs_normalization, normalize_longitude};
use crate::types::FieldTag;

/// How a [`ComputedBuffer`] stores its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferLayout {
    /// One latitude per row (`ydim` values) and one longitude per column
    /// (`xdim` values).
    Vector { ydim: usize, xdim: usize },
    /// One value per cell in storage order with the given dimensions.
    Full { dims: Vec<usize> },
}

impl BufferLayout {
    /// The layout [`compute`] produces for a grid.
    pub fn for_descriptor(descriptor: &GridDescriptor) -> Self {
        if descriptor.is_separable() {
            return Self::Vector {
                ydim: descriptor.ydim_size,
                xdim: descriptor.xdim_size,
            };
        }
        let [d0, d1] = descriptor.natural_dims();
        let dims = if descriptor.projection == Projection::Gctp(GctpProjection::Som) {
            vec![projection::SOM_BLOCK_COUNT, d0, d1]
        } else {
            vec![d0, d1]
        };
        Self::Full { dims }
    }

    /// Dimensions of one field's values.
    pub fn field_dims(&self, field: FieldTag) -> Vec<usize> {
        match (self, field) {
            (Self::Vector { ydim, .. }, FieldTag::Latitude) => vec![*ydim],
            (Self::Vector { xdim, .. }, FieldTag::Longitude) => vec![*xdim],
            (Self::Full { dims }, _) => dims.clone(),
        }
    }

    /// Number of values stored for one field.
    pub fn field_len(&self, field: FieldTag) -> usize {
        self.field_dims(field).iter().product()
    }

    /// Offset, in values, of a field within the cache blob.
    pub fn field_offset(&self, field: FieldTag) -> usize {
        match field {
            FieldTag::Latitude => 0,
            FieldTag::Longitude => self.field_len(FieldTag::Latitude),
        }
    }

    /// Total number of values in the blob.
    pub fn total_len(&self) -> usize {
        self.field_len(FieldTag::Latitude) + self.field_len(FieldTag::Longitude)
    }
}

/// Latitudes and longitudes for a whole grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedBuffer {
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub layout: BufferLayout,
}

impl ComputedBuffer {
    pub fn field(&self, field: FieldTag) -> &[f64] {
        match field {
            FieldTag::Latitude => &self.latitude,
            FieldTag::Longitude => &self.longitude,
        }
    }

    /// Size of the serialized buffer in bytes.
    pub fn byte_len(&self) -> u64 {
        ((self.latitude.len() + self.longitude.len()) * std::mem::size_of::<f64>()) as u64
    }
}

/// Options for [`compute`].
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub normalize_longitude: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            normalize_longitude: true,
        }
    }
}

/// Compute latitude and longitude for every cell of a grid.
pub fn compute(descriptor: &GridDescriptor, options: EngineOptions) -> Result<ComputedBuffer> {
    let mut buffer = match descriptor.projection {
        Projection::Unprojected => fast_path::global_extent(descriptor),
        Projection::Unsupported(code) => {
            return Err(GeolocationError::projection(format!(
                "GCTP projection code {} is not supported",
                code
            )))
        }
        Projection::Gctp(GctpProjection::Geographic) if descriptor.has_plain_degree_corners() => {
            fast_path::plain_degrees(descriptor)
        }
        Projection::Gctp(GctpProjection::Geographic | GctpProjection::Cea) => {
            generic::compute_separable(descriptor)?
        }
        Projection::Gctp(GctpProjection::Som) => som::compute(descriptor)?,
        Projection::Gctp(GctpProjection::Sinusoidal) => {
            let mut buffer = generic::compute_full(descriptor)?;
            fill::extrapolate_lines(&mut buffer)?;
            buffer
        }
        Projection::Gctp(GctpProjection::LambertAzimuthal) => {
            let mut buffer = generic::compute_full(descriptor)?;
            fill::nearest_neighbor(&mut buffer)?;
            buffer
        }
        Projection::Gctp(GctpProjection::PolarStereographic) => generic::compute_full(descriptor)?,
    };

    if options.normalize_longitude && needs_normalization(&buffer.longitude, UNDEFINED) {
        debug!(projection = %descriptor.projection, "normalizing [0, 360) longitudes");
        normalize(&mut buffer, descriptor);
    }

    Ok(buffer)
}

/// Normalize every line running along the grid's X axis.
fn normalize(buffer: &mut ComputedBuffer, descriptor: &GridDescriptor) {
    match &buffer.layout {
        BufferLayout::Vector { .. } => {
            normalize_longitude(&mut buffer.longitude, UNDEFINED);
        }
        BufferLayout::Full { dims } => {
            let axis = if descriptor.ydim_major {
                dims.len() - 1
            } else {
                dims.len() - 2
            };
            let dims = dims.clone();
            for_each_line(&mut buffer.longitude, &dims, axis, |line| {
                normalize_longitude(line, UNDEFINED);
            });
        }
    }
}

/// Call `f` on every line of a row-major array that runs along `axis`.
///
/// Lines along the last axis are contiguous and passed in place; others are
/// gathered into a scratch buffer and scattered back.
pub(crate) fn for_each_line<F>(data: &mut [f64], dims: &[usize], axis: usize, mut f: F)
where
    F: FnMut(&mut [f64]),
{
    let len = dims[axis];
    if len == 0 {
        return;
    }
    if axis + 1 == dims.len() {
        for line in data.chunks_exact_mut(len) {
            f(line);
        }
        return;
    }

    let inner: usize = dims[axis + 1..].iter().product();
    let outer: usize = dims[..axis].iter().product();
    let mut scratch = vec![0.0; len];
    for o in 0..outer {
        let base = o * len * inner;
        for i in 0..inner {
            for (k, v) in scratch.iter_mut().enumerate() {
                *v = data[base + k * inner + i];
            }
            f(&mut scratch);
            for (k, v) in scratch.iter().enumerate() {
                data[base + k * inner + i] = *v;
            }
        }
    }
}
