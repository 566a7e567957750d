//! Closed-form coordinates for separable grids that need no projection.

use projection::GridOrigin;

use crate::descriptor::GridDescriptor;
use crate::engine::{BufferLayout, ComputedBuffer};

/// Evenly spaced cell centers from `near` towards `far`.
fn cell_centers(near: f64, far: f64, count: usize) -> Vec<f64> {
    let step = (far - near) / count as f64;
    (0..count)
        .map(|i| near + i as f64 * step + step / 2.0)
        .collect()
}

/// Geographic grid whose corners are plain degrees.
///
/// Large global grids would otherwise push every cell through the
/// projection primitive just to recover a linear ramp.
pub(crate) fn plain_degrees(descriptor: &GridDescriptor) -> ComputedBuffer {
    let [west, north] = descriptor.corner_upleft;
    let [east, south] = descriptor.corner_lowright;

    let (lat_near, lat_far) = match descriptor.grid_origin {
        GridOrigin::UpperLeft | GridOrigin::UpperRight => (north, south),
        GridOrigin::LowerLeft | GridOrigin::LowerRight => (south, north),
    };
    let (lon_near, lon_far) = match descriptor.grid_origin {
        GridOrigin::UpperLeft | GridOrigin::LowerLeft => (west, east),
        GridOrigin::UpperRight | GridOrigin::LowerRight => (east, west),
    };

    ComputedBuffer {
        latitude: cell_centers(lat_near, lat_far, descriptor.ydim_size),
        longitude: cell_centers(lon_near, lon_far, descriptor.xdim_size),
        layout: BufferLayout::Vector {
            ydim: descriptor.ydim_size,
            xdim: descriptor.xdim_size,
        },
    }
}

/// Grid with no projection metadata, assumed to span the whole globe.
pub(crate) fn global_extent(descriptor: &GridDescriptor) -> ComputedBuffer {
    ComputedBuffer {
        latitude: cell_centers(90.0, -90.0, descriptor.ydim_size),
        longitude: cell_centers(-180.0, 180.0, descriptor.xdim_size),
        layout: BufferLayout::Vector {
            ydim: descriptor.ydim_size,
            xdim: descriptor.xdim_size,
        },
    }
}
