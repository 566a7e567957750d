//! Generic inverse projection through `ij_to_lonlat`.

use projection::ij_to_lonlat;

use crate::descriptor::GridDescriptor;
use crate::engine::{BufferLayout, ComputedBuffer};
use crate::error::{GeolocationError, Result};

fn params(descriptor: &GridDescriptor) -> Result<projection::ProjectionParams> {
    descriptor.projection_params().ok_or_else(|| {
        GeolocationError::projection(format!(
            "{} grid has no projection parameters",
            descriptor.projection
        ))
    })
}

/// Every cell of the grid, in storage order.
pub(crate) fn compute_full(descriptor: &GridDescriptor) -> Result<ComputedBuffer> {
    let params = params(descriptor)?;
    let geometry = descriptor.geometry()?;
    let (xdim, ydim) = (descriptor.xdim_size, descriptor.ydim_size);

    let cells = xdim * ydim;
    let mut rows = Vec::with_capacity(cells);
    let mut cols = Vec::with_capacity(cells);
    if descriptor.ydim_major {
        for row in 0..ydim {
            for col in 0..xdim {
                rows.push(row);
                cols.push(col);
            }
        }
    } else {
        for col in 0..xdim {
            for row in 0..ydim {
                rows.push(row);
                cols.push(col);
            }
        }
    }

    let lonlat = ij_to_lonlat(&params, &geometry, &rows, &cols)?;
    Ok(ComputedBuffer {
        latitude: lonlat.lat,
        longitude: lonlat.lon,
        layout: BufferLayout::Full {
            dims: descriptor.natural_dims().to_vec(),
        },
    })
}

/// Latitude down the first column and longitude along the first row.
///
/// Only valid for projections where latitude depends on the row alone and
/// longitude on the column alone.
pub(crate) fn compute_separable(descriptor: &GridDescriptor) -> Result<ComputedBuffer> {
    let params = params(descriptor)?;
    let geometry = descriptor.geometry()?;
    let (xdim, ydim) = (descriptor.xdim_size, descriptor.ydim_size);

    let column = ij_to_lonlat(&params, &geometry, &(0..ydim).collect::<Vec<_>>(), &vec![0; ydim])?;
    let row = ij_to_lonlat(&params, &geometry, &vec![0; xdim], &(0..xdim).collect::<Vec<_>>())?;

    Ok(ComputedBuffer {
        latitude: column.lat,
        longitude: row.lon,
        layout: BufferLayout::Vector { ydim, xdim },
    })
}
