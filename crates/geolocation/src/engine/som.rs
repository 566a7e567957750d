//! Space Oblique Mercator grids: 180 stacked blocks.

use projection::{Projector, SomBlockGrid, SOM_BLOCK_COUNT, UNDEFINED};
use tracing::debug;

use crate::descriptor::GridDescriptor;
use crate::engine::{BufferLayout, ComputedBuffer};
use crate::error::{GeolocationError, Result};

/// Compute every block of a SOM grid.
///
/// The result has dimensions `[180, ydim, xdim]`, or `[180, xdim, ydim]`
/// when XDim is the major storage dimension.
pub(crate) fn compute(descriptor: &GridDescriptor) -> Result<ComputedBuffer> {
    let params = descriptor.projection_params().ok_or_else(|| {
        GeolocationError::projection("SOM grid has no projection parameters")
    })?;
    let projector = Projector::new(&params)?;
    let blocks = SomBlockGrid::new(
        descriptor.xdim_size,
        descriptor.ydim_size,
        descriptor.corner_upleft,
        descriptor.corner_lowright,
        descriptor.pixel_registration,
        &descriptor.som_block_offsets,
    )?;

    let (xdim, ydim) = (descriptor.xdim_size, descriptor.ydim_size);
    let cells = SOM_BLOCK_COUNT * xdim * ydim;
    let mut latitude = Vec::with_capacity(cells);
    let mut longitude = Vec::with_capacity(cells);
    let mut undefined = 0usize;

    let mut push = |block: usize, line: usize, sample: usize| {
        let (x, y) = blocks.block_to_projected(block, line, sample);
        match projector.inverse(x, y) {
            Some((lon, lat)) => {
                latitude.push(lat);
                longitude.push(lon);
            }
            None => {
                latitude.push(UNDEFINED);
                longitude.push(UNDEFINED);
                undefined += 1;
            }
        }
    };

    for block in 0..SOM_BLOCK_COUNT {
        if descriptor.ydim_major {
            for line in 0..ydim {
                for sample in 0..xdim {
                    push(block, line, sample);
                }
            }
        } else {
            for sample in 0..xdim {
                for line in 0..ydim {
                    push(block, line, sample);
                }
            }
        }
    }

    if undefined > 0 {
        debug!(undefined, "SOM cells without an inverse");
    }

    let [d0, d1] = descriptor.natural_dims();
    Ok(ComputedBuffer {
        latitude,
        longitude,
        layout: BufferLayout::Full {
            dims: vec![SOM_BLOCK_COUNT, d0, d1],
        },
    })
}
