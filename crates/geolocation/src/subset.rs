//! Strided hyperslab extraction from full-resolution buffers.

use std::borrow::Cow;

use crate::error::{GeolocationError, Result};
use crate::types::Hyperslab;

/// Extract a hyperslab from a row-major buffer with dimensions `dims`.
///
/// The hyperslab must already be validated against `dims`. A request for
/// every element at stride 1 borrows `full` instead of copying.
pub fn extract<'a>(full: &'a [f64], dims: &[usize], slab: &Hyperslab) -> Result<Cow<'a, [f64]>> {
    let expected: usize = dims.iter().product();
    if full.len() != expected {
        return Err(GeolocationError::subset(format!(
            "buffer holds {} values but dimensions {:?} need {}",
            full.len(),
            dims,
            expected
        )));
    }
    if slab.rank() != dims.len() {
        return Err(GeolocationError::subset(format!(
            "request has rank {} but the buffer has rank {}",
            slab.rank(),
            dims.len()
        )));
    }
    if slab.covers(dims) {
        return Ok(Cow::Borrowed(full));
    }

    let mut out = Vec::with_capacity(slab.output_len());
    match slab.axes.as_slice() {
        [a] => {
            out.extend((0..a.count).map(|i| full[a.index(i)]));
        }
        [a0, a1] => {
            let row_len = dims[1];
            for i in 0..a0.count {
                let base = a0.index(i) * row_len;
                out.extend((0..a1.count).map(|j| full[base + a1.index(j)]));
            }
        }
        [a0, a1, a2] => {
            let plane_len = dims[1] * dims[2];
            let row_len = dims[2];
            for i in 0..a0.count {
                let plane = a0.index(i) * plane_len;
                for j in 0..a1.count {
                    let base = plane + a1.index(j) * row_len;
                    out.extend((0..a2.count).map(|k| full[base + a2.index(k)]));
                }
            }
        }
        _ => {
            return Err(GeolocationError::subset(format!(
                "rank {} requests are not supported",
                slab.rank()
            )))
        }
    }

    Ok(Cow::Owned(out))
}

/// Extract a rank-2 hyperslab from a 1-D vector broadcast across a 2-D grid.
///
/// `vector` varies along `axis` (0 or 1) of the 2-D variable and is
/// constant along the other.
pub fn broadcast_extract(vector: &[f64], axis: usize, slab: &Hyperslab) -> Result<Vec<f64>> {
    let [a0, a1] = slab.axes.as_slice() else {
        return Err(GeolocationError::subset(format!(
            "broadcast needs a rank 2 request, got rank {}",
            slab.rank()
        )));
    };
    let along = if axis == 0 { a0 } else { a1 };
    if along.count > 0 && along.index(along.count - 1) >= vector.len() {
        return Err(GeolocationError::subset(format!(
            "axis {} selection exceeds vector length {}",
            axis,
            vector.len()
        )));
    }

    let mut out = Vec::with_capacity(slab.output_len());
    for i in 0..a0.count {
        for j in 0..a1.count {
            let k = if axis == 0 { a0.index(i) } else { a1.index(j) };
            out.push(vector[k]);
        }
    }
    Ok(out)
}
