//! Repair of cells the inverse projection left undefined.
//!
//! Lines run along the fastest-varying storage dimension. Latitude and
//! longitude are repaired independently.

use projection::UNDEFINED;
use tracing::debug;

use crate::engine::{BufferLayout, ComputedBuffer};
use crate::error::{GeolocationError, Result};
use crate::repair::{is_defined, repair_bidirectional};

fn line_len(buffer: &ComputedBuffer) -> Result<usize> {
    match &buffer.layout {
        BufferLayout::Full { dims } if !dims.is_empty() => Ok(dims[dims.len() - 1]),
        layout => Err(GeolocationError::repair(
            "coordinate",
            format!("no per-cell lines in layout {:?}", layout),
        )),
    }
}

fn for_each_field<F>(buffer: &mut ComputedBuffer, mut f: F) -> Result<()>
where
    F: FnMut(&mut [f64], bool, &'static str) -> Result<()>,
{
    f(&mut buffer.latitude, true, "latitude")?;
    f(&mut buffer.longitude, false, "longitude")
}

/// Copy the nearest defined value along the line into each undefined cell.
///
/// Used for Lambert azimuthal grids, whose corners fall outside the
/// projected disc.
pub(crate) fn nearest_neighbor(buffer: &mut ComputedBuffer) -> Result<()> {
    let len = line_len(buffer)?;
    let mut filled = 0usize;

    for_each_field(buffer, |values, is_latitude, name| {
        for (index, line) in values.chunks_exact_mut(len).enumerate() {
            let defined: Vec<bool> = line
                .iter()
                .map(|&v| is_defined(v, UNDEFINED, is_latitude))
                .collect();
            if defined.iter().all(|&d| d) {
                continue;
            }
            if !defined.iter().any(|&d| d) {
                return Err(GeolocationError::repair(
                    name,
                    format!("line {} has no defined values", index),
                ));
            }

            for i in 0..len {
                if defined[i] {
                    continue;
                }
                let source = (1..len).find_map(|d| {
                    if i >= d && defined[i - d] {
                        Some(i - d)
                    } else if i + d < len && defined[i + d] {
                        Some(i + d)
                    } else {
                        None
                    }
                });
                if let Some(source) = source {
                    line[i] = line[source];
                    filled += 1;
                }
            }
        }
        Ok(())
    })?;

    if filled > 0 {
        debug!(filled, "filled undefined cells from nearest neighbors");
    }
    Ok(())
}

/// Extrapolate undefined runs along each line, from whichever end of the
/// line has a defined start.
///
/// Used for sinusoidal grids, whose tiles overhang the edge of the globe.
pub(crate) fn extrapolate_lines(buffer: &mut ComputedBuffer) -> Result<()> {
    let len = line_len(buffer)?;
    let mut repaired = 0usize;

    for_each_field(buffer, |values, is_latitude, name| {
        for (index, line) in values.chunks_exact_mut(len).enumerate() {
            if line.iter().all(|&v| is_defined(v, UNDEFINED, is_latitude)) {
                continue;
            }
            if !repair_bidirectional(line, UNDEFINED, is_latitude) {
                return Err(GeolocationError::repair(
                    name,
                    format!(
                        "line {} has fewer than three defined values at either end",
                        index
                    ),
                ));
            }
            repaired += 1;
        }
        Ok(())
    })?;

    if repaired > 0 {
        debug!(lines = repaired, "extrapolated undefined coordinates");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const F: f64 = UNDEFINED;

    fn full(latitude: Vec<f64>, longitude: Vec<f64>, dims: Vec<usize>) -> ComputedBuffer {
        ComputedBuffer {
            latitude,
            longitude,
            layout: BufferLayout::Full { dims },
        }
    }

    #[test]
    fn test_nearest_neighbor_per_line() {
        let mut buffer = full(
            vec![F, 50.0, 51.0, F, 40.0, 41.0, 42.0, F],
            vec![F, F, 10.0, F, 20.0, F, F, 23.0],
            vec![2, 4],
        );
        nearest_neighbor(&mut buffer).unwrap();
        assert_eq!(buffer.latitude, vec![50.0, 50.0, 51.0, 51.0, 40.0, 41.0, 42.0, 42.0]);
        assert_eq!(buffer.longitude, vec![10.0, 10.0, 10.0, 10.0, 20.0, 20.0, 23.0, 23.0]);
    }

    #[test]
    fn test_nearest_neighbor_prefers_earlier_on_tie() {
        let mut buffer = full(vec![1.0, F, 3.0], vec![1.0, F, 3.0], vec![1, 3]);
        nearest_neighbor(&mut buffer).unwrap();
        assert_eq!(buffer.latitude, vec![1.0, 1.0, 3.0]);
    }

    #[test]
    fn test_nearest_neighbor_empty_line() {
        let mut buffer = full(vec![F, F, 1.0, 2.0], vec![5.0; 4], vec![2, 2]);
        let err = nearest_neighbor(&mut buffer).unwrap_err();
        assert!(matches!(err, GeolocationError::Repair { ref field, .. } if field == "latitude"));
    }

    #[test]
    fn test_extrapolate_both_directions() {
        let mut buffer = full(
            vec![10.0; 10],
            vec![F, F, 2.0, 3.0, 4.0, 0.0, 1.0, 2.0, F, F],
            vec![2, 5],
        );
        extrapolate_lines(&mut buffer).unwrap();
        assert_eq!(
            buffer.longitude,
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 0.0, 1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_extrapolate_failure() {
        let mut buffer = full(vec![F, 1.0, F, 2.0, F], vec![0.0; 5], vec![1, 5]);
        assert!(matches!(
            extrapolate_lines(&mut buffer),
            Err(GeolocationError::Repair { .. })
        ));
    }

    #[test]
    fn test_vector_layout_rejected() {
        let mut buffer = ComputedBuffer {
            latitude: vec![0.0],
            longitude: vec![0.0],
            layout: BufferLayout::Vector { ydim: 1, xdim: 1 },
        };
        assert!(nearest_neighbor(&mut buffer).is_err());
    }
}
