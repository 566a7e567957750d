//! Rewriting [0, 360) longitudes into [-180, 180].

/// Tolerance above 180 before a longitude counts as past the antimeridian.
pub const CROSSING_EPSILON: f64 = 1e-3;

/// Whether any defined longitude lies past the antimeridian.
pub fn needs_normalization(longitudes: &[f64], fill: f64) -> bool {
    longitudes
        .iter()
        .any(|&v| v != fill && v > 180.0 + CROSSING_EPSILON)
}

/// Shift a line of longitudes from the first antimeridian crossing onward
/// by -360 and return the crossing index.
///
/// Fill values are left alone. An exact 180.0 sample does not count as a
/// crossing.
pub fn normalize_longitude(line: &mut [f64], fill: f64) -> Option<usize> {
    let crossing = line
        .iter()
        .position(|&v| v != fill && v > 180.0 + CROSSING_EPSILON)?;
    for v in line[crossing..].iter_mut().filter(|v| **v != fill) {
        *v -= 360.0;
    }
    Some(crossing)
}
