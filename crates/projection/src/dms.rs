//! Packed degrees/minutes/seconds angles.
//!
//! GCTP-style projection parameters and geographic grid corners store angles
//! packed as `DDDMMMSSS.SS`: degrees times one million plus minutes times one
//! thousand plus seconds. `-75030000.0` is 75°30'W.

/// Decode a packed `DDDMMMSSS.SS` angle into decimal degrees.
pub fn dms_to_degrees(packed: f64) -> f64 {
    let sign = if packed < 0.0 { -1.0 } else { 1.0 };
    let value = packed.abs();

    let degrees = (value / 1_000_000.0).floor();
    let minutes = ((value - degrees * 1_000_000.0) / 1_000.0).floor();
    let seconds = value - degrees * 1_000_000.0 - minutes * 1_000.0;

    sign * (degrees + minutes / 60.0 + seconds / 3600.0)
}

/// Encode decimal degrees as a packed `DDDMMMSSS.SS` angle.
pub fn degrees_to_dms(degrees: f64) -> f64 {
    let sign = if degrees < 0.0 { -1.0 } else { 1.0 };
    let value = degrees.abs();

    let whole = value.trunc();
    let minutes_total = (value - whole) * 60.0;
    let minutes = minutes_total.trunc();
    let seconds = (minutes_total - minutes) * 60.0;

    sign * (whole * 1_000_000.0 + minutes * 1_000.0 + seconds)
}

/// Decode a packed angle straight to radians.
pub fn dms_to_radians(packed: f64) -> f64 {
    dms_to_degrees(packed).to_radians()
}

/// Whether a corner value looks like plain degrees rather than packed DMS.
///
/// Packed values for any angle beyond a few degrees are in the millions, so
/// anything within one revolution is taken as already decoded.
pub fn is_plain_degrees(value: f64) -> bool {
    value.abs() <= 360.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_degrees() {
        assert!((dms_to_degrees(180_000_000.0) - 180.0).abs() < 1e-12);
        assert!((dms_to_degrees(-90_000_000.0) + 90.0).abs() < 1e-12);
        assert_eq!(dms_to_degrees(0.0), 0.0);
    }

    #[test]
    fn test_minutes_and_seconds() {
        // 98°18'13.752" is the MISR orbit inclination
        let deg = dms_to_degrees(98_018_013.752);
        let expected = 98.0 + 18.0 / 60.0 + 13.752 / 3600.0;
        assert!((deg - expected).abs() < 1e-9, "got {}", deg);

        let west = dms_to_degrees(-75_030_000.0);
        assert!((west + 75.5).abs() < 1e-12);
    }

    #[test]
    fn test_encode_decode() {
        for &deg in &[0.0, 12.25, -45.5, 179.999, -179.75, 89.123456] {
            let back = dms_to_degrees(degrees_to_dms(deg));
            assert!((back - deg).abs() < 1e-8, "{} -> {}", deg, back);
        }
    }

    #[test]
    fn test_plain_degree_detection() {
        assert!(is_plain_degrees(-180.0));
        assert!(is_plain_degrees(359.5));
        assert!(!is_plain_degrees(180_000_000.0));
        assert!(!is_plain_degrees(-90_000_000.0));
    }
}
