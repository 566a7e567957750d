//! Reconstruction of undefined coordinates along a line.

/// Whether a value is a usable latitude or longitude.
///
/// Fill markers, NaN and anything outside +/-90 (latitude) or [-180, 360]
/// (longitude) count as undefined.
#[inline]
pub fn is_defined(value: f64, fill: f64, is_latitude: bool) -> bool {
    if value == fill || !value.is_finite() {
        return false;
    }
    if is_latitude {
        (-90.0..=90.0).contains(&value)
    } else {
        (-180.0..=360.0).contains(&value)
    }
}

fn clamp(value: f64, is_latitude: bool) -> f64 {
    if is_latitude {
        value.clamp(-90.0, 90.0)
    } else {
        value.clamp(-180.0, 360.0)
    }
}

/// Replace undefined runs by linear extrapolation from the values before
/// them.
///
/// The step is the difference of the last two good values ahead of each
/// run. The first three values must be defined. Returns `false`, leaving
/// the buffer untouched, when that is not the case.
pub fn repair(buffer: &mut [f64], fill: f64, is_latitude: bool) -> bool {
    let defined = |v: f64| is_defined(v, fill, is_latitude);

    if buffer.iter().all(|&v| defined(v)) {
        return true;
    }
    if buffer.len() < 3 || !buffer[..3].iter().all(|&v| defined(v)) {
        return false;
    }

    let mut i = 3;
    while i < buffer.len() {
        if defined(buffer[i]) {
            i += 1;
            continue;
        }
        let step = buffer[i - 1] - buffer[i - 2];
        while i < buffer.len() && !defined(buffer[i]) {
            buffer[i] = clamp(buffer[i - 1] + step, is_latitude);
            i += 1;
        }
    }
    true
}

/// [`repair`] that falls back to extrapolating from the far end of the
/// line when its start is undefined.
pub fn repair_bidirectional(buffer: &mut [f64], fill: f64, is_latitude: bool) -> bool {
    if repair(buffer, fill, is_latitude) {
        return true;
    }
    buffer.reverse();
    let repaired = repair(buffer, fill, is_latitude);
    buffer.reverse();
    repaired
}
