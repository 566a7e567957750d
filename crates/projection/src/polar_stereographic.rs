//! Polar Stereographic projection (ellipsoidal form).
//!
//! The hemisphere follows the sign of the latitude of true scale. On a
//! sphere the formulas reduce to the familiar `2R·k0·tan(π/4 - φ/2)`.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::adjust_longitude;
use crate::dms::dms_to_radians;
use crate::error::{ProjectionError, Result};
use crate::spheroid::Spheroid;

/// Iteration cap for the latitude series in [`PolarStereographic::inverse`].
const MAX_LATITUDE_ITERATIONS: usize = 15;

/// Polar Stereographic projection parameters.
#[derive(Debug, Clone)]
pub struct PolarStereographic {
    /// Semi-major axis (meters)
    pub semi_major: f64,
    /// First eccentricity of the ellipsoid
    pub eccentricity: f64,
    /// Longitude pointing straight down from the pole (radians)
    pub lon0: f64,
    /// Latitude of true scale (radians)
    pub lat_ts: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    /// Ratio of projected radius to the conformal `t` function
    scale: f64,
    north: bool,
}

impl PolarStereographic {
    /// Build from GCTP parameters: `[4]` longitude below the pole and `[5]`
    /// latitude of true scale (packed DMS), `[6]`/`[7]` false easting/northing.
    pub fn from_params(params: &[f64; 13], spheroid: Spheroid) -> Result<Self> {
        let lat_ts = dms_to_radians(params[5]);
        if lat_ts.abs() < 1e-9 {
            return Err(ProjectionError::invalid_parameter(
                "latitude of true scale",
                params[5],
            ));
        }
        let north = lat_ts > 0.0;
        let a = spheroid.semi_major;
        let e = spheroid.eccentricity();

        let phi_c = lat_ts.abs();
        let scale = if (FRAC_PI_2 - phi_c).abs() > 1e-10 {
            a * msfn(e, phi_c) / tsfn(e, phi_c)
        } else {
            // True scale at the pole itself.
            let e4 = ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt();
            2.0 * a / e4
        };

        Ok(Self {
            semi_major: a,
            eccentricity: e,
            lon0: dms_to_radians(params[4]),
            lat_ts,
            false_easting: params[6],
            false_northing: params[7],
            scale,
            north,
        })
    }

    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if lat_deg.abs() > 90.0 {
            return None;
        }
        let lat = lat_deg.to_radians();
        let dlon = adjust_longitude(lon_deg.to_radians() - self.lon0);

        // Antipodal pole
        let phi = if self.north { lat } else { -lat };
        if (phi + FRAC_PI_2).abs() < 1e-12 {
            return None;
        }

        let rho = self.scale * tsfn(self.eccentricity, phi);
        let x = rho * dlon.sin();
        let y = if self.north {
            -rho * dlon.cos()
        } else {
            rho * dlon.cos()
        };

        Some((x + self.false_easting, y + self.false_northing))
    }

    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;

        let rho = x.hypot(y);
        if !rho.is_finite() {
            return None;
        }

        let phi = latitude_from_t(self.eccentricity, rho / self.scale)?;
        let (lat, lon) = if self.north {
            let lon = if rho < 1e-9 { self.lon0 } else { self.lon0 + x.atan2(-y) };
            (phi, lon)
        } else {
            let lon = if rho < 1e-9 { self.lon0 } else { self.lon0 + x.atan2(y) };
            (-phi, lon)
        };

        Some((adjust_longitude(lon).to_degrees(), lat.to_degrees()))
    }
}

/// Radius of the parallel at `phi` on a unit ellipsoid.
fn msfn(e: f64, phi: f64) -> f64 {
    let con = e * phi.sin();
    phi.cos() / (1.0 - con * con).sqrt()
}

/// Conformal `t` function, `tan(π/4 - φ/2)` on a sphere.
fn tsfn(e: f64, phi: f64) -> f64 {
    let con = e * phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - con) / (1.0 + con)).powf(e / 2.0)
}

/// Invert [`tsfn`] by fixed-point iteration. `None` if it does not settle.
fn latitude_from_t(e: f64, t: f64) -> Option<f64> {
    let half_e = e / 2.0;
    let mut phi = FRAC_PI_2 - 2.0 * t.atan();
    for _ in 0..MAX_LATITUDE_ITERATIONS {
        let con = e * phi.sin();
        let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - con) / (1.0 + con)).powf(half_e)).atan();
        let delta = next - phi;
        phi = next;
        if delta.abs() <= 1e-10 {
            return Some(phi);
        }
    }
    None
}
