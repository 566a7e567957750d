//! Sinusoidal projection (spherical form).
//!
//! This is the MODIS land tile projection. Points past the east/west edge of
//! the projected globe have a well defined latitude but no longitude, and are
//! reported as undefined rather than wrapped.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::adjust_longitude;
use crate::dms::dms_to_radians;
use crate::error::Result;
use crate::spheroid::Spheroid;

/// Sinusoidal projection parameters.
#[derive(Debug, Clone)]
pub struct Sinusoidal {
    /// Sphere radius (meters)
    pub radius: f64,
    /// Central meridian (radians)
    pub lon0: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl Sinusoidal {
    /// Build from GCTP parameters: `[4]` central meridian (packed DMS),
    /// `[6]`/`[7]` false easting/northing.
    pub fn from_params(params: &[f64; 13], spheroid: Spheroid) -> Result<Self> {
        Ok(Self {
            radius: spheroid.radius(),
            lon0: dms_to_radians(params[4]),
            false_easting: params[6],
            false_northing: params[7],
        })
    }

    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if lat_deg.abs() > 90.0 {
            return None;
        }
        let lat = lat_deg.to_radians();
        let dlon = adjust_longitude(lon_deg.to_radians() - self.lon0);
        Some((
            self.false_easting + self.radius * dlon * lat.cos(),
            self.false_northing + self.radius * lat,
        ))
    }

    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;

        let lat = y / self.radius;
        if !lat.is_finite() || lat.abs() > FRAC_PI_2 + 1e-12 {
            return None;
        }
        let lat = lat.clamp(-FRAC_PI_2, FRAC_PI_2);

        let cos_lat = lat.cos();
        if cos_lat < 1e-12 {
            return Some((self.lon0.to_degrees(), lat.to_degrees()));
        }

        let dlon = x / (self.radius * cos_lat);
        if dlon.abs() > PI + 1e-9 {
            return None;
        }
        let lon = adjust_longitude(self.lon0 + dlon);
        Some((lon.to_degrees(), lat.to_degrees()))
    }
}
