//! Lambert Azimuthal Equal-Area projection (spherical form).
//!
//! Used by the polar EASE-Grids. The whole sphere maps into a disc of radius
//! `2R`; grid cells in the corners of a square grid fall outside that disc
//! and have no geographic coordinates.
//!
//! The projection parameters include:
//! - Center longitude (lon0) and latitude (lat1) of the projection
//! - Sphere radius
//! - False easting/northing

use std::f64::consts::FRAC_PI_2;

use crate::adjust_longitude;
use crate::dms::dms_to_radians;
use crate::error::Result;
use crate::spheroid::Spheroid;

/// Lambert Azimuthal Equal-Area projection parameters.
#[derive(Debug, Clone)]
pub struct LambertAzimuthal {
    /// Sphere radius (meters)
    pub radius: f64,
    /// Center longitude in radians
    pub lon0: f64,
    /// Center latitude in radians
    pub lat1: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    sin_lat1: f64,
    cos_lat1: f64,
}

impl LambertAzimuthal {
    /// Build from GCTP parameters: `[4]` center longitude and `[5]` center
    /// latitude (packed DMS), `[6]`/`[7]` false easting/northing.
    pub fn from_params(params: &[f64; 13], spheroid: Spheroid) -> Result<Self> {
        let lat1 = dms_to_radians(params[5]);
        Ok(Self {
            radius: spheroid.radius(),
            lon0: dms_to_radians(params[4]),
            lat1,
            false_easting: params[6],
            false_northing: params[7],
            sin_lat1: lat1.sin(),
            cos_lat1: lat1.cos(),
        })
    }

    /// Convert geographic coordinates (degrees) to projection meters.
    ///
    /// The antipode of the center has no image and returns `None`.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if lat_deg.abs() > 90.0 {
            return None;
        }
        let lat = lat_deg.to_radians();
        let dlon = adjust_longitude(lon_deg.to_radians() - self.lon0);

        let g = self.sin_lat1 * lat.sin() + self.cos_lat1 * lat.cos() * dlon.cos();
        if g <= -1.0 + 1e-12 {
            return None;
        }
        let k = (2.0 / (1.0 + g)).sqrt();

        let x = self.radius * k * lat.cos() * dlon.sin();
        let y = self.radius
            * k
            * (self.cos_lat1 * lat.sin() - self.sin_lat1 * lat.cos() * dlon.cos());

        Some((x + self.false_easting, y + self.false_northing))
    }

    /// Convert projection meters to `(lon, lat)` degrees.
    ///
    /// Returns `None` outside the `2R` disc.
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;

        let rho = x.hypot(y);
        if !rho.is_finite() {
            return None;
        }
        let ratio = rho / (2.0 * self.radius);
        if ratio > 1.0 + 1e-12 {
            return None;
        }
        if rho < 1e-9 {
            return Some((self.lon0.to_degrees(), self.lat1.to_degrees()));
        }

        let c = 2.0 * ratio.min(1.0).asin();
        let (sin_c, cos_c) = c.sin_cos();

        let lat = (cos_c * self.sin_lat1 + y * sin_c * self.cos_lat1 / rho)
            .clamp(-1.0, 1.0)
            .asin();

        let lon = if (self.lat1 - FRAC_PI_2).abs() < 1e-12 {
            self.lon0 + x.atan2(-y)
        } else if (self.lat1 + FRAC_PI_2).abs() < 1e-12 {
            self.lon0 + x.atan2(y)
        } else {
            self.lon0
                + (x * sin_c).atan2(rho * self.cos_lat1 * cos_c - y * self.sin_lat1 * sin_c)
        };

        Some((adjust_longitude(lon).to_degrees(), lat.to_degrees()))
    }
}
