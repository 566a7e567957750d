//! Cylindrical Equal-Area projection (normal aspect, spherical form).
//!
//! Used by the global EASE-Grid (true scale at 30°N/S). Latitude depends only
//! on the row and longitude only on the column, which lets callers store the
//! grid as two 1-D vectors.

use crate::dms::dms_to_radians;
use crate::error::{ProjectionError, Result};
use crate::spheroid::Spheroid;
use crate::adjust_longitude;

/// Cylindrical Equal-Area projection parameters.
#[derive(Debug, Clone)]
pub struct CylindricalEqualArea {
    /// Sphere radius (meters)
    pub radius: f64,
    /// Central meridian (radians)
    pub lon0: f64,
    /// Latitude of true scale (radians)
    pub lat_ts: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl CylindricalEqualArea {
    /// Build from GCTP parameters: `[4]` central meridian and `[5]` latitude
    /// of true scale (packed DMS), `[6]`/`[7]` false easting/northing.
    pub fn from_params(params: &[f64; 13], spheroid: Spheroid) -> Result<Self> {
        let lat_ts = dms_to_radians(params[5]);
        if lat_ts.abs() >= std::f64::consts::FRAC_PI_2 {
            return Err(ProjectionError::invalid_parameter(
                "latitude of true scale",
                params[5],
            ));
        }

        Ok(Self {
            radius: spheroid.radius(),
            lon0: dms_to_radians(params[4]),
            lat_ts,
            false_easting: params[6],
            false_northing: params[7],
        })
    }

    /// Convert geographic degrees to projection meters.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if lat_deg.abs() > 90.0 {
            return None;
        }
        let lat = lat_deg.to_radians();
        let dlon = adjust_longitude(lon_deg.to_radians() - self.lon0);
        let cos_ts = self.lat_ts.cos();

        let x = self.false_easting + self.radius * dlon * cos_ts;
        let y = self.false_northing + self.radius * lat.sin() / cos_ts;
        Some((x, y))
    }

    /// Convert projection meters to `(lon, lat)` degrees.
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let cos_ts = self.lat_ts.cos();

        let sin_lat = y * cos_ts / self.radius;
        if !sin_lat.is_finite() || sin_lat.abs() > 1.0 + 1e-12 {
            return None;
        }
        let lat = sin_lat.clamp(-1.0, 1.0).asin();

        let dlon = x / (self.radius * cos_ts);
        if dlon.abs() > std::f64::consts::PI + 1e-9 {
            return None;
        }
        let lon = adjust_longitude(self.lon0 + dlon);

        Some((lon.to_degrees(), lat.to_degrees()))
    }
}
