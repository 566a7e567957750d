//! Geographic (unprojected lat/lon) grids.
//!
//! Projection coordinates are plain degrees; GCTP stores the grid corners of
//! these grids in packed DMS, which [`crate::GridGeometry`] decodes before
//! calling in here.

/// Identity "projection" for geographic grids.
#[derive(Debug, Clone, Copy, Default)]
pub struct Geographic;

impl Geographic {
    /// Geographic coordinates map to themselves.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if lat_deg.abs() > 90.0 {
            return None;
        }
        Some((lon_deg, lat_deg))
    }

    /// Returns `(lon, lat)` in degrees, or `None` beyond the poles.
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() || y.abs() > 90.0 + 1e-9 {
            return None;
        }
        Some((x, y.clamp(-90.0, 90.0)))
    }
}
