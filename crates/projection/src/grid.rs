//! Grid geometry: how row/column indices map to projection coordinates.

use serde::{Deserialize, Serialize};

use crate::dms::dms_to_degrees;
use crate::error::{ProjectionError, Result};

/// Whether a cell's coordinate refers to its center or its corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PixelRegistration {
    #[default]
    Center,
    Corner,
}

impl PixelRegistration {
    /// Fraction of a cell added to an index.
    pub fn offset(&self) -> f64 {
        match self {
            Self::Center => 0.5,
            Self::Corner => 0.0,
        }
    }

    /// HDF-EOS numeric code (0 center, 1 corner).
    pub fn code(&self) -> i32 {
        match self {
            Self::Center => 0,
            Self::Corner => 1,
        }
    }
}

/// Which grid corner row 0 / column 0 sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GridOrigin {
    #[default]
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

impl GridOrigin {
    /// HDF-EOS numeric code (0 UL, 1 UR, 2 LL, 3 LR).
    pub fn code(&self) -> i32 {
        match self {
            Self::UpperLeft => 0,
            Self::UpperRight => 1,
            Self::LowerLeft => 2,
            Self::LowerRight => 3,
        }
    }
}

/// Extent and indexing conventions of a projected grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    pub xdim: usize,
    pub ydim: usize,
    /// Upper-left corner in projection coordinates
    pub upleft: [f64; 2],
    /// Lower-right corner in projection coordinates
    pub lowright: [f64; 2],
    pub registration: PixelRegistration,
    pub origin: GridOrigin,
}

impl GridGeometry {
    pub fn new(
        xdim: usize,
        ydim: usize,
        upleft: [f64; 2],
        lowright: [f64; 2],
        registration: PixelRegistration,
        origin: GridOrigin,
    ) -> Result<Self> {
        if xdim == 0 || ydim == 0 {
            return Err(ProjectionError::invalid_geometry(format!(
                "grid of {}x{} cells",
                xdim, ydim
            )));
        }
        if upleft.iter().chain(lowright.iter()).any(|v| !v.is_finite()) {
            return Err(ProjectionError::invalid_geometry("non-finite grid corner"));
        }
        Ok(Self {
            xdim,
            ydim,
            upleft,
            lowright,
            registration,
            origin,
        })
    }

    /// Same geometry with corners decoded from packed DMS to degrees.
    pub fn with_dms_corners_decoded(&self) -> Self {
        Self {
            upleft: self.upleft.map(dms_to_degrees),
            lowright: self.lowright.map(dms_to_degrees),
            ..self.clone()
        }
    }

    /// Projection coordinates of a (fractional) column/row index.
    pub fn grid_to_projected(&self, col: f64, row: f64) -> (f64, f64) {
        let adj = self.registration.offset();
        let scale_x = (self.lowright[0] - self.upleft[0]) / self.xdim as f64;
        let scale_y = (self.lowright[1] - self.upleft[1]) / self.ydim as f64;

        let (col, row) = (col + adj, row + adj);
        match self.origin {
            GridOrigin::UpperLeft => (
                self.upleft[0] + col * scale_x,
                self.upleft[1] + row * scale_y,
            ),
            GridOrigin::UpperRight => (
                self.lowright[0] - col * scale_x,
                self.upleft[1] + row * scale_y,
            ),
            GridOrigin::LowerLeft => (
                self.upleft[0] + col * scale_x,
                self.lowright[1] - row * scale_y,
            ),
            GridOrigin::LowerRight => (
                self.lowright[0] - col * scale_x,
                self.lowright[1] - row * scale_y,
            ),
        }
    }
}
