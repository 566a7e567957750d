//! GCTP projection dispatch and the grid index to lon/lat primitive.

use serde::{Deserialize, Serialize};

use crate::cea::CylindricalEqualArea;
use crate::error::{ProjectionError, Result};
use crate::geographic::Geographic;
use crate::grid::GridGeometry;
use crate::lambert_azimuthal::LambertAzimuthal;
use crate::polar_stereographic::PolarStereographic;
use crate::sinusoidal::Sinusoidal;
use crate::som::SpaceObliqueMercator;
use crate::spheroid::Spheroid;

/// Marker written for coordinates a projection cannot produce.
pub const UNDEFINED: f64 = 1.0e51;

/// Supported GCTP projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GctpProjection {
    Geographic,
    Cea,
    Sinusoidal,
    LambertAzimuthal,
    PolarStereographic,
    Som,
}

impl GctpProjection {
    /// Map a GCTP projection code to a supported projection.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Geographic),
            6 => Some(Self::PolarStereographic),
            11 => Some(Self::LambertAzimuthal),
            16 => Some(Self::Sinusoidal),
            22 => Some(Self::Som),
            97 => Some(Self::Cea),
            _ => None,
        }
    }

    /// The GCTP projection code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Geographic => 0,
            Self::PolarStereographic => 6,
            Self::LambertAzimuthal => 11,
            Self::Sinusoidal => 16,
            Self::Som => 22,
            Self::Cea => 97,
        }
    }

    /// Latitude depends only on the row and longitude only on the column.
    pub fn is_separable(&self) -> bool {
        matches!(self, Self::Geographic | Self::Cea)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Geographic => "geographic",
            Self::Cea => "cylindrical equal-area",
            Self::Sinusoidal => "sinusoidal",
            Self::LambertAzimuthal => "lambert azimuthal equal-area",
            Self::PolarStereographic => "polar stereographic",
            Self::Som => "space oblique mercator",
        }
    }
}

impl std::fmt::Display for GctpProjection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Projection-specific constants as carried in grid metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionParams {
    pub projection: GctpProjection,
    pub zone: i32,
    pub sphere: i32,
    pub params: [f64; 13],
}

/// A ready-to-use inverse/forward projection.
#[derive(Debug, Clone)]
pub enum Projector {
    Geographic(Geographic),
    Cea(CylindricalEqualArea),
    Sinusoidal(Sinusoidal),
    LambertAzimuthal(LambertAzimuthal),
    PolarStereographic(PolarStereographic),
    Som(SpaceObliqueMercator),
}

impl Projector {
    /// Build the projection described by `params`.
    pub fn new(params: &ProjectionParams) -> Result<Self> {
        let spheroid = Spheroid::resolve(params.sphere, &params.params);
        if !spheroid.radius().is_finite() || spheroid.radius() <= 0.0 {
            return Err(ProjectionError::invalid_parameter(
                "semi-major axis",
                spheroid.radius(),
            ));
        }

        let p = &params.params;
        Ok(match params.projection {
            GctpProjection::Geographic => Self::Geographic(Geographic),
            GctpProjection::Cea => Self::Cea(CylindricalEqualArea::from_params(p, spheroid)?),
            GctpProjection::Sinusoidal => Self::Sinusoidal(Sinusoidal::from_params(p, spheroid)?),
            GctpProjection::LambertAzimuthal => {
                Self::LambertAzimuthal(LambertAzimuthal::from_params(p, spheroid)?)
            }
            GctpProjection::PolarStereographic => {
                Self::PolarStereographic(PolarStereographic::from_params(p, spheroid)?)
            }
            GctpProjection::Som => Self::Som(SpaceObliqueMercator::from_params(p, spheroid)?),
        })
    }

    /// Projection coordinates to `(lon, lat)` degrees; `None` when undefined.
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        match self {
            Self::Geographic(p) => p.inverse(x, y),
            Self::Cea(p) => p.inverse(x, y),
            Self::Sinusoidal(p) => p.inverse(x, y),
            Self::LambertAzimuthal(p) => p.inverse(x, y),
            Self::PolarStereographic(p) => p.inverse(x, y),
            Self::Som(p) => p.inverse(x, y),
        }
    }
}

/// Longitudes and latitudes for a batch of grid cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LonLat {
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
}

/// Convert grid row/column indices to longitude/latitude.
///
/// `rows[k]`/`cols[k]` name one cell; the output keeps that order. Cells the
/// projection cannot map are set to [`UNDEFINED`] in both outputs. Geographic
/// grids carry packed-DMS corners, which are decoded here.
pub fn ij_to_lonlat(
    params: &ProjectionParams,
    geometry: &GridGeometry,
    rows: &[usize],
    cols: &[usize],
) -> Result<LonLat> {
    if rows.len() != cols.len() {
        return Err(ProjectionError::IndexLengthMismatch {
            rows: rows.len(),
            cols: cols.len(),
        });
    }
    if params.projection == GctpProjection::Som {
        return Err(ProjectionError::invalid_geometry(
            "SOM grids are indexed by block, use SomBlockGrid",
        ));
    }

    let projector = Projector::new(params)?;
    let geometry = if params.projection == GctpProjection::Geographic {
        geometry.with_dms_corners_decoded()
    } else {
        geometry.clone()
    };

    let mut out = LonLat {
        lon: Vec::with_capacity(rows.len()),
        lat: Vec::with_capacity(rows.len()),
    };

    for (&row, &col) in rows.iter().zip(cols) {
        let (x, y) = geometry.grid_to_projected(col as f64, row as f64);
        match projector.inverse(x, y) {
            Some((lon, lat)) => {
                out.lon.push(lon);
                out.lat.push(lat);
            }
            None => {
                out.lon.push(UNDEFINED);
                out.lat.push(UNDEFINED);
            }
        }
    }

    Ok(out)
}
