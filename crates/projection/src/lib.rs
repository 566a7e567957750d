//! GCTP-style map projections for gridded satellite products.
//!
//! Implements the inverse projections needed to geolocate HDF-EOS grids:
//! geographic, cylindrical equal-area, sinusoidal, Lambert azimuthal equal-area, polar stereographic
//! and space oblique mercator (MISR block grids).
//!
//! The entry point for regular grids is [`ij_to_lonlat`], which maps a batch
//! of row/column indices to longitude/latitude in one call. SOM grids go
//! through [`SomBlockGrid`] first and then [`Projector::inverse`].

pub mod cea;
pub mod dms;
pub mod error;
pub mod geographic;
pub mod grid;
pub mod lambert_azimuthal;
pub mod polar_stereographic;
pub mod sinusoidal;
pub mod som;
pub mod spheroid;
pub mod transform;

pub use dms::{degrees_to_dms, dms_to_degrees, is_plain_degrees};
pub use error::{ProjectionError, Result};
pub use grid::{GridGeometry, GridOrigin, PixelRegistration};
pub use som::{SomBlockGrid, SpaceObliqueMercator, SOM_BLOCK_COUNT};
pub use spheroid::Spheroid;
pub use transform::{ij_to_lonlat, GctpProjection, LonLat, ProjectionParams, Projector, UNDEFINED};

use std::f64::consts::{PI, TAU};

/// Wrap a longitude in radians into `[-π, π]`.
pub(crate) fn adjust_longitude(lon: f64) -> f64 {
    if lon.abs() <= PI {
        return lon;
    }
    let wrapped = lon - TAU * (lon / TAU).round();
    if wrapped < -PI {
        wrapped + TAU
    } else if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}
