//! Per-grid projection description and its resolution from a provider.

use std::fmt;

use projection::{
    is_plain_degrees, GctpProjection, GridGeometry, GridOrigin, PixelRegistration,
    ProjectionParams, SOM_BLOCK_COUNT,
};
use tracing::debug;

use crate::error::{GeolocationError, Result};
use crate::provider::{GridMetadataProvider, ProviderError};
use crate::types::FieldTag;

/// How a grid maps indices to the globe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Projection {
    /// A GCTP projection the engine can evaluate.
    Gctp(GctpProjection),
    /// The product carries no projection code at all.
    Unprojected,
    /// A GCTP code the engine has no implementation for.
    Unsupported(i32),
}

impl Projection {
    /// Map a GCTP projection code.
    pub fn from_code(code: i32) -> Self {
        GctpProjection::from_code(code)
            .map(Self::Gctp)
            .unwrap_or(Self::Unsupported(code))
    }

    /// GCTP code, if the grid has one.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Gctp(p) => Some(p.code()),
            Self::Unprojected => None,
            Self::Unsupported(code) => Some(*code),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gctp(p) => write!(f, "{}", p),
            Self::Unprojected => f.write_str("unprojected"),
            Self::Unsupported(code) => write!(f, "unsupported GCTP code {}", code),
        }
    }
}

/// Immutable description of one grid, resolved once per grid open.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDescriptor {
    pub xdim_size: usize,
    pub ydim_size: usize,
    pub ydim_major: bool,
    pub projection: Projection,
    pub pixel_registration: PixelRegistration,
    pub grid_origin: GridOrigin,
    pub zone: i32,
    pub sphere: i32,
    pub params: [f64; 13],
    pub corner_upleft: [f64; 2],
    pub corner_lowright: [f64; 2],
    /// Relative cross-track offsets between SOM blocks, empty otherwise.
    pub som_block_offsets: Vec<f64>,
}

impl GridDescriptor {
    /// A descriptor with default registration, origin and parameters.
    ///
    /// Used directly by tests and callers that already hold the metadata;
    /// products go through [`GridDescriptor::resolve`].
    pub fn new(projection: Projection, xdim_size: usize, ydim_size: usize) -> Self {
        Self {
            xdim_size,
            ydim_size,
            ydim_major: true,
            projection,
            pixel_registration: PixelRegistration::default(),
            grid_origin: GridOrigin::default(),
            zone: -1,
            sphere: -1,
            params: [0.0; 13],
            corner_upleft: [0.0; 2],
            corner_lowright: [0.0; 2],
            som_block_offsets: Vec::new(),
        }
    }

    pub fn with_corners(mut self, upleft: [f64; 2], lowright: [f64; 2]) -> Self {
        self.corner_upleft = upleft;
        self.corner_lowright = lowright;
        self
    }

    pub fn with_params(mut self, params: [f64; 13]) -> Self {
        self.params = params;
        self
    }

    pub fn with_sphere(mut self, sphere: i32) -> Self {
        self.sphere = sphere;
        self
    }

    pub fn with_registration(mut self, registration: PixelRegistration) -> Self {
        self.pixel_registration = registration;
        self
    }

    pub fn with_origin(mut self, origin: GridOrigin) -> Self {
        self.grid_origin = origin;
        self
    }

    pub fn with_ydim_major(mut self, ydim_major: bool) -> Self {
        self.ydim_major = ydim_major;
        self
    }

    pub fn with_som_block_offsets(mut self, offsets: Vec<f64>) -> Self {
        self.som_block_offsets = offsets;
        self
    }

    /// Query the provider for everything coordinate computation needs.
    ///
    /// Missing registration or origin default to center / upper-left. A grid
    /// with no projection code resolves to [`Projection::Unprojected`].
    pub fn resolve<P: GridMetadataProvider + ?Sized>(provider: &P) -> Result<Self> {
        let grid = provider.grid_name().to_string();
        let unavailable = |attribute: &str, err: ProviderError| {
            GeolocationError::projection(format!(
                "grid {}: cannot obtain {}: {}",
                grid, attribute, err
            ))
        };

        let dims = provider
            .dimensions()
            .map_err(|e| unavailable("dimensions", e))?;
        if dims.xdim == 0 || dims.ydim == 0 {
            return Err(GeolocationError::projection(format!(
                "grid {} has a zero dimension ({} x {})",
                grid, dims.xdim, dims.ydim
            )));
        }

        let info = provider
            .projection()
            .map_err(|e| unavailable("projection info", e))?;
        let corners = provider
            .corners()
            .map_err(|e| unavailable("corner coordinates", e))?;
        let registration = provider
            .pixel_registration()
            .map_err(|e| unavailable("pixel registration", e))?;
        let origin = provider.origin().map_err(|e| unavailable("origin", e))?;

        let mut descriptor = match &info {
            Some(info) => Self::new(Projection::from_code(info.code), dims.xdim, dims.ydim)
                .with_params(info.params)
                .with_sphere(info.sphere),
            None => {
                debug!(grid = %grid, "no projection code, treating grid as unprojected");
                Self::new(Projection::Unprojected, dims.xdim, dims.ydim)
            }
        };
        if let Some(info) = &info {
            descriptor.zone = info.zone;
        }
        descriptor.ydim_major = dims.ydim_major;

        match corners {
            Some(c) => {
                descriptor.corner_upleft = c.upleft;
                descriptor.corner_lowright = c.lowright;
            }
            None if descriptor.projection != Projection::Unprojected => {
                return Err(GeolocationError::projection(format!(
                    "grid {} has no corner coordinates",
                    grid
                )));
            }
            None => {}
        }

        descriptor.pixel_registration = registration.unwrap_or_else(|| {
            debug!(grid = %grid, "no pixel registration, defaulting to center");
            PixelRegistration::Center
        });
        descriptor.grid_origin = origin.unwrap_or_else(|| {
            debug!(grid = %grid, "no grid origin, defaulting to upper left");
            GridOrigin::UpperLeft
        });

        if descriptor.projection == Projection::Gctp(GctpProjection::Som) {
            descriptor.som_block_offsets = provider
                .som_block_offsets()
                .map_err(|e| unavailable("SOM block offsets", e))?;
        }

        Ok(descriptor)
    }

    /// Geographic/CEA/unprojected grids store one latitude per row and one
    /// longitude per column.
    pub fn is_separable(&self) -> bool {
        match self.projection {
            Projection::Gctp(p) => p.is_separable(),
            Projection::Unprojected => true,
            Projection::Unsupported(_) => false,
        }
    }

    /// Geographic corners given in plain degrees rather than packed DMS.
    pub fn has_plain_degree_corners(&self) -> bool {
        self.projection == Projection::Gctp(GctpProjection::Geographic)
            && self
                .corner_upleft
                .iter()
                .chain(&self.corner_lowright)
                .all(|&v| is_plain_degrees(v))
    }

    /// Whether computed coordinates for this grid go through the file cache.
    pub fn is_cacheable(&self) -> bool {
        matches!(self.projection, Projection::Gctp(_)) && !self.has_plain_degree_corners()
    }

    /// 2-D dimensions in storage order.
    pub fn natural_dims(&self) -> [usize; 2] {
        if self.ydim_major {
            [self.ydim_size, self.xdim_size]
        } else {
            [self.xdim_size, self.ydim_size]
        }
    }

    /// Shape of the latitude or longitude variable as a client sees it at
    /// the given rank.
    pub fn variable_shape(&self, field: FieldTag, rank: usize) -> Result<Vec<usize>> {
        let natural = self.natural_dims();
        let is_som = self.projection == Projection::Gctp(GctpProjection::Som);
        let shape = match rank {
            1 if self.is_separable() => match field {
                FieldTag::Latitude => vec![self.ydim_size],
                FieldTag::Longitude => vec![self.xdim_size],
            },
            2 if !is_som => natural.to_vec(),
            3 if is_som => vec![SOM_BLOCK_COUNT, natural[0], natural[1]],
            _ => {
                return Err(GeolocationError::subset(format!(
                    "rank {} {} is not available for a {} grid",
                    rank, field, self.projection
                )))
            }
        };
        Ok(shape)
    }

    /// Grid extent and indexing conventions for the projection crate.
    pub fn geometry(&self) -> Result<GridGeometry> {
        Ok(GridGeometry::new(
            self.xdim_size,
            self.ydim_size,
            self.corner_upleft,
            self.corner_lowright,
            self.pixel_registration,
            self.grid_origin,
        )?)
    }

    /// Projection parameters, for grids with a supported GCTP code.
    pub fn projection_params(&self) -> Option<ProjectionParams> {
        match self.projection {
            Projection::Gctp(projection) => Some(ProjectionParams {
                projection,
                zone: self.zone,
                sphere: self.sphere,
                params: self.params,
            }),
            _ => None,
        }
    }
}
