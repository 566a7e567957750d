//! Access to grid metadata and raw science fields.
//!
//! The scientific file library lives behind [`GridMetadataProvider`]; the
//! engine only ever asks it for projection metadata; it never reads latitude
//! or longitude from it. [`InMemoryGrid`] is a serde-backed implementation
//! used by tests and the `latlon-reader` binary.

use std::collections::BTreeMap;

use projection::{GridOrigin, PixelRegistration};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::subset;
use crate::types::Hyperslab;

/// Errors reported by a grid metadata provider.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The provider could not read an attribute.
    #[error("cannot read {attribute} of grid {grid}: {reason}")]
    Unavailable {
        grid: String,
        attribute: &'static str,
        reason: String,
    },

    /// No such field in the grid.
    #[error("field {0} not found")]
    FieldNotFound(String),

    /// Reading field data failed.
    #[error("failed to read field {field}: {reason}")]
    ReadFailed { field: String, reason: String },

    /// The grid description could not be parsed.
    #[error("invalid grid description: {0}")]
    InvalidDescription(String),
}

/// Grid dimension sizes and storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub xdim: usize,
    pub ydim: usize,
    /// YDim is the slower-varying storage dimension.
    pub ydim_major: bool,
}

/// GCTP projection metadata as stored with the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInfo {
    pub code: i32,
    #[serde(default)]
    pub zone: i32,
    #[serde(default)]
    pub sphere: i32,
    #[serde(default)]
    pub params: [f64; 13],
}

/// Upper-left and lower-right grid corners in projection units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCorners {
    pub upleft: [f64; 2],
    pub lowright: [f64; 2],
}

/// Source of grid metadata and non-geolocation field data.
///
/// Methods returning `Ok(None)` report an attribute the product simply does
/// not carry; `Err` means the provider could not answer.
pub trait GridMetadataProvider {
    /// Name of the grid within its file.
    fn grid_name(&self) -> &str;

    fn dimensions(&self) -> Result<GridDimensions, ProviderError>;

    /// `Ok(None)` when the product carries no projection code.
    fn projection(&self) -> Result<Option<ProjectionInfo>, ProviderError>;

    fn corners(&self) -> Result<Option<GridCorners>, ProviderError>;

    fn pixel_registration(&self) -> Result<Option<PixelRegistration>, ProviderError>;

    fn origin(&self) -> Result<Option<GridOrigin>, ProviderError>;

    /// Relative cross-track offsets between consecutive SOM blocks.
    fn som_block_offsets(&self) -> Result<Vec<f64>, ProviderError> {
        Ok(Vec::new())
    }

    /// Read a subset of a science field as native-endian bytes.
    fn read_raw_field(&self, name: &str, hyperslab: &Hyperslab) -> Result<Vec<u8>, ProviderError>;
}

/// A science field held in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawField {
    pub dims: Vec<usize>,
    pub values: Vec<f64>,
}

/// A grid described entirely in memory, typically loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InMemoryGrid {
    pub name: String,
    pub xdim: usize,
    pub ydim: usize,
    #[serde(default = "default_ydim_major")]
    pub ydim_major: bool,
    #[serde(default)]
    pub projection: Option<ProjectionInfo>,
    #[serde(default)]
    pub corners: Option<GridCorners>,
    #[serde(default)]
    pub pixel_registration: Option<PixelRegistration>,
    #[serde(default)]
    pub origin: Option<GridOrigin>,
    #[serde(default)]
    pub som_block_offsets: Vec<f64>,
    #[serde(default)]
    pub fields: BTreeMap<String, RawField>,
}

fn default_ydim_major() -> bool {
    true
}

impl InMemoryGrid {
    /// Start a grid with no projection metadata.
    pub fn new(name: impl Into<String>, xdim: usize, ydim: usize) -> Self {
        Self {
            name: name.into(),
            xdim,
            ydim,
            ydim_major: true,
            projection: None,
            corners: None,
            pixel_registration: None,
            origin: None,
            som_block_offsets: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Parse a JSON grid description.
    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        serde_json::from_str(json).map_err(|e| ProviderError::InvalidDescription(e.to_string()))
    }

    pub fn with_projection(mut self, code: i32, params: [f64; 13]) -> Self {
        self.projection = Some(ProjectionInfo {
            code,
            zone: -1,
            sphere: -1,
            params,
        });
        self
    }

    pub fn with_corners(mut self, upleft: [f64; 2], lowright: [f64; 2]) -> Self {
        self.corners = Some(GridCorners { upleft, lowright });
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, dims: Vec<usize>, values: Vec<f64>) -> Self {
        self.fields.insert(name.into(), RawField { dims, values });
        self
    }
}

impl GridMetadataProvider for InMemoryGrid {
    fn grid_name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> Result<GridDimensions, ProviderError> {
        Ok(GridDimensions {
            xdim: self.xdim,
            ydim: self.ydim,
            ydim_major: self.ydim_major,
        })
    }

    fn projection(&self) -> Result<Option<ProjectionInfo>, ProviderError> {
        Ok(self.projection.clone())
    }

    fn corners(&self) -> Result<Option<GridCorners>, ProviderError> {
        Ok(self.corners)
    }

    fn pixel_registration(&self) -> Result<Option<PixelRegistration>, ProviderError> {
        Ok(self.pixel_registration)
    }

    fn origin(&self) -> Result<Option<GridOrigin>, ProviderError> {
        Ok(self.origin)
    }

    fn som_block_offsets(&self) -> Result<Vec<f64>, ProviderError> {
        Ok(self.som_block_offsets.clone())
    }

    fn read_raw_field(&self, name: &str, hyperslab: &Hyperslab) -> Result<Vec<u8>, ProviderError> {
        let field = self
            .fields
            .get(name)
            .ok_or_else(|| ProviderError::FieldNotFound(name.to_string()))?;

        let read_failed = |e: crate::error::GeolocationError| ProviderError::ReadFailed {
            field: name.to_string(),
            reason: e.to_string(),
        };
        hyperslab.validate(&field.dims).map_err(read_failed)?;
        let values = subset::extract(&field.values, &field.dims, hyperslab).map_err(read_failed)?;

        Ok(bytemuck::cast_slice::<f64, u8>(&values).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AxisSlice;

    #[test]
    fn test_json_defaults() {
        let grid = InMemoryGrid::from_json(r#"{"name": "g", "xdim": 4, "ydim": 3}"#).unwrap();
        assert!(grid.ydim_major);
        assert_eq!(grid.projection().unwrap(), None);
        assert!(grid.som_block_offsets().unwrap().is_empty());
    }

    #[test]
    fn test_json_with_projection() {
        let grid = InMemoryGrid::from_json(
            r#"{
                "name": "MOD_Grid",
                "xdim": 2400, "ydim": 2400,
                "projection": {"code": 16, "sphere": -1,
                               "params": [6371007.181,0,0,0,0,0,0,0,0,0,0,0,0]},
                "corners": {"upleft": [-20015109.354, 1111950.52],
                            "lowright": [-18903158.834, 0.0]},
                "pixel_registration": "center",
                "origin": "upper_left"
            }"#,
        )
        .unwrap();
        let proj = grid.projection().unwrap().unwrap();
        assert_eq!(proj.code, 16);
        assert_eq!(proj.zone, 0);
        assert_eq!(grid.origin().unwrap(), Some(GridOrigin::UpperLeft));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            InMemoryGrid::from_json("{"),
            Err(ProviderError::InvalidDescription(_))
        ));
    }

    #[test]
    fn test_read_raw_field_subset() {
        let grid = InMemoryGrid::new("g", 3, 2).with_field(
            "temperature",
            vec![2, 3],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        );
        let slab = Hyperslab::new(vec![AxisSlice::new(1, 1, 1), AxisSlice::new(0, 2, 2)]);
        let bytes = grid.read_raw_field("temperature", &slab).unwrap();
        let values: Vec<f64> = bytes
            .chunks_exact(8)
            .map(|c| f64::from_ne_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(values, vec![4.0, 6.0]);
    }

    #[test]
    fn test_read_raw_field_missing() {
        let grid = InMemoryGrid::new("g", 3, 2);
        let err = grid
            .read_raw_field("nope", &Hyperslab::full(&[1]))
            .unwrap_err();
        assert_eq!(err, ProviderError::FieldNotFound("nope".to_string()));
    }
}
