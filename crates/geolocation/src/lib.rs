//! Geolocation for Projected Satellite Grids
//!
//! This crate computes per-cell latitude and longitude for HDF-EOS style
//! gridded products and serves strided subsets of them. It provides:
//!
//! - **Projection dispatch**: Geographic, CEA, sinusoidal, Lambert
//!   azimuthal, polar stereographic and SOM grids, plus grids with no
//!   projection metadata at all
//! - **Repair**: cells off the edge of the globe are filled from their
//!   neighbors so clients never see fill markers
//! - **File caching**: full buffers are persisted under advisory locks and
//!   shared between server processes
//!
//! # Architecture
//!
//! ```text
//! Client request (field + offset/count/stride)
//!      │
//!      ▼
//! GeolocationService::read_geolocation(descriptor, request)
//!      │
//!      ├─► Validate request against variable shape
//!      │
//!      ├─► build_key(descriptor) ──► LatLonCache::get (shared lock)
//!      │         │
//!      │         ├─► Hit: read one field, extract hyperslab
//!      │         │
//!      │         └─► Miss / corrupt (purged): engine::compute
//!      │                   │
//!      │                   ├─► repair + normalize longitudes
//!      │                   │
//!      │                   └─► LatLonCache::put (exclusive lock)
//!      │
//!      └─► subset::extract
//!               │
//!               ▼
//!          Return to client
//! ```
//!
//! # Example
//!
//! ```ignore
//! use geolocation::{FieldTag, GeolocationConfig, GeolocationService, GridDescriptor,
//!                   Hyperslab, InMemoryGrid, SubsetRequest};
//!
//! let grid = InMemoryGrid::from_json(&std::fs::read_to_string("grid.json")?)?;
//! let descriptor = GridDescriptor::resolve(&grid)?;
//!
//! let service = GeolocationService::new(&GeolocationConfig::from_env());
//! let request = SubsetRequest::new(FieldTag::Latitude, Hyperslab::full(&[grid.ydim]));
//! let latitudes = service.read_geolocation(&descriptor, &request)?;
//! ```

pub mod cache;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod repair;
pub mod service;
pub mod subset;
pub mod types;

// Re-export commonly used types at crate root
pub use cache::{build_key, CacheKey, CacheReader, LatLonCache};
pub use config::{CacheConfig, GeolocationConfig};
pub use descriptor::{GridDescriptor, Projection};
pub use engine::{compute, BufferLayout, ComputedBuffer, EngineOptions};
pub use error::{GeolocationError, Result};
pub use normalize::normalize_longitude;
pub use provider::{GridMetadataProvider, InMemoryGrid, ProviderError};
pub use repair::repair;
pub use service::{FieldData, GeolocationService};
pub use types::{AxisSlice, CacheStats, FieldTag, Hyperslab, SubsetRequest};

pub use projection::{GctpProjection, GridOrigin, PixelRegistration, UNDEFINED};
