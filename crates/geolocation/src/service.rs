//! High-level geolocation service.
//!
//! The `GeolocationService` answers latitude/longitude subset requests for a
//! grid: it probes the file cache, computes the full buffer on a miss,
//! persists it, and extracts the requested hyperslab.
//!
//! # Example
//!
//! ```rust,ignore
//! use geolocation::{GeolocationConfig, GeolocationService, GridDescriptor};
//!
//! // Create once at startup; the cache handle is shared by every request.
//! let service = GeolocationService::new(&GeolocationConfig::from_env());
//!
//! let descriptor = GridDescriptor::resolve(&provider)?;
//! let request = SubsetRequest::new(FieldTag::Latitude, Hyperslab::full(&[2400, 2400]));
//! let latitudes = service.read_geolocation(&descriptor, &request)?;
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{CacheKey, LatLonCache};
use crate::config::GeolocationConfig;
use crate::descriptor::GridDescriptor;
use crate::engine::{self, BufferLayout, EngineOptions};
use crate::error::{GeolocationError, Result};
use crate::provider::GridMetadataProvider;
use crate::subset;
use crate::types::{CacheStats, FieldTag, Hyperslab, SubsetRequest};

/// Values of a field read through [`GeolocationService::read_field`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    /// Computed latitudes or longitudes in degrees.
    Coordinates(Vec<f64>),
    /// Raw bytes from the provider.
    Raw(Vec<u8>),
}

/// Serves latitude/longitude subsets, caching full buffers on disk.
pub struct GeolocationService {
    options: EngineOptions,
    cache: Option<Arc<LatLonCache>>,
}

impl GeolocationService {
    /// Create a service, opening the cache if the configuration enables it.
    ///
    /// An unusable cache configuration is reported once and the service
    /// runs uncached.
    pub fn new(config: &GeolocationConfig) -> Self {
        let cache = if config.cache.enabled {
            match LatLonCache::open(&config.cache) {
                Ok(cache) => Some(Arc::new(cache)),
                Err(e) => {
                    warn!(error = %e, "geolocation cache disabled");
                    None
                }
            }
        } else {
            None
        };
        Self::with_cache(config, cache)
    }

    /// Create a service around an existing (possibly shared) cache handle.
    pub fn with_cache(config: &GeolocationConfig, cache: Option<Arc<LatLonCache>>) -> Self {
        Self {
            options: EngineOptions {
                normalize_longitude: config.normalize_longitude,
            },
            cache,
        }
    }

    pub fn cache(&self) -> Option<&Arc<LatLonCache>> {
        self.cache.as_ref()
    }

    /// Cache statistics, when caching is enabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|c| c.stats())
    }

    /// Read a latitude or longitude subset for a grid.
    ///
    /// The request is validated against the variable's shape before any
    /// cache or projection work.
    pub fn read_geolocation(
        &self,
        descriptor: &GridDescriptor,
        request: &SubsetRequest,
    ) -> Result<Vec<f64>> {
        let shape = descriptor.variable_shape(request.field, request.final_rank())?;
        request.hyperslab.validate(&shape)?;

        let cached = self
            .cache
            .as_ref()
            .and_then(|cache| cache.key_for(descriptor).map(|key| (cache, key)));
        let Some((cache, key)) = cached else {
            debug!(projection = %descriptor.projection, field = %request.field, "computing uncached coordinates");
            let buffer = engine::compute(descriptor, self.options)?;
            return serve(buffer.field(request.field), &buffer.layout, descriptor, request);
        };

        let layout = BufferLayout::for_descriptor(descriptor);
        match read_cached(cache, &key, &layout, descriptor, request) {
            Ok(Some(values)) => return Ok(values),
            Ok(None) => {}
            Err(e) if e.is_recoverable() => {
                warn!(key = %key.file_name, error = %e, "purging corrupt cache entry");
                if let Err(purge_err) = cache.purge(&key) {
                    warn!(key = %key.file_name, error = %purge_err, "failed to purge cache entry");
                }
            }
            Err(e @ GeolocationError::Lock { .. }) => return Err(e),
            Err(e) => {
                warn!(key = %key.file_name, error = %e, "cache read failed, recomputing");
            }
        }

        let buffer = engine::compute(descriptor, self.options)?;
        match cache.put(&key, &buffer) {
            Ok(()) => {}
            Err(e @ GeolocationError::Lock { .. }) => return Err(e),
            Err(e) => warn!(key = %key.file_name, error = %e, "failed to write cache entry"),
        }
        serve(buffer.field(request.field), &buffer.layout, descriptor, request)
    }

    /// Read any field of a grid by name.
    ///
    /// Latitude/longitude names are computed from the grid's projection;
    /// everything else is read from the provider.
    pub fn read_field<P: GridMetadataProvider + ?Sized>(
        &self,
        provider: &P,
        name: &str,
        hyperslab: &Hyperslab,
    ) -> Result<FieldData> {
        match FieldTag::from_field_name(name) {
            Some(field) => {
                let descriptor = GridDescriptor::resolve(provider)?;
                let request = SubsetRequest::new(field, hyperslab.clone());
                Ok(FieldData::Coordinates(
                    self.read_geolocation(&descriptor, &request)?,
                ))
            }
            None => Ok(FieldData::Raw(provider.read_raw_field(name, hyperslab)?)),
        }
    }
}

/// Serve a request from a cache entry. `Ok(None)` on a miss.
fn read_cached(
    cache: &LatLonCache,
    key: &CacheKey,
    layout: &BufferLayout,
    descriptor: &GridDescriptor,
    request: &SubsetRequest,
) -> Result<Option<Vec<f64>>> {
    let Some(mut reader) = cache.get(key)? else {
        return Ok(None);
    };
    let values = reader.read_f64s(
        layout.field_offset(request.field),
        layout.field_len(request.field),
    )?;
    reader.unlock_and_close()?;
    serve(&values, layout, descriptor, request).map(Some)
}

/// Extract the requested hyperslab from one field's full values.
fn serve(
    values: &[f64],
    layout: &BufferLayout,
    descriptor: &GridDescriptor,
    request: &SubsetRequest,
) -> Result<Vec<f64>> {
    match layout {
        BufferLayout::Vector { .. } if request.final_rank() == 2 => {
            // Latitude follows Y, longitude follows X.
            let axis = match (request.field, descriptor.ydim_major) {
                (FieldTag::Latitude, true) | (FieldTag::Longitude, false) => 0,
                _ => 1,
            };
            subset::broadcast_extract(values, axis, &request.hyperslab)
        }
        _ => Ok(subset::extract(values, &layout.field_dims(request.field), &request.hyperslab)?
            .into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::descriptor::Projection;
    use crate::provider::InMemoryGrid;
    use crate::types::AxisSlice;
    use projection::GctpProjection;

    fn global(xdim: usize, ydim: usize) -> GridDescriptor {
        GridDescriptor::new(Projection::Gctp(GctpProjection::Geographic), xdim, ydim)
            .with_corners([-180.0, 90.0], [180.0, -90.0])
    }

    #[test]
    fn test_uncached_latitude_column() {
        let service = GeolocationService::new(&GeolocationConfig::default());
        let request = SubsetRequest::new(FieldTag::Latitude, Hyperslab::full(&[3]));
        assert_eq!(
            service.read_geolocation(&global(4, 3), &request).unwrap(),
            vec![60.0, 0.0, -60.0]
        );
        assert!(service.cache_stats().is_none());
    }

    #[test]
    fn test_rank2_broadcast_follows_storage_order() {
        let service = GeolocationService::new(&GeolocationConfig::default());
        let by_rows = SubsetRequest::new(
            FieldTag::Longitude,
            Hyperslab::new(vec![AxisSlice::new(0, 2, 1), AxisSlice::new(1, 2, 2)]),
        );
        assert_eq!(
            service.read_geolocation(&global(4, 3), &by_rows).unwrap(),
            vec![-45.0, 135.0, -45.0, 135.0]
        );

        let by_cols = SubsetRequest::new(
            FieldTag::Longitude,
            Hyperslab::new(vec![AxisSlice::new(1, 2, 2), AxisSlice::new(0, 2, 1)]),
        );
        assert_eq!(
            service
                .read_geolocation(&global(4, 3).with_ydim_major(false), &by_cols)
                .unwrap(),
            vec![-45.0, -45.0, 135.0, 135.0]
        );
    }

    #[test]
    fn test_invalid_request_rejected_before_compute() {
        let service = GeolocationService::new(&GeolocationConfig::default());
        let desc = GridDescriptor::new(Projection::Unsupported(4), 4, 3);
        // Rank 1 is not available for a non-separable grid; the subset error
        // wins over the unsupported projection.
        let request = SubsetRequest::new(FieldTag::Latitude, Hyperslab::full(&[3]));
        assert!(matches!(
            service.read_geolocation(&desc, &request),
            Err(GeolocationError::Subset(_))
        ));
    }

    #[test]
    fn test_bad_cache_config_runs_uncached() {
        let config = GeolocationConfig {
            cache: CacheConfig {
                enabled: true,
                directory: "/nonexistent/latlon-cache".into(),
                ..CacheConfig::default()
            },
            ..GeolocationConfig::default()
        };
        let service = GeolocationService::new(&config);
        assert!(service.cache().is_none());
    }

    #[test]
    fn test_read_field_routing() {
        let grid = InMemoryGrid::new("g", 4, 3)
            .with_projection(0, [0.0; 13])
            .with_corners([-180.0, 90.0], [180.0, -90.0])
            .with_field("Temperature", vec![3, 4], (0..12).map(f64::from).collect());
        let service = GeolocationService::new(&GeolocationConfig::default());

        let lat = service
            .read_field(&grid, "Latitude", &Hyperslab::full(&[3]))
            .unwrap();
        assert_eq!(lat, FieldData::Coordinates(vec![60.0, 0.0, -60.0]));

        let raw = service
            .read_field(&grid, "Temperature", &Hyperslab::full(&[3, 4]))
            .unwrap();
        match raw {
            FieldData::Raw(bytes) => assert_eq!(bytes.len(), 12 * 8),
            other => panic!("expected raw bytes, got {:?}", other),
        }

        assert!(matches!(
            service.read_field(&grid, "missing", &Hyperslab::full(&[1])),
            Err(GeolocationError::Provider(_))
        ));
    }
}
