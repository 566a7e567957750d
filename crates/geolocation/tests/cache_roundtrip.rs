//! Integration tests: computed buffers survive a trip through the file cache.
//!
//! Every scenario computes a grid once through a cached service, then
//! serves the same request again and checks the second answer comes from
//! disk and matches the first.

use std::sync::Arc;

use geolocation::{
    compute, AxisSlice, CacheConfig, EngineOptions, FieldTag, GctpProjection, GeolocationConfig,
    GeolocationService, GridDescriptor, Hyperslab, LatLonCache, Projection, SubsetRequest,
};
use projection::degrees_to_dms;
use test_utils::{assert_all_approx_eq, TempCacheDir};

fn cached_service(dir: &TempCacheDir) -> GeolocationService {
    let config = GeolocationConfig {
        cache: CacheConfig {
            enabled: true,
            directory: dir.path().to_path_buf(),
            file_prefix: "test_".to_string(),
            ..CacheConfig::default()
        },
        ..GeolocationConfig::default()
    };
    let service = GeolocationService::new(&config);
    assert!(service.cache().is_some(), "cache should open in a temp dir");
    service
}

/// 4 x 3 global geographic grid with packed-DMS corners, so it is cached.
fn dms_global() -> GridDescriptor {
    GridDescriptor::new(Projection::Gctp(GctpProjection::Geographic), 4, 3).with_corners(
        [degrees_to_dms(-180.0), degrees_to_dms(90.0)],
        [degrees_to_dms(180.0), degrees_to_dms(-90.0)],
    )
}

/// Small sinusoidal tile near the prime meridian.
fn sinusoidal_tile() -> GridDescriptor {
    let mut p = [0.0; 13];
    p[0] = 6371007.181;
    GridDescriptor::new(Projection::Gctp(GctpProjection::Sinusoidal), 6, 4)
        .with_params(p)
        .with_corners([0.0, 1111950.52], [1111950.52, 0.0])
}

#[test]
fn test_geographic_end_to_end() {
    let dir = TempCacheDir::new();
    let service = cached_service(&dir);
    let request = SubsetRequest::new(FieldTag::Latitude, Hyperslab::full(&[3]));

    let first = service.read_geolocation(&dms_global(), &request).unwrap();
    assert_all_approx_eq!(first, [60.0, 0.0, -60.0], 1e-9);

    let entries = dir.entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].starts_with("test_0_"));
    assert_eq!(dir.entry_len(&entries[0]), (4 + 3) * 8);

    let second = service.read_geolocation(&dms_global(), &request).unwrap();
    assert_eq!(first, second);

    let stats = service.cache_stats().unwrap();
    assert_eq!((stats.hits, stats.misses, stats.writes), (1, 1, 1));
}

#[test]
fn test_plain_degree_grid_is_not_cached() {
    let dir = TempCacheDir::new();
    let service = cached_service(&dir);
    let desc = GridDescriptor::new(Projection::Gctp(GctpProjection::Geographic), 4, 3)
        .with_corners([-180.0, 90.0], [180.0, -90.0]);

    let lat = service
        .read_geolocation(
            &desc,
            &SubsetRequest::new(FieldTag::Latitude, Hyperslab::full(&[3])),
        )
        .unwrap();
    assert_eq!(lat, vec![60.0, 0.0, -60.0]);
    assert!(dir.entries().is_empty());
}

#[test]
fn test_cached_subset_matches_fresh_compute() {
    let dir = TempCacheDir::new();
    let service = cached_service(&dir);
    let desc = sinusoidal_tile();
    let fresh = compute(&desc, EngineOptions::default()).unwrap();

    // Prime the cache with a full read, then ask for strided windows.
    service
        .read_geolocation(
            &desc,
            &SubsetRequest::new(FieldTag::Longitude, Hyperslab::full(&[4, 6])),
        )
        .unwrap();

    for (offset, count, stride) in [([0, 0], [4, 6], [1, 1]), ([1, 1], [2, 3], [2, 2]), ([3, 5], [1, 1], [1, 1])] {
        let slab = Hyperslab::from_parts(&offset, &count, &stride).unwrap();
        for field in [FieldTag::Latitude, FieldTag::Longitude] {
            let got = service
                .read_geolocation(&desc, &SubsetRequest::new(field, slab.clone()))
                .unwrap();
            let values = fresh.field(field);
            let mut expected = Vec::new();
            for i in 0..count[0] {
                for j in 0..count[1] {
                    let row = offset[0] + i * stride[0];
                    let col = offset[1] + j * stride[1];
                    expected.push(values[row * 6 + col]);
                }
            }
            assert_eq!(got, expected, "{} {:?}", field, slab);
        }
    }

    let stats = service.cache_stats().unwrap();
    assert_eq!(stats.writes, 1);
    assert_eq!(stats.hits, 6);
}

#[test]
fn test_rank2_broadcast_from_cached_vectors() {
    let dir = TempCacheDir::new();
    let service = cached_service(&dir);
    let slab = Hyperslab::new(vec![AxisSlice::new(0, 3, 1), AxisSlice::new(0, 2, 3)]);

    let lat = service
        .read_geolocation(&dms_global(), &SubsetRequest::new(FieldTag::Latitude, slab.clone()))
        .unwrap();
    let lon = service
        .read_geolocation(&dms_global(), &SubsetRequest::new(FieldTag::Longitude, slab))
        .unwrap();

    assert_all_approx_eq!(lat, [60.0, 60.0, 0.0, 0.0, -60.0, -60.0], 1e-9);
    assert_all_approx_eq!(lon, [-135.0, 135.0, -135.0, 135.0, -135.0, 135.0], 1e-9);
}

#[test]
fn test_shared_cache_handle() {
    let dir = TempCacheDir::new();
    let cache = Arc::new(
        LatLonCache::open(&CacheConfig {
            enabled: true,
            directory: dir.path().to_path_buf(),
            ..CacheConfig::default()
        })
        .unwrap(),
    );
    let config = GeolocationConfig::default();
    let a = GeolocationService::with_cache(&config, Some(Arc::clone(&cache)));
    let b = GeolocationService::with_cache(&config, Some(Arc::clone(&cache)));

    let request = SubsetRequest::new(FieldTag::Longitude, Hyperslab::full(&[4, 6]));
    let from_a = a.read_geolocation(&sinusoidal_tile(), &request).unwrap();
    let from_b = b.read_geolocation(&sinusoidal_tile(), &request).unwrap();

    assert_eq!(from_a, from_b);
    let stats = cache.stats();
    assert_eq!((stats.hits, stats.writes), (1, 1));
}

#[test]
fn test_key_is_stable_across_equivalent_descriptors() {
    let dir = TempCacheDir::new();
    let service = cached_service(&dir);
    let request = SubsetRequest::new(FieldTag::Latitude, Hyperslab::full(&[4, 6]));

    let mut nudged = sinusoidal_tile();
    nudged.params[0] += 1e-8;
    nudged.corner_upleft[1] += 1e-8;

    service.read_geolocation(&sinusoidal_tile(), &request).unwrap();
    service.read_geolocation(&nudged, &request).unwrap();

    assert_eq!(dir.entries().len(), 1);
    assert_eq!(service.cache_stats().unwrap().hits, 1);
}
