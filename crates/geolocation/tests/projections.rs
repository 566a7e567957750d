//! Integration tests covering each projection path through the service.

use geolocation::{
    compute, AxisSlice, CacheConfig, EngineOptions, FieldData, FieldTag, GctpProjection,
    GeolocationConfig, GeolocationError, GeolocationService, GridDescriptor, Hyperslab,
    InMemoryGrid, Projection, SubsetRequest, UNDEFINED,
};
use projection::degrees_to_dms;
use test_utils::{assert_approx_eq, cell_centers, TempCacheDir};

fn cached_service(dir: &TempCacheDir) -> GeolocationService {
    GeolocationService::new(&GeolocationConfig {
        cache: CacheConfig {
            enabled: true,
            directory: dir.path().to_path_buf(),
            ..CacheConfig::default()
        },
        ..GeolocationConfig::default()
    })
}

fn full(service: &GeolocationService, desc: &GridDescriptor, field: FieldTag) -> Vec<f64> {
    let rank = if desc.projection == Projection::Gctp(GctpProjection::Som) {
        3
    } else {
        2
    };
    let shape = desc.variable_shape(field, rank).unwrap();
    service
        .read_geolocation(desc, &SubsetRequest::new(field, Hyperslab::full(&shape)))
        .unwrap()
}

fn assert_all_defined(lat: &[f64], lon: &[f64]) {
    for &v in lat {
        assert!(v != UNDEFINED && (-90.0..=90.0).contains(&v), "latitude {}", v);
    }
    for &v in lon {
        assert!(v != UNDEFINED && (-180.0..=180.0).contains(&v), "longitude {}", v);
    }
}

#[test]
fn test_sinusoidal_tile_overhanging_the_globe() {
    // Westernmost MODIS tile of the 0-10N band, sampled coarsely.
    let mut p = [0.0; 13];
    p[0] = 6371007.181;
    let desc = GridDescriptor::new(Projection::Gctp(GctpProjection::Sinusoidal), 6, 4)
        .with_params(p)
        .with_corners([-20015109.354, 1111950.52], [-18903158.834, 0.0]);

    let dir = TempCacheDir::new();
    let service = cached_service(&dir);
    let lat = full(&service, &desc, FieldTag::Latitude);
    let lon = full(&service, &desc, FieldTag::Longitude);
    assert_all_defined(&lat, &lon);

    // Row 0, column 0 lies past the western edge and is extrapolated
    // from the rest of its row.
    assert_approx_eq!(lat[0], lat[1], 1e-9);
    assert_eq!(lon[0], -180.0);
    assert!(lon[1] > -180.0);
}

#[test]
fn test_lambert_azimuthal_corners_filled() {
    let mut p = [0.0; 13];
    p[0] = 6371228.0;
    p[5] = degrees_to_dms(90.0);
    let desc = GridDescriptor::new(Projection::Gctp(GctpProjection::LambertAzimuthal), 8, 8)
        .with_params(p)
        .with_corners([-12000000.0, 12000000.0], [12000000.0, -12000000.0]);

    let dir = TempCacheDir::new();
    let service = cached_service(&dir);
    let lat = full(&service, &desc, FieldTag::Latitude);
    let lon = full(&service, &desc, FieldTag::Longitude);
    assert_all_defined(&lat, &lon);

    // Columns 0 and 1 of the first row are outside the projected disc and
    // take the value of column 2.
    assert_eq!(lat[0], lat[2]);
    assert_eq!(lat[1], lat[2]);
    assert_eq!(lon[0], lon[2]);

    // The grid center is near the pole.
    assert!(lat[3 * 8 + 3] > 60.0);
    assert_eq!(dir.entries().len(), 1);
}

#[test]
fn test_som_rank3_request() {
    let mut p = [0.0; 13];
    p[0] = 6378137.0;
    p[3] = degrees_to_dms(98.18);
    p[4] = degrees_to_dms(127.7);
    p[8] = 98.88;
    p[12] = 1.0;
    let desc = GridDescriptor::new(Projection::Gctp(GctpProjection::Som), 4, 2)
        .with_params(p)
        .with_corners([7460750.0, 1090650.0], [7601550.0, 527450.0]);

    let dir = TempCacheDir::new();
    let service = cached_service(&dir);
    let slab = Hyperslab::new(vec![
        AxisSlice::new(10, 3, 2),
        AxisSlice::new(0, 2, 1),
        AxisSlice::new(1, 2, 2),
    ]);
    let lat = service
        .read_geolocation(&desc, &SubsetRequest::new(FieldTag::Latitude, slab.clone()))
        .unwrap();

    let reference = compute(&desc, EngineOptions::default()).unwrap();
    let mut expected = Vec::new();
    for block in [10, 12, 14] {
        for line in 0..2 {
            for sample in [1, 3] {
                expected.push(reference.latitude[(block * 2 + line) * 4 + sample]);
            }
        }
    }
    assert_eq!(lat, expected);

    let entries = dir.entries();
    assert_eq!(dir.entry_len(&entries[0]), 4 * 2 * 180 * 2 * 8);

    // Served from the cache the second time.
    let again = service
        .read_geolocation(&desc, &SubsetRequest::new(FieldTag::Latitude, slab))
        .unwrap();
    assert_eq!(again, expected);
    assert_eq!(service.cache_stats().unwrap().hits, 1);
}

#[test]
fn test_som_rejects_rank2() {
    let desc = GridDescriptor::new(Projection::Gctp(GctpProjection::Som), 4, 2);
    let service = GeolocationService::new(&GeolocationConfig::default());
    let err = service
        .read_geolocation(
            &desc,
            &SubsetRequest::new(FieldTag::Latitude, Hyperslab::full(&[2, 4])),
        )
        .unwrap_err();
    assert!(matches!(err, GeolocationError::Subset(_)));
}

#[test]
fn test_zero_to_360_grid_is_normalized_before_caching() {
    let desc = GridDescriptor::new(Projection::Gctp(GctpProjection::Geographic), 4, 2)
        .with_corners(
            [degrees_to_dms(0.0), degrees_to_dms(90.0)],
            [degrees_to_dms(360.0), degrees_to_dms(-90.0)],
        );
    let request = SubsetRequest::new(FieldTag::Longitude, Hyperslab::full(&[4]));

    let dir = TempCacheDir::new();
    let service = cached_service(&dir);
    let first = service.read_geolocation(&desc, &request).unwrap();
    let second = service.read_geolocation(&desc, &request).unwrap();

    for (got, want) in first.iter().zip([45.0, 135.0, -135.0, -45.0]) {
        assert_approx_eq!(*got, want, 1e-9);
    }
    assert_eq!(first, second);
}

#[test]
fn test_unprojected_grid_through_provider() {
    let grid = InMemoryGrid::new("swath_like", 4, 2);
    let dir = TempCacheDir::new();
    let service = cached_service(&dir);

    let lon = service
        .read_field(&grid, "Longitude", &Hyperslab::full(&[4]))
        .unwrap();
    assert_eq!(lon, FieldData::Coordinates(cell_centers(-180.0, 180.0, 4)));

    let lat = service
        .read_field(&grid, "lat", &Hyperslab::full(&[2]))
        .unwrap();
    assert_eq!(lat, FieldData::Coordinates(vec![45.0, -45.0]));
    assert!(dir.entries().is_empty());
}

#[test]
fn test_unsupported_projection_fails() {
    let grid = InMemoryGrid::new("utm", 4, 2)
        .with_projection(1, [0.0; 13])
        .with_corners([500000.0, 4000000.0], [600000.0, 3900000.0]);
    let service = GeolocationService::new(&GeolocationConfig::default());
    let err = service
        .read_field(&grid, "latitude", &Hyperslab::full(&[2, 4]))
        .unwrap_err();
    assert!(matches!(err, GeolocationError::Projection(_)));
}
