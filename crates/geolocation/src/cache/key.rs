//! Deterministic cache file names derived from a grid descriptor.

use projection::{GctpProjection, SOM_BLOCK_COUNT};

use crate::descriptor::{GridDescriptor, Projection};

/// Longest file name most filesystems accept.
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Renderings with more significant digits than this switch to scientific
/// notation.
const MAX_FIXED_DIGITS: usize = 17;

/// Second CRC seed for the long-name fallback.
const SECONDARY_SEED: u32 = 0x9e37_79b9;

/// Name and expected size of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub file_name: String,
    /// Exact size of a complete entry in bytes.
    pub expected_size: u64,
}

/// Render a float with six fixed decimals so that values equal to six
/// decimals produce identical names.
pub fn format_fixed(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let fixed = format!("{:.6}", rounded);
    let digits = fixed.bytes().filter(u8::is_ascii_digit).count();
    if digits > MAX_FIXED_DIGITS {
        format!("{:.10e}", rounded)
    } else {
        fixed
    }
}

/// Size in bytes of a complete entry for a grid.
pub fn expected_size(descriptor: &GridDescriptor) -> u64 {
    let (x, y) = (descriptor.xdim_size as u64, descriptor.ydim_size as u64);
    let values = match descriptor.projection {
        Projection::Gctp(GctpProjection::Geographic | GctpProjection::Cea) => x + y,
        Projection::Gctp(GctpProjection::Som) => x * y * SOM_BLOCK_COUNT as u64 * 2,
        _ => x * y * 2,
    };
    values * std::mem::size_of::<f64>() as u64
}

fn crc32(bytes: &[u8], seed: u32) -> u32 {
    let mut hasher = crc32fast::Hasher::new_with_initial(seed);
    hasher.update(bytes);
    hasher.finalize()
}

/// Build the cache key for a grid.
///
/// Returns `None` for grids that are never cached: unprojected grids and
/// projection codes the engine cannot evaluate.
pub fn build_key(prefix: &str, descriptor: &GridDescriptor) -> Option<CacheKey> {
    let Projection::Gctp(gctp) = descriptor.projection else {
        return None;
    };

    let [first_dim, second_dim] = descriptor.natural_dims();
    let mut parts = vec![
        gctp.code().to_string(),
        descriptor.zone.to_string(),
        descriptor.sphere.to_string(),
        descriptor.pixel_registration.code().to_string(),
        descriptor.grid_origin.code().to_string(),
        first_dim.to_string(),
        second_dim.to_string(),
    ];
    parts.extend(
        descriptor
            .corner_upleft
            .iter()
            .chain(&descriptor.corner_lowright)
            .chain(&descriptor.params)
            .map(|&v| format_fixed(v)),
    );

    if gctp == GctpProjection::Som && !descriptor.som_block_offsets.is_empty() {
        let offsets: Vec<String> = descriptor
            .som_block_offsets
            .iter()
            .map(|&v| format_fixed(v))
            .collect();
        parts.push(format!("o{:08x}", crc32(offsets.join(",").as_bytes(), 0)));
    }

    let encoded = parts.join("_");
    let mut file_name = format!("{}{}", prefix, encoded);
    if file_name.len() > MAX_FILE_NAME_LEN {
        file_name = format!(
            "{}h{:08x}{:08x}",
            prefix,
            crc32(encoded.as_bytes(), 0),
            crc32(encoded.as_bytes(), SECONDARY_SEED)
        );
    }

    Some(CacheKey {
        file_name,
        expected_size: expected_size(descriptor),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::PixelRegistration;

    fn sinusoidal() -> GridDescriptor {
        let mut p = [0.0; 13];
        p[0] = 6371007.181;
        GridDescriptor::new(Projection::Gctp(GctpProjection::Sinusoidal), 2400, 2400)
            .with_params(p)
            .with_corners([-20015109.354, 1111950.52], [-18903158.834, 0.0])
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(0.0), "0");
        assert_eq!(format_fixed(-0.0), "0");
        assert_eq!(format_fixed(1e-9), "0");
        assert_eq!(format_fixed(1.5), "1.500000");
        assert_eq!(format_fixed(-20015109.354), "-20015109.354000");
        assert_eq!(format_fixed(0.1 + 0.2), format_fixed(0.3));
    }

    #[test]
    fn test_format_fixed_large_values_use_exponent() {
        let s = format_fixed(1.0e20);
        assert!(s.contains('e'), "{}", s);
        assert_eq!(format_fixed(1.0e20), format_fixed(1.0e20 + 1.0));
    }

    #[test]
    fn test_key_layout() {
        let key = build_key("ll_", &sinusoidal()).unwrap();
        assert!(key.file_name.starts_with("ll_16_-1_-1_0_0_2400_2400_-20015109.354000_"));
        assert_eq!(key.expected_size, 2400 * 2400 * 2 * 8);
    }

    #[test]
    fn test_key_determinism() {
        let a = sinusoidal();
        let mut b = sinusoidal();
        b.params[0] = 6371007.181 + 1e-9;
        assert_eq!(build_key("p", &a), build_key("p", &b));

        let c = sinusoidal().with_registration(PixelRegistration::Corner);
        assert_ne!(build_key("p", &a), build_key("p", &c));
    }

    #[test]
    fn test_dimension_order_follows_storage() {
        let a = build_key("p", &sinusoidal().with_corners([0.0, 1.0], [1.0, 0.0])).unwrap();
        let mut rect = sinusoidal().with_corners([0.0, 1.0], [1.0, 0.0]);
        rect.xdim_size = 10;
        rect.ydim_size = 20;
        let by_y = build_key("p", &rect).unwrap();
        let by_x = build_key("p", &rect.clone().with_ydim_major(false)).unwrap();
        assert!(by_y.file_name.contains("_20_10_"));
        assert!(by_x.file_name.contains("_10_20_"));
        assert_ne!(a, by_y);
    }

    #[test]
    fn test_expected_sizes() {
        let geo = GridDescriptor::new(Projection::Gctp(GctpProjection::Geographic), 4, 3);
        assert_eq!(expected_size(&geo), 7 * 8);
        let som = GridDescriptor::new(Projection::Gctp(GctpProjection::Som), 512, 128);
        assert_eq!(expected_size(&som), 512 * 128 * 180 * 2 * 8);
    }

    #[test]
    fn test_som_offsets_change_key() {
        let som = GridDescriptor::new(Projection::Gctp(GctpProjection::Som), 512, 128);
        let plain = build_key("p", &som).unwrap();
        let shifted = build_key("p", &som.clone().with_som_block_offsets(vec![16.0; 179])).unwrap();
        assert_ne!(plain.file_name, shifted.file_name);
        assert!(shifted.file_name.contains("_o"));
    }

    #[test]
    fn test_long_names_are_hashed() {
        let long_prefix = "x".repeat(200);
        let key = build_key(&long_prefix, &sinusoidal()).unwrap();
        assert_eq!(key.file_name.len(), 200 + 1 + 16);
        assert!(key.file_name.starts_with(&format!("{}h", long_prefix)));
        assert_eq!(Some(key), build_key(&long_prefix, &sinusoidal()));
    }

    #[test]
    fn test_uncached_projections() {
        assert!(build_key("p", &GridDescriptor::new(Projection::Unprojected, 4, 3)).is_none());
        assert!(build_key("p", &GridDescriptor::new(Projection::Unsupported(4), 4, 3)).is_none());
    }
}
