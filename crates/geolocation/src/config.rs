//! Configuration for the geolocation service and its file cache.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default cap on the cache directory size, 1 GiB.
const DEFAULT_MAX_SIZE_BYTES: u64 = 1024 * 1024 * 1024;

/// Configuration for the latitude/longitude file cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether computed coordinates are persisted at all.
    pub enabled: bool,

    /// Existing directory holding cache files.
    pub directory: PathBuf,

    /// Prefix prepended to every cache file name.
    pub file_prefix: String,

    /// Upper bound on the cache directory size in bytes.
    pub max_size_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: std::env::temp_dir().join("latlon-cache"),
            file_prefix: "latlon_".to_string(),
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
        }
    }
}

impl CacheConfig {
    /// Load configuration from environment variables.
    ///
    /// Setting `GEOLOCATION_CACHE_DIR` enables the cache unless
    /// `GEOLOCATION_CACHE_ENABLED` says otherwise.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GEOLOCATION_CACHE_DIR") {
            config.directory = PathBuf::from(val);
            config.enabled = true;
        }

        if let Ok(val) = std::env::var("GEOLOCATION_CACHE_ENABLED") {
            config.enabled = parse_bool(&val);
        }

        if let Ok(val) = std::env::var("GEOLOCATION_CACHE_PREFIX") {
            config.file_prefix = val;
        }

        if let Ok(val) = std::env::var("GEOLOCATION_CACHE_MAX_SIZE") {
            if let Ok(size) = val.parse() {
                config.max_size_bytes = size;
            }
        }

        config
    }

    /// Validate the parts of the configuration that need no filesystem
    /// access. Directory checks happen in the cache preflight.
    pub fn validate(&self) -> Result<(), String> {
        if self.file_prefix.is_empty() {
            return Err("file_prefix must not be empty".to_string());
        }

        if self.file_prefix.contains('/') {
            return Err(format!(
                "file_prefix {:?} must not contain '/'",
                self.file_prefix
            ));
        }

        if self.max_size_bytes == 0 {
            return Err("max_size_bytes must be > 0".to_string());
        }

        Ok(())
    }
}

/// Configuration for the geolocation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    pub cache: CacheConfig,

    /// Rewrite [0, 360) longitudes into [-180, 180] before caching.
    pub normalize_longitude: bool,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            normalize_longitude: true,
        }
    }
}

impl GeolocationConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self {
            cache: CacheConfig::from_env(),
            ..Self::default()
        };

        if let Ok(val) = std::env::var("GEOLOCATION_NORMALIZE_LONGITUDE") {
            config.normalize_longitude = parse_bool(&val);
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache.enabled {
            self.cache.validate()?;
        }
        Ok(())
    }
}

fn parse_bool(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GeolocationConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.cache.enabled);
        assert!(config.normalize_longitude);
    }

    #[test]
    fn test_prefix_rules() {
        let mut cache = CacheConfig::default();
        cache.file_prefix = String::new();
        assert!(cache.validate().is_err());

        cache.file_prefix = "a/b".to_string();
        assert!(cache.validate().is_err());

        cache.file_prefix = "modis_".to_string();
        assert!(cache.validate().is_ok());
    }

    #[test]
    fn test_zero_size_rejected() {
        let cache = CacheConfig {
            max_size_bytes: 0,
            ..CacheConfig::default()
        };
        assert!(cache.validate().is_err());
    }

    #[test]
    fn test_disabled_cache_skips_validation() {
        let config = GeolocationConfig {
            cache: CacheConfig {
                enabled: false,
                file_prefix: String::new(),
                ..CacheConfig::default()
            },
            normalize_longitude: false,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: GeolocationConfig =
            serde_json::from_str(r#"{"cache": {"enabled": true, "directory": "/var/cache/ll"}}"#)
                .unwrap();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.directory, PathBuf::from("/var/cache/ll"));
        assert_eq!(config.cache.file_prefix, "latlon_");
        assert!(config.normalize_longitude);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("no"));
    }
}
