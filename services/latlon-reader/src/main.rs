//! Geolocation field reader.
//!
//! Loads a grid description from JSON, reads one field through the
//! geolocation service (computing latitude/longitude and caching them
//! when configured) and prints the selected values as JSON on stdout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use geolocation::{
    FieldData, GeolocationConfig, GeolocationService, GridMetadataProvider, Hyperslab,
    InMemoryGrid,
};

#[derive(Parser, Debug)]
#[command(name = "latlon-reader")]
#[command(about = "Read geolocation and data fields from HDF-EOS style grid descriptions")]
struct Args {
    /// Grid description file (JSON)
    #[arg(short, long)]
    grid: PathBuf,

    /// Field to read; latitude/longitude names are computed
    #[arg(short, long, default_value = "latitude")]
    field: String,

    /// Start index per axis, comma separated (default: 0 on every axis)
    #[arg(long, value_delimiter = ',')]
    offset: Vec<usize>,

    /// Number of values per axis, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    count: Vec<usize>,

    /// Step per axis, comma separated (default: 1 on every axis)
    #[arg(long, value_delimiter = ',')]
    stride: Vec<usize>,

    /// Configuration file path (YAML); environment variables are used when omitted
    #[arg(short, long, env = "GEOLOCATION_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

/// Printed result of a read.
#[derive(Debug, Serialize)]
struct Output<'a> {
    grid: &'a str,
    field: &'a str,
    count: &'a [usize],
    values: Vec<f64>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs);

    let config = load_config(args.config.as_deref())?;
    let grid = load_grid(&args.grid)?;
    let hyperslab = build_hyperslab(&args.offset, &args.count, &args.stride)?;

    info!(
        grid = %grid.grid_name(),
        field = %args.field,
        cache = config.cache.enabled,
        "Reading field"
    );

    let service = GeolocationService::new(&config);
    let data = service
        .read_field(&grid, &args.field, &hyperslab)
        .with_context(|| format!("Failed to read field '{}'", args.field))?;

    if let Some(stats) = service.cache_stats() {
        info!(
            hits = stats.hits,
            misses = stats.misses,
            writes = stats.writes,
            purges = stats.purges,
            "Cache statistics"
        );
    }

    let output = Output {
        grid: grid.grid_name(),
        field: &args.field,
        count: &args.count,
        values: field_values(data)?,
    };
    println!("{}", serde_json::to_string(&output)?);

    Ok(())
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so stdout carries only the result.
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load the service configuration from a YAML file, or from the environment.
fn load_config(path: Option<&Path>) -> Result<GeolocationConfig> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_yaml::from_str(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => GeolocationConfig::from_env(),
    };

    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

fn load_grid(path: &Path) -> Result<InMemoryGrid> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read grid description {}", path.display()))?;
    InMemoryGrid::from_json(&text)
        .with_context(|| format!("Invalid grid description {}", path.display()))
}

/// Fill in default offsets and strides, then check the lists line up.
fn build_hyperslab(offset: &[usize], count: &[usize], stride: &[usize]) -> Result<Hyperslab> {
    let rank = count.len();
    let offset = if offset.is_empty() {
        vec![0; rank]
    } else {
        offset.to_vec()
    };
    let stride = if stride.is_empty() {
        vec![1; rank]
    } else {
        stride.to_vec()
    };
    if offset.len() != rank || stride.len() != rank {
        bail!(
            "--offset, --count and --stride need the same number of axes ({}/{}/{})",
            offset.len(),
            rank,
            stride.len()
        );
    }
    Ok(Hyperslab::from_parts(&offset, count, &stride)?)
}

/// Flatten a read into printable numbers. Raw fields hold native-endian f64.
fn field_values(data: FieldData) -> Result<Vec<f64>> {
    match data {
        FieldData::Coordinates(values) => Ok(values),
        FieldData::Raw(bytes) => {
            if bytes.len() % std::mem::size_of::<f64>() != 0 {
                bail!("Raw field of {} bytes is not a list of f64", bytes.len());
            }
            Ok(bytemuck::pod_collect_to_vec::<u8, f64>(&bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_comma_lists() {
        let args = Args::try_parse_from([
            "latlon-reader",
            "--grid",
            "grid.json",
            "--field",
            "lon",
            "--offset",
            "1,2",
            "--count",
            "3,4",
            "--json-logs",
        ])
        .unwrap();
        assert_eq!(args.offset, vec![1, 2]);
        assert_eq!(args.count, vec![3, 4]);
        assert!(args.stride.is_empty());
        assert!(args.json_logs);
    }

    #[test]
    fn test_count_is_required() {
        assert!(Args::try_parse_from(["latlon-reader", "--grid", "grid.json"]).is_err());
    }

    #[test]
    fn test_build_hyperslab_defaults() {
        let slab = build_hyperslab(&[], &[3, 4], &[]).unwrap();
        assert_eq!(slab, Hyperslab::from_parts(&[0, 0], &[3, 4], &[1, 1]).unwrap());
    }

    #[test]
    fn test_build_hyperslab_mismatched_axes() {
        assert!(build_hyperslab(&[0], &[3, 4], &[]).is_err());
        assert!(build_hyperslab(&[], &[3, 4], &[1, 1, 1]).is_err());
    }

    #[test]
    fn test_field_values_decodes_raw() {
        let bytes: Vec<u8> = [1.5f64, -2.0]
            .iter()
            .flat_map(|v| v.to_ne_bytes())
            .collect();
        assert_eq!(field_values(FieldData::Raw(bytes)).unwrap(), vec![1.5, -2.0]);
        assert!(field_values(FieldData::Raw(vec![0; 5])).is_err());
    }

    #[test]
    fn test_load_config_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            format!(
                "normalize_longitude: false\ncache:\n  enabled: true\n  directory: {}\n",
                dir.path().display()
            ),
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(!config.normalize_longitude);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.directory, dir.path());
        assert_eq!(config.cache.file_prefix, "latlon_");
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "cache:\n  enabled: true\n  file_prefix: \"\"\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_load_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.json");
        fs::write(&path, "{\"name\": \"g\", \"xdim\": 4, \"ydim\": 2}").unwrap();
        assert_eq!(load_grid(&path).unwrap().grid_name(), "g");

        fs::write(&path, "not json").unwrap();
        assert!(load_grid(&path).is_err());
    }
}
