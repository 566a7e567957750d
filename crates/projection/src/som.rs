//! Space Oblique Mercator projection (spherical form) and the MISR block grid.
//!
//! SOM follows a sun-synchronous ground track: `x` runs along the track and
//! `y` across it. The along-track series coefficients are integrated
//! numerically once at construction time.
//!
//! MISR stacks 180 fixed blocks along the track. Each block is `ydim` lines
//! by `xdim` samples and may be shifted across the track relative to the
//! previous block by a fractional number of samples.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use crate::adjust_longitude;
use crate::dms::dms_to_radians;
use crate::error::{ProjectionError, Result};
use crate::grid::PixelRegistration;
use crate::spheroid::Spheroid;

/// Number of along-track blocks in a MISR SOM grid.
pub const SOM_BLOCK_COUNT: usize = 180;

/// Minutes in one Earth rotation (used for the satellite period ratio).
const EARTH_ROTATION_MINUTES: f64 = 1440.0;

const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-12;

/// Space Oblique Mercator parameters.
#[derive(Debug, Clone)]
pub struct SpaceObliqueMercator {
    /// Sphere radius (meters)
    pub radius: f64,
    /// Orbit inclination (radians)
    pub inclination: f64,
    /// Longitude of the ascending node (radians)
    pub lon_node: f64,
    /// Satellite period over Earth rotation period (P2/P1)
    pub period_ratio: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    sin_i: f64,
    cos_i: f64,
    b: f64,
    a2: f64,
    a4: f64,
    c1: f64,
    c3: f64,
}

impl SpaceObliqueMercator {
    /// Build from GCTP parameters.
    ///
    /// With `params[12] != 0` the orbit is given directly: `[3]` inclination
    /// and `[4]` ascending node longitude (packed DMS), `[8]` satellite period
    /// in minutes. Otherwise `[2]` is the Landsat satellite number and `[3]`
    /// the path, and the orbit is derived from the Landsat constants.
    pub fn from_params(params: &[f64; 13], spheroid: Spheroid) -> Result<Self> {
        let (inclination, lon_node, period_ratio) = if params[12] != 0.0 {
            (
                dms_to_radians(params[3]),
                dms_to_radians(params[4]),
                params[8] / EARTH_ROTATION_MINUTES,
            )
        } else {
            let satellite = params[2];
            let path = params[3];
            if path < 1.0 {
                return Err(ProjectionError::invalid_parameter("landsat path", path));
            }
            if satellite <= 3.0 {
                (
                    99.092f64.to_radians(),
                    (128.87 - 360.0 / 251.0 * path).to_radians(),
                    103.2669323 / EARTH_ROTATION_MINUTES,
                )
            } else {
                (
                    98.2f64.to_radians(),
                    (129.30 - 360.0 / 233.0 * path).to_radians(),
                    98.8841 / EARTH_ROTATION_MINUTES,
                )
            }
        };

        if !period_ratio.is_finite() || period_ratio <= 0.0 {
            return Err(ProjectionError::invalid_parameter(
                "satellite period",
                params[8],
            ));
        }

        let (sin_i, cos_i) = inclination.sin_cos();
        let h = 1.0 - period_ratio * cos_i;
        let s = |lp: f64| period_ratio * sin_i * lp.cos();
        let along = |lp: f64| {
            let s = s(lp);
            (h - s * s) / (1.0 + s * s).sqrt()
        };
        let across = |lp: f64| {
            let s = s(lp);
            (h + 1.0) * s / (1.0 + s * s).sqrt()
        };

        let b = 2.0 / PI * simpson(along, 0.0, FRAC_PI_2);
        let a2 = 4.0 / (2.0 * PI) * simpson(|lp| along(lp) * (2.0 * lp).cos(), 0.0, FRAC_PI_2);
        let a4 = 4.0 / (4.0 * PI) * simpson(|lp| along(lp) * (4.0 * lp).cos(), 0.0, FRAC_PI_2);
        let c1 = 4.0 / PI * simpson(|lp| across(lp) * lp.cos(), 0.0, FRAC_PI_2);
        let c3 = 4.0 / (3.0 * PI) * simpson(|lp| across(lp) * (3.0 * lp).cos(), 0.0, FRAC_PI_2);

        Ok(Self {
            radius: spheroid.radius(),
            inclination,
            lon_node,
            period_ratio,
            false_easting: params[6],
            false_northing: params[7],
            sin_i,
            cos_i,
            b,
            a2,
            a4,
            c1,
            c3,
        })
    }

    fn s(&self, lp: f64) -> f64 {
        self.period_ratio * self.sin_i * lp.cos()
    }

    /// Convert geographic degrees to projection meters.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if lat_deg.abs() > 90.0 {
            return None;
        }
        let lat = lat_deg.to_radians();
        let lam = adjust_longitude(lon_deg.to_radians() - self.lon_node);
        let (sin_lat, cos_lat) = lat.sin_cos();

        // Transformed longitude depends on itself through the Earth's rotation
        let mut lp = lam;
        let mut converged = false;
        for _ in 0..MAX_ITERATIONS {
            let lt = lam + self.period_ratio * lp;
            let mut next =
                (self.cos_i * cos_lat * lt.sin() + self.sin_i * sin_lat).atan2(cos_lat * lt.cos());
            next += TAU * ((lp - next) / TAU).round();
            let done = (next - lp).abs() < TOLERANCE;
            lp = next;
            if done {
                converged = true;
                break;
            }
        }
        if !converged {
            return None;
        }

        let lt = lam + self.period_ratio * lp;
        let lat_p = (self.cos_i * sin_lat - self.sin_i * cos_lat * lt.sin())
            .clamp(-1.0, 1.0)
            .asin();
        if FRAC_PI_2 - lat_p.abs() < 1e-10 {
            return None;
        }

        let q = (FRAC_PI_4 + lat_p / 2.0).tan().ln();
        let s = self.s(lp);
        let root = (1.0 + s * s).sqrt();

        let x = self.b * lp + self.a2 * (2.0 * lp).sin() + self.a4 * (4.0 * lp).sin() - s / root * q;
        let y = self.c1 * lp.sin() + self.c3 * (3.0 * lp).sin() + q / root;

        Some((
            self.false_easting + self.radius * x,
            self.false_northing + self.radius * y,
        ))
    }

    /// Convert projection meters to `(lon, lat)` degrees.
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let x = (x - self.false_easting) / self.radius;
        let y = (y - self.false_northing) / self.radius;
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        let q_of = |lp: f64| {
            let s = self.s(lp);
            (1.0 + s * s).sqrt() * (y - self.c1 * lp.sin() - self.c3 * (3.0 * lp).sin())
        };

        let mut lp = x / self.b;
        let mut converged = false;
        for _ in 0..MAX_ITERATIONS {
            let s = self.s(lp);
            let root = (1.0 + s * s).sqrt();
            let q = q_of(lp);
            let next = (x + s / root * q - self.a2 * (2.0 * lp).sin() - self.a4 * (4.0 * lp).sin())
                / self.b;
            let done = (next - lp).abs() < TOLERANCE;
            lp = next;
            if done {
                converged = true;
                break;
            }
        }
        let q = q_of(lp);
        if !converged || !q.is_finite() {
            return None;
        }

        let lat_p = 2.0 * q.exp().atan() - FRAC_PI_2;
        let (sin_lp, cos_lp) = lp.sin_cos();
        let (sin_latp, cos_latp) = lat_p.sin_cos();

        let lat = (self.cos_i * sin_latp + self.sin_i * cos_latp * sin_lp)
            .clamp(-1.0, 1.0)
            .asin();
        let lt = (self.cos_i * cos_latp * sin_lp - self.sin_i * sin_latp).atan2(cos_latp * cos_lp);
        let lon = adjust_longitude(lt - self.period_ratio * lp + self.lon_node);

        Some((lon.to_degrees(), lat.to_degrees()))
    }
}

/// Composite Simpson integration over `[a, b]`.
fn simpson(f: impl Fn(f64) -> f64, a: f64, b: f64) -> f64 {
    const INTERVALS: usize = 180;
    let h = (b - a) / INTERVALS as f64;
    let mut sum = f(a) + f(b);
    for k in 1..INTERVALS {
        let weight = if k % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(a + k as f64 * h);
    }
    sum * h / 3.0
}

/// Geometry of a MISR block grid: maps `(block, line, sample)` to SOM
/// projection coordinates.
///
/// The descriptor corners span block 0. Lines advance along the track
/// (projection `x`), samples across it (projection `y`).
#[derive(Debug, Clone)]
pub struct SomBlockGrid {
    /// Samples per line
    pub xdim: usize,
    /// Lines per block
    pub ydim: usize,
    pub upleft: [f64; 2],
    pub lowright: [f64; 2],
    pub registration: PixelRegistration,
    /// Cumulative cross-track offset of each block, in samples
    cumulative_offsets: Vec<f64>,
}

impl SomBlockGrid {
    /// Build a block grid.
    ///
    /// `relative_offsets` holds the shift of block `b + 1` relative to block
    /// `b`, so it is either empty or `SOM_BLOCK_COUNT - 1` long.
    pub fn new(
        xdim: usize,
        ydim: usize,
        upleft: [f64; 2],
        lowright: [f64; 2],
        registration: PixelRegistration,
        relative_offsets: &[f64],
    ) -> Result<Self> {
        if xdim == 0 || ydim == 0 {
            return Err(ProjectionError::invalid_geometry(format!(
                "SOM block of {}x{} samples",
                xdim, ydim
            )));
        }
        if !relative_offsets.is_empty() && relative_offsets.len() != SOM_BLOCK_COUNT - 1 {
            return Err(ProjectionError::invalid_geometry(format!(
                "expected {} SOM block offsets, got {}",
                SOM_BLOCK_COUNT - 1,
                relative_offsets.len()
            )));
        }

        let mut cumulative_offsets = Vec::with_capacity(SOM_BLOCK_COUNT);
        let mut running = 0.0;
        cumulative_offsets.push(running);
        for b in 1..SOM_BLOCK_COUNT {
            running += relative_offsets.get(b - 1).copied().unwrap_or(0.0);
            cumulative_offsets.push(running);
        }

        Ok(Self {
            xdim,
            ydim,
            upleft,
            lowright,
            registration,
            cumulative_offsets,
        })
    }

    /// Stage one of the SOM inverse: block indices to projection meters.
    pub fn block_to_projected(&self, block: usize, line: usize, sample: usize) -> (f64, f64) {
        let adj = self.registration.offset();
        let along_step = (self.lowright[0] - self.upleft[0]) / self.ydim as f64;
        let across_step = (self.lowright[1] - self.upleft[1]) / self.xdim as f64;

        let along = (block * self.ydim + line) as f64 + adj;
        let across = sample as f64 + self.cumulative_offsets[block] + adj;

        (
            self.upleft[0] + along * along_step,
            self.upleft[1] + across * across_step,
        )
    }
}
