//! Reference spheroids addressed by GCTP sphere code.

/// Semi-major/semi-minor axes in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spheroid {
    pub semi_major: f64,
    pub semi_minor: f64,
}

/// GCTP spheroid table, indexed by sphere code 0..=19.
const SPHEROIDS: [(f64, f64); 20] = [
    (6378206.4, 6356583.8),          // 0  Clarke 1866
    (6378249.145, 6356514.86955),    // 1  Clarke 1880
    (6377397.155, 6356078.96284),    // 2  Bessel
    (6378157.5, 6356772.2),          // 3  International 1967
    (6378388.0, 6356911.94613),      // 4  International 1909
    (6378135.0, 6356750.519915),     // 5  WGS 72
    (6377276.3452, 6356075.4133),    // 6  Everest
    (6378145.0, 6356759.769356),     // 7  WGS 66
    (6378137.0, 6356752.31414),      // 8  GRS 1980
    (6377563.396, 6356256.91),       // 9  Airy
    (6377304.063, 6356103.039),      // 10 Modified Everest
    (6377340.189, 6356034.448),      // 11 Modified Airy
    (6378137.0, 6356752.314245),     // 12 WGS 84
    (6378155.0, 6356773.3205),       // 13 Southeast Asia
    (6378160.0, 6356774.719),        // 14 Australian National
    (6378245.0, 6356863.0188),       // 15 Krassovsky
    (6378270.0, 6356794.343479),     // 16 Hough
    (6378166.0, 6356784.283666),     // 17 Mercury 1960
    (6378150.0, 6356768.337303),     // 18 Modified Mercury 1968
    (6370997.0, 6370997.0),          // 19 Sphere of radius 6370997 m
];

impl Spheroid {
    /// A sphere of the given radius.
    pub fn sphere(radius: f64) -> Self {
        Self {
            semi_major: radius,
            semi_minor: radius,
        }
    }

    /// Resolve the spheroid for a grid.
    ///
    /// A positive `params[0]` overrides the table: `params[1]` is then either
    /// the semi-minor axis (> 1), the eccentricity squared (0 < e² <= 1), or
    /// zero for a sphere. Otherwise the sphere code indexes the GCTP table,
    /// falling back to Clarke 1866 for unknown codes.
    pub fn resolve(sphere_code: i32, params: &[f64; 13]) -> Self {
        let major = params[0];
        let minor = params[1];

        if major > 0.0 {
            let semi_minor = if minor > 1.0 {
                minor
            } else if minor > 0.0 {
                major * (1.0 - minor).sqrt()
            } else {
                major
            };
            return Self {
                semi_major: major,
                semi_minor,
            };
        }

        let (semi_major, semi_minor) = usize::try_from(sphere_code)
            .ok()
            .and_then(|idx| SPHEROIDS.get(idx).copied())
            .unwrap_or(SPHEROIDS[0]);

        Self {
            semi_major,
            semi_minor,
        }
    }

    /// Radius used by the spherical projection formulas.
    ///
    /// Sinusoidal, CEA, Lambert azimuthal and SOM are evaluated on a sphere
    /// of this radius. Polar stereographic uses the full ellipsoid.
    pub fn radius(&self) -> f64 {
        self.semi_major
    }

    /// First eccentricity, zero for a sphere.
    pub fn eccentricity(&self) -> f64 {
        let ratio = self.semi_minor / self.semi_major;
        (1.0 - ratio * ratio).max(0.0).sqrt()
    }

    /// Whether both axes are equal.
    pub fn is_sphere(&self) -> bool {
        (self.semi_major - self.semi_minor).abs() < 1e-6
    }
}
