/// Reference ellipsoid parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis (metres)
    pub a: f64,
    /// Flattening (dimensionless)
    pub f: f64,
    /// Semi-minor axis: a * (1 - f)
    pub b: f64,
}

impl Ellipsoid {
    pub const fn new(a: f64, f: f64) -> Self {
        Self {
            a,
            f,
            b: a * (1.0 - f),
        }
    }

    /// A sphere of the given radius.
    pub const fn sphere(radius: f64) -> Self {
        Self::new(radius, 0.0)
    }

    /// IUGG mean radius R1 = (2a + b) / 3.
    pub const fn mean_radius(&self) -> f64 {
        (2.0 * self.a + self.b) / 3.0
    }
}

pub const WGS84: Ellipsoid = Ellipsoid::new(6_378_137.0, 1.0 / 298.257_223_563);
pub const GRS80: Ellipsoid = Ellipsoid::new(6_378_137.0, 1.0 / 298.257_222_101);

/// Mean radius of the WGS84 ellipsoid, the default sphere for geodesic sampling.
pub const MEAN_EARTH_RADIUS: f64 = WGS84.mean_radius();
