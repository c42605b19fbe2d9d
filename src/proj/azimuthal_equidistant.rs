//! Azimuthal Equidistant projection, spherical oblique aspect.
//!
//! forward: c = central angle origin→p, x = R·c·cosφ·sinΔλ / sin c,
//!          y = R·c·(cosφ₀·sinφ − sinφ₀·cosφ·cosΔλ) / sin c
//! inverse: c = ρ/R, φ = asin(cos c·sinφ₀ + y·sin c·cosφ₀/ρ),
//!          λ = λ₀ + atan2(x·sin c, ρ·cosφ₀·cos c − y·sinφ₀·sin c)
//!
//! Distances and azimuths measured from the origin are true, so the straight
//! line from (0, 0) to a projected point is the great circle to that point.

use std::f64::consts::PI;

use crate::error::ProjError;
use crate::geo::{normalize_lon, GeographicPoint, ProjectedPoint};
use crate::proj::ellipsoid::{Ellipsoid, MEAN_EARTH_RADIUS};
use crate::proj::Projection;

/// Central angles within this many radians of π are treated as the antipode.
pub const ANTIPODE_TOLERANCE: f64 = 1e-9;

pub struct AzimuthalEquidistant {
    sphere: Ellipsoid,
    origin: GeographicPoint,
    lon0: f64,
    // Precomputed
    sin_lat0: f64,
    cos_lat0: f64,
}

impl AzimuthalEquidistant {
    /// Projection centred on `origin`, on the WGS84 mean sphere.
    pub fn new(origin: GeographicPoint) -> Result<Self, ProjError> {
        Self::with_radius(origin, MEAN_EARTH_RADIUS)
    }

    /// Projection on the mean sphere of an arbitrary ellipsoid.
    pub fn on_sphere(origin: GeographicPoint, ellipsoid: &Ellipsoid) -> Result<Self, ProjError> {
        Self::with_radius(origin, ellipsoid.mean_radius())
    }

    pub fn with_radius(origin: GeographicPoint, radius: f64) -> Result<Self, ProjError> {
        origin.validate().map_err(ProjError::InvalidOrigin)?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ProjError::InvalidParameter(format!(
                "sphere radius must be finite and > 0, got {radius}"
            )));
        }

        let (lon0, lat0) = origin.to_radians();
        Ok(Self {
            sphere: Ellipsoid::sphere(radius),
            origin,
            lon0,
            sin_lat0: lat0.sin(),
            cos_lat0: lat0.cos(),
        })
    }

    pub fn origin(&self) -> GeographicPoint {
        self.origin
    }

    pub fn radius(&self) -> f64 {
        self.sphere.a
    }

    /// Great-circle distance from the origin to `p` in metres.
    pub fn distance_to(&self, p: GeographicPoint) -> Result<f64, ProjError> {
        Ok(self.forward(p)?.norm())
    }

    /// Initial azimuth from the origin to `p`, degrees clockwise from north in [0, 360).
    pub fn azimuth_to(&self, p: GeographicPoint) -> Result<f64, ProjError> {
        let q = self.forward(p)?;
        Ok(q.x.atan2(q.y).to_degrees().rem_euclid(360.0))
    }

    fn antipode_error(&self) -> ProjError {
        let a = self.origin.antipode();
        ProjError::SingularPoint {
            lon: a.lon,
            lat: a.lat,
        }
    }
}

impl Projection for AzimuthalEquidistant {
    fn forward(&self, p: GeographicPoint) -> Result<ProjectedPoint, ProjError> {
        p.validate().map_err(ProjError::OutOfDomain)?;

        let (lon, lat) = p.to_radians();
        let dlon = lon - self.lon0;
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_dlon, cos_dlon) = dlon.sin_cos();

        // Direction cosines of p in the origin's east/north frame
        let east = cos_lat * sin_dlon;
        let north = self.cos_lat0 * sin_lat - self.sin_lat0 * cos_lat * cos_dlon;
        let sin_c = east.hypot(north);
        let cos_c = self.sin_lat0 * sin_lat + self.cos_lat0 * cos_lat * cos_dlon;
        let c = sin_c.atan2(cos_c);

        if PI - c < ANTIPODE_TOLERANCE {
            return Err(ProjError::SingularPoint { lon: p.lon, lat: p.lat });
        }
        if sin_c == 0.0 {
            return Ok(ProjectedPoint::ORIGIN);
        }

        let k = self.sphere.a * c / sin_c;
        Ok(ProjectedPoint::new(k * east, k * north))
    }

    fn inverse(&self, q: ProjectedPoint) -> Result<GeographicPoint, ProjError> {
        if !q.x.is_finite() || !q.y.is_finite() {
            return Err(ProjError::OutOfDomain(format!(
                "non-finite planar coordinate ({}, {})",
                q.x, q.y
            )));
        }

        let rho = q.norm();
        if rho == 0.0 {
            return Ok(GeographicPoint::new(
                normalize_lon(self.origin.lon),
                self.origin.lat,
            ));
        }

        let c = rho / self.sphere.a;
        if (c - PI).abs() < ANTIPODE_TOLERANCE {
            return Err(self.antipode_error());
        }
        if c > PI {
            return Err(ProjError::OutOfDomain(format!(
                "radius {rho} m exceeds half circumference {} m",
                PI * self.sphere.a
            )));
        }

        let (sin_c, cos_c) = c.sin_cos();
        let lat = (cos_c * self.sin_lat0 + q.y * sin_c * self.cos_lat0 / rho)
            .clamp(-1.0, 1.0)
            .asin();
        let lon = self.lon0
            + (q.x * sin_c).atan2(rho * self.cos_lat0 * cos_c - q.y * self.sin_lat0 * sin_c);

        Ok(GeographicPoint::new(
            normalize_lon(lon.to_degrees()),
            lat.to_degrees(),
        ))
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.sphere
    }
}
