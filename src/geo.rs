//! Point types shared by the projection and the sampler.
//!
//! Geographic points are in degrees (EPSG:4326 axis order lon, lat).
//! Projected points are in metres relative to the origin of the projection
//! that produced them.

use serde::{Deserialize, Serialize};

/// A position on the Earth's surface in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeographicPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeographicPoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Check that both coordinates are finite and within
    /// lon ∈ [-180, 180], lat ∈ [-90, 90].
    pub fn validate(&self) -> Result<(), String> {
        if !self.lon.is_finite() || !self.lat.is_finite() {
            return Err(format!("non-finite coordinate ({}, {})", self.lon, self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(format!("longitude {} outside [-180, 180]", self.lon));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!("latitude {} outside [-90, 90]", self.lat));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// The diametrically opposite point.
    pub fn antipode(&self) -> Self {
        Self::new(normalize_lon(self.lon + 180.0), -self.lat)
    }

    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.lon.to_radians(), self.lat.to_radians())
    }
}

impl From<(f64, f64)> for GeographicPoint {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self::new(lon, lat)
    }
}

/// A planar position in metres (x east, y north).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

impl ProjectedPoint {
    pub const ORIGIN: ProjectedPoint = ProjectedPoint { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance from the projection origin.
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: &ProjectedPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// Wrap a longitude in degrees into [-180, 180).
pub fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}
