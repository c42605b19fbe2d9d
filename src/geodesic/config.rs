use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::proj::ellipsoid::MEAN_EARTH_RADIUS;

/// Sampler configuration.
///
/// ```json
/// { "max_segment_length": 50000.0, "min_segment_length": 10000.0 }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Requested maximum distance between consecutive vertices (metres).
    pub max_segment_length: f64,
    /// Lower bound applied to `max_segment_length` (metres).
    pub min_segment_length: f64,
    /// Radius of the reference sphere (metres).
    pub radius: f64,
    /// Upper bound on segments per path.
    pub max_segments: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_segment_length: 100_000.0,
            min_segment_length: 10_000.0,
            radius: MEAN_EARTH_RADIUS,
            max_segments: 1_000_000,
        }
    }
}

impl SamplerConfig {
    pub fn new(max_segment_length: f64) -> Self {
        Self {
            max_segment_length,
            ..Self::default()
        }
    }

    pub fn with_min_segment_length(mut self, min_segment_length: f64) -> Self {
        self.min_segment_length = min_segment_length;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// The segment length actually used: `max(min_segment_length, max_segment_length)`.
    pub fn effective_segment_length(&self) -> f64 {
        self.max_segment_length.max(self.min_segment_length)
    }

    pub fn is_clamped(&self) -> bool {
        self.max_segment_length < self.min_segment_length
    }

    pub fn from_json_str(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::from_json_str(&contents)?)
    }
}
