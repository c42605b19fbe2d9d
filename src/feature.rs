//! Line features: a sampled geodesic plus the start/end/distance attributes
//! the output layer carries, and the sink trait that receives them.

use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::SinkError;
use crate::geo::GeographicPoint;
use crate::geodesic::{sample, GeodesicPath, SamplerConfig, SamplingRequest};

/// Attribute table of a geodesic feature.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureAttributes {
    pub lat_1: f64,
    pub lng_1: f64,
    pub lat_2: f64,
    pub lng_2: f64,
    /// Geodesic length in metres.
    pub dist: f64,
}

/// A LineString feature in EPSG:4326.
#[derive(Clone, Debug, PartialEq)]
pub struct GeodesicFeature {
    pub path: GeodesicPath,
    pub attributes: FeatureAttributes,
}

impl GeodesicFeature {
    pub fn from_path(start: GeographicPoint, end: GeographicPoint, path: GeodesicPath) -> Self {
        let attributes = FeatureAttributes {
            lat_1: start.lat,
            lng_1: start.lon,
            lat_2: end.lat,
            lng_2: end.lon,
            dist: path.total_distance(),
        };
        Self { path, attributes }
    }

    /// GeoJSON `Feature` object, coordinates in `[lon, lat]` order.
    pub fn to_geojson(&self) -> Value {
        let coordinates: Vec<[f64; 2]> = self
            .path
            .points()
            .iter()
            .map(|p| [p.lon, p.lat])
            .collect();
        json!({
            "type": "Feature",
            "geometry": {
                "type": "LineString",
                "coordinates": coordinates,
            },
            "properties": self.attributes,
        })
    }
}

/// Destination for computed features.
pub trait FeatureSink {
    fn add_feature(&mut self, feature: GeodesicFeature) -> Result<(), SinkError>;
}

impl FeatureSink for Vec<GeodesicFeature> {
    fn add_feature(&mut self, feature: GeodesicFeature) -> Result<(), SinkError> {
        self.push(feature);
        Ok(())
    }
}

/// In-memory sink rendered as a GeoJSON `FeatureCollection`.
#[derive(Clone, Debug, Default)]
pub struct FeatureCollection {
    features: Vec<GeodesicFeature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn features(&self) -> &[GeodesicFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self.features.iter().map(GeodesicFeature::to_geojson).collect();
        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, SinkError> {
        Ok(serde_json::to_string(&self.to_geojson())?)
    }

    pub fn write_geojson<W: Write>(&self, writer: W) -> Result<(), SinkError> {
        serde_json::to_writer_pretty(writer, &self.to_geojson())?;
        Ok(())
    }
}

impl FeatureSink for FeatureCollection {
    fn add_feature(&mut self, feature: GeodesicFeature) -> Result<(), SinkError> {
        self.features.push(feature);
        Ok(())
    }
}

/// Sample one geodesic and hand the resulting feature to `sink`.
///
/// Returns the geodesic length in metres.
pub fn write_geodesic<S: FeatureSink + ?Sized>(
    sink: &mut S,
    request: &SamplingRequest,
    config: &SamplerConfig,
) -> Result<f64, SinkError> {
    let path = sample(request, config)?;
    let feature = GeodesicFeature::from_path(request.start, request.end, path);
    let dist = feature.attributes.dist;
    sink.add_feature(feature)?;
    Ok(dist)
}
