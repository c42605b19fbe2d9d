//! Geodesic sampler: turns a start/end pair into a polyline whose vertices lie
//! on the geodesic, spaced at a bounded distance.
//!
//! The end point is projected into an azimuthal equidistant projection centred
//! on the start point. There the geodesic is the straight line from (0, 0) to
//! the projected end, so break points are taken at multiples of the segment
//! length along that line and inverse-projected back to geographic coordinates.

use log::{debug, warn};
use rayon::prelude::*;

use crate::error::{InputField, ProjError, SampleError};
use crate::geo::GeographicPoint;
use crate::geodesic::config::SamplerConfig;
use crate::proj::azimuthal_equidistant::AzimuthalEquidistant;
use crate::proj::Projection;

/// Remaining distances below this fraction of a segment count as reaching the end.
const END_TOLERANCE: f64 = 1e-9;

/// One sampling job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingRequest {
    pub start: GeographicPoint,
    pub end: GeographicPoint,
    /// Requested maximum segment length in metres (> 0).
    pub max_segment_length: f64,
}

impl SamplingRequest {
    pub fn new(start: GeographicPoint, end: GeographicPoint, max_segment_length: f64) -> Self {
        Self {
            start,
            end,
            max_segment_length,
        }
    }

    /// Request that takes its segment length from `config`.
    pub fn from_config(
        start: GeographicPoint,
        end: GeographicPoint,
        config: &SamplerConfig,
    ) -> Self {
        Self::new(start, end, config.max_segment_length)
    }

    fn validate(&self, config: &SamplerConfig) -> Result<(), SampleError> {
        self.start
            .validate()
            .map_err(|reason| SampleError::invalid(InputField::Start, reason))?;
        self.end
            .validate()
            .map_err(|reason| SampleError::invalid(InputField::End, reason))?;
        if !self.max_segment_length.is_finite() || self.max_segment_length <= 0.0 {
            return Err(SampleError::invalid(
                InputField::MaxSegmentLength,
                format!("must be finite and > 0, got {}", self.max_segment_length),
            ));
        }
        if !config.min_segment_length.is_finite() || config.min_segment_length < 0.0 {
            return Err(SampleError::invalid(
                InputField::MinSegmentLength,
                format!("must be finite and >= 0, got {}", config.min_segment_length),
            ));
        }
        Ok(())
    }
}

/// Polyline approximating the geodesic from `start` to `end`.
///
/// Always holds at least two points; the first is the requested start and
/// the last the requested end, bit for bit.
#[derive(Clone, Debug, PartialEq)]
pub struct GeodesicPath {
    points: Vec<GeographicPoint>,
    total_distance: f64,
    segment_length: f64,
}

impl GeodesicPath {
    pub fn points(&self) -> &[GeographicPoint] {
        &self.points
    }

    /// Geodesic length from start to end in metres.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Segment length actually used, after the minimum floor.
    pub fn segment_length(&self) -> f64 {
        self.segment_length
    }

    pub fn start(&self) -> GeographicPoint {
        self.points[0]
    }

    pub fn end(&self) -> GeographicPoint {
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Consecutive vertex pairs.
    pub fn segments(&self) -> impl Iterator<Item = (GeographicPoint, GeographicPoint)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn into_points(self) -> Vec<GeographicPoint> {
        self.points
    }
}

/// Sample the geodesic on the sphere configured in `config`.
pub fn sample(
    request: &SamplingRequest,
    config: &SamplerConfig,
) -> Result<GeodesicPath, SampleError> {
    sample_with(request, config, |origin| {
        AzimuthalEquidistant::with_radius(origin, config.radius)
    })
}

/// Sample the geodesic through a projection built by `build` around the start point.
///
/// `build` must return a projection in which distance and direction from its
/// origin are true; the sampler relies on nothing else.
pub fn sample_with<P, F>(
    request: &SamplingRequest,
    config: &SamplerConfig,
    build: F,
) -> Result<GeodesicPath, SampleError>
where
    P: Projection,
    F: FnOnce(GeographicPoint) -> Result<P, ProjError>,
{
    request.validate(config)?;
    debug!(
        "sampling geodesic ({}, {}) -> ({}, {})",
        request.start.lon, request.start.lat, request.end.lon, request.end.lat
    );

    let projection = build(request.start)?;
    let p2 = projection.forward(request.end)?;
    let total_distance = p2.norm();

    let segment_length = request.max_segment_length.max(config.min_segment_length);
    if request.max_segment_length < config.min_segment_length {
        warn!(
            "segment length {} m below minimum, using {} m",
            request.max_segment_length, segment_length
        );
    }

    let num_segments = (total_distance / segment_length).floor() + 1.0;
    if num_segments > config.max_segments as f64 {
        return Err(SampleError::TooManySegments {
            requested: num_segments as u64,
            limit: config.max_segments,
        });
    }
    let num_segments = num_segments as u64;
    debug!(
        "distance {} m, segment length {} m, {} segments",
        total_distance, segment_length, num_segments
    );

    let mut points = Vec::with_capacity(num_segments as usize + 1);
    points.push(request.start);
    for i in 1..num_segments {
        let along = i as f64 * segment_length;
        // Exact multiples would put the last break point on the end itself
        if total_distance - along <= segment_length * END_TOLERANCE {
            break;
        }
        let q = p2.scale(along / total_distance);
        points.push(projection.inverse(q)?);
    }
    points.push(request.end);

    Ok(GeodesicPath {
        points,
        total_distance,
        segment_length,
    })
}

/// Sample many independent requests in parallel. Results keep input order.
pub fn sample_batch(
    requests: &[SamplingRequest],
    config: &SamplerConfig,
) -> Vec<Result<GeodesicPath, SampleError>> {
    requests.par_iter().map(|r| sample(r, config)).collect()
}

/// One-shot entry point with explicit segment bounds, on the default sphere.
pub fn sample_geodesic(
    start: GeographicPoint,
    end: GeographicPoint,
    max_segment_length: f64,
    min_segment_length: f64,
) -> Result<GeodesicPath, SampleError> {
    let config = SamplerConfig::new(max_segment_length).with_min_segment_length(min_segment_length);
    sample(&SamplingRequest::new(start, end, max_segment_length), &config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::ProjectedPoint;
    use crate::proj::ellipsoid::{Ellipsoid, MEAN_EARTH_RADIUS, WGS84};
    use approx::assert_relative_eq;
    use std::sync::Mutex;

    fn pt(lon: f64, lat: f64) -> GeographicPoint {
        GeographicPoint::new(lon, lat)
    }

    /// Flat plate carrée around the origin, `scale` metres per degree.
    struct FlatProjection {
        origin: GeographicPoint,
        scale: f64,
        ellipsoid: Ellipsoid,
    }

    impl FlatProjection {
        fn new(origin: GeographicPoint, scale: f64) -> Self {
            Self {
                origin,
                scale,
                ellipsoid: WGS84,
            }
        }
    }

    impl Projection for FlatProjection {
        fn forward(&self, p: GeographicPoint) -> Result<ProjectedPoint, ProjError> {
            Ok(ProjectedPoint::new(
                (p.lon - self.origin.lon) * self.scale,
                (p.lat - self.origin.lat) * self.scale,
            ))
        }

        fn inverse(&self, q: ProjectedPoint) -> Result<GeographicPoint, ProjError> {
            Ok(pt(
                self.origin.lon + q.x / self.scale,
                self.origin.lat + q.y / self.scale,
            ))
        }

        fn ellipsoid(&self) -> &Ellipsoid {
            &self.ellipsoid
        }
    }

    #[test]
    fn test_one_degree_north_50km() {
        let path = sample_geodesic(pt(0.0, 0.0), pt(0.0, 1.0), 50_000.0, 10_000.0).unwrap();
        assert!((path.total_distance() - 111_195.0).abs() < 50.0);
        assert_eq!(path.len(), 4);
        assert_eq!(path.start(), pt(0.0, 0.0));
        assert_eq!(path.end(), pt(0.0, 1.0));
        for p in &path.points()[1..3] {
            assert!(p.lat > 0.0 && p.lat < 1.0, "lat = {}", p.lat);
            assert_relative_eq!(p.lon, 0.0, epsilon = 1e-9);
        }
        // First break point sits exactly one segment north of the start
        let expected = (50_000.0 / MEAN_EARTH_RADIUS).to_degrees();
        assert_relative_eq!(path.points()[1].lat, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_same_point() {
        let path = sample_geodesic(pt(0.0, 0.0), pt(0.0, 0.0), 50_000.0, 10_000.0).unwrap();
        assert_eq!(path.total_distance(), 0.0);
        assert_eq!(path.points(), &[pt(0.0, 0.0), pt(0.0, 0.0)]);
        assert_eq!(path.segments().count(), 1);
    }

    #[test]
    fn test_short_path_has_no_break_points() {
        let path = sample_geodesic(pt(2.35, 48.86), pt(2.36, 48.87), 100_000.0, 10_000.0).unwrap();
        assert_eq!(path.len(), 2);
        assert!(path.total_distance() > 0.0 && path.total_distance() < 2_000.0);
    }

    #[test]
    fn test_invalid_latitude() {
        let err = sample_geodesic(pt(0.0, 0.0), pt(0.0, 91.0), 50_000.0, 10_000.0).unwrap_err();
        assert!(
            matches!(
                err,
                SampleError::InvalidInput {
                    field: InputField::End,
                    ..
                }
            ),
            "{err:?}"
        );

        let err = sample_geodesic(pt(0.0, -91.0), pt(0.0, 0.0), 50_000.0, 10_000.0).unwrap_err();
        assert!(matches!(
            err,
            SampleError::InvalidInput {
                field: InputField::Start,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_segment_lengths() {
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = sample_geodesic(pt(0.0, 0.0), pt(1.0, 1.0), bad, 10_000.0).unwrap_err();
            assert!(matches!(
                err,
                SampleError::InvalidInput {
                    field: InputField::MaxSegmentLength,
                    ..
                }
            ));
        }
        let err = sample_geodesic(pt(0.0, 0.0), pt(1.0, 1.0), 1_000.0, -1.0).unwrap_err();
        assert!(matches!(
            err,
            SampleError::InvalidInput {
                field: InputField::MinSegmentLength,
                ..
            }
        ));
    }

    #[test]
    fn test_antipodal_rejected() {
        let start = pt(10.0, 20.0);
        let err = sample_geodesic(start, start.antipode(), 100_000.0, 10_000.0).unwrap_err();
        assert!(
            matches!(err, SampleError::Projection(ProjError::SingularPoint { .. })),
            "{err:?}"
        );
    }

    #[test]
    fn test_distance_symmetry() {
        let a = pt(139.767, 35.681);
        let b = pt(-122.42, 37.77);
        let ab = sample_geodesic(a, b, 100_000.0, 10_000.0).unwrap();
        let ba = sample_geodesic(b, a, 100_000.0, 10_000.0).unwrap();
        assert_relative_eq!(ab.total_distance(), ba.total_distance(), epsilon = 1e-4);
        assert_eq!(ab.len(), ba.len());
    }

    #[test]
    fn test_segment_bound() {
        let start = pt(-0.1276, 51.5072);
        let end = pt(-74.006, 40.7128);
        let path = sample_geodesic(start, end, 250_000.0, 10_000.0).unwrap();
        let proj = AzimuthalEquidistant::new(start).unwrap();
        let projected = proj.forward_batch(path.points()).unwrap();
        for pair in projected.windows(2) {
            assert!(pair[0].distance(&pair[1]) <= 250_000.0 + 1e-3);
        }
        // Break points are exactly one segment apart along the line
        for (i, q) in projected.iter().enumerate().take(path.len() - 1) {
            assert_relative_eq!(q.norm(), i as f64 * 250_000.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_segment_floor() {
        let path = sample_geodesic(pt(0.0, 0.0), pt(0.0, 1.0), 1_000.0, 10_000.0).unwrap();
        assert_relative_eq!(path.segment_length(), 10_000.0);
        // floor(111195 / 10000) + 1 = 12 segments
        assert_eq!(path.len(), 13);

        let path = sample_geodesic(pt(0.0, 0.0), pt(0.0, 1.0), 1_000.0, 0.0).unwrap();
        assert_relative_eq!(path.segment_length(), 1_000.0);
        assert_eq!(path.len(), 113);
    }

    struct CapturingLogger {
        records: Mutex<Vec<String>>,
    }

    impl log::Log for CapturingLogger {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.records.lock().unwrap().push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CapturingLogger = CapturingLogger {
        records: Mutex::new(Vec::new()),
    };

    #[test]
    fn test_segment_floor_is_reported() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Warn);

        let config = SamplerConfig::new(1_234.5);
        assert!(config.is_clamped());
        let request = SamplingRequest::from_config(pt(0.0, 0.0), pt(0.0, 1.0), &config);
        let path = sample(&request, &config).unwrap();
        assert_relative_eq!(path.segment_length(), config.effective_segment_length());
        assert_relative_eq!(path.segment_length(), 10_000.0);

        let config = SamplerConfig::new(98_765.5);
        assert!(!config.is_clamped());
        let request = SamplingRequest::from_config(pt(0.0, 0.0), pt(0.0, 1.0), &config);
        let path = sample(&request, &config).unwrap();
        assert_relative_eq!(path.segment_length(), 98_765.5);

        let records = LOGGER.records.lock().unwrap();
        assert!(records.iter().any(|r| r.contains("1234.5") && r.contains("10000")));
        assert!(!records.iter().any(|r| r.contains("98765.5")));
    }

    #[test]
    fn test_exact_multiple_on_sphere_has_no_duplicate_end() {
        for k in 0..199 {
            let seg = 10_000.0 + 137.0 * k as f64;
            let end = pt(0.0, (3.0 * seg / MEAN_EARTH_RADIUS).to_degrees());
            let path = sample_geodesic(pt(0.0, 0.0), end, seg, 10_000.0).unwrap();
            assert_eq!(path.len(), 4, "seg {seg}: {:?}", path.points());
            let last = &path.points()[path.len() - 2..];
            assert!(last[1].lat - last[0].lat > 1e-3, "seg {seg}: {last:?}");
        }
    }

    #[test]
    fn test_stepping_rule_with_flat_projection() {
        let config = SamplerConfig::new(1_000.0).with_min_segment_length(0.0);
        let request = SamplingRequest::new(pt(0.0, 0.0), pt(3.5, 0.0), 1_000.0);
        let path = sample_with(&request, &config, |o| Ok(FlatProjection::new(o, 1_000.0))).unwrap();
        let expected = [0.0, 1.0, 2.0, 3.0, 3.5];
        assert_eq!(path.len(), expected.len());
        for (p, lon) in path.points().iter().zip(expected) {
            assert_relative_eq!(p.lon, lon, epsilon = 1e-12);
        }
        assert_relative_eq!(path.total_distance(), 3_500.0);
    }

    #[test]
    fn test_exact_multiple_has_no_duplicate_end() {
        let config = SamplerConfig::new(1_000.0).with_min_segment_length(0.0);
        let request = SamplingRequest::new(pt(0.0, 0.0), pt(0.0, 3.0), 1_000.0);
        let path = sample_with(&request, &config, |o| Ok(FlatProjection::new(o, 1_000.0))).unwrap();
        let expected = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(path.len(), expected.len());
        for (p, lat) in path.points().iter().zip(expected) {
            assert_relative_eq!(p.lat, lat, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_projection_factory_error_propagates() {
        let config = SamplerConfig::default();
        let request = SamplingRequest::from_config(pt(0.0, 0.0), pt(1.0, 1.0), &config);
        let err = sample_with(&request, &config, |_| -> Result<FlatProjection, ProjError> {
            Err(ProjError::InvalidOrigin("rejected".into()))
        })
        .unwrap_err();
        assert!(matches!(err, SampleError::Projection(ProjError::InvalidOrigin(_))));
    }

    #[test]
    fn test_too_many_segments() {
        let config = SamplerConfig {
            max_segments: 10,
            min_segment_length: 0.0,
            ..SamplerConfig::default()
        };
        let request = SamplingRequest::new(pt(0.0, 0.0), pt(0.0, 1.0), 1_000.0);
        let err = sample(&request, &config).unwrap_err();
        assert!(matches!(
            err,
            SampleError::TooManySegments {
                requested: 112,
                limit: 10
            }
        ));
    }

    #[test]
    fn test_custom_radius() {
        let config = SamplerConfig::new(1_000_000.0).with_radius(1_000.0);
        let request = SamplingRequest::new(pt(0.0, 0.0), pt(90.0, 0.0), 1_000_000.0);
        let path = sample(&request, &config).unwrap();
        assert_relative_eq!(
            path.total_distance(),
            1_000.0 * std::f64::consts::FRAC_PI_2,
            epsilon = 1e-9
        );
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_batch_keeps_order() {
        let config = SamplerConfig::new(50_000.0);
        let requests = vec![
            SamplingRequest::new(pt(0.0, 0.0), pt(0.0, 1.0), 50_000.0),
            SamplingRequest::new(pt(0.0, 0.0), pt(0.0, 95.0), 50_000.0),
            SamplingRequest::new(pt(0.0, 0.0), pt(0.0, 0.0), 50_000.0),
        ];
        let results = sample_batch(&requests, &config);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().len(), 4);
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().total_distance(), 0.0);
    }
}
