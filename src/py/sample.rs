//! PyO3 bindings for geodesic sampling.

use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::feature::{write_geodesic, FeatureCollection};
use crate::geo::GeographicPoint;
use crate::geodesic::{sample, sample_batch, GeodesicPath, SamplerConfig, SamplingRequest};

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn path_arrays<'py>(
    py: Python<'py>,
    path: GeodesicPath,
) -> (Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>, f64) {
    let total_distance = path.total_distance();
    let (lons, lats): (Vec<f64>, Vec<f64>) = path
        .into_points()
        .into_iter()
        .map(|p| (p.lon, p.lat))
        .unzip();
    (
        PyArray1::from_owned_array(py, ndarray::Array1::from(lons)),
        PyArray1::from_owned_array(py, ndarray::Array1::from(lats)),
        total_distance,
    )
}

/// Sample the geodesic between two points.
///
/// Args:
///     start_lon, start_lat: Start point in degrees (EPSG:4326).
///     end_lon, end_lat: End point in degrees.
///     max_segment_length: Maximum distance between vertices in metres.
///     min_segment_length: Floor applied to max_segment_length in metres.
///
/// Returns:
///     Tuple of (lon array, lat array, total distance in metres).
#[pyfunction]
#[pyo3(signature = (start_lon, start_lat, end_lon, end_lat, max_segment_length=100_000.0, min_segment_length=10_000.0))]
#[allow(clippy::type_complexity)]
pub fn sample_geodesic<'py>(
    py: Python<'py>,
    start_lon: f64,
    start_lat: f64,
    end_lon: f64,
    end_lat: f64,
    max_segment_length: f64,
    min_segment_length: f64,
) -> PyResult<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>, f64)> {
    let config = SamplerConfig::new(max_segment_length).with_min_segment_length(min_segment_length);
    let request = SamplingRequest::new(
        GeographicPoint::new(start_lon, start_lat),
        GeographicPoint::new(end_lon, end_lat),
        max_segment_length,
    );

    let path = py
        .allow_threads(move || sample(&request, &config))
        .map_err(value_error)?;
    Ok(path_arrays(py, path))
}

/// Sample many geodesics in parallel.
///
/// Args:
///     start_lon, start_lat, end_lon, end_lat: 1D arrays of equal length, degrees.
///     max_segment_length: Maximum distance between vertices in metres.
///     min_segment_length: Floor applied to max_segment_length in metres.
///
/// Returns:
///     List of (lon array, lat array, total distance) tuples, one per input pair.
#[pyfunction]
#[pyo3(signature = (start_lon, start_lat, end_lon, end_lat, max_segment_length=100_000.0, min_segment_length=10_000.0))]
#[allow(clippy::type_complexity, clippy::too_many_arguments)]
pub fn sample_geodesic_batch<'py>(
    py: Python<'py>,
    start_lon: PyReadonlyArray1<'py, f64>,
    start_lat: PyReadonlyArray1<'py, f64>,
    end_lon: PyReadonlyArray1<'py, f64>,
    end_lat: PyReadonlyArray1<'py, f64>,
    max_segment_length: f64,
    min_segment_length: f64,
) -> PyResult<Vec<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>, f64)>> {
    let start_lon = start_lon.as_array();
    let start_lat = start_lat.as_array();
    let end_lon = end_lon.as_array();
    let end_lat = end_lat.as_array();

    let n = start_lon.len();
    if start_lat.len() != n || end_lon.len() != n || end_lat.len() != n {
        return Err(PyValueError::new_err(format!(
            "coordinate arrays must have same length, got {}, {}, {}, {}",
            n,
            start_lat.len(),
            end_lon.len(),
            end_lat.len()
        )));
    }

    let requests: Vec<SamplingRequest> = (0..n)
        .map(|i| {
            SamplingRequest::new(
                GeographicPoint::new(start_lon[i], start_lat[i]),
                GeographicPoint::new(end_lon[i], end_lat[i]),
                max_segment_length,
            )
        })
        .collect();
    let config = SamplerConfig::new(max_segment_length).with_min_segment_length(min_segment_length);

    let results = py.allow_threads(move || sample_batch(&requests, &config));

    results
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            r.map(|path| path_arrays(py, path))
                .map_err(|e| PyValueError::new_err(format!("pair {i}: {e}")))
        })
        .collect()
}

/// Sample the geodesic between two points and return it as a GeoJSON
/// FeatureCollection string with attributes lat_1, lng_1, lat_2, lng_2, dist.
#[pyfunction]
#[pyo3(signature = (start_lon, start_lat, end_lon, end_lat, max_segment_length=100_000.0, min_segment_length=10_000.0))]
pub fn geodesic_geojson(
    py: Python<'_>,
    start_lon: f64,
    start_lat: f64,
    end_lon: f64,
    end_lat: f64,
    max_segment_length: f64,
    min_segment_length: f64,
) -> PyResult<String> {
    let config = SamplerConfig::new(max_segment_length).with_min_segment_length(min_segment_length);
    let request = SamplingRequest::new(
        GeographicPoint::new(start_lon, start_lat),
        GeographicPoint::new(end_lon, end_lat),
        max_segment_length,
    );

    py.allow_threads(move || {
        let mut sink = FeatureCollection::new();
        write_geodesic(&mut sink, &request, &config)?;
        sink.to_geojson_string()
    })
    .map_err(value_error)
}
