//! Geodesic polylines between two points, discretised at a bounded segment
//! length by sampling a start-centred azimuthal equidistant projection.

pub mod error;
pub mod feature;
pub mod geo;
pub mod geodesic;
pub mod proj;
#[cfg(feature = "python")]
mod py;

pub use error::{InputField, ProjError, SampleError};
pub use geo::{GeographicPoint, ProjectedPoint};
pub use geodesic::{
    sample, sample_batch, sample_geodesic, GeodesicPath, SamplerConfig, SamplingRequest,
};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pymodule]
fn _rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    py::register(m)?;
    Ok(())
}
