use pyo3::prelude::*;

mod sample;

/// Register all Python-visible functions and types.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(sample::sample_geodesic, m)?)?;
    m.add_function(wrap_pyfunction!(sample::sample_geodesic_batch, m)?)?;
    m.add_function(wrap_pyfunction!(sample::geodesic_geojson, m)?)?;
    Ok(())
}
