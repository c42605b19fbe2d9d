pub mod azimuthal_equidistant;
pub mod ellipsoid;

use crate::error::ProjError;
use crate::geo::{GeographicPoint, ProjectedPoint};

/// Trait for map projections supporting forward and inverse transforms.
pub trait Projection: Send + Sync {
    /// Forward: geographic degrees -> (easting, northing) metres
    fn forward(&self, p: GeographicPoint) -> Result<ProjectedPoint, ProjError>;

    /// Inverse: (easting, northing) metres -> geographic degrees
    fn inverse(&self, q: ProjectedPoint) -> Result<GeographicPoint, ProjError>;

    /// Batch forward transform (default: loop).
    fn forward_batch(&self, points: &[GeographicPoint]) -> Result<Vec<ProjectedPoint>, ProjError> {
        points.iter().map(|&p| self.forward(p)).collect()
    }

    /// Batch inverse transform.
    fn inverse_batch(&self, points: &[ProjectedPoint]) -> Result<Vec<GeographicPoint>, ProjError> {
        points.iter().map(|&q| self.inverse(q)).collect()
    }

    fn ellipsoid(&self) -> &ellipsoid::Ellipsoid;
}
