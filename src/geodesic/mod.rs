pub mod config;
pub mod sampler;

pub use config::SamplerConfig;
pub use sampler::{
    sample, sample_batch, sample_geodesic, sample_with, GeodesicPath, SamplingRequest,
};
