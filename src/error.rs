use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: InputField, reason: String },

    #[error("Projection error: {0}")]
    Projection(#[from] ProjError),

    #[error("Path needs {requested} segments, limit is {limit}")]
    TooManySegments { requested: u64, limit: u64 },
}

impl SampleError {
    pub(crate) fn invalid(field: InputField, reason: impl Into<String>) -> Self {
        SampleError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjError {
    #[error("Invalid projection origin: {0}")]
    InvalidOrigin(String),

    #[error("Point ({lon}, {lat}) is antipodal to the projection origin")]
    SingularPoint { lon: f64, lat: f64 },

    #[error("Point outside projection domain: {0}")]
    OutOfDomain(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Sink rejected feature: {0}")]
    Rejected(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Sampling failed: {0}")]
    Sample(#[from] SampleError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which part of a sampling request failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Start,
    End,
    MaxSegmentLength,
    MinSegmentLength,
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputField::Start => "start",
            InputField::End => "end",
            InputField::MaxSegmentLength => "max_segment_length",
            InputField::MinSegmentLength => "min_segment_length",
        };
        f.write_str(name)
    }
}
