use thiserror::Error;

/// Fatal configuration problems, surfaced once at construction time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sensor array needs at least one sector")]
    NoSectors,

    #[error("sensor array needs at least one sensor per sector")]
    NoSensors,

    #[error("invalid sensor_range: {0} (must be finite and > 0)")]
    InvalidSensorRange(f64),

    #[error("invalid sensor_frequency: {0} (must be within [0, 1])")]
    InvalidSensorFrequency(f64),

    #[error("mass matrix is not invertible (determinant {0})")]
    SingularMassMatrix(f64),

    #[error("invalid value for {field}: {value}")]
    InvalidParameter { field: &'static str, value: f64 },
}

/// Reasons a polygon is rejected as an obstacle or hull boundary.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("polygon has fewer than 3 distinct vertices")]
    TooFewVertices,

    #[error("polygon has a non-finite vertex")]
    NonFiniteVertex,

    #[error("polygon encloses no area")]
    Degenerate,

    #[error("polygon edges intersect each other")]
    SelfIntersecting,
}
