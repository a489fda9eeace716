use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("calibration requires at least {required} points, got {actual}")]
    InsufficientPoints { required: usize, actual: usize },

    #[error("abscissas must be strictly increasing (violated at index {index})")]
    NonIncreasingAbscissas { index: usize },

    #[error("abscissa/ordinate length mismatch: {abscissas} vs {ordinates}")]
    LengthMismatch { abscissas: usize, ordinates: usize },

    #[error("singular tridiagonal system while solving for spline coefficients")]
    SingularSystem,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    JsonParse(#[from] serde_json::Error),
}
