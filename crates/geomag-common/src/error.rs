//! Error types shared by the geomagnetic mapping crates.

use thiserror::Error;

/// Result type alias using GeomagError.
pub type GeomagResult<T> = Result<T, GeomagError>;

/// Primary error type for grid construction, model evaluation and rendering.
///
/// None of these are recovered from inside the library; they are returned
/// unchanged to the caller.
#[derive(Debug, Error)]
pub enum GeomagError {
    // === Argument Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    // === Model Errors ===
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Model evaluation failed: {0}")]
    Evaluation(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    Io(String),
}

impl GeomagError {
    /// Shorthand for an [`GeomagError::InvalidParameter`].
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        GeomagError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable category name, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            GeomagError::InvalidParameter { .. } => "invalid_parameter",
            GeomagError::InvalidTime(_) => "invalid_time",
            GeomagError::ModelLoad(_) => "model_load",
            GeomagError::Evaluation(_) => "evaluation",
            GeomagError::Render(_) => "render",
            GeomagError::Io(_) => "io",
        }
    }
}

impl From<std::io::Error> for GeomagError {
    fn from(err: std::io::Error) -> Self {
        GeomagError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GeomagError {
    fn from(err: serde_json::Error) -> Self {
        GeomagError::InvalidParameter {
            param: "config".to_string(),
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<ndarray::ShapeError> for GeomagError {
    fn from(err: ndarray::ShapeError) -> Self {
        GeomagError::Render(format!("array shape error: {}", err))
    }
}
