//! Model references and loading.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use geomag_common::{GeomagError, GeomagResult};

use crate::coefficients::TimeDependentCoefficients;
use crate::model::SphericalHarmonicModel;
use crate::shc::parse_shc;

const IGRF13_DEGREE3: &str = include_str!("../data/igrf13_degree3.shc");

/// Models compiled into the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinModel {
    /// IGRF-13 truncated to degree 3, epochs 2020.0 and 2025.0.
    #[default]
    Igrf13Degree3,
}

impl BuiltinModel {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinModel::Igrf13Degree3 => "IGRF-13 (degree 3)",
        }
    }

    fn contents(&self) -> &'static str {
        match self {
            BuiltinModel::Igrf13Degree3 => IGRF13_DEGREE3,
        }
    }
}

/// Where a model's coefficients come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelReference {
    /// SHC file on disk.
    Path(PathBuf),
    /// SHC text held in memory.
    Text { name: String, contents: String },
    Builtin(BuiltinModel),
}

impl Default for ModelReference {
    fn default() -> Self {
        ModelReference::Builtin(BuiltinModel::default())
    }
}

impl From<PathBuf> for ModelReference {
    fn from(path: PathBuf) -> Self {
        ModelReference::Path(path)
    }
}

impl From<&Path> for ModelReference {
    fn from(path: &Path) -> Self {
        ModelReference::Path(path.to_path_buf())
    }
}

impl From<BuiltinModel> for ModelReference {
    fn from(model: BuiltinModel) -> Self {
        ModelReference::Builtin(model)
    }
}

impl fmt::Display for ModelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelReference::Path(path) => write!(f, "{}", path.display()),
            ModelReference::Text { name, .. } => write!(f, "{}", name),
            ModelReference::Builtin(model) => write!(f, "{}", model.name()),
        }
    }
}

/// Build a model from SHC text.
pub fn model_from_shc_text(name: &str, text: &str) -> GeomagResult<SphericalHarmonicModel> {
    let shc = parse_shc(text)?;
    let coefficients = TimeDependentCoefficients::from_shc(&shc)?;
    debug!(
        model = name,
        max_degree = shc.max_degree,
        epochs = shc.times.len(),
        "parsed SHC coefficients"
    );
    Ok(SphericalHarmonicModel::new(name, coefficients))
}

/// Load the model a reference points at.
pub fn load_model_shc(reference: &ModelReference) -> GeomagResult<SphericalHarmonicModel> {
    let model = match reference {
        ModelReference::Path(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                GeomagError::ModelLoad(format!("cannot read {}: {}", path.display(), e))
            })?;
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            model_from_shc_text(&name, &text).map_err(|e| match e {
                GeomagError::ModelLoad(msg) => {
                    GeomagError::ModelLoad(format!("{}: {}", path.display(), msg))
                }
                other => other,
            })?
        }
        ModelReference::Text { name, contents } => model_from_shc_text(name, contents)?,
        ModelReference::Builtin(model) => model_from_shc_text(model.name(), model.contents())?,
    };

    let (start, end) = model.validity();
    info!(
        model = %model.name,
        max_degree = model.max_degree(),
        valid_from = start,
        valid_to = end,
        "loaded field model"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_loads() {
        let model = load_model_shc(&ModelReference::default()).unwrap();
        assert_eq!(model.max_degree(), 3);
        assert_eq!(model.validity(), (2020.0, 2025.0));
    }

    #[test]
    fn test_missing_file_is_model_load_error() {
        let reference = ModelReference::from(PathBuf::from("/nonexistent/model.shc"));
        let err = load_model_shc(&reference).unwrap_err();
        assert!(matches!(err, GeomagError::ModelLoad(_)));
        assert!(err.to_string().contains("/nonexistent/model.shc"));
    }

    #[test]
    fn test_reference_display() {
        assert_eq!(ModelReference::default().to_string(), "IGRF-13 (degree 3)");
        let text = ModelReference::Text {
            name: "custom".to_string(),
            contents: String::new(),
        };
        assert_eq!(text.to_string(), "custom");
    }
}
