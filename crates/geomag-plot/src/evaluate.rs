//! Model evaluation over a coordinate grid.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

use geomag_common::{
    datetime_to_decimal_year, decimal_year_to_mjd2000, CoordinateGrid, GeomagError, GeomagResult, GridBuilder,
};
use geomag_model::{load_model_shc, vincdecnorm, CoordinateSystem, ModelReference};

/// The six conventional magnetic elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldComponent {
    /// North component (nT).
    X,
    /// East component (nT).
    Y,
    /// Vertical component, positive down (nT).
    Z,
    /// Inclination, positive below the horizontal (degrees).
    I,
    /// Declination, positive east of true north (degrees).
    D,
    /// Total intensity (nT).
    F,
}

impl FieldComponent {
    pub const ALL: [FieldComponent; 6] = [
        FieldComponent::X,
        FieldComponent::Y,
        FieldComponent::Z,
        FieldComponent::I,
        FieldComponent::D,
        FieldComponent::F,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            FieldComponent::X => "X",
            FieldComponent::Y => "Y",
            FieldComponent::Z => "Z",
            FieldComponent::I => "I",
            FieldComponent::D => "D",
            FieldComponent::F => "F",
        }
    }

    /// Units used in contour labels.
    pub fn units(&self) -> &'static str {
        match self {
            FieldComponent::I | FieldComponent::D => "°",
            _ => "nT",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FieldComponent::X => "North component",
            FieldComponent::Y => "East component",
            FieldComponent::Z => "Vertical component (down)",
            FieldComponent::I => "Inclination",
            FieldComponent::D => "Declination",
            FieldComponent::F => "Total intensity",
        }
    }
}

impl fmt::Display for FieldComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for FieldComponent {
    type Err = GeomagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldComponent::ALL
            .into_iter()
            .find(|c| c.symbol().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                GeomagError::invalid_parameter("component", format!("unknown component '{}', expected one of X Y Z I D F", s))
            })
    }
}

/// Field components on the grid's (lat, lon) shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldResult {
    x: Array2<f64>,
    y: Array2<f64>,
    z: Array2<f64>,
    i: Array2<f64>,
    d: Array2<f64>,
    f: Array2<f64>,
}

impl FieldResult {
    pub fn get(&self, component: FieldComponent) -> &Array2<f64> {
        match component {
            FieldComponent::X => &self.x,
            FieldComponent::Y => &self.y,
            FieldComponent::Z => &self.z,
            FieldComponent::I => &self.i,
            FieldComponent::D => &self.d,
            FieldComponent::F => &self.f,
        }
    }

    /// (rows, cols) shared by every component.
    pub fn dim(&self) -> (usize, usize) {
        self.x.dim()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldComponent, &Array2<f64>)> {
        FieldComponent::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// Evaluate a model at `time` over `coords`.
///
/// Coordinates are geodetic (WGS84) with heights in km; the vector is
/// returned in the local geodetic north/east/down frame.
pub fn eval_model(time: &DateTime<Utc>, coords: &CoordinateGrid, model: &ModelReference) -> GeomagResult<FieldResult> {
    let epoch = datetime_to_decimal_year(time)?;
    let mjd2000 = decimal_year_to_mjd2000(epoch)?;
    let model = load_model_shc(model)?;

    let frame = CoordinateSystem::GeodeticAboveWgs84;
    let neu = model.eval(mjd2000, coords, frame, frame)?;
    let (inclination, declination, intensity) = vincdecnorm(&neu.view())?;

    let (rows, cols) = coords.dims();
    info!(model = %model.name, epoch, rows, cols, "Evaluated model on grid");

    Ok(FieldResult {
        x: neu.slice(s![.., .., 0]).to_owned(),
        y: neu.slice(s![.., .., 1]).to_owned(),
        z: neu.slice(s![.., .., 2]).mapv(|up| -up),
        i: inclination,
        d: declination,
        f: intensity,
    })
}

/// Inputs of one evaluation, with the usual defaults: 2020-01-01, the
/// default global grid at the surface and the built-in model.
#[derive(Debug, Clone)]
pub struct EvalRequest {
    pub time: DateTime<Utc>,
    /// Grid to evaluate on; `None` builds a fresh default grid per call.
    pub coords: Option<CoordinateGrid>,
    pub model: ModelReference,
}

impl Default for EvalRequest {
    fn default() -> Self {
        Self {
            time: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).single().unwrap_or_default(),
            coords: None,
            model: ModelReference::default(),
        }
    }
}

impl EvalRequest {
    /// Evaluate, returning the grid used alongside the field.
    pub fn evaluate(&self) -> GeomagResult<(CoordinateGrid, FieldResult)> {
        let coords = match &self.coords {
            Some(coords) => coords.clone(),
            None => GridBuilder::default().build()?,
        };
        let field = eval_model(&self.time, &coords, &self.model)?;
        Ok((coords, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_parsing() {
        assert_eq!("x".parse::<FieldComponent>().unwrap(), FieldComponent::X);
        assert_eq!(" F ".parse::<FieldComponent>().unwrap(), FieldComponent::F);
        assert!("H".parse::<FieldComponent>().is_err());
    }

    #[test]
    fn test_component_units() {
        assert_eq!(FieldComponent::I.units(), "°");
        assert_eq!(FieldComponent::Z.units(), "nT");
        assert_eq!(FieldComponent::D.to_string(), "D");
    }

    #[test]
    fn test_default_request() {
        let request = EvalRequest::default();
        assert_eq!(request.time.to_rfc3339(), "2020-01-01T00:00:00+00:00");
        assert!(request.coords.is_none());
        assert_eq!(request.model, ModelReference::default());
    }
}
