//! Equirectangular (plate carrée) projection.
//!
//! Projected coordinates are plain degrees, so this is also the "source"
//! system in which gridded longitude/latitude data is handed to the renderer.

use crate::transform::{wrap_longitude, MapProjection, ProjectionParams};

#[derive(Debug, Clone, Default)]
pub struct PlateCarree {
    /// Central meridian in degrees
    pub central_longitude: f64,
}

impl PlateCarree {
    pub fn new(params: ProjectionParams) -> Self {
        Self {
            central_longitude: params.central_longitude,
        }
    }
}

impl MapProjection for PlateCarree {
    fn name(&self) -> &'static str {
        "PlateCarree"
    }

    fn project(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if !lon_deg.is_finite() || !lat_deg.is_finite() || lat_deg.abs() > 90.0 {
            return None;
        }
        Some((wrap_longitude(lon_deg - self.central_longitude), lat_deg))
    }

    fn boundary(&self) -> Vec<(f64, f64)> {
        vec![
            (-180.0, -90.0),
            (180.0, -90.0),
            (180.0, 90.0),
            (-180.0, 90.0),
            (-180.0, -90.0),
        ]
    }

    fn seam_longitude(&self) -> Option<f64> {
        Some(wrap_longitude(self.central_longitude + 180.0))
    }
}
