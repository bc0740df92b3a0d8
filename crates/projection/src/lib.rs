//! Map projections for global geophysical maps.
//!
//! Implements the forward projections on a sphere without external
//! dependencies: polar/oblique azimuthal equidistant, Mollweide and plate
//! carrée.

pub mod azimuthal;
pub mod mollweide;
pub mod plate_carree;
pub mod transform;

pub use azimuthal::AzimuthalEquidistant;
pub use mollweide::Mollweide;
pub use plate_carree::PlateCarree;
pub use transform::{Extent, MapProjection, ProjectionParams, EARTH_RADIUS};

/// Named projection choice, for configuration and logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionKind {
    AzimuthalEquidistant(ProjectionParams),
    Mollweide(ProjectionParams),
    PlateCarree(ProjectionParams),
}

impl ProjectionKind {
    pub fn north_polar() -> Self {
        ProjectionKind::AzimuthalEquidistant(ProjectionParams {
            central_latitude: 90.0,
            ..ProjectionParams::default()
        })
    }

    pub fn south_polar() -> Self {
        ProjectionKind::AzimuthalEquidistant(ProjectionParams {
            central_latitude: -90.0,
            ..ProjectionParams::default()
        })
    }

    pub fn mollweide() -> Self {
        ProjectionKind::Mollweide(ProjectionParams::default())
    }

    /// Instantiate the projection.
    pub fn build(&self) -> Box<dyn MapProjection> {
        match *self {
            ProjectionKind::AzimuthalEquidistant(p) => Box::new(AzimuthalEquidistant::new(p)),
            ProjectionKind::Mollweide(p) => Box::new(Mollweide::new(p)),
            ProjectionKind::PlateCarree(p) => Box::new(PlateCarree::new(p)),
        }
    }
}
