//! Regular latitude/longitude/height coordinate grids.

use ndarray::{s, Array1, Array2, Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{GeomagError, GeomagResult};

/// Component index of latitude (degrees) in the last grid axis.
pub const LAT: usize = 0;
/// Component index of longitude (degrees) in the last grid axis.
pub const LON: usize = 1;
/// Component index of height above WGS84 (km) in the last grid axis.
pub const HEIGHT: usize = 2;

/// Parameters of a global evaluation grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBuilder {
    /// Number of latitude intervals; the grid has `nlats + 1` rows.
    pub nlats: usize,
    /// Number of longitude intervals; the grid has `nlons + 1` columns.
    pub nlons: usize,
    /// Height above the WGS84 ellipsoid in km.
    pub height: f64,
}

impl Default for GridBuilder {
    /// One-degree global grid on the ellipsoid surface.
    fn default() -> Self {
        Self {
            nlats: 180,
            nlons: 360,
            height: 0.0,
        }
    }
}

impl GridBuilder {
    pub fn new(nlats: usize, nlons: usize, height: f64) -> Self {
        Self { nlats, nlons, height }
    }

    /// Build the grid.
    ///
    /// Latitudes run linearly from -90 to 90 and longitudes from -180 to 180,
    /// both inclusive. Zero counts and a non-finite height are rejected.
    pub fn build(&self) -> GeomagResult<CoordinateGrid> {
        if self.nlats == 0 {
            return Err(GeomagError::invalid_parameter("nlats", "must be at least 1"));
        }
        if self.nlons == 0 {
            return Err(GeomagError::invalid_parameter("nlons", "must be at least 1"));
        }
        if !self.height.is_finite() {
            return Err(GeomagError::invalid_parameter(
                "height",
                format!("must be finite, got {}", self.height),
            ));
        }

        let lats = linspace_inclusive(-90.0, 90.0, self.nlats);
        let lons = linspace_inclusive(-180.0, 180.0, self.nlons);

        let mut coords = Array3::<f64>::zeros((lats.len(), lons.len(), 3));
        for (i, &lat) in lats.iter().enumerate() {
            for (j, &lon) in lons.iter().enumerate() {
                coords[[i, j, LAT]] = lat;
                coords[[i, j, LON]] = lon;
                coords[[i, j, HEIGHT]] = self.height;
            }
        }

        Ok(CoordinateGrid { coords })
    }
}

/// `intervals + 1` evenly spaced values with both end points pinned exactly.
fn linspace_inclusive(start: f64, end: f64, intervals: usize) -> Array1<f64> {
    let step = (end - start) / intervals as f64;
    Array1::from_iter((0..=intervals).map(|i| {
        if i == intervals {
            end
        } else {
            start + step * i as f64
        }
    }))
}

/// Build a global grid of `(nlats + 1, nlons + 1, 3)` coordinates.
pub fn grid(nlats: usize, nlons: usize, height: f64) -> GeomagResult<CoordinateGrid> {
    GridBuilder::new(nlats, nlons, height).build()
}

/// Immutable coordinate array indexed by (latitude, longitude, component).
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateGrid {
    coords: Array3<f64>,
}

impl CoordinateGrid {
    /// Wrap an existing coordinate array.
    ///
    /// The last axis must have length 3 (lat, lon, height). Arbitrary,
    /// non-regular coordinates are accepted so callers can evaluate along
    /// tracks or at varying heights.
    pub fn from_array(coords: Array3<f64>) -> GeomagResult<Self> {
        if coords.shape()[2] != 3 {
            return Err(GeomagError::invalid_parameter(
                "coords",
                format!(
                    "last axis must hold (lat, lon, height), got length {}",
                    coords.shape()[2]
                ),
            ));
        }
        if coords.shape()[0] == 0 || coords.shape()[1] == 0 {
            return Err(GeomagError::invalid_parameter("coords", "grid must not be empty"));
        }
        Ok(Self { coords })
    }

    /// Full array shape `(rows, cols, 3)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        let s = self.coords.shape();
        (s[0], s[1], s[2])
    }

    /// Horizontal shape `(rows, cols)` shared with every field array.
    pub fn dims(&self) -> (usize, usize) {
        let s = self.coords.shape();
        (s[0], s[1])
    }

    pub fn as_array(&self) -> &Array3<f64> {
        &self.coords
    }

    pub fn latitudes(&self) -> ArrayView2<'_, f64> {
        self.coords.slice(s![.., .., LAT])
    }

    pub fn longitudes(&self) -> ArrayView2<'_, f64> {
        self.coords.slice(s![.., .., LON])
    }

    pub fn heights(&self) -> ArrayView2<'_, f64> {
        self.coords.slice(s![.., .., HEIGHT])
    }

    /// `(lat, lon, height)` of one grid node.
    pub fn point(&self, row: usize, col: usize) -> Option<(f64, f64, f64)> {
        let (rows, cols) = self.dims();
        if row >= rows || col >= cols {
            return None;
        }
        Some((
            self.coords[[row, col, LAT]],
            self.coords[[row, col, LON]],
            self.coords[[row, col, HEIGHT]],
        ))
    }

    /// Copy of the selected rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> GeomagResult<CoordinateGrid> {
        let nrows = self.dims().0;
        if let Some(&bad) = rows.iter().find(|&&r| r >= nrows) {
            return Err(GeomagError::invalid_parameter(
                "rows",
                format!("row {} out of range for grid with {} rows", bad, nrows),
            ));
        }
        Ok(CoordinateGrid {
            coords: self.coords.select(Axis(0), rows),
        })
    }

    /// Split latitude rows into northern and southern hemispheres.
    pub fn hemispheres(&self) -> HemisphereSplit {
        HemisphereSplit::from_grid(self)
    }

    /// Check that a field array matches this grid's horizontal shape.
    pub fn check_field_shape(&self, field: &ArrayView2<'_, f64>) -> GeomagResult<()> {
        let expected = self.dims();
        let got = field.dim();
        if got != expected {
            return Err(GeomagError::Render(format!(
                "data shape {:?} does not match coordinate grid shape {:?}",
                got, expected
            )));
        }
        Ok(())
    }
}

/// Latitude-row indices of the northern and southern parts of a grid.
///
/// A row belongs to the north when its latitude at the first longitude is
/// strictly positive and to the south when strictly negative, so an equator
/// row is in neither set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HemisphereSplit {
    pub north: Vec<usize>,
    pub south: Vec<usize>,
}

impl HemisphereSplit {
    pub fn from_grid(grid: &CoordinateGrid) -> Self {
        let first_col = grid.coords.slice(s![.., 0, LAT]);
        let mut split = HemisphereSplit::default();
        for (row, &lat) in first_col.iter().enumerate() {
            if lat > 0.0 {
                split.north.push(row);
            } else if lat < 0.0 {
                split.south.push(row);
            }
        }
        split
    }
}

/// Copy of the selected rows of a 2-D field, in the given order.
pub fn select_field_rows(field: &ArrayView2<'_, f64>, rows: &[usize]) -> GeomagResult<Array2<f64>> {
    let nrows = field.nrows();
    if let Some(&bad) = rows.iter().find(|&&r| r >= nrows) {
        return Err(GeomagError::invalid_parameter(
            "rows",
            format!("row {} out of range for field with {} rows", bad, nrows),
        ));
    }
    Ok(field.select(Axis(0), rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_shape() {
        let g = GridBuilder::default().build().unwrap();
        assert_eq!(g.shape(), (181, 361, 3));
    }

    #[test]
    fn test_point_lookup() {
        let g = grid(2, 2, 0.0).unwrap();
        assert_eq!(g.point(1, 1), Some((0.0, 0.0, 0.0)));
        assert_eq!(g.point(3, 0), None);
    }

    #[test]
    fn test_zero_counts_rejected() {
        assert!(matches!(
            grid(0, 10, 0.0),
            Err(GeomagError::InvalidParameter { .. })
        ));
        assert!(matches!(
            grid(10, 0, 0.0),
            Err(GeomagError::InvalidParameter { .. })
        ));
        assert!(grid(10, 10, f64::NAN).is_err());
    }

    #[test]
    fn test_from_array_rejects_wrong_component_axis() {
        let arr = Array3::<f64>::zeros((2, 2, 2));
        assert!(CoordinateGrid::from_array(arr).is_err());
    }
}
