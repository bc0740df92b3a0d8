//! Generators for synthetic field data.
//!
//! These produce smooth, predictable scalar fields on (nlats, nlons) grids
//! so contouring and rendering can be tested without evaluating a model.

use ndarray::Array2;

/// Latitudes and longitudes (degrees) of a regular global grid, matching the
/// layout of the workspace grid builder: rows run from -90 to 90, columns
/// from -180 to 180, both end points included.
pub fn lat_lon_arrays(nlats: usize, nlons: usize) -> (Array2<f64>, Array2<f64>) {
    let step = |n: usize, span: f64| if n > 1 { span / (n - 1) as f64 } else { 0.0 };
    let dlat = step(nlats, 180.0);
    let dlon = step(nlons, 360.0);
    let lats = Array2::from_shape_fn((nlats, nlons), |(i, _)| -90.0 + i as f64 * dlat);
    let lons = Array2::from_shape_fn((nlats, nlons), |(_, j)| -180.0 + j as f64 * dlon);
    (lats, lons)
}

/// Intensity-like field of an axial dipole: `amplitude * sqrt(1 + 3 sin²φ)`.
pub fn dipole_intensity_field(nlats: usize, nlons: usize, amplitude: f64) -> Array2<f64> {
    let (lats, _) = lat_lon_arrays(nlats, nlons);
    lats.mapv(|lat| {
        let s = lat.to_radians().sin();
        amplitude * (1.0 + 3.0 * s * s).sqrt()
    })
}

/// Inclination of an axial dipole in degrees: `atan(2 tan φ)`.
pub fn dipole_inclination_field(nlats: usize, nlons: usize) -> Array2<f64> {
    let (lats, _) = lat_lon_arrays(nlats, nlons);
    lats.mapv(|lat| (2.0 * lat.to_radians().tan()).atan().to_degrees())
}

/// Field varying with both latitude and longitude, useful for exercising
/// closed contours: `sin(lat) * 1000 + cos(lon) * 500`.
pub fn wavy_field(nlats: usize, nlons: usize) -> Array2<f64> {
    let (lats, lons) = lat_lon_arrays(nlats, nlons);
    let mut field = Array2::<f64>::zeros((nlats, nlons));
    for ((i, j), v) in field.indexed_iter_mut() {
        *v = lats[[i, j]].to_radians().sin() * 1000.0 + lons[[i, j]].to_radians().cos() * 500.0;
    }
    field
}

/// Single Gaussian bump centred in index space; contours at levels below
/// `peak` are closed rings.
pub fn bump_field(rows: usize, cols: usize, peak: f64) -> Array2<f64> {
    let cy = (rows as f64 - 1.0) / 2.0;
    let cx = (cols as f64 - 1.0) / 2.0;
    let sigma = (rows.min(cols) as f64 / 4.0).max(1.0);
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        let dy = i as f64 - cy;
        let dx = j as f64 - cx;
        peak * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp()
    })
}

/// Constant field.
pub fn constant_field(rows: usize, cols: usize, value: f64) -> Array2<f64> {
    Array2::from_elem((rows, cols), value)
}

/// Field with NaN at the given (row, col) positions and a column ramp
/// elsewhere.
pub fn field_with_nans(rows: usize, cols: usize, nan_positions: &[(usize, usize)]) -> Array2<f64> {
    let mut field = Array2::from_shape_fn((rows, cols), |(_, j)| j as f64);
    for &(i, j) in nan_positions {
        if i < rows && j < cols {
            field[[i, j]] = f64::NAN;
        }
    }
    field
}

/// RGBA pixel data with a gradient pattern, 4 bytes per pixel.
pub fn create_test_rgba_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let r = ((x as f32 / width as f32) * 255.0) as u8;
            let g = ((y as f32 / height as f32) * 255.0) as u8;
            pixels.extend_from_slice(&[r, g, 128, 255]);
        }
    }
    pixels
}

/// RGBA pixel data drawn from a small palette (line colours on white), for
/// exercising indexed PNG output.
pub fn create_palette_pixels(width: usize, height: usize, colors: usize) -> Vec<u8> {
    let colors = colors.max(1);
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let idx = (x + y) % colors;
            let shade = (idx * 255 / colors) as u8;
            pixels.extend_from_slice(&[shade, 255 - shade, 64, 255]);
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lon_arrays_span_globe() {
        let (lats, lons) = lat_lon_arrays(3, 5);
        assert_eq!(lats[[0, 0]], -90.0);
        assert_eq!(lats[[2, 4]], 90.0);
        assert_eq!(lons[[1, 0]], -180.0);
        assert_eq!(lons[[1, 4]], 180.0);
    }

    #[test]
    fn test_dipole_intensity_doubles_at_poles() {
        let f = dipole_intensity_field(3, 4, 30_000.0);
        assert!((f[[1, 0]] - 30_000.0).abs() < 1e-9);
        assert!((f[[2, 0]] - 60_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_bump_peak_in_centre() {
        let f = bump_field(5, 5, 10.0);
        assert_eq!(f[[2, 2]], 10.0);
        assert!(f[[0, 0]] < f[[1, 1]]);
    }

    #[test]
    fn test_palette_pixel_count() {
        let pixels = create_palette_pixels(10, 4, 3);
        assert_eq!(pixels.len(), 10 * 4 * 4);
    }
}
