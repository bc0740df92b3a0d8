//! Shared test utilities for the geomagnetic mapping workspace.
//!
//! - [`fixtures`]: SHC model texts and evaluation times
//! - [`generators`]: synthetic scalar fields and pixel buffers
//! - [`paths`]: coefficient file lookup and scratch files
//!
//! Full-resolution coefficient files are not shipped. Tests that want one
//! use [`require_model_file!`] and skip when it is missing.

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Resolve a coefficient file with [`find_test_file`], or return early from
/// the calling test with a skip notice.
///
/// ```ignore
/// let path = test_utils::require_model_file!("IGRF13.shc");
/// ```
#[macro_export]
macro_rules! require_model_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!("SKIPPED: model file '{}' not found (set TEST_DATA_DIR)", $name);
                return;
            }
        }
    }};
}

/// Assert `|left - right| <= epsilon`, printing both values and the difference.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "values differ: left {:?}, right {:?}, |diff| {:?} > {:?}",
                left, right, diff, epsilon
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_approx_eq_within_tolerance() {
        assert_approx_eq!(29_404.8, 29_404.81, 0.02);
        assert_approx_eq!(-5.5, -5.500001, 1e-4);
    }

    #[test]
    #[should_panic(expected = "values differ")]
    fn test_approx_eq_outside_tolerance() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    #[should_panic(expected = "values differ")]
    fn test_approx_eq_rejects_nan() {
        assert_approx_eq!(f64::NAN, 1.0, 1.0);
    }

    #[test]
    fn test_require_model_file_finds_shipped_model() {
        let path = require_model_file!("igrf13_degree3.shc");
        assert!(path.ends_with("igrf13_degree3.shc"));
    }
}
