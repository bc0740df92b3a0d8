//! Schmidt semi-normalised associated Legendre functions.
//!
//! Values are built with the Gauss-normalised recursion and then scaled by
//! the Schmidt factors, which are computed once per maximum degree.

use crate::coefficients::tri_index;

/// Schmidt normalisation factors `S(n, m)` for degrees up to `max_degree`.
#[derive(Debug, Clone)]
pub struct SchmidtFactors {
    max_degree: usize,
    factors: Vec<f64>,
}

impl SchmidtFactors {
    pub fn new(max_degree: usize) -> Self {
        let mut factors = vec![0.0; tri_index(max_degree, max_degree) + 1];
        factors[0] = 1.0;
        for n in 1..=max_degree {
            let nf = n as f64;
            factors[tri_index(n, 0)] = factors[tri_index(n - 1, 0)] * (2.0 * nf - 1.0) / nf;
            for m in 1..=n {
                let mf = m as f64;
                let delta = if m == 1 { 2.0 } else { 1.0 };
                factors[tri_index(n, m)] = factors[tri_index(n, m - 1)]
                    * ((nf - mf + 1.0) * delta / (nf + mf)).sqrt();
            }
        }
        Self { max_degree, factors }
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }
}

/// `P_n^m(cos θ)` and `dP_n^m/dθ` for one colatitude.
#[derive(Debug, Clone)]
pub struct LegendreTable {
    pub p: Vec<f64>,
    pub dp: Vec<f64>,
}

impl LegendreTable {
    /// Evaluate all functions up to the factors' maximum degree.
    pub fn compute(schmidt: &SchmidtFactors, colatitude: f64) -> Self {
        let nmax = schmidt.max_degree;
        let len = tri_index(nmax, nmax) + 1;
        let mut p = vec![0.0; len];
        let mut dp = vec![0.0; len];
        let (s, c) = colatitude.sin_cos();

        p[0] = 1.0;
        for n in 1..=nmax {
            for m in 0..=n {
                let idx = tri_index(n, m);
                if n == m {
                    let prev = tri_index(n - 1, m - 1);
                    p[idx] = s * p[prev];
                    dp[idx] = s * dp[prev] + c * p[prev];
                } else if n == 1 {
                    p[idx] = c * p[0];
                    dp[idx] = c * dp[0] - s * p[0];
                } else {
                    let prev = tri_index(n - 1, m);
                    let (p2, dp2) = if m + 2 <= n {
                        let i2 = tri_index(n - 2, m);
                        (p[i2], dp[i2])
                    } else {
                        (0.0, 0.0)
                    };
                    let nf = n as f64;
                    let mf = m as f64;
                    let k = ((nf - 1.0).powi(2) - mf * mf) / ((2.0 * nf - 1.0) * (2.0 * nf - 3.0));
                    p[idx] = c * p[prev] - k * p2;
                    dp[idx] = c * dp[prev] - s * p[prev] - k * dp2;
                }
            }
        }

        for (i, factor) in schmidt.factors.iter().enumerate() {
            p[i] *= factor;
            dp[i] *= factor;
        }

        Self { p, dp }
    }

    pub fn p(&self, n: usize, m: usize) -> f64 {
        self.p[tri_index(n, m)]
    }

    pub fn dp(&self, n: usize, m: usize) -> f64 {
        self.dp[tri_index(n, m)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_degree_closed_forms() {
        let schmidt = SchmidtFactors::new(3);
        for theta_deg in [5.0_f64, 30.0, 60.0, 90.0, 135.0, 170.0] {
            let theta = theta_deg.to_radians();
            let (s, c) = theta.sin_cos();
            let t = LegendreTable::compute(&schmidt, theta);

            assert!((t.p(1, 0) - c).abs() < 1e-12);
            assert!((t.p(1, 1) - s).abs() < 1e-12);
            assert!((t.p(2, 0) - 0.5 * (3.0 * c * c - 1.0)).abs() < 1e-12);
            assert!((t.p(2, 1) - 3f64.sqrt() * c * s).abs() < 1e-12);
            assert!((t.p(2, 2) - 0.5 * 3f64.sqrt() * s * s).abs() < 1e-12);

            assert!((t.dp(1, 0) + s).abs() < 1e-12);
            assert!((t.dp(1, 1) - c).abs() < 1e-12);
            assert!((t.dp(2, 0) + 3.0 * c * s).abs() < 1e-12);
        }
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let schmidt = SchmidtFactors::new(8);
        let theta = 0.7;
        let h = 1e-6;
        let t = LegendreTable::compute(&schmidt, theta);
        let plus = LegendreTable::compute(&schmidt, theta + h);
        let minus = LegendreTable::compute(&schmidt, theta - h);
        for n in 1..=8 {
            for m in 0..=n {
                let numeric = (plus.p(n, m) - minus.p(n, m)) / (2.0 * h);
                assert!(
                    (numeric - t.dp(n, m)).abs() < 1e-6,
                    "n={} m={}: {} vs {}",
                    n,
                    m,
                    numeric,
                    t.dp(n, m)
                );
            }
        }
    }
}
