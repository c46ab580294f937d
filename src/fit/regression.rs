//! Unweighted least-squares regression.

use tracing::debug;

use super::{check_point_count, LineFit, LineFitter};
use crate::error::TrackError;

/// Ordinary least-squares line fit.
///
/// Standard errors follow the textbook regression formulas and are NaN for
/// two points, where the residual variance is undefined. The correlation
/// coefficient is stored in [`LineFit::covariance`] and χ² is not computed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegressionFitter;

impl RegressionFitter {
    pub const NAME: &'static str = "SimpleRegression";
}

impl LineFitter for RegressionFitter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn fit(&self, points: &[[f64; 2]]) -> Result<LineFit, TrackError> {
        let n = check_point_count(points)?;
        let nf = n as f64;

        let x_mean = points.iter().map(|p| p[0]).sum::<f64>() / nf;
        let y_mean = points.iter().map(|p| p[1]).sum::<f64>() / nf;

        // Centered sums of squares and products
        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for p in points {
            let dx = p[0] - x_mean;
            let dy = p[1] - y_mean;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }

        if sxx < 10.0 * f64::MIN_POSITIVE {
            return Err(TrackError::SingularFit);
        }

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        let (slope_uncertainty, intercept_uncertainty) = if n > 2 {
            let sse = (syy - sxy * sxy / sxx).max(0.0);
            let mse = sse / (nf - 2.0);
            (
                (mse / sxx).sqrt(),
                (mse * (1.0 / nf + x_mean * x_mean / sxx)).sqrt(),
            )
        } else {
            (f64::NAN, f64::NAN)
        };

        let r = if syy > 0.0 {
            let r2 = (sxy * sxy / sxx) / syy;
            r2.min(1.0).sqrt().copysign(slope)
        } else {
            0.0
        };

        debug!(
            "Regression fit of {} points: slope {:.6e}, intercept {:.6e}, r {:.4}",
            n, slope, intercept, r
        );

        Ok(LineFit {
            slope,
            intercept,
            slope_uncertainty,
            intercept_uncertainty,
            covariance: r,
            chisq: 0.0,
            ndf: n as i32 - 2,
            method: Self::NAME,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_line_ten_points() {
        let points: Vec<[f64; 2]> = (0..10)
            .map(|i| {
                let x = 10.0 * i as f64;
                [x, 2.0 + 0.01 * x]
            })
            .collect();

        let fit = RegressionFitter.fit(&points).unwrap();
        assert!((fit.slope - 0.01).abs() < 1e-9, "slope {}", fit.slope);
        assert!((fit.intercept - 2.0).abs() < 1e-9, "intercept {}", fit.intercept);
        assert_eq!(fit.chisq, 0.0);
        assert_eq!(fit.ndf, 8);
        assert_eq!(fit.method, "SimpleRegression");
        assert!(fit.slope_uncertainty < 1e-9);
        assert!(fit.intercept_uncertainty < 1e-7);
        assert!((fit.covariance - 1.0).abs() < 1e-12, "r {}", fit.covariance);
    }

    #[test]
    fn test_known_standard_errors() {
        // x = 0..4, y = [0, 2, 1, 3, 4]: slope 0.9, intercept 0.2, SSE 1.9
        let points = [[0.0, 0.0], [1.0, 2.0], [2.0, 1.0], [3.0, 3.0], [4.0, 4.0]];
        let fit = RegressionFitter.fit(&points).unwrap();

        let mse: f64 = 1.9 / 3.0;
        assert!((fit.slope - 0.9).abs() < 1e-12);
        assert!((fit.intercept - 0.2).abs() < 1e-12);
        assert!((fit.slope_uncertainty - (mse / 10.0).sqrt()).abs() < 1e-12);
        assert!((fit.intercept_uncertainty - (mse * (0.2 + 0.4)).sqrt()).abs() < 1e-12);
        assert!((fit.covariance - (8.1_f64 / 10.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_two_points() {
        let fit = RegressionFitter.fit(&[[1.0, 1.0], [3.0, 2.0]]).unwrap();
        assert!((fit.slope - 0.5).abs() < 1e-15);
        assert!((fit.intercept - 0.5).abs() < 1e-15);
        assert_eq!(fit.ndf, 0);
        assert!(fit.slope_uncertainty.is_nan());
    }

    #[test]
    fn test_negative_slope_correlation() {
        let points = [[0.0, 1.0], [1.0, 0.5], [2.0, 0.1]];
        let fit = RegressionFitter.fit(&points).unwrap();
        assert!(fit.slope < 0.0);
        assert!(fit.covariance < -0.99);
    }
}
