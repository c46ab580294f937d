//! Weighted χ² line fit.

use tracing::debug;

use super::{check_point_count, LineFit, LineFitter};
use crate::error::TrackError;

/// χ² line fit where every point carries the same y uncertainty.
#[derive(Debug, Clone, Copy)]
pub struct WeightedLineFitter {
    /// One-sigma y uncertainty of each point, in the units of y. Default 6e-3.
    pub err_y: f64,
}

impl Default for WeightedLineFitter {
    fn default() -> Self {
        Self { err_y: 6e-3 }
    }
}

impl WeightedLineFitter {
    pub const NAME: &'static str = "LineFit";

    pub fn new(err_y: f64) -> Self {
        Self { err_y }
    }
}

impl LineFitter for WeightedLineFitter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn fit(&self, points: &[[f64; 2]]) -> Result<LineFit, TrackError> {
        let n = check_point_count(points)?;
        let w = 1.0 / (self.err_y * self.err_y);

        let s = w * n as f64;
        let sx: f64 = points.iter().map(|p| w * p[0]).sum();
        let sy: f64 = points.iter().map(|p| w * p[1]).sum();
        let x_mean = sx / s;
        let y_mean = sy / s;

        // Sums about the weighted means
        let (mut stt, mut sty) = (0.0, 0.0);
        for p in points {
            let t = p[0] - x_mean;
            stt += w * t * t;
            sty += w * t * (p[1] - y_mean);
        }

        if stt <= (1e-24 * s * x_mean * x_mean).max(10.0 * f64::MIN_POSITIVE) {
            return Err(TrackError::SingularFit);
        }

        let slope = sty / stt;
        let intercept = y_mean - slope * x_mean;

        let chisq: f64 = points
            .iter()
            .map(|p| {
                let r = p[1] - intercept - slope * p[0];
                w * r * r
            })
            .sum();

        debug!(
            "Weighted line fit of {} points (σy = {:.3e}): slope {:.6e}, intercept {:.6e}, chi2 {:.3}",
            n, self.err_y, slope, intercept, chisq
        );

        Ok(LineFit {
            slope,
            intercept,
            slope_uncertainty: (1.0 / stt).sqrt(),
            intercept_uncertainty: ((1.0 + sx * sx / (s * stt)) / s).sqrt(),
            covariance: -sx / (s * stt),
            chisq,
            ndf: n as i32 - 2,
            method: Self::NAME,
        })
    }
}
