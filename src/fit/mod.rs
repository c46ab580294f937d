//! Straight-line fits of 2-D point lists.
//!
//! Track views are fitted independently as `y = intercept + slope · x`. Two
//! interchangeable strategies implement [`LineFitter`]:
//!
//! - [`RegressionFitter`]: unweighted least-squares regression
//! - [`WeightedLineFitter`]: χ² fit with a common per-point y uncertainty
//!
//! Fitters are stateless: each call returns a new [`LineFit`] value.

pub mod regression;
pub mod weighted;

use std::fmt;

pub use regression::RegressionFitter;
pub use weighted::WeightedLineFitter;

use crate::error::TrackError;

/// Result of a straight-line fit.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    pub slope_uncertainty: f64,
    pub intercept_uncertainty: f64,
    /// Slope-intercept covariance. [`RegressionFitter`] stores the
    /// correlation coefficient of the data here instead.
    pub covariance: f64,
    pub chisq: f64,
    pub ndf: i32,
    /// Name of the fitter that produced this fit.
    pub method: &'static str,
}

impl LineFit {
    /// Evaluate the fitted line at `x`.
    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

impl fmt::Display for LineFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: slope {:.6e} ± {:.3e}, intercept {:.6e} ± {:.3e}, cov {:.3e}, chi2/ndf {:.3}/{}",
            self.method,
            self.slope,
            self.slope_uncertainty,
            self.intercept,
            self.intercept_uncertainty,
            self.covariance,
            self.chisq,
            self.ndf
        )
    }
}

/// A straight-line fitting strategy.
pub trait LineFitter {
    /// Name recorded in [`LineFit::method`].
    fn name(&self) -> &'static str;

    /// Fit `points` given as `[x, y]`.
    ///
    /// # Errors
    ///
    /// [`TrackError::TooFewPoints`] for fewer than two points,
    /// [`TrackError::SingularFit`] if all points share the same x.
    fn fit(&self, points: &[[f64; 2]]) -> Result<LineFit, TrackError>;
}

fn check_point_count(points: &[[f64; 2]]) -> Result<usize, TrackError> {
    if points.len() < 2 {
        return Err(TrackError::TooFewPoints(points.len()));
    }
    Ok(points.len())
}
