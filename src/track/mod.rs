//! Straight-line track models.
//!
//! A track is fitted in two orthogonal projections ([`View`]):
//!
//! - [`View::Yz`]: y versus depth z
//! - [`View::Xz`]: x versus the signed path length along the YZ line
//!
//! [`AxialTrack`] only has axial strip measurements and is fitted in the YZ
//! view. [`StereoTrack`] is built from stereo space points and is fitted in
//! both. Fitting never modifies a track in place: [`fit_stereo_track`] and
//! [`fit_axial_track`] return a new, fitted value.

pub mod axial;
pub mod stereo;

use std::fmt;

pub use axial::{fit_axial_track, AxialTrack};
pub use stereo::{fit_stereo_track, StereoTrack};

use crate::error::TrackError;
use crate::fit::LineFit;

/// Track projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Yz,
    Xz,
}

impl View {
    pub const ALL: [View; 2] = [View::Yz, View::Xz];

    /// Slot of this view in per-view arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            View::Yz => 0,
            View::Xz => 1,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Yz => f.write_str("YZ"),
            View::Xz => f.write_str("XZ"),
        }
    }
}

/// Capabilities shared by the axial and stereo track models.
pub trait Track {
    /// Fit of `view`.
    ///
    /// # Errors
    ///
    /// [`TrackError::MissingFit`] if the view has not been fitted,
    /// [`TrackError::InvalidView`] if the track does not support the view.
    fn fit(&self, view: View) -> Result<&LineFit, TrackError>;

    /// `[x, y]` points used to fit `view`.
    fn point_list(&self, view: View) -> Result<Vec<[f64; 2]>, TrackError>;

    /// Detector half of the first hit.
    fn is_top(&self) -> Result<bool, TrackError>;

    /// Evaluate the fitted line of `view` at `x`.
    fn predict_view(&self, view: View, x: f64) -> Result<f64, TrackError> {
        Ok(self.fit(view)?.predict(x))
    }

    fn slope(&self, view: View) -> Result<f64, TrackError> {
        Ok(self.fit(view)?.slope)
    }

    fn intercept(&self, view: View) -> Result<f64, TrackError> {
        Ok(self.fit(view)?.intercept)
    }
}

/// Signed path length to depth `z` along a line with slope `slope` in z.
///
/// Carries the sign of `z`; zero at `z = 0`.
#[inline]
pub fn signed_path_length(slope: f64, z: f64) -> f64 {
    let dy = slope * z;
    let s = (z * z + dy * dy).sqrt();
    if z < 0.0 {
        -s
    } else {
        s
    }
}
