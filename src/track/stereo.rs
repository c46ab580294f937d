//! Track built from stereo space points, fitted in both views.

use std::fmt;

use tracing::debug;

use super::{signed_path_length, Track, View};
use crate::curvilinear::slope_direction;
use crate::error::TrackError;
use crate::fit::{LineFit, LineFitter};
use crate::stereo::StereoPair;
use crate::Vector3;

/// Straight track through an ordered list of stereo pairs.
///
/// Pairs keep their insertion order. The XZ view uses the signed path length
/// along the YZ line as its abscissa, so the YZ fit must exist before the XZ
/// point list can be built.
#[derive(Debug, Clone)]
pub struct StereoTrack {
    pairs: Vec<StereoPair>,
    fits: [Option<LineFit>; 2],
}

impl StereoTrack {
    /// Unfitted track through `pairs`.
    pub fn new(pairs: Vec<StereoPair>) -> Self {
        Self {
            pairs,
            fits: [None, None],
        }
    }

    pub fn pairs(&self) -> &[StereoPair] {
        &self.pairs
    }

    /// Copy of the track with `fit` stored for `view`.
    pub fn with_fit(&self, view: View, fit: LineFit) -> Self {
        let mut track = self.clone();
        track.fits[view.index()] = Some(fit);
        track
    }

    /// Copy of the track without a fit for `view`.
    pub fn without_fit(&self, view: View) -> Self {
        let mut track = self.clone();
        track.fits[view.index()] = None;
        track
    }

    /// Copy of the track with both fits cleared.
    pub fn without_fits(&self) -> Self {
        Self::new(self.pairs.clone())
    }

    pub fn is_fitted(&self) -> bool {
        self.fits.iter().all(Option::is_some)
    }

    /// Signed path length to depth `z` along the YZ line.
    pub fn signed_path_length(&self, z: f64) -> Result<f64, TrackError> {
        Ok(signed_path_length(self.slope(View::Yz)?, z))
    }

    /// Predicted `[y, x]` at depth `z`, indexed by [`View::index`].
    pub fn predict(&self, z: f64) -> Result<[f64; 2], TrackError> {
        let s = self.signed_path_length(z)?;
        let mut p = [0.0; 2];
        p[View::Yz.index()] = self.predict_view(View::Yz, z)?;
        p[View::Xz.index()] = self.predict_view(View::Xz, s)?;
        Ok(p)
    }

    /// Slopes of both views, indexed by [`View::index`].
    pub fn slopes(&self) -> Result<[f64; 2], TrackError> {
        let mut p = [0.0; 2];
        for view in View::ALL {
            p[view.index()] = self.slope(view)?;
        }
        Ok(p)
    }

    /// Intercepts of both views, indexed by [`View::index`].
    pub fn intercepts(&self) -> Result<[f64; 2], TrackError> {
        let mut p = [0.0; 2];
        for view in View::ALL {
            p[view.index()] = self.intercept(view)?;
        }
        Ok(p)
    }

    /// Track direction `(dx/dz, dy/dz, 1 − sqrt(dx/dz² + dy/dz²))`.
    ///
    /// The z component follows the alignment convention shared with
    /// [`crate::curvilinear::project_parameters`]; the vector is not a unit
    /// vector.
    pub fn direction(&self) -> Result<Vector3, TrackError> {
        Ok(slope_direction(self.slope(View::Xz)?, self.slope(View::Yz)?))
    }
}

impl Track for StereoTrack {
    fn fit(&self, view: View) -> Result<&LineFit, TrackError> {
        self.fits[view.index()]
            .as_ref()
            .ok_or(TrackError::MissingFit(view))
    }

    fn point_list(&self, view: View) -> Result<Vec<[f64; 2]>, TrackError> {
        self.pairs
            .iter()
            .map(|pair| {
                let p = pair.position();
                match view {
                    View::Yz => Ok([p.z, p.y]),
                    View::Xz => Ok([self.signed_path_length(p.z)?, p.x]),
                }
            })
            .collect()
    }

    fn is_top(&self) -> Result<bool, TrackError> {
        self.pairs
            .first()
            .map(|pair| pair.axial().is_top())
            .ok_or(TrackError::NoHits)
    }
}

impl fmt::Display for StereoTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "StereoTrack: {} stereo hits", self.pairs.len())?;
        for pair in &self.pairs {
            let p = pair.position();
            writeln!(
                f,
                "  pair ({:.6}, {:.6}, {:.6}) {} + {}",
                p.x,
                p.y,
                p.z,
                pair.axial().sensor_name(),
                pair.stereo().sensor_name()
            )?;
        }
        for view in View::ALL {
            match &self.fits[view.index()] {
                Some(fit) => writeln!(f, "  {view}: {fit}")?,
                None => writeln!(f, "  {view}: not fitted")?,
            }
        }
        Ok(())
    }
}

/// Fit both views of `track` with `fitter`.
///
/// Existing fits are discarded. The YZ view is fitted first; the XZ point
/// list then uses path lengths from the new YZ slope.
pub fn fit_stereo_track(
    fitter: &dyn LineFitter,
    track: &StereoTrack,
) -> Result<StereoTrack, TrackError> {
    let track = track.without_fits();

    let yz = fitter.fit(&track.point_list(View::Yz)?)?;
    let track = track.with_fit(View::Yz, yz);

    let xz = fitter.fit(&track.point_list(View::Xz)?)?;
    let track = track.with_fit(View::Xz, xz);

    debug!(
        "Fitted stereo track with {} hits ({}): dx/dz {:.6e}, dy/dz {:.6e}",
        track.pairs.len(),
        fitter.name(),
        track.slope(View::Xz)?,
        track.slope(View::Yz)?
    );

    Ok(track)
}
