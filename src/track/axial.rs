//! Single-view track through axial strip clusters.

use std::fmt;

use tracing::debug;

use super::{Track, View};
use crate::error::TrackError;
use crate::fit::{LineFit, LineFitter};
use crate::strip::StripCluster;

/// Straight track in the YZ view built from axial clusters only.
#[derive(Debug, Clone)]
pub struct AxialTrack {
    strips: Vec<StripCluster>,
    fit: Option<LineFit>,
}

impl AxialTrack {
    pub fn new(strips: Vec<StripCluster>) -> Self {
        Self { strips, fit: None }
    }

    pub fn strips(&self) -> &[StripCluster] {
        &self.strips
    }

    /// Copy of the track with `fit` as its YZ fit.
    pub fn with_fit(&self, fit: LineFit) -> Self {
        Self {
            strips: self.strips.clone(),
            fit: Some(fit),
        }
    }

    /// Path length in the YZ plane for a step `dz` in depth.
    pub fn path(&self, dz: f64) -> Result<f64, TrackError> {
        let dy = self.slope(View::Yz)? * dz;
        Ok((dz * dz + dy * dy).sqrt())
    }
}

impl Track for AxialTrack {
    fn fit(&self, view: View) -> Result<&LineFit, TrackError> {
        match view {
            View::Yz => self.fit.as_ref().ok_or(TrackError::MissingFit(view)),
            View::Xz => Err(TrackError::InvalidView(view)),
        }
    }

    fn point_list(&self, view: View) -> Result<Vec<[f64; 2]>, TrackError> {
        match view {
            View::Yz => Ok(self
                .strips
                .iter()
                .map(|s| [s.position.z, s.position.y])
                .collect()),
            View::Xz => Err(TrackError::InvalidView(view)),
        }
    }

    fn is_top(&self) -> Result<bool, TrackError> {
        self.strips
            .first()
            .map(StripCluster::is_top)
            .ok_or(TrackError::NoHits)
    }
}

impl fmt::Display for AxialTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AxialTrack: {} hits", self.strips.len())?;
        for strip in &self.strips {
            writeln!(f, "  {strip}")?;
        }
        match &self.fit {
            Some(fit) => writeln!(f, "  {fit}"),
            None => writeln!(f, "  not fitted"),
        }
    }
}

/// Fit the YZ view of `track` with `fitter`.
pub fn fit_axial_track(fitter: &dyn LineFitter, track: &AxialTrack) -> Result<AxialTrack, TrackError> {
    let fit = fitter.fit(&track.point_list(View::Yz)?)?;
    debug!(
        "Fitted axial track with {} hits ({}): dy/dz {:.6e}",
        track.strips.len(),
        fitter.name(),
        fit.slope
    );
    Ok(track.with_fit(fit))
}
