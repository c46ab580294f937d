//! Error type shared by the geometry, fitting and track modules.
//!
//! Every variant is fatal for the track being processed: nothing in this crate
//! substitutes a default value when a precondition is violated.

use thiserror::Error;

use crate::track::View;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("need at least 2 points to fit a line, got {0}")]
    TooFewPoints(usize),
    #[error("points have no spread along x, line fit is singular")]
    SingularFit,
    #[error("track has no fit for view {0}")]
    MissingFit(View),
    #[error("view {0} is not valid for this track")]
    InvalidView(View),
    #[error("track has no hits, cannot determine detector half")]
    NoHits,
    #[error("strips are nearly parallel: sin(stereo angle) = {sin_alpha:.3e}")]
    ParallelStrips { sin_alpha: f64 },
    #[error("sensor normal is orthogonal to the reference: projection = {projection:.3e}")]
    DegenerateNormal { projection: f64 },
    #[error("track direction is parallel to the z axis, curvilinear frame is undefined")]
    DirectionAlongAxis,
    #[error("line is parallel to the sensor plane")]
    ParallelToPlane,
    #[error("no stereo sensor paired with axial sensor \"{0}\"")]
    NoStereoSensor(String),
}
