//! Track/sensor intersections and measurement residuals.

use tracing::trace;

use crate::error::TrackError;
use crate::strip::StripCluster;
use crate::track::{StereoTrack, Track, View};
use crate::Vector3;

/// Intersection of the line `l0 + d·l` with the plane through `p0` with normal `n`.
///
/// # Errors
///
/// [`TrackError::ParallelToPlane`] if `l` lies in the plane.
pub fn line_plane_intercept(
    l: &Vector3,
    l0: &Vector3,
    p0: &Vector3,
    n: &Vector3,
) -> Result<Vector3, TrackError> {
    let ln = l.dot(n);
    if ln.abs() < f64::EPSILON {
        return Err(TrackError::ParallelToPlane);
    }
    let d = (p0 - l0).dot(n) / ln;
    Ok(l0 + d * l)
}

/// Point where `track` crosses the sensor plane of `strip`.
///
/// The track line passes through `(x0, y0, 0)` along [`StereoTrack::direction`].
pub fn track_sensor_intercept(
    strip: &StripCluster,
    track: &StereoTrack,
) -> Result<Vector3, TrackError> {
    let l0 = Vector3::new(
        track.intercept(View::Xz)?,
        track.intercept(View::Yz)?,
        0.0,
    );
    let l = track.direction()?;
    let trkpos = line_plane_intercept(&l, &l0, &strip.origin(), &strip.normal())?;
    trace!(
        "Track crosses {} at {:?} (l {:?}, l0 {:?})",
        strip.sensor_name(),
        trkpos,
        l,
        l0
    );
    Ok(trkpos)
}

/// Measured minus predicted coordinate along the strip's measured direction,
/// in the sensor frame.
pub fn u_residual(strip: &StripCluster, track: &StereoTrack) -> Result<f64, TrackError> {
    let trkpos = track_sensor_intercept(strip, track)?;
    let to_local = &strip.sensor.local_to_global;

    let predicted = to_local.inverse_transform_vector(&(trkpos - strip.origin()));
    let measured = to_local.inverse_transform_vector(&(strip.position - strip.origin()));

    let ures = measured.x - predicted.x;
    trace!(
        "ures {} on {}: measured {:?}, predicted {:?}",
        ures,
        strip.sensor_name(),
        measured,
        predicted
    );
    Ok(ures)
}

/// Length of the track direction vector scaled to reach depth `z`.
pub fn path_length(z: f64, track: &StereoTrack) -> Result<f64, TrackError> {
    let dir = track.direction()?;
    Ok((z / dir.z * dir).norm())
}
