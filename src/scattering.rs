//! Multiple Coulomb scattering estimates for straight tracks.

use tracing::trace;

use crate::error::TrackError;
use crate::track::StereoTrack;

/// Sensor thickness in radiation lengths.
pub const SENSOR_THICKNESS_X0: f64 = 0.7e-2 * 0.5;
/// Nominal beam energy in GeV, used as the track momentum.
pub const BEAM_ENERGY_GEV: f64 = 1.05;

/// Highland estimate of the RMS plane scattering angle (radians) for
/// momentum `p` (GeV) through `radlength` radiation lengths.
#[inline]
pub fn ms_angle(p: f64, radlength: f64) -> f64 {
    (0.0136 / p) * radlength.sqrt() * (1.0 + 0.038 * radlength.ln())
}

/// Material traversed by `track` crossing a sensor of thickness
/// `thickness_x0` (radiation lengths) normal to z.
pub fn traversed_material(track: &StereoTrack, thickness_x0: f64) -> Result<f64, TrackError> {
    let dir = track.direction()?;
    let thickness = (thickness_x0 / dir.z * dir).norm();
    trace!(
        "Material {} X0 for direction {:?} (sensor {} X0)",
        thickness,
        dir,
        thickness_x0
    );
    Ok(thickness)
}

/// Expected scattering angle of `track` in one sensor.
pub fn scattering_angle(
    track: &StereoTrack,
    momentum_gev: f64,
    thickness_x0: f64,
) -> Result<f64, TrackError> {
    Ok(ms_angle(momentum_gev, traversed_material(track, thickness_x0)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::RegressionFitter;
    use crate::test_utils::Telescope;
    use crate::track::fit_stereo_track;
    use crate::Vector3;

    #[test]
    fn test_ms_angle_highland() {
        // 1 GeV through 1% X0
        let angle = ms_angle(1.0, 0.01);
        let expected = 0.0136 * 0.1 * (1.0 + 0.038 * 0.01_f64.ln());
        assert!((angle - expected).abs() < 1e-15);
        assert!((angle - 1.1220e-3).abs() < 1e-6, "angle {angle}");

        // Inverse in momentum
        assert!((ms_angle(2.0, 0.01) * 2.0 - angle).abs() < 1e-15);
    }

    #[test]
    fn test_traversed_material_inclined() {
        let tel = Telescope::default_top();
        let pairs = tel.pairs_along(&Vector3::zeros(), &Vector3::new(0.0, 0.1, 1.0), Vector3::zeros());
        let track = fit_stereo_track(&RegressionFitter, &StereoTrack::new(pairs)).unwrap();

        let dir = track.direction().unwrap();
        let material = traversed_material(&track, SENSOR_THICKNESS_X0).unwrap();
        assert!(material > SENSOR_THICKNESS_X0);
        assert!((material - SENSOR_THICKNESS_X0 * dir.norm() / dir.z).abs() < 1e-15);

        let angle = scattering_angle(&track, BEAM_ENERGY_GEV, SENSOR_THICKNESS_X0).unwrap();
        assert!((angle - ms_angle(BEAM_ENERGY_GEV, material)).abs() < 1e-15);
    }

    #[test]
    fn test_material_needs_fit() {
        let track = StereoTrack::new(Vec::new());
        assert!(traversed_material(&track, SENSOR_THICKNESS_X0).is_err());
    }
}
