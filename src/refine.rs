//! Iterative refinement of stereo hit positions.
//!
//! Stereo pairs are first resolved assuming a track from a fixed origin. Once
//! a track has been fitted, its direction is a better hypothesis: each pass
//! re-resolves every pair along the current direction and refits the track,
//! until the mean hit displacement drops below a threshold.

use tracing::{debug, trace};

use crate::error::TrackError;
use crate::fit::LineFitter;
use crate::stereo::StereoPair;
use crate::track::{fit_stereo_track, StereoTrack};

/// Parameters controlling [`refine_stereo_track`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefineConfig {
    /// Stop once the mean hit displacement of a pass is at or below this (mm).
    /// Default 0.05.
    pub max_mean_shift_mm: f64,
    /// Maximum number of re-resolve and refit passes; 0 is treated as 1.
    /// Default 20.
    pub max_iterations: u32,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            max_mean_shift_mm: 0.05,
            max_iterations: 20,
        }
    }
}

// ── Refinement result ───────────────────────────────────────────────────────

/// Outcome of [`refine_stereo_track`].
#[derive(Debug, Clone)]
pub struct RefineResult {
    /// Refitted track with re-resolved pairs.
    pub track: StereoTrack,
    /// Number of passes performed.
    pub iterations: u32,
    /// Mean hit displacement of the last pass in mm.
    pub mean_shift_mm: f64,
    /// Whether the last pass met [`RefineConfig::max_mean_shift_mm`].
    pub converged: bool,
}

/// Mean distance between corresponding pair positions.
fn mean_shift(before: &[StereoPair], after: &[StereoPair]) -> f64 {
    if before.is_empty() {
        return 0.0;
    }
    let total: f64 = before
        .iter()
        .zip(after)
        .map(|(old, new)| (old.position() - new.position()).norm())
        .sum();
    total / before.len() as f64
}

// ── Main refinement entry point ─────────────────────────────────────────────

/// Re-resolve the pairs of `track` along its fitted direction until stable.
///
/// An unfitted track is fitted with `fitter` first. At least one pass is
/// always made. Running out of iterations is not an error; check
/// [`RefineResult::converged`].
///
/// # Errors
///
/// Any error from fitting or from re-resolving a pair.
pub fn refine_stereo_track(
    track: &StereoTrack,
    fitter: &dyn LineFitter,
    config: &RefineConfig,
) -> Result<RefineResult, TrackError> {
    let mut track = if track.is_fitted() {
        track.clone()
    } else {
        fit_stereo_track(fitter, track)?
    };

    let max_iterations = config.max_iterations.max(1);
    let mut iterations = 0;
    let mut shift = f64::INFINITY;
    while iterations < max_iterations {
        let direction = track.direction()?;
        let pairs = track
            .pairs()
            .iter()
            .map(|pair| pair.resolved_along(direction))
            .collect::<Result<Vec<_>, _>>()?;

        shift = mean_shift(track.pairs(), &pairs);
        iterations += 1;
        trace!("  pass {}: direction {:?} mean shift {:.6} mm", iterations, direction, shift);

        track = fit_stereo_track(fitter, &StereoTrack::new(pairs))?;
        if shift <= config.max_mean_shift_mm {
            break;
        }
    }

    let converged = shift <= config.max_mean_shift_mm;
    debug!(
        "Refined stereo track after {} passes: mean shift {:.4} mm ({})",
        iterations,
        shift,
        if converged { "converged" } else { "not converged" }
    );

    Ok(RefineResult {
        track,
        iterations,
        mean_shift_mm: shift,
        converged,
    })
}

// ── Tests ───────────────────────────────────────────────────────────────────
