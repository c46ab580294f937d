//! # straight-track
//!
//! Stereo space-point reconstruction and straight-line track fitting for
//! silicon strip telescopes, as used for alignment with straight-through
//! (field-off) beam data.
//!
//! Each detector layer carries an **axial** and a **stereo** strip sensor.
//! A strip cluster measures only one coordinate on its sensor; combining the
//! two clusters of a layer under a track hypothesis gives a 3-D space point.
//! Space points are fitted with straight lines in two projections, the hit
//! positions are refined along the fitted direction, and the result is
//! written as a text dump for the external alignment fit.
//!
//! ## Example
//!
//! ```no_run
//! use straight_track::fit::RegressionFitter;
//! use straight_track::gbl::{GblConfig, GblWriter};
//! use straight_track::refine::{refine_stereo_track, RefineConfig};
//! use straight_track::stereo::pair_strips;
//! use straight_track::strip::{StereoLayer, StripCluster};
//! use straight_track::track::StereoTrack;
//! use straight_track::Vector3;
//!
//! # fn run(layers: &[StereoLayer], axial: &[StripCluster], stereo: &[StripCluster]) -> anyhow::Result<()> {
//! // Seed the space points assuming tracks from the target
//! let pairs = pair_strips(layers, axial, stereo, Vector3::zeros())?;
//!
//! // Fit, then re-resolve the hits along the fitted direction
//! let refined = refine_stereo_track(
//!     &StereoTrack::new(pairs),
//!     &RegressionFitter,
//!     &RefineConfig::default(),
//! )?;
//!
//! let mut writer = GblWriter::create("straight_throughs.gbl", GblConfig::default())?;
//! writer.write_event(1, &[refined.track])?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! 1. **Pairing**: [`stereo::pair_strips`] matches each axial cluster with the
//!    cluster on its layer's stereo sensor and resolves the pair assuming a
//!    track from a fixed origin.
//! 2. **Fitting**: [`track::fit_stereo_track`] fits y versus z, then x versus
//!    the signed path length along the YZ line, with any [`fit::LineFitter`].
//! 3. **Refinement**: [`refine::refine_stereo_track`] re-resolves every pair
//!    along the fitted direction and refits until the hits stop moving.
//! 4. **Output**: [`gbl::GblWriter`] writes per-track slope/intercept and
//!    curvilinear parameters and per-strip residuals.
//!
//! All track values are immutable: fitting and re-resolving return new
//! values, so a stale position or fit can never be read through a handle
//! that was updated elsewhere.

pub mod curvilinear;
pub mod error;
pub mod fit;
pub mod gbl;
pub mod intercept;
pub mod refine;
pub mod scattering;
pub mod stereo;
pub mod strip;
pub mod track;

#[cfg(test)]
mod test_utils;

pub use curvilinear::{curvilinear_projection_matrix, project_parameters, CurvilinearParams};
pub use error::TrackError;
pub use fit::{LineFit, LineFitter, RegressionFitter, WeightedLineFitter};
pub use refine::{refine_stereo_track, RefineConfig, RefineResult};
pub use stereo::{pair_strips, resolve_stereo_position, Reference, StereoPair};
pub use strip::{Sensor, StereoLayer, StripCluster};
pub use track::{fit_axial_track, fit_stereo_track, AxialTrack, StereoTrack, Track, View};

// Commonly used types
pub type Vector3 = nalgebra::Vector3<f64>;
pub type Matrix3 = nalgebra::Matrix3<f64>;
pub type Matrix4 = nalgebra::Matrix4<f64>;
/// Rigid local-to-global sensor placement.
pub type Transform3D = nalgebra::Isometry3<f64>;
