//! Stereo space-point reconstruction.
//!
//! An axial and a stereo strip cluster each measure one coordinate on their
//! own sensor plane. The position along the strip is ambiguous until the two
//! measurements are combined with an assumed track hypothesis:
//!
//! - [`Reference::Origin`]: the track is assumed to come from a known point
//!   (used for seeding, before any direction is known).
//! - [`Reference::Direction`]: the track is assumed to cross the two planes
//!   along a known direction (used for iterative refinement).
//!
//! Both hypotheses go through [`resolve_stereo_position`], so the cluster
//! ordering, sensor orientation fixup and stereo angle are always computed
//! the same way.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::TrackError;
use crate::strip::{StereoLayer, StripCluster};
use crate::Vector3;

/// Tolerance for the stereo angle and normal-projection degeneracy checks.
pub const DEGENERACY_TOLERANCE: f64 = 1e-4;

/// Track hypothesis used to resolve a stereo pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reference {
    /// Straight line from this point through both sensors.
    Origin(Vector3),
    /// Straight line along this direction. Need not be normalized.
    Direction(Vector3),
}

/// Orientation of one sensor as used by the resolver.
struct SensorFrame {
    /// Sensor center relative to the anchor point.
    origin: Vector3,
    u: Vector3,
    v: Vector3,
    w: Vector3,
}

impl SensorFrame {
    /// Build the frame with its normal pointing away from `anchor`.
    ///
    /// When the normal points back towards the anchor the frame is rotated by
    /// pi around u: v is flipped and the normal recomputed.
    fn oriented(strip: &StripCluster, anchor: &Vector3) -> Self {
        let origin = strip.origin() - anchor;
        let u = strip.measured_dir;
        let mut v = strip.unmeasured_dir;
        let mut w = u.cross(&v);
        if w.dot(&origin) < 0.0 {
            v = -v;
            w = u.cross(&v);
        }
        Self { origin, u, v, w }
    }
}

/// Return the two clusters ordered by increasing z.
pub fn order_by_z<'a>(
    a: &'a StripCluster,
    b: &'a StripCluster,
) -> (&'a StripCluster, &'a StripCluster) {
    if a.position.z > b.position.z {
        (b, a)
    } else {
        (a, b)
    }
}

/// Resolve the 3-D position of a stereo hit from two strip clusters.
///
/// The clusters may be given in any order; the one with smaller z is used as
/// the first sensor. The result is in the same global frame as the inputs.
///
/// # Errors
///
/// - [`TrackError::ParallelStrips`] if `|sin(stereo angle)|` is below
///   [`DEGENERACY_TOLERANCE`].
/// - [`TrackError::DegenerateNormal`] if the first sensor plane contains the
///   reference point, the direction lies in the first sensor plane, or (in
///   origin mode) the second sensor plane contains the origin.
pub fn resolve_stereo_position(
    reference: Reference,
    a: &StripCluster,
    b: &StripCluster,
) -> Result<Vector3, TrackError> {
    let (s1, s2) = order_by_z(a, b);

    let anchor = match reference {
        Reference::Origin(origin) => origin,
        Reference::Direction(_) => Vector3::zeros(),
    };
    let f1 = SensorFrame::oriented(s1, &anchor);
    let f2 = SensorFrame::oriented(s2, &anchor);

    trace!(
        "o1 {:?} u1 {:?} v1 {:?} w1 {:?}",
        f1.origin, f1.u, f1.v, f1.w
    );
    trace!(
        "o2 {:?} u2 {:?} v2 {:?} w2 {:?}",
        f2.origin, f2.u, f2.v, f2.w
    );

    let sin_alpha = f1.v.dot(&f2.u);
    if sin_alpha.abs() < DEGENERACY_TOLERANCE {
        return Err(TrackError::ParallelStrips { sin_alpha });
    }

    let depth1 = f1.origin.dot(&f1.w);
    if depth1.abs() < DEGENERACY_TOLERANCE {
        return Err(TrackError::DegenerateNormal { projection: depth1 });
    }

    let position = match reference {
        Reference::Origin(origin) => {
            // Measured strip centers relative to the origin
            let p1 = s1.position - origin;
            let p2 = s2.position - origin;

            // Ratio of the sensor distances from the origin
            let gamma = f2.origin.dot(&f2.w) / depth1;
            if gamma.abs() < DEGENERACY_TOLERANCE {
                return Err(TrackError::DegenerateNormal { projection: gamma });
            }

            let dp = p2 - gamma * p1;
            let p1_v = dp.dot(&f2.u) / (gamma * sin_alpha);
            let r1 = p1 + p1_v * f1.v;
            trace!("sinAlpha {sin_alpha} gamma {gamma} p1_v {p1_v} r1 {r1:?}");

            // Half-way between the sensors along the ray from the origin
            origin + 0.5 * (1.0 + gamma) * r1
        }
        Reference::Direction(t) => {
            let wt = f1.w.dot(&t);
            if wt.abs() < DEGENERACY_TOLERANCE {
                return Err(TrackError::DegenerateNormal { projection: wt });
            }

            // Distance between the sensor planes along the track
            let gamma = f1.w.dot(&(f2.origin - f1.origin)) / wt;

            // Residual between the measured and extrapolated position on sensor 2
            let p1_prime = s1.position + gamma * t;
            let dp = s2.position - p1_prime;
            let p1_v = dp.dot(&f2.u) / sin_alpha;
            let r1 = s1.position + p1_v * f1.v;
            trace!("sinAlpha {sin_alpha} gamma {gamma} p1_v {p1_v} r1 {r1:?}");

            r1 + 0.5 * gamma * t
        }
    };

    debug!(
        "Stereo hit {} + {} → ({:.4}, {:.4}, {:.4})",
        s1.sensor_name(),
        s2.sensor_name(),
        position.x,
        position.y,
        position.z
    );

    Ok(position)
}

/// An axial and a stereo cluster together with their resolved position.
///
/// The position is a snapshot for the hypothesis it was resolved with. A new
/// direction estimate produces a new pair through [`StereoPair::resolved_along`].
#[derive(Debug, Clone)]
pub struct StereoPair {
    axial: StripCluster,
    stereo: StripCluster,
    position: Vector3,
}

impl StereoPair {
    /// Pair two clusters assuming a track from `origin`.
    pub fn new(
        axial: StripCluster,
        stereo: StripCluster,
        origin: Vector3,
    ) -> Result<Self, TrackError> {
        let position = resolve_stereo_position(Reference::Origin(origin), &axial, &stereo)?;
        Ok(Self {
            axial,
            stereo,
            position,
        })
    }

    /// Re-resolve the pair for a track along `direction`.
    pub fn resolved_along(&self, direction: Vector3) -> Result<Self, TrackError> {
        let position =
            resolve_stereo_position(Reference::Direction(direction), &self.axial, &self.stereo)?;
        Ok(Self {
            axial: self.axial.clone(),
            stereo: self.stereo.clone(),
            position,
        })
    }

    pub fn axial(&self) -> &StripCluster {
        &self.axial
    }

    pub fn stereo(&self) -> &StripCluster {
        &self.stereo
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// Both clusters ordered by increasing z.
    pub fn strips_by_z(&self) -> [&StripCluster; 2] {
        let (first, second) = order_by_z(&self.axial, &self.stereo);
        [first, second]
    }
}

/// Clusters grouped by the name of the sensor they were found on.
fn hits_by_sensor(hits: &[StripCluster]) -> HashMap<&str, Vec<&StripCluster>> {
    let mut map: HashMap<&str, Vec<&StripCluster>> = HashMap::new();
    for hit in hits {
        map.entry(hit.sensor_name()).or_default().push(hit);
    }
    map
}

/// Build stereo pairs from the axial and stereo clusters of one event.
///
/// Each axial cluster is matched to the cluster on its layer's stereo sensor.
/// A layer is only used when its axial and its stereo sensor each carry
/// exactly one cluster; with more, the axial/stereo association is ambiguous
/// and the layer is skipped. Layers missing either cluster are skipped too.
///
/// # Errors
///
/// [`TrackError::NoStereoSensor`] if an axial cluster's sensor is not part of
/// any layer, or any error from [`resolve_stereo_position`].
pub fn pair_strips(
    layers: &[StereoLayer],
    axial_hits: &[StripCluster],
    stereo_hits: &[StripCluster],
    origin: Vector3,
) -> Result<Vec<StereoPair>, TrackError> {
    let axial_by_sensor = hits_by_sensor(axial_hits);
    let stereo_by_sensor = hits_by_sensor(stereo_hits);

    let mut pairs = Vec::new();
    for axial in axial_hits {
        let layer = layers
            .iter()
            .find(|l| l.axial.name == axial.sensor.name)
            .ok_or_else(|| TrackError::NoStereoSensor(axial.sensor.name.clone()))?;

        let n_axial = axial_by_sensor.get(axial.sensor_name()).map_or(0, Vec::len);
        if n_axial != 1 {
            debug!("Skipping \"{}\": {} axial hits", layer.axial.name, n_axial);
            continue;
        }

        let stereo = match stereo_by_sensor.get(layer.stereo.name.as_str()) {
            Some(hits) if hits.len() == 1 => hits[0],
            Some(hits) => {
                debug!("Skipping \"{}\": {} stereo hits", layer.stereo.name, hits.len());
                continue;
            }
            None => {
                debug!("No stereo hit on \"{}\"", layer.stereo.name);
                continue;
            }
        };

        pairs.push(StereoPair::new(axial.clone(), stereo.clone(), origin)?);
    }

    debug!(
        "Paired {} stereo hits from {} axial and {} stereo clusters",
        pairs.len(),
        axial_hits.len(),
        stereo_hits.len()
    );
    Ok(pairs)
}
