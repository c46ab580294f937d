//! Synthetic telescope geometry shared by the unit tests.

use std::sync::Arc;

use nalgebra::{Translation3, UnitQuaternion};

use crate::stereo::StereoPair;
use crate::strip::{Sensor, StereoLayer, StripCluster};
use crate::{Transform3D, Vector3};

pub(crate) const STRIP_ERROR: f64 = 0.006;

/// Sensor at depth `z` whose measured direction is rotated by `angle` from +y.
pub(crate) fn sensor(name: &str, millepede_id: i32, layer: u32, is_top: bool, z: f64, angle: f64) -> Sensor {
    Sensor {
        name: name.to_string(),
        millepede_id,
        layer,
        is_top,
        local_to_global: Transform3D::from_parts(
            Translation3::new(0.0, 0.0, z),
            UnitQuaternion::from_axis_angle(
                &Vector3::z_axis(),
                std::f64::consts::FRAC_PI_2 + angle,
            ),
        ),
    }
}

/// Cluster left on `sensor` by a straight line through `point` along `dir`.
pub(crate) fn strip_through(sensor: &Arc<Sensor>, point: &Vector3, dir: &Vector3) -> StripCluster {
    let normal = sensor.local_to_global.transform_vector(&Vector3::z());
    let lambda = (sensor.origin() - point).dot(&normal) / dir.dot(&normal);
    let crossing = point + lambda * dir;
    let u = sensor.to_local(&crossing).x;
    StripCluster::from_local(sensor.clone(), u, STRIP_ERROR)
}

pub(crate) struct Telescope {
    pub layers: Vec<StereoLayer>,
}

impl Telescope {
    /// One axial sensor at `z_axial` and one stereo sensor at `z_stereo`.
    pub fn single_layer(z_axial: f64, z_stereo: f64, stereo_angle: f64) -> Self {
        Self {
            layers: vec![StereoLayer {
                axial: Arc::new(sensor("L1t_axial", 11101, 1, true, z_axial, 0.0)),
                stereo: Arc::new(sensor("L1t_stereo", 11102, 1, true, z_stereo, stereo_angle)),
            }],
        }
    }

    /// Five top-half layers, stereo sensor 10 mm behind its axial partner.
    pub fn default_top() -> Self {
        let layers = [100.0, 200.0, 300.0, 500.0, 700.0]
            .iter()
            .enumerate()
            .map(|(i, &z)| {
                let layer = i as u32 + 1;
                let id = 11100 + 10 * layer as i32;
                StereoLayer {
                    axial: Arc::new(sensor(&format!("L{layer}t_axial"), id + 1, layer, true, z, 0.0)),
                    stereo: Arc::new(sensor(
                        &format!("L{layer}t_stereo"),
                        id + 2,
                        layer,
                        true,
                        z + 10.0,
                        0.1,
                    )),
                }
            })
            .collect();
        Self { layers }
    }

    /// Clusters of layer `i` for a straight line from `origin` through `hit`.
    pub fn strips_from_origin(
        &self,
        i: usize,
        origin: &Vector3,
        hit: &Vector3,
    ) -> (StripCluster, StripCluster) {
        let dir = hit - origin;
        let layer = &self.layers[i];
        (
            strip_through(&layer.axial, origin, &dir),
            strip_through(&layer.stereo, origin, &dir),
        )
    }

    /// Stereo pairs for a line through `point` along `dir`, seeded from `seed_origin`.
    pub fn pairs_along(&self, point: &Vector3, dir: &Vector3, seed_origin: Vector3) -> Vec<StereoPair> {
        self.layers
            .iter()
            .map(|layer| {
                StereoPair::new(
                    strip_through(&layer.axial, point, dir),
                    strip_through(&layer.stereo, point, dir),
                    seed_origin,
                )
                .unwrap()
            })
            .collect()
    }
}
