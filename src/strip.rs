//! Strip sensors and the 1-D cluster measurements made on them.
//!
//! A [`StripCluster`] only constrains the coordinate along its sensor's
//! measured direction. Two clusters on sensors whose strips cross at a small
//! angle are combined into a 3-D space point in [`crate::stereo`].
//!
//! # Coordinate conventions
//!
//! - **Global frame**: z along the beam, all positions in mm.
//! - **Sensor frame**: origin at the sensor center, local x = measured
//!   direction (u), local y = unmeasured direction (v), local z = normal (w).

use std::fmt;
use std::sync::Arc;

use nalgebra::Point3;

use crate::{Transform3D, Vector3};

/// A silicon strip sensor as seen by the reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    /// Unique sensor name, e.g. `"module_L1t_halfmodule_axial_sensor0"`.
    pub name: String,
    /// Sensor identifier used by the alignment fit.
    pub millepede_id: i32,
    /// Layer number, counted from the target.
    pub layer: u32,
    /// Whether the sensor belongs to the top detector half.
    pub is_top: bool,
    /// Sensor-to-global transform.
    pub local_to_global: Transform3D,
}

impl Sensor {
    /// Sensor center in the global frame.
    pub fn origin(&self) -> Vector3 {
        self.local_to_global.transform_point(&Point3::origin()).coords
    }

    /// Measured direction (local x) in the global frame.
    pub fn measured_dir(&self) -> Vector3 {
        self.local_to_global.transform_vector(&Vector3::x())
    }

    /// Unmeasured direction (local y) in the global frame.
    pub fn unmeasured_dir(&self) -> Vector3 {
        self.local_to_global.transform_vector(&Vector3::y())
    }

    /// Express a global point in the sensor frame.
    pub fn to_local(&self, global: &Vector3) -> Vector3 {
        self.local_to_global
            .inverse_transform_point(&Point3::from(*global))
            .coords
    }
}

/// A 1-D position measurement on a strip sensor.
#[derive(Debug, Clone)]
pub struct StripCluster {
    /// Measured strip position in the global frame. The unmeasured
    /// coordinate is the strip center.
    pub position: Vector3,
    /// Unit vector along the measured coordinate.
    pub measured_dir: Vector3,
    /// Unit vector along the strip.
    pub unmeasured_dir: Vector3,
    /// One-sigma uncertainty of the measured coordinate, in mm.
    pub u_error: f64,
    /// Sensor the cluster was found on.
    pub sensor: Arc<Sensor>,
}

impl StripCluster {
    /// Build a cluster from a local measured coordinate `u` on `sensor`.
    pub fn from_local(sensor: Arc<Sensor>, u: f64, u_error: f64) -> Self {
        let position = sensor
            .local_to_global
            .transform_point(&Point3::new(u, 0.0, 0.0))
            .coords;
        Self {
            position,
            measured_dir: sensor.measured_dir(),
            unmeasured_dir: sensor.unmeasured_dir(),
            u_error,
            sensor,
        }
    }

    /// Center of the owning sensor in the global frame.
    pub fn origin(&self) -> Vector3 {
        self.sensor.origin()
    }

    /// Sensor normal, `u × v`.
    pub fn normal(&self) -> Vector3 {
        self.measured_dir.cross(&self.unmeasured_dir)
    }

    /// Measured coordinate in the sensor frame.
    pub fn local_u(&self) -> f64 {
        self.sensor.to_local(&self.position).x
    }

    pub fn is_top(&self) -> bool {
        self.sensor.is_top
    }

    pub fn sensor_name(&self) -> &str {
        &self.sensor.name
    }
}

impl fmt::Display for StripCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}, {:.6}) ({})",
            self.position.x,
            self.position.y,
            self.position.z,
            self.sensor.name
        )
    }
}

/// The axial and stereo sensors of one detector layer.
#[derive(Debug, Clone)]
pub struct StereoLayer {
    pub axial: Arc<Sensor>,
    pub stereo: Arc<Sensor>,
}
