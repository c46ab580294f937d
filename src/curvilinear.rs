//! Curvilinear frame projection for track-based alignment.
//!
//! The curvilinear frame `(U, V, T)` is attached to the track direction `T`:
//!
//! ```text
//! J = (T × Z) / |T × Z|,   U = −J,   V = T × U
//! ```
//!
//! The projection matrix has rows `U`, `V`, `T` expressed in the fixed
//! detector axes `(X, Y, Z)`, i.e. element `(i, j)` is the dot product of the
//! j-th detector axis with the i-th curvilinear axis. The frame is undefined
//! for tracks parallel to `Z`.

use tracing::trace;

use crate::error::TrackError;
use crate::{Matrix3, Matrix4, Vector3};

/// Smallest `|T × Z|` accepted when building the frame.
const MIN_TRANSVERSE: f64 = 1e-12;

/// Track parameters in the curvilinear frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvilinearParams {
    pub x_t: f64,
    pub y_t: f64,
    pub x_t_prime: f64,
    pub y_t_prime: f64,
}

impl CurvilinearParams {
    /// `[xT, yT, xT', yT']`
    pub fn to_array(&self) -> [f64; 4] {
        [self.x_t, self.y_t, self.x_t_prime, self.y_t_prime]
    }
}

/// Direction vector built from the two track slopes.
///
/// Returns `(dxdz, dydz, 1 − sqrt(dxdz² + dydz²))`. This is the convention of
/// the alignment output and is not a unit vector.
#[inline]
pub fn slope_direction(dxdz: f64, dydz: f64) -> Vector3 {
    Vector3::new(dxdz, dydz, 1.0 - (dxdz * dxdz + dydz * dydz).sqrt())
}

/// Rotation from the detector frame to the curvilinear frame of `dir`.
///
/// `dir` is normalized before use, so the result is orthogonal for any
/// direction not parallel to `Z`.
///
/// # Errors
///
/// [`TrackError::DirectionAlongAxis`] if `dir` is zero or parallel to `Z`.
pub fn curvilinear_projection_matrix(dir: &Vector3) -> Result<Matrix3, TrackError> {
    let norm = dir.norm();
    if norm < MIN_TRANSVERSE {
        return Err(TrackError::DirectionAlongAxis);
    }
    let t = dir / norm;

    let t_cross_z = t.cross(&Vector3::z());
    let transverse = t_cross_z.norm();
    if transverse < MIN_TRANSVERSE {
        return Err(TrackError::DirectionAlongAxis);
    }

    let j = t_cross_z / transverse;
    let u = -j;
    let v = t.cross(&u);

    let trans = Matrix3::from_rows(&[u.transpose(), v.transpose(), t.transpose()]);
    trace!("U {:?} V {:?} T {:?} projection {}", u, v, t, trans);
    Ok(trans)
}

/// Curvilinear position of the point `(x0, y0, 0)` for a track along `dir`.
pub fn curvilinear_position(x0: f64, y0: f64, dir: &Vector3) -> Result<Vector3, TrackError> {
    let trans = curvilinear_projection_matrix(dir)?;
    Ok(trans * Vector3::new(x0, y0, 0.0))
}

/// Project slope-intercept parameters into the curvilinear frame.
///
/// The frame is built from [`slope_direction`]`(dxdz, dydz)`. The position
/// `(x0, y0, 0)` and the slope vector `(dxdz, dydz, 1)` are rotated with the
/// same matrix and their first two components returned.
pub fn project_parameters(
    x0: f64,
    y0: f64,
    dxdz: f64,
    dydz: f64,
) -> Result<CurvilinearParams, TrackError> {
    let trans = curvilinear_projection_matrix(&slope_direction(dxdz, dydz))?;
    let position = trans * Vector3::new(x0, y0, 0.0);
    let slope = trans * Vector3::new(dxdz, dydz, 1.0);

    Ok(CurvilinearParams {
        x_t: position.x,
        y_t: position.y,
        x_t_prime: slope.x,
        y_t_prime: slope.y,
    })
}

/// Jacobian `d(xT, yT, xT', yT') / d(xT, yT, xT', yT')` for a straight step `ds`.
pub fn transport_jacobian(ds: f64) -> Matrix4 {
    let mut jacobian = Matrix4::identity();
    jacobian[(0, 2)] = ds;
    jacobian[(1, 3)] = ds;
    jacobian
}
