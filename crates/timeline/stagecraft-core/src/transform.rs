//! Rigid transforms (position + rotation) and quaternion helpers.
//!
//! Quaternions are stored as `[x, y, z, w]` arrays so they serialize the same
//! way as `Value::Rotation`; the math is delegated to nalgebra.

use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

const IDENTITY_QUAT: [f64; 4] = [0.0, 0.0, 0.0, 1.0];

/// Convert an `[x, y, z, w]` array into a unit quaternion.
/// A zero-length input maps to the identity.
pub fn to_unit_quat(q: [f64; 4]) -> UnitQuaternion<f64> {
    let raw = Quaternion::new(q[3], q[0], q[1], q[2]);
    if raw.norm_squared() <= f64::EPSILON {
        return UnitQuaternion::identity();
    }
    UnitQuaternion::new_normalize(raw)
}

pub fn from_unit_quat(q: &UnitQuaternion<f64>) -> [f64; 4] {
    [q.i, q.j, q.k, q.w]
}

/// XYZ Euler angles (radians) to quaternion.
pub fn quat_from_euler(euler: [f64; 3]) -> [f64; 4] {
    from_unit_quat(&UnitQuaternion::from_euler_angles(euler[0], euler[1], euler[2]))
}

/// Hamilton product `a ∘ b` (apply `b` first, then `a`).
pub fn quat_mul(a: [f64; 4], b: [f64; 4]) -> [f64; 4] {
    from_unit_quat(&(to_unit_quat(a) * to_unit_quat(b)))
}

/// An object's placement: translation plus rotation. Scale is a plain
/// property and does not propagate through attachments.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f64; 3],
    /// Quaternion (x, y, z, w)
    pub rotation: [f64; 4],
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: [0.0; 3],
        rotation: IDENTITY_QUAT,
    };

    pub fn new(position: [f64; 3], rotation: [f64; 4]) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: [f64; 3]) -> Self {
        Self {
            position,
            rotation: IDENTITY_QUAT,
        }
    }

    pub fn from_euler(position: [f64; 3], euler: [f64; 3]) -> Self {
        Self {
            position,
            rotation: quat_from_euler(euler),
        }
    }

    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::new(self.position[0], self.position[1], self.position[2]),
            to_unit_quat(self.rotation),
        )
    }

    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        let t = iso.translation.vector;
        Self {
            position: [t.x, t.y, t.z],
            rotation: from_unit_quat(&iso.rotation),
        }
    }

    /// `self ∘ other`: `other` expressed in `self`'s frame.
    pub fn compose(&self, other: &Transform) -> Transform {
        Self::from_isometry(&(self.to_isometry() * other.to_isometry()))
    }

    pub fn inverse(&self) -> Transform {
        Self::from_isometry(&self.to_isometry().inverse())
    }

    pub fn transform_point(&self, p: [f64; 3]) -> [f64; 3] {
        let v = self.to_isometry() * nalgebra::Point3::from(Vector3::new(p[0], p[1], p[2]));
        [v.x, v.y, v.z]
    }
}
