//! Typed property values.

use serde::{Deserialize, Serialize};

use crate::transform::quat_from_euler;

/// Type tag of a property. `Bool` and `Text` are the discrete kinds.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar,
    Vec3,
    Rotation,
    Color,
    Bool,
    Text,
}

impl ValueKind {
    /// Discrete kinds never blend; they hold the start value until the end.
    #[inline]
    pub fn is_discrete(self) -> bool {
        matches!(self, ValueKind::Bool | ValueKind::Text)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    Scalar(f64),
    Vec3([f64; 3]),
    /// Unit quaternion (x, y, z, w)
    Rotation([f64; 4]),
    /// RGBA color
    Color([f64; 4]),
    Bool(bool),
    Text(String),
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Rotation(_) => ValueKind::Rotation,
            Value::Color(_) => ValueKind::Color,
            Value::Bool(_) => ValueKind::Bool,
            Value::Text(_) => ValueKind::Text,
        }
    }

    pub fn vec3(x: f64, y: f64, z: f64) -> Self {
        Value::Vec3([x, y, z])
    }

    pub fn identity_rotation() -> Self {
        Value::Rotation([0.0, 0.0, 0.0, 1.0])
    }

    /// Rotation from XYZ Euler angles in radians.
    pub fn rotation_euler(x: f64, y: f64, z: f64) -> Self {
        Value::Rotation(quat_from_euler([x, y, z]))
    }

    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Value::Color([r, g, b, a])
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<[f64; 3]> {
        match self {
            Value::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_rotation(&self) -> Option<[f64; 4]> {
        match self {
            Value::Rotation(q) => Some(*q),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(v)
    }
}

impl From<[f64; 3]> for Value {
    fn from(v: [f64; 3]) -> Self {
        Value::Vec3(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}
