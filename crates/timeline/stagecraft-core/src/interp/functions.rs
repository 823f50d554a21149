//! Interpolation helpers:
//! - lerp for scalars, vectors and colors (component-wise)
//! - quaternion slerp with shortest-arc sign correction (NLERP fallback)
//! - cubic-bezier timing used by `Smooth`/`Bezier`

use crate::interp::Interpolation;
use crate::transform::{from_unit_quat, to_unit_quat};
use crate::value::Value;
use nalgebra::UnitQuaternion;

const SLERP_EPSILON: f64 = 1e-9;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec3(a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
    [lerp_f64(a[0], b[0], t), lerp_f64(a[1], b[1], t), lerp_f64(a[2], b[2], t)]
}

#[inline]
pub fn lerp_vec4(a: [f64; 4], b: [f64; 4], t: f64) -> [f64; 4] {
    [
        lerp_f64(a[0], b[0], t),
        lerp_f64(a[1], b[1], t),
        lerp_f64(a[2], b[2], t),
        lerp_f64(a[3], b[3], t),
    ]
}

#[inline]
fn dot4(a: [f64; 4], b: [f64; 4]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

#[inline]
fn normalize4(mut q: [f64; 4]) -> [f64; 4] {
    let len2 = dot4(q, q);
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        for c in &mut q {
            *c *= inv_len;
        }
    }
    q
}

/// Quaternion NLERP with shortest-arc correction.
/// If dot < 0, negate the second quaternion to ensure the shortest path.
#[inline]
pub fn nlerp_quat(a: [f64; 4], mut b: [f64; 4], t: f64) -> [f64; 4] {
    if dot4(a, b) < 0.0 {
        b = [-b[0], -b[1], -b[2], -b[3]];
    }
    normalize4(lerp_vec4(a, b, t))
}

/// Quaternion SLERP along the shortest arc. Nearly-parallel inputs, where the
/// slerp weights degenerate, fall back to NLERP.
pub fn slerp_quat(a: [f64; 4], b: [f64; 4], t: f64) -> [f64; 4] {
    let qa = to_unit_quat(a);
    let mut qb = to_unit_quat(b);
    if qa.coords.dot(&qb.coords) < 0.0 {
        qb = UnitQuaternion::new_unchecked(-qb.into_inner());
    }
    match qa.try_slerp(&qb, t, SLERP_EPSILON) {
        Some(q) => from_unit_quat(&q),
        None => nlerp_quat(from_unit_quat(&qa), from_unit_quat(&qb), t),
    }
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Given control points (x1, y1, x2, y2) and an input t in [0,1],
/// compute the eased y by inverting the x bezier via binary search.
pub fn bezier_ease(t: f64, ctrl: [f64; 4]) -> f64 {
    let [x1, y1, x2, y2] = ctrl;
    let t = t.clamp(0.0, 1.0);
    // Bezier(0,0,1,1) is exactly linear
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    // Monotonic X in [0,1] assumed for x1/x2 ∈ [0,1]
    let mut lo = 0.0f64;
    let mut hi = 1.0f64;
    let mut mid = t;
    for _ in 0..48 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-12 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

/// Blend two values of the same kind at fraction `u`.
///
/// Discrete kinds and `Interpolation::Step` hold `a` until `u` reaches 1.
/// Rotations take the shortest arc; everything else is component-wise.
/// Mismatched kinds fail soft and return `a`; callers validate kinds first.
pub fn interpolate(a: &Value, b: &Value, u: f64, kind: Interpolation) -> Value {
    if u >= 1.0 {
        return b.clone();
    }
    if kind == Interpolation::Step || a.kind().is_discrete() {
        return a.clone();
    }
    let t = kind.ease(u);
    match (a, b) {
        (Value::Scalar(va), Value::Scalar(vb)) => Value::Scalar(lerp_f64(*va, *vb, t)),
        (Value::Vec3(va), Value::Vec3(vb)) => Value::Vec3(lerp_vec3(*va, *vb, t)),
        (Value::Color(ca), Value::Color(cb)) => Value::Color(lerp_vec4(*ca, *cb, t)),
        (Value::Rotation(qa), Value::Rotation(qb)) => Value::Rotation(slerp_quat(*qa, *qb, t)),
        _ => a.clone(),
    }
}
