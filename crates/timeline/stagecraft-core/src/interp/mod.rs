//! Interpolation kinds and the per-type blend functions.

pub mod functions;

use serde::{Deserialize, Serialize};

pub use functions::interpolate;

/// Default cubic-bezier control points for `Smooth` (ease-in-out).
pub const SMOOTH_CTRL: [f64; 4] = [0.42, 0.0, 0.58, 1.0];

/// How an Animation maps its fraction `u ∈ [0,1]` onto the value range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ctrl")]
pub enum Interpolation {
    #[default]
    Linear,
    /// Hold the start value until the window ends.
    Step,
    /// Ease-in-out, equivalent to `Bezier(SMOOTH_CTRL)`.
    Smooth,
    /// Cubic-bezier timing curve with control points (x1, y1, x2, y2).
    Bezier([f64; 4]),
}

impl Interpolation {
    /// Reshape `u` according to the timing curve. `Step` is handled by the
    /// caller and passes `u` through unchanged.
    pub fn ease(&self, u: f64) -> f64 {
        let u = u.clamp(0.0, 1.0);
        match self {
            Interpolation::Linear | Interpolation::Step => u,
            Interpolation::Smooth => functions::bezier_ease(u, SMOOTH_CTRL),
            Interpolation::Bezier(ctrl) => functions::bezier_ease(u, *ctrl),
        }
    }
}
