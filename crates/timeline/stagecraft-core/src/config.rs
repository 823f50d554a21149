//! Stage configuration.

use serde::{Deserialize, Serialize};

use crate::interp::Interpolation;

/// What to do when two Animations on one property have overlapping windows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlapPolicy {
    /// Accept the write; at sampling time the Animation with the later start
    /// wins (ties go to the one appended last).
    #[default]
    LaterStartWins,
    /// Treat the overlap as a caller error (`StageError::OverlappingWrite`).
    Reject,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub overlap_policy: OverlapPolicy,
    /// Tolerance applied to window boundaries when detecting overlaps, so a
    /// segment starting exactly where another ends is not an overlap.
    pub time_epsilon: f64,
    /// Default sample rate (Hz) for baking.
    pub frame_rate: f64,
    /// Interpolation stamped on builder output unless overridden.
    pub default_interpolation: Interpolation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overlap_policy: OverlapPolicy::default(),
            time_epsilon: 1e-9,
            frame_rate: 24.0,
            default_interpolation: Interpolation::Linear,
        }
    }
}
