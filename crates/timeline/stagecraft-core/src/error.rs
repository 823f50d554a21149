//! Error types for timeline construction and sampling.

use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;
use crate::value::ValueKind;

pub type StageResult<T> = Result<T, StageError>;

/// Every failure is raised synchronously at the offending call; nothing is
/// committed when one is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum StageError {
    /// Property not registered on the object
    #[error("Unknown property '{property}' on object {object}")]
    UnknownProperty { object: ObjectId, property: String },

    /// Negative or non-finite duration/offset
    #[error("Invalid duration: {value}")]
    InvalidDuration { value: f64 },

    /// Action name missing from the kind's registry
    #[error("Unknown action '{action}' for kind '{kind}'")]
    UnknownAction { kind: String, action: String },

    /// Attaching would close a loop in the attachment graph
    #[error("Attaching {child} to {parent} would create a cycle")]
    CycleDetected { child: ObjectId, parent: ObjectId },

    /// Socket not defined by the parent's kind
    #[error("Unknown socket '{socket}' on kind '{kind}'")]
    UnknownSocket { kind: String, socket: String },

    /// Object id was removed or never allocated
    #[error("Dangling reference to object {object}")]
    DanglingReference { object: ObjectId },

    #[error("Unknown object kind '{kind}'")]
    UnknownKind { kind: String },

    #[error("Object kind '{kind}' is already registered")]
    DuplicateKind { kind: String },

    /// Kind definition failed validation at registration
    #[error("Invalid kind '{kind}': {reason}")]
    InvalidKind { kind: String, reason: String },

    /// A property keeps the type tag of its first assignment
    #[error("Type mismatch on '{property}': expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        property: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("Property '{property}' cannot be animated")]
    NotAnimatable { property: String },

    #[error("Unknown mark '{name}'")]
    UnknownMark { name: String },

    /// Only raised under `OverlapPolicy::Reject`
    #[error(
        "Overlapping write on {object}.{property}: [{start}, {end}] intersects an existing animation"
    )]
    OverlappingWrite {
        object: ObjectId,
        property: String,
        start: f64,
        end: f64,
    },

    #[error("Time {at} precedes the latest attachment change at {head}")]
    TimeRewind { at: f64, head: f64 },

    /// Explicit attachment changes may not be scheduled past the clock
    #[error("Time {at} is ahead of the clock at {clock}")]
    AheadOfClock { at: f64, clock: f64 },

    #[error("Invalid grid: {reason}")]
    InvalidGrid { reason: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl StageError {
    /// Coarse grouping for host-side reporting.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownProperty { .. }
            | Self::TypeMismatch { .. }
            | Self::NotAnimatable { .. } => "property",
            Self::InvalidDuration { .. }
            | Self::OverlappingWrite { .. }
            | Self::TimeRewind { .. }
            | Self::AheadOfClock { .. } => "timing",
            Self::UnknownAction { .. }
            | Self::UnknownKind { .. }
            | Self::DuplicateKind { .. }
            | Self::InvalidKind { .. } => "registry",
            Self::CycleDetected { .. } | Self::UnknownSocket { .. } => "attachment",
            Self::DanglingReference { .. } => "object",
            Self::UnknownMark { .. } | Self::InvalidGrid { .. } => "layout",
            Self::Serialization { .. } => "serialization",
        }
    }

    pub(crate) fn dangling(object: ObjectId) -> Self {
        Self::DanglingReference { object }
    }
}

impl From<serde_json::Error> for StageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

/// Reject negative or non-finite durations and offsets.
pub(crate) fn check_duration(value: f64) -> StageResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(StageError::InvalidDuration { value })
    }
}
