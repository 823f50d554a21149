//! Named composite actions ("create", "destroy", ...) registered per object kind.
//!
//! An action is a set of tracks in normalized time. Playing it over a window
//! `[s, s + d]` maps every pair of consecutive keys onto one Animation
//! segment; the first segment departs from the property's current value at
//! `at = 0`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;
use crate::interp::Interpolation;
use crate::timeline::Animation;
use crate::value::Value;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionKey {
    /// Normalized time in [0,1] within the action window.
    pub at: f64,
    pub value: Value,
    /// Timing of the segment arriving at this key.
    #[serde(default)]
    pub interpolation: Option<Interpolation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionTrack {
    pub property: String,
    pub keys: Vec<ActionKey>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionTemplate {
    pub tracks: Vec<ActionTrack>,
}

impl ActionTrack {
    /// Validate basic invariants (stamps finite, in [0,1], non-decreasing, one kind).
    pub fn validate_basic(&self) -> Result<(), String> {
        let mut last = -f64::INFINITY;
        for key in &self.keys {
            if !key.at.is_finite() || key.at < 0.0 || key.at > 1.0 {
                return Err(format!(
                    "action key stamp must be in [0,1] for '{}'",
                    self.property
                ));
            }
            if key.at < last {
                return Err(format!(
                    "action key stamps must be non-decreasing for '{}'",
                    self.property
                ));
            }
            last = key.at;
        }
        if let Some(first) = self.keys.first() {
            let kind = first.value.kind();
            if self.keys.iter().any(|k| k.value.kind() != kind) {
                return Err(format!("action keys for '{}' mix value kinds", self.property));
            }
        }
        Ok(())
    }

    /// Expand into absolutely-timed segments. `from` is the property's value
    /// when the action starts.
    pub fn segments(
        &self,
        target: ObjectId,
        from: &Value,
        start: f64,
        duration: f64,
        fallback: Interpolation,
    ) -> Vec<Animation> {
        let mut out = Vec::with_capacity(self.keys.len());
        let mut prev_at = 0.0;
        let mut prev_value = from.clone();
        for key in &self.keys {
            let seg_start = start + prev_at * duration;
            out.push(Animation {
                target,
                property: self.property.clone(),
                start_value: prev_value,
                end_value: key.value.clone(),
                start: seg_start,
                duration: (key.at - prev_at) * duration,
                interpolation: key.interpolation.unwrap_or(fallback),
            });
            prev_at = key.at;
            prev_value = key.value.clone();
        }
        out
    }
}

/// Action name → template, as declared by an object kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionRegistry {
    actions: IndexMap<String, ActionTemplate>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, template: ActionTemplate) {
        self.actions.insert(name.to_string(), template);
    }

    pub fn get(&self, name: &str) -> Option<&ActionTemplate> {
        self.actions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionTemplate)> {
        self.actions.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(at: f64, value: Value) -> ActionKey {
        ActionKey {
            at,
            value,
            interpolation: None,
        }
    }

    #[test]
    fn segments_cover_window_in_key_order() {
        let track = ActionTrack {
            property: "scale".into(),
            keys: vec![
                key(0.5, Value::vec3(1.2, 1.2, 1.2)),
                key(1.0, Value::vec3(0.0, 0.0, 0.0)),
            ],
        };
        let segs = track.segments(
            ObjectId(0),
            &Value::vec3(1.0, 1.0, 1.0),
            2.0,
            4.0,
            Interpolation::Linear,
        );
        assert_eq!(segs.len(), 2);
        assert_eq!((segs[0].start, segs[0].duration), (2.0, 2.0));
        assert_eq!(segs[0].start_value, Value::vec3(1.0, 1.0, 1.0));
        assert_eq!((segs[1].start, segs[1].duration), (4.0, 2.0));
        assert_eq!(segs[1].start_value, Value::vec3(1.2, 1.2, 1.2));
        assert_eq!(segs[1].end_value, Value::vec3(0.0, 0.0, 0.0));
    }

    #[test]
    fn repeated_stamp_yields_instant_segment() {
        let track = ActionTrack {
            property: "visible".into(),
            keys: vec![key(1.0, Value::Bool(true)), key(1.0, Value::Bool(false))],
        };
        let segs = track.segments(ObjectId(0), &Value::Bool(true), 0.0, 1.0, Interpolation::Linear);
        assert_eq!(segs[1].duration, 0.0);
        assert_eq!(segs[1].start, 1.0);
    }

    #[test]
    fn validate_rejects_unsorted_and_mixed() {
        let unsorted = ActionTrack {
            property: "tilt".into(),
            keys: vec![key(0.8, Value::Scalar(1.0)), key(0.2, Value::Scalar(0.0))],
        };
        assert!(unsorted.validate_basic().is_err());
        let mixed = ActionTrack {
            property: "tilt".into(),
            keys: vec![key(0.2, Value::Scalar(1.0)), key(0.8, Value::Bool(false))],
        };
        assert!(mixed.validate_basic().is_err());
    }
}
