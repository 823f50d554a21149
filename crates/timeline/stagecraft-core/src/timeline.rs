//! Append-only timeline of absolutely-timed Animation segments.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::ids::{ObjectId, SegmentId};
use crate::interp::{interpolate, Interpolation};
use crate::value::Value;

/// One property transition with a resolved absolute start time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub target: ObjectId,
    pub property: String,
    pub start_value: Value,
    pub end_value: Value,
    /// Absolute start time (seconds).
    pub start: f64,
    /// Always >= 0; zero snaps to `end_value` at `start`.
    pub duration: f64,
    pub interpolation: Interpolation,
}

impl Animation {
    #[inline]
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Value of this segment at absolute time `t`.
    ///
    /// The end check comes first so a zero-duration segment reports its end
    /// value at its own start time.
    pub fn value_at(&self, t: f64) -> Value {
        if t >= self.end() {
            return self.end_value.clone();
        }
        if t <= self.start {
            return self.start_value.clone();
        }
        let u = (t - self.start) / self.duration;
        interpolate(&self.start_value, &self.end_value, u, self.interpolation)
    }

    /// Whether the windows of `self` and `other` share more than a boundary.
    pub fn overlaps(&self, other: &Animation, eps: f64) -> bool {
        self.start < other.end() - eps && other.start < self.end() - eps
    }
}

/// Segments plus a per-(object, property) index. Sampling never assumes the
/// segments are sorted by start time.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    segments: Vec<Animation>,
    index: HashMap<ObjectId, HashMap<String, Vec<SegmentId>>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, anim: Animation) -> SegmentId {
        let id = SegmentId(self.segments.len() as u32);
        self.index
            .entry(anim.target)
            .or_default()
            .entry(anim.property.clone())
            .or_default()
            .push(id);
        self.segments.push(anim);
        id
    }

    #[inline]
    pub fn get(&self, id: SegmentId) -> Option<&Animation> {
        self.segments.get(id.0 as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SegmentId, &Animation)> {
        self.segments
            .iter()
            .enumerate()
            .map(|(i, a)| (SegmentId(i as u32), a))
    }

    /// All segments writing `property` on `object`, in append order.
    pub fn for_property<'a>(
        &'a self,
        object: ObjectId,
        property: &str,
    ) -> impl Iterator<Item = (SegmentId, &'a Animation)> + 'a {
        self.index
            .get(&object)
            .and_then(|props| props.get(property))
            .into_iter()
            .flatten()
            .filter_map(move |id| self.get(*id).map(|a| (*id, a)))
    }

    /// The segment governing `property` at `t`: among segments that started
    /// at or before `t`, the one with the latest start; equal starts resolve
    /// to the one appended last.
    pub fn latest_at(&self, object: ObjectId, property: &str, t: f64) -> Option<&Animation> {
        self.for_property(object, property)
            .filter(|(_, a)| a.start <= t)
            .max_by(|(ia, a), (ib, b)| a.start.total_cmp(&b.start).then(ia.cmp(ib)))
            .map(|(_, a)| a)
    }

    /// First committed segment on the same property whose window overlaps `anim`.
    pub fn first_overlap(&self, anim: &Animation, eps: f64) -> Option<&Animation> {
        self.for_property(anim.target, &anim.property)
            .map(|(_, a)| a)
            .find(|a| a.overlaps(anim, eps))
    }

    /// Latest end time across all segments (0 when empty).
    pub fn span_end(&self) -> f64 {
        self.segments.iter().map(Animation::end).fold(0.0, f64::max)
    }
}
