//! Fluent animation builder.
//!
//! `stage.animate(id)` returns an [`AnimationBuilder`] that records intended
//! changes without touching the stage. Nothing is validated until the
//! builder is handed to `play`/`play_staggered`, where it is materialized
//! into Animation records against the properties' current values.
//!
//! ```ignore
//! stage.play([stage.animate(ball).shift([1.0, 0.0, 0.0]).rotate_euler(0.0, 0.0, 1.57)], 1.0)?;
//! ```

use indexmap::IndexMap;

use crate::error::{check_duration, StageError, StageResult};
use crate::ids::ObjectId;
use crate::interp::Interpolation;
use crate::object::Object;
use crate::plan::Plan;
use crate::property::{POSITION, ROTATION, SCALE, VISIBLE};
use crate::timeline::Animation;
use crate::transform::{quat_from_euler, quat_mul};
use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
enum Op {
    MoveTo([f64; 3]),
    Shift([f64; 3]),
    SetRotation([f64; 4]),
    Rotate([f64; 4]),
    SetScale([f64; 3]),
    Scale([f64; 3]),
    SetVisible(bool),
    Customize(String, Value),
    Action(String),
    AttachTo { parent: ObjectId, socket: String },
    Detach,
}

/// Pending changes for one target object.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationBuilder {
    target: ObjectId,
    ops: Vec<Op>,
    duration: Option<f64>,
    interpolation: Option<Interpolation>,
}

impl AnimationBuilder {
    pub fn new(target: ObjectId) -> Self {
        Self {
            target,
            ops: Vec::new(),
            duration: None,
            interpolation: None,
        }
    }

    #[inline]
    pub fn target(&self) -> ObjectId {
        self.target
    }

    /// Explicit duration overriding the one passed to `play`.
    #[inline]
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn move_to(mut self, position: [f64; 3]) -> Self {
        self.ops.push(Op::MoveTo(position));
        self
    }

    pub fn shift(mut self, delta: [f64; 3]) -> Self {
        self.ops.push(Op::Shift(delta));
        self
    }

    pub fn set_rotation(mut self, rotation: [f64; 4]) -> Self {
        self.ops.push(Op::SetRotation(rotation));
        self
    }

    /// Compose `delta` onto the current rotation (`current ∘ delta`).
    pub fn rotate(mut self, delta: [f64; 4]) -> Self {
        self.ops.push(Op::Rotate(delta));
        self
    }

    pub fn rotate_euler(self, x: f64, y: f64, z: f64) -> Self {
        self.rotate(quat_from_euler([x, y, z]))
    }

    pub fn set_scale(mut self, scale: [f64; 3]) -> Self {
        self.ops.push(Op::SetScale(scale));
        self
    }

    /// Component-wise multiply of the current scale.
    pub fn scale(mut self, factor: [f64; 3]) -> Self {
        self.ops.push(Op::Scale(factor));
        self
    }

    pub fn scale_uniform(self, factor: f64) -> Self {
        self.scale([factor; 3])
    }

    pub fn set_visible(mut self, visible: bool) -> Self {
        self.ops.push(Op::SetVisible(visible));
        self
    }

    /// Write a declared or custom property.
    pub fn customize(mut self, property: &str, value: impl Into<Value>) -> Self {
        self.ops
            .push(Op::Customize(property.to_string(), value.into()));
        self
    }

    /// Expand a named action from the target's kind over the play window.
    pub fn action(mut self, name: &str) -> Self {
        self.ops.push(Op::Action(name.to_string()));
        self
    }

    /// Attach to `parent`'s socket at the start of the play window, before
    /// any value change in this builder.
    pub fn attach_to(mut self, parent: ObjectId, socket: &str) -> Self {
        self.ops.push(Op::AttachTo {
            parent,
            socket: socket.to_string(),
        });
        self
    }

    /// Detach at the window start. Value changes in this builder depart from
    /// the baked world pose.
    pub fn detach(mut self) -> Self {
        self.ops.push(Op::Detach);
        self
    }

    pub fn over(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = Some(interpolation);
        self
    }

    /// Append this builder's Animations and edge changes to `plan`, starting
    /// at `start` and lasting `duration` (unless overridden).
    pub(crate) fn materialize(&self, plan: &mut Plan<'_>, start: f64, duration: f64) -> StageResult<()> {
        let duration = check_duration(self.duration.unwrap_or(duration))?;
        let interpolation = self.interpolation.unwrap_or(plan.default_interpolation());
        let obj = plan.object(self.target)?;
        let id = self.target;

        // Attachment changes land at the window start, ahead of every value
        // change, so motion queued on either side of a detach departs from
        // the baked pose.
        for op in &self.ops {
            match op {
                Op::AttachTo { parent, socket } => plan.attach(id, *parent, socket, start)?,
                Op::Detach => plan.detach(id, start)?,
                _ => {}
            }
        }

        // Final value per property for this builder; later ops overwrite.
        let mut pending: IndexMap<String, Value> = IndexMap::new();

        for op in &self.ops {
            match op {
                Op::MoveTo(p) => {
                    pending.insert(POSITION.into(), Value::Vec3(*p));
                }
                Op::Shift(d) => {
                    let p = vec3_of(&pending_or_current(plan, &pending, id, POSITION)?);
                    pending.insert(
                        POSITION.into(),
                        Value::Vec3([p[0] + d[0], p[1] + d[1], p[2] + d[2]]),
                    );
                }
                Op::SetRotation(q) => {
                    pending.insert(ROTATION.into(), Value::Rotation(*q));
                }
                Op::Rotate(q) => {
                    let cur = pending_or_current(plan, &pending, id, ROTATION)?
                        .as_rotation()
                        .unwrap_or([0.0, 0.0, 0.0, 1.0]);
                    pending.insert(ROTATION.into(), Value::Rotation(quat_mul(cur, *q)));
                }
                Op::SetScale(s) => {
                    pending.insert(SCALE.into(), Value::Vec3(*s));
                }
                Op::Scale(f) => {
                    let s = vec3_of(&pending_or_current(plan, &pending, id, SCALE)?);
                    pending.insert(
                        SCALE.into(),
                        Value::Vec3([s[0] * f[0], s[1] * f[1], s[2] * f[2]]),
                    );
                }
                Op::SetVisible(v) => {
                    pending.insert(VISIBLE.into(), Value::Bool(*v));
                }
                Op::Customize(name, value) => {
                    let writes = match obj.kind.custom.get(name) {
                        Some(custom) => {
                            if !custom.animatable && duration > 0.0 {
                                return Err(StageError::NotAnimatable {
                                    property: name.clone(),
                                });
                            }
                            custom.fan_out(value)
                        }
                        None => vec![(name.clone(), value.clone())],
                    };
                    for (prop, value) in writes {
                        pending.insert(prop, value);
                    }
                }
                Op::Action(name) => {
                    let template = obj.kind.action(name)?;
                    for track in &template.tracks {
                        let from = pending_or_current(plan, &pending, id, &track.property)?;
                        let segments =
                            track.segments(id, &from, start, duration, interpolation);
                        for seg in segments {
                            plan.push_segment(obj, seg)?;
                        }
                        pending.shift_remove(&track.property);
                    }
                }
                Op::AttachTo { .. } | Op::Detach => {}
            }
        }
        flush(plan, obj, &mut pending, start, duration, interpolation)
    }
}

/// Turn folded per-property values into segments departing from the
/// current (overlaid) values.
fn flush(
    plan: &mut Plan<'_>,
    obj: &Object,
    pending: &mut IndexMap<String, Value>,
    start: f64,
    duration: f64,
    interpolation: Interpolation,
) -> StageResult<()> {
    for (property, end_value) in pending.drain(..) {
        let start_value = plan.current(obj.id, &property)?;
        plan.push_segment(
            obj,
            Animation {
                target: obj.id,
                property,
                start_value,
                end_value,
                start,
                duration,
                interpolation,
            },
        )?;
    }
    Ok(())
}

fn pending_or_current(
    plan: &Plan<'_>,
    pending: &IndexMap<String, Value>,
    id: ObjectId,
    prop: &str,
) -> StageResult<Value> {
    match pending.get(prop) {
        Some(v) => Ok(v.clone()),
        None => plan.current(id, prop),
    }
}

fn vec3_of(value: &Value) -> [f64; 3] {
    value.as_vec3().unwrap_or([0.0; 3])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use hashbrown::HashMap;

    use crate::attach::AttachmentGraph;
    use crate::kind::ObjectKind;
    use crate::timeline::Timeline;

    fn scene() -> HashMap<ObjectId, Object> {
        let kind = Arc::new(
            ObjectKind::new("lamp")
                .with_property("brightness", 0.0)
                .with_fixed_property("label", "lamp"),
        );
        let mut objects = HashMap::new();
        let obj = Object::new(ObjectId(0), kind, std::iter::empty::<(&str, Value)>()).unwrap();
        objects.insert(ObjectId(0), obj);
        objects
    }

    #[test]
    fn builder_records_without_side_effects() {
        let b = AnimationBuilder::new(ObjectId(0)).shift([1.0, 0.0, 0.0]).over(2.0);
        assert_eq!(b.target(), ObjectId(0));
        assert_eq!(b.duration(), Some(2.0));
    }

    #[test]
    fn consecutive_ops_fold_into_one_segment_per_property() {
        let objects = scene();
        let (timeline, graph) = (Timeline::new(), AttachmentGraph::new());
        let mut plan = Plan::new(&objects, &timeline, &graph, Interpolation::Linear);
        AnimationBuilder::new(ObjectId(0))
            .shift([1.0, 0.0, 0.0])
            .shift([0.0, 2.0, 0.0])
            .customize("brightness", 0.5)
            .materialize(&mut plan, 0.0, 1.0)
            .unwrap();
        assert_eq!(plan.segments.len(), 2);
        assert_eq!(plan.segments[0].end_value, Value::vec3(1.0, 2.0, 0.0));
        assert_eq!(plan.segments[0].start_value, Value::vec3(0.0, 0.0, 0.0));
    }

    #[test]
    fn later_builders_see_pending_values() {
        let objects = scene();
        let (timeline, graph) = (Timeline::new(), AttachmentGraph::new());
        let mut plan = Plan::new(&objects, &timeline, &graph, Interpolation::Linear);
        AnimationBuilder::new(ObjectId(0))
            .shift([1.0, 0.0, 0.0])
            .materialize(&mut plan, 0.0, 1.0)
            .unwrap();
        AnimationBuilder::new(ObjectId(0))
            .shift([1.0, 0.0, 0.0])
            .materialize(&mut plan, 1.0, 1.0)
            .unwrap();
        assert_eq!(plan.segments[1].start_value, Value::vec3(1.0, 0.0, 0.0));
        assert_eq!(plan.segments[1].end_value, Value::vec3(2.0, 0.0, 0.0));
    }

    #[test]
    fn fixed_properties_only_snap() {
        let objects = scene();
        let (timeline, graph) = (Timeline::new(), AttachmentGraph::new());
        let mut plan = Plan::new(&objects, &timeline, &graph, Interpolation::Linear);
        let err = AnimationBuilder::new(ObjectId(0))
            .customize("label", "other")
            .materialize(&mut plan, 0.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, StageError::NotAnimatable { .. }));
        AnimationBuilder::new(ObjectId(0))
            .customize("label", "other")
            .materialize(&mut plan, 0.0, 0.0)
            .unwrap();
    }

    #[test]
    fn unknown_targets_and_properties_fail() {
        let objects = scene();
        let (timeline, graph) = (Timeline::new(), AttachmentGraph::new());
        let mut plan = Plan::new(&objects, &timeline, &graph, Interpolation::Linear);
        let err = AnimationBuilder::new(ObjectId(9))
            .shift([1.0, 0.0, 0.0])
            .materialize(&mut plan, 0.0, 1.0)
            .unwrap_err();
        assert_eq!(err, StageError::DanglingReference { object: ObjectId(9) });
        let err = AnimationBuilder::new(ObjectId(0))
            .customize("glow", 1.0)
            .materialize(&mut plan, 0.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, StageError::UnknownProperty { .. }));
        let err = AnimationBuilder::new(ObjectId(0))
            .action("wave")
            .materialize(&mut plan, 0.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, StageError::UnknownAction { .. }));
        let err = AnimationBuilder::new(ObjectId(0))
            .over(-1.0)
            .materialize(&mut plan, 0.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, StageError::InvalidDuration { .. }));
    }
}
