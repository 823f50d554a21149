//! Staging area for one mutation of the stage.
//!
//! A plan collects Animation segments and attachment changes on top of the
//! committed state. Builders later in the same plan see the pending values
//! and edges of earlier ones. The stage commits a plan only once every part
//! of it has validated, so a failing call leaves nothing behind.

use hashbrown::HashMap;

use crate::attach::{AttachmentEdge, AttachmentGraph};
use crate::error::{StageError, StageResult};
use crate::ids::ObjectId;
use crate::interp::Interpolation;
use crate::object::Object;
use crate::property::{POSITION, ROTATION};
use crate::sampling::Sampler;
use crate::timeline::{Animation, Timeline};
use crate::value::Value;

#[derive(Debug)]
pub(crate) struct Plan<'s> {
    objects: &'s HashMap<ObjectId, Object>,
    timeline: &'s Timeline,
    graph: AttachmentGraph,
    default_interpolation: Interpolation,
    overlay: HashMap<(ObjectId, String), Value>,
    pub segments: Vec<Animation>,
}

/// What a committed plan changes.
pub(crate) struct PlanOutput {
    pub segments: Vec<Animation>,
    pub graph: AttachmentGraph,
    /// Final value per touched (object, property).
    pub currents: HashMap<(ObjectId, String), Value>,
}

impl<'s> Plan<'s> {
    pub fn new(
        objects: &'s HashMap<ObjectId, Object>,
        timeline: &'s Timeline,
        graph: &AttachmentGraph,
        default_interpolation: Interpolation,
    ) -> Self {
        Self {
            objects,
            timeline,
            graph: graph.clone(),
            default_interpolation,
            overlay: HashMap::new(),
            segments: Vec::new(),
        }
    }

    #[inline]
    pub fn default_interpolation(&self) -> Interpolation {
        self.default_interpolation
    }

    /// Live objects only.
    pub fn object(&self, id: ObjectId) -> StageResult<&'s Object> {
        self.objects
            .get(&id)
            .filter(|o| !o.removed)
            .ok_or_else(|| StageError::dangling(id))
    }

    /// Committed state plus everything pending in this plan.
    pub fn sampler(&self) -> Sampler<'_> {
        Sampler::new(self.objects, self.timeline, &self.graph).with_pending(&self.segments)
    }

    pub fn current(&self, id: ObjectId, property: &str) -> StageResult<Value> {
        if let Some(v) = self.overlay.get(&(id, property.to_string())) {
            return Ok(v.clone());
        }
        let obj = self.object(id)?;
        obj.props
            .current(property)
            .cloned()
            .ok_or_else(|| StageError::UnknownProperty {
                object: id,
                property: property.to_string(),
            })
    }

    /// Type-check `seg` against the target's store and record it.
    pub fn push_segment(&mut self, obj: &Object, seg: Animation) -> StageResult<()> {
        let prop = obj.props.check(obj.id, &seg.property, &seg.end_value)?;
        if !prop.animatable && seg.duration > 0.0 {
            return Err(StageError::NotAnimatable {
                property: seg.property,
            });
        }
        self.overlay
            .insert((seg.target, seg.property.clone()), seg.end_value.clone());
        self.segments.push(seg);
        Ok(())
    }

    /// Open `child -> parent:socket` at `at`, freezing the offset so the
    /// child's world transform does not jump.
    pub fn attach(
        &mut self,
        child: ObjectId,
        parent: ObjectId,
        socket: &str,
        at: f64,
    ) -> StageResult<()> {
        self.object(child)?;
        let socket_local = *self.object(parent)?.kind.socket(socket)?;
        self.graph.check_time(at)?;
        if self.graph.would_cycle(child, parent) {
            return Err(StageError::CycleDetected { child, parent });
        }
        let sampler = self.sampler();
        let child_world = sampler.resolve_world_transform(child, at)?;
        let parent_world = sampler.resolve_world_transform(parent, at)?;
        let anchor = sampler.local_transform(child, at)?;
        let offset = parent_world
            .compose(&socket_local)
            .inverse()
            .compose(&child_world);
        self.graph.open(AttachmentEdge {
            child,
            parent,
            socket: socket.to_string(),
            socket_local,
            offset,
            anchor,
            from: at,
            until: None,
        })
    }

    /// Close the child's open edge at `at` and bake its world transform into
    /// its own position/rotation. A detached child is left alone.
    ///
    /// `at` may not precede the start of any of the child's own transform
    /// segments: those were written in the parent's frame and would take
    /// over again after the bake.
    pub fn detach(&mut self, child: ObjectId, at: f64) -> StageResult<()> {
        let obj = self.object(child)?;
        self.graph.check_time(at)?;
        if self.graph.open_edge(child).is_none() {
            return Ok(());
        }
        if let Some(latest) = self.latest_transform_start(child) {
            if at < latest {
                return Err(StageError::TimeRewind { at, head: latest });
            }
        }
        let sampler = self.sampler();
        let world = sampler.resolve_world_transform(child, at)?;
        let own = sampler.local_transform(child, at)?;
        self.graph.close(child, at)?;
        for (property, from, to) in [
            (POSITION, Value::Vec3(own.position), Value::Vec3(world.position)),
            (ROTATION, Value::Rotation(own.rotation), Value::Rotation(world.rotation)),
        ] {
            self.push_segment(
                obj,
                Animation {
                    target: child,
                    property: property.to_string(),
                    start_value: from,
                    end_value: to,
                    start: at,
                    duration: 0.0,
                    interpolation: Interpolation::Step,
                },
            )?;
        }
        Ok(())
    }

    /// Latest start among the child's committed and pending position and
    /// rotation segments.
    fn latest_transform_start(&self, child: ObjectId) -> Option<f64> {
        let committed = [POSITION, ROTATION]
            .into_iter()
            .flat_map(|prop| self.timeline.for_property(child, prop))
            .map(|(_, a)| a.start);
        let pending = self
            .segments
            .iter()
            .filter(|a| a.target == child && (a.property == POSITION || a.property == ROTATION))
            .map(|a| a.start);
        committed.chain(pending).reduce(f64::max)
    }

    /// Children currently attached to `parent` in this plan's graph.
    pub fn children_of(&self, parent: ObjectId) -> Vec<ObjectId> {
        self.graph.children_of(parent)
    }

    pub fn finish(self) -> PlanOutput {
        PlanOutput {
            segments: self.segments,
            graph: self.graph,
            currents: self.overlay,
        }
    }
}
