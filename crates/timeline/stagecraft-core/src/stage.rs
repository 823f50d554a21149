//! The stage: objects, kinds, the clock, the timeline and the attachment
//! graph behind one façade.
//!
//! Every mutating call builds a [`Plan`] against the committed state,
//! validates it completely, and only then commits. A failing call leaves
//! the stage exactly as it was.

use hashbrown::HashMap;

use crate::attach::AttachmentGraph;
use crate::builder::AnimationBuilder;
use crate::config::Config;
use crate::error::{StageError, StageResult};
use crate::ids::{IdAllocator, ObjectId};
use crate::kind::{KindRegistry, ObjectKind};
use crate::marks::{MarkProvider, Marker, MarkerSet};
use crate::object::Object;
use crate::plan::{Plan, PlanOutput};
use crate::sampling::{Sampler, Snapshot};
use crate::scheduler::{Scheduler, Slot, StaggerEntry};
use crate::timeline::Timeline;
use crate::transform::Transform;
use crate::value::Value;

#[derive(Debug)]
pub struct Stage {
    cfg: Config,
    ids: IdAllocator,
    kinds: KindRegistry,
    objects: HashMap<ObjectId, Object>,
    scheduler: Scheduler,
    graph: AttachmentGraph,
    marks: Box<dyn MarkProvider>,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Stage {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            kinds: KindRegistry::new(),
            objects: HashMap::new(),
            scheduler: Scheduler::new(),
            graph: AttachmentGraph::new(),
            marks: Box::new(MarkerSet::new()),
        }
    }

    pub fn with_marks(mut self, marks: impl MarkProvider + 'static) -> Self {
        self.marks = Box::new(marks);
        self
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn clock(&self) -> f64 {
        self.scheduler.clock()
    }

    #[inline]
    pub fn timeline(&self) -> &Timeline {
        self.scheduler.timeline()
    }

    #[inline]
    pub fn attachments(&self) -> &AttachmentGraph {
        &self.graph
    }

    pub fn mark(&self, name: &str) -> StageResult<Marker> {
        self.marks.get_mark(name).ok_or_else(|| StageError::UnknownMark {
            name: name.to_string(),
        })
    }

    // ---------- objects ----------

    pub fn register_kind(&mut self, kind: ObjectKind) -> StageResult<()> {
        let kind = self.kinds.register(kind)?;
        log::debug!("registered kind '{}'", kind.name);
        Ok(())
    }

    /// Instantiate a registered kind. `initial` overrides declared defaults
    /// and may register extra properties.
    pub fn create_object<I, S>(&mut self, kind: &str, initial: I) -> StageResult<ObjectId>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let kind = self.kinds.get(kind)?;
        // Build before allocating so a failure does not burn an id.
        let mut obj = Object::new(ObjectId(0), kind, initial)?;
        let id = self.ids.alloc_object();
        obj.id = id;
        log::debug!("created {} of kind '{}'", id, obj.kind_name());
        self.objects.insert(id, obj);
        Ok(id)
    }

    /// `create_object` with the kind's defaults only.
    pub fn spawn(&mut self, kind: &str) -> StageResult<ObjectId> {
        self.create_object(kind, std::iter::empty::<(&str, Value)>())
    }

    /// A live (not removed) object.
    pub fn object(&self, id: ObjectId) -> StageResult<&Object> {
        self.objects
            .get(&id)
            .filter(|o| !o.removed)
            .ok_or_else(|| StageError::dangling(id))
    }

    /// Live objects in id order.
    pub fn objects(&self) -> Vec<&Object> {
        let mut out: Vec<&Object> = self.objects.values().filter(|o| !o.removed).collect();
        out.sort_by_key(|o| o.id);
        out
    }

    /// Register a property after construction; `value` becomes its base.
    /// An existing name keeps its first registration.
    pub fn register_property(
        &mut self,
        id: ObjectId,
        name: &str,
        value: impl Into<Value>,
    ) -> StageResult<()> {
        let value = value.into();
        let obj = self
            .objects
            .get_mut(&id)
            .filter(|o| !o.removed)
            .ok_or_else(|| StageError::dangling(id))?;
        if obj.props.contains(name) {
            obj.props.check(id, name, &value)?;
            return Ok(());
        }
        let animatable = !obj.kind.is_fixed(name);
        obj.props.register(name, value, animatable)
    }

    /// Detach everything attached to `id` (and `id` itself) at the clock,
    /// then retire the id.
    pub fn remove_object(&mut self, id: ObjectId) -> StageResult<()> {
        let at = self.clock().max(self.graph.head());
        let mut plan = self.plan();
        plan.object(id)?;
        for child in plan.children_of(id) {
            plan.detach(child, at)?;
        }
        plan.detach(id, at)?;
        let out = self.finish(plan)?;
        self.commit(out, 0.0);
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.removed = true;
        }
        log::debug!("removed {}", id);
        Ok(())
    }

    // ---------- timeline ----------

    /// Start a builder for `id`. Nothing is checked until it is played.
    pub fn animate(&self, id: ObjectId) -> AnimationBuilder {
        AnimationBuilder::new(id)
    }

    /// Run all builders from the clock for `duration` (unless a builder
    /// overrides it), then advance the clock by `duration`. An empty list is
    /// a pause.
    pub fn play(
        &mut self,
        builders: impl IntoIterator<Item = AnimationBuilder>,
        duration: f64,
    ) -> StageResult<()> {
        let builders: Vec<AnimationBuilder> = builders.into_iter().collect();
        let (slots, advance) = self.scheduler.schedule_play(&builders, duration)?;
        let out = self.materialize(&slots)?;
        self.commit(out, advance);
        Ok(())
    }

    pub fn wait(&mut self, duration: f64) -> StageResult<()> {
        self.play(std::iter::empty(), duration)
    }

    /// Run each entry from `clock + offset`; the clock advances by the
    /// largest `offset + duration`. Zero entries change nothing.
    pub fn play_staggered(
        &mut self,
        entries: impl IntoIterator<Item = StaggerEntry>,
    ) -> StageResult<()> {
        let entries: Vec<StaggerEntry> = entries.into_iter().collect();
        if entries.is_empty() {
            return Ok(());
        }
        let (slots, advance) = self.scheduler.schedule_staggered(&entries)?;
        let out = self.materialize(&slots)?;
        self.commit(out, advance);
        Ok(())
    }

    /// Attach `child` to `parent`'s `socket` at `at`, keeping the child's
    /// world transform continuous. `at` may not lie past the clock.
    pub fn attach_to(
        &mut self,
        child: ObjectId,
        parent: ObjectId,
        socket: &str,
        at: f64,
    ) -> StageResult<()> {
        self.check_not_ahead(at)?;
        let mut plan = self.plan();
        plan.attach(child, parent, socket, at)?;
        let out = self.finish(plan)?;
        self.commit(out, 0.0);
        Ok(())
    }

    /// Detach `child` at `at`, baking its world transform into its own
    /// position and rotation. Detaching an unattached object does nothing.
    /// `at` may not lie past the clock, nor before the start of the child's
    /// latest position or rotation animation.
    pub fn detach(&mut self, child: ObjectId, at: f64) -> StageResult<()> {
        self.check_not_ahead(at)?;
        let mut plan = self.plan();
        plan.detach(child, at)?;
        let out = self.finish(plan)?;
        self.commit(out, 0.0);
        Ok(())
    }

    // ---------- sampling ----------

    pub fn sampler(&self) -> Sampler<'_> {
        Sampler::new(&self.objects, self.scheduler.timeline(), &self.graph)
    }

    pub fn value_of(&self, id: ObjectId, property: &str, t: f64) -> StageResult<Value> {
        self.object(id)?;
        self.sampler().value_of(id, property, t)
    }

    pub fn state_of(&self, id: ObjectId, t: f64) -> StageResult<Snapshot> {
        self.object(id)?;
        self.sampler().state_of(id, t)
    }

    pub fn resolve_world_transform(&self, id: ObjectId, t: f64) -> StageResult<Transform> {
        self.object(id)?;
        self.sampler().resolve_world_transform(id, t)
    }

    // ---------- plan plumbing ----------

    /// Attachment changes past the clock would be frozen against a timeline
    /// that later plays can still rewrite.
    fn check_not_ahead(&self, at: f64) -> StageResult<()> {
        let clock = self.clock();
        if at.is_nan() || at > clock + self.cfg.time_epsilon {
            return Err(StageError::AheadOfClock { at, clock });
        }
        Ok(())
    }

    fn plan(&self) -> Plan<'_> {
        Plan::new(
            &self.objects,
            self.scheduler.timeline(),
            &self.graph,
            self.cfg.default_interpolation,
        )
    }

    // Offsets and bakes computed at a slot's start must already see every
    // slot that starts earlier, so slots run in start order (stable).
    fn materialize(&self, slots: &[Slot<'_>]) -> StageResult<PlanOutput> {
        let mut ordered: Vec<&Slot<'_>> = slots.iter().collect();
        ordered.sort_by(|a, b| a.start.total_cmp(&b.start));
        let mut plan = self.plan();
        for slot in ordered {
            slot.builder
                .materialize(&mut plan, slot.start, slot.duration)?;
        }
        self.finish(plan)
    }

    fn finish(&self, plan: Plan<'_>) -> StageResult<PlanOutput> {
        let out = plan.finish();
        self.scheduler.check_overlaps(&out.segments, &self.cfg)?;
        Ok(out)
    }

    fn commit(&mut self, out: PlanOutput, advance: f64) {
        let PlanOutput {
            segments,
            graph,
            currents,
        } = out;
        self.graph = graph;
        for ((id, property), value) in currents {
            if let Some(obj) = self.objects.get_mut(&id) {
                obj.props.set_current(&property, value);
            }
        }
        self.scheduler.append(segments);
        if advance > 0.0 {
            self.scheduler.advance(advance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_with_ball() -> (Stage, ObjectId) {
        let mut stage = Stage::default();
        stage.register_kind(ObjectKind::new("ball")).unwrap();
        let ball = stage.spawn("ball").unwrap();
        (stage, ball)
    }

    #[test]
    fn failed_play_commits_nothing() {
        let (mut stage, ball) = stage_with_ball();
        let err = stage
            .play(
                [
                    stage.animate(ball).shift([1.0, 0.0, 0.0]),
                    stage.animate(ball).customize("glow", 1.0),
                ],
                1.0,
            )
            .unwrap_err();
        assert!(matches!(err, StageError::UnknownProperty { .. }));
        assert_eq!(stage.clock(), 0.0);
        assert!(stage.timeline().is_empty());
        let pos = stage.object(ball).unwrap().props.current("position").cloned();
        assert_eq!(pos, Some(Value::vec3(0.0, 0.0, 0.0)));
    }

    #[test]
    fn unknown_kind_does_not_allocate() {
        let (mut stage, _) = stage_with_ball();
        assert!(matches!(
            stage.spawn("cube"),
            Err(StageError::UnknownKind { .. })
        ));
        let next = stage.spawn("ball").unwrap();
        assert_eq!(next, ObjectId(1));
    }

    #[test]
    fn register_property_keeps_first_registration() {
        let (mut stage, ball) = stage_with_ball();
        stage.register_property(ball, "glow", 0.5).unwrap();
        stage.register_property(ball, "glow", 0.9).unwrap();
        assert_eq!(stage.value_of(ball, "glow", 0.0).unwrap(), Value::Scalar(0.5));
        assert!(matches!(
            stage.register_property(ball, "glow", true),
            Err(StageError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn missing_mark_is_reported() {
        let stage = Stage::default().with_marks(
            MarkerSet::new().with("left", Marker::at([-1.0, 0.0, 0.0])),
        );
        assert_eq!(stage.mark("left").unwrap().location, [-1.0, 0.0, 0.0]);
        assert!(matches!(stage.mark("right"), Err(StageError::UnknownMark { .. })));
    }
}
