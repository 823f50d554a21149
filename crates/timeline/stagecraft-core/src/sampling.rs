//! Read-side queries: property snapshots and world transforms at any time.
//!
//! Sampling is pure; it never mutates the timeline, the stores or the graph.

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::attach::AttachmentGraph;
use crate::error::{StageError, StageResult};
use crate::ids::ObjectId;
use crate::object::Object;
use crate::property::{POSITION, ROTATION};
use crate::timeline::{Animation, Timeline};
use crate::transform::Transform;
use crate::value::Value;

/// Every registered property of one object at one instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub object: ObjectId,
    pub time: f64,
    pub values: IndexMap<String, Value>,
}

impl Snapshot {
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.values.get(property)
    }

    pub fn position(&self) -> [f64; 3] {
        self.get(POSITION)
            .and_then(Value::as_vec3)
            .unwrap_or([0.0; 3])
    }

    pub fn rotation(&self) -> [f64; 4] {
        self.get(ROTATION)
            .and_then(Value::as_rotation)
            .unwrap_or(Transform::IDENTITY.rotation)
    }

    /// The object's own (unparented) transform.
    pub fn transform(&self) -> Transform {
        Transform::new(self.position(), self.rotation())
    }
}

/// Borrowed view over the committed scene state.
#[derive(Clone, Copy, Debug)]
pub struct Sampler<'a> {
    objects: &'a HashMap<ObjectId, Object>,
    timeline: &'a Timeline,
    graph: &'a AttachmentGraph,
    /// Uncommitted segments, treated as appended after the timeline.
    pending: &'a [Animation],
}

impl<'a> Sampler<'a> {
    pub fn new(
        objects: &'a HashMap<ObjectId, Object>,
        timeline: &'a Timeline,
        graph: &'a AttachmentGraph,
    ) -> Self {
        Self {
            objects,
            timeline,
            graph,
            pending: &[],
        }
    }

    pub(crate) fn with_pending(mut self, pending: &'a [Animation]) -> Self {
        self.pending = pending;
        self
    }

    /// Removed objects still resolve here so attachment history stays sampleable.
    fn object(&self, id: ObjectId) -> StageResult<&'a Object> {
        self.objects.get(&id).ok_or_else(|| StageError::dangling(id))
    }

    /// Value of one property at `t`: the governing Animation if any has
    /// started, else the construction-time value.
    pub fn value_of(&self, id: ObjectId, property: &str, t: f64) -> StageResult<Value> {
        let obj = self.object(id)?;
        let prop = obj
            .props
            .get(property)
            .ok_or_else(|| StageError::UnknownProperty {
                object: id,
                property: property.to_string(),
            })?;
        let mut governing = self.timeline.latest_at(id, property, t);
        for anim in self
            .pending
            .iter()
            .filter(|a| a.target == id && a.property == property && a.start <= t)
        {
            if governing.map_or(true, |g| anim.start >= g.start) {
                governing = Some(anim);
            }
        }
        Ok(match governing {
            Some(anim) => anim.value_at(t),
            None => prop.base.clone(),
        })
    }

    pub fn state_of(&self, id: ObjectId, t: f64) -> StageResult<Snapshot> {
        let obj = self.object(id)?;
        let mut values = IndexMap::with_capacity(obj.props.len());
        for prop in obj.props.iter() {
            values.insert(prop.name.clone(), self.value_of(id, &prop.name, t)?);
        }
        Ok(Snapshot {
            object: id,
            time: t,
            values,
        })
    }

    /// The object's own transform at `t`, ignoring attachments.
    pub fn local_transform(&self, id: ObjectId, t: f64) -> StageResult<Transform> {
        let position = self.value_of(id, POSITION, t)?;
        let rotation = self.value_of(id, ROTATION, t)?;
        Ok(Transform::new(
            position.as_vec3().unwrap_or([0.0; 3]),
            rotation
                .as_rotation()
                .unwrap_or(Transform::IDENTITY.rotation),
        ))
    }

    /// Compose up the attachment chain active at `t`. Recursion depth is
    /// bounded because the edges active at any instant form a forest.
    pub fn resolve_world_transform(&self, id: ObjectId, t: f64) -> StageResult<Transform> {
        let own = self.local_transform(id, t)?;
        match self.graph.active_at(id, t) {
            None => Ok(own),
            Some(edge) => {
                let parent = self.resolve_world_transform(edge.parent, t)?;
                Ok(edge.resolve(&parent, &own))
            }
        }
    }
}
