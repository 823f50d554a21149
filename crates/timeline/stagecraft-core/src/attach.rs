//! Time-indexed attachment graph.
//!
//! Each child owns a history of edge spans `[from, until)`; at most one span
//! is active for a child at any instant. Mutations are only accepted at or
//! after the latest one (`head`), so the set of open spans always describes
//! the graph from `head` onwards and each mutation keeps that set acyclic.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{StageError, StageResult};
use crate::ids::ObjectId;
use crate::transform::Transform;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttachmentEdge {
    pub child: ObjectId,
    pub parent: ObjectId,
    pub socket: String,
    /// Socket placement in the parent's local frame.
    pub socket_local: Transform,
    /// Frozen at attach time so the child's world transform is continuous.
    pub offset: Transform,
    /// The child's own local transform when the edge was opened; later own
    /// motion is applied relative to it.
    pub anchor: Transform,
    pub from: f64,
    /// `None` while the edge is open.
    pub until: Option<f64>,
}

impl AttachmentEdge {
    #[inline]
    pub fn is_active_at(&self, t: f64) -> bool {
        self.from <= t && self.until.map_or(true, |until| t < until)
    }

    /// World transform of the child given its parent's world transform and
    /// its own local transform at the same instant.
    pub fn resolve(&self, parent_world: &Transform, own: &Transform) -> Transform {
        parent_world
            .compose(&self.socket_local)
            .compose(&self.offset)
            .compose(&self.anchor.inverse())
            .compose(own)
    }
}

#[derive(Clone, Debug, Default)]
pub struct AttachmentGraph {
    edges: HashMap<ObjectId, Vec<AttachmentEdge>>,
    head: f64,
}

impl AttachmentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time of the latest mutation.
    #[inline]
    pub fn head(&self) -> f64 {
        self.head
    }

    pub fn check_time(&self, at: f64) -> StageResult<()> {
        if at < self.head {
            return Err(StageError::TimeRewind {
                at,
                head: self.head,
            });
        }
        Ok(())
    }

    pub fn active_at(&self, child: ObjectId, t: f64) -> Option<&AttachmentEdge> {
        self.edges
            .get(&child)?
            .iter()
            .rev()
            .find(|e| e.from <= t)
            .filter(|e| e.is_active_at(t))
    }

    pub fn open_edge(&self, child: ObjectId) -> Option<&AttachmentEdge> {
        self.edges
            .get(&child)?
            .last()
            .filter(|e| e.until.is_none())
    }

    /// Children whose open edge points at `parent`, in id order.
    pub fn children_of(&self, parent: ObjectId) -> Vec<ObjectId> {
        let mut out: Vec<ObjectId> = self
            .edges
            .keys()
            .copied()
            .filter(|c| self.open_edge(*c).is_some_and(|e| e.parent == parent))
            .collect();
        out.sort();
        out
    }

    /// Whether opening `child -> parent` would close a loop among open edges.
    pub fn would_cycle(&self, child: ObjectId, parent: ObjectId) -> bool {
        let mut cursor = Some(parent);
        while let Some(node) = cursor {
            if node == child {
                return true;
            }
            cursor = self.open_edge(node).map(|e| e.parent);
        }
        false
    }

    /// Open `edge`, closing any open edge of the same child at `edge.from`.
    pub(crate) fn open(&mut self, edge: AttachmentEdge) -> StageResult<()> {
        self.check_time(edge.from)?;
        if self.would_cycle(edge.child, edge.parent) {
            return Err(StageError::CycleDetected {
                child: edge.child,
                parent: edge.parent,
            });
        }
        self.close(edge.child, edge.from)?;
        log::debug!(
            "attach {} -> {}:{} at {:.3}",
            edge.child,
            edge.parent,
            edge.socket,
            edge.from
        );
        self.head = edge.from;
        self.edges.entry(edge.child).or_default().push(edge);
        Ok(())
    }

    /// Close the child's open edge at `at`. Returns the closed edge, or
    /// `None` when the child was not attached.
    pub(crate) fn close(&mut self, child: ObjectId, at: f64) -> StageResult<Option<AttachmentEdge>> {
        self.check_time(at)?;
        let Some(edge) = self
            .edges
            .get_mut(&child)
            .and_then(|spans| spans.last_mut())
            .filter(|e| e.until.is_none())
        else {
            return Ok(None);
        };
        edge.until = Some(at);
        self.head = at;
        log::debug!("detach {} from {} at {:.3}", child, edge.parent, at);
        Ok(Some(edge.clone()))
    }

    /// Full span history, children in id order.
    pub fn edges(&self) -> Vec<&AttachmentEdge> {
        let mut out: Vec<&AttachmentEdge> = self.edges.values().flatten().collect();
        out.sort_by(|a, b| a.child.cmp(&b.child).then(a.from.total_cmp(&b.from)));
        out
    }
}
