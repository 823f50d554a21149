//! Named placement markers supplied by the host scene.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::StageResult;
use crate::transform::Transform;

fn identity_rotation() -> [f64; 4] {
    Transform::IDENTITY.rotation
}

fn unit_scale() -> [f64; 3] {
    [1.0; 3]
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub location: [f64; 3],
    #[serde(default = "identity_rotation")]
    pub rotation: [f64; 4],
    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],
}

impl Marker {
    pub fn at(location: [f64; 3]) -> Self {
        Self {
            location,
            rotation: identity_rotation(),
            scale: unit_scale(),
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.location, self.rotation)
    }
}

/// Source of named markers. Lookups are case-sensitive.
pub trait MarkProvider: fmt::Debug {
    fn get_mark(&self, name: &str) -> Option<Marker>;
}

/// In-memory marker table, loadable from JSON (`{"name": {"location": [...]}}`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerSet {
    marks: IndexMap<String, Marker>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> StageResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, name: &str, marker: Marker) {
        self.marks.insert(name.to_string(), marker);
    }

    pub fn with(mut self, name: &str, marker: Marker) -> Self {
        self.insert(name, marker);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.marks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

impl MarkProvider for MarkerSet {
    fn get_mark(&self, name: &str) -> Option<Marker> {
        self.marks.get(name).copied()
    }
}
