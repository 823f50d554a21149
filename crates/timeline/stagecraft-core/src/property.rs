//! Per-object property store.
//!
//! Each property keeps two values: `base`, the construction-time value that
//! sampling falls back to before any Animation touches the property, and
//! `current`, the end value of the latest committed Animation. Builders read
//! `current` so relative operations (shift, rotate, scale) compose with what
//! is already on the timeline.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{StageError, StageResult};
use crate::ids::ObjectId;
use crate::value::{Value, ValueKind};

pub const POSITION: &str = "position";
pub const ROTATION: &str = "rotation";
pub const SCALE: &str = "scale";
pub const VISIBLE: &str = "visible";

/// Properties every object carries regardless of kind.
pub fn reserved_defaults() -> [(&'static str, Value); 4] {
    [
        (POSITION, Value::vec3(0.0, 0.0, 0.0)),
        (ROTATION, Value::identity_rotation()),
        (SCALE, Value::vec3(1.0, 1.0, 1.0)),
        (VISIBLE, Value::Bool(true)),
    ]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub kind: ValueKind,
    pub base: Value,
    pub current: Value,
    pub animatable: bool,
}

impl Property {
    fn new(name: &str, value: Value, animatable: bool) -> Self {
        Self {
            name: name.to_string(),
            kind: value.kind(),
            base: value.clone(),
            current: value,
            animatable,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PropertyStore {
    props: IndexMap<String, Property>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the reserved transform/visibility properties.
    pub fn with_reserved() -> Self {
        let mut store = Self::new();
        for (name, value) in reserved_defaults() {
            store.props.insert(name.to_string(), Property::new(name, value, true));
        }
        store
    }

    /// Register a property. Re-registering an existing name keeps its type
    /// tag; the new value replaces both base and current.
    pub fn register(&mut self, name: &str, value: Value, animatable: bool) -> StageResult<()> {
        match self.props.get_mut(name) {
            Some(prop) => {
                if prop.kind != value.kind() {
                    return Err(StageError::TypeMismatch {
                        property: name.to_string(),
                        expected: prop.kind,
                        actual: value.kind(),
                    });
                }
                prop.base = value.clone();
                prop.current = value;
                prop.animatable = animatable;
            }
            None => {
                self.props
                    .insert(name.to_string(), Property::new(name, value, animatable));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.props.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    #[inline]
    pub fn current(&self, name: &str) -> Option<&Value> {
        self.props.get(name).map(|p| &p.current)
    }

    /// Validate that `value` may be written to `name`: the property exists and
    /// the type tag matches.
    pub fn check(&self, object: ObjectId, name: &str, value: &Value) -> StageResult<&Property> {
        let prop = self.props.get(name).ok_or_else(|| StageError::UnknownProperty {
            object,
            property: name.to_string(),
        })?;
        if prop.kind != value.kind() {
            return Err(StageError::TypeMismatch {
                property: name.to_string(),
                expected: prop.kind,
                actual: value.kind(),
            });
        }
        Ok(prop)
    }

    /// Advance the committed value. Callers have already run `check`.
    pub(crate) fn set_current(&mut self, name: &str, value: Value) {
        if let Some(prop) = self.props.get_mut(name) {
            prop.current = value;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.props.values()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}
