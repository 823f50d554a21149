//! Object kinds: declared properties, sockets, custom properties and actions.
//!
//! Kinds are validated once when registered on a stage; objects only ever
//! reference validated kinds.

use std::sync::Arc;

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::action::{ActionRegistry, ActionTemplate};
use crate::error::{StageError, StageResult};
use crate::property::reserved_defaults;
use crate::transform::Transform;
use crate::value::{Value, ValueKind};

/// Linear remap of a scalar from `domain` onto `range` (no clamping).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeMap {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl RangeMap {
    pub fn apply(&self, x: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        if span.abs() <= f64::EPSILON {
            return r0;
        }
        r0 + (x - d0) / span * (r1 - r0)
    }
}

/// One underlying property driven by a custom property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyTarget {
    pub property: String,
    #[serde(default)]
    pub map: Option<RangeMap>,
}

fn default_true() -> bool {
    true
}

/// A user-facing knob that fans out to one or more underlying properties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomProperty {
    pub targets: Vec<PropertyTarget>,
    #[serde(default = "default_true")]
    pub animatable: bool,
}

impl CustomProperty {
    /// Resolve a customize value into `(property, value)` writes.
    pub fn fan_out(&self, value: &Value) -> Vec<(String, Value)> {
        self.targets
            .iter()
            .map(|target| {
                let mapped = match (target.map, value) {
                    (Some(map), Value::Scalar(x)) => Value::Scalar(map.apply(*x)),
                    _ => value.clone(),
                };
                (target.property.clone(), mapped)
            })
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectKind {
    pub name: String,
    /// Declared properties with their defaults (in addition to the reserved ones).
    #[serde(default)]
    pub properties: IndexMap<String, Value>,
    /// Declared properties that may only be set instantly.
    #[serde(default)]
    pub fixed: Vec<String>,
    #[serde(default)]
    pub sockets: IndexMap<String, Transform>,
    #[serde(default)]
    pub custom: IndexMap<String, CustomProperty>,
    #[serde(default)]
    pub actions: ActionRegistry,
}

impl ObjectKind {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, name: &str, default: impl Into<Value>) -> Self {
        self.properties.insert(name.to_string(), default.into());
        self
    }

    pub fn with_fixed_property(mut self, name: &str, default: impl Into<Value>) -> Self {
        self.properties.insert(name.to_string(), default.into());
        self.fixed.push(name.to_string());
        self
    }

    pub fn with_socket(mut self, name: &str, local: Transform) -> Self {
        self.sockets.insert(name.to_string(), local);
        self
    }

    pub fn with_custom(mut self, name: &str, custom: CustomProperty) -> Self {
        self.custom.insert(name.to_string(), custom);
        self
    }

    pub fn with_action(mut self, name: &str, template: ActionTemplate) -> Self {
        self.actions.insert(name, template);
        self
    }

    pub fn socket(&self, name: &str) -> StageResult<&Transform> {
        self.sockets.get(name).ok_or_else(|| StageError::UnknownSocket {
            kind: self.name.clone(),
            socket: name.to_string(),
        })
    }

    pub fn action(&self, name: &str) -> StageResult<&ActionTemplate> {
        self.actions.get(name).ok_or_else(|| StageError::UnknownAction {
            kind: self.name.clone(),
            action: name.to_string(),
        })
    }

    pub fn is_fixed(&self, property: &str) -> bool {
        self.fixed.iter().any(|p| p == property)
    }

    /// Declared type of a property, reserved ones included.
    pub fn declared_kind(&self, property: &str) -> Option<ValueKind> {
        self.properties.get(property).map(Value::kind).or_else(|| {
            reserved_defaults()
                .into_iter()
                .find(|(name, _)| *name == property)
                .map(|(_, v)| v.kind())
        })
    }

    /// Check cross references: custom targets, action tracks and fixed names
    /// must name declared properties with matching types.
    pub fn validate(&self) -> StageResult<()> {
        let invalid = |reason: String| StageError::InvalidKind {
            kind: self.name.clone(),
            reason,
        };
        for name in &self.fixed {
            if !self.properties.contains_key(name) {
                return Err(invalid(format!("fixed property '{name}' is not declared")));
            }
        }
        for (name, custom) in &self.custom {
            if self.declared_kind(name).is_some() {
                return Err(invalid(format!("custom property '{name}' shadows a property")));
            }
            for target in &custom.targets {
                let kind = self.declared_kind(&target.property).ok_or_else(|| {
                    invalid(format!(
                        "custom property '{name}' targets unknown '{}'",
                        target.property
                    ))
                })?;
                if target.map.is_some() && kind != ValueKind::Scalar {
                    return Err(invalid(format!(
                        "custom property '{name}' maps non-scalar '{}'",
                        target.property
                    )));
                }
            }
        }
        for (action, template) in self.actions.iter() {
            for track in &template.tracks {
                track.validate_basic().map_err(invalid)?;
                let kind = self.declared_kind(&track.property).ok_or_else(|| {
                    invalid(format!(
                        "action '{action}' animates unknown '{}'",
                        track.property
                    ))
                })?;
                if let Some(key) = track.keys.iter().find(|k| k.value.kind() != kind) {
                    return Err(StageError::TypeMismatch {
                        property: track.property.clone(),
                        expected: kind,
                        actual: key.value.kind(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Registered kinds, shared by reference with the objects built from them.
#[derive(Debug, Default)]
pub struct KindRegistry {
    kinds: HashMap<String, Arc<ObjectKind>>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: ObjectKind) -> StageResult<Arc<ObjectKind>> {
        if self.kinds.contains_key(&kind.name) {
            return Err(StageError::DuplicateKind { kind: kind.name });
        }
        kind.validate()?;
        let kind = Arc::new(kind);
        self.kinds.insert(kind.name.clone(), Arc::clone(&kind));
        Ok(kind)
    }

    pub fn get(&self, name: &str) -> StageResult<Arc<ObjectKind>> {
        self.kinds
            .get(name)
            .cloned()
            .ok_or_else(|| StageError::UnknownKind {
                kind: name.to_string(),
            })
    }
}
