//! Scene objects: an id, a kind and a property store.

use std::sync::Arc;

use crate::error::StageResult;
use crate::ids::ObjectId;
use crate::kind::ObjectKind;
use crate::property::PropertyStore;
use crate::value::Value;

#[derive(Clone, Debug)]
pub struct Object {
    pub id: ObjectId,
    pub kind: Arc<ObjectKind>,
    pub props: PropertyStore,
    /// Removed objects stay resolvable for sampling history but reject new work.
    pub removed: bool,
}

impl Object {
    /// Instantiate `kind`: reserved properties, then the kind's declared
    /// defaults, then caller overrides. Overrides may add new properties;
    /// custom properties fan out to their targets.
    pub(crate) fn new<I, S>(id: ObjectId, kind: Arc<ObjectKind>, initial: I) -> StageResult<Self>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let mut props = PropertyStore::with_reserved();
        for (name, value) in &kind.properties {
            props.register(name, value.clone(), !kind.is_fixed(name))?;
        }
        for (name, value) in initial {
            let name = name.as_ref();
            let writes = match kind.custom.get(name) {
                Some(custom) => custom.fan_out(&value),
                None => vec![(name.to_string(), value)],
            };
            for (prop, value) in writes {
                props.register(&prop, value, !kind.is_fixed(&prop))?;
            }
        }
        Ok(Self {
            id,
            kind,
            props,
            removed: false,
        })
    }

    #[inline]
    pub fn kind_name(&self) -> &str {
        &self.kind.name
    }
}
