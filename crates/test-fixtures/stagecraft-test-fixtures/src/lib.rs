//! JSON fixtures shared by the stagecraft test suites, indexed by `fixtures/manifest.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

/// Fixture name to path relative to the fixtures directory, per shelf.
#[derive(Debug, Deserialize)]
struct Manifest {
    kinds: BTreeMap<String, String>,
    #[serde(default)]
    marks: BTreeMap<String, String>,
}

#[derive(Clone, Copy)]
enum Shelf {
    Kinds,
    Marks,
}

impl Shelf {
    fn entries(self) -> &'static BTreeMap<String, String> {
        match self {
            Shelf::Kinds => &MANIFEST.kinds,
            Shelf::Marks => &MANIFEST.marks,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Shelf::Kinds => "kind",
            Shelf::Marks => "mark set",
        }
    }

    fn keys(self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }

    fn path(self, name: &str) -> Result<PathBuf> {
        let rel = self
            .entries()
            .get(name)
            .ok_or_else(|| anyhow!("unknown {} fixture '{name}'", self.label()))?;
        Ok(Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(rel))
    }

    fn load<T: DeserializeOwned>(self, name: &str) -> Result<T> {
        let path = self.path(name)?;
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read fixture at {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {} fixture {name}", self.label()))
    }
}

/// Object kind definitions (properties, sockets, actions).
pub mod kinds {
    use super::{DeserializeOwned, Result, Shelf};

    /// Names in sorted order.
    pub fn keys() -> Vec<String> {
        Shelf::Kinds.keys()
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Shelf::Kinds.load(name)
    }
}

/// Marker sets used to seed initial positions.
pub mod marks {
    use super::{DeserializeOwned, Result, Shelf};

    pub fn keys() -> Vec<String> {
        Shelf::Marks.keys()
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Shelf::Marks.load(name)
    }
}
