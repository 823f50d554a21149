//! Stagecraft core (renderer-agnostic)
//!
//! A declarative scene-animation timeline: scripts create objects, describe
//! property changes through fluent builders, and hand them to `play` /
//! `play_staggered`, which place them on a global clock. The resulting
//! timeline is sampled on demand (`state_of`, `resolve_world_transform`) or
//! baked at a fixed frame rate for an external renderer.

pub mod action;
pub mod attach;
pub mod baking;
pub mod builder;
pub mod config;
pub mod error;
pub mod grid;
pub mod ids;
pub mod interp;
pub mod kind;
pub mod marks;
pub mod object;
mod plan;
pub mod property;
pub mod sampling;
pub mod scheduler;
pub mod stage;
pub mod timeline;
pub mod transform;
pub mod value;

// Re-exports for scripts and hosts
pub use action::{ActionKey, ActionRegistry, ActionTemplate, ActionTrack};
pub use attach::{AttachmentEdge, AttachmentGraph};
pub use baking::{bake, export_baked_json, BakeConfig, BakedObject, BakedTimeline, BakedTrack};
pub use builder::AnimationBuilder;
pub use config::{Config, OverlapPolicy};
pub use error::{StageError, StageResult};
pub use grid::{Grid, GridPoints};
pub use ids::{ObjectId, SegmentId};
pub use interp::Interpolation;
pub use kind::{CustomProperty, KindRegistry, ObjectKind, PropertyTarget, RangeMap};
pub use marks::{MarkProvider, Marker, MarkerSet};
pub use object::Object;
pub use property::{Property, PropertyStore};
pub use sampling::{Sampler, Snapshot};
pub use scheduler::{Scheduler, StaggerEntry};
pub use stage::Stage;
pub use timeline::{Animation, Timeline};
pub use transform::Transform;
pub use value::{Value, ValueKind};
