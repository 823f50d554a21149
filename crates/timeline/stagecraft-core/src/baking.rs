//! Baking API: sample the whole stage at a fixed frame rate for a renderer.

use serde::{Deserialize, Serialize};

use crate::error::StageResult;
use crate::ids::ObjectId;
use crate::stage::Stage;
use crate::transform::Transform;
use crate::value::Value;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeConfig {
    /// Target frame rate (Hz); `None` uses the stage config.
    pub frame_rate: Option<f64>,
    /// Start time (seconds).
    pub start_time: f64,
    /// End time (seconds); if None, uses the stage clock.
    pub end_time: Option<f64>,
}

impl Default for BakeConfig {
    fn default() -> Self {
        Self {
            frame_rate: None,
            start_time: 0.0,
            end_time: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedTrack {
    pub property: String,
    /// Sampled values at each frame.
    pub values: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedObject {
    pub id: ObjectId,
    pub kind: String,
    pub tracks: Vec<BakedTrack>,
    /// Resolved world transform at each frame.
    pub world: Vec<Transform>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedTimeline {
    pub frame_rate: f64,
    pub start_time: f64,
    pub end_time: f64,
    pub frame_count: usize,
    pub objects: Vec<BakedObject>,
}

/// Bake every live object over `[start_time, end_time]`, both ends inclusive.
pub fn bake(stage: &Stage, cfg: &BakeConfig) -> StageResult<BakedTimeline> {
    let sr = cfg
        .frame_rate
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(stage.config().frame_rate);
    let sr = if sr.is_finite() && sr > 0.0 { sr } else { 24.0 };
    let start = if cfg.start_time.is_finite() {
        cfg.start_time.max(0.0)
    } else {
        0.0
    };
    let end = cfg
        .end_time
        .filter(|e| e.is_finite())
        .unwrap_or_else(|| stage.clock())
        .max(start);
    let frame_count = ((end - start) * sr).ceil() as usize + 1;
    let frame_time = |f: usize| (start + f as f64 / sr).min(end);

    let sampler = stage.sampler();
    let mut objects = Vec::new();
    for obj in stage.objects() {
        let mut tracks: Vec<BakedTrack> = obj
            .props
            .iter()
            .map(|p| BakedTrack {
                property: p.name.clone(),
                values: Vec::with_capacity(frame_count),
            })
            .collect();
        let mut world = Vec::with_capacity(frame_count);
        for f in 0..frame_count {
            let t = frame_time(f);
            let snapshot = sampler.state_of(obj.id, t)?;
            for (track, value) in tracks.iter_mut().zip(snapshot.values.into_values()) {
                track.values.push(value);
            }
            world.push(sampler.resolve_world_transform(obj.id, t)?);
        }
        objects.push(BakedObject {
            id: obj.id,
            kind: obj.kind_name().to_string(),
            tracks,
            world,
        });
    }
    log::debug!(
        "baked {} object(s), {} frame(s) over [{:.3}, {:.3}]",
        objects.len(),
        frame_count,
        start,
        end
    );

    Ok(BakedTimeline {
        frame_rate: sr,
        start_time: start,
        end_time: end,
        frame_count,
        objects,
    })
}

/// Export baked data as serde_json::Value (stable schema for hosts).
pub fn export_baked_json(baked: &BakedTimeline) -> StageResult<serde_json::Value> {
    Ok(serde_json::to_value(baked)?)
}
