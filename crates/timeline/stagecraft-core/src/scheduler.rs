//! Global clock and timing of `play` / `play_staggered` windows.
//!
//! The scheduler owns the clock and the timeline. It decides *when* each
//! builder runs; the stage materializes builders into a plan and hands the
//! resulting segments back here to be checked and appended.

use crate::builder::AnimationBuilder;
use crate::config::{Config, OverlapPolicy};
use crate::error::{check_duration, StageError, StageResult};
use crate::ids::SegmentId;
use crate::timeline::{Animation, Timeline};

/// One group in a staggered play: builders that start `offset` seconds after
/// the group start and run for `duration`.
#[derive(Clone, Debug, PartialEq)]
pub struct StaggerEntry {
    pub offset: f64,
    pub duration: f64,
    pub builders: Vec<AnimationBuilder>,
}

impl StaggerEntry {
    pub fn new(
        offset: f64,
        duration: f64,
        builders: impl IntoIterator<Item = AnimationBuilder>,
    ) -> Self {
        Self {
            offset,
            duration,
            builders: builders.into_iter().collect(),
        }
    }
}

/// A builder placed on the timeline: absolute start plus default duration.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Slot<'b> {
    pub builder: &'b AnimationBuilder,
    pub start: f64,
    pub duration: f64,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    clock: f64,
    timeline: Timeline,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current global time. Only moves forward.
    #[inline]
    pub fn clock(&self) -> f64 {
        self.clock
    }

    #[inline]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Place every builder at the clock. Returns the slots and the clock
    /// advance (`duration`, even when builders override their own).
    pub(crate) fn schedule_play<'b>(
        &self,
        builders: &'b [AnimationBuilder],
        duration: f64,
    ) -> StageResult<(Vec<Slot<'b>>, f64)> {
        let duration = check_duration(duration)?;
        let slots = builders
            .iter()
            .map(|builder| Slot {
                builder,
                start: self.clock,
                duration,
            })
            .collect();
        Ok((slots, duration))
    }

    /// Place each entry at `clock + offset`. The clock advance is the group
    /// span `max(offset + duration)`; zero entries schedule nothing.
    pub(crate) fn schedule_staggered<'b>(
        &self,
        entries: &'b [StaggerEntry],
    ) -> StageResult<(Vec<Slot<'b>>, f64)> {
        let mut span: f64 = 0.0;
        for entry in entries {
            let offset = check_duration(entry.offset)?;
            let duration = check_duration(entry.duration)?;
            span = span.max(offset + duration);
        }
        let slots = entries
            .iter()
            .flat_map(|entry| {
                entry.builders.iter().map(move |builder| Slot {
                    builder,
                    start: self.clock + entry.offset,
                    duration: entry.duration,
                })
            })
            .collect();
        Ok((slots, span))
    }

    /// Check pending segments against committed ones and each other.
    /// Under `LaterStartWins` overlaps are only logged.
    pub(crate) fn check_overlaps(&self, pending: &[Animation], cfg: &Config) -> StageResult<()> {
        let eps = cfg.time_epsilon;
        for (i, seg) in pending.iter().enumerate() {
            let clash = self
                .timeline
                .first_overlap(seg, eps)
                .or_else(|| {
                    pending[..i].iter().find(|other| {
                        other.target == seg.target
                            && other.property == seg.property
                            && other.overlaps(seg, eps)
                    })
                });
            let Some(clash) = clash else { continue };
            match cfg.overlap_policy {
                OverlapPolicy::Reject => {
                    return Err(StageError::OverlappingWrite {
                        object: seg.target,
                        property: seg.property.clone(),
                        start: seg.start,
                        end: seg.end(),
                    })
                }
                OverlapPolicy::LaterStartWins => log::warn!(
                    "overlapping writes on {}.{}: [{:.3}, {:.3}] and [{:.3}, {:.3}]",
                    seg.target,
                    seg.property,
                    clash.start,
                    clash.end(),
                    seg.start,
                    seg.end()
                ),
            }
        }
        Ok(())
    }

    pub(crate) fn append(&mut self, segments: Vec<Animation>) -> Vec<SegmentId> {
        segments
            .into_iter()
            .map(|seg| {
                log::trace!(
                    "segment {}.{} [{:.3}, {:.3}]",
                    seg.target,
                    seg.property,
                    seg.start,
                    seg.end()
                );
                self.timeline.push(seg)
            })
            .collect()
    }

    pub(crate) fn advance(&mut self, by: f64) {
        self.clock += by;
        log::debug!("clock advanced by {:.3} to {:.3}", by, self.clock);
    }
}
