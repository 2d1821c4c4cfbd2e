//! # Interval Timeline
//!
//! Construction and service history as an ordered sequence of intervals.
//! Each interval runs from a start event to an end event; instantaneous
//! activities (strand release, tendon stressing, load application) happen at
//! the start of the interval, time-dependent effects accumulate over its
//! duration.
//!
//! ```text
//!  event 0     event 1   event 2                   event 3
//!    │ stress    │ release │ storage                  │ ...
//!    ├───────────┼─────────┼──────────────────────────┤
//!    0           1         1                          60   (days)
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{LossError, LossResult};
use crate::model::keys::{EventId, IntervalIndex};

/// A discrete construction/service stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub index: IntervalIndex,
    pub start_event: EventId,
    pub end_event: EventId,
    /// Absolute time of the start event (days from the start of the project)
    pub start_day: f64,
    pub end_day: f64,
    pub description: String,
}

impl Interval {
    pub fn duration_days(&self) -> f64 {
        self.end_day - self.start_day
    }

    pub fn middle_day(&self) -> f64 {
        0.5 * (self.start_day + self.end_day)
    }
}

/// Read-only view of the construction timeline.
///
/// Implementations must be time ordered and stable for the duration of one
/// compute call.
pub trait IntervalTimeline {
    fn interval_count(&self) -> usize;

    fn interval(&self, index: IntervalIndex) -> Option<&Interval>;

    /// Interval that begins with `event`.
    fn interval_by_event(&self, event: EventId) -> Option<IntervalIndex>;

    fn last_interval(&self) -> Option<IntervalIndex> {
        self.interval_count().checked_sub(1)
    }
}

/// In-memory timeline built from a list of intervals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    intervals: Vec<Interval>,
}

impl Timeline {
    /// Build a timeline, checking that intervals are contiguous and time ordered.
    pub fn new(intervals: Vec<Interval>) -> LossResult<Self> {
        for (i, interval) in intervals.iter().enumerate() {
            if interval.index != i {
                return Err(LossError::invalid_input(
                    "interval.index",
                    interval.index.to_string(),
                    format!("expected {}", i),
                ));
            }
            if interval.end_day < interval.start_day {
                return Err(LossError::invalid_input(
                    "interval.end_day",
                    interval.end_day.to_string(),
                    format!("interval {} ends before it starts", i),
                ));
            }
            if let Some(prev) = i.checked_sub(1).map(|p| &intervals[p]) {
                if (prev.end_day - interval.start_day).abs() > 1e-9 {
                    return Err(LossError::invalid_input(
                        "interval.start_day",
                        interval.start_day.to_string(),
                        format!("interval {} does not start where interval {} ends", i, i - 1),
                    ));
                }
            }
        }
        Ok(Timeline { intervals })
    }

    /// Build a timeline from consecutive `(start_day, end_day, description)`
    /// stages. Event `i` starts interval `i`.
    pub fn from_stages(stages: &[(f64, f64, &str)]) -> LossResult<Self> {
        let intervals = stages
            .iter()
            .enumerate()
            .map(|(i, (start, end, description))| Interval {
                index: i,
                start_event: EventId(i as u32),
                end_event: EventId(i as u32 + 1),
                start_day: *start,
                end_day: *end,
                description: description.to_string(),
            })
            .collect();
        Timeline::new(intervals)
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }
}

impl IntervalTimeline for Timeline {
    fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    fn interval(&self, index: IntervalIndex) -> Option<&Interval> {
        self.intervals.get(index)
    }

    fn interval_by_event(&self, event: EventId) -> Option<IntervalIndex> {
        self.intervals
            .iter()
            .find(|interval| interval.start_event == event)
            .map(|interval| interval.index)
    }
}
