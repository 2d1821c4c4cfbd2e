//! Identity keys for girders, segments, points of interest and tendons.
//!
//! Everything in the model refers to everything else by key. Segments and
//! closure joints are resolved through the owning [`BridgeModel`] rather than
//! by holding references to each other.
//!
//! [`BridgeModel`]: crate::model::bridge::BridgeModel

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index into the interval timeline.
pub type IntervalIndex = usize;

/// Identifies a timeline event (casting, stressing, erection, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u32);

/// A girder line within a group of spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GirderKey {
    pub group: usize,
    pub girder: usize,
}

impl GirderKey {
    pub fn new(group: usize, girder: usize) -> Self {
        GirderKey { group, girder }
    }

    pub fn segment(self, segment: usize) -> SegmentKey {
        SegmentKey {
            group: self.group,
            girder: self.girder,
            segment,
        }
    }
}

impl fmt::Display for GirderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group {} Girder {}", self.group + 1, girder_letter(self.girder))
    }
}

/// A precast segment of a girder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentKey {
    pub group: usize,
    pub girder: usize,
    pub segment: usize,
}

impl SegmentKey {
    pub fn girder_key(self) -> GirderKey {
        GirderKey {
            group: self.group,
            girder: self.girder,
        }
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Segment {}", self.girder_key(), self.segment + 1)
    }
}

fn girder_letter(index: usize) -> String {
    let mut n = index;
    let mut label = String::new();
    loop {
        label.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label
}

/// Stable point-of-interest identifier, unique within a bridge model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoiId(pub u32);

impl fmt::Display for PoiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Descriptive flags attached to a point of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoiAttributes {
    #[serde(default)]
    pub mid_span: bool,
    /// The POI lies in a cast-in-place closure joint rather than a precast segment.
    #[serde(default)]
    pub closure_joint: bool,
}

/// A location on a girder where results are computed and reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: PoiId,
    /// Segment that owns the location. Closure joints belong to the segment on their left.
    pub segment: SegmentKey,
    /// Distance from the start of the segment
    pub x_segment_in: f64,
    /// Distance from the start of the girder
    pub x_girder_in: f64,
    #[serde(default)]
    pub attributes: PoiAttributes,
}

impl PointOfInterest {
    pub fn girder_key(&self) -> GirderKey {
        self.segment.girder_key()
    }
}

/// Which kind of duct a tendon occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TendonKey {
    /// Duct running the full length of a spliced girder
    Girder { duct: usize },
    /// Duct contained within one segment
    Segment { segment: usize, duct: usize },
}

impl TendonKey {
    pub fn duct(self) -> usize {
        match self {
            TendonKey::Girder { duct } | TendonKey::Segment { duct, .. } => duct,
        }
    }
}

impl fmt::Display for TendonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TendonKey::Girder { duct } => write!(f, "Girder duct {}", duct + 1),
            TendonKey::Segment { segment, duct } => {
                write!(f, "Segment {} duct {}", segment + 1, duct + 1)
            }
        }
    }
}

/// End of a tendon or segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EndType {
    Start,
    End,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_girder_labels() {
        assert_eq!(GirderKey::new(0, 0).to_string(), "Group 1 Girder A");
        assert_eq!(GirderKey::new(1, 27).to_string(), "Group 2 Girder AB");
    }

    #[test]
    fn test_segment_round_trip_to_girder() {
        let girder = GirderKey::new(2, 3);
        let segment = girder.segment(1);
        assert_eq!(segment.girder_key(), girder);
        assert_eq!(segment.to_string(), "Group 3 Girder D Segment 2");
    }

    #[test]
    fn test_tendon_key_ordering() {
        let a = TendonKey::Girder { duct: 1 };
        let b = TendonKey::Segment { segment: 0, duct: 0 };
        assert!(a < b);
        assert_eq!(b.duct(), 0);
    }
}
