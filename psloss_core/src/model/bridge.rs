//! # In-Memory Bridge Model
//!
//! A serde-friendly description of girders, segments, ducts, section
//! properties and applied loads, implementing every provider trait the loss
//! engine consumes. Applications with their own bridge database implement the
//! traits directly instead.
//!
//! ## Structure
//!
//! ```text
//! BridgeModel
//! ├── timeline: Timeline
//! ├── relative_humidity
//! ├── deck: Option<DeckData>
//! └── girders: Vec<GirderData>
//!     ├── segments: Vec<SegmentData> (concrete, strands, segment ducts, events, closure)
//!     ├── ducts: Vec<DuctData>       (girder ducts)
//!     ├── pois: Vec<PoiRecord>       (POI + section properties)
//!     └── loads: Vec<AppliedLoad>    (product load moments by event)
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::beam::uniform_load_moment;
use crate::equations::section::{composite_section, SectionProperties};
use crate::errors::{LossError, LossResult};
use crate::model::interval::{IntervalTimeline, Timeline};
use crate::model::keys::{EventId, GirderKey, IntervalIndex, PoiId, PointOfInterest, SegmentKey};
use crate::model::materials::ConcreteMaterial;
use crate::model::strands::SegmentStrands;
use crate::model::tendon::DuctData;
use crate::providers::{
    BridgeGeometryProvider, LoadProvider, LossInputs, ProductForce, ProductLoad, SectionPart,
    SectionPropertyMode, SectionPropertyProvider,
};

/// Construction events of a precast segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentEvents {
    pub casting: EventId,
    /// Strands tensioned in the bed
    pub strand_stressing: EventId,
    /// Strands cut and prestress transferred to the concrete
    pub release: EventId,
    /// Segment lifted from the bed and hauled to the site
    #[serde(default)]
    pub hauling: Option<EventId>,
    #[serde(default)]
    pub temporary_strand_removal: Option<EventId>,
}

/// Cast-in-place closure joint at the end of a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureData {
    pub concrete: ConcreteMaterial,
    pub casting_event: EventId,
    /// Closure concrete becomes structural
    pub composite_event: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckData {
    pub concrete: ConcreteMaterial,
    pub casting_event: EventId,
    /// Deck acts compositely with the girders
    pub composite_event: EventId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentData {
    pub length_in: f64,
    pub concrete: ConcreteMaterial,
    #[serde(default)]
    pub strands: SegmentStrands,
    #[serde(default)]
    pub ducts: Vec<DuctData>,
    pub events: SegmentEvents,
    #[serde(default)]
    pub closure: Option<ClosureData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiSection {
    pub girder_gross: SectionProperties,
    #[serde(default)]
    pub girder_net: Option<SectionProperties>,
    #[serde(default)]
    pub deck: Option<SectionProperties>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiRecord {
    pub poi: PointOfInterest,
    pub section: PoiSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoiForce {
    pub poi: PoiId,
    #[serde(default)]
    pub axial_kip: f64,
    pub moment_kipin: f64,
}

/// A product load applied at the start of the interval that begins with `event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedLoad {
    pub event: EventId,
    pub load: ProductLoad,
    pub forces: Vec<PoiForce>,
}

impl AppliedLoad {
    /// Uniform load `w` (kip/in) on a simple span starting at girder station `span_start_in`.
    pub fn uniform(
        event: EventId,
        load: ProductLoad,
        w_kip_per_in: f64,
        span_start_in: f64,
        span_length_in: f64,
        pois: &[PointOfInterest],
    ) -> Self {
        let forces = pois
            .iter()
            .map(|poi| PoiForce {
                poi: poi.id,
                axial_kip: 0.0,
                moment_kipin: uniform_load_moment(w_kip_per_in, span_length_in, poi.x_girder_in - span_start_in),
            })
            .collect();
        AppliedLoad { event, load, forces }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GirderData {
    pub key: GirderKey,
    pub segments: Vec<SegmentData>,
    #[serde(default)]
    pub ducts: Vec<DuctData>,
    pub pois: Vec<PoiRecord>,
    #[serde(default)]
    pub loads: Vec<AppliedLoad>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeModel {
    pub timeline: Timeline,
    pub relative_humidity: f64,
    #[serde(default)]
    pub deck: Option<DeckData>,
    pub girders: Vec<GirderData>,
}

impl BridgeModel {
    pub fn inputs(&self) -> LossInputs<'_> {
        LossInputs {
            timeline: &self.timeline,
            sections: self,
            geometry: self,
            loads: self,
        }
    }

    pub fn girder(&self, key: GirderKey) -> Option<&GirderData> {
        self.girders.iter().find(|g| g.key == key)
    }

    fn segment(&self, key: SegmentKey) -> Option<&SegmentData> {
        self.girder(key.girder_key())?.segments.get(key.segment)
    }

    fn poi_record(&self, poi: &PointOfInterest) -> Option<&PoiRecord> {
        self.girder(poi.girder_key())?
            .pois
            .iter()
            .find(|r| r.poi.id == poi.id)
    }

    pub fn find_poi(&self, id: PoiId) -> Option<&PointOfInterest> {
        self.girders
            .iter()
            .flat_map(|g| g.pois.iter())
            .map(|r| &r.poi)
            .find(|p| p.id == id)
    }

    fn event_interval(&self, event: EventId, field: &str) -> LossResult<IntervalIndex> {
        self.timeline.interval_by_event(event).ok_or_else(|| {
            LossError::invalid_input(field, event.0.to_string(), "No interval starts with this event")
        })
    }

    /// Concrete of the member that owns `poi` (segment or closure joint).
    fn poi_concrete(&self, poi: &PointOfInterest) -> Option<ConcreteMaterial> {
        let segment = self.segment(poi.segment)?;
        if poi.attributes.closure_joint {
            segment.closure.as_ref().map(|c| c.concrete.clone())
        } else {
            Some(segment.concrete.clone())
        }
    }

    /// Check references between girders, segments, POIs, events and ducts.
    pub fn validate(&self) -> LossResult<()> {
        if !(0.0..=100.0).contains(&self.relative_humidity) {
            return Err(LossError::invalid_input(
                "relative_humidity",
                self.relative_humidity.to_string(),
                "Relative humidity must be between 0 and 100 percent",
            ));
        }
        if let Some(deck) = &self.deck {
            deck.concrete.validate("deck.concrete")?;
            self.event_interval(deck.casting_event, "deck.casting_event")?;
            self.event_interval(deck.composite_event, "deck.composite_event")?;
        }
        for girder in &self.girders {
            if girder.segments.is_empty() {
                return Err(LossError::missing_field(format!("{}.segments", girder.key)));
            }
            for (s, segment) in girder.segments.iter().enumerate() {
                let label = girder.key.segment(s).to_string();
                segment.concrete.validate(&label)?;
                segment.strands.validate(&label)?;
                let events = &segment.events;
                let stress = self.event_interval(events.strand_stressing, "events.strand_stressing")?;
                let release = self.event_interval(events.release, "events.release")?;
                self.event_interval(events.casting, "events.casting")?;
                if release < stress {
                    return Err(LossError::invalid_input(
                        format!("{}.events.release", label),
                        events.release.0.to_string(),
                        "Strands must be released after they are stressed",
                    ));
                }
                if let Some(hauling) = events.hauling {
                    if self.event_interval(hauling, "events.hauling")? < release {
                        return Err(LossError::invalid_input(
                            format!("{}.events.hauling", label),
                            hauling.0.to_string(),
                            "Segments are hauled after release",
                        ));
                    }
                }
                if let Some(removal) = events.temporary_strand_removal {
                    self.event_interval(removal, "events.temporary_strand_removal")?;
                }
                for (d, duct) in segment.ducts.iter().enumerate() {
                    duct.validate(&format!("{} duct {}", label, d + 1))?;
                    self.event_interval(duct.stressing_event, "duct.stressing_event")?;
                }
                if let Some(closure) = &segment.closure {
                    closure.concrete.validate(&format!("{} closure", label))?;
                    self.event_interval(closure.casting_event, "closure.casting_event")?;
                    self.event_interval(closure.composite_event, "closure.composite_event")?;
                }
            }
            for (d, duct) in girder.ducts.iter().enumerate() {
                duct.validate(&format!("{} duct {}", girder.key, d + 1))?;
                self.event_interval(duct.stressing_event, "duct.stressing_event")?;
            }
            for record in &girder.pois {
                let poi = &record.poi;
                if poi.girder_key() != girder.key || poi.segment.segment >= girder.segments.len() {
                    return Err(LossError::invalid_input(
                        "poi.segment",
                        poi.segment.to_string(),
                        format!("POI {} does not belong to {}", poi.id, girder.key),
                    ));
                }
                if poi.attributes.closure_joint && girder.segments[poi.segment.segment].closure.is_none() {
                    return Err(LossError::invalid_input(
                        "poi.attributes.closure_joint",
                        poi.id.to_string(),
                        "POI is flagged as a closure joint but the segment has no closure",
                    ));
                }
                if !record.section.girder_gross.is_valid() {
                    return Err(LossError::invalid_input(
                        "poi.section.girder_gross",
                        poi.id.to_string(),
                        "Gross girder area and inertia must be positive",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl SectionPropertyProvider for BridgeModel {
    fn section_properties(
        &self,
        part: SectionPart,
        mode: SectionPropertyMode,
        interval: IntervalIndex,
        poi: &PointOfInterest,
    ) -> Option<SectionProperties> {
        let record = self.poi_record(poi)?;
        let girder = match mode {
            SectionPropertyMode::Gross => record.section.girder_gross,
            SectionPropertyMode::Net => record.section.girder_net.unwrap_or(record.section.girder_gross),
        };
        let deck_active = || {
            let deck = self.deck.as_ref()?;
            let composite = self.timeline.interval_by_event(deck.composite_event)?;
            if interval >= composite {
                record.section.deck
            } else {
                None
            }
        };
        match part {
            SectionPart::Girder => Some(girder),
            SectionPart::Deck => deck_active(),
            SectionPart::Composite => {
                let deck_section = deck_active()?;
                let deck_ec = self.deck.as_ref()?.concrete.ec_ksi();
                let girder_ec = self.poi_concrete(poi)?.ec_ksi();
                Some(composite_section(&girder, &deck_section, deck_ec / girder_ec))
            }
        }
    }
}

impl BridgeGeometryProvider for BridgeModel {
    fn girders(&self) -> Vec<GirderKey> {
        self.girders.iter().map(|g| g.key).collect()
    }

    fn points_of_interest(&self, girder: GirderKey) -> Vec<PointOfInterest> {
        let mut pois: Vec<PointOfInterest> = self
            .girder(girder)
            .map(|g| g.pois.iter().map(|r| r.poi.clone()).collect())
            .unwrap_or_default();
        pois.sort_by(|a, b| a.x_girder_in.total_cmp(&b.x_girder_in));
        pois
    }

    fn segment_concrete(&self, segment: SegmentKey) -> Option<ConcreteMaterial> {
        self.segment(segment).map(|s| s.concrete.clone())
    }

    fn segment_strands(&self, segment: SegmentKey) -> SegmentStrands {
        self.segment(segment).map(|s| s.strands.clone()).unwrap_or_default()
    }

    fn segment_events(&self, segment: SegmentKey) -> Option<SegmentEvents> {
        self.segment(segment).map(|s| s.events)
    }

    fn closure(&self, segment: SegmentKey) -> Option<ClosureData> {
        self.segment(segment)?.closure.clone()
    }

    fn girder_ducts(&self, girder: GirderKey) -> Vec<DuctData> {
        self.girder(girder).map(|g| g.ducts.clone()).unwrap_or_default()
    }

    fn segment_ducts(&self, segment: SegmentKey) -> Vec<DuctData> {
        self.segment(segment).map(|s| s.ducts.clone()).unwrap_or_default()
    }

    fn deck(&self) -> Option<DeckData> {
        self.deck.clone()
    }

    fn relative_humidity(&self) -> f64 {
        self.relative_humidity
    }
}

impl LoadProvider for BridgeModel {
    fn applied_forces(&self, interval: IntervalIndex, poi: &PointOfInterest) -> Vec<ProductForce> {
        let Some(girder) = self.girder(poi.girder_key()) else {
            return Vec::new();
        };
        girder
            .loads
            .iter()
            .filter(|load| self.timeline.interval_by_event(load.event) == Some(interval))
            .filter_map(|load| {
                load.forces.iter().find(|f| f.poi == poi.id).map(|f| ProductForce {
                    load: load.load,
                    axial_kip: f.axial_kip,
                    moment_kipin: f.moment_kipin,
                })
            })
            .collect()
    }

    fn total_moment(&self, load: ProductLoad, poi: &PointOfInterest) -> f64 {
        let Some(girder) = self.girder(poi.girder_key()) else {
            return 0.0;
        };
        girder
            .loads
            .iter()
            .filter(|l| l.load == load)
            .flat_map(|l| l.forces.iter())
            .filter(|f| f.poi == poi.id)
            .map(|f| f.moment_kipin)
            .sum()
    }
}
