//! # Collaborator Interfaces
//!
//! The loss engine reads the bridge through four provider traits. All calls
//! are synchronous and in-process; implementations must return stable values
//! for the duration of one compute call.
//!
//! - [`IntervalTimeline`] - construction/service intervals
//! - [`SectionPropertyProvider`] - area, inertia and centroid per POI and interval
//! - [`BridgeGeometryProvider`] - materials, strands, ducts, events
//! - [`LoadProvider`] - product loads applied in each interval
//!
//! [`LossInputs`] bundles borrowed providers for a single call.
//! [`BridgeModel`](crate::model::bridge::BridgeModel) implements all of them.

use serde::{Deserialize, Serialize};

use crate::equations::section::SectionProperties;
use crate::model::bridge::{ClosureData, DeckData, SegmentEvents};
use crate::model::keys::{GirderKey, IntervalIndex, PointOfInterest, SegmentKey};
use crate::model::materials::ConcreteMaterial;
use crate::model::strands::{GirderConfig, SegmentStrands};
use crate::model::tendon::DuctData;

pub use crate::model::interval::IntervalTimeline;

// ============================================================================
// Section properties
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionPart {
    /// Precast girder (or closure joint) concrete
    Girder,
    /// Deck slab, positioned relative to the top of the girder
    Deck,
    /// Girder plus deck transformed to girder concrete
    Composite,
}

impl SectionPart {
    pub fn label(self) -> &'static str {
        match self {
            SectionPart::Girder => "girder",
            SectionPart::Deck => "deck",
            SectionPart::Composite => "composite",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionPropertyMode {
    /// Gross concrete section
    Gross,
    /// Concrete net of strand and duct holes
    Net,
}

pub trait SectionPropertyProvider {
    /// Properties of `part` at `poi` during `interval`, or `None` if the part
    /// does not exist there.
    fn section_properties(
        &self,
        part: SectionPart,
        mode: SectionPropertyMode,
        interval: IntervalIndex,
        poi: &PointOfInterest,
    ) -> Option<SectionProperties>;
}

// ============================================================================
// Geometry and materials
// ============================================================================

pub trait BridgeGeometryProvider {
    fn girders(&self) -> Vec<GirderKey>;

    /// Points of interest along a girder in increasing girder station
    fn points_of_interest(&self, girder: GirderKey) -> Vec<PointOfInterest>;

    fn segment_concrete(&self, segment: SegmentKey) -> Option<ConcreteMaterial>;

    fn segment_strands(&self, segment: SegmentKey) -> SegmentStrands;

    fn segment_events(&self, segment: SegmentKey) -> Option<SegmentEvents>;

    /// Closure joint at the end of `segment`, if any
    fn closure(&self, segment: SegmentKey) -> Option<ClosureData>;

    fn girder_ducts(&self, girder: GirderKey) -> Vec<DuctData>;

    fn segment_ducts(&self, segment: SegmentKey) -> Vec<DuctData>;

    fn deck(&self) -> Option<DeckData>;

    /// Average annual ambient relative humidity (percent)
    fn relative_humidity(&self) -> f64;
}

/// Geometry provider that substitutes a trial configuration for one segment.
///
/// The wrapped provider is never modified.
pub struct TrialGeometry<'a> {
    base: &'a dyn BridgeGeometryProvider,
    config: &'a GirderConfig,
}

impl<'a> TrialGeometry<'a> {
    pub fn new(base: &'a dyn BridgeGeometryProvider, config: &'a GirderConfig) -> Self {
        TrialGeometry { base, config }
    }
}

impl BridgeGeometryProvider for TrialGeometry<'_> {
    fn girders(&self) -> Vec<GirderKey> {
        self.base.girders()
    }

    fn points_of_interest(&self, girder: GirderKey) -> Vec<PointOfInterest> {
        self.base.points_of_interest(girder)
    }

    fn segment_concrete(&self, segment: SegmentKey) -> Option<ConcreteMaterial> {
        let concrete = self.base.segment_concrete(segment)?;
        if segment == self.config.segment {
            Some(ConcreteMaterial {
                fci_ksi: self.config.fci_ksi,
                fc_ksi: self.config.fc_ksi,
                ..concrete
            })
        } else {
            Some(concrete)
        }
    }

    fn segment_strands(&self, segment: SegmentKey) -> SegmentStrands {
        let strands = self.base.segment_strands(segment);
        if segment == self.config.segment {
            self.config.apply_to(&strands)
        } else {
            strands
        }
    }

    fn segment_events(&self, segment: SegmentKey) -> Option<SegmentEvents> {
        self.base.segment_events(segment)
    }

    fn closure(&self, segment: SegmentKey) -> Option<ClosureData> {
        self.base.closure(segment)
    }

    fn girder_ducts(&self, girder: GirderKey) -> Vec<DuctData> {
        self.base.girder_ducts(girder)
    }

    fn segment_ducts(&self, segment: SegmentKey) -> Vec<DuctData> {
        self.base.segment_ducts(segment)
    }

    fn deck(&self) -> Option<DeckData> {
        self.base.deck()
    }

    fn relative_humidity(&self) -> f64 {
        self.base.relative_humidity()
    }
}

// ============================================================================
// Loads
// ============================================================================

/// Permanent load categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProductLoad {
    GirderSelfWeight,
    Diaphragm,
    /// Slab and haunch weight, carried by the non-composite section
    Deck,
    /// Other dead load on the non-composite section
    UserNoncomposite,
    TrafficBarrier,
    Overlay,
    /// Other dead load on the composite section
    UserComposite,
}

impl ProductLoad {
    pub const ALL: [ProductLoad; 7] = [
        ProductLoad::GirderSelfWeight,
        ProductLoad::Diaphragm,
        ProductLoad::Deck,
        ProductLoad::UserNoncomposite,
        ProductLoad::TrafficBarrier,
        ProductLoad::Overlay,
        ProductLoad::UserComposite,
    ];

    /// Loads other than self weight carried by the non-composite girder
    pub fn is_additional_noncomposite(self) -> bool {
        matches!(self, ProductLoad::Diaphragm | ProductLoad::Deck | ProductLoad::UserNoncomposite)
    }

    pub fn is_superimposed(self) -> bool {
        matches!(self, ProductLoad::TrafficBarrier | ProductLoad::Overlay | ProductLoad::UserComposite)
    }
}

/// Section force increment from one product load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductForce {
    pub load: ProductLoad,
    /// Axial force, tension positive
    #[serde(default)]
    pub axial_kip: f64,
    /// Moment about the centroid of the section carrying the load, sagging positive
    pub moment_kipin: f64,
}

pub trait LoadProvider {
    /// Product load increments first applied at the start of `interval`.
    fn applied_forces(&self, interval: IntervalIndex, poi: &PointOfInterest) -> Vec<ProductForce>;

    /// Moment from `load` summed over all intervals.
    fn total_moment(&self, load: ProductLoad, poi: &PointOfInterest) -> f64;
}

// ============================================================================
// Bundle
// ============================================================================

/// Borrowed providers for one compute call.
#[derive(Clone, Copy)]
pub struct LossInputs<'a> {
    pub timeline: &'a dyn IntervalTimeline,
    pub sections: &'a dyn SectionPropertyProvider,
    pub geometry: &'a dyn BridgeGeometryProvider,
    pub loads: &'a dyn LoadProvider,
}

impl<'a> LossInputs<'a> {
    /// Same inputs with a different geometry provider (used for trial configurations).
    pub fn with_geometry(self, geometry: &'a dyn BridgeGeometryProvider) -> Self {
        LossInputs { geometry, ..self }
    }
}
