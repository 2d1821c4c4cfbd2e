//! Sample bridge models.
//!
//! Two complete, self-consistent models used by the CLI demo mode and by the
//! test suite:
//!
//! - [`pretensioned_i_girder`]: one 125 ft BT-72 girder with 40 straight
//!   0.6 in strands and a composite deck.
//! - [`spliced_two_duct_girder`]: a 202 ft two-segment spliced BT-72 girder
//!   with a closure joint and two parabolic girder ducts, duct A jacked from
//!   the left in interval 3 and duct B from the right in interval 4.

use crate::equations::beam::uniform_load_moment;
use crate::equations::section::SectionProperties;
use crate::errors::LossResult;
use crate::model::bridge::{
    AppliedLoad, BridgeModel, ClosureData, DeckData, GirderData, PoiForce, PoiRecord, PoiSection,
    SegmentData, SegmentEvents,
};
use crate::model::interval::Timeline;
use crate::model::keys::{EventId, GirderKey, PoiAttributes, PoiId, PointOfInterest};
use crate::model::materials::{ConcreteMaterial, CuringMethod, PrestressingSteel};
use crate::model::profile::Profile;
use crate::model::strands::{SegmentStrands, StrandGroup, StrandType};
use crate::model::tendon::{DuctData, FrictionParameters, JackingEnd};
use crate::providers::ProductLoad;

const STRAND_AREA_IN2: f64 = 0.217;
const GIRDER_HEIGHT_IN: f64 = 72.0;
const CONCRETE_KCF: f64 = 0.150;

/// WSDOT/PCI BT-72 bulb tee
fn bt72() -> SectionProperties {
    SectionProperties::girder(767.0, 545_894.0, GIRDER_HEIGHT_IN - 36.6, GIRDER_HEIGHT_IN)
}

fn deck_slab() -> SectionProperties {
    SectionProperties::slab(96.0, 8.0, 2.0)
}

fn poi_section() -> PoiSection {
    PoiSection {
        girder_gross: bt72(),
        girder_net: None,
        deck: Some(deck_slab()),
    }
}

/// Weight per inch of a concrete area
fn self_weight(area_in2: f64) -> f64 {
    area_in2 / 144.0 * CONCRETE_KCF / 12.0
}

fn deck(casting_event: EventId, composite_event: EventId) -> DeckData {
    DeckData {
        concrete: ConcreteMaterial::new(3.2, 4.0, 3.6),
        casting_event,
        composite_event,
    }
}

/// Single-segment pretensioned girder.
///
/// | Interval | Days        | Activity                            |
/// |----------|-------------|-------------------------------------|
/// | 0        | 0 to 1      | Cast girder, stress strands         |
/// | 1        | 1           | Release prestress                   |
/// | 2        | 1 to 60     | Storage                             |
/// | 3        | 60 to 90    | Erect girder, cast deck             |
/// | 4        | 90 to 91    | Deck composite, install barriers    |
/// | 5        | 91 to 2000  | Service                             |
pub fn pretensioned_i_girder() -> LossResult<BridgeModel> {
    let timeline = Timeline::from_stages(&[
        (0.0, 1.0, "Cast girder, stress strands"),
        (1.0, 1.0, "Release prestress"),
        (1.0, 60.0, "Storage"),
        (60.0, 90.0, "Erect girder, cast deck"),
        (90.0, 91.0, "Deck composite, install barriers"),
        (91.0, 2000.0, "Final"),
    ])?;

    let key = GirderKey::new(0, 0);
    let segment_key = key.segment(0);
    let span_in = 1500.0;

    let pois: Vec<PointOfInterest> = (0..=10)
        .map(|i| {
            let x = span_in * i as f64 / 10.0;
            PointOfInterest {
                id: PoiId(i),
                segment: segment_key,
                x_segment_in: x,
                x_girder_in: x,
                attributes: PoiAttributes {
                    mid_span: i == 5,
                    closure_joint: false,
                },
            }
        })
        .collect();

    let strands = SegmentStrands {
        steel: PrestressingSteel::default(),
        groups: vec![StrandGroup {
            strand_type: StrandType::Straight,
            strand_count: 40,
            strand_area_in2: STRAND_AREA_IN2,
            jacking_force_kip: None,
            profile: Profile::straight(0.0, span_in, GIRDER_HEIGHT_IN - 5.0),
        }],
        ..Default::default()
    };

    let loads = vec![
        AppliedLoad::uniform(EventId(1), ProductLoad::GirderSelfWeight, self_weight(767.0), 0.0, span_in, &pois),
        AppliedLoad::uniform(EventId(3), ProductLoad::Deck, self_weight(96.0 * 8.0 + 2.0 * 42.0), 0.0, span_in, &pois),
        AppliedLoad::uniform(EventId(4), ProductLoad::TrafficBarrier, 0.300 / 12.0, 0.0, span_in, &pois),
    ];

    let girder = GirderData {
        key,
        segments: vec![SegmentData {
            length_in: span_in,
            concrete: ConcreteMaterial::new(6.0, 8.0, 3.0).with_curing(CuringMethod::Accelerated),
            strands,
            ducts: Vec::new(),
            events: SegmentEvents {
                casting: EventId(0),
                strand_stressing: EventId(0),
                release: EventId(1),
                hauling: None,
                temporary_strand_removal: None,
            },
            closure: None,
        }],
        ducts: Vec::new(),
        pois: pois
            .into_iter()
            .map(|poi| PoiRecord {
                poi,
                section: poi_section(),
            })
            .collect(),
        loads,
    };

    Ok(BridgeModel {
        timeline,
        relative_humidity: 75.0,
        deck: Some(deck(EventId(3), EventId(4))),
        girders: vec![girder],
    })
}

/// Two-segment spliced girder with a closure joint and two girder ducts.
///
/// | Interval | Days        | Activity                                 |
/// |----------|-------------|------------------------------------------|
/// | 0        | 0 to 1      | Cast segments, stress strands            |
/// | 1        | 1           | Release prestress                        |
/// | 2        | 1 to 60     | Erect segments, cast closure joint       |
/// | 3        | 60 to 61    | Closure composite, stress duct A (left)  |
/// | 4        | 61 to 62    | Stress duct B (right)                    |
/// | 5        | 62 to 90    | Cast deck                                |
/// | 6        | 90 to 91    | Deck composite, install barriers         |
/// | 7        | 91 to 2000  | Service                                  |
pub fn spliced_two_duct_girder() -> LossResult<BridgeModel> {
    let timeline = Timeline::from_stages(&[
        (0.0, 1.0, "Cast segments, stress strands"),
        (1.0, 1.0, "Release prestress"),
        (1.0, 60.0, "Erect segments, cast closure joint"),
        (60.0, 61.0, "Closure composite, stress duct A"),
        (61.0, 62.0, "Stress duct B"),
        (62.0, 90.0, "Cast deck"),
        (90.0, 91.0, "Deck composite, install barriers"),
        (91.0, 2000.0, "Final"),
    ])?;

    let key = GirderKey::new(0, 0);
    let segment_length = 1200.0;
    let closure_length = 24.0;
    let girder_length = 2.0 * segment_length + closure_length;
    let segment1_start = segment_length + closure_length;

    let mut pois = Vec::new();
    let mut next_id = 0;
    let mut push = |segment: usize, x_segment: f64, x_girder: f64, attributes: PoiAttributes| {
        pois.push(PointOfInterest {
            id: PoiId(next_id),
            segment: key.segment(segment),
            x_segment_in: x_segment,
            x_girder_in: x_girder,
            attributes,
        });
        next_id += 1;
    };
    for x in [0.0, 150.0, 300.0, 600.0, 900.0, 1050.0, 1200.0] {
        push(0, x, x, PoiAttributes::default());
    }
    push(
        0,
        segment_length + 0.5 * closure_length,
        0.5 * girder_length,
        PoiAttributes {
            mid_span: true,
            closure_joint: true,
        },
    );
    for x in [0.0, 300.0, 600.0, 900.0, 1050.0, 1200.0] {
        push(1, x, segment1_start + x, PoiAttributes::default());
    }

    let segment_strands = || SegmentStrands {
        steel: PrestressingSteel::default(),
        groups: vec![StrandGroup {
            strand_type: StrandType::Straight,
            strand_count: 8,
            strand_area_in2: STRAND_AREA_IN2,
            jacking_force_kip: None,
            profile: Profile::straight(0.0, segment_length, GIRDER_HEIGHT_IN - 4.0),
        }],
        ..Default::default()
    };
    let segment_events = SegmentEvents {
        casting: EventId(0),
        strand_stressing: EventId(0),
        release: EventId(1),
        hauling: None,
        temporary_strand_removal: None,
    };
    let friction = FrictionParameters::new(0.0002 / 12.0, 0.25, 0.25);
    let duct_a = DuctData::new(
        Profile::parabolic(0.0, girder_length, 36.0, 66.0, 48),
        19,
        STRAND_AREA_IN2,
        JackingEnd::Left,
        EventId(3),
    )
    .with_friction(friction);
    let duct_b = DuctData::new(
        Profile::parabolic(0.0, girder_length, 30.0, 62.0, 48),
        19,
        STRAND_AREA_IN2,
        JackingEnd::Right,
        EventId(4),
    )
    .with_friction(friction);

    let w_girder = self_weight(767.0);
    // Segments span their own supports until spliced, then the girder spans the full length
    let splice_forces = pois
        .iter()
        .map(|poi| {
            let x = poi.x_girder_in;
            let full = uniform_load_moment(w_girder, girder_length, x);
            let on_segments = uniform_load_moment(w_girder, segment_length, x)
                + uniform_load_moment(w_girder, segment_length, x - segment1_start);
            PoiForce {
                poi: poi.id,
                axial_kip: 0.0,
                moment_kipin: full - on_segments,
            }
        })
        .collect();

    let loads = vec![
        AppliedLoad::uniform(EventId(1), ProductLoad::GirderSelfWeight, w_girder, 0.0, segment_length, &pois),
        AppliedLoad::uniform(EventId(1), ProductLoad::GirderSelfWeight, w_girder, segment1_start, segment_length, &pois),
        AppliedLoad {
            event: EventId(3),
            load: ProductLoad::GirderSelfWeight,
            forces: splice_forces,
        },
        AppliedLoad::uniform(EventId(5), ProductLoad::Deck, self_weight(96.0 * 8.0 + 2.0 * 42.0), 0.0, girder_length, &pois),
        AppliedLoad::uniform(EventId(6), ProductLoad::TrafficBarrier, 0.300 / 12.0, 0.0, girder_length, &pois),
    ];

    let girder = GirderData {
        key,
        segments: vec![
            SegmentData {
                length_in: segment_length,
                concrete: ConcreteMaterial::new(6.0, 8.0, 3.0).with_curing(CuringMethod::Accelerated),
                strands: segment_strands(),
                ducts: Vec::new(),
                events: segment_events,
                closure: Some(ClosureData {
                    concrete: ConcreteMaterial::new(4.0, 6.0, 3.0),
                    casting_event: EventId(2),
                    composite_event: EventId(3),
                }),
            },
            SegmentData {
                length_in: segment_length,
                concrete: ConcreteMaterial::new(6.0, 8.0, 3.0).with_curing(CuringMethod::Accelerated),
                strands: segment_strands(),
                ducts: Vec::new(),
                events: segment_events,
                closure: None,
            },
        ],
        ducts: vec![duct_a, duct_b],
        pois: pois
            .into_iter()
            .map(|poi| PoiRecord {
                poi,
                section: poi_section(),
            })
            .collect(),
        loads,
    };

    Ok(BridgeModel {
        timeline,
        relative_humidity: 75.0,
        deck: Some(deck(EventId(5), EventId(6))),
        girders: vec![girder],
    })
}
