//! # Time-Step Loss Engine
//!
//! Walks the construction timeline interval by interval for a whole girder,
//! accumulating steel losses and concrete forces at every point of interest.
//!
//! ## Per interval
//!
//! 1. Ducts stressed in the interval get their friction and anchor set
//!    profiles ([`AnchorSetDetails`]); computed once and carried forward.
//! 2. Loads and prestress transferred at the start of the interval act on the
//!    instantaneous transformed section, giving the elastic changes.
//! 3. Creep, shrinkage and relaxation over the duration are fully restrained,
//!    then the restraint is released on the age-adjusted transformed section
//!    with `Ea = E/(1 + χφ)`.
//! 4. The interval's records are committed only when every point of interest
//!    succeeded, so a failure leaves the earlier intervals intact.
//!
//! Secondary restraint forces are released at each section independently
//! (statically determinate girder).
//!
//! ## References
//!
//! - Tadros, Ghali & Dilger (1977), Time-Dependent Analysis of Composite Frames
//! - AASHTO LRFD 5.9.5.2.2b (friction), 5.9.5.2.1 (anchor set), 5.4.2.3 (creep and shrinkage)

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::anchor_set::AnchorSetDetails;
use super::details::{LossComponents, LossDetails, MethodDetails, SectionSnapshot, SteelElement, SteelLoss};
use super::method::LossStrategy;
use super::options::TimeStepOptions;
use crate::equations::section::{transformed_stiffness, SectionElement, SectionProperties, Stiffness};
use crate::errors::{LossError, LossResult};
use crate::model::keys::{EndType, EventId, GirderKey, IntervalIndex, PoiId, PointOfInterest, SegmentKey, TendonKey};
use crate::model::materials::{ConcreteMaterial, PrestressingSteel};
use crate::model::tendon::DuctData;
use crate::providers::{LossInputs, SectionPart, SectionPropertyMode};
use crate::status::{Progress, StatusItem, StatusSink};

// ============================================================================
// Records
// ============================================================================

/// Axial force and moment about a part's own centroid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartForces {
    pub axial_kip: f64,
    pub moment_kipin: f64,
}

impl PartForces {
    pub fn new(axial_kip: f64, moment_kipin: f64) -> Self {
        PartForces { axial_kip, moment_kipin }
    }
}

impl Add for PartForces {
    type Output = PartForces;

    fn add(self, rhs: PartForces) -> PartForces {
        PartForces::new(self.axial_kip + rhs.axial_kip, self.moment_kipin + rhs.moment_kipin)
    }
}

impl AddAssign for PartForces {
    fn add_assign(&mut self, rhs: PartForces) {
        *self = *self + rhs;
    }
}

/// Source of a time-dependent restraint force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RestraintCause {
    Creep,
    Shrinkage,
    Relaxation,
}

impl RestraintCause {
    const ALL: [RestraintCause; 3] = [RestraintCause::Creep, RestraintCause::Shrinkage, RestraintCause::Relaxation];
}

/// Forces split by restraint cause.
#[derive(Debug, Clone, Copy, Default)]
struct CauseForces {
    creep: PartForces,
    shrinkage: PartForces,
    relaxation: PartForces,
}

impl CauseForces {
    fn get(&self, cause: RestraintCause) -> PartForces {
        match cause {
            RestraintCause::Creep => self.creep,
            RestraintCause::Shrinkage => self.shrinkage,
            RestraintCause::Relaxation => self.relaxation,
        }
    }

    fn get_mut(&mut self, cause: RestraintCause) -> &mut PartForces {
        match cause {
            RestraintCause::Creep => &mut self.creep,
            RestraintCause::Shrinkage => &mut self.shrinkage,
            RestraintCause::Relaxation => &mut self.relaxation,
        }
    }
}

/// State of the girder or deck concrete at one point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcretePartState {
    pub part: SectionPart,
    pub section: SectionProperties,
    /// Concrete age at the middle of the interval
    pub age_days: f64,
    pub modulus_ksi: f64,
    pub age_adjusted_modulus_ksi: f64,
    /// φ(end, middle) used for the age-adjusted modulus
    pub creep_coefficient: f64,
    pub free_creep_strain: f64,
    pub free_creep_curvature: f64,
    pub free_shrinkage_strain: f64,
    /// Force change at the start of the interval
    pub elastic: PartForces,
    /// Force change over the duration of the interval
    pub time_dependent: PartForces,
    pub cumulative: PartForces,
    pub top_stress_ksi: f64,
    pub bottom_stress_ksi: f64,
}

/// Intermediate quantities of one interval at one point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeStepDetails {
    pub start_day: f64,
    pub end_day: f64,
    #[serde(default)]
    pub girder: Option<ConcretePartState>,
    #[serde(default)]
    pub deck: Option<ConcretePartState>,
    /// Loads and prestress transferred at the start of the interval, about the
    /// instantaneous centroid
    pub external: PartForces,
    #[serde(default)]
    pub age_adjusted: Option<Stiffness>,
    /// Restraint forces about the age-adjusted centroid
    pub creep_restraint: PartForces,
    pub shrinkage_restraint: PartForces,
    pub relaxation_restraint: PartForces,
    /// Σ ΔN of all parts minus applied axial force
    pub equilibrium_residual_kip: f64,
}

impl TimeStepDetails {
    pub fn part(&self, part: SectionPart) -> Option<&ConcretePartState> {
        match part {
            SectionPart::Girder => self.girder.as_ref(),
            SectionPart::Deck => self.deck.as_ref(),
            SectionPart::Composite => None,
        }
    }
}

// ============================================================================
// Girder context
// ============================================================================

#[derive(Debug, Clone)]
struct ConcreteContext {
    part: SectionPart,
    material: ConcreteMaterial,
    casting_day: f64,
    active_from: IntervalIndex,
}

impl ConcreteContext {
    fn age(&self, day: f64) -> f64 {
        day - self.casting_day
    }
}

#[derive(Debug, Clone)]
struct DuctContext {
    key: TendonKey,
    duct: DuctData,
    stress_interval: IntervalIndex,
    stress_day: f64,
}

#[derive(Debug, Clone)]
struct SegmentContext {
    concrete: ConcreteContext,
    closure: Option<ConcreteContext>,
    strands: crate::model::strands::SegmentStrands,
    stress_interval: IntervalIndex,
    stress_day: f64,
    release_interval: IntervalIndex,
    removal_interval: Option<IntervalIndex>,
}

/// Everything the engine reads from the providers for one girder.
struct GirderContext {
    key: GirderKey,
    pois: Vec<PointOfInterest>,
    segments: BTreeMap<usize, SegmentContext>,
    ducts: BTreeMap<TendonKey, DuctContext>,
    deck: Option<ConcreteContext>,
    humidity: f64,
}

fn event_interval(inputs: &LossInputs<'_>, event: EventId, field: &str) -> LossResult<IntervalIndex> {
    inputs
        .timeline
        .interval_by_event(event)
        .ok_or_else(|| LossError::invalid_input(field, event.0.to_string(), "No interval starts with this event"))
}

fn interval_start(inputs: &LossInputs<'_>, interval: IntervalIndex) -> LossResult<f64> {
    inputs
        .timeline
        .interval(interval)
        .map(|i| i.start_day)
        .ok_or_else(|| LossError::Internal {
            message: format!("interval {} missing from timeline", interval),
        })
}

impl GirderContext {
    fn build(inputs: &LossInputs<'_>, key: GirderKey) -> LossResult<Self> {
        let geometry = inputs.geometry;
        let pois = geometry.points_of_interest(key);

        let mut segments = BTreeMap::new();
        let mut ducts = BTreeMap::new();
        for segment_key in pois.iter().map(|p| p.segment) {
            if segments.contains_key(&segment_key.segment) {
                continue;
            }
            segments.insert(segment_key.segment, Self::segment(inputs, segment_key)?);
            for (d, duct) in geometry.segment_ducts(segment_key).into_iter().enumerate() {
                let tendon = TendonKey::Segment {
                    segment: segment_key.segment,
                    duct: d,
                };
                ducts.insert(tendon, Self::duct(inputs, tendon, duct)?);
            }
        }
        for (d, duct) in geometry.girder_ducts(key).into_iter().enumerate() {
            let tendon = TendonKey::Girder { duct: d };
            ducts.insert(tendon, Self::duct(inputs, tendon, duct)?);
        }

        let deck = match geometry.deck() {
            Some(deck) => {
                let casting = event_interval(inputs, deck.casting_event, "deck.casting_event")?;
                Some(ConcreteContext {
                    part: SectionPart::Deck,
                    material: deck.concrete,
                    casting_day: interval_start(inputs, casting)?,
                    active_from: event_interval(inputs, deck.composite_event, "deck.composite_event")?,
                })
            }
            None => None,
        };

        Ok(GirderContext {
            key,
            pois,
            segments,
            ducts,
            deck,
            humidity: geometry.relative_humidity(),
        })
    }

    fn segment(inputs: &LossInputs<'_>, key: SegmentKey) -> LossResult<SegmentContext> {
        let geometry = inputs.geometry;
        let material = geometry
            .segment_concrete(key)
            .ok_or_else(|| LossError::missing_field(format!("{}.concrete", key)))?;
        let events = geometry
            .segment_events(key)
            .ok_or_else(|| LossError::missing_field(format!("{}.events", key)))?;
        let casting = event_interval(inputs, events.casting, "events.casting")?;
        let stress_interval = event_interval(inputs, events.strand_stressing, "events.strand_stressing")?;
        let release_interval = event_interval(inputs, events.release, "events.release")?;
        let removal_interval = events
            .temporary_strand_removal
            .map(|e| event_interval(inputs, e, "events.temporary_strand_removal"))
            .transpose()?;
        let closure = match geometry.closure(key) {
            Some(closure) => {
                let cast = event_interval(inputs, closure.casting_event, "closure.casting_event")?;
                Some(ConcreteContext {
                    part: SectionPart::Girder,
                    material: closure.concrete,
                    casting_day: interval_start(inputs, cast)?,
                    active_from: event_interval(inputs, closure.composite_event, "closure.composite_event")?,
                })
            }
            None => None,
        };
        Ok(SegmentContext {
            concrete: ConcreteContext {
                part: SectionPart::Girder,
                material,
                casting_day: interval_start(inputs, casting)?,
                active_from: release_interval,
            },
            closure,
            strands: geometry.segment_strands(key),
            stress_interval,
            stress_day: interval_start(inputs, stress_interval)?,
            release_interval,
            removal_interval,
        })
    }

    fn duct(inputs: &LossInputs<'_>, key: TendonKey, duct: DuctData) -> LossResult<DuctContext> {
        duct.validate(&key.to_string())?;
        let stress_interval = event_interval(inputs, duct.stressing_event, "duct.stressing_event")?;
        Ok(DuctContext {
            key,
            stress_day: interval_start(inputs, stress_interval)?,
            stress_interval,
            duct,
        })
    }

    /// Girder (or closure) concrete at a point of interest.
    fn girder_concrete(&self, poi: &PointOfInterest) -> LossResult<&ConcreteContext> {
        let segment = self
            .segments
            .get(&poi.segment.segment)
            .ok_or_else(|| LossError::missing_field(format!("{}", poi.segment)))?;
        if poi.attributes.closure_joint {
            segment
                .closure
                .as_ref()
                .ok_or_else(|| LossError::missing_field(format!("{}.closure", poi.segment)))
        } else {
            Ok(&segment.concrete)
        }
    }

    /// Steel elements passing through a point of interest.
    fn steel_at(&self, poi: &PointOfInterest) -> LossResult<Vec<SteelContext>> {
        let mut steel = Vec::new();
        if !poi.attributes.closure_joint {
            if let Some(segment) = self.segments.get(&poi.segment.segment) {
                for group in segment.strands.active_groups() {
                    if !group.profile.contains(poi.x_segment_in) {
                        continue;
                    }
                    steel.push(SteelContext {
                        element: SteelElement::Strand(group.strand_type),
                        steel: segment.strands.steel,
                        area_in2: group.area_in2(),
                        depth_in: group.profile.depth_at(poi.x_segment_in)?,
                        fpj_ksi: group.fpj_ksi(&segment.strands.steel),
                        stress_interval: segment.stress_interval,
                        stress_day: segment.stress_day,
                        bond_interval: segment.release_interval,
                        removal_interval: if group.strand_type.is_permanent() {
                            None
                        } else {
                            segment.removal_interval
                        },
                        x_in: poi.x_segment_in,
                    });
                }
            }
        }
        for ctx in self.ducts.values().filter(|d| !d.duct.is_empty()) {
            let x = match ctx.key {
                TendonKey::Girder { .. } => poi.x_girder_in,
                TendonKey::Segment { segment, .. } => {
                    if segment != poi.segment.segment || poi.attributes.closure_joint {
                        continue;
                    }
                    poi.x_segment_in
                }
            };
            if !ctx.duct.profile.contains(x) {
                continue;
            }
            steel.push(SteelContext {
                element: SteelElement::Tendon(ctx.key),
                steel: ctx.duct.steel,
                area_in2: ctx.duct.area_in2(),
                depth_in: ctx.duct.profile.depth_at(x)?,
                fpj_ksi: ctx.duct.fpj_ksi(),
                stress_interval: ctx.stress_interval,
                stress_day: ctx.stress_day,
                bond_interval: ctx.stress_interval + 1,
                removal_interval: None,
                x_in: x,
            });
        }
        Ok(steel)
    }
}

#[derive(Debug, Clone)]
struct SteelContext {
    element: SteelElement,
    steel: PrestressingSteel,
    area_in2: f64,
    depth_in: f64,
    fpj_ksi: f64,
    stress_interval: IntervalIndex,
    stress_day: f64,
    bond_interval: IntervalIndex,
    removal_interval: Option<IntervalIndex>,
    /// Member station used for friction lookups
    x_in: f64,
}

impl SteelContext {
    fn is_stressed(&self, interval: IntervalIndex) -> bool {
        interval >= self.stress_interval && self.removal_interval.map_or(true, |r| interval < r)
    }

    fn is_bonded(&self, interval: IntervalIndex, girder_active: bool) -> bool {
        girder_active && self.is_stressed(interval) && interval >= self.bond_interval
    }
}

/// Working values of one steel element during an interval.
struct SteelWork {
    ctx: SteelContext,
    stressed: bool,
    bonded: bool,
    friction_ksi: f64,
    anchor_set_ksi: f64,
    /// Stress at the start of the interval, before transfer effects
    fpe_start: f64,
    /// Stress after the elastic changes
    fpe_instant: f64,
    previous: LossComponents,
    incremental: LossComponents,
}

/// Working values of one concrete part during an interval.
struct PartWork {
    ctx: ConcreteContext,
    section: SectionProperties,
    modulus: f64,
    age_adjusted_modulus: f64,
    creep_coefficient: f64,
    free_creep_strain: f64,
    free_creep_curvature: f64,
    free_shrinkage_strain: f64,
    previous: PartForces,
    elastic: PartForces,
    time_dependent: PartForces,
}

impl PartWork {
    fn element(&self, modulus: f64) -> SectionElement {
        SectionElement {
            modulus_ksi: modulus,
            area_in2: self.section.area_in2,
            inertia_in4: self.section.inertia_in4,
            y_in: self.section.centroid_in,
        }
    }

    fn state(&self, age_days: f64) -> ConcretePartState {
        let cumulative = self.previous + self.elastic + self.time_dependent;
        let s = &self.section;
        let stress = |y: f64| {
            crate::equations::section::fiber_stress(
                cumulative.axial_kip,
                cumulative.moment_kipin,
                s.area_in2,
                s.inertia_in4,
                s.centroid_in,
                y,
            )
        };
        ConcretePartState {
            part: self.ctx.part,
            section: self.section,
            age_days,
            modulus_ksi: self.modulus,
            age_adjusted_modulus_ksi: self.age_adjusted_modulus,
            creep_coefficient: self.creep_coefficient,
            free_creep_strain: self.free_creep_strain,
            free_creep_curvature: self.free_creep_curvature,
            free_shrinkage_strain: self.free_shrinkage_strain,
            elastic: self.elastic,
            time_dependent: self.time_dependent,
            cumulative,
            top_stress_ksi: stress(s.y_top_in),
            bottom_stress_ksi: stress(s.y_bottom_in),
        }
    }
}

/// Strain at the reference centroid and curvature from forces on a section.
fn deformation(stiffness: &Stiffness, forces: PartForces) -> (f64, f64) {
    (forces.axial_kip / stiffness.ea_kip, forces.moment_kipin / stiffness.ei_kipin2)
}

// ============================================================================
// Engine
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct TendonRecord {
    duct: DuctData,
    details: AnchorSetDetails,
}

/// Accumulated results of one girder.
#[derive(Debug, Clone, Default)]
struct GirderLosses {
    /// Finalized intervals, `intervals[i]` holds interval `i`
    intervals: Vec<BTreeMap<PoiId, LossDetails>>,
    tendons: BTreeMap<TendonKey, TendonRecord>,
}

/// Per-girder time-step loss accumulator.
///
/// Each girder's results extend forward only: [`compute_losses`](Self::compute_losses)
/// processes intervals after the last finalized one and never revisits them.
/// Results stay valid until [`clear_girder`](Self::clear_girder) or
/// [`clear_all`](Self::clear_all).
#[derive(Debug, Clone, Default)]
pub struct TimeStepLossEngine {
    options: TimeStepOptions,
    girders: BTreeMap<GirderKey, GirderLosses>,
}

impl TimeStepLossEngine {
    pub fn new(options: TimeStepOptions) -> Self {
        TimeStepLossEngine {
            options,
            girders: BTreeMap::new(),
        }
    }

    pub fn options(&self) -> &TimeStepOptions {
        &self.options
    }

    /// Highest finalized interval of `girder`.
    pub fn finalized_interval(&self, girder: GirderKey) -> Option<IntervalIndex> {
        self.girders.get(&girder)?.intervals.len().checked_sub(1)
    }

    /// Extend the results of `girder` through `end_interval`.
    pub fn compute_losses(&mut self, inputs: &LossInputs<'_>, girder: GirderKey, end_interval: IntervalIndex) -> LossResult<()> {
        let count = inputs.timeline.interval_count();
        if end_interval >= count {
            return Err(LossError::invalid_input(
                "interval",
                end_interval.to_string(),
                format!("timeline has {} intervals", count),
            ));
        }
        let options = self.options;
        let state = self.girders.entry(girder).or_default();
        let first = state.intervals.len();
        if first > end_interval {
            return Ok(());
        }

        let ctx = GirderContext::build(inputs, girder)?;
        info!("{}: computing time-step losses for intervals {} to {}", ctx.key, first, end_interval);

        for interval in first..=end_interval {
            let mut stressed = BTreeMap::new();
            for duct in ctx.ducts.values() {
                if duct.stress_interval != interval || duct.duct.is_empty() || state.tendons.contains_key(&duct.key) {
                    continue;
                }
                debug!("{}: {} stressed in interval {}", girder, duct.key, interval);
                let details = AnchorSetDetails::compute(duct.key, &duct.duct, &options)?;
                stressed.insert(
                    duct.key,
                    TendonRecord {
                        duct: duct.duct.clone(),
                        details,
                    },
                );
            }

            let mut results = BTreeMap::new();
            for poi in &ctx.pois {
                let tendon = |key: &TendonKey| stressed.get(key).or_else(|| state.tendons.get(key));
                let details = compute_poi(&options, inputs, &ctx, poi, interval, &state.intervals, &tendon)?;
                results.insert(poi.id, details);
            }

            state.tendons.extend(stressed);
            state.intervals.push(results);
            debug!("{}: interval {} finalized", girder, interval);
        }
        Ok(())
    }

    /// Compute every girder through `end_interval` (the last interval when `None`).
    ///
    /// Cancellation is checked between girders. A girder that fails is reported
    /// to `status` and the remaining girders are still computed; the first
    /// failure is returned.
    pub fn compute_girders(
        &mut self,
        inputs: &LossInputs<'_>,
        end_interval: Option<IntervalIndex>,
        progress: &mut dyn Progress,
        status: &mut dyn StatusSink,
    ) -> LossResult<()> {
        let end = match end_interval.or_else(|| inputs.timeline.last_interval()) {
            Some(end) => end,
            None => return Ok(()),
        };
        let mut first_error = None;
        for girder in inputs.geometry.girders() {
            if progress.is_cancelled() {
                return Err(LossError::Cancelled);
            }
            progress.update_message(&format!("Computing time-step losses for {}", girder));
            if let Err(err) = self.compute_losses(inputs, girder, end) {
                status.add(StatusItem::error(Some(girder), format!("No loss results available: {}", err)));
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Finalized losses at `poi` for `interval`.
    pub fn get_losses(&self, poi: &PointOfInterest, interval: IntervalIndex) -> LossResult<&LossDetails> {
        self.girders
            .get(&poi.girder_key())
            .and_then(|g| g.intervals.get(interval))
            .and_then(|results| results.get(&poi.id))
            .ok_or_else(|| LossError::not_available(format!("losses at POI {} for interval {}", poi.id, interval)))
    }

    /// Losses at `poi` for `interval`, computing the girder forward as needed.
    pub fn losses(&mut self, inputs: &LossInputs<'_>, poi: &PointOfInterest, interval: IntervalIndex) -> LossResult<&LossDetails> {
        self.compute_losses(inputs, poi.girder_key(), interval)?;
        self.get_losses(poi, interval)
    }

    fn tendon(&self, girder: GirderKey, key: TendonKey) -> LossResult<&TendonRecord> {
        self.girders
            .get(&girder)
            .and_then(|g| g.tendons.get(&key))
            .ok_or_else(|| LossError::not_available(format!("{} {} has not been stressed", girder, key)))
    }

    pub fn girder_tendon_anchor_set_details(&self, girder: GirderKey, duct: usize) -> LossResult<&AnchorSetDetails> {
        Ok(&self.tendon(girder, TendonKey::Girder { duct })?.details)
    }

    pub fn segment_tendon_anchor_set_details(&self, segment: SegmentKey, duct: usize) -> LossResult<&AnchorSetDetails> {
        let key = TendonKey::Segment {
            segment: segment.segment,
            duct,
        };
        Ok(&self.tendon(segment.girder_key(), key)?.details)
    }

    pub fn girder_tendon_elongation(&self, girder: GirderKey, duct: usize, end: EndType) -> LossResult<f64> {
        let record = self.tendon(girder, TendonKey::Girder { duct })?;
        Ok(record.details.elongation_in(&record.duct, end))
    }

    pub fn segment_tendon_elongation(&self, segment: SegmentKey, duct: usize, end: EndType) -> LossResult<f64> {
        let key = TendonKey::Segment {
            segment: segment.segment,
            duct,
        };
        let record = self.tendon(segment.girder_key(), key)?;
        Ok(record.details.elongation_in(&record.duct, end))
    }

    /// Average friction and anchor set loss over the tendon length.
    pub fn girder_tendon_average_friction_and_anchor_set_loss(&self, girder: GirderKey, duct: usize) -> LossResult<(f64, f64)> {
        let details = self.girder_tendon_anchor_set_details(girder, duct)?;
        Ok((details.average_friction_loss_ksi, details.average_anchor_set_loss_ksi))
    }

    pub fn segment_tendon_average_friction_and_anchor_set_loss(&self, segment: SegmentKey, duct: usize) -> LossResult<(f64, f64)> {
        let details = self.segment_tendon_anchor_set_details(segment, duct)?;
        Ok((details.average_friction_loss_ksi, details.average_anchor_set_loss_ksi))
    }

    /// Tendons of `girder` stressed in the finalized intervals.
    pub fn stressed_tendons(&self, girder: GirderKey) -> Vec<TendonKey> {
        self.girders
            .get(&girder)
            .map(|g| g.tendons.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Anchor set results and elongations (start, end) of any stressed tendon.
    pub fn tendon_summary(&self, girder: GirderKey, key: TendonKey) -> LossResult<(&AnchorSetDetails, f64, f64)> {
        let record = self.tendon(girder, key)?;
        Ok((
            &record.details,
            record.details.elongation_in(&record.duct, EndType::Start),
            record.details.elongation_in(&record.duct, EndType::End),
        ))
    }

    pub fn clear_girder(&mut self, girder: GirderKey) {
        if self.girders.remove(&girder).is_some() {
            debug!("{}: time-step results cleared", girder);
        }
    }

    pub fn clear_all(&mut self) {
        self.girders.clear();
    }
}

// ============================================================================
// One point of interest, one interval
// ============================================================================

fn compute_poi<'t>(
    options: &TimeStepOptions,
    inputs: &LossInputs<'_>,
    ctx: &GirderContext,
    poi: &PointOfInterest,
    interval: IntervalIndex,
    history: &[BTreeMap<PoiId, LossDetails>],
    tendon: &dyn Fn(&TendonKey) -> Option<&'t TendonRecord>,
) -> LossResult<LossDetails> {
    let timing = inputs.timeline.interval(interval).ok_or_else(|| LossError::Internal {
        message: format!("interval {} missing from timeline", interval),
    })?;
    let (ts, te) = (timing.start_day, timing.end_day);
    let tm = timing.middle_day();
    let previous = interval.checked_sub(1).and_then(|p| history.get(p)).and_then(|r| r.get(&poi.id));
    let previous_ts = previous.and_then(LossDetails::time_step);

    // Concrete parts
    let girder_section = inputs
        .sections
        .section_properties(SectionPart::Girder, SectionPropertyMode::Net, interval, poi)
        .ok_or_else(|| LossError::missing_section(poi.id.0, interval, SectionPart::Girder.label()))?;
    let composite_section = inputs
        .sections
        .section_properties(SectionPart::Composite, SectionPropertyMode::Gross, interval, poi);
    let girder_ctx = ctx.girder_concrete(poi)?;

    let mut parts: Vec<PartWork> = Vec::new();
    if interval >= girder_ctx.active_from {
        parts.push(new_part(girder_ctx.clone(), girder_section, tm, te, ctx.humidity, options, previous_ts));
    }
    if let Some(deck_ctx) = ctx.deck.as_ref().filter(|d| interval >= d.active_from) {
        if let Some(deck_section) = inputs
            .sections
            .section_properties(SectionPart::Deck, SectionPropertyMode::Gross, interval, poi)
        {
            parts.push(new_part(deck_ctx.clone(), deck_section, tm, te, ctx.humidity, options, previous_ts));
        }
    }
    let girder_active = parts.iter().any(|p| p.ctx.part == SectionPart::Girder);

    // Steel
    let mut steel: Vec<SteelWork> = Vec::new();
    for s in ctx.steel_at(poi)? {
        let prior = previous.and_then(|d| d.steel_loss(s.element));
        let stressed = s.is_stressed(interval);
        let (friction_ksi, anchor_set_ksi) = match s.element {
            SteelElement::Tendon(key) if stressed => match tendon(&key) {
                Some(record) => (
                    record.details.friction_at(&record.duct, s.x_in).1,
                    record.details.anchor_set_loss_at(&record.duct, s.x_in),
                ),
                None => {
                    return Err(LossError::Internal {
                        message: format!("{} stressed without anchor set results", key),
                    })
                }
            },
            _ => (0.0, 0.0),
        };
        let previous_components = prior.map(|p| p.cumulative).unwrap_or_default();
        let fpe_start = match prior {
            Some(p) if p.stressed => p.fpe_ksi,
            _ => s.fpj_ksi - friction_ksi - anchor_set_ksi,
        };
        steel.push(SteelWork {
            stressed,
            bonded: s.is_bonded(interval, girder_active),
            friction_ksi,
            anchor_set_ksi,
            fpe_start,
            fpe_instant: fpe_start,
            previous: previous_components,
            incremental: LossComponents::default(),
            ctx: s,
        });
    }

    let mut external = PartForces::default();
    let mut instantaneous = None;
    let mut age_adjusted = None;
    let mut restraints = CauseForces::default();
    let mut residual = 0.0;

    if parts.is_empty() {
        // Strands in the bed before release: relaxation only
        for s in steel.iter_mut().filter(|s| s.stressed) {
            s.incremental.relaxation_ksi = relaxation(&s.ctx, s.fpe_start, ts, te);
        }
    } else {
        // ---- Elastic changes at the start of the interval ----
        let mut elements: Vec<SectionElement> = parts.iter().map(|p| p.element(p.modulus)).collect();
        elements.extend(steel.iter().filter(|s| s.bonded).map(|s| steel_element(&s.ctx)));
        let inst = transformed_stiffness(&elements);
        if !inst.is_valid() {
            return Err(LossError::solve_failed(poi.id.0, interval, "instantaneous section has no stiffness"));
        }

        let mut forces = PartForces::default();
        for f in inputs.loads.applied_forces(interval, poi) {
            forces += PartForces::new(f.axial_kip, f.moment_kipin);
        }
        for s in &steel {
            let transfer = match s.ctx.element {
                SteelElement::Strand(_) => interval == s.ctx.bond_interval && s.bonded,
                SteelElement::Tendon(_) => interval == s.ctx.stress_interval,
                SteelElement::PermanentStrands => false,
            };
            let removal = s.ctx.removal_interval == Some(interval);
            let p = if transfer {
                -s.ctx.area_in2 * s.fpe_start
            } else if removal {
                s.ctx.area_in2 * s.fpe_start
            } else {
                continue;
            };
            forces += PartForces::new(p, p * (s.ctx.depth_in - inst.centroid_in));
        }
        external = forces;

        let (e0, k) = deformation(&inst, forces);
        let mut sum = 0.0;
        for p in parts.iter_mut() {
            let strain = e0 + k * (p.section.centroid_in - inst.centroid_in);
            p.elastic = PartForces::new(
                p.modulus * p.section.area_in2 * strain,
                p.modulus * p.section.inertia_in4 * k,
            );
            sum += p.elastic.axial_kip;
        }
        for s in steel.iter_mut().filter(|s| s.bonded) {
            let df = s.ctx.steel.modulus_ksi * (e0 + k * (s.ctx.depth_in - inst.centroid_in));
            s.incremental.elastic_ksi = -df;
            s.fpe_instant = s.fpe_start + df;
            sum += s.ctx.area_in2 * df;
        }
        residual += sum - forces.axial_kip;
        instantaneous = Some(inst);

        // ---- Time-dependent changes over the duration ----
        if te > ts {
            for p in parts.iter_mut() {
                free_strains(p, poi.id, interval, ts, te, ctx.humidity, history);
            }

            let mut elements: Vec<SectionElement> = parts.iter().map(|p| p.element(p.age_adjusted_modulus)).collect();
            elements.extend(steel.iter().filter(|s| s.bonded).map(|s| steel_element(&s.ctx)));
            let adj = transformed_stiffness(&elements);
            if !adj.is_valid() {
                return Err(LossError::solve_failed(poi.id.0, interval, "age-adjusted section has no stiffness"));
            }

            let fr: Vec<f64> = steel
                .iter()
                .map(|s| if s.stressed { relaxation(&s.ctx, s.fpe_instant, ts, te) } else { 0.0 })
                .collect();

            // Restrained force changes of the concrete parts
            let mut part_restrained = vec![CauseForces::default(); parts.len()];
            for (p, r) in parts.iter().zip(part_restrained.iter_mut()) {
                let ea = p.age_adjusted_modulus;
                r.creep = PartForces::new(
                    -ea * p.section.area_in2 * p.free_creep_strain,
                    -ea * p.section.inertia_in4 * p.free_creep_curvature,
                );
                r.shrinkage = PartForces::new(-ea * p.section.area_in2 * p.free_shrinkage_strain, 0.0);
            }
            for cause in RestraintCause::ALL {
                let mut total = PartForces::default();
                for (p, r) in parts.iter().zip(&part_restrained) {
                    let f = r.get(cause);
                    total += PartForces::new(
                        f.axial_kip,
                        f.moment_kipin + f.axial_kip * (p.section.centroid_in - adj.centroid_in),
                    );
                }
                if cause == RestraintCause::Relaxation {
                    for (s, fr) in steel.iter().zip(&fr) {
                        let n = -fr * s.ctx.area_in2;
                        total += PartForces::new(n, n * (s.ctx.depth_in - adj.centroid_in));
                    }
                }
                *restraints.get_mut(cause) = total;
            }

            let mut sum = 0.0;
            for cause in RestraintCause::ALL {
                let restraint = restraints.get(cause);
                let release = PartForces::new(-restraint.axial_kip, -restraint.moment_kipin);
                let (e0, k) = deformation(&adj, release);
                for (p, r) in parts.iter_mut().zip(&part_restrained) {
                    let strain = e0 + k * (p.section.centroid_in - adj.centroid_in);
                    let change = r.get(cause)
                        + PartForces::new(
                            p.age_adjusted_modulus * p.section.area_in2 * strain,
                            p.age_adjusted_modulus * p.section.inertia_in4 * k,
                        );
                    p.time_dependent += change;
                    sum += change.axial_kip;
                }
                for (s, fr) in steel.iter_mut().zip(&fr) {
                    let df = if s.bonded {
                        s.ctx.steel.modulus_ksi * (e0 + k * (s.ctx.depth_in - adj.centroid_in))
                    } else {
                        0.0
                    };
                    let loss = -df;
                    sum += s.ctx.area_in2 * df;
                    match cause {
                        RestraintCause::Creep => s.incremental.creep_ksi += loss,
                        RestraintCause::Shrinkage => s.incremental.shrinkage_ksi += loss,
                        RestraintCause::Relaxation => {
                            s.incremental.relaxation_ksi += loss + fr;
                            sum -= s.ctx.area_in2 * fr;
                        }
                    }
                }
            }
            residual += sum;
            age_adjusted = Some(adj);
        }
    }

    if residual.abs() > 1e-6 * (1.0 + external.axial_kip.abs()) {
        warn!("POI {} interval {}: equilibrium residual {:.3e} kip", poi.id, interval, residual);
    }

    let steel_records = steel
        .into_iter()
        .map(|s| {
            let cumulative = s.previous + s.incremental;
            let fpe = if s.stressed {
                s.ctx.fpj_ksi - s.friction_ksi - s.anchor_set_ksi - cumulative.total()
            } else {
                0.0
            };
            SteelLoss {
                element: s.ctx.element,
                area_in2: s.ctx.area_in2,
                depth_in: s.ctx.depth_in,
                fpj_ksi: s.ctx.fpj_ksi,
                stressed: s.stressed,
                bonded: s.bonded,
                friction_loss_ksi: s.friction_ksi,
                anchor_set_loss_ksi: s.anchor_set_ksi,
                incremental: s.incremental,
                cumulative,
                fpe_ksi: fpe,
            }
        })
        .collect();

    let mut girder_state = None;
    let mut deck_state = None;
    for p in &parts {
        let state = p.state(p.ctx.age(tm));
        match p.ctx.part {
            SectionPart::Deck => deck_state = Some(state),
            _ => girder_state = Some(state),
        }
    }

    Ok(LossDetails {
        poi: poi.id,
        interval: Some(interval),
        strategy: LossStrategy::TimeStep(*options),
        section: SectionSnapshot {
            girder: girder_section,
            composite: composite_section,
            transformed: instantaneous,
        },
        steel: steel_records,
        stages: None,
        details: MethodDetails::TimeStep(TimeStepDetails {
            start_day: ts,
            end_day: te,
            girder: girder_state,
            deck: deck_state,
            external,
            age_adjusted,
            creep_restraint: restraints.creep,
            shrinkage_restraint: restraints.shrinkage,
            relaxation_restraint: restraints.relaxation,
            equilibrium_residual_kip: residual,
        }),
    })
}

fn new_part(
    ctx: ConcreteContext,
    section: SectionProperties,
    tm: f64,
    te: f64,
    humidity: f64,
    options: &TimeStepOptions,
    previous: Option<&TimeStepDetails>,
) -> PartWork {
    let modulus = ctx.material.modulus_at(ctx.age(tm));
    let phi = ctx.material.creep_coefficient(ctx.age(te), ctx.age(tm), humidity);
    let previous = previous
        .and_then(|d| d.part(ctx.part))
        .map(|s| s.cumulative)
        .unwrap_or_default();
    PartWork {
        section,
        modulus,
        age_adjusted_modulus: modulus / (1.0 + options.aging_coefficient * phi),
        creep_coefficient: phi,
        free_creep_strain: 0.0,
        free_creep_curvature: 0.0,
        free_shrinkage_strain: 0.0,
        previous,
        elastic: PartForces::default(),
        time_dependent: PartForces::default(),
        ctx,
    }
}

fn steel_element(s: &SteelContext) -> SectionElement {
    SectionElement {
        modulus_ksi: s.steel.modulus_ksi,
        area_in2: s.area_in2,
        inertia_in4: 0.0,
        y_in: s.depth_in,
    }
}

fn relaxation(s: &SteelContext, fpe_ksi: f64, ts: f64, te: f64) -> f64 {
    s.steel.relaxation_loss(fpe_ksi, ts - s.stress_day, te - s.stress_day)
}

/// Free creep and shrinkage of a concrete part over `[ts, te]`.
///
/// Creep sums every earlier force increment on the part: elastic increments
/// loaded at the start of their interval, time-dependent increments at the
/// middle. This interval's elastic increment creeps from `ts`.
fn free_strains(
    part: &mut PartWork,
    poi: PoiId,
    interval: IntervalIndex,
    ts: f64,
    te: f64,
    humidity: f64,
    history: &[BTreeMap<PoiId, LossDetails>],
) {
    let concrete = &part.ctx.material;
    let age = |day: f64| part.ctx.age(day);
    let creep_increment = |loaded: f64| {
        concrete.creep_coefficient(age(te), age(loaded), humidity) - concrete.creep_coefficient(age(ts), age(loaded), humidity)
    };

    let mut strain = 0.0;
    let mut curvature = 0.0;
    let mut add = |forces: PartForces, modulus: f64, section: &SectionProperties, dphi: f64| {
        if dphi == 0.0 || modulus <= 0.0 {
            return;
        }
        strain += forces.axial_kip / (modulus * section.area_in2) * dphi;
        curvature += forces.moment_kipin / (modulus * section.inertia_in4) * dphi;
    };

    for records in history.iter().take(interval) {
        let Some(ts_j) = records.get(&poi).and_then(LossDetails::time_step) else {
            continue;
        };
        let Some(state) = ts_j.part(part.ctx.part) else {
            continue;
        };
        let middle = 0.5 * (ts_j.start_day + ts_j.end_day);
        add(state.elastic, state.modulus_ksi, &state.section, creep_increment(ts_j.start_day));
        add(state.time_dependent, state.modulus_ksi, &state.section, creep_increment(middle));
    }
    let phi_now = concrete.creep_coefficient(age(te), age(ts), humidity);
    let section = part.section;
    add(part.elastic, part.modulus, &section, phi_now);

    part.free_creep_strain = strain;
    part.free_creep_curvature = curvature;
    part.free_shrinkage_strain = concrete.shrinkage_strain(age(te), humidity) - concrete.shrinkage_strain(age(ts), humidity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::section::SectionProperties;
    use crate::model::bridge::BridgeModel;
    use crate::model::samples;
    use crate::model::strands::StrandType;
    use crate::providers::{SectionPropertyProvider, IntervalTimeline};
    use crate::status::{NullProgress, StatusCenter, StatusSeverity};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn mid_span(model: &BridgeModel) -> PointOfInterest {
        model.girders[0]
            .pois
            .iter()
            .map(|r| r.poi.clone())
            .find(|p| p.attributes.mid_span)
            .unwrap()
    }

    fn last(model: &BridgeModel) -> IntervalIndex {
        model.timeline.last_interval().unwrap()
    }

    #[test]
    fn test_extension_law() {
        for model in [samples::pretensioned_i_girder().unwrap(), samples::spliced_two_duct_girder().unwrap()] {
            let inputs = model.inputs();
            let girder = model.girders[0].key;
            let end = last(&model);

            let mut stepped = TimeStepLossEngine::default();
            stepped.compute_losses(&inputs, girder, 2).unwrap();
            stepped.compute_losses(&inputs, girder, end).unwrap();

            let mut direct = TimeStepLossEngine::default();
            direct.compute_losses(&inputs, girder, end).unwrap();

            for record in &model.girders[0].pois {
                for interval in 0..=end {
                    assert_eq!(
                        stepped.get_losses(&record.poi, interval).unwrap(),
                        direct.get_losses(&record.poi, interval).unwrap()
                    );
                }
            }
        }
    }

    #[test]
    fn test_cumulative_equals_sum_of_increments() {
        let model = samples::spliced_two_duct_girder().unwrap();
        let inputs = model.inputs();
        let end = last(&model);
        let mut engine = TimeStepLossEngine::default();
        engine.compute_losses(&inputs, model.girders[0].key, end).unwrap();

        for record in &model.girders[0].pois {
            let final_record = engine.get_losses(&record.poi, end).unwrap();
            for s in &final_record.steel {
                let mut sum = LossComponents::default();
                for interval in 0..=end {
                    let d = engine.get_losses(&record.poi, interval).unwrap();
                    if let Some(inc) = d.steel_loss(s.element) {
                        sum += inc.incremental;
                    }
                }
                assert_relative_eq!(sum.total(), s.cumulative.total(), epsilon = 1e-9, max_relative = 1e-12);
                assert_relative_eq!(sum.creep_ksi, s.cumulative.creep_ksi, epsilon = 1e-9, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_pretensioned_release_elastic_shortening() {
        let model = samples::pretensioned_i_girder().unwrap();
        let inputs = model.inputs();
        let poi = mid_span(&model);
        let mut engine = TimeStepLossEngine::default();

        let release = engine.losses(&inputs, &poi, 1).unwrap().clone();
        let strands = release.steel_loss(SteelElement::Strand(StrandType::Straight)).unwrap();
        assert!(strands.bonded);
        assert!(strands.incremental.elastic_ksi > 0.0);
        assert_eq!(strands.friction_loss_ksi, 0.0);
        assert_eq!(strands.anchor_set_loss_ksi, 0.0);
        assert!(release.permanent_strand_elastic_loss_ksi() > 0.0);

        // the girder is precompressed at the bottom
        let girder = release.time_step().unwrap().girder.as_ref().unwrap();
        assert!(girder.bottom_stress_ksi < 0.0);

        // only relaxation in the bed
        let bed = engine.get_losses(&poi, 0).unwrap();
        let in_bed = bed.steel_loss(SteelElement::Strand(StrandType::Straight)).unwrap();
        assert_eq!(in_bed.incremental.elastic_ksi, 0.0);
        assert!(in_bed.incremental.relaxation_ksi > 0.0);
        assert!(!in_bed.bonded);
    }

    #[test]
    fn test_pretensioned_long_term_losses() {
        let model = samples::pretensioned_i_girder().unwrap();
        let inputs = model.inputs();
        let poi = mid_span(&model);
        let end = last(&model);
        let mut engine = TimeStepLossEngine::default();
        let final_losses = engine.losses(&inputs, &poi, end).unwrap().clone();
        let strands = final_losses.steel_loss(SteelElement::Strand(StrandType::Straight)).unwrap();
        assert!(strands.cumulative.creep_ksi > 0.0);
        assert!(strands.cumulative.shrinkage_ksi > 0.0);
        assert!(strands.cumulative.relaxation_ksi > 0.0);
        assert!(strands.fpe_ksi < strands.fpj_ksi);
        assert_relative_eq!(strands.fpe_ksi, strands.fpj_ksi - strands.total_loss_ksi(), epsilon = 1e-9);
        // deck participates once composite
        assert!(final_losses.time_step().unwrap().deck.is_some());
        assert!(engine.get_losses(&poi, 2).unwrap().time_step().unwrap().deck.is_none());
    }

    #[test]
    fn test_equilibrium_residual_is_small() {
        let model = samples::spliced_two_duct_girder().unwrap();
        let inputs = model.inputs();
        let end = last(&model);
        let mut engine = TimeStepLossEngine::default();
        engine.compute_losses(&inputs, model.girders[0].key, end).unwrap();
        for record in &model.girders[0].pois {
            for interval in 0..=end {
                let ts = engine.get_losses(&record.poi, interval).unwrap().time_step().unwrap().clone();
                assert_abs_diff_eq!(ts.equilibrium_residual_kip, 0.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_not_available_beyond_finalized() {
        let model = samples::pretensioned_i_girder().unwrap();
        let inputs = model.inputs();
        let poi = mid_span(&model);
        let mut engine = TimeStepLossEngine::default();
        assert!(matches!(engine.get_losses(&poi, 0), Err(LossError::NotAvailable { .. })));

        engine.compute_losses(&inputs, poi.girder_key(), 2).unwrap();
        assert_eq!(engine.finalized_interval(poi.girder_key()), Some(2));
        assert!(engine.get_losses(&poi, 2).is_ok());
        assert!(matches!(engine.get_losses(&poi, 4), Err(LossError::NotAvailable { .. })));

        engine.clear_girder(poi.girder_key());
        assert!(matches!(engine.get_losses(&poi, 2), Err(LossError::NotAvailable { .. })));
    }

    #[test]
    fn test_interval_outside_timeline_rejected() {
        let model = samples::pretensioned_i_girder().unwrap();
        let mut engine = TimeStepLossEngine::default();
        let err = engine.compute_losses(&model.inputs(), model.girders[0].key, 99).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_spliced_girder_ducts() {
        let model = samples::spliced_two_duct_girder().unwrap();
        let inputs = model.inputs();
        let girder = model.girders[0].key;
        let mut engine = TimeStepLossEngine::default();

        engine.compute_losses(&inputs, girder, 2).unwrap();
        assert!(engine.girder_tendon_anchor_set_details(girder, 0).is_err());

        engine.compute_losses(&inputs, girder, 3).unwrap();
        let duct_a = engine.girder_tendon_anchor_set_details(girder, 0).unwrap().clone();
        assert!(engine.girder_tendon_anchor_set_details(girder, 1).is_err());

        engine.compute_losses(&inputs, girder, last(&model)).unwrap();
        // computed once and carried forward
        assert_eq!(engine.girder_tendon_anchor_set_details(girder, 0).unwrap(), &duct_a);

        let pois = &model.girders[0].pois;
        let near_left = &pois.iter().find(|r| r.poi.x_girder_in == 150.0).unwrap().poi;
        let near_right = &pois.iter().find(|r| r.poi.x_girder_in == 1224.0 + 1050.0).unwrap().poi;
        let mid = mid_span(&model);

        for (duct, near) in [(0, near_left), (1, near_right)] {
            let details = engine.girder_tendon_anchor_set_details(girder, duct).unwrap();
            let xset = details.ends[0].xset_in();
            assert!(xset > 0.0 && xset.is_finite());

            let element = SteelElement::Tendon(TendonKey::Girder { duct });
            let at = |poi: &PointOfInterest| {
                engine
                    .get_losses(poi, last(&model))
                    .unwrap()
                    .steel_loss(element)
                    .unwrap()
                    .anchor_set_loss_ksi
            };
            assert!(at(near) > at(&mid));

            let (friction, anchor) = engine.girder_tendon_average_friction_and_anchor_set_loss(girder, duct).unwrap();
            assert!(friction > 0.0 && anchor > 0.0);
        }

        assert!(engine.girder_tendon_elongation(girder, 0, EndType::Start).unwrap() > 0.0);
        assert_eq!(engine.girder_tendon_elongation(girder, 0, EndType::End).unwrap(), 0.0);
        assert!(engine.girder_tendon_elongation(girder, 1, EndType::End).unwrap() > 0.0);
    }

    #[test]
    fn test_tendon_unbonded_while_stressed() {
        let model = samples::spliced_two_duct_girder().unwrap();
        let inputs = model.inputs();
        let mid = mid_span(&model);
        let mut engine = TimeStepLossEngine::default();
        let element = SteelElement::Tendon(TendonKey::Girder { duct: 0 });

        let before = engine.losses(&inputs, &mid, 2).unwrap().steel_loss(element).unwrap().clone();
        assert!(!before.stressed);
        assert_eq!(before.fpe_ksi, 0.0);

        let stressing = engine.losses(&inputs, &mid, 3).unwrap().steel_loss(element).unwrap().clone();
        assert!(stressing.stressed && !stressing.bonded);
        assert_eq!(stressing.incremental.elastic_ksi, 0.0);
        assert!(stressing.friction_loss_ksi > 0.0);

        // duct B jacked in interval 4 shortens the bonded duct A
        let next = engine.losses(&inputs, &mid, 4).unwrap().steel_loss(element).unwrap().clone();
        assert!(next.bonded);
        assert!(next.incremental.elastic_ksi > 0.0);
    }

    #[test]
    fn test_closure_joint_has_no_strands() {
        let model = samples::spliced_two_duct_girder().unwrap();
        let inputs = model.inputs();
        let mid = mid_span(&model);
        assert!(mid.attributes.closure_joint);
        let mut engine = TimeStepLossEngine::default();
        let details = engine.losses(&inputs, &mid, 2).unwrap();
        assert!(details.steel.iter().all(|s| matches!(s.element, SteelElement::Tendon(_))));
        // closure concrete not yet structural
        assert!(details.time_step().unwrap().girder.is_none());
    }

    struct MissingAfter<'a> {
        model: &'a BridgeModel,
        interval: IntervalIndex,
    }

    impl SectionPropertyProvider for MissingAfter<'_> {
        fn section_properties(
            &self,
            part: SectionPart,
            mode: SectionPropertyMode,
            interval: IntervalIndex,
            poi: &PointOfInterest,
        ) -> Option<SectionProperties> {
            if interval >= self.interval {
                None
            } else {
                self.model.section_properties(part, mode, interval, poi)
            }
        }
    }

    #[test]
    fn test_missing_section_keeps_finalized_intervals() {
        let model = samples::pretensioned_i_girder().unwrap();
        let provider = MissingAfter { model: &model, interval: 3 };
        let inputs = LossInputs {
            sections: &provider,
            ..model.inputs()
        };
        let girder = model.girders[0].key;
        let mut engine = TimeStepLossEngine::default();
        let err = engine.compute_losses(&inputs, girder, last(&model)).unwrap_err();
        assert!(matches!(err, LossError::MissingSectionProperties { interval: 3, .. }));
        assert_eq!(engine.finalized_interval(girder), Some(2));

        let mut status = StatusCenter::new();
        let result = engine.compute_girders(&inputs, None, &mut NullProgress, &mut status);
        assert!(result.is_err());
        assert_eq!(status.count(StatusSeverity::Error), 1);
    }

    struct CancelAtOnce;

    impl Progress for CancelAtOnce {
        fn update_message(&mut self, _message: &str) {}

        fn is_cancelled(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_cancel_between_girders() {
        let model = samples::pretensioned_i_girder().unwrap();
        let mut engine = TimeStepLossEngine::default();
        let mut status = StatusCenter::new();
        let err = engine
            .compute_girders(&model.inputs(), None, &mut CancelAtOnce, &mut status)
            .unwrap_err();
        assert_eq!(err, LossError::Cancelled);
        assert_eq!(engine.finalized_interval(model.girders[0].key), None);
    }

    #[test]
    fn test_empty_duct_is_skipped() {
        let mut model = samples::spliced_two_duct_girder().unwrap();
        model.girders[0].ducts[1].strand_count = 0;
        let inputs = model.inputs();
        let girder = model.girders[0].key;
        let end = last(&model);
        let mut engine = TimeStepLossEngine::default();

        engine.compute_losses(&inputs, girder, end).unwrap();
        assert_eq!(engine.finalized_interval(girder), Some(end));
        assert!(engine.girder_tendon_anchor_set_details(girder, 0).is_ok());
        assert!(matches!(
            engine.girder_tendon_anchor_set_details(girder, 1),
            Err(LossError::NotAvailable { .. })
        ));
        assert_eq!(engine.stressed_tendons(girder), vec![TendonKey::Girder { duct: 0 }]);
    }

    #[test]
    fn test_girder_context_keeps_key() {
        let model = samples::spliced_two_duct_girder().unwrap();
        let girder = model.girders[0].key;
        let ctx = GirderContext::build(&model.inputs(), girder).unwrap();
        assert_eq!(ctx.key, girder);
        assert_eq!(ctx.pois.len(), model.girders[0].pois.len());
    }

    #[test]
    fn test_cause_forces_by_cause() {
        let mut forces = CauseForces::default();
        for (i, cause) in RestraintCause::ALL.into_iter().enumerate() {
            *forces.get_mut(cause) = PartForces::new(i as f64 + 1.0, 0.0);
        }
        assert_eq!(forces.creep.axial_kip, 1.0);
        assert_eq!(forces.shrinkage.axial_kip, 2.0);
        assert_eq!(forces.relaxation.axial_kip, 3.0);
        assert_eq!(forces.get(RestraintCause::Shrinkage), forces.shrinkage);
    }

    #[test]
    fn test_restraints_recorded_per_cause() {
        let model = samples::pretensioned_i_girder().unwrap();
        let inputs = model.inputs();
        let poi = mid_span(&model);
        let end = last(&model);
        let mut engine = TimeStepLossEngine::default();
        let ts = engine.losses(&inputs, &poi, end).unwrap().time_step().unwrap().clone();
        // free shrinkage is a shortening, restrained by tension
        assert!(ts.shrinkage_restraint.axial_kip > 0.0);
        // relaxation releases strand tension
        assert!(ts.relaxation_restraint.axial_kip < 0.0);
        assert!(ts.creep_restraint.axial_kip != 0.0);
    }
}
