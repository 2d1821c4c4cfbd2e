//! # Loss Parameters
//!
//! Inputs shared by the code estimate methods, gathered once per point of
//! interest from the providers.
//!
//! Time-dependent losses are computed for the permanent strands. Temporary
//! strands enter through their elastic effect on the permanent strands.
//! Reinforcing steel is not modeled, so the partial prestress ratio is 1.0.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::equations::section::SectionProperties;
use crate::errors::{LossError, LossResult};
use crate::model::keys::{EventId, IntervalIndex, PointOfInterest};
use crate::model::materials::{ConcreteMaterial, PrestressingSteel};
use crate::model::strands::TemporaryStrandUsage;
use crate::model::tendon::FrictionParameters;
use crate::providers::{LossInputs, ProductLoad, SectionPart, SectionPropertyMode};

/// Girder family, selects the row of the approximate loss table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BeamType {
    #[default]
    IBeam,
    UBeam,
    SolidSlab,
    BoxBeam,
    /// Single T, double T, hollow core and voided slab
    SingleT,
}

impl BeamType {
    pub const ALL: [BeamType; 5] = [
        BeamType::IBeam,
        BeamType::UBeam,
        BeamType::SolidSlab,
        BeamType::BoxBeam,
        BeamType::SingleT,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BeamType::IBeam => "I-beam",
            BeamType::UBeam => "U-beam",
            BeamType::SolidSlab => "Solid slab",
            BeamType::BoxBeam => "Box beam",
            BeamType::SingleT => "Single T",
        }
    }
}

impl fmt::Display for BeamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Minimum concrete strength for the code methods (LRFD 5.4.2.1)
pub const MIN_FC_KSI: f64 = 2.4;

/// Temporary strands at a point of interest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporaryStrandParameters {
    pub usage: TemporaryStrandUsage,
    pub strand_count: u32,
    /// ApsTTS
    pub aps_in2: f64,
    /// fpjTTS
    pub fpj_ksi: f64,
    /// Depth of the temporary strands below the top of the girder
    pub depth_in: f64,
    /// Used when the strands are post-tensioned
    pub friction: FrictionParameters,
    /// Distance of the point from the jacking end
    pub distance_in: f64,
    /// Length of the temporary strands
    pub length_in: f64,
    /// Total angular change over the length
    pub angle_change_rad: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossParameters {
    pub steel: PrestressingSteel,
    pub strand_count: u32,
    /// Area of the permanent strands
    pub aps_in2: f64,
    /// Jacking stress of the permanent strands
    pub fpj_ksi: f64,
    /// Depth of the permanent strand centroid below the top of the girder
    pub strand_depth_in: f64,
    /// Gross non-composite section
    pub girder: SectionProperties,
    #[serde(default)]
    pub composite: Option<SectionProperties>,
    #[serde(default)]
    pub deck: Option<SectionProperties>,
    /// Girder self weight on the non-composite section
    pub girder_moment_kipin: f64,
    /// Slab, diaphragms and other dead load on the non-composite section
    pub additional_moment_kipin: f64,
    /// Barriers, overlay and other dead load on the composite section
    pub superimposed_moment_kipin: f64,
    pub humidity: f64,
    /// Girder concrete age at prestress transfer
    pub transfer_age_days: f64,
    /// Girder concrete age when the segment is hauled, between transfer and deck casting
    pub hauling_age_days: f64,
    /// Girder concrete age when the deck is cast
    pub deck_age_days: f64,
    pub final_age_days: f64,
    pub girder_concrete: ConcreteMaterial,
    #[serde(default)]
    pub deck_concrete: Option<ConcreteMaterial>,
    /// Partial prestress ratio
    pub ppr: f64,
    #[serde(default)]
    pub temporary: Option<TemporaryStrandParameters>,
}

fn interval_day(inputs: &LossInputs<'_>, interval: IntervalIndex, end: bool) -> LossResult<f64> {
    inputs
        .timeline
        .interval(interval)
        .map(|i| if end { i.end_day } else { i.start_day })
        .ok_or_else(|| LossError::Internal {
            message: format!("interval {} missing from timeline", interval),
        })
}

impl LossParameters {
    /// Gather the parameters at `poi` for the configuration described by `inputs`.
    pub fn gather(inputs: &LossInputs<'_>, poi: &PointOfInterest) -> LossResult<Self> {
        let geometry = inputs.geometry;
        let segment = poi.segment;
        let strands = geometry.segment_strands(segment);
        let concrete = geometry
            .segment_concrete(segment)
            .ok_or_else(|| LossError::missing_field(format!("{}.concrete", segment)))?;
        let events = geometry
            .segment_events(segment)
            .ok_or_else(|| LossError::missing_field(format!("{}.events", segment)))?;

        let timeline = inputs.timeline;
        let find = |event: EventId, field: &str| {
            timeline
                .interval_by_event(event)
                .ok_or_else(|| LossError::invalid_input(field, event.0.to_string(), "No interval starts with this event"))
        };
        let casting = find(events.casting, "events.casting")?;
        let release = find(events.release, "events.release")?;
        let last = timeline
            .last_interval()
            .ok_or_else(|| LossError::missing_field("timeline.intervals"))?;

        let casting_day = interval_day(inputs, casting, false)?;
        let transfer_age = interval_day(inputs, release, false)? - casting_day;
        let final_age = interval_day(inputs, last, true)? - casting_day;
        let deck = geometry.deck();
        let deck_age = match &deck {
            Some(d) => interval_day(inputs, find(d.casting_event, "deck.casting_event")?, false)? - casting_day,
            None => final_age,
        };
        // Hauled just ahead of deck casting unless the segment says otherwise
        let hauling_age = match events.hauling {
            Some(event) => interval_day(inputs, find(event, "events.hauling")?, false)? - casting_day,
            None => deck_age,
        };
        let hauling_age = hauling_age.max(transfer_age).min(deck_age.max(transfer_age));

        let girder = inputs
            .sections
            .section_properties(SectionPart::Girder, SectionPropertyMode::Gross, release, poi)
            .ok_or_else(|| LossError::missing_section(poi.id.0, release, SectionPart::Girder.label()))?;
        let composite = inputs
            .sections
            .section_properties(SectionPart::Composite, SectionPropertyMode::Gross, last, poi);
        let deck_section = inputs
            .sections
            .section_properties(SectionPart::Deck, SectionPropertyMode::Gross, last, poi);

        let aps = if poi.attributes.closure_joint { 0.0 } else { strands.permanent_area_in2() };
        let (fpj, depth) = if aps > 0.0 {
            let depth = strands
                .permanent_centroid_at(poi.x_segment_in)?
                .unwrap_or(girder.centroid_in);
            (strands.permanent_jacking_force() / aps, depth)
        } else {
            (0.0, girder.centroid_in)
        };
        let strand_count = if aps > 0.0 {
            strands
                .active_groups()
                .filter(|g| g.strand_type.is_permanent())
                .map(|g| g.strand_count)
                .sum()
        } else {
            0
        };

        let temporary = match strands.temporary_group() {
            Some(g) if !poi.attributes.closure_joint && g.profile.contains(poi.x_segment_in) => {
                let start = g.profile.start_x();
                Some(TemporaryStrandParameters {
                    usage: strands.temporary_usage,
                    strand_count: g.strand_count,
                    aps_in2: g.area_in2(),
                    fpj_ksi: g.fpj_ksi(&strands.steel),
                    depth_in: g.profile.depth_at(poi.x_segment_in)?,
                    friction: strands.temporary_friction,
                    distance_in: poi.x_segment_in - start,
                    length_in: g.profile.length(),
                    angle_change_rad: g.profile.angular_change(start, g.profile.end_x()),
                })
            }
            _ => None,
        };

        let loads = inputs.loads;
        let sum = |filter: fn(ProductLoad) -> bool| -> f64 {
            ProductLoad::ALL
                .iter()
                .filter(|l| filter(**l))
                .map(|l| loads.total_moment(*l, poi))
                .sum()
        };

        Ok(LossParameters {
            steel: strands.steel,
            strand_count,
            aps_in2: aps,
            fpj_ksi: fpj,
            strand_depth_in: depth,
            girder,
            composite,
            deck: deck_section,
            girder_moment_kipin: loads.total_moment(ProductLoad::GirderSelfWeight, poi),
            additional_moment_kipin: sum(ProductLoad::is_additional_noncomposite),
            superimposed_moment_kipin: sum(ProductLoad::is_superimposed),
            humidity: geometry.relative_humidity(),
            transfer_age_days: transfer_age,
            hauling_age_days: hauling_age,
            deck_age_days: deck_age,
            final_age_days: final_age,
            girder_concrete: concrete,
            deck_concrete: deck.map(|d| d.concrete),
            ppr: 1.0,
            temporary,
        })
    }

    pub fn has_strands(&self) -> bool {
        self.aps_in2 > 0.0 && self.strand_count > 0
    }

    /// Strand eccentricity on the non-composite section (positive below the centroid)
    pub fn eccentricity_in(&self) -> f64 {
        self.strand_depth_in - self.girder.centroid_in
    }

    /// Strand eccentricity on the composite section
    pub fn composite_eccentricity_in(&self) -> f64 {
        self.composite
            .map_or(self.eccentricity_in(), |c| self.strand_depth_in - c.centroid_in)
    }

    /// Deck centroid relative to the composite centroid (negative above)
    pub fn deck_eccentricity_in(&self) -> Option<f64> {
        Some(self.deck?.centroid_in - self.composite?.centroid_in)
    }

    pub fn fci_ksi(&self) -> f64 {
        self.girder_concrete.fci_ksi
    }

    pub fn fc_ksi(&self) -> f64 {
        self.girder_concrete.fc_ksi
    }

    pub fn eci_ksi(&self) -> f64 {
        self.girder_concrete.eci_ksi()
    }

    pub fn ec_ksi(&self) -> f64 {
        self.girder_concrete.ec_ksi()
    }

    pub fn ep_ksi(&self) -> f64 {
        self.steel.modulus_ksi
    }

    /// fpj must exceed 0.5 fpu (LRFD 5.9.5.4.4b).
    pub fn check_jacking_stress(&self) -> LossResult<()> {
        if self.fpj_ksi <= 0.5 * self.steel.fpu_ksi() {
            return Err(LossError::invalid_input(
                "fpj_ksi",
                format!("{:.2}", self.fpj_ksi),
                "Prestress jacking stress fpj does not exceed 0.5fpu; adjust the jacking forces",
            ));
        }
        Ok(())
    }

    /// f'c within the range the method was calibrated for.
    pub fn check_concrete_strength(&self, max_fc_ksi: f64) -> LossResult<()> {
        let fc = self.fc_ksi();
        if !(MIN_FC_KSI..=max_fc_ksi).contains(&fc) {
            return Err(LossError::invalid_input(
                "fc_ksi",
                fc.to_string(),
                format!("Concrete strength is outside {} to {} ksi", MIN_FC_KSI, max_fc_ksi),
            ));
        }
        Ok(())
    }

    /// Elastic shortening at transfer for strands stressed to `fpbt` just
    /// before transfer (LRFD C5.9.5.2.3a-1).
    ///
    /// ΔfpES = [Aps fpbt (Ig + e² Ag) − e Mg Ag] / [Aps (Ig + e² Ag) + Ag Ig Eci/Ep]
    pub fn elastic_shortening_ksi(&self, fpbt_ksi: f64) -> f64 {
        let (a, i, e) = (self.girder.area_in2, self.girder.inertia_in4, self.eccentricity_in());
        let mg = self.girder_moment_kipin;
        let num = self.aps_in2 * fpbt_ksi * (i + e * e * a) - e * mg * a;
        let den = self.aps_in2 * (i + e * e * a) + a * i * self.eci_ksi() / self.ep_ksi();
        if den > 0.0 {
            num / den
        } else {
            0.0
        }
    }

    /// Temporary strand eccentricity on the non-composite section
    pub fn temporary_eccentricity_in(&self) -> Option<f64> {
        self.temporary.map(|t| t.depth_in - self.girder.centroid_in)
    }

    /// Pretensioned temporary strands, released together with the permanent strands.
    pub fn pretensioned_temporary(&self) -> Option<&TemporaryStrandParameters> {
        self.temporary.as_ref().filter(|t| !t.usage.is_post_tensioned())
    }

    /// Concrete compression at the permanent strand centroid from a force
    /// acting at the temporary strand centroid.
    pub fn temporary_force_effect_ksi(&self, force_kip: f64) -> f64 {
        let Some(et) = self.temporary_eccentricity_in() else {
            return 0.0;
        };
        let (a, i) = (self.girder.area_in2, self.girder.inertia_in4);
        force_kip * (1.0 / a + et * self.eccentricity_in() / i)
    }

    /// Elastic shortening of the permanent and the pretensioned temporary
    /// strands released together, stressed to `fpbt` and `fpbt_temporary`.
    ///
    /// Each group loses Ep/Eci times the concrete stress at its own centroid,
    /// which couples the two losses into a 2×2 linear system.
    pub fn elastic_shortening_pair(&self, fpbt_ksi: f64, fpbt_temporary_ksi: f64) -> (f64, f64) {
        let (Some(t), Some(et)) = (self.pretensioned_temporary(), self.temporary_eccentricity_in()) else {
            return (self.elastic_shortening_ksi(fpbt_ksi), 0.0);
        };
        let (a, i, ep) = (self.girder.area_in2, self.girder.inertia_in4, self.eccentricity_in());
        let n = self.ep_ksi() / self.eci_ksi();
        let mg = self.girder_moment_kipin;
        // stress at centroid k per unit stress in group j
        let coefficient = |area: f64, ej: f64, ek: f64| area * (1.0 / a + ej * ek / i);
        let (app, apt) = (coefficient(self.aps_in2, ep, ep), coefficient(t.aps_in2, et, ep));
        let (atp, att) = (coefficient(self.aps_in2, ep, et), coefficient(t.aps_in2, et, et));
        let cp = app * fpbt_ksi + apt * fpbt_temporary_ksi - mg * ep / i;
        let ct = atp * fpbt_ksi + att * fpbt_temporary_ksi - mg * et / i;

        // (I + nA) es = n c
        let (m11, m12, m21, m22) = (1.0 + n * app, n * apt, n * atp, 1.0 + n * att);
        let det = m11 * m22 - m12 * m21;
        if det.abs() <= f64::EPSILON {
            return (self.elastic_shortening_ksi(fpbt_ksi), 0.0);
        }
        let es = n * (cp * m22 - m12 * ct) / det;
        let es_temporary = n * (m11 * ct - m21 * cp) / det;
        (es, es_temporary)
    }

    /// Concrete compression at the strand centroid from prestress `fpt` after
    /// transfer plus girder self weight (positive compression).
    pub fn fcgp_ksi(&self, fpt_ksi: f64) -> f64 {
        let (a, i, e) = (self.girder.area_in2, self.girder.inertia_in4, self.eccentricity_in());
        let p = self.aps_in2 * fpt_ksi;
        p / a + p * e * e / i - self.girder_moment_kipin * e / i
    }

    /// Loss of compression at the strand centroid from permanent loads applied
    /// after transfer (positive when compression decreases).
    pub fn delta_fcdp_ksi(&self) -> f64 {
        let noncomposite = self.additional_moment_kipin * self.eccentricity_in() / self.girder.inertia_in4;
        let composite = match self.composite {
            Some(c) => self.superimposed_moment_kipin * self.composite_eccentricity_in() / c.inertia_in4,
            None => self.superimposed_moment_kipin * self.eccentricity_in() / self.girder.inertia_in4,
        };
        noncomposite + composite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::profile::Profile;
    use crate::model::samples;
    use crate::model::strands::{StrandGroup, StrandType};
    use approx::assert_relative_eq;

    fn mid_span_parameters() -> LossParameters {
        let model = samples::pretensioned_i_girder().unwrap();
        let poi = model.girders[0]
            .pois
            .iter()
            .find(|r| r.poi.attributes.mid_span)
            .unwrap()
            .poi
            .clone();
        LossParameters::gather(&model.inputs(), &poi).unwrap()
    }

    #[test]
    fn test_gather_pretensioned() {
        let p = mid_span_parameters();
        assert_eq!(p.strand_count, 40);
        assert_relative_eq!(p.aps_in2, 40.0 * 0.217, epsilon = 1e-12);
        assert_relative_eq!(p.fpj_ksi, 0.75 * 270.0, epsilon = 1e-9);
        assert_relative_eq!(p.transfer_age_days, 1.0);
        assert_relative_eq!(p.hauling_age_days, 60.0);
        assert_relative_eq!(p.deck_age_days, 60.0);
        assert!(p.temporary.is_none());
        assert_relative_eq!(p.final_age_days, 2000.0);
        assert!(p.eccentricity_in() > 30.0);
        assert!(p.composite_eccentricity_in() > p.eccentricity_in());
        assert!(p.deck_eccentricity_in().unwrap() < 0.0);
        assert!(p.girder_moment_kipin > 0.0 && p.superimposed_moment_kipin > 0.0);
    }

    #[test]
    fn test_elastic_shortening_consistent_with_fcgp() {
        let p = mid_span_parameters();
        let fpbt = p.fpj_ksi - 2.0;
        let es = p.elastic_shortening_ksi(fpbt);
        // ΔfpES = Ep/Eci fcgp with fcgp from the reduced force
        assert_relative_eq!(es, p.ep_ksi() / p.eci_ksi() * p.fcgp_ksi(fpbt - es), max_relative = 1e-9);
        assert!(es > 10.0 && es < 40.0);
    }

    #[test]
    fn test_parameter_checks() {
        let mut p = mid_span_parameters();
        p.check_jacking_stress().unwrap();
        p.check_concrete_strength(15.0).unwrap();
        p.fpj_ksi = 0.5 * 270.0;
        assert_eq!(p.check_jacking_stress().unwrap_err().error_code(), "INVALID_INPUT");
        p.girder_concrete.fc_ksi = 16.0;
        assert!(p.check_concrete_strength(15.0).is_err());
    }

    fn with_temporary(usage: TemporaryStrandUsage) -> LossParameters {
        let mut p = mid_span_parameters();
        p.temporary = Some(TemporaryStrandParameters {
            usage,
            strand_count: 4,
            aps_in2: 4.0 * 0.217,
            fpj_ksi: 202.5,
            depth_in: 3.0,
            friction: FrictionParameters::default(),
            distance_in: 600.0,
            length_in: 1200.0,
            angle_change_rad: 0.0,
        });
        p
    }

    #[test]
    fn test_gather_hauling_and_temporary_strands() {
        let mut model = samples::pretensioned_i_girder().unwrap();
        let segment = &mut model.girders[0].segments[0];
        segment.events.hauling = Some(EventId(2));
        segment.strands.temporary_usage = TemporaryStrandUsage::PostTensionedAfterLifting;
        let length = segment.length_in;
        segment.strands.groups.push(StrandGroup {
            strand_type: StrandType::Temporary,
            strand_count: 4,
            strand_area_in2: 0.217,
            jacking_force_kip: None,
            profile: Profile::straight(0.0, length, 3.0),
        });
        let poi = model.girders[0]
            .pois
            .iter()
            .find(|r| r.poi.attributes.mid_span)
            .unwrap()
            .poi
            .clone();
        let p = LossParameters::gather(&model.inputs(), &poi).unwrap();
        // interval 2 opens on day 1
        assert_relative_eq!(p.hauling_age_days, 1.0);
        let t = p.temporary.unwrap();
        assert_eq!(t.usage, TemporaryStrandUsage::PostTensionedAfterLifting);
        assert_relative_eq!(t.aps_in2, 4.0 * 0.217, epsilon = 1e-12);
        assert_relative_eq!(t.distance_in, poi.x_segment_in, epsilon = 1e-9);
        assert!(p.temporary_eccentricity_in().unwrap() < 0.0);
        // permanent strands are unaffected
        assert_eq!(p.strand_count, 40);
        assert!(p.pretensioned_temporary().is_none());
    }

    #[test]
    fn test_elastic_shortening_pair() {
        let p = mid_span_parameters();
        let fpbt = p.fpj_ksi - 2.0;
        assert_eq!(p.elastic_shortening_pair(fpbt, 200.0), (p.elastic_shortening_ksi(fpbt), 0.0));

        let p = with_temporary(TemporaryStrandUsage::Pretensioned);
        let (es, es_t) = p.elastic_shortening_pair(fpbt, 200.0);
        // each group loses Ep/Eci times the stress at its centroid after transfer
        let (a, i) = (p.girder.area_in2, p.girder.inertia_in4);
        let (ep, et) = (p.eccentricity_in(), p.temporary_eccentricity_in().unwrap());
        let pp = p.aps_in2 * (fpbt - es);
        let pt = p.temporary.unwrap().aps_in2 * (200.0 - es_t);
        let stress_at = |e: f64| pp / a + pt / a + (pp * ep + pt * et) * e / i - p.girder_moment_kipin * e / i;
        let n = p.ep_ksi() / p.eci_ksi();
        assert_relative_eq!(es, n * stress_at(ep), max_relative = 1e-9);
        assert_relative_eq!(es_t, n * stress_at(et), max_relative = 1e-9);
        // top strands reduce compression at the bottom strands
        assert!(es < p.elastic_shortening_ksi(fpbt));

        let p = with_temporary(TemporaryStrandUsage::PostTensionedBeforeLifting);
        assert_eq!(p.elastic_shortening_pair(fpbt, 200.0).1, 0.0);
    }

    #[test]
    fn test_temporary_force_effect() {
        let p = mid_span_parameters();
        assert_eq!(p.temporary_force_effect_ksi(100.0), 0.0);
        let p = with_temporary(TemporaryStrandUsage::Pretensioned);
        let et = p.temporary_eccentricity_in().unwrap();
        let expected = 100.0 * (1.0 / p.girder.area_in2 + et * p.eccentricity_in() / p.girder.inertia_in4);
        assert_relative_eq!(p.temporary_force_effect_ksi(100.0), expected, epsilon = 1e-12);
    }
}
