//! # Loss Dispatcher
//!
//! [`PsLossEngineer`] answers "what are the losses at this point of interest"
//! for the method the project's specification entry calls for.
//!
//! Two configurations are served:
//!
//! - **As built**: the committed bridge. Results are cached per POI; the
//!   time-step method keeps its own per-girder history.
//! - **Design trial**: a caller-supplied [`GirderConfig`] substituted through
//!   [`TrialGeometry`]. Results go to a separate cache keyed on the
//!   configuration, so trials never overwrite as-built results.

use std::collections::{BTreeMap, HashMap};

use log::{debug, info};

use super::approximate::ApproximateLosses;
use super::details::{LossComponents, LossDetails, MethodDetails, SectionSnapshot, StageLosses, SteelElement, SteelLoss};
use super::lump_sum::LumpSumLosses;
use super::method::{resolve_method, LossStrategy, ResolvedMethod, SpecLibrary, DEFAULT_SPEC_ENTRY};
use super::parameters::{BeamType, LossParameters};
use super::refined::{Refined2005Losses, RefinedBefore2005Losses};
use super::time_step::TimeStepLossEngine;
use crate::errors::{LossError, LossResult};
use crate::model::keys::{PoiId, PointOfInterest};
use crate::model::strands::GirderConfig;
use crate::providers::{LossInputs, TrialGeometry};
use crate::status::{StatusItem, StatusSink};

/// Which configuration to compute.
#[derive(Debug, Clone, Copy)]
pub enum ComputeMode<'c> {
    AsBuilt,
    DesignTrial(&'c GirderConfig),
}

#[derive(Debug, Clone)]
pub struct PsLossEngineer {
    library: SpecLibrary,
    spec_entry: String,
    resolved: Option<ResolvedMethod>,
    time_step: TimeStepLossEngine,
    as_built: BTreeMap<PoiId, LossDetails>,
    design: HashMap<(PoiId, String), LossDetails>,
}

impl Default for PsLossEngineer {
    fn default() -> Self {
        PsLossEngineer::new(SpecLibrary::default_library().clone(), DEFAULT_SPEC_ENTRY)
    }
}

impl PsLossEngineer {
    pub fn new(library: SpecLibrary, spec_entry: &str) -> Self {
        PsLossEngineer {
            library,
            spec_entry: spec_entry.to_string(),
            resolved: None,
            time_step: TimeStepLossEngine::default(),
            as_built: BTreeMap::new(),
            design: HashMap::new(),
        }
    }

    pub fn spec_entry(&self) -> &str {
        &self.spec_entry
    }

    /// Select another library entry. All cached results are discarded.
    pub fn set_spec_entry(&mut self, name: &str) {
        if name != self.spec_entry {
            self.spec_entry = name.to_string();
            self.resolved = None;
            self.invalidate();
        }
    }

    /// Method resolved from the current entry; warnings go to `status` the
    /// first time only.
    pub fn resolve(&mut self, status: &mut dyn StatusSink) -> &ResolvedMethod {
        let resolved = match self.resolved.take() {
            Some(resolved) => resolved,
            None => {
                let resolved = resolve_method(&self.library, &self.spec_entry, status);
                info!("loss method: {} ({})", resolved.strategy.title(), resolved.edition);
                if let LossStrategy::TimeStep(options) = resolved.strategy {
                    if *self.time_step.options() != options {
                        self.time_step = TimeStepLossEngine::new(options);
                    }
                }
                resolved
            }
        };
        self.resolved.insert(resolved)
    }

    pub fn time_step_engine(&self) -> &TimeStepLossEngine {
        &self.time_step
    }

    pub fn time_step_engine_mut(&mut self) -> &mut TimeStepLossEngine {
        &mut self.time_step
    }

    /// Losses at `poi` for the as-built configuration.
    pub fn compute_losses(
        &mut self,
        inputs: &LossInputs<'_>,
        beam_type: BeamType,
        poi: &PointOfInterest,
        status: &mut dyn StatusSink,
    ) -> LossResult<LossDetails> {
        self.compute(inputs, beam_type, poi, ComputeMode::AsBuilt, status)
    }

    /// Losses at `poi` with `config` substituted for the committed strands and
    /// concrete strengths.
    pub fn compute_losses_for_design(
        &mut self,
        inputs: &LossInputs<'_>,
        beam_type: BeamType,
        poi: &PointOfInterest,
        config: &GirderConfig,
        status: &mut dyn StatusSink,
    ) -> LossResult<LossDetails> {
        self.compute(inputs, beam_type, poi, ComputeMode::DesignTrial(config), status)
    }

    pub fn compute(
        &mut self,
        inputs: &LossInputs<'_>,
        beam_type: BeamType,
        poi: &PointOfInterest,
        mode: ComputeMode<'_>,
        status: &mut dyn StatusSink,
    ) -> LossResult<LossDetails> {
        let result = self.compute_inner(inputs, beam_type, poi, mode, status);
        if let Err(err) = &result {
            status.add(StatusItem::error(
                Some(poi.girder_key()),
                format!("Prestress losses could not be computed at POI {}: {}", poi.id, err),
            ));
        }
        result
    }

    fn compute_inner(
        &mut self,
        inputs: &LossInputs<'_>,
        beam_type: BeamType,
        poi: &PointOfInterest,
        mode: ComputeMode<'_>,
        status: &mut dyn StatusSink,
    ) -> LossResult<LossDetails> {
        let resolved = self.resolve(status).clone();

        match mode {
            ComputeMode::AsBuilt => {
                if resolved.strategy.is_time_step() {
                    let last = inputs
                        .timeline
                        .last_interval()
                        .ok_or_else(|| LossError::missing_field("timeline.intervals"))?;
                    return self.time_step.losses(inputs, poi, last).cloned();
                }
                if let Some(details) = self.as_built.get(&poi.id) {
                    return Ok(details.clone());
                }
                let details = code_method_losses(inputs, &resolved, beam_type, poi)?;
                self.as_built.insert(poi.id, details.clone());
                Ok(details)
            }
            ComputeMode::DesignTrial(config) => {
                let key = (poi.id, config.fingerprint()?);
                if let Some(details) = self.design.get(&key) {
                    return Ok(details.clone());
                }
                let trial = TrialGeometry::new(inputs.geometry, config);
                let trial_inputs = inputs.with_geometry(&trial);
                let details = match resolved.strategy {
                    LossStrategy::TimeStep(options) => {
                        debug!("POI {}: time-step losses for trial configuration", poi.id);
                        let last = inputs
                            .timeline
                            .last_interval()
                            .ok_or_else(|| LossError::missing_field("timeline.intervals"))?;
                        let mut engine = TimeStepLossEngine::new(options);
                        engine.losses(&trial_inputs, poi, last)?.clone()
                    }
                    _ => code_method_losses(&trial_inputs, &resolved, beam_type, poi)?,
                };
                self.design.insert(key, details.clone());
                Ok(details)
            }
        }
    }

    /// Discard design-trial results only.
    pub fn clear_design_losses(&mut self) {
        self.design.clear();
    }

    /// Discard every cached result.
    pub fn invalidate(&mut self) {
        self.as_built.clear();
        self.design.clear();
        self.time_step.clear_all();
    }

    pub fn as_built_count(&self) -> usize {
        self.as_built.len()
    }

    pub fn design_count(&self) -> usize {
        self.design.len()
    }
}

/// Loss parameters at `poi` with the spec entry's curing overrides applied.
pub fn method_parameters(
    inputs: &LossInputs<'_>,
    resolved: &ResolvedMethod,
    poi: &PointOfInterest,
) -> LossResult<LossParameters> {
    let mut params = LossParameters::gather(inputs, poi)?;
    if let Some(curing) = resolved.entry.curing {
        params.girder_concrete.curing = curing;
    }
    if let Some(factor) = resolved.entry.accelerated_time_factor {
        params.girder_concrete.accelerated_time_factor = factor;
    }
    Ok(params)
}

fn code_method_losses(
    inputs: &LossInputs<'_>,
    resolved: &ResolvedMethod,
    beam_type: BeamType,
    poi: &PointOfInterest,
) -> LossResult<LossDetails> {
    let params = method_parameters(inputs, resolved, poi)?;
    let shipping = resolved.entry.shipping_loss;
    let strategy = resolved.strategy.clone();

    if !params.has_strands() {
        return Ok(record(poi, &params, strategy, None, MethodDetails::NoPrestress));
    }

    let (components, stages, details) = match &strategy {
        LossStrategy::RefinedBefore2005(agency) => {
            let l = RefinedBefore2005Losses::compute(&params, *agency, shipping)?;
            (l.components(), l.stages(), MethodDetails::RefinedBefore2005(l))
        }
        LossStrategy::Refined2005(agency) => {
            let l = Refined2005Losses::compute(&params, *agency)?;
            (l.components(), l.stages(), MethodDetails::Refined2005(l))
        }
        LossStrategy::ApproximateBefore2005(agency) => {
            let l = ApproximateLosses::compute(&params, *agency, beam_type, true, shipping)?;
            (l.components(), l.stages(), MethodDetails::Approximate(l))
        }
        LossStrategy::Approximate2005(agency) => {
            let l = ApproximateLosses::compute(&params, *agency, beam_type, false, shipping)?;
            (l.components(), l.stages(), MethodDetails::Approximate(l))
        }
        LossStrategy::GeneralLumpSum(values) => {
            let l = LumpSumLosses::compute(values, &params);
            (l.components(), l.stages(), MethodDetails::LumpSum(l))
        }
        LossStrategy::TimeStep(_) => {
            return Err(LossError::Internal {
                message: "time-step method routed to the estimate methods".to_string(),
            })
        }
    };
    Ok(record(poi, &params, strategy, Some((components, stages)), details))
}

fn record(
    poi: &PointOfInterest,
    params: &LossParameters,
    strategy: LossStrategy,
    losses: Option<(LossComponents, StageLosses)>,
    details: MethodDetails,
) -> LossDetails {
    let steel = match losses {
        Some((components, _)) => vec![SteelLoss {
            element: SteelElement::PermanentStrands,
            area_in2: params.aps_in2,
            depth_in: params.strand_depth_in,
            fpj_ksi: params.fpj_ksi,
            stressed: true,
            bonded: true,
            friction_loss_ksi: 0.0,
            anchor_set_loss_ksi: 0.0,
            incremental: components,
            cumulative: components,
            fpe_ksi: params.fpj_ksi - components.total(),
        }],
        None => Vec::new(),
    };
    LossDetails {
        poi: poi.id,
        interval: None,
        strategy,
        section: SectionSnapshot {
            girder: params.girder,
            composite: params.composite,
            transformed: None,
        },
        steel,
        stages: Some(losses.map(|(_, stages)| stages).unwrap_or_default()),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::section::SectionProperties;
    use crate::losses::method::{Agency, LossMethod, SpecEdition, SpecLibraryEntry};
    use crate::model::bridge::BridgeModel;
    use crate::model::keys::IntervalIndex;
    use crate::model::samples;
    use crate::model::strands::{StrandConfig, StrandType};
    use crate::providers::{IntervalTimeline, SectionPart, SectionPropertyMode, SectionPropertyProvider};
    use crate::status::{StatusCenter, StatusSeverity};
    use approx::assert_relative_eq;

    fn mid_span(model: &BridgeModel) -> PointOfInterest {
        model.girders[0]
            .pois
            .iter()
            .map(|r| r.poi.clone())
            .find(|p| p.attributes.mid_span)
            .unwrap()
    }

    fn engineer_for(method: LossMethod, edition: SpecEdition) -> PsLossEngineer {
        let library = SpecLibrary {
            entries: vec![SpecLibraryEntry::new("Project", edition, method)],
        };
        PsLossEngineer::new(library, "Project")
    }

    fn trial(poi: &PointOfInterest, strands: u32) -> GirderConfig {
        GirderConfig {
            segment: poi.segment,
            strands: vec![StrandConfig {
                strand_type: StrandType::Straight,
                strand_count: strands,
                jacking_force_kip: None,
            }],
            fci_ksi: 6.0,
            fc_ksi: 8.0,
        }
    }

    #[test]
    fn test_default_entry_uses_refined_2005() {
        let model = samples::pretensioned_i_girder().unwrap();
        let poi = mid_span(&model);
        let mut status = StatusCenter::new();
        let mut engineer = PsLossEngineer::default();
        let details = engineer
            .compute_losses(&model.inputs(), BeamType::IBeam, &poi, &mut status)
            .unwrap();
        assert_eq!(details.strategy, LossStrategy::Refined2005(Agency::Aashto));
        assert!(matches!(details.details, MethodDetails::Refined2005(_)));
        let stages = details.stages.unwrap();
        assert_relative_eq!(details.permanent_strand_loss_ksi(), stages.final_ksi, epsilon = 1e-9);
        assert_eq!(status.items().len(), 0);
    }

    #[test]
    fn test_every_estimate_method_dispatches() {
        let model = samples::pretensioned_i_girder().unwrap();
        let poi = mid_span(&model);
        for method in LossMethod::ALL.into_iter().filter(|m| *m != LossMethod::TimeStep) {
            for edition in [SpecEdition::ThirdEdition2004, SpecEdition::LATEST] {
                let mut status = StatusCenter::new();
                let mut engineer = engineer_for(method, edition);
                let details = engineer
                    .compute_losses(&model.inputs(), BeamType::IBeam, &poi, &mut status)
                    .unwrap();
                let stages = details.stages.unwrap();
                assert!(stages.after_transfer_ksi <= stages.final_ksi, "{} {}", method, edition);
                assert!(details.permanent_strand_fpe_ksi() > 0.0);
            }
        }
    }

    #[test]
    fn test_design_trial_does_not_touch_as_built() {
        let model = samples::pretensioned_i_girder().unwrap();
        let inputs = model.inputs();
        let poi = mid_span(&model);
        let mut status = StatusCenter::new();
        let mut engineer = PsLossEngineer::default();

        let before = engineer.compute_losses(&inputs, BeamType::IBeam, &poi, &mut status).unwrap();
        let design = engineer
            .compute_losses_for_design(&inputs, BeamType::IBeam, &poi, &trial(&poi, 24), &mut status)
            .unwrap();
        let after = engineer.compute_losses(&inputs, BeamType::IBeam, &poi, &mut status).unwrap();

        assert_eq!(before, after);
        assert!(design.steel[0].area_in2 < before.steel[0].area_in2);
        assert_ne!(design.permanent_strand_loss_ksi(), before.permanent_strand_loss_ksi());
        assert_eq!(engineer.design_count(), 1);

        engineer.clear_design_losses();
        assert_eq!(engineer.design_count(), 0);
        assert_eq!(engineer.as_built_count(), 1);
    }

    #[test]
    fn test_design_cache_keyed_on_configuration() {
        let model = samples::pretensioned_i_girder().unwrap();
        let inputs = model.inputs();
        let poi = mid_span(&model);
        let mut status = StatusCenter::new();
        let mut engineer = PsLossEngineer::default();
        let a = engineer
            .compute_losses_for_design(&inputs, BeamType::IBeam, &poi, &trial(&poi, 24), &mut status)
            .unwrap();
        let b = engineer
            .compute_losses_for_design(&inputs, BeamType::IBeam, &poi, &trial(&poi, 32), &mut status)
            .unwrap();
        let a_again = engineer
            .compute_losses_for_design(&inputs, BeamType::IBeam, &poi, &trial(&poi, 24), &mut status)
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(a, a_again);
        assert_eq!(engineer.design_count(), 2);
    }

    #[test]
    fn test_time_step_as_built_and_trial() {
        let model = samples::pretensioned_i_girder().unwrap();
        let inputs = model.inputs();
        let poi = mid_span(&model);
        let last = model.timeline.last_interval().unwrap();
        let mut status = StatusCenter::new();
        let mut engineer = engineer_for(LossMethod::TimeStep, SpecEdition::LATEST);

        let details = engineer.compute_losses(&inputs, BeamType::IBeam, &poi, &mut status).unwrap();
        assert_eq!(details.interval, Some(last));
        assert!(details.time_step().is_some());
        let girder = poi.girder_key();
        assert_eq!(engineer.time_step_engine().finalized_interval(girder), Some(last));

        engineer.time_step_engine_mut().clear_all();
        let design = engineer
            .compute_losses_for_design(&inputs, BeamType::IBeam, &poi, &trial(&poi, 24), &mut status)
            .unwrap();
        assert_eq!(design.interval, Some(last));
        assert_eq!(engineer.time_step_engine().finalized_interval(girder), None);
    }

    #[test]
    fn test_unknown_entry_warns_and_computes() {
        let model = samples::pretensioned_i_girder().unwrap();
        let poi = mid_span(&model);
        let mut status = StatusCenter::new();
        let mut engineer = PsLossEngineer::new(SpecLibrary::default_library().clone(), "Missing");
        let details = engineer
            .compute_losses(&model.inputs(), BeamType::IBeam, &poi, &mut status)
            .unwrap();
        assert_eq!(details.strategy, LossStrategy::Refined2005(Agency::Aashto));
        assert_eq!(status.count(StatusSeverity::Warning), 1);

        // warned once per resolution
        let other = model.girders[0].pois[3].poi.clone();
        engineer
            .compute_losses(&model.inputs(), BeamType::IBeam, &other, &mut status)
            .unwrap();
        assert_eq!(status.count(StatusSeverity::Warning), 1);
    }

    #[test]
    fn test_closure_joint_reports_no_prestress() {
        let model = samples::spliced_two_duct_girder().unwrap();
        let poi = model.girders[0]
            .pois
            .iter()
            .map(|r| r.poi.clone())
            .find(|p| p.attributes.closure_joint)
            .unwrap();
        let mut status = StatusCenter::new();
        let mut engineer = PsLossEngineer::default();
        let details = engineer
            .compute_losses(&model.inputs(), BeamType::IBeam, &poi, &mut status)
            .unwrap();
        assert_eq!(details.details, MethodDetails::NoPrestress);
        assert!(details.steel.is_empty());
        assert_eq!(details.stages.unwrap().final_ksi, 0.0);
    }

    struct NoSections;

    impl SectionPropertyProvider for NoSections {
        fn section_properties(
            &self,
            _part: SectionPart,
            _mode: SectionPropertyMode,
            _interval: IntervalIndex,
            _poi: &PointOfInterest,
        ) -> Option<SectionProperties> {
            None
        }
    }

    #[test]
    fn test_missing_section_is_fatal_for_the_call() {
        let model = samples::pretensioned_i_girder().unwrap();
        let inputs = LossInputs {
            sections: &NoSections,
            ..model.inputs()
        };
        let poi = mid_span(&model);
        let mut status = StatusCenter::new();
        let mut engineer = PsLossEngineer::default();
        let err = engineer
            .compute_losses(&inputs, BeamType::IBeam, &poi, &mut status)
            .unwrap_err();
        assert_eq!(err.error_code(), "MISSING_SECTION_PROPERTIES");
        assert_eq!(status.count(StatusSeverity::Error), 1);
        assert_eq!(engineer.as_built_count(), 0);
    }

    #[test]
    fn test_changing_entry_discards_results() {
        let model = samples::pretensioned_i_girder().unwrap();
        let poi = mid_span(&model);
        let mut status = StatusCenter::new();
        let mut engineer = PsLossEngineer::default();
        let refined = engineer
            .compute_losses(&model.inputs(), BeamType::IBeam, &poi, &mut status)
            .unwrap();
        engineer.set_spec_entry("General Lump Sum");
        assert_eq!(engineer.as_built_count(), 0);
        let lump = engineer
            .compute_losses(&model.inputs(), BeamType::IBeam, &poi, &mut status)
            .unwrap();
        assert_ne!(refined.strategy, lump.strategy);
        assert_relative_eq!(lump.stages.unwrap().final_ksi, 40.0);
    }
}
