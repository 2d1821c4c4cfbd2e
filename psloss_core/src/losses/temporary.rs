//! # Temporary Strands
//!
//! Temporary strands stiffen a long segment for lifting and shipping and are
//! removed once the segment is erected. Their time-dependent losses are not
//! tracked; what matters is their elastic effect on the permanent strands.
//!
//! ```text
//! Pretensioned:     fpt  = fpjTTS − ΔfpR0 − ΔfpES
//! Post-tensioned:   fpt  = fpjTTS − ΔfpF − ΔfpA − ΔfpES
//!                   ΔfpES = (N − 1)/(2N) (Ep/Eci) fcgpTTS
//!                   ΔfpPT = (Ep/Eci) ApsTTS fpt (1/A + et ep/I)   on the permanent strands
//! Removal:          Ptr   = ApsTTS fptr
//!                   Δfptr = (Ep/Ec) Ptr (1/A + et ep/I)           gain on the permanent strands
//! ```

use serde::{Deserialize, Serialize};

use super::anchor_set;
use super::friction::{friction_loss, StressPoint, StressProfile, DEFAULT_PROFILE_SAMPLES};
use super::options::TimeStepOptions;
use super::parameters::{LossParameters, TemporaryStrandParameters};
use crate::model::strands::TemporaryStrandUsage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporaryStrandEffects {
    pub usage: TemporaryStrandUsage,
    pub aps_in2: f64,
    pub fpj_ksi: f64,
    pub eccentricity_in: f64,
    /// ΔfpF at the point, post-tensioned strands only
    pub friction_ksi: f64,
    /// ΔfpA at the point, post-tensioned strands only
    pub anchor_set_ksi: f64,
    /// ΔfpR0 of pretensioned temporary strands
    pub relaxation_ksi: f64,
    /// Loss of the temporary strands at transfer or stressing
    pub elastic_shortening_ksi: f64,
    /// Temporary strand stress after transfer or stressing
    pub fpt_ksi: f64,
    /// ΔfpPT, shortening of the permanent strands when the temporary strands are post-tensioned
    pub pt_shortening_ksi: f64,
    /// Temporary strand stress just before removal
    pub fptr_ksi: f64,
    pub removal_force_kip: f64,
    /// Δfptr, recovery of the permanent strands when the temporary strands are cut
    pub removal_gain_ksi: f64,
}

/// Post-friction stress of straight or slightly draped temporary strands,
/// jacked from the start of the segment.
pub fn temporary_friction_profile(strands: &TemporaryStrandParameters) -> StressProfile {
    let f = &strands.friction;
    let length = strands.length_in.max(0.0);
    let points = (0..=DEFAULT_PROFILE_SAMPLES)
        .map(|i| {
            let d = length * i as f64 / DEFAULT_PROFILE_SAMPLES as f64;
            let alpha = if length > 0.0 { strands.angle_change_rad * d / length } else { 0.0 };
            StressPoint {
                distance_in: d,
                stress_ksi: strands.fpj_ksi
                    - friction_loss(strands.fpj_ksi, f.wobble_per_in, d, f.friction_coefficient, alpha),
            }
        })
        .collect();
    StressProfile { points }
}

impl TemporaryStrandEffects {
    /// Effects of the temporary strands on the permanent strands.
    ///
    /// `relaxation_ksi` and `elastic_shortening_ksi` are the losses of
    /// pretensioned temporary strands up to release. `time_dependent_ksi` is
    /// the loss they suffer before they are removed.
    pub fn compute(
        params: &LossParameters,
        relaxation_ksi: f64,
        elastic_shortening_ksi: f64,
        time_dependent_ksi: f64,
    ) -> Option<Self> {
        let t = params.temporary?;
        let et = params.temporary_eccentricity_in()?;
        let (a, i) = (params.girder.area_in2, params.girder.inertia_in4);
        let n = params.ep_ksi() / params.eci_ksi();

        let (relaxation, friction, anchor_set, es, pt_shortening) = if t.usage.is_post_tensioned() {
            let profile = temporary_friction_profile(&t);
            let distance = t.distance_in.clamp(0.0, t.length_in.max(0.0));
            let friction = t.fpj_ksi - profile.stress_at(distance);
            let solution = anchor_set::solve(
                &profile,
                t.friction.seating_in,
                params.ep_ksi(),
                t.length_in,
                &TimeStepOptions::default(),
            );
            let anchor_set = solution.loss_at(&profile, distance);
            let fpt = t.fpj_ksi - friction - anchor_set;
            let fcgp = t.aps_in2 * fpt * (1.0 / a + et * et / i);
            let strands = t.strand_count.max(1) as f64;
            let es = (strands - 1.0) / (2.0 * strands) * n * fcgp;
            let shortening = n * params.temporary_force_effect_ksi(t.aps_in2 * (fpt - es));
            (0.0, friction, anchor_set, es, shortening)
        } else {
            (relaxation_ksi, 0.0, 0.0, elastic_shortening_ksi, 0.0)
        };

        let fpt = t.fpj_ksi - relaxation - friction - anchor_set - es;
        let fptr = (fpt - time_dependent_ksi).max(0.0);
        let removal_force = t.aps_in2 * fptr;
        Some(TemporaryStrandEffects {
            usage: t.usage,
            aps_in2: t.aps_in2,
            fpj_ksi: t.fpj_ksi,
            eccentricity_in: et,
            friction_ksi: friction,
            anchor_set_ksi: anchor_set,
            relaxation_ksi: relaxation,
            elastic_shortening_ksi: es,
            fpt_ksi: fpt,
            pt_shortening_ksi: pt_shortening,
            fptr_ksi: fptr,
            removal_force_kip: removal_force,
            removal_gain_ksi: params.ep_ksi() / params.ec_ksi() * params.temporary_force_effect_ksi(removal_force),
        })
    }

    /// ΔfpPT felt by the permanent strands right after transfer.
    pub fn shortening_after_transfer_ksi(&self) -> f64 {
        if self.usage == TemporaryStrandUsage::PostTensionedBeforeLifting {
            self.pt_shortening_ksi
        } else {
            0.0
        }
    }

    /// Net elastic effect on the permanent strands once the temporary strands are removed.
    pub fn net_after_removal_ksi(&self) -> f64 {
        self.pt_shortening_ksi - self.removal_gain_ksi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::samples;
    use crate::model::tendon::FrictionParameters;
    use approx::assert_relative_eq;

    fn parameters(usage: TemporaryStrandUsage, distance_in: f64) -> LossParameters {
        let model = samples::pretensioned_i_girder().unwrap();
        let poi = model.girders[0]
            .pois
            .iter()
            .find(|r| r.poi.attributes.mid_span)
            .unwrap()
            .poi
            .clone();
        let mut p = LossParameters::gather(&model.inputs(), &poi).unwrap();
        p.temporary = Some(TemporaryStrandParameters {
            usage,
            strand_count: 4,
            aps_in2: 4.0 * 0.217,
            fpj_ksi: 202.5,
            depth_in: 3.0,
            friction: FrictionParameters::new(0.0002 / 12.0, 0.25, 0.375),
            distance_in,
            length_in: 1500.0,
            angle_change_rad: 0.0,
        });
        p
    }

    #[test]
    fn test_no_temporary_strands() {
        let mut p = parameters(TemporaryStrandUsage::Pretensioned, 750.0);
        p.temporary = None;
        assert!(TemporaryStrandEffects::compute(&p, 2.0, 10.0, 5.0).is_none());
    }

    #[test]
    fn test_pretensioned_removal_gain() {
        let p = parameters(TemporaryStrandUsage::Pretensioned, 750.0);
        let t = TemporaryStrandEffects::compute(&p, 2.0, 10.0, 8.0).unwrap();
        assert_eq!(t.friction_ksi, 0.0);
        assert_eq!(t.elastic_shortening_ksi, 10.0);
        assert_eq!(t.pt_shortening_ksi, 0.0);
        assert_relative_eq!(t.fpt_ksi, 202.5 - 12.0);
        assert_relative_eq!(t.fptr_ksi, 202.5 - 20.0);
        assert_relative_eq!(t.removal_force_kip, 4.0 * 0.217 * 182.5, epsilon = 1e-9);
        let expected = p.ep_ksi() / p.ec_ksi() * p.temporary_force_effect_ksi(t.removal_force_kip);
        assert_relative_eq!(t.removal_gain_ksi, expected, epsilon = 1e-12);
        // top strands put the bottom fibers in tension, so cutting them costs the permanent strands
        assert!(t.removal_gain_ksi < 0.0);
        assert_eq!(t.shortening_after_transfer_ksi(), 0.0);
    }

    #[test]
    fn test_post_tensioned_friction_and_anchor_set() {
        let usage = TemporaryStrandUsage::PostTensionedBeforeLifting;
        // bed losses are ignored for post-tensioned strands
        let near = TemporaryStrandEffects::compute(&parameters(usage, 0.0), 5.0, 5.0, 0.0).unwrap();
        let far = TemporaryStrandEffects::compute(&parameters(usage, 1500.0), 5.0, 5.0, 0.0).unwrap();
        assert_eq!(near.relaxation_ksi, 0.0);
        assert_eq!(near.friction_ksi, 0.0);
        // ΔfpF = fpj (1 − e^−KL)
        assert_relative_eq!(far.friction_ksi, 202.5 * (1.0 - (-0.0002 / 12.0 * 1500.0f64).exp()), max_relative = 1e-9);
        assert!(near.anchor_set_ksi > far.anchor_set_ksi);
        assert!(near.elastic_shortening_ksi > 0.0);
        assert_relative_eq!(
            near.fpt_ksi,
            202.5 - near.friction_ksi - near.anchor_set_ksi - near.elastic_shortening_ksi,
            epsilon = 1e-12
        );
        assert_eq!(near.shortening_after_transfer_ksi(), near.pt_shortening_ksi);
        assert_relative_eq!(
            near.net_after_removal_ksi(),
            near.pt_shortening_ksi - near.removal_gain_ksi,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_post_tensioned_after_lifting_waits_for_shipping() {
        let p = parameters(TemporaryStrandUsage::PostTensionedAfterLifting, 750.0);
        let t = TemporaryStrandEffects::compute(&p, 0.0, 0.0, 0.0).unwrap();
        assert_ne!(t.pt_shortening_ksi, 0.0);
        assert_eq!(t.shortening_after_transfer_ksi(), 0.0);
    }
}
