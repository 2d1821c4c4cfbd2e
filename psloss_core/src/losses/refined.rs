//! # Refined Estimates
//!
//! Code refined estimates of time-dependent loss for pretensioned members.
//!
//! ## Before 2005 (AASHTO LRFD 3rd Edition 2004 and earlier, TxDOT 2004)
//!
//! ```text
//! ΔfpT = ΔfpR1 + ΔfpES + ΔfpSR + ΔfpCR + ΔfpR2
//! ΔfpSR = 17.0 − 0.150 H
//! ΔfpCR = 12.0 fcgp − 7.0 Δfcdp ≥ 0
//! ΔfpR1 = log(24 t)/40 (fpj/fpy − 0.55) fpj       (low relaxation: /40, stress relieved: /10)
//! ΔfpR2 = 20.0 − 0.4 ΔfpES − 0.2 (ΔfpSR + ΔfpCR) (× 0.3 for low relaxation)
//! ```
//!
//! ## 2005 interims and later (AASHTO, WSDOT)
//!
//! Two stages, transfer to deck placement and deck placement to final, with
//! the transformed section factors Kid and Kdf and a gain from deck shrinkage.
//!
//! ```text
//! ΔfpLT = (ΔfpSR + ΔfpCR + ΔfpR1)id + (ΔfpSD + ΔfpCD + ΔfpR2 − ΔfpSS)df
//! ```
//!
//! Losses at hauling follow the same terms over the time between transfer
//! and hauling, with the girder shrinkage and creep evaluated at age th:
//!
//! ```text
//! ΔfpSRH = εbih Ep Kid
//! ΔfpCRH = (Ep/Eci) fcgp ψb(th, ti) Kid
//! ΔfpR1H = ΔfpR1 × relaxation(ti, th) / relaxation(ti, td)
//! ```
//!
//! Both methods add the elastic effect of temporary strands: shortening when
//! they are post-tensioned and recovery when they are cut before deck placement.
//!
//! WSDOT skips the concrete strength validity check.

use serde::{Deserialize, Serialize};

use super::details::{LossComponents, StageLosses};
use super::method::{Agency, ShippingLoss};
use super::parameters::LossParameters;
use super::temporary::TemporaryStrandEffects;
use crate::errors::LossResult;

/// Upper limit of f'c for the pre-2005 refined method
pub const MAX_FC_BEFORE_2005_KSI: f64 = 10.0;
/// Upper limit of f'c for the 2005 refined method
pub const MAX_FC_2005_KSI: f64 = 15.0;

/// ΔfpR1 at transfer, pre-2005 relaxation formula.
pub fn relaxation_at_transfer_2004(params: &LossParameters) -> f64 {
    relaxation_at_transfer_2004_for(params, params.fpj_ksi)
}

/// ΔfpR1 at transfer for strands jacked to `fpj_ksi`.
pub fn relaxation_at_transfer_2004_for(params: &LossParameters, fpj_ksi: f64) -> f64 {
    let hours = 24.0 * params.transfer_age_days;
    let ratio = fpj_ksi / params.steel.fpy_ksi();
    if hours <= 1.0 || ratio <= 0.55 {
        return 0.0;
    }
    let k = if params.steel.is_low_relaxation() { 40.0 } else { 10.0 };
    hours.log10() / k * (ratio - 0.55) * fpj_ksi
}

/// Relaxation in the bed between jacking and transfer, intrinsic relaxation model.
pub fn relaxation_before_transfer(params: &LossParameters) -> f64 {
    params
        .steel
        .relaxation_loss(params.fpj_ksi, 0.0, params.transfer_age_days)
}

/// Stage losses with the elastic effect of temporary strands folded in.
///
/// Post-tensioning before lifting shows at transfer, later post-tensioning at
/// shipping. Removal happens before the deck is placed.
fn with_temporary(mut stages: StageLosses, temporary: Option<&TemporaryStrandEffects>) -> StageLosses {
    let Some(t) = temporary else {
        return stages;
    };
    stages.after_transfer_ksi += t.shortening_after_transfer_ksi();
    stages.at_shipping_ksi += t.pt_shortening_ksi;
    stages.after_deck_placement_ksi += t.net_after_removal_ksi();
    stages.final_ksi += t.net_after_removal_ksi();
    stages
}

/// Elastic shortening of the permanent strands plus the concrete stress at
/// their centroid, with pretensioned temporary strands released alongside.
///
/// Returns (ΔfpES, fcgp, ΔfpES of the temporary strands).
fn transfer_with_temporary(params: &LossParameters, fpbt_ksi: f64, fpbt_temporary_ksi: f64) -> (f64, f64, f64) {
    let (es, es_temporary) = params.elastic_shortening_pair(fpbt_ksi, fpbt_temporary_ksi);
    let temporary_force = params
        .pretensioned_temporary()
        .map_or(0.0, |t| t.aps_in2 * (fpbt_temporary_ksi - es_temporary));
    let fcgp = params.fcgp_ksi(fpbt_ksi - es) + params.temporary_force_effect_ksi(temporary_force);
    (es, fcgp, es_temporary)
}

// ============================================================================
// Before 2005
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinedBefore2005Losses {
    pub agency: Agency,
    pub fpj_ksi: f64,
    pub fpy_ksi: f64,
    /// ΔfpR1
    pub relaxation_at_transfer_ksi: f64,
    /// ΔfpES
    pub elastic_shortening_ksi: f64,
    pub fcgp_ksi: f64,
    pub delta_fcdp_ksi: f64,
    /// ΔfpSR
    pub shrinkage_ksi: f64,
    /// ΔfpCR
    pub creep_ksi: f64,
    /// ΔfpR2
    pub relaxation_after_transfer_ksi: f64,
    pub time_dependent_at_shipping_ksi: f64,
    #[serde(default)]
    pub temporary: Option<TemporaryStrandEffects>,
}

impl RefinedBefore2005Losses {
    pub fn compute(params: &LossParameters, agency: Agency, shipping: ShippingLoss) -> LossResult<Self> {
        params.check_jacking_stress()?;
        if agency != Agency::Wsdot {
            params.check_concrete_strength(MAX_FC_BEFORE_2005_KSI)?;
        }

        let r1 = relaxation_at_transfer_2004(params);
        let fpbt = params.fpj_ksi - r1;
        let fpj_temporary = params.temporary.map_or(0.0, |t| t.fpj_ksi);
        let r1_temporary = relaxation_at_transfer_2004_for(params, fpj_temporary);
        let (es, fcgp, es_temporary) = transfer_with_temporary(params, fpbt, fpj_temporary - r1_temporary);
        let delta_fcdp = params.delta_fcdp_ksi();

        let sr = 17.0 - 0.150 * params.humidity;
        let cr = (12.0 * fcgp - 7.0 * delta_fcdp).max(0.0);
        let mut r2 = (20.0 - 0.4 * es - 0.2 * (sr + cr)).max(0.0);
        if params.steel.is_low_relaxation() {
            r2 *= 0.3;
        }
        let shipping_loss = shipping.at_shipping(sr + cr + r2);

        Ok(RefinedBefore2005Losses {
            agency,
            fpj_ksi: params.fpj_ksi,
            fpy_ksi: params.steel.fpy_ksi(),
            relaxation_at_transfer_ksi: r1,
            elastic_shortening_ksi: es,
            fcgp_ksi: fcgp,
            delta_fcdp_ksi: delta_fcdp,
            shrinkage_ksi: sr,
            creep_ksi: cr,
            relaxation_after_transfer_ksi: r2,
            time_dependent_at_shipping_ksi: shipping_loss,
            temporary: TemporaryStrandEffects::compute(params, r1_temporary, es_temporary, shipping_loss),
        })
    }

    /// Time-dependent loss after transfer
    pub fn time_dependent_ksi(&self) -> f64 {
        self.shrinkage_ksi + self.creep_ksi + self.relaxation_after_transfer_ksi
    }

    /// Elastic shortening including the net effect of temporary strands
    pub fn elastic_ksi(&self) -> f64 {
        self.elastic_shortening_ksi + self.temporary.as_ref().map_or(0.0, |t| t.net_after_removal_ksi())
    }

    pub fn components(&self) -> LossComponents {
        LossComponents {
            elastic_ksi: self.elastic_ksi(),
            creep_ksi: self.creep_ksi,
            shrinkage_ksi: self.shrinkage_ksi,
            relaxation_ksi: self.relaxation_at_transfer_ksi + self.relaxation_after_transfer_ksi,
            unitemized_ksi: 0.0,
        }
    }

    pub fn stages(&self) -> StageLosses {
        let after_transfer = self.relaxation_at_transfer_ksi + self.elastic_shortening_ksi;
        let total = after_transfer + self.time_dependent_ksi();
        let stages = StageLosses {
            before_transfer_ksi: self.relaxation_at_transfer_ksi,
            after_transfer_ksi: after_transfer,
            at_shipping_ksi: after_transfer + self.time_dependent_at_shipping_ksi,
            after_deck_placement_ksi: total,
            final_ksi: total,
        };
        with_temporary(stages, self.temporary.as_ref())
    }
}

// ============================================================================
// 2005 and later
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refined2005Losses {
    pub agency: Agency,
    pub fpj_ksi: f64,
    /// ΔfpR0, relaxation in the bed before transfer
    pub relaxation_before_transfer_ksi: f64,
    pub elastic_shortening_ksi: f64,
    /// Stress immediately after transfer
    pub fpt_ksi: f64,
    pub fcgp_ksi: f64,
    pub kid: f64,
    pub kdf: f64,
    /// ψb(td, ti)
    pub creep_girder_deck_ti: f64,
    /// ψb(tf, ti)
    pub creep_girder_final_ti: f64,
    /// ψb(tf, td)
    pub creep_girder_final_td: f64,
    /// ψd(tf, td)
    pub creep_deck_final_td: f64,
    /// εbid, girder shrinkage between transfer and deck placement
    pub shrinkage_strain_id: f64,
    /// εbdf, girder shrinkage after deck placement
    pub shrinkage_strain_df: f64,
    /// εddf, deck shrinkage
    pub deck_shrinkage_strain: f64,
    pub shrinkage_id_ksi: f64,
    pub creep_id_ksi: f64,
    pub relaxation_id_ksi: f64,
    /// Change in concrete stress at the strands from deck placement and
    /// superimposed loads plus losses to deck placement (compression positive)
    pub delta_fcd_ksi: f64,
    pub shrinkage_df_ksi: f64,
    pub creep_df_ksi: f64,
    pub relaxation_df_ksi: f64,
    /// Concrete stress at the strands from deck shrinkage
    pub delta_fcdf_ksi: f64,
    /// ΔfpSS, gain from deck shrinkage
    pub deck_shrinkage_gain_ksi: f64,
    pub hauling_age_days: f64,
    /// ψb(th, ti)
    pub creep_girder_hauling_ti: f64,
    /// εbih, girder shrinkage between transfer and hauling
    pub shrinkage_strain_ih: f64,
    /// ΔfpSRH
    pub shrinkage_hauling_ksi: f64,
    /// ΔfpCRH
    pub creep_hauling_ksi: f64,
    /// ΔfpR1H
    pub relaxation_hauling_ksi: f64,
    #[serde(default)]
    pub temporary: Option<TemporaryStrandEffects>,
}

/// Transformed section factor K = 1/[1 + (Ep/Eci)(Aps/A)(1 + A e²/I)(1 + 0.7 ψ)].
fn transformed_factor(params: &LossParameters, area: f64, inertia: f64, e: f64, psi: f64) -> f64 {
    let n = params.ep_ksi() / params.eci_ksi();
    1.0 / (1.0 + n * params.aps_in2 / area * (1.0 + area * e * e / inertia) * (1.0 + 0.7 * psi))
}

impl Refined2005Losses {
    pub fn compute(params: &LossParameters, agency: Agency) -> LossResult<Self> {
        params.check_jacking_stress()?;
        if agency != Agency::Wsdot {
            params.check_concrete_strength(MAX_FC_2005_KSI)?;
        }

        let girder = &params.girder_concrete;
        let h = params.humidity;
        let (ti, th, td, tf) = (
            params.transfer_age_days,
            params.hauling_age_days,
            params.deck_age_days,
            params.final_age_days,
        );
        let ep = params.ep_ksi();
        let eci = params.eci_ksi();
        let e = params.eccentricity_in();

        let r0 = relaxation_before_transfer(params);
        let fpbt = params.fpj_ksi - r0;
        let fpj_temporary = params.temporary.map_or(0.0, |t| t.fpj_ksi);
        let r0_temporary = params.steel.relaxation_loss(fpj_temporary, 0.0, ti);
        let (es, fcgp, es_temporary) = transfer_with_temporary(params, fpbt, fpj_temporary - r0_temporary);
        let fpt = fpbt - es;

        let psi_th_ti = girder.creep_coefficient(th, ti, h);
        let psi_td_ti = girder.creep_coefficient(td, ti, h);
        let psi_tf_ti = girder.creep_coefficient(tf, ti, h);
        let psi_tf_td = girder.creep_coefficient(tf, td, h);

        // Transfer to deck placement
        let g = params.girder;
        let kid = transformed_factor(params, g.area_in2, g.inertia_in4, e, psi_tf_ti);
        let eps_bid = -girder.shrinkage_strain(td - ti, h);
        let eps_bif = -girder.shrinkage_strain(tf - ti, h);
        let sr = eps_bid * ep * kid;
        let cr = ep / eci * fcgp * psi_td_ti * kid;
        let kl = if params.steel.is_low_relaxation() { 30.0 } else { 7.0 };
        let r1 = (fpt / kl * (fpt / params.steel.fpy_ksi() - 0.55)).max(0.0);

        // Transfer to hauling
        let eps_bih = -girder.shrinkage_strain(th - ti, h);
        let srh = eps_bih * ep * kid;
        let crh = ep / eci * fcgp * psi_th_ti * kid;
        let r1h = if th >= td {
            r1
        } else {
            let to_deck = params.steel.relaxation_loss(fpt, ti, td);
            if to_deck > 0.0 {
                r1 * (params.steel.relaxation_loss(fpt, ti, th) / to_deck).clamp(0.0, 1.0)
            } else {
                0.0
            }
        };
        let losses_ih = srh + crh + r1h;

        // Deck placement to final
        let c = params.composite.unwrap_or(g);
        let epc = params.composite_eccentricity_in();
        let kdf = transformed_factor(params, c.area_in2, c.inertia_in4, epc, psi_tf_ti);
        let eps_bdf = eps_bif - eps_bid;
        let sd = eps_bdf * ep * kdf;

        let losses_id = sr + cr + r1;
        let delta_fcd = -params.delta_fcdp_ksi() - losses_id * params.aps_in2 * (1.0 / g.area_in2 + e * e / g.inertia_in4);
        let ec = params.ec_ksi();
        let cd = ep / eci * fcgp * (psi_tf_ti - psi_td_ti) * kdf + ep / ec * delta_fcd * psi_tf_td * kdf;
        let r2 = r1;

        let (psi_d, eps_ddf, fcdf, ss) = match (&params.deck_concrete, params.deck, params.deck_eccentricity_in()) {
            (Some(deck), Some(slab), Some(ed)) => {
                let deck_age = tf - td;
                let psi_d = deck.creep_coefficient(deck_age, 1.0, h);
                let eps_ddf = -deck.shrinkage_strain(deck_age, h);
                let fcdf = eps_ddf * slab.area_in2 * deck.ec_ksi() / (1.0 + 0.7 * psi_d)
                    * (1.0 / c.area_in2 - epc * ed / c.inertia_in4);
                let ss = ep / ec * fcdf * kdf * (1.0 + 0.7 * psi_tf_td);
                (psi_d, eps_ddf, fcdf, ss)
            }
            _ => (0.0, 0.0, 0.0, 0.0),
        };

        let losses_df = sd + cd + r2 - ss;
        Ok(Refined2005Losses {
            agency,
            fpj_ksi: params.fpj_ksi,
            relaxation_before_transfer_ksi: r0,
            elastic_shortening_ksi: es,
            fpt_ksi: fpt,
            fcgp_ksi: fcgp,
            kid,
            kdf,
            creep_girder_deck_ti: psi_td_ti,
            creep_girder_final_ti: psi_tf_ti,
            creep_girder_final_td: psi_tf_td,
            creep_deck_final_td: psi_d,
            shrinkage_strain_id: eps_bid,
            shrinkage_strain_df: eps_bdf,
            deck_shrinkage_strain: eps_ddf,
            shrinkage_id_ksi: sr,
            creep_id_ksi: cr,
            relaxation_id_ksi: r1,
            delta_fcd_ksi: delta_fcd,
            shrinkage_df_ksi: sd,
            creep_df_ksi: cd,
            relaxation_df_ksi: r2,
            delta_fcdf_ksi: fcdf,
            deck_shrinkage_gain_ksi: ss,
            hauling_age_days: th,
            creep_girder_hauling_ti: psi_th_ti,
            shrinkage_strain_ih: eps_bih,
            shrinkage_hauling_ksi: srh,
            creep_hauling_ksi: crh,
            relaxation_hauling_ksi: r1h,
            temporary: TemporaryStrandEffects::compute(params, r0_temporary, es_temporary, losses_ih),
        })
    }

    pub fn losses_to_deck_ksi(&self) -> f64 {
        self.shrinkage_id_ksi + self.creep_id_ksi + self.relaxation_id_ksi
    }

    /// Time-dependent loss between transfer and hauling
    pub fn losses_to_hauling_ksi(&self) -> f64 {
        self.shrinkage_hauling_ksi + self.creep_hauling_ksi + self.relaxation_hauling_ksi
    }

    pub fn losses_after_deck_ksi(&self) -> f64 {
        self.shrinkage_df_ksi + self.creep_df_ksi + self.relaxation_df_ksi - self.deck_shrinkage_gain_ksi
    }

    /// ΔfpLT
    pub fn time_dependent_ksi(&self) -> f64 {
        self.losses_to_deck_ksi() + self.losses_after_deck_ksi()
    }

    /// Elastic shortening including the net effect of temporary strands
    pub fn elastic_ksi(&self) -> f64 {
        self.elastic_shortening_ksi + self.temporary.as_ref().map_or(0.0, |t| t.net_after_removal_ksi())
    }

    pub fn components(&self) -> LossComponents {
        LossComponents {
            elastic_ksi: self.elastic_ksi(),
            creep_ksi: self.creep_id_ksi + self.creep_df_ksi,
            shrinkage_ksi: self.shrinkage_id_ksi + self.shrinkage_df_ksi - self.deck_shrinkage_gain_ksi,
            relaxation_ksi: self.relaxation_before_transfer_ksi + self.relaxation_id_ksi + self.relaxation_df_ksi,
            unitemized_ksi: 0.0,
        }
    }

    pub fn stages(&self) -> StageLosses {
        let after_transfer = self.relaxation_before_transfer_ksi + self.elastic_shortening_ksi;
        let after_deck = after_transfer + self.losses_to_deck_ksi();
        let stages = StageLosses {
            before_transfer_ksi: self.relaxation_before_transfer_ksi,
            after_transfer_ksi: after_transfer,
            at_shipping_ksi: after_transfer + self.losses_to_hauling_ksi(),
            after_deck_placement_ksi: after_deck,
            final_ksi: after_deck + self.losses_after_deck_ksi(),
        };
        with_temporary(stages, self.temporary.as_ref())
    }
}
