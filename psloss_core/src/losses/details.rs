//! # Loss Records
//!
//! [`LossDetails`] is the uniform result of every loss method at one point of
//! interest. Steel losses are itemised per steel element; the method-specific
//! intermediate quantities ride along in [`MethodDetails`].
//!
//! Losses are positive when they reduce tension in the steel.

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use super::approximate::ApproximateLosses;
use super::lump_sum::LumpSumLosses;
use super::method::LossStrategy;
use super::refined::{Refined2005Losses, RefinedBefore2005Losses};
use super::time_step::TimeStepDetails;
use crate::equations::section::{SectionProperties, Stiffness};
use crate::model::keys::{IntervalIndex, PoiId, TendonKey};
use crate::model::strands::StrandType;

/// Itemised prestress loss (ksi).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LossComponents {
    /// Elastic shortening or gain from prestress transfer and applied loads
    pub elastic_ksi: f64,
    pub creep_ksi: f64,
    pub shrinkage_ksi: f64,
    pub relaxation_ksi: f64,
    /// Lump sum loss that is not broken down by cause
    #[serde(default)]
    pub unitemized_ksi: f64,
}

impl LossComponents {
    pub fn total(&self) -> f64 {
        self.elastic_ksi + self.time_dependent()
    }

    pub fn time_dependent(&self) -> f64 {
        self.creep_ksi + self.shrinkage_ksi + self.relaxation_ksi + self.unitemized_ksi
    }
}

impl Add for LossComponents {
    type Output = LossComponents;

    fn add(self, rhs: LossComponents) -> LossComponents {
        LossComponents {
            elastic_ksi: self.elastic_ksi + rhs.elastic_ksi,
            creep_ksi: self.creep_ksi + rhs.creep_ksi,
            shrinkage_ksi: self.shrinkage_ksi + rhs.shrinkage_ksi,
            relaxation_ksi: self.relaxation_ksi + rhs.relaxation_ksi,
            unitemized_ksi: self.unitemized_ksi + rhs.unitemized_ksi,
        }
    }
}

impl AddAssign for LossComponents {
    fn add_assign(&mut self, rhs: LossComponents) {
        *self = *self + rhs;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SteelElement {
    Strand(StrandType),
    /// All permanent strands lumped at their centroid
    PermanentStrands,
    Tendon(TendonKey),
}

impl fmt::Display for SteelElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SteelElement::Strand(t) => write!(f, "{} strands", t.label()),
            SteelElement::PermanentStrands => write!(f, "Permanent strands"),
            SteelElement::Tendon(key) => write!(f, "{}", key),
        }
    }
}

/// Loss history of one steel element at a point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteelLoss {
    pub element: SteelElement,
    pub area_in2: f64,
    /// Depth below the top of the girder
    pub depth_in: f64,
    pub fpj_ksi: f64,
    /// Tensioned (strands in the bed, tendons once jacked)
    pub stressed: bool,
    /// Bonded to the concrete and part of the transformed section
    pub bonded: bool,
    #[serde(default)]
    pub friction_loss_ksi: f64,
    #[serde(default)]
    pub anchor_set_loss_ksi: f64,
    /// Loss during this interval (or the whole history for estimate methods)
    pub incremental: LossComponents,
    pub cumulative: LossComponents,
    /// Effective stress after the losses
    pub fpe_ksi: f64,
}

impl SteelLoss {
    pub fn total_loss_ksi(&self) -> f64 {
        self.friction_loss_ksi + self.anchor_set_loss_ksi + self.cumulative.total()
    }

    pub fn force_kip(&self) -> f64 {
        self.fpe_ksi * self.area_in2
    }
}

/// Total loss of the permanent strands at the construction stages used by the
/// estimate methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageLosses {
    /// Relaxation in the bed before transfer
    pub before_transfer_ksi: f64,
    pub after_transfer_ksi: f64,
    pub at_shipping_ksi: f64,
    pub after_deck_placement_ksi: f64,
    pub final_ksi: f64,
}

/// Section properties used for the computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionSnapshot {
    pub girder: SectionProperties,
    #[serde(default)]
    pub composite: Option<SectionProperties>,
    /// Transformed section including bonded steel (time-step method)
    #[serde(default)]
    pub transformed: Option<Stiffness>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MethodDetails {
    TimeStep(TimeStepDetails),
    RefinedBefore2005(RefinedBefore2005Losses),
    Refined2005(Refined2005Losses),
    Approximate(ApproximateLosses),
    LumpSum(LumpSumLosses),
    /// No permanent strands at the point of interest
    NoPrestress,
}

/// Prestress losses at one point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossDetails {
    pub poi: PoiId,
    /// Interval the record describes (time-step method only)
    #[serde(default)]
    pub interval: Option<IntervalIndex>,
    pub strategy: LossStrategy,
    pub section: SectionSnapshot,
    pub steel: Vec<SteelLoss>,
    #[serde(default)]
    pub stages: Option<StageLosses>,
    pub details: MethodDetails,
}

impl LossDetails {
    pub fn steel_loss(&self, element: SteelElement) -> Option<&SteelLoss> {
        self.steel.iter().find(|s| s.element == element)
    }

    fn permanent_strands(&self) -> impl Iterator<Item = &SteelLoss> {
        self.steel.iter().filter(|s| match s.element {
            SteelElement::Strand(t) => t.is_permanent(),
            SteelElement::PermanentStrands => true,
            SteelElement::Tendon(_) => false,
        })
    }

    fn permanent_weighted(&self, value: impl Fn(&SteelLoss) -> f64) -> f64 {
        let (mut area, mut sum) = (0.0, 0.0);
        for s in self.permanent_strands().filter(|s| s.stressed) {
            area += s.area_in2;
            sum += s.area_in2 * value(s);
        }
        if area > 0.0 {
            sum / area
        } else {
            0.0
        }
    }

    /// Area-weighted effective stress of the permanent strands.
    pub fn permanent_strand_fpe_ksi(&self) -> f64 {
        self.permanent_weighted(|s| s.fpe_ksi)
    }

    /// Area-weighted total loss of the permanent strands.
    pub fn permanent_strand_loss_ksi(&self) -> f64 {
        self.permanent_weighted(SteelLoss::total_loss_ksi)
    }

    pub fn permanent_strand_elastic_loss_ksi(&self) -> f64 {
        self.permanent_weighted(|s| s.incremental.elastic_ksi)
    }

    pub fn time_step(&self) -> Option<&TimeStepDetails> {
        match &self.details {
            MethodDetails::TimeStep(ts) => Some(ts),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_components_add() {
        let a = LossComponents {
            elastic_ksi: 10.0,
            creep_ksi: 5.0,
            shrinkage_ksi: 3.0,
            relaxation_ksi: 1.0,
            unitemized_ksi: 0.0,
        };
        let mut b = a;
        b += a;
        assert_relative_eq!(b.total(), 38.0);
        assert_relative_eq!(b.time_dependent(), 18.0);
    }

    #[test]
    fn test_steel_element_labels() {
        assert_eq!(SteelElement::Strand(StrandType::Harped).to_string(), "Harped strands");
        assert_eq!(
            SteelElement::Tendon(TendonKey::Girder { duct: 0 }).to_string(),
            TendonKey::Girder { duct: 0 }.to_string()
        );
    }
}
