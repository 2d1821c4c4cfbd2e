//! # Post-Tensioning Ducts
//!
//! A duct holds one tendon. Girder ducts run along the whole spliced girder
//! and their stations are girder coordinates; segment ducts are confined to
//! one segment and use segment coordinates.
//!
//! ## Example
//!
//! ```rust
//! use psloss_core::model::tendon::{DuctData, FrictionParameters, JackingEnd};
//! use psloss_core::model::profile::Profile;
//! use psloss_core::model::keys::EventId;
//!
//! let duct = DuctData::new(
//!     Profile::parabolic(0.0, 1800.0, 36.0, 66.0, 36),
//!     19,
//!     0.217,
//!     JackingEnd::Left,
//!     EventId(3),
//! )
//! .with_friction(FrictionParameters::new(0.0002 / 12.0, 0.25, 0.25));
//!
//! assert!(duct.validate("duct 1").is_ok());
//! assert!((duct.fpj_ksi() - 0.9 * 243.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{LossError, LossResult};
use crate::model::keys::EventId;
use crate::model::materials::PrestressingSteel;
use crate::model::profile::Profile;

/// Which end(s) of the tendon are jacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JackingEnd {
    #[default]
    Left,
    Right,
    Both,
}

impl JackingEnd {
    pub fn jacks_left(self) -> bool {
        matches!(self, JackingEnd::Left | JackingEnd::Both)
    }

    pub fn jacks_right(self) -> bool {
        matches!(self, JackingEnd::Right | JackingEnd::Both)
    }
}

/// Friction and seating data for a tendon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrictionParameters {
    /// Wobble coefficient K (per inch)
    pub wobble_per_in: f64,
    /// Curvature friction coefficient μ
    pub friction_coefficient: f64,
    /// Anchor set (wedge seating) displacement
    pub seating_in: f64,
}

impl FrictionParameters {
    pub fn new(wobble_per_in: f64, friction_coefficient: f64, seating_in: f64) -> Self {
        FrictionParameters {
            wobble_per_in,
            friction_coefficient,
            seating_in,
        }
    }
}

impl Default for FrictionParameters {
    /// AASHTO LRFD Table 5.9.5.2.2b-1, rigid galvanized metal sheathing
    fn default() -> Self {
        FrictionParameters {
            wobble_per_in: 0.0002 / 12.0,
            friction_coefficient: 0.25,
            seating_in: 0.375,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuctData {
    pub profile: Profile,
    #[serde(default = "default_duct_diameter")]
    pub diameter_in: f64,
    pub strand_count: u32,
    pub strand_area_in2: f64,
    #[serde(default)]
    pub steel: PrestressingSteel,
    /// Jacking force; the maximum permitted force when absent
    #[serde(default)]
    pub jacking_force_kip: Option<f64>,
    #[serde(default)]
    pub jacking_end: JackingEnd,
    #[serde(default)]
    pub friction: FrictionParameters,
    pub stressing_event: EventId,
}

fn default_duct_diameter() -> f64 {
    4.0
}

impl DuctData {
    pub fn new(
        profile: Profile,
        strand_count: u32,
        strand_area_in2: f64,
        jacking_end: JackingEnd,
        stressing_event: EventId,
    ) -> Self {
        DuctData {
            profile,
            diameter_in: default_duct_diameter(),
            strand_count,
            strand_area_in2,
            steel: PrestressingSteel::default(),
            jacking_force_kip: None,
            jacking_end,
            friction: FrictionParameters::default(),
            stressing_event,
        }
    }

    pub fn with_friction(mut self, friction: FrictionParameters) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_jacking_force(mut self, pj_kip: f64) -> Self {
        self.jacking_force_kip = Some(pj_kip);
        self
    }

    pub fn area_in2(&self) -> f64 {
        self.strand_count as f64 * self.strand_area_in2
    }

    /// Ducts with no strands contribute nothing and are skipped.
    pub fn is_empty(&self) -> bool {
        self.strand_count == 0 || self.strand_area_in2 <= 0.0
    }

    /// AASHTO LRFD Table 5.9.3-1: prior to seating, fpj ≤ 0.90 fpy
    pub fn max_jacking_force_kip(&self) -> f64 {
        0.90 * self.steel.fpy_ksi() * self.area_in2()
    }

    pub fn jacking_force(&self) -> f64 {
        self.jacking_force_kip.unwrap_or_else(|| self.max_jacking_force_kip())
    }

    pub fn fpj_ksi(&self) -> f64 {
        let area = self.area_in2();
        if area > 0.0 {
            self.jacking_force() / area
        } else {
            0.0
        }
    }

    pub fn validate(&self, label: &str) -> LossResult<()> {
        self.profile
            .validate()
            .map_err(|reason| LossError::malformed_duct(label, reason))?;
        if self.diameter_in <= 0.0 {
            return Err(LossError::malformed_duct(label, "duct diameter must be positive"));
        }
        let duct_area = std::f64::consts::PI * self.diameter_in * self.diameter_in / 4.0;
        if self.area_in2() > duct_area {
            return Err(LossError::malformed_duct(
                label,
                format!("{:.2} in² of strand does not fit a {:.2} in duct", self.area_in2(), self.diameter_in),
            ));
        }
        if !(self.steel.modulus_ksi.is_finite() && self.steel.modulus_ksi > 0.0) {
            return Err(LossError::malformed_duct(label, "steel modulus must be positive"));
        }
        let f = &self.friction;
        if ![f.wobble_per_in, f.friction_coefficient, f.seating_in].iter().all(|v| v.is_finite()) {
            return Err(LossError::malformed_duct(label, "friction and seating parameters must be finite"));
        }
        if f.wobble_per_in < 0.0 || f.friction_coefficient < 0.0 || f.seating_in < 0.0 {
            return Err(LossError::malformed_duct(label, "friction and seating parameters must not be negative"));
        }
        if !self.is_empty() && self.fpj_ksi() > self.steel.fpu_ksi() {
            return Err(LossError::malformed_duct(
                label,
                format!("jacking stress {:.1} ksi exceeds fpu", self.fpj_ksi()),
            ));
        }
        Ok(())
    }
}
