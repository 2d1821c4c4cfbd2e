//! # Material Models
//!
//! Time-dependent concrete (strength and modulus gain, creep, shrinkage) and
//! prestressing steel (grade, relaxation).
//!
//! Concrete creep and shrinkage follow AASHTO LRFD 5.4.2.3.2 and 5.4.2.3.3
//! (2005 interims and later). Strength gain follows ACI 209R-92.
//!
//! ## Sign Conventions
//!
//! - Strain: positive is elongation, so shrinkage strains are negative
//! - Stress: positive is tension

use serde::{Deserialize, Serialize};

use crate::errors::{LossError, LossResult};

/// Minimum concrete age used in age-dependent functions (days)
const MIN_AGE_DAYS: f64 = 0.25;

/// Default modulus of prestressing steel (ksi)
pub const EPS_KSI: f64 = 28_500.0;

// ============================================================================
// Concrete
// ============================================================================

/// How the concrete was cured before release/form removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CuringMethod {
    #[default]
    Normal,
    /// Steam or radiant heat curing
    Accelerated,
}

/// Concrete properties of a girder segment, closure joint or deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteMaterial {
    /// 28-day compressive strength
    pub fc_ksi: f64,
    /// Compressive strength at release or first loading
    pub fci_ksi: f64,
    /// Unit weight used for the modulus of elasticity
    #[serde(default = "default_unit_weight")]
    pub unit_weight_kcf: f64,
    /// Aggregate correction factor K1
    #[serde(default = "default_k1")]
    pub k1: f64,
    pub volume_to_surface_in: f64,
    #[serde(default)]
    pub curing: CuringMethod,
    /// One day of accelerated curing is taken as this many days of normal curing
    #[serde(default = "default_time_adjustment")]
    pub accelerated_time_factor: f64,
}

fn default_unit_weight() -> f64 {
    0.150
}

fn default_k1() -> f64 {
    1.0
}

fn default_time_adjustment() -> f64 {
    7.0
}

impl ConcreteMaterial {
    pub fn new(fci_ksi: f64, fc_ksi: f64, volume_to_surface_in: f64) -> Self {
        ConcreteMaterial {
            fc_ksi,
            fci_ksi,
            unit_weight_kcf: default_unit_weight(),
            k1: default_k1(),
            volume_to_surface_in,
            curing: CuringMethod::Normal,
            accelerated_time_factor: default_time_adjustment(),
        }
    }

    pub fn with_curing(mut self, curing: CuringMethod) -> Self {
        self.curing = curing;
        self
    }

    pub fn validate(&self, field: &str) -> LossResult<()> {
        if self.fc_ksi <= 0.0 {
            return Err(LossError::invalid_input(
                format!("{}.fc_ksi", field),
                self.fc_ksi.to_string(),
                "Concrete strength must be positive",
            ));
        }
        if self.fci_ksi <= 0.0 || self.fci_ksi > self.fc_ksi {
            return Err(LossError::invalid_input(
                format!("{}.fci_ksi", field),
                self.fci_ksi.to_string(),
                "Initial strength must be positive and not exceed f'c",
            ));
        }
        if self.volume_to_surface_in <= 0.0 {
            return Err(LossError::invalid_input(
                format!("{}.volume_to_surface_in", field),
                self.volume_to_surface_in.to_string(),
                "Volume to surface ratio must be positive",
            ));
        }
        Ok(())
    }

    /// AASHTO LRFD Eq. 5.4.2.4-1: Ec = 33,000 K1 wc^1.5 √f'c
    pub fn modulus_for_strength(&self, fc_ksi: f64) -> f64 {
        33_000.0 * self.k1 * self.unit_weight_kcf.powf(1.5) * fc_ksi.max(0.0).sqrt()
    }

    pub fn eci_ksi(&self) -> f64 {
        self.modulus_for_strength(self.fci_ksi)
    }

    pub fn ec_ksi(&self) -> f64 {
        self.modulus_for_strength(self.fc_ksi)
    }

    /// Compressive strength at `age_days` after casting (ACI 209R-92 Eq. 2-1)
    pub fn strength_at(&self, age_days: f64) -> f64 {
        let (a, beta) = match self.curing {
            CuringMethod::Normal => (4.0, 0.85),
            CuringMethod::Accelerated => (1.0, 0.95),
        };
        let t = age_days.max(MIN_AGE_DAYS);
        (t / (a + beta * t)) * self.fc_ksi
    }

    pub fn modulus_at(&self, age_days: f64) -> f64 {
        self.modulus_for_strength(self.strength_at(age_days))
    }

    /// Age at loading, with accelerated curing credited per the time factor
    fn adjusted_loading_age(&self, age_days: f64) -> f64 {
        let t = age_days.max(MIN_AGE_DAYS);
        match self.curing {
            CuringMethod::Normal => t,
            CuringMethod::Accelerated => t + (self.accelerated_time_factor - 1.0) * t.min(1.0),
        }
    }

    fn ks(&self) -> f64 {
        (1.45 - 0.13 * self.volume_to_surface_in).max(1.0)
    }

    fn kf(&self) -> f64 {
        5.0 / (1.0 + self.fci_ksi)
    }

    fn ktd(&self, t_days: f64) -> f64 {
        if t_days <= 0.0 {
            return 0.0;
        }
        t_days / (61.0 - 4.0 * self.fci_ksi + t_days)
    }

    /// Creep coefficient ψ(t, ti) for a load applied at concrete age
    /// `loading_age_days` and sustained until age `age_days`.
    ///
    /// AASHTO LRFD Eq. 5.4.2.3.2-1: ψ = 1.9 ks khc kf ktd ti^-0.118
    pub fn creep_coefficient(&self, age_days: f64, loading_age_days: f64, humidity: f64) -> f64 {
        let duration = age_days - loading_age_days;
        if duration <= 0.0 {
            return 0.0;
        }
        let khc = 1.56 - 0.008 * humidity;
        let ti = self.adjusted_loading_age(loading_age_days);
        1.9 * self.ks() * khc * self.kf() * self.ktd(duration) * ti.powf(-0.118)
    }

    /// Free shrinkage strain accumulated from casting to `age_days` (negative).
    ///
    /// AASHTO LRFD Eq. 5.4.2.3.3-1: εsh = ks khs kf ktd 0.48×10⁻³
    pub fn shrinkage_strain(&self, age_days: f64, humidity: f64) -> f64 {
        let khs = 2.00 - 0.014 * humidity;
        -self.ks() * khs * self.kf() * self.ktd(age_days) * 0.48e-3
    }
}

// ============================================================================
// Prestressing steel
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrandGrade {
    Grade250,
    #[default]
    Grade270,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RelaxationType {
    #[default]
    LowRelaxation,
    StressRelieved,
}

/// Strand or tendon steel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrestressingSteel {
    #[serde(default)]
    pub grade: StrandGrade,
    #[serde(default)]
    pub relaxation: RelaxationType,
    #[serde(default = "default_eps")]
    pub modulus_ksi: f64,
}

fn default_eps() -> f64 {
    EPS_KSI
}

impl Default for PrestressingSteel {
    fn default() -> Self {
        PrestressingSteel {
            grade: StrandGrade::Grade270,
            relaxation: RelaxationType::LowRelaxation,
            modulus_ksi: EPS_KSI,
        }
    }
}

impl PrestressingSteel {
    pub fn fpu_ksi(&self) -> f64 {
        match self.grade {
            StrandGrade::Grade250 => 250.0,
            StrandGrade::Grade270 => 270.0,
        }
    }

    /// AASHTO LRFD Table 5.4.4.1-1
    pub fn fpy_ksi(&self) -> f64 {
        match self.relaxation {
            RelaxationType::LowRelaxation => 0.90 * self.fpu_ksi(),
            RelaxationType::StressRelieved => 0.85 * self.fpu_ksi(),
        }
    }

    pub fn is_low_relaxation(&self) -> bool {
        self.relaxation == RelaxationType::LowRelaxation
    }

    /// Intrinsic relaxation between `t_start_days` and `t_end_days`
    /// (measured from stressing) for a steel element held at `fpe_ksi`.
    ///
    /// fr = fpe/K'L · log(t_end/t_start) · (fpe/fpy − 0.55), K'L = 45 or 10
    pub fn relaxation_loss(&self, fpe_ksi: f64, t_start_days: f64, t_end_days: f64) -> f64 {
        let ratio = fpe_ksi / self.fpy_ksi();
        if ratio <= 0.55 || t_end_days <= t_start_days {
            return 0.0;
        }
        let kl = if self.is_low_relaxation() { 45.0 } else { 10.0 };
        let one_hour = 1.0 / 24.0;
        let t1 = t_start_days.max(one_hour);
        let t2 = t_end_days.max(one_hour);
        (fpe_ksi / kl) * (t2 / t1).log10() * (ratio - 0.55)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn girder_concrete() -> ConcreteMaterial {
        ConcreteMaterial::new(6.0, 8.0, 3.0)
    }

    #[test]
    fn test_modulus() {
        let concrete = girder_concrete();
        // 33000 × 0.15^1.5 × √8 = 5422 ksi
        assert_relative_eq!(concrete.ec_ksi(), 5422.0, max_relative = 1e-3);
        assert!(concrete.eci_ksi() < concrete.ec_ksi());
    }

    #[test]
    fn test_strength_gain() {
        let concrete = girder_concrete();
        let f28 = concrete.strength_at(28.0);
        assert_relative_eq!(f28, 8.0, max_relative = 0.01);
        assert!(concrete.strength_at(3.0) < f28);
        assert!(concrete.strength_at(365.0) > f28);
    }

    #[test]
    fn test_creep_grows_with_duration() {
        let concrete = girder_concrete();
        let short = concrete.creep_coefficient(30.0, 1.0, 75.0);
        let long = concrete.creep_coefficient(2000.0, 1.0, 75.0);
        assert!(short > 0.0);
        assert!(long > short);
        assert_eq!(concrete.creep_coefficient(1.0, 1.0, 75.0), 0.0);
    }

    #[test]
    fn test_creep_lower_for_older_loading() {
        let concrete = girder_concrete();
        let young = concrete.creep_coefficient(1000.0, 1.0, 75.0);
        let old = concrete.creep_coefficient(1090.0, 91.0, 75.0);
        assert!(old < young);
    }

    #[test]
    fn test_shrinkage_is_negative_and_monotonic() {
        let concrete = girder_concrete();
        let early = concrete.shrinkage_strain(10.0, 75.0);
        let late = concrete.shrinkage_strain(1000.0, 75.0);
        assert!(early < 0.0);
        assert!(late < early);
        assert_eq!(concrete.shrinkage_strain(0.0, 75.0), 0.0);
    }

    #[test]
    fn test_steel_properties() {
        let steel = PrestressingSteel::default();
        assert_relative_eq!(steel.fpu_ksi(), 270.0);
        assert_relative_eq!(steel.fpy_ksi(), 243.0);
    }

    #[test]
    fn test_relaxation() {
        let steel = PrestressingSteel::default();
        let fr = steel.relaxation_loss(202.5, 1.0 / 24.0, 1.0);
        // 202.5/45 × log(24) × (202.5/243 − 0.55) = 1.75 ksi
        assert_relative_eq!(fr, 1.75, max_relative = 0.01);
        assert_eq!(steel.relaxation_loss(120.0, 1.0, 100.0), 0.0);
        assert_eq!(steel.relaxation_loss(202.5, 5.0, 5.0), 0.0);
    }
}
