//! # Pretensioning Strands
//!
//! Strands are grouped by type within a segment. Each group carries a depth
//! profile in segment coordinates, so harped strands are described the same
//! way as straight ones.
//!
//! A [`GirderConfig`] is a trial design configuration: strand counts, jacking
//! forces and concrete strengths that replace the committed values of one
//! segment while a design algorithm searches for a solution.

use serde::{Deserialize, Serialize};

use crate::errors::{LossError, LossResult};
use crate::model::keys::SegmentKey;
use crate::model::materials::PrestressingSteel;
use crate::model::profile::Profile;
use crate::model::tendon::FrictionParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrandType {
    Straight,
    Harped,
    /// Strands removed after the girder is erected
    Temporary,
}

impl StrandType {
    pub fn is_permanent(self) -> bool {
        !matches!(self, StrandType::Temporary)
    }

    pub fn label(self) -> &'static str {
        match self {
            StrandType::Straight => "Straight",
            StrandType::Harped => "Harped",
            StrandType::Temporary => "Temporary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrandGroup {
    pub strand_type: StrandType,
    pub strand_count: u32,
    pub strand_area_in2: f64,
    /// Jacking force; 0.75 fpu·Aps when absent
    #[serde(default)]
    pub jacking_force_kip: Option<f64>,
    pub profile: Profile,
}

impl StrandGroup {
    pub fn area_in2(&self) -> f64 {
        self.strand_count as f64 * self.strand_area_in2
    }

    pub fn is_empty(&self) -> bool {
        self.strand_count == 0 || self.strand_area_in2 <= 0.0
    }

    /// AASHTO LRFD Table 5.9.3-1, low-relaxation strand immediately prior to transfer
    pub fn default_jacking_force(&self, steel: &PrestressingSteel) -> f64 {
        0.75 * steel.fpu_ksi() * self.area_in2()
    }

    pub fn jacking_force(&self, steel: &PrestressingSteel) -> f64 {
        self.jacking_force_kip
            .unwrap_or_else(|| self.default_jacking_force(steel))
    }

    pub fn fpj_ksi(&self, steel: &PrestressingSteel) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.jacking_force(steel) / self.area_in2()
        }
    }
}

/// How temporary strands are installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TemporaryStrandUsage {
    /// Stressed in the bed with the permanent strands
    #[default]
    Pretensioned,
    /// Post-tensioned after release, before the segment is lifted from the bed
    PostTensionedBeforeLifting,
    /// Post-tensioned after the segment is lifted from the bed
    PostTensionedAfterLifting,
    /// Post-tensioned immediately before shipping
    PostTensionedBeforeShipping,
}

impl TemporaryStrandUsage {
    pub fn is_post_tensioned(self) -> bool {
        !matches!(self, TemporaryStrandUsage::Pretensioned)
    }

    /// Post-tensioning acts on the permanent strands before the segment leaves the bed.
    pub fn stressed_in_bed(self) -> bool {
        matches!(
            self,
            TemporaryStrandUsage::Pretensioned | TemporaryStrandUsage::PostTensionedBeforeLifting
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            TemporaryStrandUsage::Pretensioned => "Pretensioned",
            TemporaryStrandUsage::PostTensionedBeforeLifting => "Post-tensioned before lifting",
            TemporaryStrandUsage::PostTensionedAfterLifting => "Post-tensioned after lifting",
            TemporaryStrandUsage::PostTensionedBeforeShipping => "Post-tensioned before shipping",
        }
    }
}

/// All pretensioning in one segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentStrands {
    #[serde(default)]
    pub steel: PrestressingSteel,
    #[serde(default)]
    pub groups: Vec<StrandGroup>,
    #[serde(default)]
    pub temporary_usage: TemporaryStrandUsage,
    /// Friction and seating of post-tensioned temporary strands, jacked at the start of the segment
    #[serde(default)]
    pub temporary_friction: FrictionParameters,
}

impl SegmentStrands {
    pub fn group(&self, strand_type: StrandType) -> Option<&StrandGroup> {
        self.groups.iter().find(|g| g.strand_type == strand_type)
    }

    pub fn active_groups(&self) -> impl Iterator<Item = &StrandGroup> {
        self.groups.iter().filter(|g| !g.is_empty())
    }

    pub fn permanent_area_in2(&self) -> f64 {
        self.groups
            .iter()
            .filter(|g| g.strand_type.is_permanent())
            .map(StrandGroup::area_in2)
            .sum()
    }

    pub fn permanent_jacking_force(&self) -> f64 {
        self.groups
            .iter()
            .filter(|g| g.strand_type.is_permanent() && !g.is_empty())
            .map(|g| g.jacking_force(&self.steel))
            .sum()
    }

    /// The temporary strand group when it holds any strands.
    pub fn temporary_group(&self) -> Option<&StrandGroup> {
        self.group(StrandType::Temporary).filter(|g| !g.is_empty())
    }

    /// Area-weighted depth of the permanent strands at segment station `x_in`.
    pub fn permanent_centroid_at(&self, x_in: f64) -> LossResult<Option<f64>> {
        let mut area = 0.0;
        let mut moment = 0.0;
        for g in self.groups.iter().filter(|g| g.strand_type.is_permanent() && !g.is_empty()) {
            area += g.area_in2();
            moment += g.area_in2() * g.profile.depth_at(x_in)?;
        }
        Ok(if area > 0.0 { Some(moment / area) } else { None })
    }

    pub fn validate(&self, label: &str) -> LossResult<()> {
        for g in &self.groups {
            g.profile.validate().map_err(|reason| {
                LossError::invalid_input(format!("{}.{}.profile", label, g.strand_type.label()), "", reason)
            })?;
            if g.strand_area_in2 < 0.0 {
                return Err(LossError::invalid_input(
                    format!("{}.{}.strand_area_in2", label, g.strand_type.label()),
                    g.strand_area_in2.to_string(),
                    "Strand area must not be negative",
                ));
            }
        }
        if self.temporary_usage.is_post_tensioned() {
            let f = &self.temporary_friction;
            let values = [f.wobble_per_in, f.friction_coefficient, f.seating_in];
            if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(LossError::invalid_input(
                    format!("{}.temporary_friction", label),
                    format!("{:?}", values),
                    "Friction and seating of temporary strands must be finite and not negative",
                ));
            }
        }
        Ok(())
    }
}

/// Strand count and jacking force of one strand type in a trial configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrandConfig {
    pub strand_type: StrandType,
    pub strand_count: u32,
    #[serde(default)]
    pub jacking_force_kip: Option<f64>,
}

/// Trial design configuration for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GirderConfig {
    pub segment: SegmentKey,
    pub strands: Vec<StrandConfig>,
    pub fci_ksi: f64,
    pub fc_ksi: f64,
}

impl GirderConfig {
    /// Apply this configuration's strand counts and jacking forces to committed strands.
    pub fn apply_to(&self, strands: &SegmentStrands) -> SegmentStrands {
        let mut result = strands.clone();
        for group in &mut result.groups {
            if let Some(cfg) = self.strands.iter().find(|c| c.strand_type == group.strand_type) {
                group.strand_count = cfg.strand_count;
                group.jacking_force_kip = cfg.jacking_force_kip;
            }
        }
        result
    }

    /// Stable text key identifying this configuration in design caches.
    pub fn fingerprint(&self) -> LossResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::keys::GirderKey;
    use approx::assert_relative_eq;

    fn strands() -> SegmentStrands {
        SegmentStrands {
            steel: PrestressingSteel::default(),
            groups: vec![
                StrandGroup {
                    strand_type: StrandType::Straight,
                    strand_count: 30,
                    strand_area_in2: 0.217,
                    jacking_force_kip: None,
                    profile: Profile::straight(0.0, 1200.0, 70.0),
                },
                StrandGroup {
                    strand_type: StrandType::Harped,
                    strand_count: 10,
                    strand_area_in2: 0.217,
                    jacking_force_kip: None,
                    profile: Profile::straight(0.0, 1200.0, 60.0),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_default_jacking_stress() {
        let s = strands();
        let straight = s.group(StrandType::Straight).unwrap();
        assert_relative_eq!(straight.fpj_ksi(&s.steel), 202.5, epsilon = 1e-9);
    }

    #[test]
    fn test_permanent_centroid() {
        let s = strands();
        let y = s.permanent_centroid_at(600.0).unwrap().unwrap();
        assert_relative_eq!(y, 67.5, epsilon = 1e-9);
    }

    #[test]
    fn test_temporary_usage() {
        let mut s = strands();
        assert!(s.temporary_group().is_none());
        assert_eq!(s.temporary_usage, TemporaryStrandUsage::Pretensioned);
        s.groups.push(StrandGroup {
            strand_type: StrandType::Temporary,
            strand_count: 4,
            strand_area_in2: 0.217,
            jacking_force_kip: None,
            profile: Profile::straight(0.0, 1200.0, 6.0),
        });
        assert_eq!(s.temporary_group().unwrap().strand_count, 4);
        assert_relative_eq!(s.permanent_area_in2(), 40.0 * 0.217, epsilon = 1e-12);
        assert!(TemporaryStrandUsage::PostTensionedBeforeLifting.stressed_in_bed());
        assert!(!TemporaryStrandUsage::PostTensionedAfterLifting.stressed_in_bed());

        s.temporary_usage = TemporaryStrandUsage::PostTensionedBeforeShipping;
        s.validate("segment").unwrap();
        s.temporary_friction.seating_in = f64::NAN;
        assert_eq!(s.validate("segment").unwrap_err().error_code(), "INVALID_INPUT");
        s.temporary_usage = TemporaryStrandUsage::Pretensioned;
        s.validate("segment").unwrap();
    }

    #[test]
    fn test_config_applies_counts() {
        let config = GirderConfig {
            segment: GirderKey::new(0, 0).segment(0),
            strands: vec![StrandConfig {
                strand_type: StrandType::Straight,
                strand_count: 20,
                jacking_force_kip: Some(800.0),
            }],
            fci_ksi: 5.5,
            fc_ksi: 7.0,
        };
        let trial = config.apply_to(&strands());
        let straight = trial.group(StrandType::Straight).unwrap();
        assert_eq!(straight.strand_count, 20);
        assert_eq!(straight.jacking_force_kip, Some(800.0));
        assert_eq!(trial.group(StrandType::Harped).unwrap().strand_count, 10);
        assert!(config.fingerprint().unwrap().contains("\"strand_count\":20"));
    }
}
