//! User-supplied lump sum losses at each construction stage.

use serde::{Deserialize, Serialize};

use super::details::{LossComponents, StageLosses};
use super::parameters::LossParameters;

/// Total loss at each stage (ksi). Used both as the input values of the
/// general lump sum method and as its result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LumpSumLosses {
    #[serde(default)]
    pub before_transfer_ksi: f64,
    #[serde(default)]
    pub after_transfer_ksi: f64,
    #[serde(default)]
    pub at_shipping_ksi: f64,
    #[serde(default)]
    pub after_deck_placement_ksi: f64,
    #[serde(default)]
    pub final_ksi: f64,
}

impl LumpSumLosses {
    /// Losses at a point of interest. Points without strands have no loss.
    pub fn compute(values: &LumpSumLosses, params: &LossParameters) -> LumpSumLosses {
        if params.has_strands() {
            *values
        } else {
            LumpSumLosses::default()
        }
    }

    pub fn components(&self) -> LossComponents {
        LossComponents {
            elastic_ksi: self.after_transfer_ksi - self.before_transfer_ksi,
            relaxation_ksi: self.before_transfer_ksi,
            unitemized_ksi: self.final_ksi - self.after_transfer_ksi,
            ..LossComponents::default()
        }
    }

    pub fn stages(&self) -> StageLosses {
        StageLosses {
            before_transfer_ksi: self.before_transfer_ksi,
            after_transfer_ksi: self.after_transfer_ksi,
            at_shipping_ksi: self.at_shipping_ksi,
            after_deck_placement_ksi: self.after_deck_placement_ksi,
            final_ksi: self.final_ksi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::samples;
    use approx::assert_relative_eq;

    fn values() -> LumpSumLosses {
        LumpSumLosses {
            before_transfer_ksi: 1.5,
            after_transfer_ksi: 18.0,
            at_shipping_ksi: 25.0,
            after_deck_placement_ksi: 32.0,
            final_ksi: 40.0,
        }
    }

    #[test]
    fn test_values_returned_where_strands_exist() {
        let model = samples::pretensioned_i_girder().unwrap();
        let poi = model.girders[0].pois[5].poi.clone();
        let params = LossParameters::gather(&model.inputs(), &poi).unwrap();
        let losses = LumpSumLosses::compute(&values(), &params);
        assert_eq!(losses, values());
        assert_relative_eq!(losses.components().total(), 40.0);
        assert_relative_eq!(losses.components().elastic_ksi, 16.5);
    }

    #[test]
    fn test_no_strands_no_loss() {
        let model = samples::pretensioned_i_girder().unwrap();
        let poi = model.girders[0].pois[5].poi.clone();
        let mut params = LossParameters::gather(&model.inputs(), &poi).unwrap();
        params.aps_in2 = 0.0;
        params.strand_count = 0;
        let losses = LumpSumLosses::compute(&values(), &params);
        assert_eq!(losses, LumpSumLosses::default());
        assert_eq!(losses.stages().final_ksi, 0.0);
    }
}
