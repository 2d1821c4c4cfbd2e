//! Solver options for the time-step method.

use serde::{Deserialize, Serialize};

use super::friction::DEFAULT_PROFILE_SAMPLES;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeStepOptions {
    /// Aging coefficient χ of the age-adjusted effective modulus E/(1 + χφ)
    pub aging_coefficient: f64,
    /// Anchor set convergence tolerance on seating displacement (in)
    pub tolerance_in: f64,
    /// Bisection iteration budget for the anchor set solver
    pub max_iterations: usize,
    /// Minimum number of stations sampled along each friction profile
    pub profile_samples: usize,
}

impl Default for TimeStepOptions {
    fn default() -> Self {
        Self {
            aging_coefficient: 0.7,
            tolerance_in: 1.0e-6,
            max_iterations: 100,
            profile_samples: DEFAULT_PROFILE_SAMPLES,
        }
    }
}

impl TimeStepOptions {
    /// Set anchor set convergence tolerance
    pub fn with_tolerance(mut self, tolerance_in: f64) -> Self {
        self.tolerance_in = tolerance_in;
        self
    }

    /// Set anchor set iteration budget
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_aging_coefficient(mut self, chi: f64) -> Self {
        self.aging_coefficient = chi;
        self
    }

    pub fn with_profile_samples(mut self, samples: usize) -> Self {
        self.profile_samples = samples;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let options = TimeStepOptions::default().with_tolerance(1e-4).with_max_iterations(5);
        assert_eq!(options.tolerance_in, 1e-4);
        assert_eq!(options.max_iterations, 5);
        assert_eq!(options.aging_coefficient, 0.7);
    }
}
