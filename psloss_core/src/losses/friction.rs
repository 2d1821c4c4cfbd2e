//! # Tendon Friction
//!
//! Post-friction stress profiles measured from a jacking end.
//!
//! # Formula (AASHTO LRFD Eq. 5.9.5.2.2b-1)
//!
//! ΔfpF = fpj (1 − e^−(Kx + μα))
//!
//! - `K` = wobble coefficient (per inch)
//! - `x` = length of tendon from the jacking end
//! - `μ` = curvature friction coefficient
//! - `α` = total angular change of the tendon path from the jacking end (radians)

use serde::{Deserialize, Serialize};

use crate::errors::LossResult;
use crate::model::keys::EndType;
use crate::model::tendon::DuctData;

/// Minimum number of intervals used to sample a friction profile
pub const DEFAULT_PROFILE_SAMPLES: usize = 200;

/// Stress at a distance from the jacking end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressPoint {
    pub distance_in: f64,
    pub stress_ksi: f64,
}

/// Piecewise-linear stress along a tendon, distances increasing from the jacking end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StressProfile {
    pub points: Vec<StressPoint>,
}

impl StressProfile {
    pub fn length(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.distance_in)
    }

    /// Linear interpolation, clamped to the ends.
    pub fn stress_at(&self, distance_in: f64) -> f64 {
        let Some(first) = self.points.first() else {
            return 0.0;
        };
        if distance_in <= first.distance_in {
            return first.stress_ksi;
        }
        for w in self.points.windows(2) {
            if distance_in <= w[1].distance_in {
                let span = w[1].distance_in - w[0].distance_in;
                if span <= 0.0 {
                    return w[1].stress_ksi;
                }
                let t = (distance_in - w[0].distance_in) / span;
                return w[0].stress_ksi + t * (w[1].stress_ksi - w[0].stress_ksi);
            }
        }
        self.points[self.points.len() - 1].stress_ksi
    }

    /// Exact integral of the piecewise-linear stress over [0, `upto_in`].
    pub fn integral(&self, upto_in: f64) -> f64 {
        let mut area = 0.0;
        for w in self.points.windows(2) {
            let (a, b) = (w[0].distance_in, w[1].distance_in);
            if a >= upto_in {
                break;
            }
            let end = b.min(upto_in);
            let f_end = if end < b { self.stress_at(end) } else { w[1].stress_ksi };
            area += 0.5 * (w[0].stress_ksi + f_end) * (end - a);
        }
        area
    }

    /// Mean stress over the profile.
    pub fn average(&self) -> f64 {
        let length = self.length();
        if length > 0.0 {
            self.integral(length) / length
        } else {
            self.points.first().map_or(0.0, |p| p.stress_ksi)
        }
    }
}

/// ΔfpF = fpj (1 − e^−(Kx + μα))
#[inline]
pub fn friction_loss(fpj_ksi: f64, wobble_per_in: f64, x_in: f64, friction_coefficient: f64, alpha_rad: f64) -> f64 {
    fpj_ksi * (1.0 - (-(wobble_per_in * x_in + friction_coefficient * alpha_rad)).exp())
}

/// Member station at `distance` from the jacking end.
pub fn station_from_end(duct: &DuctData, end: EndType, distance_in: f64) -> f64 {
    match end {
        EndType::Start => duct.profile.start_x() + distance_in,
        EndType::End => duct.profile.end_x() - distance_in,
    }
}

/// Distance of member station `x_in` from the jacking end.
pub fn distance_from_end(duct: &DuctData, end: EndType, x_in: f64) -> f64 {
    match end {
        EndType::Start => x_in - duct.profile.start_x(),
        EndType::End => duct.profile.end_x() - x_in,
    }
}

/// Angular change and friction loss at member station `x_in` for a duct jacked at `end`.
pub fn friction_at(duct: &DuctData, end: EndType, x_in: f64) -> (f64, f64) {
    let jack_x = station_from_end(duct, end, 0.0);
    let alpha = duct.profile.angular_change(jack_x, x_in);
    let distance = distance_from_end(duct, end, x_in).max(0.0);
    let f = &duct.friction;
    let loss = friction_loss(duct.fpj_ksi(), f.wobble_per_in, distance, f.friction_coefficient, alpha);
    (alpha, loss)
}

/// Post-friction stress from the jacking `end` out to `reach_in`.
///
/// Sampled at every profile vertex plus at least `samples` uniform stations.
pub fn friction_profile(duct: &DuctData, end: EndType, reach_in: f64, samples: usize) -> LossResult<StressProfile> {
    let n = samples.max(1);
    let mut distances: Vec<f64> = (0..=n).map(|i| reach_in * i as f64 / n as f64).collect();
    distances.extend(
        duct.profile
            .points()
            .iter()
            .map(|p| distance_from_end(duct, end, p.x_in))
            .filter(|d| *d > 0.0 && *d < reach_in),
    );
    distances.sort_by(f64::total_cmp);
    distances.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

    let fpj = duct.fpj_ksi();
    let points = distances
        .into_iter()
        .map(|d| {
            let (_, loss) = friction_at(duct, end, station_from_end(duct, end, d));
            StressPoint {
                distance_in: d,
                stress_ksi: fpj - loss,
            }
        })
        .collect();
    Ok(StressProfile { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::keys::EventId;
    use crate::model::profile::Profile;
    use crate::model::tendon::{FrictionParameters, JackingEnd};
    use approx::assert_relative_eq;

    fn straight_duct(wobble: f64) -> DuctData {
        DuctData::new(Profile::straight(0.0, 1200.0, 50.0), 12, 0.217, JackingEnd::Left, EventId(0))
            .with_friction(FrictionParameters::new(wobble, 0.25, 0.25))
    }

    #[test]
    fn test_straight_zero_wobble_has_no_friction() {
        let duct = straight_duct(0.0);
        let profile = friction_profile(&duct, EndType::Start, 1200.0, 50).unwrap();
        for p in &profile.points {
            assert_relative_eq!(p.stress_ksi, duct.fpj_ksi(), epsilon = 1e-12);
        }
        let (alpha, loss) = friction_at(&duct, EndType::Start, 600.0);
        assert_eq!(alpha, 0.0);
        assert_eq!(loss, 0.0);
    }

    #[test]
    fn test_wobble_only() {
        let duct = straight_duct(1.0e-4);
        let (_, loss) = friction_at(&duct, EndType::Start, 1000.0);
        assert_relative_eq!(loss, duct.fpj_ksi() * (1.0 - (-0.1f64).exp()), epsilon = 1e-9);
        // Measured from the right end the far point is now the left end
        let (_, from_right) = friction_at(&duct, EndType::End, 200.0);
        assert_relative_eq!(from_right, loss, epsilon = 1e-9);
    }

    #[test]
    fn test_profile_decreases_from_jack() {
        let duct = DuctData::new(Profile::parabolic(0.0, 2400.0, 30.0, 60.0, 24), 19, 0.217, JackingEnd::Left, EventId(0));
        let profile = friction_profile(&duct, EndType::Start, 2400.0, 100).unwrap();
        assert!(profile.points.windows(2).all(|w| w[1].stress_ksi <= w[0].stress_ksi));
        assert_relative_eq!(profile.points[0].stress_ksi, duct.fpj_ksi());
        assert_relative_eq!(profile.length(), 2400.0);
    }

    #[test]
    fn test_profile_integral() {
        let profile = StressProfile {
            points: vec![
                StressPoint { distance_in: 0.0, stress_ksi: 200.0 },
                StressPoint { distance_in: 100.0, stress_ksi: 190.0 },
                StressPoint { distance_in: 200.0, stress_ksi: 190.0 },
            ],
        };
        assert_relative_eq!(profile.integral(100.0), 19_500.0);
        assert_relative_eq!(profile.integral(50.0), 0.5 * (200.0 + 195.0) * 50.0);
        assert_relative_eq!(profile.integral(200.0), 19_500.0 + 19_000.0);
        assert_relative_eq!(profile.average(), 38_500.0 / 200.0);
        assert_relative_eq!(profile.stress_at(150.0), 190.0);
    }
}
