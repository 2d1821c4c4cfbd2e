//! # Anchor Set
//!
//! Wedge seating at a jacking end pulls the tendon back by the seating
//! displacement `Dset`. Friction resists the reverse movement, so the loss is
//! confined to a set length `Xset` measured from the anchorage.
//!
//! ## Method
//!
//! With `f(x)` the post-friction stress at distance `x` from the jack, the
//! post-seating stress is mirrored about `f(Xset)`:
//!
//! ```text
//!   ΔfpA(x) = 2 (f(x) − f(Xset))          x < Xset
//!   Δ(Xset) = (1/Ep) ∫₀^Xset ΔfpA(x) dx   seating displacement implied by Xset
//! ```
//!
//! `Δ` grows monotonically with `Xset`, so the set length is found by
//! bracketing the target displacement and bisecting. The bracket state is a
//! plain value passed through [`bound`] and [`bisect_step`].
//!
//! If the target cannot be reached within the available length (a tendon with
//! little or no friction) the remaining displacement is taken up by a uniform
//! loss `(Dset − Δ(L))·Ep/L` over the whole reach.

use serde::{Deserialize, Serialize};

use super::friction::{distance_from_end, friction_at, friction_profile, StressProfile};
use super::options::TimeStepOptions;
use crate::errors::LossResult;
use crate::model::keys::{EndType, TendonKey};
use crate::model::tendon::DuctData;

// ============================================================================
// Root finding
// ============================================================================

/// Interval of set lengths whose implied displacements enclose the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub xset_min_in: f64,
    pub dset_min_in: f64,
    pub xset_max_in: f64,
    pub dset_max_in: f64,
}

impl Bracket {
    pub fn width(&self) -> f64 {
        self.xset_max_in - self.xset_min_in
    }

    /// Bracket end whose displacement is closest to `target_in`.
    pub fn best(&self, target_in: f64) -> (f64, f64) {
        if (self.dset_min_in - target_in).abs() <= (self.dset_max_in - target_in).abs() {
            (self.xset_min_in, self.dset_min_in)
        } else {
            (self.xset_max_in, self.dset_max_in)
        }
    }
}

/// Result of the bounding step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Bracketed(Bracket),
    /// Even the full reach gives less than the target displacement
    Unreachable { limit_in: f64, dset_in: f64 },
}

/// Seating displacement implied by a set length.
pub fn evaluate(profile: &StressProfile, xset_in: f64, ep_ksi: f64) -> f64 {
    if xset_in <= 0.0 {
        return 0.0;
    }
    let f_set = profile.stress_at(xset_in);
    2.0 * (profile.integral(xset_in) - f_set * xset_in) / ep_ksi
}

/// Establish a bracket on `[0, limit]` around the target displacement.
///
/// The first trial assumes a linear friction gradient, `Xset = √(Dset·Ep/p)`,
/// and the upper end doubles until it passes the target or hits the limit.
/// At most `max_iterations` doublings are tried before the full reach is used.
pub fn bound(profile: &StressProfile, target_in: f64, ep_ksi: f64, limit_in: f64, max_iterations: usize) -> Bound {
    let gradient = (profile.stress_at(0.0) - profile.stress_at(limit_in)) / limit_in;
    let first = if gradient > 0.0 {
        (target_in * ep_ksi / gradient).sqrt().min(limit_in)
    } else {
        limit_in
    };
    let mut x = if first > 0.0 { first } else { limit_in };
    let (mut x_lo, mut d_lo) = (0.0, 0.0);
    for _ in 0..max_iterations.max(1) {
        let d = evaluate(profile, x, ep_ksi);
        if d >= target_in {
            return Bound::Bracketed(Bracket {
                xset_min_in: x_lo,
                dset_min_in: d_lo,
                xset_max_in: x,
                dset_max_in: d,
            });
        }
        if x >= limit_in {
            return Bound::Unreachable { limit_in, dset_in: d };
        }
        x_lo = x;
        d_lo = d;
        x = (2.0 * x).min(limit_in);
    }

    let d = evaluate(profile, limit_in, ep_ksi);
    if d >= target_in {
        Bound::Bracketed(Bracket {
            xset_min_in: x_lo,
            dset_min_in: d_lo,
            xset_max_in: limit_in,
            dset_max_in: d,
        })
    } else {
        Bound::Unreachable { limit_in, dset_in: d }
    }
}

/// Halve the bracket, keeping the half that still encloses the target.
pub fn bisect_step(bracket: Bracket, profile: &StressProfile, target_in: f64, ep_ksi: f64) -> Bracket {
    let mid = 0.5 * (bracket.xset_min_in + bracket.xset_max_in);
    let d = evaluate(profile, mid, ep_ksi);
    if d < target_in {
        Bracket {
            xset_min_in: mid,
            dset_min_in: d,
            ..bracket
        }
    } else {
        Bracket {
            xset_max_in: mid,
            dset_max_in: d,
            ..bracket
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorSetSolution {
    pub xset_in: f64,
    /// Displacement reproduced by the solution, including any uniform shift
    pub achieved_seating_in: f64,
    /// Uniform loss over the reach when the target was unreachable
    pub uniform_loss_ksi: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl AnchorSetSolution {
    fn none() -> Self {
        AnchorSetSolution {
            xset_in: 0.0,
            achieved_seating_in: 0.0,
            uniform_loss_ksi: 0.0,
            iterations: 0,
            converged: true,
        }
    }

    /// ΔfpA at `distance_in` from the jacking end.
    pub fn loss_at(&self, profile: &StressProfile, distance_in: f64) -> f64 {
        if self.xset_in <= 0.0 || distance_in > self.xset_in {
            return 0.0;
        }
        2.0 * (profile.stress_at(distance_in) - profile.stress_at(self.xset_in)) + self.uniform_loss_ksi
    }

    /// ∫₀^Xset ΔfpA dx
    pub fn loss_integral(&self, profile: &StressProfile) -> f64 {
        if self.xset_in <= 0.0 {
            return 0.0;
        }
        2.0 * (profile.integral(self.xset_in) - profile.stress_at(self.xset_in) * self.xset_in)
            + self.uniform_loss_ksi * self.xset_in
    }
}

/// Find the set length for `seating_in` within `limit_in` of the jack.
///
/// Never fails: an unconverged solve returns the closest bracket end with
/// `converged == false`.
pub fn solve(
    profile: &StressProfile,
    seating_in: f64,
    ep_ksi: f64,
    limit_in: f64,
    options: &TimeStepOptions,
) -> AnchorSetSolution {
    if seating_in <= options.tolerance_in || limit_in <= 0.0 {
        return AnchorSetSolution::none();
    }
    let mut bracket = match bound(profile, seating_in, ep_ksi, limit_in, options.max_iterations) {
        Bound::Unreachable { limit_in, dset_in } => {
            return AnchorSetSolution {
                xset_in: limit_in,
                achieved_seating_in: seating_in,
                uniform_loss_ksi: (seating_in - dset_in) * ep_ksi / limit_in,
                iterations: 0,
                converged: true,
            };
        }
        Bound::Bracketed(bracket) => bracket,
    };

    let close_enough = |b: &Bracket| {
        let (_, d) = b.best(seating_in);
        (d - seating_in).abs() <= options.tolerance_in
    };
    let mut iterations = 0;
    while !close_enough(&bracket) && iterations < options.max_iterations {
        bracket = bisect_step(bracket, profile, seating_in, ep_ksi);
        iterations += 1;
    }
    let (xset_in, achieved_seating_in) = bracket.best(seating_in);
    AnchorSetSolution {
        xset_in,
        achieved_seating_in,
        uniform_loss_ksi: 0.0,
        iterations,
        converged: close_enough(&bracket),
    }
}

// ============================================================================
// Tendon results
// ============================================================================

/// Friction and anchor set at one jacking end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorSetEnd {
    pub end: EndType,
    /// Length over which this end governs
    pub reach_in: f64,
    pub seating_in: f64,
    pub solution: AnchorSetSolution,
    /// ΔfpA at the anchorage
    pub anchorage_loss_ksi: f64,
    /// Post-friction stress from this end
    pub friction_profile: StressProfile,
}

impl AnchorSetEnd {
    pub fn xset_in(&self) -> f64 {
        self.solution.xset_in
    }
}

/// Friction, anchor set and elongation of one tendon, computed when it is stressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorSetDetails {
    pub tendon: TendonKey,
    pub length_in: f64,
    pub fpj_ksi: f64,
    pub ends: Vec<AnchorSetEnd>,
    pub average_friction_loss_ksi: f64,
    pub average_anchor_set_loss_ksi: f64,
}

impl AnchorSetDetails {
    pub fn compute(tendon: TendonKey, duct: &DuctData, options: &TimeStepOptions) -> LossResult<Self> {
        let length = duct.profile.length();
        let mut jacked = Vec::new();
        if duct.jacking_end.jacks_left() {
            jacked.push(EndType::Start);
        }
        if duct.jacking_end.jacks_right() {
            jacked.push(EndType::End);
        }
        let reach = if jacked.len() > 1 { 0.5 * length } else { length };
        let ep = duct.steel.modulus_ksi;
        let fpj = duct.fpj_ksi();

        let mut ends = Vec::with_capacity(jacked.len());
        let mut friction_integral = 0.0;
        let mut anchor_integral = 0.0;
        for end in jacked {
            let profile = friction_profile(duct, end, reach, options.profile_samples)?;
            let solution = solve(&profile, duct.friction.seating_in, ep, reach, options);
            if !solution.converged {
                log::warn!(
                    "{} anchor set did not converge after {} iterations, using Xset = {:.3} in",
                    tendon,
                    solution.iterations,
                    solution.xset_in
                );
            }
            friction_integral += fpj * reach - profile.integral(reach);
            anchor_integral += solution.loss_integral(&profile);
            ends.push(AnchorSetEnd {
                end,
                reach_in: reach,
                seating_in: duct.friction.seating_in,
                anchorage_loss_ksi: solution.loss_at(&profile, 0.0),
                solution,
                friction_profile: profile,
            });
        }

        let (average_friction_loss_ksi, average_anchor_set_loss_ksi) = if length > 0.0 {
            (friction_integral / length, anchor_integral / length)
        } else {
            (0.0, 0.0)
        };
        log::debug!(
            "{}: fpj = {:.2} ksi, average friction {:.2} ksi, average anchor set {:.2} ksi",
            tendon,
            fpj,
            average_friction_loss_ksi,
            average_anchor_set_loss_ksi
        );
        Ok(AnchorSetDetails {
            tendon,
            length_in: length,
            fpj_ksi: fpj,
            ends,
            average_friction_loss_ksi,
            average_anchor_set_loss_ksi,
        })
    }

    pub fn end(&self, end: EndType) -> Option<&AnchorSetEnd> {
        self.ends.iter().find(|e| e.end == end)
    }

    /// Jacking end governing member station `x_in` (the nearer one when both are jacked).
    pub fn governing_end(&self, duct: &DuctData, x_in: f64) -> Option<&AnchorSetEnd> {
        self.ends.iter().min_by(|a, b| {
            distance_from_end(duct, a.end, x_in).total_cmp(&distance_from_end(duct, b.end, x_in))
        })
    }

    /// Angular change and ΔfpF at member station `x_in`.
    pub fn friction_at(&self, duct: &DuctData, x_in: f64) -> (f64, f64) {
        match self.governing_end(duct, x_in) {
            Some(end) => friction_at(duct, end.end, x_in),
            None => (0.0, 0.0),
        }
    }

    /// ΔfpA at member station `x_in`.
    pub fn anchor_set_loss_at(&self, duct: &DuctData, x_in: f64) -> f64 {
        match self.governing_end(duct, x_in) {
            Some(end) => {
                let distance = distance_from_end(duct, end.end, x_in);
                end.solution.loss_at(&end.friction_profile, distance)
            }
            None => 0.0,
        }
    }

    /// Elongation at `end` while jacking, (1/Ep) ∫ f dx over the reach of that end.
    pub fn elongation_in(&self, duct: &DuctData, end: EndType) -> f64 {
        self.end(end).map_or(0.0, |e| {
            e.friction_profile.integral(e.reach_in) / duct.steel.modulus_ksi
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::keys::EventId;
    use crate::model::profile::Profile;
    use crate::model::samples;
    use crate::model::tendon::{FrictionParameters, JackingEnd};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn draped_duct(end: JackingEnd, seating_in: f64) -> DuctData {
        DuctData::new(Profile::parabolic(0.0, 2424.0, 36.0, 66.0, 48), 19, 0.217, end, EventId(0))
            .with_friction(FrictionParameters::new(0.0002 / 12.0, 0.25, seating_in))
    }

    #[test]
    fn test_evaluate_is_monotonic() {
        let duct = draped_duct(JackingEnd::Left, 0.25);
        let profile = friction_profile(&duct, EndType::Start, 2424.0, 200).unwrap();
        let ep = duct.steel.modulus_ksi;
        let mut last = 0.0;
        for i in 1..=24 {
            let d = evaluate(&profile, 100.0 * i as f64, ep);
            assert!(d >= last);
            last = d;
        }
        assert_eq!(evaluate(&profile, 0.0, ep), 0.0);
    }

    #[test]
    fn test_bound_brackets_target() {
        let duct = draped_duct(JackingEnd::Left, 0.25);
        let profile = friction_profile(&duct, EndType::Start, 2424.0, 200).unwrap();
        match bound(&profile, 0.25, duct.steel.modulus_ksi, 2424.0, 50) {
            Bound::Bracketed(b) => {
                assert!(b.dset_min_in <= 0.25 && 0.25 <= b.dset_max_in);
                assert!(b.xset_min_in < b.xset_max_in);
                let narrowed = bisect_step(b, &profile, 0.25, duct.steel.modulus_ksi);
                assert_relative_eq!(narrowed.width(), 0.5 * b.width());
                assert!(narrowed.dset_min_in <= 0.25 && 0.25 <= narrowed.dset_max_in);
            }
            Bound::Unreachable { .. } => panic!("expected a bracket"),
        }
    }

    #[test]
    fn test_solution_reproduces_seating() {
        let options = TimeStepOptions::default();
        for seating in [0.125, 0.25, 0.375, 0.5] {
            let duct = draped_duct(JackingEnd::Left, seating);
            let profile = friction_profile(&duct, EndType::Start, 2424.0, 200).unwrap();
            let ep = duct.steel.modulus_ksi;
            let solution = solve(&profile, seating, ep, 2424.0, &options);
            assert!(solution.converged);
            assert!(solution.xset_in > 0.0 && solution.xset_in < 2424.0);
            assert_abs_diff_eq!(evaluate(&profile, solution.xset_in, ep), seating, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_zero_seating_has_no_anchor_set() {
        let duct = draped_duct(JackingEnd::Left, 0.0);
        let details = AnchorSetDetails::compute(TendonKey::Girder { duct: 0 }, &duct, &TimeStepOptions::default()).unwrap();
        let end = details.end(EndType::Start).unwrap();
        assert_eq!(end.xset_in(), 0.0);
        assert_eq!(details.average_anchor_set_loss_ksi, 0.0);
        for i in 0..=24 {
            assert_eq!(details.anchor_set_loss_at(&duct, 101.0 * i as f64), 0.0);
        }
        // post-seating profile equals post-friction profile
        assert_eq!(end.anchorage_loss_ksi, 0.0);
    }

    #[test]
    fn test_frictionless_tendon_takes_uniform_loss() {
        let duct = DuctData::new(Profile::straight(0.0, 1200.0, 50.0), 12, 0.217, JackingEnd::Left, EventId(0))
            .with_friction(FrictionParameters::new(0.0, 0.25, 0.25));
        let details = AnchorSetDetails::compute(TendonKey::Girder { duct: 0 }, &duct, &TimeStepOptions::default()).unwrap();
        assert_abs_diff_eq!(details.average_friction_loss_ksi, 0.0, epsilon = 1e-9);
        let end = details.end(EndType::Start).unwrap();
        assert_eq!(end.xset_in(), 1200.0);
        let uniform = 0.25 * duct.steel.modulus_ksi / 1200.0;
        assert_relative_eq!(end.solution.uniform_loss_ksi, uniform, max_relative = 1e-9);
        assert_relative_eq!(details.anchor_set_loss_at(&duct, 600.0), uniform, max_relative = 1e-9);
        assert_relative_eq!(details.average_anchor_set_loss_ksi, uniform, max_relative = 1e-9);
    }

    #[test]
    fn test_iteration_budget_returns_best_estimate() {
        let duct = draped_duct(JackingEnd::Left, 0.25);
        let profile = friction_profile(&duct, EndType::Start, 2424.0, 200).unwrap();
        let options = TimeStepOptions::default().with_tolerance(1e-12).with_max_iterations(2);
        let solution = solve(&profile, 0.25, duct.steel.modulus_ksi, 2424.0, &options);
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 2);
        assert!(solution.xset_in > 0.0 && solution.xset_in <= 2424.0);
    }

    #[test]
    fn test_both_ends_limited_to_half_length() {
        let duct = draped_duct(JackingEnd::Both, 1.0);
        let details = AnchorSetDetails::compute(TendonKey::Girder { duct: 0 }, &duct, &TimeStepOptions::default()).unwrap();
        assert_eq!(details.ends.len(), 2);
        for end in &details.ends {
            assert!(end.xset_in() <= 0.5 * 2424.0 + 1e-9);
        }
        // symmetric profile, symmetric results
        assert_relative_eq!(
            details.anchor_set_loss_at(&duct, 100.0),
            details.anchor_set_loss_at(&duct, 2324.0),
            max_relative = 1e-6
        );
        assert_relative_eq!(
            details.elongation_in(&duct, EndType::Start),
            details.elongation_in(&duct, EndType::End),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_spliced_girder_ducts_lose_most_near_stressed_end() {
        let model = samples::spliced_two_duct_girder().unwrap();
        let options = TimeStepOptions::default();
        let mid = 1212.0;
        for (d, duct) in model.girders[0].ducts.iter().enumerate() {
            let details = AnchorSetDetails::compute(TendonKey::Girder { duct: d }, duct, &options).unwrap();
            let end = &details.ends[0];
            assert!(end.xset_in() > 0.0 && end.xset_in().is_finite());
            let near = match end.end {
                EndType::Start => 50.0,
                EndType::End => 2424.0 - 50.0,
            };
            assert!(details.anchor_set_loss_at(duct, near) > details.anchor_set_loss_at(duct, mid));
            assert!(details.elongation_in(duct, end.end) > 0.0);
        }
    }

    #[test]
    fn test_bound_terminates_when_first_trial_is_zero() {
        let duct = draped_duct(JackingEnd::Left, 0.25);
        let profile = friction_profile(&duct, EndType::Start, 2424.0, 200).unwrap();
        // zero modulus collapses the first trial to Xset = 0
        match bound(&profile, 0.25, 0.0, 2424.0, 50) {
            Bound::Bracketed(b) => assert_eq!(b.xset_max_in, 2424.0),
            Bound::Unreachable { limit_in, .. } => assert_eq!(limit_in, 2424.0),
        }
    }

    #[test]
    fn test_bound_doubling_is_capped() {
        let duct = draped_duct(JackingEnd::Left, 0.25);
        let profile = friction_profile(&duct, EndType::Start, 2424.0, 200).unwrap();
        // a single trial falls back to the full reach
        match bound(&profile, 1e-9, duct.steel.modulus_ksi, 2424.0, 1) {
            Bound::Bracketed(b) => assert!(b.dset_max_in >= 1e-9),
            Bound::Unreachable { .. } => panic!("full reach exceeds the target"),
        }
    }

    #[test]
    fn test_zero_modulus_duct_is_rejected() {
        let mut duct = draped_duct(JackingEnd::Left, 0.25);
        duct.steel.modulus_ksi = 0.0;
        assert!(matches!(duct.validate("G1"), Err(crate::errors::LossError::MalformedDuct { .. })));
    }
}
