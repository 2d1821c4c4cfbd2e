//! Piecewise-linear vertical profiles for strands and ducts.

use serde::{Deserialize, Serialize};

use crate::errors::{LossError, LossResult};

/// Station and depth of a profile vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    /// Distance along the member
    pub x_in: f64,
    /// Depth below the top of the girder
    pub depth_in: f64,
}

impl ProfilePoint {
    pub fn new(x_in: f64, depth_in: f64) -> Self {
        ProfilePoint { x_in, depth_in }
    }
}

/// Polyline profile with strictly increasing stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile {
    points: Vec<ProfilePoint>,
}

impl Profile {
    pub fn new(points: Vec<ProfilePoint>) -> Self {
        Profile { points }
    }

    /// Constant-depth profile from `x_start` to `x_end`.
    pub fn straight(x_start: f64, x_end: f64, depth_in: f64) -> Self {
        Profile::new(vec![ProfilePoint::new(x_start, depth_in), ProfilePoint::new(x_end, depth_in)])
    }

    /// Symmetric parabolic drape discretized into `segments` chords.
    ///
    /// depth(x) = low + (end − low)·(2(x − xm)/L)²
    pub fn parabolic(x_start: f64, x_end: f64, end_depth_in: f64, low_depth_in: f64, segments: usize) -> Self {
        let n = segments.max(2);
        let length = x_end - x_start;
        let middle = 0.5 * (x_start + x_end);
        let points = (0..=n)
            .map(|i| {
                let x = x_start + length * i as f64 / n as f64;
                let r = 2.0 * (x - middle) / length;
                ProfilePoint::new(x, low_depth_in + (end_depth_in - low_depth_in) * r * r)
            })
            .collect();
        Profile::new(points)
    }

    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.points.len() < 2 {
            return Err("profile needs at least two points".to_string());
        }
        if self.points.iter().any(|p| !p.x_in.is_finite() || !p.depth_in.is_finite()) {
            return Err("profile has a non-finite coordinate".to_string());
        }
        if self.points.windows(2).any(|w| w[1].x_in <= w[0].x_in) {
            return Err("profile stations must be strictly increasing".to_string());
        }
        Ok(())
    }

    pub fn start_x(&self) -> f64 {
        self.points.first().map_or(0.0, |p| p.x_in)
    }

    pub fn end_x(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.x_in)
    }

    /// Horizontal projected length
    pub fn length(&self) -> f64 {
        self.end_x() - self.start_x()
    }

    pub fn contains(&self, x_in: f64) -> bool {
        x_in >= self.start_x() - 1e-9 && x_in <= self.end_x() + 1e-9
    }

    /// Depth at station `x_in`, clamped to the end points.
    pub fn depth_at(&self, x_in: f64) -> LossResult<f64> {
        let first = self.points.first().ok_or_else(|| LossError::missing_field("profile.points"))?;
        if x_in <= first.x_in {
            return Ok(first.depth_in);
        }
        for w in self.points.windows(2) {
            if x_in <= w[1].x_in {
                let t = (x_in - w[0].x_in) / (w[1].x_in - w[0].x_in);
                return Ok(w[0].depth_in + t * (w[1].depth_in - w[0].depth_in));
            }
        }
        Ok(self.points[self.points.len() - 1].depth_in)
    }

    /// Chord angles (radians) of each profile segment
    fn chord_angles(&self) -> Vec<f64> {
        self.points
            .windows(2)
            .map(|w| ((w[1].depth_in - w[0].depth_in) / (w[1].x_in - w[0].x_in)).atan())
            .collect()
    }

    /// Total angular change (radians) of the path between two stations.
    ///
    /// Kinks at interior vertices lying in (min, max] of the two stations are summed.
    pub fn angular_change(&self, x_from: f64, x_to: f64) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let (lo, hi) = if x_from <= x_to { (x_from, x_to) } else { (x_to, x_from) };
        let angles = self.chord_angles();
        let interior = &self.points[1..self.points.len() - 1];
        interior
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                if x_from <= x_to {
                    p.x_in > lo && p.x_in <= hi
                } else {
                    p.x_in >= lo && p.x_in < hi
                }
            })
            .map(|(k, _)| (angles[k + 1] - angles[k]).abs())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_depth_interpolation() {
        let profile = Profile::new(vec![
            ProfilePoint::new(0.0, 10.0),
            ProfilePoint::new(100.0, 30.0),
            ProfilePoint::new(200.0, 10.0),
        ]);
        assert_relative_eq!(profile.depth_at(50.0).unwrap(), 20.0);
        assert_relative_eq!(profile.depth_at(-5.0).unwrap(), 10.0);
        assert_relative_eq!(profile.depth_at(250.0).unwrap(), 10.0);
    }

    #[test]
    fn test_straight_profile_has_no_angle_change() {
        let profile = Profile::new(vec![
            ProfilePoint::new(0.0, 60.0),
            ProfilePoint::new(500.0, 60.0),
            ProfilePoint::new(1000.0, 60.0),
        ]);
        assert_eq!(profile.angular_change(0.0, 1000.0), 0.0);
    }

    #[test]
    fn test_harped_angle_change() {
        let profile = Profile::new(vec![
            ProfilePoint::new(0.0, 0.0),
            ProfilePoint::new(100.0, 10.0),
            ProfilePoint::new(200.0, 0.0),
        ]);
        let theta = (0.1f64).atan();
        assert_relative_eq!(profile.angular_change(0.0, 200.0), 2.0 * theta, epsilon = 1e-12);
        assert_relative_eq!(profile.angular_change(200.0, 0.0), 2.0 * theta, epsilon = 1e-12);
        assert_eq!(profile.angular_change(0.0, 50.0), 0.0);
    }

    #[test]
    fn test_parabolic_total_angle() {
        let profile = Profile::parabolic(0.0, 1200.0, 20.0, 60.0, 48);
        assert_eq!(profile.points().len(), 49);
        assert_relative_eq!(profile.depth_at(600.0).unwrap(), 60.0);
        // Sum of chord kinks approaches 2·atan(slope at end) = 2·atan(4·40/1200)
        let exact = 2.0 * (4.0f64 * 40.0 / 1200.0).atan();
        assert_relative_eq!(profile.angular_change(0.0, 1200.0), exact, max_relative = 0.05);
    }

    #[test]
    fn test_validation() {
        assert!(Profile::new(vec![ProfilePoint::new(0.0, 1.0)]).validate().is_err());
        assert!(Profile::new(vec![ProfilePoint::new(5.0, 1.0), ProfilePoint::new(5.0, 2.0)])
            .validate()
            .is_err());
        assert!(Profile::straight(0.0, 10.0, 1.0).validate().is_ok());
    }
}
