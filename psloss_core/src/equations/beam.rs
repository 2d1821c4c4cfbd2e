//! # Simply-Supported Beam Formulas
//!
//! Product-load moments for a simply supported girder segment. Used to build
//! applied-load tables for the in-memory bridge model and the sample girders;
//! real projects supply moments from their own structural analysis.
//!
//! ## Sign Conventions
//!
//! - Loads: positive downward
//! - Moment: positive causes tension on bottom (sagging)
//!
//! ## References
//!
//! - Roark's Formulas for Stress and Strain, 8th Edition, Table 8.1

/// Moment at position x for uniform load w over the full span
///
/// ```text
///    ↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓ w
///    ═════════════════
///    △                △
///       ←─────L─────→
/// ```
///
/// # Formula (Roark's Table 8.1, Case 2a)
/// M(x) = wx(L−x)/2, zero outside the span
#[inline]
pub fn uniform_load_moment(w: f64, l: f64, x: f64) -> f64 {
    if x <= 0.0 || x >= l {
        return 0.0;
    }
    w * x * (l - x) / 2.0
}

/// Moment at position x for point load P at distance a from the left support
///
/// # Formula (Roark's Table 8.1, Case 1a)
/// - x ≤ a: M = P(L−a)x/L
/// - x > a: M = Pa(L−x)/L
#[inline]
pub fn point_load_moment(p: f64, a: f64, l: f64, x: f64) -> f64 {
    if x <= 0.0 || x >= l || a <= 0.0 || a >= l {
        return 0.0;
    }
    if x <= a {
        p * (l - a) * x / l
    } else {
        p * a * (l - x) / l
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_midspan() {
        // wL²/8
        assert_relative_eq!(uniform_load_moment(0.1, 1200.0, 600.0), 0.1 * 1200.0 * 1200.0 / 8.0);
        assert_eq!(uniform_load_moment(0.1, 1200.0, 0.0), 0.0);
    }

    #[test]
    fn test_point_load_symmetry() {
        let left = point_load_moment(10.0, 400.0, 1200.0, 300.0);
        let right = point_load_moment(10.0, 800.0, 1200.0, 900.0);
        assert_relative_eq!(left, right, epsilon = 1e-9);
        // PL/4 at midspan for a centered load
        assert_relative_eq!(point_load_moment(10.0, 600.0, 1200.0, 600.0), 3000.0);
    }
}
