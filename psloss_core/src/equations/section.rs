//! # Cross-Section Property Formulas
//!
//! Composite and transformed section properties built from parts.
//!
//! ## Coordinates
//!
//! Vertical positions `y` are measured downward from the top of the girder.
//! Deck parts therefore have negative `y`.
//!
//! ```text
//!   ═══════════════════   deck      y < 0
//!   ───────┬───────────   top of girder, y = 0
//!          │
//!          │  girder    ● centroid  y = yc
//!          │
//!        ──┴──            bottom,    y = h
//! ```
//!
//! ## References
//!
//! - Roark's Formulas for Stress and Strain, 8th Edition, Chapter 3
//! - PCI Bridge Design Manual, Section 8.2 (transformed sections)

use serde::{Deserialize, Serialize};

/// Area, inertia and centroid of a section or section part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    pub area_in2: f64,
    /// Moment of inertia about the part's own centroid
    pub inertia_in4: f64,
    /// Depth of the centroid below the top of the girder
    pub centroid_in: f64,
    /// Depth of the top fiber below the top of the girder
    pub y_top_in: f64,
    /// Depth of the bottom fiber below the top of the girder
    pub y_bottom_in: f64,
}

impl SectionProperties {
    /// Girder part with its top fiber at the top of the girder.
    pub fn girder(area_in2: f64, inertia_in4: f64, yt_in: f64, height_in: f64) -> Self {
        SectionProperties {
            area_in2,
            inertia_in4,
            centroid_in: yt_in,
            y_top_in: 0.0,
            y_bottom_in: height_in,
        }
    }

    /// Rectangular slab of `width_in` × `thickness_in` sitting `haunch_in` above the girder.
    pub fn slab(width_in: f64, thickness_in: f64, haunch_in: f64) -> Self {
        SectionProperties {
            area_in2: width_in * thickness_in,
            inertia_in4: width_in * thickness_in.powi(3) / 12.0,
            centroid_in: -(haunch_in + 0.5 * thickness_in),
            y_top_in: -(haunch_in + thickness_in),
            y_bottom_in: -haunch_in,
        }
    }

    /// Distance from centroid to bottom fiber
    pub fn yb_in(&self) -> f64 {
        self.y_bottom_in - self.centroid_in
    }

    /// Distance from top fiber to centroid
    pub fn yt_in(&self) -> f64 {
        self.centroid_in - self.y_top_in
    }

    pub fn is_valid(&self) -> bool {
        self.area_in2 > 0.0 && self.inertia_in4 > 0.0 && self.area_in2.is_finite() && self.inertia_in4.is_finite()
    }
}

/// One stiffness contribution to a transformed section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionElement {
    pub modulus_ksi: f64,
    pub area_in2: f64,
    /// Inertia about the element's own centroid (zero for steel)
    pub inertia_in4: f64,
    pub y_in: f64,
}

/// Axial and flexural stiffness of a set of elements, about their elastic centroid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stiffness {
    /// Σ E·A (kip)
    pub ea_kip: f64,
    /// Σ E·(I + A·(y − yc)²) (kip·in²)
    pub ei_kipin2: f64,
    /// Elastic centroid depth below top of girder
    pub centroid_in: f64,
}

impl Stiffness {
    pub fn is_valid(&self) -> bool {
        self.ea_kip > 0.0 && self.ei_kipin2 > 0.0 && self.ea_kip.is_finite() && self.ei_kipin2.is_finite()
    }

    /// Transformed area relative to a reference modulus
    pub fn transformed_area(&self, reference_modulus_ksi: f64) -> f64 {
        self.ea_kip / reference_modulus_ksi
    }

    /// Transformed inertia relative to a reference modulus
    pub fn transformed_inertia(&self, reference_modulus_ksi: f64) -> f64 {
        self.ei_kipin2 / reference_modulus_ksi
    }
}

/// Combine elements into a transformed section (parallel axis theorem).
///
/// # Formula
/// - EA = Σ Eᵢ Aᵢ
/// - yc = Σ Eᵢ Aᵢ yᵢ / EA
/// - EI = Σ Eᵢ (Iᵢ + Aᵢ (yᵢ − yc)²)
pub fn transformed_stiffness(elements: &[SectionElement]) -> Stiffness {
    let ea: f64 = elements.iter().map(|e| e.modulus_ksi * e.area_in2).sum();
    let first_moment: f64 = elements.iter().map(|e| e.modulus_ksi * e.area_in2 * e.y_in).sum();
    let centroid = if ea > 0.0 { first_moment / ea } else { 0.0 };
    let ei = elements
        .iter()
        .map(|e| e.modulus_ksi * (e.inertia_in4 + e.area_in2 * (e.y_in - centroid).powi(2)))
        .sum();
    Stiffness {
        ea_kip: ea,
        ei_kipin2: ei,
        centroid_in: centroid,
    }
}

/// Gross composite section with the deck transformed by modular ratio `n = Ed/Eg`.
pub fn composite_section(girder: &SectionProperties, deck: &SectionProperties, n: f64) -> SectionProperties {
    let stiffness = transformed_stiffness(&[
        SectionElement {
            modulus_ksi: 1.0,
            area_in2: girder.area_in2,
            inertia_in4: girder.inertia_in4,
            y_in: girder.centroid_in,
        },
        SectionElement {
            modulus_ksi: n,
            area_in2: deck.area_in2,
            inertia_in4: deck.inertia_in4,
            y_in: deck.centroid_in,
        },
    ]);
    SectionProperties {
        area_in2: stiffness.ea_kip,
        inertia_in4: stiffness.ei_kipin2,
        centroid_in: stiffness.centroid_in,
        y_top_in: deck.y_top_in.min(girder.y_top_in),
        y_bottom_in: girder.y_bottom_in,
    }
}

/// Stress at depth `y` from axial force and moment on a section (tension positive).
///
/// f = P/A + M (y − yc)/I, positive moment produces tension below the centroid.
#[inline]
pub fn fiber_stress(p_kip: f64, m_kipin: f64, area_in2: f64, inertia_in4: f64, centroid_in: f64, y_in: f64) -> f64 {
    p_kip / area_in2 + m_kipin * (y_in - centroid_in) / inertia_in4
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_slab_properties() {
        let slab = SectionProperties::slab(96.0, 8.0, 2.0);
        assert_relative_eq!(slab.area_in2, 768.0);
        assert_relative_eq!(slab.inertia_in4, 4096.0);
        assert_relative_eq!(slab.centroid_in, -6.0);
        assert_relative_eq!(slab.yb_in(), 4.0);
    }

    #[test]
    fn test_transformed_two_equal_rectangles() {
        // Two 10x10 squares stacked: combined 10x20 rectangle
        let square = |y| SectionElement {
            modulus_ksi: 1.0,
            area_in2: 100.0,
            inertia_in4: 10.0 * 1000.0 / 12.0,
            y_in: y,
        };
        let s = transformed_stiffness(&[square(5.0), square(15.0)]);
        assert_relative_eq!(s.ea_kip, 200.0);
        assert_relative_eq!(s.centroid_in, 10.0);
        assert_relative_eq!(s.ei_kipin2, 10.0 * 8000.0 / 12.0, max_relative = 1e-12);
    }

    #[test]
    fn test_composite_raises_centroid() {
        let girder = SectionProperties::girder(767.0, 545_894.0, 36.6, 73.5);
        let deck = SectionProperties::slab(72.0, 7.5, 1.0);
        let comp = composite_section(&girder, &deck, 0.8);
        assert!(comp.centroid_in < girder.centroid_in);
        assert!(comp.inertia_in4 > girder.inertia_in4);
        assert_relative_eq!(comp.area_in2, 767.0 + 0.8 * 540.0);
    }

    #[test]
    fn test_fiber_stress_sign() {
        // Sagging moment: tension at the bottom, compression at the top
        let bottom = fiber_stress(0.0, 1000.0, 100.0, 1000.0, 5.0, 10.0);
        let top = fiber_stress(0.0, 1000.0, 100.0, 1000.0, 5.0, 0.0);
        assert!(bottom > 0.0);
        assert!(top < 0.0);
    }
}
