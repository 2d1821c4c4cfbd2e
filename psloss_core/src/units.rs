//! # Unit Types
//!
//! The engine computes in kip, inch, ksi and days. These newtypes mark values
//! that cross into the report layer, where they are converted for display.
//!
//! ## Example
//!
//! ```rust
//! use psloss_core::units::{Ksi, Mpa, DisplayUnits};
//!
//! let stress = Ksi(202.5);
//! let si: Mpa = stress.into();
//! assert!((si.0 - 1396.2).abs() < 0.1);
//!
//! assert_eq!(DisplayUnits::Us.stress(Ksi(10.0)), "10.00 ksi");
//! ```

use serde::{Deserialize, Serialize};

const MPA_PER_KSI: f64 = 6.894757;
const M_PER_IN: f64 = 0.0254;

// ============================================================================
// Stress Units
// ============================================================================

/// Stress in kips per square inch
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ksi(pub f64);

/// Stress in megapascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mpa(pub f64);

impl From<Ksi> for Mpa {
    fn from(ksi: Ksi) -> Self {
        Mpa(ksi.0 * MPA_PER_KSI)
    }
}

impl From<Mpa> for Ksi {
    fn from(mpa: Mpa) -> Self {
        Ksi(mpa.0 / MPA_PER_KSI)
    }
}

// ============================================================================
// Length Units
// ============================================================================

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

impl From<Inches> for Feet {
    fn from(inches: Inches) -> Self {
        Feet(inches.0 / 12.0)
    }
}

impl From<Feet> for Inches {
    fn from(feet: Feet) -> Self {
        Inches(feet.0 * 12.0)
    }
}

impl From<Inches> for Meters {
    fn from(inches: Inches) -> Self {
        Meters(inches.0 * M_PER_IN)
    }
}

impl From<Meters> for Inches {
    fn from(meters: Meters) -> Self {
        Inches(meters.0 / M_PER_IN)
    }
}

// ============================================================================
// Display
// ============================================================================

/// Unit system used when rendering report tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayUnits {
    /// ksi and ft
    #[default]
    Us,
    /// MPa and m
    Si,
}

impl DisplayUnits {
    pub fn stress_label(self) -> &'static str {
        match self {
            DisplayUnits::Us => "ksi",
            DisplayUnits::Si => "MPa",
        }
    }

    pub fn length_label(self) -> &'static str {
        match self {
            DisplayUnits::Us => "ft",
            DisplayUnits::Si => "m",
        }
    }

    /// Stress value converted to this system, without the unit label.
    pub fn stress_value(self, stress: Ksi) -> f64 {
        match self {
            DisplayUnits::Us => stress.0,
            DisplayUnits::Si => Mpa::from(stress).0,
        }
    }

    /// Location/length value converted to this system, without the unit label.
    pub fn length_value(self, length: Inches) -> f64 {
        match self {
            DisplayUnits::Us => Feet::from(length).0,
            DisplayUnits::Si => Meters::from(length).0,
        }
    }

    pub fn stress(self, stress: Ksi) -> String {
        format!("{:.2} {}", self.stress_value(stress), self.stress_label())
    }

    pub fn length(self, length: Inches) -> String {
        format!("{:.3} {}", self.length_value(length), self.length_label())
    }

    /// Label for elongations and seating (in or mm)
    pub fn small_length_label(self) -> &'static str {
        match self {
            DisplayUnits::Us => "in",
            DisplayUnits::Si => "mm",
        }
    }

    pub fn small_length_value(self, length: Inches) -> f64 {
        match self {
            DisplayUnits::Us => length.0,
            DisplayUnits::Si => Meters::from(length).0 * 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stress_conversions() {
        let mpa: Mpa = Ksi(1.0).into();
        assert_relative_eq!(mpa.0, 6.894757, epsilon = 1e-9);
        let back: Ksi = mpa.into();
        assert_relative_eq!(back.0, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_length_conversions() {
        let ft: Feet = Inches(30.0).into();
        assert_relative_eq!(ft.0, 2.5);
        let m: Meters = Inches(100.0).into();
        assert_relative_eq!(m.0, 2.54, epsilon = 1e-12);
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(DisplayUnits::Us.length(Inches(120.0)), "10.000 ft");
        assert_eq!(DisplayUnits::Si.stress_label(), "MPa");
        assert_relative_eq!(DisplayUnits::Si.small_length_value(Inches(1.0)), 25.4, epsilon = 1e-9);
        assert_relative_eq!(DisplayUnits::Si.stress_value(Ksi(10.0)), 68.94757, epsilon = 1e-6);
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Ksi(4.5)).unwrap();
        assert_eq!(json, "4.5");
    }
}
