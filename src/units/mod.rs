//! Unit conversion helpers
//!
//! AWG gauge numbers, liquid volumes and wire geometry. Quantities that cross
//! unit systems go through `uom` so the scale factors come from the SI tables
//! rather than from hand-typed constants.

use serde::{Deserialize, Serialize};
use uom::si::f64::{Area, Length, Volume};
use uom::si::length::millimeter;
use uom::si::volume::{fluid_ounce, milliliter};

/// Diameter of AWG 36, the anchor of the gauge formula
const AWG_36_DIAMETER_MM: f64 = 0.127;
/// Diameter ratio between AWG 0000 and AWG 36
const AWG_RATIO: f64 = 92.0;

/// Convert an AWG gauge number to a wire diameter in millimetres.
///
/// `d(n) = 0.127 * 92^((36 - n) / 39)`
pub fn awg_to_mm(gauge: i32) -> f64 {
    AWG_36_DIAMETER_MM * AWG_RATIO.powf((36.0 - gauge as f64) / 39.0)
}

/// Inverse of [`awg_to_mm`]; fractional for diameters between gauges.
pub fn mm_to_awg(diameter_mm: f64) -> f64 {
    36.0 - 39.0 * (diameter_mm / AWG_36_DIAMETER_MM).ln() / AWG_RATIO.ln()
}

/// Area of a round wire of the given diameter
pub fn round_wire_area(diameter: Length) -> Area {
    let radius = diameter / 2.0;
    radius * radius * std::f64::consts::PI
}

/// `pi * (d / 2)^2` with the diameter in mm, result in mm^2
pub fn round_wire_area_mm2(diameter_mm: f64) -> f64 {
    round_wire_area(Length::new::<millimeter>(diameter_mm))
        .get::<uom::si::area::square_millimeter>()
}

pub fn ml_to_fluid_ounces(ml: f64) -> f64 {
    Volume::new::<milliliter>(ml).get::<fluid_ounce>()
}

pub fn fluid_ounces_to_ml(oz: f64) -> f64 {
    Volume::new::<fluid_ounce>(oz).get::<milliliter>()
}

/// Display unit for liquid volumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeUnit {
    #[default]
    Metric,
    Imperial,
}

impl VolumeUnit {
    /// Express a millilitre amount in this unit
    pub fn from_ml(self, ml: f64) -> f64 {
        match self {
            VolumeUnit::Metric => ml,
            VolumeUnit::Imperial => ml_to_fluid_ounces(ml),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            VolumeUnit::Metric => "mL",
            VolumeUnit::Imperial => "fl oz",
        }
    }
}

impl std::fmt::Display for VolumeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_awg_anchor_points() {
        assert!((awg_to_mm(36) - 0.127).abs() < 1e-12);
        // AWG 0000 is 0.46 inch
        assert!((awg_to_mm(-3) - 11.684).abs() < 1e-3);
        assert!((awg_to_mm(30) - 0.2546).abs() < 1e-3);
    }

    #[test]
    fn test_thicker_wire_has_lower_gauge() {
        assert!(awg_to_mm(30) < awg_to_mm(20));
        for gauge in 0..40 {
            assert!(awg_to_mm(gauge + 1) < awg_to_mm(gauge));
        }
    }

    #[test]
    fn test_mm_to_awg_inverts() {
        for gauge in [10, 24, 28, 32, 40] {
            assert!((mm_to_awg(awg_to_mm(gauge)) - gauge as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fluid_ounces() {
        assert!((ml_to_fluid_ounces(1.0) - 0.033814).abs() < 1e-6);
        assert!((fluid_ounces_to_ml(ml_to_fluid_ounces(30.0)) - 30.0).abs() < 1e-9);
        assert_eq!(VolumeUnit::Metric.from_ml(12.5), 12.5);
    }

    #[test]
    fn test_round_wire_area() {
        let area = round_wire_area_mm2(2.0);
        assert!((area - std::f64::consts::PI).abs() < 1e-12);
    }
}
