//! AWG copper wire sizes

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{CalcError, CalcResult};
use crate::units::{awg_to_mm, round_wire_area_mm2};

/// Annealed copper, ohm mm^2 / m at 20 C
pub const COPPER_RESISTIVITY: f64 = 0.0172;

pub const THICKEST_GAUGE: i32 = 0;
pub const THINNEST_GAUGE: i32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WireSpec {
    pub gauge: i32,
    pub diameter_mm: f64,
    /// Resistance of one metre of copper conductor
    pub ohms_per_meter: f64,
}

impl WireSpec {
    fn for_gauge(gauge: i32) -> Self {
        let diameter_mm = awg_to_mm(gauge);
        Self {
            gauge,
            diameter_mm,
            ohms_per_meter: COPPER_RESISTIVITY / round_wire_area_mm2(diameter_mm),
        }
    }
}

// Thickest (highest ampacity) first.
static WIRES: Lazy<Vec<WireSpec>> =
    Lazy::new(|| (THICKEST_GAUGE..=THINNEST_GAUGE).map(WireSpec::for_gauge).collect());

/// The full table, ordered by descending current capacity
pub fn wires() -> &'static [WireSpec] {
    &WIRES
}

pub fn wire(gauge: i32) -> CalcResult<&'static WireSpec> {
    WIRES
        .iter()
        .find(|w| w.gauge == gauge)
        .ok_or(CalcError::UnknownGauge(gauge))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_thickest_first() {
        let table = wires();
        assert_eq!(table.first().map(|w| w.gauge), Some(THICKEST_GAUGE));
        assert_eq!(table.last().map(|w| w.gauge), Some(THINNEST_GAUGE));
        for pair in table.windows(2) {
            assert!(pair[0].diameter_mm > pair[1].diameter_mm);
            assert!(pair[0].ohms_per_meter < pair[1].ohms_per_meter);
        }
    }

    #[test]
    fn test_published_values() {
        // 10 AWG: 2.588 mm, 3.28 milliohm/m
        let w = wire(10).unwrap();
        assert!((w.diameter_mm - 2.588).abs() < 1e-3);
        assert!((w.ohms_per_meter - 0.00327).abs() < 5e-5);
    }

    #[test]
    fn test_unknown_gauge() {
        assert_eq!(wire(41), Err(CalcError::UnknownGauge(41)));
    }
}
