//! Copper wiring size
//!
//! Picks the first gauge in the wire table (thickest first) whose voltage drop
//! and heating over one puff stay under the given limits.

use serde::{Deserialize, Serialize};
use uom::si::area::square_millimeter;
use uom::si::f64::{Area, Length, Volume};
use uom::si::length::meter;
use uom::si::volume::cubic_centimeter;

use crate::error::{CalcError, CalcResult};
use crate::reference::{wires, WireSpec};
use crate::validate::FieldErrors;

/// g/cm^3
pub const COPPER_DENSITY: f64 = 8.96;
/// J/(g K)
pub const COPPER_HEAT_CAPACITY: f64 = 0.385;
/// Seconds of load per puff
pub const PUFF_TIME: f64 = 3.5;

/// Exclusive upper bound on the allowed temperature rise, degrees C
const MAX_TEMP_RISE: f64 = 250.0;
/// Amps
const MAX_CURRENT: f64 = 200.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WiringInput {
    /// One-way run length, metres
    pub wire_length: f64,
    pub max_voltage_drop: f64,
    /// Degrees C
    pub max_temp_rise: f64,
    /// Amps
    pub max_current: f64,
}

impl Default for WiringInput {
    fn default() -> Self {
        Self {
            wire_length: 0.1,
            max_voltage_drop: 0.25,
            max_temp_rise: 50.0,
            max_current: 30.0,
        }
    }
}

impl WiringInput {
    pub fn validate(&self) -> CalcResult<()> {
        let mut errors = FieldErrors::new();
        errors.positive(
            "wireLength",
            self.wire_length,
            "Wire length must be greater than zero.",
        );
        errors.positive(
            "maxVoltageDrop",
            self.max_voltage_drop,
            "Voltage drop must be greater than zero.",
        );
        if errors.number("maxTempRise", self.max_temp_rise) {
            if self.max_temp_rise <= 0.0 {
                errors.push("maxTempRise", "Temperature rise must be greater than zero.");
            } else if self.max_temp_rise >= MAX_TEMP_RISE {
                errors.push("maxTempRise", "Max temp rise must be less than 250.");
            }
        }
        errors.positive(
            "maxCurrent",
            self.max_current,
            "Current must be greater than zero.",
        );
        errors.at_most(
            "maxCurrent",
            self.max_current,
            MAX_CURRENT,
            "Max current must be less than 200.",
        );
        errors.finish()
    }
}

/// One gauge checked against the limits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeEvaluation {
    pub gauge: i32,
    pub diameter_mm: f64,
    pub voltage_drop: f64,
    /// Watts lost in the wire at full current
    pub waste_power: f64,
    pub temp_rise: f64,
    pub suitable: bool,
}

fn evaluate(wire: &WireSpec, input: &WiringInput) -> GaugeEvaluation {
    // Current flows out and back
    let conductor = Length::new::<meter>(2.0 * input.wire_length);
    let voltage_drop = input.max_current * conductor.get::<meter>() * wire.ohms_per_meter;
    let waste_power = voltage_drop * input.max_current;
    let waste_energy = waste_power * PUFF_TIME;

    let volume: Volume = Area::new::<square_millimeter>(
        std::f64::consts::PI * (wire.diameter_mm / 2.0).powi(2),
    ) * conductor;
    let mass_g = COPPER_DENSITY * volume.get::<cubic_centimeter>();
    let temp_rise = waste_energy / (COPPER_HEAT_CAPACITY * mass_g);

    GaugeEvaluation {
        gauge: wire.gauge,
        diameter_mm: wire.diameter_mm,
        voltage_drop,
        waste_power,
        temp_rise,
        suitable: voltage_drop < input.max_voltage_drop && temp_rise < input.max_temp_rise,
    }
}

/// Every gauge in table order, suitable or not
pub fn candidates(input: &WiringInput) -> CalcResult<Vec<GaugeEvaluation>> {
    input.validate()?;
    Ok(wires().iter().map(|w| evaluate(w, input)).collect())
}

/// The first suitable gauge in table order
pub fn calculate(input: &WiringInput) -> CalcResult<GaugeEvaluation> {
    input.validate()?;
    match wires()
        .iter()
        .map(|w| evaluate(w, input))
        .find(|e| e.suitable)
    {
        Some(selected) => {
            tracing::debug!(
                gauge = selected.gauge,
                voltage_drop = selected.voltage_drop,
                temp_rise = selected.temp_rise,
                "wiring gauge selected"
            );
            Ok(selected)
        }
        None => {
            tracing::warn!(
                length = input.wire_length,
                current = input.max_current,
                "no wire gauge satisfies the limits"
            );
            Err(CalcError::NoSuitableGauge)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{wire, THICKEST_GAUGE};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_selects_thickest_qualifying() {
        let input = WiringInput {
            wire_length: 1.0,
            max_voltage_drop: 0.5,
            max_temp_rise: 50.0,
            max_current: 20.0,
        };
        let selected = calculate(&input).unwrap();
        assert_eq!(selected.gauge, THICKEST_GAUGE);
        assert!(selected.suitable);
    }

    #[test]
    fn test_hand_computed_drop() {
        let input = WiringInput {
            wire_length: 1.0,
            max_current: 20.0,
            ..WiringInput::default()
        };
        let w = wire(10).unwrap();
        let eval = evaluate(w, &input);
        assert!((eval.voltage_drop - 20.0 * 2.0 * w.ohms_per_meter).abs() < 1e-12);

        // 2 m of 10 AWG: ~10.5 cm^3, ~94 g of copper; ~9.2 J over a puff
        let area_mm2 = std::f64::consts::PI * (w.diameter_mm / 2.0).powi(2);
        let mass = COPPER_DENSITY * area_mm2 * 2.0;
        let expected = eval.waste_power * PUFF_TIME / (COPPER_HEAT_CAPACITY * mass);
        assert!((eval.temp_rise - expected).abs() < 1e-9);
        assert!(eval.temp_rise < 1.0);
    }

    #[test]
    fn test_candidates_cover_table() {
        let all = candidates(&WiringInput::default()).unwrap();
        assert_eq!(all.len(), wires().len());
        // Thinner wire drops more voltage
        for pair in all.windows(2) {
            assert!(pair[0].voltage_drop < pair[1].voltage_drop);
        }
    }

    #[test]
    fn test_no_suitable_gauge() {
        let input = WiringInput {
            wire_length: 100.0,
            max_voltage_drop: 0.01,
            max_temp_rise: 50.0,
            max_current: 200.0,
        };
        assert_eq!(calculate(&input), Err(CalcError::NoSuitableGauge));
    }

    #[test]
    fn test_rejects_zero_length() {
        let input = WiringInput {
            wire_length: 0.0,
            ..WiringInput::default()
        };
        assert!(matches!(calculate(&input), Err(CalcError::Invalid(_))));
    }

    #[test]
    fn test_limits_on_current_and_rise() {
        let rejected = |input: WiringInput, field: &str| match calculate(&input) {
            Err(CalcError::Invalid(errors)) => errors.get(field).is_some(),
            _ => false,
        };
        assert!(rejected(
            WiringInput {
                max_current: 0.0,
                ..WiringInput::default()
            },
            "maxCurrent"
        ));
        assert!(rejected(
            WiringInput {
                max_current: 200.5,
                ..WiringInput::default()
            },
            "maxCurrent"
        ));
        assert!(rejected(
            WiringInput {
                max_temp_rise: 250.0,
                ..WiringInput::default()
            },
            "maxTempRise"
        ));
        assert!(calculate(&WiringInput {
            max_current: 200.0,
            max_temp_rise: 249.0,
            ..WiringInput::default()
        })
        .is_ok());
    }
}
