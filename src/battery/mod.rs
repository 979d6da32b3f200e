//! Mod and battery safety
//!
//! Current draw, runtime and discharge headroom for a cell pack driving a coil,
//! either directly (mechanical) or through a regulator.

use serde::{Deserialize, Serialize};

use crate::error::CalcResult;
use crate::reference::{battery, CELL_VOLTAGE};
use crate::validate::FieldErrors;

/// First resistance on the chart, ohms
pub const CHART_START: f64 = 0.04;
pub const CHART_STEP: f64 = 0.02;
/// Last resistance the chart ever sweeps to, ohms
pub const CHART_MAX_RESISTANCE: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModType {
    /// Pack voltage straight across the coil
    #[default]
    Mechanical,
    /// Constant wattage through a regulator of the given efficiency
    Regulated { efficiency_pct: f64, wattage: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryChoice {
    /// A cell from the reference table
    Named(String),
    Custom { capacity_mah: f64, current_limit: f64 },
}

impl BatteryChoice {
    /// `(capacity_mah, current_limit)`
    fn resolve(&self) -> CalcResult<(f64, f64)> {
        match self {
            BatteryChoice::Named(name) => {
                let spec = battery(name)?;
                Ok((spec.capacity_mah, spec.current_limit))
            }
            BatteryChoice::Custom {
                capacity_mah,
                current_limit,
            } => Ok((*capacity_mah, *current_limit)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModInput {
    pub mod_type: ModType,
    /// Coil resistance, ohms
    pub resistance: f64,
    /// Cells in series
    pub series: u32,
    pub battery: BatteryChoice,
    /// Required spare discharge capacity, percent of the cell limit
    pub safety_margin_pct: f64,
}

impl Default for ModInput {
    fn default() -> Self {
        Self {
            mod_type: ModType::Mechanical,
            resistance: 0.5,
            series: 1,
            battery: BatteryChoice::Named("LG HG2".to_string()),
            safety_margin_pct: 50.0,
        }
    }
}

impl ModInput {
    pub fn validate(&self) -> CalcResult<()> {
        let mut errors = FieldErrors::new();
        errors.positive(
            "resistance",
            self.resistance,
            "Resistance must be greater than zero.",
        );
        if self.series < 1 {
            errors.push("series", "Series count must be at least one.");
        }
        if let ModType::Regulated {
            efficiency_pct,
            wattage,
        } = self.mod_type
        {
            errors.percent("efficiency", efficiency_pct);
            errors.positive("wattage", wattage, "Wattage must be greater than zero.");
        }
        if let BatteryChoice::Custom {
            capacity_mah,
            current_limit,
        } = self.battery
        {
            errors.positive("capacity", capacity_mah, "Capacity must be greater than zero.");
            errors.positive(
                "currentLimit",
                current_limit,
                "Current limit must be greater than zero.",
            );
        }
        errors.percent("safetyMargin", self.safety_margin_pct);
        errors.finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Safety {
    Success,
    Warning,
    Danger,
}

impl std::fmt::Display for Safety {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Safety::Success => write!(f, "SAFE"),
            Safety::Warning => write!(f, "WARNING"),
            Safety::Danger => write!(f, "DANGER"),
        }
    }
}

/// Classify a current draw against a cell limit.
///
/// `margin` is a fraction (0.5 for 50%). Spare capacity strictly above the
/// margin is `Success`, any spare capacity up to and including the margin is
/// `Warning`, none at all is `Danger`.
pub fn classify(current: f64, current_limit: f64, margin: f64) -> Safety {
    let actual = (current_limit - current) / current_limit;
    if actual > margin {
        Safety::Success
    } else if actual > 0.0 {
        Safety::Warning
    } else {
        Safety::Danger
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub resistance: f64,
    pub current: f64,
    pub safety: Safety,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModResult {
    pub voltage: f64,
    pub current: f64,
    pub power: f64,
    /// Pack power at the cell current limit
    pub max_power: f64,
    pub runtime_minutes: f64,
    /// Amps left before the cell limit; negative when over
    pub headroom: f64,
    pub margin_pct: f64,
    pub safety: Safety,
    /// Resistance at which the draw reaches the cell limit
    pub danger_resistance: f64,
    /// Resistance at which the draw reaches the safety margin; `None` for a 100% margin
    pub margin_resistance: Option<f64>,
    pub current_limit: f64,
    pub safety_margin: f64,
}

impl ModResult {
    /// Upper end of the chart's resistance axis
    pub fn chart_max(&self) -> f64 {
        self.margin_resistance
            .unwrap_or(0.0)
            .clamp(1.0, CHART_MAX_RESISTANCE)
    }

    /// Direct-drive current over a resistance sweep, for display only
    pub fn chart(&self) -> Vec<ChartPoint> {
        let max = self.chart_max();
        (0..)
            .map(|i| CHART_START + CHART_STEP * i as f64)
            .take_while(|&r| r <= max + 1e-9)
            .map(|resistance| {
                let current = self.voltage / resistance;
                ChartPoint {
                    resistance,
                    current,
                    safety: classify(current, self.current_limit, self.safety_margin),
                }
            })
            .collect()
    }
}

pub fn calculate(input: &ModInput) -> CalcResult<ModResult> {
    input.validate()?;
    let (capacity_mah, current_limit) = input.battery.resolve()?;

    let voltage = input.series as f64 * CELL_VOLTAGE;
    let (current, power) = match input.mod_type {
        ModType::Mechanical => {
            let current = voltage / input.resistance;
            (current, voltage * current)
        }
        // Regulator losses show up as extra draw from the pack
        ModType::Regulated {
            efficiency_pct,
            wattage,
        } => (
            (wattage / voltage) * (1.0 + (1.0 - efficiency_pct / 100.0)),
            wattage,
        ),
    };

    let safety_margin = input.safety_margin_pct / 100.0;
    let headroom = current_limit - current;
    let margin_limit = current_limit - current_limit * safety_margin;
    let margin_resistance = (margin_limit > 0.0).then(|| voltage / margin_limit);

    let result = ModResult {
        voltage,
        current,
        power,
        max_power: current_limit * voltage,
        runtime_minutes: capacity_mah / 1000.0 / current * 60.0,
        headroom,
        margin_pct: headroom / current_limit * 100.0,
        safety: classify(current, current_limit, safety_margin),
        danger_resistance: voltage / current_limit,
        margin_resistance,
        current_limit,
        safety_margin,
    };

    if result.safety == Safety::Danger {
        tracing::warn!(current, current_limit, "draw exceeds the cell limit");
    }
    tracing::debug!(voltage, current, power, safety = %result.safety, "mod calculated");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mechanical_single_cell() {
        let result = calculate(&ModInput::default()).unwrap();
        assert_eq!(result.voltage, 4.2);
        assert!((result.current - 8.4).abs() < 1e-12);
        assert!((result.power - 35.28).abs() < 1e-9);
        // HG2: 3000 mAh, 20 A
        assert!((result.max_power - 84.0).abs() < 1e-9);
        assert!((result.runtime_minutes - 3.0 / 8.4 * 60.0).abs() < 1e-9);
        assert!((result.headroom - 11.6).abs() < 1e-9);
        assert!((result.margin_pct - 58.0).abs() < 1e-9);
        assert_eq!(result.safety, Safety::Success);
    }

    #[test]
    fn test_regulated_draw_includes_losses() {
        let input = ModInput {
            mod_type: ModType::Regulated {
                efficiency_pct: 90.0,
                wattage: 84.0,
            },
            series: 2,
            ..ModInput::default()
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.power, 84.0);
        // 84 W / 8.4 V = 10 A, plus 10% losses
        assert!((result.current - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_classification_boundaries() {
        // exactly at the margin is a warning
        assert_eq!(classify(10.0, 20.0, 0.5), Safety::Warning);
        assert_eq!(classify(9.0, 20.0, 0.5), Safety::Success);
        // exactly at the limit is danger
        assert_eq!(classify(20.0, 20.0, 0.5), Safety::Danger);
        assert_eq!(classify(25.0, 20.0, 0.0), Safety::Danger);
        assert_eq!(classify(19.0, 20.0, 0.0), Safety::Success);
    }

    #[test]
    fn test_low_resistance_is_danger() {
        let input = ModInput {
            resistance: 0.1,
            ..ModInput::default()
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.safety, Safety::Danger);
        assert!(result.headroom < 0.0);
    }

    #[test]
    fn test_limit_resistances() {
        let result = calculate(&ModInput::default()).unwrap();
        assert!((result.danger_resistance - 0.21).abs() < 1e-12);
        // 50% of 20 A leaves 10 A
        assert!((result.margin_resistance.unwrap() - 0.42).abs() < 1e-12);

        let full_margin = calculate(&ModInput {
            safety_margin_pct: 100.0,
            ..ModInput::default()
        })
        .unwrap();
        assert_eq!(full_margin.margin_resistance, None);
        assert_eq!(full_margin.chart_max(), 1.0);
    }

    #[test]
    fn test_chart_sweep() {
        let result = calculate(&ModInput::default()).unwrap();
        let chart = result.chart();
        assert!((chart[0].resistance - 0.04).abs() < 1e-12);
        // 0.04..=1.00 in 0.02 steps
        assert_eq!(chart.len(), 49);
        assert!((chart.last().unwrap().resistance - 1.0).abs() < 1e-9);
        assert_eq!(chart[0].safety, Safety::Danger);
        assert_eq!(chart.last().unwrap().safety, Safety::Success);
    }

    #[test]
    fn test_chart_capped_near_full_margin() {
        let result = calculate(&ModInput {
            safety_margin_pct: 99.999999,
            ..ModInput::default()
        })
        .unwrap();
        assert!(result.margin_resistance.unwrap() > 1e6);
        assert_eq!(result.chart_max(), CHART_MAX_RESISTANCE);

        let chart = result.chart();
        // 0.04..=25.00 in 0.02 steps
        assert_eq!(chart.len(), 1249);
        assert!((chart.last().unwrap().resistance - CHART_MAX_RESISTANCE).abs() < 1e-9);
    }

    #[test]
    fn test_custom_battery() {
        let input = ModInput {
            battery: BatteryChoice::Custom {
                capacity_mah: 2000.0,
                current_limit: 10.0,
            },
            ..ModInput::default()
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.current_limit, 10.0);
        assert_eq!(result.safety, Safety::Warning);
    }

    #[test]
    fn test_invalid_inputs() {
        let input = ModInput {
            resistance: 0.0,
            series: 0,
            mod_type: ModType::Regulated {
                efficiency_pct: 150.0,
                wattage: 0.0,
            },
            ..ModInput::default()
        };
        match calculate(&input) {
            Err(CalcError::Invalid(errors)) => assert_eq!(errors.len(), 4),
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_cell() {
        let input = ModInput {
            battery: BatteryChoice::Named("Efest Purple".to_string()),
            ..ModInput::default()
        };
        assert!(matches!(calculate(&input), Err(CalcError::UnknownBattery(_))));
    }
}
