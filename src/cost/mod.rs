//! Ingredient cost of a batch
//!
//! Each component's share of the batch is priced at its bottle price per mL.
//! Nicotine base takes its share first; PG fills whatever VG, flavor and
//! nicotine leave.

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::validate::FieldErrors;

/// Purchase price of one bottle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bottle {
    pub price: f64,
    /// mL
    pub volume: f64,
}

impl Bottle {
    pub fn new(price: f64, volume: f64) -> Self {
        Self { price, volume }
    }

    pub fn price_per_ml(&self) -> f64 {
        self.price / self.volume
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostInput {
    /// Batch size, mL
    pub total_volume: f64,
    pub nicotine_strength_desired: f64,
    pub nicotine_strength_base: f64,
    pub nicotine: Bottle,
    pub vg: Bottle,
    pub pg: Bottle,
    pub flavor: Bottle,
    /// Percent of batch
    pub flavor_pct: f64,
    /// Percent of batch
    pub vg_pct: f64,
}

impl Default for CostInput {
    fn default() -> Self {
        Self {
            total_volume: 1000.0,
            nicotine_strength_desired: 6.0,
            nicotine_strength_base: 250.0,
            nicotine: Bottle::new(80.0, 125.0),
            vg: Bottle::new(25.0, 3785.0),
            pg: Bottle::new(35.0, 3785.0),
            flavor: Bottle::new(5.0, 15.0),
            flavor_pct: 10.0,
            vg_pct: 50.0,
        }
    }
}

impl CostInput {
    pub fn validate(&self) -> CalcResult<()> {
        let mut errors = FieldErrors::new();
        errors.positive(
            "totalVolume",
            self.total_volume,
            "Total volume must be greater than zero.",
        );
        errors.positive(
            "nicotineStrengthBase",
            self.nicotine_strength_base,
            "Nicotine base strength must be greater than zero.",
        );
        errors.within(
            "nicotineStrengthDesired",
            self.nicotine_strength_desired,
            0.0,
            1000.0,
        );
        for (price, volume, bottle) in [
            ("nicotinePrice", "nicotineVolume", &self.nicotine),
            ("vgPrice", "vgVolume", &self.vg),
            ("pgPrice", "pgVolume", &self.pg),
            ("flavorPrice", "flavorVolume", &self.flavor),
        ] {
            errors.at_least(price, bottle.price, 0.0, "Price cannot be negative.");
            errors.positive(volume, bottle.volume, "Bottle volume must be greater than zero.");
        }
        errors.percent("flavorPercent", self.flavor_pct);
        errors.percent("vgRatio", self.vg_pct);
        errors.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostLine {
    pub name: &'static str,
    /// Percent of batch volume
    pub pct: f64,
    pub volume: f64,
    pub cost: f64,
    /// Percent of the total cost
    pub cost_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostResult {
    /// Nicotine, VG, PG, flavor
    pub lines: Vec<CostLine>,
    pub total_cost: f64,
    pub cost_per_ml: f64,
}

impl CostResult {
    pub fn line(&self, name: &str) -> Option<&CostLine> {
        self.lines.iter().find(|l| l.name == name)
    }
}

pub fn calculate(input: &CostInput) -> CalcResult<CostResult> {
    input.validate()?;

    let nicotine = input.nicotine_strength_desired / input.nicotine_strength_base;
    if nicotine > 1.0 {
        return Err(CalcError::constraint(
            "nicotineStrengthDesired",
            "The desired nicotine strength is too high.",
        ));
    }
    let vg = input.vg_pct / 100.0;
    let flavor = input.flavor_pct / 100.0;
    let pg = 1.0 - vg - flavor - nicotine;
    if pg < -1e-9 {
        tracing::warn!(vg, flavor, nicotine, "cost shares exceed the batch");
        return Err(CalcError::constraint(
            "vgRatio",
            "VG, flavor and nicotine cannot exceed 100% of the batch.",
        ));
    }
    let pg = pg.max(0.0);

    let shares = [
        ("Nicotine", nicotine, &input.nicotine),
        ("VG", vg, &input.vg),
        ("PG", pg, &input.pg),
        ("Flavor", flavor, &input.flavor),
    ];
    let total_cost: f64 = shares
        .iter()
        .map(|(_, share, bottle)| share * input.total_volume * bottle.price_per_ml())
        .sum();

    let lines = shares
        .iter()
        .map(|&(name, share, bottle)| {
            let volume = share * input.total_volume;
            let cost = volume * bottle.price_per_ml();
            CostLine {
                name,
                pct: share * 100.0,
                volume,
                cost,
                cost_share: if total_cost > 0.0 {
                    cost / total_cost * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();

    let result = CostResult {
        lines,
        total_cost,
        cost_per_ml: total_cost / input.total_volume,
    };
    tracing::debug!(total_cost, cost_per_ml = result.cost_per_ml, "cost calculated");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_batch() {
        let result = calculate(&CostInput::default()).unwrap();

        // 6/250 of a litre of nic at 0.64/mL
        let nic = result.line("Nicotine").unwrap();
        assert!((nic.volume - 24.0).abs() < 1e-9);
        assert!((nic.cost - 15.36).abs() < 1e-9);

        let pg = result.line("PG").unwrap();
        assert!((pg.pct - 37.6).abs() < 1e-9);

        let sum: f64 = result.lines.iter().map(|l| l.cost).sum();
        assert!((result.total_cost - sum).abs() < 1e-9);
        assert!((result.cost_per_ml - result.total_cost / 1000.0).abs() < 1e-12);

        let share: f64 = result.lines.iter().map(|l| l.cost_share).sum();
        assert!((share - 100.0).abs() < 1e-9);

        let pct: f64 = result.lines.iter().map(|l| l.pct).sum();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_overfull_batch_rejected() {
        let input = CostInput {
            vg_pct: 95.0,
            ..CostInput::default()
        };
        assert_eq!(calculate(&input).unwrap_err().field(), Some("vgRatio"));
    }

    #[test]
    fn test_nicotine_above_base_rejected() {
        let input = CostInput {
            nicotine_strength_desired: 300.0,
            ..CostInput::default()
        };
        assert_eq!(
            calculate(&input).unwrap_err().field(),
            Some("nicotineStrengthDesired")
        );
    }

    #[test]
    fn test_free_ingredients() {
        let free = Bottle::new(0.0, 100.0);
        let input = CostInput {
            nicotine: free,
            vg: free,
            pg: free,
            flavor: free,
            ..CostInput::default()
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.total_cost, 0.0);
        assert!(result.lines.iter().all(|l| l.cost_share == 0.0));
    }

    #[test]
    fn test_zero_bottle_volume_rejected() {
        let input = CostInput {
            flavor: Bottle::new(5.0, 0.0),
            ..CostInput::default()
        };
        assert!(matches!(calculate(&input), Err(CalcError::Invalid(_))));
    }
}
