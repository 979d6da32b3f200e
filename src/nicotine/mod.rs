//! Nicotine supply calculator
//!
//! Two mutually exclusive modes over the same daily-consumption figures:
//! - Lifetime: how many days a bottle of base lasts
//! - Target: how much base of each common strength covers a number of days

use serde::{Deserialize, Serialize};

use crate::error::CalcResult;
use crate::store::{keys, load_json, save_json, KeyValueStore, StoreError};
use crate::units::VolumeUnit;
use crate::validate::FieldErrors;

/// Nicotine base strengths offered in target mode, mg/mL
pub const REFERENCE_STRENGTHS: [f64; 4] = [48.0, 72.0, 100.0, 250.0];

const MAX_CONCENTRATION: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NicotineMode {
    #[default]
    Lifetime,
    Target,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NicotineInput {
    /// mL of e-liquid used per day
    pub consumed_per_day: f64,
    /// mg/mL of the e-liquid being used
    pub consumed_concentration: f64,
    /// mg/mL of the nicotine base on hand
    pub base_concentration: f64,
    /// mL of nicotine base on hand
    pub base_volume: f64,
    pub desired_supply_days: f64,
}

impl NicotineInput {
    pub fn validate(&self) -> CalcResult<()> {
        let mut errors = FieldErrors::new();
        errors.at_least(
            "consumedPerDay",
            self.consumed_per_day,
            0.0,
            "Daily consumption cannot be negative.",
        );
        errors.within(
            "consumedConcentration",
            self.consumed_concentration,
            0.0,
            MAX_CONCENTRATION,
        );
        errors.within(
            "baseConcentration",
            self.base_concentration,
            0.0,
            MAX_CONCENTRATION,
        );
        errors.at_least("baseVolume", self.base_volume, 0.0, "Volume cannot be negative.");
        errors.at_least(
            "desiredSupply",
            self.desired_supply_days,
            0.0,
            "Supply cannot be negative.",
        );
        errors.finish()
    }

    /// mg of nicotine consumed per day
    pub fn daily_consumption_mg(&self) -> f64 {
        self.consumed_per_day * self.consumed_concentration
    }

    /// mg of nicotine in the base on hand
    pub fn total_supply_mg(&self) -> f64 {
        self.base_volume * self.base_concentration
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifetimeResult {
    pub daily_consumption_mg: f64,
    pub total_supply_mg: f64,
    /// Whole days; 0 when nothing is consumed
    pub supply_duration_days: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetVolume {
    pub strength: f64,
    pub volume: f64,
    pub unit: VolumeUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum NicotineResult {
    Lifetime(LifetimeResult),
    Target { volumes: Vec<TargetVolume> },
}

pub fn lifetime(input: &NicotineInput) -> CalcResult<LifetimeResult> {
    input.validate()?;

    let daily_consumption_mg = input.daily_consumption_mg();
    let total_supply_mg = input.total_supply_mg();
    let supply_duration_days = if daily_consumption_mg > 0.0 {
        (total_supply_mg / daily_consumption_mg).floor() as u64
    } else {
        0
    };

    Ok(LifetimeResult {
        daily_consumption_mg,
        total_supply_mg,
        supply_duration_days,
    })
}

pub fn target(input: &NicotineInput, unit: VolumeUnit) -> CalcResult<Vec<TargetVolume>> {
    input.validate()?;

    let needed_mg = input.daily_consumption_mg() * input.desired_supply_days;
    Ok(REFERENCE_STRENGTHS
        .iter()
        .map(|&strength| TargetVolume {
            strength,
            volume: unit.from_ml(needed_mg / strength),
            unit,
        })
        .collect())
}

pub fn calculate(
    input: &NicotineInput,
    mode: NicotineMode,
    unit: VolumeUnit,
) -> CalcResult<NicotineResult> {
    let result = match mode {
        NicotineMode::Lifetime => NicotineResult::Lifetime(lifetime(input)?),
        NicotineMode::Target => NicotineResult::Target {
            volumes: target(input, unit)?,
        },
    };
    tracing::debug!(?mode, ?result, "nicotine calculated");
    Ok(result)
}

/// The two fields that survive between sessions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NicotineSettings {
    pub consumed_per_day: f64,
    pub consumed_concentration: f64,
}

impl NicotineSettings {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        Self {
            consumed_per_day: load_json(store, keys::CONSUMED_PER_DAY).unwrap_or(0.0),
            consumed_concentration: load_json(store, keys::CONSUMED_CONCENTRATION)
                .unwrap_or(0.0),
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        save_json(store, keys::CONSUMED_PER_DAY, &self.consumed_per_day)?;
        save_json(store, keys::CONSUMED_CONCENTRATION, &self.consumed_concentration)
    }

    /// Fresh input seeded with the persisted fields
    pub fn to_input(self) -> NicotineInput {
        NicotineInput {
            consumed_per_day: self.consumed_per_day,
            consumed_concentration: self.consumed_concentration,
            ..NicotineInput::default()
        }
    }
}

impl From<&NicotineInput> for NicotineSettings {
    fn from(input: &NicotineInput) -> Self {
        Self {
            consumed_per_day: input.consumed_per_day,
            consumed_concentration: input.consumed_concentration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn sample() -> NicotineInput {
        NicotineInput {
            consumed_per_day: 5.0,
            consumed_concentration: 3.0,
            base_concentration: 100.0,
            base_volume: 100.0,
            desired_supply_days: 365.0,
        }
    }

    #[test]
    fn test_lifetime_floors_days() {
        let result = lifetime(&NicotineInput {
            base_volume: 101.0,
            ..sample()
        })
        .unwrap();
        assert_eq!(result.daily_consumption_mg, 15.0);
        assert_eq!(result.total_supply_mg, 10100.0);
        // 10100 / 15 = 673.33
        assert_eq!(result.supply_duration_days, 673);
    }

    #[test]
    fn test_lifetime_zero_consumption_is_zero_days() {
        let result = lifetime(&NicotineInput {
            consumed_per_day: 0.0,
            ..sample()
        })
        .unwrap();
        assert_eq!(result.daily_consumption_mg, 0.0);
        assert_eq!(result.supply_duration_days, 0);
    }

    #[test]
    fn test_target_volumes_metric() {
        let volumes = target(&sample(), VolumeUnit::Metric).unwrap();
        let strengths: Vec<f64> = volumes.iter().map(|v| v.strength).collect();
        assert_eq!(strengths, REFERENCE_STRENGTHS.to_vec());
        // 15 mg/day * 365 days / 100 mg/mL
        assert!((volumes[2].volume - 54.75).abs() < 1e-9);
    }

    #[test]
    fn test_target_volumes_imperial() {
        let metric = target(&sample(), VolumeUnit::Imperial).unwrap();
        let expected = 15.0 * 365.0 / 250.0 * 0.033814;
        assert!((metric[3].volume - expected).abs() < 1e-4);
        assert_eq!(metric[3].unit, VolumeUnit::Imperial);
    }

    #[test]
    fn test_concentration_limit() {
        let err = lifetime(&NicotineInput {
            base_concentration: 1200.0,
            ..sample()
        })
        .unwrap_err();
        match err {
            CalcError::Invalid(errors) => assert!(errors.get("baseConcentration").is_some()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_settings_persist() {
        let mut store = MemoryStore::new();
        assert_eq!(NicotineSettings::load(&store), NicotineSettings::default());

        NicotineSettings::from(&sample()).save(&mut store).unwrap();
        let loaded = NicotineSettings::load(&store);
        assert_eq!(loaded.consumed_per_day, 5.0);
        assert_eq!(loaded.to_input().base_volume, 0.0);
    }

    #[test]
    fn test_calculate_dispatches_on_mode() {
        let result = calculate(&sample(), NicotineMode::Lifetime, VolumeUnit::Metric).unwrap();
        assert!(matches!(result, NicotineResult::Lifetime(_)));
        let result = calculate(&sample(), NicotineMode::Target, VolumeUnit::Metric).unwrap();
        assert!(matches!(result, NicotineResult::Target { ref volumes } if volumes.len() == 4));
    }
}
