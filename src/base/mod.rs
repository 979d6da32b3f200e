//! How long stocks of VG and PG last at a given daily use

use serde::{Deserialize, Serialize};

use crate::error::CalcResult;
use crate::store::{keys, load_json, save_json, KeyValueStore, StoreError};
use crate::validate::FieldErrors;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseInput {
    /// mL of e-liquid per day
    pub consumed_per_day: f64,
    /// VG share of the e-liquid, percent
    pub vg_ratio: f64,
    pub vg_volume: f64,
    pub pg_volume: f64,
}

impl Default for BaseInput {
    fn default() -> Self {
        Self {
            consumed_per_day: 0.0,
            vg_ratio: 80.0,
            vg_volume: 0.0,
            pg_volume: 0.0,
        }
    }
}

impl BaseInput {
    pub fn validate(&self) -> CalcResult<()> {
        let mut errors = FieldErrors::new();
        errors.at_least(
            "consumedPerDay",
            self.consumed_per_day,
            0.0,
            "Daily consumption cannot be negative.",
        );
        errors.percent("vgRatio", self.vg_ratio);
        errors.positive("vgVolume", self.vg_volume, "VG volume must be greater than zero.");
        errors.positive("pgVolume", self.pg_volume, "PG volume must be greater than zero.");
        errors.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseResult {
    pub vg_per_day: f64,
    pub pg_per_day: f64,
    /// 0 when no VG is used
    pub vg_days: f64,
    /// 0 when no PG is used
    pub pg_days: f64,
}

fn days(stock: f64, per_day: f64) -> f64 {
    if per_day > 0.0 {
        stock / per_day
    } else {
        0.0
    }
}

pub fn calculate(input: &BaseInput) -> CalcResult<BaseResult> {
    input.validate()?;

    let vg_per_day = input.consumed_per_day * input.vg_ratio / 100.0;
    let pg_per_day = input.consumed_per_day * (100.0 - input.vg_ratio) / 100.0;
    let result = BaseResult {
        vg_per_day,
        pg_per_day,
        vg_days: days(input.vg_volume, vg_per_day),
        pg_days: days(input.pg_volume, pg_per_day),
    };
    tracing::debug!(?result, "base lifetime calculated");
    Ok(result)
}

/// Fields kept between sessions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseSettings {
    pub consumed_per_day: f64,
    pub vg_ratio: f64,
}

impl Default for BaseSettings {
    fn default() -> Self {
        Self {
            consumed_per_day: 0.0,
            vg_ratio: 80.0,
        }
    }
}

impl BaseSettings {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let defaults = Self::default();
        Self {
            consumed_per_day: load_json(store, keys::CONSUMED_PER_DAY)
                .unwrap_or(defaults.consumed_per_day),
            vg_ratio: load_json(store, keys::VG_RATIO).unwrap_or(defaults.vg_ratio),
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        save_json(store, keys::CONSUMED_PER_DAY, &self.consumed_per_day)?;
        save_json(store, keys::VG_RATIO, &self.vg_ratio)
    }

    pub fn to_input(self) -> BaseInput {
        BaseInput {
            consumed_per_day: self.consumed_per_day,
            vg_ratio: self.vg_ratio,
            ..BaseInput::default()
        }
    }
}

impl From<&BaseInput> for BaseSettings {
    fn from(input: &BaseInput) -> Self {
        Self {
            consumed_per_day: input.consumed_per_day,
            vg_ratio: input.vg_ratio,
        }
    }
}
