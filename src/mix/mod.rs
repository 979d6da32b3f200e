//! E-liquid mix calculator
//!
//! Splits a batch into flavors, nicotine base, VG and PG by sequential budget
//! deduction. The order is significant and fixed:
//! 1. Flavors, in list order, all counted as PG
//! 2. Nicotine base, split into its own VG and PG shares
//! 3. Whatever VG/PG budget is left goes to plain VG and PG
//!
//! A request that does not fit the budget is rejected, never renormalised.

use serde::Serialize;
use thiserror::Error;

use crate::error::{CalcError, CalcResult};
use crate::store::{KeyValueStore, StoreError};
use crate::validate::FieldErrors;

pub mod flavors;
pub mod presets;

pub use flavors::{FlavorEntry, FlavorList};
pub use presets::{LegacyMixSettings, MixPreset, PresetBook, PresetError};

/// Densities in g/mL
pub mod density {
    pub const VG: f64 = 1.26;
    pub const PG: f64 = 1.04;
    pub const VG_NIC: f64 = 1.235;
    pub const PG_NIC: f64 = 1.035;
}

pub const TOTAL_ROW: &str = "Total";

const MAX_BATCH_ML: f64 = 10_000.0;
const MAX_STRENGTH: f64 = 1000.0;
// Budget residue below this is floating-point noise, not an ingredient.
const BUDGET_EPSILON: f64 = 1e-9;

/// One row of the recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixItem {
    pub name: String,
    /// Percent of batch volume
    pub pct: f64,
    /// mL
    pub volume: f64,
    /// g
    pub mass: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixResult {
    /// Nicotine, VG, PG, flavors in list order, then the Total row
    pub items: Vec<MixItem>,
}

impl MixResult {
    /// Every row except Total
    pub fn ingredients(&self) -> impl Iterator<Item = &MixItem> {
        self.items.iter().filter(|i| i.name != TOTAL_ROW)
    }

    pub fn total(&self) -> Option<&MixItem> {
        self.items.iter().find(|i| i.name == TOTAL_ROW)
    }

    pub fn get(&self, name: &str) -> Option<&MixItem> {
        self.items.iter().find(|i| i.name == name)
    }
}

fn validate(preset: &MixPreset, flavors: &[FlavorEntry]) -> CalcResult<()> {
    let mut errors = FieldErrors::new();
    errors.positive("batchMl", preset.batch_ml, "Batch size must be greater than zero.");
    errors.at_most(
        "batchMl",
        preset.batch_ml,
        MAX_BATCH_ML,
        "Batch size must be at most 10000 mL.",
    );
    if !preset.max_vg {
        errors.percent("batchVg", preset.batch_vg);
    }
    if preset.use_nic {
        errors.positive(
            "nicBaseStrength",
            preset.nic_base_strength,
            "Nicotine base strength must be greater than zero.",
        );
        errors.at_most(
            "nicBaseStrength",
            preset.nic_base_strength,
            MAX_STRENGTH,
            "Nicotine base strength must be at most 1000 mg/mL.",
        );
        errors.within("nicBatchStrength", preset.nic_batch_strength, 0.0, MAX_STRENGTH);
        errors.percent("nicBaseVg", preset.nic_base_vg);
    }
    for flavor in flavors {
        errors.percent("flavors", flavor.pct);
    }
    let flavor_total: f64 = flavors.iter().map(|f| f.pct).sum();
    if flavor_total > 100.0 {
        errors.push("flavors", "Flavors cannot exceed 100% of the batch.");
    }
    errors.finish()
}

/// Compute the recipe for `preset` with the given flavors.
pub fn calculate(preset: &MixPreset, flavors: &[FlavorEntry]) -> CalcResult<MixResult> {
    validate(preset, flavors)?;

    let batch_ml = preset.batch_ml;
    let mut total_pg = 0.0;
    let mut total_vg = 0.0;
    let mut total_mass = 0.0;

    let mut flavor_items = Vec::with_capacity(flavors.len());
    for flavor in flavors {
        let pct = flavor.pct / 100.0;
        let volume = pct * batch_ml;
        let mass = volume * density::PG;

        total_pg += pct;
        total_mass += mass;

        flavor_items.push(MixItem {
            name: flavor.label(),
            pct: flavor.pct,
            volume,
            mass,
        });
    }

    let mut items = Vec::with_capacity(flavor_items.len() + 4);
    if preset.use_nic {
        let nic_ml = preset.nic_batch_strength * batch_ml / preset.nic_base_strength;
        if nic_ml > batch_ml {
            tracing::warn!(nic_ml, batch_ml, "nicotine base exceeds batch volume");
            return Err(CalcError::constraint(
                "nicBatchStrength",
                "The desired nicotine strength is too high.",
            ));
        }

        let nic_factor = nic_ml / batch_ml;
        let nic_vg = preset.nic_base_vg / 100.0;
        let nic_pg = 1.0 - nic_vg;
        let nic_density = nic_vg * density::VG_NIC + nic_pg * density::PG_NIC;
        let mass = nic_ml * nic_density;

        total_vg += nic_vg * nic_factor;
        total_pg += nic_pg * nic_factor;
        total_mass += mass;

        items.push(MixItem {
            name: format!("{}mg/mL Nicotine Base", preset.nic_base_strength),
            pct: nic_factor * 100.0,
            volume: nic_ml,
            mass,
        });
    }

    let (batch_vg, batch_pg) = if preset.max_vg {
        (1.0 - total_pg - total_vg, 0.0)
    } else {
        let desired_vg = preset.batch_vg / 100.0;
        (desired_vg - total_vg, 1.0 - desired_vg - total_pg)
    };

    if total_vg > batch_vg || batch_pg < -BUDGET_EPSILON {
        tracing::warn!(total_vg, batch_vg, batch_pg, "VG/PG ratio out of budget");
        return Err(CalcError::constraint(
            "batchVg",
            "The selected VG/PG ratio cannot be achieved for this mix.",
        ));
    }

    if batch_vg > BUDGET_EPSILON {
        let volume = batch_vg * batch_ml;
        let mass = volume * density::VG;
        total_mass += mass;
        items.push(MixItem {
            name: "VG".to_string(),
            pct: batch_vg * 100.0,
            volume,
            mass,
        });
    }
    if batch_pg > BUDGET_EPSILON {
        let volume = batch_pg * batch_ml;
        let mass = volume * density::PG;
        total_mass += mass;
        items.push(MixItem {
            name: "PG".to_string(),
            pct: batch_pg * 100.0,
            volume,
            mass,
        });
    }

    items.extend(flavor_items);
    items.push(MixItem {
        name: TOTAL_ROW.to_string(),
        pct: 100.0,
        volume: batch_ml,
        mass: total_mass,
    });

    tracing::debug!(preset = %preset.name, rows = items.len(), total_mass, "mix calculated");
    Ok(MixResult { items })
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Calc(#[from] CalcError),
    #[error(transparent)]
    Preset(#[from] PresetError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Presets plus the flavors being worked on
#[derive(Debug, Clone, Default)]
pub struct MixSession {
    pub presets: PresetBook,
    pub flavors: FlavorList,
}

impl MixSession {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        Self {
            presets: PresetBook::load(store),
            flavors: FlavorList::new(),
        }
    }

    /// Recipe for the current preset, without touching the store
    pub fn preview(&self) -> CalcResult<MixResult> {
        calculate(self.presets.current(), self.flavors.entries())
    }

    /// Calculate with `edited` field values for the current preset. On success
    /// the values are written into the book and the book is persisted; on
    /// failure neither the book nor the store changes.
    pub fn submit<S: KeyValueStore + ?Sized>(
        &mut self,
        edited: MixPreset,
        store: &mut S,
    ) -> Result<MixResult, SessionError> {
        let edited = MixPreset {
            id: self.presets.current_id(),
            ..edited
        };
        let result = calculate(&edited, self.flavors.entries())?;
        self.presets.update(edited)?;
        self.presets.save(store)?;
        Ok(result)
    }
}
