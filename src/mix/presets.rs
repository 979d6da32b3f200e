//! Mix presets - named batch configurations kept in the settings store
//!
//! The book is a plain vector plus the index of the current preset. It is
//! never empty: loading an empty or missing collection yields the default
//! preset, and removing the last remaining preset is refused.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::store::{keys, load_json, save_json, KeyValueStore, StoreError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PresetError {
    #[error("preset {0} not found")]
    NotFound(Uuid),
    #[error("preset name cannot be blank")]
    BlankName,
    #[error("cannot remove the last preset")]
    LastPreset,
}

/// One saved batch configuration. Ratios are whole percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixPreset {
    pub id: Uuid,
    pub name: String,
    pub use_nic: bool,
    /// mg/mL of the nicotine base
    pub nic_base_strength: f64,
    /// VG share of the nicotine base, percent
    pub nic_base_vg: f64,
    /// mg/mL wanted in the finished batch
    pub nic_batch_strength: f64,
    /// Fill with VG only, ignoring `batch_vg`
    pub max_vg: bool,
    /// VG share of the finished batch, percent
    pub batch_vg: f64,
    pub batch_ml: f64,
}

impl MixPreset {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            ..Self::from(LegacyMixSettings::default())
        }
    }
}

impl Default for MixPreset {
    fn default() -> Self {
        Self::named("Default")
    }
}

/// Shape of the single `mixSettings` record written before presets existed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMixSettings {
    pub use_nic: bool,
    pub nic_base_strength: f64,
    pub nic_base_vg: f64,
    pub nic_batch_strength: f64,
    pub max_vg: bool,
    pub batch_vg: f64,
    pub batch_ml: f64,
}

impl Default for LegacyMixSettings {
    fn default() -> Self {
        Self {
            use_nic: false,
            nic_base_strength: 100.0,
            nic_base_vg: 50.0,
            nic_batch_strength: 3.0,
            max_vg: false,
            batch_vg: 50.0,
            batch_ml: 30.0,
        }
    }
}

impl From<LegacyMixSettings> for MixPreset {
    fn from(s: LegacyMixSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "Default".to_string(),
            use_nic: s.use_nic,
            nic_base_strength: s.nic_base_strength,
            nic_base_vg: s.nic_base_vg,
            nic_batch_strength: s.nic_batch_strength,
            max_vg: s.max_vg,
            batch_vg: s.batch_vg,
            batch_ml: s.batch_ml,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresetBook {
    presets: Vec<MixPreset>,
    current: usize,
}

impl Default for PresetBook {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetBook {
    /// A book holding only the default preset
    pub fn new() -> Self {
        Self {
            presets: vec![MixPreset::default()],
            current: 0,
        }
    }

    /// Build from an existing collection; `None` if it is empty.
    pub fn from_presets(presets: Vec<MixPreset>, current: Option<Uuid>) -> Option<Self> {
        if presets.is_empty() {
            return None;
        }
        let current = current
            .and_then(|id| presets.iter().position(|p| p.id == id))
            .unwrap_or(0);
        Some(Self { presets, current })
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let presets: Vec<MixPreset> = load_json(store, keys::MIX_PRESETS)
            .filter(|p: &Vec<MixPreset>| !p.is_empty())
            .or_else(|| {
                load_json::<LegacyMixSettings, _>(store, keys::MIX_SETTINGS).map(|legacy| {
                    tracing::info!("migrating legacy mix settings into a preset");
                    vec![MixPreset::from(legacy)]
                })
            })
            .unwrap_or_else(|| vec![MixPreset::default()]);

        let stored_id: Option<Uuid> = load_json(store, keys::MIX_PRESET_ID);
        if let Some(id) = stored_id {
            if !presets.iter().any(|p| p.id == id) {
                tracing::warn!(%id, "stored preset id does not exist, selecting the first preset");
            }
        }

        Self::from_presets(presets, stored_id).unwrap_or_default()
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        save_json(store, keys::MIX_PRESETS, &self.presets)?;
        save_json(store, keys::MIX_PRESET_ID, &self.current_id())
    }

    pub fn presets(&self) -> &[MixPreset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn current(&self) -> &MixPreset {
        &self.presets[self.current]
    }

    pub fn current_id(&self) -> Uuid {
        self.current().id
    }

    pub fn get(&self, id: Uuid) -> Option<&MixPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    fn position(&self, id: Uuid) -> Result<usize, PresetError> {
        self.presets
            .iter()
            .position(|p| p.id == id)
            .ok_or(PresetError::NotFound(id))
    }

    pub fn select(&mut self, id: Uuid) -> Result<(), PresetError> {
        self.current = self.position(id)?;
        Ok(())
    }

    /// Replace the preset with the same id, in place
    pub fn update(&mut self, preset: MixPreset) -> Result<(), PresetError> {
        if preset.name.trim().is_empty() {
            return Err(PresetError::BlankName);
        }
        let idx = self.position(preset.id)?;
        self.presets[idx] = preset;
        Ok(())
    }

    /// Copy the current preset under a new id and name, and select the copy.
    pub fn duplicate_current(&mut self, name: &str) -> Result<Uuid, PresetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PresetError::BlankName);
        }
        let copy = MixPreset {
            id: Uuid::new_v4(),
            name: name.to_string(),
            ..self.current().clone()
        };
        let id = copy.id;
        self.presets.push(copy);
        self.current = self.presets.len() - 1;
        Ok(id)
    }

    pub fn rename_current(&mut self, name: &str) -> Result<(), PresetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PresetError::BlankName);
        }
        self.presets[self.current].name = name.to_string();
        Ok(())
    }

    /// Remove a preset. The current selection follows the preset it pointed
    /// at, or falls back to the first preset if that one was removed.
    pub fn remove(&mut self, id: Uuid) -> Result<MixPreset, PresetError> {
        let idx = self.position(id)?;
        if self.presets.len() == 1 {
            return Err(PresetError::LastPreset);
        }
        let removed = self.presets.remove(idx);
        if idx == self.current {
            self.current = 0;
        } else if idx < self.current {
            self.current -= 1;
        }
        Ok(removed)
    }

    pub fn remove_current(&mut self) -> Result<MixPreset, PresetError> {
        self.remove(self.current_id())
    }
}
