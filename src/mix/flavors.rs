//! Flavor list for one mixing session (not persisted)

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorEntry {
    pub id: Uuid,
    pub vendor: String,
    pub flavor: String,
    /// Percent of the batch volume, 0..=100
    pub pct: f64,
}

impl FlavorEntry {
    pub fn new(vendor: impl Into<String>, flavor: impl Into<String>, pct: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            vendor: vendor.into(),
            flavor: flavor.into(),
            pct,
        }
    }

    /// "Vendor Flavor", as shown in the result table
    pub fn label(&self) -> String {
        format!("{} {}", self.vendor, self.flavor).trim().to_string()
    }
}

/// Parses `vendor:flavor:pct`, e.g. `CAP:Sweet Strawberry:4.5`
impl FromStr for FlavorEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(2, ':');
        let pct = parts
            .next()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .ok_or_else(|| format!("'{}' should end in ':<percent>'", s))?;
        let rest = parts
            .next()
            .ok_or_else(|| format!("'{}' should look like vendor:flavor:percent", s))?;
        let (vendor, flavor) = rest.split_once(':').unwrap_or(("", rest));
        if flavor.trim().is_empty() {
            return Err(format!("'{}' has no flavor name", s));
        }
        Ok(FlavorEntry::new(vendor.trim(), flavor.trim(), pct))
    }
}

/// Ordered flavor entries; order is the order rows appear in the result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlavorList {
    entries: Vec<FlavorEntry>,
}

impl FlavorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: FlavorEntry) -> Uuid {
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    pub fn remove(&mut self, id: Uuid) -> Option<FlavorEntry> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx))
    }

    pub fn entries(&self) -> &[FlavorEntry] {
        &self.entries
    }

    /// Combined flavor load, percent of batch
    pub fn total_pct(&self) -> f64 {
        self.entries.iter().map(|e| e.pct).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl FromIterator<FlavorEntry> for FlavorList {
    fn from_iter<I: IntoIterator<Item = FlavorEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
