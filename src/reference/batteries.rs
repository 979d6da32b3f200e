//! Li-ion cells with published continuous discharge ratings

use serde::Serialize;

use crate::error::{CalcError, CalcResult};

/// Fully charged li-ion cell voltage
pub const CELL_VOLTAGE: f64 = 4.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatterySpec {
    pub name: &'static str,
    pub capacity_mah: f64,
    /// Continuous discharge limit in amps
    pub current_limit: f64,
}

const fn cell(name: &'static str, capacity_mah: f64, current_limit: f64) -> BatterySpec {
    BatterySpec {
        name,
        capacity_mah,
        current_limit,
    }
}

pub static BATTERIES: &[BatterySpec] = &[
    cell("LG HG2", 3000.0, 20.0),
    cell("Molicel P26A", 2600.0, 35.0),
    cell("Molicel P28A", 2800.0, 35.0),
    cell("Molicel P42A", 4000.0, 30.0),
    cell("Sony VTC5", 2600.0, 20.0),
    cell("Sony VTC5A", 2500.0, 25.0),
    cell("Sony VTC5D", 2700.0, 25.0),
    cell("Sony VTC6", 3000.0, 15.0),
    cell("Samsung 20S", 2000.0, 30.0),
    cell("Samsung 25R", 2500.0, 20.0),
    cell("Samsung 30T", 3000.0, 35.0),
    cell("Samsung 30Q", 3000.0, 15.0),
    cell("Samsung 40T", 4000.0, 25.0),
];

/// Case-insensitive lookup by cell name
pub fn battery(name: &str) -> CalcResult<&'static BatterySpec> {
    BATTERIES
        .iter()
        .find(|b| b.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| CalcError::UnknownBattery(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let b = battery("samsung 30t").unwrap();
        assert_eq!(b.name, "Samsung 30T");
        assert_eq!(b.current_limit, 35.0);
    }

    #[test]
    fn test_unknown_battery() {
        assert!(matches!(battery("AA alkaline"), Err(CalcError::UnknownBattery(_))));
    }

    #[test]
    fn test_all_limits_positive() {
        assert!(BATTERIES.iter().all(|b| b.current_limit > 0.0 && b.capacity_mah > 0.0));
    }
}
