//! Wire left on a spool, from its weight

use serde::{Deserialize, Serialize};
use uom::si::f64::{Length, Mass, MassDensity, Volume};
use uom::si::length::{meter, millimeter};
use uom::si::mass::gram;
use uom::si::mass_density::gram_per_cubic_centimeter;
use uom::si::volume::cubic_centimeter;

use crate::error::CalcResult;
use crate::reference::material;
use crate::units::{awg_to_mm, round_wire_area};
use crate::validate::FieldErrors;

/// Range of gauges sold on spools for coil building
pub const SPOOL_GAUGES: std::ops::RangeInclusive<i32> = 8..=40;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpoolInput {
    pub material: String,
    pub gauge: i32,
    pub empty_mass_g: f64,
    pub current_mass_g: f64,
}

impl Default for SpoolInput {
    fn default() -> Self {
        Self {
            material: "ss316l".to_string(),
            gauge: 26,
            empty_mass_g: 0.0,
            current_mass_g: 0.0,
        }
    }
}

impl SpoolInput {
    pub fn validate(&self) -> CalcResult<()> {
        let mut errors = FieldErrors::new();
        if !SPOOL_GAUGES.contains(&self.gauge) {
            errors.push("gauge", "Gauge must be between 8 and 40.");
        }
        errors.at_least(
            "emptyMass",
            self.empty_mass_g,
            0.0,
            "Spool mass cannot be negative.",
        );
        if errors.number("currentMass", self.current_mass_g)
            && self.current_mass_g < self.empty_mass_g
        {
            errors.push(
                "currentMass",
                "Current mass cannot be less than the empty spool.",
            );
        }
        errors.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpoolResult {
    pub wire_mass_g: f64,
    pub wire_volume_cm3: f64,
    pub wire_length_m: f64,
}

pub fn calculate(input: &SpoolInput) -> CalcResult<SpoolResult> {
    input.validate()?;
    let alloy = material(&input.material)?;

    let wire_mass = Mass::new::<gram>(input.current_mass_g - input.empty_mass_g);
    let density = MassDensity::new::<gram_per_cubic_centimeter>(alloy.density);
    let wire_volume: Volume = wire_mass / density;

    let section = round_wire_area(Length::new::<millimeter>(awg_to_mm(input.gauge)));
    let wire_length: Length = wire_volume / section;

    let result = SpoolResult {
        wire_mass_g: wire_mass.get::<gram>(),
        wire_volume_cm3: wire_volume.get::<cubic_centimeter>(),
        wire_length_m: wire_length.get::<meter>(),
    };
    tracing::debug!(
        material = alloy.id,
        gauge = input.gauge,
        length_m = result.wire_length_m,
        "spool calculated"
    );
    Ok(result)
}
