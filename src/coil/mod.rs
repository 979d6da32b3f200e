//! Coil resistance from wire geometry
//!
//! Works in millimetres throughout; only the final resistance is normalised
//! from ohm mm^2/m * mm / mm^2 to ohms.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::CalcResult;
use crate::reference::{material, THICKEST_GAUGE, THINNEST_GAUGE};
use crate::units::awg_to_mm;
use crate::validate::FieldErrors;

/// Gap left between adjacent wraps, mm
pub const WRAP_SPACING: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoilType {
    #[default]
    Single,
    /// Core wire spiralled with a thinner wrap wire
    Clapton,
}

impl std::fmt::Display for CoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoilType::Single => write!(f, "Single"),
            CoilType::Clapton => write!(f, "Clapton"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoilInput {
    pub coil_type: CoilType,
    /// Parallel strands of core wire
    pub strands: u32,
    pub wraps: f64,
    pub core_gauge: i32,
    /// Only read for Clapton coils
    pub clapton_gauge: i32,
    pub inner_diameter_mm: f64,
    pub leg_length_mm: f64,
    pub material: String,
}

impl Default for CoilInput {
    fn default() -> Self {
        Self {
            coil_type: CoilType::Single,
            strands: 1,
            wraps: 5.0,
            core_gauge: 30,
            clapton_gauge: 40,
            inner_diameter_mm: 3.0,
            leg_length_mm: 5.0,
            material: "ss316l".to_string(),
        }
    }
}

impl CoilInput {
    pub fn validate(&self) -> CalcResult<()> {
        let mut errors = FieldErrors::new();
        if self.strands < 1 {
            errors.push("strands", "Strands cannot be less than one.");
        }
        errors.at_least("wraps", self.wraps, 1.0, "Wraps cannot be less than one.");
        errors.positive(
            "innerDiameter",
            self.inner_diameter_mm,
            "Inner diameter must be greater than zero.",
        );
        errors.at_least(
            "legLength",
            self.leg_length_mm,
            0.0,
            "Leg length cannot be negative.",
        );
        let gauges = THICKEST_GAUGE..=THINNEST_GAUGE;
        if !gauges.contains(&self.core_gauge) {
            errors.push("coreWireGauge", "Gauge must be between 0 and 40.");
        }
        if self.coil_type == CoilType::Clapton && !gauges.contains(&self.clapton_gauge) {
            errors.push("claptonWireGauge", "Gauge must be between 0 and 40.");
        }
        errors.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoilResult {
    /// Effective core diameter (includes the wrap layer for Clapton), mm
    pub wire_diameter: f64,
    pub inner_diameter: f64,
    /// Rounded to 0.01 mm
    pub outer_diameter: f64,
    /// Total wire length including both legs, mm
    pub length: f64,
    /// mm^2
    pub cross_section_area: f64,
    /// mm^2
    pub surface_area: f64,
    /// Ohms per metre
    pub resistivity_per_unit_length: f64,
    pub resistance: f64,
}

/// Wire needed for `wraps` turns around a former plus the legs.
///
/// Each turn is the hypotenuse of the axial advance (wire width plus spacing)
/// and the circumference at the outer diameter.
pub fn coil_length(
    outer_diameter: f64,
    core_diameter: f64,
    strands: f64,
    wraps: f64,
    leg_length: f64,
) -> f64 {
    let circumference = PI * outer_diameter;
    let wrap_width = core_diameter * strands + WRAP_SPACING;
    let wrap_length = wrap_width.hypot(circumference);
    wrap_length * wraps + leg_length
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn calculate(input: &CoilInput) -> CalcResult<CoilResult> {
    input.validate()?;
    let alloy = material(&input.material)?;

    let strands = input.strands as f64;
    let clapton_diameter = awg_to_mm(input.clapton_gauge);
    let mut core_diameter = awg_to_mm(input.core_gauge);
    if input.coil_type == CoilType::Clapton {
        core_diameter += 2.0 * clapton_diameter;
    }

    let outer_diameter = round2(input.inner_diameter_mm + 2.0 * core_diameter);
    let length = coil_length(
        outer_diameter,
        core_diameter,
        strands,
        input.wraps,
        input.leg_length_mm,
    );

    let mut cross_section_area = PI * (core_diameter / 2.0).powi(2) * strands;
    let mut surface_area = PI * length * core_diameter;
    if input.coil_type == CoilType::Clapton {
        cross_section_area += PI * (clapton_diameter / 2.0).powi(2);

        let clapton_wraps = length * core_diameter;
        let clapton_length = coil_length(core_diameter, clapton_diameter, 1.0, clapton_wraps, 0.0);
        surface_area += PI * clapton_length * clapton_diameter;
    }

    let resistivity_per_unit_length = alloy.resistivity / cross_section_area;
    let resistance = resistivity_per_unit_length * length / 1e3;

    let result = CoilResult {
        wire_diameter: core_diameter,
        inner_diameter: input.inner_diameter_mm,
        outer_diameter,
        length,
        cross_section_area,
        surface_area,
        resistivity_per_unit_length,
        resistance,
    };
    tracing::debug!(coil_type = %input.coil_type, material = alloy.id, resistance, "coil calculated");
    Ok(result)
}
