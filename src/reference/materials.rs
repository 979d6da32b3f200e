//! Resistance wire alloys

use serde::Serialize;

use crate::error::{CalcError, CalcResult};

/// Electrical and thermal data for one alloy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaterialSpec {
    pub id: &'static str,
    pub name: &'static str,
    /// Resistivity in ohm mm^2 / m (numerically micro-ohm metres)
    pub resistivity: f64,
    /// g/cm^3
    pub density: f64,
    /// J/(g K)
    pub heat_capacity: f64,
}

pub static MATERIALS: &[MaterialSpec] = &[
    MaterialSpec {
        id: "kanthal_a1",
        name: "Kanthal A1",
        resistivity: 1.45,
        density: 7.1,
        heat_capacity: 0.46,
    },
    MaterialSpec {
        id: "ni80",
        name: "Nichrome 80",
        resistivity: 1.09,
        density: 8.31,
        heat_capacity: 0.45,
    },
    MaterialSpec {
        id: "ss304",
        name: "Stainless Steel 304",
        resistivity: 0.72,
        density: 7.93,
        heat_capacity: 0.5,
    },
    MaterialSpec {
        id: "ss316l",
        name: "Stainless Steel 316L",
        resistivity: 0.75,
        density: 8.0,
        heat_capacity: 0.5,
    },
    MaterialSpec {
        id: "ss317l",
        name: "Stainless Steel 317L",
        resistivity: 0.79,
        density: 8.0,
        heat_capacity: 0.5,
    },
    MaterialSpec {
        id: "ss430",
        name: "Stainless Steel 430",
        resistivity: 0.6,
        density: 7.74,
        heat_capacity: 0.46,
    },
    MaterialSpec {
        id: "ni200",
        name: "Nickel 200",
        resistivity: 0.096,
        density: 8.89,
        heat_capacity: 0.456,
    },
    MaterialSpec {
        id: "ti1",
        name: "Titanium Grade 1",
        resistivity: 0.45,
        density: 4.51,
        heat_capacity: 0.52,
    },
];

/// Look up an alloy by id. An unknown id is an input error, never defaulted.
pub fn material(id: &str) -> CalcResult<&'static MaterialSpec> {
    MATERIALS
        .iter()
        .find(|m| m.id == id)
        .ok_or_else(|| CalcError::UnknownMaterial(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        for (i, a) in MATERIALS.iter().enumerate() {
            assert!(
                MATERIALS[i + 1..].iter().all(|b| b.id != a.id),
                "duplicate material id {}",
                a.id
            );
        }
    }

    #[test]
    fn test_lookup() {
        let ss = material("ss316l").unwrap();
        assert_eq!(ss.name, "Stainless Steel 316L");
        assert_eq!(ss.resistivity, 0.75);
    }

    #[test]
    fn test_unknown_material() {
        assert_eq!(
            material("unobtainium"),
            Err(CalcError::UnknownMaterial("unobtainium".to_string()))
        );
    }

    #[test]
    fn test_nickel_is_far_less_resistive_than_kanthal() {
        let ni = material("ni200").unwrap();
        let ka = material("kanthal_a1").unwrap();
        assert!(ni.resistivity * 10.0 < ka.resistivity);
    }
}
