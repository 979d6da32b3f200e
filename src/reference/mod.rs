//! Reference Tables
//!
//! Read-only data shared by every calculator:
//! - Resistance wire alloys (resistivity, density, specific heat)
//! - AWG copper wire sizes (diameter, resistance per metre)
//! - Common 18650/21700 cells (capacity, continuous discharge limit)
//!
//! The tables are built once per process and handed out as `&'static`
//! references; nothing mutates them after start-up.

pub mod batteries;
pub mod materials;
pub mod wires;

pub use batteries::*;
pub use materials::*;
pub use wires::*;
