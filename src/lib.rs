//! Vaping calculators
//!
//! Each calculator validates its inputs into [`validate::FieldErrors`], runs a
//! pure computation and returns either a result record or a [`CalcError`].
//! Settings that outlive a session go through an injected
//! [`store::KeyValueStore`]; nothing here touches ambient state.

pub mod base;
pub mod battery;
pub mod coil;
pub mod config;
pub mod cost;
pub mod curve;
pub mod error;
pub mod logging;
pub mod mix;
pub mod nicotine;
pub mod reference;
pub mod spool;
pub mod store;
pub mod units;
pub mod validate;
pub mod wiring;

pub use error::{CalcError, CalcResult};
