//! SCGDI Rules - Threshold alarm evaluation
//!
//! Pure, stateless rule functions mapping a canonical payload plus the
//! nominal/threshold configuration to zero or more alarm decisions.
//! No hysteresis: every evaluation looks only at the payload in hand.

mod evaluator;
mod thresholds;

pub use evaluator::{evaluate, evaluate_electrical, evaluate_environment, evaluate_vibration, Alarm};
pub use thresholds::Thresholds;
