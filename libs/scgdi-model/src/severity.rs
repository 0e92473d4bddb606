//! Event severity levels
//!
//! Ordinals follow the OPC UA severity convention:
//! INFO=100, LOW=250, MED=500, HIGH=700, CRIT=900.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Low,
    Med,
    High,
    Crit,
}

impl Severity {
    /// Numeric ordinal carried on the wire and in event_history
    pub fn value(&self) -> u16 {
        match self {
            Severity::Info => 100,
            Severity::Low => 250,
            Severity::Med => 500,
            Severity::High => 700,
            Severity::Crit => 900,
        }
    }

    pub fn from_value(value: u16) -> Option<Severity> {
        match value {
            100 => Some(Severity::Info),
            250 => Some(Severity::Low),
            500 => Some(Severity::Med),
            700 => Some(Severity::High),
            900 => Some(Severity::Crit),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Low => "LOW",
            Severity::Med => "MED",
            Severity::High => "HIGH",
            Severity::Crit => "CRIT",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
