//! Rule evaluation
//!
//! Each rule evaluates independently per field, so a single payload can
//! raise several alarms at once (e.g. overvoltage on two phases).
//! Output order follows phase/field enumeration order: voltage A,B,C,
//! then current A,B,C.

use crate::thresholds::Thresholds;
use scgdi_model::{
    Domain, ElectricalPayload, EnvironmentPayload, MotorPayload, Severity, VibrationPayload,
};

/// One alarm decision: which variable tripped which rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    /// Name of the source variable, e.g. `VoltageB`
    pub source: &'static str,
    pub category: Domain,
    pub message: &'static str,
    pub severity: Severity,
}

/// Relative deviation of `value` from `nominal`
fn pct_over(value: f64, nominal: f64) -> f64 {
    (value - nominal) / nominal
}

pub fn evaluate_electrical(p: &ElectricalPayload, t: &Thresholds) -> Vec<Alarm> {
    let mut alarms = Vec::new();

    // Voltage: over OR under per phase, never both
    let voltages = [
        ("VoltageA", p.voltage.a),
        ("VoltageB", p.voltage.b),
        ("VoltageC", p.voltage.c),
    ];
    for (source, v) in voltages {
        let dev = pct_over(v, t.nominal_voltage);
        if dev > t.over_under_tol {
            alarms.push(Alarm {
                source,
                category: Domain::Electrical,
                message: "Overvoltage detected",
                severity: Severity::High,
            });
        } else if dev < -t.over_under_tol {
            alarms.push(Alarm {
                source,
                category: Domain::Electrical,
                message: "Undervoltage detected",
                severity: Severity::High,
            });
        }
    }

    // Current: over only, no undercurrent rule
    let currents = [
        ("CurrentA", p.current.a),
        ("CurrentB", p.current.b),
        ("CurrentC", p.current.c),
    ];
    for (source, i) in currents {
        if pct_over(i, t.nominal_current) > t.over_under_tol {
            alarms.push(Alarm {
                source,
                category: Domain::Electrical,
                message: "Overcurrent detected",
                severity: Severity::High,
            });
        }
    }

    alarms
}

pub fn evaluate_environment(p: &EnvironmentPayload, t: &Thresholds) -> Vec<Alarm> {
    let mut alarms = Vec::new();
    if p.case_temperature > t.case_temp_crit {
        alarms.push(Alarm {
            source: "CaseTemperature",
            category: Domain::Environment,
            message: "Case temperature critical",
            severity: Severity::Crit,
        });
    }
    alarms
}

pub fn evaluate_vibration(p: &VibrationPayload, t: &Thresholds) -> Vec<Alarm> {
    let mut alarms = Vec::new();
    // Attributed to the axial source regardless of which axis exceeded
    if p.axial.max(p.radial) > t.vibration_warn {
        alarms.push(Alarm {
            source: "Axial",
            category: Domain::Vibration,
            message: "Slight vibration increase",
            severity: Severity::Low,
        });
    }
    alarms
}

/// Evaluate all rules for one canonical payload
pub fn evaluate(payload: &MotorPayload, thresholds: &Thresholds) -> Vec<Alarm> {
    match payload {
        MotorPayload::Electrical(p) => evaluate_electrical(p, thresholds),
        MotorPayload::Environment(p) => evaluate_environment(p, thresholds),
        MotorPayload::Vibration(p) => evaluate_vibration(p, thresholds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scgdi_model::{EnergyTriple, PhaseValues, PowerTriple};

    fn electrical(voltage: PhaseValues, current: PhaseValues) -> ElectricalPayload {
        ElectricalPayload {
            timestamp: "2025-08-14T00:00:00Z".to_string(),
            voltage,
            current,
            power: PowerTriple::default(),
            energy: EnergyTriple::default(),
            power_factor: 0.95,
            frequency: 60.0,
        }
    }

    fn environment(case_temperature: f64) -> EnvironmentPayload {
        EnvironmentPayload {
            timestamp: "2025-08-14T00:00:00Z".to_string(),
            temperature: 30.0,
            humidity: 50.0,
            case_temperature,
        }
    }

    fn vibration(axial: f64, radial: f64) -> VibrationPayload {
        VibrationPayload {
            timestamp: "2025-08-14T00:00:00Z".to_string(),
            axial,
            radial,
        }
    }

    fn nominal(t: &Thresholds) -> PhaseValues {
        PhaseValues {
            a: t.nominal_voltage,
            b: t.nominal_voltage,
            c: t.nominal_voltage,
        }
    }

    #[test]
    fn voltage_boundary_is_exclusive() {
        let t = Thresholds::default();
        // exactly +10% and -10%: no alarm on either phase
        let at_bound = PhaseValues { a: 242.0, b: 198.0, c: 220.0 };
        let p = electrical(at_bound, nominal_current_phases());
        assert!(evaluate_electrical(&p, &t).is_empty());
    }

    fn nominal_current_phases() -> PhaseValues {
        PhaseValues { a: 10.0, b: 10.0, c: 10.0 }
    }

    #[test]
    fn overvoltage_just_past_bound_fires_once_per_phase() {
        let t = Thresholds::default();
        // 10.01% above 220 V
        let v = 220.0 * 1.1001;
        let p = electrical(PhaseValues { a: v, b: 220.0, c: 220.0 }, PhaseValues::default());
        let alarms = evaluate_electrical(&p, &t);
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].source, "VoltageA");
        assert_eq!(alarms[0].message, "Overvoltage detected");
        assert_eq!(alarms[0].severity, Severity::High);
    }

    #[test]
    fn undervoltage_just_past_bound() {
        let t = Thresholds::default();
        let v = 220.0 * 0.8999;
        let p = electrical(PhaseValues { a: 220.0, b: v, c: 220.0 }, PhaseValues::default());
        let alarms = evaluate_electrical(&p, &t);
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].source, "VoltageB");
        assert_eq!(alarms[0].message, "Undervoltage detected");
    }

    #[test]
    fn never_both_directions_on_one_phase() {
        let t = Thresholds::default();
        let p = electrical(PhaseValues { a: 300.0, b: 100.0, c: 220.0 }, PhaseValues::default());
        let alarms = evaluate_electrical(&p, &t);
        assert_eq!(alarms.len(), 2);
        assert_eq!(alarms[0].source, "VoltageA");
        assert_eq!(alarms[0].message, "Overvoltage detected");
        assert_eq!(alarms[1].source, "VoltageB");
        assert_eq!(alarms[1].message, "Undervoltage detected");
    }

    #[test]
    fn current_rule_is_asymmetric() {
        let t = Thresholds::default();
        // exactly +10%: no alarm
        let p = electrical(nominal(&t), PhaseValues { a: 11.0, b: 10.0, c: 10.0 });
        assert!(evaluate_electrical(&p, &t).is_empty());

        // 10.01% above: exactly one
        let p = electrical(nominal(&t), PhaseValues { a: 10.0 * 1.1001, b: 10.0, c: 10.0 });
        let alarms = evaluate_electrical(&p, &t);
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].message, "Overcurrent detected");

        // far below nominal: no undercurrent rule
        let p = electrical(nominal(&t), PhaseValues { a: 0.0, b: 0.0, c: 0.0 });
        assert!(evaluate_electrical(&p, &t).is_empty());
    }

    #[test]
    fn voltage_alarms_precede_current_alarms() {
        let t = Thresholds::default();
        let p = electrical(
            PhaseValues { a: 250.0, b: 220.0, c: 220.0 },
            PhaseValues { a: 10.0, b: 12.0, c: 10.0 },
        );
        let alarms = evaluate_electrical(&p, &t);
        assert_eq!(alarms.len(), 2);
        assert_eq!(alarms[0].source, "VoltageA");
        assert_eq!(alarms[1].source, "CurrentB");
    }

    #[test]
    fn case_temperature_boundary_is_exclusive() {
        let t = Thresholds::default();
        assert!(evaluate_environment(&environment(60.0), &t).is_empty());

        let alarms = evaluate_environment(&environment(60.01), &t);
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].source, "CaseTemperature");
        assert_eq!(alarms[0].message, "Case temperature critical");
        assert_eq!(alarms[0].severity, Severity::Crit);
        assert_eq!(alarms[0].category, Domain::Environment);
    }

    #[test]
    fn vibration_uses_max_axis_but_attributes_axial() {
        let t = Thresholds::default();
        // radial exceeds, axial does not: still attributed to Axial
        let alarms = evaluate_vibration(&vibration(0.19, 0.21), &t);
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].source, "Axial");
        assert_eq!(alarms[0].severity, Severity::Low);

        // both exactly at the bound: strict inequality, no alarm
        assert!(evaluate_vibration(&vibration(0.2, 0.2), &t).is_empty());
    }

    #[test]
    fn evaluate_dispatches_by_variant() {
        let t = Thresholds::default();
        let p = MotorPayload::Vibration(vibration(0.5, 0.1));
        let alarms = evaluate(&p, &t);
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].category, Domain::Vibration);
    }
}
