//! Cold ship to main engine: the full dead-ship startup.
//!
//! The standard training catalog: ten machinery systems from emergency
//! generator to main engine, and a five-phase procedure from dead-ship
//! verification to the main engine turning under its own power. Durations
//! are real-time seconds; dependency chains follow normal engine-room
//! practice (power before auxiliaries, lubrication and turning gear
//! before the main engine).

use crate::assessment::MistakeSeverity;
use crate::config::SessionConfig;
use crate::engine::plant::{SystemParameters, SystemSpec};
use crate::engine::procedure::{PhaseSpec, StepSpec};
use crate::engine::StartupEngine;
use crate::error::EngineResult;

fn system(
    id: &str,
    name: &str,
    dependencies: &[&str],
    base_duration_secs: f64,
    rated: SystemParameters,
) -> SystemSpec {
    SystemSpec {
        id: id.to_string(),
        name: name.to_string(),
        dependencies: dependencies.iter().map(ToString::to_string).collect(),
        base_duration_secs,
        baseline: SystemParameters {
            temperature_c: 20.0,
            ..SystemParameters::default()
        },
        rated,
    }
}

/// The machinery plant for the cold-ship startup.
#[must_use]
pub fn systems() -> Vec<SystemSpec> {
    vec![
        system(
            "emergency-generator",
            "Emergency Generator",
            &[],
            120.0,
            SystemParameters {
                rpm: 1800.0,
                pressure_bar: 4.0,
                temperature_c: 75.0,
                voltage: 440.0,
                frequency_hz: 60.0,
            },
        ),
        system(
            "diesel-generator-1",
            "Diesel Generator No.1",
            &["emergency-generator"],
            300.0,
            SystemParameters {
                rpm: 720.0,
                pressure_bar: 8.0,
                temperature_c: 85.0,
                voltage: 440.0,
                frequency_hz: 60.0,
            },
        ),
        system(
            "diesel-generator-2",
            "Diesel Generator No.2",
            &["emergency-generator"],
            300.0,
            SystemParameters {
                rpm: 720.0,
                pressure_bar: 8.0,
                temperature_c: 85.0,
                voltage: 440.0,
                frequency_hz: 60.0,
            },
        ),
        system(
            "seawater-cooling",
            "Seawater Cooling",
            &["diesel-generator-1"],
            90.0,
            SystemParameters {
                rpm: 1150.0,
                pressure_bar: 2.5,
                temperature_c: 25.0,
                voltage: 440.0,
                frequency_hz: 60.0,
            },
        ),
        system(
            "freshwater-cooling",
            "Freshwater Cooling",
            &["seawater-cooling"],
            120.0,
            SystemParameters {
                rpm: 1750.0,
                pressure_bar: 3.0,
                temperature_c: 80.0,
                voltage: 440.0,
                frequency_hz: 60.0,
            },
        ),
        system(
            "lubrication",
            "Main Lubricating Oil",
            &["diesel-generator-1"],
            150.0,
            SystemParameters {
                rpm: 1150.0,
                pressure_bar: 4.5,
                temperature_c: 45.0,
                voltage: 440.0,
                frequency_hz: 60.0,
            },
        ),
        system(
            "compressed-air",
            "Starting Air",
            &["diesel-generator-1"],
            600.0,
            SystemParameters {
                rpm: 980.0,
                pressure_bar: 30.0,
                temperature_c: 40.0,
                voltage: 440.0,
                frequency_hz: 60.0,
            },
        ),
        system(
            "fuel-system",
            "Fuel Oil Service",
            &["diesel-generator-1"],
            240.0,
            SystemParameters {
                rpm: 1450.0,
                pressure_bar: 7.0,
                temperature_c: 98.0,
                voltage: 440.0,
                frequency_hz: 60.0,
            },
        ),
        system(
            "boiler",
            "Auxiliary Boiler",
            &["fuel-system"],
            900.0,
            SystemParameters {
                rpm: 0.0,
                pressure_bar: 7.0,
                temperature_c: 170.0,
                voltage: 0.0,
                frequency_hz: 0.0,
            },
        ),
        system(
            "main-engine",
            "Main Engine",
            &[
                "freshwater-cooling",
                "lubrication",
                "compressed-air",
                "fuel-system",
                "boiler",
            ],
            600.0,
            SystemParameters {
                rpm: 104.0,
                pressure_bar: 6.0,
                temperature_c: 85.0,
                voltage: 0.0,
                frequency_hz: 0.0,
            },
        ),
    ]
}

struct StepDef {
    id: &'static str,
    name: &'static str,
    base_duration_secs: f64,
    dependencies: &'static [&'static str],
    description: &'static str,
    instructions: &'static [&'static str],
    hint: Option<&'static str>,
    critical: bool,
    severity: MistakeSeverity,
    system: Option<&'static str>,
}

impl StepDef {
    fn build(&self) -> StepSpec {
        StepSpec {
            id: self.id.to_string(),
            name: self.name.to_string(),
            base_duration_secs: self.base_duration_secs,
            dependencies: self.dependencies.iter().map(ToString::to_string).collect(),
            description: self.description.to_string(),
            instructions: self.instructions.iter().map(ToString::to_string).collect(),
            hint: self.hint.map(ToString::to_string),
            critical: self.critical,
            severity: self.severity,
            system: self.system.map(ToString::to_string),
        }
    }
}

fn phase(
    id: &str,
    name: &str,
    duration_secs: f64,
    prerequisites: &[&str],
    description: &str,
    steps: &[StepDef],
) -> PhaseSpec {
    PhaseSpec {
        id: id.to_string(),
        name: name.to_string(),
        duration_secs,
        prerequisites: prerequisites.iter().map(ToString::to_string).collect(),
        description: description.to_string(),
        steps: steps.iter().map(StepDef::build).collect(),
    }
}

/// The five-phase dead-ship startup procedure.
#[must_use]
pub fn phases() -> Vec<PhaseSpec> {
    vec![
        phase(
            "emergency-power",
            "Dead Ship & Emergency Power",
            300.0,
            &[],
            "Confirm the dead-ship condition and restore emergency power",
            &[
                StepDef {
                    id: "verify-dead-ship",
                    name: "Verify dead-ship condition",
                    base_duration_secs: 60.0,
                    dependencies: &[],
                    description: "Confirm all generation is down and switchboards are dead",
                    instructions: &[
                        "Check the main switchboard is de-energized",
                        "Confirm shore power is disconnected",
                    ],
                    hint: Some("Start from the emergency switchboard room"),
                    critical: false,
                    severity: MistakeSeverity::Minor,
                    system: None,
                },
                StepDef {
                    id: "start-emergency-generator",
                    name: "Start emergency generator",
                    base_duration_secs: 120.0,
                    dependencies: &["verify-dead-ship"],
                    description: "Bring the emergency generator onto the emergency switchboard",
                    instructions: &[
                        "Check fuel and lube oil levels",
                        "Start on battery, confirm voltage and frequency",
                        "Close the emergency bus tie",
                    ],
                    hint: None,
                    critical: false,
                    severity: MistakeSeverity::Major,
                    system: Some("emergency-generator"),
                },
                StepDef {
                    id: "verify-emergency-lighting",
                    name: "Verify emergency lighting",
                    base_duration_secs: 60.0,
                    dependencies: &["start-emergency-generator"],
                    description: "Walk the escape routes and confirm emergency lighting",
                    instructions: &["Check stairwells and the engine-room escape trunk"],
                    hint: None,
                    critical: false,
                    severity: MistakeSeverity::Minor,
                    system: None,
                },
            ],
        ),
        phase(
            "main-power",
            "Main Power Generation",
            780.0,
            &["emergency-power"],
            "Start a diesel generator and energize the main switchboard",
            &[
                StepDef {
                    id: "prepare-diesel-generator",
                    name: "Prepare diesel generator",
                    base_duration_secs: 120.0,
                    dependencies: &["start-emergency-generator"],
                    description: "Pre-start checks on generator No.1",
                    instructions: &[
                        "Check jacket water and lube oil levels",
                        "Open the starting air valve",
                        "Turn the engine one revolution on the bar",
                    ],
                    hint: None,
                    critical: false,
                    severity: MistakeSeverity::Minor,
                    system: None,
                },
                StepDef {
                    id: "start-diesel-generator-1",
                    name: "Start diesel generator No.1",
                    base_duration_secs: 300.0,
                    dependencies: &["prepare-diesel-generator"],
                    description: "Start No.1 generator and bring it up to rated speed",
                    instructions: &[
                        "Start on air, watch lube oil pressure rise",
                        "Confirm 440 V / 60 Hz at the generator breaker",
                    ],
                    hint: Some("Lube oil pressure must rise within seconds of firing"),
                    critical: false,
                    severity: MistakeSeverity::Major,
                    system: Some("diesel-generator-1"),
                },
                StepDef {
                    id: "start-diesel-generator-2",
                    name: "Start diesel generator No.2",
                    base_duration_secs: 300.0,
                    dependencies: &["prepare-diesel-generator"],
                    description: "Start No.2 generator for the startup load",
                    instructions: &["Repeat the No.1 sequence for No.2"],
                    hint: None,
                    critical: false,
                    severity: MistakeSeverity::Major,
                    system: Some("diesel-generator-2"),
                },
                StepDef {
                    id: "close-main-breaker",
                    name: "Close main breaker",
                    base_duration_secs: 60.0,
                    dependencies: &["start-diesel-generator-1"],
                    description: "Connect No.1 generator to the main switchboard",
                    instructions: &[
                        "Confirm voltage and frequency in limits",
                        "Close the breaker and watch the load",
                    ],
                    hint: None,
                    critical: false,
                    severity: MistakeSeverity::Major,
                    system: None,
                },
            ],
        ),
        phase(
            "auxiliaries",
            "Cooling, Lubrication & Air",
            960.0,
            &["main-power"],
            "Bring up the auxiliary systems the main engine depends on",
            &[
                StepDef {
                    id: "start-seawater-cooling",
                    name: "Start seawater cooling",
                    base_duration_secs: 90.0,
                    dependencies: &["close-main-breaker"],
                    description: "Line up and start the main seawater pump",
                    instructions: &[
                        "Open sea suction and overboard valves",
                        "Start the pump, vent the strainer",
                    ],
                    hint: None,
                    critical: false,
                    severity: MistakeSeverity::Major,
                    system: Some("seawater-cooling"),
                },
                StepDef {
                    id: "start-freshwater-cooling",
                    name: "Start freshwater cooling",
                    base_duration_secs: 120.0,
                    dependencies: &["start-seawater-cooling"],
                    description: "Circulate jacket water through the coolers",
                    instructions: &["Start the jacket water pump", "Set the thermostat to 80°C"],
                    hint: None,
                    critical: false,
                    severity: MistakeSeverity::Major,
                    system: Some("freshwater-cooling"),
                },
                StepDef {
                    id: "start-lubrication",
                    name: "Start main lube oil pump",
                    base_duration_secs: 150.0,
                    dependencies: &["close-main-breaker"],
                    description: "Establish lube oil pressure on the main engine bearings",
                    instructions: &[
                        "Check sump level",
                        "Start the pump and confirm 4.5 bar at the inlet",
                    ],
                    hint: Some("No oil pressure, no turning gear"),
                    critical: false,
                    severity: MistakeSeverity::Major,
                    system: Some("lubrication"),
                },
                StepDef {
                    id: "start-compressed-air",
                    name: "Charge starting air",
                    base_duration_secs: 600.0,
                    dependencies: &["close-main-breaker"],
                    description: "Charge the starting air receivers to 30 bar",
                    instructions: &[
                        "Drain the receivers of condensate",
                        "Start the compressor and watch receiver pressure",
                    ],
                    hint: None,
                    critical: false,
                    severity: MistakeSeverity::Major,
                    system: Some("compressed-air"),
                },
            ],
        ),
        phase(
            "fuel-and-steam",
            "Fuel & Steam",
            1320.0,
            &["main-power"],
            "Condition the fuel system and raise steam",
            &[
                StepDef {
                    id: "start-fuel-system",
                    name: "Start fuel oil service",
                    base_duration_secs: 240.0,
                    dependencies: &["close-main-breaker"],
                    description: "Line up the service tank and start the supply pumps",
                    instructions: &[
                        "Drain the service tank of water",
                        "Start supply and circulation pumps",
                    ],
                    hint: None,
                    critical: false,
                    severity: MistakeSeverity::Major,
                    system: Some("fuel-system"),
                },
                StepDef {
                    id: "fire-boiler",
                    name: "Fire the auxiliary boiler",
                    base_duration_secs: 900.0,
                    dependencies: &["start-fuel-system"],
                    description: "Raise steam for fuel heating",
                    instructions: &[
                        "Purge the furnace before ignition",
                        "Fire on diesel oil, raise pressure slowly",
                    ],
                    hint: Some("Purge first; never trap unburned fuel in the furnace"),
                    critical: false,
                    severity: MistakeSeverity::Major,
                    system: Some("boiler"),
                },
                StepDef {
                    id: "circulate-heavy-fuel",
                    name: "Circulate heated fuel",
                    base_duration_secs: 180.0,
                    dependencies: &["fire-boiler"],
                    description: "Bring the fuel lines up to injection temperature",
                    instructions: &["Open the steam tracing", "Watch viscosity at the injectors"],
                    hint: None,
                    critical: false,
                    severity: MistakeSeverity::Minor,
                    system: None,
                },
            ],
        ),
        phase(
            "main-engine-start",
            "Main Engine",
            1080.0,
            &["auxiliaries", "fuel-and-steam"],
            "Turn, blow through, and start the main engine",
            &[
                StepDef {
                    id: "engage-turning-gear",
                    name: "Engage turning gear",
                    base_duration_secs: 120.0,
                    dependencies: &["start-lubrication"],
                    description: "Engage the turning gear with indicator cocks open",
                    instructions: &[
                        "Confirm lube oil pressure first",
                        "Open all indicator cocks",
                        "Engage and confirm the interlock",
                    ],
                    hint: Some("The turning gear interlock blocks starting air"),
                    critical: true,
                    severity: MistakeSeverity::Critical,
                    system: None,
                },
                StepDef {
                    id: "turn-engine",
                    name: "Turn engine on gear",
                    base_duration_secs: 300.0,
                    dependencies: &["engage-turning-gear"],
                    description: "Turn several revolutions watching for water or oil at the cocks",
                    instructions: &["Turn at least two full revolutions", "Watch every cock"],
                    hint: None,
                    critical: true,
                    severity: MistakeSeverity::Critical,
                    system: None,
                },
                StepDef {
                    id: "disengage-turning-gear",
                    name: "Disengage turning gear",
                    base_duration_secs: 60.0,
                    dependencies: &["turn-engine"],
                    description: "Disengage and lock out the turning gear",
                    instructions: &["Disengage, pin it out, confirm the interlock clears"],
                    hint: None,
                    critical: true,
                    severity: MistakeSeverity::Critical,
                    system: None,
                },
                StepDef {
                    id: "blow-through",
                    name: "Blow through on air",
                    base_duration_secs: 120.0,
                    dependencies: &["disengage-turning-gear", "start-compressed-air"],
                    description: "Kick the engine over on air with the cocks still open",
                    instructions: &[
                        "Give a short air kick ahead",
                        "Confirm nothing discharges from the cocks, then close them",
                    ],
                    hint: None,
                    critical: true,
                    severity: MistakeSeverity::Critical,
                    system: None,
                },
                StepDef {
                    id: "start-main-engine",
                    name: "Start main engine",
                    base_duration_secs: 600.0,
                    dependencies: &[
                        "blow-through",
                        "start-freshwater-cooling",
                        "circulate-heavy-fuel",
                    ],
                    description: "Start on air, change over to fuel, and run up slowly",
                    instructions: &[
                        "Start ahead on air at dead slow",
                        "Change over to fuel once firing evenly",
                        "Watch exhaust temperatures across all units",
                    ],
                    hint: None,
                    critical: true,
                    severity: MistakeSeverity::Critical,
                    system: Some("main-engine"),
                },
            ],
        ),
    ]
}

/// Build a ready-to-run engine for the cold-ship startup.
///
/// # Errors
///
/// Returns error if the session config is invalid. The built-in catalog
/// itself always validates.
pub fn engine(config: SessionConfig) -> EngineResult<StartupEngine> {
    StartupEngine::new(config, systems(), phases())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, TimeScale};
    use crate::engine::SystemStatus;

    #[test]
    fn test_catalog_validates() {
        let engine = engine(SessionConfig::default());
        assert!(engine.is_ok());
    }

    #[test]
    fn test_only_dead_ship_check_available_initially() {
        let engine = engine(SessionConfig::default()).unwrap();
        let available: Vec<&str> = engine.available_steps().iter().map(String::as_str).collect();
        assert_eq!(available, vec!["verify-dead-ship"]);
    }

    #[test]
    fn test_every_linked_system_exists() {
        let engine = engine(SessionConfig::default()).unwrap();
        for step in engine.catalog().steps() {
            if let Some(system) = &step.system {
                assert!(engine.system(system).is_some(), "missing {system}");
            }
        }
    }

    #[test]
    fn test_critical_steps_carry_critical_severity() {
        for phase in phases() {
            for step in &phase.steps {
                if step.critical {
                    assert_eq!(step.severity, MistakeSeverity::Critical, "{}", step.id);
                }
            }
        }
    }

    #[test]
    fn test_full_startup_in_instant_mode() {
        let config = SessionConfig::builder()
            .difficulty(Difficulty::Beginner)
            .time_scale(TimeScale::Instant)
            .build();
        let mut engine = engine(config).unwrap();

        // Walk the procedure: execute whatever is available until done.
        let total = engine.catalog().total_steps();
        for _ in 0..total {
            let Some(next) = engine.available_steps().first().cloned() else {
                break;
            };
            assert!(engine.execute_step(&next).unwrap(), "{next} failed");
        }

        assert_eq!(engine.completed_steps().len(), total);
        assert!((engine.overall_progress() - 100.0).abs() < f64::EPSILON);
        assert_eq!(
            engine.system("main-engine").unwrap().status(),
            SystemStatus::Running
        );

        let report = engine.final_report();
        assert_eq!(report.tally.total(), 0);
        assert_eq!(report.overall, 100);
    }

    #[test]
    fn test_main_engine_blocked_until_auxiliaries() {
        let config = SessionConfig::builder()
            .time_scale(TimeScale::Instant)
            .build();
        let mut engine = engine(config).unwrap();

        assert_eq!(
            engine.step_status("start-main-engine"),
            Some(crate::engine::StepStatus::Locked)
        );
        assert!(!engine.execute_step("start-main-engine").unwrap());
        assert_eq!(
            engine.system("main-engine").unwrap().status(),
            SystemStatus::Off
        );
    }

    #[test]
    fn test_boiler_needs_fuel_system() {
        let config = SessionConfig::builder()
            .time_scale(TimeScale::Instant)
            .build();
        let engine = engine(config).unwrap();

        assert!(!engine.can_start_system("boiler").unwrap());
    }
}
