//! Machinery plant: the registry of simulated ship systems.
//!
//! Each system starts progressively over an accelerated duration, gated on
//! the readiness of its declared dependencies. Simulated readings (rpm,
//! pressures, temperatures, electrical values) interpolate linearly from
//! their cold baseline to their rated values as startup progresses.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::engine::SimTime;
use crate::error::{EngineError, EngineResult};

/// Lifecycle state of one machinery system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SystemStatus {
    /// Cold and stopped. Also the reset state.
    #[default]
    Off,
    /// Startup in progress; `progress` is meaningful.
    Starting,
    /// Fully started and ready.
    Running,
    /// Stopped by an emergency stop; refuses to start until reset.
    Failed,
}

/// Simulated readings for one system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemParameters {
    /// Shaft or rotor speed.
    pub rpm: f64,
    /// Working pressure in bar.
    pub pressure_bar: f64,
    /// Working temperature in °C.
    pub temperature_c: f64,
    /// Bus voltage in V.
    pub voltage: f64,
    /// Bus frequency in Hz.
    pub frequency_hz: f64,
}

impl SystemParameters {
    /// Linear interpolation between two parameter sets.
    ///
    /// `fraction` is clamped to [0, 1].
    #[must_use]
    pub fn lerp(baseline: &Self, rated: &Self, fraction: f64) -> Self {
        let f = fraction.clamp(0.0, 1.0);
        let mix = |a: f64, b: f64| a + (b - a) * f;

        Self {
            rpm: mix(baseline.rpm, rated.rpm),
            pressure_bar: mix(baseline.pressure_bar, rated.pressure_bar),
            temperature_c: mix(baseline.temperature_c, rated.temperature_c),
            voltage: mix(baseline.voltage, rated.voltage),
            frequency_hz: mix(baseline.frequency_hz, rated.frequency_hz),
        }
    }

    /// Apply a partial override, keeping unset readings.
    pub fn apply(&mut self, patch: &ParameterPatch) {
        if let Some(rpm) = patch.rpm {
            self.rpm = rpm;
        }
        if let Some(pressure_bar) = patch.pressure_bar {
            self.pressure_bar = pressure_bar;
        }
        if let Some(temperature_c) = patch.temperature_c {
            self.temperature_c = temperature_c;
        }
        if let Some(voltage) = patch.voltage {
            self.voltage = voltage;
        }
        if let Some(frequency_hz) = patch.frequency_hz {
            self.frequency_hz = frequency_hz;
        }
    }
}

/// Partial parameter override for manual console adjustments.
///
/// Deliberately permissive: values are not range-checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterPatch {
    /// Override rpm.
    #[serde(default)]
    pub rpm: Option<f64>,
    /// Override pressure.
    #[serde(default)]
    pub pressure_bar: Option<f64>,
    /// Override temperature.
    #[serde(default)]
    pub temperature_c: Option<f64>,
    /// Override voltage.
    #[serde(default)]
    pub voltage: Option<f64>,
    /// Override frequency.
    #[serde(default)]
    pub frequency_hz: Option<f64>,
}

/// Authoring-side description of one machinery system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSpec {
    /// Unique system id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// System ids that must be ready before this one may start.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Startup duration at real time, in seconds.
    pub base_duration_secs: f64,
    /// Cold readings.
    #[serde(default)]
    pub baseline: SystemParameters,
    /// Rated readings once running.
    pub rated: SystemParameters,
}

/// Point-in-time view of one system, published to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    /// System id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Lifecycle state.
    pub status: SystemStatus,
    /// Startup progress, 0-100.
    pub progress: f64,
    /// Whether the system satisfies dependents.
    pub ready: bool,
    /// Current simulated readings.
    pub parameters: SystemParameters,
}

/// Disposition of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartDisposition {
    /// Refused: a dependency is not ready, or the system is failed.
    /// Nothing was mutated.
    Refused,
    /// Startup began (or was already underway) and will complete on a
    /// later tick.
    InFlight,
    /// The system is running: either it completed synchronously under an
    /// instant scale, or it was already running.
    Completed,
}

/// Live state of one machinery system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemUnit {
    spec: SystemSpec,
    status: SystemStatus,
    progress: f64,
    ready: bool,
    started_at: Option<SimTime>,
    /// Accelerated startup duration in nanoseconds, set while starting.
    run_nanos: Option<u64>,
    parameters: SystemParameters,
}

impl SystemUnit {
    fn new(spec: SystemSpec) -> Self {
        let parameters = spec.baseline;
        Self {
            spec,
            status: SystemStatus::Off,
            progress: 0.0,
            ready: false,
            started_at: None,
            run_nanos: None,
            parameters,
        }
    }

    /// Authoring-side spec.
    #[must_use]
    pub const fn spec(&self) -> &SystemSpec {
        &self.spec
    }

    /// System id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.spec.id
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn status(&self) -> SystemStatus {
        self.status
    }

    /// Startup progress, 0-100.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Whether the system satisfies dependents.
    #[must_use]
    pub const fn ready(&self) -> bool {
        self.ready
    }

    /// Current simulated readings.
    #[must_use]
    pub const fn parameters(&self) -> &SystemParameters {
        &self.parameters
    }

    /// Point-in-time view for subscribers.
    #[must_use]
    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            id: self.spec.id.clone(),
            name: self.spec.name.clone(),
            status: self.status,
            progress: self.progress,
            ready: self.ready,
            parameters: self.parameters,
        }
    }

    fn complete(&mut self) {
        self.progress = 100.0;
        self.status = SystemStatus::Running;
        self.ready = true;
        self.parameters = self.spec.rated;
        self.started_at = None;
        self.run_nanos = None;
    }

    fn reset(&mut self) {
        self.status = SystemStatus::Off;
        self.progress = 0.0;
        self.ready = false;
        self.started_at = None;
        self.run_nanos = None;
        self.parameters = self.spec.baseline;
    }

    fn fail(&mut self) {
        self.status = SystemStatus::Failed;
        self.ready = false;
        self.started_at = None;
        self.run_nanos = None;
        self.parameters = self.spec.baseline;
    }
}

/// Result of advancing the plant by one tick.
#[derive(Debug, Default)]
pub struct PlantTick {
    /// Ids whose startup progressed this tick (includes completions).
    pub progressed: Vec<String>,
    /// Ids whose startup completed this tick.
    pub completed: Vec<String>,
}

/// The machinery plant: every simulated system, keyed by id in authoring
/// order. All mutation goes through plant methods; that is the enforcement
/// point for the dependency invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    units: IndexMap<String, SystemUnit>,
}

impl Plant {
    /// Build the plant from authored system specs.
    ///
    /// # Errors
    ///
    /// Returns error on a duplicate system id or a dependency naming an
    /// unknown system.
    pub fn from_specs(specs: Vec<SystemSpec>) -> EngineResult<Self> {
        let mut seen = IndexSet::with_capacity(specs.len());

        for spec in &specs {
            if !seen.insert(spec.id.clone()) {
                return Err(EngineError::DuplicateId {
                    kind: "system",
                    id: spec.id.clone(),
                });
            }
        }

        for spec in &specs {
            for dep in &spec.dependencies {
                if !seen.contains(dep) {
                    return Err(EngineError::UnknownDependency {
                        kind: "system",
                        id: spec.id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        Ok(Self {
            units: specs
                .into_iter()
                .map(|spec| (spec.id.clone(), SystemUnit::new(spec)))
                .collect(),
        })
    }

    /// Whether every dependency of `id` is ready.
    ///
    /// No side effects.
    ///
    /// # Errors
    ///
    /// Returns error for an unknown system id.
    pub fn can_start(&self, id: &str) -> EngineResult<bool> {
        let unit = self
            .units
            .get(id)
            .ok_or_else(|| EngineError::UnknownSystem(id.to_string()))?;

        Ok(unit
            .spec
            .dependencies
            .iter()
            .all(|dep| self.units.get(dep).is_some_and(SystemUnit::ready)))
    }

    /// Request startup of a system.
    ///
    /// Refuses without mutation when a dependency is not ready or the
    /// system is failed. A repeat request while starting is an
    /// acknowledged no-op (`InFlight`); the original startup stands.
    /// A request against a running system reports `Completed`.
    ///
    /// Under a zero multiplier the startup completes synchronously;
    /// otherwise the accelerated duration is `base / multiplier` and
    /// progress is advanced by [`Plant::advance_to`].
    ///
    /// # Errors
    ///
    /// Returns error for an unknown system id.
    pub fn begin_start(
        &mut self,
        id: &str,
        multiplier: f64,
        now: SimTime,
    ) -> EngineResult<StartDisposition> {
        if !self.can_start(id)? {
            return Ok(StartDisposition::Refused);
        }

        let Some(unit) = self.units.get_mut(id) else {
            return Err(EngineError::UnknownSystem(id.to_string()));
        };

        match unit.status {
            SystemStatus::Starting => Ok(StartDisposition::InFlight),
            SystemStatus::Running => Ok(StartDisposition::Completed),
            SystemStatus::Failed => Ok(StartDisposition::Refused),
            SystemStatus::Off => {
                let run_nanos = if multiplier <= 0.0 {
                    0
                } else {
                    ((unit.spec.base_duration_secs / multiplier) * 1_000_000_000.0) as u64
                };

                if run_nanos == 0 {
                    unit.complete();
                    return Ok(StartDisposition::Completed);
                }

                unit.status = SystemStatus::Starting;
                unit.started_at = Some(now);
                unit.run_nanos = Some(run_nanos);
                Ok(StartDisposition::InFlight)
            }
        }
    }

    /// Advance every in-flight startup to the given time.
    ///
    /// Progress is `elapsed / accelerated * 100`, capped at 100; readings
    /// interpolate with progress. Systems reaching 100 become running and
    /// ready.
    pub fn advance_to(&mut self, now: SimTime) -> PlantTick {
        let mut tick = PlantTick::default();

        for unit in self.units.values_mut() {
            if unit.status != SystemStatus::Starting {
                continue;
            }
            let (Some(started_at), Some(run_nanos)) = (unit.started_at, unit.run_nanos) else {
                continue;
            };

            let elapsed = (now - started_at).as_nanos();
            let fraction = (elapsed as f64 / run_nanos as f64).min(1.0);
            unit.progress = fraction * 100.0;
            unit.parameters =
                SystemParameters::lerp(&unit.spec.baseline, &unit.spec.rated, fraction);

            tick.progressed.push(unit.spec.id.clone());

            if unit.progress >= 100.0 {
                unit.complete();
                tick.completed.push(unit.spec.id.clone());
            }
        }

        tick
    }

    /// Apply a manual parameter override.
    ///
    /// # Errors
    ///
    /// Returns error for an unknown system id.
    pub fn update_parameters(&mut self, id: &str, patch: &ParameterPatch) -> EngineResult<()> {
        let unit = self
            .units
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownSystem(id.to_string()))?;
        unit.parameters.apply(patch);
        Ok(())
    }

    /// Look up one system.
    #[must_use]
    pub fn unit(&self, id: &str) -> Option<&SystemUnit> {
        self.units.get(id)
    }

    /// All systems in authoring order.
    pub fn units(&self) -> impl Iterator<Item = &SystemUnit> {
        self.units.values()
    }

    /// Number of systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the plant is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Whether any startup is in flight.
    #[must_use]
    pub fn any_starting(&self) -> bool {
        self.units
            .values()
            .any(|u| u.status == SystemStatus::Starting)
    }

    /// Return every system to cold and stopped. Cancels in-flight
    /// startups.
    pub fn reset(&mut self) {
        for unit in self.units.values_mut() {
            unit.reset();
        }
    }

    /// Force every system into the failed state. Cancels in-flight
    /// startups. Only [`Plant::reset`] recovers from this.
    pub fn fail_all(&mut self) {
        for unit in self.units.values_mut() {
            unit.fail();
        }
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn lone_spec(base_secs: f64) -> SystemSpec {
        SystemSpec {
            id: "gen".to_string(),
            name: "Generator".to_string(),
            dependencies: Vec::new(),
            base_duration_secs: base_secs,
            baseline: SystemParameters::default(),
            rated: SystemParameters {
                rpm: 720.0,
                pressure_bar: 8.0,
                temperature_c: 85.0,
                voltage: 440.0,
                frequency_hz: 60.0,
            },
        }
    }

    proptest! {
        /// Falsification: published progress is non-decreasing and ends
        /// at exactly 100.
        #[test]
        fn prop_progress_monotonic(
            base_secs in 1.0f64..120.0,
            multiplier in 1.0f64..60.0,
            ticks in 2u64..50,
        ) {
            let mut plant = Plant::from_specs(vec![lone_spec(base_secs)]).unwrap();
            plant.begin_start("gen", multiplier, SimTime::ZERO).unwrap();

            let accelerated = base_secs / multiplier;
            let dt = accelerated * 1.2 / ticks as f64;

            let mut last = 0.0f64;
            for i in 1..=ticks {
                plant.advance_to(SimTime::from_secs(dt * i as f64));
                let progress = plant.unit("gen").unwrap().progress();
                prop_assert!(progress >= last);
                last = progress;
            }

            prop_assert!((plant.unit("gen").unwrap().progress() - 100.0).abs() < f64::EPSILON);
        }

        /// Falsification: completion time scales as base/multiplier.
        #[test]
        fn prop_time_scale_linearity(
            base_secs in 1.0f64..120.0,
            multiplier in 1.0f64..60.0,
        ) {
            let mut plant = Plant::from_specs(vec![lone_spec(base_secs)]).unwrap();
            plant.begin_start("gen", multiplier, SimTime::ZERO).unwrap();

            let accelerated = base_secs / multiplier;

            // One nanosecond shy of the accelerated duration: not done.
            let shy = SimTime::from_secs(accelerated).saturating_sub_nanos(1);
            plant.advance_to(shy);
            prop_assert!(!plant.unit("gen").unwrap().ready());

            // At the accelerated duration: done.
            plant.advance_to(SimTime::from_secs(accelerated).add_nanos(1));
            prop_assert!(plant.unit("gen").unwrap().ready());
        }

        /// Falsification: readings stay inside the baseline-rated span
        /// while starting.
        #[test]
        fn prop_parameters_bounded(fraction in 0.0f64..2.0) {
            let spec = lone_spec(10.0);
            let params = SystemParameters::lerp(&spec.baseline, &spec.rated, fraction);

            prop_assert!(params.rpm >= spec.baseline.rpm);
            prop_assert!(params.rpm <= spec.rated.rpm);
            prop_assert!(params.voltage <= spec.rated.voltage);
        }
    }
}
