//! Core simulation engine.
//!
//! Implements the procedural startup state machine:
//! - Machinery plant with dependency-gated progressive startups
//! - Procedure board tracking completed/in-flight/available steps
//! - Fixed-tick session clock with time-scale acceleration
//! - Mistake logging and performance assessment
//! - Synchronous subscriber notifications in registration order
//!
//! Commands validate and register work synchronously; completion happens
//! while the session is driven through [`StartupEngine::advance`]. Under
//! [`TimeScale::Instant`] work completes inside the command itself. There
//! are no detached timers: every piece of in-flight work lives in tables
//! owned by the engine, so `reset` and `emergency_stop` can cancel all of
//! it before touching any other state.

pub mod clock;
pub mod events;
pub mod plant;
pub mod procedure;

use serde::{Deserialize, Serialize};

pub use clock::SessionClock;
pub use events::{EngineEvent, RejectReason, SubscriberSet, SubscriptionId};
pub use plant::{
    ParameterPatch, Plant, StartDisposition, SystemParameters, SystemSnapshot, SystemSpec,
    SystemStatus, SystemUnit,
};
pub use procedure::{
    InFlightStep, PhaseSpec, ProcedureCatalog, StepBoard, StepSpec, StepStatus, StepWork,
};

use crate::assessment::{Assessment, PerformanceReport, PerformanceSnapshot};
use crate::config::{Difficulty, SessionConfig, TimeScale};
use crate::error::{EngineError, EngineResult};
use indexmap::IndexSet;

/// Session time representation.
///
/// Fixed-point nanoseconds from session start, for reproducibility across
/// platforms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SimTime {
    /// Time in nanoseconds from session start.
    nanos: u64,
}

impl SimTime {
    /// Zero time (session start).
    pub const ZERO: Self = Self { nanos: 0 };

    /// Create time from seconds.
    ///
    /// # Panics
    ///
    /// Panics if seconds is negative or not finite.
    #[must_use]
    pub fn from_secs(secs: f64) -> Self {
        assert!(secs >= 0.0, "SimTime cannot be negative");
        assert!(secs.is_finite(), "SimTime must be finite");
        let nanos = (secs * 1_000_000_000.0) as u64;
        Self { nanos }
    }

    /// Create time from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            nanos: millis * 1_000_000,
        }
    }

    /// Create time from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Get time as seconds (f64).
    #[must_use]
    pub fn as_secs_f64(&self) -> f64 {
        self.nanos as f64 / 1_000_000_000.0
    }

    /// Get time as whole milliseconds.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.nanos / 1_000_000
    }

    /// Get time as nanoseconds.
    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.nanos
    }

    /// Add duration to time.
    #[must_use]
    pub const fn add_nanos(self, nanos: u64) -> Self {
        Self {
            nanos: self.nanos + nanos,
        }
    }

    /// Subtract duration from time, saturating at zero.
    #[must_use]
    pub const fn saturating_sub_nanos(self, nanos: u64) -> Self {
        Self {
            nanos: self.nanos.saturating_sub(nanos),
        }
    }
}

impl std::ops::Add for SimTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            nanos: self.nanos + rhs.nanos,
        }
    }
}

impl std::ops::Sub for SimTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            nanos: self.nanos.saturating_sub(rhs.nanos),
        }
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

/// The procedural startup engine.
///
/// Owns the machinery plant, the procedure catalog and board, the session
/// clock, the assessment, and the subscriber set. One engine per training
/// session; construct a fresh one rather than sharing.
pub struct StartupEngine {
    config: SessionConfig,
    clock: SessionClock,
    time_scale: TimeScale,
    difficulty: Difficulty,
    plant: Plant,
    catalog: ProcedureCatalog,
    board: StepBoard,
    assessment: Assessment,
    subscribers: SubscriberSet,
}

impl StartupEngine {
    /// Build an engine from a session config, plant specs, and procedure
    /// phases.
    ///
    /// # Errors
    ///
    /// Returns error on duplicate ids, dependencies naming unknown
    /// records, a step linked to a system the plant does not contain, or
    /// an invalid tick granularity.
    pub fn new(
        config: SessionConfig,
        systems: Vec<SystemSpec>,
        phases: Vec<PhaseSpec>,
    ) -> EngineResult<Self> {
        if !(config.tick_secs > 0.0 && config.tick_secs.is_finite() && config.tick_secs <= 1.0) {
            return Err(EngineError::config(
                "tick must be positive, finite, and at most 1 second",
            ));
        }

        let plant = Plant::from_specs(systems)?;
        let catalog = ProcedureCatalog::from_phases(phases)?;

        for step in catalog.steps() {
            if let Some(system) = &step.system {
                if plant.unit(system).is_none() {
                    return Err(EngineError::UnknownLinkedSystem {
                        step: step.id.clone(),
                        system: system.clone(),
                    });
                }
            }
        }

        let board = StepBoard::new(&catalog);
        let clock = SessionClock::new(config.tick_secs);
        let time_scale = config.active_time_scale();
        let difficulty = config.difficulty;
        let assessment = Assessment::begin(config.target_time_secs(), SimTime::ZERO);

        Ok(Self {
            config,
            clock,
            time_scale,
            difficulty,
            plant,
            catalog,
            board,
            assessment,
            subscribers: SubscriberSet::new(),
        })
    }

    // ===== Session settings =====

    /// Elapsed session time.
    #[must_use]
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// The active time scale.
    #[must_use]
    pub const fn time_scale(&self) -> TimeScale {
        self.time_scale
    }

    /// The active difficulty.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Change the active time scale. Applies to work started afterwards;
    /// in-flight startups keep their captured multiplier.
    pub fn set_time_scale(&mut self, scale: TimeScale) {
        self.time_scale = scale;
        self.subscribers
            .notify(&EngineEvent::TimeScaleChanged { scale });
    }

    /// Change the difficulty. Resets the active time scale to the
    /// difficulty's default and retargets the assessment.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        let profile = difficulty.profile();
        self.difficulty = difficulty;
        self.time_scale = profile.default_time_scale;
        self.assessment.set_target(profile.target_time_secs);

        self.subscribers
            .notify(&EngineEvent::DifficultyChanged { difficulty });
        self.subscribers.notify(&EngineEvent::TimeScaleChanged {
            scale: profile.default_time_scale,
        });
    }

    // ===== System commands =====

    /// Whether every dependency of a system is ready. No side effects.
    ///
    /// # Errors
    ///
    /// Returns error for an unknown system id.
    pub fn can_start_system(&self, id: &str) -> EngineResult<bool> {
        self.plant.can_start(id)
    }

    /// Request startup of a system directly (outside the procedure).
    ///
    /// Returns `Ok(false)` without mutation when a dependency is not
    /// ready or the system is failed. Under an instant scale the startup
    /// completes before returning; otherwise it completes during
    /// [`StartupEngine::advance`].
    ///
    /// # Errors
    ///
    /// Returns error for an unknown system id.
    pub fn start_system(&mut self, id: &str) -> EngineResult<bool> {
        let now = self.clock.now();
        let disposition = self
            .plant
            .begin_start(id, self.time_scale.multiplier(), now)?;

        match disposition {
            StartDisposition::Refused => Ok(false),
            StartDisposition::InFlight => {
                self.publish_system(id);
                Ok(true)
            }
            StartDisposition::Completed => {
                self.publish_system(id);
                self.settle_system_completion(id, now);
                Ok(true)
            }
        }
    }

    /// Apply a manual parameter override to a system.
    ///
    /// # Errors
    ///
    /// Returns error for an unknown system id.
    pub fn update_parameters(&mut self, id: &str, patch: &ParameterPatch) -> EngineResult<()> {
        self.plant.update_parameters(id, patch)?;
        if let Some(unit) = self.plant.unit(id) {
            let snapshot = unit.snapshot();
            self.subscribers
                .notify(&EngineEvent::ParametersUpdated { snapshot });
        }
        Ok(())
    }

    // ===== Step commands =====

    /// Execute a procedure step.
    ///
    /// Fails (`Ok(false)`) and logs a mistake when the step is not
    /// available, or when its linked system refuses to start; either way
    /// the step remains available for retry. On success the step
    /// completes immediately (instant scale or checklist-only with zero
    /// effective duration) or during [`StartupEngine::advance`].
    ///
    /// # Errors
    ///
    /// Returns error for an unknown step id.
    pub fn execute_step(&mut self, id: &str) -> EngineResult<bool> {
        let step = self
            .catalog
            .step(id)
            .ok_or_else(|| EngineError::UnknownStep(id.to_string()))?
            .clone();
        let now = self.clock.now();

        if !self.board.is_available(id) {
            let unmet: Vec<&str> = step
                .dependencies
                .iter()
                .filter(|dep| !self.board.completed().contains(*dep))
                .map(String::as_str)
                .collect();
            let expected = if unmet.is_empty() {
                format!("'{}' not pending", step.name)
            } else {
                format!("complete {} first", unmet.join(", "))
            };
            self.charge_step_mistake(&step, expected, now);
            self.subscribers.notify(&EngineEvent::StepRejected {
                step_id: step.id.clone(),
                reason: RejectReason::StepNotAvailable,
                at: now,
            });
            return Ok(false);
        }

        let multiplier = self.time_scale.multiplier();

        let Some(system_id) = step.system.clone() else {
            // Checklist-only step: resolves after its scaled duration.
            let run_nanos = if multiplier <= 0.0 {
                0
            } else {
                ((step.base_duration_secs / multiplier) * 1_000_000_000.0) as u64
            };

            if run_nanos == 0 {
                self.finish_step(&step, now, now, multiplier);
            } else {
                self.board.begin(
                    &step.id,
                    InFlightStep {
                        started_at: now,
                        multiplier,
                        work: StepWork::Admin {
                            deadline: now.add_nanos(run_nanos),
                        },
                    },
                    &self.catalog,
                );
                self.subscribers.notify(&EngineEvent::StepStarted {
                    step_id: step.id.clone(),
                    at: now,
                });
            }
            return Ok(true);
        };

        match self.plant.begin_start(&system_id, multiplier, now)? {
            StartDisposition::Refused => {
                let failed = self
                    .plant
                    .unit(&system_id)
                    .is_some_and(|u| u.status() == SystemStatus::Failed);
                let reason = if failed {
                    RejectReason::SystemFailed {
                        system_id: system_id.clone(),
                    }
                } else {
                    RejectReason::SystemNotReady {
                        system_id: system_id.clone(),
                    }
                };

                self.charge_step_mistake(
                    &step,
                    format!("'{system_id}' ready to start"),
                    now,
                );
                self.subscribers.notify(&EngineEvent::StepRejected {
                    step_id: step.id.clone(),
                    reason,
                    at: now,
                });
                Ok(false)
            }
            StartDisposition::Completed => {
                self.publish_system(&system_id);
                self.finish_step(&step, now, now, multiplier);
                Ok(true)
            }
            StartDisposition::InFlight => {
                self.board.begin(
                    &step.id,
                    InFlightStep {
                        started_at: now,
                        multiplier,
                        work: StepWork::System {
                            system_id: system_id.clone(),
                        },
                    },
                    &self.catalog,
                );
                self.subscribers.notify(&EngineEvent::StepStarted {
                    step_id: step.id.clone(),
                    at: now,
                });
                self.publish_system(&system_id);
                Ok(true)
            }
        }
    }

    // ===== Driving =====

    /// Drive the session forward by the given wall-clock interval,
    /// ticking at the configured granularity. Progress snapshots are
    /// published on every mutating tick.
    pub fn advance(&mut self, elapsed: SimTime) {
        let mut remaining = elapsed.as_nanos();
        while remaining > 0 {
            let chunk = remaining.min(self.clock.tick_nanos());
            let now = self.clock.step_by(chunk);
            self.tick_at(now);
            remaining -= chunk;
        }
    }

    /// Drive the session forward by exactly one tick.
    pub fn tick(&mut self) {
        let now = self.clock.tick();
        self.tick_at(now);
    }

    fn tick_at(&mut self, now: SimTime) {
        let plant_tick = self.plant.advance_to(now);

        for id in &plant_tick.progressed {
            self.publish_system(id);
        }
        for system_id in &plant_tick.completed {
            self.settle_system_completion(system_id, now);
        }

        for step_id in self.board.admin_due(now) {
            let flight = self.board.in_flight(&step_id).cloned();
            let step = self.catalog.step(&step_id).cloned();
            if let (Some(flight), Some(step)) = (flight, step) {
                self.finish_step(&step, now, flight.started_at, flight.multiplier);
            }
        }
    }

    /// Complete every in-flight step waiting on a finished system.
    fn settle_system_completion(&mut self, system_id: &str, now: SimTime) {
        for step_id in self.board.steps_linked_to(system_id) {
            let flight = self.board.in_flight(&step_id).cloned();
            let step = self.catalog.step(&step_id).cloned();
            if let (Some(flight), Some(step)) = (flight, step) {
                self.finish_step(&step, now, flight.started_at, flight.multiplier);
            }
        }
    }

    fn finish_step(&mut self, step: &StepSpec, now: SimTime, started_at: SimTime, multiplier: f64) {
        self.board.complete(&step.id, &self.catalog);

        // Actual duration in base-equivalent seconds, so efficiency is
        // comparable across time scales.
        let actual_secs = (now - started_at).as_secs_f64() * multiplier.max(0.0);
        let phase = self.catalog.phase_of(&step.id).unwrap_or("").to_string();
        self.assessment
            .record_step(&step.id, phase, step.base_duration_secs, actual_secs, now);

        self.subscribers.notify(&EngineEvent::StepCompleted {
            step_id: step.id.clone(),
            at: now,
        });
    }

    fn charge_step_mistake(&mut self, step: &StepSpec, expected: String, now: SimTime) {
        let phase = self.catalog.phase_of(&step.id).unwrap_or("").to_string();
        self.assessment.record_mistake(
            now,
            format!("execute '{}'", step.name),
            expected,
            phase,
            Some(step.severity),
        );
    }

    fn publish_system(&mut self, id: &str) {
        if let Some(unit) = self.plant.unit(id) {
            let snapshot = unit.snapshot();
            self.subscribers
                .notify(&EngineEvent::SystemUpdated { snapshot });
        }
    }

    // ===== Queries =====

    /// Steps currently available for execution.
    #[must_use]
    pub const fn available_steps(&self) -> &IndexSet<String> {
        self.board.available()
    }

    /// Steps completed so far.
    #[must_use]
    pub const fn completed_steps(&self) -> &IndexSet<String> {
        self.board.completed()
    }

    /// Derived status of a step. `None` for unknown ids.
    #[must_use]
    pub fn step_status(&self, id: &str) -> Option<StepStatus> {
        self.board.status(id, &self.catalog)
    }

    /// Look up one system.
    #[must_use]
    pub fn system(&self, id: &str) -> Option<&SystemUnit> {
        self.plant.unit(id)
    }

    /// All systems in authoring order.
    pub fn systems(&self) -> impl Iterator<Item = &SystemUnit> {
        self.plant.units()
    }

    /// The procedure catalog.
    #[must_use]
    pub const fn catalog(&self) -> &ProcedureCatalog {
        &self.catalog
    }

    /// Completed fraction of the procedure, 0-100.
    #[must_use]
    pub fn overall_progress(&self) -> f64 {
        self.board.overall_progress(&self.catalog)
    }

    /// Remaining time against target, proportional to the incomplete
    /// fraction of the procedure. Clamped at zero.
    #[must_use]
    pub fn estimated_time_remaining(&self) -> SimTime {
        let fraction = 1.0 - self.overall_progress() / 100.0;
        SimTime::from_secs((self.assessment.target_secs() * fraction).max(0.0))
    }

    // ===== Assessment =====

    /// The session assessment.
    #[must_use]
    pub const fn assessment(&self) -> &Assessment {
        &self.assessment
    }

    /// Log a free-text mistake; severity decided by the keyword
    /// classifier.
    pub fn record_mistake(
        &mut self,
        action: impl Into<String>,
        expected: impl Into<String>,
        phase: impl Into<String>,
    ) {
        let now = self.clock.now();
        self.assessment
            .record_mistake(now, action, expected, phase, None);
    }

    /// Recompute the time axis from the current session time.
    pub fn update_time_score(&mut self) {
        self.assessment.update_time_score(self.clock.now());
    }

    /// Rolling mid-run performance view.
    #[must_use]
    pub fn performance(&self) -> PerformanceSnapshot {
        self.assessment.snapshot()
    }

    /// Final performance report as of the current session time.
    #[must_use]
    pub fn final_report(&self) -> PerformanceReport {
        self.assessment.finalize(self.clock.now())
    }

    // ===== Subscriptions =====

    /// Register a state-change callback. Notifications are synchronous
    /// and delivered in registration order.
    pub fn subscribe(&mut self, callback: impl FnMut(&EngineEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // ===== Cancellation =====

    /// Return the session to a cold ship: cancels all in-flight work
    /// first, then resets plant, clock, and assessment, and recomputes
    /// availability from the empty completed set. Idempotent; callable at
    /// any point, including mid-startup.
    pub fn reset(&mut self) {
        // Cancel in-flight work before any other mutation, so no stale
        // completion can land in the fresh session.
        self.board.reset(&self.catalog);
        self.plant.reset();
        self.clock.reset();
        self.assessment = Assessment::begin(
            self.difficulty.profile().target_time_secs,
            SimTime::ZERO,
        );

        self.subscribers.notify(&EngineEvent::SessionReset);
    }

    /// Halt the session: cancels all in-flight work, forces every system
    /// into the failed state, and logs one critical mistake. Always
    /// succeeds; only [`StartupEngine::reset`] recovers the plant.
    pub fn emergency_stop(&mut self) {
        let now = self.clock.now();

        self.board.clear_in_flight(&self.catalog);
        self.plant.fail_all();
        self.assessment.record_mistake(
            now,
            "emergency stop",
            "controlled shutdown",
            "",
            Some(crate::assessment::MistakeSeverity::Critical),
        );

        self.subscribers.notify(&EngineEvent::EmergencyStop { at: now });
        let ids: Vec<String> = self.plant.units().map(|u| u.id().to_string()).collect();
        for id in ids {
            self.publish_system(&id);
        }
    }
}

impl std::fmt::Debug for StartupEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartupEngine")
            .field("now", &self.clock.now())
            .field("time_scale", &self.time_scale)
            .field("difficulty", &self.difficulty)
            .field("systems", &self.plant.len())
            .field("completed_steps", &self.board.completed().len())
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}
