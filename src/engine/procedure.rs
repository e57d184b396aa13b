//! Procedure graph: ordered phases of dependency-gated steps, and the
//! board that tracks which steps are completed, in flight, or available.
//!
//! Step gating and system gating are deliberately independent: a step can
//! be procedurally available while its linked system is not yet physically
//! ready to start. Both kinds of refusal are recoverable; a failed
//! execution leaves the step available again, never locked.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::assessment::MistakeSeverity;
use crate::engine::SimTime;
use crate::error::{EngineError, EngineResult};

/// One atomic, dependency-gated unit of procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Unique step id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Duration at real time, in seconds.
    pub base_duration_secs: f64,
    /// Step ids that must be completed first.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// What the step accomplishes.
    #[serde(default)]
    pub description: String,
    /// Checklist instructions shown to the trainee.
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Hint text, shown when the difficulty profile allows hints.
    #[serde(default)]
    pub hint: Option<String>,
    /// Whether skipping or botching this step endangers the plant.
    #[serde(default)]
    pub critical: bool,
    /// Severity charged when this step is attempted out of order.
    #[serde(default)]
    pub severity: MistakeSeverity,
    /// Machinery system this step starts, if any. Steps without a linked
    /// system are checklist-only and complete after their duration.
    #[serde(default)]
    pub system: Option<String>,
}

/// A named, ordered grouping of steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSpec {
    /// Unique phase id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Nominal phase duration at real time, in seconds.
    pub duration_secs: f64,
    /// Phase or step ids expected to come first. Informational: gating is
    /// carried by step dependencies.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// What the phase accomplishes.
    #[serde(default)]
    pub description: String,
    /// Steps in this phase.
    pub steps: Vec<StepSpec>,
}

/// Derived status of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    /// Dependencies not yet completed.
    Locked,
    /// Every dependency completed; may be executed.
    Available,
    /// Currently executing.
    InProgress,
    /// Done. Never revoked except by reset.
    Completed,
}

/// The validated procedure: phases in order plus a flattened step table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcedureCatalog {
    phases: Vec<PhaseSpec>,
    /// Step id -> (owning phase id, spec), in authoring order.
    steps: IndexMap<String, (String, StepSpec)>,
}

impl ProcedureCatalog {
    /// Build and validate the catalog.
    ///
    /// # Errors
    ///
    /// Returns error on a duplicate phase or step id, or a step dependency
    /// naming an unknown step.
    pub fn from_phases(phases: Vec<PhaseSpec>) -> EngineResult<Self> {
        let mut phase_ids = IndexSet::with_capacity(phases.len());
        let mut steps = IndexMap::new();

        for phase in &phases {
            if !phase_ids.insert(phase.id.clone()) {
                return Err(EngineError::DuplicateId {
                    kind: "phase",
                    id: phase.id.clone(),
                });
            }
            for step in &phase.steps {
                if steps
                    .insert(step.id.clone(), (phase.id.clone(), step.clone()))
                    .is_some()
                {
                    return Err(EngineError::DuplicateId {
                        kind: "step",
                        id: step.id.clone(),
                    });
                }
            }
        }

        for (_, step) in steps.values() {
            for dep in &step.dependencies {
                if !steps.contains_key(dep) {
                    return Err(EngineError::UnknownDependency {
                        kind: "step",
                        id: step.id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        Ok(Self { phases, steps })
    }

    /// Phases in order.
    #[must_use]
    pub fn phases(&self) -> &[PhaseSpec] {
        &self.phases
    }

    /// Look up one step.
    #[must_use]
    pub fn step(&self, id: &str) -> Option<&StepSpec> {
        self.steps.get(id).map(|(_, step)| step)
    }

    /// The phase owning a step.
    #[must_use]
    pub fn phase_of(&self, step_id: &str) -> Option<&str> {
        self.steps.get(step_id).map(|(phase, _)| phase.as_str())
    }

    /// All steps in authoring order.
    pub fn steps(&self) -> impl Iterator<Item = &StepSpec> {
        self.steps.values().map(|(_, step)| step)
    }

    /// Total number of steps.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }
}

/// Why an in-flight step completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepWork {
    /// Checklist-only step; completes at the deadline.
    Admin {
        /// Session time at which the step completes.
        deadline: SimTime,
    },
    /// Completes when the linked system finishes starting.
    System {
        /// Linked system id.
        system_id: String,
    },
}

/// Bookkeeping for one executing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InFlightStep {
    /// Session time the execution began.
    pub started_at: SimTime,
    /// Time-scale multiplier captured at execution time.
    pub multiplier: f64,
    /// Completion trigger.
    pub work: StepWork,
}

/// Tracks the completed, in-flight, and available step sets.
///
/// The available set is recomputed from scratch whenever the completed or
/// in-flight sets change: a step is available iff it is neither completed
/// nor in flight and every dependency is completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepBoard {
    completed: IndexSet<String>,
    in_flight: IndexMap<String, InFlightStep>,
    available: IndexSet<String>,
}

impl StepBoard {
    /// Create a board for a catalog; only zero-dependency steps start
    /// available.
    #[must_use]
    pub fn new(catalog: &ProcedureCatalog) -> Self {
        let mut board = Self {
            completed: IndexSet::new(),
            in_flight: IndexMap::new(),
            available: IndexSet::new(),
        };
        board.recompute(catalog);
        board
    }

    fn recompute(&mut self, catalog: &ProcedureCatalog) {
        self.available = catalog
            .steps()
            .filter(|step| {
                !self.completed.contains(&step.id)
                    && !self.in_flight.contains_key(&step.id)
                    && step
                        .dependencies
                        .iter()
                        .all(|dep| self.completed.contains(dep))
            })
            .map(|step| step.id.clone())
            .collect();
    }

    /// The available step set.
    #[must_use]
    pub const fn available(&self) -> &IndexSet<String> {
        &self.available
    }

    /// The completed step set.
    #[must_use]
    pub const fn completed(&self) -> &IndexSet<String> {
        &self.completed
    }

    /// Whether a step may be executed right now.
    #[must_use]
    pub fn is_available(&self, id: &str) -> bool {
        self.available.contains(id)
    }

    /// Derived status of a step. `None` for unknown ids.
    #[must_use]
    pub fn status(&self, id: &str, catalog: &ProcedureCatalog) -> Option<StepStatus> {
        catalog.step(id)?;
        Some(if self.completed.contains(id) {
            StepStatus::Completed
        } else if self.in_flight.contains_key(id) {
            StepStatus::InProgress
        } else if self.available.contains(id) {
            StepStatus::Available
        } else {
            StepStatus::Locked
        })
    }

    /// Record that a step began executing.
    pub fn begin(&mut self, id: &str, work: InFlightStep, catalog: &ProcedureCatalog) {
        self.in_flight.insert(id.to_string(), work);
        self.recompute(catalog);
    }

    /// Move a step to the completed set.
    ///
    /// Returns the in-flight record when the step was executing; steps
    /// completed synchronously have none.
    pub fn complete(&mut self, id: &str, catalog: &ProcedureCatalog) -> Option<InFlightStep> {
        let work = self.in_flight.shift_remove(id);
        self.completed.insert(id.to_string());
        self.recompute(catalog);
        work
    }

    /// Abort an in-flight step; it becomes available again.
    pub fn abort(&mut self, id: &str, catalog: &ProcedureCatalog) -> Option<InFlightStep> {
        let work = self.in_flight.shift_remove(id);
        if work.is_some() {
            self.recompute(catalog);
        }
        work
    }

    /// Cancel every in-flight step without completing it.
    pub fn clear_in_flight(&mut self, catalog: &ProcedureCatalog) {
        if !self.in_flight.is_empty() {
            self.in_flight.clear();
            self.recompute(catalog);
        }
    }

    /// In-flight record for a step, if executing.
    #[must_use]
    pub fn in_flight(&self, id: &str) -> Option<&InFlightStep> {
        self.in_flight.get(id)
    }

    /// Ids of admin steps whose deadline has arrived.
    #[must_use]
    pub fn admin_due(&self, now: SimTime) -> Vec<String> {
        self.in_flight
            .iter()
            .filter(|(_, flight)| {
                matches!(&flight.work, StepWork::Admin { deadline } if *deadline <= now)
            })
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Ids of in-flight steps waiting on a given system.
    #[must_use]
    pub fn steps_linked_to(&self, system_id: &str) -> Vec<String> {
        self.in_flight
            .iter()
            .filter(|(_, flight)| {
                matches!(&flight.work, StepWork::System { system_id: sys } if sys == system_id)
            })
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Completed fraction of the procedure, 0-100.
    #[must_use]
    pub fn overall_progress(&self, catalog: &ProcedureCatalog) -> f64 {
        let total = catalog.total_steps();
        if total == 0 {
            return 0.0;
        }
        self.completed.len() as f64 / total as f64 * 100.0
    }

    /// Clear everything; cancels in-flight work first, then recomputes
    /// availability from the empty completed set.
    pub fn reset(&mut self, catalog: &ProcedureCatalog) {
        self.in_flight.clear();
        self.completed.clear();
        self.recompute(catalog);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn step(id: &str, deps: &[&str]) -> StepSpec {
        StepSpec {
            id: id.to_string(),
            name: id.to_string(),
            base_duration_secs: 30.0,
            dependencies: deps.iter().map(ToString::to_string).collect(),
            description: String::new(),
            instructions: Vec::new(),
            hint: None,
            critical: false,
            severity: MistakeSeverity::Minor,
            system: None,
        }
    }

    fn chain_catalog() -> ProcedureCatalog {
        ProcedureCatalog::from_phases(vec![PhaseSpec {
            id: "p1".to_string(),
            name: "Phase 1".to_string(),
            duration_secs: 60.0,
            prerequisites: Vec::new(),
            description: String::new(),
            steps: vec![step("a", &[]), step("b", &["a"]), step("c", &["a", "b"])],
        }])
        .unwrap()
    }

    #[test]
    fn test_duplicate_step_rejected() {
        let result = ProcedureCatalog::from_phases(vec![PhaseSpec {
            id: "p1".to_string(),
            name: String::new(),
            duration_secs: 0.0,
            prerequisites: Vec::new(),
            description: String::new(),
            steps: vec![step("a", &[]), step("a", &[])],
        }]);
        assert!(matches!(
            result,
            Err(EngineError::DuplicateId { kind: "step", .. })
        ));
    }

    #[test]
    fn test_unknown_step_dependency_rejected() {
        let result = ProcedureCatalog::from_phases(vec![PhaseSpec {
            id: "p1".to_string(),
            name: String::new(),
            duration_secs: 0.0,
            prerequisites: Vec::new(),
            description: String::new(),
            steps: vec![step("b", &["missing"])],
        }]);
        assert!(matches!(
            result,
            Err(EngineError::UnknownDependency { kind: "step", .. })
        ));
    }

    #[test]
    fn test_initial_availability() {
        let catalog = chain_catalog();
        let board = StepBoard::new(&catalog);

        assert!(board.is_available("a"));
        assert!(!board.is_available("b"));
        assert!(!board.is_available("c"));
    }

    #[test]
    fn test_completion_unlocks_dependents() {
        let catalog = chain_catalog();
        let mut board = StepBoard::new(&catalog);

        board.complete("a", &catalog);
        assert!(board.is_available("b"));
        assert!(!board.is_available("c")); // still needs b

        board.complete("b", &catalog);
        assert!(board.is_available("c"));
    }

    #[test]
    fn test_completed_step_not_available() {
        let catalog = chain_catalog();
        let mut board = StepBoard::new(&catalog);

        board.complete("a", &catalog);
        assert!(!board.is_available("a"));
    }

    #[test]
    fn test_in_flight_step_not_available() {
        let catalog = chain_catalog();
        let mut board = StepBoard::new(&catalog);

        board.begin(
            "a",
            InFlightStep {
                started_at: SimTime::ZERO,
                multiplier: 1.0,
                work: StepWork::Admin {
                    deadline: SimTime::from_secs(30.0),
                },
            },
            &catalog,
        );

        assert!(!board.is_available("a"));
        assert_eq!(board.status("a", &catalog), Some(StepStatus::InProgress));
    }

    #[test]
    fn test_abort_returns_step_to_available() {
        let catalog = chain_catalog();
        let mut board = StepBoard::new(&catalog);

        board.begin(
            "a",
            InFlightStep {
                started_at: SimTime::ZERO,
                multiplier: 1.0,
                work: StepWork::Admin {
                    deadline: SimTime::from_secs(30.0),
                },
            },
            &catalog,
        );
        board.abort("a", &catalog);

        assert!(board.is_available("a"));
        assert_eq!(board.status("a", &catalog), Some(StepStatus::Available));
    }

    #[test]
    fn test_status_locked_and_unknown() {
        let catalog = chain_catalog();
        let board = StepBoard::new(&catalog);

        assert_eq!(board.status("c", &catalog), Some(StepStatus::Locked));
        assert_eq!(board.status("zz", &catalog), None);
    }

    #[test]
    fn test_admin_due() {
        let catalog = chain_catalog();
        let mut board = StepBoard::new(&catalog);

        board.begin(
            "a",
            InFlightStep {
                started_at: SimTime::ZERO,
                multiplier: 1.0,
                work: StepWork::Admin {
                    deadline: SimTime::from_secs(30.0),
                },
            },
            &catalog,
        );

        assert!(board.admin_due(SimTime::from_secs(29.9)).is_empty());
        assert_eq!(board.admin_due(SimTime::from_secs(30.0)), vec!["a"]);
    }

    #[test]
    fn test_steps_linked_to() {
        let catalog = chain_catalog();
        let mut board = StepBoard::new(&catalog);

        board.begin(
            "a",
            InFlightStep {
                started_at: SimTime::ZERO,
                multiplier: 1.0,
                work: StepWork::System {
                    system_id: "gen".to_string(),
                },
            },
            &catalog,
        );

        assert_eq!(board.steps_linked_to("gen"), vec!["a"]);
        assert!(board.steps_linked_to("pump").is_empty());
    }

    #[test]
    fn test_overall_progress() {
        let catalog = chain_catalog();
        let mut board = StepBoard::new(&catalog);

        assert!((board.overall_progress(&catalog) - 0.0).abs() < f64::EPSILON);

        board.complete("a", &catalog);
        assert!((board.overall_progress(&catalog) - 100.0 / 3.0).abs() < 1e-9);

        board.complete("b", &catalog);
        board.complete("c", &catalog);
        assert!((board.overall_progress(&catalog) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset_clears_everything() {
        let catalog = chain_catalog();
        let mut board = StepBoard::new(&catalog);

        board.complete("a", &catalog);
        board.begin(
            "b",
            InFlightStep {
                started_at: SimTime::ZERO,
                multiplier: 1.0,
                work: StepWork::Admin {
                    deadline: SimTime::from_secs(30.0),
                },
            },
            &catalog,
        );

        board.reset(&catalog);

        assert!(board.completed().is_empty());
        assert!(board.is_available("a"));
        assert!(!board.is_available("b"));
        assert!(board.admin_due(SimTime::from_secs(120.0)).is_empty());
    }

    #[test]
    fn test_phase_of() {
        let catalog = chain_catalog();
        assert_eq!(catalog.phase_of("a"), Some("p1"));
        assert_eq!(catalog.phase_of("zz"), None);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Build a linear chain of `n` steps, each depending on the previous.
    fn linear_catalog(n: usize) -> ProcedureCatalog {
        let steps = (0..n)
            .map(|i| StepSpec {
                id: format!("s{i}"),
                name: format!("Step {i}"),
                base_duration_secs: 10.0,
                dependencies: if i == 0 {
                    Vec::new()
                } else {
                    vec![format!("s{}", i - 1)]
                },
                description: String::new(),
                instructions: Vec::new(),
                hint: None,
                critical: false,
                severity: MistakeSeverity::Minor,
                system: None,
            })
            .collect();

        ProcedureCatalog::from_phases(vec![PhaseSpec {
            id: "p1".to_string(),
            name: String::new(),
            duration_secs: 0.0,
            prerequisites: Vec::new(),
            description: String::new(),
            steps,
        }])
        .unwrap()
    }

    proptest! {
        /// Falsification: the completed set never shrinks under any
        /// complete/abort interleaving.
        #[test]
        fn prop_completion_monotonic(n in 2usize..20, ops in prop::collection::vec(0usize..20, 1..40)) {
            let catalog = linear_catalog(n);
            let mut board = StepBoard::new(&catalog);
            let mut last_len = 0;

            for op in ops {
                let id = format!("s{}", op % n);
                if op % 3 == 0 {
                    board.abort(&id, &catalog);
                } else {
                    board.complete(&id, &catalog);
                }
                prop_assert!(board.completed().len() >= last_len);
                last_len = board.completed().len();
            }
        }

        /// Falsification: a step is never available while a dependency is
        /// incomplete.
        #[test]
        fn prop_dependency_safety(n in 2usize..20, completions in prop::collection::vec(0usize..20, 0..20)) {
            let catalog = linear_catalog(n);
            let mut board = StepBoard::new(&catalog);

            for c in completions {
                board.complete(&format!("s{}", c % n), &catalog);

                for step in catalog.steps() {
                    if board.is_available(&step.id) {
                        for dep in &step.dependencies {
                            prop_assert!(board.completed().contains(dep));
                        }
                    }
                }
            }
        }
    }
}
