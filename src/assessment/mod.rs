//! Mistake logging and performance assessment.
//!
//! Tracks an append-only mistake log and per-step timing records, and
//! derives four 0-100 score axes (efficiency, safety, time, procedural),
//! an overall score, and a certification tier. Scores only ever decrease
//! under penalty rules; the time axis alone follows the over/under-target
//! rule.

use serde::{Deserialize, Serialize};

use crate::engine::SimTime;

/// Severity of a logged mistake.
///
/// Attached to each step at authoring time; the keyword classifier in
/// [`Assessment::classify_action`] is a fallback for free-text actions
/// with no authored tag.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum MistakeSeverity {
    /// Slip with no plant consequence.
    #[default]
    Minor,
    /// Mishandling of a major subsystem.
    Major,
    /// Safety-critical violation.
    Critical,
}

impl MistakeSeverity {
    /// Point deductions applied to (efficiency, safety, procedural).
    ///
    /// The time axis is governed only by the target-time rule.
    #[must_use]
    pub const fn deductions(self) -> (f64, f64, f64) {
        match self {
            Self::Minor => (5.0, 5.0, 6.0),
            Self::Major => (10.0, 15.0, 12.0),
            Self::Critical => (20.0, 30.0, 25.0),
        }
    }
}

/// A logged policy violation. Append-only; never mutated or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mistake {
    /// Session time of the violation.
    pub at: SimTime,
    /// What the trainee attempted.
    pub action: String,
    /// What the procedure required instead.
    pub expected: String,
    /// Phase in which the violation occurred.
    pub phase: String,
    /// Severity charged.
    pub severity: MistakeSeverity,
    /// Human-readable account.
    pub description: String,
}

/// Timing record for one completed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// The step.
    pub step_id: String,
    /// Owning phase.
    pub phase: String,
    /// Completion time.
    pub at: SimTime,
    /// Expected duration in base seconds.
    pub expected_secs: f64,
    /// Actual duration in base-equivalent seconds.
    pub actual_secs: f64,
    /// `expected / actual * 100`, clamped to [0, 100].
    pub efficiency: f64,
}

/// Count of mistakes by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MistakeTally {
    /// Minor mistakes.
    pub minor: usize,
    /// Major mistakes.
    pub major: usize,
    /// Critical mistakes.
    pub critical: usize,
}

impl MistakeTally {
    /// Total mistakes of any severity.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.minor + self.major + self.critical
    }
}

/// The four score axes, each within [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Step pacing.
    pub efficiency: f64,
    /// Safety conduct.
    pub safety: f64,
    /// Target-time performance.
    pub time: f64,
    /// Checklist-order discipline.
    pub procedural: f64,
}

impl ScoreBreakdown {
    const PERFECT: Self = Self {
        efficiency: 100.0,
        safety: 100.0,
        time: 100.0,
        procedural: 100.0,
    };

    /// Rounded arithmetic mean of the four axes.
    #[must_use]
    pub fn overall(&self) -> u32 {
        ((self.efficiency + self.safety + self.time + self.procedural) / 4.0).round() as u32
    }
}

impl Default for ScoreBreakdown {
    fn default() -> Self {
        Self::PERFECT
    }
}

/// Discrete tier derived from the overall score. Pure lookup, no
/// hysteresis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CertificationLevel {
    /// Below 65.
    Failed,
    /// 65 and up.
    Basic,
    /// 75 and up.
    Competent,
    /// 85 and up.
    Advanced,
    /// 95 and up.
    Master,
}

impl CertificationLevel {
    /// Tier for an overall score.
    #[must_use]
    pub const fn from_score(overall: u32) -> Self {
        match overall {
            95.. => Self::Master,
            85.. => Self::Advanced,
            75.. => Self::Competent,
            65.. => Self::Basic,
            _ => Self::Failed,
        }
    }

    /// Fixed tier label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Master => "Master Engineer",
            Self::Advanced => "Advanced Watchkeeper",
            Self::Competent => "Competent Watchkeeper",
            Self::Basic => "Basic Operator",
            Self::Failed => "Not Certified",
        }
    }

    /// Fixed tier description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Master => "Exemplary startup; fit to instruct others",
            Self::Advanced => "Strong command of the full procedure",
            Self::Competent => "Sound procedure with room to tighten pacing",
            Self::Basic => "Completed the startup; fundamentals need drilling",
            Self::Failed => "Procedure not demonstrated to standard",
        }
    }
}

/// Rolling view of the assessment mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    /// Current axis scores.
    pub breakdown: ScoreBreakdown,
    /// Rounded mean of the axes.
    pub overall: u32,
    /// Mistakes logged so far.
    pub mistakes: usize,
}

/// Final derived metrics for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Session start.
    pub started_at: SimTime,
    /// Session end.
    pub finished_at: SimTime,
    /// Elapsed seconds.
    pub elapsed_secs: f64,
    /// Target seconds for the difficulty in effect.
    pub target_secs: f64,
    /// Axis scores.
    pub breakdown: ScoreBreakdown,
    /// Rounded mean of the axes.
    pub overall: u32,
    /// Certification tier with fixed label/description.
    pub certification: CertificationLevel,
    /// Every logged mistake, in order.
    pub mistakes: Vec<Mistake>,
    /// Mistake counts by severity.
    pub tally: MistakeTally,
    /// Per-step timing records.
    pub records: Vec<StepRecord>,
    /// Advisory improvement suggestions.
    pub suggestions: Vec<String>,
    /// Advisory achievements.
    pub achievements: Vec<String>,
}

/// Tracks mistakes and step timings for one session and derives scores.
///
/// Constructed fresh per session and discarded on reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    target_secs: f64,
    started_at: SimTime,
    scores: ScoreBreakdown,
    mistakes: Vec<Mistake>,
    records: Vec<StepRecord>,
}

impl Assessment {
    /// Start a fresh assessment against a target completion time.
    #[must_use]
    pub fn begin(target_secs: f64, now: SimTime) -> Self {
        Self {
            target_secs,
            started_at: now,
            scores: ScoreBreakdown::PERFECT,
            mistakes: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Change the target (difficulty changed mid-session).
    pub fn set_target(&mut self, target_secs: f64) {
        self.target_secs = target_secs;
    }

    /// Target completion time in seconds.
    #[must_use]
    pub const fn target_secs(&self) -> f64 {
        self.target_secs
    }

    /// Session start time.
    #[must_use]
    pub const fn started_at(&self) -> SimTime {
        self.started_at
    }

    /// Classify a free-text action when no authored severity applies.
    ///
    /// Keyword heuristic: safety/emergency/main-engine/turning-gear terms
    /// are critical; named major subsystems are major; everything else is
    /// minor.
    #[must_use]
    pub fn classify_action(action: &str, expected: &str) -> MistakeSeverity {
        let text = format!("{action} {expected}").to_lowercase();

        const CRITICAL: [&str; 6] = [
            "safety",
            "emergency",
            "main engine",
            "main-engine",
            "turning gear",
            "turning-gear",
        ];
        const MAJOR: [&str; 7] = [
            "generator",
            "boiler",
            "fuel",
            "lubrication",
            "lube",
            "cooling",
            "compressed air",
        ];

        if CRITICAL.iter().any(|kw| text.contains(kw)) {
            MistakeSeverity::Critical
        } else if MAJOR.iter().any(|kw| text.contains(kw)) {
            MistakeSeverity::Major
        } else {
            MistakeSeverity::Minor
        }
    }

    /// Log a mistake and apply its score deductions.
    ///
    /// When `severity` is `None` the keyword classifier decides. Returns
    /// the severity charged.
    pub fn record_mistake(
        &mut self,
        at: SimTime,
        action: impl Into<String>,
        expected: impl Into<String>,
        phase: impl Into<String>,
        severity: Option<MistakeSeverity>,
    ) -> MistakeSeverity {
        let action = action.into();
        let expected = expected.into();
        let severity = severity.unwrap_or_else(|| Self::classify_action(&action, &expected));

        let (efficiency, safety, procedural) = severity.deductions();
        self.scores.efficiency = (self.scores.efficiency - efficiency).max(0.0);
        self.scores.safety = (self.scores.safety - safety).max(0.0);
        self.scores.procedural = (self.scores.procedural - procedural).max(0.0);

        let description = format!("attempted '{action}' when '{expected}' was required");
        self.mistakes.push(Mistake {
            at,
            action,
            expected,
            phase: phase.into(),
            severity,
            description,
        });

        severity
    }

    /// Record a completed step's timing.
    ///
    /// Efficiency is `expected / actual * 100`, clamped to [0, 100];
    /// instantaneous completion counts as fully efficient.
    pub fn record_step(
        &mut self,
        step_id: impl Into<String>,
        phase: impl Into<String>,
        expected_secs: f64,
        actual_secs: f64,
        at: SimTime,
    ) {
        let efficiency = if actual_secs <= 0.0 {
            100.0
        } else {
            (expected_secs / actual_secs * 100.0).clamp(0.0, 100.0)
        };

        self.records.push(StepRecord {
            step_id: step_id.into(),
            phase: phase.into(),
            at,
            expected_secs,
            actual_secs,
            efficiency,
        });
    }

    /// Recompute the time axis from elapsed session time.
    ///
    /// At or under target the axis holds at its 100 cap; over target it
    /// drops in proportion to the overrun, floored at 50.
    pub fn update_time_score(&mut self, elapsed: SimTime) {
        self.scores.time = Self::time_score_for(elapsed.as_secs_f64(), self.target_secs);
    }

    fn time_score_for(elapsed_secs: f64, target_secs: f64) -> f64 {
        if target_secs <= 0.0 || elapsed_secs <= target_secs {
            return 100.0;
        }
        let overrun = (elapsed_secs - target_secs) / target_secs;
        (100.0 - overrun * 100.0).max(50.0)
    }

    /// Every logged mistake, in order.
    #[must_use]
    pub fn mistakes(&self) -> &[Mistake] {
        &self.mistakes
    }

    /// Per-step timing records.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Mistake counts by severity.
    #[must_use]
    pub fn tally(&self) -> MistakeTally {
        let mut tally = MistakeTally::default();
        for mistake in &self.mistakes {
            match mistake.severity {
                MistakeSeverity::Minor => tally.minor += 1,
                MistakeSeverity::Major => tally.major += 1,
                MistakeSeverity::Critical => tally.critical += 1,
            }
        }
        tally
    }

    /// Current axis scores.
    #[must_use]
    pub const fn breakdown(&self) -> ScoreBreakdown {
        self.scores
    }

    /// Mean step efficiency, or 100 with no records.
    #[must_use]
    pub fn average_efficiency(&self) -> f64 {
        if self.records.is_empty() {
            return 100.0;
        }
        self.records.iter().map(|r| r.efficiency).sum::<f64>() / self.records.len() as f64
    }

    /// Rolling mid-run view.
    #[must_use]
    pub fn snapshot(&self) -> PerformanceSnapshot {
        PerformanceSnapshot {
            breakdown: self.scores,
            overall: self.scores.overall(),
            mistakes: self.mistakes.len(),
        }
    }

    /// Derive the final report at session end.
    ///
    /// Pure with respect to the logs: the time axis is recomputed from
    /// the finish time, so the report is the same however often the
    /// rolling score was updated along the way.
    #[must_use]
    pub fn finalize(&self, now: SimTime) -> PerformanceReport {
        let elapsed_secs = (now - self.started_at).as_secs_f64();

        let mut breakdown = self.scores;
        breakdown.time = Self::time_score_for(elapsed_secs, self.target_secs);

        let overall = breakdown.overall();
        let tally = self.tally();
        let avg_efficiency = self.average_efficiency();

        PerformanceReport {
            started_at: self.started_at,
            finished_at: now,
            elapsed_secs,
            target_secs: self.target_secs,
            breakdown,
            overall,
            certification: CertificationLevel::from_score(overall),
            mistakes: self.mistakes.clone(),
            tally,
            records: self.records.clone(),
            suggestions: Self::suggestions(breakdown, tally, avg_efficiency),
            achievements: Self::achievements(breakdown, tally, avg_efficiency, overall),
        }
    }

    fn suggestions(
        breakdown: ScoreBreakdown,
        tally: MistakeTally,
        avg_efficiency: f64,
    ) -> Vec<String> {
        let mut out = Vec::new();

        if tally.critical > 0 {
            out.push(
                "Walk through the turning-gear and safety interlocks before the next run"
                    .to_string(),
            );
        }
        if breakdown.safety < 70.0 {
            out.push("Review safety-critical steps; they carry the largest deductions".to_string());
        }
        if breakdown.procedural < 80.0 {
            out.push(
                "Keep to checklist order; attempt a step only once its prerequisites are done"
                    .to_string(),
            );
        }
        if breakdown.time < 80.0 {
            out.push("Cut idle time between phases to finish closer to target".to_string());
        }
        if avg_efficiency < 70.0 {
            out.push("Individual steps ran long; rehearse them at an accelerated scale".to_string());
        }
        if out.is_empty() {
            out.push("Solid run. Try a harder difficulty or a slower time scale".to_string());
        }

        out
    }

    fn achievements(
        breakdown: ScoreBreakdown,
        tally: MistakeTally,
        avg_efficiency: f64,
        overall: u32,
    ) -> Vec<String> {
        let mut out = Vec::new();

        if tally.total() == 0 {
            out.push("Clean sweep: no mistakes logged".to_string());
        }
        if breakdown.time >= 100.0 {
            out.push("Finished inside the target time".to_string());
        }
        if avg_efficiency >= 95.0 {
            out.push("Every step on pace".to_string());
        }
        if overall >= 95 {
            out.push("Master watchkeeper standard".to_string());
        }

        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn fresh() -> Assessment {
        Assessment::begin(3240.0, SimTime::ZERO)
    }

    #[test]
    fn test_scores_start_perfect() {
        let assessment = fresh();
        let breakdown = assessment.breakdown();
        assert!((breakdown.efficiency - 100.0).abs() < f64::EPSILON);
        assert!((breakdown.safety - 100.0).abs() < f64::EPSILON);
        assert!((breakdown.time - 100.0).abs() < f64::EPSILON);
        assert!((breakdown.procedural - 100.0).abs() < f64::EPSILON);
        assert_eq!(assessment.snapshot().overall, 100);
    }

    #[test]
    fn test_critical_mistake_deductions() {
        let mut assessment = fresh();
        assessment.record_mistake(
            SimTime::ZERO,
            "start main engine",
            "engage turning gear",
            "main-engine",
            Some(MistakeSeverity::Critical),
        );

        let breakdown = assessment.breakdown();
        assert!((breakdown.efficiency - 80.0).abs() < f64::EPSILON);
        assert!((breakdown.safety - 70.0).abs() < f64::EPSILON);
        assert!((breakdown.procedural - 75.0).abs() < f64::EPSILON);
        assert!((breakdown.time - 100.0).abs() < f64::EPSILON); // untouched
    }

    #[test]
    fn test_mixed_severity_sequence() {
        let mut assessment = fresh();
        assessment.record_mistake(
            SimTime::ZERO,
            "a",
            "b",
            "p",
            Some(MistakeSeverity::Critical),
        );
        assessment.record_mistake(SimTime::ZERO, "c", "d", "p", Some(MistakeSeverity::Major));
        assessment.record_mistake(SimTime::ZERO, "e", "f", "p", Some(MistakeSeverity::Minor));

        assert_eq!(assessment.mistakes().len(), 3);
        let tally = assessment.tally();
        assert_eq!(tally.critical, 1);
        assert_eq!(tally.major, 1);
        assert_eq!(tally.minor, 1);

        // 100 - 30 - 15 - 5
        assert!((assessment.breakdown().safety - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scores_floor_at_zero() {
        let mut assessment = fresh();
        for _ in 0..10 {
            assessment.record_mistake(
                SimTime::ZERO,
                "a",
                "b",
                "p",
                Some(MistakeSeverity::Critical),
            );
        }

        let breakdown = assessment.breakdown();
        assert!(breakdown.safety >= 0.0);
        assert!(breakdown.efficiency >= 0.0);
        assert!(breakdown.procedural >= 0.0);
    }

    #[test]
    fn test_classifier_critical_keywords() {
        assert_eq!(
            Assessment::classify_action("start main engine", ""),
            MistakeSeverity::Critical
        );
        assert_eq!(
            Assessment::classify_action("disengage turning gear", ""),
            MistakeSeverity::Critical
        );
        assert_eq!(
            Assessment::classify_action("", "verify emergency stop"),
            MistakeSeverity::Critical
        );
    }

    #[test]
    fn test_classifier_major_and_minor() {
        assert_eq!(
            Assessment::classify_action("start diesel generator", ""),
            MistakeSeverity::Major
        );
        assert_eq!(
            Assessment::classify_action("check deck lighting", ""),
            MistakeSeverity::Minor
        );
    }

    #[test]
    fn test_authored_severity_wins_over_classifier() {
        let mut assessment = fresh();
        let charged = assessment.record_mistake(
            SimTime::ZERO,
            "start main engine",
            "",
            "p",
            Some(MistakeSeverity::Minor),
        );
        assert_eq!(charged, MistakeSeverity::Minor);
    }

    #[test]
    fn test_step_efficiency_clamped() {
        let mut assessment = fresh();

        // Twice as fast as expected: clamped to 100.
        assessment.record_step("a", "p", 60.0, 30.0, SimTime::ZERO);
        // Twice as slow: 50.
        assessment.record_step("b", "p", 60.0, 120.0, SimTime::ZERO);
        // Instant: fully efficient.
        assessment.record_step("c", "p", 60.0, 0.0, SimTime::ZERO);

        let records = assessment.records();
        assert!((records[0].efficiency - 100.0).abs() < f64::EPSILON);
        assert!((records[1].efficiency - 50.0).abs() < f64::EPSILON);
        assert!((records[2].efficiency - 100.0).abs() < f64::EPSILON);
        assert!((assessment.average_efficiency() - 250.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_time_score_under_target_holds_cap() {
        let mut assessment = fresh();
        assessment.update_time_score(SimTime::from_secs(3000.0));
        assert!((assessment.breakdown().time - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_time_score_over_target_drops() {
        let mut assessment = fresh();
        assessment.update_time_score(SimTime::from_secs(4000.0));

        let time = assessment.breakdown().time;
        assert!(time < 100.0);
        assert!(time >= 50.0);
    }

    #[test]
    fn test_time_score_floored_at_fifty() {
        let mut assessment = fresh();
        assessment.update_time_score(SimTime::from_secs(100_000.0));
        assert!((assessment.breakdown().time - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_certification_tiers() {
        assert_eq!(CertificationLevel::from_score(100), CertificationLevel::Master);
        assert_eq!(CertificationLevel::from_score(95), CertificationLevel::Master);
        assert_eq!(CertificationLevel::from_score(94), CertificationLevel::Advanced);
        assert_eq!(CertificationLevel::from_score(85), CertificationLevel::Advanced);
        assert_eq!(CertificationLevel::from_score(75), CertificationLevel::Competent);
        assert_eq!(CertificationLevel::from_score(65), CertificationLevel::Basic);
        assert_eq!(CertificationLevel::from_score(64), CertificationLevel::Failed);
    }

    #[test]
    fn test_certification_labels() {
        assert_eq!(CertificationLevel::Master.label(), "Master Engineer");
        assert!(!CertificationLevel::Failed.description().is_empty());
    }

    #[test]
    fn test_finalize_over_target_downgrades() {
        let assessment = fresh();

        let on_time = assessment.finalize(SimTime::from_secs(3000.0));
        let late = assessment.finalize(SimTime::from_secs(4000.0));

        assert!((on_time.breakdown.time - 100.0).abs() < f64::EPSILON);
        assert!(late.breakdown.time < 100.0);
        assert!(late.overall < on_time.overall);
        assert!(late.certification < on_time.certification);
    }

    #[test]
    fn test_finalize_clean_run_report() {
        let mut assessment = fresh();
        assessment.record_step("a", "p", 60.0, 60.0, SimTime::from_secs(60.0));

        let report = assessment.finalize(SimTime::from_secs(3000.0));
        assert_eq!(report.overall, 100);
        assert_eq!(report.certification, CertificationLevel::Master);
        assert_eq!(report.tally.total(), 0);
        assert!(report
            .achievements
            .iter()
            .any(|a| a.contains("Clean sweep")));
        assert!(report.suggestions.iter().any(|s| s.contains("Solid run")));
    }

    #[test]
    fn test_finalize_suggestions_after_critical() {
        let mut assessment = fresh();
        assessment.record_mistake(SimTime::ZERO, "a", "b", "p", Some(MistakeSeverity::Critical));
        assessment.record_mistake(SimTime::ZERO, "c", "d", "p", Some(MistakeSeverity::Critical));

        let report = assessment.finalize(SimTime::from_secs(3000.0));
        assert!(report
            .suggestions
            .iter()
            .any(|s| s.contains("interlocks")));
        assert!(report.suggestions.iter().any(|s| s.contains("safety")));
        assert!(report.achievements.iter().all(|a| !a.contains("Clean")));
    }

    #[test]
    fn test_set_target() {
        let mut assessment = fresh();
        assessment.set_target(1800.0);
        assert!((assessment.target_secs() - 1800.0).abs() < f64::EPSILON);

        assessment.update_time_score(SimTime::from_secs(1900.0));
        assert!(assessment.breakdown().time < 100.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn severity_strategy() -> impl Strategy<Value = MistakeSeverity> {
        prop_oneof![
            Just(MistakeSeverity::Minor),
            Just(MistakeSeverity::Major),
            Just(MistakeSeverity::Critical),
        ]
    }

    proptest! {
        /// Falsification: every axis stays in [0, 100] under any sequence
        /// of mistakes and time updates.
        #[test]
        fn prop_score_bounds(
            severities in prop::collection::vec(severity_strategy(), 0..50),
            elapsed in 0.0f64..100_000.0,
        ) {
            let mut assessment = Assessment::begin(3240.0, SimTime::ZERO);

            for severity in severities {
                assessment.record_mistake(SimTime::ZERO, "a", "b", "p", Some(severity));
            }
            assessment.update_time_score(SimTime::from_secs(elapsed));

            let b = assessment.breakdown();
            for axis in [b.efficiency, b.safety, b.time, b.procedural] {
                prop_assert!((0.0..=100.0).contains(&axis));
            }
            prop_assert!(assessment.snapshot().overall <= 100);
        }

        /// Falsification: efficiency is always clamped to [0, 100].
        #[test]
        fn prop_efficiency_clamped(expected in 0.1f64..10_000.0, actual in 0.0f64..10_000.0) {
            let mut assessment = Assessment::begin(3240.0, SimTime::ZERO);
            assessment.record_step("s", "p", expected, actual, SimTime::ZERO);

            let efficiency = assessment.records()[0].efficiency;
            prop_assert!((0.0..=100.0).contains(&efficiency));
        }

        /// Falsification: more overrun never raises the time score.
        #[test]
        fn prop_time_score_monotone(a in 0.0f64..50_000.0, b in 0.0f64..50_000.0) {
            let mut fast = Assessment::begin(3240.0, SimTime::ZERO);
            let mut slow = Assessment::begin(3240.0, SimTime::ZERO);

            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            fast.update_time_score(SimTime::from_secs(lo));
            slow.update_time_score(SimTime::from_secs(hi));

            prop_assert!(slow.breakdown().time <= fast.breakdown().time);
        }
    }
}
