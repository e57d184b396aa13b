//! Session configuration: time scales, difficulty profiles, and the
//! validated session config.
//!
//! Mistake-proofs the configuration boundary through:
//! - Type-safe configuration structs
//! - Compile-time validation via serde
//! - Runtime semantic validation

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{EngineError, EngineResult};

/// Time acceleration applied uniformly to all simulated durations.
///
/// The multiplier divides every base duration; `Instant` (multiplier 0)
/// completes work synchronously.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeScale {
    /// Everything completes immediately.
    Instant,
    /// 60x acceleration.
    Fast,
    /// 20x acceleration (default for guided sessions).
    #[default]
    Training,
    /// 5x acceleration, slow enough to narrate.
    Demo,
    /// True durations.
    RealTime,
}

impl TimeScale {
    /// The duration divisor for this scale. Zero means "instant".
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Instant => 0.0,
            Self::Fast => 60.0,
            Self::Training => 20.0,
            Self::Demo => 5.0,
            Self::RealTime => 1.0,
        }
    }

    /// Whether work under this scale completes synchronously.
    #[must_use]
    pub const fn is_instant(self) -> bool {
        matches!(self, Self::Instant)
    }
}

/// Named difficulty mode selecting a bundle of session policy defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    /// Guided session with hints and generous tolerance.
    #[default]
    Beginner,
    /// Hints on, no skips, moderate tolerance.
    Intermediate,
    /// No hints, tight tolerance.
    Expert,
    /// Real durations, watchkeeping-exam tolerance.
    Realistic,
}

/// Policy defaults bundled with a difficulty mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Time scale applied when the difficulty is selected.
    pub default_time_scale: TimeScale,
    /// Whether step hints are shown.
    pub show_hints: bool,
    /// Whether non-critical steps may be skipped.
    pub allow_skips: bool,
    /// Mistakes tolerated before the session is flagged.
    pub mistake_tolerance: u32,
    /// Whether the tutorial overlay is enabled.
    pub tutorial_enabled: bool,
    /// Target completion time in seconds.
    pub target_time_secs: f64,
    /// Human-readable description.
    pub description: &'static str,
}

impl Difficulty {
    /// Look up the policy bundle for this difficulty.
    #[must_use]
    pub const fn profile(self) -> DifficultyProfile {
        match self {
            Self::Beginner => DifficultyProfile {
                default_time_scale: TimeScale::Fast,
                show_hints: true,
                allow_skips: true,
                mistake_tolerance: 10,
                tutorial_enabled: true,
                target_time_secs: 1800.0,
                description: "Guided startup with hints and accelerated time",
            },
            Self::Intermediate => DifficultyProfile {
                default_time_scale: TimeScale::Training,
                show_hints: true,
                allow_skips: false,
                mistake_tolerance: 5,
                tutorial_enabled: false,
                target_time_secs: 2400.0,
                description: "Hints available, every step required",
            },
            Self::Expert => DifficultyProfile {
                default_time_scale: TimeScale::Training,
                show_hints: false,
                allow_skips: false,
                mistake_tolerance: 3,
                tutorial_enabled: false,
                target_time_secs: 2700.0,
                description: "No hints, tight mistake tolerance",
            },
            Self::Realistic => DifficultyProfile {
                default_time_scale: TimeScale::RealTime,
                show_hints: false,
                allow_skips: false,
                mistake_tolerance: 2,
                tutorial_enabled: false,
                target_time_secs: 3240.0,
                description: "True durations, watchkeeping-exam standard",
            },
        }
    }
}

/// Top-level session configuration.
///
/// Loaded from YAML files with full schema validation, or constructed
/// programmatically through [`SessionConfig::builder`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Session metadata.
    #[serde(default)]
    pub session: SessionMeta,

    /// Difficulty mode.
    #[serde(default)]
    pub difficulty: Difficulty,

    /// Explicit time-scale override. When absent, the difficulty's
    /// default scale applies.
    #[serde(default)]
    pub time_scale: Option<TimeScale>,

    /// Tick granularity in seconds for progress updates.
    #[validate(range(min = 0.001, max = 1.0))]
    #[serde(default = "default_tick_secs")]
    pub tick_secs: f64,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

const fn default_tick_secs() -> f64 {
    0.1
}

impl SessionConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> EngineResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;

        config.validate()?;
        config.validate_semantic()?;

        Ok(config)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Validate semantic constraints beyond schema.
    fn validate_semantic(&self) -> EngineResult<()> {
        if self.tick_secs <= 0.0 || !self.tick_secs.is_finite() {
            return Err(EngineError::config("tick must be positive and finite"));
        }
        if self.tick_secs > 1.0 {
            return Err(EngineError::config("tick should not exceed 1 second"));
        }
        Ok(())
    }

    /// The time scale in effect at session start: the explicit override
    /// when present, else the difficulty default.
    #[must_use]
    pub fn active_time_scale(&self) -> TimeScale {
        self.time_scale
            .unwrap_or_else(|| self.difficulty.profile().default_time_scale)
    }

    /// Target completion time in seconds for the selected difficulty.
    #[must_use]
    pub fn target_time_secs(&self) -> f64 {
        self.difficulty.profile().target_time_secs
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            session: SessionMeta::default(),
            difficulty: Difficulty::default(),
            time_scale: None,
            tick_secs: default_tick_secs(),
        }
    }
}

/// Session metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMeta {
    /// Session name.
    #[serde(default)]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Trainee identifier, if any.
    #[serde(default)]
    pub trainee: String,
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    difficulty: Option<Difficulty>,
    time_scale: Option<TimeScale>,
    tick_secs: Option<f64>,
}

impl SessionConfigBuilder {
    /// Set the difficulty mode.
    #[must_use]
    pub const fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Set an explicit time-scale override.
    #[must_use]
    pub const fn time_scale(mut self, scale: TimeScale) -> Self {
        self.time_scale = Some(scale);
        self
    }

    /// Set the tick granularity in seconds.
    #[must_use]
    pub const fn tick_secs(mut self, tick_secs: f64) -> Self {
        self.tick_secs = Some(tick_secs);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> SessionConfig {
        let mut config = SessionConfig::default();

        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }

        config.time_scale = self.time_scale;

        if let Some(tick_secs) = self.tick_secs {
            config.tick_secs = tick_secs;
        }

        config
    }
}
