//! # coldship
//!
//! Deterministic cold-ship startup simulator for engine-room training.
//!
//! Models the dependency-gated, multi-phase procedure that brings a dead
//! ship from emergency power to a running main engine:
//! - Machinery plant with progressive, dependency-gated system startups
//! - Procedure graph of phases and steps with two-level gating
//! - Accelerated/realistic time scaling
//! - Mistake logging, four-axis performance scoring, and certification
//!
//! ## Example
//!
//! ```rust
//! use coldship::prelude::*;
//!
//! let config = SessionConfig::builder()
//!     .difficulty(Difficulty::Beginner)
//!     .time_scale(TimeScale::Instant)
//!     .build();
//!
//! let mut engine = coldship::scenarios::cold_ship::engine(config)
//!     .expect("catalog is well-formed");
//!
//! // Only zero-dependency steps are available on a dead ship.
//! assert!(engine.available_steps().contains("verify-dead-ship"));
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_const_for_fn,  // Many functions can't be const in stable Rust
    clippy::too_many_lines,
)]

pub mod assessment;
pub mod config;
pub mod engine;
pub mod error;
pub mod scenarios;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::assessment::{
        Assessment, CertificationLevel, Mistake, MistakeSeverity, PerformanceReport,
    };
    pub use crate::config::{Difficulty, DifficultyProfile, SessionConfig, TimeScale};
    pub use crate::engine::events::EngineEvent;
    pub use crate::engine::plant::{SystemParameters, SystemSpec, SystemStatus};
    pub use crate::engine::procedure::{PhaseSpec, StepSpec, StepStatus};
    pub use crate::engine::{SimTime, StartupEngine};
    pub use crate::error::{EngineError, EngineResult};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
