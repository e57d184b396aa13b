//! Error types for coldship.
//!
//! Domain failures (a step attempted out of order, a system whose
//! prerequisites are not ready) are not errors: they are recoverable
//! outcomes reported as `Ok(false)` and logged as mistakes. `EngineError`
//! covers the programmer-error class only: unknown identifiers and
//! malformed catalogs or configuration.

use thiserror::Error;

/// Result type alias for coldship operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Unified error type for all coldship operations.
#[derive(Debug, Error)]
pub enum EngineError {
    // ===== Identifier Errors =====
    /// A system id that does not exist in the machinery plant.
    #[error("unknown system '{0}'")]
    UnknownSystem(String),

    /// A step id that does not exist in the procedure catalog.
    #[error("unknown step '{0}'")]
    UnknownStep(String),

    // ===== Catalog Errors =====
    /// A system or step id declared more than once.
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId {
        /// What kind of record carries the duplicate ("system" or "step").
        kind: &'static str,
        /// The duplicated identifier.
        id: String,
    },

    /// A dependency that names a nonexistent record.
    #[error("{kind} '{id}' depends on unknown {kind} '{dependency}'")]
    UnknownDependency {
        /// What kind of record ("system" or "step").
        kind: &'static str,
        /// The record declaring the dependency.
        id: String,
        /// The missing dependency id.
        dependency: String,
    },

    /// A step linked to a system the plant does not contain.
    #[error("step '{step}' is linked to unknown system '{system}'")]
    UnknownLinkedSystem {
        /// The step declaring the linkage.
        step: String,
        /// The missing system id.
        system: String,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check whether this error names an unknown identifier.
    ///
    /// These indicate caller bugs rather than bad data files.
    #[must_use]
    pub const fn is_unknown_id(&self) -> bool {
        matches!(
            self,
            Self::UnknownSystem(_) | Self::UnknownStep(_) | Self::UnknownLinkedSystem { .. }
        )
    }
}
