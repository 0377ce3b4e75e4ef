//! Error types for the argumentation engine.
//!
//! Every variant here is fatal for a validation run: the engine stops before
//! any extension is computed and reports the first offending identifier.
//! Non-fatal conditions (truncated searches, local inconsistencies) are
//! carried inside the `ValidationReport` instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A specialized `Result` type for argumentation engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines the errors that can abort a validation run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Two concepts, premises or rules share an identifier.
    #[error("Duplicate identifier: {0}")]
    DuplicateId(String),

    /// An identifier does not follow the identifier syntax.
    #[error("Malformed identifier: {0:?}")]
    MalformedIdentifier(String),

    /// The input does not match the argument set schema.
    #[error("Malformed input at {id}: {reason}")]
    MalformedInput { id: String, reason: String },

    /// An item refers to a concept, premise or conclusion that was never loaded.
    #[error("Dangling reference in {id}: {reference} is not defined")]
    DanglingReference { id: String, reference: String },

    /// A rule is inconsistent with its own kind.
    #[error("Invalid rule definition {id}: {reason}")]
    InvalidRule { id: String, reason: String },

    /// A declared contrary pair cannot be used.
    #[error("Invalid contrary pair at {id}: {reason}")]
    InvalidContrary { id: String, reason: String },

    /// A derivable conclusion depends on itself.
    #[error("Circular support at {id}: {}", .cycle.join(" -> "))]
    CircularSupport { id: String, cycle: Vec<String> },

    /// Rule instantiation produced more arguments than allowed.
    #[error("Argument limit exceeded: more than {limit} arguments")]
    ArgumentLimitExceeded { limit: usize },

    /// The preference specification contains a cycle.
    #[error("Cyclic preference order at {id}")]
    CyclicPreference { id: String },

    /// The preference specification ranks something it must not rank.
    #[error("Contradictory preference at {id}: {reason}")]
    ContradictoryPreference { id: String, reason: String },

    /// A configuration value is out of its allowed range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A belief or discount value lies outside [0, 1].
    #[error("Belief value out of range for {id}: {value}")]
    BeliefOutOfRange { id: String, value: f64 },

    /// A report could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// The taxonomy class of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Malformed or dangling input.
    Structural,
    /// Cyclic or contradictory preference order, bad engine settings.
    Config,
    /// Numeric values out of range.
    Validation,
    /// Report encoding or decoding failed.
    Serialization,
}

impl Error {
    /// Returns the taxonomy class of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::DuplicateId(_)
            | Error::MalformedIdentifier(_)
            | Error::MalformedInput { .. }
            | Error::DanglingReference { .. }
            | Error::InvalidRule { .. }
            | Error::InvalidContrary { .. }
            | Error::CircularSupport { .. }
            | Error::ArgumentLimitExceeded { .. } => ErrorClass::Structural,
            Error::CyclicPreference { .. }
            | Error::ContradictoryPreference { .. }
            | Error::InvalidConfig(_) => ErrorClass::Config,
            Error::BeliefOutOfRange { .. } => ErrorClass::Validation,
            Error::SerializationError(_) => ErrorClass::Serialization,
        }
    }

    /// Returns the first offending identifier, if the error names one.
    pub fn offending_id(&self) -> Option<&str> {
        match self {
            Error::DuplicateId(id) | Error::MalformedIdentifier(id) => Some(id),
            Error::MalformedInput { id, .. }
            | Error::DanglingReference { id, .. }
            | Error::InvalidRule { id, .. }
            | Error::InvalidContrary { id, .. }
            | Error::CircularSupport { id, .. }
            | Error::CyclicPreference { id }
            | Error::ContradictoryPreference { id, .. }
            | Error::BeliefOutOfRange { id, .. } => Some(id),
            Error::ArgumentLimitExceeded { .. }
            | Error::InvalidConfig(_)
            | Error::SerializationError(_) => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
