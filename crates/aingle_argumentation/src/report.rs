//! Validation report
//!
//! The immutable output of one validation run. Its JSON form is stable:
//! emitting a report and parsing it back yields an equal report, and two
//! runs over the same input produce byte-identical JSON.

use serde::{Deserialize, Serialize};

use crate::attack::Attack;
use crate::config::Semantics;
use crate::error::{Error, Result};
use crate::explain::ArgumentTrace;
use crate::fallacy::{Fallacy, FallacyPattern};
use crate::model::{ArgumentId, Strength};
use crate::semantics::{EvaluationWarning, Status};

/// Status and belief of one argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentReport {
    pub id: ArgumentId,
    pub conclusion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_rule: Option<String>,
    pub strength: Strength,
    pub status: Status,
    pub belief_label: f64,
    pub acceptability: f64,
    /// Why the argument was kept out of the attack graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded: Option<String>,
}

/// Machine-readable warning codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    SemanticsTruncated,
    NoStableExtension,
}

/// A non-fatal condition attached to the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWarning {
    pub code: WarningCode,
    pub message: String,
}

impl From<&EvaluationWarning> for ReportWarning {
    fn from(warning: &EvaluationWarning) -> Self {
        let code = match warning {
            EvaluationWarning::SemanticsTruncated { .. } => WarningCode::SemanticsTruncated,
            EvaluationWarning::NoStableExtension => WarningCode::NoStableExtension,
        };
        Self {
            code,
            message: warning.message(),
        }
    }
}

/// Counters describing the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub premises: usize,
    pub rules: usize,
    pub arguments: usize,
    pub excluded_arguments: usize,
    pub attacks: usize,
    pub defeats: usize,
    pub extensions: usize,
    pub grounded_rounds: usize,
    pub search_steps: usize,
}

/// The result of validating one argument set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub semantics: Semantics,
    /// Set when the extension search hit the iteration cap.
    pub truncated: bool,
    pub arguments: Vec<ArgumentReport>,
    pub attacks: Vec<Attack>,
    pub fallacies: Vec<Fallacy>,
    #[serde(default)]
    pub warnings: Vec<ReportWarning>,
    pub stats: ReportStats,
    #[serde(default)]
    pub trace: Vec<ArgumentTrace>,
}

impl ValidationReport {
    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::from)
    }

    /// Parses a report previously emitted by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::from)
    }

    /// Hex-encoded blake3 digest of the compact JSON form.
    pub fn fingerprint(&self) -> Result<String> {
        let canonical = serde_json::to_vec(self)?;
        Ok(hex::encode(blake3::hash(&canonical).as_bytes()))
    }

    pub fn argument(&self, id: ArgumentId) -> Option<&ArgumentReport> {
        self.arguments.get(id.index()).filter(|a| a.id == id)
    }

    /// Reports of every argument concluding `literal`.
    pub fn concluding<'a>(&'a self, literal: &'a str) -> impl Iterator<Item = &'a ArgumentReport> {
        self.arguments.iter().filter(move |a| a.conclusion == literal)
    }

    pub fn status(&self, id: ArgumentId) -> Option<Status> {
        self.argument(id).map(|a| a.status)
    }

    /// Fallacies matching `pattern`, in report order.
    pub fn fallacies_of(&self, pattern: FallacyPattern) -> impl Iterator<Item = &Fallacy> {
        self.fallacies.iter().filter(move |f| f.pattern == pattern)
    }

    /// Returns `true` if no fallacy was found and no warning raised.
    pub fn is_clean(&self) -> bool {
        self.fallacies.is_empty() && self.warnings.is_empty()
    }

    pub fn trace_of(&self, id: ArgumentId) -> Option<&ArgumentTrace> {
        self.trace.iter().find(|t| t.argument_id == id)
    }
}
