//! AIngle Argumentation - Structured Argument Validation Engine
//!
//! This crate validates structured argument sets against ASPIC+-style
//! argumentation semantics. It builds every argument a set of premises and
//! rules supports, derives the attacks between them, propagates belief
//! through each proof tree, evaluates acceptability under grounded, preferred
//! or stable semantics, and reports fallacies with a symbolic trace.
//!
//! The engine never reads text: it consumes an already-structured
//! [`ArgumentInput`] and returns a [`ValidationReport`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Argumentation Engine                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                 Argument Model                        │   │
//! │  │  Load & Check │ Instantiation │ Preference Order     │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │            Structure & Attack Graph                   │   │
//! │  │  Well-formedness │ Undermine │ Rebut │ Undercut      │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │               Belief & Acceptability                  │   │
//! │  │  Propagation │ Grounded │ Preferred │ Stable         │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                           │                                  │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │                Fallacies & Report                     │   │
//! │  │  Pattern Catalogue │ Explanation Trace │ JSON        │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use aingle_argumentation::{
//!     ArgumentInput, ArgumentValidator, ArgumentationValidator, Concept, Premise, Rule, Status,
//! };
//!
//! let input = ArgumentInput::new()
//!     .concept(Concept::new("weather", "condition"))
//!     .premise(Premise::new("rain", "weather", 0.9))
//!     .rule(Rule::defeasible("r1").when("rain").then("wet_streets").build());
//!
//! let report = ArgumentValidator::new().validate(&input).unwrap();
//! let wet = report.concluding("wet_streets").next().unwrap();
//! assert_eq!(wet.status, Status::In);
//! assert_eq!(wet.belief_label, 0.81);
//! ```

pub mod attack;
pub mod belief;
pub mod config;
pub mod error;
pub mod explain;
pub mod fallacy;
pub mod input;
pub mod model;
pub mod preference;
pub mod report;
pub mod semantics;
pub mod structure;
pub mod validator;

// Re-exports
pub use attack::{Attack, AttackGraph, AttackKind, AttackLocus, Verdict};
pub use belief::BeliefLabels;
pub use config::{Combination, LinkPolicy, Semantics, StatusWeights, ValidationConfig};
pub use error::{Error, ErrorClass, Result};
pub use explain::ArgumentTrace;
pub use fallacy::{Fallacy, FallacyPattern};
pub use input::{ArgumentInput, Concept, Premise, PremiseSource, PreferenceSpec, Rule, RuleKind};
pub use model::{Argument, ArgumentId, ArgumentSet, Strength};
pub use preference::PreferenceOrder;
pub use report::{ArgumentReport, ReportStats, ReportWarning, ValidationReport, WarningCode};
pub use semantics::{Evaluation, EvaluationWarning, Extension, Status};
pub use structure::{IssueKind, StructuralIssue, StructuralReport};
pub use validator::{ArgumentValidator, ArgumentationValidator};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
