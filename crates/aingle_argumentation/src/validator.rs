//! Argument Validator - runs the validation pipeline end to end
//!
//! Stages run strictly forward, each consuming only the output of the ones
//! before it:
//! - Argument Model (load and instantiate)
//! - Structural Validator
//! - Attack Graph Builder
//! - Belief Propagator
//! - Acceptability Evaluator
//! - Fallacy Detector
//! - Explanation Generator

use log::debug;
use rayon::prelude::*;

use crate::attack::AttackGraph;
use crate::belief::BeliefLabels;
use crate::config::ValidationConfig;
use crate::error::Result;
use crate::explain::Explainer;
use crate::fallacy::Detector;
use crate::input::ArgumentInput;
use crate::model::ArgumentSet;
use crate::report::{ArgumentReport, ReportStats, ReportWarning, ValidationReport};
use crate::semantics;
use crate::structure;

/// A trait defining the interface for an argumentation validator.
///
/// Implementors take a structured argument set and return a report, or a
/// fatal error naming the first offending identifier.
pub trait ArgumentationValidator {
    /// Validates one structured argument set.
    ///
    /// # Arguments
    ///
    /// * `input` - The argument set produced by the upstream parser.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `ValidationReport`, or an `Error` if the
    /// input or configuration is unusable. No partial report is produced.
    fn validate(&self, input: &ArgumentInput) -> Result<ValidationReport>;

    /// Parses an argument set from JSON and validates it.
    fn validate_json(&self, json: &str) -> Result<ValidationReport> {
        let input = ArgumentInput::from_json(json)?;
        self.validate(&input)
    }

    /// Returns the configuration used for every run.
    fn config(&self) -> &ValidationConfig;
}

/// The default `ArgumentationValidator`.
///
/// Holds only immutable configuration, so one validator can serve concurrent
/// runs.
#[derive(Debug, Clone, Default)]
pub struct ArgumentValidator {
    config: ValidationConfig,
}

impl ArgumentValidator {
    /// Creates a validator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validator with a specific configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration applied to every run.
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validates several independent argument sets on the rayon pool.
    ///
    /// Results are returned in input order.
    pub fn validate_all(&self, inputs: &[ArgumentInput]) -> Vec<Result<ValidationReport>> {
        inputs.par_iter().map(|input| self.validate(input)).collect()
    }

    fn run(&self, input: &ArgumentInput) -> Result<ValidationReport> {
        let config = &self.config;
        config.validate()?;

        let set = ArgumentSet::load(input, config.max_arguments)?;
        let structure = structure::check(&set);
        let graph = AttackGraph::build(&set, &structure, config);
        let beliefs = BeliefLabels::propagate(&set, config);
        let evaluation = semantics::evaluate(&graph, set.len(), config);

        let fallacies = Detector {
            set: &set,
            structure: &structure,
            graph: &graph,
            beliefs: &beliefs,
            evaluation: &evaluation,
            threshold: config.acceptance_threshold,
        }
        .detect();

        let trace = Explainer {
            set: &set,
            structure: &structure,
            graph: &graph,
            beliefs: &beliefs,
            evaluation: &evaluation,
            fallacies: &fallacies,
            weights: &config.status_weights,
        }
        .explain();

        let arguments: Vec<ArgumentReport> = set
            .arguments()
            .iter()
            .map(|argument| {
                let belief = beliefs.get(argument.id);
                ArgumentReport {
                    id: argument.id,
                    conclusion: argument.conclusion.clone(),
                    top_rule: argument.top_rule().map(str::to_string),
                    strength: argument.strength,
                    status: evaluation.status(argument.id),
                    belief_label: belief,
                    acceptability: evaluation.acceptability(
                        argument.id,
                        belief,
                        &config.status_weights,
                    ),
                    excluded: structure.exclusion(argument.id),
                }
            })
            .collect();

        let stats = ReportStats {
            premises: set.premises().count(),
            rules: set.rules().count(),
            arguments: set.len(),
            excluded_arguments: set.len() - graph.nodes().len(),
            attacks: graph.attacks().len(),
            defeats: graph.defeat_count(),
            extensions: evaluation.extensions.len(),
            grounded_rounds: evaluation.rounds,
            search_steps: evaluation.search_steps,
        };

        debug!(
            "Validation finished: {} arguments, {} fallacies, truncated: {}",
            stats.arguments,
            fallacies.len(),
            evaluation.truncated
        );

        Ok(ValidationReport {
            semantics: evaluation.semantics,
            truncated: evaluation.truncated,
            arguments,
            attacks: graph.attacks().to_vec(),
            fallacies,
            warnings: evaluation.warnings.iter().map(ReportWarning::from).collect(),
            stats,
            trace,
        })
    }
}

impl ArgumentationValidator for ArgumentValidator {
    fn validate(&self, input: &ArgumentInput) -> Result<ValidationReport> {
        self.run(input)
    }

    fn config(&self) -> &ValidationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Semantics;
    use crate::error::{Error, ErrorClass};
    use crate::input::{Concept, Premise, Rule};
    use crate::semantics::Status;

    fn input() -> ArgumentInput {
        ArgumentInput::new()
            .concept(Concept::new("c", "claim"))
            .premise(Premise::new("a", "c", 0.9))
            .premise(Premise::new("b", "c", 0.8))
            .rule(Rule::defeasible("r1").when("a").when("b").then("q").build())
    }

    #[test]
    fn test_validate_simple_argument() {
        let report = ArgumentValidator::new().validate(&input()).unwrap();

        assert_eq!(report.semantics, Semantics::Grounded);
        assert!(!report.truncated);
        assert_eq!(report.stats.arguments, 3);
        assert!(report.arguments.iter().all(|a| a.status == Status::In));
        assert_eq!(report.arguments[2].belief_label, 0.648);
        assert_eq!(report.trace.len(), 3);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let validator =
            ArgumentValidator::with_config(ValidationConfig::default().with_discount(2.0));
        let err = validator.validate(&input()).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Config);
    }

    #[test]
    fn test_structural_error_is_fatal() {
        let bad = input().premise(Premise::new("a", "c", 0.5));
        let err = ArgumentValidator::new().validate(&bad).unwrap_err();
        assert_eq!(err, Error::DuplicateId("a".to_string()));
    }

    #[test]
    fn test_validate_json() {
        let json = input().to_json().unwrap();
        let report = ArgumentValidator::new().validate_json(&json).unwrap();
        assert_eq!(report.stats.rules, 1);
    }

    #[test]
    fn test_validate_all_keeps_order() {
        let inputs = vec![input(), input().premise(Premise::new("a", "c", 0.5)), input()];
        let results = ArgumentValidator::new().validate_all(&inputs);

        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(results[0].as_ref().unwrap(), results[2].as_ref().unwrap());
    }
}
