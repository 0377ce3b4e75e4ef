//! Fallacy Detector
//!
//! Each pattern is matched independently over the evaluated graph, and
//! several fallacies may implicate the same argument. Findings are emitted in
//! pattern order, then in argument or input order within a pattern.

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::attack::AttackGraph;
use crate::belief::BeliefLabels;
use crate::model::{ArgumentId, ArgumentSet, Strength};
use crate::semantics::{Evaluation, Status};
use crate::structure::{IssueKind, StructuralReport};

/// The fallacy catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FallacyPattern {
    CircularSupport,
    InvalidInferencePattern,
    LocalInconsistency,
    UnsupportedConclusion,
    WeakDefeasibleChain,
    IrrelevantPremise,
}

impl FallacyPattern {
    pub fn name(&self) -> &'static str {
        match self {
            FallacyPattern::CircularSupport => "CircularSupport",
            FallacyPattern::InvalidInferencePattern => "InvalidInferencePattern",
            FallacyPattern::LocalInconsistency => "LocalInconsistency",
            FallacyPattern::UnsupportedConclusion => "UnsupportedConclusion",
            FallacyPattern::WeakDefeasibleChain => "WeakDefeasibleChain",
            FallacyPattern::IrrelevantPremise => "IrrelevantPremise",
        }
    }
}

/// One matched pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fallacy {
    pub pattern: FallacyPattern,
    pub argument_ids: Vec<ArgumentId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rule_ids: Vec<String>,
    /// Indices into the attack list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attack_ids: Vec<usize>,
    pub explanation: String,
}

impl Fallacy {
    fn new(pattern: FallacyPattern, argument_ids: Vec<ArgumentId>, explanation: String) -> Self {
        Self {
            pattern,
            argument_ids,
            rule_ids: Vec::new(),
            attack_ids: Vec::new(),
            explanation,
        }
    }

    fn rules(mut self, rule_ids: Vec<String>) -> Self {
        self.rule_ids = rule_ids;
        self
    }

    fn attacks(mut self, attack_ids: Vec<usize>) -> Self {
        self.attack_ids = attack_ids;
        self
    }

    /// Returns `true` if the fallacy names `id`.
    pub fn implicates(&self, id: ArgumentId) -> bool {
        self.argument_ids.contains(&id)
    }
}

/// Everything the patterns are matched against.
pub struct Detector<'a> {
    pub set: &'a ArgumentSet,
    pub structure: &'a StructuralReport,
    pub graph: &'a AttackGraph,
    pub beliefs: &'a BeliefLabels,
    pub evaluation: &'a Evaluation,
    pub threshold: f64,
}

impl Detector<'_> {
    /// Runs the whole catalogue.
    pub fn detect(&self) -> Vec<Fallacy> {
        let mut fallacies = self.structural();
        fallacies.extend(self.unsupported_conclusions());
        fallacies.extend(self.weak_chains());
        fallacies.extend(self.irrelevant_premises());
        fallacies.sort_by_key(|f| f.pattern);

        debug!("Fallacy detection: {} findings", fallacies.len());
        fallacies
    }

    /// Structural issues re-reported with a fallacy label.
    fn structural(&self) -> Vec<Fallacy> {
        self.structure
            .issues()
            .iter()
            .map(|issue| {
                let pattern = match issue.kind {
                    IssueKind::UngroundedCycle => FallacyPattern::CircularSupport,
                    IssueKind::ContradictoryChain | IssueKind::DuplicateAntecedent => {
                        FallacyPattern::InvalidInferencePattern
                    }
                    IssueKind::Inapplicable => FallacyPattern::LocalInconsistency,
                };
                let explanation = match issue.kind {
                    IssueKind::UngroundedCycle => format!(
                        "{}; each conclusion in the loop is only supported by itself",
                        issue.message
                    ),
                    _ => issue.message.clone(),
                };
                Fallacy::new(pattern, issue.argument_ids.clone(), explanation)
                    .rules(issue.rule_ids.clone())
            })
            .collect()
    }

    /// Claims with no argument that is both not OUT and above the threshold.
    fn unsupported_conclusions(&self) -> Vec<Fallacy> {
        let mut found = Vec::new();
        for claim in self.set.claims() {
            let arguments = self.set.concluding(claim);
            if arguments.is_empty() {
                found.push(Fallacy::new(
                    FallacyPattern::UnsupportedConclusion,
                    Vec::new(),
                    format!("claim {} is asserted but no argument concludes it", claim),
                ));
                continue;
            }

            let supported = arguments.iter().any(|id| {
                self.evaluation.status(*id) != Status::Out && self.beliefs.get(*id) >= self.threshold
            });
            if supported {
                continue;
            }

            let details: Vec<String> = arguments
                .iter()
                .map(|id| {
                    format!(
                        "{} is {} with belief {}",
                        id,
                        self.evaluation.status(*id).name(),
                        self.beliefs.get(*id)
                    )
                })
                .collect();
            let attack_ids: Vec<usize> = self
                .graph
                .attacks()
                .iter()
                .enumerate()
                .filter(|(_, a)| a.is_defeat() && arguments.contains(&a.target))
                .filter(|(_, a)| self.evaluation.status(a.attacker) == Status::In)
                .map(|(i, _)| i)
                .collect();
            found.push(
                Fallacy::new(
                    FallacyPattern::UnsupportedConclusion,
                    arguments.to_vec(),
                    format!(
                        "claim {} lacks acceptable support (threshold {}): {}",
                        claim,
                        self.threshold,
                        details.join("; ")
                    ),
                )
                .attacks(attack_ids),
            );
        }
        found
    }

    /// Accepted defeasible arguments whose belief falls below the threshold.
    fn weak_chains(&self) -> Vec<Fallacy> {
        self.set
            .arguments()
            .iter()
            .filter(|a| a.strength == Strength::Defeasible)
            .filter(|a| self.evaluation.status(a.id) == Status::In)
            .filter(|a| self.beliefs.get(a.id) < self.threshold)
            .map(|a| {
                Fallacy::new(
                    FallacyPattern::WeakDefeasibleChain,
                    vec![a.id],
                    format!(
                        "{} concluding {} is accepted but its belief {} is below {} after {} defeasible step(s)",
                        a.id,
                        a.conclusion,
                        self.beliefs.get(a.id),
                        self.threshold,
                        a.defeasible_rules.len()
                    ),
                )
                .rules(a.defeasible_rules.iter().cloned().collect())
            })
            .collect()
    }

    /// Premises that feed no rule application on a surviving proof path,
    /// that is every rule argument built on them is OUT. Premises named as a
    /// claim or a rule exception, or taking part in an attack, are kept.
    fn irrelevant_premises(&self) -> Vec<Fallacy> {
        let used: HashSet<&str> = self
            .set
            .arguments()
            .iter()
            .filter(|a| !a.is_premise() && self.structure.is_valid(a.id))
            .filter(|a| self.evaluation.status(a.id) != Status::Out)
            .flat_map(|a| a.premises.iter().map(String::as_str))
            .collect();
        let exceptions: HashSet<&str> = self
            .set
            .rules()
            .filter_map(|r| r.exception_id.as_deref())
            .collect();
        let claims: HashSet<&str> = self.set.claims().iter().map(String::as_str).collect();

        let mut found = Vec::new();
        for premise in self.set.premises() {
            let id = premise.id.as_str();
            if used.contains(id) || exceptions.contains(id) || claims.contains(id) {
                continue;
            }
            let arguments: Vec<ArgumentId> = self
                .set
                .concluding(id)
                .iter()
                .copied()
                .filter(|a| self.set.argument(*a).is_premise())
                .collect();
            if arguments.iter().any(|a| self.graph.is_engaged(*a)) {
                continue;
            }
            found.push(Fallacy::new(
                FallacyPattern::IrrelevantPremise,
                arguments,
                format!(
                    "premise {} is not a dependency of any rule firing on an accepted or undecided proof path",
                    premise.id
                ),
            ));
        }
        found
    }
}
