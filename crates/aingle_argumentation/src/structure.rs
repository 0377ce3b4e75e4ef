//! Structural Validator
//!
//! Checks the local well-formedness of every instantiated argument. Nothing
//! here is fatal: malformed and inapplicable arguments are excluded from the
//! attack graph and reported as issues, which the fallacy detector later
//! turns into user-facing findings.
//!
//! Argument strength is derived bottom-up when the model is built (an
//! argument is defeasible as soon as one rule on its proof path is), so a
//! strict top rule over a defeasible sub-proof never claims strict status.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::{ArgumentId, ArgumentSet};

/// The category of a structural issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// An argument concludes the contrary of a conclusion in its own chain.
    ContradictoryChain,
    /// A rule lists the same antecedent more than once.
    DuplicateAntecedent,
    /// A rule's exception is asserted by an explicit premise.
    Inapplicable,
    /// Rules support each other in a loop that never fires.
    UngroundedCycle,
}

/// A non-fatal structural finding.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralIssue {
    pub kind: IssueKind,
    /// Implicated arguments: the offending one first, then those built on it.
    pub argument_ids: Vec<ArgumentId>,
    pub rule_ids: Vec<String>,
    pub message: String,
}

/// Whether an argument may enter the attack graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Health {
    Valid,
    /// The argument, or the sub-argument `root`, contradicts its own chain.
    Malformed { root: ArgumentId, reason: String },
    /// The argument, or the sub-argument `root`, applies a rule whose
    /// exception holds as a premise.
    Inapplicable {
        root: ArgumentId,
        rule: String,
        premise: String,
    },
}

impl Health {
    pub fn is_valid(&self) -> bool {
        matches!(self, Health::Valid)
    }
}

/// Outcome of the structural pass over one argument set.
#[derive(Debug, Clone, Default)]
pub struct StructuralReport {
    health: Vec<Health>,
    issues: Vec<StructuralIssue>,
}

impl StructuralReport {
    pub fn health(&self, id: ArgumentId) -> &Health {
        &self.health[id.index()]
    }

    pub fn is_valid(&self, id: ArgumentId) -> bool {
        self.health[id.index()].is_valid()
    }

    /// Arguments that enter the attack graph, in construction order.
    pub fn valid_arguments(&self) -> Vec<ArgumentId> {
        self.health
            .iter()
            .enumerate()
            .filter(|(_, h)| h.is_valid())
            .map(|(i, _)| ArgumentId(i))
            .collect()
    }

    pub fn issues(&self) -> &[StructuralIssue] {
        &self.issues
    }

    /// Human-readable reason an argument was excluded, if it was.
    pub fn exclusion(&self, id: ArgumentId) -> Option<String> {
        match &self.health[id.index()] {
            Health::Valid => None,
            Health::Malformed { root, reason } if *root == id => Some(reason.clone()),
            Health::Malformed { root, .. } => Some(format!("built on malformed {}", root)),
            Health::Inapplicable {
                root,
                rule,
                premise,
            } if *root == id => Some(format!(
                "rule {} is inapplicable: its exception {} is a premise",
                rule, premise
            )),
            Health::Inapplicable { root, .. } => Some(format!("built on inapplicable {}", root)),
        }
    }
}

/// Runs every structural check over `set`.
pub fn check(set: &ArgumentSet) -> StructuralReport {
    let mut health: Vec<Health> = Vec::with_capacity(set.len());

    // Sub-arguments always precede their parents, so one pass suffices.
    for argument in set.arguments() {
        let inherited = argument
            .subs()
            .iter()
            .map(|sub| &health[sub.index()])
            .find(|h| !h.is_valid())
            .cloned();

        let status = if let Some(inherited) = inherited {
            inherited
        } else if let Some((rule, premise)) = argument
            .top_rule()
            .and_then(|r| set.rule(r))
            .and_then(|r| Some((r.id.as_str(), r.exception_id.as_deref()?)))
            .filter(|(_, e)| set.premise(e).is_some())
        {
            Health::Inapplicable {
                root: argument.id,
                rule: rule.to_string(),
                premise: premise.to_string(),
            }
        } else if let Some(clash) = argument
            .chain_conclusions
            .iter()
            .find(|c| set.contrariness().conflict(c, &argument.conclusion))
        {
            Health::Malformed {
                root: argument.id,
                reason: format!(
                    "concludes {} against {} in its own chain",
                    argument.conclusion, clash
                ),
            }
        } else {
            Health::Valid
        };
        health.push(status);
    }

    let mut issues = Vec::new();

    for argument in set.arguments() {
        if let Health::Malformed { root, reason } = &health[argument.id.index()] {
            if *root == argument.id {
                issues.push(StructuralIssue {
                    kind: IssueKind::ContradictoryChain,
                    argument_ids: dependents(set, &health, argument.id),
                    rule_ids: argument.top_rule().map(str::to_string).into_iter().collect(),
                    message: format!("{} {}", argument.id, reason),
                });
            }
        }
    }

    for rule in set.rules() {
        let mut seen = std::collections::HashSet::new();
        let repeated: Vec<&str> = rule
            .antecedent_ids
            .iter()
            .filter(|a| !seen.insert(a.as_str()))
            .map(String::as_str)
            .collect();
        if !repeated.is_empty() {
            issues.push(StructuralIssue {
                kind: IssueKind::DuplicateAntecedent,
                argument_ids: set
                    .arguments()
                    .iter()
                    .filter(|a| a.top_rule() == Some(rule.id.as_str()))
                    .map(|a| a.id)
                    .collect(),
                rule_ids: vec![rule.id.clone()],
                message: format!(
                    "rule {} repeats antecedent {} in its schema",
                    rule.id,
                    repeated.join(", ")
                ),
            });
        }

        let roots: Vec<ArgumentId> = set
            .arguments()
            .iter()
            .filter(|a| {
                matches!(&health[a.id.index()],
                    Health::Inapplicable { root, rule: r, .. } if *root == a.id && *r == rule.id)
            })
            .map(|a| a.id)
            .collect();
        if let (Some(exception), false) = (&rule.exception_id, roots.is_empty()) {
            let mut argument_ids = Vec::new();
            for root in roots {
                for id in dependents(set, &health, root) {
                    if !argument_ids.contains(&id) {
                        argument_ids.push(id);
                    }
                }
            }
            issues.push(StructuralIssue {
                kind: IssueKind::Inapplicable,
                argument_ids,
                rule_ids: vec![rule.id.clone()],
                message: format!(
                    "premise {} asserts the exception of rule {}, so the rule cannot apply",
                    exception, rule.id
                ),
            });
        }
    }

    for cycle in set.unfired_cycles() {
        issues.push(StructuralIssue {
            kind: IssueKind::UngroundedCycle,
            argument_ids: Vec::new(),
            rule_ids: cycle.rules.clone(),
            message: format!(
                "rules {} support each other in a loop ({}) that no premise grounds",
                cycle.rules.join(", "),
                cycle.literals.join(" -> ")
            ),
        });
    }

    debug!(
        "Structural check: {} of {} arguments valid, {} issues",
        health.iter().filter(|h| h.is_valid()).count(),
        health.len(),
        issues.len()
    );

    StructuralReport { health, issues }
}

/// `root` followed by every argument that inherited its failure.
fn dependents(set: &ArgumentSet, health: &[Health], root: ArgumentId) -> Vec<ArgumentId> {
    let mut ids = vec![root];
    for argument in set.arguments() {
        if argument.id == root {
            continue;
        }
        let inherited = match &health[argument.id.index()] {
            Health::Malformed { root: r, .. } | Health::Inapplicable { root: r, .. } => *r == root,
            Health::Valid => false,
        };
        if inherited {
            ids.push(argument.id);
        }
    }
    ids
}
