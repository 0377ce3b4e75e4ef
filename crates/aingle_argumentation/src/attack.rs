//! Attack Graph Builder
//!
//! Derives undermining, rebutting and undercutting attacks between the
//! structurally valid arguments and resolves each one to a defeat with the
//! preference order.
//!
//! Discovery compares every ordered pair of arguments and, for each pair,
//! every sub-argument of the target. This is O(n²) in the number of
//! arguments and is the dominant cost for large argument sets. The pairwise
//! pass runs per attacker on the rayon pool when enabled; results are
//! collected in attacker order, so the graph is the same either way.

use std::collections::BTreeSet;

use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{LinkPolicy, ValidationConfig};
use crate::model::{negate, Argument, ArgumentId, ArgumentNode, ArgumentSet};
use crate::structure::StructuralReport;

/// The three ASPIC+ attack kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    /// Targets a non-axiom premise.
    Undermining,
    /// Targets the conclusion of a defeasible rule application.
    Rebutting,
    /// Targets the applicability of a defeasible rule.
    Undercutting,
}

impl AttackKind {
    pub fn name(&self) -> &'static str {
        match self {
            AttackKind::Undermining => "undermining",
            AttackKind::Rebutting => "rebutting",
            AttackKind::Undercutting => "undercutting",
        }
    }
}

/// Where in the target an attack lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "on", rename_all = "snake_case")]
pub enum AttackLocus {
    Premise { premise: String, sub: ArgumentId },
    Conclusion { literal: String, sub: ArgumentId },
    Rule { rule: String, sub: ArgumentId },
}

impl AttackLocus {
    /// The attacked sub-argument.
    pub fn sub(&self) -> ArgumentId {
        match self {
            AttackLocus::Premise { sub, .. }
            | AttackLocus::Conclusion { sub, .. }
            | AttackLocus::Rule { sub, .. } => *sub,
        }
    }

    /// The attacked premise, conclusion or rule id.
    pub fn item(&self) -> &str {
        match self {
            AttackLocus::Premise { premise, .. } => premise,
            AttackLocus::Conclusion { literal, .. } => literal,
            AttackLocus::Rule { rule, .. } => rule,
        }
    }
}

/// The preference comparison that decided an attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Verdict {
    /// Undercuts are not subject to preference.
    Unconditional,
    /// The attacked sub-argument is not strictly preferred.
    Succeeds {
        attacker_basis: Vec<String>,
        target_basis: Vec<String>,
    },
    /// The attacked sub-argument is strictly preferred.
    Blocked {
        attacker_basis: Vec<String>,
        target_basis: Vec<String>,
    },
}

/// A recorded attack and its resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    pub attacker: ArgumentId,
    pub target: ArgumentId,
    pub kind: AttackKind,
    pub locus: AttackLocus,
    pub verdict: Verdict,
}

impl Attack {
    /// Whether the attack succeeded as a defeat.
    pub fn is_defeat(&self) -> bool {
        !matches!(self.verdict, Verdict::Blocked { .. })
    }

    /// One-line rendering used in traces.
    pub fn describe(&self) -> String {
        let head = format!(
            "{} {} {} on {} {}",
            self.attacker,
            self.kind.name(),
            self.target,
            self.locus.sub(),
            self.locus.item()
        );
        match &self.verdict {
            Verdict::Unconditional => format!("{}: defeat (undercut, no preference check)", head),
            Verdict::Succeeds {
                attacker_basis,
                target_basis,
            } => format!(
                "{}: defeat ({{{}}} is not weaker than {{{}}}, and {{{}}} is not strictly preferred)",
                head,
                attacker_basis.join(", "),
                target_basis.join(", "),
                target_basis.join(", ")
            ),
            Verdict::Blocked {
                attacker_basis,
                target_basis,
            } => format!(
                "{}: blocked ({{{}}} is strictly preferred to {{{}}})",
                head,
                target_basis.join(", "),
                attacker_basis.join(", ")
            ),
        }
    }
}

/// Attacks plus the defeat relation over valid arguments.
#[derive(Debug, Clone, Default)]
pub struct AttackGraph {
    attacks: Vec<Attack>,
    /// Valid arguments, in construction order.
    nodes: Vec<ArgumentId>,
    /// Per argument index: distinct defeaters, ascending.
    defeaters: Vec<Vec<ArgumentId>>,
    /// Per argument index: distinct arguments it defeats, ascending.
    defeats: Vec<Vec<ArgumentId>>,
}

impl AttackGraph {
    /// Discovers and resolves every attack among the valid arguments.
    pub fn build(set: &ArgumentSet, structure: &StructuralReport, config: &ValidationConfig) -> Self {
        let nodes = structure.valid_arguments();
        let builder = Builder {
            set,
            nodes: &nodes,
            policy: config.link_policy,
        };

        let per_attacker: Vec<Vec<Attack>> = if config.parallel {
            nodes.par_iter().map(|a| builder.attacks_from(*a)).collect()
        } else {
            nodes.iter().map(|a| builder.attacks_from(*a)).collect()
        };
        let attacks: Vec<Attack> = per_attacker.into_iter().flatten().collect();

        let mut defeaters = vec![Vec::new(); set.len()];
        let mut defeats = vec![Vec::new(); set.len()];
        for attack in attacks.iter().filter(|a| a.is_defeat()) {
            let list: &mut Vec<ArgumentId> = &mut defeaters[attack.target.index()];
            if !list.contains(&attack.attacker) {
                list.push(attack.attacker);
                defeats[attack.attacker.index()].push(attack.target);
            }
        }
        for list in defeaters.iter_mut().chain(defeats.iter_mut()) {
            list.sort_unstable();
        }

        let graph = Self {
            attacks,
            nodes,
            defeaters,
            defeats,
        };
        debug!(
            "Attack graph: {} arguments, {} attacks, {} defeats",
            graph.nodes.len(),
            graph.attacks.len(),
            graph.defeat_count()
        );
        graph
    }

    pub fn attacks(&self) -> &[Attack] {
        &self.attacks
    }

    /// Arguments taking part in the evaluation.
    pub fn nodes(&self) -> &[ArgumentId] {
        &self.nodes
    }

    pub fn defeaters(&self, id: ArgumentId) -> &[ArgumentId] {
        &self.defeaters[id.index()]
    }

    pub fn defeated_by(&self, id: ArgumentId) -> &[ArgumentId] {
        &self.defeats[id.index()]
    }

    /// Returns `true` if `a` defeats `b`.
    pub fn defeats(&self, a: ArgumentId, b: ArgumentId) -> bool {
        self.defeats[a.index()].binary_search(&b).is_ok()
    }

    /// Number of distinct (attacker, target) defeat edges.
    pub fn defeat_count(&self) -> usize {
        self.defeats.iter().map(Vec::len).sum()
    }

    /// Attacks where `id` is the attacker or the target, in discovery order.
    pub fn involving(&self, id: ArgumentId) -> impl Iterator<Item = &Attack> {
        self.attacks
            .iter()
            .filter(move |a| a.attacker == id || a.target == id)
    }

    /// Returns `true` if `id` attacks or is attacked by anything.
    pub fn is_engaged(&self, id: ArgumentId) -> bool {
        self.involving(id).next().is_some()
    }
}

struct Builder<'a> {
    set: &'a ArgumentSet,
    nodes: &'a [ArgumentId],
    policy: LinkPolicy,
}

impl Builder<'_> {
    fn attacks_from(&self, attacker: ArgumentId) -> Vec<Attack> {
        let a = self.set.argument(attacker);
        let mut found = Vec::new();

        for &target in self.nodes {
            if target == attacker {
                continue;
            }
            for &sub in &self.set.argument(target).sub_arguments {
                let b = self.set.argument(sub);
                for (kind, locus) in self.loci(a, b) {
                    let verdict = self.resolve(kind, a, b);
                    let attack = Attack {
                        attacker,
                        target,
                        kind,
                        locus,
                        verdict,
                    };
                    trace!("{}", attack.describe());
                    found.push(attack);
                }
            }
        }
        found
    }

    /// Attacks `a` mounts on the root of sub-argument `b`.
    fn loci(&self, a: &Argument, b: &Argument) -> Vec<(AttackKind, AttackLocus)> {
        let contrariness = self.set.contrariness();
        let mut loci = Vec::new();

        match &b.node {
            ArgumentNode::Premise { premise } => {
                if !b.ordinary_premises.is_empty() && contrariness.conflict(&a.conclusion, premise) {
                    loci.push((
                        AttackKind::Undermining,
                        AttackLocus::Premise {
                            premise: premise.clone(),
                            sub: b.id,
                        },
                    ));
                }
            }
            ArgumentNode::Rule { rule, .. } => {
                let Some(rule) = self.set.rule(rule) else {
                    return loci;
                };
                if !rule.is_defeasible() {
                    return loci;
                }
                if contrariness.conflict(&a.conclusion, &b.conclusion) {
                    loci.push((
                        AttackKind::Rebutting,
                        AttackLocus::Conclusion {
                            literal: b.conclusion.clone(),
                            sub: b.id,
                        },
                    ));
                }
                let names_exception = rule.exception_id.as_deref() == Some(a.conclusion.as_str());
                if names_exception || a.conclusion == negate(&rule.id) {
                    loci.push((
                        AttackKind::Undercutting,
                        AttackLocus::Rule {
                            rule: rule.id.clone(),
                            sub: b.id,
                        },
                    ));
                }
            }
        }
        loci
    }

    fn resolve(&self, kind: AttackKind, a: &Argument, b: &Argument) -> Verdict {
        if kind == AttackKind::Undercutting {
            return Verdict::Unconditional;
        }
        let (attacker_basis, target_basis) = bases(a, b, self.policy);
        let blocked = self
            .set
            .preference()
            .set_weaker(&attacker_basis, &target_basis);
        let attacker_basis = attacker_basis.into_iter().collect();
        let target_basis = target_basis.into_iter().collect();
        if blocked {
            Verdict::Blocked {
                attacker_basis,
                target_basis,
            }
        } else {
            Verdict::Succeeds {
                attacker_basis,
                target_basis,
            }
        }
    }
}

/// The defeasible rules an argument is ranked by under `policy`: its last
/// defeasible rules (last-link) or every defeasible rule on the path
/// (weakest-link).
pub fn rule_basis(argument: &Argument, policy: LinkPolicy) -> &BTreeSet<String> {
    match policy {
        LinkPolicy::LastLink => &argument.last_defeasible_rules,
        LinkPolicy::WeakestLink => &argument.defeasible_rules,
    }
}

/// The two sets an attack from `attacker` on sub-argument `target` is
/// decided on.
///
/// Rules are compared with rules. Non-axiom premises are compared only when
/// neither side has a defeasible rule. A side without defeasible rules is
/// never weaker than one with them, except when the target has no rule
/// basis at all: the attacker's rules are then weighed against the target's
/// premises, so a defeasible argument can still undermine an unranked
/// premise.
pub fn bases(
    attacker: &Argument,
    target: &Argument,
    policy: LinkPolicy,
) -> (BTreeSet<String>, BTreeSet<String>) {
    let attacker_rules = rule_basis(attacker, policy);
    let target_rules = rule_basis(target, policy);
    if target_rules.is_empty() {
        let attacker_side = if attacker_rules.is_empty() {
            &attacker.ordinary_premises
        } else {
            attacker_rules
        };
        (attacker_side.clone(), target.ordinary_premises.clone())
    } else {
        (attacker_rules.clone(), target_rules.clone())
    }
}
