//! Explanation Generator
//!
//! Renders one trace per argument in construction order: the proof tree,
//! every attack it takes part in with the preference comparison behind it,
//! its status and belief, and the fallacies that name it. The output depends
//! only on the evaluated graph, so identical input gives identical traces.

use serde::{Deserialize, Serialize};

use crate::attack::AttackGraph;
use crate::belief::BeliefLabels;
use crate::config::StatusWeights;
use crate::fallacy::Fallacy;
use crate::model::{ArgumentId, ArgumentNode, ArgumentSet};
use crate::semantics::Evaluation;
use crate::structure::StructuralReport;

const INDENT: &str = "  ";

/// The rendered explanation of one argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentTrace {
    pub argument_id: ArgumentId,
    pub lines: Vec<String>,
}

pub struct Explainer<'a> {
    pub set: &'a ArgumentSet,
    pub structure: &'a StructuralReport,
    pub graph: &'a AttackGraph,
    pub beliefs: &'a BeliefLabels,
    pub evaluation: &'a Evaluation,
    pub fallacies: &'a [Fallacy],
    pub weights: &'a StatusWeights,
}

impl Explainer<'_> {
    pub fn explain(&self) -> Vec<ArgumentTrace> {
        self.set
            .arguments()
            .iter()
            .map(|argument| ArgumentTrace {
                argument_id: argument.id,
                lines: self.lines(argument.id),
            })
            .collect()
    }

    fn lines(&self, id: ArgumentId) -> Vec<String> {
        let argument = self.set.argument(id);
        let mut lines = vec![format!("{} concludes {}", id, argument.conclusion)];

        lines.push("proof:".to_string());
        self.proof(id, 1, &mut lines);

        if let Some(reason) = self.structure.exclusion(id) {
            lines.push(format!("excluded: {}", reason));
        }

        for attack in self.graph.involving(id) {
            let role = if attack.attacker == id { "attacks" } else { "attacked" };
            lines.push(format!("{}: {}", role, attack.describe()));
        }

        let status = self.evaluation.status(id);
        let belief = self.beliefs.get(id);
        lines.push(format!(
            "status: {} under {} semantics, belief {}, acceptability {}",
            status.name(),
            self.evaluation.semantics.name(),
            belief,
            self.evaluation.acceptability(id, belief, self.weights)
        ));

        for fallacy in self.fallacies.iter().filter(|f| f.implicates(id)) {
            lines.push(format!(
                "fallacy {}: {}",
                fallacy.pattern.name(),
                fallacy.explanation
            ));
        }
        lines
    }

    fn proof(&self, id: ArgumentId, depth: usize, lines: &mut Vec<String>) {
        let argument = self.set.argument(id);
        let pad = INDENT.repeat(depth);
        match &argument.node {
            ArgumentNode::Premise { premise } => {
                let source = self
                    .set
                    .premise(premise)
                    .map_or("unknown", |p| p.source.name());
                lines.push(format!(
                    "{}{} {} [{} premise, belief {}]",
                    pad,
                    id,
                    premise,
                    source,
                    self.beliefs.get(id)
                ));
            }
            ArgumentNode::Rule { rule, subs } => {
                let (arrow, kind) = self
                    .set
                    .rule(rule)
                    .map_or(("?", "unknown"), |r| (r.kind.arrow(), r.kind.name()));
                let antecedents: Vec<String> = subs
                    .iter()
                    .map(|s| self.set.argument(*s).conclusion.clone())
                    .collect();
                lines.push(format!(
                    "{}{} {} {} {} by {} [{} rule, belief {}]",
                    pad,
                    id,
                    antecedents.join(", "),
                    arrow,
                    argument.conclusion,
                    rule,
                    kind,
                    self.beliefs.get(id)
                ));
                for sub in subs {
                    self.proof(*sub, depth + 1, lines);
                }
            }
        }
    }
}
