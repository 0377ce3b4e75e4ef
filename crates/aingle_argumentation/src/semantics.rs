//! Acceptability Evaluator
//!
//! Evaluates the defeat graph under grounded, preferred or stable semantics.
//!
//! # Grounded
//!
//! The grounded labelling is the least fixed point of: label IN every
//! argument whose defeaters are all OUT, label OUT every argument with an IN
//! defeater. Each round reads only the previous round's labels, so the
//! per-argument checks of one round can run in parallel; rounds run in order.
//! Labels only ever move away from UNDEC, so at most |arguments| + 1 rounds
//! are needed.
//!
//! # Preferred and stable
//!
//! Every preferred extension contains the grounded extension and excludes
//! everything grounded labels OUT, so the search only decides the grounded
//! UNDEC arguments. It is a depth-first include/exclude search with
//! conflict pruning, keeping the maximal admissible sets found. Each visited
//! node counts against the iteration cap. When the cap is exceeded the search
//! stops and the grounded result is returned, marked truncated.

use std::collections::BTreeSet;

use log::{debug, trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::attack::AttackGraph;
use crate::config::{Semantics, StatusWeights, ValidationConfig};
use crate::model::ArgumentId;

/// Justification status of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
    #[serde(rename = "UNDEC")]
    Undec,
}

impl Status {
    pub fn name(&self) -> &'static str {
        match self {
            Status::In => "IN",
            Status::Out => "OUT",
            Status::Undec => "UNDEC",
        }
    }

    /// The configured weight of this status.
    pub fn weight(&self, weights: &StatusWeights) -> f64 {
        match self {
            Status::In => weights.accepted,
            Status::Out => weights.rejected,
            Status::Undec => weights.undecided,
        }
    }
}

/// A set of jointly acceptable arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub semantics: Semantics,
    pub members: BTreeSet<ArgumentId>,
}

/// Non-fatal evaluation conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluationWarning {
    /// The extension search hit the iteration cap.
    SemanticsTruncated {
        semantics: Semantics,
        cap: usize,
    },
    /// No stable extension exists.
    NoStableExtension,
}

impl EvaluationWarning {
    pub fn message(&self) -> String {
        match self {
            EvaluationWarning::SemanticsTruncated { semantics, cap } => format!(
                "{} extension search exceeded {} steps; reporting the grounded extension",
                semantics.name(),
                cap
            ),
            EvaluationWarning::NoStableExtension => {
                "no stable extension exists; reporting the grounded extension".to_string()
            }
        }
    }
}

/// The outcome of evaluating one defeat graph.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// The requested semantics.
    pub semantics: Semantics,
    /// Extensions the statuses were derived from.
    pub extensions: Vec<Extension>,
    /// Per argument index; arguments outside the graph are OUT.
    pub statuses: Vec<Status>,
    pub truncated: bool,
    pub warnings: Vec<EvaluationWarning>,
    /// Rounds of the grounded fixed point.
    pub rounds: usize,
    /// Nodes visited by the extension search.
    pub search_steps: usize,
}

impl Evaluation {
    pub fn status(&self, id: ArgumentId) -> Status {
        self.statuses[id.index()]
    }

    /// Belief blended with the status weight. Never replaces the status.
    pub fn acceptability(&self, id: ArgumentId, belief: f64, weights: &StatusWeights) -> f64 {
        crate::belief::round_label(belief * self.status(id).weight(weights))
    }
}

/// Evaluates `graph` over `argument_count` arguments under `config.semantics`.
pub fn evaluate(graph: &AttackGraph, argument_count: usize, config: &ValidationConfig) -> Evaluation {
    let (grounded, rounds) = grounded_labels(graph, argument_count, config.parallel);
    let grounded_members: BTreeSet<ArgumentId> = graph
        .nodes()
        .iter()
        .copied()
        .filter(|id| grounded[id.index()] == Status::In)
        .collect();
    debug!(
        "Grounded extension: {} of {} arguments IN after {} rounds",
        grounded_members.len(),
        graph.nodes().len(),
        rounds
    );

    let grounded_result = |warnings: Vec<EvaluationWarning>, truncated: bool, steps: usize| {
        Evaluation {
            semantics: config.semantics,
            extensions: vec![Extension {
                semantics: Semantics::Grounded,
                members: grounded_members.clone(),
            }],
            statuses: grounded.clone(),
            truncated,
            warnings,
            rounds,
            search_steps: steps,
        }
    };

    if config.semantics == Semantics::Grounded {
        return grounded_result(Vec::new(), false, 0);
    }

    let cap = config.effective_cap(graph.nodes().len());
    let candidates: Vec<ArgumentId> = graph
        .nodes()
        .iter()
        .copied()
        .filter(|id| grounded[id.index()] == Status::Undec)
        .collect();

    let mut search = Search {
        graph,
        candidates: &candidates,
        cap,
        steps: 0,
        found: Vec::new(),
    };
    let mut current = grounded_members.clone();
    if search.run(0, &mut current).is_err() {
        let warning = EvaluationWarning::SemanticsTruncated {
            semantics: config.semantics,
            cap,
        };
        warn!("{}", warning.message());
        return grounded_result(vec![warning], true, search.steps);
    }
    let steps = search.steps;
    let mut preferred = maximal(search.found);
    debug!(
        "Preferred search: {} extensions over {} candidates in {} steps",
        preferred.len(),
        candidates.len(),
        steps
    );

    let semantics = config.semantics;
    if semantics == Semantics::Stable {
        preferred.retain(|members| is_stable(graph, members));
        if preferred.is_empty() {
            let warning = EvaluationWarning::NoStableExtension;
            warn!("{}", warning.message());
            return grounded_result(vec![warning], false, steps);
        }
    }

    let extensions: Vec<Extension> = preferred
        .into_iter()
        .map(|members| Extension { semantics, members })
        .collect();
    let statuses = statuses_from(graph, argument_count, &extensions);

    Evaluation {
        semantics,
        extensions,
        statuses,
        truncated: false,
        warnings: Vec::new(),
        rounds,
        search_steps: steps,
    }
}

/// The grounded labelling and the number of rounds it took.
pub fn grounded_labels(graph: &AttackGraph, argument_count: usize, parallel: bool) -> (Vec<Status>, usize) {
    let mut labels = vec![Status::Out; argument_count];
    for id in graph.nodes() {
        labels[id.index()] = Status::Undec;
    }

    let mut rounds = 0;
    loop {
        rounds += 1;
        let step = |id: &ArgumentId| {
            let defeaters = graph.defeaters(*id);
            let next = if defeaters.iter().any(|d| labels[d.index()] == Status::In) {
                Status::Out
            } else if defeaters.iter().all(|d| labels[d.index()] == Status::Out) {
                Status::In
            } else {
                Status::Undec
            };
            (*id, next)
        };
        let changes: Vec<(ArgumentId, Status)> = if parallel {
            graph
                .nodes()
                .par_iter()
                .map(step)
                .filter(|(id, next)| labels[id.index()] != *next)
                .collect()
        } else {
            graph
                .nodes()
                .iter()
                .map(step)
                .filter(|(id, next)| labels[id.index()] != *next)
                .collect()
        };
        if changes.is_empty() {
            return (labels, rounds);
        }
        trace!("Grounded round {}: {} labels changed", rounds, changes.len());
        for (id, next) in changes {
            labels[id.index()] = next;
        }
    }
}

/// IN if in every extension, OUT if defeated by an IN argument, UNDEC otherwise.
fn statuses_from(graph: &AttackGraph, argument_count: usize, extensions: &[Extension]) -> Vec<Status> {
    let mut statuses = vec![Status::Out; argument_count];
    for &id in graph.nodes() {
        statuses[id.index()] = if extensions.iter().all(|e| e.members.contains(&id)) {
            Status::In
        } else {
            Status::Undec
        };
    }
    for &id in graph.nodes() {
        if statuses[id.index()] == Status::Undec
            && graph
                .defeaters(id)
                .iter()
                .any(|d| statuses[d.index()] == Status::In)
        {
            statuses[id.index()] = Status::Out;
        }
    }
    statuses
}

/// Every argument outside `members` is defeated by a member.
fn is_stable(graph: &AttackGraph, members: &BTreeSet<ArgumentId>) -> bool {
    graph
        .nodes()
        .iter()
        .filter(|id| !members.contains(id))
        .all(|id| graph.defeaters(*id).iter().any(|d| members.contains(d)))
}

/// Keeps the sets that are not a proper subset of another, first-found order.
fn maximal(sets: Vec<BTreeSet<ArgumentId>>) -> Vec<BTreeSet<ArgumentId>> {
    let mut kept: Vec<BTreeSet<ArgumentId>> = Vec::new();
    for (i, set) in sets.iter().enumerate() {
        let dominated = sets
            .iter()
            .enumerate()
            .any(|(j, other)| i != j && set.len() < other.len() && set.is_subset(other));
        if !dominated && !kept.contains(set) {
            kept.push(set.clone());
        }
    }
    kept
}

/// The iteration cap was hit.
struct CapExceeded;

struct Search<'a> {
    graph: &'a AttackGraph,
    candidates: &'a [ArgumentId],
    cap: usize,
    steps: usize,
    found: Vec<BTreeSet<ArgumentId>>,
}

impl Search<'_> {
    fn run(&mut self, index: usize, current: &mut BTreeSet<ArgumentId>) -> Result<(), CapExceeded> {
        self.steps += 1;
        if self.steps > self.cap {
            return Err(CapExceeded);
        }

        let Some(&candidate) = self.candidates.get(index) else {
            if self.is_admissible(current) {
                self.found.push(current.clone());
            }
            return Ok(());
        };

        if self.compatible(candidate, current) {
            current.insert(candidate);
            let included = self.run(index + 1, current);
            current.remove(&candidate);
            included?;
        }
        self.run(index + 1, current)
    }

    /// Adding `candidate` keeps `current` conflict-free.
    fn compatible(&self, candidate: ArgumentId, current: &BTreeSet<ArgumentId>) -> bool {
        !self.graph.defeats(candidate, candidate)
            && !current.iter().any(|m| {
                self.graph.defeats(*m, candidate) || self.graph.defeats(candidate, *m)
            })
    }

    /// Every defeater of a member is defeated by some member.
    fn is_admissible(&self, members: &BTreeSet<ArgumentId>) -> bool {
        members.iter().all(|m| {
            self.graph
                .defeaters(*m)
                .iter()
                .all(|d| self.graph.defeated_by(*d).iter().any(|x| members.contains(x)))
        })
    }
}
