//! Preference order over defeasible rules and non-axiom premises
//!
//! The order is the transitive closure of the declared pairs. It is checked
//! for cycles with Tarjan's SCC over a `petgraph` graph, then lifted to sets
//! of rules or premises with the elitist comparison used by last-link and
//! weakest-link argument orderings.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use crate::error::{Error, Result};
use crate::input::{PremiseSource, PreferenceSpec};

/// What an identifier names, as far as ranking is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Concept,
    StrictRule,
    DefeasibleRule,
    Premise(PremiseSource),
}

/// A strict partial order; `a > b` means `a` is strictly preferred.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceOrder {
    /// For each item, every item strictly below it.
    below: BTreeMap<String, BTreeSet<String>>,
}

impl PreferenceOrder {
    /// An order where nothing is preferred over anything.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the order from a specification, checking every ranked id.
    pub fn build(spec: &PreferenceSpec, kinds: &HashMap<String, ItemKind>) -> Result<Self> {
        let pairs = match spec {
            PreferenceSpec::Order(pairs) => pairs.clone(),
            PreferenceSpec::Priority(priorities) => {
                for (id, value) in priorities {
                    if !value.is_finite() {
                        return Err(Error::ContradictoryPreference {
                            id: id.clone(),
                            reason: format!("priority {} is not a finite number", value),
                        });
                    }
                }
                let mut pairs = Vec::new();
                for (a, pa) in priorities {
                    for (b, pb) in priorities {
                        if pa > pb {
                            pairs.push((a.clone(), b.clone()));
                        }
                    }
                }
                // Single-entry maps still need their ids checked.
                for id in priorities.keys() {
                    check_rankable(id, kinds)?;
                }
                pairs
            }
        };

        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut index: HashMap<String, NodeIndex> = HashMap::new();

        for (stronger, weaker) in &pairs {
            check_rankable(stronger, kinds)?;
            check_rankable(weaker, kinds)?;
            if stronger == weaker {
                return Err(Error::ContradictoryPreference {
                    id: stronger.clone(),
                    reason: "an item cannot be preferred over itself".to_string(),
                });
            }
            let s = *index
                .entry(stronger.clone())
                .or_insert_with(|| graph.add_node(stronger.clone()));
            let w = *index
                .entry(weaker.clone())
                .or_insert_with(|| graph.add_node(weaker.clone()));
            graph.update_edge(s, w, ());
        }

        let cyclic = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .filter_map(|scc| scc.into_iter().min())
            .min();
        if let Some(node) = cyclic {
            return Err(Error::CyclicPreference {
                id: graph[node].clone(),
            });
        }

        let mut below = BTreeMap::new();
        for node in graph.node_indices() {
            let mut reachable = BTreeSet::new();
            let mut dfs = Dfs::new(&graph, node);
            while let Some(next) = dfs.next(&graph) {
                if next != node {
                    reachable.insert(graph[next].clone());
                }
            }
            if !reachable.is_empty() {
                below.insert(graph[node].clone(), reachable);
            }
        }

        debug!(
            "Preference order: {} ranked items, {} declared pairs",
            graph.node_count(),
            pairs.len()
        );

        Ok(Self { below })
    }

    /// Returns `true` if `a` is strictly preferred over `b`.
    pub fn prefers(&self, a: &str, b: &str) -> bool {
        self.below.get(a).is_some_and(|set| set.contains(b))
    }

    /// Elitist set comparison: `lhs` is strictly weaker than `rhs`.
    ///
    /// An empty set stands for "nothing defeasible", which is never weaker.
    /// A non-empty set is weaker than an empty one; otherwise some element of
    /// `lhs` must lie strictly below every element of `rhs`.
    pub fn set_weaker(&self, lhs: &BTreeSet<String>, rhs: &BTreeSet<String>) -> bool {
        if lhs.is_empty() {
            return false;
        }
        if rhs.is_empty() {
            return true;
        }
        lhs.iter().any(|x| rhs.iter().all(|y| self.prefers(y, x)))
    }

    /// Number of ranked items.
    pub fn len(&self) -> usize {
        let mut items: BTreeSet<&String> = self.below.keys().collect();
        items.extend(self.below.values().flatten());
        items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.below.is_empty()
    }
}

fn check_rankable(id: &str, kinds: &HashMap<String, ItemKind>) -> Result<()> {
    let reason = match kinds.get(id) {
        None => {
            return Err(Error::DanglingReference {
                id: "preference".to_string(),
                reference: id.to_string(),
            })
        }
        Some(ItemKind::DefeasibleRule) => return Ok(()),
        Some(ItemKind::Premise(PremiseSource::Ordinary | PremiseSource::Assumption)) => {
            return Ok(())
        }
        Some(ItemKind::StrictRule) => "strict rules are not subject to preference",
        Some(ItemKind::Premise(PremiseSource::Axiom)) => "axioms are not subject to preference",
        Some(ItemKind::Concept) => "concepts are not subject to preference",
    };
    Err(Error::ContradictoryPreference {
        id: id.to_string(),
        reason: reason.to_string(),
    })
}
