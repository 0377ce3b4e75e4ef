//! Argument Model
//!
//! `ArgumentSet::load` checks a structured input and instantiates every
//! argument it supports. Arguments are trees whose leaves are premises and
//! whose inner nodes are rule applications. Each argument is built exactly
//! once per distinct (rule, sub-argument tuple) and never changes afterwards.
//!
//! Loading fails on the first structural problem: duplicate or malformed
//! identifiers, dangling references, out-of-range beliefs, an invalid
//! preference order, or a derivable conclusion that supports itself.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use log::{debug, trace};
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::input::{ArgumentInput, Concept, Premise, PremiseSource, Rule, RuleKind};
use crate::preference::{ItemKind, PreferenceOrder};

/// Identifier syntax for literals; plain identifiers may not start with `~`.
const LITERAL_PATTERN: &str = r"^~?[A-Za-z0-9_][A-Za-z0-9_.:\-]*$";

/// Prefix marking a negated literal.
pub const NEGATION: char = '~';

/// Returns the negation of a literal: `p` <-> `~p`.
pub fn negate(literal: &str) -> String {
    match literal.strip_prefix(NEGATION) {
        Some(positive) => positive.to_string(),
        None => format!("{}{}", NEGATION, literal),
    }
}

/// Returns `true` if one literal is the negation of the other.
pub fn is_negation(a: &str, b: &str) -> bool {
    a.strip_prefix(NEGATION) == Some(b) || b.strip_prefix(NEGATION) == Some(a)
}

/// Index of an argument in construction order. Serialized as `"A<n>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArgumentId(pub usize);

impl ArgumentId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ArgumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

impl FromStr for ArgumentId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.strip_prefix('A')
            .and_then(|n| n.parse().ok())
            .map(ArgumentId)
            .ok_or_else(|| format!("invalid argument id {:?}", s))
    }
}

impl Serialize for ArgumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ArgumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The root of an argument tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentNode {
    /// A bare premise.
    Premise { premise: String },
    /// A rule applied to one sub-argument per distinct antecedent.
    Rule { rule: String, subs: Vec<ArgumentId> },
}

/// Whether defeasible rules appear anywhere in the proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Strict,
    Defeasible,
}

/// An immutable argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub id: ArgumentId,
    pub conclusion: String,
    pub node: ArgumentNode,
    /// Every premise at the leaves.
    pub premises: BTreeSet<String>,
    /// Leaf premises that are not axioms.
    pub ordinary_premises: BTreeSet<String>,
    /// Every rule in the tree.
    pub rules: BTreeSet<String>,
    /// Every defeasible rule in the tree.
    pub defeasible_rules: BTreeSet<String>,
    /// The last defeasible rules on each branch (last-link).
    pub last_defeasible_rules: BTreeSet<String>,
    /// All sub-arguments, this argument included.
    pub sub_arguments: BTreeSet<ArgumentId>,
    /// Conclusions of the proper sub-arguments.
    pub chain_conclusions: BTreeSet<String>,
    pub depth: usize,
    pub strength: Strength,
}

impl Argument {
    fn premise(id: ArgumentId, premise: &Premise) -> Self {
        let mut premises = BTreeSet::new();
        premises.insert(premise.id.clone());
        let ordinary_premises = if premise.source == PremiseSource::Axiom {
            BTreeSet::new()
        } else {
            premises.clone()
        };
        let mut sub_arguments = BTreeSet::new();
        sub_arguments.insert(id);

        Self {
            id,
            conclusion: premise.id.clone(),
            node: ArgumentNode::Premise {
                premise: premise.id.clone(),
            },
            premises,
            ordinary_premises,
            rules: BTreeSet::new(),
            defeasible_rules: BTreeSet::new(),
            last_defeasible_rules: BTreeSet::new(),
            sub_arguments,
            chain_conclusions: BTreeSet::new(),
            depth: 0,
            strength: Strength::Strict,
        }
    }

    fn apply(id: ArgumentId, rule: &Rule, subs: &[ArgumentId], arguments: &[Argument]) -> Self {
        let mut premises = BTreeSet::new();
        let mut ordinary_premises = BTreeSet::new();
        let mut rules = BTreeSet::new();
        let mut defeasible_rules = BTreeSet::new();
        let mut last_defeasible_rules = BTreeSet::new();
        let mut sub_arguments = BTreeSet::new();
        let mut chain_conclusions = BTreeSet::new();
        let mut depth = 0;

        for sub in subs.iter().map(|s| &arguments[s.index()]) {
            premises.extend(sub.premises.iter().cloned());
            ordinary_premises.extend(sub.ordinary_premises.iter().cloned());
            rules.extend(sub.rules.iter().cloned());
            defeasible_rules.extend(sub.defeasible_rules.iter().cloned());
            last_defeasible_rules.extend(sub.last_defeasible_rules.iter().cloned());
            sub_arguments.extend(sub.sub_arguments.iter().copied());
            chain_conclusions.extend(sub.chain_conclusions.iter().cloned());
            chain_conclusions.insert(sub.conclusion.clone());
            depth = depth.max(sub.depth + 1);
        }

        rules.insert(rule.id.clone());
        if rule.is_defeasible() {
            defeasible_rules.insert(rule.id.clone());
            last_defeasible_rules = BTreeSet::from([rule.id.clone()]);
        }
        sub_arguments.insert(id);

        let strength = if defeasible_rules.is_empty() {
            Strength::Strict
        } else {
            Strength::Defeasible
        };

        Self {
            id,
            conclusion: rule.consequent_id.clone(),
            node: ArgumentNode::Rule {
                rule: rule.id.clone(),
                subs: subs.to_vec(),
            },
            premises,
            ordinary_premises,
            rules,
            defeasible_rules,
            last_defeasible_rules,
            sub_arguments,
            chain_conclusions,
            depth: depth.max(1),
            strength,
        }
    }

    /// The topmost rule, or `None` for a bare premise.
    pub fn top_rule(&self) -> Option<&str> {
        match &self.node {
            ArgumentNode::Premise { .. } => None,
            ArgumentNode::Rule { rule, .. } => Some(rule),
        }
    }

    /// Direct sub-arguments.
    pub fn subs(&self) -> &[ArgumentId] {
        match &self.node {
            ArgumentNode::Premise { .. } => &[],
            ArgumentNode::Rule { subs, .. } => subs,
        }
    }

    pub fn is_premise(&self) -> bool {
        matches!(self.node, ArgumentNode::Premise { .. })
    }

    /// Strict and built only on axioms.
    pub fn is_firm_and_strict(&self) -> bool {
        self.strength == Strength::Strict && self.ordinary_premises.is_empty()
    }
}

/// Symmetric contrariness between literals.
#[derive(Debug, Clone, Default)]
pub struct Contrariness {
    declared: HashMap<String, BTreeSet<String>>,
}

impl Contrariness {
    /// Declares `a` and `b` contrary to each other.
    pub fn add(&mut self, a: &str, b: &str) {
        self.declared
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.declared
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
    }

    /// Returns `true` if `a` and `b` cannot both hold.
    pub fn conflict(&self, a: &str, b: &str) -> bool {
        is_negation(a, b) || self.declared.get(a).is_some_and(|set| set.contains(b))
    }
}

/// Rules that support each other in a loop without ever firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnfiredCycle {
    /// Rule ids in input order.
    pub rules: Vec<String>,
    /// The literal loop, first literal repeated at the end.
    pub literals: Vec<String>,
}

/// A checked argument set with every argument instantiated.
#[derive(Debug, Clone)]
pub struct ArgumentSet {
    concepts: IndexMap<String, Concept>,
    premises: IndexMap<String, Premise>,
    rules: IndexMap<String, Rule>,
    preference: PreferenceOrder,
    contrariness: Contrariness,
    claims: Vec<String>,
    arguments: Vec<Argument>,
    by_conclusion: BTreeMap<String, Vec<ArgumentId>>,
    unfired_cycles: Vec<UnfiredCycle>,
}

impl ArgumentSet {
    /// Checks `input` and instantiates its arguments.
    ///
    /// Fails with `ArgumentLimitExceeded` if more than `max_arguments`
    /// arguments would be built.
    pub fn load(input: &ArgumentInput, max_arguments: usize) -> Result<Self> {
        let syntax = Regex::new(LITERAL_PATTERN).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        let mut kinds: HashMap<String, ItemKind> = HashMap::new();

        let mut concepts = IndexMap::new();
        for concept in &input.concepts {
            check_identifier(&syntax, &concept.id)?;
            register(&mut kinds, &concept.id, ItemKind::Concept)?;
            concepts.insert(concept.id.clone(), concept.clone());
        }

        let mut premises = IndexMap::new();
        for premise in &input.premises {
            check_literal(&syntax, &premise.id)?;
            register(&mut kinds, &premise.id, ItemKind::Premise(premise.source))?;
            if !concepts.contains_key(&premise.concept_id) {
                return Err(Error::DanglingReference {
                    id: premise.id.clone(),
                    reference: premise.concept_id.clone(),
                });
            }
            check_unit(&premise.id, premise.belief)?;
            premises.insert(premise.id.clone(), premise.clone());
        }

        let mut rules = IndexMap::new();
        for rule in &input.rules {
            check_identifier(&syntax, &rule.id)?;
            let kind = match rule.kind {
                RuleKind::Strict => ItemKind::StrictRule,
                RuleKind::Defeasible => ItemKind::DefeasibleRule,
            };
            register(&mut kinds, &rule.id, kind)?;
            check_literal(&syntax, &rule.consequent_id)?;
            for antecedent in &rule.antecedent_ids {
                check_literal(&syntax, antecedent)?;
            }
            if let Some(exception) = &rule.exception_id {
                check_literal(&syntax, exception)?;
                if rule.kind == RuleKind::Strict {
                    return Err(Error::InvalidRule {
                        id: rule.id.clone(),
                        reason: "strict rules cannot carry an exception".to_string(),
                    });
                }
            }
            if let Some(discount) = rule.discount {
                if rule.kind == RuleKind::Strict {
                    return Err(Error::InvalidRule {
                        id: rule.id.clone(),
                        reason: "strict rules carry no belief discount".to_string(),
                    });
                }
                check_unit(&rule.id, discount)?;
            }
            rules.insert(rule.id.clone(), rule.clone());
        }

        let mut known: HashSet<&str> = premises.keys().map(String::as_str).collect();
        known.extend(rules.values().map(|r| r.consequent_id.as_str()));
        for rule in rules.values() {
            if let Some(missing) = rule
                .antecedent_ids
                .iter()
                .find(|a| !known.contains(a.as_str()))
            {
                return Err(Error::DanglingReference {
                    id: rule.id.clone(),
                    reference: missing.clone(),
                });
            }
        }

        known.extend(rules.values().filter_map(|r| r.exception_id.as_deref()));
        let mut contrariness = Contrariness::default();
        for (a, b) in &input.contraries {
            check_literal(&syntax, a)?;
            check_literal(&syntax, b)?;
            if a == b {
                return Err(Error::InvalidContrary {
                    id: a.clone(),
                    reason: "a literal cannot be contrary to itself".to_string(),
                });
            }
            for literal in [a, b] {
                if !known.contains(literal.as_str()) {
                    return Err(Error::DanglingReference {
                        id: "contraries".to_string(),
                        reference: literal.clone(),
                    });
                }
            }
            contrariness.add(a, b);
        }

        for claim in &input.claims {
            check_literal(&syntax, claim)?;
        }

        let preference = PreferenceOrder::build(&input.preference, &kinds)?;

        let fireable = fireable_rules(&premises, &rules);
        let mut fired_graph = LiteralGraph::default();
        for literal in premises.keys() {
            fired_graph.node(literal);
        }
        for (index, rule) in rules.values().enumerate() {
            if fireable[index] {
                fired_graph.add_rule(index, rule);
            }
        }
        if let Some(cycle) = fired_graph.cycles().into_iter().next() {
            let first = &rules[cycle.rules[0]];
            return Err(Error::CircularSupport {
                id: first.id.clone(),
                cycle: fired_graph.cycle_path(&cycle),
            });
        }

        let mut full_graph = LiteralGraph::default();
        for (index, rule) in rules.values().enumerate() {
            full_graph.add_rule(index, rule);
        }
        let unfired_cycles: Vec<UnfiredCycle> = full_graph
            .cycles()
            .iter()
            .map(|cycle| UnfiredCycle {
                rules: cycle.rules.iter().map(|&i| rules[i].id.clone()).collect(),
                literals: full_graph.cycle_path(cycle),
            })
            .collect();

        let claims = if input.claims.is_empty() {
            final_conclusions(&rules)
        } else {
            input.claims.clone()
        };

        let mut set = Self {
            concepts,
            premises,
            rules,
            preference,
            contrariness,
            claims,
            arguments: Vec::new(),
            by_conclusion: BTreeMap::new(),
            unfired_cycles,
        };
        set.instantiate(&fired_graph, &fireable, max_arguments)?;

        debug!(
            "Loaded argument set: {} premises, {} rules ({} fireable), {} arguments",
            set.premises.len(),
            set.rules.len(),
            fireable.iter().filter(|f| **f).count(),
            set.arguments.len()
        );

        Ok(set)
    }

    fn instantiate(&mut self, graph: &LiteralGraph, fireable: &[bool], limit: usize) -> Result<()> {
        let order = toposort(&graph.graph, None).map_err(|cycle| {
            let literal = graph.graph[cycle.node_id()].clone();
            Error::CircularSupport {
                id: literal.clone(),
                cycle: vec![literal.clone(), literal],
            }
        })?;
        let position: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(pos, node)| (graph.graph[*node].as_str(), pos))
            .collect();

        for premise in self.premises.values() {
            let id = ArgumentId(self.arguments.len());
            if id.index() >= limit {
                return Err(Error::ArgumentLimitExceeded { limit });
            }
            self.arguments.push(Argument::premise(id, premise));
            self.by_conclusion
                .entry(premise.id.clone())
                .or_default()
                .push(id);
        }

        let mut schedule: Vec<(usize, usize)> = self
            .rules
            .values()
            .enumerate()
            .filter(|(index, _)| fireable[*index])
            .map(|(index, rule)| {
                let pos = position
                    .get(rule.consequent_id.as_str())
                    .copied()
                    .unwrap_or(usize::MAX);
                (pos, index)
            })
            .collect();
        schedule.sort_unstable();

        for (_, index) in schedule {
            let rule = &self.rules[index];
            let mut seen = HashSet::new();
            let lists: Vec<Vec<ArgumentId>> = rule
                .antecedent_ids
                .iter()
                .filter(|a| seen.insert(a.as_str()))
                .map(|a| self.by_conclusion.get(a).cloned().unwrap_or_default())
                .collect();

            let mut built = Vec::new();
            for_each_combination(&lists, |subs| {
                let id = ArgumentId(self.arguments.len() + built.len());
                if id.index() >= limit {
                    return Err(Error::ArgumentLimitExceeded { limit });
                }
                let argument = Argument::apply(id, rule, subs, &self.arguments);
                trace!("Instantiated {} = {} via {}", id, argument.conclusion, rule.id);
                built.push(argument);
                Ok(())
            })?;

            for argument in built {
                self.by_conclusion
                    .entry(argument.conclusion.clone())
                    .or_default()
                    .push(argument.id);
                self.arguments.push(argument);
            }
        }

        Ok(())
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn argument(&self, id: ArgumentId) -> &Argument {
        &self.arguments[id.index()]
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Arguments concluding `literal`, in construction order.
    pub fn concluding(&self, literal: &str) -> &[ArgumentId] {
        self.by_conclusion
            .get(literal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn concept(&self, id: &str) -> Option<&Concept> {
        self.concepts.get(id)
    }

    pub fn premise(&self, id: &str) -> Option<&Premise> {
        self.premises.get(id)
    }

    pub fn premises(&self) -> impl Iterator<Item = &Premise> {
        self.premises.values()
    }

    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.get(id)
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn preference(&self) -> &PreferenceOrder {
        &self.preference
    }

    pub fn contrariness(&self) -> &Contrariness {
        &self.contrariness
    }

    /// Conclusions asserted by the text, or the final conclusions if none were given.
    pub fn claims(&self) -> &[String] {
        &self.claims
    }

    pub fn unfired_cycles(&self) -> &[UnfiredCycle] {
        &self.unfired_cycles
    }
}

fn check_identifier(syntax: &Regex, id: &str) -> Result<()> {
    if id.starts_with(NEGATION) || !syntax.is_match(id) {
        return Err(Error::MalformedIdentifier(id.to_string()));
    }
    Ok(())
}

fn check_literal(syntax: &Regex, literal: &str) -> Result<()> {
    if !syntax.is_match(literal) {
        return Err(Error::MalformedIdentifier(literal.to_string()));
    }
    Ok(())
}

fn check_unit(id: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::BeliefOutOfRange {
            id: id.to_string(),
            value,
        });
    }
    Ok(())
}

fn register(kinds: &mut HashMap<String, ItemKind>, id: &str, kind: ItemKind) -> Result<()> {
    if kinds.insert(id.to_string(), kind).is_some() {
        return Err(Error::DuplicateId(id.to_string()));
    }
    Ok(())
}

/// Marks the rules whose antecedents are all derivable from the premises.
fn fireable_rules(premises: &IndexMap<String, Premise>, rules: &IndexMap<String, Rule>) -> Vec<bool> {
    let mut derivable: HashSet<&str> = premises.keys().map(String::as_str).collect();
    let mut fireable = vec![false; rules.len()];

    loop {
        let mut changed = false;
        for (index, rule) in rules.values().enumerate() {
            if !fireable[index]
                && rule
                    .antecedent_ids
                    .iter()
                    .all(|a| derivable.contains(a.as_str()))
            {
                fireable[index] = true;
                derivable.insert(rule.consequent_id.as_str());
                changed = true;
            }
        }
        if !changed {
            return fireable;
        }
    }
}

/// Rule consequents no other rule consumes, in input order.
fn final_conclusions(rules: &IndexMap<String, Rule>) -> Vec<String> {
    let consumed: HashSet<&str> = rules
        .values()
        .flat_map(|r| r.antecedent_ids.iter().map(String::as_str))
        .collect();
    let mut claims: Vec<String> = Vec::new();
    for rule in rules.values() {
        if !consumed.contains(rule.consequent_id.as_str()) && !claims.contains(&rule.consequent_id) {
            claims.push(rule.consequent_id.clone());
        }
    }
    claims
}

/// Calls `f` once per tuple of the cartesian product, last position fastest.
fn for_each_combination<F>(lists: &[Vec<ArgumentId>], mut f: F) -> Result<()>
where
    F: FnMut(&[ArgumentId]) -> Result<()>,
{
    if lists.iter().any(Vec::is_empty) {
        return Ok(());
    }
    let mut cursor = vec![0usize; lists.len()];
    let mut tuple = Vec::with_capacity(lists.len());
    loop {
        tuple.clear();
        tuple.extend(cursor.iter().zip(lists).map(|(&i, list)| list[i]));
        f(&tuple)?;

        let mut pos = lists.len();
        loop {
            if pos == 0 {
                return Ok(());
            }
            pos -= 1;
            cursor[pos] += 1;
            if cursor[pos] < lists[pos].len() {
                break;
            }
            cursor[pos] = 0;
        }
    }
}

/// A group of literals that depend on each other, with the rules linking them.
#[derive(Debug, Clone)]
struct CycleGroup {
    /// Input indices of the rules inside the group, ascending.
    rules: Vec<usize>,
    members: HashSet<NodeIndex>,
}

/// Literal dependency graph: antecedent -> consequent, weighted by rule index.
#[derive(Debug, Default)]
struct LiteralGraph {
    graph: DiGraph<String, usize>,
    nodes: HashMap<String, NodeIndex>,
}

impl LiteralGraph {
    fn node(&mut self, literal: &str) -> NodeIndex {
        if let Some(node) = self.nodes.get(literal) {
            return *node;
        }
        let node = self.graph.add_node(literal.to_string());
        self.nodes.insert(literal.to_string(), node);
        node
    }

    fn add_rule(&mut self, index: usize, rule: &Rule) {
        let consequent = self.node(&rule.consequent_id);
        for antecedent in &rule.antecedent_ids {
            let antecedent = self.node(antecedent);
            self.graph.add_edge(antecedent, consequent, index);
        }
    }

    /// Strongly connected groups containing at least one loop, ordered by
    /// their first rule.
    fn cycles(&self) -> Vec<CycleGroup> {
        let mut groups: Vec<CycleGroup> = tarjan_scc(&self.graph)
            .into_iter()
            .filter_map(|scc| {
                let members: HashSet<NodeIndex> = scc.into_iter().collect();
                let mut rules: Vec<usize> = self
                    .graph
                    .edge_references()
                    .filter(|e| members.contains(&e.source()) && members.contains(&e.target()))
                    .map(|e| *e.weight())
                    .collect();
                if rules.is_empty() {
                    return None;
                }
                rules.sort_unstable();
                rules.dedup();
                Some(CycleGroup { rules, members })
            })
            .collect();
        groups.sort_by_key(|g| g.rules[0]);
        groups
    }

    /// A concrete loop through the group's first rule, as literals.
    fn cycle_path(&self, group: &CycleGroup) -> Vec<String> {
        let Some(edge) = self
            .graph
            .edge_references()
            .filter(|e| group.members.contains(&e.source()) && group.members.contains(&e.target()))
            .find(|e| *e.weight() == group.rules[0])
        else {
            return Vec::new();
        };
        let (start, next) = (edge.source(), edge.target());

        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([next]);
        let mut visited = HashSet::from([next]);
        while let Some(node) = queue.pop_front() {
            if node == start {
                break;
            }
            for succ in self.graph.neighbors(node) {
                if group.members.contains(&succ) && visited.insert(succ) {
                    parent.insert(succ, node);
                    queue.push_back(succ);
                }
            }
        }

        let mut path = vec![start];
        let mut node = start;
        while node != next {
            match parent.get(&node) {
                Some(prev) => {
                    node = *prev;
                    path.push(node);
                }
                None => break,
            }
        }
        path.reverse();
        path.insert(0, start);
        path.into_iter().map(|n| self.graph[n].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Concept;

    fn base() -> ArgumentInput {
        ArgumentInput::new().concept(Concept::new("c", "claim"))
    }

    #[test]
    fn test_negation() {
        assert_eq!(negate("p"), "~p");
        assert_eq!(negate("~p"), "p");
        assert!(is_negation("p", "~p"));
        assert!(is_negation("~p", "p"));
        assert!(!is_negation("p", "p"));
    }

    #[test]
    fn test_argument_id_json() {
        let json = serde_json::to_string(&ArgumentId(7)).unwrap();
        assert_eq!(json, "\"A7\"");
        assert_eq!(serde_json::from_str::<ArgumentId>(&json).unwrap(), ArgumentId(7));
        assert!("7".parse::<ArgumentId>().is_err());
    }

    #[test]
    fn test_load_and_instantiate() {
        let input = base()
            .premise(Premise::new("a", "c", 0.9))
            .premise(Premise::new("b", "c", 0.8))
            .rule(Rule::defeasible("r1").when("a").when("b").then("q").build())
            .rule(Rule::strict("s1").when("q").then("z").build());

        let set = ArgumentSet::load(&input, 100).unwrap();
        assert_eq!(set.len(), 4);

        let q = set.argument(set.concluding("q")[0]);
        assert_eq!(q.top_rule(), Some("r1"));
        assert_eq!(q.strength, Strength::Defeasible);
        assert_eq!(q.depth, 1);

        let z = set.argument(set.concluding("z")[0]);
        assert_eq!(z.last_defeasible_rules, BTreeSet::from(["r1".to_string()]));
        assert_eq!(z.premises.len(), 2);
        assert!(z.sub_arguments.contains(&q.id));
        assert!(z.chain_conclusions.contains("q"));
        assert_eq!(set.claims(), &["z".to_string()]);
    }

    #[test]
    fn test_one_argument_per_antecedent_tuple() {
        let input = base()
            .premise(Premise::new("a", "c", 0.9))
            .premise(Premise::new("b", "c", 0.8))
            .rule(Rule::defeasible("ra").when("a").then("m").build())
            .rule(Rule::defeasible("rb").when("b").then("m").build())
            .rule(Rule::defeasible("rm").when("m").when("a").then("q").build());

        let set = ArgumentSet::load(&input, 100).unwrap();
        assert_eq!(set.concluding("m").len(), 2);
        assert_eq!(set.concluding("q").len(), 2);
    }

    #[test]
    fn test_duplicate_id() {
        let input = base()
            .premise(Premise::new("a", "c", 0.9))
            .rule(Rule::defeasible("a").when("a").then("q").build());
        assert_eq!(
            ArgumentSet::load(&input, 100).unwrap_err(),
            Error::DuplicateId("a".to_string())
        );
    }

    #[test]
    fn test_dangling_antecedent() {
        let input = base()
            .premise(Premise::new("a", "c", 0.9))
            .rule(Rule::defeasible("r1").when("a").when("ghost").then("q").build());
        let err = ArgumentSet::load(&input, 100).unwrap_err();
        assert_eq!(err.offending_id(), Some("r1"));
    }

    #[test]
    fn test_dangling_concept() {
        let input = base().premise(Premise::new("a", "nowhere", 0.9));
        let err = ArgumentSet::load(&input, 100).unwrap_err();
        assert!(matches!(err, Error::DanglingReference { ref reference, .. } if reference == "nowhere"));
    }

    #[test]
    fn test_belief_out_of_range() {
        let input = base().premise(Premise::new("a", "c", 1.3));
        let err = ArgumentSet::load(&input, 100).unwrap_err();
        assert!(matches!(err, Error::BeliefOutOfRange { ref id, .. } if id == "a"));
    }

    #[test]
    fn test_malformed_identifier() {
        let input = base().rule(Rule::defeasible("~r1").then("q").build());
        assert!(matches!(
            ArgumentSet::load(&input, 100),
            Err(Error::MalformedIdentifier(_))
        ));
    }

    #[test]
    fn test_strict_rule_with_exception() {
        let input = base()
            .premise(Premise::new("a", "c", 0.9))
            .rule(Rule::strict("s1").when("a").then("q").unless("e").build());
        assert!(matches!(
            ArgumentSet::load(&input, 100),
            Err(Error::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_circular_support_rejected() {
        let input = base()
            .premise(Premise::new("a", "c", 0.9))
            .rule(Rule::defeasible("r1").when("a").then("b").build())
            .rule(Rule::defeasible("r2").when("b").then("a").build());

        match ArgumentSet::load(&input, 100) {
            Err(Error::CircularSupport { id, cycle }) => {
                assert_eq!(id, "r1");
                assert_eq!(cycle.first(), cycle.last());
                assert!(cycle.contains(&"b".to_string()));
            }
            other => panic!("expected circular support, got {:?}", other),
        }
    }

    #[test]
    fn test_unfired_cycle_is_kept() {
        let input = base()
            .premise(Premise::new("a", "c", 0.9))
            .rule(Rule::defeasible("r1").when("x").then("y").build())
            .rule(Rule::defeasible("r2").when("y").then("x").build());

        let set = ArgumentSet::load(&input, 100).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.unfired_cycles().len(), 1);
        assert_eq!(set.unfired_cycles()[0].rules, vec!["r1", "r2"]);
    }

    #[test]
    fn test_argument_limit() {
        let input = base()
            .premise(Premise::new("a", "c", 0.9))
            .rule(Rule::defeasible("r1").when("a").then("b").build());
        assert_eq!(
            ArgumentSet::load(&input, 1).unwrap_err(),
            Error::ArgumentLimitExceeded { limit: 1 }
        );
    }

    #[test]
    fn test_axiom_strict_argument_is_firm() {
        let input = base()
            .premise(Premise::new("a", "c", 1.0).axiom())
            .rule(Rule::strict("s1").when("a").then("b").build());
        let set = ArgumentSet::load(&input, 100).unwrap();
        let b = set.argument(set.concluding("b")[0]);
        assert!(b.is_firm_and_strict());
    }

    #[test]
    fn test_declared_contraries() {
        let input = base()
            .premise(Premise::new("alive", "c", 0.9))
            .premise(Premise::new("dead", "c", 0.9))
            .contrary("alive", "dead");
        let set = ArgumentSet::load(&input, 100).unwrap();
        assert!(set.contrariness().conflict("dead", "alive"));
        assert!(set.contrariness().conflict("alive", "~alive"));
        assert!(!set.contrariness().conflict("alive", "alive"));
    }
}
