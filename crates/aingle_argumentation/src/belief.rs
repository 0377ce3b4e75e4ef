//! Belief Propagator
//!
//! Premises contribute their base belief. A rule application combines the
//! beliefs of its sub-arguments with the configured combination function and,
//! for a defeasible rule, multiplies by the rule's discount. Strict rules pass
//! the combined belief through unchanged.
//!
//! Arguments of equal depth only depend on shallower ones, so each depth
//! level is combined in one (optionally parallel) step.

use std::collections::BTreeMap;

use log::debug;
use rayon::prelude::*;

use crate::config::ValidationConfig;
use crate::model::{ArgumentId, ArgumentNode, ArgumentSet};

/// Labels are kept on a 1e-9 grid so printed values are stable.
const LABEL_SCALE: f64 = 1e9;

/// Rounds a belief to the label grid and clamps it to [0, 1].
pub fn round_label(value: f64) -> f64 {
    ((value * LABEL_SCALE).round() / LABEL_SCALE).clamp(0.0, 1.0)
}

/// Belief label per argument, indexed by construction order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeliefLabels {
    labels: Vec<f64>,
}

impl BeliefLabels {
    /// Propagates beliefs through every argument of `set`.
    pub fn propagate(set: &ArgumentSet, config: &ValidationConfig) -> Self {
        let mut levels: BTreeMap<usize, Vec<ArgumentId>> = BTreeMap::new();
        for argument in set.arguments() {
            levels.entry(argument.depth).or_default().push(argument.id);
        }

        let mut labels = vec![0.0; set.len()];
        for (depth, ids) in &levels {
            let label = |id: &ArgumentId| (*id, Self::label_of(set, config, &labels, *id));
            let computed: Vec<(ArgumentId, f64)> = if config.parallel {
                ids.par_iter().map(label).collect()
            } else {
                ids.iter().map(label).collect()
            };
            for (id, value) in computed {
                labels[id.index()] = value;
            }
            debug!("Belief level {}: {} arguments", depth, ids.len());
        }

        Self { labels }
    }

    fn label_of(set: &ArgumentSet, config: &ValidationConfig, labels: &[f64], id: ArgumentId) -> f64 {
        match &set.argument(id).node {
            ArgumentNode::Premise { premise } => {
                round_label(set.premise(premise).map_or(0.0, |p| p.belief))
            }
            ArgumentNode::Rule { rule, subs } => {
                let beliefs: Vec<f64> = subs.iter().map(|s| labels[s.index()]).collect();
                let combined = config.combination.combine(&beliefs);
                let discount = match set.rule(rule) {
                    Some(rule) if rule.is_defeasible() => {
                        rule.discount.unwrap_or(config.defeasible_discount)
                    }
                    _ => 1.0,
                };
                round_label(combined * discount)
            }
        }
    }

    pub fn get(&self, id: ArgumentId) -> f64 {
        self.labels[id.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Combination;
    use crate::input::{ArgumentInput, Concept, Premise, Rule};

    fn two_premises() -> ArgumentInput {
        ArgumentInput::new()
            .concept(Concept::new("c", "claim"))
            .premise(Premise::new("a", "c", 0.9))
            .premise(Premise::new("b", "c", 0.8))
    }

    #[test]
    fn test_product_without_discount_is_exact() {
        let input = two_premises().rule(Rule::defeasible("r1").when("a").when("b").then("q").build());
        let set = ArgumentSet::load(&input, 100).unwrap();
        let config = ValidationConfig::default().with_discount(1.0);

        let labels = BeliefLabels::propagate(&set, &config);
        assert_eq!(labels.get(set.concluding("q")[0]), 0.72);
    }

    #[test]
    fn test_default_discount_and_rule_override() {
        let input = two_premises()
            .rule(Rule::defeasible("r1").when("a").then("q").build())
            .rule(Rule::defeasible("r2").when("b").then("p").discount(0.5).build());
        let set = ArgumentSet::load(&input, 100).unwrap();

        let labels = BeliefLabels::propagate(&set, &ValidationConfig::default());
        assert_eq!(labels.get(set.concluding("q")[0]), 0.81);
        assert_eq!(labels.get(set.concluding("p")[0]), 0.4);
    }

    #[test]
    fn test_strict_rules_inherit_without_discount() {
        let input = two_premises()
            .rule(Rule::strict("s1").when("a").then("q").build())
            .rule(Rule::strict("s2").when("q").then("z").build());
        let set = ArgumentSet::load(&input, 100).unwrap();

        let labels = BeliefLabels::propagate(&set, &ValidationConfig::default());
        assert_eq!(labels.get(set.concluding("z")[0]), 0.9);
    }

    #[test]
    fn test_combination_is_pluggable() {
        let input = two_premises().rule(Rule::defeasible("r1").when("a").when("b").then("q").build());
        let set = ArgumentSet::load(&input, 100).unwrap();
        let base = ValidationConfig::default().with_discount(1.0);

        let minimum = BeliefLabels::propagate(&set, &base.clone().with_combination(Combination::Minimum));
        let noisy = BeliefLabels::propagate(&set, &base.with_combination(Combination::NoisyOr));
        let q = set.concluding("q")[0];
        assert_eq!(minimum.get(q), 0.8);
        assert_eq!(noisy.get(q), 0.98);
    }

    #[test]
    fn test_labels_stay_in_unit_interval() {
        assert_eq!(round_label(1.0000000004), 1.0);
        assert_eq!(round_label(-0.0), 0.0);
        assert_eq!(round_label(0.7200000000000001), 0.72);
    }
}
