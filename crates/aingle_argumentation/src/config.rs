//! Engine configuration
//!
//! A `ValidationConfig` is fixed for one validation run and passed into the
//! validator explicitly. Nothing here is global.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The acceptability semantics used to evaluate the defeat graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Semantics {
    /// The unique least fixed point of the characteristic function.
    #[default]
    Grounded,
    /// Maximal admissible sets.
    Preferred,
    /// Conflict-free sets defeating every outside argument.
    Stable,
}

impl Semantics {
    /// Returns the lowercase name of the semantics.
    pub fn name(&self) -> &'static str {
        match self {
            Semantics::Grounded => "grounded",
            Semantics::Preferred => "preferred",
            Semantics::Stable => "stable",
        }
    }
}

/// How argument preference is lifted from rule preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPolicy {
    /// Compare the last defeasible rules applied on each side.
    #[default]
    LastLink,
    /// Compare all defeasible rules on each side.
    WeakestLink,
}

/// The function combining antecedent beliefs at a rule application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combination {
    /// Independent conjunction.
    #[default]
    Product,
    /// The weakest antecedent bounds the result.
    Minimum,
    /// `1 - prod(1 - b)`.
    NoisyOr,
}

impl Combination {
    /// Combines antecedent beliefs. An empty antecedent list yields 1.0.
    pub fn combine(&self, beliefs: &[f64]) -> f64 {
        if beliefs.is_empty() {
            return 1.0;
        }
        match self {
            Combination::Product => beliefs.iter().product(),
            Combination::Minimum => beliefs.iter().copied().fold(1.0, f64::min),
            Combination::NoisyOr => 1.0 - beliefs.iter().map(|b| 1.0 - b).product::<f64>(),
        }
    }
}

/// Weights blending a symbolic status into a numeric acceptability degree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusWeights {
    pub accepted: f64,
    pub undecided: f64,
    pub rejected: f64,
}

impl Default for StatusWeights {
    fn default() -> Self {
        Self {
            accepted: 1.0,
            undecided: 0.5,
            rejected: 0.0,
        }
    }
}

/// Configuration for one validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Semantics used for status assignment.
    pub semantics: Semantics,
    /// Preference lifting policy.
    pub link_policy: LinkPolicy,
    /// Belief combination at rule applications.
    pub combination: Combination,
    /// Discount applied per defeasible rule firing, unless the rule overrides it.
    pub defeasible_discount: f64,
    /// Belief below which conclusions count as unsupported or fragile.
    pub acceptance_threshold: f64,
    /// Absolute cap on preferred/stable search steps.
    pub iteration_cap: Option<usize>,
    /// Search steps allowed per argument when `iteration_cap` is unset.
    pub iteration_cap_factor: usize,
    /// Status weights for the acceptability degree.
    pub status_weights: StatusWeights,
    /// Upper bound on instantiated arguments.
    pub max_arguments: usize,
    /// Run the parallel stages on the rayon pool.
    pub parallel: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            semantics: Semantics::Grounded,
            link_policy: LinkPolicy::LastLink,
            combination: Combination::Product,
            defeasible_discount: 0.9,
            acceptance_threshold: 0.5,
            iteration_cap: None,
            iteration_cap_factor: 256,
            status_weights: StatusWeights::default(),
            max_arguments: 4096,
            parallel: true,
        }
    }
}

impl ValidationConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_semantics(mut self, semantics: Semantics) -> Self {
        self.semantics = semantics;
        self
    }

    pub fn with_link_policy(mut self, policy: LinkPolicy) -> Self {
        self.link_policy = policy;
        self
    }

    pub fn with_combination(mut self, combination: Combination) -> Self {
        self.combination = combination;
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.defeasible_discount = discount;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.acceptance_threshold = threshold;
        self
    }

    pub fn with_iteration_cap(mut self, cap: usize) -> Self {
        self.iteration_cap = Some(cap);
        self
    }

    pub fn with_status_weights(mut self, weights: StatusWeights) -> Self {
        self.status_weights = weights;
        self
    }

    pub fn with_max_arguments(mut self, limit: usize) -> Self {
        self.max_arguments = limit;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The effective search cap for `argument_count` arguments.
    pub fn effective_cap(&self, argument_count: usize) -> usize {
        self.iteration_cap
            .unwrap_or_else(|| self.iteration_cap_factor.saturating_mul(argument_count.max(1)))
    }

    /// Checks that every numeric setting is in range.
    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("defeasible_discount", self.defeasible_discount),
            ("acceptance_threshold", self.acceptance_threshold),
            ("status_weights.accepted", self.status_weights.accepted),
            ("status_weights.undecided", self.status_weights.undecided),
            ("status_weights.rejected", self.status_weights.rejected),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        let cap_is_zero = match self.iteration_cap {
            Some(cap) => cap == 0,
            None => self.iteration_cap_factor == 0,
        };
        if cap_is_zero {
            return Err(Error::InvalidConfig(
                "iteration cap must be positive".to_string(),
            ));
        }
        if self.max_arguments == 0 {
            return Err(Error::InvalidConfig(
                "max_arguments must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
