//! Structured argument set, as produced by the upstream semantic parser.
//!
//! These types mirror the JSON boundary one to one. They carry no
//! guarantees until `ArgumentSet::load` has checked them.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// An ontology term referenced by premises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: String,
    /// Polarity-free semantic tag.
    pub tag: String,
}

impl Concept {
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
        }
    }
}

/// Where a premise comes from, which decides whether it can be undermined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiseSource {
    /// Indisputable; never undermined.
    Axiom,
    /// Disputable knowledge.
    Ordinary,
    /// Taken for the sake of argument; disputable.
    Assumption,
}

impl PremiseSource {
    pub fn name(&self) -> &'static str {
        match self {
            PremiseSource::Axiom => "axiom",
            PremiseSource::Ordinary => "ordinary",
            PremiseSource::Assumption => "assumption",
        }
    }
}

/// A premise. Its identifier is also the literal it asserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Premise {
    pub id: String,
    #[serde(default)]
    pub text: String,
    pub concept_id: String,
    pub source: PremiseSource,
    pub belief: f64,
}

impl Premise {
    /// Creates an ordinary premise.
    pub fn new(id: impl Into<String>, concept_id: impl Into<String>, belief: f64) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            concept_id: concept_id.into(),
            source: PremiseSource::Ordinary,
            belief,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn axiom(mut self) -> Self {
        self.source = PremiseSource::Axiom;
        self
    }

    pub fn assumption(mut self) -> Self {
        self.source = PremiseSource::Assumption;
        self
    }
}

/// Strict rules hold without exception; defeasible rules may be defeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Strict,
    Defeasible,
}

impl RuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Strict => "strict",
            RuleKind::Defeasible => "defeasible",
        }
    }

    /// The arrow used when rendering rules.
    pub fn arrow(&self) -> &'static str {
        match self {
            RuleKind::Strict => "->",
            RuleKind::Defeasible => "=>",
        }
    }
}

/// An inference rule over literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub kind: RuleKind,
    #[serde(default)]
    pub antecedent_ids: Vec<String>,
    pub consequent_id: String,
    /// A literal whose truth makes this rule inapplicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_id: Option<String>,
    /// Overrides the configured defeasible discount for this rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
}

impl Rule {
    /// Starts building a strict rule.
    pub fn strict(id: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(id, RuleKind::Strict)
    }

    /// Starts building a defeasible rule.
    pub fn defeasible(id: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(id, RuleKind::Defeasible)
    }

    pub fn is_defeasible(&self) -> bool {
        self.kind == RuleKind::Defeasible
    }
}

/// A builder for creating `Rule`s using a fluent API.
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    rule: Rule,
}

impl RuleBuilder {
    fn new(id: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            rule: Rule {
                id: id.into(),
                kind,
                antecedent_ids: Vec::new(),
                consequent_id: String::new(),
                exception_id: None,
                discount: None,
            },
        }
    }

    /// Appends an antecedent.
    pub fn when(mut self, antecedent: impl Into<String>) -> Self {
        self.rule.antecedent_ids.push(antecedent.into());
        self
    }

    /// Appends several antecedents in order.
    pub fn when_all<I, S>(mut self, antecedents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule
            .antecedent_ids
            .extend(antecedents.into_iter().map(Into::into));
        self
    }

    pub fn then(mut self, consequent: impl Into<String>) -> Self {
        self.rule.consequent_id = consequent.into();
        self
    }

    pub fn unless(mut self, exception: impl Into<String>) -> Self {
        self.rule.exception_id = Some(exception.into());
        self
    }

    pub fn discount(mut self, discount: f64) -> Self {
        self.rule.discount = Some(discount);
        self
    }

    pub fn build(self) -> Rule {
        self.rule
    }
}

/// A preference specification over defeasible rules and non-axiom premises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceSpec {
    /// Pairs `(stronger, weaker)`; the order is their transitive closure.
    Order(Vec<(String, String)>),
    /// A scalar per item; higher is more preferred, unlisted items are incomparable.
    Priority(IndexMap<String, f64>),
}

impl Default for PreferenceSpec {
    fn default() -> Self {
        PreferenceSpec::Order(Vec::new())
    }
}

/// The complete structured input of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentInput {
    #[serde(default)]
    pub concepts: Vec<Concept>,
    #[serde(default)]
    pub premises: Vec<Premise>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub preference: PreferenceSpec,
    /// Extra symmetric contrary pairs besides `p` / `~p`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contraries: Vec<(String, String)>,
    /// Conclusions asserted by the source text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claims: Vec<String>,
}

impl ArgumentInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn concept(mut self, concept: Concept) -> Self {
        self.concepts.push(concept);
        self
    }

    pub fn premise(mut self, premise: Premise) -> Self {
        self.premises.push(premise);
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Declares `stronger` strictly preferred over `weaker`.
    ///
    /// Switches a priority specification back to an explicit order.
    pub fn prefer(mut self, stronger: impl Into<String>, weaker: impl Into<String>) -> Self {
        let pair = (stronger.into(), weaker.into());
        match &mut self.preference {
            PreferenceSpec::Order(pairs) => pairs.push(pair),
            PreferenceSpec::Priority(_) => self.preference = PreferenceSpec::Order(vec![pair]),
        }
        self
    }

    /// Assigns a priority scalar to a rule or premise.
    ///
    /// Switches an explicit order back to a priority specification.
    pub fn priority(mut self, id: impl Into<String>, priority: f64) -> Self {
        match &mut self.preference {
            PreferenceSpec::Priority(map) => {
                map.insert(id.into(), priority);
            }
            PreferenceSpec::Order(_) => {
                let mut map = IndexMap::new();
                map.insert(id.into(), priority);
                self.preference = PreferenceSpec::Priority(map);
            }
        }
        self
    }

    pub fn contrary(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.contraries.push((a.into(), b.into()));
        self
    }

    pub fn claim(mut self, literal: impl Into<String>) -> Self {
        self.claims.push(literal.into());
        self
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::from)
    }

    /// Parses the boundary JSON.
    ///
    /// Schema violations are structural errors naming the first concept,
    /// premise or rule that fails to decode.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).map_err(|e| Error::MalformedInput {
            id: "input".to_string(),
            reason: e.to_string(),
        })?;
        Self::deserialize(&value).map_err(|e| malformed(&value, e))
    }
}

fn decode_error<T: DeserializeOwned>(item: &Value) -> Option<String> {
    T::deserialize(item).err().map(|e| e.to_string())
}

/// Locates the first item of the input that does not decode.
fn malformed(value: &Value, err: serde_json::Error) -> Error {
    let sections: [(&str, fn(&Value) -> Option<String>); 3] = [
        ("concepts", decode_error::<Concept>),
        ("premises", decode_error::<Premise>),
        ("rules", decode_error::<Rule>),
    ];
    for (field, decode) in sections {
        let Some(items) = value.get(field).and_then(Value::as_array) else {
            continue;
        };
        for (index, item) in items.iter().enumerate() {
            if let Some(reason) = decode(item) {
                let id = item
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}[{}]", field, index));
                return Error::MalformedInput { id, reason };
            }
        }
    }
    Error::MalformedInput {
        id: "input".to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_builder() {
        let rule = Rule::defeasible("r1")
            .when("a")
            .when("b")
            .then("c")
            .unless("e")
            .build();

        assert_eq!(rule.id, "r1");
        assert!(rule.is_defeasible());
        assert_eq!(rule.antecedent_ids, vec!["a", "b"]);
        assert_eq!(rule.consequent_id, "c");
        assert_eq!(rule.exception_id.as_deref(), Some("e"));
    }

    #[test]
    fn test_parse_boundary_json() {
        let json = r#"{
            "concepts": [{"id": "weather", "tag": "condition"}],
            "premises": [
                {"id": "rain", "text": "It rains", "conceptId": "weather", "source": "ordinary", "belief": 0.9}
            ],
            "rules": [
                {"id": "r1", "kind": "defeasible", "antecedentIds": ["rain"], "consequentId": "wet", "exceptionId": "roof"}
            ],
            "preference": {"priority": {"r1": 2}}
        }"#;

        let input = ArgumentInput::from_json(json).unwrap();
        assert_eq!(input.premises[0].concept_id, "weather");
        assert_eq!(input.rules[0].exception_id.as_deref(), Some("roof"));
        assert!(matches!(input.preference, PreferenceSpec::Priority(ref m) if m["r1"] == 2.0));
    }

    #[test]
    fn test_unknown_rule_kind_names_the_rule() {
        let json = r#"{
            "concepts": [{"id": "weather", "tag": "condition"}],
            "rules": [
                {"id": "r1", "kind": "defeasible", "antecedentIds": [], "consequentId": "wet"},
                {"id": "r2", "kind": "probable", "antecedentIds": [], "consequentId": "dry"}
            ]
        }"#;

        let err = ArgumentInput::from_json(json).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { ref id, .. } if id == "r2"));
        assert_eq!(err.class(), crate::error::ErrorClass::Structural);
    }

    #[test]
    fn test_invalid_json_is_malformed_input() {
        let err = ArgumentInput::from_json("{\"premises\": [").unwrap_err();
        assert_eq!(err.offending_id(), Some("input"));
        assert_eq!(err.class(), crate::error::ErrorClass::Structural);
    }

    #[test]
    fn test_preference_switching() {
        let input = ArgumentInput::new().priority("r1", 1.0).prefer("r2", "r3");
        assert_eq!(
            input.preference,
            PreferenceSpec::Order(vec![("r2".to_string(), "r3".to_string())])
        );
    }
}
