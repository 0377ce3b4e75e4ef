//! Integration tests for the argumentation engine
//!
//! Covers determinism, semantics containment, preference monotonicity,
//! belief propagation, fatal load errors, the classic attack scenarios and
//! report round-tripping.

use aingle_argumentation::attack::AttackGraph;
use aingle_argumentation::semantics;
use aingle_argumentation::structure;
use aingle_argumentation::{
    ArgumentInput, ArgumentSet, ArgumentValidator, ArgumentationValidator, Concept, Error,
    ErrorClass, FallacyPattern, LinkPolicy, Premise, Rule, Semantics, Status, ValidationConfig,
    ValidationReport, WarningCode,
};

// ============================================================================
// Fixtures
// ============================================================================

fn base() -> ArgumentInput {
    ArgumentInput::new().concept(Concept::new("claim", "assertion"))
}

/// Two equally preferred defeasible rules concluding `q` and `~q`.
fn mutual_rebuttal() -> ArgumentInput {
    base()
        .premise(Premise::new("a", "claim", 0.9))
        .premise(Premise::new("b", "claim", 0.8))
        .rule(Rule::defeasible("r1").when("a").then("q").build())
        .rule(Rule::defeasible("r2").when("b").then("~q").build())
}

/// An even rebuttal cycle, an odd undercut cycle and an unattacked chain.
fn mixed_graph() -> ArgumentInput {
    mutual_rebuttal()
        .premise(Premise::new("p", "claim", 0.7))
        .premise(Premise::new("s", "claim", 0.7))
        .premise(Premise::new("t", "claim", 0.7))
        .rule(Rule::defeasible("d1").when("p").then("~d2").build())
        .rule(Rule::defeasible("d2").when("s").then("~d3").build())
        .rule(Rule::defeasible("d3").when("t").then("~d1").build())
        .rule(Rule::strict("k1").when("q").then("z").build())
        .rule(Rule::defeasible("k2").when("a").when("b").then("w").build())
}

fn validate(input: &ArgumentInput, config: ValidationConfig) -> ValidationReport {
    ArgumentValidator::with_config(config).validate(input).unwrap()
}

fn status_of(report: &ValidationReport, literal: &str) -> Status {
    report.concluding(literal).next().unwrap().status
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_identical_input_gives_identical_json() {
    let config = ValidationConfig::default().with_semantics(Semantics::Preferred);
    let first = validate(&mixed_graph(), config.clone()).to_json().unwrap();
    let second = validate(&mixed_graph(), config).to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_parallel_and_sequential_runs_agree() {
    let parallel = validate(&mixed_graph(), ValidationConfig::default());
    let sequential = validate(&mixed_graph(), ValidationConfig::default().with_parallel(false));
    assert_eq!(
        parallel.fingerprint().unwrap(),
        sequential.fingerprint().unwrap()
    );
}

// ============================================================================
// Semantics
// ============================================================================

#[test]
fn test_grounded_is_contained_in_every_preferred_extension() {
    let input = mixed_graph();
    let set = ArgumentSet::load(&input, 4096).unwrap();
    let checked = structure::check(&set);

    let grounded_config = ValidationConfig::default();
    let graph = AttackGraph::build(&set, &checked, &grounded_config);
    let grounded = semantics::evaluate(&graph, set.len(), &grounded_config);
    assert_eq!(grounded.extensions.len(), 1);

    let preferred_config = ValidationConfig::default().with_semantics(Semantics::Preferred);
    let preferred = semantics::evaluate(&graph, set.len(), &preferred_config);
    assert!(!preferred.truncated);
    assert_eq!(preferred.extensions.len(), 2);
    for extension in &preferred.extensions {
        assert!(grounded.extensions[0].members.is_subset(&extension.members));
    }
}

#[test]
fn test_extensions_are_conflict_free() {
    let input = mixed_graph();
    let set = ArgumentSet::load(&input, 4096).unwrap();
    let checked = structure::check(&set);
    let config = ValidationConfig::default().with_semantics(Semantics::Preferred);
    let graph = AttackGraph::build(&set, &checked, &config);
    let evaluation = semantics::evaluate(&graph, set.len(), &config);

    for extension in &evaluation.extensions {
        for a in &extension.members {
            for b in &extension.members {
                assert!(!graph.defeats(*a, *b), "{} defeats {} inside an extension", a, b);
            }
        }
    }
}

#[test]
fn test_cyclic_attack_graphs_never_fail() {
    for semantics in [Semantics::Grounded, Semantics::Preferred, Semantics::Stable] {
        let report = validate(&mixed_graph(), ValidationConfig::default().with_semantics(semantics));
        assert_eq!(status_of(&report, "~d2"), Status::Undec);
    }
}

#[test]
fn test_stable_without_extension_warns() {
    let report = validate(
        &mixed_graph(),
        ValidationConfig::default().with_semantics(Semantics::Stable),
    );
    assert_eq!(report.warnings[0].code, WarningCode::NoStableExtension);
    assert!(!report.truncated);
}

#[test]
fn test_iteration_cap_truncates_to_grounded() {
    let capped = validate(
        &mixed_graph(),
        ValidationConfig::default()
            .with_semantics(Semantics::Preferred)
            .with_iteration_cap(2),
    );
    let grounded = validate(&mixed_graph(), ValidationConfig::default());

    assert!(capped.truncated);
    assert_eq!(capped.semantics, Semantics::Preferred);
    assert_eq!(capped.warnings[0].code, WarningCode::SemanticsTruncated);
    let statuses = |r: &ValidationReport| r.arguments.iter().map(|a| a.status).collect::<Vec<_>>();
    assert_eq!(statuses(&capped), statuses(&grounded));
}

// ============================================================================
// Preference monotonicity
// ============================================================================

fn allowed(before: Status, after: Status) -> bool {
    !matches!(
        (before, after),
        (Status::In, Status::Out) | (Status::In, Status::Undec) | (Status::Undec, Status::Out)
    )
}

#[test]
fn test_strengthening_preference_never_demotes() {
    let scenarios = [
        (mutual_rebuttal(), "q", "r1", "r2"),
        (mutual_rebuttal().prefer("r2", "r1"), "q", "r1", "b"),
        (mixed_graph(), "w", "k2", "r2"),
    ];
    for (input, literal, stronger, weaker) in scenarios {
        let before = validate(&input, ValidationConfig::default());
        let after = validate(&input.prefer(stronger, weaker), ValidationConfig::default());
        let (b, a) = (status_of(&before, literal), status_of(&after, literal));
        assert!(allowed(b, a), "{} moved from {:?} to {:?}", literal, b, a);
    }
}

#[test]
fn test_link_policies_agree_on_single_rule_arguments() {
    let input = mutual_rebuttal().prefer("r1", "r2");
    for policy in [LinkPolicy::LastLink, LinkPolicy::WeakestLink] {
        let report = validate(&input, ValidationConfig::default().with_link_policy(policy));
        assert_eq!(status_of(&report, "q"), Status::In, "{:?}", policy);
        assert_eq!(status_of(&report, "~q"), Status::Out, "{:?}", policy);
    }
}

#[test]
fn test_weakest_link_ranks_the_whole_chain() {
    // ~q is reached through the weak rule r3, which only weakest-link sees.
    let input = base()
        .premise(Premise::new("a", "claim", 0.9))
        .premise(Premise::new("b", "claim", 0.9))
        .rule(Rule::defeasible("r1").when("a").then("q").build())
        .rule(Rule::defeasible("r3").when("b").then("m").build())
        .rule(Rule::defeasible("r2").when("m").then("~q").build())
        .prefer("r1", "r3");

    let last = validate(&input, ValidationConfig::default());
    assert_eq!(status_of(&last, "q"), Status::Undec);

    let weakest = validate(
        &input,
        ValidationConfig::default().with_link_policy(LinkPolicy::WeakestLink),
    );
    assert_eq!(status_of(&weakest, "q"), Status::In);
    assert_eq!(status_of(&weakest, "~q"), Status::Out);
}

// ============================================================================
// Belief propagation
// ============================================================================

#[test]
fn test_product_belief_without_discount() {
    let input = base()
        .premise(Premise::new("a", "claim", 0.9))
        .premise(Premise::new("b", "claim", 0.8))
        .rule(Rule::defeasible("r1").when("a").when("b").then("q").build());
    let report = validate(&input, ValidationConfig::default().with_discount(1.0));
    assert_eq!(report.concluding("q").next().unwrap().belief_label, 0.72);
}

// ============================================================================
// Fatal errors
// ============================================================================

#[test]
fn test_circular_support_rejected_at_load() {
    let input = base()
        .premise(Premise::new("a", "claim", 0.9))
        .rule(Rule::defeasible("r1").when("a").when("c").then("b").build())
        .rule(Rule::defeasible("r2").when("a").then("c").build())
        .rule(Rule::defeasible("r3").when("b").then("c").build());

    let err = ArgumentValidator::new().validate(&input).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Structural);
    assert!(matches!(err, Error::CircularSupport { .. }));
}

#[test]
fn test_cyclic_preference_is_config_error() {
    let input = mutual_rebuttal().prefer("r1", "r2").prefer("r2", "r1");
    let err = ArgumentValidator::new().validate(&input).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Config);
}

#[test]
fn test_unknown_rule_kind_is_structural_error() {
    let json = r#"{
        "concepts": [{"id": "health", "tag": "condition"}],
        "premises": [
            {"id": "smoker", "conceptId": "health", "source": "ordinary", "belief": 0.9}
        ],
        "rules": [
            {"id": "r1", "kind": "probable", "antecedentIds": ["smoker"], "consequentId": "at_risk"}
        ]
    }"#;

    let err = ArgumentValidator::new().validate_json(json).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Structural);
    assert_eq!(err.offending_id(), Some("r1"));
}

#[test]
fn test_out_of_range_belief_is_validation_error() {
    let input = base().premise(Premise::new("a", "claim", -0.1));
    let err = ArgumentValidator::new().validate(&input).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Validation);
    assert_eq!(err.offending_id(), Some("a"));
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_mutual_rebuttal_with_equal_preference_is_undecided() {
    let report = validate(&mutual_rebuttal(), ValidationConfig::default());
    assert_eq!(status_of(&report, "q"), Status::Undec);
    assert_eq!(status_of(&report, "~q"), Status::Undec);
}

#[test]
fn test_undercut_succeeds_regardless_of_preference() {
    let input = base()
        .premise(Premise::new("bird", "claim", 0.9))
        .premise(Premise::new("x_ray", "claim", 0.6))
        .rule(Rule::defeasible("fly").when("bird").then("flies").unless("broken_wing").build())
        .rule(Rule::defeasible("diag").when("x_ray").then("broken_wing").build())
        .prefer("fly", "diag");
    let report = validate(&input, ValidationConfig::default());

    assert_eq!(status_of(&report, "broken_wing"), Status::In);
    assert_eq!(status_of(&report, "flies"), Status::Out);
}

#[test]
fn test_undercut_with_alternative_support_is_at_most_undecided() {
    let input = base()
        .premise(Premise::new("bird", "claim", 0.9))
        .premise(Premise::new("x_ray", "claim", 0.6))
        .premise(Premise::new("wings_ok", "claim", 0.6))
        .rule(Rule::defeasible("fly").when("bird").then("flies").unless("broken_wing").build())
        .rule(Rule::defeasible("diag").when("x_ray").then("broken_wing").build())
        .rule(Rule::defeasible("heal").when("wings_ok").then("~broken_wing").build());
    let report = validate(&input, ValidationConfig::default());
    assert_ne!(status_of(&report, "flies"), Status::In);
}

#[test]
fn test_unsupported_conclusion_names_rejected_argument() {
    let input = base()
        .premise(Premise::new("rumour", "claim", 0.3))
        .premise(Premise::new("record", "claim", 0.9))
        .rule(Rule::defeasible("hearsay").when("rumour").then("guilty").discount(1.0).build())
        .rule(Rule::defeasible("alibi").when("record").then("~guilty").build())
        .prefer("alibi", "hearsay")
        .claim("guilty");
    let report = validate(&input, ValidationConfig::default().with_threshold(0.5));

    let guilty = report.concluding("guilty").next().unwrap();
    assert_eq!(guilty.status, Status::Out);
    assert_eq!(guilty.belief_label, 0.3);

    let fallacy = report
        .fallacies_of(FallacyPattern::UnsupportedConclusion)
        .next()
        .unwrap();
    assert_eq!(fallacy.argument_ids, vec![guilty.id]);
}

#[test]
fn test_exception_premise_is_local_inconsistency() {
    let input = base()
        .premise(Premise::new("bird", "claim", 0.9))
        .premise(Premise::new("penguin", "claim", 0.95))
        .rule(Rule::defeasible("fly").when("bird").then("flies").unless("penguin").build());
    let report = validate(&input, ValidationConfig::default());

    let flies = report.concluding("flies").next().unwrap();
    assert_eq!(flies.status, Status::Out);
    assert_eq!(flies.acceptability, 0.0);
    assert!(flies.excluded.is_some());
    assert_eq!(
        report.fallacies_of(FallacyPattern::LocalInconsistency).count(),
        1
    );
}

// ============================================================================
// Report format
// ============================================================================

#[test]
fn test_report_round_trip() {
    let report = validate(
        &mixed_graph(),
        ValidationConfig::default().with_semantics(Semantics::Preferred),
    );
    let json = report.to_json().unwrap();
    let parsed = ValidationReport::from_json(&json).unwrap();

    assert_eq!(parsed, report);
    assert_eq!(parsed.to_json().unwrap(), json);
}

#[test]
fn test_report_round_trip_through_file() {
    let report = validate(&mutual_rebuttal(), ValidationConfig::default());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");

    std::fs::write(&path, report.to_json().unwrap()).unwrap();
    let parsed = ValidationReport::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();

    for (a, b) in report.arguments.iter().zip(&parsed.arguments) {
        assert_eq!(a.status, b.status);
    }
}

#[test]
fn test_parser_boundary_json() {
    let json = r#"{
        "concepts": [{"id": "health", "tag": "condition"}],
        "premises": [
            {"id": "smoker", "text": "Ann smokes", "conceptId": "health", "source": "ordinary", "belief": 0.9},
            {"id": "athlete", "text": "Ann runs daily", "conceptId": "health", "source": "assumption", "belief": 0.6}
        ],
        "rules": [
            {"id": "r1", "kind": "defeasible", "antecedentIds": ["smoker"], "consequentId": "at_risk"},
            {"id": "r2", "kind": "defeasible", "antecedentIds": ["athlete"], "consequentId": "~at_risk"}
        ],
        "preference": {"priority": {"r1": 2, "r2": 1}}
    }"#;

    let report = ArgumentValidator::new().validate_json(json).unwrap();
    assert_eq!(status_of(&report, "at_risk"), Status::In);
    assert_eq!(status_of(&report, "~at_risk"), Status::Out);
    assert!(report.trace_of(report.concluding("at_risk").next().unwrap().id).is_some());
}
