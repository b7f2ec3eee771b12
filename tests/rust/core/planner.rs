//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Tu.
//! The Tu project belongs to the Dunimd Team.

use tumap::dag::{TuCOperatorId, TuCOperatorKind, TuCOperatorParams};
use tumap::dsl::ir::{TuCCombinator, TuCOperand};
use tumap::{TuCPlanCompiler, TuCTranslator, TuCTranslatorConfigBuilder};

const SCENARIO_A: &str = include_str!("../../fixtures/scenario_a.shexml");
const SCENARIO_B: &str = include_str!("../../fixtures/scenario_b.ttl");

const TWO_MAPS: &str = r#"@prefix rr: <http://www.w3.org/ns/r2rml#> .
@prefix rml: <http://semweb.mmlab.be/ns/rml#> .
@prefix ex: <http://example.com/> .

ex:A rml:logicalSource [ rml:source "data.csv" ] ;
  rr:subjectMap [ rr:reference "id" ] ;
  rr:predicateObjectMap [ rr:predicate ex:p ; rr:objectMap [ rml:reference "x" ] ] .

ex:B rml:logicalSource [ rml:source "data.csv" ] ;
  rr:subjectMap [ rr:reference "id" ] ;
  rr:predicateObjectMap [ rr:predicate ex:q ; rr:objectMap [ rml:reference "y" ] ] .
"#;

fn kinds(plan: &tumap::TuCPlan) -> Vec<TuCOperatorKind> {
    plan.operators.iter().map(|op| op.TuFKind()).collect()
}

#[test]
fn test_planner_scenario_b_chain() {
    let plan = TuCTranslator::default().TuFPlan(SCENARIO_B).unwrap();
    assert_eq!(
        kinds(&plan),
        vec![
            TuCOperatorKind::Source,
            TuCOperatorKind::Projection,
            TuCOperatorKind::Extend,
            TuCOperatorKind::Serialize,
            TuCOperatorKind::Sink,
        ]
    );
    for (i, op) in plan.operators.iter().enumerate() {
        assert_eq!(op.id, TuCOperatorId(i));
        if i > 0 {
            assert_eq!(op.inputs, vec![TuCOperatorId(i - 1)]);
        }
    }
    assert_eq!(plan.operators[2].schema, vec!["Name", "TriplesMap1_template_0"]);
    assert_eq!(plan.operators[3].schema, vec!["subject", "predicate", "object"]);
    assert!(plan.operators[4].schema.is_empty());
}

#[test]
fn test_planner_scenario_a_extends_follow_dependencies() {
    let plan = TuCTranslator::default().TuFPlan(SCENARIO_A).unwrap();
    let names: Vec<String> = plan.operators.iter().map(|op| op.TuFName()).collect();
    assert_eq!(
        names,
        vec!["Source_0", "Projection_1", "Extend_2", "Extend_3", "Serialize_4", "Sink_5"]
    );

    match &plan.operators[3].params {
        TuCOperatorParams::Extend {
            column,
            combinator,
            operands,
        } => {
            assert_eq!(column, "films_name_year");
            assert_eq!(*combinator, TuCCombinator::Concat);
            assert_eq!(operands[1], TuCOperand::Literal("_".into()));
        }
        other => panic!("expected an Extend, got {:?}", other),
    }
    assert_eq!(
        plan.operators[4].schema,
        vec!["subject", "predicate", "object", "datatype", "language"]
    );
}

#[test]
fn test_planner_shares_source_between_units() {
    let plan = TuCTranslator::default().TuFPlan(TWO_MAPS).unwrap();
    let sources = plan
        .operators
        .iter()
        .filter(|op| op.TuFKind() == TuCOperatorKind::Source)
        .count();
    assert_eq!(sources, 1);
    assert_eq!(plan.operators[0].schema, vec!["id", "x", "y"]);

    // Each projection narrows the shared schema to what its unit reads.
    let projections: Vec<&Vec<String>> = plan
        .operators
        .iter()
        .filter(|op| op.TuFKind() == TuCOperatorKind::Projection)
        .map(|op| &op.schema)
        .collect();
    assert_eq!(projections, vec![&vec!["id".to_string(), "x".to_string()], &vec!["id".to_string(), "y".to_string()]]);

    assert_eq!(plan.TuFExitPoints(), vec![TuCOperatorId(3), TuCOperatorId(6)]);
    assert_eq!(plan.TuFUnitOperators("B").unwrap()[0], TuCOperatorId(0));
}

#[test]
fn test_planner_without_sharing_reemits_sources() {
    let config = TuCTranslatorConfigBuilder::TuFNew().TuFShareSources(false).TuFBuild();
    let plan = TuCTranslator::TuFNew(config).TuFPlan(TWO_MAPS).unwrap();
    assert_eq!(
        kinds(&plan),
        vec![
            TuCOperatorKind::Source,
            TuCOperatorKind::Projection,
            TuCOperatorKind::Serialize,
            TuCOperatorKind::Sink,
            TuCOperatorKind::Source,
            TuCOperatorKind::Projection,
            TuCOperatorKind::Serialize,
            TuCOperatorKind::Sink,
        ]
    );
    assert_eq!(plan.operators[5].inputs, vec![TuCOperatorId(4)]);
}

#[test]
fn test_planner_unknown_iterator_is_planner_error() {
    let mut doc = TuCTranslator::default().TuFNormalize(SCENARIO_B).unwrap();
    doc.units[0].iterator = "nowhere".to_string();
    let err = TuCPlanCompiler::TuFNew().TuFCompile(&doc).unwrap_err();
    assert_eq!(err.TuFKind(), "PlannerError");
}

#[test]
fn test_planner_missing_column_is_planner_error() {
    let mut doc = TuCTranslator::default().TuFNormalize(SCENARIO_B).unwrap();
    doc.units[0].expressions.clear();
    let err = TuCPlanCompiler::TuFNew().TuFCompile(&doc).unwrap_err();
    assert_eq!(err.TuFKind(), "PlannerError");
    assert!(err.to_string().contains("TriplesMap1_template_0"));
}
