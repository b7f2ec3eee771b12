//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Tu.
//! The Tu project belongs to the Dunimd Team.

use tumap::dsl::ir::{
    TuCDataFormat, TuCExpression, TuCIterator, TuCMappingDocument, TuCMappingUnit, TuCObjectTerm,
    TuCOperand, TuCTermKind, TuCTermValue,
};
use tumap::dsl::rml::TuFParseRml;
use tumap::dsl::shexml::TuFParseShExML;
use tumap::{TuCError, TuCNormalizer};

const SCENARIO_A: &str = include_str!("../../fixtures/scenario_a.shexml");
const SCENARIO_B: &str = include_str!("../../fixtures/scenario_b.ttl");

fn two_iterators() -> TuCMappingDocument {
    TuCMappingDocument::TuFNew()
        .TuFAddSource("a", "a.csv", TuCDataFormat::CSV)
        .TuFAddSource("b", "b.csv", TuCDataFormat::CSV)
        .TuFAddIterator(TuCIterator::TuFNew("ra", "a").TuFWithField("id", "id").TuFWithField("v", "v"))
        .TuFAddIterator(TuCIterator::TuFNew("rb", "b").TuFWithField("id", "id").TuFWithField("w", "w"))
}

#[test]
fn test_normalize_scenario_a() {
    let raw = TuFParseShExML(SCENARIO_A).unwrap();
    let doc = TuCNormalizer::TuFNew().TuFNormalize(&raw).unwrap();

    let unit = &doc.units[0];
    assert_eq!(unit.iterator, "film_csv");
    assert_eq!(unit.source, "films_csv_file");
    assert_eq!(unit.fields, vec!["id", "name", "year", "country", "directors"]);
    assert_eq!(unit.subject.template, "http://example.com/{id}");

    let names: Vec<&str> = unit.expressions.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["films_name_csv", "films_name_year"]);
    assert_eq!(
        unit.expressions[1].operands,
        vec![
            TuCOperand::Reference("name".into()),
            TuCOperand::Literal("_".into()),
            TuCOperand::Reference("year".into()),
        ]
    );

    assert_eq!(unit.rules[2].object.value, TuCTermValue::Reference("year".into()));
    assert_eq!(unit.rules[6].object.value, TuCTermValue::Reference("films_name_year".into()));
}

#[test]
fn test_normalize_unknown_field_is_reference_error() {
    let broken = SCENARIO_A.replace(":comment  [films_name_year]", ":comment  [films.comment]");
    let raw = TuFParseShExML(&broken).unwrap();
    let err = TuCNormalizer::TuFNew().TuFNormalize(&raw).unwrap_err();
    match err {
        TuCError::Reference { name, referrer } => {
            assert_eq!(name, "films.comment");
            assert!(referrer.contains("http://example.com/comment"));
        }
        other => panic!("expected a reference error, got {:?}", other),
    }
}

#[test]
fn test_normalize_scenario_b_keeps_declared_iterator() {
    let raw = TuFParseRml(SCENARIO_B).unwrap();
    let doc = TuCNormalizer::TuFNew().TuFNormalize(&raw).unwrap();
    let unit = &doc.units[0];
    assert_eq!(unit.iterator, "TriplesMap1");
    assert_eq!(unit.fields, vec!["Name"]);
    assert_eq!(unit.subject.template, "{TriplesMap1_template_0}");
    assert_eq!(unit.expressions.len(), 1);
    assert_eq!(unit.expressions[0].scope.as_deref(), Some("TriplesMap1"));
}

#[test]
fn test_normalize_rejects_fields_of_another_iterator() {
    let doc = two_iterators().TuFAddUnit(
        TuCMappingUnit::TuFNew("U")
            .TuFWithSubject("{ra.id}", TuCTermKind::Iri)
            .TuFWithRule("http://p", TuCObjectTerm::TuFReference("rb.w")),
    );
    let err = TuCNormalizer::TuFNew().TuFNormalize(&doc).unwrap_err();
    assert_eq!(err.TuFKind(), "ReferenceError");
    assert!(err.to_string().contains("'rb.w'"));
}

#[test]
fn test_normalize_expression_shadowing_a_used_field() {
    let doc = two_iterators()
        .TuFAddExpression(TuCExpression::TuFAlias("v", "ra.id"))
        .TuFAddUnit(
            TuCMappingUnit::TuFNew("U")
                .TuFOver("ra")
                .TuFWithSubject("{ra.id}", TuCTermKind::Iri)
                .TuFWithRule("http://p", TuCObjectTerm::TuFReference("v"))
                .TuFWithRule("http://q", TuCObjectTerm::TuFReference("ra.v")),
        );
    let err = TuCNormalizer::TuFNew().TuFNormalize(&doc).unwrap_err();
    assert_eq!(err.TuFKind(), "ReferenceError");
}

#[test]
fn test_normalize_duplicate_names_are_reference_errors() {
    let dup_source = two_iterators().TuFAddSource("a", "again.csv", TuCDataFormat::CSV);
    assert_eq!(
        TuCNormalizer::TuFNew().TuFNormalize(&dup_source).unwrap_err(),
        TuCError::reference("a", "source declared twice")
    );

    let clash = two_iterators().TuFAddExpression(TuCExpression::TuFAlias("ra", "ra.id"));
    assert_eq!(
        TuCNormalizer::TuFNew().TuFNormalize(&clash).unwrap_err().TuFKind(),
        "ReferenceError"
    );

    let orphan = two_iterators().TuFAddIterator(TuCIterator::TuFNew("rc", "c"));
    assert_eq!(
        TuCNormalizer::TuFNew().TuFNormalize(&orphan).unwrap_err().TuFKind(),
        "ReferenceError"
    );
}

#[test]
fn test_normalize_concat_without_operands_is_arity_error() {
    let doc = two_iterators().TuFAddExpression(TuCExpression::TuFConcat("empty", vec![]));
    assert_eq!(
        TuCNormalizer::TuFNew().TuFNormalize(&doc).unwrap_err().TuFKind(),
        "ArityError"
    );
}

#[test]
fn test_normalize_three_step_cycle() {
    let doc = two_iterators()
        .TuFAddExpression(TuCExpression::TuFAlias("x", "y"))
        .TuFAddExpression(TuCExpression::TuFAlias("y", "z"))
        .TuFAddExpression(TuCExpression::TuFConcat(
            "z",
            vec![TuCOperand::Literal("-".into()), TuCOperand::Reference("x".into())],
        ));
    let err = TuCNormalizer::TuFNew().TuFNormalize(&doc).unwrap_err();
    assert_eq!(err.to_string(), "cycle error: x -> y -> z -> x");
}

#[test]
fn test_normalize_undeclared_subject_placeholder() {
    let doc = two_iterators().TuFAddUnit(
        TuCMappingUnit::TuFNew("U")
            .TuFOver("ra")
            .TuFWithSubject("http://ex.com/{missing}", TuCTermKind::Iri)
            .TuFWithRule("http://p", TuCObjectTerm::TuFReference("ra.v")),
    );
    let err = TuCNormalizer::TuFNew().TuFNormalize(&doc).unwrap_err();
    assert_eq!(
        err,
        TuCError::reference("missing", "unresolved in subject template of unit 'U'")
    );
}
