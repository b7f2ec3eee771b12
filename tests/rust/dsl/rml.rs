//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Tu.
//! The Tu project belongs to the Dunimd Team.

use tumap::dsl::ir::{TuCCombinator, TuCDataFormat, TuCOperand, TuCReferenceFormulation, TuCTermKind, TuCTermValue};
use tumap::dsl::rml::TuFParseRml;
use tumap::dsl::vocab::RDF_TYPE;

const SCENARIO_B: &str = include_str!("../../fixtures/scenario_b.ttl");

#[test]
fn test_rml_scenario_b_lowering() {
    let doc = TuFParseRml(SCENARIO_B).unwrap();

    assert_eq!(doc.sources.len(), 1);
    assert_eq!(doc.sources[0].name, "student.csv");
    assert_eq!(doc.sources[0].format, TuCDataFormat::CSV);

    let it = &doc.iterators[0];
    assert_eq!(it.name, "TriplesMap1");
    assert_eq!(it.source, "student.csv");
    assert_eq!(it.formulation, TuCReferenceFormulation::CSVRows);
    let fields: Vec<&str> = it.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, vec!["Name"]);

    let template = &doc.expressions[0];
    assert_eq!(template.name, "TriplesMap1_template_0");
    assert_eq!(template.combinator, TuCCombinator::Concat);
    assert_eq!(template.scope.as_deref(), Some("TriplesMap1"));
    assert_eq!(
        template.operands,
        vec![
            TuCOperand::Literal("http://example.com/".into()),
            TuCOperand::Reference("Name".into()),
        ]
    );

    let unit = &doc.units[0];
    assert_eq!(unit.iterator.as_deref(), Some("TriplesMap1"));
    assert_eq!(unit.subject.as_ref().unwrap().template, "{TriplesMap1_template_0}");
    assert_eq!(unit.rules.len(), 1);
    assert_eq!(unit.rules[0].predicate, "http://xmlns.com/foaf/0.1/name");
    assert_eq!(unit.rules[0].object.value, TuCTermValue::Reference("Name".into()));
    assert_eq!(unit.rules[0].object.kind, TuCTermKind::Literal);
}

#[test]
fn test_rml_core_namespace_with_class_and_annotations() {
    let doc = TuFParseRml(
        r#"@prefix rml: <http://w3id.org/rml/> .
@prefix ex: <http://example.com/> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

ex:People a rml:TriplesMap ;
  rml:logicalSource [
    rml:source [ rml:path "people.json" ] ;
    rml:referenceFormulation rml:JSONPath ;
    rml:iterator "$.people[*]"
  ] ;
  rml:subjectMap [
    rml:reference "iri" ;
    rml:class ex:Person
  ] ;
  rml:predicateObjectMap [
    rml:predicate ex:age , ex:years ;
    rml:objectMap [ rml:reference "age" ; rml:datatype xsd:integer ]
  ] , [
    rml:predicate ex:greeting ;
    rml:objectMap [ rml:constant "hello" ; rml:language "en" ]
  ] .
"#,
    )
    .unwrap();

    assert_eq!(doc.sources[0].format, TuCDataFormat::JSON);
    assert_eq!(doc.iterators[0].formulation, TuCReferenceFormulation::JSONPath);
    assert_eq!(doc.iterators[0].query, "$.people[*]");

    let unit = &doc.units[0];
    assert_eq!(unit.name, "People");
    assert_eq!(unit.subject.as_ref().unwrap().template, "{iri}");
    let predicates: Vec<&str> = unit.rules.iter().map(|r| r.predicate.as_str()).collect();
    assert_eq!(
        predicates,
        vec![
            RDF_TYPE,
            "http://example.com/age",
            "http://example.com/years",
            "http://example.com/greeting"
        ]
    );
    assert_eq!(
        unit.rules[1].object.datatype.as_deref(),
        Some("http://www.w3.org/2001/XMLSchema#integer")
    );
    assert_eq!(unit.rules[3].object.language.as_deref(), Some("en"));
    assert_eq!(unit.rules[3].object.kind, TuCTermKind::Literal);
}

#[test]
fn test_rml_shared_logical_source_reuses_iterator() {
    let doc = TuFParseRml(
        r#"@prefix rr: <http://www.w3.org/ns/r2rml#> .
@prefix rml: <http://semweb.mmlab.be/ns/rml#> .
@prefix ex: <http://example.com/> .

ex:A rml:logicalSource [ rml:source "data.csv" ] ;
  rr:subjectMap [ rr:template "http://ex.com/a/{id}" ] ;
  rr:predicateObjectMap [ rr:predicate ex:p ; rr:objectMap [ rml:reference "x" ] ] .

ex:B rml:logicalSource [ rml:source "data.csv" ] ;
  rr:subjectMap [ rr:template "http://ex.com/b/{id}" ] ;
  rr:predicateObjectMap [ rr:predicate ex:q ; rr:objectMap [ rml:reference "y" ] ] .
"#,
    )
    .unwrap();

    assert_eq!(doc.iterators.len(), 1);
    assert_eq!(doc.units[0].iterator.as_deref(), Some("A"));
    assert_eq!(doc.units[1].iterator.as_deref(), Some("A"));
    let fields: Vec<&str> = doc.iterators[0].fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, vec!["id", "x", "y"]);
    assert_eq!(doc.expressions[1].name, "B_template_0");
}

#[test]
fn test_rml_unsupported_join_is_parse_error() {
    let err = TuFParseRml(
        r#"@prefix rr: <http://www.w3.org/ns/r2rml#> .
@prefix rml: <http://semweb.mmlab.be/ns/rml#> .
@prefix ex: <http://example.com/> .

ex:A rml:logicalSource [ rml:source "a.csv" ] ;
  rr:subjectMap [ rr:template "{id}" ] ;
  rr:predicateObjectMap [
    rr:predicate ex:p ;
    rr:objectMap [ rr:parentTriplesMap ex:B ]
  ] .
"#,
    )
    .unwrap_err();
    assert_eq!(err.TuFKind(), "ParseError");
    assert!(err.to_string().contains("parentTriplesMap"));
}

#[test]
fn test_rml_without_triples_maps_is_parse_error() {
    let err = TuFParseRml("@prefix ex: <http://example.com/> .\nex:a ex:b ex:c .\n").unwrap_err();
    assert_eq!(err, tumap::TuCError::parse(1, 1, "document declares no triples map"));
}

#[test]
fn test_rml_missing_object_is_arity_error() {
    let err = TuFParseRml(
        r#"@prefix rr: <http://www.w3.org/ns/r2rml#> .
@prefix rml: <http://semweb.mmlab.be/ns/rml#> .
@prefix ex: <http://example.com/> .

ex:A rml:logicalSource [ rml:source "a.csv" ] ;
  rr:subjectMap [ rr:template "{id}" ] ;
  rr:predicateObjectMap [ rr:predicate ex:p ] .
"#,
    )
    .unwrap_err();
    assert_eq!(err.TuFKind(), "ArityError");
}

#[test]
fn test_rml_collections_outside_mapping_terms_are_ignored() {
    let doc = TuFParseRml(
        r#"@prefix rr: <http://www.w3.org/ns/r2rml#> .
@prefix rml: <http://semweb.mmlab.be/ns/rml#> .
@prefix ex: <http://example.com/> .

ex:A rml:logicalSource [ rml:source "a.csv" ] ;
  ex:tags ( "draft" "internal" ) ;
  rr:subjectMap [ rr:template "http://ex.com/{id}" ] ;
  rr:predicateObjectMap [ rr:predicate ex:p ; rr:objectMap [ rml:reference "x" ] ] .
"#,
    )
    .unwrap();
    assert_eq!(doc.units.len(), 1);
    assert_eq!(doc.units[0].rules.len(), 1);
}

#[test]
fn test_rml_full_turtle_names_and_relative_sources() {
    let doc = TuFParseRml(
        r#"@prefix rr: <http://www.w3.org/ns/r2rml#> .
@prefix rml: <http://semweb.mmlab.be/ns/rml#> .
@prefix ex: <http://example.com/> .
@base <http://example.com/maps/> .

<Students> rml:logicalSource [ rml:source <../data/student.csv> ] ;
  rr:subjectMap [ rr:template "http://example.com/{id}" ] ;
  rr:predicateObjectMap [ rr:predicate ex:first%20name ; rr:objectMap [ rml:reference "first" ] ] ,
    [ rr:predicate ex:last\-name ; rr:objectMap [ rml:reference "last" ] ] .
"#,
    )
    .unwrap();

    assert_eq!(doc.sources[0].location, "http://example.com/data/student.csv");
    assert_eq!(doc.sources[0].format, TuCDataFormat::CSV);
    let unit = &doc.units[0];
    assert_eq!(unit.name, "Students");
    let predicates: Vec<&str> = unit.rules.iter().map(|r| r.predicate.as_str()).collect();
    assert_eq!(
        predicates,
        vec!["http://example.com/first%20name", "http://example.com/last-name"]
    );
}

#[test]
fn test_rml_maps_sharing_a_local_name_stay_distinct() {
    let document = r#"@prefix rr: <http://www.w3.org/ns/r2rml#> .
@prefix rml: <http://semweb.mmlab.be/ns/rml#> .
@prefix ex: <http://example.com/> .

<http://a.example/TM> rml:logicalSource [ rml:source "a.csv" ] ;
  rr:subjectMap [ rr:template "http://ex.com/a/{id}" ] ;
  rr:predicateObjectMap [ rr:predicate ex:p ; rr:objectMap [ rml:reference "x" ] ] .

<http://b.example/TM> rml:logicalSource [ rml:source "b.csv" ] ;
  rr:subjectMap [ rr:template "http://ex.com/b/{id}" ] ;
  rr:predicateObjectMap [ rr:predicate ex:q ; rr:objectMap [ rml:reference "y" ] ] .
"#;
    let doc = TuFParseRml(document).unwrap();

    let units: Vec<&str> = doc.units.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(units, vec!["TM", "TM_1"]);
    let iterators: Vec<&str> = doc.iterators.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(iterators, vec!["TM", "TM_1"]);
    assert_eq!(doc.expressions[1].name, "TM_1_template_0");

    let plan = tumap::TuCTranslator::default().TuFPlan(document).unwrap();
    assert!(plan.TuFUnitOperators("TM").is_some());
    assert!(plan.TuFUnitOperators("TM_1").is_some());
}
