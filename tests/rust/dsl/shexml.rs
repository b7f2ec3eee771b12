//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Tu.
//! The Tu project belongs to the Dunimd Team.

use tumap::dsl::ir::{TuCCombinator, TuCOperand, TuCReferenceFormulation, TuCTermKind, TuCTermValue};
use tumap::dsl::shexml::TuFParseShExML;

const SCENARIO_A: &str = include_str!("../../fixtures/scenario_a.shexml");

#[test]
fn test_shexml_lowers_bound_iterators_only() {
    let doc = TuFParseShExML(SCENARIO_A).unwrap();

    let sources: Vec<&str> = doc.sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(sources, vec!["films_csv_file", "films_second_csv_file"]);
    assert_eq!(doc.sources[0].location, "./film.csv");

    assert_eq!(doc.iterators.len(), 1);
    let it = &doc.iterators[0];
    assert_eq!(it.name, "film_csv");
    assert_eq!(it.source, "films_csv_file");
    assert_eq!(it.formulation, TuCReferenceFormulation::CSVRows);
    assert_eq!(it.aliases, vec!["films".to_string()]);
    let fields: Vec<&str> = it.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, vec!["id", "name", "year", "country", "directors"]);
    assert_eq!(it.fields[0].reference, "@id");
}

#[test]
fn test_shexml_expressions_are_rewritten_to_iterator_references() {
    let doc = TuFParseShExML(SCENARIO_A).unwrap();
    assert_eq!(doc.expressions.len(), 2);

    let alias = &doc.expressions[0];
    assert_eq!(alias.name, "films_name_csv");
    assert_eq!(alias.combinator, TuCCombinator::Alias);
    assert_eq!(alias.operands, vec![TuCOperand::Reference("film_csv.name".into())]);

    let concat = &doc.expressions[1];
    assert_eq!(concat.combinator, TuCCombinator::Concat);
    assert_eq!(
        concat.operands,
        vec![
            TuCOperand::Reference("film_csv.name".into()),
            TuCOperand::Literal("_".into()),
            TuCOperand::Reference("film_csv.year".into()),
        ]
    );
}

#[test]
fn test_shexml_shape_rules_keep_annotations() {
    let doc = TuFParseShExML(SCENARIO_A).unwrap();
    let unit = &doc.units[0];
    assert_eq!(unit.name, "Films");
    assert!(unit.iterator.is_none());

    let subject = unit.subject.as_ref().unwrap();
    assert_eq!(subject.template, "http://example.com/{films.id}");
    assert_eq!(subject.kind, TuCTermKind::Iri);

    assert_eq!(unit.rules.len(), 7);
    assert_eq!(unit.rules[0].predicate, "http://example.com/type");
    assert_eq!(unit.rules[0].object.value, TuCTermValue::Constant("http://example.com/Film".into()));
    assert_eq!(unit.rules[0].object.kind, TuCTermKind::Iri);

    assert_eq!(unit.rules[1].object.language.as_deref(), Some("en"));
    assert_eq!(
        unit.rules[2].object.datatype.as_deref(),
        Some("http://www.w3.org/2001/XMLSchema#gYear")
    );
    assert_eq!(unit.rules[2].object.value, TuCTermValue::Reference("films.year".into()));
}

#[test]
fn test_shexml_iri_objects_and_blank_subjects() {
    let doc = TuFParseShExML(
        r#"PREFIX ex: <http://ex.com/>
SOURCE people <people.json>
ITERATOR person <jsonpath: $.people[*]> {
    FIELD id <id>
    FIELD friend <friend>
}
ex:Person _:[people.person.id] {
    ex:knows ex:[people.person.friend] ;
    ex:label "constant" ;
}
"#,
    )
    .unwrap();

    assert_eq!(doc.iterators[0].formulation, TuCReferenceFormulation::JSONPath);
    assert_eq!(doc.iterators[0].query, "$.people[*]");

    let unit = &doc.units[0];
    let subject = unit.subject.as_ref().unwrap();
    assert_eq!(subject.kind, TuCTermKind::BlankNode);
    assert_eq!(subject.template, "{person.id}");
    assert_eq!(
        unit.rules[0].object.value,
        TuCTermValue::Template("http://ex.com/{person.friend}".into())
    );
    assert_eq!(unit.rules[0].object.kind, TuCTermKind::Iri);
    assert_eq!(unit.rules[1].object.value, TuCTermValue::Constant("constant".into()));
    assert_eq!(unit.rules[1].object.kind, TuCTermKind::Literal);
}

#[test]
fn test_shexml_iterator_read_through_two_sources_is_split() {
    let doc = TuFParseShExML(
        r#"PREFIX : <http://ex.com/>
SOURCE a <a.csv>
SOURCE b <b.csv>
ITERATOR rows <csvperrow> {
    FIELD id <id>
}
EXPRESSION both <a.rows.id + "-" + b.rows.id>
"#,
    )
    .unwrap();
    let names: Vec<&str> = doc.iterators.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["a_rows", "b_rows"]);
    assert_eq!(
        doc.expressions[0].operands[0],
        TuCOperand::Reference("a_rows.id".into())
    );
}

#[test]
fn test_shexml_unsupported_constructs_are_parse_errors() {
    let union = "PREFIX : <http://ex.com/>\nSOURCE s <s.csv>\nITERATOR i <csvperrow> {\n  FIELD id <id>\n}\nEXPRESSION e <s.i.id UNION s.i.id>\n";
    let err = TuFParseShExML(union).unwrap_err();
    assert_eq!(err.TuFKind(), "ParseError");
    assert!(err.to_string().contains("UNION"));

    let nested = "SOURCE s <s.json>\nITERATOR i <jsonpath: $.a> {\n  ITERATOR j <b> {\n  }\n}\n";
    let err = TuFParseShExML(nested).unwrap_err();
    assert_eq!(err, tumap::TuCError::parse(3, 3, "nested iterators are not supported"));

    let functions = "FUNCTIONS helper <scala: https://example.com/helper.scala>\n";
    assert_eq!(TuFParseShExML(functions).unwrap_err().TuFKind(), "ParseError");
}

#[test]
fn test_shexml_undeclared_prefix_is_parse_error() {
    let doc = "SOURCE s <s.csv>\nITERATOR i <csvperrow> {\n  FIELD id <id>\n}\nex:S ex:[s.i.id] {\n  ex:p [s.i.id] ;\n}\n";
    let err = TuFParseShExML(doc).unwrap_err();
    assert_eq!(err.TuFKind(), "ParseError");
    assert!(err.to_string().contains("undeclared prefix 'ex:'"));
}
