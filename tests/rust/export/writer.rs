//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Tu.
//! The Tu project belongs to the Dunimd Team.

use tumap::export::{TuCPlanFormat, TuCPlanWriter};
use tumap::{TuCPlan, TuCTranslator};

const SCENARIO_A: &str = include_str!("../../fixtures/scenario_a.shexml");
const SCENARIO_B: &str = include_str!("../../fixtures/scenario_b.ttl");
const SCENARIO_B_PLAN: &str = include_str!("../../fixtures/scenario_b.expected");

#[test]
fn test_writer_scenario_b_text() {
    let plan = TuCTranslator::default().TuFPlan(SCENARIO_B).unwrap();
    let text = TuCPlanWriter::TuFNew().TuFRender(&plan).unwrap();
    assert_eq!(text, SCENARIO_B_PLAN);
}

#[test]
fn test_writer_scenario_a_statements() {
    let plan = TuCTranslator::default().TuFPlan(SCENARIO_A).unwrap();
    let text = TuCPlanWriter::TuFNew().TuFRender(&plan).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(
        lines[0],
        r#"Source_0 inputs=[] schema=["id", "name", "year", "country", "directors"]"#
    );
    assert_eq!(lines[1], r#"  source "films_csv_file" location="./film.csv" format=CSV"#);
    assert!(lines.contains(&r#"  "films_name_csv" = alias(ref("name"))"#));
    assert!(lines.contains(&r#"  "films_name_year" = concat(ref("name"), "_", ref("year"))"#));
    assert!(lines.contains(
        &r#"  statement iri("http://example.com/{id}") <http://example.com/name> literal(ref("films_name_csv")) language="en""#
    ));
    assert!(lines.contains(
        &r#"  statement iri("http://example.com/{id}") <http://example.com/year> literal(ref("year")) datatype=<http://www.w3.org/2001/XMLSchema#gYear>"#
    ));
    assert!(lines.contains(
        &r#"  statement iri("http://example.com/{id}") <http://example.com/type> iri(const("http://example.com/Film"))"#
    ));

    for predicate in ["name", "year", "country", "comment"] {
        assert!(text.contains(&format!("<http://example.com/{}>", predicate)));
    }
    assert!(text.contains("Serialize_4 inputs=[Extend_3]"));
    assert!(text.ends_with("Sink_5 inputs=[Serialize_4] schema=[]\n  target=StdOut format=NQuads\n"));
}

#[test]
fn test_writer_escapes_literals() {
    let doc = r#"PREFIX : <http://ex.com/>
SOURCE s <s.csv>
ITERATOR rows <csvperrow> {
    FIELD id <id>
}
EXPRESSION quoted <s.rows.id + 'say "hi"\there'>
:S :[s.rows.id] {
    :p [quoted] ;
}
"#;
    let plan = TuCTranslator::default().TuFPlan(doc).unwrap();
    let text = TuCPlanWriter::TuFNew().TuFRender(&plan).unwrap();
    assert!(text.contains(r#"  "quoted" = concat(ref("id"), "say \"hi\"\\there")"#));
}

#[test]
fn test_writer_json_output() {
    let plan = TuCTranslator::default().TuFPlan(SCENARIO_B).unwrap();
    let json = TuCPlanWriter::TuFNew()
        .TuFFormat(TuCPlanFormat::Json)
        .TuFRender(&plan)
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["operators"][0]["params"]["kind"], "Source");
    assert_eq!(value["operators"][2]["params"]["column"], "TriplesMap1_template_0");
    assert_eq!(value["units"][0]["unit"], "TriplesMap1");

    let back: TuCPlan = serde_json::from_str(&json).unwrap();
    assert_eq!(back, plan);
}

#[test]
fn test_writer_writes_to_sink() {
    let plan = TuCTranslator::default().TuFPlan(SCENARIO_B).unwrap();
    let mut out: Vec<u8> = Vec::new();
    let written = TuCPlanWriter::TuFNew().TuFWrite(&plan, &mut out).unwrap();
    assert_eq!(written, out.len());
    assert_eq!(String::from_utf8(out).unwrap(), SCENARIO_B_PLAN);
}

#[test]
fn test_writer_output_is_deterministic() {
    let first = TuCTranslator::default().TuFTranslate(SCENARIO_A).unwrap();
    let second = TuCTranslator::default().TuFTranslate(SCENARIO_A).unwrap();
    assert_eq!(first, second);
}
