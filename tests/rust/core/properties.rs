//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Tu.
//! The Tu project belongs to the Dunimd Team.

//! Structural properties of compiled plans over generated ShExML documents.

use proptest::prelude::*;
use tumap::dag::TuCOperatorKind;
use tumap::{TuCPlan, TuCTranslator};

#[derive(Clone, Debug)]
struct GeneratedDoc {
    fields: usize,
    subject: usize,
    objects: Vec<usize>,
    joined: Option<(usize, usize)>,
    text: String,
}

impl GeneratedDoc {
    /// Field names the shape reaches, in declaration order.
    fn reached(&self) -> Vec<String> {
        let mut used = vec![false; self.fields];
        used[self.subject] = true;
        for &o in &self.objects {
            used[o] = true;
        }
        if let Some((a, b)) = self.joined {
            used[a] = true;
            used[b] = true;
        }
        (0..self.fields).filter(|&i| used[i]).map(|i| format!("f{}", i)).collect()
    }
}

fn doc_strategy() -> impl Strategy<Value = GeneratedDoc> {
    (1usize..7)
        .prop_flat_map(|fields| {
            (
                Just(fields),
                0..fields,
                prop::collection::vec(0..fields, 1..5),
                prop::option::of((0..fields, 0..fields)),
            )
        })
        .prop_map(|(fields, subject, objects, joined)| {
            let mut text = String::from("PREFIX : <http://ex.com/>\nSOURCE src <data.csv>\nITERATOR rows <csvperrow> {\n");
            for i in 0..fields {
                text.push_str(&format!("    FIELD f{i} <col{i}>\n"));
            }
            text.push_str("}\n");
            if let Some((a, b)) = joined {
                text.push_str(&format!("EXPRESSION joined <src.rows.f{a} + \"-\" + src.rows.f{b}>\n"));
            }
            text.push_str(&format!(":Shape :[src.rows.f{subject}] {{\n"));
            for (k, o) in objects.iter().enumerate() {
                text.push_str(&format!("    :p{k} [src.rows.f{o}] ;\n"));
            }
            if joined.is_some() {
                text.push_str("    :joined [joined] ;\n");
            }
            text.push_str("}\n");
            GeneratedDoc {
                fields,
                subject,
                objects,
                joined,
                text,
            }
        })
}

fn plan(doc: &GeneratedDoc) -> TuCPlan {
    TuCTranslator::default()
        .TuFPlan(&doc.text)
        .unwrap_or_else(|e| panic!("{}\n{}", e, doc.text))
}

proptest! {
    #[test]
    fn prop_translation_is_deterministic(doc in doc_strategy()) {
        let first = tumap::translate(&doc.text);
        let second = tumap::translate(&doc.text);
        prop_assert!(first.is_ok());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_sequence_ids_start_at_zero_without_gaps(doc in doc_strategy()) {
        let plan = plan(&doc);
        for (i, op) in plan.operators.iter().enumerate() {
            prop_assert_eq!(op.id.0, i);
            prop_assert!(op.inputs.iter().all(|input| input.0 < i));
        }
    }

    #[test]
    fn prop_no_operator_reaches_itself(doc in doc_strategy()) {
        let plan = plan(&doc);
        prop_assert!(!plan.TuFDetectCycles());
        for op in &plan.operators {
            prop_assert!(!plan.TuFInputClosure(op.id).contains(&op.id));
        }
    }

    #[test]
    fn prop_projection_schema_is_exactly_the_reached_fields(doc in doc_strategy()) {
        let plan = plan(&doc);
        let projection = plan
            .operators
            .iter()
            .find(|op| op.TuFKind() == TuCOperatorKind::Projection)
            .expect("every unit has a projection");
        prop_assert_eq!(&projection.schema, &doc.reached());

        let extends = plan
            .operators
            .iter()
            .filter(|op| op.TuFKind() == TuCOperatorKind::Extend)
            .count();
        prop_assert_eq!(extends, usize::from(doc.joined.is_some()));
    }

    #[test]
    fn prop_every_unit_ends_in_a_sink(doc in doc_strategy()) {
        let plan = plan(&doc);
        let exits = plan.TuFExitPoints();
        prop_assert_eq!(exits.len(), plan.units.len());
        for id in exits {
            let kind = plan.TuFOperator(id).map(|op| op.TuFKind());
            prop_assert_eq!(kind, Some(TuCOperatorKind::Sink));
        }
    }
}

#[test]
fn test_unresolved_names_are_reference_errors() {
    let doc = "PREFIX : <http://ex.com/>\nSOURCE src <data.csv>\nITERATOR rows <csvperrow> {\n    FIELD f0 <c>\n}\n:S :[src.rows.f0] {\n    :p [src.rows.nope] ;\n}\n";
    let err = tumap::translate(doc).unwrap_err();
    assert!(err.starts_with("reference error:"), "{}", err);
}
