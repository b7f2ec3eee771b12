//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Tu.
//! The Tu project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! Turtle input for the RML front end.
//!
//! Documents are read with `sophia_turtle` and flattened into the triples
//! in the order the parser emits them. Parsed terms carry no positions, so
//! error locations are recovered by searching the document text.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use sophia_api::source::TripleSource;
use sophia_api::term::{Term, TermKind};
use sophia_api::triple::Triple;
use sophia_turtle::parser::turtle;

use crate::dsl::vocab::{TuFLocalName, RDF, XSD};
use crate::errors::{Result, TuCError};

/// Base IRI assumed when a document declares none, so that relative
/// references such as `<#TriplesMap1>` resolve.
pub const DEFAULT_BASE: &str = "http://example.com/base/";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TuCNode {
    Iri(String),
    Blank(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl TuCNode {
    #[allow(non_snake_case)]
    pub fn TuFAsIri(&self) -> Option<&str> {
        match self {
            TuCNode::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    #[allow(non_snake_case)]
    pub fn TuFAsLiteral(&self) -> Option<&str> {
        match self {
            TuCNode::Literal { value, .. } => Some(value),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TuCTriple {
    pub subject: TuCNode,
    pub predicate: String,
    pub object: TuCNode,
}

/// Triples of one document in parser order, with the document text kept
/// for locating errors.
#[derive(Clone, Debug, Default)]
pub struct TuCGraph {
    pub triples: Vec<TuCTriple>,
    text: String,
}

impl TuCGraph {
    /// Distinct subjects in order of first appearance.
    #[allow(non_snake_case)]
    pub fn TuFSubjects(&self) -> Vec<&TuCNode> {
        let mut seen: Vec<&TuCNode> = Vec::new();
        for t in &self.triples {
            if !seen.contains(&&t.subject) {
                seen.push(&t.subject);
            }
        }
        seen
    }

    /// Triples of `subject` whose predicate satisfies `pred`.
    #[allow(non_snake_case)]
    pub fn TuFTriplesWhere<F>(&self, subject: &TuCNode, pred: F) -> Vec<&TuCTriple>
    where
        F: Fn(&str) -> bool,
    {
        self.triples
            .iter()
            .filter(|t| &t.subject == subject && pred(&t.predicate))
            .collect()
    }

    /// Best-effort line and column of `node` in the document; `(1, 1)`
    /// when it cannot be found.
    #[allow(non_snake_case)]
    pub fn TuFLocateNode(&self, node: &TuCNode) -> (usize, usize) {
        self.position(self.node_offset(node, 0))
    }

    /// Best-effort location of the predicate of `triple`, searched from
    /// where its subject is written.
    #[allow(non_snake_case)]
    pub fn TuFLocateTriple(&self, triple: &TuCTriple) -> (usize, usize) {
        let from = self.node_offset(&triple.subject, 0).unwrap_or(0);
        let offset = self
            .find_from(TuFLocalName(&triple.predicate), from)
            .or_else(|| self.node_offset(&triple.subject, 0));
        self.position(offset)
    }

    fn find_from(&self, needle: &str, from: usize) -> Option<usize> {
        if needle.is_empty() {
            return None;
        }
        self.text.get(from..)?.find(needle).map(|i| from + i)
    }

    fn node_offset(&self, node: &TuCNode, depth: usize) -> Option<usize> {
        match node {
            TuCNode::Iri(iri) => self.find_from(TuFLocalName(iri), 0),
            TuCNode::Literal { value, .. } => self.find_from(value, 0),
            // Blank nodes are found through the triple that introduces them.
            TuCNode::Blank(_) if depth < 16 => {
                let parent = self.triples.iter().find(|t| &t.object == node)?;
                let from = self.node_offset(&parent.subject, depth + 1).unwrap_or(0);
                self.find_from(TuFLocalName(&parent.predicate), from)
            }
            TuCNode::Blank(_) => None,
        }
    }

    fn position(&self, offset: Option<usize>) -> (usize, usize) {
        let Some(offset) = offset else {
            return (1, 1);
        };
        let before = &self.text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        (line, before[line_start..].chars().count() + 1)
    }
}

fn declares_base(document: &str) -> bool {
    static BASE: OnceLock<Regex> = OnceLock::new();
    BASE.get_or_init(|| Regex::new(r"(?m)^\s*(@base\b|(?i:base)\s*<)").expect("valid base pattern"))
        .is_match(document)
}

/// Pulls the position out of the parser's message. Messages without one
/// fall back to the start of the document.
fn error_position(message: &str, shift: usize) -> (usize, usize) {
    static POSITION: OnceLock<Regex> = OnceLock::new();
    let re = POSITION.get_or_init(|| Regex::new(r"(?i)line (\d+)\D+?(\d+)").expect("valid position pattern"));
    let Some(caps) = re.captures(message) else {
        return (1, 1);
    };
    let line: usize = caps[1].parse().unwrap_or(1);
    let column: usize = caps[2].parse().unwrap_or(1);
    if line == 1 {
        (1, column.saturating_sub(shift).max(1))
    } else {
        (line, column)
    }
}

/// Relabels blank nodes in order of first appearance so that generated
/// labels never depend on the parser.
#[derive(Default)]
struct BlankLabels {
    labels: HashMap<String, String>,
}

impl BlankLabels {
    fn node<T: Term>(&mut self, term: T) -> Option<TuCNode> {
        match term.kind() {
            TermKind::Iri => term.iri().map(|iri| TuCNode::Iri(iri.as_str().to_string())),
            TermKind::BlankNode => {
                let id = term.bnode_id()?.as_str().to_string();
                let next = self.labels.len();
                let label = self.labels.entry(id).or_insert_with(|| format!("b{}", next));
                Some(TuCNode::Blank(label.clone()))
            }
            TermKind::Literal => {
                let value = term.lexical_form()?.to_string();
                let language = term.language_tag().map(|tag| tag.as_str().to_string());
                let datatype = term
                    .datatype()
                    .map(|dt| dt.as_str().to_string())
                    .filter(|dt| *dt != format!("{}string", XSD) && *dt != format!("{}langString", RDF));
                Some(TuCNode::Literal {
                    value,
                    datatype,
                    language,
                })
            }
            _ => None,
        }
    }
}

/// Parses a Turtle document into its triples. Relative IRIs resolve
/// against the document's own base, or [`DEFAULT_BASE`] if it has none.
#[allow(non_snake_case)]
pub fn TuFParseTurtle(document: &str) -> Result<TuCGraph> {
    // Kept on the first line so that parser line numbers stay valid.
    let prologue = if declares_base(document) {
        String::new()
    } else {
        format!("@base <{}> . ", DEFAULT_BASE)
    };
    let text = format!("{}{}", prologue, document);

    let mut labels = BlankLabels::default();
    let mut triples = Vec::new();
    turtle::parse_str(&text)
        .for_each_triple(|t| {
            let subject = labels.node(t.s());
            let predicate = t.p().iri().map(|iri| iri.as_str().to_string());
            let object = labels.node(t.o());
            if let (Some(subject), Some(predicate), Some(object)) = (subject, predicate, object) {
                triples.push(TuCTriple {
                    subject,
                    predicate,
                    object,
                });
            }
        })
        .map_err(|e| {
            let message = e.to_string();
            let (line, column) = error_position(&message, prologue.chars().count());
            TuCError::parse(line, column, format!("invalid Turtle: {}", message))
        })?;

    log::trace!("turtle: parsed {} triples", triples.len());
    Ok(TuCGraph {
        triples,
        text: document.to_string(),
    })
}
