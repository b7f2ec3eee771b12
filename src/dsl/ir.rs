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

//! Abstract mapping model shared by both front ends.
//!
//! References between entities are plain names; the normalizer resolves
//! them against the owning [`TuCMappingDocument`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Data format tag of a declared source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TuCDataFormat {
    #[default]
    CSV,
    JSON,
    XML,
}

impl TuCDataFormat {
    /// Guesses the format from a location's file extension.
    #[allow(non_snake_case)]
    pub fn TuFFromLocation(location: &str) -> Option<Self> {
        let lower = location.to_ascii_lowercase();
        let ext = lower.rsplit('.').next()?;
        match ext {
            "csv" | "tsv" => Some(TuCDataFormat::CSV),
            "json" | "jsonl" => Some(TuCDataFormat::JSON),
            "xml" => Some(TuCDataFormat::XML),
            _ => None,
        }
    }
}

impl fmt::Display for TuCDataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TuCDataFormat::CSV => "CSV",
            TuCDataFormat::JSON => "JSON",
            TuCDataFormat::XML => "XML",
        };
        f.write_str(s)
    }
}

/// How records are iterated and how field references are evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TuCReferenceFormulation {
    #[default]
    CSVRows,
    JSONPath,
    XPath,
}

impl TuCReferenceFormulation {
    /// Data format implied by the formulation.
    #[allow(non_snake_case)]
    pub fn TuFDataFormat(&self) -> TuCDataFormat {
        match self {
            TuCReferenceFormulation::CSVRows => TuCDataFormat::CSV,
            TuCReferenceFormulation::JSONPath => TuCDataFormat::JSON,
            TuCReferenceFormulation::XPath => TuCDataFormat::XML,
        }
    }
}

impl fmt::Display for TuCReferenceFormulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TuCReferenceFormulation::CSVRows => "CSVRows",
            TuCReferenceFormulation::JSONPath => "JSONPath",
            TuCReferenceFormulation::XPath => "XPath",
        };
        f.write_str(s)
    }
}

/// A named external data feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuCSource {
    pub name: String,
    pub location: String,
    pub format: TuCDataFormat,
}

/// A single extractable value within an iterator record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuCField {
    pub name: String,
    /// Source-specific accessor (CSV column, JSONPath, XPath).
    pub reference: String,
}

/// A repeating-record view over one source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuCIterator {
    pub name: String,
    pub source: String,
    pub formulation: TuCReferenceFormulation,
    /// Iteration query; empty for row-based formulations.
    pub query: String,
    pub fields: Vec<TuCField>,
    /// Other names that denote this iterator in qualified references.
    pub aliases: Vec<String>,
}

impl TuCIterator {
    #[allow(non_snake_case)]
    pub fn TuFNew(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            formulation: TuCReferenceFormulation::default(),
            query: String::new(),
            fields: Vec::new(),
            aliases: Vec::new(),
        }
    }

    #[allow(non_snake_case)]
    pub fn TuFWithField(mut self, name: impl Into<String>, reference: impl Into<String>) -> Self {
        self.fields.push(TuCField {
            name: name.into(),
            reference: reference.into(),
        });
        self
    }

    #[allow(non_snake_case)]
    pub fn TuFWithAlias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[allow(non_snake_case)]
    pub fn TuFField(&self, name: &str) -> Option<&TuCField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of a field in declaration order.
    #[allow(non_snake_case)]
    pub fn TuFFieldIndex(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// One operand of an expression.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TuCOperand {
    /// A field or expression reference, resolved by the normalizer.
    Reference(String),
    Literal(String),
}

/// How an expression combines its operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TuCCombinator {
    /// String concatenation of all operands in order.
    Concat,
    /// The value of a single referenced operand under a new name.
    Alias,
}

impl fmt::Display for TuCCombinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuCCombinator::Concat => f.write_str("concat"),
            TuCCombinator::Alias => f.write_str("alias"),
        }
    }
}

/// A named derived value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuCExpression {
    pub name: String,
    pub combinator: TuCCombinator,
    pub operands: Vec<TuCOperand>,
    /// Iterator against which bare field names resolve. Unscoped
    /// expressions must use qualified references.
    pub scope: Option<String>,
}

impl TuCExpression {
    #[allow(non_snake_case)]
    pub fn TuFConcat(name: impl Into<String>, operands: Vec<TuCOperand>) -> Self {
        Self {
            name: name.into(),
            combinator: TuCCombinator::Concat,
            operands,
            scope: None,
        }
    }

    #[allow(non_snake_case)]
    pub fn TuFAlias(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            combinator: TuCCombinator::Alias,
            operands: vec![TuCOperand::Reference(reference.into())],
            scope: None,
        }
    }

    #[allow(non_snake_case)]
    pub fn TuFScoped(mut self, iterator: impl Into<String>) -> Self {
        self.scope = Some(iterator.into());
        self
    }
}

/// RDF term kind produced for a subject or object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TuCTermKind {
    Iri,
    BlankNode,
    Literal,
}

impl fmt::Display for TuCTermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuCTermKind::Iri => f.write_str("iri"),
            TuCTermKind::BlankNode => f.write_str("bnode"),
            TuCTermKind::Literal => f.write_str("literal"),
        }
    }
}

/// Rule producing the subject of every statement of a unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuCSubjectTemplate {
    /// Template with `{name}` placeholders; `\{` and `\}` escape braces.
    pub template: String,
    pub kind: TuCTermKind,
}

/// Where an object value comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TuCTermValue {
    Reference(String),
    Template(String),
    Constant(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuCObjectTerm {
    pub value: TuCTermValue,
    pub kind: TuCTermKind,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl TuCObjectTerm {
    #[allow(non_snake_case)]
    pub fn TuFReference(reference: impl Into<String>) -> Self {
        Self {
            value: TuCTermValue::Reference(reference.into()),
            kind: TuCTermKind::Literal,
            datatype: None,
            language: None,
        }
    }

    #[allow(non_snake_case)]
    pub fn TuFConstantIri(iri: impl Into<String>) -> Self {
        Self {
            value: TuCTermValue::Constant(iri.into()),
            kind: TuCTermKind::Iri,
            datatype: None,
            language: None,
        }
    }
}

/// One predicate-object mapping of a unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuCStatementRule {
    pub predicate: String,
    pub object: TuCObjectTerm,
}

/// Top-level construct grouping a subject template with its statements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuCMappingUnit {
    pub name: String,
    /// Owning iterator; inferred from the subject template when absent.
    pub iterator: Option<String>,
    pub subject: Option<TuCSubjectTemplate>,
    pub rules: Vec<TuCStatementRule>,
}

impl TuCMappingUnit {
    #[allow(non_snake_case)]
    pub fn TuFNew(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            iterator: None,
            subject: None,
            rules: Vec::new(),
        }
    }

    #[allow(non_snake_case)]
    pub fn TuFOver(mut self, iterator: impl Into<String>) -> Self {
        self.iterator = Some(iterator.into());
        self
    }

    #[allow(non_snake_case)]
    pub fn TuFWithSubject(mut self, template: impl Into<String>, kind: TuCTermKind) -> Self {
        self.subject = Some(TuCSubjectTemplate {
            template: template.into(),
            kind,
        });
        self
    }

    #[allow(non_snake_case)]
    pub fn TuFWithRule(mut self, predicate: impl Into<String>, object: TuCObjectTerm) -> Self {
        self.rules.push(TuCStatementRule {
            predicate: predicate.into(),
            object,
        });
        self
    }
}

/// One mapping document after lowering, before normalization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuCMappingDocument {
    pub sources: Vec<TuCSource>,
    pub iterators: Vec<TuCIterator>,
    pub expressions: Vec<TuCExpression>,
    pub units: Vec<TuCMappingUnit>,
}

impl TuCMappingDocument {
    #[allow(non_snake_case)]
    pub fn TuFNew() -> Self {
        Self::default()
    }

    #[allow(non_snake_case)]
    pub fn TuFAddSource(
        mut self,
        name: impl Into<String>,
        location: impl Into<String>,
        format: TuCDataFormat,
    ) -> Self {
        self.sources.push(TuCSource {
            name: name.into(),
            location: location.into(),
            format,
        });
        self
    }

    #[allow(non_snake_case)]
    pub fn TuFAddIterator(mut self, iterator: TuCIterator) -> Self {
        self.iterators.push(iterator);
        self
    }

    #[allow(non_snake_case)]
    pub fn TuFAddExpression(mut self, expression: TuCExpression) -> Self {
        self.expressions.push(expression);
        self
    }

    #[allow(non_snake_case)]
    pub fn TuFAddUnit(mut self, unit: TuCMappingUnit) -> Self {
        self.units.push(unit);
        self
    }

    #[allow(non_snake_case)]
    pub fn TuFSource(&self, name: &str) -> Option<&TuCSource> {
        self.sources.iter().find(|s| s.name == name)
    }

    #[allow(non_snake_case)]
    pub fn TuFIterator(&self, name: &str) -> Option<&TuCIterator> {
        self.iterators.iter().find(|i| i.name == name)
    }

    #[allow(non_snake_case)]
    pub fn TuFToJson(&self) -> crate::errors::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::errors::TuCError::Serde(format!("failed to serialize model: {}", e)))
    }
}
