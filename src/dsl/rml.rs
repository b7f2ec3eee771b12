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

//! Lowering of RML triples maps into the mapping model.
//!
//! RML has neither declared fields nor named expressions. Fields are
//! collected from the references each triples map uses, and every
//! `template` becomes a concatenation expression scoped to the triples
//! map's iterator, named `<TriplesMap>_template_<n>`.

use crate::dsl::ir::{
    TuCDataFormat, TuCExpression, TuCField, TuCIterator, TuCMappingDocument, TuCMappingUnit,
    TuCObjectTerm, TuCOperand, TuCReferenceFormulation, TuCSource, TuCStatementRule,
    TuCSubjectTemplate, TuCTermKind, TuCTermValue,
};
use crate::dsl::template::{TuCTemplate, TuCTemplateSegment, TuFEscapeLiteral};
use crate::dsl::turtle::{TuCGraph, TuCNode, TuCTriple, TuFParseTurtle};
use crate::dsl::vocab::{self, TuFFormulationName, TuFIsTerm, TuFLocalName, CSVW, RDF_TYPE};
use crate::errors::{Result, TuCError};

/// Predicates this translator does not lower, by local name.
const UNSUPPORTED: [&str; 7] = [
    "parentTriplesMap",
    "joinCondition",
    "graphMap",
    "graph",
    "functionValue",
    "functionExecution",
    "languageMap",
];

/// Parses an RML document and lowers it to a raw mapping document.
#[allow(non_snake_case)]
pub fn TuFParseRml(document: &str) -> Result<TuCMappingDocument> {
    let graph = TuFParseTurtle(document)?;
    reject_unsupported(&graph)?;

    let mut lowering = RmlLowering {
        graph: &graph,
        doc: TuCMappingDocument::TuFNew(),
        iterator_keys: Vec::new(),
        map_names: Vec::new(),
    };

    let maps = triples_maps(&graph);
    if maps.is_empty() {
        return Err(TuCError::parse(1, 1, "document declares no triples map"));
    }
    for map in maps {
        lowering.triples_map(map)?;
    }

    log::debug!(
        "rml: lowered {} triples maps over {} sources",
        lowering.doc.units.len(),
        lowering.doc.sources.len()
    );
    Ok(lowering.doc)
}

fn reject_unsupported(graph: &TuCGraph) -> Result<()> {
    for triple in &graph.triples {
        let unsupported = UNSUPPORTED
            .iter()
            .find(|local| TuFIsTerm(&triple.predicate, local) || triple.predicate == format!("{}{}", vocab::FNML, local));
        if let Some(local) = unsupported {
            let (line, column) = graph.TuFLocateTriple(triple);
            return Err(TuCError::parse(line, column, format!("unsupported construct '{}'", local)));
        }
    }
    Ok(())
}

/// Subjects that are triples maps, in order of first appearance.
fn triples_maps(graph: &TuCGraph) -> Vec<&TuCNode> {
    graph
        .TuFSubjects()
        .into_iter()
        .filter(|subject| {
            graph
                .TuFTriplesWhere(subject, |_| true)
                .into_iter()
                .any(is_triples_map_marker)
        })
        .collect()
}

fn is_triples_map_marker(t: &TuCTriple) -> bool {
    let typed = t.predicate == RDF_TYPE
        && t.object.TuFAsIri().is_some_and(|iri| TuFIsTerm(iri, "TriplesMap"));
    typed
        || TuFIsTerm(&t.predicate, "logicalSource")
        || TuFIsTerm(&t.predicate, "subjectMap")
}

fn local_name(node: &TuCNode) -> String {
    match node {
        TuCNode::Iri(iri) => TuFLocalName(iri).to_string(),
        TuCNode::Blank(label) => label.clone(),
        TuCNode::Literal { value, .. } => value.clone(),
    }
}

struct RmlLowering<'g> {
    graph: &'g TuCGraph,
    doc: TuCMappingDocument,
    /// (location, formulation, query) → iterator name
    iterator_keys: Vec<((String, TuCReferenceFormulation, String), String)>,
    /// Names handed out so far, one per triples map node.
    map_names: Vec<String>,
}

/// Per-triples-map state while lowering.
struct MapScope {
    name: String,
    iterator: String,
    templates: usize,
}

impl<'g> RmlLowering<'g> {
    fn triple(&self, node: &TuCNode, local: &str) -> Option<&'g TuCTriple> {
        self.graph.TuFTriplesWhere(node, |p| TuFIsTerm(p, local)).into_iter().next()
    }

    fn objects(&self, node: &TuCNode, local: &str) -> Vec<&'g TuCNode> {
        self.graph
            .TuFTriplesWhere(node, |p| TuFIsTerm(p, local))
            .into_iter()
            .map(|t| &t.object)
            .collect()
    }

    fn object(&self, node: &TuCNode, local: &str) -> Option<&'g TuCNode> {
        self.triple(node, local).map(|t| &t.object)
    }

    fn error_at(&self, node: &TuCNode, message: impl Into<String>) -> TuCError {
        let (line, column) = self.graph.TuFLocateNode(node);
        TuCError::parse(line, column, message)
    }

    fn error_on(&self, t: &TuCTriple, message: impl Into<String>) -> TuCError {
        let (line, column) = self.graph.TuFLocateTriple(t);
        TuCError::parse(line, column, message)
    }

    /// Unit name for a triples map: its local name, suffixed with `_<n>`
    /// when an earlier map with a different IRI already took it.
    fn map_name(&mut self, map: &TuCNode) -> String {
        let local = local_name(map);
        let mut name = local.clone();
        let mut n = 1;
        while self.map_names.contains(&name) {
            name = format!("{}_{}", local, n);
            n += 1;
        }
        self.map_names.push(name.clone());
        name
    }

    fn literal(&self, node: &TuCNode, local: &str) -> Result<Option<String>> {
        match self.triple(node, local) {
            None => Ok(None),
            Some(t) => match &t.object {
                TuCNode::Literal { value, .. } => Ok(Some(value.clone())),
                other => Err(self.error_on(t, format!("'{}' expects a literal, found {:?}", local, other))),
            },
        }
    }

    fn triples_map(&mut self, map: &'g TuCNode) -> Result<()> {
        let name = self.map_name(map);
        let iterator = self.logical_source(map, &name)?;
        let mut scope = MapScope {
            name: name.clone(),
            iterator: iterator.clone(),
            templates: 0,
        };

        let mut unit = TuCMappingUnit::TuFNew(name.clone()).TuFOver(iterator);
        self.subject(map, &mut scope, &mut unit)?;

        for pom in self.objects(map, "predicateObjectMap") {
            self.predicate_object_map(pom, &mut scope, &mut unit)?;
        }

        self.doc.units.push(unit);
        Ok(())
    }

    /// Registers the source and iterator read by `map` and returns the
    /// iterator name.
    fn logical_source(&mut self, map: &TuCNode, map_name: &str) -> Result<String> {
        let ls = self
            .object(map, "logicalSource")
            .ok_or_else(|| self.error_at(map, format!("triples map '{}' has no logical source", map_name)))?;

        let location = self.source_location(ls)?;
        let formulation = match self.object(ls, "referenceFormulation") {
            None => TuCReferenceFormulation::CSVRows,
            Some(node) => {
                let iri = node.TuFAsIri().unwrap_or_default();
                match TuFFormulationName(iri) {
                    Some("CSV") => TuCReferenceFormulation::CSVRows,
                    Some("JSONPath") => TuCReferenceFormulation::JSONPath,
                    Some("XPath") => TuCReferenceFormulation::XPath,
                    _ => {
                        return Err(self.error_at(ls, format!("unsupported reference formulation '{}'", iri)))
                    }
                }
            }
        };
        let query = self.literal(ls, "iterator")?.unwrap_or_default();

        if self.doc.TuFSource(&location).is_none() {
            let format = TuCDataFormat::TuFFromLocation(&location).unwrap_or(formulation.TuFDataFormat());
            self.doc.sources.push(TuCSource {
                name: location.clone(),
                location: location.clone(),
                format,
            });
        }

        let key = (location.clone(), formulation, query.clone());
        if let Some((_, existing)) = self.iterator_keys.iter().find(|(k, _)| *k == key) {
            return Ok(existing.clone());
        }

        let mut iterator = TuCIterator::TuFNew(map_name, location);
        iterator.formulation = formulation;
        iterator.query = query;
        self.doc.iterators.push(iterator);
        self.iterator_keys.push((key, map_name.to_string()));
        Ok(map_name.to_string())
    }

    fn source_location(&self, ls: &TuCNode) -> Result<String> {
        let source = self
            .object(ls, "source")
            .ok_or_else(|| self.error_at(ls, "logical source has no source"))?;
        match source {
            TuCNode::Literal { value, .. } => Ok(value.clone()),
            node => {
                if let Some(path) = self.literal(node, "path")? {
                    return Ok(path);
                }
                let url = self
                    .graph
                    .TuFTriplesWhere(node, |p| p == format!("{}url", CSVW))
                    .into_iter()
                    .find_map(|t| t.object.TuFAsLiteral().map(str::to_string));
                match (url, node) {
                    (Some(url), _) => Ok(url),
                    (None, TuCNode::Iri(iri)) => Ok(iri.clone()),
                    (None, _) => Err(self.error_at(ls, "source node has no path")),
                }
            }
        }
    }

    fn use_field(&mut self, iterator: &str, reference: &str) {
        if let Some(it) = self.doc.iterators.iter_mut().find(|i| i.name == iterator) {
            if it.TuFField(reference).is_none() {
                it.fields.push(TuCField {
                    name: reference.to_string(),
                    reference: reference.to_string(),
                });
            }
        }
    }

    /// Lowers a template to a scoped concatenation and returns its name.
    fn template_expression(&mut self, scope: &mut MapScope, t: &TuCTriple) -> Result<String> {
        let text = t
            .object
            .TuFAsLiteral()
            .ok_or_else(|| self.error_on(t, "template must be a string literal"))?;
        let parsed = TuCTemplate::TuFParse(text).map_err(|m| self.error_on(t, m))?;

        let mut operands = Vec::with_capacity(parsed.segments.len());
        for segment in parsed.segments {
            match segment {
                TuCTemplateSegment::Literal(text) => operands.push(TuCOperand::Literal(text)),
                TuCTemplateSegment::Placeholder(reference) => {
                    self.use_field(&scope.iterator, &reference);
                    operands.push(TuCOperand::Reference(reference));
                }
            }
        }

        let name = format!("{}_template_{}", scope.name, scope.templates);
        scope.templates += 1;
        self.doc
            .expressions
            .push(TuCExpression::TuFConcat(name.clone(), operands).TuFScoped(scope.iterator.clone()));
        Ok(name)
    }

    fn term_kind(&self, node: &TuCNode) -> Result<Option<TuCTermKind>> {
        let Some(t) = self.triple(node, "termType") else {
            return Ok(None);
        };
        let iri = t.object.TuFAsIri().unwrap_or_default();
        if TuFIsTerm(iri, "IRI") {
            Ok(Some(TuCTermKind::Iri))
        } else if TuFIsTerm(iri, "BlankNode") {
            Ok(Some(TuCTermKind::BlankNode))
        } else if TuFIsTerm(iri, "Literal") {
            Ok(Some(TuCTermKind::Literal))
        } else {
            Err(self.error_on(t, format!("unknown term type '{}'", iri)))
        }
    }

    fn subject(&mut self, map: &TuCNode, scope: &mut MapScope, unit: &mut TuCMappingUnit) -> Result<()> {
        if let Some(constant) = self.object(map, "subject") {
            let iri = constant
                .TuFAsIri()
                .ok_or_else(|| self.error_at(map, "subject shortcut must be an IRI"))?;
            unit.subject = Some(TuCSubjectTemplate {
                template: TuFEscapeLiteral(iri),
                kind: TuCTermKind::Iri,
            });
            return Ok(());
        }

        let Some(sm) = self.object(map, "subjectMap") else {
            // Left empty; the normalizer reports the missing subject.
            return Ok(());
        };

        let template = if let Some(t) = self.triple(sm, "template") {
            format!("{{{}}}", self.template_expression(scope, t)?)
        } else if let Some(reference) = self.literal(sm, "reference")? {
            self.use_field(&scope.iterator, &reference);
            format!("{{{}}}", reference)
        } else if let Some(constant) = self.object(sm, "constant") {
            let value = constant
                .TuFAsIri()
                .ok_or_else(|| self.error_at(sm, "subject constant must be an IRI"))?;
            TuFEscapeLiteral(value)
        } else {
            return Err(self.error_at(sm, "subject map needs a template, reference or constant"));
        };

        let kind = self.term_kind(sm)?.unwrap_or(TuCTermKind::Iri);
        if kind == TuCTermKind::Literal {
            return Err(self.error_at(sm, "a subject cannot be a literal"));
        }
        unit.subject = Some(TuCSubjectTemplate { template, kind });

        for class in self.objects(sm, "class") {
            let iri = class
                .TuFAsIri()
                .ok_or_else(|| self.error_at(sm, "class must be an IRI"))?;
            unit.rules.push(TuCStatementRule {
                predicate: RDF_TYPE.to_string(),
                object: TuCObjectTerm::TuFConstantIri(iri),
            });
        }
        Ok(())
    }

    fn predicate_object_map(&mut self, pom: &TuCNode, scope: &mut MapScope, unit: &mut TuCMappingUnit) -> Result<()> {
        let mut predicates: Vec<String> = Vec::new();
        for p in self.objects(pom, "predicate") {
            let iri = p
                .TuFAsIri()
                .ok_or_else(|| self.error_at(pom, "predicate must be an IRI"))?;
            predicates.push(iri.to_string());
        }
        for pm in self.objects(pom, "predicateMap") {
            match self.object(pm, "constant").and_then(TuCNode::TuFAsIri) {
                Some(iri) => predicates.push(iri.to_string()),
                None => return Err(self.error_at(pm, "unsupported construct 'predicateMap' without a constant")),
            }
        }

        let mut objects: Vec<TuCObjectTerm> = Vec::new();
        for o in self.objects(pom, "object") {
            objects.push(constant_term(o));
        }
        for om in self.objects(pom, "objectMap") {
            objects.push(self.object_map(om, scope)?);
        }

        if predicates.is_empty() {
            return Err(TuCError::arity(
                format!("predicate-object map of '{}'", scope.name),
                "no predicate declared",
            ));
        }
        if objects.is_empty() {
            return Err(TuCError::arity(
                format!("predicate-object map of '{}'", scope.name),
                "no object declared",
            ));
        }

        for predicate in &predicates {
            for object in &objects {
                unit.rules.push(TuCStatementRule {
                    predicate: predicate.clone(),
                    object: object.clone(),
                });
            }
        }
        Ok(())
    }

    fn object_map(&mut self, om: &TuCNode, scope: &mut MapScope) -> Result<TuCObjectTerm> {
        let (value, default_kind) = if let Some(reference) = self.literal(om, "reference")? {
            self.use_field(&scope.iterator, &reference);
            (TuCTermValue::Reference(reference), TuCTermKind::Literal)
        } else if let Some(t) = self.triple(om, "template") {
            (TuCTermValue::Reference(self.template_expression(scope, t)?), TuCTermKind::Iri)
        } else if let Some(constant) = self.object(om, "constant") {
            let term = constant_term(constant);
            (term.value, term.kind)
        } else {
            return Err(self.error_at(om, "object map needs a reference, template or constant"));
        };

        let language = self.literal(om, "language")?;
        let datatype = self.object(om, "datatype").and_then(TuCNode::TuFAsIri).map(str::to_string);
        let kind = match self.term_kind(om)? {
            Some(kind) => kind,
            None if language.is_some() || datatype.is_some() => TuCTermKind::Literal,
            None => default_kind,
        };

        Ok(TuCObjectTerm {
            value,
            kind,
            datatype,
            language,
        })
    }
}

fn constant_term(node: &TuCNode) -> TuCObjectTerm {
    match node {
        TuCNode::Literal { value, datatype, language } => TuCObjectTerm {
            value: TuCTermValue::Constant(value.clone()),
            kind: TuCTermKind::Literal,
            datatype: datatype.clone(),
            language: language.clone(),
        },
        TuCNode::Iri(iri) => TuCObjectTerm::TuFConstantIri(iri.clone()),
        TuCNode::Blank(label) => TuCObjectTerm {
            value: TuCTermValue::Constant(label.clone()),
            kind: TuCTermKind::BlankNode,
            datatype: None,
            language: None,
        },
    }
}
