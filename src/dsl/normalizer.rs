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

//! # Model Normalizer
//!
//! Resolves every name of a raw [`TuCMappingDocument`] and checks the
//! model invariants, producing a [`TuCNormalizedDocument`] in which each
//! mapping unit knows its iterator, the fields it projects, and the
//! expressions it evaluates in dependency order.
//!
//! ## Resolution
//!
//! A reference resolves, in order, to:
//!
//! 1. an expression of that exact name;
//! 2. a field of that exact name in the scope iterator (names may contain dots);
//! 3. a qualified `source.iterator.field` or `iterator.field`, where the
//!    iterator may also be named by one of its aliases.
//!
//! After normalization every template placeholder and term reference names
//! a column: a field name or an expression name.

use crate::dsl::ir::{
    TuCCombinator, TuCExpression, TuCIterator, TuCMappingDocument, TuCOperand, TuCSource,
    TuCStatementRule, TuCSubjectTemplate, TuCTermValue,
};
use crate::dsl::template::TuCTemplate;
use crate::errors::{Result, TuCError};

/// One mapping unit after resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TuCNormalizedUnit {
    pub name: String,
    pub iterator: String,
    pub source: String,
    /// Fields read by the unit, in iterator declaration order.
    pub fields: Vec<String>,
    /// Expressions evaluated for the unit, dependencies first. Operands
    /// name columns.
    pub expressions: Vec<TuCExpression>,
    pub subject: TuCSubjectTemplate,
    pub rules: Vec<TuCStatementRule>,
}

/// A validated document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TuCNormalizedDocument {
    pub sources: Vec<TuCSource>,
    pub iterators: Vec<TuCIterator>,
    pub units: Vec<TuCNormalizedUnit>,
}

impl TuCNormalizedDocument {
    #[allow(non_snake_case)]
    pub fn TuFSource(&self, name: &str) -> Option<&TuCSource> {
        self.sources.iter().find(|s| s.name == name)
    }

    #[allow(non_snake_case)]
    pub fn TuFIterator(&self, name: &str) -> Option<&TuCIterator> {
        self.iterators.iter().find(|i| i.name == name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Resolved {
    Expression(usize),
    Field { iterator: usize, field: usize },
}

#[derive(Clone, Debug, Default)]
pub struct TuCNormalizer {
    strict_sources: bool,
}

impl TuCNormalizer {
    #[allow(non_snake_case)]
    pub fn TuFNew() -> Self {
        Self::default()
    }

    /// Reject sources that no mapping unit reads.
    #[allow(non_snake_case)]
    pub fn TuFStrictSources(mut self, strict: bool) -> Self {
        self.strict_sources = strict;
        self
    }

    #[allow(non_snake_case)]
    pub fn TuFNormalize(&self, doc: &TuCMappingDocument) -> Result<TuCNormalizedDocument> {
        check_names(doc)?;
        let resolver = Resolver { doc };

        let mut operands: Vec<Vec<Option<Resolved>>> = Vec::with_capacity(doc.expressions.len());
        for e in &doc.expressions {
            operands.push(resolver.expression_operands(e)?);
        }
        let deps: Vec<Vec<usize>> = operands
            .iter()
            .map(|ops| {
                ops.iter()
                    .filter_map(|op| match op {
                        Some(Resolved::Expression(j)) => Some(*j),
                        _ => None,
                    })
                    .collect()
            })
            .collect();
        detect_cycle(doc, &deps)?;
        let order = topological_order(&deps);

        let mut units = Vec::with_capacity(doc.units.len());
        for index in 0..doc.units.len() {
            units.push(resolver.unit(index, &operands, &order)?);
        }

        if self.strict_sources {
            for source in &doc.sources {
                let used = units
                    .iter()
                    .any(|u| u.source == source.name);
                if !used {
                    return Err(TuCError::reference(
                        source.name.clone(),
                        "source is declared but no mapping unit reads it",
                    ));
                }
            }
        }

        log::debug!(
            "normalizer: {} units, {} expressions resolved",
            units.len(),
            doc.expressions.len()
        );

        Ok(TuCNormalizedDocument {
            sources: doc.sources.clone(),
            iterators: doc.iterators.clone(),
            units,
        })
    }
}

fn check_names(doc: &TuCMappingDocument) -> Result<()> {
    let mut sources: Vec<&str> = Vec::new();
    for s in &doc.sources {
        if sources.contains(&s.name.as_str()) {
            return Err(TuCError::reference(s.name.clone(), "source declared twice"));
        }
        sources.push(&s.name);
    }

    let mut iterator_names: Vec<&str> = Vec::new();
    for it in &doc.iterators {
        if !sources.contains(&it.source.as_str()) {
            return Err(TuCError::reference(
                it.source.clone(),
                format!("undeclared source of iterator '{}'", it.name),
            ));
        }
        for name in std::iter::once(&it.name).chain(it.aliases.iter()) {
            if iterator_names.contains(&name.as_str()) {
                return Err(TuCError::reference(name.clone(), "iterator name or alias declared twice"));
            }
            iterator_names.push(name);
        }
        for (i, field) in it.fields.iter().enumerate() {
            if it.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(TuCError::reference(
                    field.name.clone(),
                    format!("field declared twice in iterator '{}'", it.name),
                ));
            }
        }
    }

    for (i, e) in doc.expressions.iter().enumerate() {
        if doc.expressions[..i].iter().any(|other| other.name == e.name) {
            return Err(TuCError::reference(e.name.clone(), "expression declared twice"));
        }
        if sources.contains(&e.name.as_str()) || iterator_names.contains(&e.name.as_str()) {
            return Err(TuCError::reference(
                e.name.clone(),
                "expression name clashes with a source or iterator",
            ));
        }
        match (e.combinator, e.operands.len()) {
            (TuCCombinator::Concat, 0) => {
                return Err(TuCError::arity(
                    format!("expression '{}'", e.name),
                    "concatenation needs at least one operand",
                ))
            }
            (TuCCombinator::Alias, n) if n != 1 => {
                return Err(TuCError::arity(
                    format!("expression '{}'", e.name),
                    format!("alias takes exactly one operand, found {}", n),
                ))
            }
            (TuCCombinator::Alias, _) if !matches!(e.operands[0], TuCOperand::Reference(_)) => {
                return Err(TuCError::arity(
                    format!("expression '{}'", e.name),
                    "alias operand must be a reference",
                ))
            }
            _ => {}
        }
    }

    for (i, u) in doc.units.iter().enumerate() {
        if doc.units[..i].iter().any(|other| other.name == u.name) {
            return Err(TuCError::reference(u.name.clone(), "mapping unit declared twice"));
        }
    }
    Ok(())
}

/// Depth-first search over expression dependencies.
fn detect_cycle(doc: &TuCMappingDocument, deps: &[Vec<usize>]) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    fn visit(
        i: usize,
        doc: &TuCMappingDocument,
        deps: &[Vec<usize>],
        marks: &mut [Mark],
        stack: &mut Vec<usize>,
    ) -> Result<()> {
        marks[i] = Mark::Active;
        stack.push(i);
        for &j in &deps[i] {
            match marks[j] {
                Mark::Active => {
                    let start = stack.iter().position(|&k| k == j).unwrap_or(0);
                    let path = stack[start..]
                        .iter()
                        .chain(std::iter::once(&j))
                        .map(|&k| doc.expressions[k].name.clone());
                    return Err(TuCError::cycle(path));
                }
                Mark::New => visit(j, doc, deps, marks, stack)?,
                Mark::Done => {}
            }
        }
        stack.pop();
        marks[i] = Mark::Done;
        Ok(())
    }

    let mut marks = vec![Mark::New; deps.len()];
    let mut stack = Vec::new();
    for i in 0..deps.len() {
        if marks[i] == Mark::New {
            visit(i, doc, deps, &mut marks, &mut stack)?;
        }
    }
    Ok(())
}

/// Dependencies first, declaration order among independent expressions.
fn topological_order(deps: &[Vec<usize>]) -> Vec<usize> {
    let mut placed = vec![false; deps.len()];
    let mut order = Vec::with_capacity(deps.len());
    while order.len() < deps.len() {
        let next = (0..deps.len()).find(|&i| !placed[i] && deps[i].iter().all(|&d| placed[d]));
        match next {
            Some(i) => {
                placed[i] = true;
                order.push(i);
            }
            // Unreachable once cycles have been rejected.
            None => break,
        }
    }
    order
}

struct Resolver<'d> {
    doc: &'d TuCMappingDocument,
}

impl<'d> Resolver<'d> {
    fn iterator_index(&self, name: &str) -> Option<usize> {
        self.doc.iterators.iter().position(|i| i.name == name)
    }

    fn resolve(&self, reference: &str, scope: Option<usize>, referrer: &str) -> Result<Resolved> {
        if let Some(j) = self.doc.expressions.iter().position(|e| e.name == reference) {
            return Ok(Resolved::Expression(j));
        }
        if let Some(it) = scope {
            if let Some(f) = self.doc.iterators[it].TuFFieldIndex(reference) {
                return Ok(Resolved::Field { iterator: it, field: f });
            }
        }
        for (it, iterator) in self.doc.iterators.iter().enumerate() {
            let qualified = format!("{}.{}.", iterator.source, iterator.name);
            let prefixes = std::iter::once(qualified)
                .chain(std::iter::once(&iterator.name).chain(iterator.aliases.iter()).map(|n| format!("{}.", n)));
            for prefix in prefixes {
                if let Some(rest) = reference.strip_prefix(prefix.as_str()) {
                    if let Some(f) = iterator.TuFFieldIndex(rest) {
                        return Ok(Resolved::Field { iterator: it, field: f });
                    }
                }
            }
        }
        Err(TuCError::reference(reference, format!("unresolved in {}", referrer)))
    }

    fn expression_operands(&self, e: &TuCExpression) -> Result<Vec<Option<Resolved>>> {
        let scope = match &e.scope {
            None => None,
            Some(name) => Some(self.iterator_index(name).ok_or_else(|| {
                TuCError::reference(name.clone(), format!("undeclared scope of expression '{}'", e.name))
            })?),
        };
        let referrer = format!("expression '{}'", e.name);
        e.operands
            .iter()
            .map(|op| match op {
                TuCOperand::Reference(r) => self.resolve(r, scope, &referrer).map(Some),
                TuCOperand::Literal(_) => Ok(None),
            })
            .collect()
    }

    fn column(&self, resolved: Resolved) -> String {
        match resolved {
            Resolved::Expression(j) => self.doc.expressions[j].name.clone(),
            Resolved::Field { iterator, field } => self.doc.iterators[iterator].fields[field].name.clone(),
        }
    }

    /// Iterator of the first field reached from `resolved`.
    fn first_iterator(&self, resolved: Resolved, operands: &[Vec<Option<Resolved>>]) -> Option<usize> {
        match resolved {
            Resolved::Field { iterator, .. } => Some(iterator),
            Resolved::Expression(j) => operands[j]
                .iter()
                .flatten()
                .find_map(|r| self.first_iterator(*r, operands)),
        }
    }

    fn unit(
        &self,
        index: usize,
        operands: &[Vec<Option<Resolved>>],
        order: &[usize],
    ) -> Result<TuCNormalizedUnit> {
        let unit = &self.doc.units[index];
        let construct = format!("mapping unit '{}'", unit.name);

        let subject = match &unit.subject {
            Some(s) if !s.template.trim().is_empty() => s,
            _ => return Err(TuCError::arity(construct, "missing subject template")),
        };
        if unit.rules.is_empty() {
            return Err(TuCError::arity(construct, "at least one statement rule is required"));
        }
        if let Some(rule) = unit.rules.iter().find(|r| r.predicate.trim().is_empty()) {
            return Err(TuCError::arity(
                construct,
                format!("empty predicate for object {:?}", rule.object.value),
            ));
        }

        let subject_template = parse_template(&subject.template, &unit.name)?;
        let mut references: Vec<(String, String)> = subject_template
            .TuFPlaceholders()
            .into_iter()
            .map(|p| (p.to_string(), format!("subject template of unit '{}'", unit.name)))
            .collect();
        let mut rule_templates = Vec::with_capacity(unit.rules.len());
        for rule in &unit.rules {
            let referrer = format!("rule <{}> of unit '{}'", rule.predicate, unit.name);
            match &rule.object.value {
                TuCTermValue::Reference(r) => references.push((r.clone(), referrer)),
                TuCTermValue::Template(t) => {
                    let parsed = parse_template(t, &unit.name)?;
                    references.extend(parsed.TuFPlaceholders().into_iter().map(|p| (p.to_string(), referrer.clone())));
                    rule_templates.push(Some(parsed));
                    continue;
                }
                TuCTermValue::Constant(_) => {}
            }
            rule_templates.push(None);
        }

        let iterator = match &unit.iterator {
            Some(name) => self
                .iterator_index(name)
                .ok_or_else(|| TuCError::reference(name.clone(), format!("undeclared iterator of {}", construct)))?,
            None => {
                let mut found = None;
                for (r, referrer) in &references {
                    let resolved = self.resolve(r, None, referrer)?;
                    if let Some(it) = self.first_iterator(resolved, operands) {
                        found = Some(it);
                        break;
                    }
                }
                found.ok_or_else(|| TuCError::arity(construct.clone(), "no field is referenced, iterator cannot be inferred"))?
            }
        };
        let iterator_name = &self.doc.iterators[iterator].name;

        let mut fields_used = vec![false; self.doc.iterators[iterator].fields.len()];
        let mut exprs_used = vec![false; self.doc.expressions.len()];
        let mut resolved_refs = Vec::with_capacity(references.len());
        for (r, referrer) in &references {
            let resolved = self.resolve(r, Some(iterator), referrer)?;
            self.mark(resolved, iterator, r, referrer, operands, &mut fields_used, &mut exprs_used)?;
            resolved_refs.push(resolved);
        }

        let fields: Vec<String> = self.doc.iterators[iterator]
            .fields
            .iter()
            .zip(&fields_used)
            .filter(|(_, used)| **used)
            .map(|(f, _)| f.name.clone())
            .collect();

        let mut expressions = Vec::new();
        for &j in order.iter().filter(|&&j| exprs_used[j]) {
            let e = &self.doc.expressions[j];
            if fields.contains(&e.name) {
                return Err(TuCError::reference(
                    e.name.clone(),
                    format!("expression shadows a field read by unit '{}'", unit.name),
                ));
            }
            let rewritten = e
                .operands
                .iter()
                .zip(&operands[j])
                .map(|(op, res)| match (op, res) {
                    (_, Some(r)) => TuCOperand::Reference(self.column(*r)),
                    (op, None) => op.clone(),
                })
                .collect();
            expressions.push(TuCExpression {
                name: e.name.clone(),
                combinator: e.combinator,
                operands: rewritten,
                scope: Some(iterator_name.clone()),
            });
        }

        // Rewrite placeholders and references to column names, consuming
        // the resolutions in the order they were collected.
        let mut columns = resolved_refs.into_iter().map(|r| self.column(r));
        let mut next_column = || columns.next().ok_or_else(|| TuCError::planner("reference bookkeeping out of sync"));

        let subject_rendered = subject_template.TuFRename(|_| next_column())?.TuFRender();
        let mut rules = Vec::with_capacity(unit.rules.len());
        for (rule, parsed) in unit.rules.iter().zip(rule_templates) {
            let value = match (&rule.object.value, parsed) {
                (TuCTermValue::Reference(_), _) => TuCTermValue::Reference(next_column()?),
                (TuCTermValue::Template(_), Some(t)) => TuCTermValue::Template(t.TuFRename(|_| next_column())?.TuFRender()),
                (other, _) => other.clone(),
            };
            let mut object = rule.object.clone();
            object.value = value;
            rules.push(TuCStatementRule {
                predicate: rule.predicate.clone(),
                object,
            });
        }

        Ok(TuCNormalizedUnit {
            name: unit.name.clone(),
            iterator: iterator_name.clone(),
            source: self.doc.iterators[iterator].source.clone(),
            fields,
            expressions,
            subject: TuCSubjectTemplate {
                template: subject_rendered,
                kind: subject.kind,
            },
            rules,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn mark(
        &self,
        resolved: Resolved,
        unit_iterator: usize,
        reference: &str,
        referrer: &str,
        operands: &[Vec<Option<Resolved>>],
        fields_used: &mut [bool],
        exprs_used: &mut [bool],
    ) -> Result<()> {
        match resolved {
            Resolved::Field { iterator, field } => {
                if iterator != unit_iterator {
                    return Err(TuCError::reference(
                        reference,
                        format!(
                            "{} reads iterator '{}' but its unit iterates '{}'",
                            referrer, self.doc.iterators[iterator].name, self.doc.iterators[unit_iterator].name
                        ),
                    ));
                }
                fields_used[field] = true;
            }
            Resolved::Expression(j) => {
                if exprs_used[j] {
                    return Ok(());
                }
                exprs_used[j] = true;
                let e = &self.doc.expressions[j];
                let inner_referrer = format!("expression '{}'", e.name);
                for (op, res) in e.operands.iter().zip(&operands[j]) {
                    if let (TuCOperand::Reference(r), Some(res)) = (op, res) {
                        self.mark(*res, unit_iterator, r, &inner_referrer, operands, fields_used, exprs_used)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn parse_template(template: &str, unit: &str) -> Result<TuCTemplate> {
    TuCTemplate::TuFParse(template).map_err(|m| {
        TuCError::arity(format!("mapping unit '{}'", unit), format!("malformed template: {}", m))
    })
}
