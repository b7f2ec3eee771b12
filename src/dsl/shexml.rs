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

//! ShExML front end.
//!
//! Parsing produces a small declaration tree which is then lowered. An
//! `ITERATOR` declaration is only a template: it becomes a model iterator
//! once some expression or shape reads it through a `SOURCE`, and it
//! becomes one model iterator per source it is read through.

use std::collections::HashMap;

use crate::dsl::ir::{
    TuCDataFormat, TuCExpression, TuCIterator, TuCMappingDocument, TuCMappingUnit, TuCObjectTerm,
    TuCOperand, TuCReferenceFormulation, TuCSource, TuCStatementRule, TuCSubjectTemplate, TuCTermKind,
    TuCTermValue,
};
use crate::dsl::lexer::{TuCToken, TuCTokenKind, TuFTokenize};
use crate::dsl::template::TuFEscapeLiteral;
use crate::errors::Result;

const UNSUPPORTED_KEYWORDS: [&str; 6] = [
    "FUNCTIONS",
    "MATCHER",
    "AUTOINCREMENT",
    "PUSHED_FIELD",
    "POPPED_FIELD",
    "GRAPH",
];

#[derive(Clone, Debug)]
struct IteratorDecl {
    name: String,
    formulation: TuCReferenceFormulation,
    query: String,
    fields: Vec<(String, String)>,
}

#[derive(Clone, Debug, PartialEq)]
enum BodyPart {
    Reference(String),
    Literal(String),
}

#[derive(Clone, Debug)]
struct ExpressionDecl {
    name: String,
    parts: Vec<BodyPart>,
}

#[derive(Clone, Debug)]
enum ShapeObject {
    Reference(String),
    IriTemplate { namespace: String, reference: String },
    ConstantIri(String),
    ConstantLiteral(String),
}

#[derive(Clone, Debug)]
struct ShapeRule {
    predicate: String,
    object: ShapeObject,
    datatype: Option<String>,
    language: Option<String>,
}

#[derive(Clone, Debug)]
enum ShapeSubject {
    Iri { namespace: String, reference: String },
    Blank { reference: String },
    Constant(String),
}

#[derive(Clone, Debug)]
struct ShapeDecl {
    name: String,
    subject: ShapeSubject,
    rules: Vec<ShapeRule>,
}

#[derive(Debug, Default)]
struct ShexDeclarations {
    sources: Vec<(String, String)>,
    iterators: Vec<IteratorDecl>,
    expressions: Vec<ExpressionDecl>,
    shapes: Vec<ShapeDecl>,
}

/// Parses a ShExML document and lowers it to a raw mapping document.
#[allow(non_snake_case)]
pub fn TuFParseShExML(document: &str) -> Result<TuCMappingDocument> {
    let tokens = TuFTokenize(document)?;
    let mut parser = ShexParser {
        src: document,
        tokens,
        pos: 0,
        prefixes: HashMap::new(),
        decls: ShexDeclarations::default(),
    };
    parser.document()?;
    let doc = lower(parser.decls);
    log::debug!(
        "shexml: lowered {} shapes over {} iterators",
        doc.units.len(),
        doc.iterators.len()
    );
    Ok(doc)
}

struct ShexParser<'s> {
    src: &'s str,
    tokens: Vec<TuCToken>,
    pos: usize,
    prefixes: HashMap<String, String>,
    decls: ShexDeclarations,
}

impl<'s> ShexParser<'s> {
    fn peek(&self) -> &TuCToken {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn next(&mut self) -> TuCToken {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TuCTokenKind, context: &str) -> Result<TuCToken> {
        let tok = self.next();
        if tok.kind == kind {
            Ok(tok)
        } else {
            Err(tok.TuFError(format!("expected '{}' {}, found '{}'", kind, context, tok.kind)))
        }
    }

    fn ident(&mut self, context: &str) -> Result<String> {
        let tok = self.next();
        match &tok.kind {
            TuCTokenKind::Name(name) => Ok(name.clone()),
            other => Err(tok.TuFError(format!("expected a name {}, found '{}'", context, other))),
        }
    }

    fn angle(&mut self, context: &str) -> Result<(TuCToken, String)> {
        let tok = self.next();
        match &tok.kind {
            TuCTokenKind::Angle(raw) => {
                let raw = raw.trim().to_string();
                Ok((tok, raw))
            }
            other => Err(tok.TuFError(format!("expected '<...>' {}, found '{}'", context, other))),
        }
    }

    fn expand(&self, tok: &TuCToken, prefix: &str, local: &str) -> Result<String> {
        self.prefixes
            .get(prefix)
            .map(|ns| format!("{}{}", ns, local))
            .ok_or_else(|| tok.TuFError(format!("undeclared prefix '{}:'", prefix)))
    }

    fn document(&mut self) -> Result<()> {
        loop {
            let tok = self.peek().clone();
            match &tok.kind {
                TuCTokenKind::Eof => return Ok(()),
                TuCTokenKind::Name(word) => match word.as_str() {
                    "PREFIX" => {
                        self.next();
                        self.prefix_decl()?;
                    }
                    "SOURCE" => {
                        self.next();
                        let name = self.ident("after SOURCE")?;
                        let (_, location) = self.angle("for the source location")?;
                        self.decls.sources.push((name, location));
                    }
                    "ITERATOR" => {
                        self.next();
                        let decl = self.iterator_decl()?;
                        self.decls.iterators.push(decl);
                    }
                    "EXPRESSION" => {
                        self.next();
                        let decl = self.expression_decl()?;
                        self.decls.expressions.push(decl);
                    }
                    w if UNSUPPORTED_KEYWORDS.contains(&w) => {
                        return Err(tok.TuFError(format!("unsupported construct '{}'", w)))
                    }
                    other => return Err(tok.TuFError(format!("unexpected '{}'", other))),
                },
                TuCTokenKind::PrefixedName { .. } => {
                    let shape = self.shape_decl()?;
                    self.decls.shapes.push(shape);
                }
                other => return Err(tok.TuFError(format!("unexpected '{}'", other))),
            }
        }
    }

    fn prefix_decl(&mut self) -> Result<()> {
        let tok = self.next();
        let prefix = match &tok.kind {
            TuCTokenKind::PrefixedName { prefix, local } if local.is_empty() => prefix.clone(),
            other => return Err(tok.TuFError(format!("expected a prefix name, found '{}'", other))),
        };
        let (_, iri) = self.angle("for the prefix namespace")?;
        self.prefixes.insert(prefix, iri);
        Ok(())
    }

    fn iterator_decl(&mut self) -> Result<IteratorDecl> {
        let name = self.ident("after ITERATOR")?;
        let (query_tok, raw) = self.angle("for the iterator query")?;
        let (formulation, query) = if raw.eq_ignore_ascii_case("csvperrow") {
            (TuCReferenceFormulation::CSVRows, String::new())
        } else if let Some(q) = strip_keyword(&raw, "jsonpath:") {
            (TuCReferenceFormulation::JSONPath, q.to_string())
        } else if let Some(q) = strip_keyword(&raw, "xpath:") {
            (TuCReferenceFormulation::XPath, q.to_string())
        } else {
            return Err(query_tok.TuFError(format!("unknown iterator query '{}'", raw)));
        };

        self.expect(TuCTokenKind::LBrace, "to open the iterator")?;
        let mut fields = Vec::new();
        loop {
            let tok = self.next();
            match &tok.kind {
                TuCTokenKind::RBrace => break,
                TuCTokenKind::Name(w) if w == "FIELD" => {
                    let field = self.ident("after FIELD")?;
                    let (_, path) = self.angle("for the field path")?;
                    fields.push((field, path));
                }
                TuCTokenKind::Name(w) if w == "ITERATOR" => {
                    return Err(tok.TuFError("nested iterators are not supported"))
                }
                TuCTokenKind::Name(w) if UNSUPPORTED_KEYWORDS.contains(&w.as_str()) => {
                    return Err(tok.TuFError(format!("unsupported construct '{}'", w)))
                }
                TuCTokenKind::Eof => return Err(tok.TuFError(format!("unterminated iterator '{}'", name))),
                other => return Err(tok.TuFError(format!("unexpected '{}' in iterator", other))),
            }
        }

        Ok(IteratorDecl {
            name,
            formulation,
            query,
            fields,
        })
    }

    fn expression_decl(&mut self) -> Result<ExpressionDecl> {
        let name = self.ident("after EXPRESSION")?;
        let (tok, body) = self.angle("for the expression body")?;
        let parts = split_body(&body).map_err(|m| tok.TuFError(m))?;
        Ok(ExpressionDecl { name, parts })
    }

    /// Text between a `[` token and its `]`, taken verbatim from the source.
    fn bracket_reference(&mut self) -> Result<String> {
        let open = self.expect(TuCTokenKind::LBracket, "to open a reference")?;
        loop {
            let tok = self.next();
            match tok.kind {
                TuCTokenKind::RBracket => {
                    let reference = self.src[open.end..tok.start].trim().to_string();
                    if reference.is_empty() {
                        return Err(open.TuFError("empty reference"));
                    }
                    return Ok(reference);
                }
                TuCTokenKind::Eof => return Err(open.TuFError("unterminated reference")),
                _ => {}
            }
        }
    }

    fn touches_bracket(&self, tok: &TuCToken) -> bool {
        let next = self.peek();
        next.kind == TuCTokenKind::LBracket && tok.TuFTouches(next)
    }

    fn shape_decl(&mut self) -> Result<ShapeDecl> {
        let name_tok = self.next();
        let name = match &name_tok.kind {
            TuCTokenKind::PrefixedName { prefix, local } => {
                self.expand(&name_tok, prefix, local)?;
                if local.is_empty() {
                    prefix.clone()
                } else {
                    local.clone()
                }
            }
            other => return Err(name_tok.TuFError(format!("expected a shape name, found '{}'", other))),
        };

        let subject_tok = self.next();
        let subject = match &subject_tok.kind {
            TuCTokenKind::PrefixedName { prefix, local } if local.is_empty() && self.touches_bracket(&subject_tok) => {
                let namespace = self.expand(&subject_tok, prefix, local)?;
                ShapeSubject::Iri {
                    namespace,
                    reference: self.bracket_reference()?,
                }
            }
            TuCTokenKind::BlankLabel(label) if label.is_empty() && self.touches_bracket(&subject_tok) => {
                ShapeSubject::Blank {
                    reference: self.bracket_reference()?,
                }
            }
            TuCTokenKind::PrefixedName { prefix, local } => {
                ShapeSubject::Constant(self.expand(&subject_tok, prefix, local)?)
            }
            other => {
                return Err(subject_tok.TuFError(format!("expected a subject for shape '{}', found '{}'", name, other)))
            }
        };

        self.expect(TuCTokenKind::LBrace, "to open the shape")?;
        let mut rules = Vec::new();
        loop {
            if self.peek().kind == TuCTokenKind::RBrace {
                self.next();
                break;
            }
            rules.push(self.shape_rule()?);
            match self.peek().kind {
                TuCTokenKind::Semicolon => {
                    self.next();
                }
                TuCTokenKind::RBrace => {}
                _ => {
                    let tok = self.next();
                    return Err(tok.TuFError(format!("expected ';' or '}}', found '{}'", tok.kind)));
                }
            }
        }

        Ok(ShapeDecl { name, subject, rules })
    }

    fn shape_rule(&mut self) -> Result<ShapeRule> {
        let pred_tok = self.next();
        let predicate = match &pred_tok.kind {
            TuCTokenKind::PrefixedName { prefix, local } => self.expand(&pred_tok, prefix, local)?,
            TuCTokenKind::Angle(iri) => iri.trim().to_string(),
            TuCTokenKind::Eof => return Err(pred_tok.TuFError("unterminated shape")),
            other => return Err(pred_tok.TuFError(format!("expected a predicate, found '{}'", other))),
        };

        let object = match self.peek().kind.clone() {
            TuCTokenKind::LBracket => ShapeObject::Reference(self.bracket_reference()?),
            TuCTokenKind::PrefixedName { prefix, local } => {
                let tok = self.next();
                if local.is_empty() && self.touches_bracket(&tok) {
                    ShapeObject::IriTemplate {
                        namespace: self.expand(&tok, &prefix, &local)?,
                        reference: self.bracket_reference()?,
                    }
                } else {
                    ShapeObject::ConstantIri(self.expand(&tok, &prefix, &local)?)
                }
            }
            TuCTokenKind::Angle(iri) => {
                self.next();
                ShapeObject::ConstantIri(iri.trim().to_string())
            }
            TuCTokenKind::Str(text) => {
                self.next();
                ShapeObject::ConstantLiteral(text)
            }
            _ => {
                let tok = self.next();
                return Err(tok.TuFError(format!("expected an object, found '{}'", tok.kind)));
            }
        };

        let mut datatype = None;
        let mut language = None;
        match self.peek().kind.clone() {
            TuCTokenKind::At(lang) => {
                self.next();
                language = Some(lang);
            }
            TuCTokenKind::PrefixedName { prefix, local } => {
                let tok = self.next();
                datatype = Some(self.expand(&tok, &prefix, &local)?);
            }
            TuCTokenKind::Angle(iri) => {
                self.next();
                datatype = Some(iri.trim().to_string());
            }
            _ => {}
        }

        Ok(ShapeRule {
            predicate,
            object,
            datatype,
            language,
        })
    }
}

fn strip_keyword<'a>(raw: &'a str, keyword: &str) -> Option<&'a str> {
    let head = raw.get(..keyword.len())?;
    if head.eq_ignore_ascii_case(keyword) {
        Some(raw[keyword.len()..].trim())
    } else {
        None
    }
}

/// Splits an expression body on `+` outside of string literals.
fn split_body(body: &str) -> std::result::Result<Vec<BodyPart>, String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut quoted = false;

    let mut flush = |current: &mut String, quoted: &mut bool| -> std::result::Result<(), String> {
        let text = current.trim();
        if *quoted {
            parts.push(BodyPart::Literal(unquote(text)?));
        } else if text.is_empty() {
            return Err(format!("empty operand in expression '{}'", body));
        } else if text.split_whitespace().any(|w| w == "UNION") {
            return Err("unsupported construct 'UNION'".to_string());
        } else if text.contains(char::is_whitespace) {
            return Err(format!("malformed reference '{}'", text));
        } else {
            parts.push(BodyPart::Reference(text.to_string()));
        }
        current.clear();
        *quoted = false;
        Ok(())
    };

    for c in body.chars() {
        match (quote, c) {
            (None, '"') | (None, '\'') => {
                quote = Some(c);
                quoted = true;
                current.push(c);
            }
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (None, '+') => flush(&mut current, &mut quoted)?,
            (_, c) => current.push(c),
        }
    }
    if quote.is_some() {
        return Err(format!("unterminated string in expression '{}'", body));
    }
    flush(&mut current, &mut quoted)?;
    Ok(parts)
}

fn unquote(text: &str) -> std::result::Result<String, String> {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && (open == '"' || open == '\'') => {
            Ok(chars.as_str().to_string())
        }
        _ => Err(format!("malformed string operand {}", text)),
    }
}

/// Lowering state: which (source, iterator) pairs are read and under
/// which model iterator name.
struct Bindings {
    pairs: Vec<(String, String)>,
    names: HashMap<(String, String), String>,
}

impl Bindings {
    fn collect(decls: &ShexDeclarations) -> Self {
        let is_source = |s: &str| decls.sources.iter().any(|(n, _)| n == s);
        let is_iterator = |s: &str| decls.iterators.iter().any(|i| i.name == s);

        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut note = |reference: &str, min_segments: usize| {
            let segs: Vec<&str> = reference.split('.').collect();
            if segs.len() >= min_segments && is_source(segs[0]) && is_iterator(segs[1]) {
                let pair = (segs[0].to_string(), segs[1].to_string());
                if !pairs.contains(&pair) {
                    pairs.push(pair);
                }
            }
        };

        for e in &decls.expressions {
            for part in &e.parts {
                if let BodyPart::Reference(r) = part {
                    note(r, 2);
                }
            }
        }
        for shape in &decls.shapes {
            let mut refs: Vec<&str> = Vec::new();
            match &shape.subject {
                ShapeSubject::Iri { reference, .. } | ShapeSubject::Blank { reference } => refs.push(reference),
                ShapeSubject::Constant(_) => {}
            }
            for rule in &shape.rules {
                match &rule.object {
                    ShapeObject::Reference(r) | ShapeObject::IriTemplate { reference: r, .. } => refs.push(r),
                    _ => {}
                }
            }
            for r in refs {
                note(r, 3);
            }
        }

        // Pairs in iterator declaration order, then by first use.
        let mut ordered = Vec::with_capacity(pairs.len());
        for it in &decls.iterators {
            for pair in pairs.iter().filter(|(_, i)| *i == it.name) {
                if !ordered.contains(pair) {
                    ordered.push(pair.clone());
                }
            }
        }

        let mut names = HashMap::new();
        for (source, iterator) in &ordered {
            let shared = ordered.iter().filter(|(_, i)| i == iterator).count() > 1;
            let name = if shared {
                format!("{}_{}", source, iterator)
            } else {
                iterator.clone()
            };
            names.insert((source.clone(), iterator.clone()), name);
        }

        Self { pairs: ordered, names }
    }

    /// Rewrites `source.iterator.rest` to `<model iterator>.rest`.
    fn rewrite(&self, reference: &str) -> String {
        let mut segs = reference.splitn(3, '.');
        if let (Some(s), Some(i), Some(rest)) = (segs.next(), segs.next(), segs.next()) {
            if let Some(name) = self.names.get(&(s.to_string(), i.to_string())) {
                return format!("{}.{}", name, rest);
            }
        }
        reference.to_string()
    }

    /// A two-segment `source.iterator` body names a binding.
    fn binding(&self, parts: &[BodyPart]) -> Option<&String> {
        match parts {
            [BodyPart::Reference(r)] => {
                let (s, i) = r.split_once('.')?;
                if i.contains('.') {
                    return None;
                }
                self.names.get(&(s.to_string(), i.to_string()))
            }
            _ => None,
        }
    }
}

fn lower(decls: ShexDeclarations) -> TuCMappingDocument {
    let bindings = Bindings::collect(&decls);
    let mut doc = TuCMappingDocument::TuFNew();

    for (name, location) in &decls.sources {
        let first_use = bindings
            .pairs
            .iter()
            .find(|(s, _)| s == name)
            .and_then(|(_, i)| decls.iterators.iter().find(|d| &d.name == i));
        let format = TuCDataFormat::TuFFromLocation(location)
            .or_else(|| first_use.map(|d| d.formulation.TuFDataFormat()))
            .unwrap_or_default();
        doc.sources.push(TuCSource {
            name: name.clone(),
            location: location.clone(),
            format,
        });
    }

    for it in &decls.iterators {
        let bound: Vec<&(String, String)> = bindings.pairs.iter().filter(|(_, i)| *i == it.name).collect();
        if bound.is_empty() {
            log::warn!("shexml: iterator '{}' is not read through any source, dropped", it.name);
            continue;
        }
        for (source, _) in bound {
            let model_name = &bindings.names[&(source.clone(), it.name.clone())];
            let mut iterator = TuCIterator::TuFNew(model_name.clone(), source.clone());
            iterator.formulation = it.formulation;
            iterator.query = it.query.clone();
            for (field, path) in &it.fields {
                iterator = iterator.TuFWithField(field.clone(), path.clone());
            }
            doc.iterators.push(iterator);
        }
    }

    for e in &decls.expressions {
        if let Some(target) = bindings.binding(&e.parts) {
            if let Some(it) = doc.iterators.iter_mut().find(|i| &i.name == target) {
                it.aliases.push(e.name.clone());
            }
            continue;
        }
        let operands: Vec<TuCOperand> = e
            .parts
            .iter()
            .map(|p| match p {
                BodyPart::Reference(r) => TuCOperand::Reference(bindings.rewrite(r)),
                BodyPart::Literal(l) => TuCOperand::Literal(l.clone()),
            })
            .collect();
        let expression = match operands.as_slice() {
            [TuCOperand::Reference(r)] => TuCExpression::TuFAlias(e.name.clone(), r.clone()),
            _ => TuCExpression::TuFConcat(e.name.clone(), operands),
        };
        doc.expressions.push(expression);
    }

    for shape in &decls.shapes {
        let subject = match &shape.subject {
            ShapeSubject::Iri { namespace, reference } => TuCSubjectTemplate {
                template: format!("{}{{{}}}", TuFEscapeLiteral(namespace), bindings.rewrite(reference)),
                kind: TuCTermKind::Iri,
            },
            ShapeSubject::Blank { reference } => TuCSubjectTemplate {
                template: format!("{{{}}}", bindings.rewrite(reference)),
                kind: TuCTermKind::BlankNode,
            },
            ShapeSubject::Constant(iri) => TuCSubjectTemplate {
                template: TuFEscapeLiteral(iri),
                kind: TuCTermKind::Iri,
            },
        };

        let mut unit = TuCMappingUnit::TuFNew(shape.name.clone());
        unit.subject = Some(subject);
        for rule in &shape.rules {
            let (value, kind) = match &rule.object {
                ShapeObject::Reference(r) => (TuCTermValue::Reference(bindings.rewrite(r)), TuCTermKind::Literal),
                ShapeObject::IriTemplate { namespace, reference } => (
                    TuCTermValue::Template(format!(
                        "{}{{{}}}",
                        TuFEscapeLiteral(namespace),
                        bindings.rewrite(reference)
                    )),
                    TuCTermKind::Iri,
                ),
                ShapeObject::ConstantIri(iri) => (TuCTermValue::Constant(iri.clone()), TuCTermKind::Iri),
                ShapeObject::ConstantLiteral(text) => (TuCTermValue::Constant(text.clone()), TuCTermKind::Literal),
            };
            unit.rules.push(TuCStatementRule {
                predicate: rule.predicate.clone(),
                object: TuCObjectTerm {
                    value,
                    kind,
                    datatype: rule.datatype.clone(),
                    language: rule.language.clone(),
                },
            });
        }
        doc.units.push(unit);
    }

    doc
}
