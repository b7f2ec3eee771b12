//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Tu.
//! The Tu project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! you may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dsl::ir::TuCMappingDocument;
use crate::dsl::rml::TuFParseRml;
use crate::dsl::shexml::TuFParseShExML;
use crate::errors::{Result, TuCError};

/// Surface syntaxes understood by the front end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TuCSyntax {
    /// RML triples maps written in Turtle.
    #[serde(alias = "rml")]
    RuleBased,
    /// ShExML scripts.
    #[serde(alias = "shexml")]
    ScriptStyle,
}

impl fmt::Display for TuCSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuCSyntax::RuleBased => write!(f, "rml"),
            TuCSyntax::ScriptStyle => write!(f, "shexml"),
        }
    }
}

impl FromStr for TuCSyntax {
    type Err = TuCError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rml" | "rulebased" | "rule-based" => Ok(TuCSyntax::RuleBased),
            "shexml" | "scriptstyle" | "script-style" => Ok(TuCSyntax::ScriptStyle),
            other => Err(TuCError::config(format!("unknown syntax '{}'", other))),
        }
    }
}

struct DetectionTables {
    rule_based: Vec<Regex>,
    script_style: Vec<Regex>,
}

static TABLES: OnceLock<DetectionTables> = OnceLock::new();

fn tables() -> &'static DetectionTables {
    TABLES.get_or_init(|| DetectionTables {
        rule_based: vec![
            Regex::new(r"(?m)^\s*@(prefix|base)\b").expect("valid pattern"),
            Regex::new(r"(?m)(^|[\s\[;,])(rr|rml):[A-Za-z]").expect("valid pattern"),
        ],
        script_style: vec![
            Regex::new(r"(?m)^\s*(SOURCE|ITERATOR|EXPRESSION)\b").expect("valid pattern"),
        ],
    })
}

/// Strips `#` comments so markers inside them are not counted. IRIs and
/// strings holding `#` keep their text up to the marker, which is enough
/// for detection.
fn without_comments(document: &str) -> String {
    document
        .lines()
        .map(|line| {
            let mut in_iri = false;
            let mut in_str = false;
            for (i, c) in line.char_indices() {
                match c {
                    '<' if !in_str => in_iri = true,
                    '>' if !in_str => in_iri = false,
                    '"' if !in_iri => in_str = !in_str,
                    '#' if !in_iri && !in_str => return &line[..i],
                    _ => {}
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Infers the surface syntax of `document`.
#[allow(non_snake_case)]
pub fn TuFDetectSyntax(document: &str) -> Result<TuCSyntax> {
    let text = without_comments(document);
    let tables = tables();
    let rule_based = tables.rule_based.iter().any(|re| re.is_match(&text));
    let script_style = tables.script_style.iter().any(|re| re.is_match(&text));

    match (rule_based, script_style) {
        (true, false) => Ok(TuCSyntax::RuleBased),
        (false, true) => Ok(TuCSyntax::ScriptStyle),
        (true, true) => Err(TuCError::ambiguity(
            "document carries both RML markers and ShExML declarations",
        )),
        (false, false) => Err(TuCError::ambiguity(
            "document carries neither RML markers nor ShExML declarations",
        )),
    }
}

#[derive(Clone, Debug, Default)]
pub struct TuCDSLParser {
    syntax: Option<TuCSyntax>,
}

impl TuCDSLParser {
    #[allow(non_snake_case)]
    pub fn TuFNew() -> Self {
        Self::default()
    }

    /// Fixes the syntax, bypassing detection.
    #[allow(non_snake_case)]
    pub fn TuFWithSyntax(mut self, syntax: Option<TuCSyntax>) -> Self {
        self.syntax = syntax;
        self
    }

    /// The syntax `document` will be parsed with.
    #[allow(non_snake_case)]
    pub fn TuFSyntaxFor(&self, document: &str) -> Result<TuCSyntax> {
        match self.syntax {
            Some(syntax) => Ok(syntax),
            None => TuFDetectSyntax(document),
        }
    }

    #[allow(non_snake_case)]
    pub fn TuFParse(&self, document: &str) -> Result<TuCMappingDocument> {
        let syntax = self.TuFSyntaxFor(document)?;
        log::debug!("parser: reading document as {}", syntax);
        let doc = match syntax {
            TuCSyntax::RuleBased => TuFParseRml(document)?,
            TuCSyntax::ScriptStyle => TuFParseShExML(document)?,
        };
        log::debug!(
            "parser: {} sources, {} iterators, {} expressions, {} units",
            doc.sources.len(),
            doc.iterators.len(),
            doc.expressions.len(),
            doc.units.len()
        );
        Ok(doc)
    }
}
