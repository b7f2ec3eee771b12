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

//! # Plan Writer Module
//!
//! Renders an algebra plan as the canonical text document or as JSON.

use std::fmt::Write as _;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dag::{TuCOperator, TuCOperatorId, TuCOperatorParams, TuCPlan};
use crate::dsl::ir::{TuCObjectTerm, TuCOperand, TuCTermValue};
use crate::errors::{Result, TuCError};

/// Supported plan output formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TuCPlanFormat {
    /// One header line per operator with indented parameter lines.
    #[default]
    Text,
    /// The plan structure as pretty-printed JSON.
    Json,
}

impl FromStr for TuCPlanFormat {
    type Err = TuCError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(TuCPlanFormat::Text),
            "json" => Ok(TuCPlanFormat::Json),
            other => Err(TuCError::config(format!("unknown output format '{}'", other))),
        }
    }
}

/// Configuration for the plan writer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TuCWriterConfig {
    pub format: TuCPlanFormat,
}

#[derive(Clone, Debug, Default)]
pub struct TuCPlanWriter {
    config: TuCWriterConfig,
}

impl TuCPlanWriter {
    #[allow(non_snake_case)]
    pub fn TuFNew() -> Self {
        Self::default()
    }

    #[allow(non_snake_case)]
    pub fn TuFFormat(mut self, format: TuCPlanFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Renders the plan. Identical plans always render to identical text.
    #[allow(non_snake_case)]
    pub fn TuFRender(&self, plan: &TuCPlan) -> Result<String> {
        match self.config.format {
            TuCPlanFormat::Text => Ok(render_text(plan)),
            TuCPlanFormat::Json => {
                let mut out = serde_json::to_string_pretty(plan)?;
                out.push('\n');
                Ok(out)
            }
        }
    }

    /// Renders the plan into `out`, returning the number of bytes written.
    #[allow(non_snake_case)]
    pub fn TuFWrite<W: Write>(&self, plan: &TuCPlan, out: &mut W) -> Result<usize> {
        let rendered = self.TuFRender(plan)?;
        out.write_all(rendered.as_bytes())?;
        Ok(rendered.len())
    }
}

/// Double-quotes `s`, escaping backslash, quote and control characters.
#[allow(non_snake_case)]
pub fn TuFQuote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn render_text(plan: &TuCPlan) -> String {
    let mut out = String::new();
    for op in &plan.operators {
        render_operator(plan, op, &mut out);
    }
    out
}

fn input_name(plan: &TuCPlan, id: TuCOperatorId) -> String {
    plan.TuFOperator(id)
        .map(TuCOperator::TuFName)
        .unwrap_or_else(|| format!("#{}", id))
}

fn list(items: impl Iterator<Item = String>) -> String {
    format!("[{}]", items.collect::<Vec<_>>().join(", "))
}

// Writing into a String cannot fail, so the fmt results are ignored below.
fn render_operator(plan: &TuCPlan, op: &TuCOperator, out: &mut String) {
    let _ = writeln!(
        out,
        "{} inputs={} schema={}",
        op.TuFName(),
        list(op.inputs.iter().map(|i| input_name(plan, *i))),
        list(op.schema.iter().map(|c| TuFQuote(c)))
    );

    match &op.params {
        TuCOperatorParams::Source {
            source,
            location,
            format,
            iterator,
            formulation,
            query,
        } => {
            let _ = writeln!(
                out,
                "  source {} location={} format={}",
                TuFQuote(source),
                TuFQuote(location),
                format
            );
            let _ = writeln!(
                out,
                "  iterator {} formulation={} query={}",
                TuFQuote(iterator),
                formulation,
                TuFQuote(query)
            );
        }
        TuCOperatorParams::Projection { unit } => {
            let _ = writeln!(out, "  unit {}", TuFQuote(unit));
        }
        TuCOperatorParams::Extend {
            column,
            combinator,
            operands,
        } => {
            let _ = writeln!(
                out,
                "  {} = {}({})",
                TuFQuote(column),
                combinator,
                operands.iter().map(render_operand).collect::<Vec<_>>().join(", ")
            );
        }
        TuCOperatorParams::Serialize {
            format,
            subject,
            statements,
        } => {
            let _ = writeln!(out, "  format={}", format_name(format));
            for statement in statements {
                let _ = writeln!(
                    out,
                    "  statement {}({}) <{}> {}",
                    subject.kind,
                    TuFQuote(&subject.template),
                    statement.predicate,
                    render_object(&statement.object)
                );
            }
        }
        TuCOperatorParams::Sink { target, format } => {
            let _ = writeln!(out, "  target={:?} format={}", target, format_name(format));
        }
    }
}

fn format_name(format: &crate::dag::TuCRdfFormat) -> &'static str {
    match format {
        crate::dag::TuCRdfFormat::NQuads => "NQuads",
    }
}

fn render_operand(operand: &TuCOperand) -> String {
    match operand {
        TuCOperand::Reference(column) => format!("ref({})", TuFQuote(column)),
        TuCOperand::Literal(text) => TuFQuote(text),
    }
}

fn render_object(object: &TuCObjectTerm) -> String {
    let value = match &object.value {
        TuCTermValue::Reference(column) => format!("ref({})", TuFQuote(column)),
        TuCTermValue::Template(template) => format!("template({})", TuFQuote(template)),
        TuCTermValue::Constant(value) => format!("const({})", TuFQuote(value)),
    };
    let mut rendered = format!("{}({})", object.kind, value);
    if let Some(datatype) = &object.datatype {
        let _ = write!(rendered, " datatype=<{}>", datatype);
    }
    if let Some(language) = &object.language {
        let _ = write!(rendered, " language={}", TuFQuote(language));
    }
    rendered
}
