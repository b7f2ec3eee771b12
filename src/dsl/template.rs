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

//! Placeholder templates such as `http://example.com/{id}`.

use std::sync::OnceLock;

use regex::Regex;

static TEMPLATE_PARTS: OnceLock<Regex> = OnceLock::new();

fn template_parts() -> &'static Regex {
    TEMPLATE_PARTS.get_or_init(|| {
        Regex::new(r"(?s)\\(.)|\{([^{}\\]*)\}|([{}\\])|([^{}\\]+)").expect("valid template pattern")
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TuCTemplateSegment {
    Literal(String),
    Placeholder(String),
}

/// A parsed template: literal text interleaved with placeholders.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TuCTemplate {
    pub segments: Vec<TuCTemplateSegment>,
}

impl TuCTemplate {
    /// Parses `text`, returning a message describing the first malformed part.
    #[allow(non_snake_case)]
    pub fn TuFParse(text: &str) -> std::result::Result<Self, String> {
        let mut segments: Vec<TuCTemplateSegment> = Vec::new();

        for caps in template_parts().captures_iter(text) {
            if let Some(escaped) = caps.get(1) {
                push_literal(&mut segments, escaped.as_str());
            } else if let Some(name) = caps.get(2) {
                let name = name.as_str().trim();
                if name.is_empty() {
                    return Err(format!("empty placeholder in template \"{}\"", text));
                }
                segments.push(TuCTemplateSegment::Placeholder(name.to_string()));
            } else if let Some(stray) = caps.get(3) {
                return Err(format!(
                    "unbalanced '{}' at offset {} in template \"{}\"",
                    stray.as_str(),
                    stray.start(),
                    text
                ));
            } else if let Some(literal) = caps.get(4) {
                push_literal(&mut segments, literal.as_str());
            }
        }

        Ok(Self { segments })
    }

    /// A template that renders `value` verbatim.
    #[allow(non_snake_case)]
    pub fn TuFConstant(value: &str) -> Self {
        let mut segments = Vec::new();
        if !value.is_empty() {
            segments.push(TuCTemplateSegment::Literal(value.to_string()));
        }
        Self { segments }
    }

    #[allow(non_snake_case)]
    pub fn TuFPlaceholders(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                TuCTemplateSegment::Placeholder(name) => Some(name.as_str()),
                TuCTemplateSegment::Literal(_) => None,
            })
            .collect()
    }

    /// Rewrites every placeholder name through `f`.
    #[allow(non_snake_case)]
    pub fn TuFRename<F>(&self, mut f: F) -> std::result::Result<Self, crate::errors::TuCError>
    where
        F: FnMut(&str) -> crate::errors::Result<String>,
    {
        let mut segments = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            segments.push(match segment {
                TuCTemplateSegment::Placeholder(name) => TuCTemplateSegment::Placeholder(f(name)?),
                TuCTemplateSegment::Literal(text) => TuCTemplateSegment::Literal(text.clone()),
            });
        }
        Ok(Self { segments })
    }

    /// Renders the template back to text, escaping literal braces.
    #[allow(non_snake_case)]
    pub fn TuFRender(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                TuCTemplateSegment::Literal(text) => out.push_str(&TuFEscapeLiteral(text)),
                TuCTemplateSegment::Placeholder(name) => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
        }
        out
    }
}

/// Escapes braces and backslashes so `text` survives template parsing.
#[allow(non_snake_case)]
pub fn TuFEscapeLiteral(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '{' | '}' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn push_literal(segments: &mut Vec<TuCTemplateSegment>, text: &str) {
    if let Some(TuCTemplateSegment::Literal(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(TuCTemplateSegment::Literal(text.to_string()));
    }
}
