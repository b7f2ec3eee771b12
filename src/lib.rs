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

//! # Tu Mapping Translator
//!
//! Compiles declarative knowledge-graph mapping documents into an algebraic
//! execution plan. Two surface languages are accepted: RML triples maps
//! written in Turtle, and ShExML scripts. Both lower into one mapping model,
//! so everything after the front end is syntax-agnostic.
//!
//! ## Module Overview
//!
//! - **dsl**: lexer, the RML and ShExML front ends, the mapping model, the
//!   normalizer and the plan compiler
//! - **dag**: the operator graph (Source, Projection, Extend, Serialize, Sink)
//! - **export**: canonical text and JSON rendering of plans
//! - **config**: translator settings loaded from JSON or YAML
//! - **log**: structured logger behind the `log` facade
//! - **errors**: the error taxonomy shared by every stage
//!
//! ## Quick Start
//!
//! ```rust
//! let document = std::fs::read_to_string("mapping.ttl")?;
//! match tumap::translate(&document) {
//!     Ok(plan) => print!("{}", plan),
//!     Err(message) => eprintln!("{}", message),
//! }
//! ```
//!
//! ## Pipeline
//!
//! 1. **Parse**: detect the syntax and lower the document into a
//!    [`TuCMappingDocument`]
//! 2. **Normalize**: resolve references, check arity and cycles, order
//!    expressions ([`TuCNormalizer`])
//! 3. **Plan**: compile the normalized model into a [`TuCPlan`]
//!    ([`TuCPlanCompiler`])
//! 4. **Render**: write the plan as text or JSON ([`TuCPlanWriter`])
//!
//! Every stage is a pure function of its input and fails on the first error.

#![allow(non_snake_case)]

pub mod errors;
pub mod config;
pub mod dag;
pub mod dsl;
pub mod export;
pub mod log;

pub use config::{TuCTranslatorConfig, TuCTranslatorConfigBuilder};
pub use dag::{TuCOperator, TuCOperatorId, TuCOperatorKind, TuCOperatorParams, TuCPlan};
pub use dsl::{
    TuCDSLParser, TuCMappingDocument, TuCNormalizedDocument, TuCNormalizer, TuCPlanCompiler,
    TuCSyntax,
};
pub use errors::{Result, TuCError};
pub use export::{TuCPlanFormat, TuCPlanWriter};

/// Runs the whole pipeline under one configuration.
#[derive(Clone, Debug, Default)]
pub struct TuCTranslator {
    config: TuCTranslatorConfig,
}

impl TuCTranslator {
    #[allow(non_snake_case)]
    pub fn TuFNew(config: TuCTranslatorConfig) -> Self {
        TuCTranslator { config }
    }

    #[allow(non_snake_case)]
    pub fn TuFConfig(&self) -> &TuCTranslatorConfig {
        &self.config
    }

    #[allow(non_snake_case)]
    pub fn TuFParse(&self, document: &str) -> Result<TuCMappingDocument> {
        TuCDSLParser::TuFNew()
            .TuFWithSyntax(self.config.syntax)
            .TuFParse(document)
    }

    #[allow(non_snake_case)]
    pub fn TuFNormalize(&self, document: &str) -> Result<TuCNormalizedDocument> {
        let raw = self.TuFParse(document)?;
        ::log::trace!("raw mapping model: {:?}", raw);
        let normalized = TuCNormalizer::TuFNew()
            .TuFStrictSources(self.config.strict_sources)
            .TuFNormalize(&raw)?;
        ::log::trace!("normalized mapping model: {:?}", normalized);
        Ok(normalized)
    }

    #[allow(non_snake_case)]
    pub fn TuFPlan(&self, document: &str) -> Result<TuCPlan> {
        let normalized = self.TuFNormalize(document)?;
        TuCPlanCompiler::TuFNew()
            .TuFShareSources(self.config.share_sources)
            .TuFCompile(&normalized)
    }

    /// Parses, normalizes, plans and renders `document`.
    #[allow(non_snake_case)]
    pub fn TuFTranslate(&self, document: &str) -> Result<String> {
        let plan = self.TuFPlan(document)?;
        TuCPlanWriter::TuFNew()
            .TuFFormat(self.config.output_format)
            .TuFRender(&plan)
    }
}

/// String-in, string-out entry point with default settings. Errors are
/// returned as their display text.
pub fn translate(document: &str) -> std::result::Result<String, String> {
    TuCTranslator::default()
        .TuFTranslate(document)
        .map_err(|e| e.to_string())
}
