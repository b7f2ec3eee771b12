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

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use tumap::config::{TuCTranslatorConfig, TuCTranslatorConfigBuilder};
use tumap::{TuCPlanFormat, TuCSyntax};

/// Translate an RML or ShExML mapping document into an algebraic mapping plan.
#[derive(Debug, Parser)]
#[command(name = "tumap", version, about)]
pub struct TuCCli {
    /// Mapping document to translate; stdin is read when omitted.
    pub document: Option<PathBuf>,

    /// Surface syntax of the document (rml or shexml); detected when omitted.
    #[arg(long)]
    pub syntax: Option<String>,

    /// Plan output format (text or json).
    #[arg(long)]
    pub format: Option<String>,

    /// Give every mapping unit its own Source operator.
    #[arg(long)]
    pub no_share_sources: bool,

    /// Fail when a declared source is never read.
    #[arg(long)]
    pub strict_sources: bool,

    /// JSON or YAML configuration file; flags override its values.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log threshold (off, error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit log records as JSON lines.
    #[arg(long)]
    pub log_json: bool,
}

impl TuCCli {
    /// Resolves the effective configuration: defaults, then the file, then flags.
    #[allow(non_snake_case)]
    pub fn TuFConfig(&self) -> Result<TuCTranslatorConfig> {
        let base = match &self.config {
            Some(path) => TuCTranslatorConfigBuilder::TuFFromFile(path)
                .with_context(|| format!("loading configuration {}", path.display()))?,
            None => TuCTranslatorConfigBuilder::TuFNew(),
        };

        let mut flags = TuCTranslatorConfigBuilder::TuFNew();
        if let Some(syntax) = &self.syntax {
            flags = flags.TuFSyntax(syntax.parse::<TuCSyntax>()?);
        }
        if let Some(format) = &self.format {
            flags = flags.TuFOutputFormat(format.parse::<TuCPlanFormat>()?);
        }
        if self.no_share_sources {
            flags = flags.TuFShareSources(false);
        }
        if self.strict_sources {
            flags = flags.TuFStrictSources(true);
        }
        if self.log_level.is_some() || self.log_json {
            let mut log = base.log.clone().unwrap_or_default();
            if let Some(level) = &self.log_level {
                log.level = Some(level.clone());
            }
            if self.log_json {
                log.json_format = Some(true);
            }
            flags.log = Some(log);
        }

        let mut config = base.TuFMerge(flags).TuFBuild();
        if config.syntax.is_none() {
            config.syntax = self.TuFSyntaxHint();
        }
        Ok(config)
    }

    /// Syntax implied by the document's file extension, if any.
    #[allow(non_snake_case)]
    pub fn TuFSyntaxHint(&self) -> Option<TuCSyntax> {
        let extension = self.document.as_ref()?.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "shexml" => Some(TuCSyntax::ScriptStyle),
            "ttl" | "rml" => Some(TuCSyntax::RuleBased),
            _ => None,
        }
    }

    /// Reads the whole document from the named file or from stdin.
    #[allow(non_snake_case)]
    pub fn TuFReadDocument(&self) -> Result<String> {
        match &self.document {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display())),
            None => {
                let mut document = String::new();
                std::io::stdin()
                    .read_to_string(&mut document)
                    .context("reading stdin")?;
                Ok(document)
            }
        }
    }
}
