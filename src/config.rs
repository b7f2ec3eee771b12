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

//! # Translator Configuration
//!
//! Settings that steer one translation: the surface syntax (detected when
//! unset), whether units reading the same iterator share a Source operator,
//! the plan output format and how strictly unused sources are treated.
//! Files may be JSON or YAML; missing keys take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dsl::parser::TuCSyntax;
use crate::errors::{Result, TuCError};
use crate::export::TuCPlanFormat;
use crate::log::{TuCLogConfig, TuCLogConfigBuilder};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuCTranslatorConfig {
    pub syntax: Option<TuCSyntax>,
    pub share_sources: bool,
    pub output_format: TuCPlanFormat,
    /// A declared source no unit reads is a ReferenceError when set.
    pub strict_sources: bool,
    pub log: TuCLogConfig,
}

impl Default for TuCTranslatorConfig {
    fn default() -> Self {
        TuCTranslatorConfig {
            syntax: None,
            share_sources: true,
            output_format: TuCPlanFormat::Text,
            strict_sources: false,
            log: TuCLogConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuCTranslatorConfigBuilder {
    pub syntax: Option<TuCSyntax>,
    pub share_sources: Option<bool>,
    pub output_format: Option<TuCPlanFormat>,
    pub strict_sources: Option<bool>,
    pub log: Option<TuCLogConfigBuilder>,
}

impl TuCTranslatorConfigBuilder {
    #[allow(non_snake_case)]
    pub fn TuFNew() -> Self {
        Self::default()
    }

    #[allow(non_snake_case)]
    pub fn TuFSyntax(mut self, syntax: TuCSyntax) -> Self {
        self.syntax = Some(syntax);
        self
    }

    #[allow(non_snake_case)]
    pub fn TuFShareSources(mut self, share: bool) -> Self {
        self.share_sources = Some(share);
        self
    }

    #[allow(non_snake_case)]
    pub fn TuFOutputFormat(mut self, format: TuCPlanFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    #[allow(non_snake_case)]
    pub fn TuFStrictSources(mut self, strict: bool) -> Self {
        self.strict_sources = Some(strict);
        self
    }

    /// Values set on `other` win over the ones set here.
    #[allow(non_snake_case)]
    pub fn TuFMerge(self, other: TuCTranslatorConfigBuilder) -> Self {
        TuCTranslatorConfigBuilder {
            syntax: other.syntax.or(self.syntax),
            share_sources: other.share_sources.or(self.share_sources),
            output_format: other.output_format.or(self.output_format),
            strict_sources: other.strict_sources.or(self.strict_sources),
            log: other.log.or(self.log),
        }
    }

    #[allow(non_snake_case)]
    pub fn TuFBuild(self) -> TuCTranslatorConfig {
        let base = TuCTranslatorConfig::default();
        TuCTranslatorConfig {
            syntax: self.syntax.or(base.syntax),
            share_sources: self.share_sources.unwrap_or(base.share_sources),
            output_format: self.output_format.unwrap_or(base.output_format),
            strict_sources: self.strict_sources.unwrap_or(base.strict_sources),
            log: self.log.map(TuCLogConfigBuilder::TuFBuild).unwrap_or(base.log),
        }
    }

    #[allow(non_snake_case)]
    pub fn TuFFromJson(value: &Value) -> Result<TuCTranslatorConfigBuilder> {
        serde_json::from_value(value.clone())
            .map_err(|e| TuCError::config(format!("invalid JSON configuration: {}", e)))
    }

    #[allow(non_snake_case)]
    pub fn TuFFromYaml(source: &str) -> Result<TuCTranslatorConfigBuilder> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source)
            .map_err(|e| TuCError::config(format!("invalid YAML configuration: {}", e)))
    }

    /// Loads a configuration file, choosing the format by extension
    /// (`.json`, `.yaml`/`.yml`).
    #[allow(non_snake_case)]
    pub fn TuFFromFile(path: &Path) -> Result<TuCTranslatorConfigBuilder> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TuCError::config(format!("cannot read configuration {}: {}", path.display(), e))
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "json" => {
                let value: Value = serde_json::from_str(&content)
                    .map_err(|e| TuCError::config(format!("invalid JSON configuration: {}", e)))?;
                Self::TuFFromJson(&value)
            }
            "yaml" | "yml" => Self::TuFFromYaml(&content),
            other => Err(TuCError::config(format!(
                "unsupported configuration extension '{}'",
                other
            ))),
        }
    }
}
