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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, TuCError};

/// Configuration for [`TuCLogger`](super::core::TuCLogger). Records go to
/// stderr, and optionally to an appended file, as JSON or text lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuCLogConfig {
    pub level: String,
    pub json_format: bool,
    pub stderr_enabled: bool,
    /// Optional file that receives a copy of every record.
    pub file_path: Option<String>,
}

impl Default for TuCLogConfig {
    fn default() -> Self {
        TuCLogConfig {
            level: "WARN".to_string(),
            json_format: false,
            stderr_enabled: true,
            file_path: None,
        }
    }
}

impl TuCLogConfig {
    /// The configured threshold. Unknown names fall back to `Warn`.
    #[allow(non_snake_case)]
    pub fn TuFLevelFilter(&self) -> log::LevelFilter {
        match self.level.to_ascii_uppercase().as_str() {
            "OFF" => log::LevelFilter::Off,
            "ERROR" => log::LevelFilter::Error,
            "INFO" => log::LevelFilter::Info,
            "DEBUG" => log::LevelFilter::Debug,
            "TRACE" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Warn,
        }
    }

    #[allow(non_snake_case)]
    pub fn TuFShouldLog(&self, level: log::Level) -> bool {
        level <= self.TuFLevelFilter()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuCLogConfigBuilder {
    pub level: Option<String>,
    pub json_format: Option<bool>,
    pub stderr_enabled: Option<bool>,
    pub file_path: Option<String>,
}

impl TuCLogConfigBuilder {
    #[allow(non_snake_case)]
    pub fn TuFBuild(self) -> TuCLogConfig {
        let base = TuCLogConfig::default();
        TuCLogConfig {
            level: self.level.unwrap_or(base.level),
            json_format: self.json_format.unwrap_or(base.json_format),
            stderr_enabled: self.stderr_enabled.unwrap_or(base.stderr_enabled),
            file_path: self.file_path.or(base.file_path),
        }
    }

    #[allow(non_snake_case)]
    pub fn TuFFromJson(value: &Value) -> Result<TuCLogConfig> {
        let builder: TuCLogConfigBuilder = serde_json::from_value(value.clone())
            .map_err(|e| TuCError::config(format!("invalid log configuration: {}", e)))?;
        Ok(builder.TuFBuild())
    }
}
