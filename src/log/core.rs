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

use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Map, Value};

use crate::log::config::TuCLogConfig;
use crate::log::handlers::{TuCFileHandler, TuCLogHandler, TuCStderrHandler};

/// One captured `log` record.
#[derive(Clone, Debug)]
pub struct TuCLogRecord {
    pub level: log::Level,
    pub target: String,
    pub message: String,
    pub timestamp: SystemTime,
}

impl TuCLogRecord {
    #[allow(non_snake_case)]
    pub fn TuFFromLog(record: &log::Record<'_>) -> Self {
        TuCLogRecord {
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            timestamp: SystemTime::now(),
        }
    }

    #[allow(non_snake_case)]
    pub fn TuFTimestampMillis(&self) -> u128 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
    }

    #[allow(non_snake_case)]
    pub fn TuFToJson(&self) -> Value {
        let mut data = Map::new();
        data.insert("level".into(), json!(self.level.as_str()));
        data.insert("target".into(), json!(self.target));
        data.insert("message".into(), json!(self.message));
        data.insert("timestamp_ms".into(), json!(self.TuFTimestampMillis()));
        Value::Object(data)
    }
}

/// Process-wide logger behind the `log` facade.
pub struct TuCLogger {
    config: TuCLogConfig,
    handlers: Vec<Box<dyn TuCLogHandler + Send + Sync>>,
}

static LOGGER: OnceLock<TuCLogger> = OnceLock::new();

impl TuCLogger {
    #[allow(non_snake_case)]
    pub fn TuFNew(config: TuCLogConfig) -> Self {
        let mut handlers: Vec<Box<dyn TuCLogHandler + Send + Sync>> = Vec::new();
        if config.stderr_enabled {
            handlers.push(Box::new(TuCStderrHandler::TuFNew(config.json_format)));
        }
        if let Some(path) = &config.file_path {
            handlers.push(Box::new(TuCFileHandler::TuFNew(path.clone(), config.json_format)));
        }
        TuCLogger { config, handlers }
    }

    /// Installs the logger. The first call wins; later calls return `false`
    /// and leave the installed logger untouched.
    #[allow(non_snake_case)]
    pub fn TuFInit(config: TuCLogConfig) -> bool {
        let mut created = false;
        let logger = LOGGER.get_or_init(|| {
            created = true;
            TuCLogger::TuFNew(config)
        });
        if !created {
            return false;
        }
        if log::set_logger(logger).is_err() {
            return false;
        }
        log::set_max_level(logger.config.TuFLevelFilter());
        true
    }

    #[allow(non_snake_case)]
    pub fn TuFConfig(&self) -> &TuCLogConfig {
        &self.config
    }
}

impl log::Log for TuCLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.config.TuFShouldLog(metadata.level())
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let record = TuCLogRecord::TuFFromLog(record);
        for handler in &self.handlers {
            handler.handle(&record);
        }
    }

    fn flush(&self) {
        for handler in &self.handlers {
            handler.flush();
        }
    }
}
