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

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::log::core::TuCLogRecord;
use crate::log::formatters::{TuCJsonFormatter, TuCTextFormatter};

pub trait TuCLogHandler {
    fn handle(&self, record: &TuCLogRecord);

    fn flush(&self) {}
}

fn format_line(record: &TuCLogRecord, json: bool) -> String {
    if json {
        TuCJsonFormatter::TuFFormat(record)
    } else {
        TuCTextFormatter::TuFFormat(record)
    }
}

/// Writes records to stderr, keeping stdout free for the plan.
pub struct TuCStderrHandler {
    json: bool,
}

impl TuCStderrHandler {
    #[allow(non_snake_case)]
    pub fn TuFNew(json: bool) -> Self {
        TuCStderrHandler { json }
    }
}

impl TuCLogHandler for TuCStderrHandler {
    fn handle(&self, record: &TuCLogRecord) {
        eprintln!("{}", format_line(record, self.json));
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Appends records to a file, opening it per record.
pub struct TuCFileHandler {
    path: String,
    json: bool,
    lock: Mutex<()>,
}

impl TuCFileHandler {
    #[allow(non_snake_case)]
    pub fn TuFNew(path: String, json: bool) -> Self {
        TuCFileHandler {
            path,
            json,
            lock: Mutex::new(()),
        }
    }
}

impl TuCLogHandler for TuCFileHandler {
    fn handle(&self, record: &TuCLogRecord) {
        let _guard = match self.lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{}", format_line(record, self.json));
        }
    }
}
