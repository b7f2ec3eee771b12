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

use crate::log::core::TuCLogRecord;

pub struct TuCJsonFormatter;

impl TuCJsonFormatter {
    #[allow(non_snake_case)]
    pub fn TuFFormat(record: &TuCLogRecord) -> String {
        record.TuFToJson().to_string()
    }
}

pub struct TuCTextFormatter;

impl TuCTextFormatter {
    /// `<millis> <LEVEL> <target>: <message>`, with newlines in the message
    /// escaped so every record stays on one line.
    #[allow(non_snake_case)]
    pub fn TuFFormat(record: &TuCLogRecord) -> String {
        format!(
            "{} {:<5} {}: {}",
            record.TuFTimestampMillis(),
            record.level.as_str(),
            record.target,
            record.message.replace('\n', "\\n")
        )
    }
}
