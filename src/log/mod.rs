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

//! # Logging Module
//!
//! Structured logger behind the `log` facade. Library code only emits
//! through `log::debug!` and friends; binaries install [`TuCLogger`] once.
//!
//! ## Components
//!
//! - **Config** ([config.rs](config/index.html)): level threshold, JSON or text
//!   lines, stderr and optional file output
//! - **Core** ([core.rs](core/index.html)): the record type and the process-wide logger
//! - **Formatters** ([formatters.rs](formatters/index.html)): one record per line
//! - **Handlers** ([handlers.rs](handlers/index.html)): stderr and file sinks

pub mod config;
pub mod core;
pub mod formatters;
pub mod handlers;

pub use config::{TuCLogConfig, TuCLogConfigBuilder};
pub use core::{TuCLogRecord, TuCLogger};
