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

//! # Plan Export Module
//!
//! Renders compiled plans for downstream engines.
//!
//! ## Supported Output Formats
//!
//! - **Text**: the canonical plan document, one operator header per line
//!   followed by indented parameter lines
//! - **JSON**: the plan structure as pretty-printed JSON
//!
//! ## Usage
//!
//! ```rust
//! use tumap::export::{TuCPlanFormat, TuCPlanWriter};
//!
//! let writer = TuCPlanWriter::TuFNew().TuFFormat(TuCPlanFormat::Json);
//! let rendered = writer.TuFRender(&plan)?;
//! ```

pub mod writer;

pub use writer::{TuCPlanFormat, TuCPlanWriter, TuCWriterConfig, TuFQuote};
