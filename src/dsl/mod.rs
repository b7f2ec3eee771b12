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

//! # Mapping Language Module
//!
//! Front ends for the two mapping languages and the syntax-agnostic stages
//! behind them.
//!
//! ## Architecture
//!
//! - **Parser** ([parser.rs](parser/index.html)): detects the surface syntax and
//!   dispatches to the RML ([rml.rs](rml/index.html), on top of the sophia-backed
//!   Turtle reader in [turtle.rs](turtle/index.html)) or ShExML
//!   ([shexml.rs](shexml/index.html), tokenized by [lexer.rs](lexer/index.html))
//!   front end.
//! - **IR** ([ir.rs](ir/index.html)): the mapping model both front ends lower into.
//! - **Normalizer** ([normalizer.rs](normalizer/index.html)): resolves references,
//!   checks arity, orders expressions and rewrites terms to column names.
//! - **Compiler** ([compiler.rs](compiler/index.html)): turns the normalized model
//!   into the operator plan.
//!
//! ## Usage Example (ShExML)
//!
//! ```text
//! PREFIX : <http://example.com/>
//! SOURCE films_csv_file <https://example.com/films.csv>
//! ITERATOR film_csv <csvperrow> {
//!     FIELD id <@id>
//!     FIELD name <name>
//! }
//! EXPRESSION films <films_csv_file.film_csv>
//!
//! :Films :[films.id] {
//!     :name [films.name] ;
//! }
//! ```

pub mod lexer;
pub mod template;
pub mod vocab;
pub mod turtle;
pub mod ir;
pub mod rml;
pub mod shexml;
pub mod parser;
pub mod normalizer;
pub mod compiler;

pub use parser::{TuCDSLParser, TuCSyntax, TuFDetectSyntax};
pub use ir::{
    TuCDataFormat, TuCExpression, TuCIterator, TuCMappingDocument, TuCMappingUnit,
    TuCReferenceFormulation, TuCSource,
};
pub use normalizer::{TuCNormalizedDocument, TuCNormalizedUnit, TuCNormalizer};
pub use compiler::TuCPlanCompiler;
