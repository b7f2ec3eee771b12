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

//! # Tu Error Module
//!
//! This module defines the error type shared by every translation stage.
//!
//! ## Error Categories
//!
//! - **Parse**: Malformed surface syntax, with the offending line and column
//! - **Reference**: A name that does not resolve in its scope
//! - **Cycle**: An expression that depends on itself
//! - **Arity**: A required construct is missing
//! - **SyntaxAmbiguity**: The surface syntax could not be inferred
//! - **Planner**: A model invariant that surfaced while building the plan
//! - **Config**, **Io**, **Serde**: Configuration loading and the CLI edge
//!
//! Every stage fails fast: the first error is returned and no partial plan
//! is produced.
//!
//! ## Usage
//!
//! ```rust
//! use tumap::errors::{Result, TuCError};
//!
//! fn lookup(name: &str) -> Result<()> {
//!     Err(TuCError::reference(name, "unresolved in subject template of unit 'Films'"))
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Tu.
pub type Result<T> = std::result::Result<T, TuCError>;

/// Canonical error enumeration for Tu.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TuCError {
    /// Malformed surface syntax.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// A placeholder, field or expression name that does not resolve, or a
    /// declaration that clashes with another name.
    #[error("reference error: {referrer}: '{name}'")]
    Reference { name: String, referrer: String },

    /// An expression whose reference graph loops back to itself.
    #[error("cycle error: {}", cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },

    /// A required construct is missing.
    #[error("arity error in {construct}: {message}")]
    Arity { construct: String, message: String },

    /// The surface syntax could not be inferred from the document.
    #[error("syntax ambiguity error: {message}")]
    SyntaxAmbiguity { message: String },

    /// A model invariant violated while building the plan.
    #[error("planner error: {message}")]
    Planner { message: String },

    /// Invalid translator configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Errors originating from filesystem IO at the CLI edge.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),
}

impl From<io::Error> for TuCError {
    fn from(err: io::Error) -> Self {
        TuCError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TuCError {
    fn from(err: serde_json::Error) -> Self {
        TuCError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for TuCError {
    fn from(err: serde_yaml::Error) -> Self {
        TuCError::Serde(err.to_string())
    }
}

impl TuCError {
    /// Helper to construct parse errors at a source location.
    pub fn parse<T: Into<String>>(line: usize, column: usize, message: T) -> Self {
        TuCError::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Helper to construct reference errors.
    pub fn reference(name: impl Into<String>, referrer: impl Into<String>) -> Self {
        TuCError::Reference {
            name: name.into(),
            referrer: referrer.into(),
        }
    }

    /// Helper to construct cycle errors from the names along the loop.
    pub fn cycle<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TuCError::Cycle {
            cycle: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Helper to construct arity errors.
    pub fn arity(construct: impl Into<String>, message: impl Into<String>) -> Self {
        TuCError::Arity {
            construct: construct.into(),
            message: message.into(),
        }
    }

    /// Helper to construct syntax ambiguity errors.
    pub fn ambiguity<T: Into<String>>(message: T) -> Self {
        TuCError::SyntaxAmbiguity {
            message: message.into(),
        }
    }

    /// Helper to construct planner errors.
    pub fn planner<T: Into<String>>(message: T) -> Self {
        TuCError::Planner {
            message: message.into(),
        }
    }

    /// Helper to construct configuration errors.
    pub fn config<T: Into<String>>(message: T) -> Self {
        TuCError::Config(message.into())
    }

    /// Short name of the error category, used in logs.
    #[allow(non_snake_case)]
    pub fn TuFKind(&self) -> &'static str {
        match self {
            TuCError::Parse { .. } => "ParseError",
            TuCError::Reference { .. } => "ReferenceError",
            TuCError::Cycle { .. } => "CycleError",
            TuCError::Arity { .. } => "ArityError",
            TuCError::SyntaxAmbiguity { .. } => "SyntaxAmbiguityError",
            TuCError::Planner { .. } => "PlannerError",
            TuCError::Config(_) => "ConfigError",
            TuCError::Io(_) => "IoError",
            TuCError::Serde(_) => "SerdeError",
        }
    }
}
