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

//! Command-line front end: reads one mapping document from a file or stdin
//! and prints its plan to stdout.
//!
//! Exit status: 0 on success, 1 when translation fails, 2 when the document
//! cannot be read (translation is not attempted), 3 on configuration errors.

mod cli;

use std::process::ExitCode;

use clap::Parser;

use cli::TuCCli;
use tumap::log::TuCLogger;
use tumap::TuCTranslator;

const EXIT_TRANSLATION: u8 = 1;
const EXIT_READ: u8 = 2;
const EXIT_CONFIG: u8 = 3;

fn main() -> ExitCode {
    let cli = TuCCli::parse();

    let config = match cli.TuFConfig() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("tumap: {:#}", err);
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    TuCLogger::TuFInit(config.log.clone());

    let document = match cli.TuFReadDocument() {
        Ok(document) => document,
        Err(err) => {
            log::error!("{:#}", err);
            eprintln!("tumap: {:#}", err);
            return ExitCode::from(EXIT_READ);
        }
    };

    match TuCTranslator::TuFNew(config).TuFTranslate(&document) {
        Ok(plan) => {
            print!("{}", plan);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::debug!("translation failed with {}", err.TuFKind());
            eprintln!("{}", err);
            ExitCode::from(EXIT_TRANSLATION)
        }
    }
}
