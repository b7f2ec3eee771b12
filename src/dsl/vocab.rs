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

//! Namespaces and terms of the mapping vocabularies.
//!
//! Two generations of RML are in use. The legacy one splits its terms
//! between R2RML and the semweb RML namespace; RML 2 puts everything under
//! `http://w3id.org/rml/`. Lookups accept a local name in any of them.

pub const R2RML: &str = "http://www.w3.org/ns/r2rml#";
pub const RML_LEGACY: &str = "http://semweb.mmlab.be/ns/rml#";
pub const RML_CORE: &str = "http://w3id.org/rml/";
pub const QL: &str = "http://semweb.mmlab.be/ns/ql#";
pub const FNML: &str = "http://semweb.mmlab.be/ns/fnml#";
pub const CSVW: &str = "http://www.w3.org/ns/csvw#";
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

const MAPPING_NAMESPACES: [&str; 3] = [R2RML, RML_LEGACY, RML_CORE];

/// Whether `iri` is `local` in one of the RML namespaces.
#[allow(non_snake_case)]
pub fn TuFIsTerm(iri: &str, local: &str) -> bool {
    MAPPING_NAMESPACES
        .iter()
        .any(|ns| iri.len() == ns.len() + local.len() && iri.starts_with(ns) && iri.ends_with(local))
}

/// Local name of a formulation IRI such as `ql:CSV` or `rml:JSONPath`.
#[allow(non_snake_case)]
pub fn TuFFormulationName(iri: &str) -> Option<&str> {
    [QL, RML_CORE, RML_LEGACY]
        .iter()
        .find_map(|ns| iri.strip_prefix(ns))
}

/// Last segment of an IRI, after the final `#` or `/`.
#[allow(non_snake_case)]
pub fn TuFLocalName(iri: &str) -> &str {
    let trimmed = iri.trim_end_matches(['/', '#']);
    match trimmed.rfind(['#', '/']) {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}
