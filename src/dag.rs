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

//! Algebra plan: operators numbered in creation order, each listing the
//! operators it reads from.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dsl::ir::{
    TuCCombinator, TuCDataFormat, TuCOperand, TuCReferenceFormulation, TuCStatementRule,
    TuCSubjectTemplate,
};
use crate::errors::{Result, TuCError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TuCOperatorId(pub usize);

impl fmt::Display for TuCOperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TuCOperatorKind {
    Source,
    Projection,
    Extend,
    Serialize,
    Sink,
}

impl fmt::Display for TuCOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TuCOperatorKind::Source => "Source",
            TuCOperatorKind::Projection => "Projection",
            TuCOperatorKind::Extend => "Extend",
            TuCOperatorKind::Serialize => "Serialize",
            TuCOperatorKind::Sink => "Sink",
        };
        f.write_str(s)
    }
}

/// Statement serialization format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TuCRdfFormat {
    #[default]
    NQuads,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TuCSinkTarget {
    #[default]
    StdOut,
}

/// Kind-specific parameters of an operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TuCOperatorParams {
    Source {
        source: String,
        location: String,
        format: TuCDataFormat,
        iterator: String,
        formulation: TuCReferenceFormulation,
        query: String,
    },
    Projection {
        unit: String,
    },
    Extend {
        column: String,
        combinator: TuCCombinator,
        operands: Vec<TuCOperand>,
    },
    Serialize {
        format: TuCRdfFormat,
        subject: TuCSubjectTemplate,
        statements: Vec<TuCStatementRule>,
    },
    Sink {
        target: TuCSinkTarget,
        format: TuCRdfFormat,
    },
}

impl TuCOperatorParams {
    #[allow(non_snake_case)]
    pub fn TuFKind(&self) -> TuCOperatorKind {
        match self {
            TuCOperatorParams::Source { .. } => TuCOperatorKind::Source,
            TuCOperatorParams::Projection { .. } => TuCOperatorKind::Projection,
            TuCOperatorParams::Extend { .. } => TuCOperatorKind::Extend,
            TuCOperatorParams::Serialize { .. } => TuCOperatorKind::Serialize,
            TuCOperatorParams::Sink { .. } => TuCOperatorKind::Sink,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuCOperator {
    pub id: TuCOperatorId,
    pub inputs: Vec<TuCOperatorId>,
    /// Columns produced, in order.
    pub schema: Vec<String>,
    pub params: TuCOperatorParams,
}

impl TuCOperator {
    #[allow(non_snake_case)]
    pub fn TuFKind(&self) -> TuCOperatorKind {
        self.params.TuFKind()
    }

    /// Stable display name such as `Extend_2`.
    #[allow(non_snake_case)]
    pub fn TuFName(&self) -> String {
        format!("{}_{}", self.TuFKind(), self.id)
    }
}

/// Operators created for one mapping unit, in creation order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuCUnitGroup {
    pub unit: String,
    pub operators: Vec<TuCOperatorId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuCPlan {
    pub operators: Vec<TuCOperator>,
    pub units: Vec<TuCUnitGroup>,
}

impl TuCPlan {
    #[allow(non_snake_case)]
    pub fn TuFNew() -> Self {
        Self::default()
    }

    /// Appends an operator with the next sequence id. Inputs must name
    /// operators that already exist.
    #[allow(non_snake_case)]
    pub fn TuFAddOperator(
        &mut self,
        inputs: Vec<TuCOperatorId>,
        schema: Vec<String>,
        params: TuCOperatorParams,
    ) -> Result<TuCOperatorId> {
        let id = TuCOperatorId(self.operators.len());
        if let Some(bad) = inputs.iter().find(|input| input.0 >= id.0) {
            return Err(TuCError::planner(format!(
                "{}_{} reads operator {} which does not exist yet",
                params.TuFKind(),
                id,
                bad
            )));
        }
        self.operators.push(TuCOperator {
            id,
            inputs,
            schema,
            params,
        });
        Ok(id)
    }

    #[allow(non_snake_case)]
    pub fn TuFOperator(&self, id: TuCOperatorId) -> Option<&TuCOperator> {
        self.operators.get(id.0).filter(|op| op.id == id)
    }

    /// Records `id` as part of `unit`'s sub-plan.
    #[allow(non_snake_case)]
    pub fn TuFAssign(&mut self, unit: &str, id: TuCOperatorId) {
        match self.units.iter_mut().find(|g| g.unit == unit) {
            Some(group) => group.operators.push(id),
            None => self.units.push(TuCUnitGroup {
                unit: unit.to_string(),
                operators: vec![id],
            }),
        }
    }

    #[allow(non_snake_case)]
    pub fn TuFUnitOperators(&self, unit: &str) -> Option<&[TuCOperatorId]> {
        self.units
            .iter()
            .find(|g| g.unit == unit)
            .map(|g| g.operators.as_slice())
    }

    /// Operators no other operator reads from.
    #[allow(non_snake_case)]
    pub fn TuFExitPoints(&self) -> Vec<TuCOperatorId> {
        let read: BTreeSet<TuCOperatorId> = self
            .operators
            .iter()
            .flat_map(|op| op.inputs.iter().copied())
            .collect();
        self.operators
            .iter()
            .map(|op| op.id)
            .filter(|id| !read.contains(id))
            .collect()
    }

    /// Kahn's algorithm; ties resolve to the lowest id.
    #[allow(non_snake_case)]
    pub fn TuFTopologicalSort(&self) -> Result<Vec<TuCOperatorId>> {
        let n = self.operators.len();
        let mut in_degree = vec![0usize; n];
        let mut readers: Vec<Vec<usize>> = vec![Vec::new(); n];
        for op in &self.operators {
            for input in &op.inputs {
                if input.0 >= n {
                    return Err(TuCError::planner(format!(
                        "{} reads unknown operator {}",
                        op.TuFName(),
                        input
                    )));
                }
                in_degree[op.id.0] += 1;
                readers[input.0].push(op.id.0);
            }
        }

        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut sorted = Vec::with_capacity(n);
        while let Some(i) = ready.pop_first() {
            sorted.push(TuCOperatorId(i));
            for &r in &readers[i] {
                in_degree[r] -= 1;
                if in_degree[r] == 0 {
                    ready.insert(r);
                }
            }
        }

        if sorted.len() != n {
            let stuck: Vec<String> = (0..n)
                .filter(|i| in_degree[*i] > 0)
                .map(|i| self.operators[i].TuFName())
                .collect();
            return Err(TuCError::planner(format!(
                "cycle detected involving operators: {}",
                stuck.join(", ")
            )));
        }
        Ok(sorted)
    }

    #[allow(non_snake_case)]
    pub fn TuFDetectCycles(&self) -> bool {
        self.TuFTopologicalSort().is_err()
    }

    /// Every operator `id` transitively reads from, ascending.
    #[allow(non_snake_case)]
    pub fn TuFInputClosure(&self, id: TuCOperatorId) -> Vec<TuCOperatorId> {
        let mut seen: BTreeSet<TuCOperatorId> = BTreeSet::new();
        let mut queue: VecDeque<TuCOperatorId> = VecDeque::new();
        if let Some(op) = self.TuFOperator(id) {
            queue.extend(op.inputs.iter().copied());
        }
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            if let Some(op) = self.TuFOperator(next) {
                queue.extend(op.inputs.iter().copied());
            }
        }
        seen.into_iter().collect()
    }

    /// Checks numbering and ordering: ids are 0..n without gaps and every
    /// input precedes its reader.
    #[allow(non_snake_case)]
    pub fn TuFValidate(&self) -> Result<()> {
        for (position, op) in self.operators.iter().enumerate() {
            if op.id.0 != position {
                return Err(TuCError::planner(format!(
                    "{} found at position {}",
                    op.TuFName(),
                    position
                )));
            }
            if let Some(bad) = op.inputs.iter().find(|input| input.0 >= op.id.0) {
                return Err(TuCError::planner(format!(
                    "{} reads operator {} created after it",
                    op.TuFName(),
                    bad
                )));
            }
        }
        self.TuFTopologicalSort().map(|_| ())
    }
}
