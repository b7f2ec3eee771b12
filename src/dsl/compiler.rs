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

//! Compiles a normalized document into an algebra plan.
//!
//! Per mapping unit the chain is Source, Projection, one Extend per
//! expression, Serialize and Sink. Ids are global and follow creation
//! order, so identical documents always yield identical plans.

use std::collections::HashMap;

use crate::dag::{TuCOperatorId, TuCOperatorParams, TuCPlan, TuCRdfFormat, TuCSinkTarget};
use crate::dsl::ir::{TuCIterator, TuCOperand, TuCTermValue};
use crate::dsl::normalizer::{TuCNormalizedDocument, TuCNormalizedUnit};
use crate::dsl::template::TuCTemplate;
use crate::errors::{Result, TuCError};

#[derive(Clone, Debug)]
pub struct TuCPlanCompiler {
    share_sources: bool,
}

impl Default for TuCPlanCompiler {
    fn default() -> Self {
        Self { share_sources: true }
    }
}

impl TuCPlanCompiler {
    #[allow(non_snake_case)]
    pub fn TuFNew() -> Self {
        Self::default()
    }

    /// When set, units reading the same iterator share one Source operator;
    /// otherwise each unit gets its own, emitted right before its Projection.
    #[allow(non_snake_case)]
    pub fn TuFShareSources(mut self, share: bool) -> Self {
        self.share_sources = share;
        self
    }

    #[allow(non_snake_case)]
    pub fn TuFCompile(&self, doc: &TuCNormalizedDocument) -> Result<TuCPlan> {
        let mut plan = TuCPlan::TuFNew();
        let mut shared: HashMap<&str, TuCOperatorId> = HashMap::new();

        for unit in &doc.units {
            if doc.TuFIterator(&unit.iterator).is_none() {
                return Err(TuCError::planner(format!(
                    "unit '{}' reads unknown iterator '{}'",
                    unit.name, unit.iterator
                )));
            }
        }

        if self.share_sources {
            for iterator in &doc.iterators {
                if doc.units.iter().any(|u| u.iterator == iterator.name) {
                    let id = self.source(doc, &mut plan, iterator)?;
                    shared.insert(iterator.name.as_str(), id);
                }
            }
        }

        for unit in &doc.units {
            let source_id = match shared.get(unit.iterator.as_str()) {
                Some(id) => *id,
                None => {
                    let iterator = doc
                        .TuFIterator(&unit.iterator)
                        .ok_or_else(|| TuCError::planner(format!("unknown iterator '{}'", unit.iterator)))?;
                    self.source(doc, &mut plan, iterator)?
                }
            };
            plan.TuFAssign(&unit.name, source_id);
            self.unit(&mut plan, unit, source_id)?;
        }

        plan.TuFValidate()?;
        log::debug!(
            "planner: {} operators for {} units",
            plan.operators.len(),
            plan.units.len()
        );
        Ok(plan)
    }

    fn source(
        &self,
        doc: &TuCNormalizedDocument,
        plan: &mut TuCPlan,
        iterator: &TuCIterator,
    ) -> Result<TuCOperatorId> {
        let source = doc.TuFSource(&iterator.source).ok_or_else(|| {
            TuCError::planner(format!(
                "iterator '{}' reads unknown source '{}'",
                iterator.name, iterator.source
            ))
        })?;
        plan.TuFAddOperator(
            Vec::new(),
            iterator.fields.iter().map(|f| f.name.clone()).collect(),
            TuCOperatorParams::Source {
                source: source.name.clone(),
                location: source.location.clone(),
                format: source.format,
                iterator: iterator.name.clone(),
                formulation: iterator.formulation,
                query: iterator.query.clone(),
            },
        )
    }

    fn unit(&self, plan: &mut TuCPlan, unit: &TuCNormalizedUnit, source_id: TuCOperatorId) -> Result<()> {
        let available = plan
            .TuFOperator(source_id)
            .map(|op| op.schema.clone())
            .unwrap_or_default();
        for field in &unit.fields {
            if !available.contains(field) {
                return Err(TuCError::planner(format!(
                    "unit '{}' projects '{}' which its source does not produce",
                    unit.name, field
                )));
            }
        }

        let mut schema = unit.fields.clone();
        let mut last = plan.TuFAddOperator(
            vec![source_id],
            schema.clone(),
            TuCOperatorParams::Projection {
                unit: unit.name.clone(),
            },
        )?;
        plan.TuFAssign(&unit.name, last);

        for expression in &unit.expressions {
            for operand in &expression.operands {
                if let TuCOperand::Reference(column) = operand {
                    require_column(&schema, column, &expression.name)?;
                }
            }
            if schema.contains(&expression.name) {
                return Err(TuCError::planner(format!(
                    "column '{}' is produced twice in unit '{}'",
                    expression.name, unit.name
                )));
            }
            schema.push(expression.name.clone());
            last = plan.TuFAddOperator(
                vec![last],
                schema.clone(),
                TuCOperatorParams::Extend {
                    column: expression.name.clone(),
                    combinator: expression.combinator,
                    operands: expression.operands.clone(),
                },
            )?;
            plan.TuFAssign(&unit.name, last);
        }

        for placeholder in placeholders(&unit.subject.template)? {
            require_column(&schema, &placeholder, &format!("subject of unit '{}'", unit.name))?;
        }
        for rule in &unit.rules {
            let columns = match &rule.object.value {
                TuCTermValue::Reference(column) => vec![column.clone()],
                TuCTermValue::Template(template) => placeholders(template)?,
                TuCTermValue::Constant(_) => Vec::new(),
            };
            for column in columns {
                require_column(&schema, &column, &format!("rule <{}>", rule.predicate))?;
            }
        }

        let mut statement_schema: Vec<String> = ["subject", "predicate", "object"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        if unit.rules.iter().any(|r| r.object.datatype.is_some()) {
            statement_schema.push("datatype".to_string());
        }
        if unit.rules.iter().any(|r| r.object.language.is_some()) {
            statement_schema.push("language".to_string());
        }

        let serialize = plan.TuFAddOperator(
            vec![last],
            statement_schema,
            TuCOperatorParams::Serialize {
                format: TuCRdfFormat::NQuads,
                subject: unit.subject.clone(),
                statements: unit.rules.clone(),
            },
        )?;
        plan.TuFAssign(&unit.name, serialize);

        let sink = plan.TuFAddOperator(
            vec![serialize],
            Vec::new(),
            TuCOperatorParams::Sink {
                target: TuCSinkTarget::StdOut,
                format: TuCRdfFormat::NQuads,
            },
        )?;
        plan.TuFAssign(&unit.name, sink);
        Ok(())
    }
}

fn require_column(schema: &[String], column: &str, user: &str) -> Result<()> {
    if schema.iter().any(|c| c == column) {
        Ok(())
    } else {
        Err(TuCError::planner(format!(
            "{} needs column '{}' which is not available",
            user, column
        )))
    }
}

fn placeholders(template: &str) -> Result<Vec<String>> {
    let parsed = TuCTemplate::TuFParse(template).map_err(TuCError::planner)?;
    Ok(parsed.TuFPlaceholders().into_iter().map(str::to_string).collect())
}
