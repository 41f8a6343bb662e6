//! Merged-filter construction.
//!
//! Both builders are pure: the same [`LoadProps`] always yields the same
//! filter, and nothing here touches the execution channel. A load's
//! effective filter is the caller-supplied condition combined with the
//! binding restriction derived from `binding_columns`/`binding_values`.
//!
//! Binding encodings:
//!
//! - one binding column: membership of the column in the distinct set of
//!   first tuple elements
//! - several binding columns: a disjunction of per-tuple equality
//!   conjunctions, over the distinct tuples
//! - no parent tuples at all: an empty membership set, which matches
//!   nothing (children of no parents)

use crate::error::{LoadError, Result};
use crate::types::LoadProps;
use serde_json::{json, Map, Value};
use vantage_sqltree::{Condition, Expression};

/// Merged relational filter, absent when the request has neither a caller
/// condition nor binding columns.
///
/// When only one part is present it is returned unchanged, not wrapped.
pub fn build_sql_condition(props: &LoadProps) -> Result<Option<Condition>> {
    let mut conditions = Vec::new();
    if let Some(condition) = &props.sql_condition {
        conditions.push(condition.clone());
    }
    if let Some(condition) = build_sql_binding(props)? {
        conditions.push(condition);
    }
    Ok(match conditions.len() {
        0 => None,
        1 => conditions.pop(),
        _ => Some(Condition::and(conditions)),
    })
}

/// Merged document filter, same combination rules as the relational
/// variant but expressed with `$and`/`$or`/`$in` operators.
pub fn build_document_condition(props: &LoadProps) -> Result<Option<Value>> {
    let mut conditions = Vec::new();
    if let Some(condition) = &props.document_condition {
        conditions.push(condition.clone());
    }
    if let Some(condition) = build_document_binding(props)? {
        conditions.push(condition);
    }
    Ok(match conditions.len() {
        0 => None,
        1 => conditions.pop(),
        _ => Some(json!({ "$and": conditions })),
    })
}

fn build_sql_binding(props: &LoadProps) -> Result<Option<Condition>> {
    if props.binding_columns.is_empty() {
        return Ok(None);
    }
    let source = props.source_name();

    if props.binding_values.is_empty() || props.binding_columns.len() == 1 {
        let values = distinct_first_values(&props.binding_values)?;
        return Ok(Some(Condition::is_in(
            Expression::column(&props.binding_columns[0], &source),
            values,
        )));
    }

    let tuples = distinct_tuples(&props.binding_columns, &props.binding_values)?;
    let disjuncts = tuples
        .into_iter()
        .map(|tuple| {
            Condition::and(
                props
                    .binding_columns
                    .iter()
                    .zip(tuple)
                    .map(|(column, value)| {
                        Condition::equal(Expression::column(column, &source), value)
                    })
                    .collect(),
            )
        })
        .collect();
    Ok(Some(Condition::or(disjuncts)))
}

fn build_document_binding(props: &LoadProps) -> Result<Option<Value>> {
    if props.binding_columns.is_empty() {
        return Ok(None);
    }

    if props.binding_values.is_empty() || props.binding_columns.len() == 1 {
        let values = distinct_first_values(&props.binding_values)?;
        return Ok(Some(membership(&props.binding_columns[0], values)));
    }

    let tuples = distinct_tuples(&props.binding_columns, &props.binding_values)?;
    let disjuncts: Vec<Value> = tuples
        .into_iter()
        .map(|tuple| {
            let conjuncts: Vec<Value> = props
                .binding_columns
                .iter()
                .zip(tuple)
                .map(|(column, value)| equality(column, value))
                .collect();
            json!({ "$and": conjuncts })
        })
        .collect();
    Ok(Some(json!({ "$or": disjuncts })))
}

/// Distinct first elements of the binding tuples, first-seen order.
fn distinct_first_values(binding_values: &[Vec<Value>]) -> Result<Vec<Value>> {
    let mut values: Vec<Value> = Vec::new();
    for tuple in binding_values {
        let first = tuple
            .first()
            .ok_or_else(|| LoadError::malformed_binding("binding tuple is empty"))?;
        if !values.contains(first) {
            values.push(first.clone());
        }
    }
    Ok(values)
}

/// Distinct binding tuples, first-seen order. Every tuple must match the
/// binding-column arity.
fn distinct_tuples(columns: &[String], binding_values: &[Vec<Value>]) -> Result<Vec<Vec<Value>>> {
    let mut tuples: Vec<Vec<Value>> = Vec::new();
    for tuple in binding_values {
        if tuple.len() != columns.len() {
            return Err(LoadError::malformed_binding(format!(
                "binding tuple has {} values for {} binding columns",
                tuple.len(),
                columns.len()
            )));
        }
        if !tuples.contains(tuple) {
            tuples.push(tuple.clone());
        }
    }
    Ok(tuples)
}

fn membership(column: &str, values: Vec<Value>) -> Value {
    let mut filter = Map::new();
    filter.insert(column.to_string(), json!({ "$in": values }));
    Value::Object(filter)
}

fn equality(column: &str, value: Value) -> Value {
    let mut filter = Map::new();
    filter.insert(column.to_string(), value);
    Value::Object(filter)
}
