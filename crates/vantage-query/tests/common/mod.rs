//! Shared test fixtures.
//!
//! [`FixtureChannel`] is an in-memory execution channel that evaluates both
//! descriptor families against the same tables, so tests can check that the
//! relational and the document strategy select the same logical rows. Two
//! quirks are deliberate: the relational side reports counts as decimal
//! strings, like stringly typed drivers do, and raw SQL fragments come back
//! as engine errors because the fixture has no SQL parser. Both exercise
//! response normalization in the loader.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use vantage_query::{
    ChannelRequest, ChannelResponse, CollectionOptions, Condition, DataRow, ExecutionChannel,
    Expression, OrderByExpression, Select, SortDirection,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builds a row from field/value pairs.
pub fn make_row(fields: &[(&str, Value)]) -> DataRow {
    let mut row = Map::new();
    for (key, value) in fields {
        row.insert((*key).to_string(), value.clone());
    }
    row
}

/// Orders of three customers holding 2, 0 and 5 rows respectively, spread
/// over two regions and three statuses.
pub fn orders_table() -> Vec<DataRow> {
    vec![
        make_row(&[
            ("id", json!(1)),
            ("customer_id", json!(1)),
            ("region", json!("eu")),
            ("status", json!("open")),
            ("amount", json!(250)),
        ]),
        make_row(&[
            ("id", json!(2)),
            ("customer_id", json!(1)),
            ("region", json!("eu")),
            ("status", json!("paid")),
            ("amount", json!(75)),
        ]),
        make_row(&[
            ("id", json!(3)),
            ("customer_id", json!(3)),
            ("region", json!("us")),
            ("status", json!("open")),
            ("amount", json!(120)),
        ]),
        make_row(&[
            ("id", json!(4)),
            ("customer_id", json!(3)),
            ("region", json!("us")),
            ("status", json!("open")),
            ("amount", json!(310)),
        ]),
        make_row(&[
            ("id", json!(5)),
            ("customer_id", json!(3)),
            ("region", json!("us")),
            ("status", json!("paid")),
            ("amount", json!(45)),
        ]),
        make_row(&[
            ("id", json!(6)),
            ("customer_id", json!(3)),
            ("region", json!("eu")),
            ("status", json!("open")),
            ("amount", json!(90)),
        ]),
        make_row(&[
            ("id", json!(7)),
            ("customer_id", json!(3)),
            ("region", json!("us")),
            ("status", json!("cancelled")),
            ("amount", json!(500)),
        ]),
    ]
}

/// Fixture channel preloaded with the orders table.
pub fn orders_channel() -> FixtureChannel {
    FixtureChannel::new().with_table("orders", orders_table())
}

/// In-memory dual-engine execution channel.
#[derive(Default)]
pub struct FixtureChannel {
    tables: HashMap<String, Vec<DataRow>>,
}

impl FixtureChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: &str, rows: Vec<DataRow>) -> Self {
        self.tables.insert(name.to_string(), rows);
        self
    }

    fn run_select(&self, select: &Select) -> ChannelResponse {
        let Some(rows) = self.tables.get(&select.from.pure_name) else {
            return ChannelResponse::error(format!("unknown table: {}", select.from));
        };
        let mut rows = rows.clone();

        if let Some(filter) = &select.filter {
            match filter_rows(rows, filter) {
                Ok(kept) => rows = kept,
                Err(message) => return ChannelResponse::error(message),
            }
        }

        if let Some(group_by) = &select.group_by {
            return group_rows(&rows, group_by, select);
        }

        if let Some(alias) = count_alias(select) {
            // counts travel as text, the way stringly typed drivers report them
            return ChannelResponse::rows(vec![make_row(&[(
                alias.as_str(),
                json!(rows.len().to_string()),
            )])]);
        }

        if let Some(order_by) = &select.order_by {
            sort_rows(&mut rows, order_by);
        }
        if let Some(range) = select.range {
            rows = rows
                .into_iter()
                .skip(range.offset as usize)
                .take(range.limit as usize)
                .collect();
        }
        ChannelResponse::rows(project_rows(rows, select))
    }

    fn run_collection(&self, options: &CollectionOptions) -> ChannelResponse {
        let Some(rows) = self.tables.get(&options.pure_name) else {
            return ChannelResponse::error(format!("unknown collection: {}", options.pure_name));
        };
        let mut rows = rows.clone();

        if let Some(pipeline) = &options.aggregate {
            return run_pipeline(rows, pipeline);
        }

        if let Some(condition) = &options.condition {
            match filter_documents(rows, condition) {
                Ok(kept) => rows = kept,
                Err(message) => return ChannelResponse::error(message),
            }
        }

        if options.count_documents {
            return ChannelResponse::count(rows.len() as u64);
        }

        if let Some(sort) = &options.sort {
            sort_documents(&mut rows, sort);
        }
        if let Some(skip) = options.skip {
            rows = rows.into_iter().skip(skip as usize).collect();
        }
        if let Some(limit) = options.limit {
            rows.truncate(limit as usize);
        }
        ChannelResponse::rows(rows)
    }
}

#[async_trait]
impl ExecutionChannel for FixtureChannel {
    async fn execute(&self, request: ChannelRequest) -> ChannelResponse {
        match request {
            ChannelRequest::SqlSelect { select, .. } => self.run_select(&select),
            ChannelRequest::CollectionData { options, .. } => self.run_collection(&options),
        }
    }
}

fn count_alias(select: &Select) -> Option<String> {
    select.columns.as_ref()?.iter().find_map(|column| match column {
        Expression::Call { func, alias, .. } if func == "COUNT" => {
            Some(alias.clone().unwrap_or_else(|| "count".to_string()))
        }
        _ => None,
    })
}

fn filter_rows(rows: Vec<DataRow>, condition: &Condition) -> Result<Vec<DataRow>, String> {
    let mut kept = Vec::new();
    for row in rows {
        if matches_condition(&row, condition)? {
            kept.push(row);
        }
    }
    Ok(kept)
}

fn matches_condition(row: &DataRow, condition: &Condition) -> Result<bool, String> {
    match condition {
        Condition::And { conditions } => {
            for clause in conditions {
                if !matches_condition(row, clause)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::Or { conditions } => {
            for clause in conditions {
                if matches_condition(row, clause)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Condition::In { expr, values } => Ok(values.contains(&eval_expression(row, expr)?)),
        Condition::Equal { expr, value } => Ok(eval_expression(row, expr)? == *value),
        Condition::Raw { sql } => Err(format!("fixture cannot evaluate raw SQL: {}", sql)),
    }
}

fn eval_expression(row: &DataRow, expr: &Expression) -> Result<Value, String> {
    match expr {
        Expression::Column { column_name, .. } => {
            Ok(row.get(column_name).cloned().unwrap_or(Value::Null))
        }
        other => Err(format!("fixture cannot evaluate expression: {:?}", other)),
    }
}

fn group_rows(rows: &[DataRow], group_by: &[Expression], select: &Select) -> ChannelResponse {
    let keys: Vec<String> = group_by
        .iter()
        .filter_map(|expr| match expr {
            Expression::Column { column_name, .. } => Some(column_name.clone()),
            _ => None,
        })
        .collect();
    let alias = count_alias(select).unwrap_or_else(|| "count".to_string());

    let mut groups: Vec<(Vec<Value>, u64)> = Vec::new();
    for row in rows {
        let key: Vec<Value> = keys
            .iter()
            .map(|name| row.get(name).cloned().unwrap_or(Value::Null))
            .collect();
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, count)) => *count += 1,
            None => groups.push((key, 1)),
        }
    }

    let result = groups
        .into_iter()
        .map(|(key, count)| {
            let mut row = Map::new();
            row.insert(alias.clone(), json!(count.to_string()));
            for (name, value) in keys.iter().zip(key) {
                row.insert(name.clone(), value);
            }
            row
        })
        .collect();
    ChannelResponse::rows(result)
}

fn sort_rows(rows: &mut [DataRow], order_by: &[OrderByExpression]) {
    rows.sort_by(|left, right| {
        for entry in order_by {
            let lhs = left.get(&entry.column_name).cloned().unwrap_or(Value::Null);
            let rhs = right.get(&entry.column_name).cloned().unwrap_or(Value::Null);
            let mut ordering = compare_values(&lhs, &rhs);
            if entry.direction == SortDirection::Desc {
                ordering = ordering.reverse();
            }
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn project_rows(rows: Vec<DataRow>, select: &Select) -> Vec<DataRow> {
    if select.select_all {
        return rows;
    }
    let Some(columns) = &select.columns else {
        return rows;
    };
    let names: Vec<&String> = columns
        .iter()
        .filter_map(|column| match column {
            Expression::Column { column_name, .. } => Some(column_name),
            _ => None,
        })
        .collect();

    rows.into_iter()
        .map(|row| {
            let mut projected = Map::new();
            for name in &names {
                if let Some(value) = row.get(*name) {
                    projected.insert((*name).clone(), value.clone());
                }
            }
            projected
        })
        .collect()
}

fn filter_documents(rows: Vec<DataRow>, condition: &Value) -> Result<Vec<DataRow>, String> {
    let mut kept = Vec::new();
    for row in rows {
        if matches_document(&row, condition)? {
            kept.push(row);
        }
    }
    Ok(kept)
}

fn matches_document(row: &DataRow, condition: &Value) -> Result<bool, String> {
    let Value::Object(clauses) = condition else {
        return Err(format!("unsupported filter: {}", condition));
    };
    for (key, spec) in clauses {
        let matched = match key.as_str() {
            "$and" => {
                let list = spec
                    .as_array()
                    .ok_or_else(|| format!("$and expects an array: {}", spec))?;
                let mut all = true;
                for clause in list {
                    if !matches_document(row, clause)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let list = spec
                    .as_array()
                    .ok_or_else(|| format!("$or expects an array: {}", spec))?;
                let mut any = false;
                for clause in list {
                    if matches_document(row, clause)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            field => {
                let actual = row.get(field).cloned().unwrap_or(Value::Null);
                match spec {
                    Value::Object(operators) if operators.contains_key("$in") => {
                        let list = operators["$in"].as_array().ok_or_else(|| {
                            format!("$in expects an array: {}", operators["$in"])
                        })?;
                        list.contains(&actual)
                    }
                    Value::Object(operators) => {
                        return Err(format!(
                            "unsupported operators for {}: {:?}",
                            field,
                            operators.keys().collect::<Vec<_>>()
                        ));
                    }
                    expected => actual == *expected,
                }
            }
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn sort_documents(rows: &mut [DataRow], sort: &Map<String, Value>) {
    rows.sort_by(|left, right| {
        for (column, direction) in sort {
            let lhs = left.get(column).cloned().unwrap_or(Value::Null);
            let rhs = right.get(column).cloned().unwrap_or(Value::Null);
            let mut ordering = compare_values(&lhs, &rhs);
            if direction.as_i64() == Some(-1) {
                ordering = ordering.reverse();
            }
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn run_pipeline(rows: Vec<DataRow>, pipeline: &[Value]) -> ChannelResponse {
    let mut rows = rows;
    for stage in pipeline {
        let Value::Object(spec) = stage else {
            return ChannelResponse::error(format!("unsupported pipeline stage: {}", stage));
        };
        if let Some(condition) = spec.get("$match") {
            match filter_documents(rows, condition) {
                Ok(kept) => rows = kept,
                Err(message) => return ChannelResponse::error(message),
            }
        } else if let Some(group) = spec.get("$group") {
            match group_documents(&rows, group) {
                Ok(grouped) => rows = grouped,
                Err(message) => return ChannelResponse::error(message),
            }
        } else {
            return ChannelResponse::error(format!(
                "unsupported pipeline stage: {:?}",
                spec.keys().collect::<Vec<_>>()
            ));
        }
    }
    ChannelResponse::rows(rows)
}

fn group_documents(rows: &[DataRow], group: &Value) -> Result<Vec<DataRow>, String> {
    let id_spec = group
        .get("_id")
        .and_then(Value::as_object)
        .ok_or_else(|| format!("$group expects an _id document: {}", group))?;

    let mut groups: Vec<(Map<String, Value>, u64)> = Vec::new();
    for row in rows {
        let mut id = Map::new();
        for (out_key, field_ref) in id_spec {
            let field = field_ref
                .as_str()
                .and_then(|text| text.strip_prefix('$'))
                .ok_or_else(|| format!("unsupported _id expression: {}", field_ref))?;
            id.insert(out_key.clone(), row.get(field).cloned().unwrap_or(Value::Null));
        }
        match groups.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, count)) => *count += 1,
            None => groups.push((id, 1)),
        }
    }

    Ok(groups
        .into_iter()
        .map(|(id, count)| {
            let mut row = Map::new();
            row.insert("_id".to_string(), Value::Object(id));
            row.insert("count".to_string(), json!(count));
            row
        })
        .collect())
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(lhs), Value::Number(rhs)) => lhs
            .as_f64()
            .partial_cmp(&rhs.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(lhs), Value::String(rhs)) => lhs.cmp(rhs),
        _ => left.to_string().cmp(&right.to_string()),
    }
}
