//! Relational engine strategy.
//!
//! Every operation becomes a [`Select`] tree executed remotely through the
//! channel's `sql-select` operation. Counts come back as a result row, and
//! some drivers encode them as decimal strings, so results pass through
//! [`coerce_count`] before callers see them.

use crate::channel::{ChannelRequest, ExecutionChannel};
use crate::condition::build_sql_condition;
use crate::error::{LoadError, Result};
use crate::strategy::DataLoaderStrategy;
use crate::types::{coerce_count, DataRow, EngineType, LoadProps, GROUP_SIZE_FIELD};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use vantage_sqltree::{Expression, OrderByExpression, Select};

const COUNT_ALIAS: &str = "count";

/// Loads perspective data through a SQL-capable gateway.
pub struct SqlDbStrategy {
    channel: Arc<dyn ExecutionChannel>,
}

impl SqlDbStrategy {
    pub fn new(channel: Arc<dyn ExecutionChannel>) -> Self {
        Self { channel }
    }

    async fn execute_select(&self, props: &LoadProps, select: Select) -> Result<Vec<DataRow>> {
        let response = self
            .channel
            .execute(ChannelRequest::SqlSelect {
                database_config: props.database_config.clone(),
                select,
            })
            .await;
        response.into_rows()
    }
}

#[async_trait]
impl DataLoaderStrategy for SqlDbStrategy {
    fn engine_type(&self) -> EngineType {
        EngineType::SqlDb
    }

    async fn load_grouping(&self, props: &LoadProps) -> Result<Vec<DataRow>> {
        let select = build_grouping_select(props)?;
        debug!(
            "Loading group sizes, table={}, binding={}",
            props.pure_name,
            props.binding_columns.join(",")
        );

        let rows = self.execute_select(props, select).await?;
        rows.into_iter().map(normalize_group_row).collect()
    }

    async fn load_data(&self, props: &LoadProps) -> Result<Vec<DataRow>> {
        if let Some(columns) = &props.data_columns {
            if columns.is_empty() {
                return Ok(Vec::new());
            }
        }

        let select = build_data_select(props)?;
        debug!(
            "Loading data, table={}, range={:?}",
            props.pure_name, props.range
        );

        self.execute_select(props, select).await
    }

    async fn load_row_count(&self, props: &LoadProps) -> Result<u64> {
        let select = build_count_select(props)?;
        let rows = self.execute_select(props, select).await?;

        let row = rows
            .first()
            .ok_or_else(|| LoadError::malformed_count("count query returned no rows"))?;
        let value = row
            .get(COUNT_ALIAS)
            .ok_or_else(|| LoadError::malformed_count("count query returned no count column"))?;
        coerce_count(value)
    }
}

/// `COUNT(*)` projected under `alias`.
fn count_star(alias: &str) -> Expression {
    Expression::Call {
        func: "COUNT".to_string(),
        args: vec![Expression::Raw {
            sql: "*".to_string(),
            alias: None,
        }],
        alias: Some(alias.to_string()),
    }
}

/// Grouped select counting child rows per binding-column combination.
fn build_grouping_select(props: &LoadProps) -> Result<Select> {
    if props.binding_columns.is_empty() {
        return Err(LoadError::malformed_binding(
            "grouping load requires at least one binding column",
        ));
    }

    let source = props.source_name();
    let binding_columns: Vec<Expression> = props
        .binding_columns
        .iter()
        .map(|column| Expression::column(column, &source))
        .collect();

    let mut columns = vec![count_star(GROUP_SIZE_FIELD)];
    columns.extend(binding_columns.clone());

    let mut select = Select::new(source);
    select.columns = Some(columns);
    select.filter = build_sql_condition(props)?;
    select.group_by = Some(binding_columns);
    Ok(select)
}

/// Plain data select with projection, merged filter, ordering and page
/// window.
fn build_data_select(props: &LoadProps) -> Result<Select> {
    let source = props.source_name();
    let mut select = Select::new(source.clone());

    match &props.data_columns {
        Some(columns) => {
            select.columns = Some(
                columns
                    .iter()
                    .map(|column| Expression::column(column, &source))
                    .collect(),
            );
        }
        None => select.select_all = true,
    }

    select.filter = build_sql_condition(props)?;
    if !props.order_by.is_empty() {
        select.order_by = Some(
            props
                .order_by
                .iter()
                .map(|entry| OrderByExpression {
                    column_name: entry.column_name.clone(),
                    source: source.clone(),
                    direction: entry.direction,
                })
                .collect(),
        );
    }
    select.range = props.range;
    Ok(select)
}

/// `COUNT(*)` select over the merged filter. Ordering and range never
/// apply to counts.
fn build_count_select(props: &LoadProps) -> Result<Select> {
    let mut select = Select::new(props.source_name());
    select.columns = Some(vec![count_star(COUNT_ALIAS)]);
    select.filter = build_sql_condition(props)?;
    Ok(select)
}

/// Replaces the group-size field with its integer reading, so callers see
/// a number even when the driver reported text.
fn normalize_group_row(mut row: DataRow) -> Result<DataRow> {
    let value = row.get(GROUP_SIZE_FIELD).ok_or_else(|| {
        LoadError::malformed_count(format!("group row is missing {}", GROUP_SIZE_FIELD))
    })?;
    let count = coerce_count(value)?;
    row.insert(GROUP_SIZE_FIELD.to_string(), Value::from(count));
    Ok(row)
}
