//! Document engine strategy.
//!
//! Data loads and row counts travel as plain [`CollectionOptions`] through
//! the channel's `collection-data` operation; grouping loads run an
//! aggregation pipeline instead. Group results come back with the grouping
//! keys nested under `_id`, so they are flattened before callers see them.

use crate::channel::{ChannelRequest, ChannelResponse, ExecutionChannel};
use crate::collection::CollectionOptions;
use crate::condition::build_document_condition;
use crate::error::{LoadError, Result};
use crate::strategy::DataLoaderStrategy;
use crate::types::{coerce_count, DataRow, EngineType, LoadProps, GROUP_SIZE_FIELD};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;
use vantage_sqltree::SortDirection;

/// Loads perspective data through a document-engine gateway.
pub struct DocDbStrategy {
    channel: Arc<dyn ExecutionChannel>,
}

impl DocDbStrategy {
    pub fn new(channel: Arc<dyn ExecutionChannel>) -> Self {
        Self { channel }
    }

    async fn execute_options(
        &self,
        props: &LoadProps,
        options: CollectionOptions,
    ) -> ChannelResponse {
        self.channel
            .execute(ChannelRequest::CollectionData {
                database_config: props.database_config.clone(),
                options,
            })
            .await
    }
}

#[async_trait]
impl DataLoaderStrategy for DocDbStrategy {
    fn engine_type(&self) -> EngineType {
        EngineType::DocDb
    }

    async fn load_grouping(&self, props: &LoadProps) -> Result<Vec<DataRow>> {
        let options = build_grouping_options(props)?;
        debug!(
            "Loading group sizes, collection={}, binding={}",
            props.pure_name,
            props.binding_columns.join(",")
        );

        let rows = self.execute_options(props, options).await.into_rows()?;
        rows.into_iter().map(flatten_group_row).collect()
    }

    async fn load_data(&self, props: &LoadProps) -> Result<Vec<DataRow>> {
        if let Some(columns) = &props.data_columns {
            if columns.is_empty() {
                return Ok(Vec::new());
            }
        }

        let options = build_load_options(props, true)?;
        debug!(
            "Loading data, collection={}, range={:?}",
            props.pure_name, props.range
        );

        self.execute_options(props, options).await.into_rows()
    }

    async fn load_row_count(&self, props: &LoadProps) -> Result<u64> {
        let mut options = build_load_options(props, false)?;
        options.count_documents = true;
        self.execute_options(props, options).await.into_count()
    }
}

/// Filtered-read options. Sort and the skip/limit window apply to data
/// loads only; counts pass `paged: false` and see neither.
fn build_load_options(props: &LoadProps, paged: bool) -> Result<CollectionOptions> {
    let mut options = CollectionOptions::new(&props.pure_name);
    options.condition = build_document_condition(props)?;

    if paged {
        if let Some(range) = &props.range {
            options.skip = Some(range.offset);
            options.limit = Some(range.limit);
        }
        if !props.order_by.is_empty() {
            let mut sort = Map::new();
            for entry in &props.order_by {
                let direction = match entry.direction {
                    SortDirection::Asc => 1,
                    SortDirection::Desc => -1,
                };
                sort.insert(entry.column_name.clone(), json!(direction));
            }
            options.sort = Some(sort);
        }
    }
    Ok(options)
}

/// Aggregation options counting child documents per binding-column
/// combination. The `$match` stage is present only when the request has a
/// merged filter.
fn build_grouping_options(props: &LoadProps) -> Result<CollectionOptions> {
    if props.binding_columns.is_empty() {
        return Err(LoadError::malformed_binding(
            "grouping load requires at least one binding column",
        ));
    }

    let mut group_id = Map::new();
    for column in &props.binding_columns {
        group_id.insert(column.clone(), Value::String(format!("${}", column)));
    }

    let mut pipeline = Vec::new();
    if let Some(condition) = build_document_condition(props)? {
        pipeline.push(json!({ "$match": condition }));
    }
    pipeline.push(json!({
        "$group": {
            "_id": group_id,
            "count": { "$sum": 1 }
        }
    }));

    let mut options = CollectionOptions::new(&props.pure_name);
    options.aggregate = Some(pipeline);
    Ok(options)
}

/// Lifts the grouping keys out of `_id` and renames the aggregate count,
/// so grouping rows look the same whichever engine produced them.
fn flatten_group_row(row: DataRow) -> Result<DataRow> {
    let mut flat = Map::new();
    if let Some(Value::Object(id)) = row.get("_id") {
        for (key, value) in id {
            flat.insert(key.clone(), value.clone());
        }
    }

    let count = row
        .get("count")
        .ok_or_else(|| LoadError::malformed_count("group row is missing count"))?;
    flat.insert(GROUP_SIZE_FIELD.to_string(), Value::from(coerce_count(count)?));
    Ok(flat)
}
