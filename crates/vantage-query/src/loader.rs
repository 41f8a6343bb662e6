//! Cross-engine load facade.

use crate::channel::ExecutionChannel;
use crate::docdb::DocDbStrategy;
use crate::error::Result;
use crate::sqldb::SqlDbStrategy;
use crate::strategy::DataLoaderStrategy;
use crate::types::{DataRow, EngineType, LoadProps};
use std::sync::Arc;

/// Entry point for perspective loads.
///
/// Holds one strategy per engine family, all sharing the same execution
/// channel, and routes each request by its `engine_type`. The loader keeps
/// no per-request state, so a single instance can serve concurrent loads.
pub struct PerspectiveDataLoader {
    sqldb: SqlDbStrategy,
    docdb: DocDbStrategy,
}

impl PerspectiveDataLoader {
    pub fn new(channel: Arc<dyn ExecutionChannel>) -> Self {
        Self {
            sqldb: SqlDbStrategy::new(channel.clone()),
            docdb: DocDbStrategy::new(channel),
        }
    }

    /// Strategy serving the given engine family.
    pub fn strategy(&self, engine_type: EngineType) -> &dyn DataLoaderStrategy {
        match engine_type {
            EngineType::SqlDb => &self.sqldb,
            EngineType::DocDb => &self.docdb,
        }
    }

    /// Child-row counts per distinct binding-column combination.
    pub async fn load_grouping(&self, props: &LoadProps) -> Result<Vec<DataRow>> {
        self.strategy(props.engine_type).load_grouping(props).await
    }

    /// Rows for the requested filter, projection, ordering and page window.
    pub async fn load_data(&self, props: &LoadProps) -> Result<Vec<DataRow>> {
        self.strategy(props.engine_type).load_data(props).await
    }

    /// Total number of rows matching the request's filter.
    pub async fn load_row_count(&self, props: &LoadProps) -> Result<u64> {
        self.strategy(props.engine_type).load_row_count(props).await
    }
}
