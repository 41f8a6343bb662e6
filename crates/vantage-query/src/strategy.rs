//! Per-engine strategy seam.

use crate::error::Result;
use crate::types::{DataRow, EngineType, LoadProps};
use async_trait::async_trait;

/// One engine family's implementation of the three load operations.
///
/// Strategies are stateless between calls. They hold only their
/// execution-channel handle, so one instance serves any number of
/// concurrent loads.
#[async_trait]
pub trait DataLoaderStrategy: Send + Sync {
    /// Engine family this strategy serves.
    fn engine_type(&self) -> EngineType;

    /// Child-row counts per distinct binding-column combination. Each
    /// result row carries the binding columns plus the group size under
    /// [`GROUP_SIZE_FIELD`](crate::types::GROUP_SIZE_FIELD).
    async fn load_grouping(&self, props: &LoadProps) -> Result<Vec<DataRow>>;

    /// Rows matching the merged filter, after projection, ordering and the
    /// page window.
    async fn load_data(&self, props: &LoadProps) -> Result<Vec<DataRow>>;

    /// Total number of rows matching the merged filter. Ordering and the
    /// page window do not apply here.
    async fn load_row_count(&self, props: &LoadProps) -> Result<u64>;
}
