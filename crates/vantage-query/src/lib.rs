//! # vantage-query
//!
//! Cross-engine data loader for hierarchical "perspective" browsing.
//!
//! One uniform request shape, [`LoadProps`], describes what to fetch: a
//! table or collection, a master-detail binding, a filter, a projection,
//! an ordering and a page window. The loader translates it into the query
//! descriptor the target engine family understands, hands the descriptor
//! to an external [`ExecutionChannel`], and normalizes the response. It
//! never opens a database connection itself.
//!
//! ## Architecture
//!
//! - **[`PerspectiveDataLoader`]**: facade routing each request to its
//!   engine strategy
//! - **[`DataLoaderStrategy`]**: the three load operations, one
//!   implementation per engine family
//! - **[`build_sql_condition`] / [`build_document_condition`]**: pure
//!   builders merging the caller filter with the binding restriction
//! - **[`ExecutionChannel`]**: boundary to the gateway that actually runs
//!   descriptors
//!
//! Three load operations exist, uniform across engines:
//!
//! - **grouping**: child-row counts per distinct binding-column
//!   combination, reported under the `_perspective_group_size_` field
//! - **data**: rows for a filter, projection, ordering and page window
//! - **row count**: total matching rows, ignoring ordering and paging
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vantage_query::{
//!     DatabaseConfig, EngineType, ExecutionChannel, LoadProps, OrderByColumn,
//!     PerspectiveDataLoader,
//! };
//!
//! # async fn example(channel: Arc<dyn ExecutionChannel>) -> vantage_query::Result<()> {
//! let loader = PerspectiveDataLoader::new(channel);
//!
//! // Orders of customers 1 and 2, newest first, one page of 100.
//! let props = LoadProps::new(
//!     EngineType::SqlDb,
//!     "orders",
//!     DatabaseConfig::new("conn-1", "shop"),
//! )
//! .with_schema("public")
//! .with_binding(
//!     vec!["customer_id".to_string()],
//!     vec![vec![1.into()], vec![2.into()]],
//! )
//! .with_order_by(vec![OrderByColumn::desc("created_at")])
//! .with_range(0, 100);
//!
//! let rows = loader.load_data(&props).await?;
//! let total = loader.load_row_count(&props).await?;
//! assert!(total >= rows.len() as u64);
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod collection;
pub mod condition;
pub mod docdb;
pub mod error;
pub mod loader;
pub mod sqldb;
pub mod strategy;
pub mod types;

// Re-export commonly used types
pub use channel::{ChannelRequest, ChannelResponse, ExecutionChannel};
pub use collection::CollectionOptions;
pub use condition::{build_document_condition, build_sql_condition};
pub use docdb::DocDbStrategy;
pub use error::{LoadError, Result};
pub use loader::PerspectiveDataLoader;
pub use sqldb::SqlDbStrategy;
pub use strategy::DataLoaderStrategy;
pub use types::{
    coerce_count, DataRow, DatabaseConfig, EngineType, LoadProps, OrderByColumn, GROUP_SIZE_FIELD,
};

// The select-tree descriptor language is part of the public surface
// (LoadProps carries a Condition), so re-export it wholesale.
pub use vantage_sqltree::{
    Condition, Expression, OrderByExpression, Range, Select, SortDirection, SourceName,
};
