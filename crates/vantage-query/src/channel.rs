//! Boundary to the gateway that executes generated query descriptors.
//!
//! The loader never talks to a database driver. It builds an engine-shaped
//! descriptor, hands it to an [`ExecutionChannel`], and normalizes whatever
//! comes back. Channel implementations own transport, pooling, retries and
//! credentials; any failure on their side folds into the response's
//! `error_message` so the response type itself stays infallible.

use crate::collection::CollectionOptions;
use crate::error::{LoadError, Result};
use crate::types::{DataRow, DatabaseConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vantage_sqltree::Select;

/// One remote operation, tagged with its operation name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "kebab-case")]
pub enum ChannelRequest {
    /// Execute a relational select tree.
    SqlSelect {
        #[serde(flatten)]
        database_config: DatabaseConfig,
        select: Select,
    },
    /// Execute a document-engine options object.
    CollectionData {
        #[serde(flatten)]
        database_config: DatabaseConfig,
        options: CollectionOptions,
    },
}

impl ChannelRequest {
    /// Connection and database the request targets.
    pub fn database_config(&self) -> &DatabaseConfig {
        match self {
            ChannelRequest::SqlSelect {
                database_config, ..
            } => database_config,
            ChannelRequest::CollectionData {
                database_config, ..
            } => database_config,
        }
    }
}

/// Response from the execution channel.
///
/// Exactly one of the fields is meaningful per response: an engine-reported
/// failure, a row list, or a scalar count. [`ChannelResponse::into_rows`]
/// and [`ChannelResponse::into_count`] apply that reading, with the error
/// field taking precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<DataRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl ChannelResponse {
    pub fn rows(rows: Vec<DataRow>) -> Self {
        Self {
            rows: Some(rows),
            ..Default::default()
        }
    }

    pub fn count(count: u64) -> Self {
        Self {
            count: Some(count),
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Rows on success; the engine's message, verbatim, as an error
    /// otherwise. A success response without rows reads as empty.
    pub fn into_rows(self) -> Result<Vec<DataRow>> {
        if let Some(message) = self.error_message {
            return Err(LoadError::Engine(message));
        }
        Ok(self.rows.unwrap_or_default())
    }

    /// Scalar count on success; the engine's message, verbatim, as an error
    /// otherwise.
    pub fn into_count(self) -> Result<u64> {
        if let Some(message) = self.error_message {
            return Err(LoadError::Engine(message));
        }
        self.count
            .ok_or_else(|| LoadError::malformed_count("response carried no count"))
    }
}

/// Remote execution of query descriptors.
#[async_trait]
pub trait ExecutionChannel: Send + Sync {
    async fn execute(&self, request: ChannelRequest) -> ChannelResponse;
}
