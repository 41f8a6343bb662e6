//! Query descriptor for document engines.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Options object executed by a document-engine gateway.
///
/// One of three shapes: a filtered read (`condition`/`sort`/`skip`/`limit`),
/// an aggregation `pipeline`, or a count when `count_documents` is set.
/// Absent parts are omitted from the wire form entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionOptions {
    /// Collection name.
    pub pure_name: String,
    /// Filter document in the engine's native operator syntax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
    /// Aggregation pipeline stages. When present the gateway runs the
    /// pipeline and ignores the plain-read fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<Vec<Value>>,
    /// Column to direction map (`1` ascending, `-1` descending), entries in
    /// sort-priority order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Return the matching-document count instead of documents.
    #[serde(default, skip_serializing_if = "is_false")]
    pub count_documents: bool,
}

impl CollectionOptions {
    pub fn new(pure_name: impl Into<String>) -> Self {
        Self {
            pure_name: pure_name.into(),
            ..Default::default()
        }
    }
}
