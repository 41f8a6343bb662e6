//! Core types shared by the load operations.

use crate::error::{LoadError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use vantage_sqltree::{Condition, Range, SortDirection, SourceName};

/// Field carrying the per-group child-row count in grouping results.
///
/// The name is deliberately unlikely to collide with real column names,
/// since grouping rows mix this field with the binding columns.
pub const GROUP_SIZE_FIELD: &str = "_perspective_group_size_";

/// One result row, as an ordered JSON object.
pub type DataRow = serde_json::Map<String, Value>;

/// Engine family a load request targets.
///
/// The set is closed: unknown tags are rejected when the value is parsed,
/// whether through [`FromStr`] or serde, so dispatch inside the loader
/// never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EngineType {
    /// Table-oriented engine driven by select trees.
    SqlDb,
    /// Collection-oriented engine driven by filter/pipeline options.
    DocDb,
}

impl FromStr for EngineType {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sqldb" => Ok(EngineType::SqlDb),
            "docdb" => Ok(EngineType::DocDb),
            other => Err(LoadError::UnsupportedEngine(other.to_string())),
        }
    }
}

impl TryFrom<String> for EngineType {
    type Error = LoadError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<EngineType> for String {
    fn from(value: EngineType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineType::SqlDb => write!(f, "sqldb"),
            EngineType::DocDb => write!(f, "docdb"),
        }
    }
}

/// Identity of the connection and database a request executes against.
///
/// The loader never interprets these values; they ride along to the
/// execution channel untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub connection_id: String,
    pub database: String,
}

impl DatabaseConfig {
    pub fn new(connection_id: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
            database: database.into(),
        }
    }
}

/// One entry of the requested row ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByColumn {
    pub column_name: String,
    pub direction: SortDirection,
}

impl OrderByColumn {
    pub fn asc(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Uniform description of one load, whatever the engine family.
///
/// The same value can drive a grouping load, a data load or a row count;
/// each operation reads the fields it needs and ignores the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadProps {
    /// Schema qualifier, relational engines only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    /// Table or collection name.
    pub pure_name: String,
    pub engine_type: EngineType,
    pub database_config: DatabaseConfig,
    /// Columns tying child rows to their parent rows.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binding_columns: Vec<String>,
    /// Parent key tuples, one per parent row being expanded. Tuples are
    /// positional against `binding_columns`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binding_values: Vec<Vec<Value>>,
    /// Projection. Absent means all columns; empty means load nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderByColumn>,
    /// Caller-supplied filter for relational engines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_condition: Option<Condition>,
    /// Caller-supplied filter for document engines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_condition: Option<Value>,
    /// Page window for data loads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

impl LoadProps {
    /// Request against `pure_name` on the given engine and connection.
    pub fn new(
        engine_type: EngineType,
        pure_name: impl Into<String>,
        database_config: DatabaseConfig,
    ) -> Self {
        Self {
            schema_name: None,
            pure_name: pure_name.into(),
            engine_type,
            database_config,
            binding_columns: Vec::new(),
            binding_values: Vec::new(),
            data_columns: None,
            order_by: Vec::new(),
            sql_condition: None,
            document_condition: None,
            range: None,
        }
    }

    pub fn with_schema(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = Some(schema_name.into());
        self
    }

    pub fn with_binding(mut self, columns: Vec<String>, values: Vec<Vec<Value>>) -> Self {
        self.binding_columns = columns;
        self.binding_values = values;
        self
    }

    pub fn with_data_columns(mut self, columns: Vec<String>) -> Self {
        self.data_columns = Some(columns);
        self
    }

    pub fn with_order_by(mut self, order_by: Vec<OrderByColumn>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_sql_condition(mut self, condition: Condition) -> Self {
        self.sql_condition = Some(condition);
        self
    }

    pub fn with_document_condition(mut self, condition: Value) -> Self {
        self.document_condition = Some(condition);
        self
    }

    pub fn with_range(mut self, offset: u64, limit: u64) -> Self {
        self.range = Some(Range::new(offset, limit));
        self
    }

    /// Source identity used in generated select trees.
    pub fn source_name(&self) -> SourceName {
        SourceName {
            schema_name: self.schema_name.clone(),
            pure_name: self.pure_name.clone(),
        }
    }
}

/// Reads an engine-reported count as a non-negative integer.
///
/// Some relational drivers hand counts back as decimal strings; both the
/// numeric and the string encoding are accepted.
pub fn coerce_count(value: &Value) -> Result<u64> {
    match value {
        Value::Number(number) => number.as_u64().ok_or_else(|| {
            LoadError::malformed_count(format!("not a non-negative integer: {}", number))
        }),
        Value::String(text) => text
            .trim()
            .parse::<u64>()
            .map_err(|_| LoadError::malformed_count(format!("not a numeric string: {:?}", text))),
        other => Err(LoadError::malformed_count(format!(
            "unexpected value: {}",
            other
        ))),
    }
}
