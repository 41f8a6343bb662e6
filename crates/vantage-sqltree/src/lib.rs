//! Serializable relational select descriptors.
//!
//! A [`Select`] is a structured description of a relational query: source
//! table, projected expressions, a filter tree, grouping, ordering and an
//! offset/limit range. It is never compiled to SQL here — a SQL-capable
//! gateway on the other side of an execution channel does that — so every
//! type serializes to plain JSON with internally tagged enums
//! (`expr_type`, `condition_type`) and snake_case field names.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identity of a table or view in the target database.
///
/// Schema-less engines carry only `pure_name`; relational engines may
/// qualify it with `schema_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    pub pure_name: String,
}

impl SourceName {
    pub fn new(pure_name: impl Into<String>) -> Self {
        Self {
            schema_name: None,
            pure_name: pure_name.into(),
        }
    }

    pub fn with_schema(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = Some(schema_name.into());
        self
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema_name {
            Some(schema) => write!(f, "{}.{}", schema, self.pure_name),
            None => write!(f, "{}", self.pure_name),
        }
    }
}

/// A projected or referenced expression inside a select.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expr_type", rename_all = "snake_case")]
pub enum Expression {
    /// Bare column reference.
    Column {
        column_name: String,
        source: SourceName,
    },
    /// Function application, e.g. `COUNT(*)`.
    Call {
        func: String,
        args: Vec<Expression>,
        #[serde(skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
    /// Verbatim SQL fragment.
    Raw {
        sql: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
}

impl Expression {
    /// Column reference scoped to `source`.
    pub fn column(column_name: impl Into<String>, source: &SourceName) -> Self {
        Expression::Column {
            column_name: column_name.into(),
            source: source.clone(),
        }
    }
}

/// A filter expression tree.
///
/// `Raw` exists for caller-supplied manual filters; everything this crate
/// builds itself is structural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "condition_type", rename_all = "snake_case")]
pub enum Condition {
    /// Every sub-condition must hold.
    And { conditions: Vec<Condition> },
    /// At least one sub-condition must hold.
    Or { conditions: Vec<Condition> },
    /// Expression value is a member of the given set.
    In {
        expr: Expression,
        values: Vec<Value>,
    },
    /// Expression value equals the given value.
    Equal { expr: Expression, value: Value },
    /// Verbatim SQL fragment.
    Raw { sql: String },
}

impl Condition {
    pub fn and(conditions: Vec<Condition>) -> Self {
        Condition::And { conditions }
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Condition::Or { conditions }
    }

    pub fn is_in(expr: Expression, values: Vec<Value>) -> Self {
        Condition::In { expr, values }
    }

    pub fn equal(expr: Expression, value: Value) -> Self {
        Condition::Equal { expr, value }
    }
}

/// Sort direction for one order-by entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// One order-by entry: a column reference plus direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByExpression {
    pub column_name: String,
    pub source: SourceName,
    pub direction: SortDirection,
}

/// Offset/limit page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub offset: u64,
    pub limit: u64,
}

impl Range {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

/// Structured select description, executed remotely by a SQL-capable
/// gateway.
///
/// `columns` and `select_all` are mutually exclusive projections: an
/// explicit column list, or everything. Optional parts are omitted from
/// the wire entirely when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    pub from: SourceName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Expression>>,
    #[serde(default)]
    pub select_all: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<Expression>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<OrderByExpression>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

impl Select {
    /// Bare select from `from` with no projection, filter or ordering.
    pub fn new(from: SourceName) -> Self {
        Self {
            from,
            columns: None,
            select_all: false,
            filter: None,
            group_by: None,
            order_by: None,
            range: None,
        }
    }
}
