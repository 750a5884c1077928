// gabarit-core/src/ports/store.rs

// The application only ever needs two verbs against the relational mirror of
// the catalogue: read rows, run a statement. Everything else (dialect,
// connection pooling, commits) lives behind this port.

use crate::error::GabaritError;
use async_trait::async_trait;
use std::fmt;

/// A single cell of a result row, independent of the backing engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            SqlValue::Real(f) => Some(*f as i64),
            SqlValue::Text(s) => s.trim().parse().ok(),
            SqlValue::Null => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Integer(i) => Some(*i as f64),
            SqlValue::Real(f) => Some(*f),
            SqlValue::Text(s) => s.trim().parse().ok(),
            SqlValue::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, ""),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Real(r) => write!(f, "{}", r),
            SqlValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Executes a read-only statement. Zero matching rows yields an empty
    /// Vec, never an error.
    async fn select(&self, sql: &str) -> Result<Vec<Vec<SqlValue>>, GabaritError>;

    /// Executes a mutating statement. The caller owns the explicit COMMIT.
    async fn execute(&self, sql: &str) -> Result<(), GabaritError>;
}
