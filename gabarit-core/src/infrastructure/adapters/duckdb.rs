// gabarit-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use duckdb::types::ValueRef;
use duckdb::{Config, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

// Imports Hexagonaux
use crate::error::GabaritError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::store::{CatalogStore, SqlValue};

/// DuckDB-backed implementation of the catalog store port. One connection,
/// serialized behind a mutex; result sets are fully materialized before the
/// lock is released, so statements never interleave.
pub struct DuckDbStore {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbStore {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();
        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, GabaritError> {
        self.conn.lock().map_err(|_| {
            GabaritError::Infrastructure(InfrastructureError::Io(std::io::Error::other(
                "DuckDB Mutex Poisoned",
            )))
        })
    }
}

fn db_err(e: duckdb::Error) -> GabaritError {
    GabaritError::Infrastructure(InfrastructureError::from(e))
}

/// Engine value -> port value. Anything exotic degrades to its debug text;
/// the catalog schema only carries numbers and strings.
fn convert(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Boolean(b) => SqlValue::Integer(b as i64),
        ValueRef::TinyInt(i) => SqlValue::Integer(i as i64),
        ValueRef::SmallInt(i) => SqlValue::Integer(i as i64),
        ValueRef::Int(i) => SqlValue::Integer(i as i64),
        ValueRef::BigInt(i) => SqlValue::Integer(i),
        ValueRef::UTinyInt(i) => SqlValue::Integer(i as i64),
        ValueRef::USmallInt(i) => SqlValue::Integer(i as i64),
        ValueRef::UInt(i) => SqlValue::Integer(i as i64),
        ValueRef::UBigInt(i) => SqlValue::Integer(i as i64),
        ValueRef::Float(f) => SqlValue::Real(f as f64),
        ValueRef::Double(f) => SqlValue::Real(f),
        ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => SqlValue::Text(String::from_utf8_lossy(b).into_owned()),
        other => SqlValue::Text(format!("{:?}", other)),
    }
}

#[async_trait]
impl CatalogStore for DuckDbStore {
    async fn select(&self, sql: &str) -> Result<Vec<Vec<SqlValue>>, GabaritError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        let mut rows = stmt.query([]).map_err(db_err)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(db_err)? {
            let mut values = Vec::new();
            let mut idx = 0;
            while let Ok(value) = row.get_ref(idx) {
                values.push(convert(value));
                idx += 1;
            }
            out.push(values);
        }
        Ok(out)
    }

    async fn execute(&self, sql: &str) -> Result<(), GabaritError> {
        let conn = self.lock()?;
        conn.execute_batch(sql).map_err(db_err)
    }
}
