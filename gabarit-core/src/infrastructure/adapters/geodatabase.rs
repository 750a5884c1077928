// gabarit-core/src/infrastructure/adapters/geodatabase.rs

// DuckDB-backed implementation of the geodatabase port. Feature tables live
// as ordinary tables; the domain registry the geodatabase keeps about itself
// is mirrored in three metadata tables (GDB_DOMAINS, GDB_DOMAIN_VALUES,
// GDB_FIELD_DOMAINS), created on open.

use async_trait::async_trait;
use duckdb::{params, Config, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::GabaritError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::geodatabase::{DomainBinding, DomainSchema, FieldSchema, Geodatabase};

pub struct DuckDbGeodatabase {
    conn: Arc<Mutex<Connection>>,
}

const METADATA_DDL: &str = "\
CREATE TABLE IF NOT EXISTS GDB_DOMAINS (\
  NAME VARCHAR PRIMARY KEY, FIELD_TYPE VARCHAR NOT NULL, DESCR VARCHAR);\
CREATE TABLE IF NOT EXISTS GDB_DOMAIN_VALUES (\
  DOMAIN_NAME VARCHAR NOT NULL, CODE VARCHAR NOT NULL, LABEL VARCHAR NOT NULL);\
CREATE TABLE IF NOT EXISTS GDB_FIELD_DOMAINS (\
  TABLE_NAME VARCHAR NOT NULL, FIELD_NAME VARCHAR NOT NULL, \
  DOMAIN_NAME VARCHAR NOT NULL, SUBTYPE_CODES VARCHAR NOT NULL);";

impl DuckDbGeodatabase {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();
        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };
        conn.execute_batch(METADATA_DDL)?;
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

fn parse_codes(packed: &str) -> Vec<i64> {
    packed
        .split(',')
        .filter_map(|c| c.trim().parse().ok())
        .collect()
}

fn pack_codes(codes: &[i64]) -> String {
    codes.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(",")
}

#[async_trait]
impl Geodatabase for DuckDbGeodatabase {
    async fn list_feature_classes(&self) -> Result<Vec<String>, GabaritError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = 'main' AND table_name NOT LIKE 'GDB_%' \
                 ORDER BY table_name",
            )
            .map_err(db_err)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(names)
    }

    async fn list_fields(&self, table: &str) -> Result<Vec<FieldSchema>, GabaritError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info('{}')", table.replace('\'', "''")))
            .map_err(db_err)?;
        let fields = stmt
            .query_map([], |row| {
                Ok(FieldSchema {
                    name: row.get("name")?,
                    data_type: row.get("type")?,
                    is_nullable: !row.get::<_, bool>("notnull")?,
                })
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(fields)
    }

    async fn list_domains(&self) -> Result<Vec<DomainSchema>, GabaritError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare("SELECT NAME, FIELD_TYPE, COALESCE(DESCR, '') FROM GDB_DOMAINS ORDER BY NAME")
            .map_err(db_err)?;
        let mut domains = stmt
            .query_map([], |row| {
                Ok(DomainSchema {
                    name: row.get(0)?,
                    field_type: row.get(1)?,
                    description: row.get(2)?,
                    values: Vec::new(),
                })
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;

        // Values fetched in a second, fully materialized pass.
        let mut stmt = conn
            .prepare("SELECT DOMAIN_NAME, CODE, LABEL FROM GDB_DOMAIN_VALUES ORDER BY DOMAIN_NAME, CODE")
            .map_err(db_err)?;
        let values = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;

        for (domain_name, code, label) in values {
            if let Some(domain) = domains.iter_mut().find(|d| d.name == domain_name) {
                domain.values.push((code, label));
            }
        }
        Ok(domains)
    }

    async fn list_bindings(&self) -> Result<Vec<DomainBinding>, GabaritError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT TABLE_NAME, FIELD_NAME, DOMAIN_NAME, SUBTYPE_CODES \
                 FROM GDB_FIELD_DOMAINS ORDER BY TABLE_NAME, FIELD_NAME",
            )
            .map_err(db_err)?;
        let bindings = stmt
            .query_map([], |row| {
                Ok(DomainBinding {
                    table: row.get(0)?,
                    field: row.get(1)?,
                    domain: row.get(2)?,
                    subtype_codes: parse_codes(&row.get::<_, String>(3)?),
                })
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(bindings)
    }

    async fn count_rows(&self, table: &str, filter: Option<&str>) -> Result<u64, GabaritError> {
        let conn = self.lock()?;
        let mut sql = format!("SELECT COUNT(*) FROM \"{}\"", table);
        if let Some(filter) = filter {
            sql.push_str(&format!(" WHERE {}", filter));
        }
        let count: u64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(db_err)?;
        Ok(count)
    }

    async fn distinct_values(
        &self,
        table: &str,
        field: &str,
        filter: Option<&str>,
    ) -> Result<Vec<String>, GabaritError> {
        let conn = self.lock()?;
        let mut sql = format!(
            "SELECT DISTINCT CAST(\"{f}\" AS VARCHAR) FROM \"{t}\" WHERE \"{f}\" IS NOT NULL",
            f = field,
            t = table
        );
        if let Some(filter) = filter {
            sql.push_str(&format!(" AND ({})", filter));
        }
        sql.push_str(" ORDER BY 1");
        let mut stmt = conn.prepare(&sql).map_err(db_err)?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;
        Ok(values)
    }

    async fn create_domain(
        &self,
        name: &str,
        field_type: &str,
        description: &str,
    ) -> Result<(), GabaritError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO GDB_DOMAINS (NAME, FIELD_TYPE, DESCR) VALUES (?, ?, ?)",
            params![name, field_type, description],
        )
        .map(|_| ())
        .map_err(db_err)
    }

    async fn add_coded_value(
        &self,
        domain: &str,
        code: &str,
        label: &str,
    ) -> Result<(), GabaritError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO GDB_DOMAIN_VALUES (DOMAIN_NAME, CODE, LABEL) VALUES (?, ?, ?)",
            params![domain, code, label],
        )
        .map(|_| ())
        .map_err(db_err)
    }

    async fn assign_domain_to_field(
        &self,
        table: &str,
        field: &str,
        domain: &str,
        subtype_codes: &[i64],
    ) -> Result<(), GabaritError> {
        let conn = self.lock()?;

        // The binding target must exist; a missing field is the classic
        // partial-application case the caller downgrades to a warning.
        let field_exists: u64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.columns \
                 WHERE UPPER(table_name) = UPPER(?) AND UPPER(column_name) = UPPER(?)",
                params![table, field],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        if field_exists == 0 {
            return Err(GabaritError::InternalError(format!(
                "field {}.{} does not exist in the geodatabase",
                table, field
            )));
        }

        conn.execute(
            "DELETE FROM GDB_FIELD_DOMAINS WHERE TABLE_NAME = ? AND FIELD_NAME = ?",
            params![table, field],
        )
        .map_err(db_err)?;
        conn.execute(
            "INSERT INTO GDB_FIELD_DOMAINS (TABLE_NAME, FIELD_NAME, DOMAIN_NAME, SUBTYPE_CODES) \
             VALUES (?, ?, ?, ?)",
            params![table, field, domain, pack_codes(subtype_codes)],
        )
        .map(|_| ())
        .map_err(db_err)
    }

    async fn remove_domain_from_field(
        &self,
        table: &str,
        field: &str,
    ) -> Result<(), GabaritError> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM GDB_FIELD_DOMAINS WHERE TABLE_NAME = ? AND FIELD_NAME = ?",
            params![table, field],
        )
        .map(|_| ())
        .map_err(db_err)
    }

    async fn delete_domain(&self, name: &str) -> Result<(), GabaritError> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM GDB_DOMAIN_VALUES WHERE DOMAIN_NAME = ?",
            params![name],
        )
        .map_err(db_err)?;
        conn.execute("DELETE FROM GDB_DOMAINS WHERE NAME = ?", params![name])
            .map(|_| ())
            .map_err(db_err)
    }
}
