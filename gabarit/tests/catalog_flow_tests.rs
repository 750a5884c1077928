use anyhow::Result;
use assert_cmd::prelude::*;
use duckdb::Connection;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Abstraction for managing the Gabarit test environment: a seeded catalog
/// mirror, a seeded geodatabase mirror and a profile pointing at both.
struct GabaritTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

const CATALOG_SEED: &str = "
CREATE TABLE FEAT_CATALOGUE (FEAT_CATAL_ID INTEGER, VERSION_NO VARCHAR, DESCR VARCHAR);
CREATE TABLE FEAT_TYPE (FEAT_TYPE_ID INTEGER, FEAT_CATAL_FK INTEGER,
  FEAT_TYPE_NAME_DB VARCHAR, FEAT_TYPE_CODE_BD INTEGER, DESCR VARCHAR);
CREATE TABLE FEAT_ATTR (FEAT_ATTR_ID INTEGER, FEAT_ATTR_NAME_DB VARCHAR,
  ATTR_TYPE_CODE INTEGER, DOM_TYPE_CODE INTEGER, ATTR_LENGTH INTEGER);
CREATE TABLE RELATION_FEAT_ATTR (FEAT_TYPE_FK INTEGER, FEAT_ATTR_FK INTEGER);
CREATE TABLE ATTR_VALUE (FEAT_ATTR_FK INTEGER, FEAT_TYPE_FK INTEGER,
  INTERNAL_CODE VARCHAR, LABEL_FR VARCHAR, LABEL_EN VARCHAR, VALUE_ORDER INTEGER);
CREATE TABLE CONSTRAINT_DEF (CONST_ID INTEGER, PHYS_CONST_TYPE INTEGER);
CREATE TABLE CONST_RELATION (CONST_FK INTEGER, FEAT_TYPE_FK INTEGER, FEAT_ATTR_FK INTEGER);
CREATE TABLE CONST_PARAMETER (CONST_FK INTEGER, PARAM_NAME VARCHAR,
  P_VALUE VARCHAR, PARAM_ORDER INTEGER);

INSERT INTO FEAT_CATALOGUE VALUES (42, '2.1', 'BDG feature catalog');

-- LAKES has two specific codes, ROADS one (and no table in the geodatabase).
INSERT INTO FEAT_TYPE VALUES
  (1, 42, 'LAKES', 1480000, 'Lake area'),
  (2, 42, 'LAKES', 1480002, 'Lake point'),
  (3, 42, 'ROADS', 1190001, 'Road line');

INSERT INTO FEAT_ATTR VALUES
  (10, 'WATER_DEFINITION', 2, -1, 0),
  (11, 'CREATION_DATE', 1, 0, 8);

INSERT INTO RELATION_FEAT_ATTR VALUES (1, 10), (2, 10), (1, 11), (2, 11), (3, 11);

-- Both codes share a byte-identical value list.
INSERT INTO ATTR_VALUE VALUES
  (10, 1, '1', 'Lac', 'Lake', 1),
  (10, 1, '2', 'Réservoir', 'Reservoir', 2),
  (10, 2, '1', 'Lac', 'Lake', 1),
  (10, 2, '2', 'Réservoir', 'Reservoir', 2);
";

const GEODATABASE_SEED: &str = "
CREATE TABLE LAKES (NID VARCHAR, WATER_DEFINITION INTEGER,
  CREATION_DATE VARCHAR, CODE_SPEC INTEGER);
INSERT INTO LAKES VALUES
  ('6ba7b8109dad11d180b400c04fd430c8', 1, '2005', 1480000),
  ('6ba7b8109dad11d180b400c04fd430c9', 2, '1998', 1480000),
  ('6ba7b8109dad11d180b400c04fd430ca', 9, '2010', 1480002);
";

impl GabaritTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().to_path_buf();

        let catalog_db = root.join("catalog.duckdb");
        let conn = Connection::open(&catalog_db)?;
        conn.execute_batch(CATALOG_SEED)?;
        drop(conn);

        let gdb_db = root.join("bdg.duckdb");
        let conn = Connection::open(&gdb_db)?;
        conn.execute_batch(GEODATABASE_SEED)?;
        drop(conn);

        std::fs::write(
            root.join("gabarit.yaml"),
            format!(
                "catalog_id: 42\ncatalog_db: {}\ngeodatabase_db: {}\n",
                catalog_db.display(),
                gdb_db.display()
            ),
        )?;

        Ok(Self { _tmp: tmp, root })
    }

    fn gabarit(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gabarit"));
        cmd.current_dir(&self.root);
        cmd.env_remove("GABARIT_CATALOG_DB");
        cmd.env_remove("GABARIT_GEODATABASE_DB");
        cmd
    }
}

#[test]
fn test_constraints_emission_writes_reviewable_sql() -> Result<()> {
    let env = GabaritTestEnv::new()?;

    env.gabarit()
        .args(["constraints", "--output", "review.sql"])
        .assert()
        .success();

    let content = std::fs::read_to_string(env.root.join("review.sql"))?;
    assert!(content.contains("INSERT INTO CONTRAINTE_INTEGRITE"));
    // CREATION_DATE is free-form and named like a date -> partial-date rule,
    // once per class carrying it.
    assert!(content.contains("LAKES_CREATION_DATE_PARTIAL_DATE"));
    assert!(content.contains("ROADS_CREATION_DATE_PARTIAL_DATE"));
    // WATER_DEFINITION is catalog-coded: enforced via domains, not here.
    assert!(!content.contains("WATER_DEFINITION"));
    assert!(content.contains("statement(s)"));
    Ok(())
}

#[test]
fn test_domains_dedup_and_binding() -> Result<()> {
    let env = GabaritTestEnv::new()?;

    env.gabarit().arg("domains").assert().success();

    let conn = Connection::open(env.root.join("bdg.duckdb"))?;
    let domain_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM GDB_DOMAINS", [], |row| row.get(0))?;
    // Two specific codes, one shared value list -> one canonical domain.
    assert_eq!(domain_count, 1);

    let codes: String = conn.query_row(
        "SELECT SUBTYPE_CODES FROM GDB_FIELD_DOMAINS \
         WHERE TABLE_NAME = 'LAKES' AND FIELD_NAME = 'WATER_DEFINITION'",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(codes, "1480000,1480002");

    let value_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM GDB_DOMAIN_VALUES", [], |row| row.get(0))?;
    assert_eq!(value_count, 2);
    Ok(())
}

#[test]
fn test_domains_rerun_is_additive_by_default() -> Result<()> {
    let env = GabaritTestEnv::new()?;

    env.gabarit().arg("domains").assert().success();
    env.gabarit().arg("domains").assert().success();

    let conn = Connection::open(env.root.join("bdg.duckdb"))?;
    let domain_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM GDB_DOMAINS", [], |row| row.get(0))?;
    assert_eq!(domain_count, 1, "rerun must reuse, not duplicate");
    Ok(())
}

#[test]
fn test_check_reports_catalog_geodatabase_divergence() -> Result<()> {
    let env = GabaritTestEnv::new()?;

    // ROADS exists in the catalog only; LAKES carries a stored value (9)
    // outside its coded list.
    env.gabarit()
        .args(["check", "--report", "report.json"])
        .assert()
        .success()
        .stdout(predicates::str::contains("ROADS"))
        .stdout(predicates::str::contains("finding(s)"));

    let report = std::fs::read_to_string(env.root.join("report.json"))?;
    assert!(report.contains("MissingInGeodatabase"));
    assert!(report.contains("ValueMismatch"));
    Ok(())
}

#[test]
fn test_check_strict_mode_fails_on_findings() -> Result<()> {
    let env = GabaritTestEnv::new()?;

    env.gabarit()
        .args(["check", "--strict"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("finding(s)"));
    Ok(())
}

#[test]
fn test_missing_profile_is_fatal() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gabarit"));
    cmd.current_dir(tmp.path());
    cmd.arg("domains").assert().failure();
    Ok(())
}
