// gabarit/src/commands/inspect.rs
//
// USE CASE: Inspect a geodatabase table (schema + domain bindings + sample
// rows) without going through a profile.

use duckdb::{Connection, Row};
use std::path::Path;

pub fn execute(db_path: String, table: String, limit: usize) -> anyhow::Result<()> {
    if !Path::new(&db_path).exists() {
        anyhow::bail!(
            "❌ Geodatabase not found at: {}\n👉 Have you run 'gabarit domains'?",
            db_path
        );
    }

    let conn = Connection::open(&db_path)?;

    println!("\n🔍 Inspecting Table: '{}'", table);

    // Fetch column names
    let mut stmt_cols = conn.prepare(&format!("PRAGMA table_info({})", table))?;

    let column_names: Vec<String> = stmt_cols
        .query_map([], |row: &Row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    println!("   Columns: [{}]", column_names.join(", "));

    // Domain bindings, when the metadata tables exist
    if let Ok(mut stmt) = conn.prepare(
        "SELECT FIELD_NAME, DOMAIN_NAME, SUBTYPE_CODES FROM GDB_FIELD_DOMAINS \
         WHERE UPPER(TABLE_NAME) = UPPER(?) ORDER BY FIELD_NAME",
    ) {
        let bindings: Vec<(String, String, String)> = stmt
            .query_map([&table], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        for (field, domain, codes) in &bindings {
            if codes.is_empty() {
                println!("   Domain: {} -> {}", field, domain);
            } else {
                println!("   Domain: {} -> {} (codes {})", field, domain, codes);
            }
        }
    }

    println!("   --- Rows (Limit {}) ---", limit);

    // Fetch sample rows
    let mut stmt = conn.prepare(&format!("SELECT * FROM {} LIMIT {}", table, limit))?;
    let mut rows = stmt.query([])?;

    while let Some(row) = rows.next()? {
        let values: Vec<String> = (0..column_names.len())
            .map(|i| match row.get_ref(i) {
                Ok(val) => format!("{:?}", val),
                Err(_) => "ERROR".to_string(),
            })
            .collect();

        println!("   ➜ {}", values.join(" | "));
    }

    Ok(())
}
