// gabarit/src/commands/constraints.rs
//
// USE CASE: emit the constraint-registry INSERT statements into a .sql file
// an operator reviews (and runs) by hand. Nothing is executed here.

use std::fs;
use std::path::Path;

use gabarit_core::application::{emit_registry_sql, RegistryOptions, Selection};
use gabarit_core::infrastructure::adapters::DuckDbStore;
use gabarit_core::infrastructure::config::load_profile;

pub async fn execute(
    project_dir: &Path,
    output: &Path,
    table: Option<String>,
) -> anyhow::Result<()> {
    let profile = load_profile(project_dir)?;

    let options = RegistryOptions {
        table: table.unwrap_or(profile.registry_table.clone()),
        ..RegistryOptions::default()
    };

    println!("⚙️  Deriving rules from catalog {}...", profile.catalog_id);

    let store = DuckDbStore::new(&profile.catalog_db)?;
    let selection =
        Selection::new(profile.catalog_id, profile.classes.clone(), profile.attributes.clone());

    let report = emit_registry_sql(&store, &selection, &options).await?;

    let mut content = report.statements.join("\n");
    content.push_str(&format!("\n-- {} statement(s)\n", report.statements.len()));
    fs::write(output, content)?;

    for warning in &report.warnings {
        println!("   ⚠️  [{}] {}", warning.scope, warning.message);
    }
    if !report.unvalidated.is_empty() {
        println!("   ℹ️  {} attribute(s) without structural validation:", report.unvalidated.len());
        for notice in &report.unvalidated {
            println!("      - {}.{}", notice.class, notice.attribute);
        }
    }
    println!(
        "✨ {} statement(s) written to {} (review before running)",
        report.statements.len(),
        output.display()
    );
    Ok(())
}
