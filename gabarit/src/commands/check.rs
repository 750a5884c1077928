// gabarit/src/commands/check.rs
//
// USE CASE: reconciliation report (catalog vs geodatabase vs data).
// Read-only; returns the finding count so main can honor --strict.

use std::fs;
use std::path::{Path, PathBuf};

use comfy_table::{presets::UTF8_FULL, Table};

use gabarit_core::application::{run_reconciliation, Selection};
use gabarit_core::infrastructure::adapters::{DuckDbGeodatabase, DuckDbStore};
use gabarit_core::infrastructure::config::load_profile;

pub async fn execute(project_dir: &Path, report_path: Option<PathBuf>) -> anyhow::Result<usize> {
    let profile = load_profile(project_dir)?;

    println!(
        "🔎 Reconciling catalog {} against '{}'...",
        profile.catalog_id, profile.geodatabase_db
    );

    let store = DuckDbStore::new(&profile.catalog_db)?;
    let geodatabase = DuckDbGeodatabase::new(&profile.geodatabase_db)?;
    let selection =
        Selection::new(profile.catalog_id, profile.classes.clone(), profile.attributes.clone());

    let report = run_reconciliation(&store, &geodatabase, &selection).await?;

    if report.findings.is_empty() {
        println!("✅ No divergence between catalog and geodatabase.");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["KIND", "SCOPE", "DETAIL"]);
        for finding in &report.findings {
            table.add_row(vec![
                finding.kind.as_str().to_string(),
                finding.scope.clone(),
                finding.detail.clone(),
            ]);
        }
        println!("{}", table);
        println!("   {} finding(s).", report.findings.len());
    }

    if let Some(path) = report_path {
        let content = serde_json::to_string_pretty(&report)?;
        fs::write(&path, content)?;
        println!("📝 Report written to {}", path.display());
    }

    Ok(report.findings.len())
}
