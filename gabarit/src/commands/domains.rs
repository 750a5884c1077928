// gabarit/src/commands/domains.rs
//
// USE CASE: derive attribute domains from the catalog and apply them to the
// mirrored geodatabase.

use anyhow::bail;
use std::path::Path;
use tracing::debug;

use gabarit_core::application::{generate_domains, DomainOptions, ReplacementPolicy, Selection};
use gabarit_core::domain::dedup::{GenerationStrategy, KeyOrder};
use gabarit_core::infrastructure::adapters::{DuckDbGeodatabase, DuckDbStore};
use gabarit_core::infrastructure::config::load_profile;

pub async fn execute(
    project_dir: &Path,
    strategy: &str,
    replace: bool,
    sorted_keys: bool,
    prefix: Option<String>,
) -> anyhow::Result<()> {
    let profile = load_profile(project_dir)?;
    debug!(?profile, "Profile loaded");

    let strategy = parse_strategy(strategy)?;
    let options = DomainOptions {
        strategy,
        policy: if replace { ReplacementPolicy::FullReplace } else { ReplacementPolicy::AdditiveOnly },
        prefix: prefix.unwrap_or(profile.domain_prefix.clone()),
        key_order: if sorted_keys { KeyOrder::Sorted } else { KeyOrder::CatalogOrder },
    };

    println!("⚙️  Catalog {} -> geodatabase '{}'", profile.catalog_id, profile.geodatabase_db);
    if replace {
        println!("   ♻️  Full replace: existing domains will be destroyed first");
    }

    let store = DuckDbStore::new(&profile.catalog_db)?;
    let geodatabase = DuckDbGeodatabase::new(&profile.geodatabase_db)?;
    let selection =
        Selection::new(profile.catalog_id, profile.classes.clone(), profile.attributes.clone());

    let report = generate_domains(&store, &geodatabase, &selection, &options).await?;

    for warning in &report.warnings {
        println!("   ⚠️  [{}] {}", warning.scope, warning.message);
    }
    println!("✨ {}", report.summary());
    Ok(())
}

fn parse_strategy(value: &str) -> anyhow::Result<GenerationStrategy> {
    match value {
        "by-code" => Ok(GenerationStrategy::ByCodeAttribute),
        "by-class" => Ok(GenerationStrategy::ByClassAttribute),
        "by-attribute" => Ok(GenerationStrategy::ByAttribute),
        other => bail!("Unknown strategy '{}' (expected by-code | by-class | by-attribute)", other),
    }
}
