// gabarit-core/src/infrastructure/config.rs

// Run profile: which catalog mirror to read, which geodatabase to touch.
// Loaded from YAML, layered with environment overrides, then validated.
// A bad profile is a ConfigurationError: fatal before any mutation.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::infrastructure::error::InfrastructureError;

fn default_prefix() -> String {
    "DOM".to_string()
}

fn default_registry_table() -> String {
    "CONTRAINTE_INTEGRITE".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileConfig {
    /// Catalog id in FEAT_CATALOGUE.
    #[validate(range(min = 1))]
    pub catalog_id: i64,

    /// Path to the catalog mirror database file.
    #[validate(length(min = 1))]
    pub catalog_db: String,

    /// Path to the geodatabase mirror database file.
    #[validate(length(min = 1))]
    pub geodatabase_db: String,

    #[serde(default = "default_prefix")]
    pub domain_prefix: String,

    #[serde(default = "default_registry_table")]
    pub registry_table: String,

    /// Optional class / attribute selection; empty means everything.
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
}

#[instrument(skip(project_dir))]
pub fn load_profile(project_dir: &Path) -> Result<ProfileConfig, InfrastructureError> {
    let config_path = find_profile(project_dir)?;
    info!(path = ?config_path, "Loading run profile");

    let content = fs::read_to_string(&config_path)?;
    let mut config: ProfileConfig = serde_yaml::from_str(&content)?;

    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;

    Ok(config)
}

fn find_profile(root: &Path) -> Result<PathBuf, InfrastructureError> {
    let candidates = ["gabarit.yaml", "gabarit_profile.yaml"];
    for filename in candidates {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No profile found in {:?}. Checked: {:?}",
        root, candidates
    )))
}

fn apply_env_overrides(config: &mut ProfileConfig) {
    // Permet de faire: GABARIT_CATALOG_DB=/tmp/cat.duckdb gabarit domains
    if let Ok(val) = std::env::var("GABARIT_CATALOG_DB") {
        info!(old = ?config.catalog_db, new = ?val, "Overriding catalog db via ENV");
        config.catalog_db = val;
    }
    if let Ok(val) = std::env::var("GABARIT_GEODATABASE_DB") {
        info!(old = ?config.geodatabase_db, new = ?val, "Overriding geodatabase db via ENV");
        config.geodatabase_db = val;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parsing_and_defaults() {
        let yaml = r#"
catalog_id: 42
catalog_db: catalog.duckdb
geodatabase_db: bdg.duckdb
classes:
  - NHN_HHYD_WATERBODY_2
"#;
        let mut config: ProfileConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.catalog_id, 42);
        assert_eq!(config.domain_prefix, "DOM");
        assert_eq!(config.registry_table, "CONTRAINTE_INTEGRITE");
        assert_eq!(config.classes.len(), 1);
        assert!(config.attributes.is_empty());
    }

    #[test]
    fn test_invalid_catalog_id_rejected() {
        let yaml = r#"
catalog_id: 0
catalog_db: catalog.duckdb
geodatabase_db: bdg.duckdb
"#;
        let config: ProfileConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_profile_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_profile(dir.path()).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigNotFound(_)));
    }
}
