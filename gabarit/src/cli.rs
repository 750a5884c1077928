// gabarit/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gabarit")]
#[command(about = "Catalog-driven domain & constraint generation for the BDG geodatabase", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🏷️ Derives attribute domains from the catalog and applies them to the geodatabase
    Domains {
        /// Project directory (contains gabarit.yaml)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Generation strategy: by-code | by-class | by-attribute
        #[arg(long, default_value = "by-code")]
        strategy: String,

        /// Destroy every existing domain and binding before recreating
        #[arg(long)]
        replace: bool,

        /// Dedup value-sets on sorted labels instead of catalog order
        #[arg(long)]
        sorted_keys: bool,

        /// Domain name prefix (default comes from the profile)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// 📜 Emits constraint-registry INSERT statements for operator review
    Constraints {
        /// Project directory (contains gabarit.yaml)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Output file for the emitted statements
        #[arg(long, short, default_value = "contraintes.sql")]
        output: PathBuf,

        /// Registry table name (default comes from the profile)
        #[arg(long)]
        table: Option<String>,
    },

    /// 🔎 Reconciles catalog, geodatabase schema and stored values
    Check {
        /// Project directory (contains gabarit.yaml)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Exit with an error if any finding is reported
        #[arg(long)]
        strict: bool,

        /// Write the full run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// 🔍 Inspects a geodatabase table (schema, domain bindings, sample rows)
    Inspect {
        /// Path to the geodatabase database file
        #[arg(long, default_value = "bdg.duckdb")]
        db_path: String,

        /// Table name to inspect
        #[arg(long, short)]
        table: String,

        /// Number of sample rows to display
        #[arg(long, default_value = "5")]
        limit: usize,
    },
}
