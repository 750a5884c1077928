// gabarit/src/main.rs

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug gabarit domains ... pour voir les détails
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        // --- USE CASE: GENERATE DOMAINS ---
        Commands::Domains { project_dir, strategy, replace, sorted_keys, prefix } => {
            if let Err(e) =
                commands::domains::execute(&project_dir, &strategy, replace, sorted_keys, prefix)
                    .await
            {
                eprintln!("❌ Domain generation failed: {:?}", e);
                std::process::exit(1);
            }
        }

        // --- USE CASE: EMIT REGISTRY STATEMENTS ---
        Commands::Constraints { project_dir, output, table } => {
            if let Err(e) = commands::constraints::execute(&project_dir, &output, table).await {
                eprintln!("❌ Constraint emission failed: {:?}", e);
                std::process::exit(1);
            }
        }

        // --- USE CASE: RECONCILIATION ---
        Commands::Check { project_dir, strict, report } => {
            match commands::check::execute(&project_dir, report).await {
                Ok(findings) => {
                    if strict && findings > 0 {
                        eprintln!("❌ {} finding(s) in strict mode.", findings);
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("❌ Reconciliation failed: {:?}", e);
                    std::process::exit(1);
                }
            }
        }

        // --- USE CASE: INSPECT ---
        Commands::Inspect { db_path, table, limit } => {
            if let Err(e) = commands::inspect::execute(db_path, table, limit) {
                eprintln!("❌ Inspect failed: {:?}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
