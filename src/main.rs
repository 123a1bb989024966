//! campusdb CLI - serve the school records API or inspect a seed fixture

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use campusdb::config::{self, CampusConfig};
use campusdb::{ui, Course, Enrollment, EntityKind, Instructor, RelationalStore, Seed, Student};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "campusdb")]
#[command(version)]
#[command(about = "In-memory school records store with referential integrity")]
#[command(long_about = r#"
campusdb keeps students, instructors, courses and enrollments in memory and
serves them over HTTP. Every write is validated: identifiers are unique,
references must exist, and referenced rows cannot be removed.

Example usage:
  campusdb init
  campusdb serve --port 5000 --seed seed.json
  campusdb demo --kind courses
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to bind (defaults to config, then 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to config, then 5000)
        #[arg(short, long)]
        port: Option<u16>,

        /// JSON seed fixture to load at startup
        #[arg(short, long)]
        seed: Option<PathBuf>,

        /// Path to the config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a default campusdb.toml
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,

        /// Where to write the config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Load a seed fixture into a fresh store and print its contents
    Demo {
        /// JSON seed fixture (defaults to a built-in sample)
        #[arg(short, long)]
        seed: Option<PathBuf>,

        /// Only list this collection (student, course, ...)
        #[arg(short, long)]
        kind: Option<EntityKind>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Serve { host, port, seed, config } => {
            let cfg = config::load_config(config.as_deref())?.unwrap_or_default();
            let addr = cfg.listen_addr(host.as_deref(), port)?;

            let mut store = RelationalStore::new();
            if let Some(path) = cfg.seed_path(seed.as_deref()) {
                tracing::info!("Loading seed from {}", path.display());
                Seed::from_path(&path)?
                    .apply(&mut store)
                    .with_context(|| format!("seed {} rejected", path.display()))?;
            }

            campusdb::server::start_server(addr, store).await?;
        }

        Commands::Init { force, config } => {
            let path = config.unwrap_or_else(config::default_config_path);
            config::write_config(&path, &CampusConfig::with_defaults(), force)?;
            ui::done(&format!("Wrote {}", path.display()));
        }

        Commands::Demo { seed, kind } => {
            let fixture = match &seed {
                Some(path) => Seed::from_path(path)?,
                None => Seed::sample(),
            };
            let store = fixture.build()?;

            ui::banner("campusdb demo");
            if let Some(path) = &seed {
                ui::detail("Seed", &path.display().to_string());
            }
            println!("{}", ui::stats_table(&store.stats()));

            let kinds = match kind {
                Some(kind) => vec![kind],
                None => EntityKind::all().to_vec(),
            };
            for kind in kinds {
                match kind {
                    EntityKind::Instructor => ui::print_collection::<Instructor>(&store),
                    EntityKind::Student => ui::print_collection::<Student>(&store),
                    EntityKind::Course => ui::print_collection::<Course>(&store),
                    EntityKind::Enrollment => ui::print_collection::<Enrollment>(&store),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_kind_parses_entity_names() {
        let cli = Cli::try_parse_from(["campusdb", "demo", "--kind", "Courses"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Demo { kind: Some(EntityKind::Course), .. }
        ));

        assert!(Cli::try_parse_from(["campusdb", "demo", "--kind", "janitor"]).is_err());
    }
}
