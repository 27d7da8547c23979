//! Docktapus - run compose services from prod or dev, per service
//!
//! This is the main CLI entry point, installed as `dtop`.

use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use docktapus::commands::{self, ProjectUpdate};
use docktapus::error::{DtopError, Result};
use docktapus::plan::DevSelection;
use docktapus::registry::ProjectRegistry;
use docktapus::runtime::DockerCli;
use docktapus::teardown::{Removal, TeardownOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Docktapus - per-service prod/dev switching for Docker Compose projects
#[derive(Parser)]
#[command(name = "dtop")]
#[command(version)]
#[command(about = "Run each service of a compose project from prod or dev", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Registry file (defaults to ~/.dtop.yml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a project with its dev and prod compose files
    Init {
        /// Project name
        name: String,
        /// Dev compose file
        #[arg(short, long = "dev-compose-file")]
        dev: PathBuf,
        /// Prod compose file
        #[arg(short, long = "prod-compose-file")]
        prod: PathBuf,
        /// Overwrite an existing project
        #[arg(long)]
        force: bool,
    },

    /// Change the root or compose files of a project
    Update {
        /// Project name (defaults to the current directory name)
        name: Option<String>,
        /// New project root
        #[arg(long)]
        root: Option<PathBuf>,
        /// New dev compose file
        #[arg(long = "dev-compose-file")]
        dev: Option<PathBuf>,
        /// New prod compose file
        #[arg(long = "prod-compose-file")]
        prod: Option<PathBuf>,
    },

    /// Start a project, some services from dev and the rest from prod
    Up {
        /// Project name (defaults to the current directory name)
        name: Option<String>,
        /// Dev services, comma separated, or ALL
        #[arg(long)]
        dev: Option<String>,
        /// Build images before starting
        #[arg(long)]
        build: bool,
    },

    /// Stop a project
    Down {
        /// Project name (defaults to the current directory name)
        name: Option<String>,
        /// Remove project networks without asking
        #[arg(long)]
        remove_networks: bool,
        /// Remove project volumes without asking
        #[arg(long)]
        remove_volumes: bool,
        /// Remove networks and volumes without asking
        #[arg(long)]
        all: bool,
    },

    /// Move a running service between prod and dev
    Swap {
        /// Project name, then service; the project defaults to the current
        /// directory name when only the service is given
        #[arg(num_args = 1..=2, required = true)]
        args: Vec<String>,
        /// Build the image before starting
        #[arg(long)]
        build: bool,
    },

    /// List managed containers
    Ls {
        /// Only this project
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let registry_path = ProjectRegistry::resolve_path(cli.config.as_deref())?;
    let mut registry = ProjectRegistry::load(registry_path)?;
    let runtime = DockerCli::new();

    match cli.command {
        Commands::Init {
            name,
            dev,
            prod,
            force,
        } => {
            let project = commands::init(&mut registry, &name, &dev, &prod, force, &cwd)?;
            println!("✅ Project '{}' initialized", name);
            println!("   root: {}", project.root.display());
            println!("   dev:  {}", project.compose.dev.display());
            println!("   prod: {}", project.compose.prod.display());
        }

        Commands::Update {
            name,
            root,
            dev,
            prod,
        } => {
            let name = project_name(name, &cwd)?;
            let changes = ProjectUpdate { root, dev, prod };
            if changes.is_empty() {
                println!("Nothing to update for '{}'", name);
                return Ok(());
            }

            let changed = commands::update(&mut registry, &name, &changes, &cwd)?;
            println!("✅ Project '{}' updated: {}", name, changed.join(", "));
        }

        Commands::Up { name, dev, build } => {
            let name = project_name(name, &cwd)?;
            let project = registry.require(&name)?;
            let selection = DevSelection::from_arg(dev.as_deref());

            let launch = commands::up(&runtime, &name, project, &selection, build).await?;
            if launch.is_empty() {
                println!("No services to start for '{}'", name);
            } else {
                println!("✅ Project '{}' is up", name);
                println!("   prod: {}", list_or_dash(&launch.prod));
                println!("   dev:  {}", list_or_dash(&launch.dev));
            }
        }

        Commands::Down {
            name,
            remove_networks,
            remove_volumes,
            all,
        } => {
            let name = project_name(name, &cwd)?;
            let options = TeardownOptions {
                networks: Removal::from_flags(remove_networks, all),
                volumes: Removal::from_flags(remove_volumes, all),
            };

            let summary = commands::down(&runtime, &name, options, confirm).await?;
            if summary.is_noop() {
                println!("Nothing running for '{}'", name);
            } else {
                println!("✅ {} for '{}'", summary.describe(), name);
                for failed in &summary.failed {
                    println!("   ⚠ could not remove {}", failed);
                }
            }
        }

        Commands::Swap { args, build } => {
            let (name, service) = match args.as_slice() {
                [service] => (project_name(None, &cwd)?, service.clone()),
                [name, service] => (name.clone(), service.clone()),
                _ => {
                    return Err(DtopError::InvalidConfig(
                        "expected [PROJECT] SERVICE".to_string(),
                    ))
                }
            };
            let project = registry.require(&name)?;

            let outcome = commands::swap(&runtime, &name, project, &service, build).await?;
            println!(
                "✅ Swapped '{}' from {} → {}",
                outcome.service, outcome.from, outcome.to
            );
        }

        Commands::Ls { name } => {
            let listings = commands::ls(&runtime, name.as_deref()).await?;
            if listings.is_empty() {
                println!("No managed containers");
            }
            for listing in listings {
                println!("\n📦 {}", listing.project);
                println!("{}", commands::render_table(&listing));
            }
        }
    }

    Ok(())
}

/// The given name, or the name of the current directory
fn project_name(name: Option<String>, cwd: &Path) -> Result<String> {
    match name {
        Some(name) => Ok(name),
        None => cwd
            .file_name()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                DtopError::InvalidConfig("cannot derive a project name from this directory".to_string())
            }),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| DtopError::Prompt(e.to_string()))
}

fn list_or_dash(services: &[String]) -> String {
    if services.is_empty() {
        "-".to_string()
    } else {
        services.join(", ")
    }
}
