//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Render front-matter Markdown documents through layouts", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every document into the public folder
    #[command(alias = "b")]
    Build,

    /// Parse, validate and render without writing anything
    Check,

    /// Create a new document
    New {
        /// Title of the new document
        title: String,

        /// Layout to record in the front-matter
        #[arg(short, long)]
        layout: Option<String>,

        /// Path for the new document, relative to the source folder
        #[arg(short, long)]
        path: Option<String>,
    },

    /// List documents
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove the public folder
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Build => {
            let folio = folio::Folio::new(&base_dir)?;
            tracing::info!("Building {:?}", folio.source_dir);
            let report = folio.build().await?;
            println!(
                "Built {} pages ({} skipped)",
                report.pages.len(),
                report.failures.len()
            );
        }

        Commands::Check => {
            let folio = folio::Folio::new(&base_dir)?;
            let report = folio.check().await?;
            if !report.is_clean() {
                anyhow::bail!(
                    "{} of {} documents failed:\n{}",
                    report.failures.len(),
                    report.total(),
                    report.failure_summary()
                );
            }
            println!("All {} documents OK", report.total());
        }

        Commands::New {
            title,
            layout,
            path,
        } => {
            let folio = folio::Folio::new(&base_dir)?;
            let created = folio::commands::new::create_post(
                &folio,
                &title,
                layout.as_deref(),
                path.as_deref(),
            )?;
            println!("Created: {:?}", created);
        }

        Commands::List { json } => {
            let folio = folio::Folio::new(&base_dir)?;
            folio::commands::list::run(&folio, json)?;
        }

        Commands::Clean => {
            let folio = folio::Folio::new(&base_dir)?;
            folio.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
