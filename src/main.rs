//! CLI entry point for folio-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Bundle and render markdown content for a single-page personal site", long_about = None)]
struct Cli {
    /// Set the site root (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bundle the content directory into the generated data module
    #[command(alias = "b")]
    Bundle {
        /// Rebundle when content changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Render one bundled document to HTML
    #[command(alias = "r")]
    Render {
        /// Content key, e.g. articles/2024.10.6
        key: String,
    },

    /// List bundled content or catalog entries
    List {
        /// What to list (content, catalog, missing)
        #[arg(default_value = "catalog")]
        r#type: String,
    },

    /// Fetch a document from the remote repository and render it
    Fetch {
        /// Repository-relative path, e.g. content/articles/2024.10.6.md
        path: String,
    },

    /// Show or change the theme preference
    Theme {
        /// light, dark or toggle
        action: Option<String>,
    },

    /// Start a local preview server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Disable watching and live reload
        #[arg(long)]
        r#static: bool,
    },

    /// Remove the generated data module
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "folio_rs=debug,info"
    } else {
        "folio_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let command = cli.command.unwrap_or(Commands::Bundle { watch: false });

    match command {
        Commands::Bundle { watch } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            tracing::info!("Bundling {:?}...", folio.content_dir);

            let count = folio.bundle()?;
            println!("Bundled {} markdown files", count);
            println!("Output: {}", folio.output_path.display());

            if watch {
                folio_rs::commands::bundle::watch(&folio).await?;
            }
        }

        Commands::Render { key } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio_rs::commands::render::run(&folio, &key)?;
        }

        Commands::List { r#type } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio_rs::commands::list::run(&folio, &r#type)?;
        }

        Commands::Fetch { path } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio_rs::commands::fetch::run(&folio, &path).await?;
        }

        Commands::Theme { action } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            let theme = folio_rs::commands::theme::run(&folio, action.as_deref())?;
            println!("Theme: {}", theme.as_str());
        }

        Commands::Serve { port, ip, r#static } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio_rs::server::start(&folio, &ip, port, !r#static).await?;
        }

        Commands::Clean => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("folio-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
