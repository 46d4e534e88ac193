mod repl;
mod widget;

use advisor_core::config::AppConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::widget::Widget;

#[derive(Parser)]
#[command(
    name = "routine-advisor",
    about = "Browse a beauty catalog, build a selection and get a personalized routine",
    version,
    author
)]
struct Cli {
    /// Path to config file (default: ~/.config/routine-advisor/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the catalog location (file path or http(s) URL)
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Override the assistant endpoint URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive advisor (default)
    Chat,

    /// Render the page once and exit
    Render {
        /// Write the page here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Apply this category before rendering
        #[arg(long)]
        category: Option<String>,
        /// Apply this search term before rendering
        #[arg(long)]
        search: Option<String>,
    },

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize default configuration file
    Init,
    /// Print config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "routine_advisor=info,warn".into()),
        )
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    if let Some(catalog) = &cli.catalog {
        config.catalog.source = catalog.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.assistant.endpoint = endpoint.clone();
    }

    tracing::debug!(
        "Catalog: {}, endpoint: {}, storage: {}",
        config.catalog.source,
        config.assistant.endpoint,
        config.storage_path().display(),
    );

    match cli.command {
        Some(Commands::Render {
            output,
            category,
            search,
        }) => {
            render_once(&config, output, category, search).await?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, &config)?;
        }
        Some(Commands::Chat) | None => {
            repl::run(config).await?;
        }
    }

    Ok(())
}

async fn render_once(
    config: &AppConfig,
    output: Option<PathBuf>,
    category: Option<String>,
    search: Option<String>,
) -> Result<()> {
    let mut widget = Widget::from_config(config)?;
    widget.start().await?;
    if let Some(category) = category {
        widget.set_category(&category).await?;
    }
    if let Some(term) = search {
        widget.set_search(&term).await?;
    }

    let page = widget.render_page();
    match output {
        Some(path) => {
            std::fs::write(&path, page)?;
            tracing::info!("Wrote page to {}", path.display());
        }
        None => println!("{}", page),
    }
    Ok(())
}

fn handle_config_command(action: Option<ConfigAction>, config: &AppConfig) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        Some(ConfigAction::Init) => {
            let path = AppConfig::default_path();
            if path.exists() {
                println!("Config already exists at: {}", path.display());
            } else {
                config.save()?;
                println!("Created default config at: {}", path.display());
            }
        }
        Some(ConfigAction::Path) => {
            println!("{}", AppConfig::default_path().display());
        }
    }
    Ok(())
}
