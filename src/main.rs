//! CLI entry point for blogview

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogview::commands;
use blogview::theme::Theme;
use blogview::Blog;

#[derive(Parser)]
#[command(name = "blogview")]
#[command(version)]
#[command(about = "Read, search and preview a static markdown blog", long_about = None)]
struct Cli {
    /// Site directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List posts, optionally filtered by text and tags
    #[command(alias = "ls")]
    List {
        /// Case-insensitive text to search for
        #[arg(short, long, default_value = "")]
        query: String,

        /// Only show posts with one of these tags (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Print matching posts as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all tags with their post counts
    Tags,

    /// Show a post's header and content
    Show {
        /// Post file name, relative to the pages directory
        file: String,

        /// Print rendered HTML instead of markdown
        #[arg(long)]
        html: bool,

        /// Colour scheme for highlighted code (light or dark)
        #[arg(long)]
        theme: Option<Theme>,
    },

    /// Search interactively, reading queries from stdin
    Search,

    /// Check the manifest against the pages directory
    Check,

    /// Start a local preview server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long)]
        ip: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blogview=debug,info"
    } else {
        "blogview=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let site_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::List { query, tags, json } => {
            let blog = Blog::new(&site_dir)?;
            let options = commands::list::ListOptions { query, tags, json };
            commands::list::run(&blog, &options)?;
        }

        Commands::Tags => {
            let blog = Blog::new(&site_dir)?;
            commands::tags::run(&blog)?;
        }

        Commands::Show { file, html, theme } => {
            let blog = Blog::new(&site_dir)?;
            commands::show::run(&blog, &file, html, theme)?;
        }

        Commands::Search => {
            let blog = Blog::new(&site_dir)?;
            commands::search::run(&blog).await?;
        }

        Commands::Check => {
            let blog = Blog::new(&site_dir)?;
            commands::check::run(&blog)?;
        }

        Commands::Server { port, ip, open } => {
            let blog = Blog::new(&site_dir)?;
            let ip = ip.unwrap_or_else(|| blog.config.server.ip.clone());
            let port = port.unwrap_or(blog.config.server.port);
            tracing::info!("Starting server at http://{}:{}", ip, port);
            blogview::server::start(&blog, &ip, port, open).await?;
        }

        Commands::Version => {
            println!("blogview version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
