//! CLI entry point for spacetraveling

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(version)]
#[command(about = "A static blog generator for posts kept in Prismic", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Read posts from a JSON fixtures file instead of the content API
    #[arg(short, long, global = true)]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate,

    /// Generate the site and serve it locally
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Clean the public folder
    Clean,

    /// List the posts in the content repository
    List,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "spacetraveling=debug,info"
    } else {
        "spacetraveling=info"
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
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };
    let fixtures = cli.fixtures.map(|path| {
        if path.is_absolute() {
            path
        } else {
            base_dir.join(path)
        }
    });

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            spacetraveling::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::Generate => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            let client = blog.content_client(fixtures.as_deref())?;
            tracing::info!("Generating static files...");
            blog.generate(client.as_ref()).await?;
            println!("Generated successfully!");
        }

        Commands::Server { port, ip, open } => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            let client = blog.content_client(fixtures.as_deref())?;

            // Generate first
            tracing::info!("Generating static files...");
            blog.generate(client.as_ref()).await?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            spacetraveling::server::start(blog, client, &ip, port, open).await?;
        }

        Commands::Clean => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List => {
            let blog = spacetraveling::Blog::new(&base_dir)?;
            let client = blog.content_client(fixtures.as_deref())?;
            spacetraveling::commands::list::run(&blog, client.as_ref()).await?;
        }

        Commands::Version => {
            println!("spacetraveling version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
