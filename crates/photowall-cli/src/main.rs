use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "photowall")]
#[command(author, version, about = "A scrolling photo wall for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Photo list file (shorthand for `run --photos`)
    #[arg(short = 'f', long = "photos")]
    photos: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the wall in the terminal
    Run(RunArgs),
    /// Render a static markup snapshot of the wall
    Export(ExportArgs),
    /// Write a starter photo list to get going
    Sample {
        /// Where to write the sample list
        #[arg(default_value = "photos.toml")]
        output: PathBuf,
    },
    /// Validate a photo list file
    Check {
        /// Photo list file (.json or .toml)
        file: PathBuf,
    },
}

#[derive(Args, Clone)]
struct RunArgs {
    /// Photo list file (.json or .toml)
    #[arg(short = 'f', long)]
    photos: PathBuf,

    /// Scroll direction: up, down, left or right
    #[arg(short, long)]
    direction: Option<String>,

    /// Give each lane its own speed multiplier
    #[arg(long)]
    variable_speed: bool,

    /// Pause the whole wall on hover instead of one lane
    #[arg(long)]
    pause_all: bool,

    /// Load every image up front instead of on approach
    #[arg(long)]
    eager: bool,

    /// Base displacement per frame, in cells
    #[arg(long)]
    speed: Option<f64>,

    /// Lane width in terminal cells (vertical directions)
    #[arg(long, default_value_t = 24)]
    lane_width: u32,

    /// Item height in terminal cells
    #[arg(long, default_value_t = 9)]
    item_size: u32,
}

#[derive(Args)]
struct ExportArgs {
    /// Photo list file (.json or .toml)
    #[arg(short = 'f', long)]
    photos: PathBuf,

    /// Output file
    #[arg(short, long, default_value = "wall.html")]
    output: PathBuf,

    /// Wall width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Wall height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Scroll direction: up, down, left or right
    #[arg(short, long)]
    direction: Option<String>,

    /// Seed for the item shuffle, for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Process-wide defaults come from the user's config file when present
    photowall_core::set_defaults(photowall_core::WallConfig::load()?);

    // Handle shorthand: `photowall -f photos.toml`
    if let (None, Some(photos)) = (&cli.command, cli.photos) {
        let args = RunArgs {
            photos,
            direction: None,
            variable_speed: false,
            pause_all: false,
            eager: false,
            speed: None,
            lane_width: 24,
            item_size: 9,
        };
        return commands::run::run(args).await;
    }

    match cli.command {
        Some(Commands::Run(args)) => commands::run::run(args).await,
        Some(Commands::Export(args)) => commands::export::run(args),
        Some(Commands::Sample { output }) => commands::sample::run(&output),
        Some(Commands::Check { file }) => commands::check::run(&file),
        None => {
            println!("No photo list given.\n\nTo start a wall, run:");
            println!("  photowall run -f photos.toml");
            println!("\nTo create a starter list, run:");
            println!("  photowall sample");
            Ok(())
        }
    }
}
