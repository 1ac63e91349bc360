//! Mixcut CLI — Command-line interface for rendering and analyzing edits.
//!
//! Usage:
//!   mixcut render <SOURCE>     Render an edit to a webm file
//!   mixcut simulate            Dry-run a render against the simulated host
//!   mixcut tracks              List the built-in music catalog
//!   mixcut analyze <SOURCE>    Generate metadata for a video file
//!   mixcut init <SOURCE>       Create an edit session for a source file
//!   mixcut show <SESSION>      Show an edit session

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "mixcut",
    about = "Video trimming, grading, and music mixing from the command line",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an edit to a webm file
    Render {
        /// Path to the source video
        source: PathBuf,

        /// Output file path (defaults to the configured exports directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Trim start in seconds
        #[arg(long, default_value = "0")]
        start: f64,

        /// Trim end in seconds (defaults to the source duration)
        #[arg(long)]
        end: Option<f64>,

        /// Source duration in seconds (until local probing lands)
        #[arg(long)]
        duration: f64,

        /// Playback rate: 0.5, 1, 1.5, or 2
        #[arg(long, default_value = "1")]
        rate: f64,

        /// Visual filter: original|grayscale|sepia|high-contrast|brighten|vintage|cyberpunk
        #[arg(long, default_value = "original")]
        filter: String,

        /// Music track id from the catalog (see `mixcut tracks`)
        #[arg(long)]
        track: Option<String>,

        /// Music volume [0.0, 1.0]
        #[arg(long, default_value = "0.4")]
        music_volume: f64,

        /// Source audio volume [0.0, 1.0]
        #[arg(long, default_value = "1.0")]
        video_volume: f64,

        /// Enable the voice clarity chain
        #[arg(long)]
        voice_clarity: bool,

        /// Enable the HD upscale look
        #[arg(long)]
        hd_upscale: bool,

        /// Capture frame rate
        #[arg(long, default_value = "30")]
        fps: u32,
    },

    /// Dry-run a render against the simulated host
    Simulate {
        /// Simulated source duration in seconds
        #[arg(long, default_value = "60")]
        duration: f64,

        /// Trim start in seconds
        #[arg(long, default_value = "0")]
        start: f64,

        /// Trim end in seconds (defaults to the simulated duration)
        #[arg(long)]
        end: Option<f64>,

        /// Playback rate: 0.5, 1, 1.5, or 2
        #[arg(long, default_value = "1")]
        rate: f64,

        /// Mix in the first catalog track
        #[arg(long)]
        music: bool,

        /// Enable the voice clarity chain
        #[arg(long)]
        voice_clarity: bool,

        /// Capture frame rate
        #[arg(long, default_value = "30")]
        fps: u32,
    },

    /// List the built-in music catalog
    Tracks {
        /// Show which track a mood hint selects
        #[arg(long)]
        mood: Option<String>,
    },

    /// Generate metadata for a video file
    Analyze {
        /// Path to the video file
        source: PathBuf,

        /// Analysis credential (overrides config and environment)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Create an edit session for a source file
    Init {
        /// Path to the source video
        source: PathBuf,

        /// Source duration in seconds
        #[arg(long)]
        duration: f64,

        /// Session file path (defaults to `<source>.mixcut.json`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show an edit session
    Show {
        /// Path to the session file
        session: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    mixcut_common::logging::init_logging(&mixcut_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Render {
            source,
            output,
            start,
            end,
            duration,
            rate,
            filter,
            track,
            music_volume,
            video_volume,
            voice_clarity,
            hd_upscale,
            fps,
        } => {
            commands::render::run(commands::render::RenderArgs {
                source,
                output,
                start,
                end,
                duration,
                rate,
                filter,
                track,
                music_volume,
                video_volume,
                voice_clarity,
                hd_upscale,
                fps,
            })
            .await
        }
        Commands::Simulate {
            duration,
            start,
            end,
            rate,
            music,
            voice_clarity,
            fps,
        } => commands::simulate::run(duration, start, end, rate, music, voice_clarity, fps),
        Commands::Tracks { mood } => commands::tracks::run(mood),
        Commands::Analyze { source, api_key } => commands::analyze::run(source, api_key),
        Commands::Init {
            source,
            duration,
            output,
        } => commands::init::run(source, duration, output),
        Commands::Show { session } => commands::show::run(session),
    }
}
