use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use track_edit_config::EditorConfig;
use track_edit_core::{HistoryConfig, LocalTrackStore, SessionController, TrackStore};

mod script;

/// Replays track editing sessions against the undo/redo history engine.
#[derive(Parser, Debug)]
#[command(name = "track-edit", version, about)]
struct Cli {
    /// Config file (defaults to `track-edit.json` next to the executable).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a JSON script of session events and print the final state.
    Replay {
        /// Script file: a JSON array of steps.
        script: PathBuf,

        /// Save the final track to the local track store.
        #[arg(long)]
        save: bool,
    },
    /// List tracks in the local track store.
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The config is loaded under a temporary subscriber so its warnings are
    // not lost; the global one needs the configured log level.
    let config_path = cli.config.unwrap_or_else(EditorConfig::config_path);
    let config = load_config(&config_path, env_filter("info"), std::io::stderr);

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.log_level))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting track-edit");

    match cli.command {
        Command::Replay { script, save } => replay(&config, &script, save),
        Command::List => {
            let tracks = LocalTrackStore::open(&config.resolve_data_dir())?;
            for name in tracks.list_tracks()? {
                println!("{name}");
            }
            Ok(())
        }
    }
}

/// `RUST_LOG` if set, otherwise `default`.
fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn load_config<W>(path: &Path, filter: EnvFilter, writer: W) -> EditorConfig
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .finish();
    tracing::subscriber::with_default(bootstrap, || EditorConfig::load_or_create(path))
}

fn replay(config: &EditorConfig, path: &Path, save: bool) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    let steps = script::parse(&json)
        .with_context(|| format!("Failed to parse script: {}", path.display()))?;

    let history_config = HistoryConfig::with_max_depth(config.history_max_depth);
    let mut store = TrackStore::new();
    let mut session = SessionController::new(&history_config);
    let report = script::replay(&mut session, &mut store, steps, &config.default_profile);

    if save {
        match &report.document {
            Some(doc) => {
                let data_dir = config.resolve_data_dir();
                let tracks = LocalTrackStore::open(&data_dir)?;
                tracks.save_track(doc)?;
                tracing::info!("Saved '{}' to {}", doc.name(), data_dir.display());
            }
            None => tracing::warn!("Nothing to save: no active track"),
        }
    }

    let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{out}");
    Ok(())
}
