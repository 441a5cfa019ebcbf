mod api;
mod app;
mod config;
mod input;
mod lyrics;
mod player;
mod queue;
mod storage;
mod tui;

use anyhow::Context;
use api::models::{SongDetail, TrackRef};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Parser)]
#[command(name = "cloudtide", version, about = "Terminal music player for NetEase Cloud Music")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the interactive TUI (default).
    Tui,
    /// Resolve a playable stream for a track and print it (headless).
    Resolve { id: u64 },
    /// Print a track's time-synced lyrics (headless).
    Lyrics { id: u64 },
    /// Print a track's details (headless).
    Info { id: u64 },

    /// Inspect or edit the persisted play queue.
    Queue {
        #[command(subcommand)]
        cmd: QueueCommand,
    },

    /// Point the client at a music API server.
    Api {
        base_url: String,
        /// Requested stream quality: standard, higher, exhigh, lossless, hires.
        #[arg(long)]
        quality: Option<String>,
    },

    /// Manage the login session cookie.
    Auth {
        #[command(subcommand)]
        method: AuthCommand,
    },

    /// Audio output device management (mpv).
    Audio {
        #[command(subcommand)]
        cmd: AudioCommand,
    },
}

#[derive(Debug, Subcommand)]
enum QueueCommand {
    /// List queued tracks; the current one is marked.
    List,
    /// Append a track by id.
    Add { id: u64 },
    /// Remove every track.
    Clear,
}

#[derive(Debug, Subcommand)]
enum AuthCommand {
    /// Store a `MUSIC_U=...` session cookie.
    Cookie { value: String },
    /// Forget the session and play anonymously.
    Clear,
}

#[derive(Debug, Subcommand)]
enum AudioCommand {
    /// List mpv audio devices.
    List,
    /// Set mpv audio device (name as shown in list).
    Set { device: String },
    /// Clear mpv audio device override.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;
    let cfg_path = match cli.config.clone() {
        Some(p) => p,
        None => config::default_config_path().context("default config path")?,
    };

    let command = cli.command.unwrap_or(Command::Tui);
    init_logging(&cfg, matches!(command, Command::Tui))?;

    match command {
        Command::Tui => {
            let mut app = app::App::new(cfg, cfg_path)?;
            let mut terminal = tui::TerminalGuard::enter().context("init terminal")?;
            app.run(terminal.terminal_mut()).await?;
        }
        Command::Resolve { id } => {
            let client = make_client(&cfg)?;
            let resolver = api::StreamResolver::new(
                client,
                api::resolve::QualityLevel::parse(&cfg.api.quality),
            );
            match resolver.resolve(id).await {
                Ok(stream) => println!("{}", serde_json::to_string_pretty(&stream)?),
                Err(e) => {
                    let reason = player::FailureReason::from_fee_tier(e.fee_tier);
                    anyhow::bail!("{e}: {}", reason.message());
                }
            }
        }
        Command::Lyrics { id } => {
            let client = make_client(&cfg)?;
            let raw = lyrics::fetch_lyrics(&client, id)
                .await
                .context("fetch lyrics")?;
            let timeline = raw
                .as_deref()
                .map(lyrics::LyricTimeline::parse)
                .unwrap_or_default();
            if timeline.is_empty() {
                println!("No synced lyrics for track {id}.");
            } else {
                print!("{}", timeline.to_lrc());
            }
        }
        Command::Info { id } => {
            let client = make_client(&cfg)?;
            let detail = api::song_detail(&client, id)
                .await
                .context("fetch song detail")?
                .with_context(|| format!("no such track: {id}"))?;
            print_detail(&detail);
        }
        Command::Queue { cmd } => {
            let store: storage::SharedStore = Arc::new(storage::Storage::open(&cfg.db_path())?);
            let mut queue = queue::Queue::restore(store);
            match cmd {
                QueueCommand::List => print_queue(&queue),
                QueueCommand::Add { id } => {
                    let client = make_client(&cfg)?;
                    let track = match api::song_detail(&client, id).await {
                        Ok(Some(d)) => d.to_track_ref(),
                        Ok(None) => anyhow::bail!("no such track: {id}"),
                        Err(e) => {
                            tracing::warn!("song detail for {id}: {e}");
                            TrackRef {
                                id,
                                name: format!("Track {id}"),
                                artists: Vec::new(),
                            }
                        }
                    };
                    println!("Queued: {}", track.display());
                    queue.append(track);
                }
                QueueCommand::Clear => {
                    queue.clear();
                    println!("Cleared queue.");
                }
            }
        }
        Command::Api { base_url, quality } => {
            let mut cfg = cfg;
            cfg.api.base_url = base_url;
            if let Some(q) = quality {
                cfg.api.quality = q;
            }
            config::save(&cfg, cli.config.as_deref()).context("save config")?;
            println!("Updated API settings.");
        }
        Command::Auth { method } => {
            let mut cfg = cfg;
            match method {
                AuthCommand::Cookie { value } => {
                    cfg.api.cookie = Some(value.trim().to_string());
                }
                AuthCommand::Clear => {
                    cfg.api.cookie = None;
                }
            }
            config::save(&cfg, cli.config.as_deref()).context("save config")?;
            println!("Updated config auth settings.");
        }
        Command::Audio { cmd } => match cmd {
            AudioCommand::List => {
                for dev in player::mpv::list_audio_devices().await? {
                    println!("{dev}");
                }
            }
            AudioCommand::Set { device } => {
                let mut cfg = cfg;
                cfg.player.audio_device = Some(device);
                config::save(&cfg, cli.config.as_deref()).context("save config")?;
                println!("Updated audio device in config.");
            }
            AudioCommand::Clear => {
                let mut cfg = cfg;
                cfg.player.audio_device = None;
                config::save(&cfg, cli.config.as_deref()).context("save config")?;
                println!("Cleared audio device override.");
            }
        },
    }

    Ok(())
}

/// Headless commands log to stderr; the TUI owns the terminal, so it logs
/// to a file under the data dir instead.
fn init_logging(cfg: &config::Config, to_file: bool) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.log.level());

    if to_file {
        let path = cfg.log_path();
        let file = open_log(&path)?;
        builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

fn open_log(path: &Path) -> anyhow::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))
}

fn make_client(cfg: &config::Config) -> anyhow::Result<api::NcmClient> {
    api::NcmClient::new(&cfg.api.base_url, cfg.api.cookie.clone())
}

fn print_detail(d: &SongDetail) {
    println!("{} (id={})", d.name, d.id);
    println!("  artists: {}", d.artist_names().join(", "));
    if let Some(album) = d.album_name() {
        println!("  album:   {album}");
    }
    let secs = d.duration_ms / 1000;
    println!("  length:  {:02}:{:02}", secs / 60, secs % 60);
    println!("  access:  {}", d.fee_tier());
    if let Some(cover) = d.cover_url() {
        println!("  cover:   {cover}");
    }
}

fn print_queue(queue: &queue::Queue) {
    if queue.is_empty() {
        println!("Queue is empty.");
        return;
    }
    for (i, t) in queue.tracks().iter().enumerate() {
        let marker = if queue.current_index() == Some(i) { '>' } else { ' ' };
        println!("{marker}{:02}. {}  (id={})", i + 1, t.display(), t.id);
    }
    if let Some(t) = queue.current_track() {
        println!("Current: {}", t.display());
    }
}
