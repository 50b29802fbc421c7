//! `dashcam` – command-line access to the dashcam's HTTP API.
//!
//! Lists recordings, fetches thumbnails and videos, mirrors a category to
//! disk and flips the recording switch.

mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use dashcam_client::{Category, Dashcam, FolderListing, ListQuery, VideoDescriptor};
use dashcam_common::config::{self, Config};

#[derive(Parser, Debug)]
#[command(name = "dashcam", version, about = "Talk to a dashcam over its Wi-Fi HTTP API")]
struct Cli {
    /// KEY=VALUE config file (defaults to /etc/dashcam/dashcam.conf if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Device base URL, overrides DASHCAM_HOST
    #[arg(long, global = true)]
    host: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List one page of recordings, newest first
    List {
        #[arg(short, long, default_value = "looping")]
        category: Category,
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,
        /// Defaults to PAGE_SIZE from the config
        #[arg(long, allow_negative_numbers = true)]
        page_size: Option<i64>,
        /// Print the raw listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a recording's thumbnail as <out>/<name>.jpg
    Thumbnail {
        /// Device path, e.g. /mnt/card/video_front/20250101_000000_f.ts
        path: String,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Stream a recording to <out>/<name>.mp4
    Download {
        path: String,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Download every recording of a category that is not on disk yet
    Sync {
        #[arg(short, long, default_value = "looping")]
        category: Category,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Start, stop or query recording
    Rec {
        #[command(subcommand)]
        action: RecAction,
    },
    /// Read or write a raw device parameter
    Param {
        #[command(subcommand)]
        action: ParamAction,
    },
}

#[derive(Subcommand, Debug)]
enum RecAction {
    Start,
    Stop,
    /// Print whether the device reports that it is recording
    Status,
}

#[derive(Subcommand, Debug)]
enum ParamAction {
    Get { name: String },
    Set { name: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // ── load config ──────────────────────────────────────────────────
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.host = host;
    }

    let cam = Dashcam::from_config(&config).context("Cannot set up dashcam client")?;

    match cli.command {
        Command::List {
            category,
            page,
            page_size,
            json,
        } => {
            let query = ListQuery::new(category)
                .page(page)
                .page_size(page_size.unwrap_or(config.page_size));
            let listing = cam
                .list(query)
                .await
                .with_context(|| format!("Cannot list {category}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                print_listing(category, listing.as_ref());
            }
        }
        Command::Thumbnail { path, out } => {
            let dir = out.unwrap_or_else(|| config.download_dir.clone());
            let saved = cam
                .download_thumbnail(&path, &dir)
                .await
                .with_context(|| format!("Cannot save thumbnail of {path}"))?;
            println!("{}", saved.display());
        }
        Command::Download { path, out } => {
            let dir = out.unwrap_or_else(|| config.download_dir.clone());
            info!("Downloading {path} – this can take over a minute");
            let saved = cam
                .download_video(&path, &dir)
                .await
                .with_context(|| format!("Cannot download {path}"))?;
            println!("{}", saved.display());
        }
        Command::Sync { category, out } => {
            let dir = out.unwrap_or_else(|| config.download_dir.join(category.name()));
            let report = sync::sync_category(&cam, category, config.page_size, &dir).await?;
            if report.failed > 0 {
                anyhow::bail!("{} recording(s) failed to download", report.failed);
            }
        }
        Command::Rec { action } => match action {
            RecAction::Start => {
                let ack = cam.start_recording().await?;
                println!("{} (result={})", ack.message, ack.result_code);
                println!("note: the device takes a few moments before `rec status` reflects this");
            }
            RecAction::Stop => {
                let ack = cam.stop_recording().await?;
                println!("{} (result={})", ack.message, ack.result_code);
                println!("note: the device takes a few moments before `rec status` reflects this");
            }
            RecAction::Status => {
                let recording = cam.is_recording().await?;
                println!("{}", if recording { "recording" } else { "not recording" });
            }
        },
        Command::Param { action } => match action {
            ParamAction::Get { name } => {
                let v = cam.get_param(&name).await?;
                println!("{name}={} (result={})", v.value, v.result_code);
            }
            ParamAction::Set { name, value } => {
                let ack = cam.set_param(&name, &value).await?;
                println!("{} (result={})", ack.message, ack.result_code);
            }
        },
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => config::load(p).context("Config load failed"),
        None if Path::new(Config::default_path()).exists() => {
            config::load(Path::new(Config::default_path())).context("Config load failed")
        }
        None => Ok(Config::default()),
    }
}

fn print_listing(category: Category, listing: Option<&FolderListing>) {
    let Some(listing) = listing.filter(|l| !l.videos.is_empty()) else {
        println!("No recordings in {category} on this page");
        return;
    };

    println!(
        "{category} ({}): {} of {} recording(s)",
        listing.category,
        listing.videos.len(),
        listing.total_count
    );
    for video in &listing.videos {
        println!("  {}", format_video(video));
    }
}

fn format_video(video: &VideoDescriptor) -> String {
    let when = video
        .created_at_utc()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| video.created_at_str.clone());
    format!(
        "{when}  {:>9.1} MB  {}",
        video.size_kb as f64 / 1024.0,
        video.path
    )
}
