use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use crate::{
    config::DEFAULT_CONFIG_FILE,
    types::{BvId, Quality},
};

macro_rules! arg_env {
    ($v:literal) => {
        concat!("BVDL_", $v)
    };
}

/// Download a bilibili video from its BV id.
/// Resolve the best available stream, fetch video and audio, and merge them with ffmpeg.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// The BV id of the video (e.g. BV1xx411c7mD) or the URL of its page
    #[arg(env=arg_env!("ID"))]
    pub id: BvId,

    /// The directory under which the video gets its own folder
    #[arg(long, default_value = "downloads", env=arg_env!("OUT"))]
    pub out: PathBuf,

    /// The wanted quality, as a tier code or a label:
    /// 16 (360P), 32 (480P), 64 (720P), 80 (1080P), 112 (1080P+),
    /// 116 (1080P60), 120 (4K), 125 (HDR), 126 (Dolby Vision), 127 (8K).
    ///
    /// If the video does not offer it, the best available quality is used.
    #[arg(long, short, default_value = "80", env=arg_env!("QUALITY"))]
    pub quality: Quality,

    /// The cookie of a logged-in browser session.
    /// Qualities above 480P need one, with its SESSDATA field.
    ///
    /// Overrides the cookie of the config file.
    #[arg(long, env=arg_env!("COOKIE"), hide_env_values = true)]
    pub cookie: Option<String>,

    /// Save the cookie to the config file so later runs can omit it
    #[arg(long)]
    pub save_cookie: bool,

    /// The path to the JSON config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, env=arg_env!("CONFIG"))]
    pub config: PathBuf,

    /// The ffmpeg program to merge streams with.
    /// Defaults to an ffmpeg next to this executable, then to the one on the PATH
    #[arg(long, env=arg_env!("FFMPEG"))]
    pub ffmpeg: Option<PathBuf>,

    /// The maximum level of the logs to display
    #[arg(long, default_value_t = Level::INFO, env=arg_env!("LOG_LEVEL"))]
    pub log_level: Level,
}
