mod api;
mod cli;
mod config;
mod console;
mod error;
mod fetch;
mod io;
mod job;
mod logging;
mod outside;
mod progress;
#[cfg(test)]
mod test_utils;
mod types;

use clap::Parser;
use crossbeam_channel::unbounded;
use miette::{miette, Context, IntoDiagnostic, Result};
use tracing::{debug, info, warn};

use crate::{
    cli::Args,
    config::Config,
    console::Console,
    job::{DownloadJob, Downloader},
    logging::init_logging,
    outside::{Ffmpeg, UreqClient},
    progress::ChannelSink,
};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level)?;

    let mut config = Config::load(&args.config)?;
    if let Some(cookie) = args.cookie {
        config.set_cookie(Some(cookie));
        if args.save_cookie {
            // Not saving the cookie should not prevent the download
            if let Err(err) = config.save_cookie(&args.config) {
                warn!("Could not save the cookie: {err:?}");
            }
        }
    } else if args.save_cookie {
        warn!("No cookie given, nothing to save");
    }

    std::fs::create_dir_all(&args.out)
        .into_diagnostic()
        .wrap_err("Could not create out directory")?;
    let out_dir = std::path::absolute(&args.out)
        .into_diagnostic()
        .wrap_err("Could not resolve out directory")?;

    let ffmpeg = Ffmpeg::locate(args.ffmpeg);
    if let Err(err) = ffmpeg.check() {
        // Single-file videos can still be downloaded without it
        warn!("{}: {err}", ffmpeg.program().display());
    }

    let job = DownloadJob {
        id: args.id,
        out_dir,
        quality: args.quality,
    };

    let (send, recv) = unbounded();
    let http = UreqClient::new();

    let outcome = std::thread::scope(|scope| {
        let worker = std::thread::Builder::new()
            .name("worker".to_owned())
            .spawn_scoped(scope, {
                let (http, ffmpeg, config, job) = (&http, &ffmpeg, &config, &job);
                move || {
                    let sink = ChannelSink::new(send);
                    let mut downloader = Downloader::new(http, ffmpeg, config, &sink);
                    let res = downloader.run(job);
                    debug!("Worker exits, job {}", downloader.state());
                    res
                }
            })
            .into_diagnostic()
            .wrap_err("Could not spawn the worker thread")?;

        // The channel closes when the worker drops its sink
        let mut console = Console::new();
        for event in recv {
            console.render(event);
        }
        console.finish();

        worker
            .join()
            .map_err(|_| miette!("The worker thread panicked"))?
            .map_err(miette::Report::from)
    })?;

    info!(
        "Saved {} in quality {}",
        outcome.output.display(),
        outcome.quality
    );
    Ok(())
}
