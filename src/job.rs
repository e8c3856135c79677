use std::{fmt::Display, path::PathBuf};

use tracing::{debug, warn};

use crate::{
    api::{self, Resolved},
    config::Config,
    error::{ErrorKind, Result},
    fetch::fetch,
    io::{create_unused_dir, remove_leftover, sanitize_title, ScratchFiles},
    outside::{HttpClient, Muxer},
    progress::ProgressSink,
    types::{BvId, Quality, StreamSet},
};

/// One video to download
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub id: BvId,
    /// Root under which the video gets its own directory
    pub out_dir: PathBuf,
    pub quality: Quality,
}

/// Where a job stands.
///
/// ```text
/// Idle -> ResolvingMetadata -> ResolvingStream -> FetchingVideo
///      -> FetchingAudio -> Muxing -> Done
/// ```
/// Single-file videos go from `FetchingVideo` straight to `Done`.
/// `Failed` can follow any state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Idle,
    ResolvingMetadata,
    ResolvingStream,
    FetchingVideo,
    FetchingAudio,
    Muxing,
    Done,
    Failed(ErrorKind),
}

impl Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Idle => f.write_str("idle"),
            JobState::ResolvingMetadata => f.write_str("resolving metadata"),
            JobState::ResolvingStream => f.write_str("resolving stream"),
            JobState::FetchingVideo => f.write_str("fetching video"),
            JobState::FetchingAudio => f.write_str("fetching audio"),
            JobState::Muxing => f.write_str("muxing"),
            JobState::Done => f.write_str("done"),
            JobState::Failed(kind) => write!(f, "failed ({kind})"),
        }
    }
}

/// What a successful job produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub output: PathBuf,
    pub quality: Quality,
}

/// Run download jobs from metadata to the final container
pub struct Downloader<'a> {
    http: &'a dyn HttpClient,
    muxer: &'a dyn Muxer,
    config: &'a Config,
    sink: &'a dyn ProgressSink,
    state: JobState,
}

impl<'a> Downloader<'a> {
    pub fn new(
        http: &'a dyn HttpClient,
        muxer: &'a dyn Muxer,
        config: &'a Config,
        sink: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            http,
            muxer,
            config,
            sink,
            state: JobState::Idle,
        }
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Run the job to completion.
    ///
    /// The first error aborts the job and is returned as is. No step is
    /// retried.
    pub fn run(&mut self, job: &DownloadJob) -> Result<JobOutcome> {
        match self.run_steps(job) {
            Ok(outcome) => {
                self.set_state(JobState::Done);
                self.sink
                    .status(&format!("Download completed: {}", outcome.output.display()));
                Ok(outcome)
            }
            Err(err) => {
                self.set_state(JobState::Failed(err.kind()));
                self.sink.status(&format!("Download failed: {err}"));
                Err(err)
            }
        }
    }

    fn run_steps(&mut self, job: &DownloadJob) -> Result<JobOutcome> {
        let config = self.config;
        let cookie = config.cookie();
        if config.cookie_lacks_session() {
            warn!("The cookie has no SESSDATA field");
            self.sink.status(
                "Warning: the cookie has no SESSDATA field, high qualities may be unavailable",
            );
        }

        self.set_state(JobState::ResolvingMetadata);
        self.sink.status(&format!("Fetching information about {}", job.id));
        let metadata = api::get_metadata(self.http, &job.id, cookie)?;

        self.set_state(JobState::ResolvingStream);
        let Resolved { quality, streams } =
            api::resolve_streams(self.http, &metadata, job.quality, cookie, self.sink)?;
        debug!("Resolved quality {quality}, dash: {}", streams.is_dash());

        let title = sanitize_title(&metadata.title, job.id.as_str());
        let video_dir = create_unused_dir(&job.out_dir, &title)?;

        self.sink.status(&format!("Downloading: {}", metadata.title));
        self.sink.status(&format!("Saving to: {}", video_dir.display()));

        let output = video_dir.join(format!("{title}.mp4"));

        match streams {
            StreamSet::Dash {
                video_url,
                audio_url,
            } => {
                // Removed when leaving this scope, muxed or not
                let mut scratch = ScratchFiles::new();
                let video = scratch
                    .add(video_dir.join(format!("{title}_video.m4s")))
                    .to_path_buf();
                let audio = scratch
                    .add(video_dir.join(format!("{title}_audio.m4s")))
                    .to_path_buf();

                self.set_state(JobState::FetchingVideo);
                self.sink.status("Downloading the video stream...");
                fetch(self.http, &video_url, &video, cookie, self.sink)?;

                self.set_state(JobState::FetchingAudio);
                self.sink.status("Downloading the audio stream...");
                fetch(self.http, &audio_url, &audio, cookie, self.sink)?;

                self.set_state(JobState::Muxing);
                self.sink.status("Merging video and audio...");
                self.muxer
                    .mux(&video, &audio, &output)
                    .inspect_err(|_| remove_leftover(&output))?;
            }
            StreamSet::Single { url } => {
                self.set_state(JobState::FetchingVideo);
                self.sink.status("Downloading the video...");
                fetch(self.http, &url, &output, cookie, self.sink)
                    .inspect_err(|_| remove_leftover(&output))?;
            }
        }

        Ok(JobOutcome { output, quality })
    }

    fn set_state(&mut self, state: JobState) {
        debug!("Job state: {} -> {}", self.state, state);
        self.sink.state(&state);
        self.state = state;
    }
}
