use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    outside::{HttpClient, RequestHeaders, SITE_URL},
    progress::ProgressSink,
    types::{Quality, StreamSet, VideoMetadata},
};

use super::{parse_data, API_URL};

/// Ask for every stream format the account may see: dash, HDR, 4K, 8K, Dolby
const FNVAL: u32 = 4048;

#[derive(Debug, Deserialize)]
struct PlayUrlData {
    #[serde(default)]
    accept_quality: Option<Vec<Quality>>,
    #[serde(default)]
    dash: Option<Dash>,
    #[serde(default)]
    durl: Option<Vec<Durl>>,
}

#[derive(Debug, Deserialize)]
struct Dash {
    #[serde(default)]
    video: Option<Vec<DashVideo>>,
    #[serde(default)]
    audio: Option<Vec<DashAudio>>,
}

// Entries carry the URL twice, as `baseUrl` and `base_url`.
// Only one of them may be mapped or serde sees a duplicate field.
#[derive(Debug, Deserialize)]
struct DashVideo {
    id: Quality,
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(default)]
    codecs: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DashAudio {
    #[serde(rename = "baseUrl")]
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Durl {
    url: String,
}

/// Outcome of stream resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The tier actually served, which may differ from the requested one
    pub quality: Quality,
    pub streams: StreamSet,
}

/// Find the source URLs of a video for the requested quality.
///
/// If the platform does not offer the requested quality, the first tier it
/// lists (normally the best one) is used instead. This substitution happens
/// at most once.
pub fn resolve_streams(
    http: &dyn HttpClient,
    metadata: &VideoMetadata,
    requested: Quality,
    cookie: Option<&str>,
    sink: &dyn ProgressSink,
) -> Result<Resolved> {
    let mut quality = requested;
    let mut substituted = false;

    loop {
        let data = request_play_url(http, metadata, quality, cookie)?;
        let accepted = data.accept_quality.as_deref().unwrap_or_default();

        let Some(&best) = accepted.first() else {
            warn!("The platform offers no quality for aid={}", metadata.aid);
            return Err(Error::NoPlayableFormat);
        };

        let listing: Vec<String> = accepted.iter().map(Quality::to_string).collect();
        sink.status(&format!("Available qualities: {}", listing.join(", ")));

        if !accepted.contains(&quality) {
            if substituted {
                // The platform listed a tier then did not offer it
                warn!("Substituted quality {quality} is still not offered");
                return Err(Error::NoPlayableFormat);
            }

            sink.status(&format!(
                "Quality {quality} is not available, switching to the best available one: {best}"
            ));
            quality = best;
            substituted = true;
            continue;
        }

        let streams = select_streams(data, quality, sink)?;
        return Ok(Resolved { quality, streams });
    }
}

fn request_play_url(
    http: &dyn HttpClient,
    metadata: &VideoMetadata,
    quality: Quality,
    cookie: Option<&str>,
) -> Result<PlayUrlData> {
    let VideoMetadata { aid, cid, .. } = metadata;
    let url = format!(
        "{API_URL}/x/player/playurl?avid={aid}&cid={cid}&qn={}&fnval={FNVAL}&fourk=1&fnver=0",
        quality.code()
    );
    let referer = format!("{SITE_URL}/video/av{aid}");

    let body = http.get_text(
        &url,
        RequestHeaders {
            cookie,
            referer: Some(&referer),
        },
    )?;

    parse_data("playurl", &body, |code, message| match code {
        -404 => Error::NotFound {
            id: format!("av{aid}"),
        },
        -403 => Error::PermissionDenied,
        code => Error::Unknown {
            code: Some(code),
            message,
        },
    })
}

/// Pick the URLs to download out of a play URL answer
fn select_streams(
    data: PlayUrlData,
    quality: Quality,
    sink: &dyn ProgressSink,
) -> Result<StreamSet> {
    if let Some(dash) = data.dash {
        let video = dash
            .video
            .unwrap_or_default()
            .into_iter()
            .find(|video| video.id == quality);
        let audio = dash.audio.unwrap_or_default().into_iter().next();

        if let Some(video) = &video {
            debug!("Video codecs: {:?}", video.codecs);
            sink.status(&format!("Found video stream {}", video.id));
        }
        if audio.is_some() {
            sink.status("Found audio stream");
        }

        return match (video, audio) {
            (Some(video), Some(audio)) => Ok(StreamSet::Dash {
                video_url: video.base_url,
                audio_url: audio.base_url,
            }),
            _ => Err(Error::IncompleteStreams { quality }),
        };
    }

    if let Some(first) = data.durl.and_then(|durl| durl.into_iter().next()) {
        sink.status("Using the single-file format");
        return Ok(StreamSet::Single { url: first.url });
    }

    Err(Error::NoPlayableFormat)
}
