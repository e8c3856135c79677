use std::fmt::Display;

use miette::Diagnostic;
use thiserror::Error;

use crate::types::Quality;

/// Everything that can abort a download job.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Video {id} does not exist or has been removed")]
    #[diagnostic(code(bvdl::not_found))]
    NotFound { id: String },

    #[error("The platform refused to serve this video")]
    #[diagnostic(
        code(bvdl::permission_denied),
        help(
            "check that the cookie is filled in correctly and contains the SESSDATA field, \
            or that the account is allowed to watch this quality"
        )
    )]
    PermissionDenied,

    #[error("Could not find both a video and an audio stream for quality {quality}")]
    #[diagnostic(code(bvdl::incomplete_streams))]
    IncompleteStreams { quality: Quality },

    #[error("No playable format was offered for this video")]
    #[diagnostic(code(bvdl::no_playable_format))]
    NoPlayableFormat,

    #[error("Could not parse the response of the {endpoint} endpoint: {reason}")]
    #[diagnostic(code(bvdl::response_parse))]
    ResponseParse {
        endpoint: &'static str,
        reason: String,
    },

    #[error("Request to {url} failed: {reason}")]
    #[diagnostic(code(bvdl::transport))]
    Transport { url: String, reason: String },

    #[error("Muxing failed: {reason}")]
    #[diagnostic(
        code(bvdl::mux),
        help("ffmpeg must be on the PATH, next to the executable, or given with --ffmpeg")
    )]
    Mux { reason: String },

    #[error("{}{message}", answer_prefix(.code))]
    #[diagnostic(
        code(bvdl::unknown),
        help("try updating the cookie or check that the video plays in a browser")
    )]
    /// `code` is missing when no answer could be read at all
    Unknown { code: Option<i64>, message: String },

    #[error("{context}")]
    #[diagnostic(code(bvdl::io))]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Field-less mirror of [`Error`], cheap to copy into job states and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    IncompleteStreams,
    NoPlayableFormat,
    ResponseParse,
    Transport,
    Mux,
    Unknown,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::PermissionDenied => ErrorKind::PermissionDenied,
            Error::IncompleteStreams { .. } => ErrorKind::IncompleteStreams,
            Error::NoPlayableFormat => ErrorKind::NoPlayableFormat,
            Error::ResponseParse { .. } => ErrorKind::ResponseParse,
            Error::Transport { .. } => ErrorKind::Transport,
            Error::Mux { .. } => ErrorKind::Mux,
            Error::Unknown { .. } => ErrorKind::Unknown,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    pub fn io<D: Display>(context: D, source: std::io::Error) -> Self {
        Error::Io {
            context: context.to_string(),
            source,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::PermissionDenied => "permission denied",
            ErrorKind::IncompleteStreams => "incomplete streams",
            ErrorKind::NoPlayableFormat => "no playable format",
            ErrorKind::ResponseParse => "response parse error",
            ErrorKind::Transport => "transport error",
            ErrorKind::Mux => "mux error",
            ErrorKind::Unknown => "unknown error",
            ErrorKind::Io => "io error",
        };
        f.write_str(name)
    }
}

fn answer_prefix(code: &Option<i64>) -> String {
    match code {
        Some(code) => format!("The platform answered with code {code}: "),
        None => "Unexpected failure: ".to_owned(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
