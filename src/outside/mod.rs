mod command;
mod ffmpeg;
mod http;

#[cfg(test)]
pub use ffmpeg::MockMuxer;
pub use ffmpeg::{Ffmpeg, Muxer};
pub use http::{Body, HttpClient, RequestHeaders, UreqClient, SITE_URL};
