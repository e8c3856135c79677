/// Source URLs of a resolved video
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSet {
    /// Separate video-only and audio-only streams, to be muxed client-side
    Dash { video_url: String, audio_url: String },

    /// One legacy URL already carrying both video and audio
    Single { url: String },
}

impl StreamSet {
    pub fn is_dash(&self) -> bool {
        matches!(self, StreamSet::Dash { .. })
    }
}
