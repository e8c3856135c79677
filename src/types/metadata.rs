/// What the platform tells about a video before any stream is resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    /// Numeric archive id, `aid` in the API
    pub aid: u64,
    /// Id of the playable part, `cid` in the API
    pub cid: u64,
}
