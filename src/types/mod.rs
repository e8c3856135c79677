mod bvid;
mod metadata;
mod quality;
mod stream;

pub use bvid::BvId;
pub use metadata::VideoMetadata;
pub use quality::Quality;
pub use stream::StreamSet;
