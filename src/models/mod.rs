// Data models for the Side by Side catalog

pub mod artist;
pub mod comment;
pub mod timeline;
pub mod track;

// Re-export commonly used types
pub use artist::ArtistSegment;
pub use comment::Comment;
pub use timeline::ArtistTimeline;
pub use track::Track;
