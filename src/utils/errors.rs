use thiserror::Error;

/// Player-level errors. Engine and adapter failures are translated into state
/// flags at the boundary where they occur; these variants are what crosses
/// module seams and what the UI renders as messages.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The media engine failed to load or decode a track. Recoverable: the UI
    /// stays usable with transport controls disabled.
    #[error("failed to load media: {0}")]
    MediaLoad(String),

    /// The engine refused to start playback (no output device available).
    /// Recoverable: playback state reverts to paused.
    #[error("playback was rejected by the audio engine")]
    PlaybackRejected,

    /// A segment set failed validation at load time.
    #[error("invalid artist timeline: {0}")]
    InvalidTimeline(String),

    /// Wallet connection failed. Shown to the user, never affects playback.
    #[error("wallet connection failed: {0}")]
    WalletConnection(String),

    /// A comment could not be persisted. Logged; comments are additive so no
    /// rollback is required.
    #[error("failed to persist comment: {0}")]
    CommentPersist(String),
}
