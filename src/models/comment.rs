use serde::{Deserialize, Serialize};

/// A timestamped comment attached to a track position.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub track_id: String,
    /// Position within the track, in seconds.
    pub timestamp: f64,
    pub user_id: String,
    pub text: String,
    /// Unix seconds.
    pub created_at: u64,
}
