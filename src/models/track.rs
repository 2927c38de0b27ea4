use serde::{Deserialize, Serialize};

/// A playable mix in the catalog.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist_label: String,
    /// Path to the audio file. The engine is authoritative for duration once
    /// the file is decoded; `total_duration` is advisory only.
    pub media_locator: String,
    pub total_duration: f64,
    /// Classification key used to select the artist segment set for this mix.
    pub community: Option<String>,
}
