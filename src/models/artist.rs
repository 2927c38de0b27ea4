use serde::{Deserialize, Serialize};

/// A time range attributed to one contributing artist within a track.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ArtistSegment {
    pub id: String,
    pub name: String,
    /// Social handle, shown in the legend when present.
    pub handle: Option<String>,
    pub start_time: f64,
    pub end_time: f64,
    /// Display color as RGB.
    pub color: [u8; 3],
    pub community: Option<String>,
}

impl ArtistSegment {
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time
    }

    pub fn color32(&self) -> egui::Color32 {
        egui::Color32::from_rgb(self.color[0], self.color[1], self.color[2])
    }
}
