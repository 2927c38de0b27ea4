//! Built-in track catalog and per-artist segment data for the Side by Side
//! mixes. A JSON catalog file can override the built-ins.

use crate::models::{ArtistSegment, ArtistTimeline, Track};
use crate::utils::errors::PlayerError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Catalog {
    pub tracks: Vec<Track>,
    pub artists: Vec<ArtistSegment>,
}

impl Catalog {
    /// Load a catalog from a JSON file (same shape as the built-ins).
    pub fn load_from(path: &Path) -> Result<Self, PlayerError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PlayerError::MediaLoad(format!("catalog {}: {}", path.display(), e)))?;
        let catalog: Catalog = serde_json::from_str(&raw)
            .map_err(|e| PlayerError::MediaLoad(format!("catalog {}: {}", path.display(), e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Every per-track segment set must form a valid timeline.
    pub fn validate(&self) -> Result<(), PlayerError> {
        for track in &self.tracks {
            self.timeline_for(track)?;
        }
        Ok(())
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// The validated artist timeline for a track, filtered by community tag.
    /// A track without a community tag gets an empty timeline.
    pub fn timeline_for(&self, track: &Track) -> Result<ArtistTimeline, PlayerError> {
        let Some(community) = &track.community else {
            return Ok(ArtistTimeline::empty());
        };
        let segments: Vec<ArtistSegment> = self
            .artists
            .iter()
            .filter(|a| a.community.as_ref() == Some(community))
            .cloned()
            .collect();
        ArtistTimeline::from_segments(segments)
    }
}

pub static BUILT_IN: Lazy<Catalog> = Lazy::new(built_in);

/// Pastel color from a deterministic golden-angle hue walk, so each artist
/// keeps a stable color across runs.
fn pastel_color(seed: u32) -> [u8; 3] {
    let hue = (seed as f64 * 137.5) % 360.0;
    hsl_to_rgb(hue, 0.70, 0.80)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    [
        ((r1 + m) * 255.0).round() as u8,
        ((g1 + m) * 255.0).round() as u8,
        ((b1 + m) * 255.0).round() as u8,
    ]
}

fn hex_color(hex: u32) -> [u8; 3] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8]
}

fn contributor(
    id: &str,
    name: &str,
    handle: &str,
    start: f64,
    end: f64,
    color: [u8; 3],
    community: &str,
) -> ArtistSegment {
    ArtistSegment {
        id: id.to_string(),
        name: name.to_string(),
        handle: Some(handle.to_string()),
        start_time: start,
        end_time: end,
        color,
        community: Some(community.to_string()),
    }
}

fn built_in() -> Catalog {
    let tracks = vec![
        Track {
            id: "midi-punk-1".to_string(),
            title: "MIDI VERSION".to_string(),
            artist_label: "MidipunkZ".to_string(),
            media_locator: "assets/audio/ZAO MiDiPunkz MIDI VERSION MIX1.mp3".to_string(),
            total_duration: 210.0,
            community: Some("midipunkz".to_string()),
        },
        Track {
            id: "midi-punk-2".to_string(),
            title: "ZAO VERSION".to_string(),
            artist_label: "ZAO".to_string(),
            media_locator: "assets/audio/ZAO MiDiPunkz ZAO VERSION MIX2.mp3".to_string(),
            total_duration: 190.0,
            community: Some("zao".to_string()),
        },
    ];

    let midipunkz: &[(&str, &str, &str, f64, f64)] = &[
        ("1", "tkfmide", "@tkfmide", 0.0, 13.0),
        ("2", "Sir_Cut_Em_Up", "@Sir_Cut_Em_Up", 13.0, 68.0),
        ("3", "Vans_Cmkro", "@Vans_Cmkro", 68.0, 71.0),
        ("4", "Ramadzo", "@_Ramadzo", 71.0, 75.0),
        ("5", "Neverroninn", "@Neverroninn_", 75.0, 77.0),
        ("6", "flokdex", "@flokdex", 77.0, 78.0),
        ("7", "tch567", "@tch567", 78.0, 79.0),
        ("8", "ShaneTWalker", "@ShaneTWalker", 79.0, 82.0),
        ("9", "TeraBitcoins", "@TeraBitcoins", 82.0, 83.0),
        ("10", "Lord_iiiip", "@Lord_iiiip", 83.0, 84.0),
        ("11", "Finderfound", "@Finderfound", 84.0, 85.0),
        ("12", "iraxlab", "@iraxlab", 85.0, 87.0),
        ("13", "SketchLight_ray", "@SketchLight_ray", 87.0, 89.0),
        ("14", "ebabur_art", "@ebabur_art", 89.0, 116.0),
        ("15", "PrizemArtNft", "@PrizemArtNft", 116.0, 125.0),
        ("16", "Davc_s", "@Davc_s", 125.0, 127.0),
        ("17", "DorkLovesSports", "@DorkLovesSports", 127.0, 130.0),
        ("18", "LMDesigns8", "@LMDesigns8", 130.0, 137.0),
        ("19", "KremBeats", "@KremBeats", 137.0, 155.0),
        ("20", "StoopidPenguin", "@StoopidPenguin_", 155.0, 156.0),
        ("21", "David_Doran", "@_David_Doran", 156.0, 194.0),
        ("22", "Visheh", "@Visheh_xyz", 194.0, 210.0),
    ];

    let zao: &[(&str, &str, f64, f64, u32)] = &[
        ("zao1", "ZAO Artist 1", 0.0, 35.0, 0xFF5252),
        ("zao2", "ZAO Artist 2", 35.0, 70.0, 0x2196F3),
        ("zao3", "ZAO Artist 3", 70.0, 105.0, 0x4CAF50),
        ("zao4", "ZAO Artist 4", 105.0, 140.0, 0xFF9800),
        ("zao5", "ZAO Artist 5", 140.0, 190.0, 0x9C27B0),
    ];

    let mut artists = Vec::new();
    for (i, (id, name, handle, start, end)) in midipunkz.iter().enumerate() {
        artists.push(contributor(
            id,
            name,
            handle,
            *start,
            *end,
            pastel_color(i as u32 + 1),
            "midipunkz",
        ));
    }
    for (id, name, start, end, color) in zao {
        artists.push(ArtistSegment {
            id: id.to_string(),
            name: name.to_string(),
            handle: None,
            start_time: *start,
            end_time: *end,
            color: hex_color(*color),
            community: Some("zao".to_string()),
        });
    }

    Catalog { tracks, artists }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_catalog_validates() {
        BUILT_IN.validate().unwrap();
        assert_eq!(BUILT_IN.tracks.len(), 2);
    }

    #[test]
    fn timelines_cover_their_tracks() {
        let midi = BUILT_IN.track("midi-punk-1").unwrap();
        let timeline = BUILT_IN.timeline_for(midi).unwrap();
        assert_eq!(timeline.segments().len(), 22);
        assert_eq!(timeline.active_segment(0.0).unwrap().name, "tkfmide");
        assert_eq!(timeline.active_segment(140.0).unwrap().name, "KremBeats");

        let zao = BUILT_IN.track("midi-punk-2").unwrap();
        let timeline = BUILT_IN.timeline_for(zao).unwrap();
        assert_eq!(timeline.segments().len(), 5);
        assert!(timeline.active_segment(190.0).is_none());
    }

    #[test]
    fn pastel_colors_are_pastel() {
        for seed in 1..30 {
            let [r, g, b] = pastel_color(seed);
            // 80% lightness keeps every channel comfortably bright
            assert!(r > 100 || g > 100 || b > 100);
        }
    }

    #[test]
    fn json_round_trip_preserves_catalog() {
        let json = serde_json::to_string(&*BUILT_IN).unwrap();
        let parsed: Catalog = serde_json::from_str(&json).unwrap();
        parsed.validate().unwrap();
        assert_eq!(parsed.artists.len(), BUILT_IN.artists.len());
    }
}
