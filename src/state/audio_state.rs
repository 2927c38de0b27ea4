use crate::models::{ArtistSegment, ArtistTimeline};
use crate::state::playback::PlaybackClock;
use crate::state::preview::PreviewPolicy;
use crate::state::volume::VolumeControl;
use crate::utils::audio_controller::AudioController;
use crate::utils::waveform::WaveformAdapter;

pub struct AudioState {
    // Engine and adapters
    pub controller: AudioController,
    pub waveform: WaveformAdapter,

    // Playback core
    pub clock: PlaybackClock,
    pub policy: PreviewPolicy,
    pub volume: VolumeControl,

    // Current track info
    pub current_track_id: Option<String>,
    pub current_title: String,
    pub current_artist_label: String,
    pub timeline: ArtistTimeline,
    pub active_segment: Option<ArtistSegment>,

    /// Set when the engine reported the track ran to its end; the next play
    /// toggle reloads it from the start.
    pub track_ended: bool,
}

impl Default for AudioState {
    fn default() -> Self {
        Self {
            controller: AudioController::new(),
            waveform: WaveformAdapter::new(),
            clock: PlaybackClock::default(),
            policy: PreviewPolicy::default(),
            volume: VolumeControl::default(),
            current_track_id: None,
            current_title: String::new(),
            current_artist_label: String::new(),
            timeline: ArtistTimeline::empty(),
            active_segment: None,
            track_ended: false,
        }
    }
}

impl AudioState {
    /// Reset the per-track state on a track change. The engine, waveform and
    /// comment reloads are driven by the app.
    pub fn reset_track(&mut self) {
        self.clock.reset_for_track();
        self.active_segment = None;
        self.track_ended = false;
    }
}
