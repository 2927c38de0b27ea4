//! Playback clock: the single source of truth for playback position.
//!
//! Two time sources feed it - external seek intents (progress-bar clicks,
//! deep links, segment navigation) and the continuously advancing time the
//! media engine reports. The clock reconciles them, consults the preview gate
//! on every tick, and resolves the active artist before notifying the host.

use crate::constants::SYNC_EPSILON_SECS;
use crate::models::{ArtistSegment, ArtistTimeline};
use crate::state::preview::{PreviewGate, PreviewPolicy};
use crate::utils::errors::PlayerError;

/// Outgoing command surface of the media engine. The rodio controller
/// implements this for real playback; tests substitute a recording mock.
pub trait MediaEngine {
    fn seek(&mut self, position: f64);
    fn play(&mut self) -> Result<(), PlayerError>;
    fn pause(&mut self);
}

/// Playback state owned and mutated exclusively by [`PlaybackClock`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub position: f64,
    /// 0 until the engine reports the track loaded.
    pub duration: f64,
    pub is_playing: bool,
    /// Gates seek/play operations.
    pub is_loaded: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            position: 0.0,
            duration: 0.0,
            is_playing: false,
            is_loaded: false,
        }
    }
}

/// What the host observes after an engine tick. By the time a consumer sees
/// an artist change here, the position already respects the preview boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub active_segment: Option<ArtistSegment>,
    pub preview_stopped: bool,
}

pub struct PlaybackClock {
    state: PlaybackState,
    /// Deep-link seed, applied once the engine reports loaded.
    pending_initial_position: Option<f64>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            state: PlaybackState::default(),
            pending_initial_position: None,
        }
    }
}

impl PlaybackClock {
    pub fn position(&self) -> f64 {
        self.state.position
    }

    pub fn duration(&self) -> f64 {
        self.state.duration
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded
    }

    /// Reset on every track change. Any pending deep-link position carries
    /// over only if requested again by the caller.
    pub fn reset_for_track(&mut self) {
        self.state = PlaybackState::default();
        self.pending_initial_position = None;
    }

    /// Seed the initial position (deep-linked `t` parameter). Applied when
    /// the engine reports loaded, clamped to the real duration.
    pub fn request_initial_position(&mut self, time: f64) {
        self.pending_initial_position = Some(time.max(0.0));
    }

    /// External seek intent. Issues an engine seek only when the requested
    /// time differs from the engine-reported time by more than the sync
    /// epsilon; near-equal values are ignored to prevent feedback loops.
    pub fn on_external_time_requested(&mut self, time: f64, engine: &mut dyn MediaEngine) {
        if !self.state.is_loaded {
            return;
        }
        if (time - self.state.position).abs() > SYNC_EPSILON_SECS {
            let target = time.clamp(0.0, self.state.duration);
            log::debug!("[Clock] External seek to {:.2}s", target);
            engine.seek(target);
            self.state.position = target;
        }
    }

    /// Engine tick. In order: update position, evaluate the preview gate,
    /// recompute the active artist, notify the host via the returned tick.
    pub fn on_engine_time_advanced(
        &mut self,
        time: f64,
        timeline: &ArtistTimeline,
        policy: &PreviewPolicy,
        engine: &mut dyn MediaEngine,
    ) -> Tick {
        self.state.position = time;

        let decision = PreviewGate::check(self.state.position, policy);
        if decision.must_stop {
            log::info!(
                "[Clock] Preview boundary reached at {:.1}s, stopping and resetting",
                time
            );
            engine.pause();
            engine.seek(0.0);
            self.state.is_playing = false;
            self.state.position = 0.0;
        }

        let active_segment = timeline.active_segment(self.state.position).cloned();

        Tick {
            position: self.state.position,
            active_segment,
            preview_stopped: decision.must_stop,
        }
    }

    pub fn on_engine_loaded(&mut self, duration: f64, engine: &mut dyn MediaEngine) {
        self.state.duration = duration;
        self.state.is_loaded = true;
        log::info!("[Clock] Engine loaded, duration {:.1}s", duration);
        if let Some(seed) = self.pending_initial_position.take() {
            let target = seed.clamp(0.0, duration);
            log::info!("[Clock] Applying deep-linked start position {:.0}s", target);
            engine.seek(target);
            self.state.position = target;
        }
    }

    /// Track ran to its end: stop and rewind so the next toggle restarts.
    pub fn on_engine_ended(&mut self, engine: &mut dyn MediaEngine) -> Tick {
        self.state.is_playing = false;
        self.state.position = 0.0;
        engine.seek(0.0);
        Tick {
            position: 0.0,
            active_segment: None,
            preview_stopped: false,
        }
    }

    /// Engine failure is translated to state, never propagated as a panic.
    pub fn on_engine_error(&mut self, message: &str) {
        log::error!("[Clock] Engine error: {}", message);
        self.state.is_loaded = false;
        self.state.is_playing = false;
    }

    /// Relative seek, clamped to `[0, duration]`. Out-of-range targets are
    /// clamped silently rather than treated as errors.
    pub fn seek_relative(&mut self, delta: f64, engine: &mut dyn MediaEngine) {
        if !self.state.is_loaded {
            return;
        }
        let target = (self.state.position + delta).clamp(0.0, self.state.duration);
        engine.seek(target);
        self.state.position = target;
    }

    /// Flip play/pause. No-op before the engine reports loaded. A rejected
    /// play command must not desynchronize `is_playing`: on rejection the
    /// flag reverts to false and the error is surfaced to the caller.
    pub fn toggle_play_pause(&mut self, engine: &mut dyn MediaEngine) -> Result<(), PlayerError> {
        if !self.state.is_loaded {
            return Ok(());
        }
        if self.state.is_playing {
            engine.pause();
            self.state.is_playing = false;
            Ok(())
        } else {
            match engine.play() {
                Ok(()) => {
                    self.state.is_playing = true;
                    Ok(())
                }
                Err(err) => {
                    log::warn!("[Clock] Play rejected by engine: {}", err);
                    self.state.is_playing = false;
                    Err(err)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArtistSegment;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct MockEngine {
        seeks: Vec<f64>,
        play_calls: u32,
        pause_calls: u32,
        reject_play: bool,
    }

    impl MediaEngine for MockEngine {
        fn seek(&mut self, position: f64) {
            self.seeks.push(position);
        }
        fn play(&mut self) -> Result<(), PlayerError> {
            self.play_calls += 1;
            if self.reject_play {
                Err(PlayerError::PlaybackRejected)
            } else {
                Ok(())
            }
        }
        fn pause(&mut self) {
            self.pause_calls += 1;
        }
    }

    fn seg(id: &str, start: f64, end: f64) -> ArtistSegment {
        ArtistSegment {
            id: id.to_string(),
            name: id.to_string(),
            handle: None,
            start_time: start,
            end_time: end,
            color: [0, 0, 0],
            community: None,
        }
    }

    fn loaded_clock(duration: f64) -> (PlaybackClock, MockEngine) {
        let mut clock = PlaybackClock::default();
        let mut engine = MockEngine::default();
        clock.on_engine_loaded(duration, &mut engine);
        (clock, engine)
    }

    #[test]
    fn external_seek_ignores_small_drift() {
        let (mut clock, mut engine) = loaded_clock(180.0);
        let timeline = ArtistTimeline::empty();
        let policy = PreviewPolicy {
            is_full_unlocked: true,
            ..Default::default()
        };
        clock.on_engine_time_advanced(10.0, &timeline, &policy, &mut engine);

        clock.on_external_time_requested(10.3, &mut engine);
        assert!(engine.seeks.is_empty());

        clock.on_external_time_requested(11.0, &mut engine);
        assert_eq!(engine.seeks, vec![11.0]);
    }

    #[test]
    fn external_seek_clamps_to_duration() {
        let (mut clock, mut engine) = loaded_clock(100.0);
        clock.on_external_time_requested(500.0, &mut engine);
        assert_eq!(engine.seeks, vec![100.0]);
    }

    #[test]
    fn external_seek_noop_before_load() {
        let mut clock = PlaybackClock::default();
        let mut engine = MockEngine::default();
        clock.on_external_time_requested(30.0, &mut engine);
        assert!(engine.seeks.is_empty());
    }

    #[test]
    fn rejected_play_reverts_is_playing() {
        let (mut clock, mut engine) = loaded_clock(180.0);
        engine.reject_play = true;
        let result = clock.toggle_play_pause(&mut engine);
        assert!(matches!(result, Err(PlayerError::PlaybackRejected)));
        assert!(!clock.is_playing());
    }

    #[test]
    fn toggle_is_noop_until_loaded() {
        let mut clock = PlaybackClock::default();
        let mut engine = MockEngine::default();
        clock.toggle_play_pause(&mut engine).unwrap();
        assert_eq!(engine.play_calls, 0);
        assert!(!clock.is_playing());
    }

    #[test]
    fn seek_relative_clamps_at_zero() {
        let (mut clock, mut engine) = loaded_clock(180.0);
        clock.seek_relative(-10.0, &mut engine);
        assert_eq!(engine.seeks, vec![0.0]);
    }

    #[test]
    fn ended_rewinds_and_pauses() {
        let (mut clock, mut engine) = loaded_clock(180.0);
        clock.toggle_play_pause(&mut engine).unwrap();
        let tick = clock.on_engine_ended(&mut engine);
        assert!(!clock.is_playing());
        assert_relative_eq!(tick.position, 0.0);
        assert_eq!(engine.seeks, vec![0.0]);
    }

    #[test]
    fn error_clears_loaded_flag() {
        let (mut clock, mut engine) = loaded_clock(180.0);
        clock.toggle_play_pause(&mut engine).unwrap();
        clock.on_engine_error("decode failed");
        assert!(!clock.is_loaded());
        assert!(!clock.is_playing());
    }

    #[test]
    fn deep_link_seed_applies_on_load() {
        let mut clock = PlaybackClock::default();
        let mut engine = MockEngine::default();
        clock.request_initial_position(75.0);
        clock.on_engine_loaded(180.0, &mut engine);
        assert_eq!(engine.seeks, vec![75.0]);
        assert_relative_eq!(clock.position(), 75.0);
    }

    #[test]
    fn deep_link_seed_clamps_to_duration() {
        let mut clock = PlaybackClock::default();
        let mut engine = MockEngine::default();
        clock.request_initial_position(999.0);
        clock.on_engine_loaded(120.0, &mut engine);
        assert_eq!(engine.seeks, vec![120.0]);
    }

    // End-to-end gate scenario: two segments, 60s preview, locked listener.
    // Active artist transitions a -> a -> b -> b -> (stop, reset, a).
    #[test]
    fn preview_boundary_stops_and_resets() {
        let timeline = ArtistTimeline::from_segments(vec![
            seg("a", 0.0, 30.0),
            seg("b", 30.0, 60.0),
        ])
        .unwrap();
        let policy = PreviewPolicy {
            preview_length_secs: 60.0,
            is_full_unlocked: false,
        };
        let (mut clock, mut engine) = loaded_clock(180.0);
        clock.toggle_play_pause(&mut engine).unwrap();

        let expectations = [(0.0, "a"), (29.0, "a"), (30.0, "b"), (59.0, "b")];
        for (time, expected) in expectations {
            let tick = clock.on_engine_time_advanced(time, &timeline, &policy, &mut engine);
            assert!(!tick.preview_stopped);
            assert_eq!(tick.active_segment.as_ref().unwrap().id, expected);
        }

        let tick = clock.on_engine_time_advanced(60.0, &timeline, &policy, &mut engine);
        assert!(tick.preview_stopped);
        assert_relative_eq!(tick.position, 0.0);
        assert_eq!(tick.active_segment.as_ref().unwrap().id, "a");
        assert_relative_eq!(clock.position(), 0.0);
        assert!(!clock.is_playing());
        assert_eq!(engine.pause_calls, 1);
        assert_eq!(*engine.seeks.last().unwrap(), 0.0);
    }
}
