use crate::constants::*;
use crate::data::catalog::{Catalog, BUILT_IN};
use crate::models::ArtistTimeline;
use crate::services::comments::{CommentEvent, CommentService, MemoryCommentStore, SqliteCommentStore};
use crate::services::wallet::MockWalletConnector;
use crate::services::share;
use crate::state::{AudioState, SocialState, UIState};
use crate::utils::audio_controller::EngineEvent;
use crate::utils::deep_link::DeepLink;
use eframe::egui;
use std::path::Path;
use std::time::Duration;

pub struct SideBySideApp {
    pub audio: AudioState,
    pub ui: UIState,
    pub social: SocialState,
    pub catalog: Catalog,

    /// Restart playback as soon as the engine reports the reload finished
    /// (used when toggling play after the track ran to its end).
    play_when_loaded: bool,
}

impl SideBySideApp {
    pub fn new(deep_link: DeepLink) -> Self {
        Self::with_collaborators(
            load_catalog(),
            Box::new(MockWalletConnector::new()),
            CommentService::spawn(create_comment_store()),
            deep_link,
        )
    }

    fn with_collaborators(
        catalog: Catalog,
        wallet: Box<dyn crate::services::WalletConnector>,
        comment_service: CommentService,
        deep_link: DeepLink,
    ) -> Self {
        let social = SocialState::new(wallet, comment_service);

        let mut app = Self {
            audio: AudioState::default(),
            ui: UIState::default(),
            social,
            catalog,
            play_when_loaded: false,
        };

        let initial_track = deep_link
            .track_id
            .as_deref()
            .filter(|id| app.catalog.track(id).is_some())
            .unwrap_or(
                app.catalog
                    .tracks
                    .first()
                    .map(|t| t.id.as_str())
                    .unwrap_or_default(),
            )
            .to_string();
        if !initial_track.is_empty() {
            app.load_track(&initial_track);
            if let Some(t) = deep_link.position_secs {
                app.audio.clock.request_initial_position(t);
            }
        }
        app
    }

    /// Switch to a track: reset the clock, reload the engine, re-initialize
    /// the waveform (bumping its generation so in-flight decodes for the old
    /// track are discarded) and reload comments. Engine and comment events
    /// still in flight for the previous track are dropped by the track-id
    /// checks in the per-frame drains.
    pub fn load_track(&mut self, track_id: &str) {
        let Some(track) = self.catalog.track(track_id).cloned() else {
            log::warn!("[App] Unknown track id {}", track_id);
            return;
        };
        log::info!("[App] Loading track {} ({})", track.id, track.title);

        self.audio.current_track_id = Some(track.id.clone());
        self.audio.current_title = track.title.clone();
        self.audio.current_artist_label = track.artist_label.clone();
        self.audio.reset_track();
        self.play_when_loaded = false;
        self.ui.last_playback_error = None;

        self.audio.timeline = match self.catalog.timeline_for(&track) {
            Ok(timeline) => timeline,
            Err(e) => {
                log::error!("[App] Rejecting malformed segment set: {}", e);
                self.ui.toast_error(format!("Artist timeline unavailable: {}", e));
                ArtistTimeline::empty()
            }
        };

        self.audio.controller.set_volume(self.audio.volume.effective());
        self.audio.controller.load(
            track.id.clone(),
            Path::new(&track.media_locator).to_path_buf(),
            track.total_duration,
        );
        self.audio.waveform.initialize(Path::new(&track.media_locator));

        self.social.comments.clear();
        self.social.comments_loading = true;
        self.social.comment_service.load(&track.id);
    }

    // === Per-frame channel drains ===

    fn check_engine_events(&mut self) {
        while let Some(event) = self.audio.controller.try_event() {
            let current = self.audio.current_track_id.as_deref();
            let event_track = match &event {
                EngineEvent::Loaded { track_id, .. }
                | EngineEvent::TimeAdvanced { track_id, .. }
                | EngineEvent::Ended { track_id }
                | EngineEvent::Error { track_id, .. } => track_id.as_str(),
            };
            if current != Some(event_track) {
                log::debug!("[App] Dropping stale engine event for {}", event_track);
                continue;
            }

            let AudioState {
                controller,
                clock,
                timeline,
                policy,
                waveform,
                active_segment,
                track_ended,
                ..
            } = &mut self.audio;

            match event {
                EngineEvent::Loaded { duration, .. } => {
                    clock.on_engine_loaded(duration, controller);
                    if self.play_when_loaded {
                        self.play_when_loaded = false;
                        if let Err(e) = clock.toggle_play_pause(controller) {
                            self.ui.toast_error(e.to_string());
                        }
                    }
                }
                EngineEvent::TimeAdvanced { position, .. } => {
                    let tick = clock.on_engine_time_advanced(position, timeline, policy, controller);
                    waveform.sync_position(tick.position);
                    *active_segment = tick.active_segment;
                    if tick.preview_stopped {
                        self.ui
                            .toast("Preview ended - connect a wallet to hear the full mix");
                    }
                }
                EngineEvent::Ended { .. } => {
                    let tick = clock.on_engine_ended(controller);
                    waveform.sync_position(tick.position);
                    *active_segment = timeline.active_segment(0.0).cloned();
                    *track_ended = true;
                }
                EngineEvent::Error { message, .. } => {
                    clock.on_engine_error(&message);
                    self.ui.last_playback_error = Some(message);
                }
            }
        }
    }

    fn check_comment_events(&mut self) {
        while let Some(event) = self.social.comment_service.try_event() {
            match event {
                CommentEvent::Loaded { track_id, comments } => {
                    // Drop responses resolved after a track switch
                    if self.audio.current_track_id.as_deref() != Some(track_id.as_str()) {
                        log::debug!("[App] Dropping stale comment load for {}", track_id);
                        continue;
                    }
                    self.social.comments = comments;
                    self.social.comments_loading = false;
                }
                CommentEvent::Added(comment) => {
                    if self.audio.current_track_id.as_deref() != Some(comment.track_id.as_str()) {
                        continue;
                    }
                    let at = self
                        .social
                        .comments
                        .partition_point(|c| c.timestamp <= comment.timestamp);
                    self.social.comments.insert(at, comment);
                }
                CommentEvent::Error { message } => {
                    self.ui.toast_error(format!("Comment error: {}", message));
                }
            }
        }
    }

    // === Playback actions ===

    pub fn toggle_playback(&mut self) {
        if self.audio.track_ended {
            log::info!("[App] Track finished, restarting from the beginning");
            if self.reload_current_track() {
                self.play_when_loaded = true;
            }
            return;
        }
        let AudioState { controller, clock, .. } = &mut self.audio;
        if let Err(e) = clock.toggle_play_pause(controller) {
            self.ui.toast_error(e.to_string());
        }
    }

    /// Reload the current track's source into the engine. Once the sink has
    /// drained at end of track, a raw seek cannot revive it; both the restart
    /// toggle and post-end seeks go through here.
    fn reload_current_track(&mut self) -> bool {
        let Some(track_id) = self.audio.current_track_id.clone() else {
            return false;
        };
        let Some(track) = self.catalog.track(&track_id).cloned() else {
            return false;
        };
        self.audio.track_ended = false;
        self.audio.clock.reset_for_track();
        self.audio.controller.load(
            track.id.clone(),
            Path::new(&track.media_locator).to_path_buf(),
            track.total_duration,
        );
        true
    }

    fn apply_seek(&mut self, target: f64) {
        if self.audio.track_ended {
            // Seed the target so the reloaded engine resumes from it
            if self.reload_current_track() {
                self.audio.clock.request_initial_position(target);
            }
            return;
        }
        let AudioState {
            controller,
            clock,
            waveform,
            ..
        } = &mut self.audio;
        clock.on_external_time_requested(target, controller);
        waveform.sync_position(clock.position());
    }

    pub fn seek_relative(&mut self, delta: f64) {
        let AudioState { controller, clock, .. } = &mut self.audio;
        clock.seek_relative(delta, controller);
    }

    pub fn jump_previous_artist(&mut self) {
        let position = self.audio.clock.position();
        if let Some(segment) = self.audio.timeline.previous_segment(position).cloned() {
            self.request_segment_seek(&segment);
        }
    }

    pub fn jump_next_artist(&mut self) {
        let position = self.audio.clock.position();
        if let Some(segment) = self.audio.timeline.next_segment(position).cloned() {
            self.request_segment_seek(&segment);
        }
    }

    fn request_segment_seek(&mut self, segment: &crate::models::ArtistSegment) {
        if self.audio.timeline.is_locked(segment, &self.audio.policy) {
            self.ui
                .toast_error("That verse is locked - connect a wallet to unlock the full mix");
            return;
        }
        self.ui.seek_target = Some(segment.start_time);
    }

    // === Volume actions ===

    pub fn set_volume(&mut self, volume: f32) {
        self.audio.volume.set_exact(volume);
        self.audio.controller.set_volume(self.audio.volume.effective());
    }

    pub fn change_volume(&mut self, delta: f32) {
        if delta >= 0.0 {
            self.audio.volume.increase(delta);
        } else {
            self.audio.volume.decrease(-delta);
        }
        self.audio.controller.set_volume(self.audio.volume.effective());
    }

    pub fn toggle_mute(&mut self) {
        self.audio.volume.toggle_mute();
        self.audio.controller.set_volume(self.audio.volume.effective());
    }

    // === Social actions ===

    pub fn connect_wallet(&mut self) {
        match self.social.wallet.connect() {
            Ok(session) => {
                self.audio.policy.is_full_unlocked = session.has_sufficient_tokens;
                self.social.wallet_error = None;
                if session.has_sufficient_tokens {
                    self.ui.toast("Full mix unlocked");
                } else {
                    self.ui
                        .toast_error("Connected, but the wallet holds no ZAO tokens");
                }
                self.social.session = Some(session);
            }
            Err(e) => {
                log::warn!("[App] {}", e);
                self.social.wallet_error = Some(e.to_string());
            }
        }
    }

    pub fn submit_comment(&mut self) {
        let text = self.social.comment_draft.trim().to_string();
        let Some(track_id) = self.audio.current_track_id.clone() else {
            return;
        };
        if text.is_empty() {
            return;
        }
        let timestamp = self.audio.clock.position();
        let user_id = self.social.user_id.clone();
        self.social
            .comment_service
            .add(&track_id, timestamp, &user_id, &text);
        self.social.comment_draft.clear();
    }

    pub fn share_copy_link(&mut self) {
        let Some(url) = self.current_share_url() else { return };
        if share::copy_to_clipboard(&url) {
            self.ui.toast("Share link copied to clipboard");
        } else {
            self.ui.toast_error("Could not copy the share link");
        }
    }

    pub fn share_to_x(&mut self) {
        let Some(url) = self.current_share_url() else { return };
        let text = self.share_text();
        if !share::open_in_browser(&share::x_intent_url(&text, &url)) {
            self.ui.toast_error("Could not open the browser");
        }
    }

    pub fn share_to_warpcast(&mut self) {
        let Some(url) = self.current_share_url() else { return };
        let text = self.share_text();
        if !share::open_in_browser(&share::warpcast_intent_url(&text, &url)) {
            self.ui.toast_error("Could not open the browser");
        }
    }

    fn current_share_url(&self) -> Option<String> {
        let track_id = self.audio.current_track_id.as_deref()?;
        Some(share::share_url(track_id, self.audio.clock.position()))
    }

    fn share_text(&self) -> String {
        format!(
            "{} - {} @ {}",
            self.audio.current_artist_label,
            self.audio.current_title,
            crate::utils::formatting::format_time(self.audio.clock.position())
        )
    }

    // === Input ===

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        // Don't steal keys from the comment box
        if ctx.wants_keyboard_input() {
            return;
        }
        let (space, left, right, up, down, mute) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::ArrowUp),
                i.key_pressed(egui::Key::ArrowDown),
                i.key_pressed(egui::Key::M),
            )
        });
        if space {
            self.toggle_playback();
        }
        if left {
            self.seek_relative(-SEEK_STEP_SECS);
        }
        if right {
            self.seek_relative(SEEK_STEP_SECS);
        }
        if up {
            self.change_volume(VOLUME_STEP);
        }
        if down {
            self.change_volume(-VOLUME_STEP);
        }
        if mute {
            self.toggle_mute();
        }
    }
}

impl eframe::App for SideBySideApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(Duration::from_millis(REPAINT_INTERVAL_IDLE_MILLIS));

        self.check_engine_events();
        self.audio.waveform.poll();
        self.check_comment_events();
        self.ui.prune_toasts();
        self.handle_keyboard_shortcuts(ctx);

        // Apply at most one seek intent per frame; the clock stays the only
        // writer of playback position.
        if let Some(target) = self.ui.seek_target.take() {
            self.apply_seek(target);
        }

        if self.ui.show_comments {
            egui::SidePanel::right("comments_panel")
                .default_width(280.0)
                .show(ctx, |ui| {
                    crate::screens::render_comments(self, ui);
                });
        }
        egui::CentralPanel::default().show(ctx, |ui| {
            crate::screens::render_player(self, ui);
        });

        // Toasts on top of everything
        if !self.ui.toasts.is_empty() {
            egui::Area::new(egui::Id::new("toast_area"))
                .anchor(egui::Align2::CENTER_BOTTOM, egui::Vec2::new(0.0, -24.0))
                .show(ctx, |ui| {
                    for toast in &self.ui.toasts {
                        let color = if toast.is_error {
                            egui::Color32::from_rgb(230, 90, 90)
                        } else {
                            egui::Color32::from_rgb(110, 200, 110)
                        };
                        ui.colored_label(color, &toast.text);
                    }
                });
        }

        if self.audio.clock.is_playing() {
            ctx.request_repaint();
        }
    }
}

fn load_catalog() -> Catalog {
    if let Ok(path) = std::env::var("SIDEBYSIDE_CATALOG") {
        match Catalog::load_from(Path::new(&path)) {
            Ok(catalog) => {
                log::info!("[App] Loaded catalog override from {}", path);
                return catalog;
            }
            Err(e) => {
                log::error!("[App] Catalog override rejected, using built-ins: {}", e);
            }
        }
    }
    BUILT_IN.clone()
}

fn create_comment_store() -> Box<dyn crate::services::CommentStore + Send> {
    match SqliteCommentStore::open_default() {
        Ok(store) => {
            log::info!("[App] Using SQLite comment store");
            Box::new(store)
        }
        Err(e) => {
            log::warn!("[App] SQLite unavailable ({}), using in-memory comments", e);
            Box::new(MemoryCommentStore::with_demo_data())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MediaEngine;
    use crate::utils::errors::PlayerError;

    #[derive(Default)]
    struct RecordingEngine {
        seeks: Vec<f64>,
    }

    impl MediaEngine for RecordingEngine {
        fn seek(&mut self, position: f64) {
            self.seeks.push(position);
        }
        fn play(&mut self) -> Result<(), PlayerError> {
            Ok(())
        }
        fn pause(&mut self) {}
    }

    fn test_app() -> SideBySideApp {
        SideBySideApp::with_collaborators(
            BUILT_IN.clone(),
            Box::new(MockWalletConnector::new()),
            CommentService::spawn(Box::new(MemoryCommentStore::new())),
            DeepLink::default(),
        )
    }

    // After the sink drains, a seek must reload the track and seed the target
    // rather than issuing a raw engine seek against the dead sink.
    #[test]
    fn seek_after_ended_reloads_and_seeds_position() {
        let mut app = test_app();
        let mut engine = RecordingEngine::default();
        app.audio.clock.on_engine_loaded(210.0, &mut engine);
        app.audio.clock.on_engine_ended(&mut engine);
        app.audio.track_ended = true;
        engine.seeks.clear();

        app.apply_seek(42.0);
        assert!(!app.audio.track_ended);
        assert!(!app.play_when_loaded);
        // The clock was reset for the reload; no direct seek was issued
        assert!(!app.audio.clock.is_loaded());
        assert!(engine.seeks.is_empty());

        // Once the reloaded engine reports ready, playback resumes at the
        // clicked position
        app.audio.clock.on_engine_loaded(210.0, &mut engine);
        assert_eq!(engine.seeks, vec![42.0]);
        assert_eq!(app.audio.clock.position(), 42.0);
    }

    #[test]
    fn toggle_after_ended_requests_restart() {
        let mut app = test_app();
        let mut engine = RecordingEngine::default();
        app.audio.clock.on_engine_loaded(210.0, &mut engine);
        app.audio.track_ended = true;

        app.toggle_playback();
        assert!(!app.audio.track_ended);
        assert!(app.play_when_loaded);
        assert!(!app.audio.clock.is_loaded());
    }
}
