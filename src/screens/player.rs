use crate::app::SideBySideApp;
use crate::constants::{DOMINANT_COLOR_RGB, SEEK_STEP_SECS, VOLUME_STEP, WAVEFORM_HEIGHT};
use crate::utils::formatting::format_time;
use crate::utils::waveform::{WaveformAdapter, WaveformState};
use eframe::egui::{self, Color32, CornerRadius, Sense, Stroke, Vec2};

fn accent() -> Color32 {
    let (r, g, b) = DOMINANT_COLOR_RGB;
    Color32::from_rgb(r, g, b)
}

/// Main player screen: track selector, waveform, artist legend, transport.
pub fn render_player(app: &mut SideBySideApp, ui: &mut egui::Ui) {
    ui.add_space(12.0);
    render_track_selector(app, ui);
    ui.add_space(8.0);
    render_track_header(app, ui);
    ui.add_space(12.0);
    render_waveform(app, ui);
    ui.add_space(4.0);
    render_legend(app, ui);
    ui.add_space(12.0);
    render_transport(app, ui);
    ui.add_space(8.0);
    render_preview_banner(app, ui);
    ui.add_space(8.0);
    render_share_row(app, ui);

    if let Some(error) = &app.ui.last_playback_error {
        ui.add_space(8.0);
        ui.colored_label(
            Color32::from_rgb(230, 90, 90),
            format!("Playback problem: {}", error),
        );
    }
}

fn render_track_selector(app: &mut SideBySideApp, ui: &mut egui::Ui) {
    let tracks: Vec<(String, String)> = app
        .catalog
        .tracks
        .iter()
        .map(|t| (t.id.clone(), format!("{} - {}", t.artist_label, t.title)))
        .collect();
    let current = app.audio.current_track_id.clone().unwrap_or_default();

    let mut selected = current.clone();
    ui.horizontal(|ui| {
        ui.label("Track:");
        egui::ComboBox::from_id_salt("track_selector")
            .selected_text(
                tracks
                    .iter()
                    .find(|(id, _)| *id == current)
                    .map(|(_, label)| label.clone())
                    .unwrap_or_else(|| "Select a track".to_string()),
            )
            .show_ui(ui, |ui| {
                for (id, label) in &tracks {
                    ui.selectable_value(&mut selected, id.clone(), label);
                }
            });
    });
    if selected != current && !selected.is_empty() {
        app.load_track(&selected);
    }
}

fn render_track_header(app: &mut SideBySideApp, ui: &mut egui::Ui) {
    ui.label(
        egui::RichText::new(&app.audio.current_title)
            .size(24.0)
            .strong()
            .color(Color32::WHITE),
    );
    ui.label(
        egui::RichText::new(&app.audio.current_artist_label)
            .size(16.0)
            .color(accent()),
    );
    if let Some(segment) = &app.audio.active_segment {
        let label = match &segment.handle {
            Some(handle) => format!("Now playing: {} ({})", segment.name, handle),
            None => format!("Now playing: {}", segment.name),
        };
        ui.label(egui::RichText::new(label).size(14.0).color(segment.color32()));
    } else {
        ui.label(
            egui::RichText::new("Now playing: -")
                .size(14.0)
                .color(Color32::from_rgb(120, 120, 120)),
        );
    }
}

fn render_waveform(app: &mut SideBySideApp, ui: &mut egui::Ui) {
    let (rect, response) = ui.allocate_exact_size(
        Vec2::new(ui.available_width(), WAVEFORM_HEIGHT),
        Sense::click(),
    );
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, CornerRadius::same(4), Color32::from_rgb(24, 24, 28));

    let duration = app.audio.clock.duration();
    let position = app.audio.waveform.rendered_position();
    let unlocked = app.audio.policy.is_full_unlocked;
    let preview_len = app.audio.policy.preview_length_secs;

    match app.audio.waveform.state() {
        WaveformState::Ready(peaks) if duration > 0.0 => {
            let n = peaks.len().max(1);
            let bar_w = rect.width() / n as f32;
            let played_fraction = (position / duration) as f32;
            let preview_fraction = if unlocked {
                1.0
            } else {
                (preview_len / duration).min(1.0) as f32
            };
            for (i, peak) in peaks.iter().enumerate() {
                let fraction = i as f32 / n as f32;
                let time = fraction as f64 * duration;
                let color = if fraction > preview_fraction {
                    Color32::from_rgb(50, 50, 55)
                } else if fraction <= played_fraction {
                    accent()
                } else {
                    app.audio
                        .timeline
                        .active_segment(time)
                        .map(|s| s.color32())
                        .unwrap_or(Color32::from_rgb(140, 140, 145))
                };
                let h = (peak.clamp(0.0, 1.0) * (rect.height() - 8.0)).max(1.0);
                let x = rect.left() + fraction * rect.width();
                let bar = egui::Rect::from_min_size(
                    egui::pos2(x, rect.center().y - h / 2.0),
                    Vec2::new((bar_w - 1.0).max(1.0), h),
                );
                painter.rect_filled(bar, CornerRadius::same(1), color);
            }
        }
        WaveformState::Ready(_) | WaveformState::Loading => {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Loading waveform...",
                egui::FontId::proportional(14.0),
                Color32::from_rgb(150, 150, 150),
            );
        }
        WaveformState::Unavailable => {
            // Static fallback: keep the surface and the cursor, skip the bars.
            painter.line_segment(
                [
                    egui::pos2(rect.left() + 4.0, rect.center().y),
                    egui::pos2(rect.right() - 4.0, rect.center().y),
                ],
                Stroke::new(1.0, Color32::from_rgb(90, 90, 95)),
            );
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Visualization unavailable",
                egui::FontId::proportional(14.0),
                Color32::from_rgb(150, 150, 150),
            );
        }
        WaveformState::Idle => {}
    }

    // Playback cursor
    if duration > 0.0 {
        let x = rect.left() + (position / duration) as f32 * rect.width();
        painter.line_segment(
            [egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())],
            Stroke::new(2.0, Color32::from_rgb(255, 60, 60)),
        );
    }

    // Clicks on the surface become seek intents (fraction scaled by duration)
    if response.clicked() && app.audio.clock.is_loaded() {
        if let Some(pos) = response.interact_pointer_pos() {
            let fraction = WaveformAdapter::fraction_at(pos.x, rect.left(), rect.width());
            app.ui.seek_target = Some(fraction * duration);
        }
    }
}

fn render_legend(app: &mut SideBySideApp, ui: &mut egui::Ui) {
    let duration = app.audio.clock.duration().max(
        app.audio
            .timeline
            .segments()
            .last()
            .map(|s| s.end_time)
            .unwrap_or(0.0),
    );
    if duration <= 0.0 || app.audio.timeline.is_empty() {
        return;
    }

    let (rect, _) = ui.allocate_exact_size(Vec2::new(ui.available_width(), 18.0), Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, CornerRadius::same(3), Color32::from_rgb(24, 24, 28));

    let mut seek_to: Option<f64> = None;
    let mut locked_hit = false;
    for (i, segment) in app.audio.timeline.segments().iter().enumerate() {
        let left = rect.left() + (segment.start_time / duration) as f32 * rect.width();
        let right = rect.left() + (segment.end_time / duration) as f32 * rect.width();
        let seg_rect = egui::Rect::from_min_max(
            egui::pos2(left, rect.top()),
            egui::pos2(right, rect.bottom()),
        );
        let locked = app.audio.timeline.is_locked(segment, &app.audio.policy);
        let color = if locked {
            Color32::from_rgb(60, 60, 65)
        } else {
            segment.color32()
        };
        painter.rect_filled(seg_rect.shrink(1.0), CornerRadius::same(2), color);

        let response = ui.interact(seg_rect, ui.id().with(("legend", i)), Sense::click());
        let hover = match (&segment.handle, locked) {
            (_, true) => format!("{} (locked - connect wallet)", segment.name),
            (Some(handle), false) => format!("{} ({})", segment.name, handle),
            (None, false) => segment.name.clone(),
        };
        let response = response.on_hover_text(hover);
        if response.clicked() {
            if locked {
                locked_hit = true;
            } else {
                seek_to = Some(segment.start_time);
            }
        }
    }
    if let Some(target) = seek_to {
        app.ui.seek_target = Some(target);
    }
    if locked_hit {
        app.ui
            .toast_error("That verse is locked - connect a wallet to unlock the full mix");
    }
}

fn render_transport(app: &mut SideBySideApp, ui: &mut egui::Ui) {
    let position = app.audio.clock.position();
    let duration = app.audio.clock.duration();
    let loaded = app.audio.clock.is_loaded();

    ui.horizontal(|ui| {
        if ui
            .add_enabled(loaded, egui::Button::new("|<"))
            .on_hover_text("Previous artist")
            .clicked()
        {
            app.jump_previous_artist();
        }
        if ui
            .add_enabled(loaded, egui::Button::new("-5s"))
            .clicked()
        {
            app.seek_relative(-SEEK_STEP_SECS);
        }

        let toggle_label = if app.audio.clock.is_playing() { "Pause" } else { "Play" };
        if ui
            .add_enabled(loaded || app.audio.track_ended, egui::Button::new(toggle_label))
            .clicked()
        {
            app.toggle_playback();
        }

        if ui.add_enabled(loaded, egui::Button::new("+5s")).clicked() {
            app.seek_relative(SEEK_STEP_SECS);
        }
        if ui
            .add_enabled(loaded, egui::Button::new(">|"))
            .on_hover_text("Next artist")
            .clicked()
        {
            app.jump_next_artist();
        }

        ui.add_space(12.0);
        ui.label(
            egui::RichText::new(format!(
                "{} / {}",
                format_time(position),
                format_time(duration)
            ))
            .monospace(),
        );

        ui.add_space(12.0);
        let mute_label = if app.audio.volume.is_muted() { "Unmute" } else { "Mute" };
        if ui.button(mute_label).clicked() {
            app.toggle_mute();
        }
        let mut volume = app.audio.volume.volume();
        if ui
            .add(egui::Slider::new(&mut volume, 0.0..=1.0).show_value(false))
            .changed()
        {
            app.set_volume(volume);
        }
        if ui.small_button("-").clicked() {
            app.change_volume(-VOLUME_STEP);
        }
        if ui.small_button("+").clicked() {
            app.change_volume(VOLUME_STEP);
        }
    });
}

fn render_preview_banner(app: &mut SideBySideApp, ui: &mut egui::Ui) {
    if app.audio.policy.is_full_unlocked {
        if let Some(session) = &app.social.session {
            ui.label(
                egui::RichText::new(format!("Full mix unlocked - {}", short_address(&session.address)))
                    .size(12.0)
                    .color(Color32::from_rgb(110, 200, 110)),
            );
        }
        return;
    }

    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(format!(
                "Preview mode: first {} of the mix",
                format_time(app.audio.policy.preview_length_secs)
            ))
            .color(Color32::from_rgb(230, 180, 80)),
        );
        if ui.button("Connect wallet to unlock").clicked() {
            app.connect_wallet();
        }
    });
    if let Some(error) = &app.social.wallet_error {
        ui.colored_label(Color32::from_rgb(230, 90, 90), error);
    }
}

fn render_share_row(app: &mut SideBySideApp, ui: &mut egui::Ui) {
    if app.audio.current_track_id.is_none() {
        return;
    }
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Share:").size(12.0));
        if ui.small_button("Copy link").clicked() {
            app.share_copy_link();
        }
        if ui.small_button("Post to X").clicked() {
            app.share_to_x();
        }
        if ui.small_button("Cast").clicked() {
            app.share_to_warpcast();
        }
        let show_label = if app.ui.show_comments { "Hide comments" } else { "Show comments" };
        if ui.small_button(show_label).clicked() {
            app.ui.show_comments = !app.ui.show_comments;
        }
    });
}

fn short_address(address: &str) -> String {
    if address.len() > 10 {
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}
