use crate::app::SideBySideApp;
use crate::utils::formatting::format_time;
use eframe::egui::{self, Color32};

/// Side panel listing timestamped comments for the current track. Clicking a
/// timestamp seeks there; new comments attach to the current position.
pub fn render_comments(app: &mut SideBySideApp, ui: &mut egui::Ui) {
    ui.add_space(8.0);
    ui.heading("Comments");
    ui.add_space(4.0);

    if app.audio.current_track_id.is_none() {
        ui.label("Select a track to see comments.");
        return;
    }

    if app.social.comments_loading {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Loading comments...");
        });
    } else if app.social.comments.is_empty() {
        ui.label(
            egui::RichText::new("No comments yet - be the first!")
                .color(Color32::from_rgb(140, 140, 145)),
        );
    }

    let mut seek_to: Option<f64> = None;
    egui::ScrollArea::vertical()
        .auto_shrink([false, true])
        .max_height(ui.available_height() - 80.0)
        .show(ui, |ui| {
            for comment in &app.social.comments {
                ui.horizontal_wrapped(|ui| {
                    if ui
                        .link(
                            egui::RichText::new(format_time(comment.timestamp))
                                .monospace()
                                .color(Color32::from_rgb(255, 140, 60)),
                        )
                        .clicked()
                    {
                        seek_to = Some(comment.timestamp);
                    }
                    ui.label(
                        egui::RichText::new(&comment.user_id)
                            .size(12.0)
                            .color(Color32::from_rgb(140, 140, 145)),
                    );
                });
                ui.label(&comment.text);
                ui.add_space(6.0);
            }
        });
    if let Some(target) = seek_to {
        app.ui.seek_target = Some(target);
    }

    ui.separator();
    ui.label(
        egui::RichText::new(format!(
            "Comment at {} as {}",
            format_time(app.audio.clock.position()),
            app.social.user_id
        ))
        .size(12.0),
    );
    let submitted = ui
        .add(
            egui::TextEdit::singleline(&mut app.social.comment_draft)
                .hint_text("Say something about this moment..."),
        )
        .lost_focus()
        && ui.input(|i| i.key_pressed(egui::Key::Enter));
    let clicked = ui.button("Post").clicked();
    if submitted || clicked {
        app.submit_comment();
    }
}
