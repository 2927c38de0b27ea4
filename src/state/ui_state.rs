use std::time::Instant;

/// A transient status message.
pub struct Toast {
    pub text: String,
    pub is_error: bool,
    pub shown_at: Instant,
}

pub struct UIState {
    /// Pending seek intent collected from the screens, applied once per
    /// frame by the app so the clock stays the only writer of position.
    pub seek_target: Option<f64>,

    /// Last engine/adapter failure, rendered as a persistent notice.
    pub last_playback_error: Option<String>,

    pub show_comments: bool,
    pub toasts: Vec<Toast>,
}

impl Default for UIState {
    fn default() -> Self {
        Self {
            seek_target: None,
            last_playback_error: None,
            show_comments: true,
            toasts: Vec::new(),
        }
    }
}

impl UIState {
    pub fn toast(&mut self, text: impl Into<String>) {
        self.toasts.push(Toast {
            text: text.into(),
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    pub fn toast_error(&mut self, text: impl Into<String>) {
        self.toasts.push(Toast {
            text: text.into(),
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    /// Drop toasts older than a few seconds.
    pub fn prune_toasts(&mut self) {
        self.toasts
            .retain(|t| t.shown_at.elapsed().as_secs_f32() < 4.0);
    }
}
