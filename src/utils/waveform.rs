//! Waveform adapter: bridges the playback clock to the visual waveform.
//!
//! Display-only - the rodio sink stays authoritative for audio. Peaks are
//! decoded on a worker thread; results come back tagged with a generation
//! counter so a rapid track switch discards in-flight results from the track
//! that is no longer selected. Decode failure or timeout resolves to a static
//! fallback rather than an indefinite loading state.

use crate::constants::{SYNC_EPSILON_SECS, WAVEFORM_BUCKETS, WAVEFORM_INIT_TIMEOUT_SECS};
use rodio::{Decoder, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub enum WaveformState {
    Idle,
    Loading,
    Ready(Vec<f32>),
    /// Decode failed or timed out; the screen draws the static fallback.
    Unavailable,
}

struct WaveformMessage {
    generation: u64,
    result: Result<Vec<f32>, String>,
}

pub struct WaveformAdapter {
    generation: u64,
    state: WaveformState,
    tx: Sender<WaveformMessage>,
    rx: Receiver<WaveformMessage>,
    started_at: Option<Instant>,
    init_timeout: Duration,
    last_rendered_position: f64,
}

impl WaveformAdapter {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            generation: 0,
            state: WaveformState::Idle,
            tx,
            rx,
            started_at: None,
            init_timeout: Duration::from_secs(WAVEFORM_INIT_TIMEOUT_SECS),
            last_rendered_position: 0.0,
        }
    }

    pub fn state(&self) -> &WaveformState {
        &self.state
    }

    /// Start decoding peaks for a new track. Bumps the generation so any
    /// still-running decode for the previous track is discarded on arrival.
    pub fn initialize(&mut self, path: &Path) {
        self.generation += 1;
        self.state = WaveformState::Loading;
        self.started_at = Some(Instant::now());
        self.last_rendered_position = 0.0;

        let generation = self.generation;
        log::info!(
            "[Waveform] Decoding generation {} from {}",
            generation,
            path.display()
        );
        let tx = self.tx.clone();
        let path: PathBuf = path.to_path_buf();
        std::thread::spawn(move || {
            let result = decode_peaks(&path, WAVEFORM_BUCKETS);
            let _ = tx.send(WaveformMessage { generation, result });
        });
    }

    /// Drain decode results and enforce the init timeout. Call once per frame.
    pub fn poll(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.apply(msg);
        }
        if self.state == WaveformState::Loading {
            if let Some(started) = self.started_at {
                if started.elapsed() > self.init_timeout {
                    log::warn!("[Waveform] Decode timed out, falling back to static display");
                    self.state = WaveformState::Unavailable;
                }
            }
        }
    }

    fn apply(&mut self, msg: WaveformMessage) {
        if msg.generation != self.generation {
            log::debug!(
                "[Waveform] Discarding stale result from generation {} (current {})",
                msg.generation,
                self.generation
            );
            return;
        }
        match msg.result {
            Ok(peaks) => {
                log::info!("[Waveform] Ready ({} buckets)", peaks.len());
                self.state = WaveformState::Ready(peaks);
            }
            Err(e) => {
                log::error!("[Waveform] Decode failed: {}", e);
                self.state = WaveformState::Unavailable;
            }
        }
    }

    /// Advance the rendered cursor only when the position moved more than the
    /// sync epsilon since the last render, to avoid redundant redraws.
    /// Returns true when the cursor moved.
    pub fn sync_position(&mut self, position: f64) -> bool {
        if (position - self.last_rendered_position).abs() > SYNC_EPSILON_SECS {
            self.last_rendered_position = position;
            true
        } else {
            false
        }
    }

    /// Position of the rendered cursor (trails the clock by at most 0.5s).
    pub fn rendered_position(&self) -> f64 {
        self.last_rendered_position
    }

    /// Translate a click on the rendered surface into a fractional position.
    pub fn fraction_at(click_x: f32, rect_left: f32, rect_width: f32) -> f64 {
        if rect_width <= 0.0 {
            return 0.0;
        }
        (((click_x - rect_left) / rect_width) as f64).clamp(0.0, 1.0)
    }
}

impl Default for WaveformAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode the file into per-bucket peak amplitudes in `[0, 1]`. Chunks at
/// roughly 20ms resolution while streaming, then folds down to `buckets`.
fn decode_peaks(path: &Path, buckets: usize) -> Result<Vec<f32>, String> {
    let file = File::open(path).map_err(|e| format!("open {}: {}", path.display(), e))?;
    let source =
        Decoder::new(BufReader::new(file)).map_err(|e| format!("decode {}: {}", path.display(), e))?;

    let chunk_len = ((source.sample_rate() as usize * source.channels() as usize) / 50).max(1);
    let mut chunk_peaks: Vec<f32> = Vec::new();
    let mut current_peak = 0.0f32;
    let mut count = 0usize;

    for sample in source.convert_samples::<f32>() {
        current_peak = current_peak.max(sample.abs());
        count += 1;
        if count == chunk_len {
            chunk_peaks.push(current_peak);
            current_peak = 0.0;
            count = 0;
        }
    }
    if count > 0 {
        chunk_peaks.push(current_peak);
    }
    if chunk_peaks.is_empty() {
        return Err("no audio samples".to_string());
    }

    Ok(fold_buckets(&chunk_peaks, buckets))
}

fn fold_buckets(peaks: &[f32], buckets: usize) -> Vec<f32> {
    if peaks.len() <= buckets {
        return peaks.to_vec();
    }
    let mut out = Vec::with_capacity(buckets);
    for i in 0..buckets {
        let start = i * peaks.len() / buckets;
        let end = ((i + 1) * peaks.len() / buckets).max(start + 1);
        let peak = peaks[start..end].iter().cloned().fold(0.0f32, f32::max);
        out.push(peak);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_message(generation: u64) -> WaveformMessage {
        WaveformMessage {
            generation,
            result: Ok(vec![0.5; 4]),
        }
    }

    // Track switch mid-initialization: a stale ready result from generation N
    // must not overwrite state once generation N+1 has started.
    #[test]
    fn stale_generation_is_discarded() {
        let mut adapter = WaveformAdapter::new();
        adapter.generation = 2;
        adapter.state = WaveformState::Loading;

        adapter.apply(ready_message(1));
        assert_eq!(adapter.state, WaveformState::Loading);

        adapter.apply(ready_message(2));
        assert!(matches!(adapter.state, WaveformState::Ready(_)));
    }

    #[test]
    fn stale_error_is_discarded_too() {
        let mut adapter = WaveformAdapter::new();
        adapter.generation = 3;
        adapter.state = WaveformState::Ready(vec![0.1]);

        adapter.apply(WaveformMessage {
            generation: 2,
            result: Err("boom".to_string()),
        });
        assert!(matches!(adapter.state, WaveformState::Ready(_)));
    }

    #[test]
    fn stuck_decode_times_out_to_unavailable() {
        let mut adapter = WaveformAdapter::new();
        adapter.generation = 1;
        adapter.state = WaveformState::Loading;
        adapter.init_timeout = Duration::from_millis(5);
        adapter.started_at = Some(Instant::now() - Duration::from_millis(50));

        // No decode result ever arrives; the deadline resolves the state
        adapter.poll();
        assert_eq!(adapter.state, WaveformState::Unavailable);
    }

    #[test]
    fn pending_decode_within_deadline_stays_loading() {
        let mut adapter = WaveformAdapter::new();
        adapter.generation = 1;
        adapter.state = WaveformState::Loading;
        adapter.started_at = Some(Instant::now());

        adapter.poll();
        assert_eq!(adapter.state, WaveformState::Loading);
    }

    #[test]
    fn decode_failure_resolves_to_unavailable() {
        let mut adapter = WaveformAdapter::new();
        adapter.generation = 1;
        adapter.state = WaveformState::Loading;
        adapter.apply(WaveformMessage {
            generation: 1,
            result: Err("bad file".to_string()),
        });
        assert_eq!(adapter.state, WaveformState::Unavailable);
    }

    #[test]
    fn missing_file_reports_error_through_channel() {
        let mut adapter = WaveformAdapter::new();
        adapter.initialize(Path::new("/nonexistent/file.mp3"));
        // Worker is tiny for a missing file; wait for its message.
        let deadline = Instant::now() + Duration::from_secs(5);
        while adapter.state == WaveformState::Loading && Instant::now() < deadline {
            adapter.poll();
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(adapter.state, WaveformState::Unavailable);
    }

    #[test]
    fn cursor_moves_only_past_epsilon() {
        let mut adapter = WaveformAdapter::new();
        assert!(!adapter.sync_position(0.3));
        assert_eq!(adapter.rendered_position(), 0.0);
        assert!(adapter.sync_position(0.6));
        assert_eq!(adapter.rendered_position(), 0.6);
        assert!(!adapter.sync_position(0.9));
    }

    #[test]
    fn fraction_clamps_to_surface() {
        assert_eq!(WaveformAdapter::fraction_at(50.0, 0.0, 100.0), 0.5);
        assert_eq!(WaveformAdapter::fraction_at(-10.0, 0.0, 100.0), 0.0);
        assert_eq!(WaveformAdapter::fraction_at(500.0, 0.0, 100.0), 1.0);
        assert_eq!(WaveformAdapter::fraction_at(10.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn fold_buckets_keeps_peaks() {
        let peaks = vec![0.1, 0.9, 0.2, 0.3, 0.8, 0.1, 0.4, 0.5];
        let folded = fold_buckets(&peaks, 4);
        assert_eq!(folded, vec![0.9, 0.3, 0.8, 0.5]);
        // Fewer peaks than buckets passes through unchanged
        assert_eq!(fold_buckets(&[0.2, 0.4], 4), vec![0.2, 0.4]);
    }
}
