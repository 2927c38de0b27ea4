//! Application constants and configuration values

// === Preview gating ===
pub const PREVIEW_LENGTH_SECS: f64 = 60.0;
pub const MIN_TOKEN_BALANCE: u64 = 1;
pub const ZAO_CONTRACT_ADDRESS: &str = "0x1234567890123456789012345678901234567890";
pub const BALANCE_CACHE_TTL_SECS: u64 = 300;

// === Playback & time sync ===
// Drift below this threshold between an externally requested time and the
// engine-reported time is ignored to avoid seek feedback loops.
pub const SYNC_EPSILON_SECS: f64 = 0.5;
pub const SEEK_STEP_SECS: f64 = 5.0;
pub const ENGINE_POLL_INTERVAL_MILLIS: u64 = 50;
pub const REPAINT_INTERVAL_IDLE_MILLIS: u64 = 250;

// === Volume ===
pub const VOLUME_STEP: f32 = 0.1;
pub const DEFAULT_VOLUME_BEFORE_MUTE: f32 = 0.7;

// === Waveform rendering ===
pub const WAVEFORM_BUCKETS: usize = 512;
pub const WAVEFORM_HEIGHT: f32 = 100.0;
pub const WAVEFORM_INIT_TIMEOUT_SECS: u64 = 10;

// === Branding ===
pub const DOMINANT_COLOR_RGB: (u8, u8, u8) = (255, 85, 0);

// === Sharing ===
pub const SHARE_BASE_URL: &str = "https://sidebyside.example";
