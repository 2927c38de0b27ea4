pub mod audio_controller;
pub mod deep_link;
pub mod errors;
pub mod formatting;
pub mod waveform;

// Re-export commonly used types
pub use errors::PlayerError;
