pub mod audio_state;
pub mod playback;
pub mod preview;
pub mod social_state;
pub mod ui_state;
pub mod volume;

pub use audio_state::AudioState;
pub use playback::{MediaEngine, PlaybackClock, PlaybackState, Tick};
pub use preview::{GateDecision, PreviewGate, PreviewPolicy};
pub use social_state::SocialState;
pub use ui_state::UIState;
pub use volume::VolumeControl;
