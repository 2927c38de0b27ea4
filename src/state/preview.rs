//! Truncated-playback policy: until the wallet gate unlocks the full mix,
//! playback is limited to a bounded prefix and restarts from zero when the
//! boundary is crossed.

use crate::constants::PREVIEW_LENGTH_SECS;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewPolicy {
    pub preview_length_secs: f64,
    /// Wallet-gate outcome, supplied externally.
    pub is_full_unlocked: bool,
}

impl Default for PreviewPolicy {
    fn default() -> Self {
        Self {
            preview_length_secs: PREVIEW_LENGTH_SECS,
            is_full_unlocked: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateDecision {
    pub must_stop: bool,
}

pub struct PreviewGate;

impl PreviewGate {
    /// Consulted on every engine tick. When `must_stop`, the caller pauses
    /// playback and resets position to 0 - the policy is "preview ends,
    /// restart from zero", not "pause at the boundary".
    pub fn check(position: f64, policy: &PreviewPolicy) -> GateDecision {
        let must_stop = !policy.is_full_unlocked
            && policy.preview_length_secs > 0.0
            && position >= policy.preview_length_secs;
        GateDecision { must_stop }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked() -> PreviewPolicy {
        PreviewPolicy {
            preview_length_secs: 60.0,
            is_full_unlocked: false,
        }
    }

    #[test]
    fn stops_exactly_at_boundary() {
        assert!(!PreviewGate::check(59.9, &locked()).must_stop);
        assert!(PreviewGate::check(60.0, &locked()).must_stop);
        assert!(PreviewGate::check(61.0, &locked()).must_stop);
    }

    #[test]
    fn unlocked_listener_is_never_stopped() {
        let policy = PreviewPolicy {
            is_full_unlocked: true,
            ..locked()
        };
        assert!(!PreviewGate::check(10_000.0, &policy).must_stop);
    }

    #[test]
    fn zero_length_preview_disables_gating() {
        let policy = PreviewPolicy {
            preview_length_secs: 0.0,
            is_full_unlocked: false,
        };
        assert!(!PreviewGate::check(1.0, &policy).must_stop);
    }
}
