use crate::constants::DEFAULT_VOLUME_BEFORE_MUTE;

/// Bounded volume state. All setters clamp to `[0, 1]`; mute remembers the
/// prior non-zero level so unmute can restore it.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeControl {
    volume: f32,
    muted: bool,
    volume_before_mute: f32,
}

impl Default for VolumeControl {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
            volume_before_mute: DEFAULT_VOLUME_BEFORE_MUTE,
        }
    }
}

impl VolumeControl {
    /// The level the engine should actually play at.
    pub fn effective(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn increase(&mut self, step: f32) {
        self.set_exact(self.volume + step);
        self.muted = false;
    }

    pub fn decrease(&mut self, step: f32) {
        self.set_exact(self.volume - step);
    }

    pub fn set_exact(&mut self, v: f32) {
        self.volume = v.clamp(0.0, 1.0);
        if self.volume > 0.0 {
            self.muted = false;
        }
    }

    pub fn mute(&mut self) {
        if !self.muted {
            if self.volume > 0.0 {
                self.volume_before_mute = self.volume;
            }
            self.muted = true;
        }
    }

    pub fn unmute(&mut self) {
        if self.muted {
            self.muted = false;
            if self.volume == 0.0 {
                self.volume = self.volume_before_mute;
            }
        }
    }

    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.unmute();
        } else {
            self.mute();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_clamp_at_both_ends() {
        let mut v = VolumeControl::default();
        v.set_exact(0.05);
        v.decrease(0.2);
        assert_eq!(v.volume(), 0.0);

        v.set_exact(0.95);
        v.increase(0.2);
        assert_eq!(v.volume(), 1.0);
    }

    #[test]
    fn set_exact_clamps() {
        let mut v = VolumeControl::default();
        v.set_exact(3.0);
        assert_eq!(v.volume(), 1.0);
        v.set_exact(-1.0);
        assert_eq!(v.volume(), 0.0);
    }

    #[test]
    fn mute_restores_prior_level() {
        let mut v = VolumeControl::default();
        v.set_exact(0.6);
        v.mute();
        assert_eq!(v.effective(), 0.0);
        assert!(v.is_muted());
        v.unmute();
        assert_eq!(v.volume(), 0.6);
        assert_eq!(v.effective(), 0.6);
    }

    #[test]
    fn increase_unmutes() {
        let mut v = VolumeControl::default();
        v.mute();
        v.increase(0.1);
        assert!(!v.is_muted());
    }
}
