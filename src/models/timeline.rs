use crate::models::ArtistSegment;
use crate::state::preview::PreviewPolicy;
use crate::utils::errors::PlayerError;

/// Ordered, validated, immutable-per-track sequence of artist segments.
///
/// Construction sorts by `start_time` and rejects malformed sets (a segment
/// with `start >= end`, or any overlap between neighbours), so every query
/// below can assume at most one segment matches a given time.
#[derive(Debug, Clone)]
pub struct ArtistTimeline {
    segments: Vec<ArtistSegment>,
}

impl ArtistTimeline {
    pub fn from_segments(mut segments: Vec<ArtistSegment>) -> Result<Self, PlayerError> {
        for seg in &segments {
            if seg.start_time < 0.0 {
                return Err(PlayerError::InvalidTimeline(format!(
                    "segment {} starts before 0 ({})",
                    seg.id, seg.start_time
                )));
            }
            if seg.start_time >= seg.end_time {
                return Err(PlayerError::InvalidTimeline(format!(
                    "segment {} has start {} >= end {}",
                    seg.id, seg.start_time, seg.end_time
                )));
            }
        }
        segments.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        for pair in segments.windows(2) {
            if pair[1].start_time < pair[0].end_time {
                return Err(PlayerError::InvalidTimeline(format!(
                    "segments {} and {} overlap",
                    pair[0].id, pair[1].id
                )));
            }
        }
        Ok(Self { segments })
    }

    pub fn empty() -> Self {
        Self { segments: Vec::new() }
    }

    pub fn segments(&self) -> &[ArtistSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The unique segment with `start <= time < end`, if any. Gaps between
    /// segments and times past the last end resolve to `None`.
    pub fn active_segment(&self, time: f64) -> Option<&ArtistSegment> {
        self.segments.iter().find(|s| s.contains(time))
    }

    /// The segment whose `start_time` is the greatest value `<= time`.
    /// Used for "jump to previous artist" navigation.
    pub fn previous_segment(&self, time: f64) -> Option<&ArtistSegment> {
        self.segments
            .iter()
            .rev()
            .find(|s| s.start_time <= time)
    }

    /// The segment whose `start_time` is the least value `> time`.
    /// Used for "jump to next artist" navigation.
    pub fn next_segment(&self, time: f64) -> Option<&ArtistSegment> {
        self.segments.iter().find(|s| s.start_time > time)
    }

    /// Whether a segment sits past the preview boundary for a locked listener.
    pub fn is_locked(&self, segment: &ArtistSegment, policy: &PreviewPolicy) -> bool {
        !policy.is_full_unlocked && segment.start_time >= policy.preview_length_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(id: &str, start: f64, end: f64) -> ArtistSegment {
        ArtistSegment {
            id: id.to_string(),
            name: id.to_string(),
            handle: None,
            start_time: start,
            end_time: end,
            color: [200, 180, 220],
            community: None,
        }
    }

    fn timeline() -> ArtistTimeline {
        ArtistTimeline::from_segments(vec![
            seg("a", 0.0, 13.0),
            seg("b", 13.0, 68.0),
            seg("c", 70.0, 90.0),
        ])
        .unwrap()
    }

    #[test]
    fn active_segment_is_half_open() {
        let tl = timeline();
        assert_eq!(tl.active_segment(0.0).unwrap().id, "a");
        assert_eq!(tl.active_segment(12.9).unwrap().id, "a");
        assert_eq!(tl.active_segment(13.0).unwrap().id, "b");
        assert!(tl.active_segment(68.5).is_none()); // gap
        assert!(tl.active_segment(90.0).is_none()); // at last end
        assert!(tl.active_segment(200.0).is_none());
    }

    #[test]
    fn previous_and_next_navigation() {
        let tl = timeline();
        assert_eq!(tl.previous_segment(40.0).unwrap().id, "b");
        assert_eq!(tl.previous_segment(13.0).unwrap().id, "b");
        assert_eq!(tl.previous_segment(0.0).unwrap().id, "a");
        assert_eq!(tl.next_segment(0.0).unwrap().id, "b");
        assert_eq!(tl.next_segment(13.0).unwrap().id, "c");
        assert!(tl.next_segment(70.0).is_none());
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let tl = ArtistTimeline::from_segments(vec![seg("b", 30.0, 60.0), seg("a", 0.0, 30.0)])
            .unwrap();
        assert_eq!(tl.segments()[0].id, "a");
        assert_eq!(tl.active_segment(45.0).unwrap().id, "b");
    }

    #[test]
    fn rejects_overlap() {
        let result = ArtistTimeline::from_segments(vec![seg("a", 0.0, 30.0), seg("b", 29.0, 60.0)]);
        assert!(matches!(result, Err(PlayerError::InvalidTimeline(_))));
    }

    #[test]
    fn rejects_inverted_segment() {
        let result = ArtistTimeline::from_segments(vec![seg("a", 10.0, 10.0)]);
        assert!(matches!(result, Err(PlayerError::InvalidTimeline(_))));
    }

    #[test]
    fn lock_respects_preview_boundary() {
        let tl = timeline();
        let locked_policy = PreviewPolicy {
            preview_length_secs: 60.0,
            is_full_unlocked: false,
        };
        let open_policy = PreviewPolicy {
            preview_length_secs: 60.0,
            is_full_unlocked: true,
        };
        let early = tl.active_segment(0.0).unwrap();
        let late = tl.active_segment(75.0).unwrap();
        assert!(!tl.is_locked(early, &locked_policy));
        assert!(tl.is_locked(late, &locked_policy));
        assert!(!tl.is_locked(late, &open_policy));
    }
}
