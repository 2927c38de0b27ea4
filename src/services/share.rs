//! Social sharing: deep-linkable URLs carrying the current timestamp,
//! share intents for X and Warpcast, clipboard copy, and browser handoff.

use crate::constants::SHARE_BASE_URL;

/// Deep link to a track at a position. `t` is whole seconds, matching what
/// the deep-link parser accepts back in.
pub fn share_url(track_id: &str, position_secs: f64) -> String {
    format!(
        "{}/?track={}&t={}",
        SHARE_BASE_URL,
        urlencoding::encode(track_id),
        position_secs.max(0.0).floor() as u64
    )
}

pub fn x_intent_url(text: &str, url: &str) -> String {
    format!(
        "https://twitter.com/intent/tweet?text={}&url={}",
        urlencoding::encode(text),
        urlencoding::encode(url)
    )
}

pub fn warpcast_intent_url(text: &str, url: &str) -> String {
    format!(
        "https://warpcast.com/~/compose?text={}&embeds[]={}",
        urlencoding::encode(text),
        urlencoding::encode(url)
    )
}

/// Copy to the system clipboard. Returns false (and logs) on failure so the
/// UI can show a toast either way.
pub fn copy_to_clipboard(text: &str) -> bool {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => match clipboard.set_text(text.to_string()) {
            Ok(()) => true,
            Err(e) => {
                log::error!("[Share] Clipboard write failed: {}", e);
                false
            }
        },
        Err(e) => {
            log::error!("[Share] Clipboard unavailable: {}", e);
            false
        }
    }
}

pub fn open_in_browser(url: &str) -> bool {
    match webbrowser::open(url) {
        Ok(()) => true,
        Err(e) => {
            log::error!("[Share] Failed to open browser: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::deep_link;

    #[test]
    fn share_url_round_trips_through_deep_link() {
        let url = share_url("midi-punk-1", 75.9);
        let link = deep_link::parse(&url);
        assert_eq!(link.track_id.as_deref(), Some("midi-punk-1"));
        assert_eq!(link.position_secs, Some(75.0));
    }

    #[test]
    fn intent_urls_encode_text() {
        let url = x_intent_url("Side by Side @ 1:15", "https://sidebyside.example/?t=75");
        assert!(url.contains("Side%20by%20Side"));
        assert!(!url.contains(" @"));
    }
}
