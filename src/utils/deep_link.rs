//! Deep-link parsing for shareable timestamps.
//!
//! Share URLs carry `?track=<id>&t=<seconds>`; `t` is integer seconds and
//! seeds the playback clock once the selected track loads.

/// Parsed share link parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeepLink {
    pub track_id: Option<String>,
    pub position_secs: Option<f64>,
}

/// Parse deep-link parameters from a full URL or a bare query string.
/// Unparseable values are ignored rather than rejected.
pub fn parse(input: &str) -> DeepLink {
    let query = match input.split_once('?') {
        Some((_, q)) => q,
        None => input,
    };

    let mut link = DeepLink::default();
    for pair in query.split('&') {
        let (key, value) = match pair.split_once('=') {
            Some(kv) => kv,
            None => continue,
        };
        match key {
            "t" => {
                if let Ok(secs) = value.parse::<u64>() {
                    link.position_secs = Some(secs as f64);
                } else {
                    log::warn!("[DeepLink] Ignoring unparseable t parameter: {:?}", value);
                }
            }
            "track" => {
                if !value.is_empty() {
                    link.track_id = Some(value.to_string());
                }
            }
            _ => {}
        }
    }
    link
}

/// Scan command-line arguments for a share URL or a bare `t=`/`track=` query.
pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> DeepLink {
    for arg in args {
        if arg.contains("t=") || arg.contains("track=") {
            let link = parse(&arg);
            if link.track_id.is_some() || link.position_secs.is_some() {
                return link;
            }
        }
    }
    DeepLink::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_t_from_full_url() {
        let link = parse("https://sidebyside.example/?track=midi-punk-1&t=75");
        assert_eq!(link.track_id.as_deref(), Some("midi-punk-1"));
        assert_eq!(link.position_secs, Some(75.0));
    }

    #[test]
    fn parses_bare_query() {
        let link = parse("t=42");
        assert_eq!(link.position_secs, Some(42.0));
        assert_eq!(link.track_id, None);
    }

    #[test]
    fn ignores_unparseable_t() {
        let link = parse("t=abc&track=x");
        assert_eq!(link.position_secs, None);
        assert_eq!(link.track_id.as_deref(), Some("x"));
    }

    #[test]
    fn from_args_picks_first_match() {
        let args = vec![
            "sidebyside".to_string(),
            "--verbose".to_string(),
            "https://sidebyside.example/?t=30".to_string(),
        ];
        assert_eq!(from_args(args).position_secs, Some(30.0));
    }

    #[test]
    fn from_args_empty_when_no_link() {
        let args = vec!["sidebyside".to_string()];
        assert_eq!(from_args(args), DeepLink::default());
    }
}
