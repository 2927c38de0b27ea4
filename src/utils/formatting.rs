/// Format a position in seconds as `M:SS` (minutes unpadded, seconds
/// zero-padded). Fractional seconds are floored. Callers clamp negative
/// values before calling.
pub fn format_time(seconds: f64) -> String {
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_time(75.0), "1:15");
        assert_eq!(format_time(5.0), "0:05");
        assert_eq!(format_time(0.0), "0:00");
    }

    #[test]
    fn floors_fractional_seconds() {
        assert_eq!(format_time(59.9), "0:59");
        assert_eq!(format_time(60.2), "1:00");
    }

    #[test]
    fn handles_long_tracks() {
        assert_eq!(format_time(600.0), "10:00");
        assert_eq!(format_time(3725.0), "62:05");
    }
}
