//! `HH:MM:SS` rendering of remaining seconds

/// Render seconds as `HH:MM:SS`, each field zero-padded to two digits.
///
/// Hours are not wrapped at 24, so 36 hours renders as `36:00:00`.
pub fn format_hms(remaining: u64) -> String {
    let (minutes, seconds) = (remaining / 60, remaining % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Parse an `H:M:S` string back into total seconds.
///
/// Accepts any number of digits per field; minutes and seconds must be below 60.
pub fn parse_hms(input: &str) -> Option<u64> {
    let mut fields = input.trim().split(':');
    let hours: u64 = fields.next()?.parse().ok()?;
    let minutes: u64 = fields.next()?.parse().ok()?;
    let seconds: u64 = fields.next()?.parse().ok()?;
    if fields.next().is_some() || minutes > 59 || seconds > 59 {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_padded_fields() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(5), "00:00:05");
        assert_eq!(format_hms(61), "00:01:01");
        assert_eq!(format_hms(23 * 3600 + 59 * 60 + 59), "23:59:59");
    }

    #[test]
    fn hours_are_not_wrapped() {
        assert_eq!(format_hms(36 * 3600), "36:00:00");
    }

    #[test]
    fn formatted_string_recovers_remaining() {
        for remaining in (0..86_400).step_by(997) {
            let text = format_hms(remaining);
            assert_eq!(text.len(), 8, "{text}");
            assert_eq!(parse_hms(&text), Some(remaining));
        }
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_hms("1:2"), None);
        assert_eq!(parse_hms("00:60:00"), None);
        assert_eq!(parse_hms("00:00:60"), None);
        assert_eq!(parse_hms("a:00:00"), None);
        assert_eq!(parse_hms("0:0:1:0"), None);
        assert_eq!(parse_hms(" 0:25:00 "), Some(1500));
    }
}
