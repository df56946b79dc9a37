//! Parsing and formatting of user-entered durations.

use crate::domain::TrackerError;

/// Parse a duration into whole seconds.
///
/// Three textual forms are accepted: `HH:MM:SS`, `HH:MM`, and a plain
/// decimal-hours number using either `.` or `,` as the fractional separator
/// (so `"90"` means ninety hours, not minutes). Minutes and seconds must be
/// in `0..=59`; hours have no fixed cap, but the total must fit in `u64`
/// seconds.
pub fn parse_duration(input: &str) -> Result<u64, TrackerError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(TrackerError::invalid_duration("empty duration"));
    }

    if input.contains(':') {
        let parts: Vec<&str> = input.split(':').collect();
        let (hours, minutes, seconds) = match parts.as_slice() {
            [h, m, s] => (*h, *m, *s),
            [h, m] => (*h, *m, "0"),
            _ => {
                return Err(TrackerError::invalid_duration(format!(
                    "expected HH:MM or HH:MM:SS, got {input:?}"
                )))
            }
        };
        let hours = parse_component(hours, u64::MAX, "hours")?;
        let minutes = parse_component(minutes, 59, "minutes")?;
        let seconds = parse_component(seconds, 59, "seconds")?;
        return hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes * 60 + seconds))
            .ok_or_else(|| {
                TrackerError::invalid_duration(format!("duration too large: {input:?}"))
            });
    }

    let hours: f64 = input
        .replace(',', ".")
        .parse()
        .map_err(|_| TrackerError::invalid_duration(format!("not a number: {input:?}")))?;
    if !hours.is_finite() || hours < 0.0 {
        return Err(TrackerError::invalid_duration(format!(
            "hours must be a non-negative number, got {input:?}"
        )));
    }
    Ok((hours * 3600.0).round() as u64)
}

fn parse_component(raw: &str, max: u64, name: &str) -> Result<u64, TrackerError> {
    let value: u64 = raw
        .parse()
        .map_err(|_| TrackerError::invalid_duration(format!("bad {name} component: {raw:?}")))?;
    if value > max {
        return Err(TrackerError::invalid_duration(format!(
            "{name} out of range: {value}"
        )));
    }
    Ok(value)
}

/// Format whole seconds as `HH:MM:SS` for timer displays.
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_three_forms() {
        assert_eq!(parse_duration("01:30:00").unwrap(), 5400);
        assert_eq!(parse_duration("12:30").unwrap(), 45_000);
        assert_eq!(parse_duration("1.5").unwrap(), 5400);
        assert_eq!(parse_duration("1,5").unwrap(), 5400);
        // No colon means decimal hours, even for round numbers.
        assert_eq!(parse_duration("90").unwrap(), 90 * 3600);
        assert_eq!(parse_duration("0").unwrap(), 0);
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert!(parse_duration("12:61").is_err());
        assert!(parse_duration("00:00:60").is_err());
        assert!(parse_duration("1:2:3:4").is_err());
    }

    #[test]
    fn rejects_hour_counts_that_overflow_seconds() {
        assert!(parse_duration("9999999999999999:00").is_err());
        assert!(parse_duration(&format!("{}:00:00", u64::MAX)).is_err());
        // The largest representable duration still parses.
        assert_eq!(
            parse_duration(&format!("{}:00", u64::MAX / 3600)).unwrap(),
            (u64::MAX / 3600) * 3600
        );
    }

    #[test]
    fn rejects_negative_and_non_numeric() {
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("-1:30").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("1:xx").is_err());
        assert!(parse_duration("").is_err());
        assert!(parse_duration("NaN").is_err());
    }

    #[test]
    fn formats_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(5400), "01:30:00");
        assert_eq!(format_hms(59 * 60 + 59), "00:59:59");
        assert_eq!(format_hms(100 * 3600), "100:00:00");
    }
}
