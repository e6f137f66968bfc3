use chrono::SecondsFormat;

/// Get the current UTC time as an RFC 3339 string with millisecond
/// precision and a `Z` suffix (e.g. `2025-03-01T12:30:45.123Z`).
///
/// Fixed width, so lexical order on stored timestamps is chronological.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Left-pad `value` with `fill` until it is at least `width` characters.
///
/// Longer values are returned unchanged.
pub fn pad_start(value: &str, width: usize, fill: char) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }
    let mut out: String = std::iter::repeat(fill).take(width - len).collect();
    out.push_str(value);
    out
}
