/// Safely truncate string to max characters, appending "…" if truncated 🛡️
pub fn truncate(s: &str, max_width: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > max_width {
        chars
            .into_iter()
            .take(max_width.saturating_sub(1))
            .collect::<String>()
            + "…"
    } else {
        s.to_string()
    }
}

/// `m:ss`, or `h:mm:ss` past the hour.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}
