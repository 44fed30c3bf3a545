//! Clock display formatting

/// Format seconds as "MM:SS"; minutes grow past 99 rather than wrap
pub fn format_mm_ss(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Format seconds as "HH:MM:SS"; hours grow past 24 rather than wrap
pub fn format_hh_mm_ss(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// Parse "HH:MM:SS" back into seconds.
///
/// Minutes and seconds must be below 60; hours are unbounded.
pub fn parse_hh_mm_ss(text: &str) -> Option<u64> {
    let mut parts = text.trim().split(':');
    let h: u64 = parts.next()?.parse().ok()?;
    let m: u64 = parts.next()?.parse().ok()?;
    let s: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || m >= 60 || s >= 60 {
        return None;
    }
    Some(h * 3600 + m * 60 + s)
}
