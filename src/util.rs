/// Count of whitespace-delimited non-empty tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Format a second count as mm:ss, zero-padded.
pub fn format_time(sec: u32) -> String {
    format!("{:02}:{:02}", sec / 60, sec % 60)
}
