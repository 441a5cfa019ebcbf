pub mod help;
pub mod lyrics;
pub mod now_playing;
pub mod queue;
pub mod root;

/// Cut `s` to `max_len` characters, marking the cut with "...".
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    let char_count: usize = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_str;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_str("海阔天空 - Beyond", 7), "海阔天空...");
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("abcdef", 2), "ab");
        assert_eq!(truncate_str("abc", 0), "");
    }
}
