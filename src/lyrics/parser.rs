//! LRC format parser
//!
//! Parses synchronized lyrics in LRC format:
//! [mm:ss.xx] Lyrics line here
//!
//! Example:
//! [00:12.34] Hello world
//! [00:15.00][01:15.00] Repeated chorus

use std::fmt::Write;

/// A single line of lyrics with timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    /// Offset in milliseconds from the start of the track
    pub offset_ms: u64,
    /// The lyrics text, never empty
    pub text: String,
}

impl LyricLine {
    pub fn new(offset_ms: u64, text: String) -> Self {
        Self { offset_ms, text }
    }
}

/// Lines sorted ascending by offset. Ties keep their source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricTimeline {
    lines: Vec<LyricLine>,
}

impl LyricTimeline {
    /// Parse LRC text. Lines without a leading timestamp, or with nothing
    /// after their timestamps, are skipped.
    pub fn parse(content: &str) -> Self {
        let mut lines = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (stamps, text) = Self::split_timestamps(line);
            if stamps.is_empty() || text.is_empty() {
                continue;
            }

            lines.extend(
                stamps
                    .into_iter()
                    .map(|ms| LyricLine::new(ms, text.to_string())),
            );
        }

        // sort_by_key is stable
        lines.sort_by_key(|l| l.offset_ms);

        Self { lines }
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    /// Serialize back to LRC, one `[mm:ss.fff]text` line per entry.
    pub fn to_lrc(&self) -> String {
        let mut out = String::new();
        for l in &self.lines {
            let min = l.offset_ms / 60_000;
            let sec = (l.offset_ms / 1000) % 60;
            let ms = l.offset_ms % 1000;
            let _ = writeln!(out, "[{min:02}:{sec:02}.{ms:03}]{}", l.text);
        }
        out
    }

    /// Strip all leading `[..]` timestamp tags; returns their offsets and
    /// the trimmed remainder.
    fn split_timestamps(line: &str) -> (Vec<u64>, &str) {
        let mut stamps = Vec::new();
        let mut rest = line;

        while let Some(inner) = rest.strip_prefix('[') {
            let Some(end) = inner.find(']') else {
                break;
            };
            match Self::parse_timestamp(&inner[..end]) {
                Some(ms) => {
                    stamps.push(ms);
                    rest = &inner[end + 1..];
                }
                None => break,
            }
        }

        (stamps, rest.trim())
    }

    /// Parse timestamp string like "01:02.5" or "00:12" to milliseconds
    fn parse_timestamp(s: &str) -> Option<u64> {
        let (min, rest) = s.split_once(':')?;
        let (sec, frac) = match rest.split_once('.') {
            Some((sec, frac)) => (sec, Some(frac)),
            None => (rest, None),
        };

        if min.is_empty() || !min.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if sec.is_empty() || sec.len() > 2 || !sec.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let min: u64 = min.parse().ok()?;
        let sec: u64 = sec.parse().ok()?;
        let ms = match frac {
            None => 0,
            Some(f) if (1..=3).contains(&f.len()) && f.bytes().all(|b| b.is_ascii_digit()) => {
                // Right-pad to three digits: "5" -> 500, "34" -> 340
                let value: u64 = f.parse().ok()?;
                value * 10u64.pow(3 - f.len() as u32)
            }
            Some(_) => return None,
        };

        min.checked_mul(60_000)?.checked_add(sec * 1000 + ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(LyricTimeline::parse_timestamp("00:00"), Some(0));
        assert_eq!(LyricTimeline::parse_timestamp("01:02.5"), Some(62500));
        assert_eq!(LyricTimeline::parse_timestamp("00:12.34"), Some(12340));
        assert_eq!(LyricTimeline::parse_timestamp("00:12.340"), Some(12340));
        assert_eq!(LyricTimeline::parse_timestamp("123:00"), Some(7_380_000));
        assert_eq!(LyricTimeline::parse_timestamp("00:12.3456"), None);
        assert_eq!(LyricTimeline::parse_timestamp("ti:Title"), None);
        assert_eq!(LyricTimeline::parse_timestamp("00:123"), None);
    }

    #[test]
    fn test_parse_lrc() {
        let lrc = r#"
[ti:Test Song]
[ar:Test Artist]
[00:12.34]First line
[00:15.00]Second line
no bracket here
[00:20.00]
"#;
        let t = LyricTimeline::parse(lrc);
        assert_eq!(t.len(), 2);
        assert_eq!(t.lines()[0], LyricLine::new(12340, "First line".into()));
        assert_eq!(t.lines()[1].offset_ms, 15000);
    }

    #[test]
    fn multiple_tags_share_text_and_sort() {
        let t = LyricTimeline::parse("[00:30.00][00:10.00]Chorus\n[00:20.00]Verse");
        let got: Vec<_> = t.lines().iter().map(|l| (l.offset_ms, l.text.as_str())).collect();
        assert_eq!(
            got,
            vec![(10_000, "Chorus"), (20_000, "Verse"), (30_000, "Chorus")]
        );
    }

    #[test]
    fn equal_offsets_keep_source_order() {
        let t = LyricTimeline::parse("[00:05.00]b\n[00:01.00]a\n[00:05.00]c");
        let texts: Vec<_> = t.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn garbage_never_panics() {
        for raw in ["[", "[]", "[:]", "[00:]x", "[00:0a]x", "]]][[", "[99999999999999999999:00]x"] {
            assert!(LyricTimeline::parse(raw).is_empty(), "{raw}");
        }
    }

    #[test]
    fn serialized_timeline_parses_back_identically() {
        let raw = "[03:01.7]late\n[00:00]start\n[00:00.00]start again\n[01:02.05][00:30]twice";
        let t = LyricTimeline::parse(raw);
        let again = LyricTimeline::parse(&t.to_lrc());
        assert_eq!(t, again);
        assert_eq!(t.lines()[0].text, "start");
        assert_eq!(t.lines()[1].text, "start again");
    }
}
