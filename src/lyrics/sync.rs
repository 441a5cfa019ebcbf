//! Keeps a lyric cursor in step with the playback position.

use super::parser::LyricTimeline;

/// Index of the line active at `current_ms`: the greatest `i` with
/// `offset[i] <= current_ms < offset[i + 1]`, the last line extending to
/// infinity. `None` before the first line or for an empty timeline.
///
/// `previous` is reused without a search while `current_ms` still falls in
/// its interval, so steady forward playback costs two comparisons.
pub fn advance(current_ms: u64, timeline: &LyricTimeline, previous: Option<usize>) -> Option<usize> {
    let lines = timeline.lines();

    if let Some(prev) = previous
        && let Some(line) = lines.get(prev)
        && line.offset_ms <= current_ms
        && lines.get(prev + 1).is_none_or(|next| current_ms < next.offset_ms)
    {
        return Some(prev);
    }

    // Number of lines that have started; the last of them is active.
    let started = lines.partition_point(|l| l.offset_ms <= current_ms);
    started.checked_sub(1)
}

/// Reported when a position update moves the highlighted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LyricChange {
    pub previous: Option<usize>,
    pub current: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> LyricTimeline {
        LyricTimeline::parse("[00:00.00]a\n[00:01.00]b\n[00:02.00]c")
    }

    fn full_scan(current_ms: u64, t: &LyricTimeline) -> Option<usize> {
        advance(current_ms, t, None)
    }

    #[test]
    fn backward_seek_rescans() {
        let t = abc();
        let i = advance(2500, &t, None);
        assert_eq!(i, Some(2));
        assert_eq!(advance(500, &t, i), Some(0));
    }

    #[test]
    fn before_first_line_and_empty() {
        let t = LyricTimeline::parse("[00:03.00]late start");
        assert_eq!(advance(2999, &t, None), None);
        assert_eq!(advance(3000, &t, None), Some(0));
        assert_eq!(advance(100, &LyricTimeline::default(), Some(4)), None);
    }

    #[test]
    fn stale_previous_index_out_of_range_is_ignored() {
        let t = abc();
        assert_eq!(advance(1500, &t, Some(17)), Some(1));
    }

    #[test]
    fn duplicate_offsets_resolve_to_the_later_entry() {
        let t = LyricTimeline::parse("[00:01.00]x\n[00:01.00]y\n[00:02.00]z");
        assert_eq!(advance(1500, &t, None), Some(1));
        assert_eq!(advance(1500, &t, Some(0)), Some(1));
    }

    #[test]
    fn fast_path_matches_full_scan_for_monotonic_samples() {
        let t = LyricTimeline::parse(
            "[00:00.50]a\n[00:01.00]b\n[00:01.00]b2\n[00:04.25]c\n[00:09.00]d\n[00:09.01]e",
        );
        let mut idx = None;
        let mut ms = 0u64;
        while ms < 12_000 {
            idx = advance(ms, &t, idx);
            assert_eq!(idx, full_scan(ms, &t), "at {ms}");
            ms += 37;
        }
    }
}
