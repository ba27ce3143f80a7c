//! Code fence tracking for line-oriented scanning.
//!
//! Block segmentation must never cut a fenced code block at a blank line,
//! so every line is fed through [`advance_fence_state`] first.

/// Fence parsing phases tracked across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FencePhase {
    /// Not currently inside a fence.
    #[default]
    Outside,
    /// Within fence contents.
    InsideFence,
}

/// Current fence state (phase, marker, and length).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceState {
    /// Current fence phase.
    pub phase: FencePhase,
    /// Fence marker character (``` or ~~~).
    pub marker: Option<char>,
    /// Length of the opening fence (number of ` or ~ characters).
    pub length: usize,
}

impl FenceState {
    /// Whether a fence is open.
    pub fn is_open(&self) -> bool {
        matches!(self.phase, FencePhase::InsideFence)
    }
}

/// Outcome of processing a single line for fence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineOutcome {
    /// State to carry into the next line.
    pub next_state: FenceState,
    /// Whether the line belongs to a fenced block (delimiters included).
    pub in_code: bool,
}

/// Advance fence state based on a single line of text.
pub fn advance_fence_state(line: &str, state: FenceState) -> LineOutcome {
    let (visual_indent, byte_offset) = leading_whitespace_info(line);
    let after_indent = &line[byte_offset..];

    let mut next_state = state;
    let mut in_code = state.is_open();

    // 4+ columns of indentation is never a fence delimiter
    if visual_indent > 3 {
        return LineOutcome {
            next_state,
            in_code,
        };
    }

    if !state.is_open() {
        if let Some((marker, length)) = fence_marker(after_indent) {
            next_state = FenceState {
                phase: FencePhase::InsideFence,
                marker: Some(marker),
                length,
            };
            in_code = true;
        }
    } else if is_closing_fence(after_indent)
        && let Some((marker, closer_len)) = fence_marker(after_indent)
        && Some(marker) == state.marker
        && closer_len >= state.length
    {
        next_state = FenceState::default();
        in_code = true;
    }

    LineOutcome {
        next_state,
        in_code,
    }
}

/// Returns (visual_columns, byte_offset) for leading whitespace.
/// Tabs expand to the next 4-column boundary.
fn leading_whitespace_info(line: &str) -> (usize, usize) {
    let mut col = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => {
                col += 1;
                bytes += 1;
            }
            b'\t' => {
                col += 4 - (col % 4);
                bytes += 1;
            }
            _ => break,
        }
    }
    (col, bytes)
}

fn fence_marker(after_indent: &str) -> Option<(char, usize)> {
    let mut chars = after_indent.chars();
    let first = chars.next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run_len = 1 + chars.take_while(|c| *c == first).count();
    (run_len >= 3).then_some((first, run_len))
}

/// A closing fence is a run of markers followed only by whitespace.
fn is_closing_fence(after_indent: &str) -> bool {
    let mut chars = after_indent.chars();
    let first = match chars.next() {
        Some(c) if c == '`' || c == '~' => c,
        _ => return false,
    };
    let mut count = 1;
    for c in chars.by_ref() {
        if c == first {
            count += 1;
        } else {
            return count >= 3 && c.is_whitespace() && chars.all(|c| c.is_whitespace());
        }
    }
    count >= 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_and_closes_backtick_fence() {
        let start = advance_fence_state("```js", FenceState::default());
        assert!(start.in_code);
        assert!(start.next_state.is_open());
        assert_eq!(start.next_state.marker, Some('`'));

        let inner = advance_fence_state("", start.next_state);
        assert!(inner.in_code);
        assert!(inner.next_state.is_open());

        let end = advance_fence_state("```", inner.next_state);
        assert!(end.in_code);
        assert!(!end.next_state.is_open());
    }

    #[test]
    fn shorter_closer_does_not_close() {
        let start = advance_fence_state("````md", FenceState::default());
        let inner = advance_fence_state("```", start.next_state);
        assert!(inner.next_state.is_open());
        let end = advance_fence_state("````", inner.next_state);
        assert!(!end.next_state.is_open());
    }

    #[test]
    fn tilde_fence_ignores_backtick_closer() {
        let start = advance_fence_state("~~~", FenceState::default());
        let inner = advance_fence_state("```", start.next_state);
        assert!(inner.next_state.is_open());
    }

    #[test]
    fn indented_marker_is_not_a_fence() {
        let outcome = advance_fence_state("    ```js", FenceState::default());
        assert!(!outcome.in_code);
        assert!(!outcome.next_state.is_open());

        let tabbed = advance_fence_state("\t```js", FenceState::default());
        assert!(!tabbed.next_state.is_open());
    }

    #[test]
    fn closer_with_info_string_does_not_close() {
        let start = advance_fence_state("```", FenceState::default());
        let inner = advance_fence_state("```rust", start.next_state);
        assert!(inner.next_state.is_open());
    }
}
