//! Byte-index and grapheme helpers for text handled by the mention input.

use unicode_segmentation::UnicodeSegmentation;

/// Snaps `idx` down to the nearest char boundary in `text`.
pub(crate) fn snap_to_char_boundary(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Replaces `text[start..end]` with `replacement`, snapping both indices to
/// char boundaries so that a stale index can never split a code point.
pub fn safe_replace_by_byte_indices(
    text: &str,
    start: usize,
    end: usize,
    replacement: &str,
) -> String {
    let start = snap_to_char_boundary(text, start);
    let end = snap_to_char_boundary(text, end).max(start);
    let mut result = String::with_capacity(text.len() - (end - start) + replacement.len());
    result.push_str(&text[..start]);
    result.push_str(replacement);
    result.push_str(&text[end..]);
    result
}

/// Returns `text[start..end]` with both indices snapped to char boundaries.
pub fn safe_substring_by_byte_indices(text: &str, start: usize, end: usize) -> &str {
    let start = snap_to_char_boundary(text, start);
    let end = snap_to_char_boundary(text, end).max(start);
    &text[start..end]
}

/// Returns the byte index of the grapheme boundary immediately before `idx`,
/// i.e. where the cursor lands after a single backspace.
pub fn previous_grapheme_boundary(text: &str, idx: usize) -> usize {
    let idx = snap_to_char_boundary(text, idx);
    text.grapheme_indices(true)
        .map(|(i, _)| i)
        .take_while(|&i| i < idx)
        .last()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_swaps_exactly_the_requested_span() {
        let replaced = safe_replace_by_byte_indices("hello @bo world", 6, 9, "@Bob Ray ");
        assert_eq!(replaced, "hello @Bob Ray  world");
    }

    #[test]
    fn replace_snaps_indices_that_split_a_code_point() {
        // "héllo": the 'é' occupies bytes 1..3, so index 2 is not a boundary.
        let replaced = safe_replace_by_byte_indices("héllo", 2, 2, "X");
        assert_eq!(replaced, "hXéllo");
    }

    #[test]
    fn substring_clamps_out_of_range_indices() {
        assert_eq!(safe_substring_by_byte_indices("abc", 1, 999), "bc");
        assert_eq!(safe_substring_by_byte_indices("abc", 5, 2), "");
    }

    #[test]
    fn previous_grapheme_boundary_steps_over_multibyte_graphemes() {
        let text = "a🦀b";
        assert_eq!(previous_grapheme_boundary(text, text.len()), 5);
        assert_eq!(previous_grapheme_boundary(text, 5), 1);
        assert_eq!(previous_grapheme_boundary(text, 1), 0);
        assert_eq!(previous_grapheme_boundary(text, 0), 0);
    }
}
