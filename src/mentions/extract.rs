//! Mention token extraction and mention-aware message spans.
//!
//! A mention is the `@` trigger character immediately followed by one or more
//! word characters (letters, digits, underscore). The same scan backs both
//! notification extraction and display highlighting, so the two can never
//! disagree about what counts as a mention.

use std::collections::BTreeSet;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// One piece of a message as it should be displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageSpan<'a> {
    /// Ordinary text, rendered as-is.
    Text(&'a str),
    /// An `@word` run, rendered with mention styling. Includes the leading
    /// `@`. Purely cosmetic: the word need not resolve to a real participant.
    Mention(&'a str),
}

impl<'a> MessageSpan<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            MessageSpan::Text(s) | MessageSpan::Mention(s) => s,
        }
    }
}

/// Splits message text into [`MessageSpan`]s. Concatenating the spans in
/// order reproduces the input exactly.
pub fn mention_spans(text: &str) -> Vec<MessageSpan<'_>> {
    let mut spans = Vec::new();
    let mut plain_start = 0;
    let mut iter = text.char_indices().peekable();
    while let Some((idx, c)) = iter.next() {
        if c != '@' {
            continue;
        }
        let word_start = idx + 1;
        let mut word_end = word_start;
        while let Some(&(next_idx, next_c)) = iter.peek() {
            if !is_word_char(next_c) {
                break;
            }
            word_end = next_idx + next_c.len_utf8();
            iter.next();
        }
        // A bare `@` with no following word character is not a mention.
        if word_end == word_start {
            continue;
        }
        if plain_start < idx {
            spans.push(MessageSpan::Text(&text[plain_start..idx]));
        }
        spans.push(MessageSpan::Mention(&text[idx..word_end]));
        plain_start = word_end;
    }
    if plain_start < text.len() {
        spans.push(MessageSpan::Text(&text[plain_start..]));
    }
    spans
}

/// Extracts the set of mention tokens from raw message text.
///
/// Tokens are the lower-cased word runs following each trigger character,
/// deduplicated case-insensitively. Always succeeds; no mentions yields an
/// empty set.
pub fn extract_mentions(text: &str) -> BTreeSet<String> {
    mention_spans(text)
        .into_iter()
        .filter_map(|span| match span {
            MessageSpan::Mention(word) => Some(word[1..].to_lowercase()),
            MessageSpan::Text(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        extract_mentions(text).into_iter().collect()
    }

    #[test]
    fn extraction_is_deterministic_and_dedupes_case_insensitively() {
        assert_eq!(tokens("hello @Ann and @ann"), vec!["ann"]);
        assert_eq!(extract_mentions("hello @Ann and @ann"), extract_mentions("hello @Ann and @ann"));
    }

    #[test]
    fn text_without_triggers_yields_no_tokens() {
        assert!(extract_mentions("no mentions here").is_empty());
        assert!(extract_mentions("").is_empty());
    }

    #[test]
    fn bare_trigger_without_word_characters_yields_no_token() {
        assert!(extract_mentions("an @ alone, or trailing @").is_empty());
        assert_eq!(tokens("@@bob"), vec!["bob"]);
    }

    #[test]
    fn tokens_stop_at_the_first_non_word_character() {
        assert_eq!(tokens("ping @bob! and @ann_2."), vec!["ann_2", "bob"]);
    }

    #[test]
    fn multiple_mentions_of_distinct_users_are_all_extracted() {
        assert_eq!(tokens("@ann meet @bob re: @ann"), vec!["ann", "bob"]);
    }

    #[test]
    fn spans_concatenate_back_to_the_original_text() {
        for text in ["hi @ann, meet @bob!", "@a", "no mentions", "", "@@x y@z"] {
            let joined: String = mention_spans(text).iter().map(|s| s.as_str()).collect();
            assert_eq!(joined, text);
        }
    }

    #[test]
    fn spans_mark_every_trigger_word_run_regardless_of_resolution() {
        let spans = mention_spans("hi @nobody!");
        assert_eq!(
            spans,
            vec![
                MessageSpan::Text("hi "),
                MessageSpan::Mention("@nobody"),
                MessageSpan::Text("!"),
            ],
        );
    }
}
