//! Headless @mention autocomplete for the chat message input.
//!
//! [`MentionInput`] tracks the live input's text and cursor, detects an open
//! mention context, filters the room's participant list incrementally, and
//! handles keyboard-driven selection. It owns no rendering; a UI binds to the
//! current [`AutocompleteState`] and redraws from it.
//!
//! All state here is local to one input control instance. It is recomputed
//! synchronously on every text change and cursor move, never persisted, and
//! destroyed whenever the mention context closes.

use crate::participants::Participant;
use crate::utils;

/// Keys the mention dropdown reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MentionKey {
    Up,
    Down,
    Enter,
    Escape,
}

/// The autocomplete context derived from `(text, cursor)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AutocompleteState {
    /// No open mention context.
    Closed,
    /// An open context with at least one candidate.
    Open {
        /// Text between the trigger and the cursor, lower-cased.
        query: String,
        /// Participants whose display name or email local part contains the
        /// query, in roster order.
        candidates: Vec<Participant>,
        /// Index into `candidates` of the keyboard-highlighted entry.
        selected: usize,
    },
    /// A trigger was typed but the room has no other participants; the UI
    /// renders a help message instead of a list.
    OpenNoParticipants,
    /// A trigger was typed but no participant matches the query.
    OpenNoMatches,
}

/// A chat input with @mention autocomplete, tracked headlessly.
pub struct MentionInput {
    text: String,
    /// Byte index into `text`; always on a char boundary.
    cursor: usize,
    /// The room's mentionable participants (current user already excluded),
    /// fetched once per room view.
    participants: Vec<Participant>,
    state: AutocompleteState,
    /// Byte index of the trigger `@` while a context is open.
    mention_start: Option<usize>,
}

impl MentionInput {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            participants,
            state: AutocompleteState::Closed,
            mention_start: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> &AutocompleteState {
        &self.state
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Whether any mention context (list, help, or no-matches) is showing.
    pub fn is_open(&self) -> bool {
        !matches!(self.state, AutocompleteState::Closed)
    }

    /// Replaces the entire input content, as an external binding would on a
    /// change event. `cursor` is clamped to the text and snapped to a char
    /// boundary.
    pub fn set_text_and_cursor(&mut self, text: impl Into<String>, cursor: usize) {
        self.text = text.into();
        self.cursor = utils::snap_to_char_boundary(&self.text, cursor);
        self.recompute();
    }

    /// Inserts `s` at the cursor and advances past it, like typing.
    pub fn type_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
        self.recompute();
    }

    /// Deletes the grapheme before the cursor (a single backspace).
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = utils::previous_grapheme_boundary(&self.text, self.cursor);
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
        self.recompute();
    }

    /// Moves the cursor without editing; the mention context follows it.
    pub fn move_cursor(&mut self, cursor: usize) {
        self.cursor = utils::snap_to_char_boundary(&self.text, cursor);
        self.recompute();
    }

    /// Feeds one key press to the dropdown. Returns true when the key was
    /// consumed and the caller must not also treat it as ordinary input.
    pub fn handle_key(&mut self, key: MentionKey) -> bool {
        match key {
            MentionKey::Escape => {
                if self.is_open() {
                    self.close();
                    true
                } else {
                    false
                }
            }
            MentionKey::Enter => {
                let selected = match &self.state {
                    AutocompleteState::Open { candidates, selected, .. } => {
                        candidates.get(*selected).cloned()
                    }
                    _ => None,
                };
                match selected {
                    Some(participant) => {
                        self.commit(&participant);
                        true
                    }
                    None => false,
                }
            }
            MentionKey::Down | MentionKey::Up => {
                let AutocompleteState::Open { candidates, selected, .. } = &mut self.state else {
                    return false;
                };
                // Open guarantees at least one candidate; wrap at both ends.
                let len = candidates.len();
                *selected = match key {
                    MentionKey::Down => (*selected + 1) % len,
                    _ => selected.checked_sub(1).unwrap_or(len - 1),
                };
                true
            }
        }
    }

    /// Commits `participant` into the open mention context: the run from the
    /// trigger through the cursor becomes `@{display_name} `, the cursor
    /// lands just after the trailing space, and the context closes.
    ///
    /// Also the entry point for mouse selection from the dropdown.
    pub fn commit(&mut self, participant: &Participant) {
        let Some(start) = self.mention_start else {
            return;
        };
        let inserted = format!("@{} ", participant.display_name);
        self.text = utils::safe_replace_by_byte_indices(&self.text, start, self.cursor, &inserted);
        self.cursor = start + inserted.len();
        self.close();
    }

    fn close(&mut self) {
        self.mention_start = None;
        self.state = AutocompleteState::Closed;
    }

    /// Scans backward from the cursor for the nearest trigger. Returns the
    /// trigger's byte index and the query between it and the cursor, or None
    /// when there is no trigger or the query has been abandoned (contains
    /// whitespace).
    fn find_mention_context(&self) -> Option<(usize, String)> {
        let before_cursor = utils::safe_substring_by_byte_indices(&self.text, 0, self.cursor);
        let trigger = before_cursor.rfind('@')?;
        let query = &before_cursor[trigger + 1..];
        if query.chars().any(char::is_whitespace) {
            return None;
        }
        Some((trigger, query.to_lowercase()))
    }

    /// Re-derives the autocomplete state from `(text, cursor)`.
    fn recompute(&mut self) {
        let Some((trigger, query)) = self.find_mention_context() else {
            self.close();
            return;
        };
        self.mention_start = Some(trigger);

        // An empty roster shows the help state the moment the trigger is
        // typed, regardless of query content.
        if self.participants.is_empty() {
            self.state = AutocompleteState::OpenNoParticipants;
            return;
        }

        let candidates: Vec<Participant> = self
            .participants
            .iter()
            .filter(|p| {
                p.display_name.to_lowercase().contains(&query)
                    || p.email_local_part().to_lowercase().contains(&query)
            })
            .cloned()
            .collect();

        if candidates.is_empty() {
            self.state = AutocompleteState::OpenNoMatches;
            return;
        }

        // Keep the highlighted entry across cursor moves, but reset it to the
        // top whenever the query text changes.
        let selected = match &self.state {
            AutocompleteState::Open { query: previous, selected, .. } if *previous == query => {
                (*selected).min(candidates.len() - 1)
            }
            _ => 0,
        };
        self.state = AutocompleteState::Open { query, candidates, selected };
    }
}
