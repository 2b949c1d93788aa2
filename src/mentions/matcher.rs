//! Resolving mention tokens against a room's participant list.

use crate::participants::Participant;

/// Returns the first participant matched by `token`, if any.
///
/// The predicates are checked in a fixed order, first success wins:
/// 1. the display name, lower-cased, contains the token as a substring;
/// 2. the display name with all whitespace removed, lower-cased, equals the
///    token exactly;
/// 3. the email local part, lower-cased, equals the token exactly.
///
/// The ordering is a design choice, not a strength ranking. The substring
/// predicate is intentionally permissive: a token can match an unintended
/// participant whose name happens to contain it.
pub fn match_token<'a>(token: &str, participants: &'a [Participant]) -> Option<&'a Participant> {
    participants.iter().find(|p| {
        let display_lower = p.display_name.to_lowercase();
        display_lower.contains(token)
            || display_lower.split_whitespace().collect::<String>() == token
            || p.email_local_part().to_lowercase() == token
    })
}

/// Resolves each token independently to at most one participant, in
/// token-processing order. Unmatched tokens are dropped silently. The same
/// participant may appear more than once if matched by distinct tokens.
pub fn find_mentioned_participants<'a, I>(
    tokens: I,
    participants: &'a [Participant],
) -> Vec<&'a Participant>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut matched = Vec::new();
    for token in tokens {
        if let Some(participant) = match_token(token.as_ref(), participants) {
            matched.push(participant);
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Participant> {
        vec![
            Participant {
                id: "u1".into(),
                display_name: "Ann Lee".into(),
                email: "ann@x.com".into(),
            },
            Participant {
                id: "u2".into(),
                display_name: "Bob Ray".into(),
                email: "bob@x.com".into(),
            },
        ]
    }

    #[test]
    fn token_matching_a_display_name_substring_resolves() {
        let participants = roster();
        let matched = match_token("ann", &participants).unwrap();
        assert_eq!(matched.display_name, "Ann Lee");
    }

    #[test]
    fn token_matching_email_local_part_resolves() {
        let participants = roster();
        let matched = match_token("bob", &participants).unwrap();
        assert_eq!(matched.display_name, "Bob Ray");
    }

    #[test]
    fn whitespace_stripped_display_name_matches_exactly() {
        let participants = roster();
        let matched = match_token("annlee", &participants).unwrap();
        assert_eq!(matched.id, "u1");
    }

    #[test]
    fn unknown_tokens_are_dropped_silently() {
        let participants = roster();
        assert!(match_token("zed", &participants).is_none());
        let matched = find_mentioned_participants(["zed", "ann"], &participants);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "u1");
    }

    #[test]
    fn each_token_yields_at_most_one_match_but_duplicates_across_tokens_stand() {
        let participants = roster();
        // "ann" matches by display name, "annlee" by stripped name: same user twice.
        let matched = find_mentioned_participants(["ann", "annlee"], &participants);
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|p| p.id == "u1"));
    }

    #[test]
    fn first_participant_in_list_order_wins_for_ambiguous_tokens() {
        let mut participants = roster();
        participants.push(Participant {
            id: "u3".into(),
            display_name: "Anna Banana".into(),
            email: "anna@x.com".into(),
        });
        // "an" is a substring of both "Ann Lee" and "Anna Banana"; list order decides.
        let matched = match_token("an", &participants).unwrap();
        assert_eq!(matched.id, "u1");
    }
}
