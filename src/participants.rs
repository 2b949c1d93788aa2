//! Room participants and the boundary to the external room/user store.
//!
//! The external store returns loosely-shaped documents in which every field
//! may be missing. All of that ambiguity is resolved here, at the boundary:
//! the rest of the crate only ever sees fully-populated [`Participant`]s.

use std::future::Future;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::warn;
use url::Url;

/// Display name substituted when a participant's profile cannot be resolved.
pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown User";
/// Email substituted when a participant has no known email address.
pub const NO_EMAIL_PLACEHOLDER: &str = "No email available";

const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous";

/// One member of a study room, resolved from room membership plus a profile
/// lookup. Read-only once constructed; `id` is unique within one room's list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

impl Participant {
    /// The fallback entry used when a profile lookup fails outright.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: UNKNOWN_DISPLAY_NAME.to_owned(),
            email: NO_EMAIL_PLACEHOLDER.to_owned(),
        }
    }

    /// The part of the email address before the `@`. For placeholder emails
    /// with no `@`, this is the whole string.
    pub fn email_local_part(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// Untyped user profile document as returned by the external store.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawUserRecord {
    pub display_name: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl RawUserRecord {
    /// Coerces a loosely-shaped profile record into a typed [`Participant`].
    ///
    /// The display name resolves to `displayName`, else `name`, else the email
    /// local part, else `"Anonymous"`. The email falls back to the
    /// no-email placeholder.
    pub fn into_participant(self, id: &str) -> Participant {
        let RawUserRecord { display_name, name, email } = self;
        let display_name = display_name
            .filter(|s| !s.trim().is_empty())
            .or_else(|| name.filter(|s| !s.trim().is_empty()))
            .or_else(|| {
                email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| ANONYMOUS_DISPLAY_NAME.to_owned());
        let email = email
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| NO_EMAIL_PLACEHOLDER.to_owned());
        Participant { id: id.to_owned(), display_name, email }
    }
}

/// Untyped room document as returned by the external store.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRoomRecord {
    pub participants: Vec<String>,
    pub created_by: Option<String>,
    pub creator_name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ParticipantError {
    #[error("room {0} not found")]
    RoomNotFound(String),
    #[error("participant store request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Source of a room's participant list.
///
/// A failed lookup of an individual member's profile must degrade to a
/// [`Participant::placeholder`] rather than failing the whole fetch; only a
/// missing room is an error.
pub trait ParticipantSource {
    fn fetch_participants(
        &self,
        room_id: &str,
    ) -> impl Future<Output = Result<Vec<Participant>, ParticipantError>> + Send;
}

/// Participant source backed by the backend's room/user JSON documents.
pub struct HttpParticipantSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpParticipantSource {
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    async fn fetch_room(&self, room_id: &str) -> Result<RawRoomRecord, ParticipantError> {
        let response = self
            .client
            .get(self.endpoint(&format!("rooms/{room_id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ParticipantError::RoomNotFound(room_id.to_owned()));
        }
        Ok(response.error_for_status()?.json().await?)
    }

    /// Returns `Ok(None)` when the profile document simply does not exist,
    /// as opposed to a failed request.
    async fn fetch_user(&self, user_id: &str) -> Result<Option<RawUserRecord>, ParticipantError> {
        let response = self
            .client
            .get(self.endpoint(&format!("users/{user_id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(response.error_for_status()?.json().await?))
    }
}

impl ParticipantSource for HttpParticipantSource {
    async fn fetch_participants(
        &self,
        room_id: &str,
    ) -> Result<Vec<Participant>, ParticipantError> {
        let room = self.fetch_room(room_id).await?;
        let mut participants = Vec::with_capacity(room.participants.len());
        for user_id in &room.participants {
            match self.fetch_user(user_id).await {
                Ok(Some(record)) => participants.push(record.into_participant(user_id)),
                Ok(None) => {
                    // No profile document; the room itself still knows the
                    // creator's name.
                    let display_name = (room.created_by.as_deref() == Some(user_id.as_str()))
                        .then(|| room.creator_name.clone())
                        .flatten()
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or_else(|| UNKNOWN_DISPLAY_NAME.to_owned());
                    participants.push(Participant {
                        id: user_id.clone(),
                        display_name,
                        email: NO_EMAIL_PLACEHOLDER.to_owned(),
                    });
                }
                Err(err) => {
                    warn!("failed to fetch profile for {user_id}: {err}");
                    participants.push(Participant::placeholder(user_id.clone()));
                }
            }
        }
        Ok(participants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_prefers_display_name_over_name() {
        let record = RawUserRecord {
            display_name: Some("Ann Lee".into()),
            name: Some("ann.l".into()),
            email: Some("ann@x.com".into()),
        };
        let p = record.into_participant("u1");
        assert_eq!(p.display_name, "Ann Lee");
        assert_eq!(p.email, "ann@x.com");
    }

    #[test]
    fn coercion_falls_back_to_name_then_email_local_part() {
        let name_only = RawUserRecord {
            name: Some("bob".into()),
            ..Default::default()
        };
        assert_eq!(name_only.into_participant("u2").display_name, "bob");

        let email_only = RawUserRecord {
            email: Some("carol@x.com".into()),
            ..Default::default()
        };
        let p = email_only.into_participant("u3");
        assert_eq!(p.display_name, "carol");
        assert_eq!(p.email, "carol@x.com");
    }

    #[test]
    fn coercion_of_empty_record_yields_anonymous_with_placeholder_email() {
        let p = RawUserRecord::default().into_participant("u4");
        assert_eq!(p.display_name, "Anonymous");
        assert_eq!(p.email, NO_EMAIL_PLACEHOLDER);
    }

    #[test]
    fn room_records_tolerate_missing_and_extra_document_fields() {
        let full: RawRoomRecord = serde_json::from_str(
            r#"{"participants":["u1","u2"],"createdBy":"u1","creatorName":"Ann Lee","name":"Calculus","subject":"math"}"#,
        )
        .unwrap();
        assert_eq!(full.participants, ["u1", "u2"]);
        assert_eq!(full.created_by.as_deref(), Some("u1"));
        assert_eq!(full.creator_name.as_deref(), Some("Ann Lee"));

        let bare: RawRoomRecord = serde_json::from_str(r#"{}"#).unwrap();
        assert!(bare.participants.is_empty());
        assert!(bare.created_by.is_none());
    }

    #[test]
    fn placeholder_participant_uses_the_documented_fallback_strings() {
        let p = Participant::placeholder("u5");
        assert_eq!(p.display_name, UNKNOWN_DISPLAY_NAME);
        assert_eq!(p.email, NO_EMAIL_PLACEHOLDER);
    }

    #[test]
    fn email_local_part_handles_placeholder_emails_without_an_at_sign() {
        let p = Participant::placeholder("u6");
        assert_eq!(p.email_local_part(), NO_EMAIL_PLACEHOLDER);

        let q = Participant {
            id: "u7".into(),
            display_name: "Bob Ray".into(),
            email: "bob@x.com".into(),
        };
        assert_eq!(q.email_local_part(), "bob");
    }
}
