//! Chat messages, the message-store boundary, and the per-room view session.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mention_input::MentionInput;
use crate::mentions::MentionJob;
use crate::participants::{ParticipantError, ParticipantSource};
use crate::worker::{self, BackgroundRequest};

/// One chat message as stored and displayed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub text: String,
    pub author_id: String,
    pub author_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Identity of the local user, attached to every message they send.
#[derive(Clone, Debug)]
pub struct AuthorInfo {
    pub id: String,
    pub name: String,
    pub photo_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum MessageStoreError {
    #[error("chat store rejected the message: {0}")]
    Rejected(String),
}

/// Append-only store of chat messages, keyed by room.
pub trait MessageStore {
    fn append(
        &self,
        room_id: &str,
        message: &ChatMessage,
    ) -> impl Future<Output = Result<(), MessageStoreError>> + Send;
}

#[derive(Default)]
struct RoomChannel {
    history: Vec<ChatMessage>,
    subscribers: Vec<crossbeam_channel::Sender<ChatMessage>>,
}

/// In-process chat store with per-room subscription channels, standing in
/// for the managed real-time store behind the same trait boundary.
#[derive(Default)]
pub struct InMemoryMessageStore {
    rooms: Mutex<BTreeMap<String, RoomChannel>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the room's message history so far plus a receiver that yields
    /// every message appended from now on.
    pub fn subscribe(&self, room_id: &str) -> (Vec<ChatMessage>, Receiver<ChatMessage>) {
        let mut rooms = self.rooms.lock().unwrap();
        let room = rooms.entry(room_id.to_owned()).or_default();
        let (sender, receiver) = crossbeam_channel::unbounded();
        room.subscribers.push(sender);
        (room.history.clone(), receiver)
    }
}

impl MessageStore for InMemoryMessageStore {
    async fn append(&self, room_id: &str, message: &ChatMessage) -> Result<(), MessageStoreError> {
        let mut rooms = self.rooms.lock().unwrap();
        let room = rooms.entry(room_id.to_owned()).or_default();
        room.history.push(message.clone());
        // Drop subscribers whose receiving end has gone away.
        room.subscribers.retain(|s| s.send(message.clone()).is_ok());
        Ok(())
    }
}

/// Appends the message to the chat store, then hands the same text to the
/// mention pipeline as a fire-and-forget background job.
///
/// The append is the only fallible part the caller sees: mention processing
/// starts strictly after the append has succeeded, and nothing it does can
/// fail or block the send.
pub async fn send_message<S: MessageStore>(
    store: &S,
    room_id: &str,
    room_name: &str,
    author: &AuthorInfo,
    text: &str,
) -> Result<(), MessageStoreError> {
    send_message_with(store, room_id, room_name, author, text, |job| {
        worker::submit_request(BackgroundRequest::ProcessMentions(job));
    })
    .await
}

/// [`send_message`] with the mention-job hand-off as an explicit parameter,
/// so the pipeline submission stays observable without a running worker.
pub async fn send_message_with<S, F>(
    store: &S,
    room_id: &str,
    room_name: &str,
    author: &AuthorInfo,
    text: &str,
    submit: F,
) -> Result<(), MessageStoreError>
where
    S: MessageStore,
    F: FnOnce(MentionJob),
{
    let message = ChatMessage {
        text: text.to_owned(),
        author_id: author.id.clone(),
        author_name: author.name.clone(),
        author_photo_url: author.photo_url.clone(),
        image_url: None,
        timestamp: Utc::now(),
    };
    store.append(room_id, &message).await?;

    submit(MentionJob {
        message: message.text,
        room_id: room_id.to_owned(),
        room_name: room_name.to_owned(),
        sender_name: author.name.clone(),
    });
    Ok(())
}

/// One user's live view of a room: the participant list fetched at mount,
/// the mention input bound to it, and the message subscription.
pub struct RoomSession {
    pub room_id: String,
    pub room_name: String,
    pub input: MentionInput,
    pub history: Vec<ChatMessage>,
    pub updates: Receiver<ChatMessage>,
}

impl RoomSession {
    /// Fetches the participant list once and opens the room view.
    ///
    /// Individual profile lookups degrade to placeholders inside the source;
    /// only a missing room aborts the open. The current user is excluded from
    /// the mention candidates, since one cannot mention oneself.
    pub async fn open<P: ParticipantSource>(
        source: &P,
        store: &InMemoryMessageStore,
        room_id: &str,
        room_name: &str,
        current_user_id: &str,
    ) -> Result<Self, ParticipantError> {
        let mut participants = source.fetch_participants(room_id).await?;
        participants.retain(|p| p.id != current_user_id);
        let (history, updates) = store.subscribe(room_id);
        Ok(Self {
            room_id: room_id.to_owned(),
            room_name: room_name.to_owned(),
            input: MentionInput::new(participants),
            history,
            updates,
        })
    }
}
