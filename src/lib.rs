//! StudyBuddy's mention-handling core.
//!
//! The interesting parts of a study-room chat: extracting @mentions from
//! message text, resolving them against a room's participants, dispatching
//! fire-and-forget notifications, and driving the keyboard-navigable
//! autocomplete in the message input. Everything else (auth, real-time sync,
//! storage, email delivery) lives behind narrow collaborator traits.

/// Application wiring and the interactive room loop.
pub mod app;
/// Chat messages, the message-store boundary, and the room view session.
pub mod chat;
/// Headless @mention autocomplete state machine.
pub mod mention_input;
/// The mention pipeline: extract, match, dispatch.
pub mod mentions;
/// Outbound mention notifications.
pub mod notifications;
/// Participants and the boundary to the external room/user store.
pub mod participants;
/// Background worker for fire-and-forget async work.
pub mod worker;

pub mod utils;

pub const APP_NAME: &str = "studybuddy";
