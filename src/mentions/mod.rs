//! The mention-handling pipeline: extract, match, dispatch.
//!
//! Runs once per sent chat message, strictly after the message has been
//! recorded in the chat store. The pipeline is fire-and-forget with respect
//! to the send: its only error sink is the log, and a total failure here
//! leaves the already-persisted message untouched.

pub mod extract;
pub mod matcher;

pub use extract::{MessageSpan, extract_mentions, mention_spans};
pub use matcher::{find_mentioned_participants, match_token};

use tracing::{debug, error, info};

use crate::notifications::{MentionNotification, NotificationSender};
use crate::participants::{ParticipantError, ParticipantSource};

/// Everything the pipeline needs to know about one sent message.
#[derive(Clone, Debug)]
pub struct MentionJob {
    pub message: String,
    pub room_id: String,
    pub room_name: String,
    pub sender_name: String,
}

/// Outcome of one pipeline run, for logging and tests. `delivered` counts
/// sends the notification service accepted; `matched` counts attempts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub matched: usize,
    pub delivered: usize,
}

/// Fire-and-forget entry point: runs the pipeline and routes any failure to
/// the log. Callers never learn the outcome, by design.
pub async fn process_mentions<P, N>(source: &P, sender: &N, job: &MentionJob)
where
    P: ParticipantSource,
    N: NotificationSender,
{
    match run_pipeline(source, sender, job).await {
        Ok(report) if report.matched > 0 => {
            info!(
                "sent {}/{} mention notifications for room {}",
                report.delivered, report.matched, job.room_id,
            );
        }
        Ok(_) => {}
        Err(err) => {
            // Pipeline-fatal, but the message itself was already persisted.
            error!("mention processing failed for room {}: {err}", job.room_id);
        }
    }
}

/// Extracts mention tokens, resolves them against the room's current
/// participant list, and dispatches one notification per match.
///
/// Short-circuits before any network work when the message contains no
/// tokens. A send failure for one recipient never skips the remaining
/// recipients.
pub async fn run_pipeline<P, N>(
    source: &P,
    sender: &N,
    job: &MentionJob,
) -> Result<DispatchReport, ParticipantError>
where
    P: ParticipantSource,
    N: NotificationSender,
{
    let tokens = extract_mentions(&job.message);
    if tokens.is_empty() {
        return Ok(DispatchReport::default());
    }
    debug!("extracted {} mention token(s) in room {}", tokens.len(), job.room_id);

    let participants = source.fetch_participants(&job.room_id).await?;
    let mentioned = find_mentioned_participants(&tokens, &participants);

    let mut report = DispatchReport { matched: mentioned.len(), delivered: 0 };
    for participant in mentioned {
        let notification = MentionNotification {
            recipient_email: participant.email.clone(),
            mentioned_by_name: job.sender_name.clone(),
            room_title: job.room_name.clone(),
            message: job.message.clone(),
            room_id: job.room_id.clone(),
        };
        if sender.send_mention(&notification).await {
            report.delivered += 1;
        }
    }
    Ok(report)
}
