//! Outbound mention notifications toward the notification-service collaborator.
//!
//! The service is opaque to this crate: one POST per mention, one boolean
//! outcome. Delivery details, retries, and templating live on the other side
//! of the wire.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use url::Url;

/// Wire body for `POST /notifications/send-mention`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionNotification {
    pub recipient_email: String,
    pub mentioned_by_name: String,
    pub room_title: String,
    pub message: String,
    pub room_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SendMentionResponse {
    success: bool,
    message_id: Option<String>,
    recipient: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SendMentionFailure {
    error: Option<String>,
    message: Option<String>,
}

/// Sender of mention notifications.
///
/// `send_mention` makes exactly one attempt and reports a boolean outcome;
/// it must never panic or raise, because the pipeline treats every recipient
/// independently and a failure for one must not disturb the others.
pub trait NotificationSender {
    fn send_mention(&self, notification: &MentionNotification) -> impl Future<Output = bool> + Send;
}

/// Notification sender backed by the backend's HTTP notification service.
pub struct HttpNotificationSender {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpNotificationSender {
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/notifications/send-mention",
            self.base_url.as_str().trim_end_matches('/'),
        )
    }
}

impl NotificationSender for HttpNotificationSender {
    async fn send_mention(&self, notification: &MentionNotification) -> bool {
        let recipient = &notification.recipient_email;
        let response = match self.client.post(self.endpoint()).json(notification).send().await {
            Ok(response) => response,
            Err(err) => {
                error!("mention notification request for {recipient} failed: {err}");
                return false;
            }
        };

        let status = response.status();
        if status.is_success() {
            let body = response.json::<SendMentionResponse>().await.unwrap_or_default();
            if !body.success {
                warn!("notification service answered {status} but reported success=false for {recipient}");
            }
            info!(
                "mention notification sent to {} (message id: {})",
                body.recipient.as_deref().unwrap_or(recipient),
                body.message_id.as_deref().unwrap_or("unknown"),
            );
            true
        } else {
            let body = response.json::<SendMentionFailure>().await.unwrap_or_default();
            let reason = body.error.or(body.message).unwrap_or_else(|| "unknown error".to_owned());
            warn!("notification service rejected mention for {recipient}: {status} ({reason})");
            false
        }
    }
}
