use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info};

use crate::clients::discord_client::WebhookSender;

pub struct ArmedNotification {
    subject: String,
    fire_at: DateTime<Utc>,
    handle: JoinHandle<bool>,
}

// Delivery failures are logged, never retried; the run still counts as fired.
pub fn arm(
    sender: Arc<dyn WebhookSender>,
    subject: String,
    message: String,
    fire_at: DateTime<Utc>,
    delay: Duration,
) -> ArmedNotification {
    let task_subject = subject.clone();
    let handle = tokio::spawn(async move {
        sleep(delay).await;
        match sender.send_message(&message).await {
            Ok(()) => info!(subject = %task_subject, "notification delivered"),
            Err(err) => {
                error!(subject = %task_subject, error = %err, "notification delivery failed")
            }
        }
        true
    });
    ArmedNotification {
        subject,
        fire_at,
        handle,
    }
}

impl ArmedNotification {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn fire_at(&self) -> DateTime<Utc> {
        self.fire_at
    }

    // Resolves true once the timer fired, false if it was cancelled first.
    pub async fn join(&mut self) -> bool {
        (&mut self.handle).await.unwrap_or(false)
    }

    // Aborting during the sleep means the webhook is never called.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}
