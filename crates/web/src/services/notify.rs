//! Notification pipeline for task assignment emails.
//!
//! The pipeline subscribes the recipient address to the delivery channel
//! and then publishes the message. Subscribing is fire-and-forget: the
//! provider asks the recipient to confirm the subscription out of band, so
//! a first-time recipient will not receive this particular message even
//! when both calls succeed. Publish runs regardless of the subscribe
//! outcome, and neither step's failure reaches the caller.

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::BehaviorVersion;

use crewdesk_core::Email;

use crate::error::LogAndContinue;

/// Errors from the notification channel.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Subscribe or publish against the channel failed.
    #[error("channel error: {0}")]
    Channel(String),
}

/// A delivery channel bound to one recipient audience.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Request a subscription for an endpoint (e.g. protocol "email").
    async fn subscribe(&self, protocol: &str, endpoint: &str) -> Result<(), NotifyError>;

    /// Publish a message to every confirmed subscriber.
    async fn publish(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// SNS-backed channel bound to one topic.
pub struct SnsChannel {
    client: aws_sdk_sns::Client,
    topic_arn: String,
}

impl SnsChannel {
    /// Build the channel from ambient AWS credentials.
    pub async fn new(topic_arn: String) -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: aws_sdk_sns::Client::new(&config),
            topic_arn,
        }
    }
}

#[async_trait]
impl Channel for SnsChannel {
    async fn subscribe(&self, protocol: &str, endpoint: &str) -> Result<(), NotifyError> {
        let output = self
            .client
            .subscribe()
            .topic_arn(&self.topic_arn)
            .protocol(protocol)
            .endpoint(endpoint)
            .send()
            .await
            .map_err(|e| NotifyError::Channel(e.to_string()))?;

        tracing::info!(
            subscription_arn = ?output.subscription_arn(),
            "subscription requested, pending recipient confirmation"
        );
        Ok(())
    }

    async fn publish(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let output = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(body)
            .send()
            .await
            .map_err(|e| NotifyError::Channel(e.to_string()))?;

        tracing::info!(message_id = ?output.message_id(), "notification published");
        Ok(())
    }
}

/// An assignment notification; ephemeral, never persisted.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub recipient: Email,
    pub subject: String,
    pub body: String,
}

/// Subscribe-then-publish pipeline over an optional channel.
#[derive(Clone)]
pub struct NotificationPipeline {
    channel: Option<Arc<dyn Channel>>,
}

impl NotificationPipeline {
    /// Pipeline backed by a real channel.
    #[must_use]
    pub fn new(channel: Arc<dyn Channel>) -> Self {
        Self {
            channel: Some(channel),
        }
    }

    /// Pipeline with no channel configured; every notify is a no-op.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { channel: None }
    }

    /// Deliver a notification, swallowing every failure.
    ///
    /// Both steps fail independently; the caller's state (the committed
    /// task) is never affected.
    pub async fn notify(&self, request: &NotificationRequest) {
        let Some(channel) = &self.channel else {
            tracing::debug!("notification channel disabled, skipping");
            return;
        };

        let _ = channel
            .subscribe("email", request.recipient.as_str())
            .await
            .log_and_continue("channel subscribe failed");

        // Publish regardless of the subscribe outcome
        let _ = channel
            .publish(&request.subject, &request.body)
            .await
            .log_and_continue("channel publish failed");
    }
}
