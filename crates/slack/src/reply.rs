//! Reply delivery through Slack `response_url` webhooks, and the per-interaction
//! lifecycle that guarantees exactly one terminal reply.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::blocks::{Block, MessageTemplate};
use crate::commands::Visibility;

/// Slack accepts at most this many posts to a single `response_url`.
pub const MAX_RESPONSE_URL_MESSAGES: usize = 5;
const DELIVERY_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub visibility: Visibility,
    pub replace_original: bool,
    pub messages: Vec<MessageTemplate>,
}

impl Reply {
    pub fn single(visibility: Visibility, message: MessageTemplate) -> Self {
        Self { visibility, replace_original: false, messages: vec![message] }
    }

    pub fn with_followups(visibility: Visibility, messages: Vec<MessageTemplate>) -> Self {
        Self { visibility, replace_original: false, messages }
    }

    pub fn replacing_original(mut self, replace: bool) -> Self {
        self.replace_original = replace;
        self
    }

    /// Wire payloads in delivery order. Only the first one may replace the original message.
    pub fn payloads(&self) -> Vec<ResponsePayload<'_>> {
        self.messages
            .iter()
            .enumerate()
            .map(|(index, message)| ResponsePayload {
                response_type: self.visibility.as_response_type(),
                replace_original: index == 0 && self.replace_original,
                text: &message.fallback_text,
                blocks: &message.blocks,
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct ResponsePayload<'a> {
    pub response_type: &'static str,
    pub replace_original: bool,
    pub text: &'a str,
    pub blocks: &'a [Block],
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("reply transport failure: {0}")]
    Transport(String),
    #[error("slack rejected reply with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn deliver(&self, response_url: &str, reply: &Reply) -> Result<(), DeliveryError>;
}

/// Posts replies to the `response_url` Slack attached to the command or click.
#[derive(Clone)]
pub struct ResponseUrlSink {
    client: Client,
}

impl ResponseUrlSink {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReplySink for ResponseUrlSink {
    async fn deliver(&self, response_url: &str, reply: &Reply) -> Result<(), DeliveryError> {
        for (index, payload) in reply.payloads().iter().enumerate() {
            let response = self
                .client
                .post(response_url)
                .timeout(Duration::from_secs(DELIVERY_TIMEOUT_SECS))
                .json(payload)
                .send()
                .await
                .map_err(|error| DeliveryError::Transport(error.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!(
                    event_name = "slack.reply.rejected",
                    status = status.as_u16(),
                    message_index = index,
                    "slack rejected reply"
                );
                return Err(DeliveryError::Rejected { status: status.as_u16(), body });
            }
            debug!(event_name = "slack.reply.delivered", message_index = index, "reply delivered");
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionPhase {
    Idle,
    AwaitingGatewayResponse,
    Replied,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("interaction cannot move from {from:?} to {to:?}")]
pub struct PhaseError {
    pub from: InteractionPhase,
    pub to: InteractionPhase,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InteractionError {
    #[error(transparent)]
    Phase(#[from] PhaseError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Tracks one interaction from trigger to its single terminal reply.
#[derive(Debug)]
pub struct Interaction {
    response_url: String,
    phase: InteractionPhase,
}

impl Interaction {
    pub fn new(response_url: impl Into<String>) -> Self {
        Self { response_url: response_url.into(), phase: InteractionPhase::Idle }
    }

    /// The trigger was acknowledged; the gateway call is in flight.
    pub fn begin(mut self) -> Self {
        self.phase = InteractionPhase::AwaitingGatewayResponse;
        self
    }

    pub fn phase(&self) -> InteractionPhase {
        self.phase
    }

    pub fn response_url(&self) -> &str {
        &self.response_url
    }

    /// Sends the terminal reply through `sink`. Any later reply is refused without
    /// reaching the sink, even when this delivery fails.
    pub async fn reply(
        &mut self,
        sink: &dyn ReplySink,
        reply: &Reply,
    ) -> Result<(), InteractionError> {
        if self.phase != InteractionPhase::AwaitingGatewayResponse {
            return Err(PhaseError { from: self.phase, to: InteractionPhase::Replied }.into());
        }
        self.phase = InteractionPhase::Replied;
        sink.deliver(&self.response_url, reply).await?;
        Ok(())
    }
}
