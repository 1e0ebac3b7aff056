//! HTTP endpoints Slack posts slash commands and block actions to.
//!
//! Every request is signature-checked, acknowledged with an empty 200 and then
//! handled on its own task; the answer goes back through the `response_url`.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use chrono::Utc;
use docbrowse_core::{ApplicationError, InterfaceError};
use docbrowse_slack::{
    blocks,
    commands::CommandParseError,
    events::{DispatchError, EventHandlerError},
    reply::Interaction,
    signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER},
    EventContext, EventDispatcher, HandlerResult, Reply, ReplySink, SignatureVerifier,
    SlackEnvelope, SlashCommandForm, Visibility,
};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct SlackState {
    verifier: SignatureVerifier,
    dispatcher: Arc<EventDispatcher>,
    sink: Arc<dyn ReplySink>,
    requests: Arc<AtomicU64>,
}

impl SlackState {
    pub fn new(
        verifier: SignatureVerifier,
        dispatcher: EventDispatcher,
        sink: Arc<dyn ReplySink>,
    ) -> Self {
        Self {
            verifier,
            dispatcher: Arc::new(dispatcher),
            sink,
            requests: Arc::new(AtomicU64::new(0)),
        }
    }

    fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<String, StatusCode> {
        let timestamp = header_value(headers, TIMESTAMP_HEADER);
        let signature = header_value(headers, SIGNATURE_HEADER);

        if let Err(rejection) =
            self.verifier.verify(timestamp, signature, body, Utc::now().timestamp())
        {
            warn!(
                event_name = "slack.request.rejected",
                correlation_id = "unverified",
                reason = %rejection,
                "rejected slack request"
            );
            return Err(StatusCode::UNAUTHORIZED);
        }

        let sequence = self.requests.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(format!("req-{}-{sequence}", timestamp.unwrap_or_default().trim()))
    }
}

#[derive(Debug, Deserialize)]
struct InteractionForm {
    payload: String,
}

pub fn router(state: SlackState) -> Router {
    Router::new()
        .route("/slack/commands", post(slash_command))
        .route("/slack/interactions", post(interaction))
        .with_state(state)
}

async fn slash_command(
    State(state): State<SlackState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let request_id = match state.verify(&headers, &body) {
        Ok(request_id) => request_id,
        Err(status) => return status,
    };

    let form: SlashCommandForm = match serde_urlencoded::from_bytes(&body) {
        Ok(form) => form,
        Err(parse_error) => {
            warn!(
                event_name = "slack.command.malformed",
                correlation_id = %request_id,
                error = %parse_error,
                "slash command form could not be decoded"
            );
            return StatusCode::BAD_REQUEST;
        }
    };

    info!(
        event_name = "slack.command.received",
        correlation_id = %request_id,
        user_id = %form.user_id,
        command = %form.command,
        "slash command received"
    );
    tokio::spawn(process(state, SlackEnvelope::slash_command(form.into_payload(request_id))));
    StatusCode::OK
}

async fn interaction(
    State(state): State<SlackState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let request_id = match state.verify(&headers, &body) {
        Ok(request_id) => request_id,
        Err(status) => return status,
    };

    let form: InteractionForm = match serde_urlencoded::from_bytes(&body) {
        Ok(form) => form,
        Err(parse_error) => {
            warn!(
                event_name = "slack.interaction.malformed",
                correlation_id = %request_id,
                error = %parse_error,
                "interaction form could not be decoded"
            );
            return StatusCode::BAD_REQUEST;
        }
    };

    match SlackEnvelope::from_interaction_json(&form.payload, &request_id) {
        Ok(envelope) => {
            tokio::spawn(process(state, envelope));
        }
        Err(decode_error) => {
            warn!(
                event_name = "slack.interaction.rejected",
                correlation_id = %request_id,
                error = %decode_error,
                answerable = decode_error.response_url.is_some(),
                "interaction payload could not be decoded"
            );
            if let Some(response_url) = decode_error.response_url {
                let interaction = Interaction::new(response_url).begin();
                tokio::spawn(reject(state, interaction, request_id, decode_error.source));
            }
        }
    }
    StatusCode::OK
}

async fn process(state: SlackState, envelope: SlackEnvelope) {
    let ctx = EventContext { correlation_id: envelope.envelope_id.clone() };
    let Some(response_url) = envelope.event.response_url().map(str::to_owned) else {
        debug!(
            event_name = "slack.event.ignored",
            correlation_id = %ctx.correlation_id,
            event_type = ?envelope.event.event_type(),
            "event carries no response_url"
        );
        return;
    };
    let interaction = Interaction::new(response_url).begin();

    let reply = match state.dispatcher.dispatch(&envelope, &ctx).await {
        Ok(HandlerResult::Responded(reply)) => reply,
        Ok(HandlerResult::Ignored) => {
            debug!(
                event_name = "slack.event.ignored",
                correlation_id = %ctx.correlation_id,
                event_type = ?envelope.event.event_type(),
                "no handler answered the event"
            );
            return;
        }
        Err(dispatch_error) => failure_reply(dispatch_error, &ctx.correlation_id),
    };

    send(&state, interaction, &reply, &ctx.correlation_id, envelope.event.user_id()).await;
}

/// Answers a click whose payload decoded far enough to reveal its `response_url`.
async fn reject(
    state: SlackState,
    interaction: Interaction,
    request_id: String,
    parse_error: CommandParseError,
) {
    let reply =
        failure_reply(DispatchError::Handler(EventHandlerError::Parse(parse_error)), &request_id);
    send(&state, interaction, &reply, &request_id, None).await;
}

async fn send(
    state: &SlackState,
    mut interaction: Interaction,
    reply: &Reply,
    correlation_id: &str,
    user_id: Option<&str>,
) {
    match interaction.reply(state.sink.as_ref(), reply).await {
        Ok(()) => debug!(
            event_name = "slack.interaction.replied",
            correlation_id = %correlation_id,
            messages = reply.messages.len(),
            "interaction replied"
        ),
        Err(reply_error) => {
            let failure = ApplicationError::Delivery(reply_error.to_string());
            error!(
                event_name = "slack.reply.failed",
                correlation_id = %correlation_id,
                user_id = user_id.unwrap_or("unknown"),
                error = %failure,
                "reply could not be delivered"
            );
        }
    }
}

fn failure_reply(dispatch_error: DispatchError, correlation_id: &str) -> Reply {
    let DispatchError::Handler(handler_error) = dispatch_error;
    let interface = match handler_error {
        EventHandlerError::Parse(parse_error) => {
            ApplicationError::InvalidInteraction(parse_error.to_string())
                .into_interface(correlation_id)
        }
        EventHandlerError::Route(route_error) => InterfaceError::Internal {
            message: route_error.to_string(),
            correlation_id: correlation_id.to_owned(),
        },
    };

    error!(
        event_name = "slack.dispatch.failed",
        correlation_id = %correlation_id,
        error = %interface,
        "event handling failed"
    );
    Reply::single(
        Visibility::Private,
        blocks::error_message(interface.user_message(), interface.correlation_id()),
    )
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
