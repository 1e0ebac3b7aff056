use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    commands::{
        normalize_docs_command, CommandParseError, CommandRouteError, CommandRouter,
        DocsCommandService, InteractionAction, SlashCommandPayload, Visibility,
    },
    reply::Reply,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlackEnvelope {
    pub envelope_id: String,
    pub event: SlackEvent,
}

impl SlackEnvelope {
    pub fn slash_command(payload: SlashCommandPayload) -> Self {
        Self { envelope_id: payload.request_id.clone(), event: SlackEvent::SlashCommand(payload) }
    }

    /// Decodes the JSON `payload` field Slack posts to the interactivity endpoint.
    ///
    /// Once the payload's `response_url` is known, decode failures carry it so the
    /// user can still be answered.
    pub fn from_interaction_json(
        raw: &str,
        request_id: &str,
    ) -> Result<Self, InteractionDecodeError> {
        let payload: InteractionPayload = serde_json::from_str(raw).map_err(|error| {
            InteractionDecodeError::unanswerable(CommandParseError::MalformedPayload(
                error.to_string(),
            ))
        })?;

        if payload.kind != "block_actions" {
            return Ok(Self {
                envelope_id: request_id.to_owned(),
                event: SlackEvent::Unsupported { event_type: payload.kind },
            });
        }

        let response_url = payload.response_url.ok_or_else(|| {
            InteractionDecodeError::unanswerable(CommandParseError::MalformedPayload(
                "block action without response_url".to_owned(),
            ))
        })?;
        let failed = |source: CommandParseError| InteractionDecodeError {
            response_url: Some(response_url.clone()),
            source,
        };

        let action = payload.actions.into_iter().next().ok_or_else(|| {
            failed(CommandParseError::MalformedPayload("block action without actions".to_owned()))
        })?;
        let parsed = InteractionAction::parse(&action.action_id).map_err(failed)?;

        Ok(Self {
            envelope_id: request_id.to_owned(),
            event: SlackEvent::BlockAction(BlockActionEvent {
                channel_id: payload.channel.map(|channel| channel.id),
                user_id: payload.user.id,
                action: parsed,
                visibility: Visibility::from_button_value(action.value.as_deref()),
                response_url,
                request_id: request_id.to_owned(),
            }),
        })
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{source}")]
pub struct InteractionDecodeError {
    pub response_url: Option<String>,
    #[source]
    pub source: CommandParseError,
}

impl InteractionDecodeError {
    fn unanswerable(source: CommandParseError) -> Self {
        Self { response_url: None, source }
    }
}

#[derive(Debug, Deserialize)]
struct InteractionPayload {
    #[serde(rename = "type")]
    kind: String,
    user: SlackUser,
    #[serde(default)]
    channel: Option<SlackChannel>,
    #[serde(default)]
    response_url: Option<String>,
    #[serde(default)]
    actions: Vec<SlackAction>,
}

#[derive(Debug, Deserialize)]
struct SlackUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SlackChannel {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SlackAction {
    action_id: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlackEvent {
    SlashCommand(SlashCommandPayload),
    BlockAction(BlockActionEvent),
    Unsupported { event_type: String },
}

impl SlackEvent {
    pub fn event_type(&self) -> SlackEventType {
        match self {
            Self::SlashCommand(_) => SlackEventType::SlashCommand,
            Self::BlockAction(_) => SlackEventType::BlockAction,
            Self::Unsupported { .. } => SlackEventType::Unsupported,
        }
    }

    pub fn response_url(&self) -> Option<&str> {
        match self {
            Self::SlashCommand(payload) => Some(&payload.response_url),
            Self::BlockAction(event) => Some(&event.response_url),
            Self::Unsupported { .. } => None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::SlashCommand(payload) => Some(&payload.user_id),
            Self::BlockAction(event) => Some(&event.user_id),
            Self::Unsupported { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlackEventType {
    SlashCommand,
    BlockAction,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockActionEvent {
    pub channel_id: Option<String>,
    pub user_id: String,
    pub action: InteractionAction,
    pub visibility: Visibility,
    pub response_url: String,
    pub request_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Responded(Reply),
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventHandlerError {
    #[error(transparent)]
    Parse(#[from] CommandParseError),
    #[error(transparent)]
    Route(#[from] CommandRouteError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Handler(#[from] EventHandlerError),
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> SlackEventType;
    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<SlackEventType, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.event_type(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, DispatchError> {
        let Some(handler) = self.handlers.get(&envelope.event.event_type()) else {
            return Ok(HandlerResult::Ignored);
        };

        handler.handle(envelope, ctx).await.map_err(DispatchError::from)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Dispatcher wired with the slash command and block action handlers of one service.
pub fn browser_dispatcher<S>(service: S) -> EventDispatcher
where
    S: DocsCommandService + BlockActionService + Clone + 'static,
{
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(SlashCommandHandler::new(service.clone()));
    dispatcher.register(BlockActionHandler::new(service));
    dispatcher
}

pub struct SlashCommandHandler<S> {
    router: CommandRouter<S>,
}

impl<S> SlashCommandHandler<S>
where
    S: DocsCommandService,
{
    pub fn new(service: S) -> Self {
        Self { router: CommandRouter::new(service) }
    }
}

#[async_trait]
impl<S> EventHandler for SlashCommandHandler<S>
where
    S: DocsCommandService + 'static,
{
    fn event_type(&self) -> SlackEventType {
        SlackEventType::SlashCommand
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        _ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::SlashCommand(payload) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        let normalized = normalize_docs_command(payload.clone())?;
        let reply = self.router.route(normalized).await?;
        Ok(HandlerResult::Responded(reply))
    }
}

#[async_trait]
pub trait BlockActionService: Send + Sync {
    async fn handle_block_action(
        &self,
        event: &BlockActionEvent,
        ctx: &EventContext,
    ) -> Result<Reply, EventHandlerError>;
}

pub struct BlockActionHandler<S> {
    service: S,
}

impl<S> BlockActionHandler<S>
where
    S: BlockActionService,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S> EventHandler for BlockActionHandler<S>
where
    S: BlockActionService + 'static,
{
    fn event_type(&self) -> SlackEventType {
        SlackEventType::BlockAction
    }

    async fn handle(
        &self,
        envelope: &SlackEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let SlackEvent::BlockAction(event) = &envelope.event else {
            return Ok(HandlerResult::Ignored);
        };

        let reply = self.service.handle_block_action(event, ctx).await?;
        Ok(HandlerResult::Responded(reply.replacing_original(event.action.replaces_original())))
    }
}
