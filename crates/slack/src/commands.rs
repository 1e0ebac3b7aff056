use async_trait::async_trait;
use docbrowse_core::{DocumentId, FolderId};
use serde::Deserialize;
use thiserror::Error;

use crate::blocks;
use crate::reply::Reply;

pub const DOCS_COMMAND: &str = "/docs";

/// Form fields Slack posts for a slash command invocation.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SlashCommandForm {
    pub command: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub channel_id: String,
    pub user_id: String,
    pub response_url: String,
    #[serde(default)]
    pub trigger_id: String,
}

impl SlashCommandForm {
    pub fn into_payload(self, request_id: impl Into<String>) -> SlashCommandPayload {
        SlashCommandPayload {
            command: self.command,
            text: self.text,
            channel_id: self.channel_id,
            user_id: self.user_id,
            response_url: self.response_url,
            trigger_id: self.trigger_id,
            request_id: request_id.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub command: String,
    pub text: String,
    pub channel_id: String,
    pub user_id: String,
    pub response_url: String,
    pub trigger_id: String,
    pub request_id: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Only the invoking user sees the reply.
    #[default]
    Private,
    /// The reply is posted to the whole channel.
    Shared,
}

impl Visibility {
    pub fn as_response_type(self) -> &'static str {
        match self {
            Self::Private => "ephemeral",
            Self::Shared => "in_channel",
        }
    }

    /// Reads the visibility stored in a button value. Anything unrecognised stays private.
    pub fn from_button_value(value: Option<&str>) -> Self {
        match value {
            Some("in_channel") => Self::Shared,
            _ => Self::Private,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandEnvelope {
    pub command: String,
    pub verb: String,
    pub args: String,
    pub visibility: Visibility,
    pub channel_id: String,
    pub user_id: String,
    pub response_url: String,
    pub request_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocsCommand {
    Browse,
    Search { query: String },
    Help,
    Unknown { verb: String },
}

/// A button click, decoded once from the Slack `action_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionAction {
    Folder(FolderId),
    Document(DocumentId),
    Back,
    Pdf(DocumentId),
    Preview(DocumentId),
}

impl InteractionAction {
    pub fn parse(action_id: &str) -> Result<Self, CommandParseError> {
        if action_id == "back" {
            return Ok(Self::Back);
        }

        let Some((kind, id)) = action_id.split_once(':') else {
            return Err(CommandParseError::UnknownAction(action_id.to_owned()));
        };
        let id = id.trim();
        if id.is_empty() {
            return Err(CommandParseError::MissingActionTarget(action_id.to_owned()));
        }

        match kind {
            "folder" => Ok(Self::Folder(FolderId::new(id))),
            "doc" => Ok(Self::Document(DocumentId::new(id))),
            "pdf" => Ok(Self::Pdf(DocumentId::new(id))),
            "preview" => Ok(Self::Preview(DocumentId::new(id))),
            _ => Err(CommandParseError::UnknownAction(action_id.to_owned())),
        }
    }

    pub fn action_id(&self) -> String {
        match self {
            Self::Folder(id) => format!("folder:{id}"),
            Self::Document(id) => format!("doc:{id}"),
            Self::Back => "back".to_owned(),
            Self::Pdf(id) => format!("pdf:{id}"),
            Self::Preview(id) => format!("preview:{id}"),
        }
    }

    /// Folder navigation redraws the browser in place; everything else posts a new message.
    pub fn replaces_original(&self) -> bool {
        matches!(self, Self::Folder(_) | Self::Back)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("unsupported slash command: {0}")]
    UnsupportedCommand(String),
    #[error("unknown interaction action `{0}`")]
    UnknownAction(String),
    #[error("interaction action `{0}` has no target id")]
    MissingActionTarget(String),
    #[error("malformed interaction payload: {0}")]
    MalformedPayload(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CommandRouteError {
    #[error("command service failed: {0}")]
    Service(String),
}

pub fn normalize_docs_command(
    payload: SlashCommandPayload,
) -> Result<CommandEnvelope, CommandParseError> {
    if payload.command != DOCS_COMMAND {
        return Err(CommandParseError::UnsupportedCommand(payload.command));
    }

    let (tokens, visibility) = extract_share_flag(&payload.text);
    let mut parts = tokens.into_iter();
    let verb = parts.next().unwrap_or("help").to_ascii_lowercase();
    let args = parts.collect::<Vec<_>>().join(" ");

    Ok(CommandEnvelope {
        command: "docs".to_owned(),
        verb,
        args,
        visibility,
        channel_id: payload.channel_id,
        user_id: payload.user_id,
        response_url: payload.response_url,
        request_id: payload.request_id,
    })
}

pub fn parse_docs_command(input: &str) -> DocsCommand {
    let (tokens, _) = extract_share_flag(input);
    let mut parts = tokens.into_iter();
    let Some(verb) = parts.next() else {
        return DocsCommand::Help;
    };
    let args = parts.collect::<Vec<_>>().join(" ");
    classify_docs_command(&verb.to_ascii_lowercase(), args)
}

fn classify_docs_command(verb: &str, args: String) -> DocsCommand {
    match verb {
        "browse" => DocsCommand::Browse,
        "search" => DocsCommand::Search { query: args },
        "help" => DocsCommand::Help,
        _ => DocsCommand::Unknown { verb: verb.to_owned() },
    }
}

/// Splits the command text into tokens, pulling out any `share` flag.
fn extract_share_flag(text: &str) -> (Vec<&str>, Visibility) {
    let mut visibility = Visibility::Private;
    let tokens = text
        .split_whitespace()
        .filter(|token| {
            if is_share_token(token) {
                visibility = Visibility::Shared;
                false
            } else {
                true
            }
        })
        .collect();
    (tokens, visibility)
}

fn is_share_token(token: &str) -> bool {
    matches!(
        token.to_ascii_lowercase().as_str(),
        "share" | "share:true" | "share=true" | "--share"
    )
}

pub struct CommandRouter<S> {
    service: S,
}

impl<S> CommandRouter<S>
where
    S: DocsCommandService,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub async fn route(&self, envelope: CommandEnvelope) -> Result<Reply, CommandRouteError> {
        match classify_docs_command(&envelope.verb, envelope.args.clone()) {
            DocsCommand::Browse => self.service.browse(&envelope).await,
            DocsCommand::Search { query } if query.trim().is_empty() => Ok(Reply::single(
                envelope.visibility,
                blocks::notice_message("Usage: `/docs search <query>`"),
            )),
            DocsCommand::Search { query } => self.service.search(query, &envelope).await,
            DocsCommand::Help => Ok(Reply::single(envelope.visibility, blocks::help_message())),
            DocsCommand::Unknown { verb } => Ok(Reply::single(
                Visibility::Private,
                blocks::error_message(
                    &format!("Unsupported command `/docs {verb}`. Try `/docs help`."),
                    &envelope.request_id,
                ),
            )),
        }
    }
}

#[async_trait]
pub trait DocsCommandService: Send + Sync {
    async fn browse(&self, envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError>;

    async fn search(
        &self,
        query: String,
        envelope: &CommandEnvelope,
    ) -> Result<Reply, CommandRouteError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use docbrowse_core::{DocumentId, FolderId};

    use super::{
        normalize_docs_command, parse_docs_command, CommandEnvelope, CommandParseError,
        CommandRouteError, CommandRouter, DocsCommand, DocsCommandService, InteractionAction,
        SlashCommandPayload, Visibility,
    };
    use crate::blocks;
    use crate::reply::Reply;

    fn payload(text: &str) -> SlashCommandPayload {
        SlashCommandPayload {
            command: "/docs".to_owned(),
            text: text.to_owned(),
            channel_id: "C1".to_owned(),
            user_id: "U1".to_owned(),
            response_url: "https://hooks.slack.test/commands/1".to_owned(),
            trigger_id: "T1".to_owned(),
            request_id: "req-1".to_owned(),
        }
    }

    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl DocsCommandService for RecordingService {
        async fn browse(&self, envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError> {
            self.calls.lock().expect("lock").push("browse".to_owned());
            Ok(Reply::single(envelope.visibility, blocks::help_message()))
        }

        async fn search(
            &self,
            query: String,
            envelope: &CommandEnvelope,
        ) -> Result<Reply, CommandRouteError> {
            self.calls.lock().expect("lock").push(format!("search:{query}"));
            Ok(Reply::single(envelope.visibility, blocks::help_message()))
        }
    }

    #[test]
    fn parses_known_verbs_and_defaults_to_help() {
        assert_eq!(parse_docs_command(""), DocsCommand::Help);
        assert_eq!(parse_docs_command("  "), DocsCommand::Help);
        assert_eq!(parse_docs_command("BROWSE"), DocsCommand::Browse);
        assert_eq!(
            parse_docs_command("search quarterly plan"),
            DocsCommand::Search { query: "quarterly plan".to_owned() }
        );
        assert_eq!(
            parse_docs_command("delete everything"),
            DocsCommand::Unknown { verb: "delete".to_owned() }
        );
    }

    #[test]
    fn share_flag_is_accepted_in_every_form_and_removed_from_args() {
        for flag in ["share", "share:true", "share=true", "--share", "SHARE"] {
            let envelope =
                normalize_docs_command(payload(&format!("search roadmap {flag}"))).expect("normalized");
            assert_eq!(envelope.visibility, Visibility::Shared, "flag {flag}");
            assert_eq!(envelope.args, "roadmap");
        }

        let private = normalize_docs_command(payload("browse")).expect("normalized");
        assert_eq!(private.visibility, Visibility::Private);
        assert_eq!(private.verb, "browse");
    }

    #[test]
    fn rejects_other_slash_commands() {
        let mut other = payload("browse");
        other.command = "/quote".to_owned();
        assert_eq!(
            normalize_docs_command(other),
            Err(CommandParseError::UnsupportedCommand("/quote".to_owned()))
        );
    }

    #[test]
    fn interaction_actions_parse_from_action_ids() {
        assert_eq!(
            InteractionAction::parse("folder:abc"),
            Ok(InteractionAction::Folder(FolderId::new("abc")))
        );
        assert_eq!(
            InteractionAction::parse("doc:d1"),
            Ok(InteractionAction::Document(DocumentId::new("d1")))
        );
        assert_eq!(InteractionAction::parse("back"), Ok(InteractionAction::Back));
        assert_eq!(InteractionAction::parse("pdf:d1"), Ok(InteractionAction::Pdf(DocumentId::new("d1"))));
        assert_eq!(
            InteractionAction::parse("preview:d1"),
            Ok(InteractionAction::Preview(DocumentId::new("d1")))
        );
        assert!(matches!(
            InteractionAction::parse("folder:"),
            Err(CommandParseError::MissingActionTarget(_))
        ));
        assert!(matches!(
            InteractionAction::parse("approve:q1"),
            Err(CommandParseError::UnknownAction(_))
        ));
        assert!(matches!(InteractionAction::parse("refresh"), Err(CommandParseError::UnknownAction(_))));
    }

    #[test]
    fn action_ids_survive_parsing() {
        for action in [
            InteractionAction::Folder(FolderId::new("f-1")),
            InteractionAction::Back,
            InteractionAction::Preview(DocumentId::new("d-9")),
        ] {
            assert_eq!(InteractionAction::parse(&action.action_id()), Ok(action));
        }
    }

    #[test]
    fn only_navigation_replaces_the_original_message() {
        assert!(InteractionAction::Back.replaces_original());
        assert!(InteractionAction::Folder(FolderId::new("f")).replaces_original());
        assert!(!InteractionAction::Document(DocumentId::new("d")).replaces_original());
        assert!(!InteractionAction::Pdf(DocumentId::new("d")).replaces_original());
    }

    #[test]
    fn button_value_carries_visibility() {
        assert_eq!(Visibility::from_button_value(Some("in_channel")), Visibility::Shared);
        assert_eq!(Visibility::from_button_value(Some("ephemeral")), Visibility::Private);
        assert_eq!(Visibility::from_button_value(None), Visibility::Private);
    }

    #[tokio::test]
    async fn router_calls_service_entrypoints() {
        let router = CommandRouter::new(RecordingService::default());
        for text in ["browse", "search plan share", "help", "search"] {
            let envelope = normalize_docs_command(payload(text)).expect("normalized");
            router.route(envelope).await.expect("route");
        }

        let calls = router.service.calls.lock().expect("lock");
        assert_eq!(&*calls, &["browse", "search:plan"]);
    }

    #[tokio::test]
    async fn unknown_verbs_get_private_guidance() {
        let router = CommandRouter::new(RecordingService::default());
        let envelope = normalize_docs_command(payload("rename x share")).expect("normalized");

        let reply = router.route(envelope).await.expect("route");
        assert_eq!(reply.visibility, Visibility::Private);
        assert!(reply.messages[0].fallback_text.contains("/docs rename"));
    }
}
