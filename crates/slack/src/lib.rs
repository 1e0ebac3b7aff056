//! Slack interface for the document browser.
//!
//! Slack posts slash commands and button clicks to the server over HTTP; this
//! crate turns them into browser operations and Block Kit replies:
//! - **Signing** (`signature`) - `v0` request signature verification
//! - **Slash Commands** (`commands`) - `/docs browse`, `/docs search <query>`, `/docs help`
//! - **Events** (`events`) - envelope decoding and handler dispatch
//! - **Block Kit** (`blocks`) - browse, search, document and preview messages
//! - **Replies** (`reply`) - `response_url` delivery and the one-reply-per-interaction lifecycle
//! - **Web API** (`web`) - `auth.test` login check at startup
//!
//! # Architecture
//!
//! ```text
//! Slack POST → SignatureVerifier → SlackEnvelope → EventDispatcher → BrowserService
//!                                                                      ↓
//!                              response_url ← ReplySink ← Block Kit Reply
//! ```

pub mod blocks;
pub mod commands;
pub mod events;
pub mod reply;
pub mod service;
pub mod signature;
pub mod web;

pub use commands::{InteractionAction, SlashCommandForm, Visibility};
pub use events::{
    browser_dispatcher, EventContext, EventDispatcher, HandlerResult, InteractionDecodeError,
    SlackEnvelope,
};
pub use reply::{Interaction, InteractionError, Reply, ReplySink, ResponseUrlSink};
pub use service::BrowserService;
pub use signature::{SignatureError, SignatureVerifier};
pub use web::{BotIdentity, SlackApiError, SlackWebClient};
