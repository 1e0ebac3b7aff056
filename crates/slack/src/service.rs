//! The document browser behind the `/docs` command and its buttons.

use std::sync::Arc;

use async_trait::async_trait;
use docbrowse_core::config::BrowserConfig;
use docbrowse_core::{
    split_message, ApplicationError, DocumentBrowser, DocumentId, FolderId, Listing,
    NavigationStore, UserId,
};
use tracing::{info, warn};

use crate::blocks::{self, Block, MessageTemplate, TextObject};
use crate::commands::{CommandEnvelope, CommandRouteError, DocsCommandService, InteractionAction, Visibility};
use crate::events::{BlockActionEvent, BlockActionService, EventContext, EventHandlerError};
use crate::reply::{Reply, MAX_RESPONSE_URL_MESSAGES};

#[derive(Clone)]
pub struct BrowserService {
    browser: DocumentBrowser,
    navigation: Arc<NavigationStore>,
    settings: BrowserConfig,
}

impl BrowserService {
    pub fn new(
        browser: DocumentBrowser,
        navigation: Arc<NavigationStore>,
        settings: BrowserConfig,
    ) -> Self {
        Self { browser, navigation, settings }
    }

    pub fn navigation(&self) -> &NavigationStore {
        &self.navigation
    }

    async fn show_folder(&self, folder: &FolderId, visibility: Visibility) -> Reply {
        let at_root = folder == self.browser.root();
        let message = match self.browser.list_folder(folder).await {
            Listing::Entries(entries) if entries.is_empty() => {
                blocks::empty_folder_message(at_root, visibility)
            }
            Listing::Entries(entries) => {
                blocks::browse_message(&entries, at_root, self.settings.browse_limit, visibility)
            }
            Listing::Unavailable(_) => blocks::folder_error_message(at_root, visibility),
        };
        Reply::single(visibility, message)
    }

    async fn open_folder(&self, user: &UserId, folder: &FolderId, visibility: Visibility) -> Reply {
        self.navigation.enter(user, folder, self.browser.root());
        self.show_folder(folder, visibility).await
    }

    async fn go_back(&self, user: &UserId, visibility: Visibility) -> Reply {
        let previous = self.navigation.go_back(user, self.browser.root());
        self.show_folder(&previous, visibility).await
    }

    async fn show_document(&self, document: &DocumentId, visibility: Visibility) -> Reply {
        let rendered = self.browser.render_document(document).await;
        let chunks = split_message(&rendered.markup, self.settings.max_message_chars);
        let mut pages = blocks::document_pages(&chunks);
        let total = pages.len();
        if total > MAX_RESPONSE_URL_MESSAGES {
            pages.truncate(MAX_RESPONSE_URL_MESSAGES);
            info!(
                event_name = "slack.document.truncated",
                document_id = %document,
                total_parts = total,
                "document longer than the reply limit"
            );
        }

        let mut messages = blocks::document_messages(&rendered, &pages, visibility);
        if total > pages.len() {
            if let Some(last) = messages.last_mut() {
                append_truncation_note(last, pages.len(), total);
            }
        }
        Reply::with_followups(visibility, messages)
    }

    async fn show_preview(&self, document: &DocumentId, visibility: Visibility) -> Reply {
        let rendered = self.browser.render_document(document).await;
        Reply::single(
            visibility,
            blocks::preview_message(&rendered, self.settings.preview_chars, visibility),
        )
    }

    fn show_pdf_link(&self, document: &DocumentId, visibility: Visibility) -> Reply {
        Reply::single(visibility, blocks::pdf_link_message(&self.browser.pdf_export_url(document)))
    }
}

fn append_truncation_note(message: &mut MessageTemplate, shown: usize, total: usize) {
    message.blocks.push(Block::Context {
        block_id: "docs.document.truncated.v1".to_owned(),
        elements: vec![TextObject::plain(format!(
            "Showing the first {shown} of {total} parts. Use the PDF button for the full document."
        ))],
    });
}

#[async_trait]
impl DocsCommandService for BrowserService {
    async fn browse(&self, envelope: &CommandEnvelope) -> Result<Reply, CommandRouteError> {
        let user = UserId::new(envelope.user_id.clone());
        self.navigation.reset(&user);
        info!(
            event_name = "slack.command.browse",
            correlation_id = %envelope.request_id,
            user_id = %user,
            "opening document browser at root"
        );
        Ok(self.show_folder(self.browser.root(), envelope.visibility).await)
    }

    async fn search(
        &self,
        query: String,
        envelope: &CommandEnvelope,
    ) -> Result<Reply, CommandRouteError> {
        info!(
            event_name = "slack.command.search",
            correlation_id = %envelope.request_id,
            user_id = %envelope.user_id,
            query = %query,
            "searching documents"
        );
        let message = match self.browser.search_documents(&query).await {
            Ok(results) if results.is_empty() => blocks::no_search_results_message(&query),
            Ok(results) => blocks::search_results_message(
                &query,
                &results,
                self.settings.search_limit,
                envelope.visibility,
            ),
            Err(gateway_error) => {
                let failure = ApplicationError::from(gateway_error)
                    .into_interface(envelope.request_id.clone());
                warn!(
                    event_name = "slack.command.search_failed",
                    correlation_id = %failure.correlation_id(),
                    error = %failure,
                    "answering search with an error notice"
                );
                blocks::search_error_message(&failure)
            }
        };
        Ok(Reply::single(envelope.visibility, message))
    }
}

#[async_trait]
impl BlockActionService for BrowserService {
    async fn handle_block_action(
        &self,
        event: &BlockActionEvent,
        ctx: &EventContext,
    ) -> Result<Reply, EventHandlerError> {
        let user = UserId::new(event.user_id.clone());
        info!(
            event_name = "slack.action.received",
            correlation_id = %ctx.correlation_id,
            user_id = %user,
            action_id = %event.action.action_id(),
            "handling button click"
        );

        let reply = match &event.action {
            InteractionAction::Folder(folder) => self.open_folder(&user, folder, event.visibility).await,
            InteractionAction::Back => self.go_back(&user, event.visibility).await,
            InteractionAction::Document(document) => {
                self.show_document(document, event.visibility).await
            }
            InteractionAction::Preview(document) => {
                self.show_preview(document, event.visibility).await
            }
            InteractionAction::Pdf(document) => self.show_pdf_link(document, event.visibility),
        };
        Ok(reply)
    }
}
