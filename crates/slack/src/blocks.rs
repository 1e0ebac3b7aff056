use docbrowse_core::config::{CODE_FENCE_OVERHEAD, SLACK_SECTION_TEXT_LIMIT};
use docbrowse_core::{partition_entries, FolderEntry, InterfaceError, RenderedDocument};
use serde::Serialize;

use crate::commands::{InteractionAction, Visibility};

/// Slack rejects button labels longer than this.
pub const BUTTON_LABEL_LIMIT: usize = 75;
pub const BUTTONS_PER_ROW: usize = 5;
const HEADER_TEXT_LIMIT: usize = 150;

pub const EMPTY_FOLDER_TEXT: &str = "This folder is empty or you don't have access to it.";
pub const FOLDER_ERROR_TEXT: &str = "Error: could not load folder.";
pub const SEARCH_ERROR_TEXT: &str = "Error: could not perform search.";
pub const DOCUMENT_ERROR_TEXT: &str = "Error: could not load document.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    #[serde(rename = "plain_text")]
    Plain { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Plain { text } | Self::Mrkdwn { text } => text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Danger,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "button")]
pub struct ButtonElement {
    pub action_id: String,
    pub text: TextObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ButtonElement {
    pub fn new(action_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            text: TextObject::plain(truncate_label(&label.into())),
            style: None,
            value: None,
        }
    }

    /// Button for an interaction; the value carries the reply visibility.
    pub fn for_action(
        action: &InteractionAction,
        label: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        Self::new(action.action_id(), label).value(visibility.as_response_type())
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        block_id: String,
        text: TextObject,
    },
    Section {
        block_id: String,
        text: TextObject,
        #[serde(skip_serializing_if = "Option::is_none")]
        accessory: Option<ButtonElement>,
    },
    Actions {
        block_id: String,
        elements: Vec<ButtonElement>,
    },
    Context {
        block_id: String,
        elements: Vec<TextObject>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub fallback_text: String,
    pub blocks: Vec<Block>,
}

impl MessageTemplate {
    /// Every button in the message, accessories included, in block order.
    pub fn buttons(&self) -> Vec<&ButtonElement> {
        self.blocks
            .iter()
            .flat_map(|block| match block {
                Block::Actions { elements, .. } => elements.iter().collect::<Vec<_>>(),
                Block::Section { accessory: Some(button), .. } => vec![button],
                _ => Vec::new(),
            })
            .collect()
    }
}

pub struct MessageBuilder {
    fallback_text: String,
    blocks: Vec<Block>,
}

impl MessageBuilder {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self { fallback_text: fallback_text.into(), blocks: Vec::new() }
    }

    pub fn header(mut self, block_id: impl Into<String>, text: impl Into<String>) -> Self {
        let text: String = text.into();
        self.blocks.push(Block::Header {
            block_id: block_id.into(),
            text: TextObject::plain(truncate_chars(&text, HEADER_TEXT_LIMIT)),
        });
        self
    }

    pub fn section<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut SectionBuilder),
    {
        let mut builder = SectionBuilder::default();
        build(&mut builder);
        let (text, accessory) = builder.build();
        self.blocks.push(Block::Section { block_id: block_id.into(), text, accessory });
        self
    }

    pub fn actions<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ActionsBuilder),
    {
        let mut builder = ActionsBuilder::default();
        build(&mut builder);
        let elements = builder.build();
        if !elements.is_empty() {
            self.blocks.push(Block::Actions { block_id: block_id.into(), elements });
        }
        self
    }

    /// Lays buttons out in rows of [`BUTTONS_PER_ROW`], one actions block per row.
    pub fn button_rows(mut self, block_prefix: &str, buttons: Vec<ButtonElement>) -> Self {
        for (index, row) in buttons.chunks(BUTTONS_PER_ROW).enumerate() {
            self.blocks.push(Block::Actions {
                block_id: format!("{block_prefix}.{}.v1", index + 1),
                elements: row.to_vec(),
            });
        }
        self
    }

    pub fn context<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ContextBuilder),
    {
        let mut builder = ContextBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Context { block_id: block_id.into(), elements: builder.build() });
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate { fallback_text: self.fallback_text, blocks: self.blocks }
    }
}

#[derive(Default)]
pub struct SectionBuilder {
    text: Option<TextObject>,
    accessory: Option<ButtonElement>,
}

impl SectionBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::mrkdwn(text));
        self
    }

    pub fn accessory(&mut self, button: ButtonElement) -> &mut Self {
        self.accessory = Some(button);
        self
    }

    fn build(self) -> (TextObject, Option<ButtonElement>) {
        (self.text.unwrap_or_else(|| TextObject::plain(" ")), self.accessory)
    }
}

#[derive(Default)]
pub struct ActionsBuilder {
    elements: Vec<ButtonElement>,
}

impl ActionsBuilder {
    pub fn button(&mut self, button: ButtonElement) -> &mut Self {
        self.elements.push(button);
        self
    }

    fn build(self) -> Vec<ButtonElement> {
        self.elements
    }
}

#[derive(Default)]
pub struct ContextBuilder {
    elements: Vec<TextObject>,
}

impl ContextBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::plain(text));
        self
    }

    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> Vec<TextObject> {
        self.elements
    }
}

pub fn browse_message(
    entries: &[FolderEntry],
    at_root: bool,
    limit: usize,
    visibility: Visibility,
) -> MessageTemplate {
    let (folders, documents) = partition_entries(entries);
    let shown: Vec<&FolderEntry> = entries.iter().take(limit).collect();
    let (shown_folders, shown_documents): (Vec<&FolderEntry>, Vec<&FolderEntry>) =
        shown.into_iter().partition(|entry| entry.is_folder());

    let folder_buttons = shown_folders
        .iter()
        .filter_map(|entry| {
            let action = InteractionAction::Folder(entry.folder_id()?);
            Some(
                ButtonElement::for_action(&action, format!("📁 {}", entry.name), visibility)
                    .style(ButtonStyle::Primary),
            )
        })
        .collect::<Vec<_>>();
    let document_buttons = shown_documents
        .iter()
        .filter_map(|entry| {
            let action = InteractionAction::Document(entry.document_id()?);
            Some(ButtonElement::for_action(&action, format!("📄 {}", entry.name), visibility))
        })
        .collect::<Vec<_>>();

    let mut builder = MessageBuilder::new("Document browser")
        .header("docs.browse.header.v1", "📁 Document Browser")
        .section("docs.browse.intro.v1", |section| {
            section.plain("Click a folder to browse or a document to view");
        });

    if !folder_buttons.is_empty() {
        builder = builder
            .section("docs.browse.folders.label.v1", |section| {
                section.mrkdwn("*Folders*");
            })
            .button_rows("docs.browse.folders", folder_buttons);
    }
    if !document_buttons.is_empty() {
        builder = builder
            .section("docs.browse.documents.label.v1", |section| {
                section.mrkdwn("*Documents*");
            })
            .button_rows("docs.browse.documents", document_buttons);
    }

    builder
        .actions("docs.browse.navigation.v1", |actions| {
            if !at_root {
                actions.button(back_button(visibility));
            }
        })
        .context("docs.browse.summary.v1", |context| {
            context.plain(listing_summary(folders.len(), documents.len(), entries.len(), limit));
        })
        .build()
}

pub fn empty_folder_message(at_root: bool, visibility: Visibility) -> MessageTemplate {
    notice_with_back(EMPTY_FOLDER_TEXT, "docs.browse.empty.v1", at_root, visibility)
}

pub fn folder_error_message(at_root: bool, visibility: Visibility) -> MessageTemplate {
    notice_with_back(FOLDER_ERROR_TEXT, "docs.browse.error.v1", at_root, visibility)
}

fn notice_with_back(
    text: &str,
    block_id: &str,
    at_root: bool,
    visibility: Visibility,
) -> MessageTemplate {
    MessageBuilder::new(text.to_owned())
        .section(block_id, |section| {
            section.plain(text);
        })
        .actions("docs.browse.navigation.v1", |actions| {
            if !at_root {
                actions.button(back_button(visibility));
            }
        })
        .build()
}

fn back_button(visibility: Visibility) -> ButtonElement {
    ButtonElement::for_action(&InteractionAction::Back, "← Back", visibility)
}

fn listing_summary(folders: usize, documents: usize, total: usize, limit: usize) -> String {
    let summary = format!("{folders} folders • {documents} documents");
    if total > limit {
        format!("{summary} • showing the first {limit}")
    } else {
        summary
    }
}

pub fn no_search_results_message(query: &str) -> MessageTemplate {
    notice_message(&format!("No documents found matching \"{query}\"."))
}

pub fn search_results_message(
    query: &str,
    results: &[FolderEntry],
    limit: usize,
    visibility: Visibility,
) -> MessageTemplate {
    let shown = results.iter().take(limit).collect::<Vec<_>>();
    let mut builder = MessageBuilder::new(format!("Search results for \"{query}\""))
        .header("docs.search.header.v1", format!("🔍 Search Results for \"{query}\""))
        .section("docs.search.count.v1", |section| {
            section.plain(format!("Found {} document(s)", results.len()));
        });

    let mut open_buttons = Vec::with_capacity(shown.len());
    for (index, entry) in shown.iter().enumerate() {
        let Some(document_id) = entry.document_id() else {
            continue;
        };
        let preview = InteractionAction::Preview(document_id.clone());
        builder = builder.section(format!("docs.search.result.{}.v1", index + 1), |section| {
            section
                .mrkdwn(format!("📄 {}", escape_mrkdwn(&entry.name)))
                .accessory(ButtonElement::for_action(&preview, "Preview", visibility));
        });
        open_buttons.push(ButtonElement::for_action(
            &InteractionAction::Document(document_id),
            entry.name.clone(),
            visibility,
        ));
    }

    builder = builder.button_rows("docs.search.open", open_buttons);
    if results.len() > limit {
        builder = builder.context("docs.search.truncated.v1", |context| {
            context.plain(format!("Showing the first {limit} results. Refine the query to narrow it down."));
        });
    }
    builder.build()
}

/// Escapes message chunks and splits any that would overflow a fenced section.
///
/// The chunker keeps an over-long line whole, and escaping can grow a chunk,
/// so a single chunk may become several pages.
pub fn document_pages(chunks: &[String]) -> Vec<String> {
    chunks.iter().flat_map(|chunk| section_pieces(chunk)).collect()
}

/// One message per page from [`document_pages`]; the last one carries the PDF export button.
pub fn document_messages(
    document: &RenderedDocument,
    pages: &[String],
    visibility: Visibility,
) -> Vec<MessageTemplate> {
    let title = display_title(document);
    let last = pages.len().saturating_sub(1);
    let pdf = InteractionAction::Pdf(document.document_id.clone());

    pages
        .iter()
        .enumerate()
        .map(|(index, page)| {
            let mut builder = MessageBuilder::new(if index == 0 {
                title.clone()
            } else {
                format!("{title} (part {})", index + 1)
            });
            if index == 0 {
                builder = builder.header("docs.document.header.v1", format!("📄 {title}"));
            }
            builder = builder.section("docs.document.content.v1", |section| {
                section.mrkdwn(code_block(page));
            });
            if index == last {
                builder = builder.actions("docs.document.actions.v1", |actions| {
                    actions.button(ButtonElement::for_action(&pdf, "PDF", visibility));
                });
            }
            builder.build()
        })
        .collect()
}

pub fn preview_message(
    document: &RenderedDocument,
    preview_chars: usize,
    visibility: Visibility,
) -> MessageTemplate {
    let title = display_title(document);
    let mut excerpt = truncate_chars(&document.markup, preview_chars);
    if document.markup.chars().count() > preview_chars {
        excerpt.push('…');
    }

    let mut builder = MessageBuilder::new(format!("Preview of {title}"))
        .header("docs.preview.header.v1", format!("📄 {title}"));
    for (index, piece) in section_pieces(&excerpt).into_iter().enumerate() {
        let block_id = match index {
            0 => "docs.preview.excerpt.v1".to_owned(),
            n => format!("docs.preview.excerpt.v1.{n}"),
        };
        builder = builder.section(block_id, |section| {
            section.mrkdwn(code_block(&piece));
        });
    }
    builder
        .actions("docs.preview.actions.v1", |actions| {
            actions
                .button(
                    ButtonElement::for_action(
                        &InteractionAction::Document(document.document_id.clone()),
                        "Open full document",
                        visibility,
                    )
                    .style(ButtonStyle::Primary),
                )
                .button(ButtonElement::for_action(
                    &InteractionAction::Pdf(document.document_id.clone()),
                    "PDF",
                    visibility,
                ));
        })
        .build()
}

pub fn pdf_link_message(export_url: &str) -> MessageTemplate {
    MessageBuilder::new(format!("PDF export: {export_url}"))
        .section("docs.pdf.link.v1", |section| {
            section.mrkdwn(format!("📎 <{export_url}|Download as PDF>"));
        })
        .context("docs.pdf.context.v1", |context| {
            context.plain("The link opens with your own Google account permissions.");
        })
        .build()
}

pub fn notice_message(text: &str) -> MessageTemplate {
    MessageBuilder::new(text.to_owned())
        .section("docs.notice.v1", |section| {
            section.plain(text);
        })
        .build()
}

/// The search failure notice, with the classified cause underneath.
pub fn search_error_message(failure: &InterfaceError) -> MessageTemplate {
    MessageBuilder::new(SEARCH_ERROR_TEXT)
        .section("docs.notice.v1", |section| {
            section.plain(SEARCH_ERROR_TEXT);
        })
        .context("docs.search.error.context.v1", |context| {
            context.plain(format!(
                "{} Correlation ID: {}",
                failure.user_message(),
                failure.correlation_id()
            ));
        })
        .build()
}

pub fn error_message(summary: &str, correlation_id: &str) -> MessageTemplate {
    MessageBuilder::new(summary.to_owned())
        .section("docs.error.summary.v1", |section| {
            section.mrkdwn(format!(":warning: {summary}"));
        })
        .context("docs.error.context.v1", |context| {
            context.plain(format!("Correlation ID: {correlation_id}"));
        })
        .build()
}

pub fn help_message() -> MessageTemplate {
    MessageBuilder::new("Docs command help")
        .section("docs.help.summary.v1", |section| {
            section.mrkdwn(
                "*Available commands*\n• `/docs browse` open the folder browser\n• `/docs search <query>` find documents by name\n• `/docs help` show this message\n\nAdd `share` to post the reply to the whole channel.",
            );
        })
        .build()
}

fn display_title(document: &RenderedDocument) -> String {
    if document.title.trim().is_empty() {
        "Document Content".to_owned()
    } else {
        document.title.clone()
    }
}

fn code_block(content: &str) -> String {
    format!("```\n{content}\n```")
}

fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Escaped pieces of `text`, each fitting a fenced section. Entities are never split.
fn section_pieces(text: &str) -> Vec<String> {
    let max_len = SLACK_SECTION_TEXT_LIMIT - CODE_FENCE_OVERHEAD;
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for ch in text.chars() {
        let mut buffer = [0u8; 4];
        let escaped: &str = match ch {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            other => &*other.encode_utf8(&mut buffer),
        };
        let escaped_len = escaped.chars().count();
        if current_len + escaped_len > max_len {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(escaped);
        current_len += escaped_len;
    }

    pieces.push(current);
    pieces
}

pub fn truncate_label(label: &str) -> String {
    if label.chars().count() > BUTTON_LABEL_LIMIT {
        format!("{}...", truncate_chars(label, BUTTON_LABEL_LIMIT - 3))
    } else {
        label.to_owned()
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use docbrowse_core::{DocumentId, FolderEntry, RenderedDocument};
    use serde_json::json;

    use super::{
        browse_message, document_messages, document_pages, error_message, no_search_results_message,
        preview_message, search_results_message, truncate_label, Block, ButtonElement,
        MessageBuilder, TextObject,
    };
    use crate::commands::Visibility;

    fn entries() -> Vec<FolderEntry> {
        vec![
            FolderEntry::folder("f1", "Reports"),
            FolderEntry::folder("f2", "Specs"),
            FolderEntry::document("d1", "Notes"),
        ]
    }

    fn rendered(markup: &str) -> RenderedDocument {
        RenderedDocument {
            document_id: DocumentId::new("d1"),
            title: "Notes".to_owned(),
            markup: markup.to_owned(),
        }
    }

    fn action_ids(message: &super::MessageTemplate) -> Vec<String> {
        message.buttons().into_iter().map(|button| button.action_id.clone()).collect()
    }

    #[test]
    fn message_builder_serializes_block_kit_shapes() {
        let message = MessageBuilder::new("fallback")
            .section("docs.summary.v1", |section| {
                section.mrkdwn("*Summary*").accessory(ButtonElement::new("preview:d1", "Preview"));
            })
            .actions("docs.summary.actions.v1", |actions| {
                actions.button(ButtonElement::new("doc:d1", "Open").value("ephemeral"));
            })
            .build();

        let value = serde_json::to_value(&message.blocks).expect("serialize blocks");
        assert_eq!(
            value,
            json!([
                {
                    "type": "section",
                    "block_id": "docs.summary.v1",
                    "text": {"type": "mrkdwn", "text": "*Summary*"},
                    "accessory": {
                        "type": "button",
                        "action_id": "preview:d1",
                        "text": {"type": "plain_text", "text": "Preview"}
                    }
                },
                {
                    "type": "actions",
                    "block_id": "docs.summary.actions.v1",
                    "elements": [{
                        "type": "button",
                        "action_id": "doc:d1",
                        "text": {"type": "plain_text", "text": "Open"},
                        "value": "ephemeral"
                    }]
                }
            ])
        );
    }

    #[test]
    fn empty_actions_block_is_omitted() {
        let message = MessageBuilder::new("fallback").actions("docs.none.v1", |_| {}).build();
        assert!(message.blocks.is_empty());
    }

    #[test]
    fn long_labels_are_truncated_with_ellipsis() {
        let long = "x".repeat(90);
        let label = truncate_label(&long);
        assert_eq!(label.chars().count(), 75);
        assert!(label.ends_with("..."));
        assert_eq!(truncate_label("short"), "short");
    }

    #[test]
    fn browse_message_lists_folders_then_documents_with_summary() {
        let message = browse_message(&entries(), true, 20, Visibility::Private);

        assert_eq!(action_ids(&message), vec!["folder:f1", "folder:f2", "doc:d1"]);
        let summary = message.blocks.iter().find_map(|block| match block {
            Block::Context { block_id, elements } if block_id == "docs.browse.summary.v1" => {
                elements.first().map(|text| text.text().to_owned())
            }
            _ => None,
        });
        assert_eq!(summary.as_deref(), Some("2 folders • 1 documents"));
    }

    #[test]
    fn browse_message_adds_back_button_below_root_only() {
        let at_root = browse_message(&entries(), true, 20, Visibility::Private);
        assert!(!action_ids(&at_root).contains(&"back".to_owned()));

        let nested = browse_message(&entries(), false, 20, Visibility::Private);
        assert!(action_ids(&nested).contains(&"back".to_owned()));
    }

    #[test]
    fn browse_message_rows_hold_five_buttons_and_respect_limit() {
        let many = (0..30)
            .map(|index| FolderEntry::folder(format!("f{index}"), format!("Folder {index:02}")))
            .collect::<Vec<_>>();
        let message = browse_message(&many, true, 20, Visibility::Shared);

        let rows = message
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Actions { block_id, elements } if block_id.starts_with("docs.browse.folders.") => {
                    Some(elements.len())
                }
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(rows, vec![5, 5, 5, 5]);
        assert!(message
            .buttons()
            .iter()
            .all(|button| button.value.as_deref() == Some("in_channel")));
    }

    #[test]
    fn search_results_pair_each_document_with_preview() {
        let results = vec![FolderEntry::document("d1", "Plan"), FolderEntry::document("d2", "Plan B")];
        let message = search_results_message("Plan", &results, 15, Visibility::Private);

        let count = message.blocks.iter().find_map(|block| match block {
            Block::Section { block_id, text, .. } if block_id == "docs.search.count.v1" => {
                Some(text.text().to_owned())
            }
            _ => None,
        });
        assert_eq!(count.as_deref(), Some("Found 2 document(s)"));
        assert_eq!(action_ids(&message), vec!["preview:d1", "preview:d2", "doc:d1", "doc:d2"]);
    }

    #[test]
    fn empty_search_reads_exactly() {
        let message = no_search_results_message("zzz");
        assert_eq!(message.fallback_text, "No documents found matching \"zzz\".");
    }

    #[test]
    fn document_messages_put_pdf_button_on_last_chunk_only() {
        let chunks = vec!["part one".to_owned(), "part two".to_owned()];
        let messages = document_messages(&rendered("part one\npart two"), &chunks, Visibility::Private);

        assert_eq!(messages.len(), 2);
        assert!(matches!(&messages[0].blocks[0], Block::Header { text, .. } if text.text() == "📄 Notes"));
        assert!(messages[0].buttons().is_empty());
        assert_eq!(action_ids(&messages[1]), vec!["pdf:d1"]);
        assert!(matches!(
            &messages[1].blocks[0],
            Block::Section { text: TextObject::Mrkdwn { text }, .. } if text == "```\npart two\n```"
        ));
    }

    #[test]
    fn preview_is_cut_to_configured_length() {
        let message = preview_message(&rendered("abcdefghij"), 4, Visibility::Private);
        let excerpt = message.blocks.iter().find_map(|block| match block {
            Block::Section { text, .. } => Some(text.text().to_owned()),
            _ => None,
        });
        assert_eq!(excerpt.as_deref(), Some("```\nabcd…\n```"));
        assert_eq!(action_ids(&message), vec!["doc:d1", "pdf:d1"]);
    }

    #[test]
    fn document_text_cannot_trigger_mentions_or_links() {
        let chunks = vec!["Heads up <!channel> & see <https://evil.test|Click>".to_owned()];
        let pages = document_pages(&chunks);
        let messages = document_messages(&rendered(&chunks[0]), &pages, Visibility::Shared);

        let body = messages[0]
            .blocks
            .iter()
            .find_map(|block| match block {
                Block::Section { text, .. } => Some(text.text().to_owned()),
                _ => None,
            })
            .expect("content section");
        assert_eq!(
            body,
            "```\nHeads up &lt;!channel&gt; &amp; see &lt;https://evil.test|Click&gt;\n```"
        );

        let preview = preview_message(&rendered("<!here> now"), 100, Visibility::Shared);
        assert!(preview.blocks.iter().any(|block| matches!(
            block,
            Block::Section { text, .. } if text.text() == "```\n&lt;!here&gt; now\n```"
        )));
    }

    #[test]
    fn oversized_chunk_is_split_into_pages_that_fit_a_section() {
        let long_line = "<b> ".repeat(1_000);
        let pages = document_pages(&[long_line.clone(), "tail".to_owned()]);

        assert!(pages.len() > 2);
        assert!(pages.iter().all(|page| page.chars().count() + 8 <= 3_000));
        assert!(pages.iter().all(|page| !page.ends_with('&') && !page.starts_with("lt;")));
        assert_eq!(pages.last().map(String::as_str), Some("tail"));
        assert_eq!(pages[..pages.len() - 1].concat(), super::escape_mrkdwn(&long_line));
    }

    #[test]
    fn error_template_contains_correlation_id() {
        let message = error_message("Cannot process request", "req-123");
        assert!(matches!(
            &message.blocks[1],
            Block::Context { elements, .. }
                if matches!(elements.first(), Some(TextObject::Plain { text }) if text.contains("req-123"))
        ));
    }
}
