use std::sync::Arc;

use tracing::{error, warn};

use crate::domain::{
    document::RenderedDocument,
    entry::{DocumentId, FolderEntry, FolderId},
};
use crate::gateway::{ContentGateway, GatewayError};
use crate::render::{render_markup, UNREADABLE_DOCUMENT_PLACEHOLDER};

/// Outcome of listing a folder. `Unavailable` keeps gateway failures apart from empty folders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Listing {
    Entries(Vec<FolderEntry>),
    Unavailable(GatewayError),
}

impl Listing {
    /// Lossy view: a failed listing reads as an empty folder.
    pub fn into_entries(self) -> Vec<FolderEntry> {
        match self {
            Self::Entries(entries) => entries,
            Self::Unavailable(_) => Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct DocumentBrowser {
    gateway: Arc<dyn ContentGateway>,
    root: FolderId,
}

impl DocumentBrowser {
    pub fn new(gateway: Arc<dyn ContentGateway>, root: FolderId) -> Self {
        Self { gateway, root }
    }

    pub fn root(&self) -> &FolderId {
        &self.root
    }

    pub async fn list_folder(&self, folder: &FolderId) -> Listing {
        match self.gateway.list_children(folder).await {
            Ok(entries) => Listing::Entries(entries),
            Err(gateway_error) => {
                error!(
                    event_name = "gateway.folder.list_failed",
                    folder_id = %folder,
                    error = %gateway_error,
                    "error fetching folder contents"
                );
                Listing::Unavailable(gateway_error)
            }
        }
    }

    pub async fn search_documents(&self, query: &str) -> Result<Vec<FolderEntry>, GatewayError> {
        let result = self.gateway.search_documents(query).await;
        if let Err(gateway_error) = &result {
            warn!(
                event_name = "gateway.search.failed",
                query,
                error = %gateway_error,
                "document search failed"
            );
        }
        result
    }

    /// Fetches and renders a document. A failed fetch renders as a placeholder instead of an error.
    pub async fn render_document(&self, document: &DocumentId) -> RenderedDocument {
        match self.gateway.get_document(document).await {
            Ok(node) => RenderedDocument {
                document_id: document.clone(),
                markup: render_markup(&node),
                title: node.title,
            },
            Err(gateway_error) => {
                error!(
                    event_name = "gateway.document.fetch_failed",
                    document_id = %document,
                    error = %gateway_error,
                    "error converting document"
                );
                RenderedDocument {
                    document_id: document.clone(),
                    title: String::new(),
                    markup: UNREADABLE_DOCUMENT_PLACEHOLDER.to_owned(),
                }
            }
        }
    }

    pub fn pdf_export_url(&self, document: &DocumentId) -> String {
        self.gateway.pdf_export_url(document)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{DocumentBrowser, Listing};
    use crate::domain::document::{DocumentNode, HeadingLevel, Paragraph, TextRun};
    use crate::domain::entry::{DocumentId, FolderEntry, FolderId};
    use crate::gateway::{GatewayError, InMemoryGateway};
    use crate::render::UNREADABLE_DOCUMENT_PLACEHOLDER;

    fn browser(gateway: InMemoryGateway) -> DocumentBrowser {
        DocumentBrowser::new(Arc::new(gateway), FolderId::new("root"))
    }

    #[tokio::test]
    async fn list_folder_returns_gateway_entries() {
        let browser = browser(InMemoryGateway::new().with_folder(
            "root",
            vec![FolderEntry::folder("f1", "Reports"), FolderEntry::document("d1", "Notes")],
        ));

        let listing = browser.list_folder(&FolderId::new("root")).await;
        assert_eq!(
            listing,
            Listing::Entries(vec![
                FolderEntry::folder("f1", "Reports"),
                FolderEntry::document("d1", "Notes"),
            ])
        );
    }

    #[tokio::test]
    async fn list_folder_failure_is_distinct_but_reads_as_empty() {
        let browser = browser(
            InMemoryGateway::new().failing(GatewayError::Transport("connection reset".to_owned())),
        );

        let listing = browser.list_folder(&FolderId::new("root")).await;
        assert!(matches!(listing, Listing::Unavailable(GatewayError::Transport(_))));
        assert!(listing.into_entries().is_empty());
    }

    #[tokio::test]
    async fn render_document_renders_fetched_content() {
        let browser = browser(InMemoryGateway::new().with_document(
            "d1",
            DocumentNode {
                title: "Runbook".to_owned(),
                paragraphs: vec![
                    Paragraph::new(vec![TextRun::plain("Steps\n")]).heading(HeadingLevel::H1),
                    Paragraph::new(vec![TextRun::plain("Restart").bold(), TextRun::plain("\n")]),
                ],
            },
        ));

        let rendered = browser.render_document(&DocumentId::new("d1")).await;
        assert_eq!(rendered.title, "Runbook");
        assert_eq!(rendered.markup, "# Steps\n**Restart**");
    }

    #[tokio::test]
    async fn render_document_recovers_with_placeholder_on_failure() {
        let browser = browser(InMemoryGateway::new());

        let rendered = browser.render_document(&DocumentId::new("missing")).await;
        assert_eq!(rendered.markup, UNREADABLE_DOCUMENT_PLACEHOLDER);
        assert!(rendered.title.is_empty());
    }

    #[tokio::test]
    async fn search_surfaces_gateway_errors() {
        let browser = browser(InMemoryGateway::new().failing(GatewayError::Timeout(20)));
        assert_eq!(browser.search_documents("plan").await, Err(GatewayError::Timeout(20)));
    }
}
