//! Read-only access to the remote document store.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    document::DocumentNode,
    entry::{DocumentId, EntryKind, FolderEntry, FolderId},
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("gateway request timed out after {0}s")]
    Timeout(u64),
    #[error("gateway authentication failed: {0}")]
    Auth(String),
    #[error("gateway transport failed: {0}")]
    Transport(String),
    #[error("gateway returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("gateway response could not be decoded: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Non-trashed children of `folder`, folders first, then by name.
    async fn list_children(&self, folder: &FolderId) -> Result<Vec<FolderEntry>, GatewayError>;

    /// Documents whose name contains `query`, ordered by name. First page only.
    async fn search_documents(&self, query: &str) -> Result<Vec<FolderEntry>, GatewayError>;

    async fn get_document(&self, document: &DocumentId) -> Result<DocumentNode, GatewayError>;

    fn pdf_export_url(&self, document: &DocumentId) -> String;
}

/// Fixed in-memory content, for wiring tests and local runs without credentials.
#[derive(Clone, Debug, Default)]
pub struct InMemoryGateway {
    folders: HashMap<FolderId, Vec<FolderEntry>>,
    documents: HashMap<DocumentId, DocumentNode>,
    failure: Option<GatewayError>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder(mut self, folder: impl Into<String>, entries: Vec<FolderEntry>) -> Self {
        self.folders.insert(FolderId::new(folder), entries);
        self
    }

    pub fn with_document(mut self, document: impl Into<String>, node: DocumentNode) -> Self {
        self.documents.insert(DocumentId::new(document), node);
        self
    }

    /// Makes every call fail with `error`.
    pub fn failing(mut self, error: GatewayError) -> Self {
        self.failure = Some(error);
        self
    }

    fn check(&self) -> Result<(), GatewayError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContentGateway for InMemoryGateway {
    async fn list_children(&self, folder: &FolderId) -> Result<Vec<FolderEntry>, GatewayError> {
        self.check()?;
        let mut entries = self.folders.get(folder).cloned().unwrap_or_default();
        entries.sort_by(|left, right| {
            right.is_folder().cmp(&left.is_folder()).then_with(|| left.name.cmp(&right.name))
        });
        Ok(entries)
    }

    async fn search_documents(&self, query: &str) -> Result<Vec<FolderEntry>, GatewayError> {
        self.check()?;
        let mut hits: Vec<FolderEntry> = self
            .folders
            .values()
            .flatten()
            .filter(|entry| entry.kind == EntryKind::Document && entry.name.contains(query))
            .cloned()
            .collect();
        hits.sort_by(|left, right| left.name.cmp(&right.name));
        hits.dedup_by(|left, right| left.id == right.id);
        Ok(hits)
    }

    async fn get_document(&self, document: &DocumentId) -> Result<DocumentNode, GatewayError> {
        self.check()?;
        self.documents.get(document).cloned().ok_or_else(|| GatewayError::Status {
            status: 404,
            message: format!("document `{document}` not found"),
        })
    }

    fn pdf_export_url(&self, document: &DocumentId) -> String {
        format!("memory://documents/{document}/export.pdf")
    }
}
