//! Core of the document browser: navigation history, document rendering,
//! message chunking and the gateway seam. Platform-agnostic; the Slack
//! adapter and the Google Drive gateway live in sibling crates.

pub mod browser;
pub mod chunk;
pub mod config;
pub mod domain;
pub mod errors;
pub mod gateway;
pub mod navigation;
pub mod render;

pub use browser::{DocumentBrowser, Listing};
pub use chunk::split_message;
pub use domain::document::{DocumentNode, HeadingLevel, Paragraph, RenderedDocument, TextRun};
pub use domain::entry::{partition_entries, DocumentId, EntryKind, FolderEntry, FolderId};
pub use domain::user::UserId;
pub use errors::{ApplicationError, InterfaceError};
pub use gateway::{ContentGateway, GatewayError, InMemoryGateway};
pub use navigation::NavigationStore;
pub use render::{render_markup, EMPTY_DOCUMENT_PLACEHOLDER, UNREADABLE_DOCUMENT_PLACEHOLDER};
