//! Google Drive v3 / Docs v1 response shapes and their mapping into domain types.

use docbrowse_core::{DocumentNode, FolderEntry, HeadingLevel, Paragraph, TextRun};
use serde::Deserialize;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
pub const DOCUMENT_MIME_TYPE: &str = "application/vnd.google-apps.document";

#[derive(Debug, Default, Deserialize)]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
}

impl DriveFile {
    /// Only folders and Google Docs are browsable; everything else is dropped.
    pub fn into_entry(self) -> Option<FolderEntry> {
        match self.mime_type.as_str() {
            FOLDER_MIME_TYPE => Some(FolderEntry::folder(self.id, self.name)),
            DOCUMENT_MIME_TYPE => Some(FolderEntry::document(self.id, self.name)),
            _ => None,
        }
    }
}

impl FileList {
    pub fn into_entries(self) -> Vec<FolderEntry> {
        self.files.into_iter().filter_map(DriveFile::into_entry).collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<Body>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub content: Vec<StructuralElement>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StructuralElement {
    #[serde(default)]
    pub paragraph: Option<WireParagraph>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireParagraph {
    #[serde(default)]
    pub elements: Vec<ParagraphElement>,
    #[serde(default)]
    pub paragraph_style: Option<ParagraphStyle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    #[serde(default)]
    pub named_style_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphElement {
    #[serde(default)]
    pub text_run: Option<WireTextRun>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTextRun {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub text_style: Option<TextStyle>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextStyle {
    #[serde(default)]
    pub bold: Option<bool>,
    #[serde(default)]
    pub italic: Option<bool>,
}

impl Document {
    /// Keeps paragraphs only; tables, section breaks and other structural elements are skipped.
    pub fn into_node(self) -> DocumentNode {
        let paragraphs = self
            .body
            .map(|body| body.content)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|element| element.paragraph)
            .map(WireParagraph::into_paragraph)
            .collect();

        DocumentNode { title: self.title, paragraphs }
    }
}

impl WireParagraph {
    fn into_paragraph(self) -> Paragraph {
        let heading = self
            .paragraph_style
            .and_then(|style| style.named_style_type)
            .and_then(|style| HeadingLevel::from_named_style(&style));

        let runs = self
            .elements
            .into_iter()
            .filter_map(|element| element.text_run)
            .filter_map(|run| {
                let content = run.content.filter(|content| !content.is_empty())?;
                let style = run.text_style.unwrap_or_default();
                Some(TextRun {
                    content,
                    bold: style.bold.unwrap_or(false),
                    italic: style.italic.unwrap_or(false),
                })
            })
            .collect();

        Paragraph { runs, heading }
    }
}
