use serde::{Deserialize, Serialize};

use super::entry::DocumentId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Maps a named paragraph style (`HEADING_1`, `HEADING_2`, ...) to a level.
    ///
    /// Levels are checked in order 1, 2, 3 by substring, so the first match wins.
    pub fn from_named_style(style: &str) -> Option<Self> {
        if style.contains("HEADING_1") {
            Some(Self::H1)
        } else if style.contains("HEADING_2") {
            Some(Self::H2)
        } else if style.contains("HEADING_3") {
            Some(Self::H3)
        } else {
            None
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Self::H1 => "# ",
            Self::H2 => "## ",
            Self::H3 => "### ",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub content: String,
    pub bold: bool,
    pub italic: bool,
}

impl TextRun {
    pub fn plain(content: impl Into<String>) -> Self {
        Self { content: content.into(), bold: false, italic: false }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
    pub heading: Option<HeadingLevel>,
}

impl Paragraph {
    pub fn new(runs: Vec<TextRun>) -> Self {
        Self { runs, heading: None }
    }

    pub fn heading(mut self, level: HeadingLevel) -> Self {
        self.heading = Some(level);
        self
    }
}

/// Structured document content as fetched from the gateway. Never cached.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNode {
    pub title: String,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedDocument {
    pub document_id: DocumentId,
    pub title: String,
    pub markup: String,
}
