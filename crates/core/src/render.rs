use crate::domain::document::{DocumentNode, Paragraph, TextRun};

pub const EMPTY_DOCUMENT_PLACEHOLDER: &str = "Document appears to be empty.";
pub const UNREADABLE_DOCUMENT_PLACEHOLDER: &str = "Error: Could not read document content.";

/// Renders a document to lightweight markdown.
///
/// Paragraph text already carries its trailing newline from the source, so
/// paragraphs are concatenated without a separator. The result is trimmed and
/// falls back to [`EMPTY_DOCUMENT_PLACEHOLDER`] when nothing is left.
pub fn render_markup(document: &DocumentNode) -> String {
    let markup: String = document.paragraphs.iter().map(render_paragraph).collect();
    let trimmed = markup.trim();

    if trimmed.is_empty() {
        EMPTY_DOCUMENT_PLACEHOLDER.to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn render_paragraph(paragraph: &Paragraph) -> String {
    let text: String = paragraph.runs.iter().map(render_run).collect();
    match paragraph.heading {
        Some(level) => format!("{}{text}", level.marker()),
        None => text,
    }
}

fn render_run(run: &TextRun) -> String {
    let mut content = run.content.clone();
    if content.is_empty() {
        return content;
    }
    if run.bold {
        content = format!("**{content}**");
    }
    if run.italic {
        content = format!("*{content}*");
    }
    content
}
