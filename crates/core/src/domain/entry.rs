use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FolderId(pub String);

impl FolderId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Folder,
    Document,
}

/// One child of a listed folder, or one search hit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub id: String,
    pub name: String,
    pub kind: EntryKind,
}

impl FolderEntry {
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), kind: EntryKind::Folder }
    }

    pub fn document(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), kind: EntryKind::Document }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    pub fn folder_id(&self) -> Option<FolderId> {
        self.is_folder().then(|| FolderId(self.id.clone()))
    }

    pub fn document_id(&self) -> Option<DocumentId> {
        (!self.is_folder()).then(|| DocumentId(self.id.clone()))
    }
}

/// Splits entries into (folders, documents), keeping the listing order within each group.
pub fn partition_entries(entries: &[FolderEntry]) -> (Vec<&FolderEntry>, Vec<&FolderEntry>) {
    entries.iter().partition(|entry| entry.is_folder())
}

#[cfg(test)]
mod tests {
    use super::{partition_entries, EntryKind, FolderEntry};

    #[test]
    fn constructors_tag_entry_kind() {
        let folder = FolderEntry::folder("f1", "Reports");
        let document = FolderEntry::document("d1", "Notes");

        assert_eq!(folder.kind, EntryKind::Folder);
        assert_eq!(folder.folder_id().map(|id| id.0), Some("f1".to_owned()));
        assert!(folder.document_id().is_none());
        assert_eq!(document.document_id().map(|id| id.0), Some("d1".to_owned()));
        assert!(document.folder_id().is_none());
    }

    #[test]
    fn partition_keeps_relative_order() {
        let entries = vec![
            FolderEntry::document("d1", "Alpha"),
            FolderEntry::folder("f1", "Beta"),
            FolderEntry::document("d2", "Gamma"),
            FolderEntry::folder("f2", "Delta"),
        ];

        let (folders, documents) = partition_entries(&entries);
        let folder_names: Vec<&str> = folders.iter().map(|entry| entry.name.as_str()).collect();
        let document_names: Vec<&str> =
            documents.iter().map(|entry| entry.name.as_str()).collect();

        assert_eq!(folder_names, vec!["Beta", "Delta"]);
        assert_eq!(document_names, vec!["Alpha", "Gamma"]);
    }
}
