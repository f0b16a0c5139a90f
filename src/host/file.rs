use super::DocumentAccessor;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A text file on disk acting as the current document.
///
/// The "cursor" is the first occurrence of the invocation marker; inserting
/// replaces it. Without a marker, inserted text goes to the end of the file.
pub struct FileDocument {
    path: PathBuf,
    marker: String,
}

impl FileDocument {
    pub fn new(path: &Path, marker: String) -> Self {
        Self {
            path: path.to_path_buf(),
            marker,
        }
    }

    fn id(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    fn check_id(&self, document_id: &str) -> Result<()> {
        if document_id == self.id() {
            Ok(())
        } else {
            Err(Error::Document(format!("Unknown document: {}", document_id)))
        }
    }
}

fn with_line(mut text: String, line: &str) -> String {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(line);
    text.push('\n');
    text
}

#[async_trait]
impl DocumentAccessor for FileDocument {
    async fn current_document_id(&self) -> Result<String> {
        Ok(self.id())
    }

    async fn read_text(&self, document_id: &str) -> Result<String> {
        self.check_id(document_id)?;
        Ok(fs::read_to_string(&self.path).await?)
    }

    async fn insert_at_cursor(&self, text: &str) -> Result<()> {
        let content = fs::read_to_string(&self.path).await?;
        let updated = if content.contains(&self.marker) {
            content.replacen(&self.marker, text, 1)
        } else {
            with_line(content, text)
        };
        fs::write(&self.path, updated).await?;
        Ok(())
    }

    async fn append_text(&self, document_id: &str, text: &str) -> Result<()> {
        self.check_id(document_id)?;
        let content = fs::read_to_string(&self.path).await?;
        fs::write(&self.path, with_line(content, text)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MARKER: &str = "{AImage Creator: from preceding}";

    #[tokio::test]
    async fn test_insert_replaces_first_marker() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("note.md");
        std::fs::write(&path, format!("a red fox {}\nlater {}\n", MARKER, MARKER)).unwrap();

        let document = FileDocument::new(&path, MARKER.to_string());
        document.insert_at_cursor("![image](x.png)").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("a red fox ![image](x.png)\nlater {}\n", MARKER));
    }

    #[tokio::test]
    async fn test_insert_without_marker_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("note.md");
        std::fs::write(&path, "no marker").unwrap();

        let document = FileDocument::new(&path, MARKER.to_string());
        document.insert_at_cursor("![image](x.png)").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "no marker\n![image](x.png)\n");
    }

    #[tokio::test]
    async fn test_append_and_read_by_id() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("note.md");
        std::fs::write(&path, "# Trip\n").unwrap();

        let document = FileDocument::new(&path, MARKER.to_string());
        let id = document.current_document_id().await.unwrap();
        document.append_text(&id, "![image](y.png)").await.unwrap();

        assert_eq!(
            document.read_text(&id).await.unwrap(),
            "# Trip\n![image](y.png)\n"
        );
        assert!(document.read_text("other.md").await.is_err());
    }
}
