use super::AttachmentStore;
use crate::image::EmbeddedImage;
use crate::models::StoredReference;
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Writes attachments into a local directory.
///
/// References are `{prefix}/{file name}`, typically relative to the document.
pub struct DirectoryAttachmentStore {
    dir: PathBuf,
    prefix: String,
}

impl DirectoryAttachmentStore {
    pub fn new(dir: &Path, prefix: String) -> Self {
        Self {
            dir: dir.to_path_buf(),
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AttachmentStore for DirectoryAttachmentStore {
    async fn store(&self, _document_id: &str, image: &EmbeddedImage) -> Result<StoredReference> {
        let bytes = image.decode()?;
        let file_name = image.file_name();

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, &bytes).await?;
        tracing::info!("Wrote {} bytes to {}", bytes.len(), path.display());

        let reference = if self.prefix.is_empty() {
            file_name
        } else {
            format!("{}/{}", self.prefix, file_name)
        };
        Ok(StoredReference(reference))
    }
}
