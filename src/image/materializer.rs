use super::{EmbeddedImage, ImageSource};
use crate::host::AttachmentStore;
use crate::models::{ImageCandidate, StoredReference};
use crate::Result;

/// Retrieve the candidate's bytes, encode them, and store them with the host.
///
/// No step is retried; any failure is a hard failure for the invocation.
pub async fn materialize(
    source: &dyn ImageSource,
    store: &dyn AttachmentStore,
    document_id: &str,
    candidate: &ImageCandidate,
) -> Result<StoredReference> {
    tracing::info!("Fetching and uploading chosen image {}", candidate.locator());

    let fetched = source.fetch(candidate.locator()).await?;
    let image = EmbeddedImage::encode(&fetched.bytes, fetched.content_type.as_deref())?;
    tracing::debug!(
        "Encoded {} bytes as {} ({} chars)",
        fetched.bytes.len(),
        image.mime(),
        image.data_url().len()
    );

    let reference = store.store(document_id, &image).await?;
    tracing::info!("Stored image as {}", reference);
    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockAttachmentStore;
    use crate::image::MockImageSource;
    use crate::Error;

    #[tokio::test]
    async fn test_materialize_stores_encoded_image() {
        let source = MockImageSource::new();
        let store = MockAttachmentStore::new();
        let candidate = ImageCandidate::new("https://img.example.com/2.png");

        let reference = materialize(&source, &store, "note", &candidate)
            .await
            .unwrap();

        assert_eq!(reference.0, "https://mock-attachments.example.com/1.png");
        assert_eq!(source.get_fetched(), vec!["https://img.example.com/2.png"]);

        let stored = store.get_stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].0, "note");
        assert!(stored[0].1.data_url().starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_materialize_retrieval_failure_skips_store() {
        let source = MockImageSource::new().with_failure(true);
        let store = MockAttachmentStore::new();

        let err = materialize(&source, &store, "note", &ImageCandidate::new("https://x/1"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Retrieval(_)));
        assert_eq!(store.get_store_count(), 0);
    }

    #[tokio::test]
    async fn test_materialize_corrupt_body_skips_store() {
        let source = MockImageSource::new().with_image("https://x/1", b"not an image".to_vec());
        let store = MockAttachmentStore::new();

        let err = materialize(&source, &store, "note", &ImageCandidate::new("https://x/1"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Encoding(_)));
        assert_eq!(store.get_store_count(), 0);
    }

    #[tokio::test]
    async fn test_materialize_store_failure_propagates() {
        let source = MockImageSource::new();
        let store = MockAttachmentStore::new().with_failure(true);

        let err = materialize(&source, &store, "note", &ImageCandidate::new("https://x/1"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Attachment(_)));
    }
}
