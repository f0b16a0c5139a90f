use crate::host::AttachmentStore;
use crate::image::EmbeddedImage;
use crate::models::StoredReference;
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Region, types::ObjectCannedAcl, Client as S3Client};

#[derive(Debug, Clone)]
pub struct CdnConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: String,
    pub bucket: String,
    pub base_url: String,
}

impl CdnConfig {
    /// `None` unless both access keys are set.
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();

        let access_key_id = std::env::var("CDN_ACCESS_KEY_ID").ok()?;
        let secret_access_key = std::env::var("CDN_SECRET_ACCESS_KEY").ok()?;

        Some(Self {
            access_key_id,
            secret_access_key,
            endpoint: std::env::var("CDN_ENDPOINT")
                .unwrap_or_else(|_| "https://nyc3.digitaloceanspaces.com".to_string()),
            bucket: std::env::var("CDN_BUCKET").unwrap_or_else(|_| "aimage-creator".to_string()),
            base_url: std::env::var("CDN_BASE_URL")
                .unwrap_or_else(|_| "https://aimage-creator.nyc3.digitaloceanspaces.com".to_string()),
        })
    }
}

pub struct CdnClient {
    client: S3Client,
    bucket: String,
    base_url: String,
}

impl CdnClient {
    pub async fn new(config: CdnConfig) -> Result<Self> {
        let credentials = aws_sdk_s3::config::Credentials::new(
            config.access_key_id,
            config.secret_access_key,
            None,
            None,
            "aimage-creator-cdn",
        );

        // Spaces ignores the region but the SDK requires one
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new("us-east-1"))
            .endpoint_url(config.endpoint)
            .load()
            .await;

        Ok(Self {
            client: S3Client::new(&sdk_config),
            bucket: config.bucket,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

/// Object key for an attachment, grouped by document.
pub fn attachment_key(document_id: &str, file_name: &str) -> String {
    let folder: String = document_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("attachments/{}/{}", folder, file_name)
}

#[async_trait]
impl AttachmentStore for CdnClient {
    async fn store(&self, document_id: &str, image: &EmbeddedImage) -> Result<StoredReference> {
        let key = attachment_key(document_id, &image.file_name());
        let body = ByteStream::from(image.decode()?);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .content_type(image.mime())
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| Error::Attachment(format!("Failed to upload file: {}", e)))?;

        Ok(StoredReference(self.get_public_url(&key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_key_sanitizes_document_id() {
        assert_eq!(
            attachment_key("notes/trip plan.md", "20261016-abc.png"),
            "attachments/notes_trip_plan_md/20261016-abc.png"
        );
    }

    #[test]
    fn test_attachment_key_keeps_uuid_ids() {
        assert_eq!(
            attachment_key("4b3c-11ee", "x.webp"),
            "attachments/4b3c-11ee/x.webp"
        );
    }
}
