//! Host environment collaborators
//!
//! The pipeline never touches documents, dialogs, settings, or storage
//! directly. It talks to these traits, which the embedding host implements.
//! File- and terminal-backed implementations drive the bundled CLI.

pub mod attachments;
pub mod file;
pub mod mock;
pub mod terminal;

pub use attachments::DirectoryAttachmentStore;
pub use file::FileDocument;
pub use mock::{MockAlerts, MockAttachmentStore, MockDocument, MockInteraction};
pub use terminal::{StderrAlerts, TerminalInteraction};

use crate::image::EmbeddedImage;
use crate::models::{Choice, StoredReference};
use crate::settings::SettingKey;
use crate::Result;
use async_trait::async_trait;

/// Persistent key-value settings owned by the host.
pub trait SettingsSource: Send + Sync {
    fn get(&self, key: SettingKey) -> Option<String>;
}

#[async_trait]
pub trait DocumentAccessor: Send + Sync {
    async fn current_document_id(&self) -> Result<String>;
    async fn read_text(&self, document_id: &str) -> Result<String>;
    async fn insert_at_cursor(&self, text: &str) -> Result<()>;
    async fn append_text(&self, document_id: &str, text: &str) -> Result<()>;
}

/// Blocking user dialogs. `Ok(None)` means the user dismissed the dialog.
#[async_trait]
pub trait Interaction: Send + Sync {
    async fn ask(&self, prompt: &str) -> Result<Option<String>>;
    async fn choose(&self, prompt: &str, choices: &[Choice]) -> Result<Option<String>>;
}

#[async_trait]
pub trait AttachmentStore: Send + Sync {
    async fn store(&self, document_id: &str, image: &EmbeddedImage) -> Result<StoredReference>;
}

#[async_trait]
pub trait Alerts: Send + Sync {
    async fn notify(&self, message: &str);
}
