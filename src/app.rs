//! Pipeline orchestration for turning a prompt into an embedded image.

use crate::ai::ImageGenerationService;
use crate::host::{Alerts, AttachmentStore, DocumentAccessor, Interaction, SettingsSource};
use crate::image::{materialize, ImageSource};
use crate::models::{ImageCandidate, InvocationMode, Prompt, SelectionOutcome, DEFAULT_MARKER};
use crate::settings::GenerationParameters;
use crate::{prompts, selection, Error};
use std::fmt;
use std::num::NonZeroUsize;
use tracing::{error, info, warn};

/// Pipeline stage, reported alongside failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolvingConfig,
    DerivingPrompt,
    Requesting,
    Selecting,
    Materializing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ResolvingConfig => "resolving config",
            Stage::DerivingPrompt => "deriving prompt",
            Stage::Requesting => "requesting",
            Stage::Selecting => "selecting",
            Stage::Materializing => "materializing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// How one invocation ended.
#[derive(Debug)]
pub enum Outcome {
    /// Markup was inserted into the document.
    Inserted(String),
    /// The service offered no images.
    Empty,
    /// The instruction dialog was dismissed.
    Cancelled,
    /// The selection dialog was dismissed or ran out of options.
    NoneChosen,
    Failed { stage: Stage, error: Error },
}

impl Outcome {
    pub fn markup(&self) -> Option<&str> {
        match self {
            Outcome::Inserted(markup) => Some(markup.as_str()),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    fn failed(stage: Stage, error: Error) -> Self {
        Outcome::Failed { stage, error }
    }
}

/// Coordinates prompt derivation, generation, selection, and attachment.
pub struct App {
    settings: Box<dyn SettingsSource>,
    generator: Box<dyn ImageGenerationService>,
    images: Box<dyn ImageSource>,
    documents: Box<dyn DocumentAccessor>,
    interaction: Box<dyn Interaction>,
    attachments: Box<dyn AttachmentStore>,
    alerts: Box<dyn Alerts>,
    marker: String,
    max_rounds: Option<NonZeroUsize>,
}

/// Injectable service bundle used to construct [`App`].
pub struct AppServices {
    pub settings: Box<dyn SettingsSource>,
    pub generator: Box<dyn ImageGenerationService>,
    pub images: Box<dyn ImageSource>,
    pub documents: Box<dyn DocumentAccessor>,
    pub interaction: Box<dyn Interaction>,
    pub attachments: Box<dyn AttachmentStore>,
    pub alerts: Box<dyn Alerts>,
}

impl App {
    pub fn with_services(services: AppServices) -> Self {
        Self {
            settings: services.settings,
            generator: services.generator,
            images: services.images,
            documents: services.documents,
            interaction: services.interaction,
            attachments: services.attachments,
            alerts: services.alerts,
            marker: DEFAULT_MARKER.to_string(),
            max_rounds: None,
        }
    }

    pub fn with_marker(mut self, marker: String) -> Self {
        self.marker = marker;
        self
    }

    /// Cap selection rounds. Unlimited by default.
    pub fn with_max_rounds(mut self, max_rounds: Option<NonZeroUsize>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Prompt from the line before the marker; result replaces the marker.
    pub async fn image_from_preceding(&self) -> Outcome {
        self.invoke(InvocationMode::PrecedingText).await
    }

    /// Prompt typed into a dialog; result goes at the cursor.
    pub async fn image_via_prompt(&self) -> Outcome {
        self.invoke(InvocationMode::Direct).await
    }

    /// Prompt from a whole document; result is appended to it.
    pub async fn summary_image(&self, document_id: &str) -> Outcome {
        self.invoke(InvocationMode::WholeDocument {
            document_id: document_id.to_string(),
        })
        .await
    }

    /// Run one invocation end to end. Failures are alerted exactly once.
    pub async fn invoke(&self, mode: InvocationMode) -> Outcome {
        info!("Invoked \"{}\"", mode.name());
        let outcome = self.run_pipeline(&mode).await;

        match &outcome {
            Outcome::Inserted(markup) => info!("Inserted {}", markup),
            Outcome::Empty => info!("No images were offered, nothing to insert"),
            Outcome::Cancelled => info!("Prompt dialog dismissed"),
            Outcome::NoneChosen => info!("No image chosen"),
            Outcome::Failed { stage, error } => {
                error!("Failed while {}: {}", stage, error);
                self.alerts.notify(&error.user_message()).await;
            }
        }
        outcome
    }

    async fn run_pipeline(&self, mode: &InvocationMode) -> Outcome {
        let params = GenerationParameters::resolve(self.settings.as_ref());
        if params.credential().is_none() {
            return Outcome::failed(Stage::ResolvingConfig, Error::MissingCredential);
        }

        let document_id = match self.target_document(mode).await {
            Ok(id) => id,
            Err(e) => return Outcome::failed(Stage::DerivingPrompt, e),
        };
        let prompt = match prompts::derive(
            mode,
            &document_id,
            &self.marker,
            self.documents.as_ref(),
            self.interaction.as_ref(),
        )
        .await
        {
            Ok(Some(prompt)) => prompt,
            Ok(None) => return Outcome::Cancelled,
            Err(e) => return Outcome::failed(Stage::DerivingPrompt, e),
        };

        let batch = self.request_batch(&prompt, &params).await;
        if batch.is_empty() {
            return Outcome::Empty;
        }

        let (prompt, params) = (&prompt, &params);
        let selected = selection::select_from(
            self.interaction.as_ref(),
            batch,
            self.max_rounds,
            move || self.request_batch(prompt, params),
        )
        .await;
        let candidate = match selected {
            Ok(SelectionOutcome::Chosen(candidate)) => candidate,
            Ok(_) => return Outcome::NoneChosen,
            Err(e) => return Outcome::failed(Stage::Selecting, e),
        };

        let reference = match materialize(
            self.images.as_ref(),
            self.attachments.as_ref(),
            &document_id,
            &candidate,
        )
        .await
        {
            Ok(reference) => reference,
            Err(e) => return Outcome::failed(Stage::Materializing, e),
        };

        let markup = reference.markup();
        let inserted = match mode {
            InvocationMode::WholeDocument { document_id } => {
                self.documents.append_text(document_id, &markup).await
            }
            _ => self.documents.insert_at_cursor(&markup).await,
        };
        match inserted {
            Ok(()) => Outcome::Inserted(markup),
            Err(e) => Outcome::failed(Stage::Done, e),
        }
    }

    async fn target_document(&self, mode: &InvocationMode) -> crate::Result<String> {
        match mode {
            InvocationMode::WholeDocument { document_id } => Ok(document_id.clone()),
            _ => self.documents.current_document_id().await,
        }
    }

    /// One generation round. Request failures count as an empty batch.
    async fn request_batch(
        &self,
        prompt: &Prompt,
        params: &GenerationParameters,
    ) -> Vec<ImageCandidate> {
        info!("Sending image request ({} chars of prompt)", prompt.as_str().len());
        match self.generator.generate_batch(prompt, params).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Image generation request failed: {}", e);
                Vec::new()
            }
        }
    }
}
