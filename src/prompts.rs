//! Prompt derivation for each invocation mode.

use crate::host::{DocumentAccessor, Interaction};
use crate::models::{InvocationMode, Prompt};
use crate::{Error, Result};

pub const INSTRUCTION_QUESTION: &str = "What would you like to generate images of?";

/// Last non-empty line before the first occurrence of `marker`, trimmed.
pub fn preceding_line(text: &str, marker: &str) -> Result<Prompt> {
    let index = text
        .find(marker)
        .ok_or_else(|| Error::MarkerNotFound(marker.to_string()))?;

    text[..index]
        .lines()
        .rev()
        .find_map(Prompt::trimmed)
        .ok_or(Error::PromptUnavailable)
}

/// Prompt from a dialog answer. `Ok(None)` when the dialog was dismissed.
pub fn from_instruction(answer: Option<&str>) -> Result<Option<Prompt>> {
    match answer {
        None => Ok(None),
        Some(text) => Prompt::trimmed(text).map(Some).ok_or(Error::BlankPrompt),
    }
}

pub fn from_document(text: &str) -> Result<Prompt> {
    Prompt::verbatim(text).ok_or(Error::BlankPrompt)
}

/// Produce the prompt for `mode`. `Ok(None)` means the user cancelled.
pub async fn derive(
    mode: &InvocationMode,
    document_id: &str,
    marker: &str,
    documents: &dyn DocumentAccessor,
    interaction: &dyn Interaction,
) -> Result<Option<Prompt>> {
    match mode {
        InvocationMode::PrecedingText => {
            let text = documents.read_text(document_id).await?;
            let prompt = preceding_line(&text, marker)?;
            tracing::info!("Deduced prompt: {}", prompt);
            Ok(Some(prompt))
        }
        InvocationMode::Direct => {
            let answer = interaction.ask(INSTRUCTION_QUESTION).await?;
            from_instruction(answer.as_deref())
        }
        InvocationMode::WholeDocument { .. } => {
            let text = documents.read_text(document_id).await?;
            from_document(&text).map(Some)
        }
    }
}
