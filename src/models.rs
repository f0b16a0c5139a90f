//! Data models and structures
//!
//! Defines the per-invocation values that flow through the pipeline: the
//! derived prompt, candidate images, selection outcomes, and stored references.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal text that marks where a "from preceding" invocation happened.
pub const DEFAULT_MARKER: &str = "{AImage Creator: from preceding}";

/// A non-empty prompt handed to the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    /// Trimmed prompt; `None` when nothing but whitespace remains.
    pub fn trimmed(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Prompt kept exactly as given; `None` when it is blank.
    pub fn verbatim(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One generated image offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCandidate {
    pub remote_locator: String,
}

impl ImageCandidate {
    pub fn new(remote_locator: impl Into<String>) -> Self {
        Self {
            remote_locator: remote_locator.into(),
        }
    }

    pub fn locator(&self) -> &str {
        &self.remote_locator
    }
}

/// Result of one selection round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Chosen(ImageCandidate),
    RequestMore,
    NoneChosen,
}

/// Opaque locator assigned by the host's attachment store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReference(pub String);

impl StoredReference {
    /// Markdown image markup pointing at this reference.
    pub fn markup(&self) -> String {
        format!("![image]({})", self.0)
    }
}

impl fmt::Display for StoredReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the prompt is obtained and where the result lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationMode {
    /// Last non-empty line before the invocation marker; inserted at the cursor.
    PrecedingText,
    /// Instruction typed into a dialog; inserted at the cursor.
    Direct,
    /// Whole text of the given document; appended to it.
    WholeDocument { document_id: String },
}

impl InvocationMode {
    pub fn name(&self) -> &'static str {
        match self {
            InvocationMode::PrecedingText => "from preceding",
            InvocationMode::Direct => "via prompt",
            InvocationMode::WholeDocument { .. } => "summary image",
        }
    }
}

/// One option in a single-select dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_trimmed_rejects_blank() {
        assert!(Prompt::trimmed("   \n\t").is_none());
        assert_eq!(Prompt::trimmed("  a fox  ").unwrap().as_str(), "a fox");
    }

    #[test]
    fn test_prompt_verbatim_keeps_whitespace() {
        let prompt = Prompt::verbatim("# Title\n\nbody\n").unwrap();
        assert_eq!(prompt.as_str(), "# Title\n\nbody\n");
        assert!(Prompt::verbatim("\n\n").is_none());
    }

    #[test]
    fn test_stored_reference_markup() {
        let reference = StoredReference("https://images.example.com/1.png".to_string());
        assert_eq!(
            reference.markup(),
            "![image](https://images.example.com/1.png)"
        );
    }

    #[test]
    fn test_choice_serialization_skips_missing_fields() {
        let choice = Choice {
            label: Some("More options".to_string()),
            image: None,
            value: "more".to_string(),
        };

        let json = serde_json::to_string(&choice).unwrap();
        assert_eq!(json, r#"{"label":"More options","value":"more"}"#);
    }
}
