use super::{Alerts, AttachmentStore, DocumentAccessor, Interaction};
use crate::image::EmbeddedImage;
use crate::models::{Choice, StoredReference};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockDocument {
    documents: Arc<Mutex<HashMap<String, String>>>,
    current: String,
    inserted: Arc<Mutex<Vec<String>>>,
    appended: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockDocument {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(Mutex::new(HashMap::new())),
            current: "note".to_string(),
            inserted: Arc::new(Mutex::new(Vec::new())),
            appended: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_current(mut self, document_id: &str) -> Self {
        self.current = document_id.to_string();
        self
    }

    pub fn with_document(self, document_id: &str, text: &str) -> Self {
        self.documents
            .lock()
            .unwrap()
            .insert(document_id.to_string(), text.to_string());
        self
    }

    pub fn get_inserted(&self) -> Vec<String> {
        self.inserted.lock().unwrap().clone()
    }

    pub fn get_appended(&self) -> Vec<(String, String)> {
        self.appended.lock().unwrap().clone()
    }

    pub fn get_mutation_count(&self) -> usize {
        self.inserted.lock().unwrap().len() + self.appended.lock().unwrap().len()
    }
}

impl Default for MockDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentAccessor for MockDocument {
    async fn current_document_id(&self) -> Result<String> {
        Ok(self.current.clone())
    }

    async fn read_text(&self, document_id: &str) -> Result<String> {
        self.documents
            .lock()
            .unwrap()
            .get(document_id)
            .cloned()
            .ok_or_else(|| Error::Document(format!("Document not found: {}", document_id)))
    }

    async fn insert_at_cursor(&self, text: &str) -> Result<()> {
        self.inserted.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn append_text(&self, document_id: &str, text: &str) -> Result<()> {
        self.appended
            .lock()
            .unwrap()
            .push((document_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// Scripted answer to a `choose` dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedChoice {
    /// Pick the presented choice at this index.
    Index(usize),
    /// Pick the last presented choice ("More options" when offered).
    Last,
    Dismiss,
}

#[derive(Clone)]
pub struct MockInteraction {
    answers: Arc<Mutex<VecDeque<Option<String>>>>,
    choices: Arc<Mutex<VecDeque<ScriptedChoice>>>,
    questions: Arc<Mutex<Vec<String>>>,
    presented: Arc<Mutex<Vec<Vec<Choice>>>>,
}

impl MockInteraction {
    pub fn new() -> Self {
        Self {
            answers: Arc::new(Mutex::new(VecDeque::new())),
            choices: Arc::new(Mutex::new(VecDeque::new())),
            questions: Arc::new(Mutex::new(Vec::new())),
            presented: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_answer(self, answer: Option<&str>) -> Self {
        self.answers
            .lock()
            .unwrap()
            .push_back(answer.map(str::to_string));
        self
    }

    pub fn with_choice(self, choice: ScriptedChoice) -> Self {
        self.choices.lock().unwrap().push_back(choice);
        self
    }

    pub fn get_questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }

    /// Every choice list shown so far, one entry per dialog.
    pub fn get_presented(&self) -> Vec<Vec<Choice>> {
        self.presented.lock().unwrap().clone()
    }
}

impl Default for MockInteraction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interaction for MockInteraction {
    async fn ask(&self, prompt: &str) -> Result<Option<String>> {
        self.questions.lock().unwrap().push(prompt.to_string());
        Ok(self.answers.lock().unwrap().pop_front().flatten())
    }

    async fn choose(&self, _prompt: &str, choices: &[Choice]) -> Result<Option<String>> {
        self.presented.lock().unwrap().push(choices.to_vec());

        // Unscripted dialogs are dismissed
        let scripted = self
            .choices
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ScriptedChoice::Dismiss);

        Ok(match scripted {
            ScriptedChoice::Index(index) => choices.get(index).map(|c| c.value.clone()),
            ScriptedChoice::Last => choices.last().map(|c| c.value.clone()),
            ScriptedChoice::Dismiss => None,
        })
    }
}

#[derive(Clone)]
pub struct MockAttachmentStore {
    stored: Arc<Mutex<Vec<(String, EmbeddedImage)>>>,
    base_url: String,
    should_fail: Arc<Mutex<bool>>,
}

impl MockAttachmentStore {
    pub fn new() -> Self {
        Self {
            stored: Arc::new(Mutex::new(Vec::new())),
            base_url: "https://mock-attachments.example.com".to_string(),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_stored(&self) -> Vec<(String, EmbeddedImage)> {
        self.stored.lock().unwrap().clone()
    }

    pub fn get_store_count(&self) -> usize {
        self.stored.lock().unwrap().len()
    }
}

impl Default for MockAttachmentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttachmentStore for MockAttachmentStore {
    async fn store(&self, document_id: &str, image: &EmbeddedImage) -> Result<StoredReference> {
        if *self.should_fail.lock().unwrap() {
            return Err(Error::Attachment("Mock failure".to_string()));
        }

        let mut stored = self.stored.lock().unwrap();
        stored.push((document_id.to_string(), image.clone()));
        Ok(StoredReference(format!(
            "{}/{}.{}",
            self.base_url,
            stored.len(),
            image.extension()
        )))
    }
}

#[derive(Clone, Default)]
pub struct MockAlerts {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MockAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Alerts for MockAlerts {
    async fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
