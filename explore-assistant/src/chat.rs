use std::sync::Arc;

use explore_catalog::Tour;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::prompt::system_instruction;
use crate::{AssistantError, ChatBackend};

pub const GREETING: &str =
    "AOA! I'm your AI assistant. How can I help you plan your trip to the North today?";

pub const APOLOGY: &str =
    "My radio connection to the base camp is a bit weak (Network Error). Please try asking again!";

pub const SUGGESTIONS: [&str; 4] = [
    "Best time to visit Hunza?",
    "Top hotels in Skardu",
    "Current weather in Gilgit",
    "5-day itinerary ideas",
];

/// Suggestions are offered only near the start of a conversation.
const SUGGESTION_CUTOFF: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: ChatRole::User, text: text.into(), sources: Vec::new() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: ChatRole::Model, text: text.into(), sources: Vec::new() }
    }

    fn add_sources(&mut self, sources: Vec<Source>) {
        for source in sources {
            if !self.sources.iter().any(|s| s.uri == source.uri) {
                self.sources.push(source);
            }
        }
    }
}

/// One visitor's conversation with the travel assistant.
///
/// The tour catalog is captured when the session starts; later catalog
/// edits do not reach an open session.
pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    system_instruction: String,
    transcript: Vec<ChatMessage>,
    /// Turns the backend has accepted. Failed exchanges are left out.
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>, tours: &[Tour]) -> Self {
        Self {
            backend,
            system_instruction: system_instruction(tours),
            transcript: vec![ChatMessage::model(GREETING)],
            history: Vec::new(),
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn suggestions(&self) -> &'static [&'static str] {
        if self.transcript.len() < SUGGESTION_CUTOFF {
            &SUGGESTIONS
        } else {
            &[]
        }
    }

    /// Sends a visitor message and streams the reply into the transcript.
    /// Blank input is ignored and returns `None`. Any backend failure turns
    /// the pending reply into the fixed apology.
    pub async fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }

        let question = ChatMessage::user(text);
        self.transcript.push(question.clone());
        self.history.push(question);
        self.transcript.push(ChatMessage::model(""));
        let pending = self.transcript.len() - 1;

        match self.stream_into(pending).await {
            Ok(()) => {
                debug!(chars = self.transcript[pending].text.len(), "assistant reply complete");
                self.history.push(self.transcript[pending].clone());
            }
            Err(e) => {
                warn!("assistant reply failed: {}", e);
                self.history.pop();
                self.transcript[pending] = ChatMessage::model(APOLOGY);
            }
        }
        self.transcript.get(pending)
    }

    async fn stream_into(&mut self, index: usize) -> Result<(), AssistantError> {
        let mut stream = self
            .backend
            .stream_reply(&self.system_instruction, &self.history)
            .await?;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let message = &mut self.transcript[index];
            message.text.push_str(&chunk.text);
            message.add_sources(chunk.sources);
        }
        Ok(())
    }
}
