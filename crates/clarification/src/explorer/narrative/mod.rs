//! Analyst commentary from a streaming chat-completion endpoint.
//!
//! `NarrativeGenerator::analyze` always produces text. Transport failures are
//! reported inside the returned outcome rather than as errors.

mod stream;
mod transport;

use std::sync::Arc;

use futures::StreamExt;
use serde_json::{Map, Value};
use tracing::warn;

pub use transport::{
    ChatMessage, ChatRequest, ChatTransport, ChunkStream, HttpChatTransport, TransportError,
    SYSTEM_PROMPT,
};

use stream::StreamAccumulator;

use super::domain::ScoreVector;

pub const EMPTY_NARRATIVE: &str = "No analysis generated";
pub const FAILURE_PREFIX: &str = "Analysis failed: ";

/// What the prompt describes.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeSubject<'a> {
    pub company: &'a str,
    pub rating: &'a str,
    pub scores: &'a ScoreVector,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeOutcome {
    Generated(String),
    Empty,
    Failed(String),
}

impl NarrativeOutcome {
    pub fn into_text(self) -> String {
        match self {
            Self::Generated(text) => text,
            Self::Empty => EMPTY_NARRATIVE.to_string(),
            Self::Failed(reason) => format!("{FAILURE_PREFIX}{reason}"),
        }
    }
}

pub struct NarrativeGenerator<T> {
    transport: Arc<T>,
    model: String,
}

impl<T> NarrativeGenerator<T>
where
    T: ChatTransport + 'static,
{
    pub fn new(transport: Arc<T>, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub async fn analyze(&self, subject: &NarrativeSubject<'_>) -> NarrativeOutcome {
        let request = ChatRequest::analyst(self.model.clone(), build_prompt(subject));
        match self.collect(&request).await {
            Ok(text) if text.trim().is_empty() => NarrativeOutcome::Empty,
            Ok(text) => NarrativeOutcome::Generated(text),
            Err(error) => {
                warn!(company = subject.company, %error, "narrative generation failed");
                NarrativeOutcome::Failed(error.to_string())
            }
        }
    }

    async fn collect(&self, request: &ChatRequest) -> Result<String, TransportError> {
        let mut chunks = self.transport.send(request).await?;
        let mut accumulator = StreamAccumulator::default();
        while let Some(chunk) = chunks.next().await {
            accumulator.push(&chunk?);
        }
        Ok(accumulator.finish())
    }
}

/// Prompt naming the company, its letter rating and every score attribute in
/// dataset column order.
pub fn build_prompt(subject: &NarrativeSubject<'_>) -> String {
    let scores: Map<String, Value> = subject
        .scores
        .iter()
        .filter(|(kind, _)| kind.column().contains("SCORE"))
        .map(|(kind, value)| (kind.column().to_string(), Value::from(value)))
        .collect();

    format!(
        "Analyze {company} with rating {rating}.\n\n\
Scores: {scores}\n\
Write in no more than 100 words a bullet list of strengths and weaknesses regarding the scores.\n",
        company = subject.company,
        rating = subject.rating,
        scores = Value::Object(scores),
    )
}
