use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use futures::stream::{self, StreamExt};
use serde_json::Value;

use crate::explorer::domain::{CompanyRecord, ScoreKind, SCORE_COUNT};
use crate::explorer::narrative::{
    ChatRequest, ChatTransport, ChunkStream, NarrativeGenerator, TransportError,
};
use crate::explorer::predictor::{LinearModel, Predictor, StandardScaler};
use crate::explorer::session::SessionController;
use crate::explorer::store::CompanyStore;

pub(super) type TestController = SessionController<Predictor, ScriptedTransport>;

pub(super) fn record(
    name: &str,
    rating: &str,
    previous: &str,
    analysis: Option<&str>,
    score: f64,
) -> CompanyRecord {
    let mut record = CompanyRecord::bare(name);
    record.rating = Some(rating.to_string());
    record.previous_rating = Some(previous.to_string());
    record.industry = Some("Industrials".to_string());
    record.gics_sub_industry = Some("Railroads".to_string());
    record.rating_analysis = analysis.map(str::to_string);
    record.scores = [Some(score); SCORE_COUNT];
    record
}

/// Alpine Mining carries stored commentary, Harbor Freight Rail does not,
/// Lakeside Power is missing two scores.
pub(super) fn store() -> Arc<CompanyStore> {
    let mut lakeside = record("Lakeside Power", "BBB", "BB", None, 6.0);
    lakeside.scores[ScoreKind::Pay.model_index()] = None;
    lakeside.scores[ScoreKind::Board.model_index()] = None;

    Arc::new(CompanyStore::from_records(vec![
        record(
            "Alpine Mining",
            "BB",
            "BBB",
            Some("Weak governance offsets a solid climate record."),
            5.0,
        ),
        record("Harbor Freight Rail", "AA", "A", None, 5.0),
        lakeside,
    ]))
}

/// Scaled mean shifts both outputs; all-5.0 lands on class 3 (BBB/BBB).
pub(super) fn predictor() -> Arc<Predictor> {
    let scaler = StandardScaler {
        mean: vec![5.0; SCORE_COUNT],
        scale: vec![2.0; SCORE_COUNT],
    };
    let model = LinearModel {
        coefficients: vec![vec![0.1; SCORE_COUNT], vec![0.1; SCORE_COUNT]],
        intercepts: vec![3.0, 3.9],
    };
    Arc::new(Predictor::new(model, scaler).expect("fixture artifacts are valid"))
}

#[derive(Debug, Clone)]
pub(super) enum Reply {
    Text(&'static str),
    Blank,
    Refuse,
}

type Hook = Box<dyn FnOnce() + Send>;

/// Chat transport replaying queued replies; falls back to `fallback` once the
/// queue is drained.
pub(super) struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    before_reply: Mutex<Option<Hook>>,
}

impl ScriptedTransport {
    pub(super) fn new(fallback: Reply) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            before_reply: Mutex::new(None),
        })
    }

    pub(super) fn push(&self, reply: Reply) {
        self.replies.lock().expect("reply queue").push_back(reply);
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().expect("prompt log").last().cloned()
    }

    /// Runs once inside the next `send`, before the reply is produced.
    pub(super) fn before_next_reply(&self, hook: impl FnOnce() + Send + 'static) {
        *self.before_reply.lock().expect("hook slot") = Some(Box::new(hook));
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChunkStream, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = request.messages.last() {
            self.prompts
                .lock()
                .expect("prompt log")
                .push(message.content.clone());
        }
        let hook = self.before_reply.lock().expect("hook slot").take();
        if let Some(hook) = hook {
            hook();
        }

        let reply = self
            .replies
            .lock()
            .expect("reply queue")
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        let lines: Vec<String> = match reply {
            Reply::Text(text) => vec![
                serde_json::json!({ "message": { "role": "assistant", "content": text } })
                    .to_string(),
                r#"{"done":true}"#.to_string(),
            ],
            Reply::Blank => vec![r#"{"message":{"content":"   "}}"#.to_string()],
            Reply::Refuse => {
                return Err(TransportError::Unavailable("connection refused".to_string()))
            }
        };
        let chunks: Vec<Result<Vec<u8>, TransportError>> = lines
            .into_iter()
            .map(|line| Ok(format!("{line}\n").into_bytes()))
            .collect();
        Ok(stream::iter(chunks).boxed())
    }
}

pub(super) fn controller(fallback: Reply) -> (Arc<TestController>, Arc<ScriptedTransport>) {
    let transport = ScriptedTransport::new(fallback);
    let narrator = Arc::new(NarrativeGenerator::new(transport.clone(), "qwen2.5:0.5b"));
    let controller = Arc::new(SessionController::new(store(), predictor(), narrator));
    (controller, transport)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
