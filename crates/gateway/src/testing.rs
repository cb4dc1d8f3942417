//! In-memory transport for tests. Replies are scripted per model and every
//! request is recorded.

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use providers::{GenerateContentRequest, GenerateContentResponse, ModelTransport, ResponseStream};
use shared::error::GatewayError;
use std::collections::{HashMap, VecDeque};

pub enum Scripted {
    Reply(GenerateContentResponse),
    Fail(GatewayError),
    /// Stream that yields these items and then ends.
    Stream(Vec<Result<GenerateContentResponse, GatewayError>>),
    /// Stream that yields these items and then never finishes.
    StreamThenHang(Vec<Result<GenerateContentResponse, GatewayError>>),
    /// Request that never completes.
    Hang,
}

impl Scripted {
    pub fn text(text: &str) -> Self {
        Scripted::Reply(GenerateContentResponse::from_text(text))
    }

    pub fn fragments(fragments: &[&str]) -> Self {
        Scripted::Stream(
            fragments
                .iter()
                .map(|f| Ok(GenerateContentResponse::from_text(*f)))
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub request: GenerateContentRequest,
    pub streaming: bool,
}

#[derive(Default)]
pub struct ScriptedTransport {
    by_model: Mutex<HashMap<String, VecDeque<Scripted>>>,
    fallback: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for any model.
    pub fn push(&self, scripted: Scripted) -> &Self {
        self.fallback.lock().push_back(scripted);
        self
    }

    /// Queue a reply for one model; takes precedence over `push`.
    pub fn on_model(&self, model: &str, scripted: Scripted) -> &Self {
        self.by_model
            .lock()
            .entry(model.to_string())
            .or_default()
            .push_back(scripted);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn next(&self, model: &str, request: &GenerateContentRequest, streaming: bool) -> Scripted {
        self.calls.lock().push(RecordedCall {
            model: model.to_string(),
            request: request.clone(),
            streaming,
        });
        let scripted = self
            .by_model
            .lock()
            .get_mut(model)
            .and_then(|queue| queue.pop_front());
        scripted
            .or_else(|| self.fallback.lock().pop_front())
            .unwrap_or_else(|| {
                Scripted::Fail(GatewayError::Transport(format!(
                    "no scripted reply for {}",
                    model
                )))
            })
    }
}

#[async_trait]
impl ModelTransport for ScriptedTransport {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError> {
        match self.next(model, request, false) {
            Scripted::Reply(resp) => Ok(resp),
            Scripted::Fail(err) => Err(err),
            Scripted::Hang => futures::future::pending().await,
            Scripted::Stream(_) | Scripted::StreamThenHang(_) => Err(GatewayError::Transport(
                "scripted a stream for a unary call".to_string(),
            )),
        }
    }

    async fn stream(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<ResponseStream, GatewayError> {
        match self.next(model, request, true) {
            Scripted::Stream(items) => Ok(futures::stream::iter(items).boxed()),
            Scripted::StreamThenHang(items) => Ok(futures::stream::iter(items)
                .chain(futures::stream::pending())
                .boxed()),
            Scripted::Reply(resp) => Ok(futures::stream::iter(vec![Ok(resp)]).boxed()),
            Scripted::Fail(err) => Err(err),
            Scripted::Hang => futures::future::pending().await,
        }
    }
}
