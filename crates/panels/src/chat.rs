//! Streaming chat transcript.
//!
//! A turn moves `Idle -> Sending -> Streaming -> Idle`. The user message is
//! recorded and the input cleared before the request goes out; the reply
//! grows fragment by fragment in the last transcript entry. A failure ends
//! the turn but keeps whatever text already arrived.

use futures::StreamExt;
use gateway::AiGateway;
use parking_lot::Mutex;
use shared::chat::ChatMessage;
use shared::error::GatewayError;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::action::{ActionGuard, ActionOutcome};
use crate::PanelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatPhase {
    #[default]
    Idle,
    Sending,
    Streaming,
}

/// Emitted once per observable transcript change, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatUpdate {
    UserMessage(String),
    ReplyStarted,
    Fragment(String),
    Finished,
    Failed(String),
    Cancelled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub input: String,
    pub messages: Vec<ChatMessage>,
    pub phase: ChatPhase,
    pub last_error: Option<String>,
}

pub struct ChatController {
    gateway: Arc<AiGateway>,
    state: Mutex<ChatSnapshot>,
    guard: ActionGuard,
    updates: Mutex<Option<UnboundedSender<ChatUpdate>>>,
}

impl ChatController {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(ChatSnapshot::default()),
            guard: ActionGuard::default(),
            updates: Mutex::new(None),
        }
    }

    /// Receive transcript updates. Replaces any earlier subscriber.
    pub fn subscribe(&self) -> UnboundedReceiver<ChatUpdate> {
        let (tx, rx) = unbounded_channel();
        *self.updates.lock() = Some(tx);
        rx
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.state.lock().input = text.into();
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.state.lock().clone()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().messages.clone()
    }

    pub fn phase(&self) -> ChatPhase {
        self.state.lock().phase
    }

    fn emit(&self, update: ChatUpdate) {
        if let Some(tx) = self.updates.lock().as_ref() {
            let _ = tx.send(update);
        }
    }

    /// Send the current input as the next user turn and stream the reply.
    ///
    /// Returns `Busy` without touching the transcript while a turn is in flight.
    pub async fn submit(&self) -> Result<ActionOutcome, PanelError> {
        let _in_flight = self.guard.acquire()?;

        let (message, history) = {
            let mut state = self.state.lock();
            if state.input.trim().is_empty() {
                return Ok(ActionOutcome::Skipped);
            }
            let message = std::mem::take(&mut state.input);
            let history = state.messages.clone();
            state.messages.push(ChatMessage::user(message.clone()));
            state.phase = ChatPhase::Sending;
            state.last_error = None;
            (message, history)
        };
        self.emit(ChatUpdate::UserMessage(message.clone()));

        let result = self
            .guard
            .abortable(self.stream_reply(&message, &history))
            .await;

        self.state.lock().phase = ChatPhase::Idle;
        match result {
            Ok(Ok(())) => {
                tracing::info!(turns = self.state.lock().messages.len(), "chat reply complete");
                self.emit(ChatUpdate::Finished);
                Ok(ActionOutcome::Completed)
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "chat stream failed");
                self.state.lock().last_error = Some(err.to_string());
                self.emit(ChatUpdate::Failed(err.to_string()));
                Err(err.into())
            }
            Err(_aborted) => {
                tracing::debug!("chat stream cancelled");
                self.emit(ChatUpdate::Cancelled);
                Ok(ActionOutcome::Cancelled)
            }
        }
    }

    /// Shorthand for `set_input` followed by `submit`.
    pub async fn send(&self, text: impl Into<String>) -> Result<ActionOutcome, PanelError> {
        self.set_input(text);
        self.submit().await
    }

    async fn stream_reply(&self, message: &str, history: &[ChatMessage]) -> Result<(), GatewayError> {
        let mut stream = self.gateway.chat_stream(message, history).await?;
        {
            let mut state = self.state.lock();
            state.messages.push(ChatMessage::model(""));
            state.phase = ChatPhase::Streaming;
        }
        self.emit(ChatUpdate::ReplyStarted);

        let mut full_text = String::new();
        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            full_text.push_str(&fragment);
            if let Some(last) = self.state.lock().messages.last_mut() {
                last.text.clone_from(&full_text);
            }
            self.emit(ChatUpdate::Fragment(fragment));
        }
        Ok(())
    }

    /// Stop the in-flight turn, if any. The transcript keeps what already arrived.
    pub fn teardown(&self) {
        self.guard.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway::testing::{Scripted, ScriptedTransport};
    use providers::GenerateContentResponse;
    use shared::chat::ChatRole;
    use shared::settings::GatewaySettings;

    fn controller(transport: &Arc<ScriptedTransport>) -> ChatController {
        let gateway = AiGateway::new(transport.clone(), GatewaySettings::default());
        ChatController::new(Arc::new(gateway))
    }

    fn drain(rx: &mut UnboundedReceiver<ChatUpdate>) -> Vec<ChatUpdate> {
        let mut out = Vec::new();
        while let Ok(update) = rx.try_recv() {
            out.push(update);
        }
        out
    }

    #[tokio::test]
    async fn test_turn_appends_user_and_streamed_reply() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Scripted::fragments(&["Three ", "KPIs: ", "reach."]));
        let chat = controller(&transport);
        let mut rx = chat.subscribe();

        chat.set_input("Draft KPIs");
        assert_eq!(chat.submit().await.unwrap(), ActionOutcome::Completed);

        let snap = chat.snapshot();
        assert_eq!(
            snap.messages,
            vec![ChatMessage::user("Draft KPIs"), ChatMessage::model("Three KPIs: reach.")]
        );
        assert_eq!(snap.phase, ChatPhase::Idle);
        assert!(snap.input.is_empty());

        assert_eq!(
            drain(&mut rx),
            vec![
                ChatUpdate::UserMessage("Draft KPIs".into()),
                ChatUpdate::ReplyStarted,
                ChatUpdate::Fragment("Three ".into()),
                ChatUpdate::Fragment("KPIs: ".into()),
                ChatUpdate::Fragment("reach.".into()),
                ChatUpdate::Finished,
            ]
        );
    }

    #[tokio::test]
    async fn test_history_excludes_new_message() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Scripted::fragments(&["first"]));
        transport.push(Scripted::fragments(&["second"]));
        let chat = controller(&transport);

        chat.send("one").await.unwrap();
        chat.send("two").await.unwrap();

        let roles: Vec<ChatRole> = chat.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::User, ChatRole::Model, ChatRole::User, ChatRole::Model]
        );
        let calls = transport.calls();
        let second = &calls[1].request;
        let sent: Vec<&str> = second
            .contents
            .iter()
            .map(|c| c.parts[0].text.as_deref().unwrap())
            .collect();
        assert_eq!(sent, vec!["one", "first", "two"]);
    }

    #[tokio::test]
    async fn test_blank_input_sends_nothing() {
        let transport = Arc::new(ScriptedTransport::new());
        let chat = controller(&transport);
        assert_eq!(chat.send("  ").await.unwrap(), ActionOutcome::Skipped);
        assert_eq!(transport.call_count(), 0);
        assert!(chat.messages().is_empty());
    }

    #[tokio::test]
    async fn test_mid_stream_failure_keeps_partial_text() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Scripted::Stream(vec![
            Ok(GenerateContentResponse::from_text("Partial ")),
            Err(GatewayError::Transport("connection reset".into())),
            Ok(GenerateContentResponse::from_text("never")),
        ]));
        let chat = controller(&transport);

        let err = chat.send("go").await.unwrap_err();
        assert!(matches!(err, PanelError::Gateway(GatewayError::Transport(_))));

        let snap = chat.snapshot();
        assert_eq!(snap.messages.last().unwrap().text, "Partial ");
        assert_eq!(snap.phase, ChatPhase::Idle);
        assert!(snap.last_error.unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_open_failure_leaves_only_user_message() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Scripted::Fail(GatewayError::MissingCredentials {
            env: "API_KEY".into(),
        }));
        let chat = controller(&transport);

        assert!(chat.send("hello").await.is_err());
        assert_eq!(chat.messages(), vec![ChatMessage::user("hello")]);
    }

    #[tokio::test]
    async fn test_second_submit_while_streaming_is_rejected() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(Scripted::StreamThenHang(vec![Ok(
            GenerateContentResponse::from_text("Working"),
        )]));
        let chat = Arc::new(controller(&transport));
        let mut rx = chat.subscribe();

        let first = tokio::spawn({
            let chat = chat.clone();
            async move { chat.send("first").await }
        });
        while rx.recv().await != Some(ChatUpdate::Fragment("Working".into())) {}

        chat.set_input("second");
        assert!(matches!(chat.submit().await, Err(PanelError::Busy)));
        assert_eq!(chat.snapshot().input, "second");
        assert_eq!(chat.messages().len(), 2);

        chat.teardown();
        assert_eq!(first.await.unwrap().unwrap(), ActionOutcome::Cancelled);
        assert_eq!(chat.messages().last().unwrap().text, "Working");
        assert_eq!(chat.phase(), ChatPhase::Idle);
        assert_eq!(transport.call_count(), 1);
    }
}
