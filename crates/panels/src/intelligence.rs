//! Nexus Intelligence: chat, vision and deep reasoning behind one mode switch,
//! plus a fast-answer box that is always available.

use gateway::AiGateway;
use parking_lot::Mutex;
use shared::ngo::ImageAttachment;
use std::sync::Arc;

use crate::action::{run_action, ActionGuard, ActionOutcome, ActionSlot, PromptAction};
use crate::chat::ChatController;
use crate::PanelError;

pub const DEFAULT_VISION_PROMPT: &str =
    "Analyze this image and explain how it relates to NGO impact or community needs.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleMode {
    #[default]
    Chat,
    Vision,
    Reasoning,
}

impl ConsoleMode {
    pub fn label(&self) -> &'static str {
        match self {
            ConsoleMode::Chat => "Chat",
            ConsoleMode::Vision => "Vision",
            ConsoleMode::Reasoning => "Reasoning",
        }
    }
}

struct VisionInput {
    prompt: String,
    image: Option<ImageAttachment>,
}

pub struct IntelligencePanel {
    gateway: Arc<AiGateway>,
    mode: Mutex<ConsoleMode>,
    chat: ChatController,
    vision_input: Mutex<VisionInput>,
    vision: Mutex<ActionSlot<String>>,
    vision_guard: ActionGuard,
    reasoning: PromptAction<String>,
    fast: PromptAction<String>,
}

impl IntelligencePanel {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self {
            chat: ChatController::new(gateway.clone()),
            gateway,
            mode: Mutex::new(ConsoleMode::default()),
            vision_input: Mutex::new(VisionInput {
                prompt: DEFAULT_VISION_PROMPT.to_string(),
                image: None,
            }),
            vision: Mutex::new(ActionSlot::default()),
            vision_guard: ActionGuard::default(),
            reasoning: PromptAction::new("deep_reasoning"),
            fast: PromptAction::new("fast_response"),
        }
    }

    pub fn mode(&self) -> ConsoleMode {
        *self.mode.lock()
    }

    pub fn set_mode(&self, mode: ConsoleMode) {
        *self.mode.lock() = mode;
    }

    pub fn chat(&self) -> &ChatController {
        &self.chat
    }

    // Vision

    pub fn attach_image(&self, image: ImageAttachment) {
        self.vision_input.lock().image = Some(image);
    }

    pub fn clear_image(&self) {
        self.vision_input.lock().image = None;
    }

    pub fn has_image(&self) -> bool {
        self.vision_input.lock().image.is_some()
    }

    pub fn set_vision_prompt(&self, prompt: impl Into<String>) {
        self.vision_input.lock().prompt = prompt.into();
    }

    pub fn vision_prompt(&self) -> String {
        self.vision_input.lock().prompt.clone()
    }

    pub fn vision(&self) -> ActionSlot<String> {
        self.vision.lock().clone()
    }

    /// Describe the attached image. Without an image nothing is sent.
    pub async fn analyze_image(&self) -> Result<ActionOutcome, PanelError> {
        let (prompt, image) = {
            let input = self.vision_input.lock();
            match &input.image {
                Some(image) => (input.prompt.clone(), image.clone()),
                None => return Ok(ActionOutcome::Skipped),
            }
        };
        let gateway = &self.gateway;
        run_action(
            "image_analysis",
            &self.vision_guard,
            &self.vision,
            async move { gateway.analyze_image(&prompt, &image).await },
        )
        .await
    }

    // Reasoning

    pub fn set_reasoning_prompt(&self, prompt: impl Into<String>) {
        self.reasoning.set_input(prompt);
    }

    pub fn reasoning(&self) -> ActionSlot<String> {
        self.reasoning.slot()
    }

    pub async fn reason(&self) -> Result<ActionOutcome, PanelError> {
        let gateway = &self.gateway;
        self.reasoning
            .run(|prompt| async move { gateway.deep_reasoning(&prompt).await })
            .await
    }

    // Fast answers

    pub fn set_fast_prompt(&self, prompt: impl Into<String>) {
        self.fast.set_input(prompt);
    }

    pub fn fast_answer(&self) -> ActionSlot<String> {
        self.fast.slot()
    }

    pub async fn ask_fast(&self) -> Result<ActionOutcome, PanelError> {
        let gateway = &self.gateway;
        self.fast
            .run(|prompt| async move { gateway.fast_response(&prompt).await })
            .await
    }

    pub fn teardown(&self) {
        self.chat.teardown();
        self.vision_guard.abort();
        self.reasoning.teardown();
        self.fast.teardown();
    }
}
