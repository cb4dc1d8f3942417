//! Gateway - the only component that talks to the generative model provider.
//!
//! Each console capability maps to one operation here:
//! - builds the request through [`prompts`]
//! - sends it with the configured model through a [`ModelTransport`]
//! - pulls the relevant field (text, parsed JSON or image bytes) out of the reply
//!
//! No retries and no error classification beyond [`GatewayError`].

pub mod prompts;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use providers::{GeminiClient, GenerateContentRequest, ModelTransport};
use serde::Deserialize;
use shared::chat::ChatMessage;
use shared::error::GatewayError;
use shared::ngo::{data_uri, DebateTranscript, ImageAttachment, Project, Volunteer};
use shared::settings::GatewaySettings;
use std::cmp::Ordering;
use std::sync::Arc;

/// Incremental reply text. Finite, not restartable; dropping it cancels the request.
pub type TextStream = BoxStream<'static, Result<String, GatewayError>>;

const DEFAULT_IMAGE_MIME: &str = "image/png";

/// One entry of the ranking response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchScore {
    pub id: String,
    #[serde(rename = "matchScore")]
    pub match_score: f64,
}

pub struct AiGateway {
    transport: Arc<dyn ModelTransport>,
    settings: GatewaySettings,
}

impl AiGateway {
    pub fn new(transport: Arc<dyn ModelTransport>, settings: GatewaySettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Gateway backed by the Gemini REST API.
    pub fn from_settings(settings: GatewaySettings) -> Result<Self, GatewayError> {
        let client = GeminiClient::from_settings(&settings)?;
        if !client.has_api_key() {
            tracing::warn!(
                env = %settings.api_key_env,
                "no API key in environment; requests will fail until one is set"
            );
        }
        Ok(Self::new(Arc::new(client), settings))
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    async fn complete(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<String, GatewayError> {
        let resp = self.transport.generate(model, &request).await?;
        Ok(resp.text())
    }

    /// Short, low-latency single-turn answer.
    pub async fn fast_response(&self, prompt: &str) -> Result<String, GatewayError> {
        self.complete(&self.settings.models.fast, prompts::fast_answer(prompt))
            .await
    }

    /// Opens a streamed reply to `message` given the earlier transcript.
    /// Empty fragments are dropped.
    pub async fn chat_stream(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<TextStream, GatewayError> {
        let request = prompts::chat_turn(&self.settings, message, history);
        let stream = self
            .transport
            .stream(&self.settings.models.pro, &request)
            .await?;
        Ok(stream
            .map_ok(|resp| resp.text())
            .try_filter(|text| futures::future::ready(!text.is_empty()))
            .boxed())
    }

    pub async fn analyze_image(
        &self,
        prompt: &str,
        image: &ImageAttachment,
    ) -> Result<String, GatewayError> {
        self.complete(
            &self.settings.models.pro,
            prompts::image_analysis(prompt, image),
        )
        .await
    }

    /// Completion with an extended thinking allowance.
    pub async fn deep_reasoning(&self, prompt: &str) -> Result<String, GatewayError> {
        self.complete(
            &self.settings.models.pro,
            prompts::deep_reasoning(&self.settings, prompt),
        )
        .await
    }

    pub async fn analyze_grant(&self, grant_text: &str) -> Result<String, GatewayError> {
        self.complete(&self.settings.models.pro, prompts::grant_analysis(grant_text))
            .await
    }

    /// Ranks `volunteers` for `project`. The reply must be a JSON array of
    /// `{id, matchScore}`; anything else fails the whole call.
    pub async fn match_volunteers(
        &self,
        project: &Project,
        volunteers: &[Volunteer],
    ) -> Result<Vec<Volunteer>, GatewayError> {
        let text = self
            .complete(
                &self.settings.models.flash,
                prompts::volunteer_ranking(project, volunteers),
            )
            .await?;
        let scores: Vec<MatchScore> = if text.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&text)?
        };
        tracing::debug!(project = %project.name, scored = scores.len(), "ranking received");
        Ok(rank_volunteers(volunteers, &scores))
    }

    pub async fn predict_impact(&self, description: &str) -> Result<String, GatewayError> {
        self.complete(
            &self.settings.models.pro,
            prompts::impact_forecast(&self.settings, description),
        )
        .await
    }

    /// Logo artwork as a `data:` URI, or `None` when the reply has no image part.
    pub async fn generate_project_branding(
        &self,
        project_name: &str,
        mission: &str,
    ) -> Result<Option<String>, GatewayError> {
        let request = prompts::branding_brief(&self.settings, project_name, mission);
        let resp = self
            .transport
            .generate(&self.settings.models.image, &request)
            .await?;
        Ok(resp.first_inline_data().map(|inline| {
            let mime = if inline.mime_type.is_empty() {
                DEFAULT_IMAGE_MIME
            } else {
                inline.mime_type.as_str()
            };
            data_uri(mime, &inline.data)
        }))
    }

    /// Three-role review of a strategy, returned as structured output.
    pub async fn workshop_debate(&self, strategy: &str) -> Result<DebateTranscript, GatewayError> {
        let text = self
            .complete(&self.settings.models.pro, prompts::war_room(strategy))
            .await?;
        if text.trim().is_empty() {
            return Ok(DebateTranscript::default());
        }
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn resource_advice(&self, query: &str) -> Result<String, GatewayError> {
        self.complete(&self.settings.models.flash, prompts::resource_advice(query))
            .await
    }
}

/// Join scores onto the roster by id and order by score, highest first.
///
/// Volunteers missing from `scores` get 0. The first score wins when an id
/// repeats. Ties keep roster order.
pub fn rank_volunteers(volunteers: &[Volunteer], scores: &[MatchScore]) -> Vec<Volunteer> {
    let mut ranked: Vec<Volunteer> = volunteers
        .iter()
        .map(|v| {
            let score = scores
                .iter()
                .find(|s| s.id == v.id)
                .map(|s| s.match_score)
                .unwrap_or(0.0);
            Volunteer {
                match_score: Some(score),
                ..v.clone()
            }
        })
        .collect();
    ranked.sort_by(|a, b| by_score_desc(a.score(), b.score()));
    ranked
}

fn by_score_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
