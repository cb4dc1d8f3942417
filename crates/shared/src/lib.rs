pub mod catalog;
pub mod error;
pub mod ngo;

pub mod settings {
    use serde::{Deserialize, Serialize};
    use std::path::Path;

    use crate::error::SettingsError;

    /// Model identifiers, one per capability tier.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ModelRoster {
        pub fast: String,  // low-latency single-turn answers
        pub pro: String,   // chat, vision, reasoning, grant review, forecasts
        pub flash: String, // ranking and advisory Q&A
        pub image: String, // branding artwork
    }

    impl Default for ModelRoster {
        fn default() -> Self {
            Self {
                fast: "gemini-flash-lite-latest".into(),
                pro: "gemini-3-pro-preview".into(),
                flash: "gemini-3-flash-preview".into(),
                image: "gemini-2.5-flash-image".into(),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct GatewaySettings {
        pub base_url: String,
        /// Environment variable holding the API key. `GEMINI_API_KEY` is
        /// consulted when this one is unset.
        pub api_key_env: String,
        pub models: ModelRoster,
        /// System instruction for the chat assistant.
        pub persona: String,
        pub deep_thinking_budget: i32,
        pub forecast_thinking_budget: i32,
        /// Project name used when generating forecast branding.
        pub branding_project_name: String,
        pub branding_aspect_ratio: String,
        /// No timeout when unset.
        pub request_timeout_secs: Option<u64>,
    }

    impl Default for GatewaySettings {
        fn default() -> Self {
            Self {
                base_url: "https://generativelanguage.googleapis.com".into(),
                api_key_env: "API_KEY".into(),
                models: ModelRoster::default(),
                persona: "You are Lumina Nexus, an elite AI assistant for humanitarian leaders. \
                          Be strategic, accurate, and concise."
                    .into(),
                deep_thinking_budget: 32768,
                forecast_thinking_budget: 2000,
                branding_project_name: "Project Lumina".into(),
                branding_aspect_ratio: "1:1".into(),
                request_timeout_secs: None,
            }
        }
    }

    impl GatewaySettings {
        pub fn load(path: &Path) -> Result<Self, SettingsError> {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        }

        pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, serde_json::to_string_pretty(self)?)?;
            Ok(())
        }
    }

}

pub mod chat {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum ChatRole {
        User,
        Model,
    }

    impl ChatRole {
        /// Role name on the wire.
        pub fn as_str(&self) -> &'static str {
            match self {
                ChatRole::User => "user",
                ChatRole::Model => "model",
            }
        }
    }

    /// One transcript entry. The text of the last entry grows while a reply streams in.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: ChatRole,
        pub text: String,
    }

    impl ChatMessage {
        pub fn user(text: impl Into<String>) -> Self {
            Self {
                role: ChatRole::User,
                text: text.into(),
            }
        }

        pub fn model(text: impl Into<String>) -> Self {
            Self {
                role: ChatRole::Model,
                text: text.into(),
            }
        }
    }
}
