//! Records the console works with: people, projects and AI-produced artifacts.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Signed-in user. Fabricated locally by the login stub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub org: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub id: String,
    pub name: String,
    pub skills: Vec<String>,
    pub bio: String,
    pub location: String,
    /// Only set by a ranking response; 0 for volunteers the ranking left out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
}

impl Volunteer {
    /// Score used for ordering; unranked counts as 0.
    pub fn score(&self) -> f64 {
        self.match_score.unwrap_or(0.0)
    }

    /// Two-letter monogram shown next to the name.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Planning,
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub required_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branding_url: Option<String>,
}

/// Impact forecast plus its generated branding, committed together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForecastResult {
    pub prediction_text: String,
    /// `data:` URI, absent when the image model returned no picture.
    pub branding_image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Viewpoint {
    Skeptic,
    Visionary,
    Pragmatist,
}

impl Viewpoint {
    pub fn all() -> &'static [Viewpoint] {
        &[Viewpoint::Skeptic, Viewpoint::Visionary, Viewpoint::Pragmatist]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Viewpoint::Skeptic => "The Skeptic",
            Viewpoint::Visionary => "The Visionary",
            Viewpoint::Pragmatist => "The Pragmatist",
        }
    }

    pub fn focus(&self) -> &'static str {
        match self {
            Viewpoint::Skeptic => "risks and failure modes",
            Viewpoint::Visionary => "scaling and long-term potential",
            Viewpoint::Pragmatist => "budget and logistics",
        }
    }
}

/// War-room review of a strategy, one entry per role.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DebateTranscript {
    pub skeptic: String,
    pub visionary: String,
    pub pragmatist: String,
}

impl DebateTranscript {
    pub fn viewpoint(&self, viewpoint: Viewpoint) -> &str {
        match viewpoint {
            Viewpoint::Skeptic => &self.skeptic,
            Viewpoint::Visionary => &self.visionary,
            Viewpoint::Pragmatist => &self.pragmatist,
        }
    }
}

/// Image sent inline with a vision request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub data_base64: String,
    pub mime_type: String,
}

impl ImageAttachment {
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            data_base64: STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Parse `data:<mime>;base64,<payload>`.
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix("data:")?;
        let (header, payload) = rest.split_once(',')?;
        let mime_type = header.strip_suffix(";base64")?;
        if mime_type.is_empty() || payload.is_empty() {
            return None;
        }
        Some(Self {
            data_base64: payload.to_string(),
            mime_type: mime_type.to_string(),
        })
    }

    pub fn to_data_uri(&self) -> String {
        data_uri(&self.mime_type, &self.data_base64)
    }
}

pub fn data_uri(mime_type: &str, data_base64: &str) -> String {
    format!("data:{};base64,{}", mime_type, data_base64)
}

/// Guess an image MIME type from a file extension.
pub fn image_mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}
