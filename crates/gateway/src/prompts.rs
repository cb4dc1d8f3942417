//! Request builders for each console capability.
//!
//! Everything here is pure: user input in, `GenerateContentRequest` out.
//! Model selection and response parsing live in the gateway itself.

use providers::{Content, GenerateContentRequest, GenerationConfig, Part};
use serde_json::{json, Value};
use shared::chat::ChatMessage;
use shared::ngo::{ImageAttachment, Project, Viewpoint, Volunteer};
use shared::settings::GatewaySettings;

pub fn fast_answer(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest::prompt(prompt)
}

/// Prior transcript followed by the new user turn.
pub fn chat_turn(
    settings: &GatewaySettings,
    message: &str,
    history: &[ChatMessage],
) -> GenerateContentRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|m| Content::with_role(m.role.as_str(), m.text.clone()))
        .collect();
    contents.push(Content::with_role("user", message));

    GenerateContentRequest {
        contents,
        ..Default::default()
    }
    .with_system_instruction(settings.persona.clone())
}

pub fn image_analysis(prompt: &str, image: &ImageAttachment) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: None,
            parts: vec![
                Part::text(prompt),
                Part::inline(image.data_base64.clone(), image.mime_type.clone()),
            ],
        }],
        ..Default::default()
    }
}

pub fn deep_reasoning(settings: &GatewaySettings, prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest::prompt(prompt)
        .with_config(GenerationConfig::thinking(settings.deep_thinking_budget))
}

pub fn grant_analysis(grant_text: &str) -> GenerateContentRequest {
    GenerateContentRequest::prompt(format!(
        "Analyze this grant opportunity. Extract the key requirements and provide a strategic \
         fit summary.\n\nGrant Text: {}",
        grant_text
    ))
}

pub fn volunteer_ranking(project: &Project, volunteers: &[Volunteer]) -> GenerateContentRequest {
    let roster = serde_json::to_string(volunteers).unwrap_or_else(|_| "[]".to_string());
    GenerateContentRequest::prompt(format!(
        "Rank these volunteers for project: \"{}\". Required skills: {}. \
         Return a JSON array with \"id\" and \"matchScore\" (0-100).\n\nVolunteers: {}",
        project.name,
        project.required_skills.join(", "),
        roster
    ))
    .with_config(GenerationConfig::json(ranking_schema()))
}

/// Array of `{id, matchScore}`, both required.
pub fn ranking_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING" },
                "matchScore": { "type": "NUMBER" }
            },
            "required": ["id", "matchScore"]
        }
    })
}

pub fn impact_forecast(settings: &GatewaySettings, description: &str) -> GenerateContentRequest {
    GenerateContentRequest::prompt(format!(
        "Predict the social ROI and potential impact metrics for this NGO project: \"{}\". \
         Provide a structured forecast with 3 specific KPIs and potential risks.",
        description
    ))
    .with_config(GenerationConfig::thinking(settings.forecast_thinking_budget))
}

pub fn branding_brief(
    settings: &GatewaySettings,
    project_name: &str,
    mission: &str,
) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: None,
            parts: vec![Part::text(format!(
                "A professional, minimalist, high-impact NGO logo and brand visual for a project \
                 named \"{}\" focused on {}. Clean lines, modern corporate style, vector \
                 aesthetic, blue and indigo palette.",
                project_name, mission
            ))],
        }],
        ..Default::default()
    }
    .with_config(GenerationConfig::image(settings.branding_aspect_ratio.clone()))
}

pub fn war_room(strategy: &str) -> GenerateContentRequest {
    let roles: Vec<String> = Viewpoint::all()
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{}. {} (focus on {})", i + 1, v.title(), v.focus()))
        .collect();

    GenerateContentRequest::prompt(format!(
        r#"You are simulating an NGO 'War Room'. Review this strategy: "{strategy}".
Provide 3 distinct viewpoints:
{roles}
Answer with one field per viewpoint."#,
        strategy = strategy,
        roles = roles.join("\n"),
    ))
    .with_config(GenerationConfig::json(debate_schema()))
}

/// Object with one required string per viewpoint.
pub fn debate_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "skeptic": { "type": "STRING" },
            "visionary": { "type": "STRING" },
            "pragmatist": { "type": "STRING" }
        },
        "required": ["skeptic", "visionary", "pragmatist"]
    })
}

pub fn resource_advice(query: &str) -> GenerateContentRequest {
    GenerateContentRequest::prompt(format!("NGO technical advisor: {}", query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::catalog;

    fn prompt_text(req: &GenerateContentRequest) -> &str {
        req.contents[0].parts[0].text.as_deref().unwrap()
    }

    #[test]
    fn test_chat_turn_appends_after_history() {
        let settings = GatewaySettings::default();
        let history = vec![ChatMessage::user("hi"), ChatMessage::model("hello")];
        let req = chat_turn(&settings, "how many donors?", &history);

        let roles: Vec<_> = req.contents.iter().map(|c| c.role.as_deref().unwrap()).collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(req.contents[2].parts[0].text.as_deref(), Some("how many donors?"));
        assert_eq!(
            req.system_instruction.unwrap().parts[0].text.as_deref(),
            Some(settings.persona.as_str())
        );
    }

    #[test]
    fn test_image_analysis_mixes_parts() {
        let img = ImageAttachment::from_bytes(b"png-bytes", "image/png");
        let req = image_analysis("what is shown?", &img);
        let parts = &req.contents[0].parts;
        assert_eq!(parts[0].text.as_deref(), Some("what is shown?"));
        let inline = parts[1].inline_data.as_ref().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, img.data_base64);
    }

    #[test]
    fn test_thinking_budgets_come_from_settings() {
        let mut settings = GatewaySettings::default();
        settings.deep_thinking_budget = 1024;
        let req = deep_reasoning(&settings, "why?");
        let cfg = req.generation_config.unwrap();
        assert_eq!(cfg.thinking_config.unwrap().thinking_budget, 1024);

        let req = impact_forecast(&GatewaySettings::default(), "clean water");
        let cfg = req.generation_config.unwrap();
        assert_eq!(cfg.thinking_config.unwrap().thinking_budget, 2000);
    }

    #[test]
    fn test_volunteer_ranking_requests_json() {
        let projects = catalog::projects();
        let req = volunteer_ranking(&projects[0], &catalog::volunteers());
        assert!(prompt_text(&req).contains("Digital Core Redesign"));
        assert!(prompt_text(&req).contains("Alice Johnson"));

        let cfg = req.generation_config.unwrap();
        assert_eq!(cfg.response_mime_type.as_deref(), Some("application/json"));
        assert_eq!(cfg.response_schema.unwrap()["items"]["required"], json!(["id", "matchScore"]));
    }

    #[test]
    fn test_war_room_names_every_role() {
        let req = war_room("open a field office");
        let text = prompt_text(&req);
        for v in Viewpoint::all() {
            assert!(text.contains(v.title()));
        }
        let schema = req.generation_config.unwrap().response_schema.unwrap();
        assert_eq!(schema["required"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_branding_brief_sets_aspect_ratio() {
        let req = branding_brief(&GatewaySettings::default(), "Project Lumina", "clean water");
        assert!(prompt_text(&req).contains("\"Project Lumina\" focused on clean water"));
        let cfg = req.generation_config.unwrap();
        assert_eq!(cfg.image_config.unwrap().aspect_ratio, "1:1");
    }
}
