//! Console command grammar.
//!
//! Lines starting with `:` drive the shell; everything else is
//! `<action> <text>` for one of the panels.

use panels::shell::UnknownTab;
use panels::Tab;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Tabs,
    State,
    Goto(Tab),
    Logout,
    Quit,
    Chat(String),
    Fast(String),
    Reason(String),
    Vision { path: PathBuf, prompt: Option<String> },
    Grant(String),
    Advice(String),
    Topic(usize),
    Forecast(String),
    Debate(String),
    Match(Option<String>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}` (try :help)")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("topic must be a number from 1 to {max}, got `{got}`")]
    BadTopic { got: String, max: usize },
    #[error(transparent)]
    Tab(#[from] UnknownTab),
}

pub const HELP: &str = "\
:tabs                 list tabs
:tab <name>           switch tab
:state                show the current panel
:logout / :quit
chat <text>           stream a chat reply          (intelligence)
fast <text>           quick answer                 (intelligence)
reason <text>         deep reasoning               (intelligence)
vision <path> [text]  analyze an image             (intelligence)
grant <text>          analyze a grant call         (grants)
advice <text>         ask the technical advisor    (resources)
topic <n>             ask quick topic n            (resources)
forecast <text>       impact forecast + branding   (impact)
debate <text>         three-role strategy review   (workshop)
match [project-id]    rank volunteers              (match)";

impl Command {
    /// Tab an action belongs to. Shell commands have none.
    pub fn tab(&self) -> Option<Tab> {
        match self {
            Command::Chat(_) | Command::Fast(_) | Command::Reason(_) | Command::Vision { .. } => {
                Some(Tab::NexusIntelligence)
            }
            Command::Grant(_) => Some(Tab::GrantReview),
            Command::Advice(_) | Command::Topic(_) => Some(Tab::ResourceCenter),
            Command::Forecast(_) => Some(Tab::ImpactModeling),
            Command::Debate(_) => Some(Tab::AgentWorkshop),
            Command::Match(_) => Some(Tab::VolunteerMatch),
            Command::Help
            | Command::Tabs
            | Command::State
            | Command::Goto(_)
            | Command::Logout
            | Command::Quit => None,
        }
    }
}

/// `Ok(None)` for a blank line.
pub fn parse(line: &str, topic_count: usize) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let text = |name: &'static str| -> Result<String, CommandError> {
        if rest.is_empty() {
            Err(CommandError::MissingArgument(name))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match head {
        ":help" | ":h" => Command::Help,
        ":tabs" => Command::Tabs,
        ":state" => Command::State,
        ":tab" => Command::Goto(text(":tab")?.parse()?),
        ":logout" => Command::Logout,
        ":quit" | ":q" => Command::Quit,
        "chat" => Command::Chat(text("chat")?),
        "fast" => Command::Fast(text("fast")?),
        "reason" => Command::Reason(text("reason")?),
        "vision" => {
            let args = text("vision")?;
            let (path, prompt) = match args.split_once(char::is_whitespace) {
                Some((path, prompt)) => (path, Some(prompt.trim().to_string())),
                None => (args.as_str(), None),
            };
            Command::Vision {
                path: PathBuf::from(path),
                prompt,
            }
        }
        "grant" => Command::Grant(text("grant")?),
        "advice" => Command::Advice(text("advice")?),
        "topic" => {
            let raw = text("topic")?;
            match raw.parse::<usize>() {
                Ok(n) if (1..=topic_count).contains(&n) => Command::Topic(n - 1),
                _ => {
                    return Err(CommandError::BadTopic {
                        got: raw,
                        max: topic_count,
                    })
                }
            }
        }
        "forecast" => Command::Forecast(text("forecast")?),
        "debate" => Command::Debate(text("debate")?),
        "match" => Command::Match((!rest.is_empty()).then(|| rest.to_string())),
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}
