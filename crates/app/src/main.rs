mod commands;
mod config;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Command, HELP};
use gateway::AiGateway;
use panels::chat::{ChatController, ChatUpdate};
use panels::intelligence::ConsoleMode;
use panels::resource_center::QUICK_TOPICS;
use panels::{ActionOutcome, LoginForm, Panel, PanelError, Shell};
use shared::ngo::{image_mime_for_extension, ImageAttachment};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lumina", about = "Lumina Nexus NGO operations console")]
struct Cli {
    /// Settings file; defaults to the per-user config directory.
    #[arg(long, env = "LUMINA_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, env = "LUMINA_LOG", default_value = "info")]
    log_level: String,
}

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = config::load_settings(cli.config.as_deref())?;
    let gateway = AiGateway::from_settings(settings).context("creating gateway")?;
    let mut shell = Shell::new(Arc::new(gateway));
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("Lumina Nexus");
    if !login(&mut shell, &mut input).await? {
        return Ok(());
    }
    println!("{}", HELP);

    loop {
        prompt(&format!("{}> ", shell.active_tab().slug()));
        let Some(line) = input.next_line().await? else {
            break;
        };
        let command = match commands::parse(&line, QUICK_TOPICS.len()) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::Tabs => print!("{}", render::tabs(shell.active_tab())),
            Command::Goto(tab) => {
                shell.navigate(tab);
                show(&shell);
            }
            Command::State => show(&shell),
            Command::Logout => {
                shell.logout();
                if !login(&mut shell, &mut input).await? {
                    break;
                }
            }
            action => {
                if let Some(tab) = action.tab() {
                    shell.navigate(tab);
                }
                if let Some(panel) = shell.panel().cloned() {
                    dispatch(&panel, action).await;
                    show(&shell);
                }
            }
        }
    }

    shell.logout();
    Ok(())
}

fn prompt(text: &str) {
    print!("{}", text);
    let _ = std::io::stdout().flush();
}

fn show(shell: &Shell) {
    if let Some(panel) = shell.panel() {
        print!("{}", render::panel(panel));
    }
}

async fn ask(input: &mut Input, label: &str) -> Result<Option<String>> {
    prompt(label);
    Ok(input.next_line().await?.map(|line| line.trim().to_string()))
}

/// Returns false when input ends before the form is complete.
async fn login(shell: &mut Shell, input: &mut Input) -> Result<bool> {
    let Some(name) = ask(input, "name: ").await? else {
        return Ok(false);
    };
    let Some(org) = ask(input, "organisation: ").await? else {
        return Ok(false);
    };
    let Some(email) = ask(input, "email: ").await? else {
        return Ok(false);
    };
    let user = shell.login(LoginForm {
        email,
        password: String::new(),
        name,
        org,
    });
    println!("Signed in as {}", render::user_line(user));
    Ok(true)
}

/// Await `action`; Ctrl-C tears the panel down and the action reports `Cancelled`.
async fn interruptible<F>(panel: &Panel, action: F) -> Result<ActionOutcome, PanelError>
where
    F: Future<Output = Result<ActionOutcome, PanelError>>,
{
    tokio::pin!(action);
    tokio::select! {
        result = &mut action => result,
        _ = tokio::signal::ctrl_c() => {
            panel.teardown();
            action.await
        }
    }
}

async fn dispatch(panel: &Panel, command: Command) {
    let result = match (panel, command) {
        (Panel::NexusIntelligence(p), Command::Chat(text)) => {
            p.set_mode(ConsoleMode::Chat);
            stream_chat(panel, p.chat(), text).await
        }
        (Panel::NexusIntelligence(p), Command::Fast(text)) => {
            p.set_fast_prompt(text);
            interruptible(panel, p.ask_fast()).await
        }
        (Panel::NexusIntelligence(p), Command::Reason(text)) => {
            p.set_mode(ConsoleMode::Reasoning);
            p.set_reasoning_prompt(text);
            interruptible(panel, p.reason()).await
        }
        (Panel::NexusIntelligence(p), Command::Vision { path, prompt }) => {
            p.set_mode(ConsoleMode::Vision);
            match read_image(&path).await {
                Ok(image) => p.attach_image(image),
                Err(err) => {
                    println!("{:#}", err);
                    return;
                }
            }
            if let Some(prompt) = prompt {
                p.set_vision_prompt(prompt);
            }
            interruptible(panel, p.analyze_image()).await
        }
        (Panel::GrantReview(p), Command::Grant(text)) => {
            p.set_grant_text(text);
            interruptible(panel, p.analyze()).await
        }
        (Panel::ResourceCenter(p), Command::Advice(text)) => {
            p.set_query(text);
            interruptible(panel, p.ask()).await
        }
        (Panel::ResourceCenter(p), Command::Topic(index)) => {
            p.pick_topic(index);
            interruptible(panel, p.ask()).await
        }
        (Panel::ImpactModeling(p), Command::Forecast(text)) => {
            p.set_description(text);
            interruptible(panel, p.forecast()).await
        }
        (Panel::AgentWorkshop(p), Command::Debate(text)) => {
            p.set_strategy(text);
            interruptible(panel, p.run_debate()).await
        }
        (Panel::VolunteerMatch(p), Command::Match(Some(id))) => {
            interruptible(panel, p.match_project(&id)).await
        }
        (Panel::VolunteerMatch(p), Command::Match(None)) => {
            interruptible(panel, p.run_match()).await
        }
        (panel, command) => {
            tracing::debug!(tab = %panel.tab(), ?command, "command does not apply here");
            Ok(ActionOutcome::Skipped)
        }
    };

    match result {
        Ok(ActionOutcome::Completed) => {}
        Ok(ActionOutcome::Skipped) => println!("(nothing to send)"),
        Ok(ActionOutcome::Cancelled) => println!("(cancelled)"),
        Err(err) => println!("error: {}", err),
    }
}

/// Prints fragments as they arrive.
async fn stream_chat(
    panel: &Panel,
    chat: &ChatController,
    text: String,
) -> Result<ActionOutcome, PanelError> {
    let mut updates = chat.subscribe();
    let send = interruptible(panel, chat.send(text));
    tokio::pin!(send);
    loop {
        tokio::select! {
            result = &mut send => {
                while let Ok(update) = updates.try_recv() {
                    print_update(update);
                }
                return result;
            }
            Some(update) = updates.recv() => print_update(update),
        }
    }
}

fn print_update(update: ChatUpdate) {
    match update {
        ChatUpdate::ReplyStarted => prompt("lumina> "),
        ChatUpdate::Fragment(fragment) => prompt(&fragment),
        ChatUpdate::Finished | ChatUpdate::Failed(_) | ChatUpdate::Cancelled => println!(),
        ChatUpdate::UserMessage(_) => {}
    }
}

async fn read_image(path: &Path) -> Result<ImageAttachment> {
    let mime = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(image_mime_for_extension)
        .with_context(|| format!("{} is not a supported image type", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(ImageAttachment::from_bytes(&bytes, mime))
}
