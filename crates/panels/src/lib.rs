//! Panel controllers: per-feature state plus the async actions that fill it.
//!
//! Each panel is `Send + Sync` so a front-end can keep it in an `Arc`, spawn
//! its actions and render snapshots while they run.

pub mod action;
pub mod chat;
pub mod dashboard;
pub mod grant_review;
pub mod impact;
pub mod intelligence;
pub mod resource_center;
pub mod shell;
pub mod volunteer_match;
pub mod workshop;

use shared::error::GatewayError;
use thiserror::Error;

pub use action::{ActionOutcome, ActionSlot, ActionStatus};
pub use chat::{ChatController, ChatPhase, ChatSnapshot, ChatUpdate};
pub use shell::{LoginForm, Panel, Shell, Tab};

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("a request is already in flight")]
    Busy,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
