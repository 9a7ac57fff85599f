//! Recorded dashboard sessions: an optional starting snapshot followed by the
//! steps an event handler would have produced.

use std::{fs, path::Path};

use anyhow::Context;
use dashboard_core::Intent;
use serde::Deserialize;
use shared::{protocol::Action, state::StateSnapshot};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Plain action, dispatched as is.
    Action(Action),
    Intent(Intent),
    /// Raw chart range update; goes through the viewport debouncer.
    ViewportRange { min: f64, max: f64 },
    WaitMs(u64),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Session {
    pub initial_state: Option<StateSnapshot>,
    pub steps: Vec<Step>,
}

impl Session {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("failed to parse session")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read session '{}'", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("in session '{}'", path.display()))
    }
}
