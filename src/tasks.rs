// To-Do creation: the request body, difficulty levels and due dates.

use crate::api::{ApiRequest, Transport};
use crate::error::{HoplaError, RequestError};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Habitica task difficulty, sent as the numeric `priority` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Difficulty {
    Trivial,
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn priority(self) -> f64 {
        match self {
            Difficulty::Trivial => 0.1,
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 2.0,
        }
    }
}

/// Body of `POST /api/v3/tasks/user` for a To-Do.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TodoRequest {
    #[serde(rename = "type")]
    pub task_type: &'static str,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub priority: f64,
}

impl TodoRequest {
    pub fn new(text: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            task_type: "todo",
            text: text.into(),
            notes: None,
            date: None,
            priority: difficulty.priority(),
        }
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn with_due_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date.map(|d| d.format("%Y-%m-%d").to_string());
        self
    }
}

/// The part of the created task we care about.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreatedTask {
    pub id: String,
    pub text: String,
}

/// Parse a due date given as `YYYY-MM-DD`.
pub fn parse_due_date(input: &str) -> Result<NaiveDate, HoplaError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        HoplaError::InvalidArgument(format!(
            "invalid due date '{}', use YYYY-MM-DD (e.g. 2026-03-15)",
            input
        ))
    })
}

pub fn create_todo(
    transport: &(impl Transport + ?Sized),
    todo: &TodoRequest,
) -> Result<CreatedTask, RequestError> {
    let request = ApiRequest::post("/api/v3/tasks/user", todo)?;
    let data = transport.send(&request)?;
    serde_json::from_value(data).map_err(|e| RequestError::MalformedBody(e.to_string()))
}
