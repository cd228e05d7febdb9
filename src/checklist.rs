// Checklist data model: input lines, the batch job and its per-item results.

use crate::error::{HoplaError, RequestError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Split checklist file content into lines, trimming each and dropping blank
/// ones. Order is preserved.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a checklist file and return its non-blank lines.
pub fn read_checklist_file(path: &Path) -> Result<Vec<String>> {
    if !path.is_absolute() {
        return Err(HoplaError::InvalidJob(format!(
            "checklist file must be an absolute path, got {}",
            path.display()
        )));
    }
    let content = fs::read_to_string(path)?;
    Ok(parse_lines(&content))
}

/// One invocation's worth of checklist items for a single To-Do.
///
/// Construction validates everything that would otherwise make the batch
/// fail before its first call; a built job never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistSubmissionJob {
    todo_id: String,
    lines: Vec<String>,
}

impl ChecklistSubmissionJob {
    pub fn new(todo_id: impl Into<String>, lines: Vec<String>) -> Result<Self> {
        let todo_id = todo_id.into().trim().to_string();
        if todo_id.is_empty() {
            return Err(HoplaError::InvalidJob("missing To-Do identifier".into()));
        }
        if lines.is_empty() {
            return Err(HoplaError::InvalidJob("no checklist items given".into()));
        }
        if let Some(pos) = lines.iter().position(|l| l.trim().is_empty()) {
            return Err(HoplaError::InvalidJob(format!(
                "checklist line {} is blank",
                pos + 1
            )));
        }
        Ok(Self { todo_id, lines })
    }

    pub fn todo_id(&self) -> &str {
        &self.todo_id
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// API path for adding one checklist item to this job's To-Do.
    pub fn endpoint(&self) -> String {
        format!("/api/v3/tasks/{}/checklist", self.todo_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemResult {
    /// Server assigned id of the new checklist item.
    Succeeded(String),
    /// Short diagnostic of why the item was not created.
    Failed(String),
}

impl ItemResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemResult::Succeeded(_))
    }
}

/// Results of a finished job, one per input line and in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    todo_id: String,
    lines: Vec<String>,
    results: Vec<ItemResult>,
}

impl BatchReport {
    pub(crate) fn new(job: ChecklistSubmissionJob, results: Vec<ItemResult>) -> Self {
        debug_assert_eq!(job.lines.len(), results.len());
        Self {
            todo_id: job.todo_id,
            lines: job.lines,
            results,
        }
    }

    pub fn todo_id(&self) -> &str {
        &self.todo_id
    }

    pub fn results(&self) -> &[ItemResult] {
        &self.results
    }

    /// Pairs of (line, result).
    pub fn items(&self) -> impl Iterator<Item = (&str, &ItemResult)> {
        self.lines.iter().map(String::as_str).zip(self.results.iter())
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn summary(&self) -> String {
        format!(
            "added {} of {} items; {} failed",
            self.succeeded(),
            self.total(),
            self.failed()
        )
    }

    /// 0 when every item was created, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.failed() == 0 {
            0
        } else {
            1
        }
    }
}

/// Pull the id of the freshly added item out of the task returned by the
/// checklist endpoint. New items are appended, so the last entry with a
/// matching text is ours; the last entry overall is the fallback.
pub fn checklist_item_id(task: &Value, text: &str) -> std::result::Result<String, RequestError> {
    let checklist = task
        .get("checklist")
        .and_then(Value::as_array)
        .ok_or_else(|| RequestError::MalformedBody("response has no checklist".into()))?;

    let item = checklist
        .iter()
        .rev()
        .find(|item| item.get("text").and_then(Value::as_str) == Some(text))
        .or_else(|| checklist.last())
        .ok_or_else(|| RequestError::MalformedBody("checklist in response is empty".into()))?;

    item.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RequestError::MalformedBody("checklist item has no id".into()))
}
