// Checklist batch submitter.
//
// Creates one checklist item per line on a To-Do, strictly one call at a
// time and in input order, paced by a `RateLimiter`. A failed item is
// recorded and the batch carries on with the next line. The limiter lives
// as long as the submitter, so every call of one invocation (including the
// To-Do creation that precedes a checklist) shares the same budget.

use crate::api::{ApiRequest, Transport};
use crate::checklist::{checklist_item_id, BatchReport, ChecklistSubmissionJob, ItemResult};
use crate::config::RateLimitConfig;
use crate::error::{RequestError, Result};
use crate::rate_limit::{Clock, RateLimiter};
use crate::tasks::{create_todo, CreatedTask, TodoRequest};
use serde::Serialize;

/// Receives progress notifications while a job runs. Items are numbered
/// from 1.
pub trait Reporter {
    fn item_started(&mut self, index: usize, total: usize, text: &str);
    fn item_finished(&mut self, index: usize, total: usize, result: &ItemResult);
    fn finished(&mut self, report: &BatchReport);
}

/// Reporter that only writes through `tracing`.
#[derive(Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn item_started(&mut self, index: usize, total: usize, text: &str) {
        tracing::info!("adding checklist item {}/{}: {}", index, total, text);
    }

    fn item_finished(&mut self, index: usize, total: usize, result: &ItemResult) {
        match result {
            ItemResult::Succeeded(id) => {
                tracing::debug!("checklist item {}/{} created with id {}", index, total, id)
            }
            ItemResult::Failed(detail) => {
                tracing::warn!("checklist item {}/{} failed: {}", index, total, detail)
            }
        }
    }

    fn finished(&mut self, report: &BatchReport) {
        tracing::debug!(todo_id = report.todo_id(), "checklist job completed");
    }
}

#[derive(Serialize)]
struct ChecklistItemRequest<'a> {
    text: &'a str,
}

pub struct ChecklistSubmitter<'a, T: Transport + ?Sized> {
    transport: &'a T,
    limiter: RateLimiter<'a>,
}

impl<'a, T: Transport + ?Sized> ChecklistSubmitter<'a, T> {
    pub fn new(transport: &'a T, clock: &'a dyn Clock, limits: RateLimitConfig) -> Self {
        Self::with_limiter(transport, RateLimiter::new(&limits, clock))
    }

    pub fn with_limiter(transport: &'a T, limiter: RateLimiter<'a>) -> Self {
        Self { transport, limiter }
    }

    /// Create a To-Do through the same limiter that paces its checklist.
    pub fn create_todo(
        &mut self,
        todo: &TodoRequest,
    ) -> std::result::Result<CreatedTask, RequestError> {
        self.limiter.acquire();
        let created = create_todo(self.transport, todo);
        if let Err(err) = &created {
            self.back_off_if_limited(err);
        }
        created
    }

    /// Add every line as a checklist item of `todo_id`.
    ///
    /// Fails with `InvalidJob` before any network call when the id is blank
    /// or there is nothing to add. Otherwise always returns one result per
    /// line. Not idempotent: submitting the same lines twice creates
    /// duplicate checklist items, since each call is a creation.
    pub fn submit(
        &mut self,
        todo_id: &str,
        lines: Vec<String>,
        reporter: &mut dyn Reporter,
    ) -> Result<BatchReport> {
        let job = ChecklistSubmissionJob::new(todo_id, lines)?;
        Ok(self.run(job, reporter))
    }

    /// Run an already validated job to completion.
    pub fn run(&mut self, job: ChecklistSubmissionJob, reporter: &mut dyn Reporter) -> BatchReport {
        let total = job.len();
        let endpoint = job.endpoint();
        let mut results = Vec::with_capacity(total);
        tracing::debug!(todo_id = job.todo_id(), total, "checklist job running");

        for (i, line) in job.lines().iter().enumerate() {
            let index = i + 1;
            self.limiter.acquire();
            reporter.item_started(index, total, line);

            let result = match self.add_item(&endpoint, line) {
                Ok(id) => ItemResult::Succeeded(id),
                Err(err) => {
                    self.back_off_if_limited(&err);
                    ItemResult::Failed(err.to_string())
                }
            };

            reporter.item_finished(index, total, &result);
            results.push(result);
        }

        let report = BatchReport::new(job, results);
        reporter.finished(&report);
        report
    }

    fn back_off_if_limited(&mut self, err: &RequestError) {
        if let RequestError::RateLimited { retry_after } = err {
            let pause = retry_after.unwrap_or_else(|| self.limiter.default_backoff());
            tracing::warn!(
                "server rejected request for rate limiting, backing off {}s",
                pause.as_secs()
            );
            self.limiter.back_off(pause);
        }
    }

    fn add_item(&self, endpoint: &str, text: &str) -> std::result::Result<String, RequestError> {
        let request = ApiRequest::post(endpoint, &ChecklistItemRequest { text })?;
        let task = self.transport.send(&request)?;
        checklist_item_id(&task, text)
    }
}
