// UI layer: terminal output for the commands. Prompts use `dialoguer`,
// checklist progress is shown with an `indicatif` progress bar.

use crate::checklist::{BatchReport, ItemResult};
use crate::config::RateLimitConfig;
use crate::submitter::Reporter;
use anyhow::Result;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::io::{self, IsTerminal, Write};

/// Ask before a batch that will have to wait on the rate limit. Skipped when
/// `assume_yes` is set or stdin is not a terminal.
pub fn confirm_batch(count: usize, limits: &RateLimitConfig, assume_yes: bool) -> Result<bool> {
    if assume_yes || count <= limits.max_requests as usize || !std::io::stdin().is_terminal() {
        return Ok(true);
    }
    let windows = (count - 1) / limits.max_requests as usize;
    let prompt = format!(
        "{} checklist items exceed the limit of {} requests per {}s; \
         this will take at least {}s. Proceed?",
        count,
        limits.max_requests,
        limits.window_secs,
        windows as u64 * limits.window_secs
    );
    Ok(Confirm::new().with_prompt(prompt).default(true).interact()?)
}

/// Progress bar reporter for interactive checklist uploads.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template("{spinner} [{pos}/{len}] {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        Self { bar }
    }
}

impl Reporter for BarReporter {
    fn item_started(&mut self, index: usize, total: usize, text: &str) {
        self.bar
            .set_message(format!("adding checklist item {}/{}: {}", index, total, text));
    }

    fn item_finished(&mut self, index: usize, total: usize, result: &ItemResult) {
        if let ItemResult::Failed(detail) = result {
            self.bar
                .println(format!("checklist item {}/{} failed: {}", index, total, detail));
        }
        self.bar.inc(1);
    }

    fn finished(&mut self, report: &BatchReport) {
        self.bar.finish_and_clear();
        tracing::debug!(todo_id = report.todo_id(), "checklist job completed");
    }
}

/// Print the per-item failures and the final summary line. Reporters never
/// print the summary themselves.
pub fn print_report(report: &BatchReport) -> Result<()> {
    write_report(&mut io::stdout().lock(), report)?;
    Ok(())
}

fn write_report(out: &mut impl Write, report: &BatchReport) -> io::Result<()> {
    for (line, result) in report.items() {
        if let ItemResult::Failed(detail) = result {
            writeln!(out, "failed: {} ({})", line, detail)?;
        }
    }
    writeln!(out, "{}", report.summary())
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::ChecklistSubmissionJob;

    #[test]
    fn report_lists_failures_then_one_summary() {
        let job = ChecklistSubmissionJob::new("t", vec!["milk".into(), "eggs".into()]).unwrap();
        let report = BatchReport::new(
            job,
            vec![
                ItemResult::Succeeded("1".into()),
                ItemResult::Failed("rate limit exceeded".into()),
            ],
        );
        let mut out = Vec::new();
        write_report(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "failed: eggs (rate limit exceeded)\nadded 1 of 2 items; 1 failed\n"
        );
        assert_eq!(text.matches("added 1 of 2 items").count(), 1);
    }
}
