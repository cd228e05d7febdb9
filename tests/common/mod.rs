//! Common test utilities for integration tests

#![allow(dead_code)]

use hopla::api::{ApiRequest, Transport};
use hopla::checklist::{BatchReport, ItemResult};
use hopla::rate_limit::Clock;
use hopla::submitter::Reporter;
use hopla::RequestError;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Clock that only moves when slept on or advanced explicitly.
pub struct FakeClock {
    start: Instant,
    elapsed: Cell<Duration>,
    pub sleeps: RefCell<Vec<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    pub fn advance(&self, d: Duration) {
        self.elapsed.set(self.elapsed.get() + d);
    }

    /// Time since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed.get()
    }

    fn sleep(&self, d: Duration) {
        self.sleeps.borrow_mut().push(d);
        self.advance(d);
    }
}

/// Transport answering checklist calls like Habitica does, with scripted
/// failures for chosen call numbers (1-based). Each call takes
/// `call_duration` of fake time.
pub struct FakeTransport<'c> {
    clock: &'c FakeClock,
    call_duration: Duration,
    failures: HashMap<usize, RequestError>,
    pub calls: RefCell<Vec<(Duration, ApiRequest)>>,
}

impl<'c> FakeTransport<'c> {
    pub fn new(clock: &'c FakeClock) -> Self {
        Self {
            clock,
            call_duration: Duration::ZERO,
            failures: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_call_duration(mut self, d: Duration) -> Self {
        self.call_duration = d;
        self
    }

    pub fn fail_call(mut self, call: usize, err: RequestError) -> Self {
        self.failures.insert(call, err);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Fake-time offsets at which calls were issued.
    pub fn call_times(&self) -> Vec<Duration> {
        self.calls.borrow().iter().map(|(t, _)| *t).collect()
    }

    /// The `text` field of each request body, in call order.
    pub fn texts(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|(_, req)| req.body.as_ref())
            .filter_map(|body| body.get("text").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }
}

impl Transport for FakeTransport<'_> {
    fn send(&self, request: &ApiRequest) -> Result<Value, RequestError> {
        self.calls
            .borrow_mut()
            .push((self.clock.elapsed(), request.clone()));
        let call = self.call_count();
        self.clock.advance(self.call_duration);

        if let Some(err) = self.failures.get(&call) {
            return Err(err.clone());
        }

        let text = request
            .body
            .as_ref()
            .and_then(|b| b.get("text"))
            .cloned()
            .unwrap_or(Value::Null);
        Ok(json!({
            "id": "todo-1",
            "type": "todo",
            "text": text.clone(),
            "checklist": [
                {"id": "earlier-item", "text": "already there", "completed": false},
                {"id": format!("item-{}", call), "text": text, "completed": false}
            ]
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Started(usize, usize, String),
    Finished(usize, usize, ItemResult),
    Done(String),
}

#[derive(Default)]
pub struct RecordingReporter {
    pub events: Vec<Event>,
}

impl Reporter for RecordingReporter {
    fn item_started(&mut self, index: usize, total: usize, text: &str) {
        self.events.push(Event::Started(index, total, text.to_string()));
    }

    fn item_finished(&mut self, index: usize, total: usize, result: &ItemResult) {
        self.events.push(Event::Finished(index, total, result.clone()));
    }

    fn finished(&mut self, report: &BatchReport) {
        self.events.push(Event::Done(report.summary()));
    }
}

pub fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Transport that answers every request with the same canned result.
pub struct CannedTransport {
    response: Result<Value, RequestError>,
    pub requests: RefCell<Vec<ApiRequest>>,
}

impl CannedTransport {
    pub fn ok(data: Value) -> Self {
        Self {
            response: Ok(data),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn err(err: RequestError) -> Self {
        Self {
            response: Err(err),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl Transport for CannedTransport {
    fn send(&self, request: &ApiRequest) -> Result<Value, RequestError> {
        self.requests.borrow_mut().push(request.clone());
        self.response.clone()
    }
}
