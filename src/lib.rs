// Library root
// -----------
// This crate exposes the library surface behind the `hopla` CLI. The binary
// (`main.rs`) parses arguments and wires these modules together.
//
// Module responsibilities:
// - `api`: HTTP interaction with the Habitica API (`Transport`, `ApiClient`).
// - `auth`: locating and reading the user's credentials.
// - `config`: defaults and the optional `config.toml`.
// - `checklist`: checklist lines, the batch job and its report.
// - `rate_limit`: client side pacing of API calls.
// - `submitter`: the rate limited checklist batch submitter.
// - `tasks` / `user`: single-call commands.
// - `ui`: prompts, progress and printing.
pub mod api;
pub mod auth;
pub mod checklist;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod submitter;
pub mod tasks;
pub mod ui;
pub mod user;

pub use error::{HoplaError, RequestError};
