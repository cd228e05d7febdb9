// API client module: a small blocking HTTP client that talks to the
// Habitica v3 API. Calls are made one at a time; callers that need pacing
// (the checklist submitter) do it on top of `Transport`.

use crate::auth::Credentials;
use crate::config::{Config, MAX_BACKOFF_SECS};
use crate::error::{HoplaError, RequestError};
use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One API call: method, path below the base URL and an optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    /// Build a POST whose body is serialized from a typed payload.
    pub fn post<T: Serialize>(path: impl Into<String>, body: &T) -> Result<Self, RequestError> {
        let body = serde_json::to_value(body)
            .map_err(|e| RequestError::MalformedBody(format!("cannot encode request: {}", e)))?;
        Ok(Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        })
    }
}

/// Anything able to perform one authenticated Habitica request and hand
/// back the `data` member of the response envelope.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<Value, RequestError>;
}

/// The JSON envelope wrapped around every Habitica response.
#[derive(Deserialize, Debug)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Blocking API client holding the reqwest client, the base URL and the
/// default authentication headers.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create an ApiClient from the loaded configuration and credentials.
    /// The per-call timeout is enforced by reqwest.
    pub fn new(config: &Config, credentials: &Credentials) -> anyhow::Result<Self> {
        let headers = auth_headers(credentials, &config.client_name)
            .context("Invalid characters in credentials")?;
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Transport for ApiClient {
    fn send(&self, request: &ApiRequest) -> Result<Value, RequestError> {
        let url = self.url(&request.path);
        tracing::debug!(method = ?request.method, %url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let res = builder.send().map_err(network_error)?;
        let status = res.status().as_u16();
        let retry_after = res
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let txt = res.text().map_err(network_error)?;
        tracing::debug!(status, "received response");

        parse_response(status, retry_after.as_deref(), &txt)
    }
}

fn network_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        RequestError::Network(format!("request timed out: {}", err))
    } else {
        RequestError::Network(err.to_string())
    }
}

/// Build `x-api-user`, `x-api-key` and `x-client` headers.
pub fn auth_headers(credentials: &Credentials, client_name: &str) -> Result<HeaderMap, HoplaError> {
    let mut headers = HeaderMap::new();
    let pairs = [
        ("x-api-user", credentials.user_id.as_str()),
        ("x-api-key", credentials.api_token.as_str()),
        ("x-client", client_name),
    ];
    for (name, value) in pairs {
        let mut value = HeaderValue::from_str(value)
            .map_err(|_| HoplaError::Credentials(format!("{} is not a valid header value", name)))?;
        if name == "x-api-key" {
            value.set_sensitive(true);
        }
        headers.insert(HeaderName::from_static(name), value);
    }
    Ok(headers)
}

/// Turn a raw HTTP status, `Retry-After` header and body into either the
/// envelope's `data` or a `RequestError`.
pub fn parse_response(
    status: u16,
    retry_after: Option<&str>,
    body: &str,
) -> Result<Value, RequestError> {
    if status == 429 {
        let retry_after = retry_after
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs.min(MAX_BACKOFF_SECS)));
        return Err(RequestError::RateLimited { retry_after });
    }

    let envelope: Result<Envelope, _> = serde_json::from_str(body);
    if !(200..300).contains(&status) {
        let message = match envelope {
            Ok(env) => env
                .message
                .or(env.error)
                .unwrap_or_else(|| "no message".into()),
            Err(_) if body.trim().is_empty() => "empty response".into(),
            Err(_) => body.trim().to_string(),
        };
        return Err(RequestError::Api { status, message });
    }

    let envelope = envelope.map_err(|e| RequestError::MalformedBody(e.to_string()))?;
    if !envelope.success {
        return Err(RequestError::Api {
            status,
            message: envelope
                .message
                .or(envelope.error)
                .unwrap_or_else(|| "request was not successful".into()),
        });
    }
    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_yields_data() {
        let data = parse_response(200, None, r#"{"success":true,"data":{"id":"t1"}}"#).unwrap();
        assert_eq!(data, json!({"id": "t1"}));
    }

    #[test]
    fn error_status_carries_server_message() {
        let err = parse_response(
            404,
            None,
            r#"{"success":false,"error":"NotFound","message":"Task not found."}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            RequestError::Api {
                status: 404,
                message: "Task not found.".into()
            }
        );
    }

    #[test]
    fn error_status_with_plain_body() {
        let err = parse_response(502, None, "Bad Gateway\n").unwrap_err();
        assert_eq!(
            err,
            RequestError::Api {
                status: 502,
                message: "Bad Gateway".into()
            }
        );
    }

    #[test]
    fn too_many_requests_reads_retry_after() {
        let err = parse_response(429, Some("12"), "").unwrap_err();
        assert_eq!(
            err,
            RequestError::RateLimited {
                retry_after: Some(Duration::from_secs(12))
            }
        );

        let err = parse_response(429, Some("18446744073709551615"), "").unwrap_err();
        assert_eq!(
            err,
            RequestError::RateLimited {
                retry_after: Some(Duration::from_secs(MAX_BACKOFF_SECS))
            }
        );

        let err = parse_response(429, Some("soon"), "").unwrap_err();
        assert_eq!(err, RequestError::RateLimited { retry_after: None });
    }

    #[test]
    fn unparsable_success_body_is_malformed() {
        let err = parse_response(200, None, "<html>").unwrap_err();
        assert!(matches!(err, RequestError::MalformedBody(_)));
    }

    #[test]
    fn success_flag_false_is_an_api_error() {
        let err = parse_response(200, None, r#"{"success":false,"error":"BadRequest"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            RequestError::Api {
                status: 200,
                message: "BadRequest".into()
            }
        );
    }

    #[test]
    fn post_request_encodes_body() {
        let req = ApiRequest::post("/api/v3/tasks/t1/checklist", &json!({"text": "milk"})).unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.body, Some(json!({"text": "milk"})));
    }

    #[test]
    fn headers_are_built_from_credentials() {
        let creds = Credentials {
            user_id: "user".into(),
            api_token: "token".into(),
        };
        let headers = auth_headers(&creds, "hopla").unwrap();
        assert_eq!(headers["x-api-user"], "user");
        assert_eq!(headers["x-api-key"], "token");
        assert_eq!(headers["x-client"], "hopla");
        assert!(headers["x-api-key"].is_sensitive());
    }

    #[test]
    fn headers_reject_newlines() {
        let creds = Credentials {
            user_id: "user\n".into(),
            api_token: "token".into(),
        };
        assert!(auth_headers(&creds, "hopla").is_err());
    }
}
