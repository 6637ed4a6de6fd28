// Copyright 2026 Sift Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The search client seam and its HTTP implementation.
//!
//! Everything above this module talks to the engine only through
//! [`SearchClient::execute`]. The client is built explicitly by the caller
//! and handed around by reference; there is no process-wide instance.

use std::sync::RwLock;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::action::Action;
use crate::action::Method;
use crate::config::Config;
use crate::error::Error;
use crate::error::Result;

/// Outcome of one engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineResponse {
    pub status: u16,
    pub succeeded: bool,
    pub error_message: Option<String>,
    pub json: Value,
}

impl EngineResponse {
    pub fn from_parts(status: u16, body: &str) -> Self {
        let json = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
        };
        let mut succeeded = (200..300).contains(&status);
        let mut error_message = None;
        if !succeeded {
            error_message = Some(error_text(&json).unwrap_or_else(|| format!("HTTP {status}")));
        } else if json.get("errors").and_then(Value::as_bool) == Some(true) {
            succeeded = false;
            error_message = Some("one or more bulk items failed".to_string());
        }
        Self {
            status,
            succeeded,
            error_message,
            json,
        }
    }

    pub fn ok(json: Value) -> Self {
        Self {
            status: 200,
            succeeded: true,
            error_message: None,
            json,
        }
    }
}

/// Pulls a readable message out of an engine error body.
pub fn error_text(json: &Value) -> Option<String> {
    match json.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(err) => {
            let reason = err.get("reason").and_then(Value::as_str);
            let kind = err.get("type").and_then(Value::as_str);
            match (kind, reason) {
                (Some(kind), Some(reason)) => Some(format!("{kind}: {reason}")),
                (None, Some(reason)) => Some(reason.to_string()),
                _ => Some(Value::Object(err.clone()).to_string()),
            }
        }
        other => Some(other.to_string()),
    }
}

pub trait SearchClient: Send + Sync {
    /// Runs one action. Transport failures are errors; engine-side failures
    /// come back as a response with `succeeded == false`.
    fn execute(&self, action: &Action) -> Result<EngineResponse>;

    /// Releases the underlying connection pool. Later calls fail with
    /// [`Error::ClientClosed`].
    fn shutdown(&self);
}

pub struct HttpSearchClient {
    inner: RwLock<Option<Client>>,
    hosts: Vec<Url>,
    next: AtomicUsize,
}

impl HttpSearchClient {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.read_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;
        let hosts = config
            .hosts
            .iter()
            .map(|h| h.trim().trim_end_matches('/'))
            .filter(|h| !h.is_empty())
            .map(parse_host)
            .collect::<Result<Vec<_>>>()?;
        if hosts.is_empty() {
            return Err(Error::Config("at least one host is required".to_string()));
        }
        Ok(Self {
            inner: RwLock::new(Some(client)),
            hosts,
            next: AtomicUsize::new(0),
        })
    }

    fn host(&self) -> &Url {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.hosts.len();
        &self.hosts[idx]
    }

    /// Full URL of `action` on the next host. Each path segment is
    /// percent-encoded, so ids may contain `/`, `?` or `#`.
    fn url_for(&self, action: &Action) -> Result<Url> {
        let mut url = self.host().clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config("host URL can't take a path".to_string()))?
            .pop_if_empty()
            .extend(action.path_segments());
        Ok(url)
    }

    fn client(&self) -> Result<Client> {
        let guard = self.inner.read().map_err(|_| Error::ClientClosed)?;
        guard.as_ref().cloned().ok_or(Error::ClientClosed)
    }
}

impl SearchClient for HttpSearchClient {
    fn execute(&self, action: &Action) -> Result<EngineResponse> {
        let client = self.client()?;
        let url = self.url_for(action)?;
        tracing::debug!(method = action.method().as_str(), %url, "engine request");

        let mut request = client.request(http_method(action.method()), url);
        if let Some(body) = action.body() {
            let content_type = if action.is_ndjson() {
                "application/x-ndjson"
            } else {
                "application/json"
            };
            request = request.header(CONTENT_TYPE, content_type).body(body);
        }
        let response = request.send()?;
        let status = response.status().as_u16();
        let text = response.text()?;
        Ok(EngineResponse::from_parts(status, &text))
    }

    fn shutdown(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.take();
        }
    }
}

fn parse_host(host: &str) -> Result<Url> {
    let url = Url::parse(host).map_err(|e| Error::Config(format!("invalid host {host:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::Config(format!(
            "invalid host {host:?}: expected a URL like http://localhost:9200"
        )));
    }
    Ok(url)
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_response() {
        let resp = EngineResponse::from_parts(200, r#"{"took": 3}"#);
        assert!(resp.succeeded);
        assert_eq!(resp.error_message, None);
        assert_eq!(resp.json, json!({"took": 3}));
    }

    #[test]
    fn engine_error_message() {
        let resp = EngineResponse::from_parts(
            400,
            r#"{"error": {"type": "parsing_exception", "reason": "bad query"}, "status": 400}"#,
        );
        assert!(!resp.succeeded);
        assert_eq!(
            resp.error_message.as_deref(),
            Some("parsing_exception: bad query")
        );
    }

    #[test]
    fn empty_failure_body() {
        let resp = EngineResponse::from_parts(404, "");
        assert!(!resp.succeeded);
        assert_eq!(resp.json, Value::Null);
        assert_eq!(resp.error_message.as_deref(), Some("HTTP 404"));
    }

    #[test]
    fn bulk_item_errors_fail() {
        let resp = EngineResponse::from_parts(200, r#"{"errors": true, "items": []}"#);
        assert!(!resp.succeeded);
    }

    #[test]
    fn shut_down_client_refuses_calls() {
        let client = HttpSearchClient::new(&Config::default()).expect("client");
        client.shutdown();
        let action = Action::IndexExists {
            index: "books".into(),
        };
        assert!(matches!(client.execute(&action), Err(Error::ClientClosed)));
    }

    fn config_with_hosts(hosts: &[&str]) -> Config {
        Config {
            hosts: hosts.iter().map(|h| h.to_string()).collect(),
            ..Config::default()
        }
    }

    #[test]
    fn slash_only_host_is_rejected() {
        let result = HttpSearchClient::new(&config_with_hosts(&["/"]));
        assert!(matches!(result, Err(Error::Config(_))));
        let result = HttpSearchClient::new(&config_with_hosts(&[" ", "//"]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn host_without_scheme_is_rejected() {
        let result = HttpSearchClient::new(&config_with_hosts(&["localhost:9200"]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn path_segments_are_encoded() {
        let client =
            HttpSearchClient::new(&config_with_hosts(&["http://localhost:9200/"])).expect("client");
        let action = Action::Get(crate::action::DocRef::new("books", "book", "a?b/c#d"));
        assert_eq!(
            client.url_for(&action).unwrap().as_str(),
            "http://localhost:9200/books/book/a%3Fb%2Fc%23d"
        );
    }

    #[test]
    fn host_prefix_is_kept() {
        let client =
            HttpSearchClient::new(&config_with_hosts(&["http://proxy:8080/es/"])).expect("client");
        let action = Action::IndexExists {
            index: "books".into(),
        };
        assert_eq!(
            client.url_for(&action).unwrap().as_str(),
            "http://proxy:8080/es/books"
        );
    }
}
