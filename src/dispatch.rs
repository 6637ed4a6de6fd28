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

//! Sends compiled searches to the engine and checks the outcome.
//!
//! One attempt per call. A failed call never yields a partial response.

use std::time::Instant;

use serde_json::Value;

use crate::action::Action;
use crate::client::EngineResponse;
use crate::client::SearchClient;
use crate::client::error_text;
use crate::compile::CompiledSearch;
use crate::compile::MultiSearch;
use crate::error::Error;
use crate::error::Result;
use crate::normalize::hits_total;

/// Request bodies longer than this are cut in the log.
pub const MAX_LOGGED_BODY: usize = 4096;

pub struct Dispatcher<'c, C: SearchClient + ?Sized> {
    client: &'c C,
}

impl<'c, C: SearchClient + ?Sized> Dispatcher<'c, C> {
    pub fn new(client: &'c C) -> Self {
        Self { client }
    }

    /// Runs a single search and returns the raw response body.
    pub fn search(&self, search: &CompiledSearch) -> Result<Value> {
        let action = Action::Search(search.clone());
        let started = Instant::now();
        let response = self.run(&action)?;
        tracing::info!(
            uri = %action.uri(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            took = ?took(&response.json),
            total = ?hits_total(&response.json),
            "search result"
        );
        Ok(response.json)
    }

    /// Runs a batch and returns one response body per search, in order.
    pub fn multi_search(&self, batch: &MultiSearch) -> Result<Vec<Value>> {
        let action = Action::MultiSearch(batch.clone());
        let started = Instant::now();
        let response = self.run(&action)?;

        let responses = match response.json {
            Value::Object(mut map) => match map.remove("responses") {
                Some(Value::Array(items)) => items,
                _ => return Err(failure(&action, "response has no responses array")),
            },
            _ => return Err(failure(&action, "response is not a JSON object")),
        };
        if responses.len() != batch.searches.len() {
            return Err(failure(
                &action,
                format!(
                    "expected {} responses, got {}",
                    batch.searches.len(),
                    responses.len()
                ),
            ));
        }
        if let Some((idx, msg)) = responses
            .iter()
            .enumerate()
            .find_map(|(idx, r)| error_text(r).map(|msg| (idx, msg)))
        {
            return Err(failure(&action, format!("sub search {idx}. es msg: {msg}")));
        }

        let took_list: Vec<Option<u64>> = responses.iter().map(took).collect();
        let total_list: Vec<Option<u64>> = responses.iter().map(hits_total).collect();
        tracing::info!(
            uri = %action.uri(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            took = ?took_list,
            total = ?total_list,
            "search result"
        );
        Ok(responses)
    }

    /// Runs an index or document call and reports whether the engine
    /// accepted it. Only transport failures are errors.
    pub fn acknowledge(&self, action: &Action) -> Result<bool> {
        let started = Instant::now();
        let response = self.client.execute(action).map_err(|e| {
            tracing::error!(uri = %action.uri(), "{} failed! {e}", action.name());
            Error::operation(action.name(), e)
        })?;
        if response.succeeded {
            tracing::info!(
                operation = action.name(),
                uri = %action.uri(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "engine accepted"
            );
        } else {
            tracing::warn!(
                operation = action.name(),
                uri = %action.uri(),
                status = response.status,
                error = response.error_message.as_deref().unwrap_or_default(),
                "engine rejected"
            );
        }
        Ok(response.succeeded)
    }

    fn run(&self, action: &Action) -> Result<EngineResponse> {
        let body = action.body().unwrap_or_default();
        tracing::info!(uri = %action.uri(), "search [{}]: {}", action.uri(), truncate_for_log(&body));

        match self.client.execute(action) {
            Ok(response) if response.succeeded => Ok(response),
            Ok(response) => {
                let mut msg = format!("engine returned HTTP {}", response.status);
                if let Some(es_msg) = &response.error_message {
                    msg.push_str(". es msg: ");
                    msg.push_str(es_msg);
                }
                Err(failure(action, msg))
            }
            Err(err) => Err(failure(action, err)),
        }
    }
}

fn failure(action: &Action, msg: impl std::fmt::Display) -> Error {
    tracing::error!(uri = %action.uri(), "search failed! {msg}");
    Error::SearchExecutionFailed(format!("[{}] {msg}", action.uri()))
}

fn took(json: &Value) -> Option<u64> {
    json.get("took").and_then(Value::as_u64)
}

/// Cuts `body` to [`MAX_LOGGED_BODY`] characters, appending `...` when cut.
pub fn truncate_for_log(body: &str) -> String {
    match body.char_indices().nth(MAX_LOGGED_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
