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

//! Error types shared by the compiler, dispatcher and client.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or empty request input. Raised before anything is sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The engine rejected the search or the transport failed.
    #[error("search failed! {0}")]
    SearchExecutionFailed(String),

    /// An index or document call failed at the transport level.
    #[error("{operation} failed! {message}")]
    Operation { operation: String, message: String },

    #[error("search client is shut down")]
    ClientClosed,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn operation(operation: &str, err: impl std::fmt::Display) -> Self {
        Self::Operation {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }

    /// Stable machine-readable name, used in the CLI's JSON error output.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidRequest(_) => "invalid_request",
            Error::SearchExecutionFailed(_) => "search_failed",
            Error::Operation { .. } => "operation_failed",
            Error::ClientClosed => "client_closed",
            Error::Config(_) => "config",
            Error::Http(_) => "http",
            Error::Json(_) => "json",
            Error::Io(_) => "io",
        }
    }
}
