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

//! Search request compiler, dispatcher and result normalizer for
//! Elasticsearch-style engines.
//!
//! A [`SearchRequest`] is compiled into an engine query body, sent through a
//! [`SearchClient`], and the response is reshaped into a
//! [`CanonicalResult`]. [`Searcher`] wires the three steps together;
//! [`IndexAdmin`] and [`DocumentWriter`] pass index and document calls
//! through the same client.

pub mod action;
pub mod client;
pub mod compile;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod dsl;
pub mod error;
pub mod index;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod output;
pub mod search;

pub use client::EngineResponse;
pub use client::HttpSearchClient;
pub use client::SearchClient;
pub use compile::CompiledSearch;
pub use compile::MultiSearch;
pub use compile::compile;
pub use compile::compile_batch;
pub use config::Config;
pub use document::DocumentWriter;
pub use document::Identified;
pub use error::Error;
pub use error::Result;
pub use index::IndexAdmin;
pub use model::ClauseGroup;
pub use model::FieldClause;
pub use model::HighlightSpec;
pub use model::MatchMode;
pub use model::OrderSpec;
pub use model::PageSpec;
pub use model::SearchRequest;
pub use output::CanonicalResult;
pub use output::SearchListing;
pub use search::Searcher;
