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

//! Calls understood by a [`crate::client::SearchClient`].
//!
//! An action knows its HTTP method, its endpoint relative to the engine
//! root, and its request payload. Multi-search and bulk payloads are
//! newline-delimited JSON.

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::compile::CompiledSearch;
use crate::compile::MultiSearch;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Identifies one stored document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocRef {
    pub index: String,
    pub doc_type: String,
    pub id: String,
}

impl DocRef {
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
            id: id.into(),
        }
    }

    fn meta(&self) -> Value {
        json!({ "_index": self.index, "_type": self.doc_type, "_id": self.id })
    }
}

/// One operation inside a bulk request.
#[derive(Clone, Debug, PartialEq)]
pub enum BulkOp {
    Index { target: DocRef, source: Value },
    /// `payload` is sent as given, e.g. `{"doc": {...}}` or a script.
    Update { target: DocRef, payload: Value },
    Delete { target: DocRef },
}

impl BulkOp {
    fn push_lines(&self, lines: &mut Vec<String>) {
        match self {
            BulkOp::Index { target, source } => {
                lines.push(json!({ "index": target.meta() }).to_string());
                lines.push(source.to_string());
            }
            BulkOp::Update { target, payload } => {
                lines.push(json!({ "update": target.meta() }).to_string());
                lines.push(payload.to_string());
            }
            BulkOp::Delete { target } => {
                lines.push(json!({ "delete": target.meta() }).to_string());
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Search(CompiledSearch),
    MultiSearch(MultiSearch),
    Get(DocRef),
    MultiGet(Vec<DocRef>),
    CreateIndex {
        index: String,
        settings: Option<Value>,
    },
    IndexExists {
        index: String,
    },
    DeleteIndex {
        index: String,
    },
    PutMapping {
        index: String,
        doc_type: String,
        mapping: Value,
    },
    IndexDoc {
        index: String,
        doc_type: String,
        id: Option<String>,
        source: Value,
    },
    Bulk(Vec<BulkOp>),
    DeleteByQuery {
        index: String,
        doc_type: String,
        query: Value,
    },
}

impl Action {
    /// Short label used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Search(_) => "search",
            Action::MultiSearch(_) => "multi search",
            Action::Get(_) => "get",
            Action::MultiGet(_) => "multi get",
            Action::CreateIndex { .. } => "createIndex",
            Action::IndexExists { .. } => "existsIndex",
            Action::DeleteIndex { .. } => "deleteIndex",
            Action::PutMapping { .. } => "createMapping",
            Action::IndexDoc { .. } => "saveDoc",
            Action::Bulk(_) => "bulk",
            Action::DeleteByQuery { .. } => "deleteByQuery",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Action::Search(_)
            | Action::MultiSearch(_)
            | Action::MultiGet(_)
            | Action::Bulk(_)
            | Action::DeleteByQuery { .. } => Method::Post,
            Action::Get(_) => Method::Get,
            Action::IndexExists { .. } => Method::Head,
            Action::DeleteIndex { .. } => Method::Delete,
            Action::CreateIndex { .. } | Action::PutMapping { .. } => Method::Put,
            Action::IndexDoc { id, .. } => {
                if id.is_some() {
                    Method::Put
                } else {
                    Method::Post
                }
            }
        }
    }

    /// Endpoint path relative to the engine root, without a leading slash.
    /// Segments are joined unencoded; this form is for logs and messages.
    pub fn uri(&self) -> String {
        self.path_segments().join("/")
    }

    /// Raw path segments of the endpoint. The HTTP client percent-encodes
    /// each one, so index names and ids are never split or cut short.
    pub fn path_segments(&self) -> Vec<String> {
        match self {
            Action::Search(search) => scoped(&search.indices, &search.types, "_search"),
            Action::MultiSearch(_) => segments(["_msearch"]),
            Action::Get(doc) => segments([doc.index.as_str(), doc.doc_type.as_str(), doc.id.as_str()]),
            Action::MultiGet(_) => segments(["_mget"]),
            Action::CreateIndex { index, .. }
            | Action::IndexExists { index }
            | Action::DeleteIndex { index } => segments([index.as_str()]),
            Action::PutMapping {
                index, doc_type, ..
            } => segments([index.as_str(), "_mapping", doc_type.as_str()]),
            Action::IndexDoc {
                index,
                doc_type,
                id,
                ..
            } => match id {
                Some(id) => segments([index.as_str(), doc_type.as_str(), id.as_str()]),
                None => segments([index.as_str(), doc_type.as_str()]),
            },
            Action::Bulk(_) => segments(["_bulk"]),
            Action::DeleteByQuery {
                index, doc_type, ..
            } => segments([index.as_str(), doc_type.as_str(), "_delete_by_query"]),
        }
    }

    /// Whether [`Action::body`] is newline-delimited JSON.
    pub fn is_ndjson(&self) -> bool {
        matches!(self, Action::MultiSearch(_) | Action::Bulk(_))
    }

    pub fn body(&self) -> Option<String> {
        match self {
            Action::Search(search) => Some(search.body.to_string()),
            Action::MultiSearch(batch) => {
                let mut lines = Vec::with_capacity(batch.searches.len() * 2);
                for search in &batch.searches {
                    lines.push(msearch_header(search).to_string());
                    lines.push(search.body.to_string());
                }
                Some(ndjson(lines))
            }
            Action::MultiGet(docs) => {
                let docs: Vec<Value> = docs.iter().map(DocRef::meta).collect();
                Some(json!({ "docs": docs }).to_string())
            }
            Action::CreateIndex { settings, .. } => settings
                .as_ref()
                .map(|s| json!({ "settings": s }).to_string()),
            Action::PutMapping { mapping, .. } => Some(mapping.to_string()),
            Action::IndexDoc { source, .. } => Some(source.to_string()),
            Action::Bulk(ops) => {
                let mut lines = Vec::new();
                for op in ops {
                    op.push_lines(&mut lines);
                }
                Some(ndjson(lines))
            }
            Action::DeleteByQuery { query, .. } => Some(query.to_string()),
            Action::Get(_) | Action::IndexExists { .. } | Action::DeleteIndex { .. } => None,
        }
    }
}

fn scoped(indices: &[String], types: &[String], endpoint: &str) -> Vec<String> {
    let mut parts = Vec::new();
    if !indices.is_empty() {
        parts.push(indices.join(","));
        if !types.is_empty() {
            parts.push(types.join(","));
        }
    } else if !types.is_empty() {
        parts.push("_all".to_string());
        parts.push(types.join(","));
    }
    parts.push(endpoint.to_string());
    parts
}

fn segments<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

fn msearch_header(search: &CompiledSearch) -> Value {
    let mut header = Map::new();
    if !search.indices.is_empty() {
        header.insert("index".to_string(), json!(search.indices));
    }
    if !search.types.is_empty() {
        header.insert("type".to_string(), json!(search.types));
    }
    Value::Object(header)
}

fn ndjson(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
