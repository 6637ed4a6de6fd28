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

//! Engine query DSL: leaf predicates, the bool query, and the search body
//! builder that carries sort, highlight and paging.

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::model::Clause;
use crate::model::SortDir;

#[derive(Clone, Debug, PartialEq)]
pub enum QueryNode {
    MatchAll,
    Term { field: String, value: String },
    Prefix { field: String, value: String },
    QueryString { default_field: String, query: String },
    Match { field: String, query: String },
    MatchPhrase { field: String, query: String },
    MultiMatch { fields: Vec<String>, query: String },
    Wildcard { field: String, value: String },
    Regexp { field: String, value: String },
    /// Both bounds are exclusive.
    Range { field: String, gt: String, lt: String },
    Bool(BoolQuery),
}

impl QueryNode {
    pub fn to_json(&self) -> Value {
        match self {
            QueryNode::MatchAll => json!({ "match_all": {} }),
            QueryNode::Term { field, value } => keyed("term", field, json!({ "value": value })),
            QueryNode::Prefix { field, value } => {
                keyed("prefix", field, json!({ "value": value }))
            }
            QueryNode::QueryString {
                default_field,
                query,
            } => json!({
                "query_string": {
                    "query": query,
                    "default_field": default_field,
                }
            }),
            QueryNode::Match { field, query } => keyed("match", field, json!({ "query": query })),
            QueryNode::MatchPhrase { field, query } => {
                keyed("match_phrase", field, json!({ "query": query }))
            }
            QueryNode::MultiMatch { fields, query } => json!({
                "multi_match": {
                    "query": query,
                    "fields": fields,
                }
            }),
            QueryNode::Wildcard { field, value } => {
                keyed("wildcard", field, json!({ "value": value }))
            }
            QueryNode::Regexp { field, value } => {
                keyed("regexp", field, json!({ "value": value }))
            }
            QueryNode::Range { field, gt, lt } => {
                keyed("range", field, json!({ "gt": gt, "lt": lt }))
            }
            QueryNode::Bool(b) => b.to_json(),
        }
    }
}

fn keyed(kind: &str, field: &str, body: Value) -> Value {
    let mut inner = Map::new();
    inner.insert(field.to_string(), body);
    let mut outer = Map::new();
    outer.insert(kind.to_string(), Value::Object(inner));
    Value::Object(outer)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoolQuery {
    must: Vec<QueryNode>,
    should: Vec<QueryNode>,
    must_not: Vec<QueryNode>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, node: QueryNode) -> Self {
        self.must.push(node);
        self
    }

    pub fn should(mut self, node: QueryNode) -> Self {
        self.should.push(node);
        self
    }

    pub fn must_not(mut self, node: QueryNode) -> Self {
        self.must_not.push(node);
        self
    }

    pub fn add(self, clause: Clause, node: QueryNode) -> Self {
        match clause {
            Clause::Must => self.must(node),
            Clause::Should => self.should(node),
            Clause::MustNot => self.must_not(node),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        for (key, nodes) in [
            ("must", &self.must),
            ("should", &self.should),
            ("must_not", &self.must_not),
        ] {
            if !nodes.is_empty() {
                body.insert(
                    key.to_string(),
                    Value::Array(nodes.iter().map(QueryNode::to_json).collect()),
                );
            }
        }
        json!({ "bool": Value::Object(body) })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SortField {
    field: String,
    dir: SortDir,
}

impl SortField {
    pub fn new(field: impl Into<String>, dir: SortDir) -> Self {
        Self {
            field: field.into(),
            dir,
        }
    }

    pub fn to_json(&self) -> Value {
        keyed_value(&self.field, json!({ "order": self.dir.as_str() }))
    }
}

fn keyed_value(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Highlight {
    field: String,
    pre_tag: String,
    post_tag: String,
}

impl Highlight {
    pub fn new(field: impl Into<String>, pre_tag: impl Into<String>, post_tag: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pre_tag: pre_tag.into(),
            post_tag: post_tag.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "pre_tags": [self.pre_tag],
            "post_tags": [self.post_tag],
            "fields": keyed_value(&self.field, json!({})),
        })
    }
}

/// Builds a search request body.
///
/// Starts either from a query node or from an existing JSON object (raw
/// queries), and overlays paging, sort and highlight keys.
#[derive(Clone, Debug)]
pub struct SearchSourceBuilder {
    base: Map<String, Value>,
    query: Option<QueryNode>,
    from: Option<u64>,
    size: Option<u32>,
    sort: Vec<SortField>,
    highlight: Option<Highlight>,
}

impl SearchSourceBuilder {
    pub fn new() -> Self {
        Self::from_object(Map::new())
    }

    pub fn from_object(base: Map<String, Value>) -> Self {
        Self {
            base,
            query: None,
            from: None,
            size: None,
            sort: Vec::new(),
            highlight: None,
        }
    }

    pub fn query(mut self, query: QueryNode) -> Self {
        self.query = Some(query);
        self
    }

    pub fn from(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn sort(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = Some(highlight);
        self
    }

    pub fn build(self) -> Value {
        let mut body = self.base;
        if let Some(from) = self.from {
            body.insert("from".to_string(), json!(from));
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        if let Some(query) = self.query {
            body.insert("query".to_string(), query.to_json());
        }
        if !self.sort.is_empty() {
            body.insert(
                "sort".to_string(),
                Value::Array(self.sort.iter().map(SortField::to_json).collect()),
            );
        }
        if let Some(highlight) = self.highlight {
            body.insert("highlight".to_string(), highlight.to_json());
        }
        Value::Object(body)
    }
}

impl Default for SearchSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
