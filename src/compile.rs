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

//! Compiles a [`SearchRequest`] into an engine search body.
//!
//! Compilation is pure: it reads the request, never mutates it, and never
//! talks to the engine.

use serde_json::Value;

use crate::dsl::BoolQuery;
use crate::dsl::Highlight;
use crate::dsl::QueryNode;
use crate::dsl::SearchSourceBuilder;
use crate::dsl::SortField;
use crate::error::Error;
use crate::error::Result;
use crate::model::FieldClause;
use crate::model::MatchMode;
use crate::model::SearchRequest;
use crate::model::scalar_text;

/// A compiled search bound to its index/type scope.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSearch {
    pub indices: Vec<String>,
    pub types: Vec<String>,
    pub body: Value,
}

/// Several compiled searches sent as one batch, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSearch {
    pub searches: Vec<CompiledSearch>,
}

pub fn compile(request: &SearchRequest) -> Result<CompiledSearch> {
    let builder = match &request.raw_query {
        Some(raw) => raw_builder(raw)?,
        None => SearchSourceBuilder::new().query(build_query(request)?),
    };
    let builder = apply_order(request, builder);
    let builder = apply_page(request, builder);
    let builder = apply_highlight(request, builder)?;

    Ok(CompiledSearch {
        indices: request.index_names.clone(),
        types: request.index_types.clone(),
        body: builder.build(),
    })
}

pub fn compile_batch(requests: &[SearchRequest]) -> Result<MultiSearch> {
    let searches = requests.iter().map(compile).collect::<Result<Vec<_>>>()?;
    Ok(MultiSearch { searches })
}

fn raw_builder(raw: &str) -> Result<SearchSourceBuilder> {
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|e| Error::invalid(format!("raw query is not valid JSON: {e}")))?;
    match parsed {
        Value::Object(map) => Ok(SearchSourceBuilder::from_object(map)),
        _ => Err(Error::invalid("raw query must be a JSON object")),
    }
}

/// Builds the bool query from the clause group.
pub fn build_query(request: &SearchRequest) -> Result<QueryNode> {
    let clauses = &request.clauses;
    if clauses.is_empty() {
        return Err(Error::invalid("search field can't be empty"));
    }

    if clauses.has_match_all() {
        return Ok(QueryNode::Bool(BoolQuery::new().must(QueryNode::MatchAll)));
    }

    let mut query = BoolQuery::new();
    for (clause, field) in clauses.all_clauses() {
        if let Some(node) = clause_node(field, request.match_value.as_ref())? {
            query = query.add(clause, node);
        }
    }
    Ok(QueryNode::Bool(query))
}

/// Translates one clause. Returns `None` for a multi-match clause whose
/// field list has no comma.
fn clause_node(field: &FieldClause, fallback: Option<&Value>) -> Result<Option<QueryNode>> {
    let raw = field
        .value
        .as_ref()
        .or(fallback)
        .map(scalar_text)
        .unwrap_or_default();
    let val = raw.to_lowercase();
    let name = field.field_name.clone();

    if name.is_empty() && field.match_mode != MatchMode::MatchAll {
        return Err(Error::invalid("field name is required"));
    }

    let node = match field.match_mode {
        MatchMode::Term => QueryNode::Term { field: name, value: val },
        MatchMode::Prefix => QueryNode::Prefix { field: name, value: val },
        MatchMode::QueryString => QueryNode::QueryString {
            default_field: name,
            query: val,
        },
        MatchMode::Match => QueryNode::Match { field: name, query: val },
        MatchMode::MatchPhrase => QueryNode::MatchPhrase { field: name, query: val },
        MatchMode::MultiMatch => return Ok(multi_match(&name, val)),
        MatchMode::Wildcard => QueryNode::Wildcard { field: name, value: val },
        MatchMode::Regexp => QueryNode::Regexp { field: name, value: raw },
        MatchMode::Range => range(name, &val)?,
        MatchMode::MatchAll => QueryNode::MatchAll,
    };
    Ok(Some(node))
}

fn multi_match(names: &str, query: String) -> Option<QueryNode> {
    // A list without a comma after its first character yields no predicate.
    match names.find(',') {
        Some(idx) if idx > 0 => {
            let fields = names
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();
            Some(QueryNode::MultiMatch { fields, query })
        }
        _ => None,
    }
}

/// Parses `lower#upper` into exclusive bounds. Anything after a second `#`
/// is ignored.
fn range(field: String, val: &str) -> Result<QueryNode> {
    let mut bounds = val.split('#');
    let (Some(lower), Some(upper)) = (bounds.next(), bounds.next()) else {
        return Err(Error::invalid(format!(
            "range value for {field} must look like lower#upper, got {val:?}"
        )));
    };
    if lower.is_empty() || upper.is_empty() {
        return Err(Error::invalid(format!(
            "range value for {field} needs both bounds, got {val:?}"
        )));
    }
    Ok(QueryNode::Range {
        field,
        gt: lower.to_string(),
        lt: upper.to_string(),
    })
}

fn apply_order(request: &SearchRequest, builder: SearchSourceBuilder) -> SearchSourceBuilder {
    request
        .order
        .iter()
        .filter(|o| !o.name.is_empty())
        .fold(builder, |b, o| b.sort(SortField::new(o.name.clone(), o.dir)))
}

fn apply_page(request: &SearchRequest, builder: SearchSourceBuilder) -> SearchSourceBuilder {
    match request.active_page() {
        Some(page) => builder.from(page.offset()).size(page.limit()),
        None => builder,
    }
}

fn apply_highlight(
    request: &SearchRequest,
    builder: SearchSourceBuilder,
) -> Result<SearchSourceBuilder> {
    let Some(highlight) = request.highlight.as_ref().filter(|h| h.enabled) else {
        return Ok(builder);
    };
    let field = highlight
        .field_name
        .as_deref()
        .filter(|f| !f.is_empty())
        .ok_or_else(|| Error::invalid("highlight field name is required when enabled"))?;
    Ok(builder.highlight(Highlight::new(
        field,
        highlight.pre_tag.clone(),
        highlight.post_tag.clone(),
    )))
}
