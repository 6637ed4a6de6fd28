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

//! Request-side domain types: clauses, ordering, paging and highlighting.
//!
//! The serde names follow the JSON request format accepted by the CLI
//! (`fieldName`, `queryType`, `mustNot`, `pageNum`, ...).

use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_PRE_TAG: &str = "<b>";
pub const DEFAULT_POST_TAG: &str = "</b>";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Term,
    Prefix,
    QueryString,
    Match,
    MatchPhrase,
    MultiMatch,
    Wildcard,
    #[serde(alias = "regex")]
    Regexp,
    Range,
    MatchAll,
}

/// One field-level match condition.
///
/// `field_name` is ignored for [`MatchMode::MatchAll`]. For
/// [`MatchMode::MultiMatch`] it holds a comma separated field list and for
/// [`MatchMode::Range`] the value has the form `lower#upper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldClause {
    #[serde(default)]
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, rename = "queryType")]
    pub match_mode: MatchMode,
}

impl FieldClause {
    pub fn new(field_name: impl Into<String>, match_mode: MatchMode) -> Self {
        Self {
            field_name: field_name.into(),
            value: None,
            match_mode,
        }
    }

    pub fn with_value(
        field_name: impl Into<String>,
        value: impl Into<Value>,
        match_mode: MatchMode,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            value: Some(value.into()),
            match_mode,
        }
    }

    pub fn match_all() -> Self {
        Self::new("", MatchMode::MatchAll)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Must,
    Should,
    MustNot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseGroup {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<FieldClause>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<FieldClause>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<FieldClause>,
}

impl ClauseGroup {
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }

    pub fn len(&self) -> usize {
        self.must.len() + self.should.len() + self.must_not.len()
    }

    /// Every clause tagged with the group it came from, in must, should,
    /// must-not order.
    pub fn all_clauses(&self) -> impl Iterator<Item = (Clause, &FieldClause)> {
        self.must
            .iter()
            .map(|c| (Clause::Must, c))
            .chain(self.should.iter().map(|c| (Clause::Should, c)))
            .chain(self.must_not.iter().map(|c| (Clause::MustNot, c)))
    }

    pub fn has_match_all(&self) -> bool {
        self.all_clauses()
            .any(|(_, c)| c.match_mode == MatchMode::MatchAll)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

impl SortDir {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub name: String,
    #[serde(default, rename = "sort")]
    pub dir: SortDir,
}

impl OrderSpec {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dir: SortDir::Desc,
        }
    }
}

impl FromStr for OrderSpec {
    type Err = Error;

    /// Parses `field` or `field:asc` / `field:desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, dir) = match s.rsplit_once(':') {
            Some((name, dir)) => {
                let dir = match dir.to_ascii_lowercase().as_str() {
                    "asc" => SortDir::Asc,
                    "desc" => SortDir::Desc,
                    other => return Err(Error::invalid(format!("unknown sort order {other}"))),
                };
                (name, dir)
            }
            None => (s, SortDir::Asc),
        };
        if name.is_empty() {
            return Err(Error::invalid("order field name is required"));
        }
        Ok(Self {
            name: name.to_string(),
            dir,
        })
    }
}

/// Paging for one request. The totals are filled in from the engine
/// response by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PageRepr", into = "PageRepr")]
pub struct PageSpec {
    pub enabled: bool,
    page_num: Option<u32>,
    page_size: u32,
    total_num: Option<u64>,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            page_num: None,
            page_size: DEFAULT_PAGE_SIZE,
            total_num: None,
        }
    }
}

impl PageSpec {
    /// An enabled page. Non-positive sizes fall back to the default size and
    /// non-positive page numbers are dropped.
    pub fn new(page_num: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            enabled: true,
            page_num: sanitize_page_num(page_num),
            page_size: sanitize_page_size(page_size),
            total_num: None,
        }
    }

    pub fn page_num(&self) -> Option<u32> {
        self.page_num
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_num(&self) -> Option<u64> {
        self.total_num
    }

    pub fn offset(&self) -> u64 {
        match self.page_num {
            Some(num) if num > 0 => u64::from(num - 1) * u64::from(self.page_size),
            _ => 0,
        }
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    pub fn total_pages(&self) -> Option<u64> {
        self.total_num
            .map(|total| total.div_ceil(u64::from(self.page_size)))
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total_num = Some(total);
        self
    }
}

fn sanitize_page_num(num: Option<i64>) -> Option<u32> {
    num.filter(|n| *n > 0)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
}

fn sanitize_page_size(size: Option<i64>) -> u32 {
    match size {
        Some(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => DEFAULT_PAGE_SIZE,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageRepr {
    #[serde(default)]
    enable: bool,
    #[serde(default)]
    page_num: Option<i64>,
    #[serde(default)]
    page_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_num: Option<u64>,
}

impl From<PageRepr> for PageSpec {
    fn from(repr: PageRepr) -> Self {
        Self {
            enabled: repr.enable,
            page_num: sanitize_page_num(repr.page_num),
            page_size: sanitize_page_size(repr.page_size),
            total_num: repr.total_num,
        }
    }
}

impl From<PageSpec> for PageRepr {
    fn from(page: PageSpec) -> Self {
        Self {
            enable: page.enabled,
            page_num: page.page_num.map(i64::from),
            page_size: Some(i64::from(page.page_size)),
            total_num: page.total_num,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HighlightSpec {
    #[serde(rename = "enable")]
    pub enabled: bool,
    pub pre_tag: String,
    pub post_tag: String,
    #[serde(rename = "highlightFieldName", skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
}

impl Default for HighlightSpec {
    fn default() -> Self {
        Self {
            enabled: false,
            pre_tag: DEFAULT_PRE_TAG.to_string(),
            post_tag: DEFAULT_POST_TAG.to_string(),
            field_name: None,
        }
    }
}

impl HighlightSpec {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            enabled: true,
            field_name: Some(field_name.into()),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, pre_tag: impl Into<String>, post_tag: impl Into<String>) -> Self {
        self.pre_tag = pre_tag.into();
        self.post_tag = post_tag.into();
        self
    }

    /// The field to highlight when highlighting is switched on.
    pub fn active_field(&self) -> Option<&str> {
        if self.enabled {
            self.field_name.as_deref()
        } else {
            None
        }
    }
}

/// A complete search request.
///
/// Either `raw_query` is set, in which case it is sent as the query body,
/// or `clauses` must hold at least one clause.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default, rename = "query", skip_serializing_if = "Option::is_none")]
    pub raw_query: Option<String>,
    #[serde(default, rename = "indexName")]
    pub index_names: Vec<String>,
    #[serde(default, rename = "indexType")]
    pub index_types: Vec<String>,
    /// Fallback value for clauses without their own.
    #[serde(default, rename = "value", skip_serializing_if = "Option::is_none")]
    pub match_value: Option<Value>,
    #[serde(flatten)]
    pub clauses: ClauseGroup,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<OrderSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<HighlightSpec>,
}

impl SearchRequest {
    pub fn raw(query: impl Into<String>, index_names: Vec<String>, index_types: Vec<String>) -> Self {
        Self {
            raw_query: Some(query.into()),
            index_names,
            index_types,
            ..Default::default()
        }
    }

    pub fn clauses(index_name: impl Into<String>, clauses: ClauseGroup) -> Self {
        Self {
            index_names: vec![index_name.into()],
            clauses,
            ..Default::default()
        }
    }

    pub fn with_types(mut self, index_types: Vec<String>) -> Self {
        self.index_types = index_types;
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.match_value = Some(value.into());
        self
    }

    pub fn with_order(mut self, order: Vec<OrderSpec>) -> Self {
        self.order = order;
        self
    }

    pub fn with_page(mut self, page: PageSpec) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_highlight(mut self, highlight: HighlightSpec) -> Self {
        self.highlight = Some(highlight);
        self
    }

    /// The page spec, only when paging is switched on.
    pub fn active_page(&self) -> Option<&PageSpec> {
        self.page.as_ref().filter(|p| p.enabled)
    }

    pub fn highlight_field(&self) -> Option<&str> {
        self.highlight.as_ref().and_then(HighlightSpec::active_field)
    }
}

/// Text form of a scalar value as the engine sees it. Strings are taken
/// as-is, everything else uses its JSON rendering.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn page_offsets() {
        let page = PageSpec::new(Some(3), Some(10));
        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 10);

        let page = PageSpec::new(None, Some(10));
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn page_defaults_and_totals() {
        let page = PageSpec::new(Some(0), Some(-5));
        assert_eq!(page.page_num(), None);
        assert_eq!(page.page_size(), DEFAULT_PAGE_SIZE);

        let page = PageSpec::new(Some(1), Some(10)).with_total(25);
        assert_eq!(page.total_pages(), Some(3));
        let page = PageSpec::new(Some(1), Some(10)).with_total(20);
        assert_eq!(page.total_pages(), Some(2));
        let page = PageSpec::new(Some(1), Some(10)).with_total(0);
        assert_eq!(page.total_pages(), Some(0));
    }

    #[test]
    fn request_from_json() {
        let req: SearchRequest = serde_json::from_value(json!({
            "indexName": ["books"],
            "value": "Rust",
            "must": [{"fieldName": "title", "queryType": "match"}],
            "mustNot": [{"fieldName": "year", "value": "1990#2000", "queryType": "range"}],
            "order": [{"name": "year", "sort": "DESC"}],
            "page": {"enable": true, "pageNum": 2, "pageSize": 0},
            "highlight": {"enable": true, "highlightFieldName": "title"}
        }))
        .unwrap();
        assert_eq!(req.index_names, vec!["books".to_string()]);
        assert_eq!(req.clauses.must[0].match_mode, MatchMode::Match);
        assert_eq!(req.clauses.must_not[0].match_mode, MatchMode::Range);
        assert_eq!(req.order[0], OrderSpec::desc("year"));
        let page = req.active_page().unwrap();
        assert_eq!(page.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(page.offset(), 20);
        let highlight = req.highlight.as_ref().unwrap();
        assert_eq!(highlight.pre_tag, "<b>");
        assert_eq!(req.highlight_field(), Some("title"));
    }

    #[test]
    fn disabled_page_is_inactive() {
        let req: SearchRequest =
            serde_json::from_value(json!({"page": {"pageNum": 2, "pageSize": 5}})).unwrap();
        assert!(req.page.is_some());
        assert!(req.active_page().is_none());
    }

    #[test]
    fn order_from_str() {
        assert_eq!("year:desc".parse::<OrderSpec>().unwrap(), OrderSpec::desc("year"));
        assert_eq!("title".parse::<OrderSpec>().unwrap(), OrderSpec::asc("title"));
        assert!("year:sideways".parse::<OrderSpec>().is_err());
        assert!(":desc".parse::<OrderSpec>().is_err());
    }

    #[test]
    fn scalar_text_forms() {
        assert_eq!(scalar_text(&json!("Ab")), "Ab");
        assert_eq!(scalar_text(&json!(42)), "42");
        assert_eq!(scalar_text(&json!(true)), "true");
        assert_eq!(scalar_text(&Value::Null), "");
    }
}
