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

//! Turns raw engine responses into [`CanonicalResult`] envelopes.
//!
//! For a batch, the first response is the primary result and fills `data`
//! (and `page`); every later response is appended to `additionalData`.

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use crate::client::EngineResponse;
use crate::model::SearchRequest;
use crate::output::CanonicalResult;
use crate::output::PageOut;

/// `hits.total` as a count. Accepts both the plain number and the
/// `{"value": n, "relation": ..}` form.
pub fn hits_total(json: &Value) -> Option<u64> {
    match json.get("hits")?.get("total")? {
        Value::Number(n) => n.as_u64(),
        Value::Object(obj) => obj.get("value").and_then(Value::as_u64),
        _ => None,
    }
}

fn hit_list(json: &Value) -> &[Value] {
    json.get("hits")
        .and_then(|h| h.get("hits"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Rewrites integral floating point numbers as integers, recursively.
/// `5.0` becomes `5`; `5.5` is left alone.
pub fn normalize_numbers(value: &mut Value) {
    match value {
        Value::Number(n) => {
            if let Some(int) = integral(n) {
                *value = Value::from(int);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_numbers),
        Value::Object(map) => map.values_mut().for_each(normalize_numbers),
        _ => {}
    }
}

fn integral(n: &Number) -> Option<i64> {
    let f = n.as_f64().filter(|_| n.is_f64())?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 9.2e18).then_some(f as i64)
}

/// Concatenated highlight fragments for `field`, if any were returned.
fn highlight_text(hit: &Value, field: &str) -> Option<String> {
    let fragments = hit.get("highlight")?.get(field)?.as_array()?;
    let text: String = fragments
        .iter()
        .map(|f| match f {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    if text.is_empty() { None } else { Some(text) }
}

/// Source documents of every hit, with highlight substitution applied when
/// `highlight_field` is given.
pub fn hit_documents(json: &Value, highlight_field: Option<&str>) -> Vec<Value> {
    hit_list(json)
        .iter()
        .map(|hit| {
            let mut doc = hit
                .get("_source")
                .filter(|s| s.is_object())
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            if let Some(field) = highlight_field
                && let Some(text) = highlight_text(hit, field)
                && let Value::Object(map) = &mut doc
            {
                map.insert(field.to_string(), Value::String(text));
            }
            normalize_numbers(&mut doc);
            doc
        })
        .collect()
}

fn page_out(json: &Value, request: &SearchRequest) -> Option<PageOut> {
    let page = request.active_page()?;
    let page = page.clone().with_total(hits_total(json).unwrap_or(0));
    Some(PageOut::from(&page))
}

pub fn normalize_single(json: &Value, request: &SearchRequest) -> CanonicalResult {
    let data = hit_documents(json, request.highlight_field());
    CanonicalResult {
        data,
        page: page_out(json, request),
        additional_data: None,
    }
}

/// Normalizes a batch. `responses[i]` must answer `requests[i]`.
pub fn normalize_multi(responses: &[Value], requests: &[SearchRequest]) -> CanonicalResult {
    let mut pairs = responses.iter().zip(requests);
    let Some((first, primary)) = pairs.next() else {
        return CanonicalResult::default();
    };
    let mut result = normalize_single(first, primary);
    for (json, request) in pairs {
        result.push_additional(hit_documents(json, request.highlight_field()));
    }
    result
}

/// Source of a get response. Misses become an empty document.
pub fn normalize_get(response: &EngineResponse) -> Value {
    if !response.succeeded || response.json.get("found").and_then(Value::as_bool) == Some(false) {
        return Value::Object(Map::new());
    }
    let mut doc = response
        .json
        .get("_source")
        .filter(|s| s.is_object())
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));
    normalize_numbers(&mut doc);
    doc
}

/// Sources of a multi-get response in engine order; misses are dropped.
pub fn normalize_multi_get(json: &Value) -> Vec<Value> {
    json.get("docs")
        .and_then(Value::as_array)
        .map(|docs| {
            docs.iter()
                .filter_map(|d| d.get("_source").filter(|s| s.is_object()).cloned())
                .map(|mut doc| {
                    normalize_numbers(&mut doc);
                    doc
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::HighlightSpec;
    use crate::model::PageSpec;

    fn response(total: u64, sources: Vec<Value>) -> Value {
        let hits: Vec<Value> = sources.into_iter().map(|s| json!({"_source": s})).collect();
        json!({"took": 1, "hits": {"total": total, "hits": hits}})
    }

    #[test]
    fn integral_floats_render_as_integers() {
        let mut doc: Value = serde_json::from_str(r#"{"a": 5.0, "b": 5.5, "c": [2.0, {"d": -3.0}], "e": 7}"#).unwrap();
        normalize_numbers(&mut doc);
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"a":5,"b":5.5,"c":[2,{"d":-3}],"e":7}"#);
    }

    #[test]
    fn highlight_replaces_field() {
        let json = json!({"hits": {"total": 1, "hits": [{
            "_source": {"title": "hello", "id": 1},
            "highlight": {"title": ["<b>hel</b>lo"]}
        }]}});
        let req = SearchRequest::default().with_highlight(HighlightSpec::new("title"));
        let result = normalize_single(&json, &req);
        assert_eq!(result.data, vec![json!({"title": "<b>hel</b>lo", "id": 1})]);
    }

    #[test]
    fn highlight_fragments_concatenate() {
        let json = json!({"hits": {"total": 1, "hits": [{
            "_source": {"body": "a b"},
            "highlight": {"body": ["<b>a</b>", " <b>b</b>"]}
        }]}});
        let docs = hit_documents(&json, Some("body"));
        assert_eq!(docs[0]["body"], json!("<b>a</b> <b>b</b>"));
    }

    #[test]
    fn empty_fragments_keep_source() {
        let json = json!({"hits": {"total": 1, "hits": [
            {"_source": {"title": "hello"}, "highlight": {"title": []}},
            {"_source": {"title": "world"}}
        ]}});
        let docs = hit_documents(&json, Some("title"));
        assert_eq!(docs, vec![json!({"title": "hello"}), json!({"title": "world"})]);
    }

    #[test]
    fn disabled_highlight_is_ignored() {
        let json = json!({"hits": {"total": 1, "hits": [{
            "_source": {"title": "hello"},
            "highlight": {"title": ["<b>hello</b>"]}
        }]}});
        let mut highlight = HighlightSpec::new("title");
        highlight.enabled = false;
        let req = SearchRequest::default().with_highlight(highlight);
        assert_eq!(normalize_single(&json, &req).data, vec![json!({"title": "hello"})]);
    }

    #[test]
    fn page_totals_follow_response() {
        let req = SearchRequest::default().with_page(PageSpec::new(Some(1), Some(10)));
        let result = normalize_single(&response(25, vec![json!({"id": 1})]), &req);
        let page = result.page.unwrap();
        assert_eq!(page.total_num, 25);
        assert_eq!(page.total_page, 3);
        assert_eq!(page.page_size, 10);
    }

    #[test]
    fn no_page_without_paging() {
        let result = normalize_single(&response(3, vec![]), &SearchRequest::default());
        assert!(result.page.is_none());
        assert!(result.data.is_empty());
    }

    #[test]
    fn missing_hits_yield_empty_data() {
        let result = normalize_single(&json!({"took": 1}), &SearchRequest::default());
        assert_eq!(result.to_json().unwrap(), json!({"data": []}));
    }

    #[test]
    fn composite_batch() {
        let primary = SearchRequest::default().with_page(PageSpec::new(Some(1), Some(10)));
        let secondary = SearchRequest::default();
        let responses = vec![
            response(1, vec![json!({"name": "A"})]),
            response(1, vec![json!({"name": "B"})]),
        ];
        let result = normalize_multi(&responses, &[primary, secondary]);
        assert_eq!(
            result.to_json().unwrap(),
            json!({
                "data": [{"name": "A"}],
                "page": {"pageNum": 1, "pageSize": 10, "totalNum": 1, "totalPage": 1},
                "additionalData": [{"name": "B"}]
            })
        );
    }

    #[test]
    fn later_secondaries_append_in_order() {
        let reqs = vec![SearchRequest::default(); 3];
        let responses = vec![
            response(1, vec![json!({"n": 1})]),
            response(1, vec![json!({"n": 2})]),
            response(2, vec![json!({"n": 3}), json!({"n": 4})]),
        ];
        let result = normalize_multi(&responses, &reqs);
        assert_eq!(result.data, vec![json!({"n": 1})]);
        assert_eq!(
            result.additional_data,
            Some(vec![json!({"n": 2}), json!({"n": 3}), json!({"n": 4})])
        );
    }

    #[test]
    fn total_as_object() {
        let json = json!({"hits": {"total": {"value": 7, "relation": "eq"}, "hits": []}});
        assert_eq!(hits_total(&json), Some(7));
    }

    #[test]
    fn get_miss_is_empty_document() {
        let miss = EngineResponse::from_parts(404, r#"{"_index": "i", "_id": "9", "found": false}"#);
        assert_eq!(normalize_get(&miss), json!({}));
        let hit = EngineResponse::ok(json!({"found": true, "_source": {"id": 9, "score": 1.0}}));
        assert_eq!(normalize_get(&hit), json!({"id": 9, "score": 1}));
    }

    #[test]
    fn multi_get_drops_misses() {
        let json = json!({"docs": [
            {"_id": "2", "found": true, "_source": {"id": 2}},
            {"_id": "5", "found": false},
            {"_id": "1", "found": true, "_source": {"id": 1}}
        ]});
        assert_eq!(normalize_multi_get(&json), vec![json!({"id": 2}), json!({"id": 1})]);
    }
}
