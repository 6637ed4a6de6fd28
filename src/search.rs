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

//! Compile, dispatch and normalize in one call.

use std::time::Instant;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::action::Action;
use crate::action::DocRef;
use crate::client::SearchClient;
use crate::compile::CompiledSearch;
use crate::compile::compile;
use crate::compile::compile_batch;
use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::error::Result;
use crate::model::OrderSpec;
use crate::model::PageSpec;
use crate::model::SearchRequest;
use crate::normalize::hit_documents;
use crate::normalize::hits_total;
use crate::normalize::normalize_get;
use crate::normalize::normalize_multi;
use crate::normalize::normalize_multi_get;
use crate::normalize::normalize_single;
use crate::output::CanonicalResult;
use crate::output::SearchListing;

pub struct Searcher<'c, C: SearchClient + ?Sized> {
    client: &'c C,
}

impl<'c, C: SearchClient + ?Sized> Searcher<'c, C> {
    pub fn new(client: &'c C) -> Self {
        Self { client }
    }

    fn dispatcher(&self) -> Dispatcher<'c, C> {
        Dispatcher::new(self.client)
    }

    pub fn compile(&self, request: &SearchRequest) -> Result<CompiledSearch> {
        compile(request)
    }

    pub fn search(&self, request: &SearchRequest) -> Result<CanonicalResult> {
        let compiled = compile(request)?;
        let json = self.dispatcher().search(&compiled)?;
        Ok(normalize_single(&json, request))
    }

    /// Runs several requests as one batch. The first request is the primary
    /// one; the hits of the others land in `additionalData`.
    pub fn search_many(&self, requests: &[SearchRequest]) -> Result<CanonicalResult> {
        match requests {
            [] => Err(Error::invalid("search requests can't be empty")),
            [single] => self.search(single),
            _ => {
                let batch = compile_batch(requests)?;
                let responses = self.dispatcher().multi_search(&batch)?;
                Ok(normalize_multi(&responses, requests))
            }
        }
    }

    /// Runs a caller-written query body against the given scope.
    pub fn search_raw(
        &self,
        query: &str,
        indices: Vec<String>,
        types: Vec<String>,
        page: Option<PageSpec>,
        order: Vec<OrderSpec>,
    ) -> Result<CanonicalResult> {
        let mut request = SearchRequest::raw(query, indices, types).with_order(order);
        request.page = page;
        self.search(&request)
    }

    /// Typed sources of the hits, with highlight substitution applied.
    pub fn search_list<T: DeserializeOwned>(&self, request: &SearchRequest) -> Result<Vec<T>> {
        let json = self.dispatcher().search(&compile(request)?)?;
        typed(hit_documents(&json, request.highlight_field()))
    }

    /// Typed sources together with the engine's total hit count.
    pub fn search_total<T: DeserializeOwned>(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchListing<T>> {
        let json = self.dispatcher().search(&compile(request)?)?;
        Ok(SearchListing {
            result: typed(hit_documents(&json, request.highlight_field()))?,
            total: hits_total(&json).unwrap_or(0),
        })
    }

    /// Source of one document. A missing document, or one the engine refuses
    /// to return, is an empty object.
    pub fn get(&self, index: &str, doc_type: &str, id: &str) -> Result<Value> {
        let started = Instant::now();
        tracing::info!("get {index}/{doc_type}/{id}");
        let response = self
            .client
            .execute(&Action::Get(DocRef::new(index, doc_type, id)))
            .map_err(|e| Error::operation("get", e))?;
        let doc = normalize_get(&response);
        if doc.as_object().is_some_and(|m| !m.is_empty()) {
            tracing::info!(
                id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "get result"
            );
        } else {
            tracing::info!("get result: not found document[{id}]");
        }
        Ok(doc)
    }

    /// Sources of the found documents in engine order. Misses are dropped.
    pub fn multi_get(&self, index: &str, doc_type: &str, ids: &[String]) -> Result<Vec<Value>> {
        tracing::info!("multi get {index}/{doc_type}/{ids:?}");
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let started = Instant::now();
        let docs = ids
            .iter()
            .map(|id| DocRef::new(index, doc_type, id.as_str()))
            .collect();
        let response = self
            .client
            .execute(&Action::MultiGet(docs))
            .map_err(|e| Error::operation("multi get", e))?;
        if !response.succeeded {
            tracing::warn!(
                status = response.status,
                error = response.error_message.as_deref().unwrap_or_default(),
                "multi get rejected"
            );
            return Ok(Vec::new());
        }
        let found = normalize_multi_get(&response.json);
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            requested = ids.len(),
            found = found.len(),
            "multi get result"
        );
        Ok(found)
    }
}

fn typed<T: DeserializeOwned>(docs: Vec<Value>) -> Result<Vec<T>> {
    docs.into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::client::EngineResponse;
    use crate::model::ClauseGroup;
    use crate::model::FieldClause;
    use crate::model::HighlightSpec;
    use crate::model::MatchMode;

    struct Canned {
        responses: Mutex<Vec<EngineResponse>>,
        seen: Mutex<Vec<Action>>,
    }

    impl Canned {
        fn new(responses: Vec<Value>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().map(EngineResponse::ok).collect()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn with_response(response: EngineResponse) -> Self {
            Self {
                responses: Mutex::new(vec![response]),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl SearchClient for Canned {
        fn execute(&self, action: &Action) -> Result<EngineResponse> {
            self.seen.lock().unwrap().push(action.clone());
            Ok(self.responses.lock().unwrap().remove(0))
        }

        fn shutdown(&self) {}
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Book {
        id: i64,
        title: String,
    }

    fn title_request() -> SearchRequest {
        let group = ClauseGroup {
            must: vec![FieldClause::with_value("title", "Rust", MatchMode::Match)],
            ..Default::default()
        };
        SearchRequest::clauses("books", group)
    }

    fn books_response() -> Value {
        json!({"took": 1, "hits": {"total": 2, "hits": [
            {"_source": {"id": 1.0, "title": "Rust in Action"},
             "highlight": {"title": ["<b>Rust</b> in Action"]}},
            {"_source": {"id": 2, "title": "Programming Rust"}}
        ]}})
    }

    #[test]
    fn search_normalizes_response() {
        let client = Canned::new(vec![books_response()]);
        let result = Searcher::new(&client).search(&title_request()).unwrap();
        assert_eq!(result.data.len(), 2);
        assert_eq!(result.data[0]["id"], json!(1));
        assert!(result.page.is_none());
    }

    #[test]
    fn single_request_batch_is_plain_search() {
        let client = Canned::new(vec![books_response()]);
        Searcher::new(&client)
            .search_many(&[title_request()])
            .unwrap();
        assert!(matches!(client.seen.lock().unwrap()[0], Action::Search(_)));
    }

    #[test]
    fn batch_uses_multi_search() {
        let client = Canned::new(vec![json!({"responses": [
            {"took": 1, "hits": {"total": 1, "hits": [{"_source": {"name": "A"}}]}},
            {"took": 1, "hits": {"total": 1, "hits": [{"_source": {"name": "B"}}]}}
        ]})]);
        let result = Searcher::new(&client)
            .search_many(&[title_request(), title_request()])
            .unwrap();
        assert_eq!(result.data, vec![json!({"name": "A"})]);
        assert_eq!(result.additional_data, Some(vec![json!({"name": "B"})]));
        assert!(matches!(
            client.seen.lock().unwrap()[0],
            Action::MultiSearch(_)
        ));
    }

    #[test]
    fn empty_batch_is_rejected_before_sending() {
        let client = Canned::new(vec![]);
        let err = Searcher::new(&client).search_many(&[]).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(client.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn raw_search_pages() {
        let client = Canned::new(vec![books_response()]);
        let result = Searcher::new(&client)
            .search_raw(
                r#"{"query": {"match_all": {}}}"#,
                vec!["books".into()],
                vec![],
                Some(PageSpec::new(Some(2), Some(1))),
                vec![OrderSpec::desc("id")],
            )
            .unwrap();
        assert_eq!(result.page.unwrap().total_page, 2);
        let seen = client.seen.lock().unwrap();
        let Action::Search(compiled) = &seen[0] else {
            panic!("expected a search");
        };
        assert_eq!(compiled.body["from"], json!(1));
        assert_eq!(compiled.body["sort"], json!([{"id": {"order": "desc"}}]));
    }

    #[test]
    fn typed_list_with_highlight() {
        let client = Canned::new(vec![books_response()]);
        let request = title_request().with_highlight(HighlightSpec::new("title"));
        let books: Vec<Book> = Searcher::new(&client).search_list(&request).unwrap();
        assert_eq!(
            books,
            vec![
                Book {
                    id: 1,
                    title: "<b>Rust</b> in Action".into()
                },
                Book {
                    id: 2,
                    title: "Programming Rust".into()
                },
            ]
        );
    }

    #[test]
    fn typed_listing_carries_total() {
        let client = Canned::new(vec![books_response()]);
        let listing: SearchListing<Book> =
            Searcher::new(&client).search_total(&title_request()).unwrap();
        assert_eq!(listing.total, 2);
        assert_eq!(listing.result[1].title, "Programming Rust");
    }

    #[test]
    fn get_missing_is_empty() {
        let client = Canned::with_response(EngineResponse::from_parts(
            404,
            r#"{"found": false}"#,
        ));
        let doc = Searcher::new(&client).get("books", "book", "9").unwrap();
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn multi_get_without_ids_skips_engine() {
        let client = Canned::new(vec![]);
        let docs = Searcher::new(&client)
            .multi_get("books", "book", &[])
            .unwrap();
        assert!(docs.is_empty());
        assert!(client.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn multi_get_keeps_found_in_order() {
        let client = Canned::new(vec![json!({"docs": [
            {"_id": "3", "found": true, "_source": {"id": 3}},
            {"_id": "4", "found": false},
            {"_id": "1", "found": true, "_source": {"id": 1}}
        ]})]);
        let ids = vec!["3".to_string(), "4".to_string(), "1".to_string()];
        let docs = Searcher::new(&client)
            .multi_get("books", "book", &ids)
            .unwrap();
        assert_eq!(docs, vec![json!({"id": 3}), json!({"id": 1})]);
    }
}
