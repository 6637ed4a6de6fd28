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

//! Document writes: single saves, batch saves, bulk, update and deletes.

use serde::Serialize;
use serde_json::Value;

use crate::action::Action;
use crate::action::BulkOp;
use crate::action::DocRef;
use crate::client::SearchClient;
use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::error::Result;
use crate::model::scalar_text;

/// A document that knows its own id.
pub trait Identified {
    fn doc_id(&self) -> Option<String>;
}

/// JSON documents are identified by their `"id"` key.
impl Identified for Value {
    fn doc_id(&self) -> Option<String> {
        match self.get("id")? {
            Value::Null => None,
            id => Some(scalar_text(id)),
        }
    }
}

pub struct DocumentWriter<'c, C: SearchClient + ?Sized> {
    client: &'c C,
}

impl<'c, C: SearchClient + ?Sized> DocumentWriter<'c, C> {
    pub fn new(client: &'c C) -> Self {
        Self { client }
    }

    fn acknowledge(&self, action: &Action) -> Result<bool> {
        Dispatcher::new(self.client).acknowledge(action)
    }

    /// Indexes `data`. Without an id the engine assigns one.
    pub fn save_doc<T: Serialize + ?Sized>(
        &self,
        index: &str,
        doc_type: &str,
        id: Option<&str>,
        data: &T,
    ) -> Result<bool> {
        self.acknowledge(&Action::IndexDoc {
            index: index.to_string(),
            doc_type: doc_type.to_string(),
            id: id.map(str::to_string),
            source: serde_json::to_value(data)?,
        })
    }

    /// Indexes `data` under its own id. Returns false without calling the
    /// engine when the document has no id.
    pub fn save_identified<T: Serialize + Identified>(
        &self,
        index: &str,
        doc_type: &str,
        data: &T,
    ) -> Result<bool> {
        match data.doc_id() {
            Some(id) => self.save_doc(index, doc_type, Some(&id), data),
            None => Ok(false),
        }
    }

    /// Saves each document with its own call. Documents without an id are
    /// skipped.
    pub fn save_doc_list<T: Serialize + Identified>(
        &self,
        index: &str,
        doc_type: &str,
        docs: &[T],
    ) -> Result<()> {
        self.save_doc_list_with(index, doc_type, docs, T::doc_id)
    }

    /// Like [`DocumentWriter::save_doc_list`] with the id taken from
    /// `id_of`.
    pub fn save_doc_list_with<T, F>(
        &self,
        index: &str,
        doc_type: &str,
        docs: &[T],
        id_of: F,
    ) -> Result<()>
    where
        T: Serialize,
        F: Fn(&T) -> Option<String>,
    {
        if docs.is_empty() {
            return Err(Error::invalid("document list is empty"));
        }
        for doc in docs {
            if let Some(id) = id_of(doc) {
                self.save_doc(index, doc_type, Some(&id), doc)?;
            }
        }
        Ok(())
    }

    /// Indexes every identified document in one bulk call.
    pub fn bulk_save<T: Serialize + Identified>(
        &self,
        index: &str,
        doc_type: &str,
        docs: &[T],
    ) -> Result<bool> {
        let mut ops = Vec::with_capacity(docs.len());
        for doc in docs {
            if let Some(id) = doc.doc_id() {
                ops.push(BulkOp::Index {
                    target: DocRef::new(index, doc_type, id),
                    source: serde_json::to_value(doc)?,
                });
            }
        }
        if ops.is_empty() {
            return Ok(false);
        }
        self.acknowledge(&Action::Bulk(ops))
    }

    /// Sends `payload` as a bulk update, e.g. `{"doc": {...}}`.
    pub fn update_doc<T: Serialize + ?Sized>(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
        payload: &T,
    ) -> Result<bool> {
        self.acknowledge(&Action::Bulk(vec![BulkOp::Update {
            target: DocRef::new(index, doc_type, id),
            payload: serde_json::to_value(payload)?,
        }]))
    }

    pub fn delete_doc(&self, index: &str, doc_type: &str, id: &str) -> Result<bool> {
        self.acknowledge(&Action::Bulk(vec![BulkOp::Delete {
            target: DocRef::new(index, doc_type, id),
        }]))
    }

    /// Deletes every document matching `query`, a JSON search body.
    pub fn delete_by_query(&self, index: &str, doc_type: &str, query: &str) -> Result<bool> {
        let query: Value = serde_json::from_str(query)
            .map_err(|e| Error::invalid(format!("delete query is not valid JSON: {e}")))?;
        self.acknowledge(&Action::DeleteByQuery {
            index: index.to_string(),
            doc_type: doc_type.to_string(),
            query,
        })
    }
}
