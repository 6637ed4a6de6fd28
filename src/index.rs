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

//! Index lifecycle calls: create, exists, delete and mapping.

use serde_json::Value;

use crate::action::Action;
use crate::client::SearchClient;
use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::error::Result;

/// Index lifecycle calls. Each returns whether the engine accepted it.
pub struct IndexAdmin<'c, C: SearchClient + ?Sized> {
    client: &'c C,
}

impl<'c, C: SearchClient + ?Sized> IndexAdmin<'c, C> {
    pub fn new(client: &'c C) -> Self {
        Self { client }
    }

    /// Creates `index`, then puts `mappings` under `doc_type` when given.
    /// The mapping is only sent once the index exists.
    pub fn create_index(
        &self,
        index: &str,
        settings: Option<&Value>,
        doc_type: Option<&str>,
        mappings: Option<&Value>,
    ) -> Result<bool> {
        let doc_type = match (mappings, doc_type) {
            (Some(_), Some(t)) if !t.is_empty() => Some(t),
            (Some(_), _) => return Err(Error::invalid("index type is required with mappings")),
            (None, _) => None,
        };
        let action = Action::CreateIndex {
            index: index.to_string(),
            settings: settings.filter(|s| !is_blank(s)).cloned(),
        };
        if !Dispatcher::new(self.client).acknowledge(&action)? {
            return Ok(false);
        }
        match (mappings, doc_type) {
            (Some(mapping), Some(doc_type)) => self.put_mapping(index, doc_type, mapping),
            _ => Ok(true),
        }
    }

    pub fn exists_index(&self, index: &str) -> Result<bool> {
        Dispatcher::new(self.client).acknowledge(&Action::IndexExists {
            index: index.to_string(),
        })
    }

    pub fn delete_index(&self, index: &str) -> Result<bool> {
        Dispatcher::new(self.client).acknowledge(&Action::DeleteIndex {
            index: index.to_string(),
        })
    }

    pub fn put_mapping(&self, index: &str, doc_type: &str, mapping: &Value) -> Result<bool> {
        Dispatcher::new(self.client).acknowledge(&Action::PutMapping {
            index: index.to_string(),
            doc_type: doc_type.to_string(),
            mapping: mapping.clone(),
        })
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
