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

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::model::PageSpec;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageOut {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_num: Option<u32>,
    pub page_size: u32,
    pub total_num: u64,
    pub total_page: u64,
}

impl From<&PageSpec> for PageOut {
    fn from(page: &PageSpec) -> Self {
        Self {
            page_num: page.page_num(),
            page_size: page.page_size(),
            total_num: page.total_num().unwrap_or(0),
            total_page: page.total_pages().unwrap_or(0),
        }
    }
}

/// The normalized search result handed back to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalResult {
    pub data: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageOut>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_data: Option<Vec<Value>>,
}

impl CanonicalResult {
    pub fn with_page(mut self, page: PageOut) -> Self {
        self.page = Some(page);
        self
    }

    /// Appends secondary results, creating the side channel on first use.
    pub fn push_additional(&mut self, docs: Vec<Value>) {
        self.additional_data.get_or_insert_with(Vec::new).extend(docs);
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A typed page of sources together with the engine's total hit count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchListing<T> {
    pub result: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorOut {
    pub code: String,
    pub message: String,
}

/// Output of commands that only report whether the engine accepted a call,
/// and of failed commands when `--json` is given.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOut>,
}

impl StatusResponse {
    pub fn acknowledged(operation: &str, ok: bool) -> Self {
        Self {
            ok,
            operation: Some(operation.to_string()),
            error: None,
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            ok: false,
            operation: None,
            error: Some(ErrorOut {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn envelope_keys() {
        let page = PageSpec::new(Some(1), Some(10)).with_total(1);
        let mut result = CanonicalResult {
            data: vec![json!({"id": 1})],
            ..Default::default()
        }
        .with_page(PageOut::from(&page));
        result.push_additional(vec![json!({"id": 2})]);
        assert_eq!(
            result.to_json().unwrap(),
            json!({
                "data": [{"id": 1}],
                "page": {"pageNum": 1, "pageSize": 10, "totalNum": 1, "totalPage": 1},
                "additionalData": [{"id": 2}]
            })
        );
    }

    #[test]
    fn empty_result_keeps_data() {
        let result = CanonicalResult::default();
        assert_eq!(result.to_json().unwrap(), json!({"data": []}));
    }

    #[test]
    fn status_shapes() {
        let ack = serde_json::to_value(StatusResponse::acknowledged("createIndex", true)).unwrap();
        assert_eq!(ack, json!({"ok": true, "operation": "createIndex"}));
        let err = serde_json::to_value(StatusResponse::error("invalid_request", "bad")).unwrap();
        assert_eq!(
            err,
            json!({"ok": false, "error": {"code": "invalid_request", "message": "bad"}})
        );
    }
}
