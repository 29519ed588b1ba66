pub mod budget;
pub mod http_fetcher;
pub mod link_header;
pub mod timeline;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::app::{FedicatError, Result};

pub use budget::{FetchBudget, PAGE_SIZE};
pub use link_header::LinkMap;
pub use timeline::{fetch_status_thread, Page, StatusThread, Timeline, TimelineRequest};

/// A fully buffered HTTP response.
#[derive(Debug, Clone, Default)]
pub struct FetchResponse {
    pub url: String,
    pub body: Vec<u8>,
    /// Header names are stored lowercased.
    pub headers: HashMap<String, String>,
}

impl FetchResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Decode the body as a JSON array of records.
    pub fn records(&self) -> Result<Vec<Value>> {
        match self.json()? {
            Value::Array(records) => Ok(records),
            other => Err(FedicatError::UnexpectedResponse {
                url: self.url.clone(),
                reason: format!("expected a JSON array, got {}", kind_of(&other)),
            }),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
pub trait Fetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse>;
}
