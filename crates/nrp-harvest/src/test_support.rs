//! In-memory `JsonSource` for pipeline tests

use std::cell::RefCell;
use std::collections::HashMap;

use nrp_core::{FetchError, JsonSource};
use serde_json::Value;

/// URL → response map; unknown URLs answer 404. Records every request.
#[derive(Default)]
pub struct MapSource {
    responses: HashMap<String, Result<String, u16>>,
    pub requests: RefCell<Vec<String>>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, url: &str, body: Value) -> Self {
        self.responses.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), Err(status));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl JsonSource for MapSource {
    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(FetchError::Http {
                status: Some(*status),
                message: format!("status {status}"),
            }),
            None => Err(FetchError::Http {
                status: Some(404),
                message: "not found".to_string(),
            }),
        }
    }
}
