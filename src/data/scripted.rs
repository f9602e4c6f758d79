//! In-memory `HttpSource` replaying canned responses, for tests.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::data::{HttpResponse, HttpSource};
use crate::error::AppError;

/// Unknown URLs answer 404 and have no `Last-Modified`.
#[derive(Default)]
pub struct ScriptedSource {
    responses: HashMap<String, Result<HttpResponse, String>>,
    modified: HashMap<String, DateTime<Utc>>,
    gets: RefCell<Vec<String>>,
    heads: RefCell<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: impl Into<String>, body: Vec<u8>) -> Self {
        self.responses
            .insert(url.into(), Ok(HttpResponse { status: 200, body }));
        self
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses.insert(
            url.into(),
            Ok(HttpResponse {
                status,
                body: Vec::new(),
            }),
        );
        self
    }

    pub fn with_transport_error(mut self, url: impl Into<String>, message: &str) -> Self {
        self.responses.insert(url.into(), Err(message.to_string()));
        self
    }

    pub fn with_last_modified(mut self, url: impl Into<String>, at: DateTime<Utc>) -> Self {
        self.modified.insert(url.into(), at);
        self
    }

    /// URLs requested with GET, in order.
    pub fn gets(&self) -> Vec<String> {
        self.gets.borrow().clone()
    }

    /// URLs requested with HEAD, in order.
    pub fn heads(&self) -> Vec<String> {
        self.heads.borrow().clone()
    }
}

impl HttpSource for ScriptedSource {
    fn get(&self, url: &str) -> Result<HttpResponse, AppError> {
        self.gets.borrow_mut().push(url.to_string());
        match self.responses.get(url) {
            Some(Ok(resp)) => Ok(resp.clone()),
            Some(Err(message)) => Err(AppError::new(3, message.clone())),
            None => Ok(HttpResponse {
                status: 404,
                body: Vec::new(),
            }),
        }
    }

    fn last_modified(&self, url: &str) -> Result<Option<DateTime<Utc>>, AppError> {
        self.heads.borrow_mut().push(url.to_string());
        Ok(self.modified.get(url).copied())
    }
}
