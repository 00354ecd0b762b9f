//! Outbound requests.
//!
//! Widgets issue at most one request per user action and never retry, so the
//! seam is a single `fetch` call. Hosts implement [`Fetcher`] over whatever
//! transport they have; [`StaticFetcher`] serves canned responses.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use http::Method;
use serde::de::DeserializeOwned;

/// Error type for fetch operations.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// An outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Form fields, sent as the body of non-GET requests.
    pub form: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            form: Vec::new(),
        }
    }

    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            form,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// A completed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_str(&self.body).map_err(|e| FetchError::Deserialization(e.to_string()))
    }
}

/// Transport used by the widgets.
#[async_trait(?Send)]
pub trait Fetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError>;
}

/// Fetch and decode a JSON body, treating 4xx/5xx as errors.
pub async fn fetch_json<T: DeserializeOwned>(
    fetcher: &dyn Fetcher,
    request: FetchRequest,
) -> Result<T, FetchError> {
    let url = request.url.clone();
    let response = fetcher.fetch(request).await?;
    if response.status >= 400 {
        return Err(FetchError::Http {
            status: response.status,
            url,
        });
    }
    response.json()
}

/// Serves canned responses keyed by method and URL, recording every request.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    routes: HashMap<(Method, String), Result<FetchResponse, String>>,
    requests: RefCell<Vec<FetchRequest>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `method url` with `status` and `body`.
    pub fn with_response(mut self, method: Method, url: &str, status: u16, body: &str) -> Self {
        self.routes
            .insert((method, url.to_string()), Ok(FetchResponse::new(status, body)));
        self
    }

    /// Fail `method url` with a connection error.
    pub fn with_failure(mut self, method: Method, url: &str, message: &str) -> Self {
        self.routes
            .insert((method, url.to_string()), Err(message.to_string()));
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let key = (request.method.clone(), request.url.clone());
        self.requests.borrow_mut().push(request);
        match self.routes.get(&key) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(message)) => Err(FetchError::Connection(message.clone())),
            None => Ok(FetchResponse::new(404, "")),
        }
    }
}
