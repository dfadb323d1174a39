//! Request builder shared by every resource call

use crate::error::{ResourceError, Result};
use log::{debug, trace};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

/// Helper for building and executing one HTTP request
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: Url,
    method: Method,
    headers: HeaderMap,
    query_params: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: Url, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            client,
            url,
            method,
            headers,
            query_params: Vec::new(),
            body: None,
        }
    }

    /// Add bearer token authentication
    ///
    /// An empty token is refused rather than sent.
    pub fn bearer_auth(mut self, token: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(ResourceError::MissingToken);
        }
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ResourceError::MissingToken)?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Bearer auth when a token is given, anonymous otherwise
    pub fn maybe_bearer_auth(self, token: Option<&str>) -> Result<Self> {
        match token {
            Some(token) => self.bearer_auth(token),
            None => Ok(self),
        }
    }

    /// Ask intermediaries not to serve a cached list
    pub fn no_cache(mut self) -> Self {
        self.headers
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        self
    }

    /// Add query parameters to the request
    pub fn query<K: AsRef<str>, V: AsRef<str>>(mut self, params: &[(K, V)]) -> Self {
        self.query_params.extend(
            params
                .iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string())),
        );
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    fn request_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    /// Send once and classify a non-success status
    pub async fn send(&self) -> Result<Response> {
        let url = self.request_url();
        debug!("{} {}", self.method, url.path());

        let mut req = self
            .client
            .request(self.method.clone(), url)
            .headers(self.headers.clone());
        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }

        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        trace!("{} {} failed with {}: {}", self.method, self.url.path(), status, text);
        Err(ResourceError::from_status(status, &text))
    }

    /// Send once and decode the JSON body
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T> {
        let response = self.send().await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| ResourceError::InvalidResponse(err.to_string()))
    }

    /// Send once and ignore the body
    pub async fn execute_empty(&self) -> Result<()> {
        self.send().await.map(|_| ())
    }
}
