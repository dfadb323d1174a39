//! REST resource client for the guard portal
//!
//! This crate talks to the portal backend's JSON collections
//! (`entries`, `service-entries`, `vehicles`, `societies`, ...).
//!
//! # Features
//!
//! - Reads retried on transient failures (network errors, 5xx) with a fixed delay
//! - Typed classification of failures (`Unauthorized`, `NotFound`, `InvalidRequest`, `Unreachable`)
//! - Single-attempt mutations
//! - Cancellation of pending retries

pub mod error;
pub mod fetch;
pub mod models;
pub mod retry;

pub use error::{ResourceError, Result};
pub use fetch::FetchBuilder;
pub use models::*;
pub use retry::{CancelFlag, RetryPolicy};

use log::debug;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

/// Prefix under which the backend mounts every collection
pub const API_PREFIX: &str = "api";

/// Resource names used by the portal
pub mod paths {
    pub const GUARD_LOGIN: &str = "guard/guard-login";
    pub const GUARD_REGISTER: &str = "guard/guard-register";
    pub const GUARD_PROFILE: &str = "guard/guard-profile";
    pub const GUARD_FORGOT_PASSWORD: &str = "guard/forgot-password";
    pub const GUARD_RESET_PASSWORD: &str = "guard/reset-password";
    pub const SOCIETIES: &str = "societies";
    pub const USERS: &str = "users";
    pub const ENTRIES: &str = "entries";
    pub const ENTRIES_EXPIRING_SOON: &str = "entries/expiring-soon";
    pub const SERVICE_ENTRIES: &str = "service-entries";
    pub const VEHICLES: &str = "vehicles";
    pub const VEHICLES_SEARCH: &str = "vehicles/search";
}

/// Client for the backend's REST collections
///
/// Holds no session state: callers pass the token for every call and own
/// whatever they do with the results.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    base_url: Url,
    http_client: Client,
    retry: RetryPolicy,
}

impl ResourceClient {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: &str, http_client: Client) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ResourceError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            http_client,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy used for reads
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of `resource` (optionally `resource/id`) under the API prefix
    pub fn resource_url(&self, resource: &str, id: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ResourceError::Url(url::ParseError::EmptyHost))?;
            segments.pop_if_empty().push(API_PREFIX);
            for part in resource.split('/').filter(|p| !p.is_empty()) {
                segments.push(part);
            }
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, resource: &str, id: Option<&str>) -> Result<FetchBuilder<'_>> {
        Ok(FetchBuilder::new(
            &self.http_client,
            self.resource_url(resource, id)?,
            method,
        ))
    }

    /// Fetch a collection, retrying transient failures
    pub async fn fetch_list<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
        token: Option<&str>,
    ) -> Result<Vec<T>> {
        self.fetch_with_retry(resource, query, token, None).await
    }

    /// Like [`fetch_list`](Self::fetch_list), but abandons pending retries
    /// once `cancel` is raised
    pub async fn fetch_list_cancellable<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
        token: Option<&str>,
        cancel: &CancelFlag,
    ) -> Result<Vec<T>> {
        self.fetch_with_retry(resource, query, token, Some(cancel)).await
    }

    /// Fetch a single document, retrying transient failures
    pub async fn fetch_one<T: DeserializeOwned>(
        &self,
        resource: &str,
        token: Option<&str>,
        cancel: Option<&CancelFlag>,
    ) -> Result<T> {
        self.fetch_with_retry(resource, &[], token, cancel).await
    }

    async fn fetch_with_retry<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
        token: Option<&str>,
        cancel: Option<&CancelFlag>,
    ) -> Result<T> {
        let builder = self
            .request(Method::GET, resource, None)?
            .maybe_bearer_auth(token)?
            .no_cache()
            .query(query);

        self.retry
            .run(resource, cancel, || builder.execute::<T>())
            .await
    }

    /// Create a record; never retried
    pub async fn create<P, T>(&self, resource: &str, payload: &P, token: Option<&str>) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("Creating record in {}", resource);
        self.request(Method::POST, resource, None)?
            .maybe_bearer_auth(token)?
            .json(payload)?
            .execute()
            .await
    }

    /// POST to an action endpoint (login, password reset, ...); never retried
    pub async fn post<P, T>(&self, resource: &str, payload: &P, token: Option<&str>) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.create(resource, payload, token).await
    }

    /// Replace the record `id`; never retried
    pub async fn update<P, T>(
        &self,
        resource: &str,
        id: &str,
        payload: &P,
        token: Option<&str>,
    ) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("Updating {}/{}", resource, id);
        self.request(Method::PUT, resource, Some(id))?
            .maybe_bearer_auth(token)?
            .json(payload)?
            .execute()
            .await
    }

    /// Delete the record `id`; never retried
    pub async fn delete(&self, resource: &str, id: &str, token: Option<&str>) -> Result<()> {
        debug!("Deleting {}/{}", resource, id);
        self.request(Method::DELETE, resource, Some(id))?
            .maybe_bearer_auth(token)?
            .execute_empty()
            .await
    }
}
