//! The client facade and request dispatcher.
//!
//! # Design
//! `Client` is the single object applications instantiate. It owns the
//! immutable [`Config`], the per-user bearer token (baked into a session
//! header set at construction), the [`HttpTransport`] that performs the
//! actual round-trips, and a lazily built city-name→id table. Every public
//! operation is one synchronous dispatch through the endpoint registry
//! followed by hydration of the decoded response.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::{json, Map, Value};

use crate::config::Config;
use crate::endpoint;
use crate::entities::{City, Offer, Task, User};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpTransport};
use crate::hydrate;

/// Positional path arguments for an endpoint template.
///
/// A single scalar id is normalized to a one-element sequence; the default
/// is a single empty string, which formats single-resource templates into
/// their collection path (`/api/v1/tasks/{0}` → `/api/v1/tasks/`).
#[derive(Debug, Clone)]
pub struct PathArgs(Vec<String>);

impl PathArgs {
    fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for PathArgs {
    fn default() -> Self {
        PathArgs(vec![String::new()])
    }
}

impl From<&str> for PathArgs {
    fn from(id: &str) -> Self {
        PathArgs(vec![id.to_string()])
    }
}

impl From<String> for PathArgs {
    fn from(id: String) -> Self {
        PathArgs(vec![id])
    }
}

impl From<i64> for PathArgs {
    fn from(id: i64) -> Self {
        PathArgs(vec![id.to_string()])
    }
}

impl From<Vec<String>> for PathArgs {
    fn from(ids: Vec<String>) -> Self {
        PathArgs(ids)
    }
}

impl<const N: usize> From<[&str; N]> for PathArgs {
    fn from(ids: [&str; N]) -> Self {
        PathArgs(ids.iter().map(|id| id.to_string()).collect())
    }
}

/// Extra request data passed straight through to the transport: query pairs
/// for GET, a JSON body payload for POST.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub data: Option<Value>,
}

/// Synchronous TaskRabbit API client.
pub struct Client {
    config: Config,
    headers: Vec<(String, String)>,
    transport: Box<dyn HttpTransport>,
    city_ids: Mutex<HashMap<String, i64>>,
}

impl Client {
    /// Build a client for one user's bearer token.
    ///
    /// The session header set — `Authorization: OAuth <token>` and
    /// `X-Client-Application: <app secret>` — is fixed here and attached to
    /// every request.
    pub fn new(config: Config, user_token: &str, transport: Box<dyn HttpTransport>) -> Self {
        let headers = vec![
            ("Authorization".to_string(), format!("OAuth {user_token}")),
            ("X-Client-Application".to_string(), config.app_secret.clone()),
        ];
        Self {
            config,
            headers,
            transport,
            city_ids: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Dispatch a named endpoint call and decode the response body.
    ///
    /// `override_method` replaces the endpoint's declared verb (the `task`
    /// endpoint doubles as create and delete this way). The effective verb
    /// must be GET, POST or DELETE. Only statuses 200, 201 and 301 count as
    /// success; 301 is accepted per the original API contract rather than
    /// followed as a redirect.
    pub fn request(
        &self,
        name: &str,
        ids: impl Into<PathArgs>,
        override_method: Option<HttpMethod>,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        let endpoint = endpoint::lookup(name)?;
        let ids = ids.into();
        let path = endpoint::format_path(endpoint.path, ids.as_slice())?;

        let method = override_method.unwrap_or(endpoint.method);
        if !matches!(method, HttpMethod::Get | HttpMethod::Post | HttpMethod::Delete) {
            return Err(ApiError::InvalidMethod(method.as_str().to_string()));
        }

        let body = options.data.map(|data| data.to_string());
        let mut headers = self.headers.clone();
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let request = HttpRequest {
            method,
            url: format!("{}{path}", self.config.base_url),
            headers,
            query: options.query,
            body,
        };

        let response = self
            .transport
            .execute(&request)
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !matches!(response.status, 200 | 201 | 301) {
            return Err(ApiError::UnexpectedStatus(response.status));
        }

        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    /// Resolve a city name (case-insensitively) to its remote id.
    ///
    /// The name→id table is fetched once on first need and kept for the
    /// lifetime of the client; it is never invalidated, so a city added
    /// remotely after the fill stays invisible. The lock is held across the
    /// populating fetch so at most one fill is ever in flight.
    pub fn find_city_id(&self, city_name: &str) -> Result<i64, ApiError> {
        let mut table = self.city_ids.lock().unwrap_or_else(PoisonError::into_inner);
        if table.is_empty() {
            for city in self.cities()? {
                if let (Some(id), Some(name)) = (city.id, city.name.as_deref()) {
                    table.insert(name.to_lowercase(), id);
                }
            }
        }
        table
            .get(&city_name.to_lowercase())
            .copied()
            .ok_or_else(|| ApiError::UnknownCity(city_name.to_string()))
    }

    /// List every city tasks can be posted in.
    pub fn cities(&self) -> Result<Vec<City<'_>>, ApiError> {
        let value = self.request("city", PathArgs::default(), None, RequestOptions::default())?;
        hydrate::items(&value)?
            .iter()
            .map(|item| hydrate::city(self, item))
            .collect()
    }

    pub fn find_city(&self, city_id: i64) -> Result<City<'_>, ApiError> {
        let value = self.request("city", city_id, None, RequestOptions::default())?;
        hydrate::city(self, &value)
    }

    pub fn find_user(&self, user_id: i64) -> Result<User<'_>, ApiError> {
        let value = self.request("user", user_id, None, RequestOptions::default())?;
        hydrate::user(self, &value)
    }

    /// Fetch the authenticated user behind the bearer token.
    pub fn find_account(&self) -> Result<User<'_>, ApiError> {
        let value = self.request("account", PathArgs::default(), None, RequestOptions::default())?;
        hydrate::user(self, &value)
    }

    pub fn find_task(&self, task_id: i64) -> Result<Task<'_>, ApiError> {
        let value = self.request("task", task_id, None, RequestOptions::default())?;
        hydrate::task(self, &value)
    }

    /// List the authenticated user's tasks.
    pub fn tasks(&self) -> Result<Vec<Task<'_>>, ApiError> {
        let value = self.request("task", PathArgs::default(), None, RequestOptions::default())?;
        hydrate::items(&value)?
            .iter()
            .map(|item| hydrate::task(self, item))
            .collect()
    }

    /// List the offers made on a task.
    pub fn offers(&self, task_id: i64) -> Result<Vec<Offer<'_>>, ApiError> {
        let value = self.request("offer", task_id, None, RequestOptions::default())?;
        hydrate::items(&value)?
            .iter()
            .map(|item| hydrate::offer(self, task_id, item))
            .collect()
    }

    /// Post a new task.
    ///
    /// `city_name` is resolved through [`find_city_id`](Self::find_city_id);
    /// `extra` fields are merged under the core trio, which wins on key
    /// collision. The payload goes out wrapped as `{"task": {...}}`.
    pub fn create_task(
        &self,
        name: &str,
        named_price: i64,
        city_name: &str,
        extra: Map<String, Value>,
    ) -> Result<Task<'_>, ApiError> {
        let city_id = self.find_city_id(city_name)?;
        let mut payload = extra;
        payload.insert("name".to_string(), Value::from(name));
        payload.insert("named_price".to_string(), Value::from(named_price));
        payload.insert("city".to_string(), Value::from(city_id));

        let options = RequestOptions {
            data: Some(json!({ "task": payload })),
            ..RequestOptions::default()
        };
        let value = self.request("task", "", Some(HttpMethod::Post), options)?;
        hydrate::task(self, &value)
    }
}
