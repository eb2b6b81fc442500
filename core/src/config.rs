//! Application-level configuration.
//!
//! # Design
//! Replaces process-wide mutable secrets with one immutable value constructed
//! up front and handed to each [`Client`](crate::Client). The OAuth code and
//! token exchange themselves are the application's job; this module only
//! knows where those endpoints live.

use serde::{Deserialize, Serialize};

/// Production host for the TaskRabbit developer sandbox.
pub const DEFAULT_BASE_URL: &str = "https://taskrabbitdev.com";

const AUTHORIZE_PATH: &str = "/api/authorize";
const TOKEN_PATH: &str = "/api/oauth/token";

/// Immutable application credentials and target host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OAuth application key (client id).
    pub app_key: String,
    /// OAuth application secret; also sent as `X-Client-Application` on
    /// every request.
    pub app_secret: String,
    /// Redirect URL registered with the application.
    #[serde(default)]
    pub redirect_url: String,
    /// Scheme + host the client talks to. Overridable for tests.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Config {
    pub fn new(app_key: &str, app_secret: &str, redirect_url: &str) -> Self {
        Self {
            app_key: app_key.to_string(),
            app_secret: app_secret.to_string(),
            redirect_url: redirect_url.to_string(),
            base_url: default_base_url(),
        }
    }

    /// Point the client at a different host (e.g. a local mock server).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// URL the user visits to grant this application access.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}{AUTHORIZE_PATH}?client_id={}&redirect_uri={}&response_type=code",
            self.base_url, self.app_key, self.redirect_url
        )
    }

    /// URL the application exchanges an authorization code at.
    pub fn token_url(&self) -> String {
        format!("{}{TOKEN_PATH}", self.base_url)
    }
}
