//! Synchronous client for the TaskRabbit REST API.
//!
//! # Overview
//! Every operation is one blocking HTTP call: a logical endpoint name is
//! resolved through a static registry, dispatched over a caller-supplied
//! [`HttpTransport`] with the session's OAuth headers attached, and the JSON
//! response is hydrated into domain entities (City, User, Task, Offer).
//!
//! # Design
//! - [`Config`] is immutable and passed to each [`Client`]; there is no
//!   process-wide mutable state.
//! - The core carries no network dependency. Applications implement
//!   [`HttpTransport`] over their HTTP library of choice; tests use a
//!   recording fake.
//! - Entities hold a non-owning reference to their `Client` so chained
//!   actions (`close`, `comment`, `accept`, …) can dispatch further calls.
//! - The only cache is the lazily built city-name→id table inside `Client`;
//!   it lives as long as the client and is never invalidated.
//!
//! The OAuth code/token exchange is out of scope: construct a `Client` from
//! an already obtained bearer token. [`Config::authorize_url`] and
//! [`Config::token_url`] point at the endpoints that flow uses.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod entities;
pub mod error;
pub mod http;
pub mod hydrate;

pub use client::{Client, PathArgs, RequestOptions};
pub use config::{Config, DEFAULT_BASE_URL};
pub use endpoint::Endpoint;
pub use entities::{City, Offer, Task, User};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
