//! Error types for the TaskRabbit API client.
//!
//! # Design
//! One variant per failure class, so callers can match on exactly what went
//! wrong: a typo'd endpoint name, a verb the API does not speak, a path
//! template missing its arguments, an unexpected HTTP status, a body that is
//! not the JSON shape we were promised, or a city name the remote list does
//! not contain. No variant is ever retried or suppressed by the client —
//! recovery policy belongs to the embedding application.

use std::fmt;

/// Errors returned by [`Client`](crate::Client) operations and entity actions.
#[derive(Debug)]
pub enum ApiError {
    /// The logical operation name is not in the endpoint registry.
    UnknownEndpoint(String),

    /// The effective HTTP verb is not one of GET, POST or DELETE.
    InvalidMethod(String),

    /// The endpoint path template references more positional arguments than
    /// the caller supplied.
    MalformedPathArguments(String),

    /// The server answered with a status outside the accepted set
    /// {200, 201, 301}.
    UnexpectedStatus(u16),

    /// The response body could not be decoded as JSON, or a decoded value
    /// violated the hydration contract (e.g. a `city` key holding a
    /// non-object).
    MalformedResponse(String),

    /// The city name was not present in the remote city list.
    UnknownCity(String),

    /// The underlying HTTP transport failed before a response was received.
    Transport(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::UnknownEndpoint(name) => {
                write!(f, "unknown endpoint name: {name}")
            }
            ApiError::InvalidMethod(method) => {
                write!(f, "method must be GET, POST or DELETE, received: {method}")
            }
            ApiError::MalformedPathArguments(msg) => {
                write!(f, "cannot format endpoint path: {msg}")
            }
            ApiError::UnexpectedStatus(status) => {
                write!(f, "erroneous response from TaskRabbit: HTTP {status}")
            }
            ApiError::MalformedResponse(msg) => {
                write!(f, "malformed response: {msg}")
            }
            ApiError::UnknownCity(name) => {
                write!(f, "unknown city: {name}")
            }
            ApiError::Transport(msg) => {
                write!(f, "transport error: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
