//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. The core crate builds
//! `HttpRequest` values and interprets `HttpResponse` values; the actual
//! round-trip is performed by whatever [`HttpTransport`] implementation the
//! application hands to the client. This keeps the core free of network
//! dependencies and lets tests substitute a recording fake.
//!
//! All fields use owned types (`String`, `Vec`) so values can be logged,
//! cloned and asserted on without lifetime concerns.

/// HTTP method for a request.
///
/// `Put` exists so transports stay general; the dispatcher rejects it, since
/// the TaskRabbit API only speaks GET, POST and DELETE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `query` carries key/value pairs to be appended as the query string;
/// `body` is a pre-serialized JSON payload.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// The blocking transport used to execute requests.
///
/// Implementations must return whatever status the server answered with as
/// data — status interpretation (including treating 4xx/5xx as errors) is
/// the dispatcher's job, not the transport's.
pub trait HttpTransport {
    fn execute(
        &self,
        request: &HttpRequest,
    ) -> Result<HttpResponse, Box<dyn std::error::Error + Send + Sync>>;
}
