//! The endpoint registry: logical operation name → (path template, verb).
//!
//! The table is the wire contract with the TaskRabbit API and must not be
//! edited casually. Path templates use positional placeholders (`{0}`,
//! `{1}`, …) filled left-to-right from the caller-supplied id list.

use crate::error::ApiError;
use crate::http::HttpMethod;

/// A named remote operation: immutable path template plus declared verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub path: &'static str,
    pub method: HttpMethod,
}

const ENDPOINTS: &[(&str, Endpoint)] = &[
    ("city", Endpoint { path: "/api/v1/cities/{0}", method: HttpMethod::Get }),
    ("account", Endpoint { path: "/api/v1/account", method: HttpMethod::Get }),
    ("user", Endpoint { path: "/api/v1/users/{0}", method: HttpMethod::Get }),
    ("task", Endpoint { path: "/api/v1/tasks/{0}", method: HttpMethod::Get }),
    ("task_close", Endpoint { path: "/api/v1/tasks/{0}/close", method: HttpMethod::Post }),
    ("task_comment", Endpoint { path: "/api/v1/tasks/{0}/comments", method: HttpMethod::Post }),
    ("offer", Endpoint { path: "/api/v1/tasks/{0}/offers", method: HttpMethod::Get }),
    ("offer_accept", Endpoint { path: "/api/v1/tasks/{0}/offers/{1}/accept", method: HttpMethod::Post }),
    ("offer_counter", Endpoint { path: "/api/v1/tasks/{0}/offers/{1}/counter", method: HttpMethod::Post }),
    ("offer_decline", Endpoint { path: "/api/v1/tasks/{0}/offers/{1}/decline", method: HttpMethod::Post }),
];

/// Look up a logical operation name in the registry.
pub fn lookup(name: &str) -> Result<&'static Endpoint, ApiError> {
    ENDPOINTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, endpoint)| endpoint)
        .ok_or_else(|| ApiError::UnknownEndpoint(name.to_string()))
}

/// Substitute positional placeholders in `template` from `ids`.
///
/// Fails when the template references an index beyond the supplied ids;
/// surplus ids are ignored, matching positional-format semantics.
pub fn format_path(template: &str, ids: &[String]) -> Result<String, ApiError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            ApiError::MalformedPathArguments(format!("unterminated placeholder in {template}"))
        })?;
        let index: usize = after[..close].parse().map_err(|_| {
            ApiError::MalformedPathArguments(format!("non-numeric placeholder in {template}"))
        })?;
        let id = ids.get(index).ok_or_else(|| {
            ApiError::MalformedPathArguments(format!(
                "{template} needs argument {{{index}}} but only {} supplied",
                ids.len()
            ))
        })?;
        out.push_str(id);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
