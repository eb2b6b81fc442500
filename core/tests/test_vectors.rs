//! Verify endpoint dispatch against the JSON vectors in `test-vectors/`.
//!
//! Each case names an endpoint, its path arguments and options, and either
//! the request the dispatcher must produce (plus a simulated response and
//! the decoded result) or the error it must fail with. Request bodies are
//! compared as parsed JSON to avoid field-ordering false negatives.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use taskrabbit_core::{
    ApiError, Client, Config, HttpMethod, HttpRequest, HttpResponse, HttpTransport, PathArgs,
    RequestOptions,
};

const BASE_URL: &str = "http://localhost:3000";

/// Replays one canned response and records the request it was given.
#[derive(Clone)]
struct VectorTransport {
    response: Arc<Mutex<Option<HttpResponse>>>,
    seen: Arc<Mutex<Option<HttpRequest>>>,
}

impl VectorTransport {
    fn new(response: Option<HttpResponse>) -> Self {
        Self {
            response: Arc::new(Mutex::new(response)),
            seen: Arc::new(Mutex::new(None)),
        }
    }

    fn seen(&self) -> Option<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl HttpTransport for VectorTransport {
    fn execute(
        &self,
        request: &HttpRequest,
    ) -> Result<HttpResponse, Box<dyn std::error::Error + Send + Sync>> {
        *self.seen.lock().unwrap() = Some(request.clone());
        self.response
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| "no response scripted for this case".into())
    }
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn path_args(case: &Value) -> PathArgs {
    match case.get("ids") {
        Some(ids) => ids
            .as_array()
            .unwrap()
            .iter()
            .map(|id| id.as_str().unwrap().to_string())
            .collect::<Vec<_>>()
            .into(),
        None => PathArgs::default(),
    }
}

fn assert_error_kind(name: &str, err: &ApiError, expected: &str) {
    let matched = match expected {
        "UnknownEndpoint" => matches!(err, ApiError::UnknownEndpoint(_)),
        "InvalidMethod" => matches!(err, ApiError::InvalidMethod(_)),
        "MalformedPathArguments" => matches!(err, ApiError::MalformedPathArguments(_)),
        "UnexpectedStatus" => matches!(err, ApiError::UnexpectedStatus(_)),
        "MalformedResponse" => matches!(err, ApiError::MalformedResponse(_)),
        "UnknownCity" => matches!(err, ApiError::UnknownCity(_)),
        other => panic!("{name}: unknown expected_error: {other}"),
    };
    assert!(matched, "{name}: expected {expected}, got {err:?}");
}

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let endpoint = case["endpoint"].as_str().unwrap();
        let override_method = case
            .get("override_method")
            .map(|m| parse_method(m.as_str().unwrap()));
        let options = RequestOptions {
            query: Vec::new(),
            data: case.get("data").cloned(),
        };

        let response = case.get("simulated_response").map(|sim| HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        });
        let transport = VectorTransport::new(response);
        let client = Client::new(
            Config::new("key", "secret", "https://example.com/callback")
                .with_base_url(BASE_URL),
            "token",
            Box::new(transport.clone()),
        );

        let result = client.request(endpoint, path_args(case), override_method, options);

        if let Some(expected_request) = case.get("expected_request") {
            let sent = transport.seen().unwrap_or_else(|| panic!("{name}: nothing dispatched"));
            assert_eq!(
                sent.method,
                parse_method(expected_request["method"].as_str().unwrap()),
                "{name}: method"
            );
            assert_eq!(
                sent.url,
                format!("{BASE_URL}{}", expected_request["path"].as_str().unwrap()),
                "{name}: url"
            );
            if let Some(expected_body) = expected_request.get("body") {
                let body: Value =
                    serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
                assert_eq!(&body, expected_body, "{name}: body");
            } else {
                assert!(sent.body.is_none(), "{name}: body should be None");
            }
        }

        match case.get("expected_error") {
            Some(expected) => {
                let err = result.unwrap_err();
                assert_error_kind(name, &err, expected.as_str().unwrap());
            }
            None => {
                let value = result.unwrap_or_else(|e| panic!("{name}: {e}"));
                if let Some(expected) = case.get("expected_result") {
                    assert_eq!(&value, expected, "{name}: decoded result");
                }
            }
        }
    }
}
