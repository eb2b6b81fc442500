//! Full client lifecycle against the live mock server.
//!
//! Starts the fake TaskRabbit API on a random port and drives every facade
//! operation and entity action over real HTTP using a ureq-backed
//! [`HttpTransport`]. Validates that dispatch, auth headers and hydration
//! work end-to-end with an actual server.

use serde_json::{json, Map};

use taskrabbit_core::{
    ApiError, Client, Config, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
};

/// Executes requests with ureq.
///
/// ureq's status-as-error behavior is disabled so 4xx/5xx responses come
/// back as data; status interpretation belongs to the client.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl HttpTransport for UreqTransport {
    fn execute(
        &self,
        request: &HttpRequest,
    ) -> Result<HttpResponse, Box<dyn std::error::Error + Send + Sync>> {
        let mut response = match (request.method, &request.body) {
            (HttpMethod::Get, _) => {
                let mut builder = self.agent.get(&request.url);
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                for (key, value) in &request.query {
                    builder = builder.query(key.as_str(), value.as_str());
                }
                builder.call()?
            }
            (HttpMethod::Delete, _) => {
                let mut builder = self.agent.delete(&request.url);
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()?
            }
            (HttpMethod::Post | HttpMethod::Put, body) => {
                let mut builder = match request.method {
                    HttpMethod::Put => self.agent.put(&request.url),
                    _ => self.agent.post(&request.url),
                };
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                match body {
                    Some(body) => builder.send(body.as_bytes())?,
                    None => builder.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        Ok(HttpResponse { status, headers: Vec::new(), body })
    }
}

fn start_mock_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn client_lifecycle() {
    let addr = start_mock_server();
    let config = Config::new("app-key", "app-secret", "https://example.com/callback")
        .with_base_url(&format!("http://{addr}"));
    let client = Client::new(config, "sandbox-token", Box::new(UreqTransport::new()));

    // Cities and the memo table.
    let cities = client.cities().unwrap();
    assert_eq!(cities.len(), 2);
    let city_id = client.find_city_id("metropolis").unwrap();
    assert_eq!(city_id, 2);
    let err = client.find_city_id("Nowhere").unwrap_err();
    assert!(matches!(err, ApiError::UnknownCity(_)));

    let city = client.find_city(city_id).unwrap();
    assert_eq!(city.name.as_deref(), Some("Metropolis"));

    // The authenticated account.
    let account = client.find_account().unwrap();
    assert_eq!(account.display_name.as_deref(), Some("Demo Rabbit"));
    let same = client.find_user(account.id.unwrap()).unwrap();
    assert_eq!(same.id, account.id);

    // Create a task; the response embeds the resolved city.
    let mut extra = Map::new();
    extra.insert("handyman_required".to_string(), json!(true));
    let task = client.create_task("Paint the fence", 50, "Metropolis", extra).unwrap();
    assert_eq!(task.name.as_deref(), Some("Paint the fence"));
    assert_eq!(task.state.as_deref(), Some("opened"));
    assert_eq!(task.named_price, Some(50));
    assert_eq!(task.extra["handyman_required"], json!(true));
    let nested = task.city.as_ref().expect("created task embeds its city");
    assert_eq!(nested.id, Some(2));
    let task_id = task.id.unwrap();

    // It shows up in the listing and can be fetched back.
    let tasks = client.tasks().unwrap();
    assert!(tasks.iter().any(|t| t.id == Some(task_id)));
    let fetched = client.find_task(task_id).unwrap();
    assert_eq!(fetched.name, task.name);

    // Comment, close, delete.
    let comment = fetched.comment("Gate code is 4242").unwrap();
    assert_eq!(comment["content"], "Gate code is 4242");
    assert!(fetched.close().unwrap());
    let deleted = fetched.delete().unwrap();
    assert_eq!(deleted["state"], "deleted");
    let err = client.find_task(task_id).unwrap_err();
    assert!(matches!(err, ApiError::UnexpectedStatus(404)));

    // The seeded task carries a pending offer; counter, then accept.
    let seeded = client.find_task(100).unwrap();
    let offers = seeded.offers().unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].state.as_deref(), Some("pending"));

    let countered = offers[0].counter(40, "That price is too steep").unwrap();
    assert_eq!(countered.state.as_deref(), Some("countered"));
    assert_eq!(countered.charge_price, Some(40));
    assert_eq!(countered.task_id, 100);
    // The original offer value is untouched.
    assert_eq!(offers[0].state.as_deref(), Some("pending"));

    let accepted = countered.accept().unwrap();
    assert_eq!(accepted.state.as_deref(), Some("accepted"));
}
