//! In-memory fake of the TaskRabbit REST API for tests.
//!
//! Serves the same paths as the real sandbox with the same response shapes:
//! list endpoints wrap entities in `{"items": [...]}`, tasks embed their
//! `city` as a nested object, and every route demands the `Authorization`
//! and `X-Client-Application` headers a real session carries.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub display_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Offer {
    pub id: i64,
    pub state: String,
    pub charge_price: i64,
}

#[derive(Clone, Debug)]
pub struct TaskRecord {
    pub id: i64,
    pub name: String,
    pub state: String,
    pub named_price: Option<i64>,
    pub city_id: Option<i64>,
    pub extra: Map<String, Value>,
}

/// Task-creation payload: `{"task": {...}}` with arbitrary extra fields.
#[derive(Deserialize)]
pub struct CreateTask {
    pub task: Map<String, Value>,
}

#[derive(Debug)]
pub struct Db {
    pub cities: Vec<City>,
    pub account: User,
    pub users: HashMap<i64, User>,
    pub tasks: HashMap<i64, TaskRecord>,
    pub offers: HashMap<i64, Vec<Offer>>,
    pub next_task_id: i64,
    pub next_comment_id: i64,
}

pub type SharedDb = Arc<RwLock<Db>>;

/// Seed data: two cities, one account, and one task that already has a
/// pending offer so offer routes can be exercised without a runner.
fn seed() -> Db {
    let account = User { id: 1, display_name: "Demo Rabbit".to_string() };
    let mut users = HashMap::new();
    users.insert(account.id, account.clone());

    let mut tasks = HashMap::new();
    tasks.insert(
        100,
        TaskRecord {
            id: 100,
            name: "Assemble bookshelf".to_string(),
            state: "opened".to_string(),
            named_price: Some(60),
            city_id: Some(2),
            extra: Map::new(),
        },
    );

    let mut offers = HashMap::new();
    offers.insert(
        100,
        vec![Offer { id: 7, state: "pending".to_string(), charge_price: 45 }],
    );

    Db {
        cities: vec![
            City { id: 1, name: "Boston".to_string() },
            City { id: 2, name: "Metropolis".to_string() },
        ],
        account,
        users,
        tasks,
        offers,
        next_task_id: 101,
        next_comment_id: 1,
    }
}

pub fn app() -> Router {
    let db: SharedDb = Arc::new(RwLock::new(seed()));
    Router::new()
        .route("/api/v1/cities/", get(list_cities))
        .route("/api/v1/cities/{id}", get(get_city))
        .route("/api/v1/account", get(get_account))
        .route("/api/v1/users/{id}", get(get_user))
        .route("/api/v1/tasks/", get(list_tasks).post(create_task))
        .route("/api/v1/tasks/{id}", get(get_task).delete(delete_task))
        .route("/api/v1/tasks/{id}/close", post(close_task))
        .route("/api/v1/tasks/{id}/comments", post(comment_task))
        .route("/api/v1/tasks/{id}/offers", get(list_offers))
        .route("/api/v1/tasks/{task_id}/offers/{offer_id}/accept", post(accept_offer))
        .route("/api/v1/tasks/{task_id}/offers/{offer_id}/decline", post(decline_offer))
        .route("/api/v1/tasks/{task_id}/offers/{offer_id}/counter", post(counter_offer))
        .layer(middleware::from_fn(require_auth))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Reject requests missing the session headers, like the real API does.
async fn require_auth(request: Request, next: Next) -> Result<Response, StatusCode> {
    let headers = request.headers();
    let has_oauth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("OAuth "));
    let has_app_secret = headers.get("x-client-application").is_some();
    if has_oauth && has_app_secret {
        Ok(next.run(request).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

/// Render a task the way the real API does: extras inline, the city
/// resolved into a nested object.
fn task_json(db: &Db, task: &TaskRecord) -> Value {
    let mut object = task.extra.clone();
    object.insert("id".to_string(), json!(task.id));
    object.insert("name".to_string(), json!(&task.name));
    object.insert("state".to_string(), json!(&task.state));
    if let Some(named_price) = task.named_price {
        object.insert("named_price".to_string(), json!(named_price));
    }
    if let Some(city) = task.city_id.and_then(|id| db.cities.iter().find(|c| c.id == id)) {
        object.insert("city".to_string(), json!(city));
    }
    Value::Object(object)
}

async fn list_cities(State(db): State<SharedDb>) -> Json<Value> {
    let db = db.read().await;
    Json(json!({ "items": &db.cities }))
}

async fn get_city(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
) -> Result<Json<City>, StatusCode> {
    let db = db.read().await;
    db.cities
        .iter()
        .find(|city| city.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_account(State(db): State<SharedDb>) -> Json<User> {
    Json(db.read().await.account.clone())
}

async fn get_user(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
) -> Result<Json<User>, StatusCode> {
    let db = db.read().await;
    db.users.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn list_tasks(State(db): State<SharedDb>) -> Json<Value> {
    let db = db.read().await;
    let mut items: Vec<Value> = db.tasks.values().map(|task| task_json(&db, task)).collect();
    items.sort_by_key(|task| task["id"].as_i64());
    Json(json!({ "items": items }))
}

async fn create_task(
    State(db): State<SharedDb>,
    Json(input): Json<CreateTask>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let mut fields = input.task;
    let name = fields
        .remove("name")
        .and_then(|value| value.as_str().map(str::to_string))
        .ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    let named_price = fields.remove("named_price").and_then(|value| value.as_i64());
    let city_id = fields.remove("city").and_then(|value| value.as_i64());

    let mut db = db.write().await;
    if let Some(city_id) = city_id {
        if !db.cities.iter().any(|city| city.id == city_id) {
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
    }
    let task = TaskRecord {
        id: db.next_task_id,
        name,
        state: "opened".to_string(),
        named_price,
        city_id,
        extra: fields,
    };
    db.next_task_id += 1;
    let body = task_json(&db, &task);
    db.tasks.insert(task.id, task);
    Ok((StatusCode::CREATED, Json(body)))
}

async fn get_task(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, StatusCode> {
    let db = db.read().await;
    db.tasks
        .get(&id)
        .map(|task| Json(task_json(&db, task)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_task(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, StatusCode> {
    let mut db = db.write().await;
    db.tasks
        .remove(&id)
        .map(|task| Json(json!({ "id": task.id, "state": "deleted" })))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn close_task(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, StatusCode> {
    let mut db = db.write().await;
    let task = db.tasks.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    task.state = "closed".to_string();
    let task = task.clone();
    Ok(Json(task_json(&db, &task)))
}

async fn comment_task(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
    Json(input): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let mut db = db.write().await;
    if !db.tasks.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let content = input["comment"]["content"]
        .as_str()
        .ok_or(StatusCode::UNPROCESSABLE_ENTITY)?
        .to_string();
    let comment_id = db.next_comment_id;
    db.next_comment_id += 1;
    Ok((StatusCode::CREATED, Json(json!({ "id": comment_id, "content": content }))))
}

async fn list_offers(
    State(db): State<SharedDb>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, StatusCode> {
    let db = db.read().await;
    if !db.tasks.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    let items = db.offers.get(&id).cloned().unwrap_or_default();
    Ok(Json(json!({ "items": items })))
}

fn update_offer(
    db: &mut Db,
    task_id: i64,
    offer_id: i64,
    state: &str,
    charge_price: Option<i64>,
) -> Result<Offer, StatusCode> {
    let offer = db
        .offers
        .get_mut(&task_id)
        .and_then(|offers| offers.iter_mut().find(|offer| offer.id == offer_id))
        .ok_or(StatusCode::NOT_FOUND)?;
    offer.state = state.to_string();
    if let Some(charge_price) = charge_price {
        offer.charge_price = charge_price;
    }
    Ok(offer.clone())
}

async fn accept_offer(
    State(db): State<SharedDb>,
    Path((task_id, offer_id)): Path<(i64, i64)>,
) -> Result<Json<Offer>, StatusCode> {
    let mut db = db.write().await;
    update_offer(&mut db, task_id, offer_id, "accepted", None).map(Json)
}

async fn decline_offer(
    State(db): State<SharedDb>,
    Path((task_id, offer_id)): Path<(i64, i64)>,
) -> Result<Json<Offer>, StatusCode> {
    let mut db = db.write().await;
    update_offer(&mut db, task_id, offer_id, "declined", None).map(Json)
}

async fn counter_offer(
    State(db): State<SharedDb>,
    Path((task_id, offer_id)): Path<(i64, i64)>,
    Json(input): Json<Value>,
) -> Result<Json<Offer>, StatusCode> {
    let charge_price = input["charge_price"].as_i64();
    let mut db = db.write().await;
    update_offer(&mut db, task_id, offer_id, "countered", charge_price).map(Json)
}
