//! Domain entities: City, User, Task and Offer.
//!
//! # Design
//! Entities are produced fresh from every API response — there is no
//! identity map, so two hydrations of the same remote id give two
//! independent values. Each entity holds a non-owning reference to the
//! [`Client`] it came from so its actions can dispatch further requests.
//! Known API fields are enumerated as typed members; everything else the
//! server sends lands in `extra` for forward compatibility. Mutating
//! actions never modify the receiver: the fresh state is only available
//! through the returned value.

use std::fmt;

use serde_json::{json, Map, Value};

use crate::client::{Client, RequestOptions};
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::hydrate;

/// A city in which tasks can be posted.
pub struct City<'c> {
    pub client: &'c Client,
    pub id: Option<i64>,
    pub name: Option<String>,
    pub city: Option<Box<City<'c>>>,
    pub user: Option<Box<User<'c>>>,
    pub task: Option<Box<Task<'c>>>,
    pub extra: Map<String, Value>,
}

/// A TaskRabbit user, also returned for the authenticated account.
pub struct User<'c> {
    pub client: &'c Client,
    pub id: Option<i64>,
    pub display_name: Option<String>,
    pub city: Option<Box<City<'c>>>,
    pub user: Option<Box<User<'c>>>,
    pub task: Option<Box<Task<'c>>>,
    pub extra: Map<String, Value>,
}

/// A posted task.
pub struct Task<'c> {
    pub client: &'c Client,
    pub id: Option<i64>,
    pub name: Option<String>,
    pub state: Option<String>,
    pub named_price: Option<i64>,
    pub city: Option<Box<City<'c>>>,
    pub user: Option<Box<User<'c>>>,
    pub task: Option<Box<Task<'c>>>,
    pub extra: Map<String, Value>,
}

/// A runner's offer on a task. Carries the owning `task_id` because every
/// mutating offer operation needs both ids in the URL path.
pub struct Offer<'c> {
    pub client: &'c Client,
    pub task_id: i64,
    pub id: Option<i64>,
    pub state: Option<String>,
    pub charge_price: Option<i64>,
    pub city: Option<Box<City<'c>>>,
    pub user: Option<Box<User<'c>>>,
    pub task: Option<Box<Task<'c>>>,
    pub extra: Map<String, Value>,
}

impl<'c> Task<'c> {
    /// Close the task. Returns `true` iff the server reports the task's
    /// state as exactly `"closed"` afterwards.
    pub fn close(&self) -> Result<bool, ApiError> {
        let value =
            self.client
                .request("task_close", require_id(self.id, "task")?, None, RequestOptions::default())?;
        Ok(value.get("state").and_then(Value::as_str) == Some("closed"))
    }

    /// Delete the task, returning the decoded response as-is.
    pub fn delete(&self) -> Result<Value, ApiError> {
        self.client.request(
            "task",
            require_id(self.id, "task")?,
            Some(HttpMethod::Delete),
            RequestOptions::default(),
        )
    }

    /// Post a comment on the task, returning the decoded response as-is.
    pub fn comment(&self, content: &str) -> Result<Value, ApiError> {
        let options = RequestOptions {
            data: Some(json!({ "comment": { "content": content } })),
            ..RequestOptions::default()
        };
        self.client
            .request("task_comment", require_id(self.id, "task")?, None, options)
    }

    /// List the offers runners have made on this task.
    pub fn offers(&self) -> Result<Vec<Offer<'c>>, ApiError> {
        self.client.offers(require_id(self.id, "task")?)
    }
}

impl<'c> Offer<'c> {
    pub fn accept(&self) -> Result<Offer<'c>, ApiError> {
        self.act("offer_accept", RequestOptions::default())
    }

    pub fn decline(&self) -> Result<Offer<'c>, ApiError> {
        self.act("offer_decline", RequestOptions::default())
    }

    /// Counter the offer with a different price, returning the fresh offer.
    pub fn counter(&self, charge_price: i64, comments: &str) -> Result<Offer<'c>, ApiError> {
        let options = RequestOptions {
            data: Some(json!({ "charge_price": charge_price, "comments": comments })),
            ..RequestOptions::default()
        };
        self.act("offer_counter", options)
    }

    fn act(&self, name: &str, options: RequestOptions) -> Result<Offer<'c>, ApiError> {
        let ids = vec![
            self.task_id.to_string(),
            require_id(self.id, "offer")?.to_string(),
        ];
        let value = self.client.request(name, ids, None, options)?;
        hydrate::offer(self.client, self.task_id, &value)
    }
}

/// Entity actions need the remote id; a hydrated entity without one cannot
/// be acted on.
fn require_id(id: Option<i64>, kind: &str) -> Result<i64, ApiError> {
    id.ok_or_else(|| ApiError::MalformedResponse(format!("{kind} entity has no id")))
}

fn opt<T: fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map_or_else(|| "?".to_string(), T::to_string)
}

impl fmt::Display for City<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", opt(&self.id), opt(&self.name))
    }
}

impl fmt::Display for User<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", opt(&self.id), opt(&self.display_name))
    }
}

impl fmt::Display for Task<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", opt(&self.id), opt(&self.name))
    }
}

impl fmt::Display for Offer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task_id : {}, offer_id : {}, offer_state : {}, price : {}",
            self.task_id,
            opt(&self.id),
            opt(&self.state),
            opt(&self.charge_price)
        )
    }
}

// Debug by hand: the client back-reference is deliberately left out.

impl fmt::Debug for City<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("City")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for User<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Task<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("named_price", &self.named_price)
            .field("city", &self.city)
            .field("user", &self.user)
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Offer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Offer")
            .field("task_id", &self.task_id)
            .field("id", &self.id)
            .field("state", &self.state)
            .field("charge_price", &self.charge_price)
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}
