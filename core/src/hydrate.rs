//! Response-to-entity hydration.
//!
//! # Design
//! Hydration walks every key of a decoded JSON object. The three reserved
//! keys `city`, `user` and `task` are recursively hydrated into nested
//! entities — unconditionally, regardless of which entity type surrounds
//! them. Keys matching an entity's enumerated fields become typed members;
//! everything else is kept verbatim in the entity's `extra` map. A reserved
//! key holding a non-object value, or a typed field holding a value of the
//! wrong JSON type, is a contract violation and fails with
//! [`ApiError::MalformedResponse`].

use serde_json::{Map, Value};

use crate::client::Client;
use crate::entities::{City, Offer, Task, User};
use crate::error::ApiError;

/// The reserved keys split out of a response object before entity-specific
/// fields are assigned.
struct Parts<'c> {
    city: Option<Box<City<'c>>>,
    user: Option<Box<User<'c>>>,
    task: Option<Box<Task<'c>>>,
    rest: Map<String, Value>,
}

fn split<'c>(client: &'c Client, object: &Map<String, Value>) -> Result<Parts<'c>, ApiError> {
    let mut parts = Parts { city: None, user: None, task: None, rest: Map::new() };
    for (key, value) in object {
        match key.as_str() {
            "city" => parts.city = Some(Box::new(city(client, value)?)),
            "user" => parts.user = Some(Box::new(user(client, value)?)),
            "task" => parts.task = Some(Box::new(task(client, value)?)),
            _ => {
                parts.rest.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(parts)
}

pub fn city<'c>(client: &'c Client, value: &Value) -> Result<City<'c>, ApiError> {
    let parts = split(client, as_object(value, "city")?)?;
    let mut entity = City {
        client,
        id: None,
        name: None,
        city: parts.city,
        user: parts.user,
        task: parts.task,
        extra: Map::new(),
    };
    for (key, value) in parts.rest {
        match key.as_str() {
            "id" => entity.id = Some(int_field(&value, "city.id")?),
            "name" => entity.name = Some(string_field(&value, "city.name")?),
            _ => {
                entity.extra.insert(key, value);
            }
        }
    }
    Ok(entity)
}

pub fn user<'c>(client: &'c Client, value: &Value) -> Result<User<'c>, ApiError> {
    let parts = split(client, as_object(value, "user")?)?;
    let mut entity = User {
        client,
        id: None,
        display_name: None,
        city: parts.city,
        user: parts.user,
        task: parts.task,
        extra: Map::new(),
    };
    for (key, value) in parts.rest {
        match key.as_str() {
            "id" => entity.id = Some(int_field(&value, "user.id")?),
            "display_name" => {
                entity.display_name = Some(string_field(&value, "user.display_name")?)
            }
            _ => {
                entity.extra.insert(key, value);
            }
        }
    }
    Ok(entity)
}

pub fn task<'c>(client: &'c Client, value: &Value) -> Result<Task<'c>, ApiError> {
    let parts = split(client, as_object(value, "task")?)?;
    let mut entity = Task {
        client,
        id: None,
        name: None,
        state: None,
        named_price: None,
        city: parts.city,
        user: parts.user,
        task: parts.task,
        extra: Map::new(),
    };
    for (key, value) in parts.rest {
        match key.as_str() {
            "id" => entity.id = Some(int_field(&value, "task.id")?),
            "name" => entity.name = Some(string_field(&value, "task.name")?),
            "state" => entity.state = Some(string_field(&value, "task.state")?),
            "named_price" => entity.named_price = Some(int_field(&value, "task.named_price")?),
            _ => {
                entity.extra.insert(key, value);
            }
        }
    }
    Ok(entity)
}

/// Offers are scoped under a task: `task_id` comes from the caller, not the
/// response body.
pub fn offer<'c>(client: &'c Client, task_id: i64, value: &Value) -> Result<Offer<'c>, ApiError> {
    let parts = split(client, as_object(value, "offer")?)?;
    let mut entity = Offer {
        client,
        task_id,
        id: None,
        state: None,
        charge_price: None,
        city: parts.city,
        user: parts.user,
        task: parts.task,
        extra: Map::new(),
    };
    for (key, value) in parts.rest {
        match key.as_str() {
            "id" => entity.id = Some(int_field(&value, "offer.id")?),
            "state" => entity.state = Some(string_field(&value, "offer.state")?),
            "charge_price" => {
                entity.charge_price = Some(int_field(&value, "offer.charge_price")?)
            }
            _ => {
                entity.extra.insert(key, value);
            }
        }
    }
    Ok(entity)
}

/// Collection responses wrap their entities in an `items` array.
pub(crate) fn items(value: &Value) -> Result<&Vec<Value>, ApiError> {
    value
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| ApiError::MalformedResponse("expected an items array".to_string()))
}

fn as_object<'v>(value: &'v Value, kind: &str) -> Result<&'v Map<String, Value>, ApiError> {
    value
        .as_object()
        .ok_or_else(|| ApiError::MalformedResponse(format!("{kind} is not a JSON object")))
}

fn int_field(value: &Value, field: &str) -> Result<i64, ApiError> {
    value
        .as_i64()
        .ok_or_else(|| ApiError::MalformedResponse(format!("{field} is not an integer")))
}

fn string_field(value: &Value, field: &str) -> Result<String, ApiError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ApiError::MalformedResponse(format!("{field} is not a string")))
}
