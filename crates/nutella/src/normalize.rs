//! Normalization of heterogeneous upstream user payloads
//!
//! Admin API deployments wrap their user lists in several different envelope
//! shapes and name the same fields inconsistently (snake_case, camelCase,
//! legacy aliases). This module flattens all of that into one canonical
//! record shape without dropping any upstream field.

use serde::Serialize;
use serde_json::{Map, Value};

/// Known envelope shapes for an upstream user payload, in match order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawShape {
    /// Null or otherwise empty payload
    Empty,
    /// The payload itself is the list
    Plain,
    /// `{users: [...]}`
    UsersWrapped,
    /// `{data: {users: [...]}}`
    DataUsersWrapped,
    /// `{data: [...]}`
    DataWrapped,
    /// `{items: [...]}`
    ItemsWrapped,
    /// A single bare object, treated as a one-element list
    Singleton,
}

impl RawShape {
    /// Discriminate the envelope shape of an upstream payload.
    ///
    /// Checks run in strict precedence order; the first match wins.
    pub fn detect(raw: &Value) -> Self {
        match raw {
            Value::Null | Value::Bool(false) => RawShape::Empty,
            Value::String(s) if s.is_empty() => RawShape::Empty,
            Value::Array(_) => RawShape::Plain,
            _ => {
                if raw["users"].is_array() {
                    RawShape::UsersWrapped
                } else if raw["data"]["users"].is_array() {
                    RawShape::DataUsersWrapped
                } else if raw["data"].is_array() {
                    RawShape::DataWrapped
                } else if raw["items"].is_array() {
                    RawShape::ItemsWrapped
                } else {
                    RawShape::Singleton
                }
            }
        }
    }
}

/// Canonical representation of one upstream user object.
///
/// Unrecognized upstream keys are preserved verbatim in `extra` so no
/// information is lost for fields the schema does not know about.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UserRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Derived display name; see [`derive_name`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Alias fallback chains for canonical fields, first non-empty wins
const ID_ALIASES: &[&str] = &["id", "user_id", "uid", "_id"];
const EMAIL_ALIASES: &[&str] = &["email", "email_address", "emailAddress"];
const FIRST_NAME_ALIASES: &[&str] = &["firstName", "first_name", "given_name"];
const LAST_NAME_ALIASES: &[&str] = &["lastName", "last_name", "family_name"];
const DISPLAY_NAME_ALIASES: &[&str] = &["displayName", "display_name", "name", "fullName"];
const USERNAME_ALIASES: &[&str] = &["username", "login"];
const CREATED_AT_ALIASES: &[&str] = &["createdAt", "created_at", "created"];
const UPDATED_AT_ALIASES: &[&str] = &["updatedAt", "updated_at", "updated"];

/// Normalize an arbitrary upstream payload into canonical user records.
///
/// Never fails; unknown or malformed shapes degrade to a best-effort
/// single-element or empty output.
pub fn normalize_users(raw: Value) -> Vec<UserRecord> {
    extract_elements(raw).into_iter().map(normalize_one).collect()
}

/// Unwrap the envelope and return the element list
fn extract_elements(raw: Value) -> Vec<Value> {
    match RawShape::detect(&raw) {
        RawShape::Empty => Vec::new(),
        RawShape::Plain => match raw {
            Value::Array(items) => items,
            _ => Vec::new(),
        },
        RawShape::UsersWrapped => take_array(raw, &["users"]),
        RawShape::DataUsersWrapped => take_array(raw, &["data", "users"]),
        RawShape::DataWrapped => take_array(raw, &["data"]),
        RawShape::ItemsWrapped => take_array(raw, &["items"]),
        RawShape::Singleton => vec![raw],
    }
}

fn take_array(raw: Value, path: &[&str]) -> Vec<Value> {
    let mut current = raw;
    for key in path {
        current = match current {
            Value::Object(mut obj) => obj.remove(*key).unwrap_or(Value::Null),
            _ => return Vec::new(),
        };
    }
    match current {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

fn normalize_one(element: Value) -> UserRecord {
    let Value::Object(obj) = element else {
        // Non-object elements carry no fields to map
        return UserRecord::default();
    };

    let mut record = UserRecord {
        id: value_field(&obj, ID_ALIASES),
        email: string_field(&obj, EMAIL_ALIASES),
        name: None,
        first_name: string_field(&obj, FIRST_NAME_ALIASES),
        last_name: string_field(&obj, LAST_NAME_ALIASES),
        display_name: string_field(&obj, DISPLAY_NAME_ALIASES),
        username: string_field(&obj, USERNAME_ALIASES),
        created_at: value_field(&obj, CREATED_AT_ALIASES),
        updated_at: value_field(&obj, UPDATED_AT_ALIASES),
        extra: Map::new(),
    };
    record.name = derive_name(&record, &obj);

    // Pass through every upstream key not already claimed by a populated
    // canonical field, so unrecognized fields survive unchanged
    let claimed = claimed_keys(&record);
    for (key, value) in obj {
        if !claimed.contains(&key.as_str()) {
            record.extra.insert(key, value);
        }
    }

    record
}

/// Derive the canonical `name`, priority:
/// display name, then first+last space-joined, then a raw `name` field.
fn derive_name(record: &UserRecord, obj: &Map<String, Value>) -> Option<String> {
    if let Some(display) = &record.display_name {
        return Some(display.clone());
    }

    let joined: Vec<&str> = [record.first_name.as_deref(), record.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !joined.is_empty() {
        return Some(joined.join(" "));
    }

    non_empty_string(obj.get("name"))
}

/// Serialized names of the canonical fields this record populated
fn claimed_keys(record: &UserRecord) -> Vec<&'static str> {
    let mut keys = Vec::new();
    if record.id.is_some() {
        keys.push("id");
    }
    if record.email.is_some() {
        keys.push("email");
    }
    if record.name.is_some() {
        keys.push("name");
    }
    if record.first_name.is_some() {
        keys.push("firstName");
    }
    if record.last_name.is_some() {
        keys.push("lastName");
    }
    if record.display_name.is_some() {
        keys.push("displayName");
    }
    if record.username.is_some() {
        keys.push("username");
    }
    if record.created_at.is_some() {
        keys.push("createdAt");
    }
    if record.updated_at.is_some() {
        keys.push("updatedAt");
    }
    keys
}

/// First alias whose value is a non-empty string
fn string_field(obj: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|key| non_empty_string(obj.get(*key)))
}

/// First alias whose value is neither null nor an empty string
fn value_field(obj: &Map<String, Value>, aliases: &[&str]) -> Option<Value> {
    aliases.iter().find_map(|key| match obj.get(*key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(value) => Some(value.clone()),
    })
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
