//! Request body extractor.
//!
//! Accepts JSON and URL-encoded form bodies and exposes both as a
//! [`serde_json::Value`], so handlers can apply their own presence and type
//! checks instead of failing at deserialization.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::{ApiError, ValidationError};

/// A loosely-typed request body.
///
/// | Body | Result |
/// |---|---|
/// | empty | `{}` |
/// | `application/json`, `*+json` | parsed JSON, or `MalformedBody` |
/// | `application/x-www-form-urlencoded` | object of string fields, bracket keys nest |
/// | anything else | parsed JSON if possible, else a JSON string |
#[derive(Debug, Clone, PartialEq)]
pub struct Payload(pub Value);

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ValidationError::MalformedBody(e.body_text()))?;

        Ok(Payload(parse_body(content_type.as_deref(), &body)?))
    }
}

/// Interpret raw body bytes according to their content type.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Value, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .unwrap_or("");

    if mime == "application/json" || mime.ends_with("+json") {
        return serde_json::from_slice(body)
            .map_err(|e| ValidationError::MalformedBody(e.to_string()));
    }

    if mime == "application/x-www-form-urlencoded" {
        return Ok(parse_form(body));
    }

    Ok(serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned())))
}

/// Decode a URL-encoded form into a JSON object.
///
/// Bracketed keys build nested values: `a[b]=1` gives `{"a": {"b": "1"}}`
/// and `a[0]=x&a[1]=y` (or `a[]=x&a[]=y`) gives `{"a": ["x", "y"]}`. All
/// leaf values are strings. For repeated keys the last value wins.
fn parse_form(body: &[u8]) -> Value {
    let mut root = Map::new();

    for (key, value) in form_urlencoded::parse(body) {
        let value = Value::String(value.into_owned());
        match split_form_key(&key) {
            Some((head, path)) => {
                let slot = root.entry(head).or_insert(Value::Null);
                insert_nested(slot, &path, value);
            }
            None => {
                root.insert(key.into_owned(), value);
            }
        }
    }

    for value in root.values_mut() {
        collapse_indexed(value);
    }
    Value::Object(root)
}

/// Split `a[b][0]` into `("a", ["b", "0"])`.
///
/// Returns `None` for keys without well-formed brackets, which are then
/// used verbatim.
fn split_form_key(key: &str) -> Option<(String, Vec<String>)> {
    let open = key.find('[').filter(|&i| i > 0)?;
    let (head, mut rest) = key.split_at(open);

    let mut path = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        path.push(inner[..close].to_string());
        rest = &inner[close + 1..];
    }

    Some((head.to_string(), path))
}

fn insert_nested(slot: &mut Value, path: &[String], value: Value) {
    let Some((segment, rest)) = path.split_first() else {
        *slot = value;
        return;
    };

    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(map) = slot {
        // `[]` appends
        let key = if segment.is_empty() {
            map.len().to_string()
        } else {
            segment.clone()
        };
        insert_nested(map.entry(key).or_insert(Value::Null), rest, value);
    }
}

/// Turn objects whose keys are all array indices into arrays, ordered by index.
fn collapse_indexed(value: &mut Value) {
    let Value::Object(map) = value else {
        return;
    };

    for child in map.values_mut() {
        collapse_indexed(child);
    }

    if map.is_empty() || !map.keys().all(|k| k.parse::<usize>().is_ok()) {
        return;
    }

    let mut entries = std::mem::take(map)
        .into_iter()
        .filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v)))
        .collect::<Vec<_>>();
    entries.sort_by_key(|(i, _)| *i);
    *value = Value::Array(entries.into_iter().map(|(_, v)| v).collect());
}
