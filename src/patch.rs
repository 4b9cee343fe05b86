//! JSON Patch (RFC 6902) application for patch requests.
//!
//! A patch request body has the shape `{"jsonObject": <any>, "patch": [<op>...]}`.
//! Operations are applied in order; if any operation fails the whole patch
//! fails and no partial document is returned.

use json_patch::PatchOperation;
use serde_json::Value;

use crate::error::{ApiError, PatchError, ValidationError};

/// Apply the `patch` array of a request body to its `jsonObject`.
///
/// A missing `jsonObject` is treated as `null`. A `patch` that is missing or
/// not an array is rejected before anything is parsed.
pub fn apply_patch_request(body: &Value) -> Result<Value, ApiError> {
    let operations = match body.get("patch") {
        Some(Value::Array(operations)) => operations,
        _ => return Err(ValidationError::InvalidPatch.into()),
    };

    let document = body.get("jsonObject").cloned().unwrap_or(Value::Null);
    Ok(apply_operations(document, operations)?)
}

/// Parse `operations` as JSON Patch operations and apply them to `document`.
pub fn apply_operations(mut document: Value, operations: &[Value]) -> Result<Value, PatchError> {
    let operations = operations
        .iter()
        .cloned()
        .map(serde_json::from_value::<PatchOperation>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| PatchError::Malformed(e.to_string()))?;

    json_patch::patch(&mut document, &operations).map_err(|e| PatchError::Failed(e.to_string()))?;

    Ok(document)
}
