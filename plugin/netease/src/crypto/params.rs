use serde::Serialize;
use serde_json::Value;

use crate::error::{NcmError, Result};

/// Converts caller parameters into the JSON value the encoders consume.
pub fn to_request<T: Serialize + ?Sized>(params: &T) -> Result<Value> {
    serde_json::to_value(params).map_err(NcmError::InvalidInput)
}

/// Compact JSON bytes for a request body. A string value is taken as an
/// already serialized body and passed through untouched.
pub fn serialize_params(params: &Value) -> Result<Vec<u8>> {
    match params {
        Value::String(s) => Ok(s.as_bytes().to_vec()),
        Value::Null => Ok(b"{}".to_vec()),
        v => serde_json::to_vec(v).map_err(NcmError::InvalidInput),
    }
}
