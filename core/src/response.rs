//! Classification of raw responses into the three outcomes a command acts on.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;
use crate::http::HttpResponse;

/// Message used when the API reports failure without a `msg`.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Result of a completed request. Exactly one variant holds for any response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    /// Non-2xx status. `body` is the response text, unparsed.
    HttpError { status: u16, body: String },
    /// 2xx status with `"success": false` in the body.
    ApiError { message: String, body: Value },
    /// 2xx status and no failure flag.
    ApiSuccess { body: Value },
}

/// Classify a response.
///
/// Status is checked first, so an error page that is not JSON still yields
/// `HttpError`. A 2xx body that is not JSON is a `Deserialization` error.
pub fn interpret(response: &HttpResponse) -> Result<ResponseOutcome, ClientError> {
    if !response.is_success() {
        return Ok(ResponseOutcome::HttpError {
            status: response.status,
            body: response.body.clone(),
        });
    }

    let body: Value =
        serde_json::from_str(&response.body).map_err(|e| ClientError::Deserialization(e.to_string()))?;

    if body.get("success") == Some(&Value::Bool(false)) {
        let message = body
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ERROR)
            .to_string();
        return Ok(ResponseOutcome::ApiError { message, body });
    }

    Ok(ResponseOutcome::ApiSuccess { body })
}

/// Read command-specific fields out of a success body.
pub fn parse_body<T: DeserializeOwned>(body: &Value) -> Result<T, ClientError> {
    T::deserialize(body).map_err(|e| ClientError::Deserialization(e.to_string()))
}
