use crate::types::{ErrorBody, FailureReason, OcrResultSet, TransportFailure};
use reqwest::{Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Longest slice of a non-JSON error body kept as details
const MAX_DETAILS_CHARS: usize = 500;

/// Turns reqwest outcomes into results or raw transport failures.
///
/// Failure messages keep the wording the classifier keys on: a missing
/// response mentions "response", an elapsed bound mentions "timeout".
#[derive(Debug, Clone)]
pub struct ResponseConverterImpl {
    timeout: Duration,
}

impl ResponseConverterImpl {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Map a request that never produced a response
    pub fn convert_error(&self, error: &reqwest::Error) -> TransportFailure {
        if error.is_timeout() {
            return self.timeout_failure();
        }

        TransportFailure::new(
            FailureReason::NoResponse,
            "No response from server. Please check if backend is running.",
        )
        .with_details(Some(error_chain(error)))
    }

    pub fn timeout_failure(&self) -> TransportFailure {
        TransportFailure::new(
            FailureReason::Timeout,
            format!("timeout of {}ms exceeded", self.timeout.as_millis()),
        )
    }

    /// Read an upload response to completion
    pub async fn convert_upload(
        &self,
        response: Response,
    ) -> Result<OcrResultSet, TransportFailure> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.convert_error(&e))?;

        if status.is_success() {
            parse_success_body(&body)
        } else {
            Err(parse_error_body(status, &body))
        }
    }
}

/// Accept both `{success, data: {...}}` and the flat `{success, ocr_results, ...}` shape.
///
/// A body counts as a result only when it says `success: true` or carries
/// `ocr_results`; anything else is a failure keeping the backend's `error`.
pub fn parse_success_body(body: &[u8]) -> Result<OcrResultSet, TransportFailure> {
    let value: Value = serde_json::from_slice(body).map_err(unreadable)?;
    let success = value.get("success").and_then(Value::as_bool);

    if success == Some(false) {
        return Err(reported_failure(&value, "Server reported an unsuccessful result"));
    }

    let payload = match value.get("data") {
        Some(data) if data.is_object() => data,
        _ => &value,
    };
    if success != Some(true) && payload.get("ocr_results").is_none() {
        return Err(reported_failure(&value, "Server sent no OCR results"));
    }

    serde_json::from_value(payload.clone()).map_err(unreadable)
}

fn reported_failure(value: &Value, fallback: &str) -> TransportFailure {
    let message = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string();
    let details = value
        .get("details")
        .and_then(Value::as_str)
        .map(str::to_string);
    TransportFailure::new(FailureReason::InvalidResponse, message).with_details(details)
}

/// Prefer the backend's `error`/`details` fields, fall back to the status line
pub fn parse_error_body(status: StatusCode, body: &[u8]) -> TransportFailure {
    let reason = FailureReason::HttpStatus(status.as_u16());

    if let Ok(ErrorBody {
        error: Some(message),
        details,
    }) = serde_json::from_slice::<ErrorBody>(body)
    {
        return TransportFailure::new(reason, message).with_details(details);
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    let details = (!text.is_empty()).then(|| crate::formatter::truncate(text, MAX_DETAILS_CHARS));

    TransportFailure::new(reason, format!("Server returned status {status}")).with_details(details)
}

fn unreadable(error: serde_json::Error) -> TransportFailure {
    TransportFailure::new(
        FailureReason::InvalidResponse,
        format!("Server sent an unreadable result: {error}"),
    )
}

/// reqwest hides the interesting part (refused, reset, DNS) in the source chain
pub(crate) fn error_chain(error: &reqwest::Error) -> String {
    let mut text = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
