//! Error mapping for processor responses
//!
//! This module interprets a raw processor response as either the list of
//! output urls or one of the failure categories of `TransformError`.
//! Rules are evaluated in a fixed order and the first match wins.

use log::error;
use serde_json::Value;

use super::{Result, TransformError};
use crate::services::qq::{ResponseBody, ResponseFields, ServiceResponse, TransformOutput};

/// Processor code for "no face detected"
const CODE_FACE_NOT_FOUND: i64 = 1001;

/// Processor code for a rejected request
const CODE_INVALID_REQUEST: i64 = -2100;

/// Processor codes returned to blocked clients
const CODES_BLOCKED: [i64; 2] = [2119, -2111];

/// Classify a processor response
pub fn classify_response(response: &ServiceResponse) -> Result<TransformOutput> {
    let fields = match &response.body {
        ResponseBody::Empty => return Err(TransformError::no_data()),
        ResponseBody::Unparsable(text) => {
            return Err(TransformError::malformed(format!("Got no data from QQ: {}", text)))
        }
        ResponseBody::Json(fields) => fields,
    };

    let msg = fields.msg.as_deref().unwrap_or("");

    if msg == "VOLUMN_LIMIT" {
        return Err(TransformError::rate_limited("QQ rate limit caught"));
    }

    if msg.contains("polaris limit") {
        return Err(TransformError::rate_limited("QQ rate limit caught (polaris limit)"));
    }

    if msg == "IMG_ILLEGAL" || msg.contains("image illegal") {
        return Err(TransformError::content_rejected());
    }

    match fields.code {
        Some(CODE_FACE_NOT_FOUND) => return Err(TransformError::face_not_found()),
        Some(CODE_INVALID_REQUEST) => {
            error!("Invalid request {}", fields.raw);
            return Err(TransformError::invalid_request());
        }
        Some(code) if CODES_BLOCKED.contains(&code) => {
            error!("Blocked {}", fields.raw);
            return Err(TransformError::blocked());
        }
        _ => {}
    }

    let extra = match &fields.extra {
        Some(extra) => extra,
        None => return Err(missing_data(fields)),
    };

    parse_extra(extra)
}

/// Parse the `extra` string of a successful response
pub fn parse_extra(extra: &str) -> Result<TransformOutput> {
    serde_json::from_str::<TransformOutput>(extra)
        .map_err(|e| TransformError::malformed(format!("Unexpected extra payload ({}): {}", e, extra)))
}

fn missing_data(fields: &ResponseFields) -> TransformError {
    let raw = match &fields.raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    TransformError::malformed(format!("Got no data from QQ: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn classify(value: Value) -> Result<TransformOutput> {
        classify_response(&ServiceResponse::from_json(200, value))
    }

    #[test]
    fn test_success_extracts_urls_in_order() {
        let output = classify(json!({
            "code": 0,
            "extra": "{\"img_urls\":[\"https://a/0.jpg\",\"https://a/1.jpg\"]}"
        }))
        .unwrap();
        assert_eq!(output.img_urls, vec!["https://a/0.jpg", "https://a/1.jpg"]);
    }

    #[test]
    fn test_rate_limit_wins_over_missing_extra() {
        let err = classify(json!({"msg": "VOLUMN_LIMIT"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);
    }

    #[test]
    fn test_malformed_extra_payload() {
        let err = classify(json!({"extra": "not json"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }
}
