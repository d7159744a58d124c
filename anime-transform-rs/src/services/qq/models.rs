//! QQ AI processor data models
//!
//! This module contains type definitions for processor requests and responses.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TransformError};

/// Origin header expected by the processor
pub const ORIGIN: &str = "https://h5.tu.qq.com";

/// Referer header expected by the processor
pub const REFERER: &str = "https://h5.tu.qq.com/";

/// Browser user agent sent with every request
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36";

/// Transformation mode offered by the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Capability {
    /// Anime repaint served from the overseas endpoint
    #[default]
    DifferentDimensionMe,
    /// Anime repaint served from the mainland endpoint
    AiPaintingAnime,
}

impl Capability {
    /// Name used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::DifferentDimensionMe => "DIFFERENT_DIMENSION_ME",
            Capability::AiPaintingAnime => "AI_PAINTING_ANIME",
        }
    }

    /// Business id the processor routes on
    pub fn busi_id(&self) -> &'static str {
        match self {
            Capability::DifferentDimensionMe => "different_dimension_me_img_entry",
            Capability::AiPaintingAnime => "ai_painting_anime_img_entry",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "DIFFERENT_DIMENSION_ME" => Ok(Capability::DifferentDimensionMe),
            "AI_PAINTING_ANIME" => Ok(Capability::AiPaintingAnime),
            _ => Err(TransformError::configuration("Wrong mode parameter specified")),
        }
    }
}

/// An image submitted for transformation
///
/// Never mutated: recovery builds a new request from the framed bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    capability: Capability,
    image_bytes: Vec<u8>,
}

impl TransformRequest {
    /// Create a new request
    pub fn new(capability: Capability, image_bytes: Vec<u8>) -> Self {
        Self {
            capability,
            image_bytes,
        }
    }

    /// Requested capability
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Serialize into the exact JSON body that goes on the wire
    pub fn to_body(&self) -> Result<String> {
        let extra = serde_json::to_string(&RequestExtra::default())?;
        let body = ProcessRequestBody {
            busi_id: self.capability.busi_id(),
            extra,
            images: vec![BASE64.encode(&self.image_bytes)],
        };
        Ok(serde_json::to_string(&body)?)
    }
}

/// POST body of a processing request
#[derive(Debug, Serialize)]
struct ProcessRequestBody<'a> {
    #[serde(rename = "busiId")]
    busi_id: &'a str,

    /// `RequestExtra` serialized to a JSON string
    extra: String,

    /// Base64 encoded images
    images: Vec<String>,
}

/// Client hints carried inside the request's `extra` string
#[derive(Debug, Serialize)]
struct RequestExtra {
    face_rects: Vec<Value>,
    version: u32,
    platform: &'static str,
}

impl Default for RequestExtra {
    fn default() -> Self {
        Self {
            face_rects: Vec::new(),
            version: 2,
            platform: "web",
        }
    }
}

/// Body of a processor response
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Nothing usable came back (empty text or a falsy JSON scalar)
    Empty,
    /// JSON body with the fields the client understands
    Json(ResponseFields),
    /// Text that is not JSON
    Unparsable(String),
}

/// Typed view of the fields of a JSON response
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseFields {
    pub msg: Option<String>,
    pub code: Option<i64>,
    /// Non-empty `extra` string, itself JSON
    pub extra: Option<String>,
    /// The full body, kept for diagnostics
    pub raw: Value,
}

impl ResponseFields {
    /// Extract the known fields from a JSON value
    pub fn from_value(raw: Value) -> Self {
        let msg = raw.get("msg").and_then(Value::as_str).map(str::to_string);
        let code = raw.get("code").and_then(|c| {
            c.as_i64()
                .or_else(|| c.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        });
        let extra = raw
            .get("extra")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self {
            msg,
            code,
            extra,
            raw,
        }
    }
}

/// A response as read off the wire
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    pub status_code: u16,
    pub body: ResponseBody,
}

impl ServiceResponse {
    /// Build a response from its status and body text
    pub fn from_text(status_code: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            ResponseBody::Empty
        } else {
            match serde_json::from_str::<Value>(text) {
                Ok(value) if is_falsy(&value) => ResponseBody::Empty,
                Ok(value) => ResponseBody::Json(ResponseFields::from_value(value)),
                Err(_) => ResponseBody::Unparsable(text.to_string()),
            }
        };

        Self { status_code, body }
    }

    /// Build a response from an already parsed JSON body
    pub fn from_json(status_code: u16, value: Value) -> Self {
        let body = if is_falsy(&value) {
            ResponseBody::Empty
        } else {
            ResponseBody::Json(ResponseFields::from_value(value))
        };

        Self { status_code, body }
    }
}

/// `null`, `false`, `0` and `""` carry no data
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Successful processing result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransformOutput {
    /// Output variants, in the order the processor lists them
    pub img_urls: Vec<String>,
}

impl TransformOutput {
    /// The transformed picture, conventionally the second variant
    pub fn result_url(&self) -> Result<&str> {
        self.img_urls.get(1).map(String::as_str).ok_or_else(|| {
            TransformError::malformed(format!(
                "Expected at least 2 output urls, got {}",
                self.img_urls.len()
            ))
        })
    }
}
