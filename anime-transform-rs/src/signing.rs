//! Request signing
//!
//! The processor rejects bodies that do not carry an `x-sign-value` derived
//! from the body itself. The value is recomputed for every submission and
//! never cached.

use md5::{Digest, Md5};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::services::qq::TransformRequest;

/// Endpoint string that prefixes the signed material
const SIGN_ENDPOINT: &str = "https://h5.tu.qq.com";

/// Secret suffix of the signed material
const SIGN_SECRET: &str = "HQ31X02e";

/// Value of the `x-sign-version` header
pub const SIGN_VERSION: &str = "v1";

/// Percent escapes of UTF-8 continuation bytes
static CONTINUATION_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%[89ABab]").expect("static regex is valid"));

/// Sign a serialized request body
///
/// The digest input is `endpoint + n + secret` where `n` is the UTF-16
/// length of the body plus the number of percent escapes in its
/// URI-component encoding that start with 8, 9, A or B.
pub fn sign(body: &str) -> String {
    let utf16_len = body.encode_utf16().count();
    let encoded = urlencoding::encode(body);
    let escapes = CONTINUATION_ESCAPE.find_iter(&encoded).count();

    let material = format!("{}{}{}", SIGN_ENDPOINT, utf16_len + escapes, SIGN_SECRET);
    let mut hasher = Md5::new();
    hasher.update(material.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A request body together with its signature headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    pub body: String,
    pub signature: String,
    pub signature_version: &'static str,
}

impl SignedPayload {
    /// Serialize and sign a request
    pub fn from_request(request: &TransformRequest) -> Result<Self> {
        let body = request.to_body()?;
        let signature = sign(&body);

        Ok(Self {
            body,
            signature,
            signature_version: SIGN_VERSION,
        })
    }
}
