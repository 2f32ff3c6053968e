// Decoding of provider replies.
//
// Providers in this family rarely answer with plain JSON. Token endpoints
// reply `key=value&key=value`, the open-id endpoint wraps JSON in a
// `callback( ... );` JSONP envelope, and errors may come in either shape.

use serde_json::{Map, Value};
use socialite_core::{Result, SocialiteError};

const JSONP_PREFIX: &str = "callback(";
const JSONP_SUFFIX: &str = ");";

/// Parse a `key=value&key=value` body into a map of string values.
///
/// Segments without `=` map to an empty string; empty segments are skipped.
pub fn parse_urlencoded(body: &str) -> Map<String, Value> {
    let body = body.trim();
    let mut data = Map::new();
    for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
        if key.is_empty() {
            continue;
        }
        data.insert(key.into_owned(), Value::String(value.into_owned()));
    }
    data
}

/// Unwrap a `callback( {...} );` envelope into its JSON object.
pub fn unwrap_jsonp(body: &str) -> Result<Map<String, Value>> {
    let payload = body
        .trim()
        .strip_prefix(JSONP_PREFIX)
        .and_then(|rest| rest.strip_suffix(JSONP_SUFFIX))
        .map(str::trim)
        .ok_or_else(|| malformed_openid(body))?;

    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(malformed_openid(body)),
    }
}

fn malformed_openid(raw: &str) -> SocialiteError {
    SocialiteError::provider(format!(
        "get openid response error, the original data returned from remote is: {raw}"
    ))
}

/// Decode a token endpoint reply, whatever shape it came in.
///
/// JSON objects and JSONP envelopes are detected by their first characters;
/// everything else is treated as URL-encoded.
pub fn decode_token_body(body: &str) -> Result<Map<String, Value>> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        return decode_json_object(trimmed, "token");
    }
    if trimmed.starts_with(JSONP_PREFIX) {
        return unwrap_jsonp(trimmed).map_err(|_| {
            SocialiteError::provider(format!("token response could not be decoded: {body}"))
        });
    }
    Ok(parse_urlencoded(trimmed))
}

/// Decode a JSON object body.
pub fn decode_json_object(body: &str, stage: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(SocialiteError::provider(format!(
            "{stage} response is not a JSON object: {body}"
        ))),
    }
}

/// Fail when the reply carries a non-blank `error_code`.
///
/// The message is `"{error_code} : {error}"`.
pub fn check_error(data: &Map<String, Value>) -> Result<()> {
    let Some(code) = data.get("error_code").filter(|v| !is_blank(v)) else {
        return Ok(());
    };

    let message = format!(
        "{} : {}",
        value_text(code),
        data.get("error").map(value_text).unwrap_or_default()
    );
    tracing::warn!(error = %message, "provider returned an error");
    Err(SocialiteError::Provider(message))
}

/// Token endpoint variant of [`check_error`].
///
/// Token and refresh errors arrive as `{"error":100019,"error_description":..}`
/// with no `error_code`; those fail with `"{error} : {error_description}"`.
pub fn check_token_error(data: &Map<String, Value>) -> Result<()> {
    check_error(data)?;

    let Some(code) = data.get("error").filter(|v| !is_blank(v)) else {
        return Ok(());
    };

    let message = format!(
        "{} : {}",
        value_text(code),
        data.get("error_description")
            .map(value_text)
            .unwrap_or_default()
    );
    tracing::warn!(error = %message, "token endpoint returned an error");
    Err(SocialiteError::Provider(message))
}

/// Blank values: null, false, "", "0", 0 and empty collections.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty() || s == "0",
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Render a value as plain text: strings unquoted, everything else as JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
