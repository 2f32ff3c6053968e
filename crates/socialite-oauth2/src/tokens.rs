// Token and profile types.
//
// AccessToken: snapshot of the token fields a provider returned.
// UserProfile: normalized user information shared by every driver.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::response::value_text;

/// Token fields accumulated from the token and refresh endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Raw decoded response, keeps provider-specific fields.
    #[serde(default)]
    pub raw: Map<String, Value>,
}

impl AccessToken {
    /// Build from a decoded token response. Returns `None` without an
    /// `access_token` field.
    pub fn from_fields(data: &Map<String, Value>) -> Option<Self> {
        let access_token = data
            .get("access_token")
            .map(value_text)
            .filter(|t| !t.is_empty())?;

        let expires_in = data.get("expires_in").and_then(parse_seconds);
        let expires_at = expires_in.map(|secs| Utc::now() + Duration::seconds(secs));

        Some(Self {
            access_token,
            refresh_token: data
                .get("refresh_token")
                .map(value_text)
                .filter(|t| !t.is_empty()),
            expires_in,
            expires_at,
            scopes: data
                .get("scope")
                .map(value_text)
                .map(|s| split_scopes(&s))
                .unwrap_or_default(),
            raw: data.clone(),
        })
    }

    /// Whether the token has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

/// Expiry given as a number or a numeric string.
pub(crate) fn parse_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Scopes come comma- or space-separated depending on the endpoint.
pub(crate) fn split_scopes(scope: &str) -> Vec<String> {
    scope
        .split([',', ' '])
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Normalized user information returned by a driver.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Provider-specific stable user id (the open id on QQ).
    pub uid: String,
    pub display_name: String,
    pub avatar_url: String,
    /// Empty when the provider does not share email addresses.
    pub email: String,
}
