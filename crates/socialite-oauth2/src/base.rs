// DriverBase: the shared half of every driver.
//
// Holds credentials, per-session state and the per-stage response cache, and
// exposes the four capabilities a provider driver builds on: HTTP GET,
// redirect construction, merging response fields into session state, and the
// authorization code received on the callback.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use socialite_core::env::env_var;
use socialite_core::{Result, SocialiteError};

use crate::authorization_url::{AuthorizationUrlParams, create_authorization_url};
use crate::http::{DEFAULT_TIMEOUT_SECS, HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::response::{is_blank, value_text};
use crate::tokens::{AccessToken, parse_seconds, split_scopes};

/// Configuration for a driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverOptions {
    /// Client id (QQ: appid).
    pub appid: String,

    /// Client secret (QQ: appkey).
    pub secret: String,

    /// Callback URL registered with the provider.
    pub redirect_uri: String,

    /// Requested scopes.
    #[serde(default)]
    pub scope: Vec<String>,

    /// CSRF state echoed back by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Display hint for the consent page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Override of the provider's API base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// HTTP timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl DriverOptions {
    pub fn new(
        appid: impl Into<String>,
        secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            appid: appid.into(),
            secret: secret.into(),
            redirect_uri: redirect_uri.into(),
            scope: Vec::new(),
            state: None,
            display: None,
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_scopes(mut self, scopes: &[&str]) -> Self {
        self.scope = scopes.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Load options from `{PREFIX}_APPID`, `{PREFIX}_SECRET` and
    /// `{PREFIX}_REDIRECT_URI`, plus optional `{PREFIX}_SCOPE` (comma
    /// separated), `{PREFIX}_STATE` and `{PREFIX}_BASE_URL`.
    pub fn from_env(prefix: &str) -> Result<Self> {
        let required = |key: &str| {
            let name = format!("{prefix}_{key}");
            env_var(&name).ok_or_else(|| SocialiteError::Config(format!("{name} is not set")))
        };

        let mut options = Self::new(
            required("APPID")?,
            required("SECRET")?,
            required("REDIRECT_URI")?,
        );
        if let Some(scope) = env_var(&format!("{prefix}_SCOPE")) {
            options.scope = split_scopes(&scope);
        }
        options.state = env_var(&format!("{prefix}_STATE"));
        options.base_url = env_var(&format!("{prefix}_BASE_URL"));
        Ok(options)
    }
}

/// Client credentials, fixed for the lifetime of a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    appid: String,
    secret: String,
    redirect_uri: String,
}

impl Credentials {
    pub fn appid(&self) -> &str {
        &self.appid
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }
}

/// Per-session values filled in as the login flow progresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub code: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub openid: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

impl SessionState {
    /// Copy known fields from a decoded response. Unknown keys and blank
    /// values are ignored.
    pub fn merge(&mut self, data: &Map<String, Value>) {
        for (key, value) in data {
            if is_blank(value) {
                continue;
            }
            match key.as_str() {
                "access_token" => self.access_token = Some(value_text(value)),
                "refresh_token" => self.refresh_token = Some(value_text(value)),
                "openid" => self.openid = Some(value_text(value)),
                "scope" => self.scope = Some(value_text(value)),
                "expires_in" => {
                    if let Some(secs) = parse_seconds(value) {
                        self.expires_in = Some(secs);
                    }
                }
                _ => {}
            }
        }
    }
}

/// The call stage a raw response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Token,
    User,
    Refresh,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Token => "token",
            Stage::User => "user",
            Stage::Refresh => "refresh",
        }
    }
}

/// Raw decoded responses keyed by stage. A later write for the same stage
/// replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: HashMap<Stage, Map<String, Value>>,
}

impl ResponseCache {
    pub fn insert(&mut self, stage: Stage, data: Map<String, Value>) {
        self.entries.insert(stage, data);
    }

    pub fn get(&self, stage: Stage) -> Option<&Map<String, Value>> {
        self.entries.get(&stage)
    }
}

/// Outcome of `authorize`: either the bare URL or a redirect for the host
/// framework to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Url(url::Url),
    Found { location: url::Url },
}

impl Redirect {
    pub fn url(&self) -> &url::Url {
        match self {
            Redirect::Url(url) => url,
            Redirect::Found { location } => location,
        }
    }

    /// The HTTP status a host framework should answer with.
    pub fn status(&self) -> u16 {
        match self {
            Redirect::Url(_) => 200,
            Redirect::Found { .. } => 302,
        }
    }

    /// `Location` header value for a redirect, `None` for a bare URL.
    pub fn location(&self) -> Option<&str> {
        match self {
            Redirect::Url(_) => None,
            Redirect::Found { location } => Some(location.as_str()),
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Redirect::Found { .. })
    }
}

/// Shared driver state and capabilities.
#[derive(Debug, Clone)]
pub struct DriverBase {
    name: &'static str,
    base_url: url::Url,
    credentials: Credentials,
    options: DriverOptions,
    state: SessionState,
    responses: ResponseCache,
    http: Arc<dyn HttpClient>,
}

impl DriverBase {
    /// Create a base with the default `reqwest` client.
    pub fn new(name: &'static str, default_base_url: &str, options: DriverOptions) -> Result<Self> {
        let http = ReqwestHttpClient::with_timeout(Duration::from_secs(options.timeout_secs))?;
        Self::with_http_client(name, default_base_url, options, Arc::new(http))
    }

    pub fn with_http_client(
        name: &'static str,
        default_base_url: &str,
        options: DriverOptions,
        http: Arc<dyn HttpClient>,
    ) -> Result<Self> {
        let raw_base = options.base_url.as_deref().unwrap_or(default_base_url);
        let base_url = parse_base_url(raw_base)?;

        Ok(Self {
            name,
            base_url,
            credentials: Credentials {
                appid: options.appid.clone(),
                secret: options.secret.clone(),
                redirect_uri: options.redirect_uri.clone(),
            },
            options,
            state: SessionState::default(),
            responses: ResponseCache::default(),
            http,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// Resolve a path against the base URL; absolute URLs pass through.
    pub fn endpoint(&self, path: &str) -> Result<url::Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(url::Url::parse(path)?);
        }
        Ok(self.base_url.join(path)?)
    }

    /// Issue a GET request.
    pub async fn http_get(
        &self,
        path: &str,
        query: Vec<(String, String)>,
        headers: Vec<(String, String)>,
    ) -> Result<HttpResponse> {
        let url = self.endpoint(path)?;
        tracing::debug!(driver = self.name, url = %url, "GET");

        let request = query
            .into_iter()
            .fold(HttpRequest::get(url.as_str()), |req, (k, v)| req.query(k, v));
        let request = headers
            .into_iter()
            .fold(request, |req, (k, v)| req.header(k, v));
        let response = self.http.get(request).await?;

        tracing::debug!(driver = self.name, url = %url, status = response.status, "response");
        Ok(response)
    }

    /// Build the authorization URL for `path`, wrapped as a redirect when
    /// `should_redirect` is set.
    pub fn redirect(&self, path: &str, should_redirect: bool) -> Result<Redirect> {
        let url = create_authorization_url(AuthorizationUrlParams {
            authorization_endpoint: self.endpoint(path)?.to_string(),
            client_id: self.credentials.appid.clone(),
            redirect_uri: self.credentials.redirect_uri.clone(),
            state: self.options.state.clone(),
            scopes: Some(self.options.scope.clone()),
            scope_joiner: None,
            display: self.options.display.clone(),
            additional_params: Default::default(),
        })?;

        Ok(if should_redirect {
            Redirect::Found { location: url }
        } else {
            Redirect::Url(url)
        })
    }

    /// Merge response fields into the session state.
    pub fn config(&mut self, data: &Map<String, Value>) {
        self.state.merge(data);
    }

    /// The authorization code received on the callback.
    pub fn current_code(&self) -> Result<String> {
        self.state.code.clone().ok_or(SocialiteError::MissingCode)
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.state.code = Some(code.into());
    }

    pub fn record_response(&mut self, stage: Stage, data: Map<String, Value>) {
        self.responses.insert(stage, data);
    }

    pub fn response(&self, stage: Stage) -> Option<&Map<String, Value>> {
        self.responses.get(stage)
    }

    /// Snapshot of the current token fields, if a token has been obtained.
    ///
    /// Built from the latest refresh response when there is one.
    pub fn access_token(&self) -> Option<AccessToken> {
        let mut token = self
            .response(Stage::Refresh)
            .or_else(|| self.response(Stage::Token))
            .and_then(AccessToken::from_fields)?;
        if token.refresh_token.is_none() {
            token.refresh_token = self.state.refresh_token.clone();
        }
        Some(token)
    }
}

fn parse_base_url(raw: &str) -> Result<url::Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = url::Url::parse(&normalized)?;
    if url.cannot_be_a_base() {
        return Err(SocialiteError::Config(format!("invalid base URL: {raw}")));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> DriverOptions {
        DriverOptions::new("101234", "s3cr3t", "https://example.com/callback/qq")
    }

    fn base() -> DriverBase {
        DriverBase::new("qq", "https://graph.qq.com/", options()).unwrap()
    }

    #[test]
    fn endpoint_resolution() {
        let base = base();
        assert_eq!(
            base.endpoint("oauth2.0/token").unwrap().as_str(),
            "https://graph.qq.com/oauth2.0/token"
        );
        assert_eq!(
            base.endpoint("https://other.example.com/x").unwrap().as_str(),
            "https://other.example.com/x"
        );
    }

    #[test]
    fn base_url_override_gets_trailing_slash() {
        let base = DriverBase::new(
            "qq",
            "https://graph.qq.com/",
            options().with_base_url("http://127.0.0.1:9000/mock"),
        )
        .unwrap();
        assert_eq!(
            base.endpoint("oauth2.0/me").unwrap().as_str(),
            "http://127.0.0.1:9000/mock/oauth2.0/me"
        );
    }

    #[test]
    fn invalid_base_url() {
        let result = DriverBase::new("qq", "https://graph.qq.com/", options().with_base_url("mailto:x"));
        assert!(result.is_err());
    }

    #[test]
    fn redirect_modes() {
        let base = base();
        let plain = base.redirect("oauth2.0/authorize", false).unwrap();
        assert!(!plain.is_redirect());
        assert_eq!(plain.status(), 200);
        assert_eq!(plain.location(), None);

        let found = base.redirect("oauth2.0/authorize", true).unwrap();
        assert_eq!(found.status(), 302);
        assert_eq!(found.url(), plain.url());
        assert!(found
            .location()
            .unwrap()
            .starts_with("https://graph.qq.com/oauth2.0/authorize?response_type=code&client_id=101234"));
    }

    #[test]
    fn merge_only_known_fields() {
        let mut state = SessionState::default();
        let data = json!({
            "access_token": "T1",
            "refresh_token": "R1",
            "expires_in": "7776000",
            "client_id": "someone-else",
            "openid": "",
        });
        state.merge(data.as_object().unwrap());

        assert_eq!(state.access_token.as_deref(), Some("T1"));
        assert_eq!(state.refresh_token.as_deref(), Some("R1"));
        assert_eq!(state.expires_in, Some(7_776_000));
        assert_eq!(state.openid, None);
    }

    #[test]
    fn config_never_touches_credentials() {
        let mut base = base();
        let data = json!({"client_id": "other", "openid": "O1"});
        base.config(data.as_object().unwrap());
        assert_eq!(base.credentials().appid(), "101234");
        assert_eq!(base.state().openid.as_deref(), Some("O1"));
    }

    #[test]
    fn missing_code() {
        let mut base = base();
        assert!(matches!(base.current_code(), Err(SocialiteError::MissingCode)));
        base.set_code("c1");
        assert_eq!(base.current_code().unwrap(), "c1");
    }

    #[test]
    fn access_token_prefers_refresh_stage() {
        let mut base = base();
        assert!(base.access_token().is_none());

        let token = json!({"access_token": "T1", "refresh_token": "R1"});
        base.record_response(Stage::Token, token.as_object().unwrap().clone());
        base.config(token.as_object().unwrap());
        assert_eq!(base.access_token().unwrap().access_token, "T1");

        let refreshed = json!({"access_token": "T2"});
        base.record_response(Stage::Refresh, refreshed.as_object().unwrap().clone());
        let snapshot = base.access_token().unwrap();
        assert_eq!(snapshot.access_token, "T2");
        assert_eq!(snapshot.refresh_token.as_deref(), Some("R1"));
    }

    #[test]
    fn options_from_env() {
        std::env::set_var("SOCIALITE_BASE_TEST_APPID", "101234");
        std::env::set_var("SOCIALITE_BASE_TEST_SECRET", "s3cr3t");
        std::env::set_var("SOCIALITE_BASE_TEST_REDIRECT_URI", "https://example.com/cb");
        std::env::set_var("SOCIALITE_BASE_TEST_SCOPE", "get_user_info,list_album");

        let options = DriverOptions::from_env("SOCIALITE_BASE_TEST").unwrap();
        assert_eq!(options.appid, "101234");
        assert_eq!(options.scope, vec!["get_user_info", "list_album"]);
        assert_eq!(options.timeout_secs, DEFAULT_TIMEOUT_SECS);

        let err = DriverOptions::from_env("SOCIALITE_BASE_TEST_MISSING").unwrap_err();
        assert!(err.to_string().contains("SOCIALITE_BASE_TEST_MISSING_APPID"));
    }

    #[test]
    fn options_deserialize_camel_case() {
        let options: DriverOptions = serde_json::from_value(json!({
            "appid": "1",
            "secret": "2",
            "redirectUri": "https://example.com/cb",
        }))
        .unwrap();
        assert_eq!(options.redirect_uri, "https://example.com/cb");
        assert_eq!(options.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(options.scope.is_empty());
    }
}
