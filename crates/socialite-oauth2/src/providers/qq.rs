// QQ Connect driver.
//
// QQ deviates from plain OAuth2 in three places:
// - the token endpoint answers `access_token=...&expires_in=...` even when
//   asked for JSON, and reports errors as JSONP;
// - the user id ("open id") comes from a separate `oauth2.0/me` call whose
//   body is `callback( {...} );`;
// - the profile endpoint needs the appid as `oauth_consumer_key` next to the
//   token and open id.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use socialite_core::{Result, SocialiteError};

use crate::base::{DriverBase, DriverOptions, Redirect, Stage};
use crate::http::HttpClient;
use crate::provider::SocialiteDriver;
use crate::response::{
    check_error, check_token_error, decode_json_object, decode_token_body, unwrap_jsonp, value_text,
};
use crate::tokens::{AccessToken, UserProfile};

pub const QQ_BASE_URL: &str = "https://graph.qq.com/";
pub const AUTHORIZE_PATH: &str = "oauth2.0/authorize";
pub const TOKEN_PATH: &str = "oauth2.0/token";
pub const OPENID_PATH: &str = "oauth2.0/me";
pub const USER_INFO_PATH: &str = "user/get_user_info";

const ACCEPT_JSON: (&str, &str) = ("Accept", "application/json");

/// Driver for QQ Connect (graph.qq.com).
#[derive(Debug, Clone)]
pub struct QqDriver {
    base: DriverBase,
    profile: Option<UserProfile>,
}

impl QqDriver {
    pub fn new(options: DriverOptions) -> Result<Self> {
        Ok(Self::from_base(DriverBase::new("qq", QQ_BASE_URL, options)?))
    }

    pub fn with_http_client(options: DriverOptions, http: Arc<dyn HttpClient>) -> Result<Self> {
        Ok(Self::from_base(DriverBase::with_http_client(
            "qq",
            QQ_BASE_URL,
            options,
            http,
        )?))
    }

    fn from_base(base: DriverBase) -> Self {
        Self {
            base,
            profile: None,
        }
    }

    /// Supply the authorization code received on the callback.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.base.set_code(code);
        self
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.base.set_code(code);
    }

    /// Seed a refresh token obtained in an earlier session.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.base.state_mut().refresh_token = Some(refresh_token.into());
        self
    }

    pub fn base(&self) -> &DriverBase {
        &self.base
    }

    /// The open id, if already resolved.
    pub fn open_id(&self) -> Option<&str> {
        self.base.state().openid.as_deref()
    }

    /// Snapshot of the current token fields.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.base.access_token()
    }

    /// Raw decoded response recorded for a stage.
    pub fn raw_response(&self, stage: Stage) -> Option<&Map<String, Value>> {
        self.base.response(stage)
    }

    /// Resolve the user's open id, fetching a token first if needed.
    pub async fn get_open_id(&mut self) -> Result<String> {
        if let Some(openid) = &self.base.state().openid {
            return Ok(openid.clone());
        }

        let access_token = self.get_token().await?;
        let response = self
            .base
            .http_get(OPENID_PATH, vec![pair("access_token", access_token)], Vec::new())
            .await?;

        let data = unwrap_jsonp(response.text())?;
        check_error(&data)?;
        self.base.config(&data);

        self.base
            .state()
            .openid
            .clone()
            .ok_or_else(|| SocialiteError::provider("openid response did not contain an openid"))
    }

    /// Shared by code exchange and refresh: decode, check, record, merge.
    fn absorb_token_response(&mut self, stage: Stage, body: &str) -> Result<Map<String, Value>> {
        let data = decode_token_body(body)?;
        check_token_error(&data)?;
        self.base.record_response(stage, data.clone());
        self.base.config(&data);
        Ok(data)
    }

    fn format_user_info(&self, openid: String, data: &Map<String, Value>) -> UserProfile {
        let text = |key: &str| data.get(key).map(value_text).unwrap_or_default();
        UserProfile {
            uid: openid,
            display_name: text("nickname"),
            avatar_url: text("figureurl_qq_2"),
            email: String::new(),
        }
    }
}

#[async_trait]
impl SocialiteDriver for QqDriver {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn authorize(&self, should_redirect: bool) -> Result<Redirect> {
        self.base.redirect(AUTHORIZE_PATH, should_redirect)
    }

    async fn get_token(&mut self) -> Result<String> {
        if let Some(token) = &self.base.state().access_token {
            return Ok(token.clone());
        }

        let credentials = self.base.credentials();
        let mut query = vec![
            pair("client_id", credentials.appid()),
            pair("client_secret", credentials.secret()),
            pair("code", self.base.current_code()?),
            pair("grant_type", "authorization_code"),
            pair("redirect_uri", credentials.redirect_uri()),
        ];
        if let Some(state) = &self.base.options().state {
            query.push(pair("state", state));
        }

        let response = self
            .base
            .http_get(TOKEN_PATH, query, vec![pair(ACCEPT_JSON.0, ACCEPT_JSON.1)])
            .await?;
        self.absorb_token_response(Stage::Token, response.text())?;

        self.base
            .state()
            .access_token
            .clone()
            .ok_or_else(|| SocialiteError::provider("token response did not contain an access_token"))
    }

    async fn get_user_info(&mut self, _lang: Option<&str>) -> Result<UserProfile> {
        if let Some(profile) = &self.profile {
            return Ok(profile.clone());
        }

        let access_token = self.get_token().await?;
        let openid = self.get_open_id().await?;
        let url = self.base.endpoint(USER_INFO_PATH)?;
        let query = vec![
            pair("access_token", access_token),
            pair("oauth_consumer_key", self.base.credentials().appid()),
            pair("openid", openid.as_str()),
        ];

        let response = self
            .base
            .http_get(url.as_str(), query, vec![pair(ACCEPT_JSON.0, ACCEPT_JSON.1)])
            .await?;
        let data = decode_json_object(response.text(), Stage::User.as_str())?;
        check_error(&data)?;

        let profile = self.format_user_info(openid, &data);
        self.base.record_response(Stage::User, data);
        self.profile = Some(profile.clone());
        Ok(profile)
    }

    async fn refresh_token(&mut self) -> Result<&mut Self> {
        let refresh_token = self
            .base
            .state()
            .refresh_token
            .clone()
            .ok_or(SocialiteError::MissingRefreshToken)?;

        let query = vec![
            pair("appid", self.base.credentials().appid()),
            pair("grant_type", "refresh_token"),
            pair("refresh_token", refresh_token),
        ];
        let response = self.base.http_get(TOKEN_PATH, query, Vec::new()).await?;
        self.absorb_token_response(Stage::Refresh, response.text())?;

        // Downstream values were derived from the old token.
        self.base.state_mut().openid = None;
        self.profile = None;
        Ok(self)
    }
}

fn pair(key: impl Into<String>, value: impl Into<String>) -> (String, String) {
    (key.into(), value.into())
}
