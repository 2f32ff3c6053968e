// Authorization URL builder.
//
// Builds the provider's consent page URL from the client id, redirect URI and
// the optional state/scope/display parameters.

use std::collections::BTreeMap;

/// Parameters for building an authorization URL.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationUrlParams {
    /// Authorization endpoint URL.
    pub authorization_endpoint: String,
    /// OAuth client ID (QQ calls it appid).
    pub client_id: String,
    /// Redirect URI for the callback.
    pub redirect_uri: String,
    /// CSRF state parameter.
    pub state: Option<String>,
    /// Requested scopes.
    pub scopes: Option<Vec<String>>,
    /// Join character for scopes (default: ",").
    pub scope_joiner: Option<String>,
    /// Display hint (e.g. "mobile" on QQ).
    pub display: Option<String>,
    /// Additional query parameters, appended in key order.
    pub additional_params: BTreeMap<String, String>,
}

/// Build an OAuth2 authorization URL.
pub fn create_authorization_url(params: AuthorizationUrlParams) -> Result<url::Url, url::ParseError> {
    let mut url = url::Url::parse(&params.authorization_endpoint)?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", &params.client_id)
            .append_pair("redirect_uri", &params.redirect_uri);

        if let Some(state) = &params.state {
            query.append_pair("state", state);
        }
        if let Some(scopes) = params.scopes.as_ref().filter(|s| !s.is_empty()) {
            let joiner = params.scope_joiner.as_deref().unwrap_or(",");
            query.append_pair("scope", &scopes.join(joiner));
        }
        if let Some(display) = &params.display {
            query.append_pair("display", display);
        }
        for (key, value) in &params.additional_params {
            query.append_pair(key, value);
        }
    }

    Ok(url)
}
