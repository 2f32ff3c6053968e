// The driver contract every social provider implements.

use async_trait::async_trait;
use socialite_core::Result;

use crate::base::Redirect;
use crate::tokens::UserProfile;

/// A provider driver for one login session.
///
/// Methods take `&mut self`: access token, open id and profile are memoized
/// on the instance, and one instance serves one user at a time.
#[async_trait]
pub trait SocialiteDriver: Send + std::fmt::Debug {
    /// Provider identifier (e.g. "qq").
    fn name(&self) -> &str;

    /// Build the consent page URL; with `should_redirect` the result is a
    /// 302 redirect for the host framework to send.
    fn authorize(&self, should_redirect: bool) -> Result<Redirect>;

    /// Exchange the authorization code for an access token. Cached after the
    /// first success.
    async fn get_token(&mut self) -> Result<String>;

    /// Fetch the normalized user profile. Cached after the first success.
    async fn get_user_info(&mut self, lang: Option<&str>) -> Result<UserProfile>;

    /// Obtain a fresh access token with the stored refresh token. Always
    /// issues a request.
    async fn refresh_token(&mut self) -> Result<&mut Self>
    where
        Self: Sized;
}
