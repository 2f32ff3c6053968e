pub mod authorize;
pub mod exchange;
pub mod refresh;

use clap::Args;
use socialite_oauth2::DriverOptions;

/// App credentials, read from the environment unless given as flags.
#[derive(Args, Debug)]
pub struct CredentialArgs {
    /// QQ Connect appid
    #[arg(long, env = "QQ_APPID")]
    pub appid: String,

    /// QQ Connect appkey
    #[arg(long, env = "QQ_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Callback URL registered for the app
    #[arg(long, env = "QQ_REDIRECT_URI")]
    pub redirect_uri: String,

    /// Override the API base URL (e.g. a local mock)
    #[arg(long, env = "QQ_BASE_URL")]
    pub base_url: Option<String>,
}

impl CredentialArgs {
    pub fn options(&self) -> DriverOptions {
        let mut options = DriverOptions::new(&self.appid, &self.secret, &self.redirect_uri);
        options.base_url = self.base_url.clone();
        options
    }
}
