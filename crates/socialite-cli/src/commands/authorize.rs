// `socialite authorize`: print the consent page URL.

use clap::Args;
use colored::Colorize;
use socialite_oauth2::{QqDriver, SocialiteDriver};

use super::CredentialArgs;

#[derive(Args)]
pub struct AuthorizeArgs {
    #[command(flatten)]
    credentials: CredentialArgs,

    /// CSRF state to round-trip through the callback
    #[arg(long)]
    state: Option<String>,

    /// Comma separated scopes (e.g. get_user_info,list_album)
    #[arg(long, value_delimiter = ',')]
    scope: Vec<String>,
}

pub fn run(args: AuthorizeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = args.credentials.options();
    options.state = args.state;
    options.scope = args.scope;

    let driver = QqDriver::new(options)?;
    let redirect = driver.authorize(false)?;

    println!("{}", "Open this URL to sign in with QQ:".bold());
    println!("{}", redirect.url());
    Ok(())
}
