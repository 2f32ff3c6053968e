// `socialite refresh`: trade a refresh token for a new access token.

use clap::Args;
use colored::Colorize;
use socialite_oauth2::{QqDriver, SocialiteDriver};

use super::CredentialArgs;

#[derive(Args)]
pub struct RefreshArgs {
    #[command(flatten)]
    credentials: CredentialArgs,

    /// Refresh token from an earlier exchange
    #[arg(long, env = "QQ_REFRESH_TOKEN", hide_env_values = true)]
    refresh_token: String,
}

pub async fn run(args: RefreshArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut driver =
        QqDriver::new(args.credentials.options())?.with_refresh_token(args.refresh_token);
    driver.refresh_token().await?;

    let token = driver
        .access_token()
        .ok_or("refresh response did not contain an access token")?;
    println!("{} {}", "access token:".bold(), token.access_token);
    match token.expires_at {
        Some(at) => println!("{} {}", "expires:".bold(), at.to_rfc3339()),
        None => println!("{} {}", "expires:".bold(), "unknown".yellow()),
    }
    if let Some(refresh) = token.refresh_token {
        println!("{} {}", "refresh token:".bold(), refresh.dimmed());
    }
    Ok(())
}
