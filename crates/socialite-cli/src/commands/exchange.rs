// `socialite exchange`: code → token → open id → profile.

use clap::Args;
use colored::Colorize;
use socialite_oauth2::{QqDriver, SocialiteDriver};

use super::CredentialArgs;

#[derive(Args)]
pub struct ExchangeArgs {
    #[command(flatten)]
    credentials: CredentialArgs,

    /// The `code` query parameter from the callback
    #[arg(long)]
    code: String,

    /// Print the profile as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: ExchangeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut driver = QqDriver::new(args.credentials.options())?.with_code(args.code);

    driver.get_token().await?;
    let openid = driver.get_open_id().await?;
    tracing::info!(openid = %openid, "resolved open id");
    let profile = driver.get_user_info(None).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("{} {}", "uid:".bold(), profile.uid);
    println!("{} {}", "name:".bold(), profile.display_name);
    println!("{} {}", "avatar:".bold(), profile.avatar_url);
    if let Some(token) = driver.access_token() {
        if let Some(expires_at) = token.expires_at {
            println!("{} {}", "token expires:".bold(), expires_at.to_rfc3339());
        }
        if let Some(refresh) = token.refresh_token {
            println!("{} {}", "refresh token:".bold(), refresh.dimmed());
        }
    }
    Ok(())
}
