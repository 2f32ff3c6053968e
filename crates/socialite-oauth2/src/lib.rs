#![doc = include_str!("../README.md")]

pub mod authorization_url;
pub mod base;
pub mod http;
pub mod provider;
pub mod providers;
pub mod response;
pub mod tokens;

// Re-exports
pub use authorization_url::create_authorization_url;
pub use base::{Credentials, DriverBase, DriverOptions, Redirect, SessionState, Stage};
pub use http::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use provider::SocialiteDriver;
pub use providers::QqDriver;
pub use tokens::{AccessToken, UserProfile};
