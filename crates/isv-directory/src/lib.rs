//! Access-lifecycle automation against an IBM Security Verify SCIM 2.0
//! directory.
//!
//! - [`auth`] exchanges API client credentials for a bearer token.
//! - [`client`] wraps the `/v2.0/Users` and `/v2.0/Groups` endpoints.
//! - [`reconciler`] composes those calls into lookup, onboard and offboard.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod profile;
pub mod reconciler;

pub use auth::{acquire_token, BearerToken, ClientCredentials};
pub use client::{ClientConfig, Directory, DirectoryClient};
pub use error::{DirectoryError, DirectoryResult, ReconcileError, ReconcileResult};
pub use models::{GroupId, UserId};
pub use profile::{NewUser, UserProfile};
pub use reconciler::{
    AccessReconciler, LookupOutcome, OffboardOutcome, OnboardOutcome, OnboardRequest,
};

/// Acquire a token for `config.tenant` and build a [`DirectoryClient`] with it.
pub async fn connect(
    config: &ClientConfig,
    credentials: &ClientCredentials,
) -> DirectoryResult<DirectoryClient> {
    let http_client = config.http_client()?;
    let token = acquire_token(&http_client, &config.tenant, credentials).await?;
    Ok(DirectoryClient::with_http_client(&config.tenant, token, http_client)
        .with_profile(config.profile.clone()))
}
