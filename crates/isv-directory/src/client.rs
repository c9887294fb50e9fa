//! SCIM 2.0 Directory Client (reqwest-based).
//!
//! Translates reconciler intents into requests against the tenant's
//! `/v2.0/Users` and `/v2.0/Groups` endpoints and decodes the responses into
//! typed values or `None` for "not found".

use crate::auth::BearerToken;
use crate::error::{DirectoryError, DirectoryResult};
use crate::models::{
    escape_scim_filter_value, matches_ignore_case, GroupId, ScimCreatedResource,
    ScimGroupResource, ScimGroupSummary, ScimListResponse, ScimPatchRequest, ScimUserResource,
    UserId,
};
use crate::profile::{NewUser, UserProfile};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Media type for every SCIM request and response body.
pub const SCIM_CONTENT_TYPE: &str = "application/scim+json";

/// Membership expansion used when reading a group.
const MEMBERSHIP_TYPE: &str = "firstLevelUsersAndGroups";

/// The directory operations the reconciler depends on.
///
/// Lookups return `Ok(None)` when the resource does not exist; an `Err`
/// always means the answer could not be determined or a mutation was refused.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Find a user by email (`emails eq` filter); first match wins.
    async fn find_user_by_email(&self, email: &str) -> DirectoryResult<Option<UserId>>;

    /// Find a group by case-insensitive display name.
    async fn find_group_id_by_name(&self, display_name: &str)
        -> DirectoryResult<Option<GroupId>>;

    /// Emails of the group's first-level members, in directory order.
    async fn group_member_emails(&self, group_id: &GroupId) -> DirectoryResult<Vec<String>>;

    /// Create a user and return its new identifier.
    async fn create_user(&self, user: &NewUser) -> DirectoryResult<UserId>;

    /// Add a user to a group's members.
    async fn add_member(&self, group_id: &GroupId, user_id: &UserId) -> DirectoryResult<()>;

    /// Remove a user from a group's members.
    async fn remove_member(&self, group_id: &GroupId, user_id: &UserId) -> DirectoryResult<()>;
}

/// Connection settings for a tenant.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Tenant base URL, e.g. `https://example.verify.ibm.com`.
    pub tenant: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Attributes stamped onto created users.
    pub profile: UserProfile,
}

impl ClientConfig {
    pub fn new(tenant: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            timeout: Duration::from_secs(30),
            profile: UserProfile::default(),
        }
    }

    /// Build the HTTP client shared by token acquisition and directory calls.
    pub fn http_client(&self) -> DirectoryResult<Client> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("isv-directory/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DirectoryError::InvalidConfig(format!("Failed to build HTTP client: {e}")))
    }
}

/// SCIM client bound to one tenant and one bearer token.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    /// Tenant base URL without trailing slash.
    base_url: String,
    token: BearerToken,
    profile: UserProfile,
    http_client: Client,
}

impl DirectoryClient {
    /// Create a client from configuration and an acquired token.
    pub fn new(config: &ClientConfig, token: BearerToken) -> DirectoryResult<Self> {
        let http_client = config.http_client()?;
        Ok(Self::with_http_client(&config.tenant, token, http_client)
            .with_profile(config.profile.clone()))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(tenant: &str, token: BearerToken, http_client: Client) -> Self {
        Self {
            base_url: tenant.trim_end_matches('/').to_string(),
            token,
            profile: UserProfile::default(),
            http_client,
        }
    }

    /// Replace the profile used when creating users.
    #[must_use]
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = profile;
        self
    }

    /// The tenant base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn users_url(&self) -> String {
        format!("{}/v2.0/Users", self.base_url)
    }

    fn groups_url(&self) -> String {
        format!("{}/v2.0/Groups", self.base_url)
    }

    fn group_url(&self, group_id: &GroupId) -> String {
        format!("{}/v2.0/Groups/{}", self.base_url, group_id)
    }

    // ── Internal HTTP Methods ─────────────────────────────────────────

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(self.token.secret())
            .header("Accept", SCIM_CONTENT_TYPE)
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> DirectoryResult<Response> {
        debug!("SCIM GET {} (query={:?})", url, query);
        let mut builder = self.http_client.get(url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        let response = self.authorize(builder).send().await?;
        check_credentials(response).await
    }

    async fn send_json<B: serde::Serialize + Sync>(
        &self,
        builder: RequestBuilder,
        body: &B,
    ) -> DirectoryResult<Response> {
        let response = self
            .authorize(builder)
            .header("Content-Type", SCIM_CONTENT_TYPE)
            .json(body)
            .send()
            .await?;
        check_credentials(response).await
    }

    async fn patch_group(
        &self,
        group_id: &GroupId,
        patch: &ScimPatchRequest,
    ) -> DirectoryResult<(StatusCode, String)> {
        let url = self.group_url(group_id);
        debug!("SCIM PATCH {}", url);
        let response = self.send_json(self.http_client.patch(&url), patch).await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl Directory for DirectoryClient {
    async fn find_user_by_email(&self, email: &str) -> DirectoryResult<Option<UserId>> {
        let filter = format!("emails eq \"{}\"", escape_scim_filter_value(email));
        let response = self.get(&self.users_url(), &[("filter", filter.as_str())]).await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%email, status = status.as_u16(), "User search returned non-success status");
            return Ok(None);
        }

        let list: ScimListResponse<ScimUserResource> = decode(response).await?;
        debug!(%email, total = ?list.total_results, "User search complete");
        let Some(user) = list.resources.and_then(|r| r.into_iter().next()) else {
            info!(%email, "User not found");
            return Ok(None);
        };

        let id = user
            .id
            .ok_or_else(|| DirectoryError::Protocol("user resource has no id".to_string()))?;
        info!(
            %email,
            user_id = %id,
            user_name = user.user_name.as_deref().unwrap_or_default(),
            "User found"
        );
        Ok(Some(UserId::new(id)))
    }

    async fn find_group_id_by_name(
        &self,
        display_name: &str,
    ) -> DirectoryResult<Option<GroupId>> {
        let response = self.get(&self.groups_url(), &[]).await?;

        let status = response.status();
        if !status.is_success() {
            warn!(group = %display_name, status = status.as_u16(), "Group listing returned non-success status");
            return Ok(None);
        }

        let list: ScimListResponse<ScimGroupSummary> = decode(response).await?;
        let Some(groups) = list.resources else {
            info!(group = %display_name, "Group listing has no resources");
            return Ok(None);
        };

        let matched = groups.into_iter().find(|g| {
            g.display_name
                .as_deref()
                .is_some_and(|name| matches_ignore_case(name, display_name))
        });

        match matched {
            Some(group) => {
                let id = group.id.ok_or_else(|| {
                    DirectoryError::Protocol(format!("group '{display_name}' has no id"))
                })?;
                info!(group = %display_name, group_id = %id, "Group found");
                Ok(Some(GroupId::new(id)))
            }
            None => {
                info!(group = %display_name, "Group not found");
                Ok(None)
            }
        }
    }

    async fn group_member_emails(&self, group_id: &GroupId) -> DirectoryResult<Vec<String>> {
        let response = self
            .get(
                &self.group_url(group_id),
                &[("membershipType", MEMBERSHIP_TYPE)],
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejected(status, response).await);
        }

        let group: ScimGroupResource = decode(response).await?;
        let emails: Vec<String> = group
            .members
            .unwrap_or_default()
            .iter()
            .filter_map(|m| m.primary_email().map(str::to_string))
            .collect();

        debug!(group_id = %group_id, members = emails.len(), "Read group membership");
        Ok(emails)
    }

    async fn create_user(&self, user: &NewUser) -> DirectoryResult<UserId> {
        let url = self.users_url();
        let payload = self.profile.payload_for(user);
        debug!("SCIM POST {} (userName={})", url, payload.user_name);

        let response = self.send_json(self.http_client.post(&url), &payload).await?;
        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(rejected(status, response).await);
        }

        let body = response.text().await?;
        let id = serde_json::from_str::<ScimCreatedResource>(&body)
            .ok()
            .and_then(|r| r.id)
            .ok_or(DirectoryError::MissingIdentifier)?;

        info!(email = %user.email, user_id = %id, "User created");
        Ok(UserId::new(id))
    }

    async fn add_member(&self, group_id: &GroupId, user_id: &UserId) -> DirectoryResult<()> {
        let (status, body) = self
            .patch_group(group_id, &ScimPatchRequest::add_member(user_id))
            .await?;

        if status.as_u16() >= 400 || (!is_json(&body) && status != StatusCode::CREATED) {
            return Err(DirectoryError::Rejected {
                status: status.as_u16(),
                detail: detail_or_status(body, status),
            });
        }

        info!(group_id = %group_id, user_id = %user_id, "Member added");
        Ok(())
    }

    async fn remove_member(&self, group_id: &GroupId, user_id: &UserId) -> DirectoryResult<()> {
        let (status, body) = self
            .patch_group(group_id, &ScimPatchRequest::remove_member(user_id))
            .await?;

        if status.as_u16() >= 400 {
            return Err(DirectoryError::Rejected {
                status: status.as_u16(),
                detail: detail_or_status(body, status),
            });
        }

        info!(group_id = %group_id, user_id = %user_id, "Member removed");
        Ok(())
    }
}

// ── Response Handling ─────────────────────────────────────────────────

/// Turn 401/403 into [`DirectoryError::Unauthorized`]; pass everything else through.
async fn check_credentials(response: Response) -> DirectoryResult<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        return Err(DirectoryError::Unauthorized {
            status: status.as_u16(),
            detail: detail_or_status(body, status),
        });
    }
    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: Response) -> DirectoryResult<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(Into::into)
}

async fn rejected(status: StatusCode, response: Response) -> DirectoryError {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    DirectoryError::Rejected {
        status: status.as_u16(),
        detail: detail_or_status(body, status),
    }
}

fn is_json(body: &str) -> bool {
    !body.trim().is_empty() && serde_json::from_str::<serde_json::Value>(body).is_ok()
}

fn detail_or_status(body: String, status: StatusCode) -> String {
    if body.trim().is_empty() {
        format!("HTTP {status}")
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = DirectoryClient::with_http_client(
            "https://tenant.verify.ibm.com/",
            BearerToken::new("t"),
            Client::new(),
        );
        assert_eq!(client.base_url(), "https://tenant.verify.ibm.com");
        assert_eq!(
            client.group_url(&GroupId::new("g-1")),
            "https://tenant.verify.ibm.com/v2.0/Groups/g-1"
        );
    }

    #[test]
    fn test_is_json() {
        assert!(is_json(r#"{"id":"x"}"#));
        assert!(!is_json(""));
        assert!(!is_json("   "));
        assert!(!is_json("<html>"));
    }

    #[test]
    fn test_detail_falls_back_to_status() {
        assert_eq!(
            detail_or_status(String::new(), StatusCode::BAD_GATEWAY),
            "HTTP 502 Bad Gateway"
        );
        assert_eq!(
            detail_or_status("boom".to_string(), StatusCode::BAD_GATEWAY),
            "boom"
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new("https://t.example.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.profile, UserProfile::default());
        assert!(config.http_client().is_ok());
    }
}
