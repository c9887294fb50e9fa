//! Mock Verify tenant using wiremock for integration testing.
//!
//! Mounts the token endpoint and the SCIM `/v2.0/Users` and `/v2.0/Groups`
//! endpoints with canned responses. Mutating endpoints can be mounted with
//! call-count expectations, which wiremock verifies when the server drops.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use isv_directory::auth::BearerToken;
use isv_directory::client::DirectoryClient;

pub const TEST_TOKEN: &str = "test-token-123";

/// A mock Verify tenant.
pub struct MockDirectory {
    server: MockServer,
}

impl MockDirectory {
    /// Start a new mock tenant.
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URI of the mock tenant.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// The underlying wiremock server.
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// A DirectoryClient authenticated with [`TEST_TOKEN`].
    pub fn client(&self) -> DirectoryClient {
        DirectoryClient::with_http_client(
            &self.uri(),
            BearerToken::new(TEST_TOKEN),
            reqwest::Client::new(),
        )
    }

    /// Requests received so far, as `"METHOD path"` strings.
    pub async fn request_log(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url.path()))
            .collect()
    }

    /// Bodies of received requests matching `method` and `path`.
    pub async fn bodies(&self, http_method: &str, request_path: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == http_method && r.url.path() == request_path)
            .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
            .collect()
    }

    // =========================================================================
    // Token endpoint
    // =========================================================================

    /// Mount a token endpoint issuing `token` for the given client id.
    pub async fn mock_token(&self, client_id: &str, token: &str) {
        Mock::given(method("POST"))
            .and(path("/v1.0/endpoint/default/token"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains(format!("client_id={client_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": token,
                "token_type": "Bearer",
                "expires_in": 7200,
                "grant_id": "g-123"
            })))
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Mount a user search for `email` returning the given users.
    pub async fn mock_user_search(&self, email: &str, users: Vec<Value>) {
        let total = users.len();
        Mock::given(method("GET"))
            .and(path("/v2.0/Users"))
            .and(query_param("filter", format!("emails eq \"{email}\"")))
            .and(header("Authorization", format!("Bearer {TEST_TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "schemas": ["urn:ietf:params:scim:api:messages:2.0:ListResponse"],
                "totalResults": total,
                "Resources": users
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a user search for `email` with no results.
    pub async fn mock_user_absent(&self, email: &str) {
        self.mock_user_search(email, vec![]).await;
    }

    /// Mount a user search for `email` returning one user.
    pub async fn mock_user_present(&self, email: &str, user_id: &str) {
        self.mock_user_search(email, vec![user_json(user_id, email)])
            .await;
    }

    /// Mount a successful user creation returning `user_id`, expected `times` times.
    pub async fn mock_create_user(&self, user_id: &str, times: u64) {
        let uid = user_id.to_string();
        Mock::given(method("POST"))
            .and(path("/v2.0/Users"))
            .and(header("Content-Type", "application/scim+json"))
            .respond_with(move |req: &Request| {
                let body: Value = serde_json::from_slice(&req.body).unwrap_or(json!({}));
                let mut response = body.clone();
                if let Some(obj) = response.as_object_mut() {
                    obj.insert("id".to_string(), json!(uid));
                }
                ResponseTemplate::new(201).set_body_json(response)
            })
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Mount a user creation failing with `status`.
    pub async fn mock_create_user_error(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/v2.0/Users"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "messageId": "CSIAI0160E",
                "messageDescription": "The user already exists."
            })))
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Mount the group collection listing `(id, displayName)` pairs.
    pub async fn mock_groups(&self, groups: &[(&str, &str)]) {
        let resources: Vec<Value> = groups
            .iter()
            .map(|(id, name)| json!({ "id": id, "displayName": name }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/v2.0/Groups"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "schemas": ["urn:ietf:params:scim:api:messages:2.0:ListResponse"],
                "totalResults": resources.len(),
                "Resources": resources
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a group resource whose first-level members have the given emails.
    pub async fn mock_group_members(&self, group_id: &str, emails: &[&str]) {
        let members: Vec<Value> = emails
            .iter()
            .enumerate()
            .map(|(i, email)| {
                json!({
                    "value": format!("member-{i}"),
                    "type": "user",
                    "emails": [{ "type": "work", "value": email }]
                })
            })
            .collect();
        Mock::given(method("GET"))
            .and(path(format!("/v2.0/Groups/{group_id}")))
            .and(query_param("membershipType", "firstLevelUsersAndGroups"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": group_id,
                "displayName": "group",
                "members": members
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a PATCH on the group answered with `status`/`body`, expected `times` times.
    pub async fn mock_patch_group(
        &self,
        group_id: &str,
        op: &str,
        status: u16,
        body: Option<Value>,
        times: u64,
    ) {
        let mut template = ResponseTemplate::new(status);
        if let Some(b) = body {
            template = template.set_body_json(b);
        }
        Mock::given(method("PATCH"))
            .and(path(format!("/v2.0/Groups/{group_id}")))
            .and(header("Content-Type", "application/scim+json"))
            .and(body_string_contains(format!("\"op\":\"{op}\"")))
            .respond_with(template)
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Fail the test if any POST or PATCH reaches the tenant.
    pub async fn expect_no_mutations(&self) {
        for verb in ["POST", "PATCH"] {
            Mock::given(method(verb))
                .and(wiremock::matchers::path_regex("^/v2\\.0/"))
                .respond_with(ResponseTemplate::new(500))
                .expect(0)
                .named(format!("unexpected {verb}"))
                .mount(&self.server)
                .await;
        }
    }
}

/// A SCIM user resource as the tenant returns it.
pub fn user_json(id: &str, email: &str) -> Value {
    json!({
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
        "id": id,
        "userName": format!("{email}@www.ibm.com"),
        "emails": [{ "type": "work", "value": email }]
    })
}
