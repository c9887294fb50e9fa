//! SCIM 2.0 wire types for the subset of the directory API this crate uses.
//!
//! Response types keep every field optional or defaulted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SCIM core User schema URI.
pub const CORE_USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
/// IBM Verify User extension schema URI.
pub const IBM_USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:extension:ibm:2.0:User";
/// Enterprise User extension schema URI.
pub const ENTERPRISE_USER_SCHEMA: &str =
    "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";
/// IBM Verify Notification extension schema URI.
pub const IBM_NOTIFICATION_SCHEMA: &str =
    "urn:ietf:params:scim:schemas:extension:ibm:2.0:Notification";
/// SCIM PatchOp message schema URI.
pub const PATCH_OP_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

/// Directory-assigned user identifier. Opaque; only ever copied from a
/// directory response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Directory-assigned group identifier. Opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

macro_rules! opaque_id {
    ($ty:ident) => {
        impl $ty {
            /// Wrap an identifier returned by the directory.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(UserId);
opaque_id!(GroupId);

/// SCIM List Response (RFC 7644 Section 3.4.2).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimListResponse<T> {
    #[serde(default)]
    pub total_results: Option<i64>,

    /// Absent when the directory has nothing to list.
    #[serde(rename = "Resources")]
    pub resources: Option<Vec<T>>,
}

/// SCIM email value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScimEmail {
    #[serde(default)]
    pub value: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub email_type: Option<String>,
}

impl ScimEmail {
    /// A work email entry.
    pub fn work(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            email_type: Some("work".to_string()),
        }
    }
}

/// User resource as returned by `GET /v2.0/Users`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimUserResource {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub user_name: Option<String>,
}

/// Group entry as returned by `GET /v2.0/Groups`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimGroupSummary {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,
}

/// Member reference inside a group resource.
#[derive(Debug, Clone, Deserialize)]
pub struct ScimGroupMember {
    #[serde(default)]
    pub emails: Vec<ScimEmail>,
}

impl ScimGroupMember {
    /// The first email listed for the member, if any.
    #[must_use]
    pub fn primary_email(&self) -> Option<&str> {
        self.emails.first().and_then(|e| e.value.as_deref())
    }
}

/// Group resource as returned by `GET /v2.0/Groups/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimGroupResource {
    #[serde(default)]
    pub members: Option<Vec<ScimGroupMember>>,
}

/// User name component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimName {
    pub family_name: String,
    pub given_name: String,
}

/// IBM Verify User extension block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IbmUserExtension {
    pub realm: String,
    pub user_category: String,
    pub two_factor_authentication: bool,
}

/// Enterprise User extension block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnterpriseUserExtension {
    pub department: String,
}

/// Body of `POST /v2.0/Users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimUserPayload {
    pub schemas: Vec<String>,

    pub user_name: String,

    pub name: ScimName,

    pub emails: Vec<ScimEmail>,

    #[serde(rename = "urn:ietf:params:scim:schemas:extension:ibm:2.0:User")]
    pub ibm_extension: IbmUserExtension,

    #[serde(rename = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User")]
    pub enterprise_extension: EnterpriseUserExtension,
}

/// Response of `POST /v2.0/Users`; only the id matters.
#[derive(Debug, Clone, Deserialize)]
pub struct ScimCreatedResource {
    #[serde(default)]
    pub id: Option<String>,
}

/// SCIM PATCH operation (RFC 7644 Section 3.5.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScimPatchOp {
    pub op: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// SCIM PATCH request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScimPatchRequest {
    pub schemas: Vec<String>,

    #[serde(rename = "Operations")]
    pub operations: Vec<ScimPatchOp>,
}

impl ScimPatchRequest {
    /// Append a user to the group's `members` attribute.
    #[must_use]
    pub fn add_member(user_id: &UserId) -> Self {
        Self {
            schemas: vec![PATCH_OP_SCHEMA.to_string()],
            operations: vec![ScimPatchOp {
                op: "add".to_string(),
                path: Some("members".to_string()),
                value: Some(serde_json::json!([
                    { "type": "user", "value": user_id.as_str() }
                ])),
            }],
        }
    }

    /// Remove a user from the group's `members` attribute by value filter.
    #[must_use]
    pub fn remove_member(user_id: &UserId) -> Self {
        Self {
            schemas: vec![PATCH_OP_SCHEMA.to_string()],
            operations: vec![ScimPatchOp {
                op: "remove".to_string(),
                path: Some(format!(
                    "members[value eq \"{}\"]",
                    escape_scim_filter_value(user_id.as_str())
                )),
                value: None,
            }],
        }
    }
}

/// Case-insensitive comparison used for emails and display names.
#[must_use]
pub fn matches_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Escape a value for use inside a SCIM filter string literal.
///
/// Backslashes and double-quotes are escaped (RFC 7644 Section 3.4.2.2).
#[must_use]
pub fn escape_scim_filter_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
