//! Mapping from onboarding input to the SCIM user payload.

use serde::{Deserialize, Serialize};

use crate::models::{
    EnterpriseUserExtension, IbmUserExtension, ScimEmail, ScimName, ScimUserPayload,
    CORE_USER_SCHEMA, ENTERPRISE_USER_SCHEMA, IBM_NOTIFICATION_SCHEMA, IBM_USER_SCHEMA,
};

/// Tenant-wide attributes stamped onto every user this tool creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// IBM extension realm.
    pub realm: String,
    /// Suffix appended to the email to form the `userName`.
    pub username_domain: String,
    /// Enterprise extension department.
    pub department: String,
    /// IBM extension user category.
    pub user_category: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            realm: "www.ibm.com".to_string(),
            username_domain: "www.ibm.com".to_string(),
            department: "Techzone Users".to_string(),
            user_category: "federated".to_string(),
        }
    }
}

impl UserProfile {
    /// Build the `POST /v2.0/Users` body for a new user.
    #[must_use]
    pub fn payload_for(&self, user: &NewUser) -> ScimUserPayload {
        ScimUserPayload {
            schemas: vec![
                CORE_USER_SCHEMA.to_string(),
                IBM_USER_SCHEMA.to_string(),
                ENTERPRISE_USER_SCHEMA.to_string(),
                IBM_NOTIFICATION_SCHEMA.to_string(),
            ],
            user_name: format!("{}@{}", user.email, self.username_domain),
            name: ScimName {
                family_name: user.family_name.clone(),
                given_name: user.given_name.clone(),
            },
            emails: vec![ScimEmail::work(user.email.clone())],
            ibm_extension: IbmUserExtension {
                realm: self.realm.clone(),
                user_category: self.user_category.clone(),
                two_factor_authentication: false,
            },
            enterprise_extension: EnterpriseUserExtension {
                department: self.department.clone(),
            },
        }
    }
}

/// A user to be created in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub given_name: String,
    pub family_name: String,
}

impl NewUser {
    /// Derive the name fields from the email's local part.
    ///
    /// `ben.foulkes+verify@ca.ibm.com` becomes given name `Ben`, family name
    /// `Foulkes`. A local part with a single segment yields an empty family
    /// name.
    pub fn from_email(email: impl Into<String>) -> Self {
        let email = email.into();
        let local = email.split('@').next().unwrap_or_default();
        let local = local.split('+').next().unwrap_or_default();

        let mut parts = local
            .split(['.', '_', '-'])
            .filter(|p| !p.is_empty())
            .map(capitalize);

        let given_name = parts.next().unwrap_or_default();
        let family_name = parts.collect::<Vec<_>>().join(" ");

        Self {
            email,
            given_name,
            family_name,
        }
    }

    /// Override the derived names where the caller supplied them.
    #[must_use]
    pub fn with_names(mut self, given_name: Option<String>, family_name: Option<String>) -> Self {
        if let Some(given) = given_name {
            self.given_name = given;
        }
        if let Some(family) = family_name {
            self.family_name = family;
        }
        self
    }
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
