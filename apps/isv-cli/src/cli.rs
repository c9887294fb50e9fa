//! Command-line arguments and their conversion into directory settings.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use isv_directory::{ClientConfig, ClientCredentials, OnboardRequest, UserProfile};
use url::Url;

use crate::error::{CliError, CliResult};

/// isvcli - Manage group access in an IBM Security Verify tenant
#[derive(Parser)]
#[command(name = "isvcli")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Environment label recorded in the log (production, staging, development)
    #[arg(long, alias = "ENV", env = "ISV_ENV", default_value = "development")]
    pub env: String,

    /// Display name of the directory group
    #[arg(long, alias = "GROUP", env = "ISV_GROUP")]
    pub group: String,

    /// API client id
    #[arg(long, alias = "API_ID", env = "ISV_API_ID")]
    pub api_id: String,

    /// API client secret
    #[arg(long, alias = "API_KEY", env = "ISV_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Email address of the user
    #[arg(long, alias = "EMAIL", env = "ISV_EMAIL")]
    pub email: String,

    /// Tenant base URL, e.g. https://example.verify.ibm.com
    #[arg(long, alias = "TENANT", env = "ISV_TENANT")]
    pub tenant: String,

    /// Action to run: lookup, onboard or remove
    #[arg(long, alias = "ACTION", env = "ISV_ACTION", default_value = "lookup")]
    pub action: String,

    /// Given name for a user created by onboard (default: from the email)
    #[arg(long, env = "ISV_GIVEN_NAME")]
    pub given_name: Option<String>,

    /// Family name for a user created by onboard (default: from the email)
    #[arg(long, env = "ISV_FAMILY_NAME")]
    pub family_name: Option<String>,

    /// Realm stamped on created users; also the userName suffix
    #[arg(long, env = "ISV_REALM", default_value = "www.ibm.com")]
    pub realm: String,

    /// Department stamped on created users
    #[arg(long, env = "ISV_DEPARTMENT", default_value = "Techzone Users")]
    pub department: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "ISV_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Directory holding the output<ACTION>.log file
    #[arg(long, env = "ISV_LOG_DIR", default_value = ".")]
    pub log_dir: PathBuf,
}

/// The operation selected by `--action`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Lookup,
    Onboard,
    Remove,
    Unknown(String),
}

impl From<&str> for Action {
    fn from(value: &str) -> Self {
        match value {
            "lookup" => Action::Lookup,
            "onboard" => Action::Onboard,
            "remove" => Action::Remove,
            other => Action::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Lookup => f.write_str("lookup"),
            Action::Onboard => f.write_str("onboard"),
            Action::Remove => f.write_str("remove"),
            Action::Unknown(other) => f.write_str(other),
        }
    }
}

impl Cli {
    pub fn action(&self) -> Action {
        Action::from(self.action.as_str())
    }

    /// Reject inputs that cannot name a tenant, user or group.
    pub fn validate(&self) -> CliResult<()> {
        validate_tenant(&self.tenant)?;
        validate_email(&self.email)?;
        if self.group.trim().is_empty() {
            return Err(CliError::Validation("Group name cannot be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(CliError::Validation(
                "Timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn credentials(&self) -> ClientCredentials {
        ClientCredentials::new(self.api_id.clone(), self.api_key.clone())
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.tenant.trim_end_matches('/'));
        config.timeout = Duration::from_secs(self.timeout_secs);
        config.profile = UserProfile {
            realm: self.realm.clone(),
            username_domain: self.realm.clone(),
            department: self.department.clone(),
            ..UserProfile::default()
        };
        config
    }

    pub fn onboard_request(&self) -> OnboardRequest {
        OnboardRequest {
            given_name: self.given_name.clone(),
            family_name: self.family_name.clone(),
        }
    }
}

fn validate_tenant(tenant: &str) -> CliResult<()> {
    let url = Url::parse(tenant)
        .map_err(|e| CliError::Validation(format!("Invalid tenant URL '{tenant}': {e}")))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(CliError::Validation(format!(
            "Tenant URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(CliError::Validation(format!(
            "Tenant URL '{tenant}' has no host"
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> CliResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(CliError::Validation(format!(
            "Invalid email address '{email}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 11] = [
        "isvcli",
        "--group",
        "verify-group-name",
        "--api-id",
        "id",
        "--api-key",
        "key",
        "--email",
        "ben.foulkes@ca.ibm.com",
        "--tenant",
        "https://techxchange.verify.ibm.com/",
    ];

    fn parse(extra: &[&str]) -> Cli {
        let args: Vec<&str> = REQUIRED.iter().chain(extra.iter()).copied().collect();
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.env, "development");
        assert_eq!(cli.action(), Action::Lookup);
        assert_eq!(cli.realm, "www.ibm.com");
        assert_eq!(cli.department, "Techzone Users");
        assert_eq!(cli.timeout_secs, 30);
        assert_eq!(cli.log_dir, PathBuf::from("."));
        assert!(cli.given_name.is_none());
    }

    #[test]
    fn test_uppercase_flag_names_are_accepted() {
        let cli = Cli::try_parse_from([
            "isvcli",
            "--ENV=production",
            "--GROUP=verify-group-name",
            "--API_ID=id",
            "--API_KEY=key",
            "--EMAIL=ben.foulkes@ca.ibm.com",
            "--TENANT=https://techxchange.verify.ibm.com",
            "--ACTION=remove",
        ])
        .unwrap();

        assert_eq!(cli.env, "production");
        assert_eq!(cli.group, "verify-group-name");
        assert_eq!(cli.api_id, "id");
        assert_eq!(cli.email, "ben.foulkes@ca.ibm.com");
        assert_eq!(cli.action(), Action::Remove);
    }

    #[test]
    fn test_missing_required_flag_is_rejected() {
        let result = Cli::try_parse_from(["isvcli", "--group", "g"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!(Action::from("onboard"), Action::Onboard);
        assert_eq!(Action::from("remove"), Action::Remove);
        assert_eq!(
            Action::from("purge"),
            Action::Unknown("purge".to_string())
        );
        assert_eq!(Action::from("Onboard").to_string(), "Onboard");
    }

    #[test]
    fn test_client_config_from_flags() {
        let cli = parse(&["--realm", "example.com", "--department", "Ops", "--timeout-secs", "5"]);
        let config = cli.client_config();

        assert_eq!(config.tenant, "https://techxchange.verify.ibm.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.profile.realm, "example.com");
        assert_eq!(config.profile.username_domain, "example.com");
        assert_eq!(config.profile.department, "Ops");
        assert_eq!(config.profile.user_category, "federated");
    }

    #[test]
    fn test_onboard_request_carries_name_overrides() {
        let cli = parse(&["--given-name", "Ben", "--family-name", "Foulkes"]);
        let request = cli.onboard_request();
        assert_eq!(request.given_name.as_deref(), Some("Ben"));
        assert_eq!(request.family_name.as_deref(), Some("Foulkes"));
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(parse(&[]).validate().is_ok());
    }

    #[test]
    fn test_validate_tenant() {
        assert!(validate_tenant("http://127.0.0.1:8080").is_ok());
        assert!(validate_tenant("techzone-test.verify.ibm.com/").is_err());
        assert!(validate_tenant("ftp://tenant.example.com").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("a.b+tag@c.d").is_ok());
        assert!(validate_email("ab.com").is_err());
        assert!(validate_email("@b.com").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@b@c").is_err());
    }

    #[test]
    fn test_validate_empty_group() {
        let mut cli = parse(&[]);
        cli.group = "  ".to_string();
        let err = cli.validate().unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
