//! Access reconciliation: lookup, onboard and offboard a user against a
//! directory group.
//!
//! Each operation recomputes the directory state from scratch and applies
//! at most the one mutation needed to reach the target state. Nothing is
//! cached between operations.

use tracing::{info, warn};

use crate::client::Directory;
use crate::error::{DirectoryResult, ReconcileError, ReconcileResult};
use crate::models::{matches_ignore_case, GroupId, UserId};
use crate::profile::NewUser;

/// Result of [`AccessReconciler::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// No user with that email exists in the tenant.
    NoSuchUser,
    /// The user exists but the group does not.
    NoSuchGroup,
    /// The user exists and is not in the group.
    NotMember,
    /// The user is a first-level member of the group.
    Member,
}

impl LookupOutcome {
    /// Whether the user currently has access.
    #[must_use]
    pub fn has_access(&self) -> bool {
        matches!(self, Self::Member)
    }
}

/// Result of [`AccessReconciler::onboard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardOutcome {
    /// The user was added to the group.
    Granted { user_id: UserId, created: bool },
    /// The user was already a member; nothing was changed.
    AlreadyMember,
    /// The target group does not exist; nothing was changed.
    NoSuchGroup,
    /// The directory refused the membership change.
    GrantFailed { user_id: UserId, detail: String },
}

impl OnboardOutcome {
    /// Whether access was granted by this run.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }
}

/// Result of [`AccessReconciler::offboard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OffboardOutcome {
    /// The user was removed from the group.
    Revoked,
    /// No user with that email exists in the tenant.
    NoSuchUser,
    /// The group does not exist.
    NoSuchGroup,
    /// The user is not a member; nothing was changed.
    NotMember,
    /// The directory refused the membership change.
    RevokeFailed { detail: String },
}

impl OffboardOutcome {
    /// Whether access was revoked by this run.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Revoked)
    }
}

/// Optional name overrides for users created during onboarding.
#[derive(Debug, Clone, Default)]
pub struct OnboardRequest {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

/// Drives a [`Directory`] to the requested access state.
pub struct AccessReconciler<D> {
    directory: D,
}

impl<D: Directory> AccessReconciler<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// The underlying directory.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Does `email` currently have access to `group`?
    pub async fn lookup(&self, group: &str, email: &str) -> DirectoryResult<LookupOutcome> {
        if self.directory.find_user_by_email(email).await?.is_none() {
            info!(%email, "Lookup: no such user");
            return Ok(LookupOutcome::NoSuchUser);
        }

        let Some(group_id) = self.directory.find_group_id_by_name(group).await? else {
            info!(%group, "Lookup: no such group");
            return Ok(LookupOutcome::NoSuchGroup);
        };

        let outcome = if self.is_member(&group_id, email).await? {
            LookupOutcome::Member
        } else {
            LookupOutcome::NotMember
        };
        info!(%group, %email, has_access = outcome.has_access(), "Lookup complete");
        Ok(outcome)
    }

    /// Grant `email` access to `group`, creating the user if needed.
    ///
    /// A user who is already a member is left untouched. Failure to create
    /// a missing user is returned as [`ReconcileError::UserCreation`].
    pub async fn onboard(
        &self,
        group: &str,
        email: &str,
        request: &OnboardRequest,
    ) -> ReconcileResult<OnboardOutcome> {
        let group_id = self.directory.find_group_id_by_name(group).await?;
        let user_id = self.directory.find_user_by_email(email).await?;

        let Some(group_id) = group_id else {
            warn!(%group, "Onboard: no such group");
            return Ok(OnboardOutcome::NoSuchGroup);
        };

        let (user_id, created) = match user_id {
            Some(user_id) => {
                if self.is_member(&group_id, email).await? {
                    info!(%email, %group, "Onboard: user already has access");
                    return Ok(OnboardOutcome::AlreadyMember);
                }
                info!(%email, user_id = %user_id, "Onboard: user exists, adding to group");
                (user_id, false)
            }
            None => {
                info!(%email, "Onboard: user does not exist, creating");
                let new_user = NewUser::from_email(email)
                    .with_names(request.given_name.clone(), request.family_name.clone());
                let user_id = self.create_user(&new_user).await?;
                info!(%email, user_id = %user_id, "Onboard: user created, adding to group");
                (user_id, true)
            }
        };

        match self.directory.add_member(&group_id, &user_id).await {
            Ok(()) => {
                info!(%email, %group, created, "Onboard: access granted");
                Ok(OnboardOutcome::Granted { user_id, created })
            }
            Err(e) if e.is_rejection() => {
                warn!(%email, %group, error = %e, "Onboard: add member rejected");
                Ok(OnboardOutcome::GrantFailed {
                    user_id,
                    detail: e.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Revoke `email`'s membership of `group`. The user record is kept.
    pub async fn offboard(&self, group: &str, email: &str) -> ReconcileResult<OffboardOutcome> {
        let group_id = self.directory.find_group_id_by_name(group).await?;
        let user_id = self.directory.find_user_by_email(email).await?;

        let (group_id, user_id) = match (group_id, user_id) {
            (None, _) => {
                warn!(%group, "Offboard: no such group");
                return Ok(OffboardOutcome::NoSuchGroup);
            }
            (_, None) => {
                warn!(%email, "Offboard: no such user");
                return Ok(OffboardOutcome::NoSuchUser);
            }
            (Some(g), Some(u)) => (g, u),
        };

        if !self.is_member(&group_id, email).await? {
            warn!(%email, %group, "Offboard: user is not a member");
            return Ok(OffboardOutcome::NotMember);
        }

        match self.directory.remove_member(&group_id, &user_id).await {
            Ok(()) => {
                info!(%email, %group, "Offboard: access revoked");
                Ok(OffboardOutcome::Revoked)
            }
            Err(e) if e.is_rejection() => {
                warn!(%email, %group, error = %e, "Offboard: remove member rejected");
                Ok(OffboardOutcome::RevokeFailed {
                    detail: e.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn is_member(&self, group_id: &GroupId, email: &str) -> DirectoryResult<bool> {
        let members = self.directory.group_member_emails(group_id).await?;
        let found = members.iter().any(|m| matches_ignore_case(m, email));
        info!(group_id = %group_id, %email, found, "Membership checked");
        Ok(found)
    }

    async fn create_user(&self, user: &NewUser) -> ReconcileResult<UserId> {
        self.directory
            .create_user(user)
            .await
            .map_err(|source| ReconcileError::UserCreation {
                email: user.email.clone(),
                source,
            })
    }
}
