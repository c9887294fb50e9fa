//! Action dispatch and outcome reporting.
//!
//! Each action prints one banner to stdout and records the same line in the
//! action log. Of the reconciliation outcomes, only a failed user creation
//! and a failed offboard exit nonzero.

use isv_directory::{
    AccessReconciler, Directory, OffboardOutcome, OnboardOutcome, ReconcileError,
};
use tracing::{info, warn};

use crate::cli::{Action, Cli};
use crate::error::{CliError, CliResult};

pub const ONBOARDED: &str = "USER SUCCESSFULLY ONBOARDED";
pub const ALREADY_HAS_ACCESS: &str = "USER ALREADY HAS ACCESS, PROCESSING TERMINATED";
pub const ONBOARD_FAILED: &str = "FAILED TO ONBOARD USER";
pub const OFFBOARDED: &str = "USER SUCCESSFULLY OFFBOARDED";
pub const OFFBOARD_FAILED: &str = "USER FAILED TO BE OFFBOARDED";

/// Run the action selected on the command line.
pub async fn execute(cli: &Cli) -> CliResult<()> {
    info!(
        "Running {} for user {} to tenant {} in {}",
        cli.action, cli.email, cli.tenant, cli.env
    );

    let action = cli.action();
    if let Action::Unknown(_) = action {
        info!("Action unknown.");
        return Ok(());
    }

    cli.validate()?;
    let directory = isv_directory::connect(&cli.client_config(), &cli.credentials()).await?;
    let reconciler = AccessReconciler::new(directory);

    match action {
        Action::Lookup => lookup(&reconciler, cli).await,
        Action::Onboard => onboard(&reconciler, cli).await,
        Action::Remove => offboard(&reconciler, cli).await,
        Action::Unknown(_) => Ok(()),
    }
}

async fn lookup<D: Directory>(reconciler: &AccessReconciler<D>, cli: &Cli) -> CliResult<()> {
    info!("Running user lookup");
    let outcome = reconciler.lookup(&cli.group, &cli.email).await?;
    report(&format!(
        "User onboarded and has group access? {}",
        outcome.has_access()
    ));
    Ok(())
}

async fn onboard<D: Directory>(reconciler: &AccessReconciler<D>, cli: &Cli) -> CliResult<()> {
    info!("Running onboard");
    let result = reconciler
        .onboard(&cli.group, &cli.email, &cli.onboard_request())
        .await;

    match result {
        Ok(OnboardOutcome::Granted { .. }) => {
            report(ONBOARDED);
            Ok(())
        }
        Ok(OnboardOutcome::AlreadyMember) => {
            report(ALREADY_HAS_ACCESS);
            Ok(())
        }
        Ok(OnboardOutcome::NoSuchGroup) => {
            warn!(group = %cli.group, "Group does not exist");
            report_failure(ONBOARD_FAILED);
            Ok(())
        }
        Ok(OnboardOutcome::GrantFailed { detail, .. }) => {
            warn!(%detail, "Directory refused the membership change");
            report_failure(ONBOARD_FAILED);
            Ok(())
        }
        Err(e @ ReconcileError::UserCreation { .. }) => {
            report_failure(ONBOARD_FAILED);
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn offboard<D: Directory>(reconciler: &AccessReconciler<D>, cli: &Cli) -> CliResult<()> {
    info!("Running user remove");
    let outcome = reconciler.offboard(&cli.group, &cli.email).await?;

    let reason = match outcome {
        OffboardOutcome::Revoked => {
            report(OFFBOARDED);
            return Ok(());
        }
        OffboardOutcome::NoSuchUser => format!("no user with email {}", cli.email),
        OffboardOutcome::NoSuchGroup => format!("group '{}' does not exist", cli.group),
        OffboardOutcome::NotMember => {
            format!("{} is not a member of '{}'", cli.email, cli.group)
        }
        OffboardOutcome::RevokeFailed { detail } => detail,
    };
    report_failure(OFFBOARD_FAILED);
    Err(CliError::OffboardFailed(reason))
}

fn report(banner: &str) {
    println!("{}", banner);
    info!("{}", banner);
}

fn report_failure(banner: &str) {
    println!("{}", banner);
    warn!("{}", banner);
}
