use crate::config_loader::MasterConfig;
use crate::core::host_manager::HostManager;
use crate::core::remote_shell::{RemoteShell, RemoteStatus, SshShell};
use crate::errors::AppError;
use crate::operations::op_helper;
use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{debug, error, info, warn};
use std::fs;
use std::io::{ErrorKind, Write};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    /// Stop at the first host that fails; later hosts are never contacted.
    #[default]
    FailFast,
    /// Visit every host, then fail if any of them did.
    ContinueOnError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOutcome {
    pub host: String,
    pub result: Result<RemoteStatus, String>,
}

impl HostOutcome {
    fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(status) if status.success())
    }
}

pub async fn handle_run_script_cli(master_config: &MasterConfig, args: &ArgMatches) -> Result<()> {
    let op_start_time = Instant::now();
    let fleet = &master_config.fleet;
    let script_arg = args
        .get_one::<String>("script")
        .context("Missing SCRIPT argument for run-script")?;
    let selectors: Option<Vec<u32>> = args.get_many::<u32>("hosts").map(|v| v.copied().collect());
    let user = args
        .get_one::<String>("user")
        .cloned()
        .unwrap_or_else(|| fleet.default_user.clone());
    let policy = if args.get_flag("keep-going") {
        ExecutionPolicy::ContinueOnError
    } else {
        ExecutionPolicy::FailFast
    };

    let base_dir = op_helper::determine_fleet_base_dir(master_config)?;
    debug!("Fleet base directory: {}", base_dir.display());

    let script_path = base_dir.join(script_arg);
    let script = fs::read(&script_path).map_err(|e| {
        let message = format!("Cannot read script '{}': {}", script_path.display(), e);
        match e.kind() {
            ErrorKind::NotFound => AppError::NotFound(message),
            _ => AppError::Io(message),
        }
    })?;

    let manager = HostManager::load(&base_dir.join(&fleet.hosts_file))?;
    let hosts = manager.select(selectors.as_deref());
    if hosts.is_empty() {
        warn!("⚠️ No hosts selected (selectors: {:?}); nothing to run.", selectors);
        return Ok(());
    }
    info!("🚚 Running '{}' as '{}' on {} host(s): {:?}", script_path.display(), user, hosts.len(), hosts);

    let shell = SshShell::new(&fleet.ssh_program, &fleet.remote_shell);
    let mut stdout = std::io::stdout();
    let outcomes = run_on_hosts(&shell, &hosts, &user, &script, policy, &mut stdout).await?;
    info!("✅ Script finished on {} host(s) in {:?}.", outcomes.len(), op_start_time.elapsed());
    Ok(())
}

/// Runs `script` on each host in order, one at a time, printing a banner to
/// `out` before each. Under `FailFast` the first failure is returned straight
/// away; under `ContinueOnError` a summary is printed and the failed hosts
/// are reported together at the end.
pub async fn run_on_hosts<S, W>(
    shell: &S,
    hosts: &[String],
    user: &str,
    script: &[u8],
    policy: ExecutionPolicy,
    out: &mut W,
) -> Result<Vec<HostOutcome>, AppError>
where
    S: RemoteShell + Sync + ?Sized,
    W: Write,
{
    let mut outcomes = Vec::with_capacity(hosts.len());

    for host in hosts {
        writeln!(out, "\nRunning script on {}\n{}", host, "=".repeat(80))?;
        out.flush()?;

        let host_start = Instant::now();
        let result = shell.run_script(user, host, script).await;
        debug!("  {} finished in {:?}: {:?}", host, host_start.elapsed(), result);

        let outcome = match result {
            Ok(status) if status.success() => HostOutcome { host: host.clone(), result: Ok(status) },
            Ok(status) => {
                error!("❌ Script failed on {}: {}", host, status);
                if policy == ExecutionPolicy::FailFast {
                    return Err(AppError::Remote { host: host.clone(), status: status.to_string() });
                }
                HostOutcome { host: host.clone(), result: Ok(status) }
            }
            Err(e) => {
                error!("❌ Could not run script on {}: {}", host, e);
                if policy == ExecutionPolicy::FailFast {
                    return Err(e);
                }
                HostOutcome { host: host.clone(), result: Err(e.to_string()) }
            }
        };
        outcomes.push(outcome);
    }

    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| !o.succeeded())
        .map(|o| o.host.as_str())
        .collect();
    if policy == ExecutionPolicy::ContinueOnError {
        writeln!(out, "\n{} of {} host(s) succeeded", outcomes.len() - failed.len(), outcomes.len())?;
        for outcome in outcomes.iter().filter(|o| !o.succeeded()) {
            match &outcome.result {
                Ok(status) => writeln!(out, "  FAILED {}: {}", outcome.host, status)?,
                Err(e) => writeln!(out, "  FAILED {}: {}", outcome.host, e)?,
            }
        }
    }
    if !failed.is_empty() {
        return Err(AppError::Remote {
            host: failed.join(", "),
            status: format!("{} of {} host(s) failed", failed.len(), outcomes.len()),
        });
    }
    Ok(outcomes)
}
