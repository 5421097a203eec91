//! Run and watch command implementations

use std::path::Path;
use std::thread;
use std::time::Duration;

use colored::Colorize;
use tagwatch_compose::ComposeInvoker;
use tagwatch_core::{
    AppOutcome, FailurePolicy, PassReport, ReconcileSettings, Reconciler, load_watch_file,
};
use tagwatch_store::{GcsOptions, GcsVersionSource, LocalVersionSource};

use crate::cli::PassArgs;
use crate::error::{CliError, Result};

/// Run a single reconcile pass.
pub fn run_once(config: &Path, args: &PassArgs) -> Result<()> {
    let mut reconciler = build_reconciler(args)?;
    let targets = load_watch_file(config)?;

    let report = reconciler.run_pass(&targets);
    print_report(&report);
    report.into_result()?;
    Ok(())
}

/// Run passes forever, or until `max_passes` is reached.
///
/// The watch file is reloaded before every pass. Under the default failure
/// policy the first failed application ends the process.
pub fn run_watch(
    config: &Path,
    args: &PassArgs,
    interval: u64,
    max_passes: Option<u64>,
) -> Result<()> {
    let mut reconciler = build_reconciler(args)?;
    let interval = Duration::from_secs(interval);
    let mut pass = 0u64;

    loop {
        pass += 1;
        let targets = load_watch_file(config)?;
        tracing::debug!(pass, apps = targets.len(), "Starting pass");

        let report = reconciler.run_pass(&targets);
        print_report(&report);

        if !report.is_success() {
            match reconciler.settings().policy {
                FailurePolicy::AbortPass => {
                    report.into_result()?;
                }
                FailurePolicy::Continue => {
                    tracing::warn!(pass, "Pass finished with failures");
                }
            }
        }

        if max_passes.is_some_and(|max| pass >= max) {
            return Ok(());
        }
        thread::sleep(interval);
    }
}

fn build_reconciler(args: &PassArgs) -> Result<Reconciler> {
    let project = args
        .project
        .clone()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| {
            CliError::user(
                "No Google Cloud project configured. Set GOOGLE_CLOUD_PROJECT or pass --project.",
            )
        })?;

    let settings = ReconcileSettings {
        state_dir: args.state_dir.clone(),
        manifest_name: args.manifest_name.clone(),
        policy: if args.keep_going {
            FailurePolicy::Continue
        } else {
            FailurePolicy::AbortPass
        },
        ..ReconcileSettings::default()
    };

    let invoker = if args.compose_plugin {
        ComposeInvoker::docker_compose_plugin()
    } else {
        ComposeInvoker::with_command(args.compose_bin.clone(), Vec::<String>::new())
    };

    let reconciler = match &args.versions_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Reading versions from local directory");
            Reconciler::standard(LocalVersionSource::new(dir), invoker, settings)
        }
        None => {
            let options = GcsOptions::from_env(Some(project))
                .with_timeout(args.read_timeout.map(Duration::from_secs));
            Reconciler::standard(GcsVersionSource::new(options)?, invoker, settings)
        }
    };

    Ok(reconciler)
}

fn print_report(report: &PassReport) {
    for (name, outcome) in &report.outcomes {
        match outcome {
            AppOutcome::Unchanged { version } => {
                println!("   {} {} unchanged at {}", "=".dimmed(), name, version);
            }
            AppOutcome::Deployed {
                version,
                previous,
                sync,
            } => {
                let from = previous.as_deref().unwrap_or("nothing");
                println!(
                    "   {} {} deployed {} (was {}, {})",
                    "+".green().bold(),
                    name.bold(),
                    version.green(),
                    from,
                    sync
                );
            }
            AppOutcome::Failed(failure) => {
                println!(
                    "   {} {} {} failed: {}",
                    "x".red().bold(),
                    name.bold(),
                    failure.kind,
                    failure.error
                );
            }
        }
    }
    if report.aborted {
        println!(
            "   {} pass stopped at first failure; remaining applications skipped",
            "!".yellow().bold()
        );
    }
}
