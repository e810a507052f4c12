//! One-shot CLI commands.

use std::path::Path;

use scrapehub_config::{Config, ConfigLoader, ConfigValidator};
use scrapehub_scheduler::ReconcilePlan;

use crate::wiring;

/// Run one job now and print the outcome as JSON.
pub(crate) async fn run_job(config: &Config, job_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let hub = wiring::build_hub(config).await?;
    let outcome = hub.run_job_now(job_id).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if !outcome.is_successful() {
        return Err(format!("job {} failed", job_id).into());
    }
    Ok(())
}

/// Fetch jobs once and print what a reconciliation would install.
pub(crate) async fn show_triggers(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let tz = wiring::parse_timezone(&config.scheduler.timezone)?;
    let store = wiring::build_store(&config.store).await?;
    let jobs = store.list_jobs().await?;
    let plan = ReconcilePlan::from_snapshot(&jobs);

    println!("Installed ({}):", plan.accepted.len());
    for (job, expression) in &plan.accepted {
        let next = expression
            .next_in(tz)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());
        println!("  {:<24} {:<20} next: {}", job.id, expression.as_str(), next);
    }

    if !plan.skipped.is_empty() {
        println!("Skipped ({}):", plan.skipped.len());
        for skipped in &plan.skipped {
            println!("  {:<24} '{}': {}", skipped.job_id, skipped.expression, skipped.reason);
        }
    }
    Ok(())
}

/// Validate a config file and print errors and warnings.
pub(crate) fn check_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load(path)?;
    let result = ConfigValidator::validate(&config);

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    if result.is_valid() {
        println!("{} is valid", path.display());
        Ok(())
    } else {
        Err(format!("{} has {} error(s)", path.display(), result.errors.len()).into())
    }
}
