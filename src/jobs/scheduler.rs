use super::{run_job, JobKind, JobLog};
use crate::config::JobsConfig;
use crate::error::Result;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

/// Runs every job on its own interval until Ctrl-C. Each job fires once
/// immediately, then on every tick; ticks missed while a run is in flight are skipped.
pub async fn run_scheduler(config: &JobsConfig) -> Result<()> {
    let mut tasks = JoinSet::new();

    for kind in JobKind::ALL {
        let settings = kind.settings(config).clone();
        let client = kind.client(&config.graphql_url)?;
        let log = JobLog::new(settings.log_file.clone());
        info!(
            "Scheduling {} every {}s -> {}",
            kind.as_str(),
            settings.interval().as_secs(),
            settings.log_file.display()
        );

        tasks.spawn(async move {
            let mut ticker = interval(settings.interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                run_job(kind, &client, &log).await;
            }
        });
    }

    tokio::signal::ctrl_c().await?;
    warn!("Received Ctrl-C, stopping scheduler");
    tasks.shutdown().await;
    Ok(())
}
