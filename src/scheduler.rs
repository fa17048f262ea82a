use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::dto::insight_dto::InsightQuery;
use crate::error::{Error, Result};
use crate::AppState;

/// Registers the collector and insight-refresh jobs that are configured.
/// Returns `None` when neither is.
pub async fn start(state: &AppState, config: &Config) -> Result<Option<JobScheduler>> {
    let collector_cron = config.collector.as_ref().map(|c| c.cron.clone());
    let refresh_cron = config.insight_refresh_cron.clone();
    if collector_cron.is_none() && refresh_cron.is_none() {
        info!("no scheduled jobs configured");
        return Ok(None);
    }

    let scheduler = JobScheduler::new().await?;

    if let Some(cron) = collector_cron {
        let collector = state.collector_service.clone();
        let job = Job::new_async(cron.as_str(), move |_uuid, _l| {
            let collector = collector.clone();
            Box::pin(async move {
                if let Err(e) = collector.collect_once().await {
                    error!(error = %e, "scheduled collection failed");
                }
            })
        })?;
        scheduler.add(job).await?;
        info!(cron = %cron, "collector job registered");
    }

    if let Some(cron) = refresh_cron {
        let insights = state.insight_service.clone();
        let job = Job::new_async(cron.as_str(), move |_uuid, _l| {
            let insights = insights.clone();
            Box::pin(async move {
                let query = InsightQuery {
                    period: Some("24h".to_string()),
                    ..Default::default()
                };
                match insights.get_insights(&query, true).await {
                    Ok(report) => info!(
                        records = report.statistics.period.records,
                        "scheduled insight refresh done"
                    ),
                    Err(Error::NotFound(_)) => warn!("scheduled insight refresh skipped: no readings"),
                    Err(e) => error!(error = %e, "scheduled insight refresh failed"),
                }
                match insights.purge_expired().await {
                    Ok(0) => {}
                    Ok(n) => info!(removed = n, "expired insight cache entries purged"),
                    Err(e) => error!(error = %e, "insight cache purge failed"),
                }
            })
        })?;
        scheduler.add(job).await?;
        info!(cron = %cron, "insight refresh job registered");
    }

    scheduler.start().await?;
    info!("scheduler started");
    Ok(Some(scheduler))
}
