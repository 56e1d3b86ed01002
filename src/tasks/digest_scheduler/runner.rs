use crate::digest::generator::{self, DigestOutcome};
use crate::digest::{schedule, DigestConfig};
use crate::email::EmailGateway;
use crate::errors::AppResult;
use crate::models::user::User;
use crate::news::client::NewsApiClient;
use crate::session::session_manager;
use crate::tasks::types::CHECK_INTERVAL;
use crate::DbPool;
use chrono::Timelike;
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Counters from one scheduling pass, for the logs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub hour: u32,
    pub checked: usize,
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
}

pub async fn start(
    pool: DbPool,
    news: Arc<NewsApiClient>,
    gateway: Arc<dyn EmailGateway>,
    config: DigestConfig,
) {
    info!("Starting digest scheduler");

    let mut interval = tokio::time::interval(CHECK_INTERVAL);
    loop {
        interval.tick().await;

        match run_check(&pool, &news, gateway.as_ref(), &config, None).await {
            Ok(summary) => debug!("Scheduled check finished: {:?}", summary),
            Err(e) => error!("Digest check failed: {}", e),
        }

        // Expired sessions pile up slowly, so piggyback on this loop
        // rather than running a task of their own.
        match pool.get() {
            Ok(mut conn) => {
                if let Err(e) = session_manager::cleanup_expired_sessions(&mut conn) {
                    warn!("Session cleanup failed: {}", e);
                }
            }
            Err(e) => error!("Error getting DB connection: {e:?}"),
        }
    }
}

/// Evaluates every subscribed user against one hour and sends digests
/// to those who are due. A failure for one subscriber never stops the
/// pass; it is counted and the loop moves on.
pub async fn run_check(
    pool: &DbPool,
    news: &NewsApiClient,
    gateway: &dyn EmailGateway,
    config: &DigestConfig,
    forced_hour: Option<u32>,
) -> AppResult<CheckSummary> {
    let hour = match forced_hour {
        Some(hour) => hour,
        None => chrono::Local::now().hour(),
    };

    let mut conn = pool.get()?;
    let users = User::get_all_subscribed(&mut conn)?;
    let mut summary = CheckSummary {
        hour,
        checked: users.len(),
        ..Default::default()
    };

    for user in &users {
        let decision = schedule::evaluate(user, hour, config);
        if !decision.due {
            debug!(
                "Skipping user {} at hour {}: {}",
                user.id, hour, decision.reason
            );
            continue;
        }
        summary.due += 1;

        match generator::generate_for_user(&mut conn, news, gateway, config, user.id).await {
            Ok(DigestOutcome::Sent) => summary.sent += 1,
            Ok(DigestOutcome::DeliveryFailed) => {
                warn!("Digest delivery failed for user {}", user.id);
                summary.failed += 1;
            }
            Ok(outcome) => debug!("No digest for user {}: {:?}", user.id, outcome),
            Err(e) => {
                error!("Digest generation failed for user {}: {}", user.id, e);
                summary.failed += 1;
            }
        }
    }

    info!(
        "Digest check at hour {}: {} subscribed, {} due, {} sent, {} failed",
        summary.hour, summary.checked, summary.due, summary.sent, summary.failed
    );
    Ok(summary)
}
