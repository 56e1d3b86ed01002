use super::types::{CronSettings, TriggerQuery};
use crate::digest::DigestConfig;
use crate::email::EmailGateway;
use crate::errors::{AppError, AppResult};
use crate::news::client::NewsApiClient;
use crate::security::validation;
use crate::tasks::digest_scheduler::runner;
use crate::RqDbPool;
use actix_web::{get, web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use serde_json::json;

/// Entry point for external schedulers. Runs the same check the
/// background loop runs, optionally for a forced hour.
#[get("/trigger-digest")]
pub async fn trigger_digest(
    pool: RqDbPool,
    news: web::Data<NewsApiClient>,
    gateway: web::Data<dyn EmailGateway>,
    config: web::Data<DigestConfig>,
    settings: web::Data<CronSettings>,
    query: web::Query<TriggerQuery>,
    auth: Option<BearerAuth>,
) -> AppResult<HttpResponse> {
    // With no secret configured the endpoint stays open for local
    // deployments that trigger from the same host.
    if let Some(secret) = settings.secret.as_deref() {
        let presented = auth.as_ref().map(|a| a.token());
        if presented != Some(secret) {
            log::warn!("Cron trigger rejected: bad or missing bearer token");
            return Err(AppError::Forbidden);
        }
    }

    if let Some(hour) = query.hour {
        validation::validate_hour(hour).map_err(|e| AppError::invalid_input("hour", &e))?;
    }

    let summary = runner::run_check(
        pool.get_ref(),
        &news,
        gateway.get_ref(),
        &config,
        query.hour,
    )
    .await?;
    log::info!("Manual digest trigger finished: {:?}", summary);

    Ok(HttpResponse::Ok().json(json!({ "message": "Digest check completed successfully." })))
}
