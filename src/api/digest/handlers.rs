use crate::digest::generator::{self, DigestOutcome};
use crate::digest::DigestConfig;
use crate::email::EmailGateway;
use crate::errors::{AppError, AppResult};
use crate::news::client::NewsApiClient;
use crate::session::SessionClaims;
use crate::RqDbPool;
use actix_web::{post, web, HttpResponse};
use serde_json::json;

/// Sends the caller their digest immediately, regardless of schedule.
#[post("/send-now")]
pub async fn send_now(
    pool: RqDbPool,
    news: web::Data<NewsApiClient>,
    gateway: web::Data<dyn EmailGateway>,
    config: web::Data<DigestConfig>,
    claims: SessionClaims,
) -> AppResult<HttpResponse> {
    let mut conn = pool.get().map_err(|_| AppError::ConnectionPoolError)?;

    let outcome =
        generator::generate_for_user(&mut conn, &news, gateway.get_ref(), &config, claims.sub)
            .await?;

    match outcome {
        DigestOutcome::Sent => {
            Ok(HttpResponse::Ok().json(json!({ "message": "Digest sent successfully!" })))
        }
        DigestOutcome::NoArticles => Ok(HttpResponse::Ok().json(json!({
            "message": "No articles found for your topics right now."
        }))),
        DigestOutcome::NoTopics => Err(AppError::invalid_input(
            "topics",
            "Add at least one topic before requesting a digest",
        )),
        DigestOutcome::DeliveryFailed => Err(AppError::ServiceUnavailable),
        DigestOutcome::NoRecipient => Err(AppError::resource_not_found("User")),
    }
}
