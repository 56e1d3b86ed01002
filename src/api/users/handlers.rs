use super::types::PreferencesRequest;
use crate::digest::{render, DigestConfig};
use crate::email::EmailGateway;
use crate::errors::{AppError, AppResult};
use crate::models::user::{PartialUser, User, UserQuery};
use crate::security::validation;
use crate::session::SessionClaims;
use crate::RqDbPool;
use actix_web::{get, patch, web, HttpResponse};

#[get("/me")]
pub async fn get_me(pool: RqDbPool, claims: SessionClaims) -> AppResult<HttpResponse> {
    let mut conn = pool.get().map_err(|_| AppError::ConnectionPoolError)?;
    let user = User::get(&mut conn, UserQuery::Id(claims.sub))
        .ok_or_else(|| AppError::resource_not_found("User"))?;
    Ok(HttpResponse::Ok().json(user))
}

#[patch("/me/preferences")]
pub async fn update_preferences(
    pool: RqDbPool,
    gateway: web::Data<dyn EmailGateway>,
    config: web::Data<DigestConfig>,
    claims: SessionClaims,
    prefs: web::Json<PreferencesRequest>,
) -> AppResult<HttpResponse> {
    let prefs = prefs.into_inner();

    if let Some(name) = &prefs.name {
        validation::validate_display_name(name)
            .map_err(|e| AppError::invalid_input("name", &e))?;
    }
    let topics = match prefs.topics {
        Some(topics) => {
            for topic in &topics {
                validation::validate_topic(topic)
                    .map_err(|e| AppError::invalid_input("topics", &e))?;
            }
            Some(topics.join(","))
        }
        None => None,
    };
    let schedule_hours = match prefs.schedule_hours {
        Some(hours) => {
            for hour in &hours {
                validation::validate_hour(*hour)
                    .map_err(|e| AppError::invalid_input("schedule_hours", &e))?;
            }
            let joined = hours
                .iter()
                .map(|h| h.to_string())
                .collect::<Vec<_>>()
                .join(",");
            Some(joined)
        }
        None => None,
    };

    let updates = PartialUser {
        name: prefs.name,
        topics,
        is_subscribed: prefs.is_subscribed,
        good_news_only: prefs.good_news_only,
        schedule_kind: prefs.schedule_kind,
        schedule_hours,
    };
    if updates.is_empty() {
        return Err(AppError::invalid_input("preferences", "No fields to update"));
    }

    let mut conn = pool.get().map_err(|_| AppError::ConnectionPoolError)?;
    let mut user = User::update(&mut conn, claims.sub, &updates)?;

    // An active subscription gets exactly one welcome email, the first
    // time a delivery succeeds.
    if user.is_subscribed && !user.welcome_sent {
        let html = render::welcome_html(&user.topic_list(), &config.dashboard_url);
        if gateway
            .deliver(&user.email, render::welcome_subject(), &html)
            .await
        {
            User::mark_welcome_sent(&mut conn, user.id)?;
            user.welcome_sent = true;
        } else {
            log::warn!(
                "Welcome email to {} failed, will retry on the next preferences update",
                user.email
            );
        }
    }

    Ok(HttpResponse::Ok().json(user))
}
