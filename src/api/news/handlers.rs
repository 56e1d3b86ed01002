use crate::digest::DigestConfig;
use crate::errors::{AppError, AppResult};
use crate::models::user::{User, UserQuery};
use crate::news::client::NewsApiClient;
use crate::news::fetcher;
use crate::session::SessionClaims;
use crate::RqDbPool;
use actix_web::{get, web, HttpResponse};

/// What the next digest would contain, as a flat article list.
#[get("/preview")]
pub async fn preview(
    pool: RqDbPool,
    news: web::Data<NewsApiClient>,
    config: web::Data<DigestConfig>,
    claims: SessionClaims,
) -> AppResult<HttpResponse> {
    let mut conn = pool.get().map_err(|_| AppError::ConnectionPoolError)?;
    let user = User::get(&mut conn, UserQuery::Id(claims.sub))
        .ok_or_else(|| AppError::resource_not_found("User"))?;

    let articles =
        fetcher::fetch_for_topics(&news, &user.topic_list(), user.good_news_only, &config).await;
    Ok(HttpResponse::Ok().json(articles))
}

#[get("/suggestions")]
pub async fn suggestions(
    news: web::Data<NewsApiClient>,
    _claims: SessionClaims,
) -> AppResult<HttpResponse> {
    let suggestions = fetcher::fetch_trending_suggestions(&news).await;
    Ok(HttpResponse::Ok().json(suggestions))
}
