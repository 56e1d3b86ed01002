use crate::digest::{render, DigestBatch, DigestConfig, TopicGroup};
use crate::email::EmailGateway;
use crate::errors::AppResult;
use crate::models::user::{User, UserQuery};
use crate::news::client::NewsApiClient;
use crate::news::fetcher;
use chrono::Utc;
use diesel::SqliteConnection;
use log::{info, warn};

/// What happened when a digest was attempted for one subscriber.
/// Callers decide what each case means for them: the scheduler just
/// counts, the send-now endpoint turns these into HTTP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestOutcome {
    Sent,
    NoRecipient,
    NoTopics,
    NoArticles,
    DeliveryFailed,
}

/// Runs the full digest pipeline for one subscriber: load preferences,
/// fetch and filter articles per topic, render, deliver, and record the
/// send time. The gateway is only invoked when there is at least one
/// article to send.
pub async fn generate_for_user(
    conn: &mut SqliteConnection,
    news: &NewsApiClient,
    gateway: &dyn EmailGateway,
    config: &DigestConfig,
    user_id: i32,
) -> AppResult<DigestOutcome> {
    let user = match User::get(conn, UserQuery::Id(user_id)) {
        Some(user) => user,
        None => {
            warn!("Digest requested for unknown user id {}", user_id);
            return Ok(DigestOutcome::NoRecipient);
        }
    };

    let topics = user.topic_list();
    if topics.is_empty() {
        info!("User {} has no topics configured, skipping digest", user.id);
        return Ok(DigestOutcome::NoTopics);
    }

    let mut batch = DigestBatch::default();
    for topic in &topics {
        let articles = fetcher::fetch_topic(news, topic, user.good_news_only, config).await;
        if articles.is_empty() {
            continue;
        }
        batch.groups.push(TopicGroup {
            topic: topic.clone(),
            articles,
        });
    }

    if batch.is_empty() {
        info!("No articles found for user {}, nothing to send", user.id);
        return Ok(DigestOutcome::NoArticles);
    }

    let subject = render::digest_subject(Utc::now().date_naive());
    let html = render::digest_html(&batch, &config.dashboard_url);
    info!(
        "Sending digest with {} articles across {} topics to user {}",
        batch.article_count(),
        batch.groups.len(),
        user.id
    );

    if !gateway.deliver(&user.email, &subject, &html).await {
        return Ok(DigestOutcome::DeliveryFailed);
    }

    User::mark_digest_sent(conn, user.id, Utc::now().timestamp() as i32)?;
    Ok(DigestOutcome::Sent)
}
