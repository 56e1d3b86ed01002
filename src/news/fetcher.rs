use crate::digest::DigestConfig;
use crate::news::client::NewsApiClient;
use crate::news::sentiment;
use crate::news::types::{Article, TrendingSuggestion};

/// Fetches and filters articles for a single topic. A provider failure
/// for one topic must not sink the whole digest, so errors are logged
/// and reported as an empty list.
pub async fn fetch_topic(
    client: &NewsApiClient,
    topic: &str,
    good_news_only: bool,
    config: &DigestConfig,
) -> Vec<Article> {
    let raw = match client
        .search(topic, &config.language, config.fetch_page_size)
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("failed to fetch news for topic {:?}: {}", topic, e);
            return Vec::new();
        }
    };
    let mut articles: Vec<Article> = raw
        .into_iter()
        .filter_map(|r| Article::from_raw(r, topic))
        .collect();
    if good_news_only {
        // Filter before capping so grim stories don't crowd out
        // upbeat ones further down the page.
        articles.retain(|a| sentiment::is_good_news(&a.title, a.description.as_deref()));
    }
    articles.truncate(config.articles_per_topic);
    articles
}

/// Flattened article list across all topics, preserving topic order.
pub async fn fetch_for_topics(
    client: &NewsApiClient,
    topics: &[String],
    good_news_only: bool,
    config: &DigestConfig,
) -> Vec<Article> {
    let mut all = Vec::new();
    for topic in topics {
        let mut articles = fetch_topic(client, topic, good_news_only, config).await;
        all.append(&mut articles);
    }
    all
}

/// Headlines with images, for the dashboard's topic-suggestion strip.
/// Suggestions are decoration, so any provider error becomes an empty
/// list rather than a failed request.
pub async fn fetch_trending_suggestions(client: &NewsApiClient) -> Vec<TrendingSuggestion> {
    match client.top_headlines().await {
        Ok(raw) => raw
            .into_iter()
            .filter_map(TrendingSuggestion::from_raw)
            .collect(),
        Err(e) => {
            log::warn!("failed to fetch trending headlines: {}", e);
            Vec::new()
        }
    }
}
