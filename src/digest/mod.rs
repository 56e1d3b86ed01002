use crate::news::types::Article;

pub mod generator;
pub mod render;
pub mod schedule;

/// Tunables for digest generation. Loaded once at startup and shared
/// with the handlers and the scheduler.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Hours (local time) at which periodic-schedule users receive a digest.
    pub periodic_hours: Vec<u32>,
    /// Articles kept per topic after filtering.
    pub articles_per_topic: usize,
    /// Articles requested from the provider per topic, before filtering.
    pub fetch_page_size: u32,
    pub language: String,
    /// Where the preference-management links in outgoing mail point.
    pub dashboard_url: String,
}

impl Default for DigestConfig {
    fn default() -> Self {
        DigestConfig {
            periodic_hours: vec![0, 12],
            articles_per_topic: 3,
            fetch_page_size: 5,
            language: "en".to_string(),
            dashboard_url: "http://localhost:3000/dashboard".to_string(),
        }
    }
}

impl DigestConfig {
    pub fn from_env() -> Self {
        let defaults = DigestConfig::default();
        let periodic_hours = match std::env::var("ND_PERIODIC_HOURS") {
            Ok(raw) => {
                let hours: Vec<u32> = raw
                    .split(',')
                    .filter_map(|part| part.trim().parse().ok())
                    .filter(|hour| *hour < 24)
                    .collect();
                if hours.is_empty() {
                    log::warn!(
                        "ND_PERIODIC_HOURS {:?} contains no valid hours, using default of 0,12",
                        raw
                    );
                    defaults.periodic_hours.clone()
                } else {
                    hours
                }
            }
            Err(_) => {
                log::info!("ND_PERIODIC_HOURS not set, using default of 0,12");
                defaults.periodic_hours.clone()
            }
        };
        let articles_per_topic = match std::env::var("ND_ARTICLES_PER_TOPIC") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!(
                    "ND_ARTICLES_PER_TOPIC {:?} is not a number, using default of {}",
                    raw,
                    defaults.articles_per_topic
                );
                defaults.articles_per_topic
            }),
            Err(_) => defaults.articles_per_topic,
        };
        let fetch_page_size = match std::env::var("ND_FETCH_PAGE_SIZE") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!(
                    "ND_FETCH_PAGE_SIZE {:?} is not a number, using default of {}",
                    raw,
                    defaults.fetch_page_size
                );
                defaults.fetch_page_size
            }),
            Err(_) => defaults.fetch_page_size,
        };
        let language = std::env::var("ND_NEWS_LANGUAGE").unwrap_or(defaults.language);
        let dashboard_url = match std::env::var("ND_DASHBOARD_URL") {
            Ok(url) => url,
            Err(_) => {
                log::info!(
                    "ND_DASHBOARD_URL not set, using default of {}",
                    defaults.dashboard_url
                );
                defaults.dashboard_url
            }
        };
        DigestConfig {
            periodic_hours,
            articles_per_topic,
            fetch_page_size,
            language,
            dashboard_url,
        }
    }
}

/// Articles for one topic, in the order the provider returned them.
#[derive(Debug, Clone)]
pub struct TopicGroup {
    pub topic: String,
    pub articles: Vec<Article>,
}

/// Everything going into one digest email, grouped by topic in the
/// subscriber's preference order.
#[derive(Debug, Clone, Default)]
pub struct DigestBatch {
    pub groups: Vec<TopicGroup>,
}

impl DigestBatch {
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|group| group.articles.is_empty())
    }

    pub fn article_count(&self) -> usize {
        self.groups.iter().map(|group| group.articles.len()).sum()
    }
}
