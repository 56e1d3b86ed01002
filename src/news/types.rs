use serde::{Deserialize, Serialize};

/// Top-level response from the news provider's search and headlines endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub source: ArticleSource,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// An article that survived normalization, tagged with the topic whose
/// search produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub topic: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image_url: Option<String>,
    pub source_name: String,
    pub published_at: Option<String>,
}

impl Article {
    /// Providers occasionally return placeholder rows with no title or
    /// no link. Those are useless in a digest, so they are dropped here.
    pub fn from_raw(raw: RawArticle, topic: &str) -> Option<Article> {
        let title = raw.title.filter(|t| !t.trim().is_empty())?;
        let url = raw.url.filter(|u| !u.trim().is_empty())?;
        Some(Article {
            topic: topic.to_string(),
            title,
            description: raw.description.filter(|d| !d.trim().is_empty()),
            url,
            image_url: raw.url_to_image,
            source_name: raw.source.name.unwrap_or_else(|| "Unknown".to_string()),
            published_at: raw.published_at,
        })
    }
}

/// Trimmed headline used by the topic-suggestion endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TrendingSuggestion {
    pub title: String,
    pub source: String,
    pub url: String,
    pub image_url: String,
}

impl TrendingSuggestion {
    /// Suggestions are rendered as cards, so anything without an image
    /// is skipped.
    pub fn from_raw(raw: RawArticle) -> Option<TrendingSuggestion> {
        let title = raw.title.filter(|t| !t.trim().is_empty())?;
        let url = raw.url.filter(|u| !u.trim().is_empty())?;
        let image_url = raw.url_to_image.filter(|u| !u.trim().is_empty())?;
        Some(TrendingSuggestion {
            title,
            source: raw.source.name.unwrap_or_else(|| "Unknown".to_string()),
            url,
            image_url,
        })
    }
}
