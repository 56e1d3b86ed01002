use crate::news::types::{NewsApiResponse, RawArticle};
use reqwest::Client;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum NewsClientError {
    #[error("news provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("news provider returned status {status:?}")]
    ApiStatus { status: String },
}

/// Thin client for the upstream news provider. Holds the API key and
/// base URL so the rest of the crate never sees either.
pub struct NewsApiClient {
    http: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl NewsApiClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        NewsApiClient {
            http: Client::new(),
            base_url,
            api_key,
            timeout,
        }
    }

    pub fn from_env() -> Result<Self, String> {
        let base_url = match std::env::var("ND_NEWS_API_URL") {
            Ok(url) => url,
            Err(_) => {
                log::info!(
                    "ND_NEWS_API_URL not set, using default of {}",
                    DEFAULT_BASE_URL
                );
                DEFAULT_BASE_URL.to_string()
            }
        };
        let api_key = std::env::var("ND_NEWS_API_KEY")
            .map_err(|_| "ND_NEWS_API_KEY must be set".to_string())?;
        Ok(NewsApiClient::new(base_url, api_key, REQUEST_TIMEOUT))
    }

    /// Searches recent articles for one topic, newest first.
    pub async fn search(
        &self,
        topic: &str,
        language: &str,
        page_size: u32,
    ) -> Result<Vec<RawArticle>, NewsClientError> {
        let page_size = page_size.to_string();
        let response = self
            .http
            .get(format!("{}/v2/everything", self.base_url))
            .query(&[
                ("q", topic),
                ("sortBy", "publishedAt"),
                ("language", language),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        let body: NewsApiResponse = response.json().await?;
        if body.status != "ok" {
            return Err(NewsClientError::ApiStatus {
                status: body.status,
            });
        }
        Ok(body.articles)
    }

    /// Current general-interest US headlines, used for topic suggestions.
    pub async fn top_headlines(&self) -> Result<Vec<RawArticle>, NewsClientError> {
        let response = self
            .http
            .get(format!("{}/v2/top-headlines", self.base_url))
            .query(&[
                ("country", "us"),
                ("category", "general"),
                ("pageSize", "20"),
                ("apiKey", self.api_key.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        let body: NewsApiResponse = response.json().await?;
        if body.status != "ok" {
            return Err(NewsClientError::ApiStatus {
                status: body.status,
            });
        }
        Ok(body.articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: String) -> NewsApiClient {
        NewsApiClient::new(base_url, "test-key".to_string(), Duration::from_millis(500))
    }

    fn ok_body(titles: &[&str]) -> serde_json::Value {
        let articles: Vec<serde_json::Value> = titles
            .iter()
            .map(|t| {
                json!({
                    "source": {"id": null, "name": "Test Wire"},
                    "title": t,
                    "description": "details",
                    "url": format!("https://example.com/{t}"),
                    "urlToImage": null,
                    "publishedAt": "2025-05-18T10:00:00Z"
                })
            })
            .collect();
        json!({"status": "ok", "totalResults": titles.len(), "articles": articles})
    }

    #[actix_web::test]
    async fn search_sends_expected_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("q", "climate"))
            .and(query_param("sortBy", "publishedAt"))
            .and(query_param("language", "en"))
            .and(query_param("pageSize", "5"))
            .and(query_param("apiKey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(&["a", "b"])))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let articles = client.search("climate", "en", 5).await.unwrap();
        assert_eq!(articles.len(), 2);
    }

    #[actix_web::test]
    async fn search_surfaces_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let result = client.search("climate", "en", 5).await;
        assert!(matches!(result, Err(NewsClientError::Http(_))));
    }

    #[actix_web::test]
    async fn search_rejects_provider_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"status": "error", "code": "apiKeyInvalid", "message": "bad key"}),
            ))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        match client.search("climate", "en", 5).await {
            Err(NewsClientError::ApiStatus { status }) => assert_eq!(status, "error"),
            other => panic!("expected ApiStatus error, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn search_times_out_on_slow_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_body(&["a"]))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        match client.search("climate", "en", 5).await {
            Err(NewsClientError::Http(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[actix_web::test]
    async fn top_headlines_queries_us_general() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .and(query_param("country", "us"))
            .and(query_param("category", "general"))
            .and(query_param("pageSize", "20"))
            .and(query_param("apiKey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(&["headline"])))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let articles = client.top_headlines().await.unwrap();
        assert_eq!(articles.len(), 1);
    }
}
