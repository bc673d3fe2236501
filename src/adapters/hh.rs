use crate::config::toml_config::SourceConfig;
use crate::domain::ports::Fetcher;
use crate::utils::error::{Result, VacancyError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Paginated client for the hh.ru vacancies search API.
pub struct HhFetcher {
    client: Client,
    source: SourceConfig,
}

impl HhFetcher {
    pub fn new(source: SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(source.user_agent.clone())
            .timeout(Duration::from_secs(source.timeout_seconds))
            .build()?;
        Ok(Self { client, source })
    }

    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<serde_json::Value> {
        tracing::debug!("Requesting page {} from {}", page, self.source.endpoint);

        let response = self
            .client
            .get(&self.source.endpoint)
            .query(&[
                ("text", keyword.to_string()),
                ("page", page.to_string()),
                ("per_page", self.source.per_page.to_string()),
            ])
            .send()
            .await?;

        tracing::debug!("API response status: {}", response.status());
        if !response.status().is_success() {
            return Err(VacancyError::ApiStatus {
                status: response.status().as_u16(),
                url: self.source.endpoint.clone(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Fetcher for HhFetcher {
    async fn fetch(&self, keyword: &str) -> Result<Vec<serde_json::Value>> {
        if keyword.trim().is_empty() {
            return Err(VacancyError::validation(
                "keyword",
                "search keyword must not be empty",
            ));
        }

        let mut vacancies = Vec::new();
        let mut page: u32 = 0;
        let mut pages_fetched = 0;

        loop {
            let body = self.fetch_page(keyword, page).await?;
            pages_fetched += 1;

            match body.get("items") {
                Some(serde_json::Value::Array(items)) => vacancies.extend(items.iter().cloned()),
                Some(other) if !other.is_null() => {
                    return Err(VacancyError::MalformedInput {
                        message: format!("`items` on page {} is not a list", page),
                    })
                }
                _ => {}
            }

            let Some(total_pages) = body.get("pages").and_then(|p| p.as_u64()) else {
                break;
            };
            if u64::from(page) + 1 >= total_pages {
                break;
            }

            page += 1;
            if self.source.max_pages.is_some_and(|max| page >= max) {
                tracing::debug!("Reached max_pages limit of {}", page);
                break;
            }
        }

        tracing::info!(
            "📥 Fetched {} raw vacancies for '{}' ({} pages)",
            vacancies.len(),
            keyword,
            pages_fetched
        );
        Ok(vacancies)
    }
}
