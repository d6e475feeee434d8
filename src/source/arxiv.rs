//! arXiv export API adapter.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info, warn};
use reqwest::Client;

use super::CandidateSource;
use crate::config::SourceConfig;
use crate::domain::Candidate;
use crate::error::{CuratrError, Result};

const ABS_URL: &str = "https://arxiv.org/abs/";

/// Pages through the arXiv Atom API for one category.
pub struct ArxivSource {
    client: Client,
    config: SourceConfig,
}

impl ArxivSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(concat!("curatr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CuratrError::Source(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn fetch_page(&self, query: &str, start: usize, size: usize) -> Result<Vec<Candidate>> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("search_query", query.to_string()),
                ("start", start.to_string()),
                ("max_results", size.to_string()),
                ("sortBy", "submittedDate".to_string()),
                ("sortOrder", "descending".to_string()),
            ])
            .send()
            .await
            .map_err(|e| CuratrError::Source(format!("arXiv request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CuratrError::Source(format!("arXiv returned {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CuratrError::Source(format!("Failed to read arXiv response: {}", e)))?;

        parse_feed(&body)
    }
}

#[async_trait]
impl CandidateSource for ArxivSource {
    async fn fetch(&self, since: NaiveDate, until: NaiveDate) -> Result<Vec<Candidate>> {
        let query = build_query(&self.config.category, since, until);
        info!("Querying arXiv: {}", query);

        let page_size = self.config.page_size.max(1);
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut start = 0;

        while candidates.len() < self.config.max_results {
            if start > 0 && self.config.page_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;
            }

            let size = page_size.min(self.config.max_results - candidates.len());
            let page = self.fetch_page(&query, start, size).await?;
            let returned = page.len();
            debug!("arXiv page start={} returned {}", start, returned);

            for candidate in page {
                if seen.insert(candidate.id.clone()) {
                    candidates.push(candidate);
                }
            }

            if returned < size {
                break;
            }
            start += returned;
        }

        candidates.truncate(self.config.max_results);
        info!("Fetched {} candidates from {} to {}", candidates.len(), since, until);
        Ok(candidates)
    }
}

/// Search query for one category and an inclusive submission window.
pub fn build_query(category: &str, since: NaiveDate, until: NaiveDate) -> String {
    format!(
        "cat:{} AND submittedDate:[{}0000 TO {}2359]",
        category,
        since.format("%Y%m%d"),
        until.format("%Y%m%d")
    )
}

/// Parse one Atom page into candidates. Entries without a usable id or date
/// are skipped.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<Candidate>> {
    let feed = feed_rs::parser::parse(bytes)
        .map_err(|e| CuratrError::Source(format!("Failed to parse arXiv feed: {}", e)))?;

    let candidates = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry
                .links
                .iter()
                .map(|l| l.href.as_str())
                .find(|href| href.contains("/abs/"))
                .unwrap_or(entry.id.as_str());
            let id = match link.rsplit_once("/abs/") {
                Some((_, id)) if !id.is_empty() => id.to_string(),
                _ => {
                    warn!("Skipping arXiv entry without an abs id: {}", entry.id);
                    return None;
                }
            };

            let Some(submitted) = entry.published.or(entry.updated).map(|dt| dt.date_naive()) else {
                warn!("Skipping arXiv entry {} without a submission date", id);
                return None;
            };

            Some(Candidate {
                url: format!("{}{}", ABS_URL, id),
                title: entry.title.map(|t| collapse_whitespace(&t.content)).unwrap_or_default(),
                abstract_text: entry.summary.map(|t| collapse_whitespace(&t.content)).unwrap_or_default(),
                authors: entry.authors.into_iter().map(|p| p.name.trim().to_string()).collect(),
                submitted,
                id,
            })
        })
        .collect();

    Ok(candidates)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
