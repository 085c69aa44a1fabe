//! Job posting matcher — queries the TheirStack search API for live listings
//! matching the recommended career.
//!
//! Jobs are enrichment, not essential: a missing credential or an upstream
//! failure degrades to an empty list and never fails the pipeline.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const THEIRSTACK_API_URL: &str = "https://api.theirstack.com/v1/jobs/search";
/// Generic fallback titles widening recall beyond the exact recommendation.
const FALLBACK_TITLES: [&str; 3] = ["AI Engineer", "Machine Learning Engineer", "ML Engineer"];
const COUNTRY_CODE: &str = "IN";
const MAX_AGE_DAYS: u32 = 30;
const PAGE_SIZE: u32 = 15;
/// Only the top skills are used as description filters.
const MAX_SKILL_FILTERS: usize = 3;

/// An external job listing, fetched fresh per recommendation, never cached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub job_title: String,
    pub company_name: String,
    pub location: String,
    pub job_board_url: String,
    pub date_creation: String,
}

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SearchRequest {
    page: u32,
    limit: u32,
    posted_at_max_age_days: u32,
    job_country_code_or: Vec<String>,
    job_title_or: Vec<String>,
    job_description_contains_or: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<ListingRow>,
}

#[derive(Debug, Deserialize)]
struct ListingRow {
    id: serde_json::Value,
    job_title: Option<String>,
    company_object: Option<CompanyObject>,
    #[serde(default)]
    locations: Vec<LocationRow>,
    url: Option<String>,
    date_posted: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompanyObject {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    name: Option<String>,
}

/// The single entry point for job-search API calls.
#[derive(Clone)]
pub struct JobSearchClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl JobSearchClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url: THEIRSTACK_API_URL.to_string(),
        }
    }

    /// Points the client at a mock server.
    #[cfg(test)]
    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        let mut client = Self::new(api_key);
        client.base_url = base_url;
        client
    }

    /// Searches listings for the recommended career title plus its top
    /// required skills. Always returns a list; failures are logged and
    /// swallowed.
    pub async fn find_jobs(&self, career_title: &str, skills: &[String]) -> Vec<Job> {
        let Some(api_key) = &self.api_key else {
            warn!("Job search API key is not configured; returning no job postings");
            return Vec::new();
        };

        let mut title_keywords = vec![career_title.to_string()];
        title_keywords.extend(FALLBACK_TITLES.iter().map(|t| t.to_string()));

        let request_body = SearchRequest {
            page: 0,
            limit: PAGE_SIZE,
            posted_at_max_age_days: MAX_AGE_DAYS,
            job_country_code_or: vec![COUNTRY_CODE.to_string()],
            job_title_or: title_keywords,
            job_description_contains_or: skills
                .iter()
                .take(MAX_SKILL_FILTERS)
                .cloned()
                .collect(),
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!("Job search request failed: {e}");
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Job search API returned {status}: {body}");
            return Vec::new();
        }

        let parsed = match response.json::<SearchResponse>().await {
            Ok(p) => p,
            Err(e) => {
                warn!("Job search response could not be decoded: {e}");
                return Vec::new();
            }
        };

        let jobs: Vec<Job> = parsed.data.into_iter().map(ListingRow::into_job).collect();
        info!("Found {} relevant job postings", jobs.len());
        jobs
    }
}

impl ListingRow {
    fn into_job(self) -> Job {
        // Listing ids arrive as either numbers or strings.
        let job_id = match self.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Job {
            job_id,
            job_title: self.job_title.unwrap_or_else(|| "N/A".to_string()),
            company_name: self
                .company_object
                .and_then(|c| c.name)
                .unwrap_or_else(|| "N/A".to_string()),
            location: self
                .locations
                .into_iter()
                .next()
                .and_then(|l| l.name)
                .unwrap_or_else(|| "N/A".to_string()),
            job_board_url: self.url.unwrap_or_default(),
            date_creation: self.date_posted.unwrap_or_default(),
        }
    }
}
