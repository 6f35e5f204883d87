//! Typed HTTP client for the Memos REST API.
//!
//! Two server generations are supported. They expose the same three
//! capabilities (list memos, list resources, download one resource) and
//! differ only in endpoint paths and pagination parameters, so the
//! version is a closed enum picked at configuration time; callers never
//! branch on it.

use reqwest::header;
use vault_sync_types::{ListMemosResult, ListResourcesResult, MemosVersion};

pub struct MemosClient {
    base_url: String,
    version: MemosVersion,
    filter: Option<String>,
    client: reqwest::Client,
}

impl MemosClient {
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        version: MemosVersion,
        filter: Option<String>,
    ) -> Result<Self, String> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| format!("Invalid Memos access token: {}", e))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| format!("Failed to build Memos HTTP client: {}", e))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            version,
            filter,
            client,
        })
    }

    /// Fetch one page of the memo list. `page` is zero-based; the
    /// version-specific offset/page arithmetic happens here.
    ///
    /// Whatever the server answers is passed through as data, including
    /// error payloads. Only transport failures and non-JSON bodies become
    /// `Err`.
    pub async fn list_memos(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<ListMemosResult, String> {
        let resp = self
            .client
            .get(self.memos_list_url())
            .query(&self.list_memos_query(page, page_size))
            .send()
            .await
            .map_err(|e| format!("Memos list request failed: {}", e))?;

        read_payload(resp, "Memos list").await
    }

    /// Fetch the full resource (attachment) listing.
    pub async fn list_resources(&self) -> Result<ListResourcesResult, String> {
        let resp = self
            .client
            .get(self.resources_list_url())
            .send()
            .await
            .map_err(|e| format!("Resource list request failed: {}", e))?;

        read_payload(resp, "Resource list").await
    }

    /// Download one resource's raw bytes.
    pub async fn download_resource(&self, id: &str) -> Result<Vec<u8>, String> {
        let url = self.resource_download_url(id);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Resource download failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!("Resource download HTTP {}: {}", resp.status(), url));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| format!("Resource download read failed: {}", e))?;
        Ok(bytes.to_vec())
    }

    fn memos_list_url(&self) -> String {
        match self.version {
            MemosVersion::V1 => format!("{}/api/v1/memo", self.base_url),
            MemosVersion::V2 => format!("{}/api/v1/memos", self.base_url),
        }
    }

    fn list_memos_query(&self, page: usize, page_size: usize) -> Vec<(&'static str, String)> {
        match self.version {
            MemosVersion::V1 => vec![
                ("limit", page_size.to_string()),
                ("offset", (page * page_size).to_string()),
                ("rowStatus", "NORMAL".to_string()),
            ],
            MemosVersion::V2 => vec![
                ("page", (page + 1).to_string()),
                ("pageSize", page_size.to_string()),
                ("filter", self.filter.clone().unwrap_or_default()),
            ],
        }
    }

    fn resources_list_url(&self) -> String {
        match self.version {
            MemosVersion::V1 => format!("{}/api/v1/resource", self.base_url),
            MemosVersion::V2 => format!("{}/api/v1/resources", self.base_url),
        }
    }

    fn resource_download_url(&self, id: &str) -> String {
        match self.version {
            MemosVersion::V1 => format!("{}/o/r/{}", self.base_url, id),
            MemosVersion::V2 => format!("{}/api/v1/resources/{}", self.base_url, id),
        }
    }
}

/// Decode a listing response body without reshaping it. JSON error
/// payloads decode into the result's `Failure` variant; a non-JSON body
/// surfaces the HTTP status instead.
async fn read_payload<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
    what: &str,
) -> Result<T, String> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| format!("{} read failed: {}", what, e))?;

    serde_json::from_str(&body).map_err(|e| {
        if status.is_success() {
            format!("Parse {} response: {}", what, e)
        } else {
            format!("{} HTTP {}: {}", what, status, truncate_body(&body))
        }
    })
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= 200 {
        body.to_string()
    } else {
        let mut truncated: String = body.chars().take(200).collect();
        truncated.push_str("...");
        truncated
    }
}
