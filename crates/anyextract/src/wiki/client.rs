//! Confluence REST client: page storage fetch and attachment URLs.

use crate::core::config::{ConfluenceConfig, WikiDeployment};
use crate::error::{AnyExtractError, Result};
use crate::wiki::storage::AttachmentLinks;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

/// Host fragment identifying Atlassian cloud sites when no deployment is configured.
const CLOUD_HOST_FRAGMENT: &str = "atlassian.net";

#[derive(Debug, Deserialize)]
struct PageResponse {
    body: PageBody,
}

#[derive(Debug, Deserialize)]
struct PageBody {
    storage: StorageBody,
}

#[derive(Debug, Deserialize)]
struct StorageBody {
    value: String,
}

#[derive(Debug, Clone)]
pub struct ConfluenceClient {
    http: reqwest::Client,
    base_url: String,
    deployment: WikiDeployment,
    auth_header: String,
}

impl ConfluenceClient {
    pub fn new(config: &ConfluenceConfig, http: reqwest::Client) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let deployment = config.deployment.unwrap_or_else(|| {
            if base_url.contains(CLOUD_HOST_FRAGMENT) {
                WikiDeployment::Cloud
            } else {
                WikiDeployment::SelfHosted
            }
        });
        let credentials = STANDARD.encode(format!("{}:{}", config.email, config.api_key));

        Self {
            http,
            base_url,
            deployment,
            auth_header: format!("Basic {}", credentials),
        }
    }

    pub fn deployment(&self) -> WikiDeployment {
        self.deployment
    }

    /// `Authorization` header value used for page and attachment requests.
    pub fn auth_header(&self) -> &str {
        &self.auth_header
    }

    fn site_root(&self) -> String {
        match self.deployment {
            WikiDeployment::Cloud => format!("{}/wiki", self.base_url),
            WikiDeployment::SelfHosted => self.base_url.clone(),
        }
    }

    pub fn api_endpoint(&self) -> String {
        format!("{}/rest/api", self.site_root())
    }

    /// Attachment download links for `page_id`.
    pub fn attachment_links(&self, page_id: &str) -> AttachmentLinks {
        AttachmentLinks::new(format!("{}/download/attachments/{}", self.site_root(), page_id))
    }

    /// Fetch the storage-format body of a page.
    ///
    /// # Errors
    ///
    /// `UpstreamService` on transport failures, non-success statuses, or a
    /// response without `body.storage.value`.
    pub async fn fetch_storage(&self, page_id: &str) -> Result<String> {
        let url = format!("{}/content/{}", self.api_endpoint(), page_id);
        tracing::debug!(%url, "fetching wiki page");

        let response = self
            .http
            .get(&url)
            .query(&[("expand", "body.storage")])
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnyExtractError::upstream_service(format!(
                "Wiki request for page {} failed: HTTP {}. Response body: {}",
                page_id, status, body
            )));
        }

        let page: PageResponse = response.json().await.map_err(|e| {
            AnyExtractError::upstream_service_with_source(
                format!("Wiki page {} response has no storage body", page_id),
                e,
            )
        })?;
        Ok(page.body.storage.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, deployment: Option<WikiDeployment>) -> ConfluenceConfig {
        ConfluenceConfig {
            base_url: base_url.to_string(),
            email: "user@example.com".to_string(),
            api_key: "token".to_string(),
            deployment,
        }
    }

    #[test]
    fn test_cloud_inferred_from_host() {
        let client = ConfluenceClient::new(&config("https://acme.atlassian.net///", None), reqwest::Client::new());
        assert_eq!(client.deployment(), WikiDeployment::Cloud);
        assert_eq!(client.api_endpoint(), "https://acme.atlassian.net/wiki/rest/api");
        assert_eq!(
            client.attachment_links("7").url("a b.pdf"),
            "https://acme.atlassian.net/wiki/download/attachments/7/a%20b.pdf"
        );
    }

    #[test]
    fn test_self_hosted() {
        let client = ConfluenceClient::new(&config("https://wiki.corp.example", None), reqwest::Client::new());
        assert_eq!(client.deployment(), WikiDeployment::SelfHosted);
        assert_eq!(client.api_endpoint(), "https://wiki.corp.example/rest/api");
        assert_eq!(
            client.attachment_links("7").url("x.png"),
            "https://wiki.corp.example/download/attachments/7/x.png"
        );
    }

    #[test]
    fn test_explicit_deployment_wins() {
        let client = ConfluenceClient::new(
            &config("https://docs.example.com", Some(WikiDeployment::Cloud)),
            reqwest::Client::new(),
        );
        assert_eq!(client.api_endpoint(), "https://docs.example.com/wiki/rest/api");

        let client = ConfluenceClient::new(
            &config("https://acme.atlassian.net", Some(WikiDeployment::SelfHosted)),
            reqwest::Client::new(),
        );
        assert_eq!(client.api_endpoint(), "https://acme.atlassian.net/rest/api");
    }

    #[test]
    fn test_basic_auth_header() {
        let client = ConfluenceClient::new(&config("https://wiki.example", None), reqwest::Client::new());
        assert_eq!(client.auth_header(), "Basic dXNlckBleGFtcGxlLmNvbTp0b2tlbg==");
    }
}
