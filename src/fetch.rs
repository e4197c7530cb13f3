use anyhow::{bail, Context, Result};
use reqwest::Client;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Build the shared HTTP client. Builder sites routinely block default
/// library user agents, so we always present a browser one.
pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Fetch the page under scrape. A failure here is fatal to the run.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    let status = response.status();
    if !status.is_success() {
        bail!("GET {} returned {}", url, status);
    }

    response
        .text()
        .await
        .with_context(|| format!("Failed to read body of {}", url))
}

/// Bytes plus the content type the server declared, used for extension
/// inference when the URL path carries none.
pub struct FetchedAsset {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Fetch one media asset. Callers treat any error as skip-and-continue.
pub async fn fetch_asset(client: &Client, url: &str) -> Result<FetchedAsset> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch asset {}", url))?;

    let status = response.status();
    if !status.is_success() {
        bail!("GET {} returned {}", url, status);
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read bytes of {}", url))?;

    Ok(FetchedAsset {
        bytes: bytes.to_vec(),
        content_type,
    })
}
