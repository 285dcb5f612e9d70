use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info};

use crate::settings::Settings;

const PREVIEW_CHARS: usize = 500;

/// GET the product page and return its body. Any network failure, timeout
/// or non-2xx status is an error; there are no retries.
pub async fn fetch_page(settings: &Settings) -> Result<String> {
    let client = build_client(settings)?;

    info!("Fetching product page: {}", settings.url);
    let start = Instant::now();
    let body = client
        .get(&settings.url)
        .send()
        .await
        .with_context(|| format!("Network error fetching {}", settings.url))?
        .error_for_status()
        .context("Product page returned an error status")?
        .text()
        .await
        .context("Failed to read product page body")?;

    info!(
        "Fetched {} bytes in {}ms",
        body.len(),
        start.elapsed().as_millis()
    );
    debug!("Body preview:\n{}", preview(&body));
    Ok(body)
}

fn build_client(settings: &Settings) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&settings.user_agent).context("Invalid user agent header")?,
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .context("Failed to build HTTP client")
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
