use anyhow::{Context, Result, bail};
use std::time::Duration;

/// Download the hikes listing page.
///
/// # Arguments
/// * `url` - Listing page URL
/// * `user_agent` - User-Agent header to send
/// * `timeout` - Limit for this single request
///
/// # Returns
/// * `Ok(body)` - Page HTML
/// * `Err` - Network failure or non-success status
pub fn fetch_page(url: &str, user_agent: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to fetch hikes page {}", url))?;

    if !response.status().is_success() {
        bail!("Hikes page {} returned error status: {}", url, response.status());
    }

    let body = response.text().context("Failed to read hikes page body")?;

    tracing::debug!(bytes = body.len(), url, "fetched hikes page");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::serve_once;

    #[test]
    fn test_error_status_fails() {
        let (base, server) = serve_once("500 Internal Server Error", "oops");

        let err = fetch_page(&base, "hikemap-test", Duration::from_secs(5)).unwrap_err();
        assert!(err.to_string().contains("returned error status: 500"), "{err}");
        server.join().unwrap();
    }

    #[test]
    fn test_returns_body() {
        let (base, server) = serve_once("200 OK", "<div class=\"primary\"></div>");

        let url = format!("{base}/land/hiking/all-hikes/");
        let body = fetch_page(&url, "hikemap-test", Duration::from_secs(5)).unwrap();
        assert_eq!(body, "<div class=\"primary\"></div>");
        assert_eq!(server.join().unwrap(), "GET /land/hiking/all-hikes/ HTTP/1.1");
    }
}
