use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

use crate::error::{FetchError, FetchResult};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. The first caller decides the timeout.
pub fn init_http_client(timeout: Duration) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")
    })
}

/// GET `url` and return the body. Transport failures, non-success statuses
/// and empty bodies all count as the service being unavailable.
pub fn fetch_body(
    client: &Client,
    service: &'static str,
    url: &str,
    extra_headers: &[(&str, &str)],
) -> FetchResult<String> {
    let mut req = client.get(url).header(USER_AGENT, "carry_check");
    for (name, value) in extra_headers {
        req = req.header(*name, *value);
    }

    let resp = req
        .send()
        .map_err(|err| FetchError::unavailable(service, format!("request failed: {err}")))?;
    let status = resp.status();
    let body = resp
        .text()
        .map_err(|err| FetchError::unavailable(service, format!("failed reading body: {err}")))?;
    if !status.is_success() {
        return Err(FetchError::unavailable(
            service,
            format!("http {}: {}", status, truncate(&body, 200)),
        ));
    }
    if body.trim().is_empty() {
        return Err(FetchError::unavailable(service, "empty body"));
    }
    tracing::debug!(service, url, bytes = body.len(), "fetched");
    Ok(body)
}

fn truncate(raw: &str, max: usize) -> &str {
    match raw.char_indices().nth(max) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
        assert_eq!(truncate("ééé", 2), "éé");
    }
}
