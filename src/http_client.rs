use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Whole-request budget; a published sheet export is a few hundred KB at most.
const SHEET_TIMEOUT: Duration = Duration::from_secs(20);
const SHEET_ACCEPT: &str = "text/csv, text/plain;q=0.9, */*;q=0.1";

static SHEET_CLIENT: OnceCell<Client> = OnceCell::new();

fn sheet_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(SHEET_ACCEPT));
    headers
}

/// Process-wide client for spreadsheet CSV exports. Redirects are followed,
/// since published sheet links bounce through a googleusercontent host.
pub fn sheet_client() -> Result<&'static Client> {
    SHEET_CLIENT.get_or_try_init(|| {
        Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(SHEET_TIMEOUT)
            .default_headers(sheet_headers())
            .user_agent(concat!("bolastats/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build sheet http client")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_requests_prefer_csv() {
        let headers = sheet_headers();
        let accept = headers.get(ACCEPT).and_then(|v| v.to_str().ok()).unwrap();
        assert!(accept.starts_with("text/csv"));
    }

    #[test]
    fn client_is_built_once() {
        let first = sheet_client().unwrap();
        let second = sheet_client().unwrap();
        assert!(std::ptr::eq(first, second));
    }
}
