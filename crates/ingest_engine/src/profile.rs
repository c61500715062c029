use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::{FailureKind, FetchError};

/// Request headers that make our fetches look like a desktop browser navigation.
///
/// Shared by the crawler and the page extractor; plenty of sites reject the
/// default client headers outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub referer: String,
    pub extra_headers: Vec<(String, String)>,
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7".to_string(),
            accept_language: "en-GB,en-US;q=0.9,en;q=0.8".to_string(),
            referer: "https://google.com/".to_string(),
            extra_headers: [
                ("sec-ch-ua", "\"Google Chrome\";v=\"111\", \"Not(A:Brand\";v=\"8\", \"Chromium\";v=\"111\""),
                ("sec-ch-ua-mobile", "?0"),
                ("sec-ch-ua-platform", "\"macOS\""),
                ("sec-fetch-dest", "document"),
                ("sec-fetch-mode", "navigate"),
                ("sec-fetch-site", "same-origin"),
                ("sec-fetch-user", "?1"),
                ("upgrade-insecure-requests", "1"),
            ]
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        }
    }
}

impl BrowserProfile {
    pub fn header_map(&self) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(USER_AGENT.as_str(), &self.user_agent)?);
        headers.insert(ACCEPT, header_value(ACCEPT.as_str(), &self.accept)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            header_value(ACCEPT_LANGUAGE.as_str(), &self.accept_language)?,
        );
        headers.insert(REFERER, header_value(REFERER.as_str(), &self.referer)?);
        for (name, value) in &self.extra_headers {
            let header = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                FetchError::new(
                    FailureKind::InvalidHeader { name: name.clone() },
                    err.to_string(),
                )
            })?;
            headers.insert(header, header_value(name, value)?);
        }
        Ok(headers)
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value).map_err(|err| {
        FetchError::new(
            FailureKind::InvalidHeader {
                name: name.to_string(),
            },
            err.to_string(),
        )
    })
}
