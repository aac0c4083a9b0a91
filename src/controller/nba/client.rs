use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use reqwest::{Client, Proxy};
use serde_json::Value;
use std::time::Duration;

use crate::controller::nba::{RetryPolicy, StatsCall, with_retry};
use crate::error::StatsError;
use crate::model::StatsResponse;

pub const DEFAULT_STATS_BASE_URL: &str = "https://stats.nba.com/stats";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait StatsApiClient: Send + Sync {
    /// One attempt at `call`. Retries are layered on by [`fetch_with_retry`].
    async fn call(&self, call: &StatsCall) -> Result<StatsResponse, StatsError>;
}

/// Runs `call` through the client under the retry policy.
///
/// # Errors
///
/// Will return the last error if every attempt fails
pub async fn fetch_with_retry(
    client: &dyn StatsApiClient,
    call: &StatsCall,
    policy: &RetryPolicy,
) -> Result<StatsResponse, StatsError> {
    with_retry(policy, move || client.call(call)).await
}

/// The stats site drops requests that don't look like they came from its
/// own pages.
#[must_use]
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
        ),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
    headers.insert("x-nba-stats-origin", HeaderValue::from_static("stats"));
    headers.insert("x-nba-stats-token", HeaderValue::from_static("true"));
    headers
}

#[derive(Clone)]
pub struct HttpStatsClient {
    http: Client,
    base_url: String,
    default_timeout: Duration,
}

impl HttpStatsClient {
    /// # Errors
    ///
    /// Will return `Err` if the proxy url is invalid or the tls backend fails to load
    pub fn new(
        base_url: &str,
        default_timeout: Duration,
        proxy: Option<&str>,
    ) -> Result<Self, StatsError> {
        Ok(Self {
            http: build_http_client(default_timeout, proxy)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_timeout,
        })
    }

    #[must_use]
    pub fn url_for(&self, call: &StatsCall) -> String {
        format!("{}/{}", self.base_url, call.endpoint.path())
    }

    fn client_for(&self, call: &StatsCall) -> Result<Client, StatsError> {
        match &call.proxy {
            Some(proxy) => build_http_client(self.default_timeout, Some(proxy)),
            None => Ok(self.http.clone()),
        }
    }
}

fn build_http_client(timeout: Duration, proxy: Option<&str>) -> Result<Client, StatsError> {
    let mut builder = Client::builder()
        .default_headers(default_headers())
        .timeout(timeout);
    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }
    Ok(builder.build()?)
}

#[async_trait]
impl StatsApiClient for HttpStatsClient {
    async fn call(&self, call: &StatsCall) -> Result<StatsResponse, StatsError> {
        let http = self.client_for(call)?;
        let mut request = http
            .get(self.url_for(call))
            .query(&call.query_pairs())
            .timeout(call.timeout.unwrap_or(self.default_timeout));
        for (key, value) in &call.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let resp = request.send().await?.error_for_status()?;
        let json: Value = resp.json().await?;
        StatsResponse::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::nba::Endpoint;

    #[test]
    fn url_joins_base_and_endpoint() {
        let client =
            HttpStatsClient::new("https://stats.example.test/stats/", DEFAULT_TIMEOUT, None)
                .unwrap();
        let call = StatsCall::new(Endpoint::TeamGameLog);
        assert_eq!(
            client.url_for(&call),
            "https://stats.example.test/stats/teamgamelog"
        );
    }

    #[test]
    fn params_are_encoded_into_the_query() {
        let client =
            HttpStatsClient::new("https://stats.example.test/stats", DEFAULT_TIMEOUT, None)
                .unwrap();
        let call = StatsCall::new(Endpoint::TeamGameLog)
            .param("TeamID", 1_610_612_744)
            .param("Season", "2022-23");
        let request = client
            .http
            .get(client.url_for(&call))
            .query(&call.query_pairs())
            .build()
            .unwrap();
        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("TeamID".to_string(), "1610612744".to_string())));
        assert!(pairs.contains(&("Season".to_string(), "2022-23".to_string())));
    }

    #[test]
    fn browser_headers_are_present() {
        let headers = default_headers();
        assert!(headers.contains_key(USER_AGENT));
        assert!(headers.contains_key(REFERER));
        assert_eq!(headers.get("x-nba-stats-token").unwrap(), "true");
    }

    #[test]
    fn bad_proxy_is_rejected() {
        let client =
            HttpStatsClient::new(DEFAULT_STATS_BASE_URL, DEFAULT_TIMEOUT, Some("http://bad host:80"));
        assert!(client.is_err());
    }
}
