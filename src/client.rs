use crate::config::Config;
use crate::error::QrisError;
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION, COOKIE, HeaderMap, HeaderValue, ORIGIN,
    REFERER, USER_AGENT,
};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

const BASE_URL: &str = "https://qris.bankmandiri.co.id";
const TRANSACTIONS_PATH: &str = "/api/homeScreen/getDataTransaksi/auth/homeScreen";
const REFRESH_PATH: &str = "/api/loginCtl/refresh";
const REFERER_URL: &str = "https://qris.bankmandiri.co.id/riwayatTransaksi";

#[derive(Debug, Clone)]
pub struct Session {
    http: HttpClient,
    headers: HeaderMap,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    result: Option<String>,
}

impl Session {
    /// Build a session carrying the replayed cookie and header set.
    pub fn new(config: &Config) -> Result<Self, QrisError> {
        let cookie_str = config
            .cookie
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .ok_or(QrisError::MissingCookie)?;
        let cookies = parse_cookie_header(cookie_str);
        if cookies.is_empty() {
            return Err(QrisError::UnparsableCookie);
        }

        let mut headers = build_headers(config)?;
        let cookie_line = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        headers.insert(COOKIE, header_value("cookie", &cookie_line)?);

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        info!("Initialized portal session with {} cookies", cookies.len());
        Ok(Self {
            http,
            headers,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Override the base URL (useful for tests or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        info!("Updated portal base URL to {}", self.base_url);
        self
    }

    /// Exchange the current session state for a fresh secret-token.
    pub async fn refresh(&mut self) -> Result<String, QrisError> {
        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        debug!("POST request to {url}");
        let response = self
            .http
            .post(&url)
            .headers(self.headers.clone())
            .body("")
            .send()
            .await?;
        let status = response.status();
        debug!("Received status {status}");
        if !status.is_success() {
            return Err(QrisError::Status(status));
        }

        let body = response.text().await?;
        let payload: RefreshResponse =
            serde_json::from_str(&body).map_err(|_| QrisError::RefreshBody(body))?;
        let token = payload
            .result
            .filter(|token| !token.is_empty())
            .ok_or(QrisError::MissingRefreshToken)?;
        self.headers
            .insert("secret-token", header_value("secret-token", &token)?);
        info!("Updated secret-token from the refresh endpoint");
        Ok(token)
    }

    /// Fetch the transaction history for an inclusive date range.
    ///
    /// With `refresh_first`, the refresh endpoint is called before the first
    /// attempt. A 401 triggers exactly one refresh-and-retry, and only when
    /// the session-item header is configured.
    pub async fn fetch_transactions(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        refresh_first: bool,
    ) -> Result<Value, QrisError> {
        let params = [
            ("startDate", start.format("%Y%m%d").to_string()),
            ("endDate", end.format("%Y%m%d").to_string()),
            ("isLimitValidated", "false".to_string()),
        ];
        debug!("Fetching transactions from {start} to {end}");

        if refresh_first {
            if !self.has_session_item() {
                return Err(QrisError::MissingSessionItem);
            }
            self.refresh().await?;
        }

        let mut response = self.get_transactions(&params).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            if !self.has_session_item() {
                return Err(QrisError::Status(response.status()));
            }
            info!("Received 401, refreshing secret-token and retrying once");
            self.refresh().await?;
            response = self.get_transactions(&params).await?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(QrisError::Status(status));
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|_| QrisError::InvalidResponse)
    }

    async fn get_transactions(&self, params: &[(&str, String)]) -> Result<Response, QrisError> {
        let url = format!("{}{}", self.base_url, TRANSACTIONS_PATH);
        debug!("GET request to {url}");
        let response = self
            .http
            .get(&url)
            .headers(self.headers.clone())
            .query(params)
            .send()
            .await?;
        debug!("Received status {}", response.status());
        Ok(response)
    }

    fn has_session_item(&self) -> bool {
        self.headers.contains_key("session-item")
    }
}

/// Convert a raw `Cookie` header string into a name/value map.
///
/// Segments without `=` are skipped; values may themselves contain `=`; the
/// last occurrence of a name wins. The caller treats an empty map as fatal.
pub fn parse_cookie_header(raw: &str) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for part in raw.split(';') {
        let part = part.trim();
        let Some((name, value)) = part.split_once('=') else {
            continue;
        };
        cookies.insert(name.trim().to_string(), value.trim().to_string());
    }
    cookies
}

fn build_headers(config: &Config) -> Result<HeaderMap, QrisError> {
    let required = [
        ("secret-id", config.secret_id.as_deref()),
        ("secret-key", config.secret_key.as_deref()),
        ("secret-token", config.secret_token.as_deref()),
    ];
    let missing: Vec<&'static str> = required
        .iter()
        .filter(|(_, value)| value.is_none_or(str::is_empty))
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(QrisError::MissingSecrets(missing));
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate, br, zstd"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("id-ID,id;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(ORIGIN, HeaderValue::from_static(BASE_URL));
    headers.insert(REFERER, HeaderValue::from_static(REFERER_URL));
    headers.insert(USER_AGENT, header_value("user-agent", &config.user_agent)?);
    headers.insert(
        "sec-ch-ua",
        HeaderValue::from_static(
            r#""Not)A;Brand";v="8", "Chromium";v="138", "Google Chrome";v="138""#,
        ),
    );
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?1"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"Android\""));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));

    for (name, value) in required {
        if let Some(value) = value {
            headers.insert(name, header_value(name, value)?);
        }
    }
    let session_item = config.session_item.as_deref().filter(|item| !item.is_empty());
    if let Some(item) = session_item {
        headers.insert("session-item", header_value("session-item", item)?);
    }
    Ok(headers)
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, QrisError> {
    HeaderValue::from_str(value).map_err(|_| QrisError::InvalidHeaderValue(name))
}
