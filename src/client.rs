//! HTTP client for the OpenSearchServer engine.
//!
//! [`Client`] holds the connection context (engine URL, index name,
//! optional credentials) shared by every request, contributes the base
//! query-string fragments (`use`, `login`, `key`), and issues the actual
//! HTTP call against the `/select` endpoint.

use log::debug;

use crate::error::{OssError, Result};
use crate::search::SearchRequest;
use crate::util::encode;

/// Connection to one engine index.
///
/// Cheap to clone; the underlying HTTP connection pool is shared.
#[derive(Clone)]
pub struct Client {
    engine_url: String,
    index: String,
    login: Option<String>,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl Client {
    /// Create a client for the given engine URL and index name.
    ///
    /// Returns an error if the engine URL is empty or carries no
    /// `http(s)://` scheme. A trailing slash on the URL is dropped.
    pub fn new(engine_url: impl Into<String>, index: impl Into<String>) -> Result<Self> {
        let engine_url = engine_url.into();
        if !engine_url.starts_with("http://") && !engine_url.starts_with("https://") {
            return Err(OssError::invalid_argument(format!(
                "Engine URL must start with http:// or https://: '{engine_url}'"
            )));
        }
        Ok(Self {
            engine_url: engine_url.trim_end_matches('/').to_string(),
            index: index.into(),
            login: None,
            api_key: None,
            http: reqwest::Client::new(),
        })
    }

    /// Attach login/API-key credentials, sent as `login` and `key`
    /// fragments on every request.
    pub fn credentials(mut self, login: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self.api_key = Some(api_key.into());
        self
    }

    /// Base query-string fragments shared by every request: index
    /// selection first, then credentials when present.
    pub fn base_params(&self) -> Vec<String> {
        let mut params = vec![format!("use={}", encode(&self.index))];
        if let (Some(login), Some(api_key)) = (&self.login, &self.api_key) {
            params.push(format!("login={}", encode(login)));
            params.push(format!("key={}", encode(api_key)));
        }
        params
    }

    /// The full `/select` URL for a request: base fragments followed by
    /// the request's own fragments, joined with `&`.
    pub fn select_url(&self, request: &SearchRequest) -> String {
        let mut params = self.base_params();
        params.extend(request.query_params());
        format!("{}/select?{}", self.engine_url, params.join("&"))
    }

    /// Execute a search and return the raw response body.
    ///
    /// The body is returned as received (XML or JSON depending on the
    /// engine's render type); decoding it is left to the caller. A
    /// non-success HTTP status maps to [`OssError::UnexpectedStatus`].
    pub async fn search(&self, request: &SearchRequest) -> Result<String> {
        let url = self.select_url(request);
        debug!("GET {}", redact(&url));

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(OssError::UnexpectedStatus { status, body });
        }
        Ok(body)
    }
}

/// Hide the API key value when logging an assembled URL.
fn redact(url: &str) -> String {
    let Some(start) = url.find("&key=") else {
        return url.to_string();
    };
    let value_start = start + "&key=".len();
    let value_end = url[value_start..]
        .find('&')
        .map(|offset| value_start + offset)
        .unwrap_or(url.len());
    format!("{}***{}", &url[..value_start], &url[value_end..])
}
