//! REST client for the PingDirectory configuration API
//!
//! Every object lives under `<https_host>/config/v1/<endpoint>/<name>`.
//! Requests authenticate with HTTP Basic Auth and exchange JSON bodies.

pub mod error;
pub mod types;

use std::time::Duration;

use log::debug;
use reqwest::header::ACCEPT;
use reqwest::{Certificate, Client, RequestBuilder, Response, StatusCode, Url};

pub use error::{ApiError, ApiResult};
pub use types::{
    AddRequest, ConfigObject, ErrorResponse, ListResponse, Messages,
    RequiredAction, UpdateRequest,
};

use crate::config::ProviderConfig;

const API_PATH: &str = "config/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared HTTP client with Basic Auth credentials for one server
#[derive(Clone)]
pub struct ConfigApiClient {
    http: Client,
    base_url: Url,
    username: String,
    password: String,
}

impl ConfigApiClient {
    pub fn new(config: &ProviderConfig) -> ApiResult<Self> {
        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);

        if config.insecure_trust_all_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }

        for path in &config.ca_certificate_pem_files {
            let pem = std::fs::read(path).map_err(|e| {
                ApiError::Configuration(format!(
                    "Failed to read CA certificate file {}: {}",
                    path, e
                ))
            })?;
            let certificate = Certificate::from_pem(&pem).map_err(|e| {
                ApiError::Configuration(format!("Invalid CA certificate in {}: {}", path, e))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let http = builder.build()?;

        let root = format!("{}/{}", config.https_host.trim_end_matches('/'), API_PATH);
        let base_url = Url::parse(&root)
            .map_err(|e| ApiError::Configuration(format!("Invalid https_host {}: {}", root, e)))?;

        Ok(Self {
            http,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Fetch one object; `None` when the server answers 404
    pub async fn get(&self, endpoint: &str, name: &str) -> ApiResult<Option<ConfigObject>> {
        let url = self.url(&[endpoint, name])?;
        debug!("GET {}", url);

        let response = self.authorized(self.http.get(url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response).await?;
        Ok(Some(decode(response).await?))
    }

    /// List the objects of an endpoint, optionally narrowed by a server-side filter
    pub async fn list(&self, endpoint: &str, filter: Option<&str>) -> ApiResult<ListResponse> {
        let url = self.url(&[endpoint])?;
        debug!("GET {} filter={:?}", url, filter);

        let mut request = self.http.get(url);
        if let Some(filter) = filter {
            request = request.query(&[("filter", filter)]);
        }
        let response = check_status(self.authorized(request).send().await?).await?;
        decode(response).await
    }

    pub async fn add(&self, endpoint: &str, request: &AddRequest) -> ApiResult<ConfigObject> {
        let url = self.url(&[endpoint])?;
        debug!("POST {} schemas={:?}", url, request.schemas);

        let response = self
            .authorized(self.http.post(url))
            .json(request)
            .send()
            .await?;
        decode(check_status(response).await?).await
    }

    pub async fn update(
        &self,
        endpoint: &str,
        name: &str,
        request: &UpdateRequest,
    ) -> ApiResult<ConfigObject> {
        let url = self.url(&[endpoint, name])?;
        debug!("PATCH {} ({} operations)", url, request.operations.len());

        let response = self
            .authorized(self.http.patch(url))
            .json(request)
            .send()
            .await?;
        decode(check_status(response).await?).await
    }

    pub async fn delete(&self, endpoint: &str, name: &str) -> ApiResult<()> {
        let url = self.url(&[endpoint, name])?;
        debug!("DELETE {}", url);

        check_status(self.authorized(self.http.delete(url)).send().await?).await?;
        Ok(())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
    }

    /// Append percent-encoded path segments to the API root
    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::Configuration(format!("Base URL cannot take a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|e| e.detail)
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.canonical_reason().unwrap_or("no detail").to_string()
            } else {
                body
            }
        });

    Err(ApiError::Status {
        status: status.as_u16(),
        detail,
    })
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
