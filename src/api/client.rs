use crate::cache::ApiError;
use crate::config::Config;
use color_eyre::{eyre::eyre, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// The server answers either with the bare document or with `{ "data": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
  Wrapped { data: T },
  Bare(T),
}

impl<T> Envelope<T> {
  fn into_inner(self) -> T {
    match self {
      Envelope::Wrapped { data } => data,
      Envelope::Bare(value) => value,
    }
  }
}

/// PayZenix REST API client
#[derive(Clone)]
pub struct PayzenixClient {
  http: reqwest::Client,
  base: Url,
  token: Option<String>,
}

impl PayzenixClient {
  pub fn new(config: &Config) -> Result<Self> {
    let base = normalize_base(&config.api.url)?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.api.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base,
      token: Config::get_api_token(),
    })
  }

  /// Host and port of the API, for display
  pub fn host(&self) -> String {
    match (self.base.host_str(), self.base.port()) {
      (Some(host), Some(port)) => format!("{}:{}", host, port),
      (Some(host), None) => host.to_string(),
      _ => self.base.to_string(),
    }
  }

  pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
    let request = self.request(Method::GET, path)?;
    self.send(request).await
  }

  pub async fn post<B: Serialize, T: DeserializeOwned>(
    &self,
    path: &str,
    body: &B,
  ) -> Result<T, ApiError> {
    let request = self.request(Method::POST, path)?.json(body);
    self.send(request).await
  }

  pub async fn put<B: Serialize, T: DeserializeOwned>(
    &self,
    path: &str,
    body: &B,
  ) -> Result<T, ApiError> {
    let request = self.request(Method::PUT, path)?.json(body);
    self.send(request).await
  }

  pub async fn patch<B: Serialize, T: DeserializeOwned>(
    &self,
    path: &str,
    body: &B,
  ) -> Result<T, ApiError> {
    let request = self.request(Method::PATCH, path)?.json(body);
    self.send(request).await
  }

  /// Delete a resource; the response body is ignored
  pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
    let request = self.request(Method::DELETE, path)?;
    self.execute(request).await?;
    Ok(())
  }

  fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
    let url = self
      .base
      .join(path)
      .map_err(|e| ApiError::new(format!("Invalid endpoint {}: {}", path, e)))?;

    let request = self.http.request(method, url);
    Ok(match &self.token {
      Some(token) => request.bearer_auth(token),
      None => request,
    })
  }

  async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
    let response = self.execute(request).await?;
    let envelope: Envelope<T> = response
      .json()
      .await
      .map_err(|e| ApiError::new(format!("Failed to parse response: {}", e)))?;
    Ok(envelope.into_inner())
  }

  async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
    let response = request
      .send()
      .await
      .map_err(|e| ApiError::new(format!("Request failed: {}", e)))?;

    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::http(status.as_u16(), error_message(status, &body)))
  }
}

/// Parse the configured URL so relative endpoint paths join under it.
fn normalize_base(url: &str) -> Result<Url> {
  let mut base = Url::parse(url).map_err(|e| eyre!("Invalid API url {}: {}", url, e))?;
  if !base.path().ends_with('/') {
    let path = format!("{}/", base.path());
    base.set_path(&path);
  }
  Ok(base)
}

/// Pick a user-facing message out of an error response.
///
/// Express handlers answer `{ "message": ... }` or `{ "error": ... }`; anything
/// else falls back to the body text or the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
  #[derive(Deserialize)]
  struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
  }

  if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
    if let Some(message) = parsed.message.or(parsed.error) {
      return message;
    }
  }

  let body = body.trim();
  if !body.is_empty() && body.len() <= 200 && !body.starts_with('<') {
    return body.to_string();
  }

  status
    .canonical_reason()
    .map(String::from)
    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
