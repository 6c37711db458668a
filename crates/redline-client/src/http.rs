//! Async HTTP client wrapping the patent document JSON API.

use std::time::Duration;

use redline_core::{
  TransportError,
  api::DocumentApi,
  document::{
    CreatedVersion, Document, DocumentId, Version, VersionId, VersionIndex, VersionSummary,
  },
};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::Result;

/// Connection settings for the document API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the document REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ContentBody<'a> {
  content: &'a str,
}

#[derive(Deserialize)]
struct DocumentBody {
  content: String,
}

#[derive(Deserialize)]
struct VersionListing {
  versions: Vec<VersionSummary>,
}

// ─── Client ──────────────────────────────────────────────────────────────────

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Send `req`, mapping connection failures and non-2xx answers.
  async fn send(&self, op: &str, req: RequestBuilder) -> Result<Response, TransportError> {
    debug!(op, "request");
    let resp = req.send().await.map_err(|e| TransportError::cause(op, e))?;
    let status = resp.status();
    if !status.is_success() {
      return Err(TransportError::status(op, status.as_u16()));
    }
    Ok(resp)
  }

  async fn json<T: DeserializeOwned>(
    &self,
    op: &str,
    req: RequestBuilder,
  ) -> Result<T, TransportError> {
    self
      .send(op, req)
      .await?
      .json()
      .await
      .map_err(|e| TransportError::cause(op, format!("deserialising response: {e}")))
  }

  /// Send and discard whatever acknowledgement body comes back.
  async fn ack(&self, op: &str, req: RequestBuilder) -> Result<(), TransportError> {
    self.send(op, req).await.map(drop)
  }
}

impl DocumentApi for ApiClient {
  // ── Documents ─────────────────────────────────────────────────────────────

  /// `GET /document/{doc}`
  async fn fetch_document(&self, doc: DocumentId) -> Result<Document, TransportError> {
    let path = format!("/document/{doc}");
    let body: DocumentBody = self
      .json(&format!("GET {path}"), self.client.get(self.url(&path)))
      .await?;
    Ok(Document {
      id:      doc,
      content: body.content,
    })
  }

  /// `POST /save/{doc}`
  async fn save_document(&self, doc: DocumentId, content: &str) -> Result<(), TransportError> {
    let path = format!("/save/{doc}");
    self
      .ack(
        &format!("POST {path}"),
        self.client.post(self.url(&path)).json(&ContentBody { content }),
      )
      .await
  }

  // ── Versions ──────────────────────────────────────────────────────────────

  /// `GET /document/{doc}/versions/{version}`
  async fn fetch_version(
    &self,
    doc: DocumentId,
    version: VersionId,
  ) -> Result<Version, TransportError> {
    let path = format!("/document/{doc}/versions/{version}");
    self
      .json(&format!("GET {path}"), self.client.get(self.url(&path)))
      .await
  }

  /// `POST /save/{doc}/version/{version}`
  async fn save_version(
    &self,
    doc: DocumentId,
    version: VersionId,
    content: &str,
  ) -> Result<(), TransportError> {
    let path = format!("/save/{doc}/version/{version}");
    self
      .ack(
        &format!("POST {path}"),
        self.client.post(self.url(&path)).json(&ContentBody { content }),
      )
      .await
  }

  /// `POST /document/{doc}/versions`
  async fn create_version(
    &self,
    doc: DocumentId,
    content: &str,
  ) -> Result<CreatedVersion, TransportError> {
    let path = format!("/document/{doc}/versions");
    self
      .json(
        &format!("POST {path}"),
        self.client.post(self.url(&path)).json(&ContentBody { content }),
      )
      .await
  }

  /// `DELETE /document/{doc}/versions/{version}`
  async fn delete_version(&self, doc: DocumentId, version: VersionId) -> Result<(), TransportError> {
    let path = format!("/document/{doc}/versions/{version}");
    self
      .ack(&format!("DELETE {path}"), self.client.delete(self.url(&path)))
      .await
  }

  // ── Listings ──────────────────────────────────────────────────────────────

  /// `GET /all-versions`
  async fn list_all_versions(&self) -> Result<VersionIndex, TransportError> {
    self
      .json("GET /all-versions", self.client.get(self.url("/all-versions")))
      .await
  }

  /// `GET /document/{doc}/versions`
  async fn list_versions(&self, doc: DocumentId) -> Result<Vec<VersionSummary>, TransportError> {
    let path = format!("/document/{doc}/versions");
    let listing: VersionListing = self
      .json(&format!("GET {path}"), self.client.get(self.url(&path)))
      .await?;
    Ok(listing.versions)
  }
}
