//! REST client for the unary, batch, model-listing and file-import endpoints.

use crate::batch::{BatchOperation, CreateBatchRequest};
use crate::codec::{Codec, WireDefaults};
use crate::models::{Config, ListModelsResponse, DEFAULT_BASE_URL};
use crate::types::status::ErrorEnvelope;
use crate::types::{GenerateContentRequest, GenerateContentResponse, ImportFileRequest, Operation};
use crate::{Error, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Thin wrapper over `reqwest` that speaks the service's JSON format.
pub struct GenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
    codec: Codec,
}

impl GenAiClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, timeout, Client::new())
    }

    pub fn new_with_client(api_key: String, timeout: Duration, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
            codec: Codec::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_key.clone(), config.timeout).with_base_url(config.base_url.clone())
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Calls `generateContent` on `model` (bare ID or `models/` name).
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/v1beta/{}:generateContent",
            self.base_url,
            resource_name("models", model)
        );
        self.post_to_url(url, request).await
    }

    /// Submits a batch. The returned operation is named after the batch.
    pub async fn create_batch(
        &self,
        model: &str,
        request: &CreateBatchRequest,
    ) -> Result<BatchOperation> {
        let url = format!(
            "{}/v1beta/{}:batchGenerateContent",
            self.base_url,
            resource_name("models", model)
        );
        let operation: BatchOperation = self.post_to_url(url, request).await?;
        tracing::info!("Submitted batch {}", operation.name);
        Ok(operation)
    }

    pub async fn get_batch(&self, name: &str) -> Result<BatchOperation> {
        let url = format!("{}/v1beta/{}", self.base_url, resource_name("batches", name));
        self.get_url(url, &[]).await
    }

    pub async fn cancel_batch(&self, name: &str) -> Result<()> {
        let url = format!(
            "{}/v1beta/{}:cancel",
            self.base_url,
            resource_name("batches", name)
        );
        let _: Value = self.post_to_url(url, &EmptyBody {}).await?;
        tracing::info!("Cancelled batch {}", name);
        Ok(())
    }

    pub async fn list_models(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<ListModelsResponse> {
        let mut query = Vec::new();
        if let Some(size) = page_size {
            query.push(("pageSize", size.to_string()));
        }
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let url = format!("{}/v1beta/models", self.base_url);
        self.get_url(url, &query).await
    }

    /// Imports an uploaded file into a file-search store.
    pub async fn import_file(&self, store: &str, request: &ImportFileRequest) -> Result<Operation> {
        let url = format!(
            "{}/v1beta/{}:importFile",
            self.base_url,
            resource_name("fileSearchStores", store)
        );
        self.post_to_url(url, request).await
    }

    async fn post_to_url<Req, Resp>(&self, url: String, request: &Req) -> Result<Resp>
    where
        Req: Serialize + WireDefaults,
        Resp: DeserializeOwned,
    {
        let body = self.codec.encode(request)?;
        let builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(body);
        self.execute(builder).await
    }

    async fn get_url<Resp: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<Resp> {
        let builder = self.client.get(&url).query(query);
        self.execute(builder).await
    }

    async fn execute<Resp: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Resp> {
        let response = builder
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Gemini API error (status {}): {}", status, body);
            if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
                return Err(Error::Service(envelope.error));
            }
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        self.codec.decode(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            e
        })
    }
}

#[derive(Serialize)]
struct EmptyBody {}

impl WireDefaults for EmptyBody {}

/// Accepts `id` or `collection/id` and returns the latter.
fn resource_name(collection: &str, name: &str) -> String {
    let prefix = format!("{}/", collection);
    if name.starts_with(&prefix) {
        name.to_string()
    } else {
        format!("{}{}", prefix, name)
    }
}
