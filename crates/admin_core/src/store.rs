use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{CollectionKind, EntryId, MoveDirection},
    error::ApiError,
    protocol::{CreateEntryRequest, EntryPayload, ReorderEntryRequest, UpdateEntryRequest},
};
use url::Url;

use crate::error::EditorError;

/// Persistence seam for ordered collections. The production implementation
/// talks to the content server; tests substitute an in-process fake.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn list(&self, collection: CollectionKind) -> Result<Vec<EntryPayload>, EditorError>;
    async fn create(
        &self,
        collection: CollectionKind,
        request: CreateEntryRequest,
    ) -> Result<EntryPayload, EditorError>;
    async fn update(
        &self,
        collection: CollectionKind,
        id: &EntryId,
        request: UpdateEntryRequest,
    ) -> Result<EntryPayload, EditorError>;
    async fn delete(&self, collection: CollectionKind, id: &EntryId) -> Result<(), EditorError>;
    async fn reorder(
        &self,
        collection: CollectionKind,
        id: &EntryId,
        direction: MoveDirection,
    ) -> Result<Vec<EntryPayload>, EditorError>;
}

#[derive(Debug)]
pub struct HttpCollectionStore {
    http: Client,
    server_url: String,
}

impl HttpCollectionStore {
    pub fn new(server_url: impl Into<String>) -> Result<Self, EditorError> {
        let server_url = server_url.into();
        Url::parse(&server_url)
            .map_err(|err| EditorError::Transport(format!("invalid server url '{server_url}': {err}")))?;
        Ok(Self {
            http: Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    fn entries_url(&self, collection: CollectionKind) -> String {
        format!("{}/collections/{collection}/entries", self.server_url)
    }

    fn entry_url(&self, collection: CollectionKind, id: &EntryId) -> String {
        format!("{}/{id}", self.entries_url(collection))
    }
}

#[async_trait]
impl CollectionStore for HttpCollectionStore {
    async fn list(&self, collection: CollectionKind) -> Result<Vec<EntryPayload>, EditorError> {
        let response = self.http.get(self.entries_url(collection)).send().await?;
        decode(response).await
    }

    async fn create(
        &self,
        collection: CollectionKind,
        request: CreateEntryRequest,
    ) -> Result<EntryPayload, EditorError> {
        let response = self
            .http
            .post(self.entries_url(collection))
            .json(&request)
            .send()
            .await?;
        decode(response).await
    }

    async fn update(
        &self,
        collection: CollectionKind,
        id: &EntryId,
        request: UpdateEntryRequest,
    ) -> Result<EntryPayload, EditorError> {
        let response = self
            .http
            .put(self.entry_url(collection, id))
            .json(&request)
            .send()
            .await?;
        decode(response).await
    }

    async fn delete(&self, collection: CollectionKind, id: &EntryId) -> Result<(), EditorError> {
        let response = self.http.delete(self.entry_url(collection, id)).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(decode_error(response).await)
    }

    async fn reorder(
        &self,
        collection: CollectionKind,
        id: &EntryId,
        direction: MoveDirection,
    ) -> Result<Vec<EntryPayload>, EditorError> {
        let response = self
            .http
            .post(format!("{}/reorder", self.entry_url(collection, id)))
            .json(&ReorderEntryRequest { direction })
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, EditorError> {
    if !response.status().is_success() {
        return Err(decode_error(response).await);
    }
    Ok(response.json::<T>().await?)
}

/// The server always answers failures with a JSON `ApiError`; anything else
/// (proxy pages, connection resets mid-body) is reported as transport.
async fn decode_error(response: reqwest::Response) -> EditorError {
    let status = response.status();
    match response.json::<ApiError>().await {
        Ok(err) => EditorError::from(err),
        Err(_) => EditorError::Transport(format!("server returned status {status}")),
    }
}
