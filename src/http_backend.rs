use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::backend::{BackendError, CatalogSource, ListBackend};
use crate::models::{
    AtomicItem, CatalogCategory, CatalogItem, CreateListPayload, ListData, ListItemPayload,
    ServerName, ShoppingListDocument, UpdateListPayload,
};

/// Client for the public JSON routes served by this crate.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        HttpBackend {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Base url with `segments` appended, each one percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| BackendError::Validation(format!("Invalid server url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                BackendError::Validation(format!("Server url cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn error_from(response: Response) -> BackendError {
    let status = response.status();
    let message = response.text().await.unwrap_or_default();
    if status == StatusCode::BAD_REQUEST {
        return BackendError::Validation(message);
    }
    BackendError::Status {
        status: status.as_u16(),
        message,
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    if !response.status().is_success() {
        return Err(error_from(response).await);
    }
    Ok(response.json::<T>().await?)
}

async fn expect_success(response: Response) -> Result<(), BackendError> {
    if !response.status().is_success() {
        return Err(error_from(response).await);
    }
    Ok(())
}

#[async_trait]
impl CatalogSource for HttpBackend {
    async fn catalog_categories(
        &self,
        visible_only: bool,
    ) -> Result<Vec<CatalogCategory>, BackendError> {
        let response = self
            .client
            .get(self.url(&["catalog", "categories"])?)
            .query(&[("visible_only", visible_only)])
            .send()
            .await?;
        decode(response).await
    }

    async fn catalog_items(&self, visible_only: bool) -> Result<Vec<CatalogItem>, BackendError> {
        let response = self
            .client
            .get(self.url(&["catalog", "items"])?)
            .query(&[("visible_only", visible_only)])
            .send()
            .await?;
        decode(response).await
    }

    async fn server_name(&self) -> Result<Option<String>, BackendError> {
        let response = self
            .client
            .get(self.url(&["config", "server-name"])?)
            .send()
            .await?;
        let name: ServerName = decode(response).await?;
        Ok(Some(name.name))
    }
}

#[async_trait]
impl ListBackend for HttpBackend {
    async fn list_by_code(
        &self,
        code: &str,
    ) -> Result<Option<ShoppingListDocument>, BackendError> {
        let response = self
            .client
            .get(self.url(&["lists", "by-code", code])?)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(response).await.map(Some)
    }

    async fn get_list(&self, id: &str) -> Result<ShoppingListDocument, BackendError> {
        let response = self
            .client
            .get(self.url(&["lists", id])?)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(BackendError::not_found("List", id));
        }
        decode(response).await
    }

    async fn create_list(
        &self,
        code: &str,
        data: &ListData,
    ) -> Result<ShoppingListDocument, BackendError> {
        let payload = CreateListPayload {
            list_code: code.to_string(),
            data: data.clone(),
        };
        let response = self
            .client
            .post(self.url(&["lists"])?)
            .json(&payload)
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(BackendError::Conflict(response.text().await?));
        }
        decode(response).await
    }

    async fn update_list(
        &self,
        id: &str,
        data: &ListData,
    ) -> Result<ShoppingListDocument, BackendError> {
        let payload = UpdateListPayload { data: data.clone() };
        let response = self
            .client
            .put(self.url(&["lists", id])?)
            .json(&payload)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(BackendError::not_found("List", id));
        }
        decode(response).await
    }

    async fn delete_list(&self, id: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.url(&["lists", id])?)
            .send()
            .await?;
        expect_success(response).await
    }

    async fn atomic_items(&self, list_id: &str) -> Result<Vec<AtomicItem>, BackendError> {
        let response = self
            .client
            .get(self.url(&["lists", list_id, "items"])?)
            .send()
            .await?;
        decode(response).await
    }

    async fn create_atomic_item(
        &self,
        list_id: &str,
        item: &ListItemPayload,
    ) -> Result<AtomicItem, BackendError> {
        let response = self
            .client
            .post(self.url(&["lists", list_id, "items"])?)
            .json(item)
            .send()
            .await?;
        decode(response).await
    }

    async fn delete_atomic_item(&self, id: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.url(&["items", id])?)
            .send()
            .await?;
        expect_success(response).await
    }
}
