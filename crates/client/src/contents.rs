//! Generic keyed-entity client
//!
//! [`ContentClient`] binds the request gateway to one schema and a
//! caller-defined data shape. The data-level "no such id" signal (a 404
//! from the content endpoint) is translated into `None` here; every other
//! failure propagates untouched.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::CmsClient;
use crate::errors::ApiError;
use crate::query::QueryContext;

/// A content item with its envelope metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content<TData> {
    pub id: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<String>,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub last_modified_by: Option<String>,
    #[serde(default)]
    pub version: Option<i64>,
    pub data: TData,
}

/// One page of query results.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentsResult<TData> {
    pub total: i64,
    pub items: Vec<Content<TData>>,
}

/// OData-style paging and filtering options.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    top: Option<u32>,
    skip: Option<u32>,
    filter: Option<String>,
    order_by: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    fn query_string(&self) -> String {
        let mut params = Vec::new();
        if let Some(top) = self.top {
            params.push(format!("$top={top}"));
        }
        if let Some(skip) = self.skip {
            params.push(format!("$skip={skip}"));
        }
        if let Some(filter) = &self.filter {
            params.push(format!("$filter={}", urlencoding::encode(filter)));
        }
        if let Some(order_by) = &self.order_by {
            params.push(format!("$orderby={}", urlencoding::encode(order_by)));
        }

        if params.is_empty() { String::new() } else { format!("?{}", params.join("&")) }
    }
}

/// Typed client for one content schema.
pub struct ContentClient<TData> {
    client: Arc<CmsClient>,
    schema: String,
    _data: PhantomData<fn() -> TData>,
}

impl<TData> ContentClient<TData> {
    /// Bind a gateway to a schema.
    pub fn new(client: Arc<CmsClient>, schema: impl Into<String>) -> Self {
        Self { client, schema: schema.into(), _data: PhantomData }
    }

    /// The bound schema name.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    fn contents_path(&self) -> String {
        format!(
            "api/content/{}/{}",
            urlencoding::encode(self.client.app_name()),
            urlencoding::encode(&self.schema)
        )
    }

    fn content_path(&self, id: &str) -> String {
        format!("{}/{}", self.contents_path(), urlencoding::encode(id))
    }
}

impl<TData: DeserializeOwned> ContentClient<TData> {
    /// Fetch one content item by id.
    ///
    /// Returns `None` when the endpoint reports no entity for the id.
    pub async fn get(&self, id: &str) -> Result<Option<Content<TData>>, ApiError> {
        self.get_with(id, &QueryContext::new()).await
    }

    /// Fetch one content item by id with a per-call query context.
    pub async fn get_with(
        &self,
        id: &str,
        context: &QueryContext,
    ) -> Result<Option<Content<TData>>, ApiError> {
        match self.client.request(Method::GET, &self.content_path(id), None, Some(context)).await {
            Ok(response) => {
                let content = decode(response).await?;
                Ok(Some(content))
            }
            Err(ApiError::NotFound) => {
                debug!(schema = %self.schema, %id, "content item not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Query content items with paging and filtering.
    pub async fn query(&self, options: &QueryOptions) -> Result<ContentsResult<TData>, ApiError> {
        let path = format!("{}{}", self.contents_path(), options.query_string());
        let response = self.client.request(Method::GET, &path, None, None).await?;
        decode(response).await
    }

    /// Delete a content item.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.request(Method::DELETE, &self.content_path(id), None, None).await?;
        Ok(())
    }
}

impl<TData: DeserializeOwned + Serialize> ContentClient<TData> {
    /// Create a new content item.
    pub async fn create(&self, data: &TData) -> Result<Content<TData>, ApiError> {
        let response =
            self.client.request_json(Method::POST, &self.contents_path(), data, None).await?;
        decode(response).await
    }

    /// Replace the data of an existing content item.
    pub async fn update(&self, id: &str, data: &TData) -> Result<Content<TData>, ApiError> {
        let response =
            self.client.request_json(Method::PUT, &self.content_path(id), data, None).await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    response.json().await.map_err(|e| ApiError::Decode(e.to_string()))
}
