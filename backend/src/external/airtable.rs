//! Airtable REST client
//!
//! Implements `RecordStore` over the Airtable web API with bearer auth and a
//! per-request timeout taken from configuration.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::AirtableConfig;
use crate::error::{AppError, AppResult};
use crate::external::record_store::{sanitize, Fields, ListQuery, Record, RecordStore};

/// Largest page Airtable returns
const PAGE_SIZE: usize = 100;

/// Airtable API client
#[derive(Clone)]
pub struct AirtableClient {
    client: Client,
    api_key: String,
    base_id: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    records: Vec<Record>,
    offset: Option<String>,
}

#[derive(Debug, Serialize)]
struct WriteRequest {
    fields: Fields,
    typecast: bool,
}

impl AirtableClient {
    /// Create a new AirtableClient
    pub fn new(config: &AirtableConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Configuration(format!("airtable.base_url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Configuration(
                "airtable.base_url must be an http(s) URL".to_string(),
            ));
        }

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_id: config.base_id.clone(),
            base_url,
        })
    }

    /// `{base_url}/{base_id}/{table}[/{record_id}]`, percent-encoding each segment
    fn table_url(&self, table: &str, record_id: Option<&str>) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AppError::Configuration("airtable.base_url".to_string()))?;
            segments.pop_if_empty().push(&self.base_id).push(table);
            if let Some(id) = record_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> AppResult<T> {
        let response = request.bearer_auth(&self.api_key).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %body, "Airtable request failed: {}", what);
            return Err(AppError::RecordStore {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.json().await?)
    }

    fn list_params(query: &ListQuery, offset: Option<&str>) -> Vec<(String, String)> {
        let mut params = vec![("pageSize".to_string(), PAGE_SIZE.to_string())];
        if let Some(formula) = &query.filter_by_formula {
            params.push(("filterByFormula".to_string(), formula.clone()));
        }
        if let Some(max) = query.max_records {
            params.push(("maxRecords".to_string(), max.to_string()));
        }
        for field in &query.fields {
            params.push(("fields[]".to_string(), field.clone()));
        }
        if let Some(offset) = offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        params
    }
}

#[async_trait]
impl RecordStore for AirtableClient {
    async fn get_record(&self, table: &str, id: &str) -> AppResult<Record> {
        let url = self.table_url(table, Some(id))?;
        let mut record: Record = self
            .send(self.client.get(url), &format!("record {} in {}", id, table))
            .await?;
        sanitize(&mut record.fields);
        Ok(record)
    }

    async fn list_records(&self, table: &str, query: &ListQuery) -> AppResult<Vec<Record>> {
        let url = self.table_url(table, None)?;
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let params = Self::list_params(query, offset.as_deref());
            let page: ListResponse = self
                .send(self.client.get(url.clone()).query(&params), &format!("table {}", table))
                .await?;
            records.extend(page.records.into_iter().map(|mut r| {
                sanitize(&mut r.fields);
                r
            }));

            let reached_max = query.max_records.is_some_and(|max| records.len() >= max);
            match page.offset {
                Some(next) if !reached_max => offset = Some(next),
                _ => break,
            }
        }

        if let Some(max) = query.max_records {
            records.truncate(max);
        }
        tracing::debug!(table, count = records.len(), "Listed records");
        Ok(records)
    }

    async fn create_record(&self, table: &str, fields: Fields) -> AppResult<Record> {
        let url = self.table_url(table, None)?;
        let body = WriteRequest {
            fields,
            typecast: true,
        };
        self.send(self.client.post(url).json(&body), &format!("table {}", table))
            .await
    }

    async fn update_record(&self, table: &str, id: &str, fields: Fields) -> AppResult<Record> {
        let url = self.table_url(table, Some(id))?;
        let body = WriteRequest {
            fields,
            typecast: true,
        };
        self.send(
            self.client.patch(url).json(&body),
            &format!("record {} in {}", id, table),
        )
        .await
    }
}
