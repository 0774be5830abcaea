//! Live blob container backed by the Azure Blob Storage REST API.

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode, Url};
use tracing::debug;

use super::connection::{Credential, StorageAccount};
use super::shared_key;
use crate::error::StorageError;
use crate::ports::blob_container::BlobFuture;
use crate::ports::{BlobContainer, BlobContentInfo, ContainerCreation};

const API_VERSION: &str = "2021-08-06";

/// A blob container in an Azure storage account (or the local emulator).
pub struct AzureBlobContainer {
    client: Client,
    account: StorageAccount,
    name: String,
}

impl AzureBlobContainer {
    /// Create a handle to container `name` in `account`. No request is made.
    #[must_use]
    pub fn new(account: StorageAccount, name: impl Into<String>) -> Self {
        Self { client: Client::new(), account, name: name.into() }
    }

    fn container_url(&self) -> Url {
        let mut url = self.account.blob_endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&self.name);
        }
        url
    }

    fn blob_url(&self, blob_name: &str) -> Url {
        let mut url = self.container_url();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(blob_name);
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        mut url: Url,
        mut headers: HeaderMap,
        body: Vec<u8>,
    ) -> Result<Response, StorageError> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        headers.insert("x-ms-date", HeaderValue::from_str(&date)?);
        headers.insert("x-ms-version", HeaderValue::from_static(API_VERSION));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

        match &self.account.credential {
            Credential::SharedKey { account, key } => {
                let auth = shared_key::authorization(account, key, &method, &url, &headers);
                headers.insert(AUTHORIZATION, HeaderValue::from_str(&auth)?);
            }
            Credential::Sas(sas) => {
                let query = match url.query() {
                    Some(existing) => format!("{existing}&{sas}"),
                    None => sas.clone(),
                };
                url.set_query(Some(&query));
            }
        }

        debug!(%method, path = url.path(), "Blob storage request");
        let response = self.client.request(method, url).headers(headers).body(body).send().await?;
        Ok(response)
    }
}

impl BlobContainer for AzureBlobContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_if_not_exists(&self) -> BlobFuture<'_, ContainerCreation> {
        Box::pin(async move {
            let mut url = self.container_url();
            url.set_query(Some("restype=container"));

            let response = self.send(Method::PUT, url, HeaderMap::new(), Vec::new()).await?;
            match (response.status(), error_code(&response).as_str()) {
                (StatusCode::CREATED, _) => Ok(ContainerCreation::Created),
                (StatusCode::CONFLICT, "ContainerAlreadyExists") => {
                    Ok(ContainerCreation::AlreadyExists)
                }
                _ => Err(api_error(response).await),
            }
        })
    }

    fn upload_blob(&self, blob_name: &str, data: Vec<u8>) -> BlobFuture<'_, BlobContentInfo> {
        let blob_name = blob_name.to_string();
        Box::pin(async move {
            let mut headers = HeaderMap::new();
            headers.insert("x-ms-blob-type", HeaderValue::from_static("BlockBlob"));
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type(&blob_name)));
            headers.insert("if-none-match", HeaderValue::from_static("*"));

            let url = self.blob_url(&blob_name);
            let response = self.send(Method::PUT, url, headers, data).await?;
            match (response.status(), error_code(&response).as_str()) {
                (StatusCode::CREATED, _) => Ok(content_info(response.headers())),
                (StatusCode::CONFLICT, "BlobAlreadyExists")
                | (StatusCode::PRECONDITION_FAILED, _) => {
                    Err(StorageError::AlreadyExists(blob_name))
                }
                _ => Err(api_error(response).await),
            }
        })
    }
}

fn content_type(blob_name: &str) -> &'static str {
    if blob_name.to_ascii_lowercase().ends_with(".png") {
        "image/png"
    } else {
        "application/octet-stream"
    }
}

fn error_code(response: &Response) -> String {
    response
        .headers()
        .get("x-ms-error-code")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn content_info(headers: &HeaderMap) -> BlobContentInfo {
    let text = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    BlobContentInfo {
        etag: text("etag"),
        last_modified: text("last-modified"),
        sequence_number: text("x-ms-blob-sequence-number").and_then(|s| s.parse().ok()),
    }
}

async fn api_error(response: Response) -> StorageError {
    let status = response.status();
    let code = error_code(&response);
    let message = match response.text().await {
        Ok(body) if !body.trim().is_empty() => body,
        _ => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    StorageError::Api { status: status.as_u16(), code, message }
}
