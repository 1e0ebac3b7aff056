use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use docbrowse_core::config::DriveConfig;
use docbrowse_core::{
    ContentGateway, DocumentId, DocumentNode, FolderEntry, FolderId, GatewayError,
};
use reqwest::{Client, RequestBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::auth::{AccessTokenSource, CredentialsError, ServiceAccountKey, ServiceAccountTokenSource};
use crate::wire::{Document, FileList, DOCUMENT_MIME_TYPE};

const LIST_FIELDS: &str = "files(id,name,mimeType)";
const PAGE_SIZE: &str = "100";
const MAX_ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, Error)]
pub enum DriveSetupError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    #[error("no service account credentials configured")]
    MissingCredentials,
    #[error("could not build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Clone, Debug)]
pub struct DriveEndpoints {
    pub drive_base_url: String,
    pub docs_base_url: String,
}

impl Default for DriveEndpoints {
    fn default() -> Self {
        Self {
            drive_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            docs_base_url: "https://docs.googleapis.com/v1".to_string(),
        }
    }
}

/// Google Drive v3 + Docs v1 implementation of [`ContentGateway`].
pub struct DriveGateway {
    client: Client,
    tokens: Arc<dyn AccessTokenSource>,
    endpoints: DriveEndpoints,
    timeout_secs: u64,
}

impl DriveGateway {
    pub fn new(
        client: Client,
        tokens: Arc<dyn AccessTokenSource>,
        endpoints: DriveEndpoints,
        timeout_secs: u64,
    ) -> Self {
        Self { client, tokens, endpoints, timeout_secs }
    }

    pub fn from_config(config: &DriveConfig) -> Result<Self, DriveSetupError> {
        let key = match (&config.credentials_json, &config.credentials_path) {
            (Some(raw), _) if !raw.expose_secret().trim().is_empty() => {
                ServiceAccountKey::from_json(raw.expose_secret())?
            }
            (_, Some(path)) => ServiceAccountKey::from_file(path)?,
            _ => return Err(DriveSetupError::MissingCredentials),
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(DriveSetupError::HttpClient)?;
        let tokens = ServiceAccountTokenSource::new(client.clone(), key)?;

        Ok(Self::new(
            client,
            Arc::new(tokens),
            DriveEndpoints {
                drive_base_url: config.api_base_url.trim_end_matches('/').to_string(),
                docs_base_url: config.docs_base_url.trim_end_matches('/').to_string(),
            },
            config.timeout_secs,
        ))
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let token = self.tokens.access_token().await?;
        let response = request
            .bearer_auth(token)
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|error| self.transport_error(error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        response.json::<T>().await.map_err(|error| {
            if error.is_timeout() {
                GatewayError::Timeout(self.timeout_secs)
            } else {
                GatewayError::Decode(error.to_string())
            }
        })
    }

    fn transport_error(&self, error: reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout(self.timeout_secs)
        } else {
            GatewayError::Transport(error.to_string())
        }
    }

    fn files_request(&self, query: &str, order_by: &str) -> RequestBuilder {
        self.client.get(format!("{}/files", self.endpoints.drive_base_url)).query(&[
            ("q", query),
            ("fields", LIST_FIELDS),
            ("orderBy", order_by),
            ("pageSize", PAGE_SIZE),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
        ])
    }
}

#[async_trait]
impl ContentGateway for DriveGateway {
    async fn list_children(&self, folder: &FolderId) -> Result<Vec<FolderEntry>, GatewayError> {
        let query = children_query(folder);
        debug!(event_name = "gateway.folder.list", folder_id = %folder, "listing folder");
        let list: FileList = self.get_json(self.files_request(&query, "folder,name")).await?;
        Ok(list.into_entries())
    }

    async fn search_documents(&self, query: &str) -> Result<Vec<FolderEntry>, GatewayError> {
        let drive_query = search_query(query);
        debug!(event_name = "gateway.search", query, "searching documents");
        let list: FileList = self.get_json(self.files_request(&drive_query, "name")).await?;
        Ok(list.into_entries())
    }

    async fn get_document(&self, document: &DocumentId) -> Result<DocumentNode, GatewayError> {
        debug!(event_name = "gateway.document.get", document_id = %document, "fetching document");
        let url = format!("{}/documents/{}", self.endpoints.docs_base_url, document);
        let document: Document = self.get_json(self.client.get(url)).await?;
        Ok(document.into_node())
    }

    fn pdf_export_url(&self, document: &DocumentId) -> String {
        format!("https://docs.google.com/document/d/{document}/export?format=pdf")
    }
}

/// Escapes a literal for use inside single quotes in a Drive query.
pub fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

pub fn children_query(folder: &FolderId) -> String {
    format!("'{}' in parents and trashed=false", escape_query_literal(folder.as_str()))
}

pub fn search_query(query: &str) -> String {
    format!(
        "name contains '{}' and mimeType='{DOCUMENT_MIME_TYPE}' and trashed=false",
        escape_query_literal(query)
    )
}
